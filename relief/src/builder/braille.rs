//! Grade 1 (uncontracted) Braille on a flat plate.
//!
//! A cell is stored as a bit mask where bit `n - 1` is dot `n`. Dots 1-3 run
//! down the left column and dots 4-6 down the right one.
//!
//! Letters are case insensitive and no capital sign is written. Digits are
//! preceded by the number sign once per run of digits, and a letter from a-j
//! that directly follows a digit gets a letter sign so it is not read as a
//! digit. Any other character is rejected.

use std::mem;

use common::config::BrailleConfig;
use itertools::Itertools;
use tracing::debug;

use super::{check_non_negative, check_positive};
use crate::{field::ScalarField, Error, Result};

/// Distance in mm between dot centers inside a cell.
pub const DOT_SPACING: f32 = 2.5;
/// Distance in mm between the same dot of neighboring cells.
pub const CELL_SPACING: f32 = 6.0;
/// Distance in mm between the same dot of cells on consecutive lines.
pub const LINE_SPACING: f32 = 10.0;
/// Blank border in mm around the text.
pub const MARGIN: f32 = 4.0;

/// Dots 3, 4, 5 and 6.
pub const NUMBER_SIGN: u8 = 0b111100;
/// Dots 5 and 6.
pub const LETTER_SIGN: u8 = 0b110000;

const LETTERS: [u8; 26] = [
    0b000001, 0b000011, 0b001001, 0b011001, 0b010001, // a-e
    0b001011, 0b011011, 0b010011, 0b001010, 0b011010, // f-j
    0b000101, 0b000111, 0b001101, 0b011101, 0b010101, // k-o
    0b001111, 0b011111, 0b010111, 0b001110, 0b011110, // p-t
    0b100101, 0b100111, 0b111010, 0b101101, 0b111101, // u-y
    0b110101, // z
];

fn letter(c: char) -> Option<u8> {
    let c = c.to_ascii_lowercase();
    c.is_ascii_lowercase()
        .then(|| LETTERS[(c as u8 - b'a') as usize])
}

fn digit(c: char) -> Option<u8> {
    // 1-9 share their cells with a-i and 0 with j
    let value = c.to_digit(10)?;
    Some(LETTERS[(value + 9) as usize % 10])
}

fn punctuation(c: char) -> Option<u8> {
    Some(match c {
        ' ' => 0,
        ',' => 0b000010,
        ';' => 0b000110,
        ':' => 0b010010,
        '.' => 0b110010,
        '!' => 0b010110,
        '?' => 0b100110,
        '\'' => 0b000100,
        '-' => 0b100100,
        _ => return None,
    })
}

/// Translates text into lines of cells, one line per `\n`.
pub fn translate(text: &str) -> Result<Vec<Vec<u8>>> {
    let mut lines = Vec::new();
    let mut line = Vec::new();
    let mut in_number = false;

    for (position, character) in text.chars().enumerate() {
        match character {
            '\n' => {
                lines.push(mem::take(&mut line));
                in_number = false;
            }
            '\r' => {}
            c if c.is_ascii_digit() => {
                if !in_number {
                    line.push(NUMBER_SIGN);
                    in_number = true;
                }
                line.extend(digit(c));
            }
            c => {
                let cell = letter(c)
                    .or_else(|| punctuation(c))
                    .ok_or(Error::UnsupportedCharacter {
                        character: c,
                        position,
                    })?;

                if in_number && ('a'..='j').contains(&c.to_ascii_lowercase()) {
                    line.push(LETTER_SIGN);
                }

                line.push(cell);
                in_number = false;
            }
        }
    }

    lines.push(line);
    Ok(lines)
}

/// Center of dot `dot` (0-5) of the cell at `column` on `line`, in mm from
/// the top left corner of the plate.
fn dot_center(line: usize, column: usize, dot: usize) -> (f32, f32) {
    let (dot_column, dot_row) = (dot / 3, dot % 3);
    (
        MARGIN + column as f32 * CELL_SPACING + dot_column as f32 * DOT_SPACING,
        MARGIN + line as f32 * LINE_SPACING + dot_row as f32 * DOT_SPACING,
    )
}

/// Rasterizes `text` as domed Braille dots on a plate. The sample spacing is
/// derived from the dot diameter, while the cell layout uses the fixed
/// physical spacing constants above. Empty text gives a blank one cell plate.
pub fn build_braille_field(text: &str, config: &BrailleConfig) -> Result<ScalarField> {
    check_positive("dot height", config.dot_height)?;
    check_positive("dot diameter", config.dot_diameter)?;
    check_non_negative("base thickness", config.base_thickness)?;

    if config.dot_diameter >= DOT_SPACING {
        return Err(Error::invalid(format!(
            "dot diameter must be below the {DOT_SPACING}mm dot spacing"
        )));
    }

    if config.samples_per_dot < 8 {
        return Err(Error::invalid(format!(
            "need at least 8 samples per dot, got {}",
            config.samples_per_dot
        )));
    }

    let lines = translate(text)?;
    let columns = lines.iter().map(Vec::len).max().unwrap_or(0).max(1);

    let cell_size = config.dot_diameter / config.samples_per_dot as f32;
    let plate_width = 2.0 * MARGIN + (columns - 1) as f32 * CELL_SPACING + DOT_SPACING;
    let plate_height = 2.0 * MARGIN + (lines.len() - 1) as f32 * LINE_SPACING + 2.0 * DOT_SPACING;
    let width = (plate_width / cell_size).ceil() as usize + 1;
    let height = (plate_height / cell_size).ceil() as usize + 1;

    let radius = config.dot_diameter / 2.0;
    let mut samples = vec![0.0_f32; width * height];
    let mut dots = 0;

    for (line, cells) in lines.iter().enumerate() {
        for (column, &cell) in cells.iter().enumerate() {
            for dot in (0..6).filter(|dot| cell & (1 << dot) != 0) {
                dots += 1;
                let (cx, cy) = dot_center(line, column, dot);
                let span = |center: f32, max: usize| {
                    let start = ((center - radius) / cell_size).floor().max(0.0) as usize;
                    let end = (((center + radius) / cell_size).ceil() as usize).min(max - 1);
                    start..=end
                };

                for (x, y) in span(cx, width).cartesian_product(span(cy, height)) {
                    let (dx, dy) = (x as f32 * cell_size - cx, y as f32 * cell_size - cy);
                    let falloff = 1.0 - (dx * dx + dy * dy) / (radius * radius);
                    if falloff > 0.0 {
                        let sample = &mut samples[y * width + x];
                        *sample = sample.max(config.dot_height * falloff.sqrt());
                    }
                }
            }
        }
    }

    debug!(
        "Rasterized {} Braille cells ({dots} dots) onto {width}x{height} samples",
        lines.iter().map(Vec::len).sum::<usize>()
    );

    ScalarField::new(width, height, samples, cell_size, config.base_thickness)
}
