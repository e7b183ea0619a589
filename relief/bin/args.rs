use std::path::PathBuf;

use clap::{Parser, Subcommand};
use common::config::{Config, Resample};

#[derive(Debug, Parser)]
/// relief command line interface. Turns images, elevation tables, text and
/// QR payloads into printable binary STL models.
pub struct Args {
    #[arg(long, global = true)]
    /// TOML config file. Defaults to `relief.toml` in the working directory
    /// when it exists.
    pub config: Option<PathBuf>,
    #[arg(short, long, global = true)]
    /// Log every pipeline stage.
    pub verbose: bool,
    #[arg(long, global = true)]
    /// Text written into the 80 byte STL header.
    pub header: Option<String>,

    #[command(subcommand)]
    pub mode: Mode,
}

#[derive(Debug, Subcommand)]
pub enum Mode {
    /// Brighter pixels become taller.
    Heightmap {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Terrain from a CSV table of latitude, longitude and elevation.
    Topo {
        #[arg(long, required_unless_present = "demo")]
        /// CSV file with a header row naming its columns.
        csv: Option<PathBuf>,
        #[arg(long, conflicts_with = "csv")]
        /// Use generated terrain instead of a CSV file.
        demo: bool,
        output: PathBuf,
        #[arg(long)]
        /// Samples along each side of the grid.
        grid_resolution: Option<u32>,
        #[arg(long)]
        /// Multiplier from elevation units to mm.
        vertical_scale: Option<f32>,
        #[arg(long)]
        /// Use the nearest point instead of inverse distance weighting.
        nearest: bool,
    },
    /// Raised Braille dots on a plate.
    Braille {
        text: String,
        output: PathBuf,
        #[arg(long)]
        /// Dot height in mm.
        dot_height: Option<f32>,
    },
    /// A QR code with raised dark modules.
    Qr {
        payload: String,
        output: PathBuf,
        #[arg(long)]
        /// Edge length of a module in mm.
        module_size: Option<f32>,
        #[arg(long)]
        /// Raise the light modules instead.
        stamp: bool,
    },
    /// Rough depth relief from a single photo.
    Depth {
        input: PathBuf,
        output: PathBuf,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// One STL per material, split by height thresholds.
    Multi {
        input: PathBuf,
        /// Output path prefix, files are named `<prefix>_material_<n>.stl`.
        prefix: PathBuf,
        #[arg(long, value_delimiter = ',')]
        /// Ascending height thresholds in mm. Defaults to the middle of the
        /// height range.
        thresholds: Vec<f32>,
        #[command(flatten)]
        image: ImageArgs,
    },
    /// Print a summary of a binary STL file.
    Inspect { input: PathBuf },
}

#[derive(clap::Args, Debug)]
pub struct ImageArgs {
    #[arg(long)]
    /// Height in mm of the brightest pixel.
    pub max_height: Option<f32>,
    #[arg(long)]
    /// Thickness in mm of the solid base.
    pub base: Option<f32>,
    #[arg(long)]
    /// Longest side of the field in samples.
    pub resolution: Option<u32>,
    #[arg(long)]
    /// Use nearest neighbor instead of area averaging when shrinking.
    pub nearest: bool,
}

impl Args {
    /// Applies the options shared by every mode to a loaded config.
    pub fn apply(&self, config: &mut Config) {
        if let Some(header) = &self.header {
            config.header = header.clone();
        }
    }
}

impl ImageArgs {
    pub fn apply(
        &self,
        max_height: &mut f32,
        base: &mut f32,
        resolution: &mut Option<u32>,
        resample: &mut Resample,
    ) {
        if let Some(value) = self.max_height {
            *max_height = value;
        }
        if let Some(value) = self.base {
            *base = value;
        }
        if self.resolution.is_some() {
            *resolution = self.resolution;
        }
        if self.nearest {
            *resample = Resample::Nearest;
        }
    }
}
