use common::config::QrConfig;
use itertools::Itertools;
use tracing::debug;

use super::{check_non_negative, check_positive};
use crate::{field::ScalarField, Error, Result};

/// Width in modules of the blank border scanners need around a symbol.
pub const QUIET_ZONE: usize = 4;

/// A square QR symbol without its quiet zone, `true` meaning a dark module.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMatrix {
    size: usize,
    modules: Vec<bool>,
}

impl ModuleMatrix {
    pub fn new(size: usize, modules: Vec<bool>) -> Result<Self> {
        if size == 0 || modules.len() != size * size {
            return Err(Error::invalid(format!(
                "expected {} modules for a {size}x{size} symbol, got {}",
                size * size,
                modules.len()
            )));
        }

        Ok(Self { size, modules })
    }

    pub fn from_fn(size: usize, mut dark: impl FnMut(usize, usize) -> bool) -> Result<Self> {
        let modules = (0..size * size).map(|i| dark(i % size, i / size)).collect();
        Self::new(size, modules)
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        self.modules[y * self.size + x]
    }
}

/// Rasterizes a QR symbol with a [`QUIET_ZONE`] module border. Dark modules
/// are raised by `module_height`, or light ones in stamp mode. The quiet zone
/// stays at zero either way.
///
/// Module edges fall on sample positions and a sample on an edge is only
/// raised when every module touching it is, so the slope between levels
/// always lies inside the raised module and the quiet zone stays flat for its
/// full width.
pub fn build_qr_field(matrix: &ModuleMatrix, config: &QrConfig) -> Result<ScalarField> {
    check_positive("module size", config.module_size)?;
    check_positive("module height", config.module_height)?;
    check_non_negative("base thickness", config.base_thickness)?;
    if config.samples_per_module < 2 {
        return Err(Error::invalid(format!(
            "need at least 2 samples per module, got {}",
            config.samples_per_module
        )));
    }

    let per_module = config.samples_per_module as usize;
    let modules = matrix.size() + 2 * QUIET_ZONE;
    let size = modules * per_module + 1;
    debug!(
        "Rasterizing {0}x{0} QR symbol onto {1}x{1} samples",
        matrix.size(),
        size
    );

    // modules sharing the sample at `idx` along one axis
    let touching = |idx: usize| {
        let module = idx / per_module;
        if idx % per_module == 0 {
            module.saturating_sub(1)..=module.min(modules - 1)
        } else {
            module..=module
        }
    };

    let symbol = QUIET_ZONE..QUIET_ZONE + matrix.size();
    let raised = |mx: usize, my: usize| {
        symbol.contains(&mx)
            && symbol.contains(&my)
            && matrix.get(mx - QUIET_ZONE, my - QUIET_ZONE) != config.stamp
    };

    ScalarField::from_fn(
        size,
        size,
        config.module_size / per_module as f32,
        config.base_thickness,
        |x, y| {
            if touching(x)
                .cartesian_product(touching(y))
                .all(|(mx, my)| raised(mx, my))
            {
                config.module_height
            } else {
                0.0
            }
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn checkerboard() -> ModuleMatrix {
        ModuleMatrix::from_fn(5, |x, y| (x + y) % 2 == 0).unwrap()
    }

    /// Every sample within `QUIET_ZONE` modules of the plate edge is zero.
    fn quiet_zone_is_flat(field: &ScalarField, config: &QrConfig) {
        let border = QUIET_ZONE as f32 * config.module_size;
        let (width, depth) = field.footprint();
        let cell = field.cell_size();

        for y in 0..field.height() {
            for x in 0..field.width() {
                let (px, py) = (x as f32 * cell, y as f32 * cell);
                let inside = px > border
                    && px < width - border
                    && py > border
                    && py < depth - border;
                if !inside {
                    assert_eq!(field.get(x, y), 0.0, "sample ({x}, {y})");
                }
            }
        }
    }

    #[test]
    fn raises_dark_modules() {
        let config = QrConfig::default();
        let field = build_qr_field(&checkerboard(), &config).unwrap();

        let per_module = config.samples_per_module as usize;
        assert_eq!(field.width(), (5 + 8) * per_module + 1);
        assert_eq!(field.cell_size(), config.module_size / per_module as f32);
        quiet_zone_is_flat(&field, &config);

        // first sample past the corner of module (0, 0), then the same spot in
        // module (1, 0)
        let origin = QUIET_ZONE * per_module + 1;
        assert_eq!(field.get(origin, origin), config.module_height);
        assert_eq!(field.get(origin + per_module, origin), 0.0);
    }

    #[test]
    fn plate_spans_whole_modules() {
        let config = QrConfig::default();
        let matrix = ModuleMatrix::from_fn(21, |_, _| true).unwrap();
        let field = build_qr_field(&matrix, &config).unwrap();

        let side = (21 + 2 * QUIET_ZONE) as f32 * config.module_size;
        assert_eq!(field.footprint(), (side, side));
        quiet_zone_is_flat(&field, &config);

        // raised area starts one sample past the 4 module border
        let per_module = config.samples_per_module as usize;
        let edge = QUIET_ZONE * per_module;
        assert_eq!(field.get(edge, edge + 2), 0.0);
        assert_eq!(field.get(edge + 1, edge + 2), config.module_height);
        assert_eq!(field.get(field.width() - 1 - edge, edge + 2), 0.0);
        assert_eq!(
            field.get(field.width() - 2 - edge, edge + 2),
            config.module_height
        );
    }

    #[test]
    fn stamp_swaps_heights() {
        let config = QrConfig {
            stamp: true,
            ..Default::default()
        };
        let field = build_qr_field(&checkerboard(), &config).unwrap();
        quiet_zone_is_flat(&field, &config);

        let per_module = config.samples_per_module as usize;
        let origin = QUIET_ZONE * per_module + 1;
        assert_eq!(field.get(origin, origin), 0.0);
        assert_eq!(field.get(origin + per_module, origin), config.module_height);
    }

    #[test]
    fn rejects_bad_matrices() {
        assert!(ModuleMatrix::new(0, Vec::new()).is_err());
        assert!(ModuleMatrix::new(3, vec![true; 8]).is_err());

        let config = QrConfig {
            samples_per_module: 1,
            ..Default::default()
        };
        assert!(build_qr_field(&checkerboard(), &config).is_err());
    }
}
