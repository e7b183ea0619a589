use std::{fs, path::Path};

use anyhow::Result;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Settings for every conversion mode, loaded from a TOML file with one
/// table per mode. Missing tables and keys fall back to their defaults.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Text written into the 80 byte STL header.
    pub header: String,

    pub height_map: HeightMapConfig,
    pub topo: TopoConfig,
    pub braille: BrailleConfig,
    pub qr: QrConfig,
    pub depth: DepthConfig,
    pub material: MaterialConfig,
}

/// How an image is shrunk before it becomes a field.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Resample {
    /// Pick the closest source pixel.
    Nearest,
    /// Weighted average of the source pixels under each destination pixel.
    #[default]
    Area,
}

/// How scattered elevation points are spread onto the regular grid.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
#[serde(rename_all = "snake_case", tag = "method")]
pub enum Interpolation {
    Nearest,
    InverseDistance { power: f32 },
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct HeightMapConfig {
    /// Height in mm given to a fully white pixel.
    pub max_height: f32,
    /// Thickness in mm of the solid plate below the surface.
    pub base_thickness: f32,
    /// Longest side of the field in samples. `None` keeps the image size.
    pub resolution: Option<u32>,
    pub resample: Resample,
    /// Distance in mm between adjacent samples.
    pub cell_size: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct TopoConfig {
    /// Samples along each side of the square output grid.
    pub grid_resolution: u32,
    pub interpolation: Interpolation,
    /// Multiplier from elevation units to mm.
    pub vertical_scale: f32,
    pub cell_size: f32,
    pub base_thickness: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct BrailleConfig {
    pub dot_height: f32,
    pub dot_diameter: f32,
    pub base_thickness: f32,
    /// Samples across a single dot diameter, must be at least 8.
    pub samples_per_dot: u32,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct QrConfig {
    /// Edge length of one module in mm.
    pub module_size: f32,
    pub module_height: f32,
    pub base_thickness: f32,
    /// Samples along each module edge, must be at least 2.
    pub samples_per_module: u32,
    /// Raise the light modules instead of the dark ones.
    pub stamp: bool,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct DepthConfig {
    pub max_height: f32,
    pub base_thickness: f32,
    pub resolution: Option<u32>,
    pub resample: Resample,
    pub cell_size: f32,
    /// Standard deviation in samples of the smoothing pass. Zero disables it.
    pub smoothing_sigma: f32,
    /// Share of the estimate taken from brightness, the rest comes from the
    /// inverted edge strength.
    pub brightness_weight: f32,
}

#[derive(Serialize, Deserialize, Clone, Debug, Default, PartialEq)]
#[serde(default)]
pub struct MaterialConfig {
    /// Ascending sample values separating the materials. Empty means a single
    /// threshold halfway through the field's value range.
    pub thresholds: Vec<f32>,
}

impl Config {
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(err) => {
                warn!("Failed to load config, using defaults: {}", err);
                Config::default()
            }
        }
    }

    pub fn load(path: &Path) -> Result<Self> {
        Ok(if path.exists() {
            let file = fs::read(path)?;
            let string = String::from_utf8_lossy(&file);
            let config = toml::from_str(&string)?;
            info!("Loaded config from `{}`", path.display());
            config
        } else {
            info!("No config file found, using defaults");
            Self::default()
        })
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let string = toml::to_string(self)?;
        fs::write(path, string)?;
        Ok(())
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            header: "relief binary STL".into(),

            height_map: HeightMapConfig::default(),
            topo: TopoConfig::default(),
            braille: BrailleConfig::default(),
            qr: QrConfig::default(),
            depth: DepthConfig::default(),
            material: MaterialConfig::default(),
        }
    }
}

impl Default for HeightMapConfig {
    fn default() -> Self {
        Self {
            max_height: 10.0,
            base_thickness: 2.0,
            resolution: Some(100),
            resample: Resample::Area,
            cell_size: 1.0,
        }
    }
}

impl Default for TopoConfig {
    fn default() -> Self {
        Self {
            grid_resolution: 100,
            interpolation: Interpolation::InverseDistance { power: 2.0 },
            vertical_scale: 1.0,
            cell_size: 1.0,
            base_thickness: 2.0,
        }
    }
}

impl Default for BrailleConfig {
    fn default() -> Self {
        Self {
            dot_height: 0.6,
            dot_diameter: 1.5,
            base_thickness: 2.0,
            samples_per_dot: 10,
        }
    }
}

impl Default for QrConfig {
    fn default() -> Self {
        Self {
            module_size: 2.0,
            module_height: 2.0,
            base_thickness: 2.0,
            samples_per_module: 4,
            stamp: false,
        }
    }
}

impl Default for DepthConfig {
    fn default() -> Self {
        Self {
            max_height: 15.0,
            base_thickness: 2.0,
            resolution: Some(256),
            resample: Resample::Area,
            cell_size: 1.0,
            smoothing_sigma: 2.0,
            brightness_weight: 0.7,
        }
    }
}
