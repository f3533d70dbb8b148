//! Import configuration module.
//!
//! Handles loading, validating, and saving the import settings file. The file
//! stores the target grid size and, for each option catalog, the *position* of
//! the selected entry (see [`options`](crate::options)).
//!
//! ## Configuration Options
//!
//! ```toml
//! # All options are optional - defaults shown below
//!
//! [grid]
//! width = 1        # Tiles across
//! height = 1       # Tiles down
//!
//! [selections]
//! stretch = 0      # 0 Uniform, 1 Stretch, 2 Crop
//! scale = 0        # 0 Automatic, 1 Pixel Art, 2 Bicubic
//! dither = 0       # 0 None, 1 Floyd Steinberg, 2 Burks
//! algorithm = 0    # 0 Good Fast, 1 Euclidean, 2 CIEDE2000, 3 CIE76, 4 CMC, 5 Oklab
//! background = 0   # 0 Transparent, 1 White, 2 Black
//! ```
//!
//! User files are sparse and merged on top of the stock defaults. Unknown
//! keys are rejected to catch typos early. Selection indices outside their
//! catalog are rejected at load time with
//! [`ConfigError::InvalidSelectionIndex`], so nothing downstream ever reads
//! past the end of a catalog.

use crate::options::{
    AlgorithmOption, BackgroundOption, Catalog, DitherOption, ScalingOption, StretchOption,
    all_catalogs,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
    #[error("TOML serialize error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
    #[error("Config validation error: {0}")]
    Validation(String),
    #[error("selections.{catalog} = {index} is out of range (catalog has {len} entries)")]
    InvalidSelectionIndex {
        catalog: &'static str,
        index: i64,
        len: usize,
    },
}

/// Import configuration loaded from the settings file.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImportConfig {
    /// Target grid size in tiles.
    pub grid: GridConfig,
    /// Persisted catalog selections.
    pub selections: Selections,
}

impl ImportConfig {
    /// Validate grid size and every selection index.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.grid.width == 0 || self.grid.height == 0 {
            return Err(ConfigError::Validation(
                "grid.width and grid.height must be positive".into(),
            ));
        }
        self.selections.validate()
    }
}

/// Target grid size, in tiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GridConfig {
    pub width: u32,
    pub height: u32,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            width: 1,
            height: 1,
        }
    }
}

/// Selected position in each option catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Selections {
    pub stretch: usize,
    pub scale: usize,
    pub dither: usize,
    pub algorithm: usize,
    pub background: usize,
}

impl Selections {
    /// The currently selected entry of catalog `C`.
    pub fn get<C: Catalog>(&self) -> Result<C, ConfigError> {
        C::from_index(C::slot(self))
    }

    /// Select `entry`; only its position is stored.
    pub fn set<C: Catalog>(&mut self, entry: C) {
        *C::slot_mut(self) = entry.index();
    }

    /// Advance catalog `C` to its next entry, wrapping at the end.
    pub fn cycle<C: Catalog>(&mut self) -> Result<C, ConfigError> {
        let next = self.get::<C>()?.next();
        self.set(next);
        Ok(next)
    }

    /// Select by catalog kind name and index, as typed on the command line.
    pub fn set_by_kind(&mut self, kind: &str, index: usize) -> Result<(), ConfigError> {
        fn apply<C: Catalog>(sel: &mut Selections, index: usize) -> Result<(), ConfigError> {
            let entry = C::from_index(index)?;
            sel.set(entry);
            Ok(())
        }
        match kind {
            StretchOption::KIND => apply::<StretchOption>(self, index),
            ScalingOption::KIND => apply::<ScalingOption>(self, index),
            DitherOption::KIND => apply::<DitherOption>(self, index),
            AlgorithmOption::KIND => apply::<AlgorithmOption>(self, index),
            BackgroundOption::KIND => apply::<BackgroundOption>(self, index),
            other => Err(ConfigError::Validation(format!(
                "unknown catalog '{other}' (see `options`)"
            ))),
        }
    }

    /// Current index of a catalog by kind name.
    pub fn index_of(&self, kind: &str) -> Option<usize> {
        match kind {
            StretchOption::KIND => Some(self.stretch),
            ScalingOption::KIND => Some(self.scale),
            DitherOption::KIND => Some(self.dither),
            AlgorithmOption::KIND => Some(self.algorithm),
            BackgroundOption::KIND => Some(self.background),
            _ => None,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.get::<StretchOption>()?;
        self.get::<ScalingOption>()?;
        self.get::<DitherOption>()?;
        self.get::<AlgorithmOption>()?;
        self.get::<BackgroundOption>()?;
        Ok(())
    }
}

// =============================================================================
// Config loading, merging, saving
// =============================================================================

/// Returns the stock default config as a `toml::Value::Table`.
pub fn stock_defaults_value() -> Result<toml::Value, ConfigError> {
    Ok(toml::Value::try_from(ImportConfig::default())?)
}

/// Recursively merge `overlay` on top of `base`.
///
/// - Tables are merged key-by-key (overlay keys override base keys).
/// - Non-table values in overlay replace base values entirely.
/// - Keys in base that are not in overlay are preserved.
pub fn merge_toml(base: toml::Value, overlay: toml::Value) -> toml::Value {
    match (base, overlay) {
        (toml::Value::Table(mut base_table), toml::Value::Table(overlay_table)) => {
            for (key, overlay_val) in overlay_table {
                let merged = match base_table.remove(&key) {
                    Some(base_val) => merge_toml(base_val, overlay_val),
                    None => overlay_val,
                };
                base_table.insert(key, merged);
            }
            toml::Value::Table(base_table)
        }
        (_, overlay) => overlay,
    }
}

/// Parse config text, merge it over the defaults and validate.
pub fn parse_config(content: &str) -> Result<ImportConfig, ConfigError> {
    let overlay: toml::Value = toml::from_str(content)?;
    reject_negative_selections(&overlay)?;
    let merged = merge_toml(stock_defaults_value()?, overlay);
    let config: ImportConfig = merged.try_into()?;
    config.validate()?;
    Ok(config)
}

/// Selections are stored unsigned; a negative one is still an out-of-range
/// index, not a type error.
fn reject_negative_selections(overlay: &toml::Value) -> Result<(), ConfigError> {
    let Some(selections) = overlay.get("selections").and_then(toml::Value::as_table) else {
        return Ok(());
    };
    for (kind, names) in all_catalogs() {
        let negative = selections
            .get(kind)
            .and_then(toml::Value::as_integer)
            .filter(|&index| index < 0);
        if let Some(index) = negative {
            return Err(ConfigError::InvalidSelectionIndex {
                catalog: kind,
                index,
                len: names.len(),
            });
        }
    }
    Ok(())
}

/// Load the settings file at `path`.
///
/// A missing file yields the stock defaults; a present but malformed or
/// out-of-range file is an error.
pub fn load_config(path: &Path) -> Result<ImportConfig, ConfigError> {
    if !path.exists() {
        log::debug!("no config at {}, using defaults", path.display());
        return Ok(ImportConfig::default());
    }
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Write `config` to `path`, creating parent directories as needed.
pub fn save_config(path: &Path, config: &ImportConfig) -> Result<(), ConfigError> {
    config.validate()?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, toml::to_string_pretty(config)?)?;
    log::debug!("saved config to {}", path.display());
    Ok(())
}

/// Returns a fully-commented stock settings file.
///
/// Used by the `gen-config` CLI command.
pub fn stock_config_toml() -> &'static str {
    r##"# mapart-import settings
# ======================
# All settings are optional. Values shown below are the defaults.
# Unknown keys will cause an error.

# ---------------------------------------------------------------------------
# Target grid, in tiles
# ---------------------------------------------------------------------------
[grid]
width = 1
height = 1

# ---------------------------------------------------------------------------
# Option selections (position in each list, starting at 0)
# ---------------------------------------------------------------------------
[selections]
# 0 Uniform, 1 Stretch, 2 Crop
stretch = 0

# 0 Automatic (bicubic above 128x128, nearest-neighbor otherwise)
# 1 Pixel Art (always nearest-neighbor), 2 Bicubic (always bicubic)
scale = 0

# 0 None, 1 Floyd Steinberg, 2 Burks
dither = 0

# 0 Good Fast, 1 Euclidean, 2 CIEDE2000, 3 CIE76, 4 CMC, 5 Oklab
algorithm = 0

# 0 Transparent, 1 White, 2 Black
background = 0
"##
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn default_config_values() {
        let config = ImportConfig::default();
        assert_eq!(config.grid, GridConfig { width: 1, height: 1 });
        assert_eq!(config.selections, Selections::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn parse_partial_config() {
        let config = parse_config(
            r#"
[selections]
dither = 2
"#,
        )
        .unwrap();
        assert_eq!(config.selections.dither, 2);
        assert_eq!(config.selections.scale, 0);
        assert_eq!(config.grid.width, 1);
    }

    #[test]
    fn stock_config_parses_to_defaults() {
        let config = parse_config(stock_config_toml()).unwrap();
        assert_eq!(config, ImportConfig::default());
    }

    #[test]
    fn unknown_keys_are_rejected() {
        let result = parse_config("[selections]\ncolour = 1\n");
        assert!(matches!(result, Err(ConfigError::Toml(_))));
    }

    #[test]
    fn out_of_range_selection_is_rejected_at_load() {
        let result = parse_config("[selections]\nalgorithm = 6\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSelectionIndex {
                catalog: "algorithm",
                index: 6,
                len: 6
            })
        ));
    }

    #[test]
    fn negative_selection_is_rejected_as_out_of_range() {
        let result = parse_config("[selections]\nstretch = -1\n");
        assert!(matches!(
            result,
            Err(ConfigError::InvalidSelectionIndex {
                catalog: "stretch",
                index: -1,
                len: 3
            })
        ));
    }

    #[test]
    fn zero_grid_is_rejected() {
        let result = parse_config("[grid]\nwidth = 0\n");
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn merge_toml_overlays_nested_tables() {
        let base: toml::Value = toml::from_str("[a]\nx = 1\ny = 2\n").unwrap();
        let overlay: toml::Value = toml::from_str("[a]\ny = 3\n").unwrap();
        let merged = merge_toml(base, overlay);
        assert_eq!(merged["a"]["x"].as_integer(), Some(1));
        assert_eq!(merged["a"]["y"].as_integer(), Some(3));
    }

    #[test]
    fn selections_get_set_cycle() {
        let mut sel = Selections::default();
        sel.set(ScalingOption::Bicubic);
        assert_eq!(sel.scale, 2);
        assert_eq!(sel.get::<ScalingOption>().unwrap(), ScalingOption::Bicubic);

        assert_eq!(sel.cycle::<BackgroundOption>().unwrap(), BackgroundOption::White);
        assert_eq!(sel.cycle::<BackgroundOption>().unwrap(), BackgroundOption::Black);
        assert_eq!(
            sel.cycle::<BackgroundOption>().unwrap(),
            BackgroundOption::Transparent
        );
        assert_eq!(sel.background, 0);
    }

    #[test]
    fn cycle_refuses_corrupt_index() {
        let mut sel = Selections {
            background: 9,
            ..Default::default()
        };
        assert!(sel.cycle::<BackgroundOption>().is_err());
        assert_eq!(sel.background, 9);
    }

    #[test]
    fn set_by_kind_validates() {
        let mut sel = Selections::default();
        sel.set_by_kind("algorithm", 5).unwrap();
        assert_eq!(sel.algorithm, 5);
        assert!(sel.set_by_kind("algorithm", 6).is_err());
        assert!(matches!(
            sel.set_by_kind("palette", 0),
            Err(ConfigError::Validation(_))
        ));
        assert_eq!(sel.index_of("algorithm"), Some(5));
        assert_eq!(sel.index_of("palette"), None);
    }

    #[test]
    fn load_config_returns_default_when_no_file() {
        let tmp = TempDir::new().unwrap();
        let config = load_config(&tmp.path().join("settings.toml")).unwrap();
        assert_eq!(config, ImportConfig::default());
    }

    #[test]
    fn save_then_load_round_trips() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("nested/settings.toml");

        let mut config = ImportConfig::default();
        config.grid = GridConfig {
            width: 3,
            height: 2,
        };
        config.selections.set(AlgorithmOption::Oklab);
        config.selections.set(StretchOption::Crop);

        save_config(&path, &config).unwrap();
        let loaded = load_config(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn load_config_reports_bad_index_from_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("settings.toml");
        fs::write(&path, "[selections]\nstretch = 42\n").unwrap();
        let err = load_config(&path).unwrap_err();
        assert!(err.to_string().contains("selections.stretch = 42"));
    }
}
