use crate::{
    constants::{
        DEFAULT_BLOCK_COVERAGE, DEFAULT_CELL_PX, DEFAULT_COLS, DEFAULT_FONT_PATHS,
        DEFAULT_OUTPUT_DIR, DEFAULT_RADIUS, DEFAULT_ROWS, ENV_OUTPUT_DIR, FORMAT_CSV, FORMAT_JSON,
        MAX_CELL_PX, MIN_CELL_PX,
    },
    error::{CoverageError, Result},
};
use log::warn;
use serde::{Deserialize, Serialize};
use std::{env, path::PathBuf, str::FromStr};
use strum_macros::{Display, EnumString};

/// Top-level run configuration
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    pub grid: GridConfig,
    pub planner: PlannerConfig,
    pub output: OutputConfig,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct GridConfig {
    pub rows: usize,
    pub cols: usize,
    pub block_coverage: f64, // share of blocked cells, [0, 1]
    pub seed: Option<u64>,   // drawn at random when absent
    pub map_file: Option<PathBuf>,
}

impl Default for GridConfig {
    fn default() -> Self {
        Self {
            rows: DEFAULT_ROWS,
            cols: DEFAULT_COLS,
            block_coverage: DEFAULT_BLOCK_COVERAGE,
            seed: None,
            map_file: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct PlannerConfig {
    pub radius: i64,
}

impl Default for PlannerConfig {
    fn default() -> Self {
        Self {
            radius: DEFAULT_RADIUS,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct OutputConfig {
    pub output_dir: String,
    pub render: bool,
    pub formats: Vec<String>, // "csv" | "json"
    pub cell_px: u32,
    pub font_paths: Vec<PathBuf>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            output_dir: DEFAULT_OUTPUT_DIR.to_string(),
            render: true,
            formats: vec![FORMAT_CSV.to_string()],
            cell_px: DEFAULT_CELL_PX,
            font_paths: DEFAULT_FONT_PATHS.iter().map(PathBuf::from).collect(),
        }
    }
}

/// Tower export formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
pub enum ExportFormat {
    Csv,
    Json,
}

/// Command-line values that take precedence over the configuration file
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConfigOverrides {
    pub rows: Option<usize>,
    pub cols: Option<usize>,
    pub block_coverage: Option<f64>,
    pub seed: Option<u64>,
    pub map_file: Option<PathBuf>,
    pub radius: Option<i64>,
    pub output_dir: Option<String>,
    pub no_render: bool,
}

impl Config {
    /// Loads `path`, or the defaults when the file does not exist.
    pub fn load_or_default(path: &PathBuf) -> Result<Self> {
        if path.exists() {
            Self::load_from_file(path)
        } else {
            warn!(
                "Config file not found: {}, using default settings",
                path.display()
            );
            Ok(Self::default())
        }
    }

    /// Reads and validates a TOML configuration file.
    pub fn load_from_file(path: &PathBuf) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            CoverageError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        let config = Self::from_toml_str(&content).map_err(|e| {
            CoverageError::Config(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;

        config.validate()?;
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        Ok(toml::from_str(content)?)
    }

    /// Overrides the output directory from `CITY_COVERAGE_OUTPUT_DIR` when it is set and non-blank.
    pub fn apply_env(&mut self) -> Result<()> {
        if let Ok(output_dir) = env::var(ENV_OUTPUT_DIR)
            && !output_dir.trim().is_empty()
        {
            let path = PathBuf::from(&output_dir);

            // existing non-directory paths cannot receive figures
            if path.exists() && !path.is_dir() {
                return Err(CoverageError::Config(format!(
                    "Output path is not a directory: {}",
                    path.display()
                )));
            }
            self.output.output_dir = output_dir;
        }
        Ok(())
    }

    /// Applies the given overrides; fields left unset keep their current value.
    pub fn apply_overrides(&mut self, overrides: &ConfigOverrides) {
        if let Some(rows) = overrides.rows {
            self.grid.rows = rows;
        }
        if let Some(cols) = overrides.cols {
            self.grid.cols = cols;
        }
        if let Some(coverage) = overrides.block_coverage {
            self.grid.block_coverage = coverage;
        }
        if let Some(seed) = overrides.seed {
            self.grid.seed = Some(seed);
        }
        if let Some(map) = &overrides.map_file {
            self.grid.map_file = Some(map.clone());
        }
        if let Some(radius) = overrides.radius {
            self.planner.radius = radius;
        }
        if let Some(dir) = &overrides.output_dir {
            self.output.output_dir = dir.clone();
        }
        if overrides.no_render {
            self.output.render = false;
        }
    }

    pub fn validate(&self) -> Result<()> {
        let grid = &self.grid;
        if grid.map_file.is_none() && (grid.rows == 0 || grid.cols == 0) {
            return Err(CoverageError::InvalidDimensions {
                rows: grid.rows,
                cols: grid.cols,
            });
        }
        if !(0.0..=1.0).contains(&grid.block_coverage) {
            return Err(CoverageError::InvalidCoverage(grid.block_coverage));
        }
        if self.planner.radius < 0 || self.planner.radius > u32::MAX as i64 {
            return Err(CoverageError::InvalidRadius(self.planner.radius));
        }

        let output = &self.output;
        if !(MIN_CELL_PX..=MAX_CELL_PX).contains(&output.cell_px) {
            return Err(CoverageError::Config(format!(
                "cell_px must be between {} and {}, got {}",
                MIN_CELL_PX, MAX_CELL_PX, output.cell_px
            )));
        }
        self.export_formats()?;
        Ok(())
    }

    /// Parsed export formats, duplicates removed
    pub fn export_formats(&self) -> Result<Vec<ExportFormat>> {
        let mut formats = Vec::with_capacity(self.output.formats.len());
        for name in &self.output.formats {
            let format = ExportFormat::from_str(name.trim()).map_err(|_| {
                CoverageError::Config(format!(
                    "Invalid export format: {}. Must be '{}' or '{}'",
                    name, FORMAT_CSV, FORMAT_JSON
                ))
            })?;
            if !formats.contains(&format) {
                formats.push(format);
            }
        }
        Ok(formats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.grid.rows, 10);
        assert_eq!(config.grid.cols, 10);
        assert_eq!(config.grid.block_coverage, 0.3);
        assert_eq!(config.planner.radius, 3);
        assert_eq!(config.output.output_dir, "figs");
        assert!(config.output.render);
        config.validate().unwrap();
    }

    #[test]
    fn test_shipped_default_config_is_valid() {
        let config = Config::from_toml_str(include_str!("../../../config/default.toml")).unwrap();
        config.validate().unwrap();
        assert_eq!(config.planner.radius, 3);
        assert_eq!(
            config.export_formats().unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Json]
        );
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config = Config::from_toml_str(
            r#"
            [grid]
            rows = 4
            seed = 9

            [output]
            formats = ["csv", "json", "csv"]
            "#,
        )
        .unwrap();
        assert_eq!(config.grid.rows, 4);
        assert_eq!(config.grid.cols, 10);
        assert_eq!(config.grid.seed, Some(9));
        assert_eq!(config.planner.radius, 3);
        assert_eq!(
            config.export_formats().unwrap(),
            vec![ExportFormat::Csv, ExportFormat::Json]
        );
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config::default();
        config.grid.rows = 0;
        assert!(config.validate().unwrap_err().is_invalid_argument());

        let mut config = Config::default();
        config.grid.block_coverage = 1.2;
        assert!(matches!(
            config.validate(),
            Err(CoverageError::InvalidCoverage(_))
        ));

        let mut config = Config::default();
        config.planner.radius = -2;
        assert!(matches!(
            config.validate(),
            Err(CoverageError::InvalidRadius(-2))
        ));

        let mut config = Config::default();
        config.output.cell_px = 2;
        assert!(matches!(config.validate(), Err(CoverageError::Config(_))));

        let mut config = Config::default();
        config.output.formats = vec!["xml".to_string()];
        assert!(matches!(config.validate(), Err(CoverageError::Config(_))));
    }

    #[test]
    fn test_map_file_allows_zero_dimensions() {
        let mut config = Config::default();
        config.grid.rows = 0;
        config.grid.map_file = Some(PathBuf::from("city.txt"));
        config.validate().unwrap();
    }

    #[test]
    fn test_load_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.toml");
        fs::write(&path, "[planner]\nradius = 5\n").unwrap();

        let config = Config::load_from_file(&path).unwrap();
        assert_eq!(config.planner.radius, 5);
    }

    #[test]
    fn test_load_from_file_errors() {
        let temp_dir = TempDir::new().unwrap();
        let missing = temp_dir.path().join("missing.toml");
        let err = Config::load_from_file(&missing).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));

        let broken = temp_dir.path().join("broken.toml");
        fs::write(&broken, "[planner\nradius = ").unwrap();
        let err = Config::load_from_file(&broken).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));

        let invalid = temp_dir.path().join("invalid.toml");
        fs::write(&invalid, "[planner]\nradius = -1\n").unwrap();
        assert!(Config::load_from_file(&invalid).is_err());
    }

    #[test]
    fn test_load_or_default_missing_file() {
        let temp_dir = TempDir::new().unwrap();
        let config = Config::load_or_default(&temp_dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_overrides_take_precedence_over_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("run.toml");
        fs::write(
            &path,
            "[grid]\nrows = 6\ncols = 7\nseed = 1\n\n[planner]\nradius = 2\n\n[output]\nrender = true\n",
        )
        .unwrap();

        let mut config = Config::load_or_default(&path).unwrap();
        config.apply_overrides(&ConfigOverrides {
            cols: Some(12),
            seed: Some(99),
            radius: Some(4),
            output_dir: Some("out".to_string()),
            no_render: true,
            ..Default::default()
        });

        // unset fields keep the file values
        assert_eq!(config.grid.rows, 6);
        assert_eq!(config.grid.cols, 12);
        assert_eq!(config.grid.seed, Some(99));
        assert_eq!(config.grid.map_file, None);
        assert_eq!(config.planner.radius, 4);
        assert_eq!(config.output.output_dir, "out");
        assert!(!config.output.render);
        config.validate().unwrap();
    }

    #[test]
    fn test_empty_overrides_change_nothing() {
        let mut config = Config::default();
        config.grid.block_coverage = 0.5;
        let before = config.clone();
        config.apply_overrides(&ConfigOverrides::default());
        assert_eq!(config, before);
    }

    #[test]
    fn test_overridden_values_are_revalidated() {
        let mut config = Config::default();
        config.apply_overrides(&ConfigOverrides {
            radius: Some(-3),
            ..Default::default()
        });
        assert!(matches!(
            config.validate(),
            Err(CoverageError::InvalidRadius(-3))
        ));
    }

    // All environment cases share one test so they do not race on the variable.
    #[test]
    fn test_apply_env() {
        let orig_output_dir = env::var(ENV_OUTPUT_DIR).ok();
        let temp_dir = TempDir::new().unwrap();

        unsafe {
            env::remove_var(ENV_OUTPUT_DIR);
        }
        let mut config = Config::default();
        config.apply_env().unwrap();
        assert_eq!(config.output.output_dir, "figs");

        unsafe {
            env::set_var(ENV_OUTPUT_DIR, "   \t ");
        }
        config.apply_env().unwrap();
        assert_eq!(config.output.output_dir, "figs");

        let dir = temp_dir.path().to_string_lossy().to_string();
        unsafe {
            env::set_var(ENV_OUTPUT_DIR, &dir);
        }
        config.apply_env().unwrap();
        assert_eq!(config.output.output_dir, dir);

        let file = temp_dir.path().join("not_a_dir");
        fs::write(&file, "x").unwrap();
        unsafe {
            env::set_var(ENV_OUTPUT_DIR, &file);
        }
        assert!(Config::default().apply_env().is_err());

        // Cleanup
        unsafe {
            env::remove_var(ENV_OUTPUT_DIR);
            if let Some(value) = orig_output_dir {
                env::set_var(ENV_OUTPUT_DIR, value);
            }
        }
    }
}
