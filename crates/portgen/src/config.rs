//! Configuration for portgen.
//!
//! Loads config from `.portgen/config.toml` under the project root. Both
//! keys are optional; command-line flags override whatever the file sets.
//!
//! Example config.toml:
//! ```toml
//! input_dir = "third_party/HandmadeMath"
//! output_dir = "src/Numerics/Generated"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

/// Input directory used when neither the config file nor the CLI names one.
pub const DEFAULT_INPUT_DIR: &str = "include";

/// Output directory used when neither the config file nor the CLI names one.
pub const DEFAULT_OUTPUT_DIR: &str = "generated";

/// Root configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct PortgenConfig {
    /// Directory scanned (recursively) for headers.
    pub input_dir: Option<PathBuf>,
    /// Directory the generated C# is written to.
    pub output_dir: Option<PathBuf>,
    /// Directory relative paths are resolved against.
    #[serde(skip)]
    root: PathBuf,
}

impl PortgenConfig {
    /// Load configuration for a project rooted at `root`.
    ///
    /// A missing file yields the defaults. An unreadable or invalid file is
    /// reported and also yields the defaults.
    pub fn load(root: &Path) -> Self {
        let path = Self::config_path(root);
        let mut config = Self::load_file(&path).unwrap_or_default();
        config.root = root.to_path_buf();
        config
    }

    /// Location of the per-project config file.
    pub fn config_path(root: &Path) -> PathBuf {
        root.join(".portgen").join("config.toml")
    }

    fn load_file(path: &Path) -> Option<Self> {
        let content = std::fs::read_to_string(path).ok()?;
        match toml::from_str(&content) {
            Ok(config) => Some(config),
            Err(error) => {
                tracing::warn!(path = %path.display(), %error, "ignoring invalid config");
                None
            }
        }
    }

    /// Apply command-line overrides. `None` keeps the configured value.
    pub fn with_overrides(mut self, input: Option<PathBuf>, output: Option<PathBuf>) -> Self {
        if input.is_some() {
            self.input_dir = input;
        }
        if output.is_some() {
            self.output_dir = output;
        }
        self
    }

    /// Resolved input directory.
    pub fn input_dir(&self) -> PathBuf {
        self.resolve(self.input_dir.as_deref(), DEFAULT_INPUT_DIR)
    }

    /// Resolved output directory.
    pub fn output_dir(&self) -> PathBuf {
        self.resolve(self.output_dir.as_deref(), DEFAULT_OUTPUT_DIR)
    }

    fn resolve(&self, configured: Option<&Path>, default: &str) -> PathBuf {
        // Absolute paths replace the root on join.
        self.root.join(configured.unwrap_or_else(|| Path::new(default)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    fn write_config(dir: &TempDir, body: &str) {
        let config_dir = dir.path().join(".portgen");
        std::fs::create_dir_all(&config_dir).unwrap();
        let mut file = std::fs::File::create(config_dir.join("config.toml")).unwrap();
        writeln!(file, "{body}").unwrap();
    }

    #[test]
    fn test_defaults_without_config_file() {
        let dir = TempDir::new().unwrap();
        let config = PortgenConfig::load(dir.path());
        assert_eq!(config.input_dir(), dir.path().join("include"));
        assert_eq!(config.output_dir(), dir.path().join("generated"));
    }

    #[test]
    fn test_load_project_config() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "input_dir = \"vendor/hmm\"\noutput_dir = \"out\"");
        let config = PortgenConfig::load(dir.path());
        assert_eq!(config.input_dir(), dir.path().join("vendor/hmm"));
        assert_eq!(config.output_dir(), dir.path().join("out"));
    }

    #[test]
    fn test_partial_config() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "output_dir = \"out\"");
        let config = PortgenConfig::load(dir.path());
        assert_eq!(config.input_dir(), dir.path().join("include")); // default
        assert_eq!(config.output_dir(), dir.path().join("out"));
    }

    #[test]
    fn test_invalid_config_falls_back_to_defaults() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "input_dir = [");
        let config = PortgenConfig::load(dir.path());
        assert_eq!(config.input_dir(), dir.path().join("include"));
    }

    #[test]
    fn test_cli_overrides_config() {
        let dir = TempDir::new().unwrap();
        write_config(&dir, "input_dir = \"vendor/hmm\"\noutput_dir = \"out\"");
        let elsewhere = dir.path().join("elsewhere");
        let config = PortgenConfig::load(dir.path()).with_overrides(Some(elsewhere.clone()), None);
        assert_eq!(config.input_dir(), elsewhere);
        assert_eq!(config.output_dir(), dir.path().join("out"));
    }
}
