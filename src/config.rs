//! Configuration handling for duet.
//!
//! Settings come from `duet.toml` in the working directory (or the file
//! given with `--config`), then command-line flags override them. A missing
//! file means defaults; unknown keys are an error.

use std::fs;
use std::path::{Path, PathBuf};

use duet_core::NodeKind;
use serde::{Deserialize, Serialize};

use crate::error::DuetError;
use crate::lint::Rule;

/// File name looked up in the working directory.
pub const CONFIG_FILE: &str = "duet.toml";

/// duet configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub lint: LintConfig,

    #[serde(default)]
    pub outline: OutlineConfig,
}

/// `[lint]` settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LintConfig {
    /// Deepest allowed statement nesting inside a function.
    #[serde(default = "default_max_depth")]
    pub max_depth: usize,

    /// Rules that never report.
    #[serde(default)]
    pub disabled: Vec<Rule>,
}

/// `[outline]` settings
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutlineConfig {
    /// Kinds rendered without their children.
    #[serde(default)]
    pub collapse: Vec<NodeKind>,
}

fn default_max_depth() -> usize {
    5
}

impl Default for LintConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            disabled: Vec::new(),
        }
    }
}

impl LintConfig {
    pub fn is_enabled(&self, rule: Rule) -> bool {
        !self.disabled.contains(&rule)
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub max_depth: Option<usize>,
    pub disabled: Vec<Rule>,
    pub collapse: Vec<NodeKind>,
}

impl Config {
    /// Load configuration from a file
    pub fn load(path: &Path) -> Result<Self, DuetError> {
        let content = fs::read_to_string(path).map_err(|e| DuetError::config(path, e))?;
        Self::parse(path, &content)
    }

    /// Parse configuration text; `path` only labels errors.
    pub fn parse(path: &Path, content: &str) -> Result<Self, DuetError> {
        let config: Config = toml::from_str(content).map_err(|e| DuetError::config(path, e))?;
        if config.lint.max_depth == 0 {
            return Err(DuetError::config(path, "lint.max_depth must be at least 1"));
        }
        Ok(config)
    }

    /// `explicit` if given (it must exist), else `duet.toml` in `dir` if
    /// present, else defaults.
    pub fn resolve(explicit: Option<&Path>, dir: &Path) -> Result<Self, DuetError> {
        match explicit {
            Some(path) => Self::load(path),
            None => {
                let path: PathBuf = dir.join(CONFIG_FILE);
                if path.is_file() {
                    Self::load(&path)
                } else {
                    Ok(Config::default())
                }
            }
        }
    }

    /// Apply command-line overrides.
    pub fn with_overrides(mut self, overrides: CliOverrides) -> Result<Self, DuetError> {
        if let Some(max_depth) = overrides.max_depth {
            if max_depth == 0 {
                return Err(DuetError::invalid_args("--max-depth must be at least 1"));
            }
            self.lint.max_depth = max_depth;
        }
        for rule in overrides.disabled {
            if !self.lint.disabled.contains(&rule) {
                self.lint.disabled.push(rule);
            }
        }
        for kind in overrides.collapse {
            if !self.outline.collapse.contains(&kind) {
                self.outline.collapse.push(kind);
            }
        }
        Ok(self)
    }
}
