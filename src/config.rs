// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Configuration for the ballast CLI.
//!
//! Settings are layered: built-in defaults, then `ballast.toml` (explicit
//! path, working directory, or the user config directory), then the
//! `BALLAST_*` environment variables, then command line flags.

use std::io::IsTerminal;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CliError, Result};

/// Name of the config file looked up in the working and config directories.
pub const CONFIG_FILE: &str = "ballast.toml";

/// When to emit ANSI colors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ColorChoice {
    /// Color when stdout is a terminal
    #[default]
    Auto,
    Always,
    Never,
}

impl ColorChoice {
    fn from_env(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "auto" => Some(ColorChoice::Auto),
            "always" | "1" | "true" | "yes" => Some(ColorChoice::Always),
            "never" | "0" | "false" | "no" => Some(ColorChoice::Never),
            _ => None,
        }
    }

    /// Resolves `Auto` against the current stdout.
    pub fn enabled(self) -> bool {
        match self {
            ColorChoice::Auto => std::io::stdout().is_terminal(),
            ColorChoice::Always => true,
            ColorChoice::Never => false,
        }
    }
}

/// Configuration for ballast.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Color output
    pub color: ColorChoice,

    /// Print leading and trailing trivia in token listings
    pub show_trivia: bool,

    /// Print a diagnostic listing after each tree
    pub show_diagnostics: bool,

    /// Maximum number of REPL history entries
    pub history_size: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            color: ColorChoice::Auto,
            show_trivia: false,
            show_diagnostics: true,
            history_size: 1000,
        }
    }
}

impl Config {
    /// Loads the config file, if any, and applies environment overrides.
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let config = match explicit {
            Some(path) => Self::from_file(path)?,
            None => match Self::discover() {
                Some(path) => Self::from_file(&path)?,
                None => Self::default(),
            },
        };
        config.with_env(|key| std::env::var(key).ok())
    }

    /// Parses the config file at `path`.
    pub fn from_file(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))?;
        debug!(path = %path.display(), "loading config");
        Self::from_toml(&text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parses config text. Missing keys keep their defaults.
    pub fn from_toml(text: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    /// First existing config file in the working or user config directory.
    fn discover() -> Option<PathBuf> {
        let local = PathBuf::from(CONFIG_FILE);
        if local.is_file() {
            return Some(local);
        }
        dirs::config_dir()
            .map(|dir| dir.join("ballast").join(CONFIG_FILE))
            .filter(|path| path.is_file())
    }

    /// Applies `BALLAST_COLOR` and `BALLAST_TRIVIA` as read through `lookup`.
    pub fn with_env(mut self, lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        if let Some(value) = lookup("BALLAST_COLOR") {
            self.color = ColorChoice::from_env(&value).ok_or(CliError::Environment {
                key: "BALLAST_COLOR",
                value,
            })?;
        }
        if let Some(value) = lookup("BALLAST_TRIVIA") {
            self.show_trivia = parse_bool(&value).ok_or(CliError::Environment {
                key: "BALLAST_TRIVIA",
                value,
            })?;
        }
        Ok(self)
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_fill_missing_keys() {
        let config = Config::from_toml("show_trivia = true").unwrap();
        assert!(config.show_trivia);
        assert_eq!(config.color, ColorChoice::Auto);
        assert_eq!(config.history_size, 1000);
    }

    #[test]
    fn test_color_names() {
        let config = Config::from_toml("color = \"never\"\nhistory_size = 10").unwrap();
        assert_eq!(config.color, ColorChoice::Never);
        assert_eq!(config.history_size, 10);
        assert!(Config::from_toml("color = \"sometimes\"").is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let config = Config::from_toml("color = \"always\"").unwrap();
        let config = config
            .with_env(|key| match key {
                "BALLAST_COLOR" => Some("never".to_string()),
                "BALLAST_TRIVIA" => Some("1".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.color, ColorChoice::Never);
        assert!(config.show_trivia);
    }

    #[test]
    fn test_bad_env_value() {
        let err = Config::default()
            .with_env(|key| (key == "BALLAST_TRIVIA").then(|| "maybe".to_string()))
            .unwrap_err();
        assert!(matches!(err, CliError::Environment { key: "BALLAST_TRIVIA", .. }));
    }

    #[test]
    fn test_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        std::fs::write(&path, "show_diagnostics = false\n").unwrap();
        let config = Config::from_file(&path).unwrap();
        assert!(!config.show_diagnostics);

        std::fs::write(&path, "show_diagnostics = 3\n").unwrap();
        assert!(matches!(Config::from_file(&path), Err(CliError::Config { .. })));
    }
}
