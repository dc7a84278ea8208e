// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Error types for the ballast command line.

use std::path::PathBuf;

use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Failures outside the parser itself. Syntax errors are never reported
/// through this type.
#[derive(Error, Debug)]
pub enum CliError {
    /// A source or config file could not be read
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Config file is not valid TOML for [`crate::config::Config`]
    #[error("invalid config file {}: {source}", path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    /// An environment override has a value we do not understand
    #[error("invalid value {value:?} for {key}")]
    Environment { key: &'static str, value: String },

    /// Line editor failure
    #[error("line editor error: {0}")]
    Readline(#[from] rustyline::error::ReadlineError),
}

impl CliError {
    pub fn read(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        CliError::Read {
            path: path.into(),
            source,
        }
    }
}
