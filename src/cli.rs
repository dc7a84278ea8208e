// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! CLI argument parsing for ballast.

use std::path::PathBuf;

use ballast_syntax::FragmentKind;
use clap::{Args, Parser, Subcommand};

use crate::config::ColorChoice;

/// ballast - error-tolerant parser for Ballerina-style sources
#[derive(Parser, Debug)]
#[command(name = "ballast")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose logging (same as RUST_LOG=debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Config file to use instead of ballast.toml
    #[arg(long, global = true, env = "BALLAST_CONFIG")]
    pub config: Option<PathBuf>,

    /// When to use colors
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the syntax tree of each file
    #[command(alias = "p")]
    Parse(ParseArgs),

    /// Report diagnostics with line and column
    #[command(alias = "c")]
    Check(FilesArgs),

    /// Print the token stream of a file
    #[command(alias = "t")]
    Tokens(TokensArgs),

    /// Verify that each tree reproduces its source exactly
    Roundtrip(FilesArgs),

    /// Start the interactive parser shell
    Repl(ReplArgs),
}

#[derive(Args, Debug)]
pub struct FilesArgs {
    /// Source files
    #[arg(required = true)]
    pub files: Vec<PathBuf>,

    /// Grammar rule to start from
    #[arg(short, long, default_value = "module", value_parser = fragment_kind)]
    pub fragment: FragmentKind,
}

#[derive(Args, Debug)]
pub struct ParseArgs {
    #[command(flatten)]
    pub files: FilesArgs,

    /// Skip the diagnostic listing after each tree
    #[arg(long)]
    pub no_diagnostics: bool,
}

#[derive(Args, Debug)]
pub struct TokensArgs {
    /// Source file
    pub file: PathBuf,

    /// Include trivia attached to each token
    #[arg(long)]
    pub trivia: bool,
}

#[derive(Args, Debug, Default)]
pub struct ReplArgs {
    /// Grammar rule each input is parsed as
    #[arg(short, long, value_parser = fragment_kind)]
    pub fragment: Option<FragmentKind>,
}

/// Accepts the names produced by [`FragmentKind::name`].
pub fn fragment_kind(name: &str) -> Result<FragmentKind, String> {
    FragmentKind::from_name(name).ok_or_else(|| {
        let names: Vec<&str> = FragmentKind::ALL.iter().map(|kind| kind.name()).collect();
        format!("unknown fragment '{name}', expected one of: {}", names.join(", "))
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_fragment_names() {
        assert_eq!(fragment_kind("statement"), Ok(FragmentKind::Statement));
        assert!(fragment_kind("block").unwrap_err().contains("expression"));
    }

    #[test]
    fn test_parse_subcommand() {
        let cli = Cli::try_parse_from(["ballast", "parse", "-f", "declaration", "a.bal", "b.bal"]).unwrap();
        match cli.command {
            Some(Commands::Parse(args)) => {
                assert_eq!(args.files.fragment, FragmentKind::ModuleMember);
                assert_eq!(args.files.files.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_files_required() {
        assert!(Cli::try_parse_from(["ballast", "check"]).is_err());
    }
}
