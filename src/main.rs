// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! ballast - command line front end for the ballast-syntax parser.
//!
//! ## Features
//!
//! - Tree dumps, diagnostics and token listings for source files
//! - Parallel parsing of many files with rayon
//! - Interactive shell with history and fragment selection

mod cli;
mod commands;
mod config;
mod error;
mod output;
mod repl;

use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use cli::{Cli, Commands, ReplArgs};
use config::Config;
use output::Painter;

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}: {e:#}", "error".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli) -> anyhow::Result<ExitCode> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(color) = cli.color {
        config.color = color;
    }
    let color = config.color.enabled();
    let painter = Painter::new(color);

    let code = match &cli.command {
        Some(Commands::Parse(args)) => commands::parse(args, &config, painter),
        Some(Commands::Check(args)) => commands::check(args, painter),
        Some(Commands::Tokens(args)) => commands::tokens(args, &config, painter)?,
        Some(Commands::Roundtrip(args)) => commands::roundtrip(args, painter),
        Some(Commands::Repl(args)) => run_repl(args, &config, color)?,
        None => run_repl(&ReplArgs::default(), &config, color)?,
    };
    Ok(code)
}

fn run_repl(args: &ReplArgs, config: &Config, color: bool) -> anyhow::Result<ExitCode> {
    let fragment = args.fragment.unwrap_or(ballast_syntax::FragmentKind::Statement);
    let mut repl = repl::Repl::new(config, fragment, color).context("failed to initialize REPL")?;
    repl.run()?;
    Ok(ExitCode::SUCCESS)
}
