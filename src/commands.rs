// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Implementations of the file subcommands.
//!
//! Files are read and parsed in parallel; each parse owns its own lexer
//! and parser, so nothing is shared between workers. Output is printed in
//! the order the files were given.

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use ballast_syntax::lexer::Scanner;
use ballast_syntax::{FragmentKind, LineIndex, Severity, SyntaxNode, parse_fragment};
use rayon::prelude::*;
use tracing::{debug, info};

use crate::cli::{FilesArgs, ParseArgs, TokensArgs};
use crate::config::Config;
use crate::error::{CliError, Result};
use crate::output::{self, Painter};

/// A source file and its tree.
pub struct ParsedFile {
    pub path: PathBuf,
    pub source: String,
    pub tree: SyntaxNode,
}

impl ParsedFile {
    fn name(&self) -> String {
        self.path.display().to_string()
    }

    fn error_count(&self) -> usize {
        self.tree
            .diagnostics()
            .iter()
            .filter(|diagnostic| diagnostic.severity() == Severity::Error)
            .count()
    }
}

fn read_source(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| CliError::read(path, e))
}

/// Reads and parses every file in parallel, keeping input order.
pub fn parse_files(paths: &[PathBuf], fragment: FragmentKind) -> Vec<Result<ParsedFile>> {
    paths
        .par_iter()
        .map(|path| {
            let source = read_source(path)?;
            let tree = parse_fragment(&source, fragment);
            debug!(path = %path.display(), bytes = source.len(), "parsed");
            Ok(ParsedFile {
                path: path.clone(),
                source,
                tree,
            })
        })
        .collect()
}

/// Reports unreadable files on stderr; returns the readable ones and whether
/// any failed.
fn split_failures(results: Vec<Result<ParsedFile>>, painter: Painter) -> (Vec<ParsedFile>, bool) {
    let mut parsed = Vec::with_capacity(results.len());
    let mut failed = false;
    for result in results {
        match result {
            Ok(file) => parsed.push(file),
            Err(e) => {
                eprintln!("{}: {e}", painter.error("error"));
                failed = true;
            }
        }
    }
    (parsed, failed)
}

fn exit_code(success: bool) -> ExitCode {
    if success { ExitCode::SUCCESS } else { ExitCode::FAILURE }
}

/// `ballast parse`: tree dump, optionally followed by diagnostics.
pub fn parse(args: &ParseArgs, config: &Config, painter: Painter) -> ExitCode {
    let (files, failed) = split_failures(parse_files(&args.files.files, args.files.fragment), painter);
    let show_diagnostics = config.show_diagnostics && !args.no_diagnostics;
    let multiple = files.len() > 1 || failed;
    for file in &files {
        if multiple {
            println!("{}", painter.path(&format!("==> {} <==", file.name())));
        }
        print!("{}", output::render_tree(&file.tree, painter));
        if show_diagnostics {
            eprint!(
                "{}",
                output::render_diagnostics(&file.name(), &file.source, &file.tree.diagnostics(), painter)
            );
        }
    }
    exit_code(!failed)
}

/// `ballast check`: diagnostics only; fails when any file has an error.
pub fn check(args: &FilesArgs, painter: Painter) -> ExitCode {
    let (files, failed) = split_failures(parse_files(&args.files, args.fragment), painter);
    let mut errors = 0;
    for file in &files {
        print!(
            "{}",
            output::render_diagnostics(&file.name(), &file.source, &file.tree.diagnostics(), painter)
        );
        errors += file.error_count();
    }
    info!(files = files.len(), errors, "check finished");
    if errors == 0 && !failed {
        println!("{} {} file(s) checked", painter.ok("ok:"), files.len());
    } else {
        println!("{} error(s) in {} file(s)", errors, files.len());
    }
    exit_code(errors == 0 && !failed)
}

/// `ballast tokens`: the lexer's view of one file.
pub fn tokens(args: &TokensArgs, config: &Config, painter: Painter) -> Result<ExitCode> {
    let source = read_source(&args.file)?;
    let index = LineIndex::new(&source);
    let trivia = args.trivia || config.show_trivia;
    for token in Scanner::new(&source) {
        println!("{}", output::render_token(&token, &index, &source, trivia, painter));
    }
    Ok(ExitCode::SUCCESS)
}

/// `ballast roundtrip`: every tree must print back to its exact source.
pub fn roundtrip(args: &FilesArgs, painter: Painter) -> ExitCode {
    let (files, failed) = split_failures(parse_files(&args.files, args.fragment), painter);
    let mut mismatched = 0;
    for file in &files {
        let printed = file.tree.to_source_string();
        if printed == file.source {
            println!("{} {}", painter.ok("ok"), file.name());
        } else {
            mismatched += 1;
            let at = first_difference(&printed, &file.source);
            println!("{} {} (differs at byte {at})", painter.error("mismatch"), file.name());
        }
    }
    exit_code(mismatched == 0 && !failed)
}

fn first_difference(a: &str, b: &str) -> usize {
    a.bytes()
        .zip(b.bytes())
        .position(|(x, y)| x != y)
        .unwrap_or_else(|| a.len().min(b.len()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn test_parse_files_keeps_order() {
        let dir = tempfile::tempdir().unwrap();
        let paths: Vec<PathBuf> = (0..8)
            .map(|i| {
                let path = dir.path().join(format!("m{i}.bal"));
                fs::write(&path, format!("int v{i} = {i};\n")).unwrap();
                path
            })
            .collect();
        let results = parse_files(&paths, FragmentKind::CompilationUnit);
        for (i, result) in results.into_iter().enumerate() {
            let file = result.unwrap();
            assert_eq!(file.path, paths[i]);
            assert_eq!(file.tree.to_source_string(), file.source);
            assert_eq!(file.error_count(), 0);
        }
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let results = parse_files(&[PathBuf::from("does/not/exist.bal")], FragmentKind::CompilationUnit);
        assert!(matches!(results[0], Err(CliError::Read { .. })));
    }

    #[test]
    fn test_first_difference() {
        assert_eq!(first_difference("abc", "abd"), 2);
        assert_eq!(first_difference("ab", "abc"), 2);
    }
}
