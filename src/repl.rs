// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Interactive parser shell.
//!
//! Each input is parsed as one fragment and its tree printed. The fragment
//! kind is switched with `.mode`.

use std::borrow::Cow;
use std::path::PathBuf;

use ballast_syntax::syntax::KEYWORDS;
use ballast_syntax::{FragmentKind, parse_fragment};
use owo_colors::OwoColorize;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::history::DefaultHistory;
use rustyline::validate::{ValidationContext, ValidationResult, Validator};
use rustyline::{Config as EditorConfig, Editor, Helper};
use tracing::warn;

use crate::config::Config;
use crate::error::Result;
use crate::output::{self, Painter};

const HISTORY_FILE: &str = "history";

/// REPL commands that can be executed with a dot prefix
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplCommand {
    Help,
    Exit,
    Clear,
    Version,
    Mode,
    Load,
    Source,
}

impl ReplCommand {
    /// Parse a REPL command from input string
    pub fn parse(input: &str) -> Option<(Self, Option<&str>)> {
        let rest = input.trim().strip_prefix('.')?;
        let mut parts = rest.splitn(2, char::is_whitespace);
        let cmd = parts.next()?.to_lowercase();
        let arg = parts.next().map(str::trim).filter(|arg| !arg.is_empty());

        match cmd.as_str() {
            "help" | "h" | "?" => Some((ReplCommand::Help, arg)),
            "exit" | "quit" | "q" => Some((ReplCommand::Exit, arg)),
            "clear" | "cls" => Some((ReplCommand::Clear, arg)),
            "version" | "v" => Some((ReplCommand::Version, arg)),
            "mode" | "m" => Some((ReplCommand::Mode, arg)),
            "load" | "l" => Some((ReplCommand::Load, arg)),
            "source" | "s" => Some((ReplCommand::Source, arg)),
            _ => None,
        }
    }

    /// Get all available commands for help/completion
    pub fn all_commands() -> &'static [(&'static str, &'static str)] {
        &[
            (".help", "Show this help message"),
            (".exit", "Exit the REPL"),
            (".clear", "Clear the screen"),
            (".version", "Show version information"),
            (".mode [kind]", "Show or set the fragment kind"),
            (".load <file>", "Parse a file as a module"),
            (".source", "Toggle printing the reconstructed source"),
        ]
    }
}

/// Completion, hints, highlighting and multi-line validation.
struct BallastHelper {
    words: Vec<String>,
    color: bool,
}

impl BallastHelper {
    fn new(color: bool) -> Self {
        let mut words: Vec<String> = KEYWORDS.iter().map(|(text, _)| text.to_string()).collect();
        words.extend(ReplCommand::all_commands().iter().map(|(cmd, _)| {
            cmd.split_whitespace().next().unwrap_or(cmd).to_string()
        }));
        words.extend(FragmentKind::ALL.iter().map(|kind| kind.name().to_string()));
        words.sort();
        words.dedup();
        Self { words, color }
    }

    fn word_start(line: &str) -> usize {
        line.rfind(|c: char| !c.is_alphanumeric() && c != '_' && c != '.')
            .map(|i| i + 1)
            .unwrap_or(0)
    }
}

impl Completer for BallastHelper {
    type Candidate = Pair;

    fn complete(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> rustyline::Result<(usize, Vec<Pair>)> {
        let start = Self::word_start(&line[..pos]);
        let word = &line[start..pos];
        if word.is_empty() {
            return Ok((pos, vec![]));
        }

        let matches = self
            .words
            .iter()
            .filter(|candidate| candidate.starts_with(word))
            .map(|candidate| Pair {
                display: candidate.clone(),
                replacement: candidate[word.len()..].to_string(),
            })
            .collect();

        Ok((pos, matches))
    }
}

impl Hinter for BallastHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, _ctx: &rustyline::Context<'_>) -> Option<Self::Hint> {
        if pos < line.len() {
            return None;
        }
        let word = &line[Self::word_start(line)..];
        if word.len() < 2 {
            return None;
        }
        self.words
            .iter()
            .find(|candidate| candidate.starts_with(word) && candidate.len() > word.len())
            .map(|candidate| candidate[word.len()..].to_string())
    }
}

impl Highlighter for BallastHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        if !self.color || line.trim_start().starts_with('.') {
            return Cow::Borrowed(line);
        }
        let mut result = String::with_capacity(line.len() * 2);
        let mut word = String::new();
        for c in line.chars() {
            if c.is_alphanumeric() || c == '_' {
                word.push(c);
                continue;
            }
            if !word.is_empty() {
                result.push_str(&highlight_word(&word));
                word.clear();
            }
            match c {
                '(' | ')' | '[' | ']' | '{' | '}' => result.push_str(&c.yellow().to_string()),
                '+' | '-' | '*' | '/' | '%' | '=' | '<' | '>' | '!' | '&' | '|' | '^' | '?' => {
                    result.push_str(&c.cyan().to_string())
                }
                _ => result.push(c),
            }
        }
        if !word.is_empty() {
            result.push_str(&highlight_word(&word));
        }
        Cow::Owned(result)
    }

    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        if self.color {
            Cow::Owned(hint.dimmed().to_string())
        } else {
            Cow::Borrowed(hint)
        }
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _forced: bool) -> bool {
        self.color
    }
}

fn highlight_word(word: &str) -> String {
    if KEYWORDS.iter().any(|(text, _)| *text == word) {
        word.magenta().bold().to_string()
    } else if word.chars().all(|c| c.is_ascii_digit()) {
        word.yellow().to_string()
    } else {
        word.to_string()
    }
}

impl Validator for BallastHelper {
    fn validate(&self, ctx: &mut ValidationContext<'_>) -> rustyline::Result<ValidationResult> {
        let input = ctx.input();
        if input.trim_start().starts_with('.') || is_balanced(input) {
            Ok(ValidationResult::Valid(None))
        } else {
            Ok(ValidationResult::Incomplete)
        }
    }
}

impl Helper for BallastHelper {}

/// Check if brackets, braces, and parentheses are balanced
fn is_balanced(input: &str) -> bool {
    let mut stack = Vec::new();
    let mut in_string = false;
    let mut escape_next = false;
    let mut in_comment = false;
    let mut prev = '\0';

    for c in input.chars() {
        let after_slash = prev == '/';
        prev = c;
        if in_comment {
            in_comment = c != '\n';
            continue;
        }
        if escape_next {
            escape_next = false;
            continue;
        }
        if in_string {
            match c {
                '\\' => escape_next = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }
        match c {
            '"' => in_string = true,
            '/' if after_slash => in_comment = true,
            '#' => in_comment = true,
            '(' => stack.push(')'),
            '[' => stack.push(']'),
            '{' => stack.push('}'),
            ')' | ']' | '}' => {
                // Let the parser report a stray closer
                if stack.pop() != Some(c) {
                    return true;
                }
            }
            _ => {}
        }
    }

    stack.is_empty() && !in_string
}

/// Result of executing a REPL command
enum CommandResult {
    Continue,
    Exit,
}

/// The interactive shell.
pub struct Repl {
    editor: Editor<BallastHelper, DefaultHistory>,
    history_path: Option<PathBuf>,
    fragment: FragmentKind,
    painter: Painter,
    show_diagnostics: bool,
    show_source: bool,
}

impl Repl {
    /// Create a new REPL instance
    pub fn new(config: &Config, fragment: FragmentKind, color: bool) -> Result<Self> {
        let editor_config = EditorConfig::builder()
            .history_ignore_dups(true)?
            .history_ignore_space(true)
            .max_history_size(config.history_size)?
            .auto_add_history(true)
            .build();

        let mut editor = Editor::with_config(editor_config)?;
        editor.set_helper(Some(BallastHelper::new(color)));

        let history_path = dirs::data_local_dir().map(|dir| dir.join("ballast").join(HISTORY_FILE));
        if let Some(path) = &history_path {
            if let Some(parent) = path.parent() {
                if let Err(e) = std::fs::create_dir_all(parent) {
                    warn!(error = %e, "cannot create history directory");
                }
            }
            // A missing history file is normal on first start
            let _ = editor.load_history(path);
        }

        Ok(Self {
            editor,
            history_path,
            fragment,
            painter: Painter::new(color),
            show_diagnostics: config.show_diagnostics,
            show_source: false,
        })
    }

    /// Run the REPL main loop
    pub fn run(&mut self) -> Result<()> {
        self.print_banner();

        loop {
            let prompt = self.prompt();
            match self.editor.readline(&prompt) {
                Ok(line) => {
                    let trimmed = line.trim();
                    if trimmed.is_empty() {
                        continue;
                    }
                    if let Some((cmd, arg)) = ReplCommand::parse(trimmed) {
                        match self.execute_command(cmd, arg) {
                            CommandResult::Continue => continue,
                            CommandResult::Exit => break,
                        }
                    }
                    self.parse_and_print(&line, self.fragment, "<input>");
                }
                Err(ReadlineError::Interrupted) => {
                    println!("{}", self.painter.dim("^C"));
                }
                Err(ReadlineError::Eof) => break,
                Err(err) => return Err(err.into()),
            }
        }

        if let Some(path) = &self.history_path {
            if let Err(e) = self.editor.save_history(path) {
                warn!(error = %e, "cannot save history");
            }
        }
        Ok(())
    }

    fn prompt(&self) -> String {
        let text = format!("ballast[{}]>", self.fragment);
        format!("{} ", self.painter.ok(&text))
    }

    fn print_banner(&self) {
        println!(
            "{} {} {}",
            self.painter.path("ballast"),
            env!("CARGO_PKG_VERSION"),
            self.painter.dim("error-tolerant parser shell")
        );
        println!(
            "{} {} {}",
            self.painter.dim("Type"),
            self.painter.node(".help"),
            self.painter.dim("for available commands")
        );
    }

    fn execute_command(&mut self, cmd: ReplCommand, arg: Option<&str>) -> CommandResult {
        match cmd {
            ReplCommand::Help => self.print_help(),
            ReplCommand::Exit => return CommandResult::Exit,
            ReplCommand::Clear => print!("\x1B[2J\x1B[H"),
            ReplCommand::Version => println!("ballast {}", env!("CARGO_PKG_VERSION")),
            ReplCommand::Mode => match arg {
                None => println!("{}", self.fragment),
                Some(name) => match crate::cli::fragment_kind(name) {
                    Ok(kind) => self.fragment = kind,
                    Err(message) => eprintln!("{}: {message}", self.painter.error("error")),
                },
            },
            ReplCommand::Load => match arg {
                Some(path) => match std::fs::read_to_string(path) {
                    Ok(source) => self.parse_and_print(&source, FragmentKind::CompilationUnit, path),
                    Err(e) => eprintln!("{}: cannot read {path}: {e}", self.painter.error("error")),
                },
                None => eprintln!("{}: .load requires a file path", self.painter.error("error")),
            },
            ReplCommand::Source => {
                self.show_source = !self.show_source;
                println!("source echo {}", if self.show_source { "on" } else { "off" });
            }
        }
        CommandResult::Continue
    }

    fn print_help(&self) {
        println!("{}", self.painter.path("REPL Commands:"));
        for (cmd, desc) in ReplCommand::all_commands() {
            println!("  {:16} {}", cmd, self.painter.dim(desc));
        }
        let names: Vec<&str> = FragmentKind::ALL.iter().map(|kind| kind.name()).collect();
        println!("{} {}", self.painter.path("Fragment kinds:"), names.join(", "));
    }

    fn parse_and_print(&self, source: &str, kind: FragmentKind, name: &str) {
        let tree = parse_fragment(source, kind);
        print!("{}", output::render_tree(&tree, self.painter));
        if self.show_source {
            println!("{}", self.painter.dim(&tree.to_source_string()));
        }
        if self.show_diagnostics {
            print!(
                "{}",
                output::render_diagnostics(name, source, &tree.diagnostics(), self.painter)
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repl_command_parse() {
        assert!(matches!(ReplCommand::parse(".help"), Some((ReplCommand::Help, None))));
        assert!(matches!(ReplCommand::parse(".exit"), Some((ReplCommand::Exit, None))));
        assert!(matches!(
            ReplCommand::parse(".mode  expression "),
            Some((ReplCommand::Mode, Some("expression")))
        ));
        assert!(matches!(
            ReplCommand::parse(".load main.bal"),
            Some((ReplCommand::Load, Some("main.bal")))
        ));
        assert!(ReplCommand::parse("int x = 1;").is_none());
        assert!(ReplCommand::parse(".bogus").is_none());
    }

    #[test]
    fn test_is_balanced() {
        assert!(is_balanced("foo(1, 2);"));
        assert!(is_balanced("record { int a; }"));
        assert!(!is_balanced("function f() {"));
        assert!(!is_balanced("[1, 2"));
        assert!(is_balanced("\"string with ( inside\""));
        assert!(is_balanced("x = 1; // (not counted"));
        assert!(is_balanced(")"));
    }

    #[test]
    fn test_completion_words() {
        let helper = BallastHelper::new(false);
        assert!(helper.words.iter().any(|w| w == "function"));
        assert!(helper.words.iter().any(|w| w == ".mode"));
        assert!(helper.words.iter().any(|w| w == "expression"));
    }
}
