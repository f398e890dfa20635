use crate::menu::{Interface, StatusReport};
use crate::normalize::Normalizer;
use crate::wordbank::{DEFAULT_DICTIONARY, Encoding};
use clap::Parser;
use std::io::{BufRead, Write};
use std::path::PathBuf;

const DISPLAY_COLUMNS: usize = 8;
const SHORT_LIST: usize = 20;
const SEPARATOR_WIDTH: usize = 80;

/// Narrow a word list down with composable, optionally fuzzy filters
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Newline-delimited dictionary to load (repeatable)
    #[arg(short = 'd', long = "dict", default_value = DEFAULT_DICTIONARY)]
    pub dictionaries: Vec<PathBuf>,

    /// How dictionary entries are normalized
    #[arg(short = 'n', long, value_enum, default_value_t = Normalizer::Ascii)]
    pub normalizer: Normalizer,

    /// Character encoding of the dictionary files
    #[arg(long, value_enum, default_value_t = Encoding::Utf8)]
    pub encoding: Encoding,

    /// Deviations allowed in the default group
    #[arg(short = 'e', long = "errors", default_value_t = 0)]
    pub default_budget: usize,

    /// Line-based menu on stdin/stdout instead of the terminal UI
    #[arg(long)]
    pub plain: bool,

    /// Start with filter evaluation switched off
    #[arg(long)]
    pub no_eval: bool,

    /// Log level for the log file (overridden by RUST_LOG)
    #[arg(long, default_value = "info")]
    pub log_level: log::LevelFilter,
}

#[must_use]
pub fn parse_cli() -> Cli {
    Cli::parse()
}

fn separator() -> String {
    "-".repeat(SEPARATOR_WIDTH)
}

/// Short lists one per line, long lists in tab-separated columns.
#[must_use]
pub fn format_candidates(candidates: &[String]) -> String {
    if candidates.is_empty() {
        return "***NO ENTRY MATCHES THE FILTERS***\n".to_string();
    }
    if candidates.len() <= SHORT_LIST {
        return candidates.iter().map(|w| format!("{w}\n")).collect();
    }
    let mut out = String::new();
    for row in candidates.chunks(DISPLAY_COLUMNS) {
        out.push_str(&row.join("\t\t\t"));
        out.push('\n');
    }
    out
}

/// Line-based frontend over any reader and writer.
pub struct CliInterface<R: BufRead, W: Write> {
    reader: R,
    writer: W,
}

impl<R: BufRead, W: Write> CliInterface<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    pub fn into_writer(self) -> W {
        self.writer
    }

    // Output errors on a terminal are not actionable; keep the session going.
    fn emit(&mut self, text: &str) {
        if let Err(e) = self.writer.write_all(text.as_bytes()).and_then(|()| self.writer.flush()) {
            log::warn!("Failed to write output: {e}");
        }
    }
}

impl<R: BufRead, W: Write> Interface for CliInterface<R, W> {
    fn display_status(&mut self, report: &StatusReport, menu: &[String]) {
        let mut text = format!("\n{}\n\t\t\t *** STATUS ***\n{}\n", separator(), separator());
        for line in report.lines() {
            text.push_str(&line);
            text.push('\n');
        }
        text.push_str(&separator());
        text.push_str("\n\n");
        for line in menu {
            text.push_str(line);
            text.push('\n');
        }
        self.emit(&text);
    }

    fn read_line(&mut self, prompt: &str) -> Option<String> {
        self.emit(prompt);
        let mut input = String::new();
        match self.reader.read_line(&mut input) {
            Ok(0) => None,
            Ok(_) => Some(input.trim_end_matches(['\n', '\r']).to_string()),
            Err(e) => {
                log::warn!("Failed to read input: {e}");
                None
            }
        }
    }

    fn display_candidates(&mut self, title: &str, candidates: &[String]) {
        let text = format!("{title} ({}):\n{}", candidates.len(), format_candidates(candidates));
        self.emit(&text);
    }

    fn display_message(&mut self, message: &str) {
        self.emit(&format!("{message}\n"));
    }

    fn display_error(&mut self, message: &str) {
        self.emit(&format!("{message}\n"));
    }
}
