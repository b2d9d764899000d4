//! Output formatting module

use anyhow::Result;
use chrono::{DateTime, Utc};
use clap::ValueEnum;
use console::{measure_text_width, pad_str, Alignment};
use owo_colors::OwoColorize;
use serde::Serialize;

/// Output format for list and info commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Aligned, colored tables
    #[default]
    Table,
    /// The API result as pretty-printed JSON
    Json,
}

const COLUMN_GAP: usize = 3;

/// Print as pretty JSON
pub fn print_json_pretty<T: Serialize>(data: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(data)?);
    Ok(())
}

/// Print success message
pub fn success(msg: &str) {
    println!("{} {}", "✓".green().bold(), msg);
}

/// Print error message
pub fn error(msg: &str) {
    eprintln!("{} {}", "✗".red().bold(), msg);
}

/// Print warning message
pub fn warning(msg: &str) {
    eprintln!("{} {}", "⚠".yellow().bold(), msg);
}

/// Print info message
pub fn info(msg: &str) {
    println!("{} {}", "ℹ".blue().bold(), msg);
}

/// Column-aligned table. Widths ignore ANSI color codes.
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: &[&str]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    pub fn row(&mut self, cells: Vec<String>) {
        self.rows.push(cells);
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths: Vec<usize> = self.headers.iter().map(|h| measure_text_width(h)).collect();
        for row in &self.rows {
            for (i, cell) in row.iter().enumerate() {
                let w = measure_text_width(cell);
                match widths.get_mut(i) {
                    Some(current) => *current = (*current).max(w),
                    None => widths.push(w),
                }
            }
        }
        widths
    }

    /// Render to lines; the last column is never padded
    pub fn render(&self) -> Vec<String> {
        let widths = self.widths();
        let format_line = |cells: &[String]| -> String {
            let mut line = String::new();
            for (i, cell) in cells.iter().enumerate() {
                if i + 1 == cells.len() {
                    line.push_str(cell);
                } else {
                    let width = widths[i] + COLUMN_GAP;
                    line.push_str(&pad_str(cell, width, Alignment::Left, None));
                }
            }
            line
        };

        let header: Vec<String> = self
            .headers
            .iter()
            .map(|h| h.bold().underline().to_string())
            .collect();

        let mut lines = vec![format_line(&header)];
        lines.extend(self.rows.iter().map(|row| format_line(row)));
        lines
    }

    pub fn print(&self) {
        for line in self.render() {
            println!("{}", line);
        }
    }
}

/// Print an indented `label: value` block under a title
pub fn print_details(title: &str, fields: &[(&str, String)]) {
    println!("{}", title.bold());
    let width = fields
        .iter()
        .map(|(label, _)| label.len() + 1)
        .max()
        .unwrap_or(0);
    for (label, value) in fields {
        let label = format!("{}:", label);
        println!("  {:<width$}  {}", label, value, width = width);
    }
}

/// Print a titled bullet list, or `empty` when there is nothing to list
pub fn print_list(title: &str, items: &[String], empty: &str) {
    println!();
    println!("{}", title.bold());
    if items.is_empty() {
        println!("  {}", empty.dimmed());
    }
    for item in items {
        println!("  - {}", item);
    }
}

/// Shorten `s` to `max` characters, ending in `...` when cut
pub fn truncate(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let kept: String = s.chars().take(max.saturating_sub(3)).collect();
    format!("{}...", kept)
}

/// Reformat an RFC 3339 timestamp with `fmt`; unparsable input is returned as is
pub fn format_timestamp(raw: Option<&str>, fmt: &str) -> String {
    match raw {
        None | Some("") => "-".to_string(),
        Some(s) => DateTime::parse_from_rfc3339(s)
            .map(|dt| dt.with_timezone(&Utc).format(fmt).to_string())
            .unwrap_or_else(|_| s.to_string()),
    }
}

pub const DATE: &str = "%Y-%m-%d";
pub const DATE_TIME: &str = "%Y-%m-%d %H:%M:%S";

pub fn check_mark(value: bool) -> String {
    if value {
        "✓".green().to_string()
    } else {
        "✗".red().to_string()
    }
}

/// Color a zone/deployment status
pub fn status(status: &str) -> String {
    match status {
        "active" | "success" => status.green().to_string(),
        "pending" | "initializing" | "idle" => status.yellow().to_string(),
        "moved" | "deleted" | "failure" | "canceled" => status.red().to_string(),
        _ => status.to_string(),
    }
}
