//! Rendering of command results.
//!
//! Results go to stdout, status lines to stderr, so `--format json`
//! output can be piped.

use chrono::{DateTime, Utc};
use serde::Serialize;
use tabled::settings::Style;
use tabled::{Table, Tabled};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Aligned columns.
    #[default]
    Table,
    /// Pretty-printed JSON.
    Json,
}

/// Rows as a table, or the same rows as a JSON array.
pub fn print_list<T: Serialize + Tabled>(rows: &[T], format: OutputFormat) {
    if format == OutputFormat::Json {
        return emit_json(rows);
    }
    if rows.is_empty() {
        println!("Nothing to show.");
        return;
    }

    let mut table = Table::new(rows);
    table.with(Style::sharp());
    println!("{table}");
}

/// A single resource. Table mode prints the labelled `fields`; JSON mode
/// prints the whole `item`.
pub fn print_record<T: Serialize>(fields: &[(&str, String)], item: &T, format: OutputFormat) {
    match format {
        OutputFormat::Json => emit_json(item),
        OutputFormat::Table => {
            let width = fields.iter().map(|(label, _)| label.len()).max().unwrap_or(0) + 1;
            for (label, value) in fields {
                println!("{:<width$} {value}", format!("{label}:"));
            }
        }
    }
}

fn emit_json<T: Serialize + ?Sized>(value: &T) {
    match serde_json::to_string_pretty(value) {
        Ok(text) => println!("{text}"),
        Err(e) => print_error(&format!("could not render JSON: {e}")),
    }
}

pub fn print_success(msg: &str) {
    eprintln!("ok: {msg}");
}

pub fn print_warning(msg: &str) {
    eprintln!("warning: {msg}");
}

pub fn print_error(msg: &str) {
    eprintln!("error: {msg}");
}

/// Prices are shown with two decimals.
pub fn money(amount: f64) -> String {
    format!("{amount:.2}")
}

/// Minute-precision UTC timestamp for table cells.
pub fn timestamp(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M").to_string()
}
