//! Output and input helpers for the `pdfdesk` binary.

use anyhow::Context;
use clap::ValueEnum;
use pdfdesk_core::models::{is_valid_threshold, FileRecord};
use serde::Serialize;
use std::io::{self, BufRead, Write};

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Table,
    Json,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

/// Initialize tracing for the CLI. Logs go to stderr so stdout stays
/// machine-readable.
pub fn init_tracing(format: LogFormat) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr);
    match format {
        LogFormat::Text => builder.init(),
        LogFormat::Json => builder.json().init(),
    }
}

pub fn print_json(value: &impl Serialize) -> anyhow::Result<()> {
    let out = serde_json::to_string_pretty(value).context("Serialize response")?;
    println!("{}", out);
    Ok(())
}

/// Truncate a string to max_len characters, appending "..." if truncated.
pub fn truncate_string(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let kept: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    }
}

/// clap value parser for `--threshold`.
pub fn parse_threshold(value: &str) -> Result<f64, String> {
    let threshold: f64 = value
        .trim()
        .parse()
        .map_err(|_| format!("`{}` is not a number", value))?;
    if is_valid_threshold(threshold) {
        Ok(threshold)
    } else {
        Err(format!("threshold must be between 0 and 1, got {}", threshold))
    }
}

/// Render the file listing as a fixed-width table.
pub fn render_file_table(files: &[FileRecord]) -> String {
    if files.is_empty() {
        return "No files uploaded yet.\n".to_string();
    }

    let mut out = format!(
        "{:<36} {:<40} {:<10} {:<9} {:<30} {:>19}\n",
        "ID", "File Name", "Status", "Processed", "Uploaded By", "Uploaded At"
    );
    out.push_str(&"-".repeat(149));
    out.push('\n');
    for file in files {
        out.push_str(&format!(
            "{:<36} {:<40} {:<10} {:<9} {:<30} {:>19}\n",
            file.file_id.to_string(),
            truncate_string(&file.file_name, 40),
            file.file_status.to_string(),
            if file.processed_flag { "yes" } else { "no" },
            truncate_string(file.uploader_email().unwrap_or("-"), 30),
            file.created_at.format("%Y-%m-%d %H:%M:%S").to_string()
        ));
    }
    out.push_str(&format!("\nTotal: {} file(s)\n", files.len()));
    out
}

/// Read one line from stdin after printing `prompt` to stderr.
pub fn read_line(prompt: &str) -> anyhow::Result<String> {
    eprint!("{}", prompt);
    io::stderr().flush().context("Flush prompt")?;
    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Read from stdin")?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}
