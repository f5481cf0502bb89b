//! Output formatting utilities for MCP tools.
//!
//! Renders a [`TabularResult`] as an ASCII table (MySQL CLI style) or a
//! Markdown table. The structured `data` field is always returned as well.

use crate::models::TabularResult;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use unicode_width::UnicodeWidthStr;

/// Output format for query results.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// JSON format (default)
    #[default]
    Json,
    /// ASCII table format (like MySQL CLI)
    Table,
    /// Markdown table format
    Markdown,
}

impl OutputFormat {
    /// Render `result`, or `None` for JSON.
    pub fn render(&self, result: &TabularResult) -> Option<String> {
        match self {
            Self::Json => None,
            Self::Table => Some(format_as_table(result)),
            Self::Markdown => Some(format_as_markdown(result)),
        }
    }
}

fn rows_label(count: usize, truncated: bool) -> String {
    let noun = if count == 1 { "row" } else { "rows" };
    if truncated {
        format!("{count} {noun} (truncated)")
    } else {
        format!("{count} {noun}")
    }
}

pub fn format_as_table(result: &TabularResult) -> String {
    if result.columns.is_empty() {
        return "Empty set".to_string();
    }

    let rendered: Vec<Vec<String>> = result.text_rows();

    let mut widths: Vec<usize> = result.columns.iter().map(|c| c.width()).collect();
    for row in &rendered {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.width());
        }
    }

    let mut output = String::new();
    let separator: String = widths
        .iter()
        .map(|w| format!("+{}", "-".repeat(w + 2)))
        .collect::<String>()
        + "+\n";

    output.push_str(&separator);
    let header: String = result
        .columns
        .iter()
        .zip(&widths)
        .map(|(name, w)| format!("| {} ", pad_center(name, *w)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);
    output.push_str(&separator);

    for (cells, text) in result.rows.iter().zip(&rendered) {
        let line: String = cells
            .iter()
            .zip(text)
            .zip(&widths)
            .map(|((cell, s), w)| {
                if cell.is_numeric() {
                    format!("| {} ", pad_left(s, *w))
                } else {
                    format!("| {} ", pad_right(s, *w))
                }
            })
            .collect::<String>()
            + "|\n";
        output.push_str(&line);
    }

    output.push_str(&separator);
    output.push_str(&format!(
        "{} in set\n",
        rows_label(result.row_count(), result.truncated)
    ));

    output
}

pub fn format_as_markdown(result: &TabularResult) -> String {
    if result.columns.is_empty() {
        return "*Empty set*".to_string();
    }

    let mut output = String::new();

    let header: String = result
        .columns
        .iter()
        .map(|c| format!("| {} ", escape_markdown(c)))
        .collect::<String>()
        + "|\n";
    output.push_str(&header);

    let sep: String = result
        .columns
        .iter()
        .map(|_| "|---")
        .collect::<String>()
        + "|\n";
    output.push_str(&sep);

    for row in &result.rows {
        let line: String = row
            .iter()
            .map(|cell| format!("| {} ", escape_markdown(&cell.to_string())))
            .collect::<String>()
            + "|\n";
        output.push_str(&line);
    }

    output.push_str(&format!(
        "\n*{}*",
        rows_label(result.row_count(), result.truncated)
    ));

    output
}

fn escape_markdown(s: &str) -> String {
    s.replace('|', "\\|").replace('\n', " ")
}

// `format!` width specifiers count chars, not display columns.
fn pad_right(s: &str, width: usize) -> String {
    format!("{s}{}", " ".repeat(width.saturating_sub(s.width())))
}

fn pad_left(s: &str, width: usize) -> String {
    format!("{}{s}", " ".repeat(width.saturating_sub(s.width())))
}

fn pad_center(s: &str, width: usize) -> String {
    let total = width.saturating_sub(s.width());
    let left = total / 2;
    format!("{}{s}{}", " ".repeat(left), " ".repeat(total - left))
}
