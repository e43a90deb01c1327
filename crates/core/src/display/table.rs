//! Aligned selection table for search results.

use chrono::{DateTime, FixedOffset, Local};
use colored::{Color, ColoredString, Colorize};
use unicode_width::UnicodeWidthStr;

use crate::config::DisplayConfig;
use crate::search::TorrentRecord;

use super::date::format_date_at;
use super::size::display_size;
use super::title::{normalize_title, truncate};

/// A table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Title,
    Seeds,
    Peers,
    Size,
    Date,
}

impl Column {
    pub fn header(&self) -> &'static str {
        match self {
            Column::Title => "TITLE",
            Column::Seeds => "SEEDS",
            Column::Peers => "PEERS",
            Column::Size => "SIZE",
            Column::Date => "DATE",
        }
    }

    fn color(&self) -> Color {
        match self {
            Column::Title => Color::Cyan,
            Column::Seeds => Color::Green,
            Column::Peers => Color::Red,
            Column::Size => Color::Yellow,
            Column::Date => Color::Magenta,
        }
    }

    fn is_present(&self, record: &TorrentRecord) -> bool {
        match self {
            Column::Title => true,
            Column::Seeds => record.seeds.is_some(),
            Column::Peers => record.peers.is_some(),
            Column::Size => record.size_text.is_some(),
            Column::Date => record.uploaded_at.is_some(),
        }
    }
}

/// How optional columns are chosen for a result set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ColumnPolicy {
    /// Show a column when the first record has the field. A field missing
    /// on record 0 hides the column for the whole table.
    #[default]
    SampleFirst,
    /// Show a column when any record has the field.
    AnyRecord,
}

/// Columns shown for one result set. The title column is always present.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DisplayColumnSet {
    pub seeds: bool,
    pub peers: bool,
    pub size: bool,
    pub date: bool,
}

impl DisplayColumnSet {
    /// Intersect the configured columns with the fields present per `policy`.
    pub fn select(records: &[TorrentRecord], config: &DisplayConfig, policy: ColumnPolicy) -> Self {
        let present = |column: Column| match policy {
            ColumnPolicy::SampleFirst => records.first().is_some_and(|r| column.is_present(r)),
            ColumnPolicy::AnyRecord => records.iter().any(|r| column.is_present(r)),
        };

        Self {
            seeds: config.seeds && present(Column::Seeds),
            peers: config.peers && present(Column::Peers),
            size: config.size && present(Column::Size),
            date: config.date && present(Column::Date),
        }
    }

    pub fn columns(&self) -> Vec<Column> {
        let mut columns = vec![Column::Title];
        if self.seeds {
            columns.push(Column::Seeds);
        }
        if self.peers {
            columns.push(Column::Peers);
        }
        if self.size {
            columns.push(Column::Size);
        }
        if self.date {
            columns.push(Column::Date);
        }
        columns
    }
}

/// A selectable row.
#[derive(Debug, Clone, PartialEq)]
pub struct TableEntry {
    /// Full rendered row.
    pub name: String,
    /// Short label echoed after selection.
    pub short: String,
    pub record: TorrentRecord,
}

/// One item of the selection list.
#[derive(Debug, Clone, PartialEq)]
pub enum Choice {
    /// Non-selectable line (header, rule).
    Separator(String),
    Entry(TableEntry),
}

impl Choice {
    pub fn as_entry(&self) -> Option<&TableEntry> {
        match self {
            Choice::Entry(entry) => Some(entry),
            Choice::Separator(_) => None,
        }
    }
}

/// Turns ranked records into an aligned, truncated choice list.
#[derive(Debug, Clone)]
pub struct TableFormatter {
    config: DisplayConfig,
    policy: ColumnPolicy,
    colorize: bool,
    now: DateTime<FixedOffset>,
}

impl TableFormatter {
    pub fn new(config: &DisplayConfig) -> Self {
        Self {
            config: config.clone(),
            policy: ColumnPolicy::default(),
            colorize: true,
            now: Local::now().fixed_offset(),
        }
    }

    pub fn with_policy(mut self, policy: ColumnPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Disable ANSI styling (plain output for pipes and tests).
    pub fn with_colors(mut self, colorize: bool) -> Self {
        self.colorize = colorize;
        self
    }

    /// Reference time for relative dates.
    pub fn with_now(mut self, now: DateTime<FixedOffset>) -> Self {
        self.now = now;
        self
    }

    /// Format `records` as a header, a rule, and one entry per record.
    ///
    /// Titles longer than `truncate_width` columns end in an ellipsis.
    pub fn format(&self, records: &[TorrentRecord], truncate_width: usize) -> Vec<Choice> {
        if records.is_empty() {
            return Vec::new();
        }

        let columns = DisplayColumnSet::select(records, &self.config, self.policy).columns();
        let rows: Vec<Vec<String>> = records
            .iter()
            .map(|record| {
                columns
                    .iter()
                    .map(|c| self.cell(*c, record, truncate_width))
                    .collect()
            })
            .collect();

        let widths: Vec<usize> = columns
            .iter()
            .enumerate()
            .map(|(i, column)| {
                rows.iter()
                    .map(|row| row[i].width())
                    .chain(std::iter::once(column.header().width()))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let header = columns
            .iter()
            .zip(&widths)
            .map(|(column, width)| {
                let text = pad_end(column.header(), *width);
                match self.styled(*column, &text, true) {
                    Some(styled) => styled.to_string(),
                    None => text,
                }
            })
            .collect::<Vec<_>>()
            .join(" | ");
        let inner_width: usize = widths.iter().sum::<usize>() + 3 * (widths.len() - 1);

        let mut choices = Vec::with_capacity(records.len() + 2);
        choices.push(Choice::Separator(format!("| {} |", header)));
        choices.push(Choice::Separator(format!(
            "|{}|",
            "―".repeat(inner_width + 2)
        )));

        for (row, record) in rows.into_iter().zip(records) {
            let short = row[0].trim().to_string();
            let cells: Vec<String> = row
                .iter()
                .zip(&columns)
                .zip(&widths)
                .map(|((cell, column), width)| {
                    let text = match column {
                        Column::Title => pad_end(cell, *width),
                        _ => pad_start(cell, *width),
                    };
                    match self.styled(*column, &text, false) {
                        Some(styled) => styled.to_string(),
                        None => text,
                    }
                })
                .collect();

            choices.push(Choice::Entry(TableEntry {
                name: format!("| {} |", cells.join(" | ")),
                short,
                record: record.clone(),
            }));
        }

        choices
    }

    /// Style for a header or cell of `column`; `None` when colors are off.
    fn styled(&self, column: Column, text: &str, header: bool) -> Option<ColoredString> {
        if !self.colorize {
            return None;
        }
        let styled = text.color(column.color());
        Some(if header { styled.bold() } else { styled })
    }

    fn cell(&self, column: Column, record: &TorrentRecord, truncate_width: usize) -> String {
        match column {
            Column::Title => truncate(&normalize_title(&record.title), truncate_width),
            Column::Seeds => record.seeds.map(|s| s.to_string()).unwrap_or_default(),
            Column::Peers => record.peers.map(|p| p.to_string()).unwrap_or_default(),
            Column::Size => record
                .size_text
                .as_deref()
                .map(display_size)
                .unwrap_or_default(),
            Column::Date => record
                .uploaded_at
                .as_deref()
                .map(|d| format_date_at(d, &self.now))
                .unwrap_or_default(),
        }
    }
}

fn pad_end(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", text, " ".repeat(fill))
}

fn pad_start(text: &str, width: usize) -> String {
    let fill = width.saturating_sub(text.width());
    format!("{}{}", " ".repeat(fill), text)
}
