//! Plain-text rendering of tables and dashboard sections.
//!
//! Everything the `dashboard` and `columns` commands print goes through
//! [`TextTable`]: an optional `== title` line, then either an aligned grid
//! or a note when there are no rows.

use std::fmt::Write as _;

use crate::table::Table;

const COLUMN_GAP: &str = "  ";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct TextTable {
    title: Option<String>,
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    empty_note: Option<String>,
}

impl TextTable {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            headers: headers.iter().map(|h| clean(h.as_ref())).collect(),
            ..Self::default()
        }
    }

    /// Preview of the first `limit` rows of `table` (`0` = all). With
    /// `positions`, a leading `#` column shows where each row sat in the
    /// source, counting from 1.
    pub fn from_frame(table: &Table, limit: usize, positions: Option<&[usize]>) -> Self {
        let mut headers = table.headers();
        let mut rows = table.display_rows(limit);
        if let Some(positions) = positions {
            headers.insert(0, "#".to_string());
            for (row, position) in rows.iter_mut().zip(positions) {
                row.insert(0, (position + 1).to_string());
            }
        }
        Self::new(&headers).with_rows(rows)
    }

    pub fn titled(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn with_rows(mut self, rows: Vec<Vec<String>>) -> Self {
        self.rows = rows
            .iter()
            .map(|row| row.iter().map(|cell| clean(cell)).collect())
            .collect();
        self
    }

    /// Printed in place of the grid when there are no rows.
    pub fn or_note(mut self, note: impl Into<String>) -> Self {
        self.empty_note = Some(note.into());
        self
    }

    pub fn render(&self) -> String {
        let mut output = String::new();
        if let Some(title) = &self.title {
            let _ = writeln!(output, "== {title}");
        }
        if let (true, Some(note)) = (self.rows.is_empty(), &self.empty_note) {
            let _ = writeln!(output, "{note}");
            return output;
        }

        let widths = self.widths();
        push_line(&mut output, &self.headers, &widths);
        let rule = widths.iter().map(|w| "-".repeat(*w)).collect::<Vec<_>>();
        push_line(&mut output, &rule, &widths);
        for row in &self.rows {
            push_line(&mut output, row, &widths);
        }
        output
    }

    fn widths(&self) -> Vec<usize> {
        let mut widths = self
            .headers
            .iter()
            .map(|h| h.chars().count().max(1))
            .collect::<Vec<_>>();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }
        widths
    }
}

fn push_line(output: &mut String, cells: &[String], widths: &[usize]) {
    let line = cells
        .iter()
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(COLUMN_GAP);
    let _ = writeln!(output, "{}", line.trim_end());
}

/// Control characters would break the grid; each becomes a space.
fn clean(cell: &str) -> String {
    cell.chars()
        .map(|ch| if ch.is_control() { ' ' } else { ch })
        .collect()
}
