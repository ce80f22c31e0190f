//! Plain-text table rendering for terminal reports.

use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Align {
    Left,
    Right,
}

/// A table whose column widths are computed from its contents at render
/// time. Cells are padded by character count.
#[derive(Debug, Clone)]
pub struct TextTable {
    headers: Vec<String>,
    aligns: Vec<Align>,
    rows: Vec<Vec<String>>,
}

impl TextTable {
    pub fn new<'a>(columns: impl IntoIterator<Item = (&'a str, Align)>) -> Self {
        let (headers, aligns) = columns
            .into_iter()
            .map(|(header, align)| (header.to_string(), align))
            .unzip();
        Self {
            headers,
            aligns,
            rows: Vec::new(),
        }
    }

    /// Adds a row; missing cells render empty and extra cells are dropped.
    pub fn push_row(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }

    pub fn render(&self) -> String {
        let mut widths: Vec<usize> = self
            .headers
            .iter()
            .map(|header| header.chars().count().max(3))
            .collect();
        for row in &self.rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(sanitize_cell(cell).chars().count());
            }
        }

        let mut output = String::new();
        output.push_str(&self.format_line(&self.headers, &widths));
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        output.push_str(&self.format_line(&rule, &widths));
        for row in &self.rows {
            output.push_str(&self.format_line(row, &widths));
        }
        output
    }

    fn format_line(&self, cells: &[String], widths: &[usize]) -> String {
        let mut line = widths
            .iter()
            .enumerate()
            .map(|(idx, &width)| {
                let cell = cells.get(idx).map(|cell| sanitize_cell(cell)).unwrap_or_default();
                match self.aligns[idx] {
                    Align::Left => format!("{cell:<width$}"),
                    Align::Right => format!("{cell:>width$}"),
                }
            })
            .collect::<Vec<_>>()
            .join("  ");
        line.truncate(line.trim_end().len());
        line.push('\n');
        line
    }
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
