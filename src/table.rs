//! Column layout for listing rows.

use plume_core::TableRow;

use crate::render;

/// Key of the blank column placed between column groups.
pub const SPACER: &str = "spacer";

/// Columns whose values line up on the right.
const RIGHT_ALIGNED: &[&str] = &["inode", "links", "size"];

/// A laid-out table of markup cells.
#[derive(Debug)]
pub struct Table<'a> {
    columns: Vec<&'static str>,
    rows: Vec<&'a TableRow>,
    headers: bool,
}

impl<'a> Table<'a> {
    /// Build a table, dropping columns that no row fills.
    pub fn new(columns: &[&'static str], rows: Vec<&'a TableRow>, headers: bool) -> Self {
        let columns = visible_columns(columns, &rows);
        Self {
            columns,
            rows,
            headers,
        }
    }

    pub fn columns(&self) -> &[&'static str] {
        &self.columns
    }

    fn header(column: &str) -> String {
        match column {
            SPACER | "icon" => String::new(),
            _ => format!("[underline]{column}[/]"),
        }
    }

    fn cell(row: &TableRow, column: &str) -> String {
        row.get(column).cloned().unwrap_or_default()
    }

    /// Lines of markup with cells padded to their column width.
    pub fn lines(&self) -> Vec<String> {
        let mut grid: Vec<Vec<String>> = Vec::with_capacity(self.rows.len() + 1);
        if self.headers {
            grid.push(self.columns.iter().map(|c| Self::header(c)).collect());
        }
        for row in &self.rows {
            grid.push(self.columns.iter().map(|c| Self::cell(row, c)).collect());
        }

        let widths: Vec<usize> = (0..self.columns.len())
            .map(|index| {
                grid.iter()
                    .map(|cells| render::width(&cells[index]))
                    .max()
                    .unwrap_or(0)
            })
            .collect();

        let last = self.columns.len().saturating_sub(1);
        grid.into_iter()
            .map(|cells| {
                let mut line = String::new();
                for (index, cell) in cells.iter().enumerate() {
                    if index > 0 {
                        line.push(' ');
                    }
                    let padding = " ".repeat(widths[index].saturating_sub(render::width(cell)));
                    if RIGHT_ALIGNED.contains(&self.columns[index]) {
                        line.push_str(&padding);
                        line.push_str(cell);
                    } else {
                        line.push_str(cell);
                        if index != last {
                            line.push_str(&padding);
                        }
                    }
                }
                line
            })
            .collect()
    }
}

/// Keep columns present in at least one row; collapse runs of spacers and
/// drop spacers at either end.
fn visible_columns(columns: &[&'static str], rows: &[&TableRow]) -> Vec<&'static str> {
    let mut visible: Vec<&'static str> = Vec::with_capacity(columns.len());
    for &column in columns {
        if column == SPACER {
            if visible.last().is_some_and(|last| *last != SPACER) {
                visible.push(SPACER);
            }
        } else if rows.iter().any(|row| row.contains_key(column)) {
            visible.push(column);
        }
    }
    if visible.last() == Some(&SPACER) {
        visible.pop();
    }
    visible
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(cells: &[(&'static str, &str)]) -> TableRow {
        cells
            .iter()
            .map(|(key, value)| (*key, value.to_string()))
            .collect()
    }

    #[test]
    fn test_visible_columns() {
        let rows = [row(&[("size", "1"), ("name", "a")])];
        let refs: Vec<&TableRow> = rows.iter().collect();
        let columns = ["size", SPACER, "git", SPACER, "name"];
        assert_eq!(visible_columns(&columns, &refs), vec!["size", SPACER, "name"]);

        let columns = ["git", SPACER, "name", SPACER];
        assert_eq!(visible_columns(&columns, &refs), vec!["name"]);
    }

    #[test]
    fn test_alignment() {
        let rows = [
            row(&[("size", "[dim]-[/]"), ("name", " [cyan]src[/]")]),
            row(&[("size", "1.5 KiB"), ("name", " a")]),
        ];
        let table = Table::new(&["size", SPACER, "name"], rows.iter().collect(), false);
        let lines = table.lines();

        assert_eq!(render::strip(&lines[0]), "      -   src");
        assert_eq!(render::strip(&lines[1]), "1.5 KiB   a");
    }

    #[test]
    fn test_headers() {
        let rows = [row(&[("type", "d"), ("name", " x")])];
        let table = Table::new(&["type", "name"], rows.iter().collect(), true);
        let lines = table.lines();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0], "[underline]type[/] [underline]name[/]");
        assert_eq!(render::strip(&lines[1]), "d     x");
    }

    #[test]
    fn test_wide_characters() {
        let rows = [
            row(&[("icon", "📁"), ("name", "a")]),
            row(&[("icon", "x"), ("name", "b")]),
        ];
        let table = Table::new(&["icon", "name"], rows.iter().collect(), false);
        let lines = table.lines();
        assert_eq!(lines[1], "x  b");
    }
}
