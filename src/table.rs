//! Aligned text tables.
//!
//! Each style is described as data (rule lines and row delimiters) and
//! rendered by one routine. Column widths depend on every cell, so callers
//! hand over the complete result set.

use crate::models::Field;
use std::fmt;
use std::str::FromStr;
use unicode_width::UnicodeWidthStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableStyle {
    Plain,
    #[default]
    Simple,
    Github,
    Grid,
    FancyGrid,
    Pipe,
    Orgtbl,
    Presto,
    Psql,
    Rst,
}

impl TableStyle {
    pub const ALL: [TableStyle; 10] = [
        TableStyle::Plain,
        TableStyle::Simple,
        TableStyle::Github,
        TableStyle::Grid,
        TableStyle::FancyGrid,
        TableStyle::Pipe,
        TableStyle::Orgtbl,
        TableStyle::Presto,
        TableStyle::Psql,
        TableStyle::Rst,
    ];

    pub fn name(self) -> &'static str {
        match self {
            TableStyle::Plain => "plain",
            TableStyle::Simple => "simple",
            TableStyle::Github => "github",
            TableStyle::Grid => "grid",
            TableStyle::FancyGrid => "fancy_grid",
            TableStyle::Pipe => "pipe",
            TableStyle::Orgtbl => "orgtbl",
            TableStyle::Presto => "presto",
            TableStyle::Psql => "psql",
            TableStyle::Rst => "rst",
        }
    }

    fn layout(self) -> Layout {
        const BAR: Delims = Delims { begin: "|", sep: "|", end: "|" };
        const SPACED: Delims = Delims { begin: "", sep: "  ", end: "" };
        match self {
            TableStyle::Plain => Layout {
                row: SPACED,
                ..Layout::EMPTY
            },
            TableStyle::Simple => Layout {
                below_header: Some(Rule::new("", "-", "  ", "")),
                row: SPACED,
                ..Layout::EMPTY
            },
            TableStyle::Github => Layout {
                below_header: Some(Rule::new("|", "-", "|", "|")),
                row: BAR,
                padding: 1,
                ..Layout::EMPTY
            },
            TableStyle::Grid => Layout {
                above: Some(Rule::new("+", "-", "+", "+")),
                below_header: Some(Rule::new("+", "=", "+", "+")),
                between_rows: Some(Rule::new("+", "-", "+", "+")),
                below: Some(Rule::new("+", "-", "+", "+")),
                row: BAR,
                padding: 1,
                align_markers: false,
            },
            TableStyle::FancyGrid => Layout {
                above: Some(Rule::new("╒", "═", "╤", "╕")),
                below_header: Some(Rule::new("╞", "═", "╪", "╡")),
                between_rows: Some(Rule::new("├", "─", "┼", "┤")),
                below: Some(Rule::new("╘", "═", "╧", "╛")),
                row: Delims { begin: "│", sep: "│", end: "│" },
                padding: 1,
                align_markers: false,
            },
            TableStyle::Pipe => Layout {
                below_header: Some(Rule::new("|", "-", "|", "|")),
                row: BAR,
                padding: 1,
                align_markers: true,
                ..Layout::EMPTY
            },
            TableStyle::Orgtbl => Layout {
                below_header: Some(Rule::new("|", "-", "+", "|")),
                row: BAR,
                padding: 1,
                ..Layout::EMPTY
            },
            TableStyle::Presto => Layout {
                below_header: Some(Rule::new("", "-", "+", "")),
                row: Delims { begin: "", sep: "|", end: "" },
                padding: 1,
                ..Layout::EMPTY
            },
            TableStyle::Psql => Layout {
                above: Some(Rule::new("+", "-", "+", "+")),
                below_header: Some(Rule::new("|", "-", "+", "|")),
                below: Some(Rule::new("+", "-", "+", "+")),
                row: BAR,
                padding: 1,
                ..Layout::EMPTY
            },
            TableStyle::Rst => Layout {
                above: Some(Rule::new("", "=", "  ", "")),
                below_header: Some(Rule::new("", "=", "  ", "")),
                below: Some(Rule::new("", "=", "  ", "")),
                row: SPACED,
                ..Layout::EMPTY
            },
        }
    }
}

impl fmt::Display for TableStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TableStyle {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TableStyle::ALL
            .into_iter()
            .find(|style| style.name() == s)
            .ok_or_else(|| {
                let names: Vec<&str> = TableStyle::ALL.iter().map(|s| s.name()).collect();
                format!("unknown table style '{}' (expected one of: {})", s, names.join(", "))
            })
    }
}

// ============================================================================
// Layout description
// ============================================================================

#[derive(Clone, Copy)]
struct Rule {
    begin: &'static str,
    fill: &'static str,
    sep: &'static str,
    end: &'static str,
}

impl Rule {
    const fn new(begin: &'static str, fill: &'static str, sep: &'static str, end: &'static str) -> Self {
        Self { begin, fill, sep, end }
    }
}

#[derive(Clone, Copy)]
struct Delims {
    begin: &'static str,
    sep: &'static str,
    end: &'static str,
}

#[derive(Clone, Copy)]
struct Layout {
    above: Option<Rule>,
    below_header: Option<Rule>,
    between_rows: Option<Rule>,
    below: Option<Rule>,
    row: Delims,
    padding: usize,
    /// Pipe tables mark column alignment with `:` in the header rule.
    align_markers: bool,
}

impl Layout {
    const EMPTY: Layout = Layout {
        above: None,
        below_header: None,
        between_rows: None,
        below: None,
        row: Delims { begin: "", sep: "", end: "" },
        padding: 0,
        align_markers: false,
    };
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

// ============================================================================
// Rendering
// ============================================================================

/// Terminal display width; East Asian wide characters count as two columns.
fn width(s: &str) -> usize {
    UnicodeWidthStr::width(s)
}

/// Display width of a possibly multi-line cell: its widest line.
fn cell_width(cell: &[String]) -> usize {
    cell.iter().map(|line| width(line)).max().unwrap_or(0)
}

fn split_lines(text: &str) -> Vec<String> {
    text.split('\n').map(|line| line.trim_end_matches('\r').to_string()).collect()
}

fn pad(s: &str, w: usize, align: Align) -> String {
    let fill = " ".repeat(w.saturating_sub(width(s)));
    match align {
        Align::Left => format!("{}{}", s, fill),
        Align::Right => format!("{}{}", fill, s),
    }
}

/// Numeric columns (every non-null cell numeric, at least one present) are
/// right-aligned; everything else is left-aligned.
fn column_alignments(rows: &[Vec<Field>], columns: usize) -> Vec<Align> {
    (0..columns)
        .map(|col| {
            let mut cells = rows.iter().filter_map(|r| r.get(col)).filter(|f| !f.is_null()).peekable();
            if cells.peek().is_some() && cells.all(Field::is_numeric) {
                Align::Right
            } else {
                Align::Left
            }
        })
        .collect()
}

fn rule_line(rule: &Rule, widths: &[usize], aligns: &[Align], layout: &Layout) -> String {
    let segments: Vec<String> = widths
        .iter()
        .zip(aligns)
        .map(|(w, align)| {
            let total = w + 2 * layout.padding;
            if layout.align_markers {
                let dashes = rule.fill.repeat(total.saturating_sub(1));
                match align {
                    Align::Left => format!(":{}", dashes),
                    Align::Right => format!("{}:", dashes),
                }
            } else {
                rule.fill.repeat(total)
            }
        })
        .collect();
    format!("{}{}{}", rule.begin, segments.join(rule.sep), rule.end)
}

fn row_line(cells: &[&str], widths: &[usize], aligns: &[Align], layout: &Layout) -> String {
    let margin = " ".repeat(layout.padding);
    let padded: Vec<String> = cells
        .iter()
        .zip(widths.iter().zip(aligns))
        .map(|(cell, (w, align))| format!("{}{}{}", margin, pad(cell, *w, *align), margin))
        .collect();
    let line = format!("{}{}{}", layout.row.begin, padded.join(layout.row.sep), layout.row.end);
    if layout.row.end.is_empty() {
        line.trim_end().to_string()
    } else {
        line
    }
}

/// One logical row as physical lines: as many as its tallest cell, with
/// shorter cells padded by blank lines.
fn row_lines(
    cells: &[Vec<String>],
    widths: &[usize],
    aligns: &[Align],
    layout: &Layout,
) -> Vec<String> {
    let height = cells.iter().map(Vec::len).max().unwrap_or(1).max(1);
    (0..height)
        .map(|i| {
            let parts: Vec<&str> = cells
                .iter()
                .map(|cell| cell.get(i).map_or("", String::as_str))
                .collect();
            row_line(&parts, widths, aligns, layout)
        })
        .collect()
}

/// Render `rows` under `header` in the given style. The returned string has
/// no trailing newline.
pub fn render(style: TableStyle, header: &[String], rows: &[Vec<Field>]) -> String {
    let layout = style.layout();
    let columns = rows.iter().map(Vec::len).chain([header.len()]).max().unwrap_or(0);
    if columns == 0 {
        return String::new();
    }

    let cells: Vec<Vec<Vec<String>>> = rows
        .iter()
        .map(|row| {
            (0..columns)
                .map(|i| split_lines(&row.get(i).map(Field::display_text).unwrap_or_default()))
                .collect()
        })
        .collect();
    let header_cells: Vec<Vec<String>> = (0..columns)
        .map(|i| split_lines(header.get(i).map_or("", String::as_str)))
        .collect();

    let mut widths: Vec<usize> = header_cells.iter().map(|h| cell_width(h)).collect();
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row) {
            *w = (*w).max(cell_width(cell));
        }
    }
    let aligns = column_alignments(rows, columns);

    let mut lines = Vec::with_capacity(rows.len() * 2 + 4);
    let has_header = !header.is_empty();

    if let Some(rule) = &layout.above {
        lines.push(rule_line(rule, &widths, &aligns, &layout));
    }
    if has_header {
        lines.extend(row_lines(&header_cells, &widths, &aligns, &layout));
        if let Some(rule) = &layout.below_header {
            lines.push(rule_line(rule, &widths, &aligns, &layout));
        }
    }
    for (idx, row) in cells.iter().enumerate() {
        if idx > 0 {
            if let Some(rule) = &layout.between_rows {
                lines.push(rule_line(rule, &widths, &aligns, &layout));
            }
        }
        lines.extend(row_lines(row, &widths, &aligns, &layout));
    }
    if let Some(rule) = &layout.below {
        lines.push(rule_line(rule, &widths, &aligns, &layout));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(cols: &[&str]) -> Vec<String> {
        cols.iter().map(|c| c.to_string()).collect()
    }

    fn sample() -> (Vec<String>, Vec<Vec<Field>>) {
        (
            header(&["n", "name"]),
            vec![
                vec![Field::Integer(1), Field::from("x")],
                vec![Field::Integer(22), Field::from("yy")],
            ],
        )
    }

    #[test]
    fn test_simple_style() {
        let (h, rows) = sample();
        assert_eq!(
            render(TableStyle::Simple, &h, &rows),
            " n  name\n--  ----\n 1  x\n22  yy"
        );
    }

    #[test]
    fn test_plain_style() {
        let (h, rows) = sample();
        assert_eq!(render(TableStyle::Plain, &h, &rows), " n  name\n 1  x\n22  yy");
    }

    #[test]
    fn test_grid_style() {
        let (h, rows) = sample();
        let expected = "\
+----+------+
|  n | name |
+====+======+
|  1 | x    |
+----+------+
| 22 | yy   |
+----+------+";
        assert_eq!(render(TableStyle::Grid, &h, &rows), expected);
    }

    #[test]
    fn test_pipe_alignment_markers() {
        let (h, rows) = sample();
        let rendered = render(TableStyle::Pipe, &h, &rows);
        let lines: Vec<&str> = rendered.lines().collect();
        assert_eq!(lines[0], "|  n | name |");
        assert_eq!(lines[1], "|---:|:-----|");
    }

    #[test]
    fn test_psql_style() {
        let (h, rows) = sample();
        let expected = "\
+----+------+
|  n | name |
|----+------|
|  1 | x    |
| 22 | yy   |
+----+------+";
        assert_eq!(render(TableStyle::Psql, &h, &rows), expected);
    }

    #[test]
    fn test_null_and_mixed_columns_left_aligned() {
        let h = header(&["a", "b"]);
        let rows = vec![
            vec![Field::Null, Field::from("10")],
            vec![Field::Integer(100), Field::Integer(2)],
        ];
        assert_eq!(render(TableStyle::Simple, &h, &rows), "  a  b\n---  --\n     10\n100  2");
    }

    #[test]
    fn test_row_count_matches_data() {
        let h = header(&["id", "title"]);
        let rows: Vec<Vec<Field>> = (0..5)
            .map(|i| vec![Field::Integer(i), Field::from("t")])
            .collect();
        let rendered = render(TableStyle::Github, &h, &rows);
        // header + rule + one line per row
        assert_eq!(rendered.lines().count(), 2 + rows.len());
    }

    #[test]
    fn test_wide_characters_keep_alignment() {
        let h = header(&["artist", "n"]);
        let rows = vec![
            vec![Field::from("坂本龍一"), Field::Integer(1)],
            vec![Field::from("abcdefgh"), Field::Integer(2)],
        ];
        let expected = "\
+----------+---+
| artist   | n |
+==========+===+
| 坂本龍一 | 1 |
+----------+---+
| abcdefgh | 2 |
+----------+---+";
        assert_eq!(render(TableStyle::Grid, &h, &rows), expected);
    }

    #[test]
    fn test_combining_accent_width() {
        let h = header(&["artist"]);
        let rows = vec![vec![Field::from("Björk")]];
        assert_eq!(render(TableStyle::Simple, &h, &rows), "artist\n------\nBjörk");
    }

    #[test]
    fn test_multiline_cell_spans_padded_lines() {
        let h = header(&["a", "b"]);
        let rows = vec![
            vec![Field::from("x\nyy"), Field::from("z")],
            vec![Field::from("w"), Field::from("v")],
        ];
        let expected = "\
+----+---+
| a  | b |
+====+===+
| x  | z |
| yy |   |
+----+---+
| w  | v |
+----+---+";
        assert_eq!(render(TableStyle::Grid, &h, &rows), expected);
    }

    #[test]
    fn test_multiline_header() {
        let h = header(&["release\ndate"]);
        let rows = vec![vec![Field::from("2004-01-05")]];
        assert_eq!(
            render(TableStyle::Simple, &h, &rows),
            "release\ndate\n----------\n2004-01-05"
        );
    }

    #[test]
    fn test_empty_table() {
        assert_eq!(render(TableStyle::Grid, &[], &[]), "");
    }

    #[test]
    fn test_style_names_roundtrip() {
        for style in TableStyle::ALL {
            assert_eq!(style.name().parse::<TableStyle>(), Ok(style));
        }
        let err = "fancy".parse::<TableStyle>().unwrap_err();
        assert!(err.contains("fancy_grid"));
    }
}
