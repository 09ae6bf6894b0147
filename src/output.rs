//! Output sinks for report rows.
//!
//! Tuple, CSV and JSON Lines output stream one line per record. Tables
//! buffer everything until [`RowSink::finish`] because column widths depend
//! on every row.

use crate::models::Field;
use crate::table::{self, TableStyle};
use anyhow::{bail, Context, Result};
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;
use std::io::Write;
use std::str::FromStr;

/// Receives the header (at most once, always first) and then data rows.
pub trait RowSink {
    fn header(&mut self, columns: &[String]) -> Result<()>;
    fn row(&mut self, row: &[Field]) -> Result<()>;
    fn finish(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    /// One parenthesized tuple per record.
    Tuple,
    Csv,
    /// JSON Lines, one object per data row keyed by the header.
    Json,
    Table(TableStyle),
}

impl Default for OutputFormat {
    fn default() -> Self {
        OutputFormat::Table(TableStyle::default())
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OutputFormat::Tuple => f.write_str("tuple"),
            OutputFormat::Csv => f.write_str("csv"),
            OutputFormat::Json => f.write_str("json"),
            OutputFormat::Table(style) => write!(f, "{}", style),
        }
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "tuple" | "raw" => Ok(OutputFormat::Tuple),
            "csv" => Ok(OutputFormat::Csv),
            "json" => Ok(OutputFormat::Json),
            other => other
                .parse::<TableStyle>()
                .map(OutputFormat::Table)
                .map_err(|_| {
                    let styles: Vec<&str> = TableStyle::ALL.iter().map(|s| s.name()).collect();
                    format!(
                        "unknown format '{}' (expected tuple, csv, json or a table style: {})",
                        other,
                        styles.join(", ")
                    )
                }),
        }
    }
}

/// Build the sink for `format` writing to `writer`.
pub fn sink_for<'a, W: Write + 'a>(format: OutputFormat, writer: W) -> Box<dyn RowSink + 'a> {
    match format {
        OutputFormat::Tuple => Box::new(TupleSink::new(writer)),
        OutputFormat::Csv => Box::new(CsvSink::new(writer)),
        OutputFormat::Json => Box::new(JsonLinesSink::new(writer)),
        OutputFormat::Table(style) => Box::new(TableSink::new(writer, style)),
    }
}

// ============================================================================
// Tuple
// ============================================================================

pub struct TupleSink<W: Write> {
    writer: W,
}

impl<W: Write> TupleSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    fn write_tuple<T: fmt::Display>(&mut self, items: impl Iterator<Item = T>) -> Result<()> {
        let parts: Vec<String> = items.map(|i| i.to_string()).collect();
        writeln!(self.writer, "({})", parts.join(", "))?;
        Ok(())
    }
}

impl<W: Write> RowSink for TupleSink<W> {
    fn header(&mut self, columns: &[String]) -> Result<()> {
        self.write_tuple(columns.iter().map(|c| format!("{:?}", c)))
    }

    fn row(&mut self, row: &[Field]) -> Result<()> {
        self.write_tuple(row.iter())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// CSV
// ============================================================================

pub struct CsvSink<W: Write> {
    writer: csv::Writer<W>,
}

impl<W: Write> CsvSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: csv::WriterBuilder::new().from_writer(writer),
        }
    }
}

impl<W: Write> RowSink for CsvSink<W> {
    fn header(&mut self, columns: &[String]) -> Result<()> {
        self.writer.write_record(columns).context("Failed to write CSV header")
    }

    fn row(&mut self, row: &[Field]) -> Result<()> {
        self.writer
            .write_record(row.iter().map(Field::display_text))
            .context("Failed to write CSV row")
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// JSON Lines
// ============================================================================

/// A data row zipped against the header names, serialized in header order.
struct JsonRecord<'a> {
    keys: &'a [String],
    values: &'a [Field],
}

impl Serialize for JsonRecord<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let len = self.keys.len().min(self.values.len());
        let mut map = serializer.serialize_map(Some(len))?;
        for (key, value) in self.keys.iter().zip(self.values) {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

pub struct JsonLinesSink<W: Write> {
    writer: W,
    keys: Option<Vec<String>>,
}

impl<W: Write> JsonLinesSink<W> {
    pub fn new(writer: W) -> Self {
        Self { writer, keys: None }
    }
}

impl<W: Write> RowSink for JsonLinesSink<W> {
    fn header(&mut self, columns: &[String]) -> Result<()> {
        self.keys = Some(columns.to_vec());
        Ok(())
    }

    fn row(&mut self, row: &[Field]) -> Result<()> {
        let Some(keys) = &self.keys else {
            bail!("JSON output needs a header before the first row");
        };
        serde_json::to_writer(&mut self.writer, &JsonRecord { keys, values: row })
            .context("Failed to write JSON row")?;
        writeln!(self.writer)?;
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        self.writer.flush()?;
        Ok(())
    }
}

// ============================================================================
// Table
// ============================================================================

pub struct TableSink<W: Write> {
    writer: W,
    style: TableStyle,
    header: Vec<String>,
    rows: Vec<Vec<Field>>,
}

impl<W: Write> TableSink<W> {
    pub fn new(writer: W, style: TableStyle) -> Self {
        Self {
            writer,
            style,
            header: Vec::new(),
            rows: Vec::new(),
        }
    }
}

impl<W: Write> RowSink for TableSink<W> {
    fn header(&mut self, columns: &[String]) -> Result<()> {
        self.header = columns.to_vec();
        Ok(())
    }

    fn row(&mut self, row: &[Field]) -> Result<()> {
        self.rows.push(row.to_vec());
        Ok(())
    }

    fn finish(&mut self) -> Result<()> {
        let rendered = table::render(self.style, &self.header, &self.rows);
        if !rendered.is_empty() {
            writeln!(self.writer, "{}", rendered)?;
        }
        self.writer.flush()?;
        Ok(())
    }
}
