//! Runs a report across several catalog numbers as one output stream.

use crate::models::{Field, Record, Series};
use crate::normalize::convert_names;
use crate::output::RowSink;
use crate::query::{run_report, Database, Report};
use anyhow::Result;
use tracing::{info, warn};

/// Column prepended to every row when series annotation is on.
pub const SERIES_COLUMN: &str = "fabric_series";

#[derive(Debug, Clone, Copy)]
pub struct BatchOptions {
    pub report: Report,
    pub series: Series,
    /// Prepend `fabric_series` to the header and the series name to each row.
    pub annotate_series: bool,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BatchSummary {
    pub identifiers: usize,
    pub rows: usize,
    /// Catalog numbers that matched nothing, in request order.
    pub empty: Vec<u32>,
}

/// Run the report for each number in order, pushing one header followed by
/// every normalized data row into `sink`.
///
/// The header is requested until one has been emitted, so it always leads
/// the stream even when early numbers match nothing. The sink is not
/// finished here.
pub fn run_batch(
    db: &Database,
    options: BatchOptions,
    numbers: &[u32],
    sink: &mut dyn RowSink,
) -> Result<BatchSummary> {
    let mut summary = BatchSummary::default();

    if numbers.is_empty() {
        warn!("No release numbers provided");
        return Ok(summary);
    }

    info!(
        "Extracting {} from series {}, for releases {:?}",
        options.report.label(),
        options.series,
        numbers
    );

    let mut header_sent = false;
    for &number in numbers {
        let count = run_report(
            db,
            options.report,
            number,
            options.series,
            !header_sent,
            |record| match record {
                Record::Header(columns) => {
                    header_sent = true;
                    if options.annotate_series {
                        let mut annotated = Vec::with_capacity(columns.len() + 1);
                        annotated.push(SERIES_COLUMN.to_string());
                        annotated.extend(columns);
                        sink.header(&annotated)
                    } else {
                        sink.header(&columns)
                    }
                }
                Record::Row(fields) => {
                    let mut row = convert_names(fields);
                    if options.annotate_series {
                        row.insert(0, Field::from(options.series.as_str()));
                    }
                    sink.row(&row)
                }
            },
        )?;

        summary.identifiers += 1;
        summary.rows += count;
        if count == 0 {
            summary.empty.push(number);
        }
    }

    Ok(summary)
}
