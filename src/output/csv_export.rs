//! CSV export of a site's URL records

use crate::state::UrlRecord;
use crate::GaugeError;
use std::collections::{BTreeMap, BTreeSet};
use std::io::Write;
use std::path::Path;
use tracing::info;

/// Placeholder for a field a record does not carry
pub const MISSING: &str = "N/A";

/// Sorted union of the fields present on any record
///
/// `status` is always included.
pub fn field_union<'a, I>(records: I) -> Vec<&'static str>
where
    I: IntoIterator<Item = &'a UrlRecord>,
{
    let mut fields: BTreeSet<&'static str> = BTreeSet::from(["status"]);
    for record in records {
        fields.extend(record.present_fields().into_keys());
    }
    fields.into_iter().collect()
}

/// Writes `records` as CSV: a `url` column followed by [`field_union`]
///
/// Rows are ordered by URL. Returns the number of rows written.
pub fn write_csv<W: Write>(
    records: &BTreeMap<String, UrlRecord>,
    writer: W,
) -> Result<usize, csv::Error> {
    let fields = field_union(records.values());
    let mut csv = csv::Writer::from_writer(writer);

    let mut header = vec!["url"];
    header.extend(fields.iter().copied());
    csv.write_record(&header)?;

    for (url, record) in records {
        let present = record.present_fields();
        let mut row = vec![url.as_str()];
        row.extend(
            fields
                .iter()
                .map(|field| present.get(field).map_or(MISSING, String::as_str)),
        );
        csv.write_record(&row)?;
    }

    csv.flush()?;
    Ok(records.len())
}

/// Writes `records` to a CSV file at `path`
pub fn export_csv(records: &BTreeMap<String, UrlRecord>, path: &Path) -> Result<usize, GaugeError> {
    let file = std::fs::File::create(path)?;
    let rows = write_csv(records, file)?;
    info!("Exported {} rows to {}", rows, path.display());
    Ok(rows)
}
