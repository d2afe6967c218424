//! CSV input and output for trip record sets.
//!
//! Reading is the one place a failure is fatal: without source data there is
//! no meaningful partial result. Malformed rows (wrong cell count) are
//! skipped, not fatal.

use std::fs::File;
use std::path::Path;

use tracing::{info, warn};

use crate::constants;
use crate::error::{PipelineError, Result};
use crate::types::TripRecord;

/// Reads raw trip records from a delimited file with a header row. Header
/// cells are trimmed; rows whose cell count differs from the header are
/// skipped. Row numbers start at 2 (the header is row 1).
pub fn read_records(path: &Path) -> Result<Vec<TripRecord>> {
    let file = File::open(path).map_err(|e| {
        PipelineError::Input(format!("cannot open input file '{}': {}", path.display(), e))
    })?;

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    let header: Vec<String> = reader
        .headers()?
        .iter()
        .map(|column| column.to_string())
        .collect();

    let mut records = Vec::new();
    let mut skipped = 0usize;
    for (offset, row) in reader.records().enumerate() {
        let row = row?;
        let row_number = offset as u64 + 2;

        if row.len() != header.len() {
            skipped += 1;
            continue;
        }

        let fields = header
            .iter()
            .cloned()
            .zip(row.iter().map(str::to_string))
            .collect();
        records.push(TripRecord::from_pairs(row_number, fields));

        if row_number % constants::READ_PROGRESS_INTERVAL == 0 {
            info!(rows = row_number, "reading input");
        }
    }

    if skipped > 0 {
        warn!(skipped, "skipped malformed rows");
    }
    info!(
        records = records.len(),
        path = %path.display(),
        "loaded input records"
    );
    Ok(records)
}

/// Writes the cleaned dataset with its fixed column order. Fields a record
/// does not carry are written empty.
pub fn write_cleaned(path: &Path, records: &[TripRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(constants::CLEANED_COLUMNS)?;

    for record in records {
        let row: Vec<&str> = constants::CLEANED_COLUMNS
            .iter()
            .map(|column| record.get(column).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(
        records = records.len(),
        path = %path.display(),
        "wrote cleaned dataset"
    );
    Ok(())
}

/// Writes the enriched dataset: every input column plus all derived fields,
/// in the first record's field order.
pub fn write_enriched(path: &Path, records: &[TripRecord]) -> Result<()> {
    let Some(first) = records.first() else {
        warn!("no records to write");
        return Ok(());
    };

    let columns: Vec<&str> = first.columns().collect();
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(&columns)?;

    for record in records {
        let row: Vec<&str> = columns
            .iter()
            .map(|column| record.get(column).unwrap_or(""))
            .collect();
        writer.write_record(&row)?;
    }
    writer.flush()?;

    info!(
        records = records.len(),
        columns = columns.len(),
        path = %path.display(),
        "wrote enriched dataset"
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn reading_a_missing_file_is_fatal() {
        let result = read_records(Path::new("does/not/exist.csv"));
        assert!(matches!(result, Err(PipelineError::Input(_))));
    }

    #[test]
    fn malformed_rows_are_skipped_and_fields_are_trimmed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("input.csv");
        fs::write(
            &path,
            "id, vendor_id ,trip_duration\n\
             id1,2, 455 \n\
             id2,1\n\
             id3,2,600\n",
        )
        .unwrap();

        let records = read_records(&path).unwrap();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].row_number(), 2);
        assert_eq!(records[0].get("vendor_id"), Some("2"));
        assert_eq!(records[0].get("trip_duration"), Some("455"));
        assert_eq!(records[1].get("id"), Some("id3"));
        assert_eq!(records[1].row_number(), 4);
    }

    #[test]
    fn cleaned_output_uses_the_fixed_column_contract() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("cleaned.csv");

        let mut record = TripRecord::new(2);
        record.set("id", "id1");
        record.set("trip_duration", "455");
        record.set("outlier_flag", "NORMAL");
        write_cleaned(&path, &[record]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next().unwrap(),
            constants::CLEANED_COLUMNS.join(",")
        );
        // Missing fields come out empty, present ones in their column slot.
        assert_eq!(lines.next().unwrap(), "id1,,,,,,,,,,455,,NORMAL");
    }

    #[test]
    fn enriched_output_preserves_first_record_column_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.csv");

        let mut record = TripRecord::new(2);
        record.set("id", "id1");
        record.set("trip_duration", "455");
        record.set("trip_distance_km", "1.500");
        write_enriched(&path, &[record]).unwrap();

        let written = fs::read_to_string(&path).unwrap();
        let mut lines = written.lines();
        assert_eq!(lines.next().unwrap(), "id,trip_duration,trip_distance_km");
        assert_eq!(lines.next().unwrap(), "id1,455,1.500");
    }

    #[test]
    fn enriched_output_with_no_records_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("enriched.csv");
        write_enriched(&path, &[]).unwrap();
        assert!(!path.exists());
    }
}
