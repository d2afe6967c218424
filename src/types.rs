use std::fmt;

/// A single trip row: an insertion-ordered field map plus the source row
/// number used for traceability and tie-breaking.
///
/// Pipeline stages only ever *add* fields (derived values, status flags) or
/// replace existing ones; columns are never removed, so the output column
/// order is the input order followed by derived fields in append order.
#[derive(Debug, Clone)]
pub struct TripRecord {
    row_number: u64,
    fields: Vec<(String, String)>,
}

impl TripRecord {
    pub fn new(row_number: u64) -> Self {
        Self {
            row_number,
            fields: Vec::new(),
        }
    }

    pub fn from_pairs(row_number: u64, fields: Vec<(String, String)>) -> Self {
        Self { row_number, fields }
    }

    pub fn row_number(&self) -> u64 {
        self.row_number
    }

    /// Field value by column name.
    pub fn get(&self, column: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(name, _)| name.as_str() == column)
            .map(|(_, value)| value.as_str())
    }

    /// Sets a field, replacing an existing value or appending a new column.
    pub fn set(&mut self, column: &str, value: impl Into<String>) {
        let value = value.into();
        match self
            .fields
            .iter_mut()
            .find(|(name, _)| name.as_str() == column)
        {
            Some((_, existing)) => *existing = value,
            None => self.fields.push((column.to_string(), value)),
        }
    }

    /// Column names in insertion order.
    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(name, _)| name.as_str())
    }

    /// (column, value) pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    pub fn parse_f64(&self, column: &str) -> Option<f64> {
        self.get(column).and_then(|value| value.trim().parse().ok())
    }

    pub fn parse_i64(&self, column: &str) -> Option<i64> {
        self.get(column).and_then(|value| value.trim().parse().ok())
    }
}

/// Why a record was excluded from the working set. The flag is written to
/// the record before removal; structurally invalid records are not retained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidityFlag {
    Normal,
    InvalidCoordinates,
    InvalidDatetime,
    InvalidDurationOrPassengers,
}

impl ValidityFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValidityFlag::Normal => "NORMAL",
            ValidityFlag::InvalidCoordinates => "INVALID_COORDINATES",
            ValidityFlag::InvalidDatetime => "INVALID_DATETIME",
            ValidityFlag::InvalidDurationOrPassengers => "INVALID_DURATION_OR_PASSENGERS",
        }
    }
}

impl fmt::Display for ValidityFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Statistical annotation on a structurally valid record. Unlike
/// [`ValidityFlag`], an outlier flag never removes a record: anomalous but
/// usable trips stay in the set for downstream analysis.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutlierFlag {
    Normal,
    DurationOutlier,
}

impl OutlierFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutlierFlag::Normal => "NORMAL",
            OutlierFlag::DurationOutlier => "DURATION_OUTLIER",
        }
    }
}

impl fmt::Display for OutlierFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_replaces_in_place_and_appends_new_columns() {
        let mut record = TripRecord::new(2);
        record.set("vendor_id", "1");
        record.set("trip_duration", "455");
        record.set("vendor_id", "2");
        record.set("outlier_flag", "NORMAL");

        assert_eq!(record.get("vendor_id"), Some("2"));
        let columns: Vec<&str> = record.columns().collect();
        assert_eq!(columns, vec!["vendor_id", "trip_duration", "outlier_flag"]);
    }

    #[test]
    fn parse_helpers_tolerate_whitespace_and_garbage() {
        let mut record = TripRecord::new(2);
        record.set("trip_duration", " 455 ");
        record.set("passenger_count", "many");

        assert_eq!(record.parse_i64("trip_duration"), Some(455));
        assert_eq!(record.parse_i64("passenger_count"), None);
        assert_eq!(record.parse_f64("missing"), None);
    }
}
