//! Answer sheet and identification results join
//!
//! Both inputs are JSON objects mapping a sample key to a *string* that
//! itself holds a JSON object of fields. Decoding happens in two phases: the
//! outer envelope first, then each inner payload, so a bad payload is
//! reported against its key.

use crate::error::{MalformedRecordError, ScoreError};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};
use std::io;
use std::path::Path;
use tracing::{debug, info};

/// Fields of one record
pub type Record = BTreeMap<String, Value>;

/// Records keyed by sample, in key order
pub type RecordSet = BTreeMap<String, Record>;

/// Key column of the joined CSV
pub const KEY_COLUMN: &str = "Sample";

/// Decode a two-level record document
pub fn parse_records(json: &str) -> Result<RecordSet, ScoreError> {
    let envelope: BTreeMap<String, Value> =
        serde_json::from_str(json).map_err(|e| ScoreError::Envelope(e.to_string()))?;

    let mut records = RecordSet::new();
    for (key, value) in envelope {
        let record = parse_payload(&key, value)?;
        records.insert(key, record);
    }
    Ok(records)
}

fn parse_payload(key: &str, value: Value) -> Result<Record, MalformedRecordError> {
    let malformed = |reason: String| MalformedRecordError {
        key: key.to_string(),
        reason,
    };

    let payload = match value {
        Value::String(payload) => payload,
        other => {
            return Err(malformed(format!(
                "expected a JSON string, found {}",
                json_kind(&other)
            )))
        }
    };

    match serde_json::from_str::<Value>(&payload) {
        Ok(Value::Object(fields)) => Ok(fields.into_iter().collect()),
        Ok(other) => Err(malformed(format!(
            "payload is {}, not an object",
            json_kind(&other)
        ))),
        Err(e) => Err(malformed(e.to_string())),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Read and decode a record file
pub fn read_records(path: &Path) -> Result<RecordSet, ScoreError> {
    let json = std::fs::read_to_string(path)?;
    let records = parse_records(&json)?;
    debug!(path = %path.display(), records = records.len(), "Read records");
    Ok(records)
}

/// Inner join on key; `right` wins on field collisions
pub fn join_records(left: &RecordSet, right: &RecordSet) -> RecordSet {
    let joined: RecordSet = left
        .iter()
        .filter_map(|(key, left_fields)| {
            let right_fields = right.get(key)?;
            let mut fields = left_fields.clone();
            fields.extend(right_fields.iter().map(|(k, v)| (k.clone(), v.clone())));
            Some((key.clone(), fields))
        })
        .collect();

    info!(
        left = left.len(),
        right = right.len(),
        joined = joined.len(),
        "Joined records"
    );
    joined
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Write records as CSV: key column then the sorted union of field names
pub fn write_records_to<W: io::Write>(writer: W, records: &RecordSet) -> Result<(), ScoreError> {
    let fields: BTreeSet<&str> = records
        .values()
        .flat_map(|record| record.keys().map(String::as_str))
        .collect();

    let mut writer = csv::Writer::from_writer(writer);

    let mut header = vec![KEY_COLUMN];
    header.extend(fields.iter().copied());
    writer.write_record(&header)?;

    for (key, record) in records {
        let mut row = Vec::with_capacity(fields.len() + 1);
        row.push(key.clone());
        row.extend(fields.iter().map(|field| cell(record.get(*field))));
        writer.write_record(&row)?;
    }

    writer.flush()?;
    Ok(())
}

/// Write records as a CSV file
pub fn write_records(path: &Path, records: &RecordSet) -> Result<(), ScoreError> {
    let file = std::fs::File::create(path)?;
    write_records_to(file, records)
}
