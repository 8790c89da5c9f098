//! Results artifact
//!
//! A flat JSON object, sample name → answer text. Failed samples store their
//! error text instead; a sample whose conversation had no message stores
//! `null`.

use crate::pipeline::ResultMap;
use phyto_common::Result;
use std::collections::BTreeMap;
use std::path::Path;

/// Artifact view of a result map
pub fn to_artifact(results: &ResultMap) -> BTreeMap<String, Option<String>> {
    results
        .iter()
        .map(|(name, outcome)| (name.clone(), outcome.artifact_value()))
        .collect()
}

/// Write the results artifact as pretty-printed JSON
pub fn write_results(path: &Path, results: &ResultMap) -> Result<()> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)?;
        }
    }
    let json = serde_json::to_string_pretty(&to_artifact(results))?;
    std::fs::write(path, json)?;
    Ok(())
}
