//! Lineage distance scoring
//!
//! 1. Collect every distinct name in the four name columns
//! 2. Standardize names (identity by default)
//! 3. Resolve each accepted name once into the lineage cache
//! 4. Score each guess against the correct answer
//! 5. Summarize each distance column, skipping unscored cells

use crate::cache::NameLineageCache;
use crate::lineage::{lineage_distance, Lineage};
use crate::standardize::{IdentityStandardizer, NameStandardizer};
use crate::taxonomy::TaxonomyLookup;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// Guesses scored per row
pub const GUESS_COUNT: usize = 3;

/// One input row of scientific names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoringRow {
    pub correct: String,
    pub guess_1: String,
    pub guess_2: String,
    pub guess_3: String,
    /// Every cell of the input row, in input column order
    pub cells: Vec<String>,
}

impl ScoringRow {
    /// Row whose only cells are the four names
    pub fn new(correct: &str, guess_1: &str, guess_2: &str, guess_3: &str) -> Self {
        Self {
            correct: correct.to_string(),
            guess_1: guess_1.to_string(),
            guess_2: guess_2.to_string(),
            guess_3: guess_3.to_string(),
            cells: [correct, guess_1, guess_2, guess_3].map(str::to_string).to_vec(),
        }
    }

    pub fn guesses(&self) -> [&str; GUESS_COUNT] {
        [&self.guess_1, &self.guess_2, &self.guess_3]
    }

    /// Correct answer followed by the guesses
    pub fn names(&self) -> [&str; GUESS_COUNT + 1] {
        [&self.correct, &self.guess_1, &self.guess_2, &self.guess_3]
    }
}

/// Input row plus one distance per guess (`None` when unscored)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoredRow {
    pub row: ScoringRow,
    pub distances: [Option<u8>; GUESS_COUNT],
}

/// Statistics of one `Distance_i` column
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnSummary {
    /// Column header, e.g. `Distance_1`
    pub column: String,
    /// Mean of scored cells, `None` when no cell was scored
    pub mean: Option<f64>,
    /// Distance value → number of rows, ascending by value
    pub frequencies: BTreeMap<u8, usize>,
    pub scored: usize,
    pub unscored: usize,
}

/// Per-column statistics, in guess order
#[derive(Debug, Clone, PartialEq)]
pub struct DistanceSummary {
    pub columns: Vec<ColumnSummary>,
}

/// Header of the distance column for guess `index` (0-based)
pub fn distance_column(index: usize) -> String {
    format!("Distance_{}", index + 1)
}

/// Distinct non-blank names across all name columns
pub fn collect_names(rows: &[ScoringRow]) -> BTreeSet<String> {
    rows.iter()
        .flat_map(|row| row.names())
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(str::to_string)
        .collect()
}

/// Score every row against a finished cache
///
/// `accepted` maps input names to the accepted names the cache is keyed by;
/// names missing from it are used as-is. Pure: no lookups happen here.
pub fn score_rows(
    rows: &[ScoringRow],
    accepted: &BTreeMap<String, String>,
    cache: &NameLineageCache,
) -> Vec<ScoredRow> {
    rows.iter()
        .map(|row| {
            let correct = resolve(&row.correct, accepted, cache);
            let distances = row
                .guesses()
                .map(|guess| lineage_distance(correct, resolve(guess, accepted, cache)));
            ScoredRow {
                row: row.clone(),
                distances,
            }
        })
        .collect()
}

fn resolve<'a>(
    name: &str,
    accepted: &BTreeMap<String, String>,
    cache: &'a NameLineageCache,
) -> Option<&'a Lineage> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let key = accepted.get(name).map(String::as_str).unwrap_or(name);
    cache.get(key)
}

/// Mean and frequency table per distance column
pub fn summarize(rows: &[ScoredRow]) -> DistanceSummary {
    let columns = (0..GUESS_COUNT)
        .map(|index| {
            let values: Vec<u8> = rows.iter().filter_map(|r| r.distances[index]).collect();

            let mut frequencies = BTreeMap::new();
            for value in &values {
                *frequencies.entry(*value).or_insert(0) += 1;
            }

            let mean = if values.is_empty() {
                None
            } else {
                Some(values.iter().map(|&v| f64::from(v)).sum::<f64>() / values.len() as f64)
            };

            ColumnSummary {
                column: distance_column(index),
                mean,
                frequencies,
                scored: values.len(),
                unscored: rows.len() - values.len(),
            }
        })
        .collect();

    DistanceSummary { columns }
}

impl fmt::Display for DistanceSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Average distances:")?;
        for column in &self.columns {
            match column.mean {
                Some(mean) => writeln!(f, "  {:<12}{:.4}", column.column, mean)?,
                None => writeln!(f, "  {:<12}n/a", column.column)?,
            }
        }

        writeln!(f)?;
        writeln!(f, "Distance frequency:")?;
        for column in &self.columns {
            writeln!(
                f,
                "{} value counts ({} scored, {} unscored):",
                column.column, column.scored, column.unscored
            )?;
            for (value, count) in &column.frequencies {
                writeln!(f, "  {}: {}", value, count)?;
            }
        }
        Ok(())
    }
}

/// Result of a scoring pass
#[derive(Debug, Clone)]
pub struct ScoreReport {
    pub rows: Vec<ScoredRow>,
    pub summary: DistanceSummary,
    /// Distinct accepted names looked up
    pub names_looked_up: usize,
    /// Of those, names that resolved to a lineage
    pub names_resolved: usize,
}

/// Lineage distance scorer
pub struct Scorer {
    lookup: Arc<dyn TaxonomyLookup>,
    standardizer: Arc<dyn NameStandardizer>,
    pacing: Duration,
}

impl Scorer {
    /// Scorer with identity name standardization
    pub fn new(lookup: Arc<dyn TaxonomyLookup>, pacing: Duration) -> Self {
        Self::with_standardizer(lookup, Arc::new(IdentityStandardizer), pacing)
    }

    pub fn with_standardizer(
        lookup: Arc<dyn TaxonomyLookup>,
        standardizer: Arc<dyn NameStandardizer>,
        pacing: Duration,
    ) -> Self {
        Self {
            lookup,
            standardizer,
            pacing,
        }
    }

    /// Resolve names, score every row and summarize
    pub async fn score(&self, rows: Vec<ScoringRow>) -> ScoreReport {
        let names = collect_names(&rows);
        info!(rows = rows.len(), names = names.len(), "Scoring rows");

        let accepted = self.standardizer.standardize(&names).await;
        let accepted_names: BTreeSet<String> = names
            .iter()
            .map(|name| accepted.get(name).cloned().unwrap_or_else(|| name.clone()))
            .collect();

        let cache =
            NameLineageCache::build(accepted_names, self.lookup.as_ref(), self.pacing).await;

        let scored = score_rows(&rows, &accepted, &cache);
        let summary = summarize(&scored);

        ScoreReport {
            rows: scored,
            summary,
            names_looked_up: cache.len(),
            names_resolved: cache.resolved_count(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lineage(genus: &str, species: &str) -> Lineage {
        Lineage::from_ranks([
            Some("Plantae"),
            Some("Tracheophyta"),
            Some("Magnoliopsida"),
            Some("Rosales"),
            Some("Rosaceae"),
            Some(genus),
            Some(species),
        ])
    }

    fn cache() -> NameLineageCache {
        let mut entries = HashMap::new();
        entries.insert("Rosa rugosa".to_string(), Some(lineage("Rosa", "rugosa")));
        entries.insert("Rosa canina".to_string(), Some(lineage("Rosa", "canina")));
        entries.insert(
            "Malus domestica".to_string(),
            Some(lineage("Malus", "domestica")),
        );
        entries.insert("Mystery plant".to_string(), None);
        NameLineageCache::from_entries(entries)
    }

    #[test]
    fn test_collect_names_dedupes_and_skips_blanks() {
        let rows = vec![
            ScoringRow::new("Rosa rugosa", "Rosa rugosa", "Rosa canina", " "),
            ScoringRow::new("Rosa canina", "Rosa rugosa ", "Malus domestica", "Rosa canina"),
        ];

        let names: Vec<String> = collect_names(&rows).into_iter().collect();
        assert_eq!(names, vec!["Malus domestica", "Rosa canina", "Rosa rugosa"]);
    }

    #[test]
    fn test_score_rows() {
        let rows = vec![
            ScoringRow::new("Rosa rugosa", "Rosa rugosa", "Rosa canina", "Malus domestica"),
            ScoringRow::new("Rosa rugosa", "Mystery plant", "", "Never looked up"),
            ScoringRow::new("Mystery plant", "Rosa rugosa", "Rosa canina", "Rosa rugosa"),
        ];

        let scored = score_rows(&rows, &BTreeMap::new(), &cache());

        assert_eq!(scored[0].distances, [Some(0), Some(1), Some(2)]);
        assert_eq!(scored[1].distances, [None, None, None]);
        assert_eq!(scored[2].distances, [None, None, None]);
        assert_eq!(scored[0].row, rows[0]);
    }

    #[test]
    fn test_score_rows_uses_accepted_names() {
        let rows = vec![ScoringRow::new(
            "Rosa rugosa",
            "Rosa rugosa Thunb.",
            "Rosa canina",
            "Rosa canina",
        )];
        let mut accepted = BTreeMap::new();
        accepted.insert("Rosa rugosa Thunb.".to_string(), "Rosa rugosa".to_string());

        let scored = score_rows(&rows, &accepted, &cache());
        assert_eq!(scored[0].distances, [Some(0), Some(1), Some(1)]);
    }

    #[test]
    fn test_summary_skips_unscored_cells() {
        let row = ScoringRow::new("a", "b", "c", "d");
        let scored = vec![
            ScoredRow {
                row: row.clone(),
                distances: [Some(0), Some(2), None],
            },
            ScoredRow {
                row: row.clone(),
                distances: [Some(1), Some(2), None],
            },
            ScoredRow {
                row: row.clone(),
                distances: [None, Some(7), None],
            },
            ScoredRow {
                row,
                distances: [Some(1), Some(2), None],
            },
        ];

        let summary = summarize(&scored);

        let first = &summary.columns[0];
        assert_eq!(first.column, "Distance_1");
        assert_eq!(first.scored, 3);
        assert_eq!(first.unscored, 1);
        assert!((first.mean.unwrap() - 2.0 / 3.0).abs() < 1e-9);
        assert_eq!(first.frequencies, BTreeMap::from([(0, 1), (1, 2)]));

        let second = &summary.columns[1];
        assert!((second.mean.unwrap() - 13.0 / 4.0).abs() < 1e-9);
        assert_eq!(second.frequencies, BTreeMap::from([(2, 3), (7, 1)]));

        let third = &summary.columns[2];
        assert_eq!(third.mean, None);
        assert!(third.frequencies.is_empty());
        assert_eq!(third.unscored, 4);
    }

    #[test]
    fn test_summary_report_text() {
        let scored = vec![ScoredRow {
            row: ScoringRow::new("a", "b", "c", "d"),
            distances: [Some(1), None, Some(0)],
        }];

        let text = summarize(&scored).to_string();
        assert!(text.contains("Average distances:"));
        assert!(text.contains("Distance_1  1.0000"));
        assert!(text.contains("Distance_2  n/a"));
        assert!(text.contains("Distance_3 value counts (1 scored, 0 unscored):"));
    }
}
