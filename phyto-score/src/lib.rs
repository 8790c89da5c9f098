//! phyto-score library interface
//!
//! Scores identification guesses against the correct answer by taxonomic
//! lineage: every distinct name is resolved once to a seven-rank lineage,
//! then each guess gets the number of ranks (from the first mismatch down to
//! species) at which it departs from the correct lineage.

pub mod cache;
pub mod error;
pub mod gbif_client;
pub mod lineage;
pub mod records;
pub mod scorer;
pub mod standardize;
pub mod table;
pub mod taxonomy;

pub use crate::cache::NameLineageCache;
pub use crate::error::{LookupError, MalformedRecordError, ScoreError};
pub use crate::lineage::{lineage_distance, rank_distance, Lineage, Rank};
pub use crate::scorer::{DistanceSummary, ScoredRow, Scorer, ScoringRow};
pub use crate::standardize::{IdentityStandardizer, NameStandardizer};
pub use crate::table::ScoringTable;
pub use crate::taxonomy::TaxonomyLookup;
