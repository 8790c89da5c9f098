//! Taxonomy lookup boundary

use crate::error::LookupError;
use crate::lineage::Lineage;
use async_trait::async_trait;

/// Resolves a scientific name to its lineage
///
/// `Ok(None)` means the backbone has no match for the name.
#[async_trait]
pub trait TaxonomyLookup: Send + Sync {
    async fn lookup_lineage(&self, scientific_name: &str) -> Result<Option<Lineage>, LookupError>;
}
