//! Name standardization
//!
//! Maps the names found in the input table to accepted names before lineage
//! lookup. Lineages are cached by accepted name, so two spellings that
//! standardize to the same name share one lookup.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};

#[async_trait]
pub trait NameStandardizer: Send + Sync {
    /// Accepted name for every input name
    ///
    /// Implementations map names they cannot resolve to themselves.
    async fn standardize(&self, names: &BTreeSet<String>) -> BTreeMap<String, String>;
}

/// Treats every name as already accepted
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityStandardizer;

#[async_trait]
impl NameStandardizer for IdentityStandardizer {
    async fn standardize(&self, names: &BTreeSet<String>) -> BTreeMap<String, String> {
        names.iter().map(|n| (n.clone(), n.clone())).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_identity_maps_names_to_themselves() {
        let names: BTreeSet<String> = ["Rosa rugosa", "Malus domestica"]
            .into_iter()
            .map(String::from)
            .collect();

        let accepted = IdentityStandardizer.standardize(&names).await;

        assert_eq!(accepted.len(), 2);
        assert_eq!(accepted["Rosa rugosa"], "Rosa rugosa");
        assert_eq!(accepted["Malus domestica"], "Malus domestica");
    }
}
