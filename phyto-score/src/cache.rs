//! Accepted name → lineage cache
//!
//! Built once, sequentially, before any row is scored: one lookup per
//! distinct name, with a fixed pause after each lookup before the next. A failed
//! lookup is logged and cached as unresolved; it never aborts the batch.

use crate::lineage::Lineage;
use crate::taxonomy::TaxonomyLookup;
use std::collections::{BTreeSet, HashMap};
use std::time::{Duration, Instant};
use tracing::{debug, info, warn};

/// Keeps a fixed pause between the end of one call and the start of the next
struct Pacer {
    last_finished: Option<Instant>,
    pause: Duration,
}

impl Pacer {
    fn new(pause: Duration) -> Self {
        Self {
            last_finished: None,
            pause,
        }
    }

    /// Wait out whatever is left of the pause since the previous call finished
    async fn wait(&mut self) {
        if let Some(finished) = self.last_finished {
            let elapsed = finished.elapsed();
            if elapsed < self.pause {
                let wait_time = self.pause - elapsed;
                debug!("Lookup pacing: waiting {:?}", wait_time);
                tokio::time::sleep(wait_time).await;
            }
        }
    }

    fn finished(&mut self) {
        self.last_finished = Some(Instant::now());
    }
}

/// Lineage per accepted name; `None` marks a name that could not be resolved
#[derive(Debug, Clone, Default)]
pub struct NameLineageCache {
    entries: HashMap<String, Option<Lineage>>,
}

impl NameLineageCache {
    /// Look up every distinct name once, in sorted order
    ///
    /// Blank names are not looked up.
    pub async fn build<I>(names: I, lookup: &dyn TaxonomyLookup, pacing: Duration) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        let distinct: BTreeSet<String> = names
            .into_iter()
            .filter(|name| !name.trim().is_empty())
            .collect();

        info!(names = distinct.len(), "Resolving lineages");

        let mut pacer = Pacer::new(pacing);
        let mut entries = HashMap::with_capacity(distinct.len());

        for name in distinct {
            pacer.wait().await;

            let lineage = match lookup.lookup_lineage(&name).await {
                Ok(Some(lineage)) => {
                    debug!(name = %name, "Lineage resolved");
                    Some(lineage)
                }
                Ok(None) => {
                    warn!(name = %name, "No backbone match");
                    None
                }
                Err(e) => {
                    warn!(name = %name, error = %e, "Error retrieving lineage");
                    None
                }
            };
            pacer.finished();

            entries.insert(name, lineage);
        }

        let cache = Self { entries };
        info!(
            names = cache.len(),
            resolved = cache.resolved_count(),
            "Lineage cache built"
        );
        cache
    }

    /// Build directly from known entries
    pub fn from_entries(entries: HashMap<String, Option<Lineage>>) -> Self {
        Self { entries }
    }

    /// Resolved lineage for `name`, `None` if unresolved or never looked up
    pub fn get(&self, name: &str) -> Option<&Lineage> {
        self.entries.get(name).and_then(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Names that resolved to a lineage
    pub fn resolved_count(&self) -> usize {
        self.entries.values().filter(|l| l.is_some()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_pacer_first_call_is_immediate() {
        let mut pacer = Pacer::new(Duration::from_millis(500));
        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() < Duration::from_millis(100));
    }

    #[tokio::test]
    async fn test_pacer_spaces_calls() {
        let mut pacer = Pacer::new(Duration::from_millis(100));

        let start = Instant::now();
        for _ in 0..3 {
            pacer.wait().await;
            pacer.finished();
        }

        // Two waits of ~100ms
        assert!(start.elapsed() >= Duration::from_millis(190));
    }

    #[tokio::test]
    async fn test_pacer_pause_follows_slow_call() {
        let mut pacer = Pacer::new(Duration::from_millis(100));

        pacer.wait().await;
        tokio::time::sleep(Duration::from_millis(150)).await;
        pacer.finished();

        let start = Instant::now();
        pacer.wait().await;
        assert!(start.elapsed() >= Duration::from_millis(90));
    }

    #[test]
    fn test_get_flattens_unresolved() {
        let mut entries = HashMap::new();
        entries.insert("Rosa rugosa".to_string(), Some(Lineage::default()));
        entries.insert("Nonsense name".to_string(), None);
        let cache = NameLineageCache::from_entries(entries);

        assert!(cache.get("Rosa rugosa").is_some());
        assert!(cache.get("Nonsense name").is_none());
        assert!(cache.contains("Nonsense name"));
        assert!(!cache.contains("Never seen"));
        assert_eq!(cache.resolved_count(), 1);
    }
}
