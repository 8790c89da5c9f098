//! Taxonomic lineage and rank distance
//!
//! A lineage holds the seven ranks kingdom → species. Each rank may be
//! unknown; an unknown rank only matches another unknown rank.
//!
//! The distance between two lineages is `7 - i` where `i` is the index of the
//! first rank at which they differ, or `0` when all seven agree. Differing at
//! kingdom gives 7, differing only at species gives 1.

use serde::{Deserialize, Serialize};

/// Number of ranks in a lineage
pub const RANK_COUNT: usize = 7;

/// Taxonomic rank, ordered from broadest to narrowest
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Rank {
    Kingdom,
    Phylum,
    Class,
    Order,
    Family,
    Genus,
    Species,
}

impl Rank {
    /// All ranks in comparison order
    pub const ALL: [Rank; RANK_COUNT] = [
        Rank::Kingdom,
        Rank::Phylum,
        Rank::Class,
        Rank::Order,
        Rank::Family,
        Rank::Genus,
        Rank::Species,
    ];

    /// 0 for kingdom through 6 for species
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Seven-rank classification of one scientific name
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineage {
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
}

impl Lineage {
    /// Build from rank values in kingdom → species order
    pub fn from_ranks<S: Into<String>>(ranks: [Option<S>; RANK_COUNT]) -> Self {
        let ranks: [Option<String>; RANK_COUNT] = ranks.map(|r| r.map(Into::into));
        let [kingdom, phylum, class, order, family, genus, species] = ranks;
        Self {
            kingdom,
            phylum,
            class,
            order,
            family,
            genus,
            species,
        }
    }

    pub fn rank(&self, rank: Rank) -> Option<&str> {
        let value = match rank {
            Rank::Kingdom => &self.kingdom,
            Rank::Phylum => &self.phylum,
            Rank::Class => &self.class,
            Rank::Order => &self.order,
            Rank::Family => &self.family,
            Rank::Genus => &self.genus,
            Rank::Species => &self.species,
        };
        value.as_deref()
    }

    /// First rank at which the two lineages differ
    pub fn first_difference(&self, other: &Lineage) -> Option<Rank> {
        Rank::ALL
            .into_iter()
            .find(|&rank| self.rank(rank) != other.rank(rank))
    }
}

/// Rank distance between two resolved lineages, in `0..=7`
pub fn rank_distance(a: &Lineage, b: &Lineage) -> u8 {
    match a.first_difference(b) {
        Some(rank) => (RANK_COUNT - rank.index()) as u8,
        None => 0,
    }
}

/// Rank distance, or `None` when either lineage is unresolved
pub fn lineage_distance(a: Option<&Lineage>, b: Option<&Lineage>) -> Option<u8> {
    Some(rank_distance(a?, b?))
}
