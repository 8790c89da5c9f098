//! GBIF backbone client
//!
//! Resolves scientific names through the GBIF species match endpoint,
//! scoped to one kingdom and rank.
//!
//! # API Reference
//! - Endpoint: `GET {base}/species/match?name=..&rank=..&kingdom=..`
//! - A response without `usageKey` means no match

use crate::error::LookupError;
use crate::lineage::Lineage;
use crate::taxonomy::TaxonomyLookup;
use async_trait::async_trait;
use phyto_common::config::TaxonomyConfig;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const USER_AGENT: &str = concat!("phyto-score/", env!("CARGO_PKG_VERSION"));

/// Species match response (fields used for the lineage)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesMatch {
    pub usage_key: Option<i64>,
    pub scientific_name: Option<String>,
    pub kingdom: Option<String>,
    pub phylum: Option<String>,
    pub class: Option<String>,
    pub order: Option<String>,
    pub family: Option<String>,
    pub genus: Option<String>,
    pub species: Option<String>,
}

impl SpeciesMatch {
    /// Lineage of a matched name, `None` when nothing matched
    ///
    /// A missing `species` falls back to the last word of `scientificName`.
    pub fn into_lineage(self) -> Option<Lineage> {
        self.usage_key?;

        let species = self.species.or_else(|| {
            self.scientific_name
                .as_deref()
                .and_then(|name| name.split_whitespace().last())
                .map(str::to_string)
        });

        Some(Lineage {
            kingdom: self.kingdom,
            phylum: self.phylum,
            class: self.class,
            order: self.order,
            family: self.family,
            genus: self.genus,
            species,
        })
    }
}

/// GBIF API client
pub struct GbifClient {
    http_client: Client,
    base_url: String,
    kingdom: String,
    rank: String,
}

impl GbifClient {
    pub fn new(
        base_url: impl Into<String>,
        kingdom: impl Into<String>,
        rank: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, LookupError> {
        let http_client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| LookupError::Network(e.to_string()))?;

        Ok(Self {
            http_client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            kingdom: kingdom.into(),
            rank: rank.into(),
        })
    }

    /// Create from the `[taxonomy]` config section
    pub fn from_config(config: &TaxonomyConfig) -> Result<Self, LookupError> {
        Self::new(
            &config.base_url,
            &config.kingdom,
            &config.rank,
            config.request_timeout(),
        )
    }

    /// Raw species match for `name`
    pub async fn match_name(&self, name: &str) -> Result<SpeciesMatch, LookupError> {
        let url = format!("{}/species/match", self.base_url);
        debug!(name = %name, url = %url, "Querying species backbone");

        let response = self
            .http_client
            .get(&url)
            .query(&[
                ("name", name),
                ("rank", self.rank.as_str()),
                ("kingdom", self.kingdom.as_str()),
            ])
            .send()
            .await
            .map_err(|e| LookupError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();
            return Err(LookupError::Api(status.as_u16(), error_text));
        }

        response
            .json::<SpeciesMatch>()
            .await
            .map_err(|e| LookupError::Parse(e.to_string()))
    }
}

#[async_trait]
impl TaxonomyLookup for GbifClient {
    async fn lookup_lineage(&self, scientific_name: &str) -> Result<Option<Lineage>, LookupError> {
        Ok(self.match_name(scientific_name).await?.into_lineage())
    }
}
