//! GBIF occurrence client
//!
//! Name lookup (taxon name → usageKey) followed by an occurrence search
//! inside the query's bounding box. Failures are logged and reduced to an
//! empty species list; there is no retry at this layer.

use crate::config::Config;
use crate::error::{FloraIdError, Result};
use crate::http::send_checked;
use flora_id_common::{unique_sorted_species, BoundingBox, SearchQuery, SpeciesRecord};
use reqwest::Client;
use serde::Deserialize;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct NameMatch {
    usage_key: Option<u64>,
    rank: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OccurrencePage {
    #[serde(default)]
    results: Vec<OccurrenceRecord>,
}

#[derive(Debug, Deserialize)]
struct OccurrenceRecord {
    species: Option<String>,
}

/// Resolved taxon
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaxonMatch {
    pub key: u64,
    pub rank: Option<String>,
}

pub struct OccurrenceClient {
    client: Client,
    base_url: String,
    limit: u32,
}

impl OccurrenceClient {
    pub fn new(client: Client, base_url: impl Into<String>, limit: u32) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            limit,
        }
    }

    pub fn from_config(client: Client, config: &Config) -> Self {
        Self::new(client, config.gbif_url.clone(), config.occurrence_limit)
    }

    /// Taxon name → canonical key; `Ok(None)` when GBIF has no match
    pub async fn match_taxon(&self, taxon_name: &str) -> Result<Option<TaxonMatch>> {
        let url = format!("{}/species/match", self.base_url);
        let response = send_checked(self.client.get(&url).query(&[("name", taxon_name)])).await?;
        let body: NameMatch = response
            .json()
            .await
            .map_err(|e| FloraIdError::ApiParse(format!("species match: {}", e)))?;

        Ok(body.usage_key.map(|key| TaxonMatch {
            key,
            rank: body.rank,
        }))
    }

    /// Species names recorded for `taxon_key` inside `bbox`
    pub async fn search_species(&self, taxon_key: u64, bbox: &BoundingBox) -> Result<Vec<SpeciesRecord>> {
        let url = format!("{}/occurrence/search", self.base_url);
        let taxon_key = taxon_key.to_string();
        let limit = self.limit.to_string();
        let latitude = bbox.latitude_range();
        let longitude = bbox.longitude_range();
        let params = [
            ("taxonKey", taxon_key.as_str()),
            ("decimalLatitude", latitude.as_str()),
            ("decimalLongitude", longitude.as_str()),
            ("hasCoordinate", "true"),
            ("hasGeospatialIssue", "false"),
            ("limit", limit.as_str()),
        ];
        let response = send_checked(self.client.get(&url).query(&params)).await?;
        let page: OccurrencePage = response
            .json()
            .await
            .map_err(|e| FloraIdError::ApiParse(format!("occurrence search: {}", e)))?;

        debug!("occurrence search returned {} records", page.results.len());
        Ok(unique_sorted_species(page.results.into_iter().map(|r| r.species)))
    }

    /// Deduplicated, sorted species for the query. Lookup misses and
    /// service errors both yield an empty list.
    pub async fn resolve_species(&self, query: &SearchQuery) -> Vec<SpeciesRecord> {
        info!(
            "querying GBIF for '{}' within {}km of ({}, {})",
            query.taxon_name, query.radius_km, query.latitude, query.longitude
        );

        let taxon = match self.match_taxon(&query.taxon_name).await {
            Ok(Some(taxon)) => taxon,
            Ok(None) => {
                warn!("could not find a taxon key for '{}' on GBIF", query.taxon_name);
                return Vec::new();
            }
            Err(e) => {
                warn!("error looking up taxon key on GBIF: {}", e);
                return Vec::new();
            }
        };
        if let Some(rank) = &taxon.rank {
            info!("GBIF identified '{}' as a {}", query.taxon_name, rank.to_lowercase());
        }
        debug!("GBIF taxonKey for '{}': {}", query.taxon_name, taxon.key);

        let bbox = BoundingBox::for_query(query);
        match self.search_species(taxon.key, &bbox).await {
            Ok(species) => {
                info!("found {} unique species on GBIF", species.len());
                species
            }
            Err(e) => {
                warn!("error during the GBIF occurrence search: {}", e);
                Vec::new()
            }
        }
    }
}
