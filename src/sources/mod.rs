//! Description sources
//!
//! Every source follows the same three steps behind `DescriptionSource`:
//! resolve a binomial to a document handle, fetch the document, parse the
//! morphological sections out of it. Misses at any step are reported as a
//! failure reason, never as an error.

mod eflora;
mod html;
mod powo;

pub use eflora::EfloraSource;
pub use powo::PowoSource;

use crate::config::Config;
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use clap::ValueEnum;
use flora_id_common::{DescriptionResult, Outcome};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceKind {
    /// e-Flora of South Africa (SANBI)
    Eflora,
    /// Plants of the World Online (Kew)
    Powo,
}

impl SourceKind {
    pub fn display_name(&self) -> &'static str {
        match self {
            SourceKind::Eflora => "e-Flora SA",
            SourceKind::Powo => "POWO",
        }
    }
}

impl std::fmt::Display for SourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.display_name())
    }
}

#[async_trait]
pub trait DescriptionSource: Send + Sync {
    /// Short name used in logs and failure reasons
    fn name(&self) -> &str;

    /// Binomial → document handle (a URL); `None` when the source has no match
    async fn resolve(&self, binomial: &str) -> Option<String>;

    /// Raw document for a handle; `None` once retries are exhausted
    async fn fetch(&self, handle: &str) -> Option<String>;

    /// Extracts the description, or the reason none was usable
    fn parse(&self, document: &str) -> Outcome;

    fn not_found_reason(&self) -> String {
        format!("No {} match found.", self.name())
    }

    fn fetch_failed_reason(&self) -> String {
        format!("Failed to fetch {} page after multiple attempts.", self.name())
    }

    async fn fetch_description(&self, binomial: &str) -> DescriptionResult {
        let Some(handle) = self.resolve(binomial).await else {
            debug!("no {} match for '{}'", self.name(), binomial);
            return DescriptionResult::missing(binomial, self.not_found_reason());
        };
        debug!("{} handle for '{}': {}", self.name(), binomial, handle);

        let Some(document) = self.fetch(&handle).await else {
            return DescriptionResult::missing(binomial, self.fetch_failed_reason());
        };

        DescriptionResult {
            species_name: binomial.to_string(),
            outcome: self.parse(&document),
        }
    }
}

/// Sources in the configured order, all sharing one HTTP client
pub fn build_sources(
    kinds: &[SourceKind],
    client: &Client,
    config: &Config,
) -> Vec<Box<dyn DescriptionSource>> {
    let policy = config.retry_policy();
    kinds
        .iter()
        .map(|kind| build_source(*kind, client.clone(), config, policy))
        .collect()
}

fn build_source(
    kind: SourceKind,
    client: Client,
    config: &Config,
    policy: RetryPolicy,
) -> Box<dyn DescriptionSource> {
    match kind {
        SourceKind::Eflora => Box::new(EfloraSource::new(client, &config.eflora_url, policy)),
        SourceKind::Powo => Box::new(PowoSource::new(client, &config.powo_url, policy)),
    }
}
