//! End-to-end identification run
//!
//! occurrence search → description fallback per species → analysis.
//! An empty species list stops the run before any source or generator
//! call is made.

use crate::config::Config;
use crate::error::{FloraIdError, Result};
use crate::http::build_client;
use crate::occurrence::OccurrenceClient;
use crate::orchestrator::collect_descriptions;
use crate::sources::{build_sources, DescriptionSource, SourceKind};
use crate::synthesizer::{synthesize, GeminiClient, TextGenerator};
use flora_id_common::{aggregate_descriptions, AnalysisOutput, DescriptionResult, SearchQuery, SpeciesRecord};
use serde::Serialize;
use std::time::Duration;
use tracing::info;

/// Everything one run produces
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Identification {
    pub species: Vec<SpeciesRecord>,
    pub descriptions: Vec<DescriptionResult>,
    pub analysis: AnalysisOutput,
    /// Aggregated successful descriptions, as embedded in the prompt
    pub raw_data: String,
}

impl Identification {
    pub fn described_count(&self) -> usize {
        self.descriptions.iter().filter(|r| r.succeeded()).count()
    }
}

pub struct Pipeline {
    occurrence: OccurrenceClient,
    sources: Vec<Box<dyn DescriptionSource>>,
    generator: Box<dyn TextGenerator>,
    species_delay: Duration,
}

impl Pipeline {
    pub fn new(
        occurrence: OccurrenceClient,
        sources: Vec<Box<dyn DescriptionSource>>,
        generator: Box<dyn TextGenerator>,
        species_delay: Duration,
    ) -> Self {
        Self {
            occurrence,
            sources,
            generator,
            species_delay,
        }
    }

    /// Production wiring. Fails with `MissingApiKey` before any network
    /// activity when no key is configured.
    pub fn from_config(config: &Config, source_order: &[SourceKind]) -> Result<Self> {
        let client = build_client(config)?;
        let generator = GeminiClient::from_config(client.clone(), config)?;
        let sources = build_sources(source_order, &client, config);
        let occurrence = OccurrenceClient::from_config(client, config);
        Ok(Self::new(occurrence, sources, Box::new(generator), config.species_delay()))
    }

    pub fn sources(&self) -> &[Box<dyn DescriptionSource>] {
        &self.sources
    }

    pub async fn run(
        &self,
        query: &SearchQuery,
        specimen_notes: &str,
        label_notes: &str,
        on_progress: impl Fn(usize, usize, &str),
    ) -> Result<Identification> {
        let species = self.occurrence.resolve_species(query).await;
        if species.is_empty() {
            return Err(FloraIdError::NoSpeciesFound(query.taxon_name.clone()));
        }
        info!("describing {} species", species.len());

        let descriptions = collect_descriptions(&self.sources, &species, self.species_delay, on_progress).await;

        let analysis = synthesize(self.generator.as_ref(), &descriptions, specimen_notes, label_notes)
            .await
            .ok_or_else(|| FloraIdError::NoSpeciesFound(query.taxon_name.clone()))?;

        Ok(Identification {
            raw_data: aggregate_descriptions(&descriptions),
            species,
            descriptions,
            analysis,
        })
    }
}
