//! Report synthesis
//!
//! Builds the comparative-analysis prompt from the description results and
//! hands it to a text generator. Generator trouble never fails the run: it
//! is turned into a placeholder analysis so the scraped data still reaches
//! the report.

mod gemini;

pub use gemini::GeminiClient;

use crate::error::Result;
use async_trait::async_trait;
use flora_id_common::{build_analysis_input, build_analysis_prompt, AnalysisOutput, DescriptionResult};
use tracing::{info, warn};

pub const BLOCKED_PLACEHOLDER: &str = "Analysis was blocked by the safety filter or returned no content.";

/// Prompt in, text out
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// `Ok(None)` when the service answered without usable text
    async fn generate(&self, prompt: &str) -> Result<Option<String>>;
}

pub fn error_placeholder(error: &impl std::fmt::Display) -> String {
    format!("An error occurred during Gemini analysis: {}", error)
}

/// Analysis of `results`; `None` when there is nothing to analyse, in which
/// case the generator is not called.
pub async fn synthesize(
    generator: &dyn TextGenerator,
    results: &[DescriptionResult],
    specimen_notes: &str,
    label_notes: &str,
) -> Option<AnalysisOutput> {
    let input = build_analysis_input(results, specimen_notes, label_notes)?;
    let prompt = build_analysis_prompt(&input);
    info!("sending {} species to the generator ({} chars)", results.len(), prompt.len());

    let markup_text = match generator.generate(&prompt).await {
        Ok(Some(text)) => text,
        Ok(None) => {
            warn!("generator returned no content");
            BLOCKED_PLACEHOLDER.to_string()
        }
        Err(e) => {
            warn!("generation failed: {}", e);
            error_placeholder(&e)
        }
    };

    Some(AnalysisOutput { markup_text })
}
