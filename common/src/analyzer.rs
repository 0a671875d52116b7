//! Analysis input assembly
//!
//! Splits description results into successes and failures and shapes them
//! into the text blocks embedded in the prompt and the report appendix.

use crate::types::{AnalysisInput, DescriptionResult};

/// Header placed before each species' description block
pub fn species_header(species_name: &str) -> String {
    format!("--- Data for {} ---", species_name)
}

/// Successful descriptions joined by a blank line, each under its header
pub fn aggregate_descriptions(results: &[DescriptionResult]) -> String {
    results
        .iter()
        .filter_map(|r| {
            r.text()
                .map(|text| format!("{}\n{}", species_header(&r.species_name), text))
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Failed species as `- name` lines
pub fn failed_names_list(results: &[DescriptionResult]) -> String {
    results
        .iter()
        .filter(|r| !r.succeeded())
        .map(|r| format!("- {}", r.species_name))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Builds the prompt material; `None` when there is nothing to analyse
pub fn build_analysis_input(
    results: &[DescriptionResult],
    specimen_notes: &str,
    label_notes: &str,
) -> Option<AnalysisInput> {
    if results.is_empty() {
        return None;
    }

    Some(AnalysisInput {
        aggregated_descriptions: aggregate_descriptions(results),
        failed_names_list: failed_names_list(results),
        specimen_notes: specimen_notes.to_string(),
        label_notes: label_notes.to_string(),
    })
}
