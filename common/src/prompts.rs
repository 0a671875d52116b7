//! Prompt generation
//!
//! Fixed comparative-analysis template shared by every generation backend:
//! - ANALYSIS_HEADINGS: section headings the model is asked to produce
//! - build_analysis_prompt: embeds descriptions, failures and specimen notes

use crate::types::AnalysisInput;

/// Markdown headings requested from the model, in order
pub const ANALYSIS_HEADINGS: &[&str] = &[
    "### **Analysis of Potential Species**",
    "### **Most Likely Candidates**",
    "### **Species Lacking Descriptions**",
    "### **Further Steps for Confirmation**",
    "### **Confidence Level**",
];

const NO_DESCRIPTIONS: &str = "No descriptions were successfully scraped.";
const NO_FAILURES: &str = "None";
const NO_SPECIMEN_NOTES: &str = "No specific specimen observations provided.";
const NO_LABEL_NOTES: &str = "No specific label data provided.";

fn or_fallback<'a>(value: &'a str, fallback: &'a str) -> &'a str {
    if value.trim().is_empty() {
        fallback
    } else {
        value
    }
}

/// Builds the comparative-analysis prompt
///
/// Empty sections are replaced by an explicit sentence so the model never
/// sees a blank block.
pub fn build_analysis_prompt(input: &AnalysisInput) -> String {
    let descriptions = or_fallback(&input.aggregated_descriptions, NO_DESCRIPTIONS);
    let failed = or_fallback(&input.failed_names_list, NO_FAILURES);
    let specimen = or_fallback(&input.specimen_notes, NO_SPECIMEN_NOTES);
    let label = or_fallback(&input.label_notes, NO_LABEL_NOTES);

    format!(
        r#"You are an expert botanist and taxonomist. Your task is to compare provided descriptions with observations from a herbarium specimen.
**Collected Botanical Descriptions:**
{descriptions}
---
**Species Found on GBIF but Lacking a Scraped Description:**
{failed}
---
**Specimen Observations:**
{specimen}
---
**Specimen Label Data:**
{label}
---
**Your Task:**
Provide your analysis with the following markdown headings:
{analysis}
- For each species with a description, discuss how the specimen's features align with or contradict it.
{candidates}
- Identify the top 1-2 most likely candidate species from the ones with available descriptions.
{lacking}
- List the species recorded in the area that could not be automatically retrieved. Advise the user that these are still valid possibilities.
{further}
- Suggest concrete actions to confirm the identification.
{confidence}
- State your confidence in the potential identification based ONLY on the available scraped data.
"#,
        analysis = ANALYSIS_HEADINGS[0],
        candidates = ANALYSIS_HEADINGS[1],
        lacking = ANALYSIS_HEADINGS[2],
        further = ANALYSIS_HEADINGS[3],
        confidence = ANALYSIS_HEADINGS[4],
    )
}
