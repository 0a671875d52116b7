//! Flora ID Common Library
//!
//! I/O-free types and helpers shared by the occurrence client, the
//! description sources and the report synthesizer

pub mod types;
pub mod error;
pub mod geo;
pub mod names;
pub mod prompts;
pub mod analyzer;

pub use types::{
    AnalysisInput, AnalysisOutput, DescriptionResult, Outcome, SearchQuery, SpeciesRecord,
    MAX_RADIUS_KM, MIN_RADIUS_KM,
};
pub use error::{Error, Result};
pub use geo::BoundingBox;
pub use names::{binomial, unique_sorted_species};
pub use prompts::{build_analysis_prompt, ANALYSIS_HEADINGS};
pub use analyzer::{aggregate_descriptions, build_analysis_input, failed_names_list, species_header};
