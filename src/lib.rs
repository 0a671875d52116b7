//! flora-id
//!
//! Candidate species from GBIF occurrences around a collection site,
//! morphological descriptions scraped from e-Flora SA and POWO, and a
//! Gemini comparison against the specimen notes, rendered as HTML.

pub mod cli;
pub mod config;
pub mod error;
pub mod http;
pub mod logging;
pub mod occurrence;
pub mod orchestrator;
pub mod pipeline;
pub mod report;
pub mod retry;
pub mod sources;
pub mod synthesizer;
