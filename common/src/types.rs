//! Shared type definitions
//!
//! Types that flow through one identification run:
//! - SearchQuery: where and what to search
//! - SpeciesRecord: one candidate species from the occurrence service
//! - DescriptionResult: outcome of the description lookup for one species
//! - AnalysisInput / AnalysisOutput: prompt material and model answer

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Smallest radius accepted from the user (km)
pub const MIN_RADIUS_KM: f64 = 1.0;
/// Largest radius accepted from the user (km)
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Occurrence search parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchQuery {
    pub latitude: f64,
    pub longitude: f64,
    pub radius_km: f64,
    pub taxon_name: String,
}

impl SearchQuery {
    /// Builds a query, rejecting values the occurrence search cannot use.
    pub fn new(latitude: f64, longitude: f64, radius_km: f64, taxon_name: impl Into<String>) -> Result<Self> {
        let query = Self {
            latitude,
            longitude,
            radius_km,
            taxon_name: taxon_name.into(),
        };
        query.validate()?;
        Ok(query)
    }

    pub fn validate(&self) -> Result<()> {
        if self.radius_km.is_nan() || self.radius_km <= 0.0 {
            return Err(Error::InvalidQuery(format!(
                "radius must be greater than 0 km (got {})",
                self.radius_km
            )));
        }
        if !(-90.0..=90.0).contains(&self.latitude) {
            return Err(Error::InvalidQuery(format!(
                "latitude out of range: {}",
                self.latitude
            )));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            return Err(Error::InvalidQuery(format!(
                "longitude out of range: {}",
                self.longitude
            )));
        }
        if self.taxon_name.trim().is_empty() {
            return Err(Error::InvalidQuery("taxon name is empty".into()));
        }
        Ok(())
    }
}

/// A species recorded inside the search window
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SpeciesRecord {
    pub scientific_name: String,
}

impl SpeciesRecord {
    pub fn new(scientific_name: impl Into<String>) -> Self {
        Self {
            scientific_name: scientific_name.into(),
        }
    }

    /// Genus + epithet, the key used by the description sources
    pub fn binomial(&self) -> String {
        crate::names::binomial(&self.scientific_name)
    }
}

/// Either the scraped text or the reason nothing usable was found
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "status", content = "value")]
pub enum Outcome {
    Described(String),
    Missing(String),
}

/// Description lookup result for one species
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptionResult {
    pub species_name: String,
    pub outcome: Outcome,
}

impl DescriptionResult {
    pub fn described(species_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            species_name: species_name.into(),
            outcome: Outcome::Described(text.into()),
        }
    }

    pub fn missing(species_name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            species_name: species_name.into(),
            outcome: Outcome::Missing(reason.into()),
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, Outcome::Described(_))
    }

    pub fn text(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Described(text) => Some(text),
            Outcome::Missing(_) => None,
        }
    }

    pub fn failure_reason(&self) -> Option<&str> {
        match &self.outcome {
            Outcome::Described(_) => None,
            Outcome::Missing(reason) => Some(reason),
        }
    }
}

/// Material embedded into the analysis prompt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisInput {
    /// Successful descriptions, each preceded by a per-species header
    pub aggregated_descriptions: String,
    /// Species without a description, one `- name` line each
    pub failed_names_list: String,
    pub specimen_notes: String,
    pub label_notes: String,
}

/// Model answer, kept as opaque markdown
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisOutput {
    pub markup_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_rejects_zero_radius() {
        let err = SearchQuery::new(-34.46, 20.40, 0.0, "Thymelaeaceae").unwrap_err();
        assert!(matches!(err, Error::InvalidQuery(_)));
    }

    #[test]
    fn test_query_rejects_nan_radius() {
        assert!(SearchQuery::new(-34.46, 20.40, f64::NAN, "Thymelaeaceae").is_err());
    }

    #[test]
    fn test_query_rejects_blank_taxon() {
        assert!(SearchQuery::new(-34.46, 20.40, 4.0, "  ").is_err());
    }

    #[test]
    fn test_query_accepts_valid_values() {
        let query = SearchQuery::new(-34.46, 20.40, 4.0, "Thymelaeaceae").unwrap();
        assert_eq!(query.taxon_name, "Thymelaeaceae");
    }

    #[test]
    fn test_description_result_accessors() {
        let ok = DescriptionResult::described("Passerina rigida", "text");
        assert!(ok.succeeded());
        assert_eq!(ok.text(), Some("text"));
        assert_eq!(ok.failure_reason(), None);

        let missing = DescriptionResult::missing("Passerina rigida", "not found");
        assert!(!missing.succeeded());
        assert_eq!(missing.text(), None);
        assert_eq!(missing.failure_reason(), Some("not found"));
    }

    #[test]
    fn test_species_record_binomial() {
        let record = SpeciesRecord::new("Gnidia pinifolia L.");
        assert_eq!(record.binomial(), "Gnidia pinifolia");
    }

    #[test]
    fn test_description_result_serialize() {
        let json = serde_json::to_string(&DescriptionResult::missing("A b", "gone")).unwrap();
        assert!(json.contains("\"speciesName\":\"A b\""));
        assert!(json.contains("\"status\":\"missing\""));
    }
}
