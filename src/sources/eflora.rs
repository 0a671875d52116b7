//! e-Flora of South Africa (SANBI Biodiversity Advisor)
//!
//! Resolution goes through the site's server-side search; the first hit is
//! accepted only when the binomial appears in its name or synonyms. Detail
//! pages hold `details-bordered` blocks, of which a fixed set of headings
//! is kept.

use super::html::stripped_text;
use super::DescriptionSource;
use crate::http::{get_json_soft, get_text_soft};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use flora_id_common::Outcome;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use serde_json::Value;
use tracing::debug;

pub const EFLORA_ATTRIBUTION: &str = "--- According to e-Flora of South Africa (SANBI) ---";

/// Block headings copied into the description, matched exactly
pub const EFLORA_HEADINGS: &[&str] = &[
    "Morphological description",
    "Habitat",
    "Distribution",
    "Flowering time",
    "Altitude",
];

const NO_SECTIONS: &str = "e-Flora SA page found, but no relevant description sections could be parsed.";

lazy_static::lazy_static! {
    static ref BLOCK: Selector = Selector::parse("div.details-bordered").unwrap();
    static ref HEADING: Selector = Selector::parse("div.details-bordered-heading").unwrap();
    static ref BODY: Selector = Selector::parse("div.details-bordered-body").unwrap();
    static ref PARAGRAPH: Selector = Selector::parse("p").unwrap();
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    data: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
struct SearchHit {
    #[serde(rename = "_source", default)]
    source: HitSource,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct HitSource {
    italicspeciesname: String,
    synonyms: Value,
    speciesid: Value,
}

fn value_text(value: &Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub struct EfloraSource {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl EfloraSource {
    pub fn new(client: Client, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    fn detail_url(&self, species_id: &str) -> String {
        format!("{}/search/detail/{}", self.base_url, species_id)
    }

    /// Detail-page id of the first hit, if that hit is really the species
    fn matching_species_id(response: &SearchResponse, binomial: &str) -> Option<String> {
        let first = &response.data.first()?.source;
        let wanted = binomial.to_lowercase();
        let name_matches = first.italicspeciesname.to_lowercase().contains(&wanted);
        let synonym_matches = value_text(&first.synonyms).to_lowercase().contains(&wanted);
        if !(name_matches || synonym_matches) {
            return None;
        }

        Some(value_text(&first.speciesid)).filter(|id| !id.is_empty())
    }
}

#[async_trait]
impl DescriptionSource for EfloraSource {
    fn name(&self) -> &str {
        "e-Flora SA"
    }

    async fn resolve(&self, binomial: &str) -> Option<String> {
        let url = format!("{}/search/ServersideSearch", self.base_url);
        let params = [
            ("q", binomial),
            ("index", "bodatsa"),
            ("filter", "synonyms"),
            ("sortBy", "_score"),
            ("sortOrder", "asc"),
        ];
        let response: SearchResponse =
            get_json_soft(&self.client, &self.policy, &url, &params, None).await?;

        let species_id = Self::matching_species_id(&response, binomial)?;
        Some(self.detail_url(&species_id))
    }

    async fn fetch(&self, handle: &str) -> Option<String> {
        get_text_soft(&self.client, &self.policy, handle, None).await
    }

    fn parse(&self, document: &str) -> Outcome {
        let html = Html::parse_document(document);
        let mut sections = Vec::new();

        for block in html.select(&BLOCK) {
            let (Some(heading), Some(body)) = (block.select(&HEADING).next(), block.select(&BODY).next()) else {
                continue;
            };
            let heading_text = stripped_text(heading);
            if !EFLORA_HEADINGS.contains(&heading_text.as_str()) {
                continue;
            }

            let body_text = body
                .select(&PARAGRAPH)
                .map(stripped_text)
                .filter(|p| !p.is_empty())
                .collect::<Vec<_>>()
                .join("\n");
            if !body_text.is_empty() {
                sections.push(format!("--- {} ---\n{}", heading_text, body_text));
            }
        }

        if sections.is_empty() {
            debug!("e-Flora SA page had no usable sections");
            return Outcome::Missing(NO_SECTIONS.into());
        }

        Outcome::Described(format!("{}\n\n{}", EFLORA_ATTRIBUTION, sections.join("\n\n")))
    }
}
