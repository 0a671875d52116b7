//! Plants of the World Online (Kew)
//!
//! The search API yields an fqId; the general-information page carries a
//! `section#descriptions` made of per-source description blocks, each a
//! `dl` of term/definition pairs.

use super::html::{split_glued_sentences, stripped_text};
use super::DescriptionSource;
use crate::http::{get_json_soft, get_text_soft};
use crate::retry::RetryPolicy;
use async_trait::async_trait;
use flora_id_common::Outcome;
use reqwest::Client;
use scraper::{Html, Selector};
use serde::Deserialize;
use tracing::debug;

pub const POWO_ATTRIBUTION: &str = "--- According to Plants of the World Online (POWO) ---";

/// A page counts as morphological when any term label contains one of these
pub const MORPHOLOGICAL_KEYWORDS: &[&str] = &[
    "morphology",
    "habit",
    "leaves",
    "stem",
    "flowers",
    "fruit",
    "inflorescence",
    "bracts",
    "perianth",
    "style",
    "ecology",
    "note",
    "type",
];

const NO_SECTION: &str = "No description section found on POWO page.";
const NO_BLOCKS: &str = "Description section exists but contains no description blocks.";
const NO_MORPHOLOGY: &str = "No morphological description found on POWO.";

lazy_static::lazy_static! {
    static ref DESCRIPTIONS: Selector = Selector::parse("section#descriptions").unwrap();
    static ref BLOCK: Selector = Selector::parse("div.description").unwrap();
    static ref SOURCE_LABEL: Selector = Selector::parse("button.collapser span.text").unwrap();
    static ref TABLE: Selector = Selector::parse("dl.c-article-desc-table").unwrap();
    static ref TERM: Selector = Selector::parse("dt").unwrap();
    static ref DEFINITION: Selector = Selector::parse("dd").unwrap();
    static ref SPAN: Selector = Selector::parse("span").unwrap();
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<SearchHit>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SearchHit {
    fq_id: Option<String>,
    name: Option<String>,
}

pub fn has_morphological_keyword(term: &str) -> bool {
    let term = term.to_lowercase();
    MORPHOLOGICAL_KEYWORDS.iter().any(|k| term.contains(k))
}

pub struct PowoSource {
    client: Client,
    base_url: String,
    policy: RetryPolicy,
}

impl PowoSource {
    pub fn new(client: Client, base_url: &str, policy: RetryPolicy) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            policy,
        }
    }

    fn referer(&self) -> String {
        format!("{}/", self.base_url)
    }

    fn taxon_url(&self, fq_id: &str) -> String {
        format!("{}/taxon/{}/general-information", self.base_url, fq_id)
    }
}

#[async_trait]
impl DescriptionSource for PowoSource {
    fn name(&self) -> &str {
        "POWO"
    }

    async fn resolve(&self, binomial: &str) -> Option<String> {
        let url = format!("{}/api/2/search", self.base_url);
        let referer = self.referer();
        let response: SearchResponse = get_json_soft(
            &self.client,
            &self.policy,
            &url,
            &[("q", binomial)],
            Some(&referer),
        )
        .await?;

        let first = response.results.into_iter().next()?;
        let fq_id = first.fq_id.filter(|id| !id.is_empty())?;
        debug!(
            "POWO match: '{}' (ID: {})",
            first.name.as_deref().unwrap_or(binomial),
            fq_id
        );
        Some(self.taxon_url(&fq_id))
    }

    async fn fetch(&self, handle: &str) -> Option<String> {
        let referer = self.referer();
        get_text_soft(&self.client, &self.policy, handle, Some(&referer)).await
    }

    fn parse(&self, document: &str) -> Outcome {
        let html = Html::parse_document(document);
        let Some(section) = html.select(&DESCRIPTIONS).next() else {
            return Outcome::Missing(NO_SECTION.into());
        };

        let blocks: Vec<_> = section.select(&BLOCK).collect();
        if blocks.is_empty() {
            return Outcome::Missing(NO_BLOCKS.into());
        }

        let mut lines = Vec::new();
        let mut has_morphology = false;

        for block in blocks {
            let label = block
                .select(&SOURCE_LABEL)
                .next()
                .map(stripped_text)
                .unwrap_or_else(|| "Unknown Source".to_string());
            lines.push(format!("--- {} ---\n", label));

            let Some(table) = block.select(&TABLE).next() else {
                continue;
            };
            for (term, definition) in table.select(&TERM).zip(table.select(&DEFINITION)) {
                let term_text = term
                    .select(&SPAN)
                    .map(stripped_text)
                    .collect::<Vec<_>>()
                    .join(" ");
                if has_morphological_keyword(&term_text) {
                    has_morphology = true;
                }
                let definition_text = split_glued_sentences(&stripped_text(definition));
                lines.push(format!("{}:\n{}\n", term_text, definition_text));
            }
        }

        if !has_morphology {
            debug!("POWO page found, but it contains no useful morphological data");
            return Outcome::Missing(NO_MORPHOLOGY.into());
        }

        Outcome::Described(format!("{}\n\n{}", POWO_ATTRIBUTION, lines.join("\n")))
    }
}
