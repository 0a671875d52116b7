//! Fallback orchestration over the description sources
//!
//! Species are processed strictly one after another, in input order. For
//! each species the sources are tried in configured order and the first
//! success wins. A fixed pause separates consecutive species.

use crate::sources::DescriptionSource;
use flora_id_common::{DescriptionResult, Outcome, SpeciesRecord};
use std::time::Duration;
use tracing::{debug, info};

/// Failure reason when every source came up empty, e.g.
/// "No valid description found on e-Flora SA or POWO."
pub fn exhausted_reason(source_names: &[&str]) -> String {
    let names = match source_names {
        [] => "any source".to_string(),
        [only] => only.to_string(),
        [init @ .., last] => format!("{} or {}", init.join(", "), last),
    };
    format!("No valid description found on {}.", names)
}

/// Description for one species, trying `sources` in order. Lookups use the
/// binomial; the result keeps the full scientific name.
pub async fn describe_species(
    sources: &[Box<dyn DescriptionSource>],
    species: &SpeciesRecord,
) -> DescriptionResult {
    let binomial = species.binomial();

    for source in sources {
        let result = source.fetch_description(&binomial).await;
        match result.outcome {
            Outcome::Described(text) => {
                info!("{}: description found on {}", species.scientific_name, source.name());
                return DescriptionResult::described(species.scientific_name.clone(), text);
            }
            Outcome::Missing(reason) => {
                debug!("{}: {} failed: {}", species.scientific_name, source.name(), reason);
            }
        }
    }

    let names: Vec<&str> = sources.iter().map(|s| s.name()).collect();
    info!("{}: no description on any source", species.scientific_name);
    DescriptionResult::missing(species.scientific_name.clone(), exhausted_reason(&names))
}

/// One result per species, in input order.
///
/// `on_progress(current, total, species_name)` fires before each species.
pub async fn collect_descriptions(
    sources: &[Box<dyn DescriptionSource>],
    species: &[SpeciesRecord],
    delay: Duration,
    on_progress: impl Fn(usize, usize, &str),
) -> Vec<DescriptionResult> {
    let total = species.len();
    let mut results = Vec::with_capacity(total);

    for (idx, record) in species.iter().enumerate() {
        if idx > 0 && !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        on_progress(idx + 1, total, &record.scientific_name);
        results.push(describe_species(sources, record).await);
    }

    results
}
