//! Scientific name helpers

use crate::types::SpeciesRecord;
use std::collections::BTreeSet;

/// First two whitespace-separated tokens (genus + epithet)
pub fn binomial(scientific_name: &str) -> String {
    scientific_name
        .split_whitespace()
        .take(2)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Deduplicates (exact, case-sensitive) and sorts species names.
/// Missing and blank names are dropped.
pub fn unique_sorted_species<I, S>(names: I) -> Vec<SpeciesRecord>
where
    I: IntoIterator<Item = Option<S>>,
    S: Into<String>,
{
    names
        .into_iter()
        .flatten()
        .map(Into::<String>::into)
        .filter(|name| !name.trim().is_empty())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .map(SpeciesRecord::new)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binomial_trims_authority() {
        assert_eq!(binomial("Struthiola myrsinites Lam."), "Struthiola myrsinites");
    }

    #[test]
    fn test_binomial_keeps_short_names() {
        assert_eq!(binomial("Passerina"), "Passerina");
        assert_eq!(binomial(""), "");
    }

    #[test]
    fn test_binomial_collapses_whitespace() {
        assert_eq!(binomial("  Gnidia   juniperifolia  "), "Gnidia juniperifolia");
    }

    #[test]
    fn test_unique_sorted_species() {
        let names = vec![
            Some("Struthiola myrsinites"),
            None,
            Some("Passerina rigida"),
            Some(""),
            Some("Struthiola myrsinites"),
            Some("passerina rigida"),
        ];
        let species = unique_sorted_species(names);
        let names: Vec<&str> = species.iter().map(|s| s.scientific_name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Passerina rigida", "Struthiola myrsinites", "passerina rigida"]
        );
    }
}
