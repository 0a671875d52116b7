//! Text helpers for scraped pages

use regex::Regex;
use scraper::ElementRef;

/// Text of all descendant nodes, each trimmed, concatenated without separator
pub fn stripped_text(element: ElementRef<'_>) -> String {
    element.text().map(str::trim).collect()
}

/// Inserts a line break wherever a lowercase letter runs straight into an
/// uppercase one (sentences glued together by tag stripping)
pub fn split_glued_sentences(text: &str) -> String {
    lazy_static::lazy_static! {
        static ref GLUED_RE: Regex = Regex::new(r"([a-z])([A-Z])").unwrap();
    }
    GLUED_RE.replace_all(text, "$1\n$2").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use scraper::{Html, Selector};

    #[test]
    fn test_stripped_text_concatenates_trimmed_nodes() {
        let doc = Html::parse_fragment("<div> Leaves alternate <br/> <b>Flowers</b> red </div>");
        let div = doc.select(&Selector::parse("div").unwrap()).next().unwrap();
        assert_eq!(stripped_text(div), "Leaves alternateFlowersred");
    }

    #[test]
    fn test_split_glued_sentences() {
        assert_eq!(
            split_glued_sentences("Shrub to 1 m.Leaves alternateFlowers red"),
            "Shrub to 1 m.Leaves alternate\nFlowers red"
        );
    }

    #[test]
    fn test_split_glued_sentences_leaves_plain_text() {
        assert_eq!(split_glued_sentences("leaves 5-8 mm long"), "leaves 5-8 mm long");
    }
}
