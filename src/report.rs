//! HTML report rendering
//!
//! The analysis markdown becomes the report body; the raw aggregated
//! descriptions go verbatim (escaped) into a collapsible appendix.

use crate::error::{FloraIdError, Result};
use pulldown_cmark::{html, Options, Parser};
use std::path::Path;

pub const REPORT_TITLE: &str = "Taxonomic Analysis Report";

const APPENDIX_HEADING: &str = "Verbatim Scraped Data for Manual Analysis";
const APPENDIX_OPEN: &str = r#"<pre style="white-space: pre-wrap; word-wrap: break-word; background-color: #f6f8fa; padding: 15px; border-radius: 5px; border: 1px solid #ddd;"><code>"#;
const APPENDIX_CLOSE: &str = "</code></pre>";

const STYLESHEET: &str = r#"
        body { font-family: -apple-system, BlinkMacSystemFont, "Segoe UI", Roboto, Helvetica, Arial, sans-serif; line-height: 1.6; max-width: 800px; margin: 20px auto; padding: 25px; border: 1px solid #e1e1e1; border-radius: 8px; box-shadow: 0 2px 5px rgba(0,0,0,0.05); }
        table { border-collapse: collapse; width: 100%; margin-top: 1em; margin-bottom: 1em; }
        th, td { text-align: left; padding: 12px; border: 1px solid #ddd; vertical-align: top; }
        th { background-color: #f7f7f7; font-weight: 600; }
        h1, h2, h3 { color: #2d3748; border-bottom: 1px solid #e2e8f0; padding-bottom: 0.3em; }
        details { margin-top: 1.5em; border: 1px solid #ddd; border-radius: 5px; padding: 10px; }
        summary { font-weight: bold; cursor: pointer; }
        footer { margin-top: 2em; color: #718096; font-size: 0.85em; }
"#;

/// Markdown (with tables) → HTML fragment
pub fn markdown_to_html(markdown: &str) -> String {
    let parser = Parser::new_ext(markdown, Options::ENABLE_TABLES);
    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, parser);
    out
}

pub fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

/// Inverse of `html_escape`
pub fn html_unescape(s: &str) -> String {
    s.replace("&#39;", "'")
        .replace("&quot;", "\"")
        .replace("&gt;", ">")
        .replace("&lt;", "<")
        .replace("&amp;", "&")
}

/// Full standalone document. The appendix is omitted when there is no
/// verbatim data.
pub fn render_report(analysis: &str, verbatim: &str, generated_at: &str) -> String {
    let body = markdown_to_html(analysis);

    let appendix = if verbatim.is_empty() {
        String::new()
    } else {
        format!(
            "\n<hr><h2>{}</h2>\n<details><summary>Click to expand/collapse raw data</summary>\n{}{}{}\n</details>",
            APPENDIX_HEADING,
            APPENDIX_OPEN,
            html_escape(verbatim),
            APPENDIX_CLOSE
        )
    };

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="UTF-8">
<title>{title}</title>
<style>{style}</style>
</head>
<body>
<h1>{title}</h1>
{body}{appendix}
<footer>Generated {generated_at}</footer>
</body>
</html>
"#,
        title = REPORT_TITLE,
        style = STYLESHEET,
        body = body,
        appendix = appendix,
        generated_at = html_escape(generated_at),
    )
}

/// Verbatim data recovered from a rendered report
pub fn extract_appendix(document: &str) -> Option<String> {
    let start = document.find(APPENDIX_OPEN)? + APPENDIX_OPEN.len();
    let len = document[start..].find(APPENDIX_CLOSE)?;
    Some(html_unescape(&document[start..start + len]))
}

/// Renders and writes the report, stamped with the local time
pub fn write_report(path: &Path, analysis: &str, verbatim: &str) -> Result<()> {
    let generated_at = chrono::Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let document = render_report(analysis, verbatim, &generated_at);

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| FloraIdError::ReportWrite(format!("{}: {}", parent.display(), e)))?;
    }
    std::fs::write(path, document)
        .map_err(|e| FloraIdError::ReportWrite(format!("{}: {}", path.display(), e)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_markdown_tables_rendered() {
        let html = markdown_to_html("| Feature | A |\n|---|---|\n| Leaves | linear |\n");
        assert!(html.contains("<table>"));
        assert!(html.contains("<td>linear</td>"));
    }

    #[test]
    fn test_escape_unescape_round_trip() {
        let raw = r#"<b>"Passerina" & 'Gnidia'</b>"#;
        let escaped = html_escape(raw);
        assert!(!escaped.contains('<'));
        assert_eq!(html_unescape(&escaped), raw);
    }

    #[test]
    fn test_literal_entity_survives_round_trip() {
        let raw = "already escaped: &lt;";
        assert_eq!(html_unescape(&html_escape(raw)), raw);
    }

    #[test]
    fn test_report_contains_analysis_and_appendix() {
        let verbatim = "--- Data for Passerina rigida ---\nLeaves <2 mm & linear";
        let html = render_report("## 1. Overall Analysis\nClosest: *Passerina*", verbatim, "2024-01-01 10:00:00");

        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains("<title>Taxonomic Analysis Report</title>"));
        assert!(html.contains("<h2>1. Overall Analysis</h2>"));
        assert!(html.contains("<em>Passerina</em>"));
        assert!(html.contains("<details><summary>"));
        assert!(html.contains("Leaves &lt;2 mm &amp; linear"));
        assert!(html.contains("Generated 2024-01-01 10:00:00"));
        assert_eq!(extract_appendix(&html).as_deref(), Some(verbatim));
    }

    #[test]
    fn test_report_without_verbatim_has_no_appendix() {
        let html = render_report("text", "", "now");
        assert!(!html.contains("<details>"));
        assert_eq!(extract_appendix(&html), None);
    }
}
