//! HTML rendering for the upload page and result fragment.

use crate::inference::Prediction;
use crate::store;

/// Base page with the upload form. The result slot marker is replaced with
/// the rendered fragment on non-script form submissions.
const PAGE_TEMPLATE: &str = include_str!("../../templates/index.html");

/// Marker inside the template where a result fragment is inlined.
const RESULT_SLOT: &str = "<!--RESULT-->";

/// Render the full page, optionally with a result fragment inlined.
pub fn page(fragment: Option<&str>) -> String {
    PAGE_TEMPLATE.replace(RESULT_SLOT, fragment.unwrap_or(""))
}

/// Render the result fragment for one classified upload.
///
/// Contains the playback element for the stored clip, the confidence
/// percentage, the inline species image, and the species name.
pub fn result_fragment(prediction: &Prediction, audio_key: &str, image_uri: &str) -> String {
    let label = escape_html(&prediction.label);
    let mime = store::content_type(audio_key);
    let uncertain_note = if prediction.uncertain {
        "\n        <p class=\"uncertain\">Low confidence: the match is uncertain.</p>"
    } else {
        ""
    };

    format!(
        r#"<div class="result">
        <h3>Uploaded Audio</h3>
        <audio controls>
            <source src="/uploads/{audio_key}" type="{mime}">
            Your browser does not support the audio element.
        </audio>
        <h2>{confidence:.2}% Match</h2>{uncertain_note}
        <img src="{image_uri}" alt="{label}" />
        <h1>{label}</h1>
    </div>"#,
        confidence = prediction.confidence,
    )
}

/// Escape text for safe interpolation into HTML.
pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn prediction(uncertain: bool) -> Prediction {
        Prediction {
            label: "Asian Koel".to_string(),
            index: 1,
            confidence: 93.27,
            uncertain,
        }
    }

    #[test]
    fn test_page_without_fragment_has_empty_slot() {
        let html = page(None);
        assert!(html.contains("uploadForm"));
        assert!(!html.contains(RESULT_SLOT));
        assert!(!html.contains("class=\"result\""));
    }

    #[test]
    fn test_page_inlines_fragment() {
        let fragment = result_fragment(&prediction(false), "abc.wav", "data:image/jpeg;base64,xx");
        let html = page(Some(&fragment));
        assert!(html.contains("Asian Koel"));
        assert!(html.contains("93.27% Match"));
    }

    #[test]
    fn test_fragment_references_stored_key() {
        let fragment = result_fragment(&prediction(false), "abc.wav", "data:image/jpeg;base64,xx");
        assert!(fragment.contains("/uploads/abc.wav"));
        assert!(fragment.contains("type=\"audio/wav\""));
    }

    #[test]
    fn test_uncertain_note_rendered_only_when_flagged() {
        let plain = result_fragment(&prediction(false), "a.wav", "i");
        let flagged = result_fragment(&prediction(true), "a.wav", "i");
        assert!(!plain.contains("Low confidence"));
        assert!(flagged.contains("Low confidence"));
    }

    #[test]
    fn test_label_is_escaped() {
        let mut p = prediction(false);
        p.label = "<script>alert(1)</script>".to_string();
        let fragment = result_fragment(&p, "a.wav", "i");
        assert!(!fragment.contains("<script>"));
        assert!(fragment.contains("&lt;script&gt;"));
    }

    #[test]
    fn test_escape_html() {
        assert_eq!(escape_html("a & b"), "a &amp; b");
        assert_eq!(escape_html("\"quoted\""), "&quot;quoted&quot;");
        assert_eq!(escape_html("plain"), "plain");
    }
}
