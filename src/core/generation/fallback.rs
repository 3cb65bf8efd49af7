//! Fallback Artifact Synthesis
//!
//! Locally computed substitute artifacts for when no provider succeeds.
//! Pure and total: deterministic for a given request, no network access,
//! cannot fail. The engine stamps every synthesized result `degraded`.

use super::types::{ArtifactKind, GenerationRequest, GenerationResult};

/// Origin tag carried by synthesized results.
pub const FALLBACK_PROVIDER: &str = "fallback";

/// Produce a substitute artifact for the request.
pub fn synthesize(request: &GenerationRequest) -> GenerationResult {
    let artifact = match request.kind {
        ArtifactKind::Text => fallback_reading(request),
        ArtifactKind::Image => fallback_card_image(request),
    };
    GenerationResult {
        artifact,
        provider: FALLBACK_PROVIDER.to_string(),
        degraded: true,
    }
}

/// A short templated narrative built entirely from the request fields,
/// so it carries genuine card-specific content rather than an apology.
fn fallback_reading(request: &GenerationRequest) -> String {
    let querent = request
        .reading
        .as_ref()
        .and_then(|r| r.querent_name.clone())
        .unwrap_or_else(|| "beautiful soul".to_string());

    let question = request
        .reading
        .as_ref()
        .filter(|r| !r.question.is_empty())
        .map(|r| r.question.clone())
        .unwrap_or_else(|| "your path forward".to_string());

    let whispers = match request.keywords.as_slice() {
        [] => request.card_name.to_lowercase(),
        [only] => only.clone(),
        [first, second, ..] => format!("{} and {}", first, second),
    };

    format!(
        "Hello {querent},\n\n\
         I sense the cosmic energies have drawn {card} to answer your question about \"{question}\".\n\n\
         {card} speaks to your current situation, suggesting {meaning}. \
         This card whispers of {whispers}.\n\n\
         The universe is guiding you toward growth and understanding. Trust in your \
         inner wisdom, for the answers you seek already live within your heart.\n\n\
         Remember, dear heart, you have the power to shape your destiny. These cards \
         are simply mirrors reflecting your own infinite potential.\n\n\
         With love and light,\n\
         Luna 🌙✨",
        querent = querent,
        card = request.card_name,
        question = question,
        meaning = request.meaning.to_lowercase(),
        whispers = whispers,
    )
}

/// A self-contained SVG card panel carried inline as a `data:` URI, so
/// the artifact renders without any external fetch.
fn fallback_card_image(request: &GenerationRequest) -> String {
    let name = xml_escape(&request.card_name);
    let meaning: String = request.meaning.chars().take(50).collect();
    let meaning = xml_escape(&meaning);
    let keywords = xml_escape(
        &request
            .keywords
            .iter()
            .take(2)
            .map(String::as_str)
            .collect::<Vec<_>>()
            .join(" \u{2022} "),
    );

    let svg = format!(
        r##"<svg width="512" height="896" xmlns="http://www.w3.org/2000/svg"><defs><linearGradient id="bg" x1="0%" y1="0%" x2="100%" y2="100%"><stop offset="0%" style="stop-color:#2d1b4e;stop-opacity:1"/><stop offset="100%" style="stop-color:#4a0e4e;stop-opacity:1"/></linearGradient></defs><rect width="512" height="896" fill="url(#bg)"/><rect x="20" y="20" width="472" height="856" fill="none" stroke="#d4af37" stroke-width="3"/><text x="256" y="150" font-family="serif" font-size="32" fill="#d4af37" text-anchor="middle">{name}</text><text x="256" y="450" font-family="serif" font-size="120" fill="#d4af37" text-anchor="middle">&#10022;</text><text x="256" y="650" font-family="serif" font-size="18" fill="#ffffff" text-anchor="middle">{meaning}...</text><text x="256" y="750" font-family="serif" font-size="16" fill="#8a2be2" text-anchor="middle">{keywords}</text></svg>"##,
        name = name,
        meaning = meaning,
        keywords = keywords,
    );

    format!("data:image/svg+xml;utf8,{}", svg)
}

/// Escape text interpolated into SVG markup.
fn xml_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deck::find_card;
    use crate::core::generation::types::{GenerationRequest, ReadingContext};

    fn fool_image_request() -> GenerationRequest {
        GenerationRequest::image_for(find_card("The Fool").unwrap())
    }

    #[test]
    fn test_synthesize_is_idempotent() {
        let request = fool_image_request();
        let first = synthesize(&request);
        let second = synthesize(&request);
        assert_eq!(first, second);
    }

    #[test]
    fn test_image_fallback_is_embedded_svg() {
        let result = synthesize(&fool_image_request());
        assert!(result.degraded);
        assert_eq!(result.provider, FALLBACK_PROVIDER);
        assert!(result.artifact.starts_with("data:image/svg+xml;utf8,<svg"));
        // The locator itself carries the card content; no second fetch.
        assert!(result.artifact.contains("The Fool"));
        assert!(result.artifact.contains("new beginnings \u{2022} innocence"));
    }

    #[test]
    fn test_image_fallback_escapes_markup() {
        let mut request = fool_image_request();
        request.card_name = "Cups & <Wands>".to_string();
        let result = synthesize(&request);
        assert!(result.artifact.contains("Cups &amp; &lt;Wands&gt;"));
        assert!(!result.artifact.contains("<Wands>"));
    }

    #[test]
    fn test_text_fallback_names_card_and_keywords() {
        let card = find_card("The Fool").unwrap();
        let context = ReadingContext {
            question: "Should I take the leap?".to_string(),
            querent_name: Some("Ash".to_string()),
            ..Default::default()
        };
        let result = synthesize(&GenerationRequest::reading_for(card, context));
        assert!(result.degraded);
        assert!(result.artifact.contains("Hello Ash,"));
        assert!(result.artifact.contains("The Fool"));
        assert!(result.artifact.contains("new beginnings and innocence"));
        assert!(result.artifact.contains("Should I take the leap?"));
        assert!(result.artifact.ends_with("Luna 🌙✨"));
    }

    #[test]
    fn test_text_fallback_defaults_for_anonymous_querent() {
        let card = find_card("The Fool").unwrap();
        let mut request = GenerationRequest::reading_for(card, ReadingContext::default());
        request.reading = None;
        let result = synthesize(&request);
        assert!(result.artifact.contains("Hello beautiful soul,"));
        assert!(result.artifact.contains("your path forward"));
    }

    #[test]
    fn test_text_fallback_single_keyword() {
        let card = find_card("The Fool").unwrap();
        let mut request = GenerationRequest::reading_for(card, ReadingContext::default());
        request.keywords = vec!["innocence".to_string()];
        let result = synthesize(&request);
        assert!(result.artifact.contains("whispers of innocence."));
    }
}
