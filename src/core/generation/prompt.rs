//! Prompt Composition
//!
//! Builds provider-agnostic prompts from a [`GenerationRequest`]. Pure
//! functions: no I/O, deterministic, and total — absent optional fields
//! are simply omitted from the output.

use super::types::{ArtifactKind, GenerationRequest, ReadingContext};
use crate::core::deck::{Arcana, Element};

/// Base art direction shared by every card art prompt.
const IMAGE_BASE_STYLE: &str = "mystical tarot card art, ethereal, magical, detailed illustration, \
     fantasy art style, rich colors, symbolic imagery";

/// Framing cues appended to every card art prompt.
const IMAGE_FRAME_STYLE: &str =
    "tarot card border, ornate frame, golden accents, mystical symbols";

/// Quality suffix closing every card art prompt.
const IMAGE_QUALITY_SUFFIX: &str = "high quality, 4k resolution, professional digital art";

/// Luna's persona, used as the system prompt for reading generation.
pub const LUNA_PERSONA: &str = "\
You are Luna, a mystical AI tarot reader with a warm, empathetic, and slightly mysterious personality.

PERSONALITY TRAITS:
- Warm and nurturing, like a wise older sister
- Speaks with gentle authority and spiritual wisdom
- Uses mystical language but remains relatable and modern
- Remembers details about users and references their previous readings
- Empathetic and emotionally intelligent

SPEAKING STYLE:
- Address users warmly (beautiful soul, dear heart, etc.)
- Use mystical metaphors naturally (energy flows, cosmic guidance, spiritual pathways)
- Reference moon phases, elements, and celestial events when relevant
- Keep responses conversational but profound
- Always end with encouragement or loving guidance

APPROACH TO READINGS:
- Focus on empowerment rather than prediction
- Help users find their own inner wisdom
- Connect card meanings to their personal situation
- Provide hope while being honest about challenges
- Encourage personal growth and self-reflection

REMEMBER:
- You are a guide, not a fortune teller
- Emphasize free will and personal power
- Be supportive of all life choices and paths
- Maintain mystical ambiance while being genuinely helpful";

/// How many leading keywords a prompt includes. Extra keywords are
/// truncated; short lists are never padded.
const MAX_PROMPT_KEYWORDS: usize = 3;

/// Compose the prompt for a request, dispatching on its artifact kind.
pub fn compose(request: &GenerationRequest) -> String {
    match request.kind {
        ArtifactKind::Image => compose_image_prompt(request),
        ArtifactKind::Text => compose_reading_prompt(request),
    }
}

/// Style fragment for an elemental affinity.
fn element_style(element: Element) -> &'static str {
    match element {
        Element::Fire => "fiery reds and oranges, flames, passion, energy",
        Element::Water => "deep blues and teals, flowing water, emotions, intuition",
        Element::Earth => "rich browns and greens, mountains, stability, nature",
        Element::Air => "light yellows and whites, clouds, wind, intellect",
    }
}

/// Style fragment distinguishing the arcana tiers.
fn arcana_style(arcana: Arcana) -> &'static str {
    match arcana {
        Arcana::Major => "major arcana significance, profound spiritual symbolism, archetypal imagery",
        Arcana::Minor => "minor arcana detail, everyday wisdom, practical guidance",
    }
}

/// Card art prompt: name and meaning, leading keywords, elemental and
/// arcana style fragments, then the fixed art direction.
fn compose_image_prompt(request: &GenerationRequest) -> String {
    let mut prompt = format!("{} tarot card, {}, ", request.card_name, request.meaning);

    if !request.keywords.is_empty() {
        let leading: Vec<&str> = request
            .keywords
            .iter()
            .take(MAX_PROMPT_KEYWORDS)
            .map(String::as_str)
            .collect();
        prompt.push_str(&format!("representing {}, ", leading.join(", ")));
    }

    if let Some(element) = request.element {
        prompt.push_str(element_style(element));
        prompt.push_str(", ");
    }

    prompt.push_str(arcana_style(request.arcana));
    prompt.push_str(", ");

    prompt.push_str(IMAGE_BASE_STYLE);
    prompt.push_str(", ");
    prompt.push_str(IMAGE_FRAME_STYLE);
    prompt.push_str(", ");
    prompt.push_str(IMAGE_QUALITY_SUFFIX);

    prompt
}

/// Querent context block for a reading prompt. Empty profile fields are
/// omitted; a context with nothing set reads as a new seeker.
fn user_context_block(context: &ReadingContext) -> String {
    let mut block = String::new();
    if let Some(name) = &context.querent_name {
        block.push_str(&format!("User's name: {}\n", name));
    }
    if let Some(birth_date) = &context.birth_date {
        block.push_str(&format!("Birth date: {}\n", birth_date));
    }
    if let Some(sign) = &context.zodiac_sign {
        block.push_str(&format!("Zodiac sign: {}\n", sign));
    }
    if let Some(date) = &context.last_reading_date {
        block.push_str(&format!("Recent reading: {} - Asked about similar themes\n", date));
    }
    if block.is_empty() {
        block.push_str("New user seeking guidance");
    }
    block
}

/// Reading prompt: persona, querent context, the question and spread,
/// the card-by-card breakdown, and the instruction block.
fn compose_reading_prompt(request: &GenerationRequest) -> String {
    let context = request.reading.clone().unwrap_or_else(|| ReadingContext {
        card_lines: vec![format!("Position 1: {} - {}", request.card_name, request.meaning)],
        ..Default::default()
    });

    let card_block = if context.card_lines.is_empty() {
        format!("Position 1: {} - {}", request.card_name, request.meaning)
    } else {
        context.card_lines.join("\n")
    };

    let question = if context.question.is_empty() {
        "What guidance do the cards hold for me?".to_string()
    } else {
        context.question.clone()
    };

    let spread = if context.spread.is_empty() {
        "single".to_string()
    } else {
        context.spread.clone()
    };

    format!(
        "{persona}\n\n\
         USER CONTEXT:\n{user_context}\n\n\
         CURRENT READING:\n\
         Question: \"{question}\"\n\
         Spread: {spread}\n\
         Cards drawn:\n{cards}\n\n\
         Please provide Luna's interpretation of this reading. Include:\n\
         1. A warm greeting that acknowledges the user personally\n\
         2. Interpretation of each card in relation to their question\n\
         3. How the cards connect to tell a cohesive story\n\
         4. Practical guidance and empowerment\n\
         5. A loving, encouraging closing\n\n\
         Keep the tone mystical but warm, and make it feel like a personal \
         conversation with a trusted spiritual guide. Length: 300-500 words.",
        persona = LUNA_PERSONA,
        user_context = user_context_block(&context),
        question = question,
        spread = spread,
        cards = card_block,
    )
}
