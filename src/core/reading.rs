//! Reading Assembly
//!
//! Draws cards for a spread, assembles the querent context consumed by
//! prompt composition, and packages the finished reading. Also hosts
//! Luna's greeting and daily-insight tables.

use crate::core::deck::{full_deck, Spread, TarotCard};
use crate::core::generation::types::ReadingContext;
use chrono::Utc;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Chance that a drawn card lands reversed.
const REVERSED_CHANCE: f64 = 0.3;

// ============================================================================
// Querent Profile
// ============================================================================

/// Querent context supplied by the caller. Everything is optional; an
/// empty profile reads as a new seeker.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserProfile {
    pub name: Option<String>,
    pub birth_date: Option<String>,
    pub zodiac_sign: Option<String>,
    pub previous_readings: Vec<PreviousReading>,
}

/// The slice of a past reading the context builder cares about.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PreviousReading {
    pub date: String,
}

// ============================================================================
// Readings
// ============================================================================

/// A finished reading as returned to the caller.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarotReading {
    pub id: String,
    pub date: String,
    pub cards: Vec<TarotCard>,
    pub interpretation: String,
    pub question: String,
    pub spread: String,
    pub reversed: Vec<bool>,
}

impl TarotReading {
    pub fn assemble(
        question: String,
        spread: &Spread,
        cards: Vec<TarotCard>,
        reversed: Vec<bool>,
        interpretation: String,
    ) -> Self {
        Self {
            id: format!("reading_{}", Uuid::new_v4()),
            date: Utc::now().to_rfc3339(),
            cards,
            interpretation,
            question,
            spread: spread.id.to_string(),
            reversed,
        }
    }
}

/// Shuffle the deck and draw one card per spread position, with each
/// card independently reversed at [`REVERSED_CHANCE`].
pub fn draw_spread(spread: &Spread) -> (Vec<TarotCard>, Vec<bool>) {
    draw_spread_with(spread, &mut rand::thread_rng())
}

pub fn draw_spread_with<R: Rng>(spread: &Spread, rng: &mut R) -> (Vec<TarotCard>, Vec<bool>) {
    let mut deck: Vec<TarotCard> = full_deck().to_vec();
    deck.shuffle(rng);
    let cards: Vec<TarotCard> = deck.into_iter().take(spread.positions.len()).collect();
    let reversed = cards.iter().map(|_| rng.gen_bool(REVERSED_CHANCE)).collect();
    (cards, reversed)
}

/// Build the context block a reading prompt is composed from.
pub fn reading_context(
    question: &str,
    spread: &Spread,
    cards: &[TarotCard],
    profile: &UserProfile,
) -> ReadingContext {
    ReadingContext {
        question: question.to_string(),
        spread: spread.id.to_string(),
        card_lines: cards
            .iter()
            .enumerate()
            .map(|(i, card)| format!("Position {}: {} - {}", i + 1, card.name, card.meaning))
            .collect(),
        querent_name: profile.name.clone(),
        birth_date: profile.birth_date.clone(),
        zodiac_sign: profile.zodiac_sign.clone(),
        last_reading_date: profile.previous_readings.first().map(|r| r.date.clone()),
    }
}

// ============================================================================
// Luna Greetings & Insights
// ============================================================================

const RETURNING_GREETINGS: &[&str] = &[
    "Welcome back, {name}. The stars have been whispering about you...",
    "Hello, dear {name}. I feel the universe has guided you here today for a reason.",
    "Blessed be, {name}. Your energy feels different today - ready for new insights?",
    "Greetings, {name}. The cosmic currents are particularly strong right now.",
];

const NEW_SEEKER_GREETINGS: &[&str] = &[
    "Welcome, beautiful soul. I'm Luna, and I'm honored to be your guide through the mystical realm of tarot.",
    "Hello, dear heart. The universe has brought you to me for spiritual guidance and wisdom.",
    "Blessed be, seeker. I sense you're ready to unlock the mysteries that the cards hold for you.",
];

const DAILY_INSIGHTS: &[&str] = &[
    "Today, the moon's energy encourages you to trust your intuition above all else.",
    "The cosmic winds carry messages of new beginnings. Stay open to unexpected opportunities.",
    "Your spiritual guides are particularly close today. Listen for their gentle whispers.",
    "The universe is aligning to support your highest good. Have faith in the journey.",
    "Today calls for patience and inner reflection. Great wisdom comes to those who wait.",
];

/// A warm opening line, personalized for returning querents.
pub fn personalized_greeting(profile: &UserProfile) -> String {
    personalized_greeting_with(profile, &mut rand::thread_rng())
}

pub fn personalized_greeting_with<R: Rng>(profile: &UserProfile, rng: &mut R) -> String {
    if !profile.previous_readings.is_empty() {
        let name = profile.name.as_deref().unwrap_or("beautiful soul");
        let template = RETURNING_GREETINGS[rng.gen_range(0..RETURNING_GREETINGS.len())];
        template.replace("{name}", name)
    } else {
        NEW_SEEKER_GREETINGS[rng.gen_range(0..NEW_SEEKER_GREETINGS.len())].to_string()
    }
}

/// One line of guidance for the day.
pub fn daily_insight() -> String {
    daily_insight_with(&mut rand::thread_rng())
}

pub fn daily_insight_with<R: Rng>(rng: &mut R) -> String {
    DAILY_INSIGHTS[rng.gen_range(0..DAILY_INSIGHTS.len())].to_string()
}

// ============================================================================
// Zodiac
// ============================================================================

/// Western zodiac sign for a calendar date.
pub fn zodiac_sign_for(month: u32, day: u32) -> &'static str {
    match (month, day) {
        (12, 22..) | (1, ..=19) => "Capricorn",
        (1, _) | (2, ..=18) => "Aquarius",
        (2, _) | (3, ..=20) => "Pisces",
        (3, _) | (4, ..=19) => "Aries",
        (4, _) | (5, ..=20) => "Taurus",
        (5, _) | (6, ..=20) => "Gemini",
        (6, _) | (7, ..=22) => "Cancer",
        (7, _) | (8, ..=22) => "Leo",
        (8, _) | (9, ..=22) => "Virgo",
        (9, _) | (10, ..=22) => "Libra",
        (10, _) | (11, ..=21) => "Scorpio",
        (11, _) | (12, _) => "Sagittarius",
        _ => "Capricorn",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::deck::find_spread;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_draw_matches_spread_size() {
        let spread = find_spread("threeCard").unwrap();
        let mut rng = StdRng::seed_from_u64(7);
        let (cards, reversed) = draw_spread_with(spread, &mut rng);
        assert_eq!(cards.len(), 3);
        assert_eq!(reversed.len(), 3);
    }

    #[test]
    fn test_draw_never_repeats_a_card() {
        let spread = find_spread("threeCard").unwrap();
        for seed in 0..50 {
            let mut rng = StdRng::seed_from_u64(seed);
            let (cards, _) = draw_spread_with(spread, &mut rng);
            let mut names: Vec<&str> = cards.iter().map(|c| c.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            assert_eq!(names.len(), cards.len(), "duplicate draw at seed {seed}");
        }
    }

    #[test]
    fn test_reading_context_lines_are_positional() {
        let spread = find_spread("threeCard").unwrap();
        let mut rng = StdRng::seed_from_u64(3);
        let (cards, _) = draw_spread_with(spread, &mut rng);
        let profile = UserProfile {
            name: Some("Riley".to_string()),
            previous_readings: vec![PreviousReading {
                date: "2024-11-02".to_string(),
            }],
            ..Default::default()
        };
        let context = reading_context("Where am I headed?", spread, &cards, &profile);
        assert_eq!(context.card_lines.len(), 3);
        assert!(context.card_lines[0].starts_with("Position 1: "));
        assert!(context.card_lines[2].starts_with("Position 3: "));
        assert_eq!(context.querent_name.as_deref(), Some("Riley"));
        assert_eq!(context.last_reading_date.as_deref(), Some("2024-11-02"));
    }

    #[test]
    fn test_assembled_reading_has_unique_id() {
        let spread = find_spread("single").unwrap();
        let mut rng = StdRng::seed_from_u64(1);
        let (cards, reversed) = draw_spread_with(spread, &mut rng);
        let a = TarotReading::assemble(
            "q".to_string(),
            spread,
            cards.clone(),
            reversed.clone(),
            "i".to_string(),
        );
        let b = TarotReading::assemble("q".to_string(), spread, cards, reversed, "i".to_string());
        assert!(a.id.starts_with("reading_"));
        assert_ne!(a.id, b.id);
        assert_eq!(a.spread, "single");
    }

    #[test]
    fn test_greeting_for_returning_querent_uses_name() {
        let profile = UserProfile {
            name: Some("Morgan".to_string()),
            previous_readings: vec![PreviousReading::default()],
            ..Default::default()
        };
        let mut rng = StdRng::seed_from_u64(11);
        let greeting = personalized_greeting_with(&profile, &mut rng);
        assert!(greeting.contains("Morgan"));
    }

    #[test]
    fn test_greeting_for_new_seeker() {
        let mut rng = StdRng::seed_from_u64(11);
        let greeting = personalized_greeting_with(&UserProfile::default(), &mut rng);
        assert!(NEW_SEEKER_GREETINGS.contains(&greeting.as_str()));
    }

    #[test]
    fn test_daily_insight_comes_from_table() {
        let mut rng = StdRng::seed_from_u64(5);
        let insight = daily_insight_with(&mut rng);
        assert!(DAILY_INSIGHTS.contains(&insight.as_str()));
    }

    #[test]
    fn test_zodiac_boundaries() {
        assert_eq!(zodiac_sign_for(12, 22), "Capricorn");
        assert_eq!(zodiac_sign_for(1, 19), "Capricorn");
        assert_eq!(zodiac_sign_for(1, 20), "Aquarius");
        assert_eq!(zodiac_sign_for(3, 21), "Aries");
        assert_eq!(zodiac_sign_for(8, 23), "Virgo");
        assert_eq!(zodiac_sign_for(11, 22), "Sagittarius");
    }
}
