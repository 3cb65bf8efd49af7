//! Tarot Card Database
//!
//! The card deck and spread definitions used by reading generation and
//! card art generation. Major Arcana entries carry their elemental and
//! astrological correspondences; the Minor Arcana entries cover the
//! aces and key cards of each suit.

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

// ============================================================================
// Card Types
// ============================================================================

/// Which arcana a card belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Arcana {
    Major,
    Minor,
}

impl std::fmt::Display for Arcana {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Arcana::Major => write!(f, "Major"),
            Arcana::Minor => write!(f, "Minor"),
        }
    }
}

/// Classical element associated with a card or suit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Element {
    Fire,
    Water,
    Earth,
    Air,
}

impl Element {
    pub fn as_str(&self) -> &'static str {
        match self {
            Element::Fire => "Fire",
            Element::Water => "Water",
            Element::Earth => "Earth",
            Element::Air => "Air",
        }
    }

    /// Parse from the wire spelling used by API clients.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "Fire" => Some(Element::Fire),
            "Water" => Some(Element::Water),
            "Earth" => Some(Element::Earth),
            "Air" => Some(Element::Air),
            _ => None,
        }
    }
}

impl std::fmt::Display for Element {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single tarot card with its upright meaning and correspondences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TarotCard {
    pub name: String,
    pub arcana: Arcana,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suit: Option<String>,
    pub meaning: String,
    pub keywords: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub element: Option<Element>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub astrology: Option<String>,
}

// ============================================================================
// Deck Data
// ============================================================================

struct CardDef {
    name: &'static str,
    arcana: Arcana,
    suit: Option<&'static str>,
    meaning: &'static str,
    keywords: &'static [&'static str],
    element: Option<Element>,
    astrology: Option<&'static str>,
}

impl CardDef {
    fn to_card(&self) -> TarotCard {
        TarotCard {
            name: self.name.to_string(),
            arcana: self.arcana,
            suit: self.suit.map(str::to_string),
            meaning: self.meaning.to_string(),
            keywords: self.keywords.iter().map(|k| k.to_string()).collect(),
            element: self.element,
            astrology: self.astrology.map(str::to_string),
        }
    }
}

macro_rules! major {
    ($name:expr, $meaning:expr, [$($kw:expr),+], $element:expr, $astrology:expr) => {
        CardDef {
            name: $name,
            arcana: Arcana::Major,
            suit: None,
            meaning: $meaning,
            keywords: &[$($kw),+],
            element: Some($element),
            astrology: Some($astrology),
        }
    };
}

macro_rules! minor {
    ($name:expr, $suit:expr, $meaning:expr, [$($kw:expr),+], $element:expr) => {
        CardDef {
            name: $name,
            arcana: Arcana::Minor,
            suit: Some($suit),
            meaning: $meaning,
            keywords: &[$($kw),+],
            element: Some($element),
            astrology: None,
        }
    };
}

const CARD_DEFS: &[CardDef] = &[
    // Major Arcana
    major!("The Fool", "New beginnings await. Trust in the journey ahead, even if the path is unclear.",
        ["new beginnings", "innocence", "spontaneity", "adventure"], Element::Air, "Uranus"),
    major!("The Magician", "You have all the tools needed to manifest your desires into reality.",
        ["willpower", "manifestation", "resourcefulness", "power"], Element::Air, "Mercury"),
    major!("The High Priestess", "Trust your intuition. Sacred knowledge and wisdom come from within.",
        ["intuition", "mystery", "inner wisdom", "spirituality"], Element::Water, "Moon"),
    major!("The Empress", "Abundance, fertility, and creative energy flow into your life.",
        ["fertility", "femininity", "beauty", "nature"], Element::Earth, "Venus"),
    major!("The Emperor", "Strong leadership, structure, and authority guide you toward success.",
        ["authority", "structure", "control", "father figure"], Element::Fire, "Aries"),
    major!("The Hierophant", "Traditional values and established institutions provide guidance.",
        ["tradition", "conformity", "morality", "ethics"], Element::Earth, "Taurus"),
    major!("The Lovers", "A meaningful choice of the heart brings harmony and alignment.",
        ["love", "harmony", "choices", "union"], Element::Air, "Gemini"),
    major!("The Chariot", "Determination and willpower carry you past every obstacle.",
        ["determination", "willpower", "victory", "control"], Element::Water, "Cancer"),
    major!("Strength", "Quiet courage and compassion tame the wildest forces.",
        ["courage", "compassion", "patience", "inner strength"], Element::Fire, "Leo"),
    major!("The Hermit", "Step back and seek the answers that only solitude reveals.",
        ["introspection", "solitude", "guidance", "soul-searching"], Element::Earth, "Virgo"),
    major!("Wheel of Fortune", "The wheel turns. Embrace the cycles of change and fortune.",
        ["change", "cycles", "destiny", "turning point"], Element::Fire, "Jupiter"),
    major!("Justice", "Truth and fairness restore the balance you have been seeking.",
        ["justice", "fairness", "truth", "accountability"], Element::Air, "Libra"),
    major!("The Hanged Man", "Surrender and a new perspective transform your situation.",
        ["surrender", "new perspective", "patience", "release"], Element::Water, "Neptune"),
    major!("Death", "An ending clears the way for a powerful transformation.",
        ["transformation", "endings", "renewal", "transition"], Element::Water, "Scorpio"),
    major!("Temperance", "Balance and moderation blend opposing forces into harmony.",
        ["balance", "moderation", "patience", "purpose"], Element::Fire, "Sagittarius"),
    major!("The Devil", "Examine the chains you have chosen; liberation is possible.",
        ["attachment", "temptation", "restriction", "shadow self"], Element::Earth, "Capricorn"),
    major!("The Tower", "Sudden upheaval tears down what was built on false foundations.",
        ["upheaval", "revelation", "awakening", "sudden change"], Element::Fire, "Mars"),
    major!("The Star", "Hope and healing shine on your path after the storm.",
        ["hope", "renewal", "inspiration", "serenity"], Element::Air, "Aquarius"),
    major!("The Moon", "Illusions and dreams ask you to trust what cannot be seen.",
        ["illusion", "intuition", "dreams", "subconscious"], Element::Water, "Pisces"),
    major!("The Sun", "Joy, vitality, and success illuminate everything you touch.",
        ["joy", "success", "vitality", "optimism"], Element::Fire, "Sun"),
    major!("Judgement", "A profound awakening calls you to rise and be renewed.",
        ["rebirth", "inner calling", "absolution", "awakening"], Element::Fire, "Pluto"),
    major!("The World", "Completion and wholeness crown a long journey.",
        ["completion", "accomplishment", "wholeness", "fulfillment"], Element::Earth, "Saturn"),
    // Minor Arcana - key cards from each suit
    minor!("Ace of Cups", "Cups", "A new cycle of emotional fulfillment and love begins in your life.",
        ["new love", "emotional fulfillment", "spiritual awakening"], Element::Water),
    minor!("Three of Cups", "Cups", "Celebration, friendship, and creative collaboration bring joy.",
        ["friendship", "celebration", "community", "creativity"], Element::Water),
    minor!("Ace of Pentacles", "Pentacles", "A new opportunity for material success and prosperity manifests.",
        ["new opportunity", "manifestation", "prosperity"], Element::Earth),
    minor!("Ace of Swords", "Swords", "Mental breakthrough and clarity cut through confusion and doubt.",
        ["breakthrough", "clarity", "new ideas"], Element::Air),
    minor!("Ace of Wands", "Wands", "Creative inspiration and new projects filled with potential emerge.",
        ["inspiration", "new project", "growth", "potential"], Element::Fire),
];

static FULL_DECK: Lazy<Vec<TarotCard>> =
    Lazy::new(|| CARD_DEFS.iter().map(CardDef::to_card).collect());

/// The complete deck, majors first.
pub fn full_deck() -> &'static [TarotCard] {
    &FULL_DECK
}

/// Look up a card by its exact name.
pub fn find_card(name: &str) -> Option<&'static TarotCard> {
    FULL_DECK.iter().find(|c| c.name == name)
}

// ============================================================================
// Spreads
// ============================================================================

/// A reading layout: named positions, one drawn card per position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Spread {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub positions: &'static [&'static str],
}

pub const SPREADS: &[Spread] = &[
    Spread {
        id: "single",
        name: "Single Card",
        description: "One card for quick daily guidance",
        positions: &["Your guidance for today"],
    },
    Spread {
        id: "threeCard",
        name: "Past, Present, Future",
        description: "Three cards showing your journey through time",
        positions: &["Past influences", "Present situation", "Future outcome"],
    },
    Spread {
        id: "love",
        name: "Love Reading",
        description: "Three cards focused on romantic matters",
        positions: &["How you approach love", "Current relationship energy", "Potential outcome"],
    },
    Spread {
        id: "career",
        name: "Career Path",
        description: "Three cards for professional guidance",
        positions: &["Current work situation", "What you should focus on", "Career outcome"],
    },
];

/// Look up a spread by id, falling back to the three-card spread.
pub fn find_spread(id: &str) -> Option<&'static Spread> {
    SPREADS.iter().find(|s| s.id == id)
}

/// The default spread used when a request does not name one.
pub fn default_spread() -> &'static Spread {
    find_spread("threeCard").unwrap_or(&SPREADS[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deck_has_all_major_arcana() {
        let majors: Vec<_> = full_deck()
            .iter()
            .filter(|c| c.arcana == Arcana::Major)
            .collect();
        assert_eq!(majors.len(), 22);
        assert_eq!(majors[0].name, "The Fool");
        assert_eq!(majors[21].name, "The World");
    }

    #[test]
    fn test_every_card_has_meaning_and_keywords() {
        for card in full_deck() {
            assert!(!card.meaning.is_empty(), "no meaning for {}", card.name);
            assert!(!card.keywords.is_empty(), "no keywords for {}", card.name);
        }
    }

    #[test]
    fn test_minor_cards_carry_suit_and_element() {
        for card in full_deck().iter().filter(|c| c.arcana == Arcana::Minor) {
            assert!(card.suit.is_some(), "no suit for {}", card.name);
            assert!(card.element.is_some(), "no element for {}", card.name);
        }
    }

    #[test]
    fn test_find_card() {
        let fool = find_card("The Fool").unwrap();
        assert_eq!(fool.element, Some(Element::Air));
        assert!(find_card("The Nonexistent").is_none());
    }

    #[test]
    fn test_find_spread() {
        let spread = find_spread("threeCard").unwrap();
        assert_eq!(spread.positions.len(), 3);
        assert!(find_spread("fiveCard").is_none());
        assert_eq!(default_spread().id, "threeCard");
    }

    #[test]
    fn test_element_parse_roundtrip() {
        for element in [Element::Fire, Element::Water, Element::Earth, Element::Air] {
            assert_eq!(Element::parse(element.as_str()), Some(element));
        }
        assert_eq!(Element::parse("Aether"), None);
    }
}
