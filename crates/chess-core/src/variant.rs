//! Chess variant identifiers.

use serde::{Deserialize, Serialize};

/// A ruleset and starting-position family.
///
/// Variants are identified by short keys (`chess`, `atomic`, `3check`, ...)
/// in serialized trees and storage keys. Unknown keys resolve to
/// [`Variant::Standard`] rather than failing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Variant {
    #[default]
    Standard,
    Antichess,
    Atomic,
    Crazyhouse,
    Horde,
    KingOfTheHill,
    RacingKings,
    ThreeCheck,
}

impl Variant {
    /// All supported variants.
    pub const ALL: [Variant; 8] = [
        Variant::Standard,
        Variant::Antichess,
        Variant::Atomic,
        Variant::Crazyhouse,
        Variant::Horde,
        Variant::KingOfTheHill,
        Variant::RacingKings,
        Variant::ThreeCheck,
    ];

    /// Alias lists searched by [`Variant::guess`], in priority order.
    const GUESS_ALIASES: [(Variant, &'static str); 7] = [
        (Variant::ThreeCheck, "3check,threecheck"),
        (Variant::Atomic, "atomic"),
        (Variant::KingOfTheHill, "kingofthehill"),
        (Variant::Horde, "horde"),
        (Variant::Antichess, "antichess,losers,giveaway"),
        (Variant::Crazyhouse, "crazyhouse"),
        (Variant::RacingKings, "racingkings"),
    ];

    /// Returns the short key used in serialized data.
    pub const fn key(self) -> &'static str {
        match self {
            Variant::Standard => "chess",
            Variant::Antichess => "antichess",
            Variant::Atomic => "atomic",
            Variant::Crazyhouse => "crazyhouse",
            Variant::Horde => "horde",
            Variant::KingOfTheHill => "kingofthehill",
            Variant::RacingKings => "racingkings",
            Variant::ThreeCheck => "3check",
        }
    }

    /// Returns the human-readable name written to the PGN `Variant` tag.
    pub const fn display_name(self) -> &'static str {
        match self {
            Variant::Standard => "Standard",
            Variant::Antichess => "Antichess",
            Variant::Atomic => "Atomic",
            Variant::Crazyhouse => "Crazyhouse",
            Variant::Horde => "Horde",
            Variant::KingOfTheHill => "King of The Hill",
            Variant::RacingKings => "Racing Kings",
            Variant::ThreeCheck => "Three Check",
        }
    }

    /// Looks up a variant by key, falling back to standard chess.
    pub fn from_key(key: &str) -> Self {
        match key {
            "antichess" => Variant::Antichess,
            "atomic" => Variant::Atomic,
            "crazyhouse" => Variant::Crazyhouse,
            "horde" => Variant::Horde,
            "kingofthehill" => Variant::KingOfTheHill,
            "racingkings" => Variant::RacingKings,
            "3check" | "threecheck" => Variant::ThreeCheck,
            _ => Variant::Standard,
        }
    }

    /// Guesses a variant from a free-form name such as a PGN `Variant` tag.
    ///
    /// The name is lowercased and stripped of spaces and dashes. Exact keys
    /// and display names match first (`standard` names standard chess), then
    /// the name is matched as a substring against each variant's alias list.
    /// Names that match nothing, including the empty name, give standard
    /// chess.
    pub fn guess(name: &str) -> Self {
        let reduced = reduce_name(name);
        if reduced.is_empty() || reduced == "standard" {
            return Variant::Standard;
        }
        if let Some(variant) = Self::ALL
            .into_iter()
            .find(|v| v.key() == reduced || reduce_name(v.display_name()) == reduced)
        {
            return variant;
        }
        Self::GUESS_ALIASES
            .iter()
            .find(|(_, aliases)| aliases.contains(reduced.as_str()))
            .map(|(variant, _)| *variant)
            .unwrap_or(Variant::Standard)
    }
}

fn reduce_name(name: &str) -> String {
    name.to_lowercase()
        .chars()
        .filter(|c| *c != ' ' && *c != '-')
        .collect()
}

impl From<String> for Variant {
    fn from(key: String) -> Self {
        Variant::from_key(&key)
    }
}

impl From<Variant> for String {
    fn from(variant: Variant) -> Self {
        variant.key().to_string()
    }
}

impl std::fmt::Display for Variant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
