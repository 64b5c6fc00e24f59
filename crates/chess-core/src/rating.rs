//! Move rating vocabulary.

use serde::{Deserialize, Serialize};

/// A discrete rating bucket for a candidate move.
///
/// The discriminant is the value stored in the self-evaluation component of
/// a move's weights, so buckets are ordered from worst to best with
/// [`MoveRating::Unrated`] at zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[repr(u8)]
pub enum MoveRating {
    #[default]
    Unrated = 0,
    ForcedLoss = 1,
    Losing = 2,
    Bad = 3,
    Experimental = 4,
    Stable = 5,
    Promising = 6,
    Good = 7,
    Exclam = 8,
    Winning = 9,
    ForcedWin = 10,
}

impl MoveRating {
    /// All ratings, indexed by weight value.
    pub const ALL: [MoveRating; 11] = [
        MoveRating::Unrated,
        MoveRating::ForcedLoss,
        MoveRating::Losing,
        MoveRating::Bad,
        MoveRating::Experimental,
        MoveRating::Stable,
        MoveRating::Promising,
        MoveRating::Good,
        MoveRating::Exclam,
        MoveRating::Winning,
        MoveRating::ForcedWin,
    ];

    /// Buckets a self-evaluation weight. Values outside `0..=10` are unrated.
    pub fn from_weight(weight: i32) -> Self {
        usize::try_from(weight)
            .ok()
            .and_then(|i| Self::ALL.get(i).copied())
            .unwrap_or(MoveRating::Unrated)
    }

    /// Returns the weight value for this rating.
    #[inline]
    pub const fn weight(self) -> i32 {
        self as i32
    }

    /// Returns the lowercase name of this rating.
    pub const fn as_str(self) -> &'static str {
        match self {
            MoveRating::Unrated => "unrated",
            MoveRating::ForcedLoss => "forcedloss",
            MoveRating::Losing => "losing",
            MoveRating::Bad => "bad",
            MoveRating::Experimental => "experimental",
            MoveRating::Stable => "stable",
            MoveRating::Promising => "promising",
            MoveRating::Good => "good",
            MoveRating::Exclam => "exclam",
            MoveRating::Winning => "winning",
            MoveRating::ForcedWin => "forcedwin",
        }
    }
}

impl std::fmt::Display for MoveRating {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_roundtrip() {
        for rating in MoveRating::ALL {
            assert_eq!(MoveRating::from_weight(rating.weight()), rating);
        }
    }

    #[test]
    fn out_of_range_is_unrated() {
        assert_eq!(MoveRating::from_weight(-1), MoveRating::Unrated);
        assert_eq!(MoveRating::from_weight(11), MoveRating::Unrated);
    }

    #[test]
    fn ordering() {
        assert!(MoveRating::ForcedWin > MoveRating::Good);
        assert!(MoveRating::ForcedLoss > MoveRating::Unrated);
        assert_eq!(MoveRating::from_weight(8).as_str(), "exclam");
    }

    #[test]
    fn serde_lowercase() {
        let json = serde_json::to_string(&MoveRating::ForcedWin).unwrap();
        assert_eq!(json, "\"forcedwin\"");
    }
}
