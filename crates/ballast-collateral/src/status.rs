//! Collateral status enum.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Health status of a collateral instrument.
///
/// Ordered by severity: `Sound < Iffy < Disabled`. `Disabled` is
/// absorbing; once reached no refresh changes it.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CollateralStatus {
    /// Fully trusted: priced inside the peg band, backing ratio intact.
    Sound,
    /// Provisional failure; heals if a sound reading arrives before the
    /// default deadline.
    Iffy,
    /// Permanent failure.
    Disabled,
}

impl CollateralStatus {
    pub fn is_disabled(&self) -> bool {
        matches!(self, Self::Disabled)
    }
}

impl fmt::Display for CollateralStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sound => write!(f, "SOUND"),
            Self::Iffy => write!(f, "IFFY"),
            Self::Disabled => write!(f, "DISABLED"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(CollateralStatus::Sound < CollateralStatus::Iffy);
        assert!(CollateralStatus::Iffy < CollateralStatus::Disabled);
    }

    #[test]
    fn test_display() {
        assert_eq!(CollateralStatus::Sound.to_string(), "SOUND");
        assert_eq!(CollateralStatus::Iffy.to_string(), "IFFY");
        assert_eq!(CollateralStatus::Disabled.to_string(), "DISABLED");
    }

    #[test]
    fn test_serialized_form() {
        assert_eq!(
            serde_json::to_string(&CollateralStatus::Sound).unwrap(),
            "\"SOUND\""
        );
        assert_eq!(
            serde_json::from_str::<CollateralStatus>("\"DISABLED\"").unwrap(),
            CollateralStatus::Disabled
        );
    }
}
