//! Entitlement data models.

use serde::{Deserialize, Serialize};

/// Subscription tier
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    #[default]
    Free,
    Pro,
}

impl Tier {
    /// Whether this tier grants access past the free preview boundary
    pub fn is_pro(self) -> bool {
        matches!(self, Tier::Pro)
    }
}

impl std::fmt::Display for Tier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tier::Free => write!(f, "free"),
            Tier::Pro => write!(f, "pro"),
        }
    }
}

impl std::str::FromStr for Tier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(Tier::Free),
            "pro" => Ok(Tier::Pro),
            other => Err(format!("unknown subscription tier: {other}")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tier_round_trip() {
        assert_eq!("free".parse::<Tier>().unwrap(), Tier::Free);
        assert_eq!("pro".parse::<Tier>().unwrap(), Tier::Pro);
        assert_eq!(Tier::Pro.to_string(), "pro");
        assert!("platinum".parse::<Tier>().is_err());
    }

    #[test]
    fn test_default_tier_is_free() {
        assert_eq!(Tier::default(), Tier::Free);
    }
}
