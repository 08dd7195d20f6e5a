use crate::error::AdvisorError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub const MIN_AGE: u32 = 18;
pub const MAX_AGE: u32 = 90;

const YOUNG_AGE_LIMIT: u32 = 35;
const SENIOR_AGE_LIMIT: u32 = 60;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskProfile {
    Conservative,
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    /// Cluster holding this profile's candidate portfolio.
    ///
    /// This is the only place the profile → cluster table lives.
    pub fn cluster_id(self) -> i64 {
        match self {
            RiskProfile::Conservative => 2,
            RiskProfile::Moderate => 0,
            RiskProfile::Aggressive => 1,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            RiskProfile::Conservative => "Conservative",
            RiskProfile::Moderate => "Moderate",
            RiskProfile::Aggressive => "Aggressive",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RiskProfile {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        RiskProfile::ALL
            .into_iter()
            .find(|p| p.as_str().eq_ignore_ascii_case(trimmed))
            .ok_or_else(|| AdvisorError::InvalidProfile(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    ShortTerm,
    MediumTerm,
    LongTerm,
}

impl Horizon {
    pub fn label(self) -> &'static str {
        match self {
            Horizon::ShortTerm => "Short Term (<3y)",
            Horizon::MediumTerm => "Medium Term (3-7y)",
            Horizon::LongTerm => "Long Term (7y+)",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Horizon {
    type Err = AdvisorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .chars()
            .take_while(|c| *c != '(')
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();

        match key.as_str() {
            "short" | "shortterm" => Ok(Horizon::ShortTerm),
            "medium" | "mediumterm" => Ok(Horizon::MediumTerm),
            "long" | "longterm" => Ok(Horizon::LongTerm),
            _ => Err(AdvisorError::InvalidHorizon(s.to_string())),
        }
    }
}

/// Suggested risk profile for a user.
///
/// Ordered decision list, first match wins: youth or a long horizon means
/// Aggressive even when the Conservative conditions also hold.
pub fn suggest(age: u32, horizon: Horizon) -> RiskProfile {
    if age < YOUNG_AGE_LIMIT || horizon == Horizon::LongTerm {
        RiskProfile::Aggressive
    } else if age > SENIOR_AGE_LIMIT || horizon == Horizon::ShortTerm {
        RiskProfile::Conservative
    } else {
        RiskProfile::Moderate
    }
}

/// Validates a manually chosen label.
pub fn select_manual(label: &str) -> Result<RiskProfile, AdvisorError> {
    label.parse()
}

pub fn validate_age(age: u32) -> Result<u32, AdvisorError> {
    if (MIN_AGE..=MAX_AGE).contains(&age) {
        Ok(age)
    } else {
        Err(AdvisorError::InvalidAge(age))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn youth_dominates_short_horizon() {
        assert_eq!(suggest(20, Horizon::ShortTerm), RiskProfile::Aggressive);
    }

    #[test]
    fn long_horizon_dominates_senior_age() {
        assert_eq!(suggest(75, Horizon::LongTerm), RiskProfile::Aggressive);
    }

    #[test]
    fn documented_scenarios() {
        assert_eq!(suggest(70, Horizon::MediumTerm), RiskProfile::Conservative);
        assert_eq!(suggest(25, Horizon::LongTerm), RiskProfile::Aggressive);
        assert_eq!(suggest(45, Horizon::MediumTerm), RiskProfile::Moderate);
        assert_eq!(suggest(45, Horizon::ShortTerm), RiskProfile::Conservative);
    }

    #[test]
    fn age_boundaries() {
        assert_eq!(suggest(34, Horizon::MediumTerm), RiskProfile::Aggressive);
        assert_eq!(suggest(35, Horizon::MediumTerm), RiskProfile::Moderate);
        assert_eq!(suggest(60, Horizon::MediumTerm), RiskProfile::Moderate);
        assert_eq!(suggest(61, Horizon::MediumTerm), RiskProfile::Conservative);
    }

    #[test]
    fn suggest_is_total_over_the_age_domain() {
        for age in MIN_AGE..=MAX_AGE {
            for horizon in [Horizon::ShortTerm, Horizon::MediumTerm, Horizon::LongTerm] {
                let profile = suggest(age, horizon);
                assert!(RiskProfile::ALL.contains(&profile));
            }
        }
    }

    #[test]
    fn cluster_table_is_fixed() {
        assert_eq!(RiskProfile::Conservative.cluster_id(), 2);
        assert_eq!(RiskProfile::Moderate.cluster_id(), 0);
        assert_eq!(RiskProfile::Aggressive.cluster_id(), 1);
    }

    #[test]
    fn select_manual_accepts_known_labels() {
        assert_eq!(select_manual("Moderate").unwrap(), RiskProfile::Moderate);
        assert_eq!(select_manual(" aggressive ").unwrap(), RiskProfile::Aggressive);
    }

    #[test]
    fn select_manual_rejects_unknown_labels() {
        assert_eq!(
            select_manual("Reckless"),
            Err(AdvisorError::InvalidProfile("Reckless".to_string()))
        );
        assert!(select_manual("").is_err());
    }

    #[test]
    fn horizon_parses_short_and_ui_spellings() {
        assert_eq!("short".parse::<Horizon>().unwrap(), Horizon::ShortTerm);
        assert_eq!("MediumTerm".parse::<Horizon>().unwrap(), Horizon::MediumTerm);
        assert_eq!(
            "Long Term (7y+)".parse::<Horizon>().unwrap(),
            Horizon::LongTerm
        );
        assert_eq!(
            "Medium Term (3-7y)".parse::<Horizon>().unwrap(),
            Horizon::MediumTerm
        );
        assert!("forever".parse::<Horizon>().is_err());
    }

    #[test]
    fn validate_age_enforces_range() {
        assert!(validate_age(18).is_ok());
        assert!(validate_age(90).is_ok());
        assert_eq!(validate_age(17), Err(AdvisorError::InvalidAge(17)));
        assert_eq!(validate_age(91), Err(AdvisorError::InvalidAge(91)));
    }
}
