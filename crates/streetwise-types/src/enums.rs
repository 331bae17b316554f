//! Enumeration types for the action resolution engine.
//!
//! Wire names are `SCREAMING_SNAKE_CASE` to match the catalog files. The
//! [`FromStr`] implementations accept any letter case so callers can pass
//! query-string values straight through.

use core::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// A string did not name any variant of the target enum.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind}: {value}")]
pub struct UnknownVariant {
    /// Which enum was being parsed (e.g. "action category").
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}

/// Parse `value` against `(name, variant)` pairs ignoring ASCII case.
fn parse_variant<T: Copy>(
    kind: &'static str,
    value: &str,
    table: &[(&str, T)],
) -> Result<T, UnknownVariant> {
    table
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(value.trim()))
        .map(|(_, variant)| *variant)
        .ok_or_else(|| UnknownVariant {
            kind,
            value: String::from(value),
        })
}

// ---------------------------------------------------------------------------
// Action categories
// ---------------------------------------------------------------------------

/// The catalog section an action belongs to.
///
/// The category drives two engine rules: `Training`, `Market` and `Hospital`
/// actions never fail, and `SpecialStatusSeller` actions are charged at the
/// avatar's escalating dynamic price instead of the catalog price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum ActionCategory {
    /// Paid courses granting temporary stat buffs.
    Training,
    /// Legal jobs paying money and experience.
    Work,
    /// Illegal jobs that can end in arrest.
    Hacking,
    /// Consumables that restore stamina.
    Market,
    /// Treatments available from the hospital.
    Hospital,
    /// Activities available while jailed.
    Jail,
    /// Repeatable permanent stat purchases with escalating price.
    SpecialStatusSeller,
}

impl ActionCategory {
    /// Every category, in catalog order.
    pub const ALL: [Self; 7] = [
        Self::Training,
        Self::Work,
        Self::Hacking,
        Self::Market,
        Self::Hospital,
        Self::Jail,
        Self::SpecialStatusSeller,
    ];

    /// Whether actions in this category skip the failure draw entirely.
    pub const fn is_risk_free(self) -> bool {
        matches!(self, Self::Training | Self::Market | Self::Hospital)
    }

    /// Wire name of the category.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Training => "TRAINING",
            Self::Work => "WORK",
            Self::Hacking => "HACKING",
            Self::Market => "MARKET",
            Self::Hospital => "HOSPITAL",
            Self::Jail => "JAIL",
            Self::SpecialStatusSeller => "SPECIAL_STATUS_SELLER",
        }
    }
}

impl core::fmt::Display for ActionCategory {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionCategory {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table = Self::ALL.map(|c| (c.as_str(), c));
        parse_variant("action category", s, &table)
    }
}

// ---------------------------------------------------------------------------
// Stats
// ---------------------------------------------------------------------------

/// One of the four avatar attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum StatKind {
    /// Physical power.
    Strength,
    /// Technical knowledge.
    Intelligence,
    /// Social influence.
    Charisma,
    /// Ability to go unnoticed.
    Stealth,
}

impl StatKind {
    /// Every stat, in display order.
    pub const ALL: [Self; 4] = [
        Self::Strength,
        Self::Intelligence,
        Self::Charisma,
        Self::Stealth,
    ];

    /// Wire name of the stat.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Strength => "STRENGTH",
            Self::Intelligence => "INTELLIGENCE",
            Self::Charisma => "CHARISMA",
            Self::Stealth => "STEALTH",
        }
    }
}

impl core::fmt::Display for StatKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for StatKind {
    type Err = UnknownVariant;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let table = Self::ALL.map(|k| (k.as_str(), k));
        parse_variant("stat", s, &table)
    }
}

// ---------------------------------------------------------------------------
// Timeouts
// ---------------------------------------------------------------------------

/// The kind of restriction an avatar can be placed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum TimeoutKind {
    /// Entered when life reaches zero.
    Hospital,
    /// Entered when the wanted level crosses the arrest threshold.
    Jail,
}

impl TimeoutKind {
    /// The catalog category whose actions stay available during this timeout.
    pub const fn allowed_category(self) -> ActionCategory {
        match self {
            Self::Hospital => ActionCategory::Hospital,
            Self::Jail => ActionCategory::Jail,
        }
    }
}

impl core::fmt::Display for TimeoutKind {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(match self {
            Self::Hospital => "HOSPITAL",
            Self::Jail => "JAIL",
        })
    }
}

/// Observable restriction state of an avatar at a given instant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum TimeoutState {
    /// No restriction, or the restriction has expired.
    Free,
    /// Hospitalized until the stored instant.
    Hospital,
    /// Jailed until the stored instant.
    Jail,
}

impl From<TimeoutKind> for TimeoutState {
    fn from(kind: TimeoutKind) -> Self {
        match kind {
            TimeoutKind::Hospital => Self::Hospital,
            TimeoutKind::Jail => Self::Jail,
        }
    }
}

// ---------------------------------------------------------------------------
// Special effects
// ---------------------------------------------------------------------------

/// Effect applied in place of the normal cost/reward pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum SpecialEffect {
    /// Wipe all temporary stat deltas and their cooldown.
    ClearTemporaryStatus,
    /// Permanently add one strength point.
    AddStrength,
    /// Permanently add one intelligence point.
    AddIntelligence,
    /// Permanently add one charisma point.
    AddCharisma,
    /// Permanently add one stealth point.
    AddStealth,
    /// Community service: lowers the wanted level at a cost in life,
    /// stamina and experience.
    VoluntaryWork,
}

impl SpecialEffect {
    /// The stat permanently raised by this effect, if it is a stat purchase.
    pub const fn purchased_stat(self) -> Option<StatKind> {
        match self {
            Self::AddStrength => Some(StatKind::Strength),
            Self::AddIntelligence => Some(StatKind::Intelligence),
            Self::AddCharisma => Some(StatKind::Charisma),
            Self::AddStealth => Some(StatKind::Stealth),
            Self::ClearTemporaryStatus | Self::VoluntaryWork => None,
        }
    }
}

// ---------------------------------------------------------------------------
// Attempt outcome
// ---------------------------------------------------------------------------

/// How a single resolved attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
#[ts(export, export_to = "bindings/")]
pub enum AttemptOutcome {
    /// Rewards were applied.
    Success,
    /// The failure draw hit; penalties were applied but no timeout started.
    Failure,
    /// Life reached zero and the avatar was hospitalized.
    Hospitalized,
    /// The wanted level crossed the threshold and the avatar was jailed.
    Arrested,
}

impl AttemptOutcome {
    /// Whether the attempt counts as a success for the caller.
    pub const fn is_success(self) -> bool {
        matches!(self, Self::Success)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_parses_case_insensitively() {
        assert_eq!(
            "special_status_seller".parse::<ActionCategory>(),
            Ok(ActionCategory::SpecialStatusSeller)
        );
        assert_eq!("Hacking".parse::<ActionCategory>(), Ok(ActionCategory::Hacking));
    }

    #[test]
    fn unknown_category_is_rejected() {
        let err = "CASINO".parse::<ActionCategory>();
        assert_eq!(
            err,
            Err(UnknownVariant {
                kind: "action category",
                value: String::from("CASINO"),
            })
        );
    }

    #[test]
    fn stat_parses_and_displays() {
        assert_eq!("stealth".parse::<StatKind>(), Ok(StatKind::Stealth));
        assert_eq!(StatKind::Charisma.to_string(), "CHARISMA");
        assert!("luck".parse::<StatKind>().is_err());
    }

    #[test]
    fn risk_free_categories() {
        assert!(ActionCategory::Training.is_risk_free());
        assert!(ActionCategory::Market.is_risk_free());
        assert!(ActionCategory::Hospital.is_risk_free());
        assert!(!ActionCategory::Hacking.is_risk_free());
        assert!(!ActionCategory::Work.is_risk_free());
    }

    #[test]
    fn wire_names_match_serde() {
        for category in ActionCategory::ALL {
            let json = serde_json::to_string(&category).unwrap_or_default();
            assert_eq!(json, format!("\"{}\"", category.as_str()));
        }
    }

    #[test]
    fn purchased_stat_mapping() {
        assert_eq!(SpecialEffect::AddStealth.purchased_stat(), Some(StatKind::Stealth));
        assert_eq!(SpecialEffect::VoluntaryWork.purchased_stat(), None);
    }
}
