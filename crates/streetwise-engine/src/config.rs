//! Tunable game rules.
//!
//! [`RulesConfig`] bundles every constant the resolution pipeline reads so
//! that callers (the service, tests) can override defaults. It deserializes
//! from the `rules` section of `streetwise-config.yaml`; any key left out
//! keeps its default.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Game rules applied by the action processor and the timeout state machine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RulesConfig {
    /// Upper bound for stamina and life (default: 100).
    pub max_resource: u32,

    /// Stamina of a freshly created avatar (default: 100).
    pub starting_stamina: u32,

    /// Life of a freshly created avatar (default: 100).
    pub starting_life: u32,

    /// Money of a freshly created avatar (default: 500).
    pub starting_money: Decimal,

    /// Longest accepted avatar name, in characters (default: 32).
    pub max_name_len: usize,

    /// Wanted level at which the avatar is jailed (default: 100).
    pub wanted_threshold: u32,

    /// Wanted level added per failed arrestable attempt, before the risk
    /// multiplier (default: 20).
    pub wanted_per_failure: u32,

    /// Failure chance above which an attempt counts as high risk (default: 0.5).
    pub high_risk_threshold: f64,

    /// Multiplier applied to failure penalties on high-risk attempts (default: 3).
    pub high_risk_multiplier: u32,

    /// Timeout minutes per avatar level, before the risk multiplier (default: 5).
    pub timeout_minutes_per_level: u32,

    /// Early-release cost per level for a hospital stay (default: 500).
    pub hospital_cost_per_level: Decimal,

    /// Early-release cost per level for a jail stay (default: 1000).
    pub jail_cost_per_level: Decimal,

    /// Life an avatar holds when discharged from hospital (default: 1).
    pub hospital_release_life: u32,

    /// Hours temporary stat grants stay active (default: 24).
    pub temporary_status_hours: u32,

    /// Factor applied to a special status price after each purchase (default: 1.5).
    pub price_escalation: Decimal,

    /// Wanted level removed by voluntary work (default: 50).
    pub voluntary_work_wanted_reduction: u32,

    /// Life consumed by voluntary work (default: 50).
    pub voluntary_work_life_cost: u32,

    /// Stamina consumed by voluntary work (default: 50).
    pub voluntary_work_stamina_cost: u32,

    /// Share of lifetime experience forfeited by voluntary work, as a
    /// percentage (default: 5).
    pub voluntary_work_xp_penalty_pct: u32,

    /// Stamina restored per regeneration tick (default: 1).
    pub regen_stamina: u32,

    /// Life restored per regeneration tick (default: 1).
    pub regen_life: u32,

    /// Largest accepted repeat count for one request (default: 100).
    pub max_repeat: u32,
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            max_resource: 100,
            starting_stamina: 100,
            starting_life: 100,
            starting_money: Decimal::new(500, 0),
            max_name_len: 32,
            wanted_threshold: 100,
            wanted_per_failure: 20,
            high_risk_threshold: 0.5,
            high_risk_multiplier: 3,
            timeout_minutes_per_level: 5,
            hospital_cost_per_level: Decimal::new(500, 0),
            jail_cost_per_level: Decimal::new(1000, 0),
            hospital_release_life: 1,
            temporary_status_hours: 24,
            price_escalation: Decimal::new(15, 1),
            voluntary_work_wanted_reduction: 50,
            voluntary_work_life_cost: 50,
            voluntary_work_stamina_cost: 50,
            voluntary_work_xp_penalty_pct: 5,
            regen_stamina: 1,
            regen_life: 1,
            max_repeat: 100,
        }
    }
}

#[cfg(test)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let rules = RulesConfig::default();
        assert_eq!(rules.max_resource, 100);
        assert_eq!(rules.starting_money, dec!(500));
        assert_eq!(rules.price_escalation, dec!(1.5));
        assert_eq!(rules.high_risk_multiplier, 3);
    }

    #[test]
    fn partial_yaml_keeps_defaults() {
        let parsed: Result<RulesConfig, _> =
            serde_yml::from_str("wanted_per_failure: 25\njail_cost_per_level: 750\n");
        assert!(parsed.is_ok(), "parse failed: {parsed:?}");
        let Ok(rules) = parsed else { return };
        assert_eq!(rules.wanted_per_failure, 25);
        assert_eq!(rules.jail_cost_per_level, dec!(750));
        assert_eq!(rules.wanted_threshold, 100);
        assert_eq!(rules.regen_life, 1);
    }
}
