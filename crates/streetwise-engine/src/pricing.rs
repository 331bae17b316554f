//! Escalating prices for special status purchases.
//!
//! Every `SPECIAL_STATUS_SELLER` action has a per-avatar price. It starts
//! at the catalog price and its magnitude grows by
//! [`RulesConfig::price_escalation`] with every purchase. Other categories
//! always cost their catalog price.

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use streetwise_types::{ActionCategory, ActionDefinition, ActionId, AvatarId, PurchaseRecord};
use tracing::debug;

use crate::config::RulesConfig;
use crate::error::EngineError;
use crate::formulas::escalate_price;

/// Purchase records of one avatar, keyed by action.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurchaseLedger {
    records: BTreeMap<ActionId, PurchaseRecord>,
}

impl PurchaseLedger {
    /// An empty ledger.
    pub const fn new() -> Self {
        Self {
            records: BTreeMap::new(),
        }
    }

    /// The record for one action, if it was ever purchased.
    pub fn record(&self, action_id: &ActionId) -> Option<&PurchaseRecord> {
        self.records.get(action_id)
    }

    /// Every record, ordered by action id.
    pub fn records(&self) -> impl Iterator<Item = &PurchaseRecord> {
        self.records.values()
    }

    /// Money delta of the next attempt of `action` for this avatar.
    ///
    /// The escalated price for special status sellers that were bought
    /// before, the catalog money delta otherwise.
    pub fn current_price(&self, action: &ActionDefinition) -> Decimal {
        if action.category != ActionCategory::SpecialStatusSeller {
            return action.money;
        }
        self.records
            .get(&action.id)
            .map_or(action.money, |r| r.current_price)
    }

    /// Register one more purchase of `action` and escalate its price.
    ///
    /// The first purchase creates the record at the catalog price before
    /// escalating it.
    pub fn record_purchase(
        &mut self,
        avatar_id: AvatarId,
        action: &ActionDefinition,
        rules: &RulesConfig,
    ) -> Result<&PurchaseRecord, EngineError> {
        let record = self
            .records
            .entry(action.id.clone())
            .or_insert_with(|| PurchaseRecord {
                avatar_id,
                action_id: action.id.clone(),
                purchase_count: 0,
                current_price: action.money,
            });
        record.current_price = escalate_price(record.current_price, rules.price_escalation)?;
        record.purchase_count = record
            .purchase_count
            .checked_add(1)
            .ok_or_else(|| EngineError::overflow("purchase count"))?;
        debug!(
            avatar_id = %avatar_id,
            action_id = %action.id,
            purchases = record.purchase_count,
            next_price = %record.current_price,
            "special status price escalated"
        );
        Ok(record)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::arithmetic_side_effects)]
mod tests {
    use rust_decimal_macros::dec;

    use super::*;

    fn syringe() -> ActionDefinition {
        ActionDefinition {
            money: dec!(-500000),
            ..ActionDefinition::blank(
                "strength-syringe",
                ActionCategory::SpecialStatusSeller,
                "Strength syringe",
            )
        }
    }

    #[test]
    fn unpurchased_action_costs_catalog_price() {
        let ledger = PurchaseLedger::new();
        assert_eq!(ledger.current_price(&syringe()), dec!(-500000));
        assert!(ledger.record(&ActionId::from("strength-syringe")).is_none());
    }

    #[test]
    fn price_grows_geometrically() {
        let rules = RulesConfig::default();
        let avatar = AvatarId::new();
        let action = syringe();
        let mut ledger = PurchaseLedger::new();
        let mut expected = dec!(-500000);
        for n in 1..=4_u32 {
            ledger.record_purchase(avatar, &action, &rules).unwrap();
            expected *= dec!(1.5);
            assert_eq!(ledger.current_price(&action), expected);
            assert_eq!(ledger.record(&action.id).unwrap().purchase_count, n);
        }
        // 500000 * 1.5^4
        assert_eq!(expected, dec!(-2531250));
    }

    #[test]
    fn other_categories_ignore_records() {
        let rules = RulesConfig::default();
        let mut coffee = syringe();
        coffee.category = ActionCategory::Market;
        coffee.money = dec!(-5);
        let mut ledger = PurchaseLedger::new();
        ledger.record_purchase(AvatarId::new(), &coffee, &rules).unwrap();
        assert_eq!(ledger.current_price(&coffee), dec!(-5));
    }

    #[test]
    fn records_are_per_action() {
        let rules = RulesConfig::default();
        let avatar = AvatarId::new();
        let strength = syringe();
        let mut stealth = syringe();
        stealth.id = ActionId::from("stealth-syringe");
        let mut ledger = PurchaseLedger::new();
        ledger.record_purchase(avatar, &strength, &rules).unwrap();
        assert_eq!(ledger.current_price(&stealth), dec!(-500000));
        assert_eq!(ledger.records().count(), 1);
    }
}
