//! The read-only action catalog.
//!
//! The catalog is parsed from YAML of the form:
//!
//! ```yaml
//! actions:
//!   - id: phishing
//!     category: HACKING
//!     title: Phishing campaign
//!     stamina: -10
//!     money: 250
//!     failure_chance: 0.30
//! ```
//!
//! Entries keep their file order for listing. Reading the file from disk is
//! the caller's job; this module only parses and validates.

use std::collections::BTreeMap;

use serde::Deserialize;
use streetwise_types::{ActionCategory, ActionDefinition, ActionId};

/// Errors raised while loading a catalog.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// The YAML could not be parsed into catalog entries.
    #[error("failed to parse catalog YAML: {source}")]
    Yaml {
        /// The underlying YAML parse error.
        source: serde_yml::Error,
    },

    /// Two entries share an id.
    #[error("duplicate action id: {0}")]
    DuplicateId(ActionId),

    /// An entry has an out-of-range field.
    #[error("invalid field {field} on action {id}: {reason}")]
    InvalidField {
        /// The offending entry.
        id: ActionId,
        /// Field name.
        field: &'static str,
        /// What is wrong with it.
        reason: &'static str,
    },
}

impl From<serde_yml::Error> for CatalogError {
    fn from(source: serde_yml::Error) -> Self {
        Self::Yaml { source }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    #[serde(default)]
    actions: Vec<ActionDefinition>,
}

/// Every performable action, indexed by id.
#[derive(Debug, Clone, Default)]
pub struct ActionCatalog {
    actions: Vec<ActionDefinition>,
    index: BTreeMap<ActionId, usize>,
}

impl ActionCatalog {
    /// Parse and validate a catalog from YAML text.
    pub fn parse(yaml: &str) -> Result<Self, CatalogError> {
        let file: CatalogFile = serde_yml::from_str(yaml)?;
        Self::from_actions(file.actions)
    }

    /// Build a catalog from already-constructed entries.
    pub fn from_actions(actions: Vec<ActionDefinition>) -> Result<Self, CatalogError> {
        let mut index = BTreeMap::new();
        for (position, action) in actions.iter().enumerate() {
            validate(action)?;
            if index.insert(action.id.clone(), position).is_some() {
                return Err(CatalogError::DuplicateId(action.id.clone()));
            }
        }
        Ok(Self { actions, index })
    }

    /// Look up one action.
    pub fn get(&self, id: &ActionId) -> Option<&ActionDefinition> {
        self.index.get(id).and_then(|&i| self.actions.get(i))
    }

    /// Actions of one category, in file order.
    pub fn by_category(
        &self,
        category: ActionCategory,
    ) -> impl Iterator<Item = &ActionDefinition> + '_ {
        self.actions.iter().filter(move |a| a.category == category)
    }

    /// Every action, in file order.
    pub fn iter(&self) -> impl Iterator<Item = &ActionDefinition> + '_ {
        self.actions.iter()
    }

    /// Number of actions.
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }
}

fn validate(action: &ActionDefinition) -> Result<(), CatalogError> {
    let invalid = |field, reason| CatalogError::InvalidField {
        id: action.id.clone(),
        field,
        reason,
    };

    if action.id.as_str().trim().is_empty() {
        return Err(invalid("id", "must not be empty"));
    }
    let variances = [
        ("hp_variation", action.hp_variation),
        ("money_variation", action.money_variation),
        ("xp_variation", action.xp_variation),
        ("lost_hp_failure_variation", action.lost_hp_failure_variation),
    ];
    for (field, value) in variances {
        if !value.is_finite() || value < 0.0 {
            return Err(invalid(field, "must be a non-negative number"));
        }
    }
    if !action.failure_chance.is_finite() || action.failure_chance < 0.0 {
        return Err(invalid("failure_chance", "must be a non-negative number"));
    }
    Ok(())
}
