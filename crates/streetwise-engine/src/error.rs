//! Error types for the streetwise-engine crate.
//!
//! Every engine operation that can be refused returns a typed
//! [`EngineError`] rather than panicking. Apart from
//! [`EngineError::ArithmeticOverflow`], each variant is a business
//! rejection: recoverable, user-facing, and carrying enough detail to build
//! a descriptive message.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use streetwise_types::{StatKind, TimeoutKind, UnknownVariant};

/// Errors that can occur while validating or resolving an action.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The avatar cannot pay the action's price.
    #[error("not enough money: required {required:.2}, available {available:.2}")]
    InsufficientMoney {
        /// Money the action costs.
        required: Decimal,
        /// Money the avatar holds.
        available: Decimal,
    },

    /// The avatar lacks the stamina the action consumes.
    #[error("not enough stamina: required {required}, available {available}")]
    InsufficientStamina {
        /// Stamina the action consumes.
        required: u32,
        /// Stamina the avatar holds.
        available: u32,
    },

    /// The avatar is hospitalized or jailed and the action is not allowed there.
    #[error("currently restricted: in {kind} until {until}")]
    Restricted {
        /// The active restriction.
        kind: TimeoutKind,
        /// When it lapses.
        until: DateTime<Utc>,
    },

    /// A free release was requested before the timeout expired.
    #[error("must wait for the {kind} timeout to end at {until} or pay to leave")]
    MustWaitOrPay {
        /// The active restriction.
        kind: TimeoutKind,
        /// When it lapses.
        until: DateTime<Utc>,
    },

    /// A release was requested but the avatar is not in any timeout.
    #[error("avatar is not in timeout")]
    NotInTimeout,

    /// A skill allocation tried to lower a permanent stat.
    #[error("cannot decrease {stat} from {current} to {requested}")]
    StatDecrease {
        /// The stat being lowered.
        stat: StatKind,
        /// Its current permanent value.
        current: i32,
        /// The requested value.
        requested: i32,
    },

    /// A skill allocation asked for more points than are available.
    #[error("not enough skill points: requested {requested}, available {available}")]
    NotEnoughSkillPoints {
        /// Points the allocation needs.
        requested: u32,
        /// Points the avatar holds.
        available: u32,
    },

    /// A skill allocation was attempted with zero points available.
    #[error("no skill points available")]
    NoSkillPoints,

    /// Another active avatar already uses this name.
    #[error("avatar name already in use: {0}")]
    NameTaken(String),

    /// The avatar name is empty or too long.
    #[error("invalid avatar name: {0:?}")]
    InvalidName(String),

    /// A category name did not match any [`ActionCategory`](streetwise_types::ActionCategory).
    #[error("unknown action category: {0}")]
    UnknownCategory(String),

    /// A stat name did not match any [`StatKind`].
    #[error("unknown stat: {0}")]
    UnknownStat(String),

    /// A money or experience computation overflowed.
    #[error("arithmetic overflow: {context}")]
    ArithmeticOverflow {
        /// Description of what was being computed.
        context: String,
    },
}

impl EngineError {
    /// Whether this is a business rejection (as opposed to an internal fault).
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::ArithmeticOverflow { .. })
    }

    /// Build an [`EngineError::ArithmeticOverflow`] with the given context.
    pub fn overflow(context: &str) -> Self {
        Self::ArithmeticOverflow {
            context: String::from(context),
        }
    }
}

impl From<UnknownVariant> for EngineError {
    fn from(err: UnknownVariant) -> Self {
        if err.kind == "stat" {
            Self::UnknownStat(err.value)
        } else {
            Self::UnknownCategory(err.value)
        }
    }
}
