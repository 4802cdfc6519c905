//! Cancellation and replacement reasons.
//!
//! Each reason set is a fixed list plus a free-text `Other` variant. The
//! free text is validated to be non-empty before a transition is accepted,
//! so an empty "other" can never be persisted.

use serde::{Deserialize, Serialize};

/// CancellationReason explains why an order was cancelled.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CancellationReason {
    /// The customer changed their mind.
    CustomerChangedMind,
    /// The supplier no longer carries the product.
    SupplierOutOfStock,
    /// Delivery would take too long.
    DeliveryTooLong,
    /// The order was entered by mistake.
    EntryMistake,
    /// The supplier price is too high to resell.
    SupplierPriceTooHigh,
    /// Any other reason, spelled out by the operator.
    Other(String),
}

/// ReplacementReason explains why an order was replaced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReplacementReason {
    /// The product arrived defective.
    Defective,
    /// The supplier sent the wrong reference.
    WrongReference,
    /// The unit has a battery problem.
    BatteryIssue,
    /// Any other reason, spelled out by the operator.
    Other(String),
}

impl CancellationReason {
    /// Returns true if the reason carries no usable text.
    /// Only `Other` can be empty; predefined reasons are always valid.
    pub fn is_empty(&self) -> bool {
        match self {
            CancellationReason::Other(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl ReplacementReason {
    /// Returns true if the reason carries no usable text.
    pub fn is_empty(&self) -> bool {
        match self {
            ReplacementReason::Other(text) => text.trim().is_empty(),
            _ => false,
        }
    }
}

impl std::fmt::Display for CancellationReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CancellationReason::CustomerChangedMind => write!(f, "customer_changed_mind"),
            CancellationReason::SupplierOutOfStock => write!(f, "supplier_out_of_stock"),
            CancellationReason::DeliveryTooLong => write!(f, "delivery_too_long"),
            CancellationReason::EntryMistake => write!(f, "entry_mistake"),
            CancellationReason::SupplierPriceTooHigh => write!(f, "supplier_price_too_high"),
            CancellationReason::Other(text) => write!(f, "{}", text),
        }
    }
}

impl std::str::FromStr for CancellationReason {
    type Err = std::convert::Infallible;

    /// Unknown strings round-trip as free text rather than failing,
    /// since stored `Other` reasons are arbitrary operator input.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "customer_changed_mind" => CancellationReason::CustomerChangedMind,
            "supplier_out_of_stock" => CancellationReason::SupplierOutOfStock,
            "delivery_too_long" => CancellationReason::DeliveryTooLong,
            "entry_mistake" => CancellationReason::EntryMistake,
            "supplier_price_too_high" => CancellationReason::SupplierPriceTooHigh,
            other => CancellationReason::Other(other.to_string()),
        })
    }
}

impl std::fmt::Display for ReplacementReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ReplacementReason::Defective => write!(f, "defective"),
            ReplacementReason::WrongReference => write!(f, "wrong_reference"),
            ReplacementReason::BatteryIssue => write!(f, "battery_issue"),
            ReplacementReason::Other(text) => write!(f, "{}", text),
        }
    }
}

impl std::str::FromStr for ReplacementReason {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "defective" => ReplacementReason::Defective,
            "wrong_reference" => ReplacementReason::WrongReference,
            "battery_issue" => ReplacementReason::BatteryIssue,
            other => ReplacementReason::Other(other.to_string()),
        })
    }
}
