//! Consolidate status lifecycle.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Status of a consolidated shipment.
///
/// Any status may be set on update; only the initial subset is accepted on
/// creation. No transition-adjacency graph is enforced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConsolidateStatus {
    AwaitingPayment,
    Pending,
    Processing,
    InTransit,
    Delivered,
    Cancelled,
}

impl ConsolidateStatus {
    pub const ALL: [Self; 6] = [
        Self::AwaitingPayment,
        Self::Pending,
        Self::Processing,
        Self::InTransit,
        Self::Delivered,
        Self::Cancelled,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::AwaitingPayment => "awaiting_payment",
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::InTransit => "in_transit",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// Whether a consolidate may be created in this status.
    #[must_use]
    pub const fn is_initial(self) -> bool {
        matches!(self, Self::AwaitingPayment | Self::Pending | Self::Processing)
    }
}

impl fmt::Display for ConsolidateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConsolidateStatus {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "awaiting_payment" => Ok(Self::AwaitingPayment),
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "in_transit" => Ok(Self::InTransit),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            _ => Err(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_round_trip_all_variants() {
        for status in ConsolidateStatus::ALL {
            assert_eq!(status.as_str().parse::<ConsolidateStatus>(), Ok(status));
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("shipped".parse::<ConsolidateStatus>().is_err());
        assert!("PENDING".parse::<ConsolidateStatus>().is_err());
        assert!("".parse::<ConsolidateStatus>().is_err());
    }

    #[test]
    fn test_initial_subset() {
        assert!(ConsolidateStatus::AwaitingPayment.is_initial());
        assert!(ConsolidateStatus::Pending.is_initial());
        assert!(ConsolidateStatus::Processing.is_initial());
        assert!(!ConsolidateStatus::InTransit.is_initial());
        assert!(!ConsolidateStatus::Delivered.is_initial());
        assert!(!ConsolidateStatus::Cancelled.is_initial());
    }
}
