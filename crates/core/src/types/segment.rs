//! Customer segmentation.
//!
//! A customer aggregate is mapped to exactly one segment from its lifetime
//! spend and order count. The rules are ordered and first-match-wins: the
//! spend rule has absolute priority, so a customer at the VIP spend
//! threshold classifies VIP regardless of order count.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Customer segment label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Segment {
    #[serde(rename = "New")]
    New,
    #[serde(rename = "Regular")]
    Regular,
    #[serde(rename = "Loyal")]
    Loyal,
    #[serde(rename = "VIP")]
    Vip,
}

impl Segment {
    /// All segments, in ascending order of value.
    pub const ALL: [Self; 4] = [Self::New, Self::Regular, Self::Loyal, Self::Vip];
}

impl std::fmt::Display for Segment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::New => "New",
            Self::Regular => "Regular",
            Self::Loyal => "Loyal",
            Self::Vip => "VIP",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for Segment {
    type Err = String;

    /// Case-insensitive parse, used by the `type` list filter.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "new" => Ok(Self::New),
            "regular" => Ok(Self::Regular),
            "loyal" => Ok(Self::Loyal),
            "vip" => Ok(Self::Vip),
            _ => Err(format!("invalid customer segment: {s}")),
        }
    }
}

/// Classification thresholds.
///
/// Configurable per deployment; the defaults match the fixed constants the
/// platform has always used (500 / 5 / 2).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SegmentRules {
    /// Lifetime spend at or above which a customer is VIP.
    pub vip_spend: Decimal,
    /// Order count at or above which a (non-VIP) customer is Loyal.
    pub loyal_orders: u32,
    /// Order count at or above which a (non-VIP, non-Loyal) customer is Regular.
    pub regular_orders: u32,
}

impl Default for SegmentRules {
    fn default() -> Self {
        Self {
            vip_spend: Decimal::from(500),
            loyal_orders: 5,
            regular_orders: 2,
        }
    }
}

impl SegmentRules {
    /// Classify an aggregate by lifetime spend and order count.
    ///
    /// Total function: every input maps to exactly one segment. Rules are
    /// evaluated in order; the spend rule wins over the order-count rules.
    #[must_use]
    pub fn classify(&self, total_spent: Decimal, total_orders: u32) -> Segment {
        if total_spent >= self.vip_spend {
            Segment::Vip
        } else if total_orders >= self.loyal_orders {
            Segment::Loyal
        } else if total_orders >= self.regular_orders {
            Segment::Regular
        } else {
            Segment::New
        }
    }
}
