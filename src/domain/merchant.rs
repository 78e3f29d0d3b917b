//! Merchant reference data and recorded outbound clicks.

use crate::domain::{Decimal, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// An affiliate merchant users can shop through.
///
/// Immutable reference data maintained by an administrative seeding
/// process; this service only reads it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Merchant {
    /// Opaque merchant identifier.
    pub id: String,
    /// Display name.
    pub name: String,
    /// Fraction (0-1) of order value the network pays as commission.
    pub base_commission_rate: Decimal,
    /// Outbound URL template tracking parameters are merged into.
    pub tracking_link_template: String,
    /// Network the merchant is affiliated through.
    pub affiliate_network: AffiliateNetwork,
}

/// Affiliate network a merchant's program runs on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AffiliateNetwork {
    Impact,
    Partnerize,
    CommissionFactory,
    Awin,
}

impl AffiliateNetwork {
    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            AffiliateNetwork::Impact => "impact",
            AffiliateNetwork::Partnerize => "partnerize",
            AffiliateNetwork::CommissionFactory => "commissionfactory",
            AffiliateNetwork::Awin => "awin",
        }
    }
}

impl std::fmt::Display for AffiliateNetwork {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for AffiliateNetwork {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "impact" => Ok(AffiliateNetwork::Impact),
            "partnerize" => Ok(AffiliateNetwork::Partnerize),
            "commissionfactory" => Ok(AffiliateNetwork::CommissionFactory),
            "awin" => Ok(AffiliateNetwork::Awin),
            other => Err(format!("unknown affiliate network: {}", other)),
        }
    }
}

/// One recorded outbound click, keyed by the click id embedded in the
/// tracking link. A later network postback carrying the same id attributes
/// the conversion back to this user and merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Click {
    pub id: String,
    pub user_id: UserId,
    pub merchant_id: String,
    pub created_at: TimeMs,
}
