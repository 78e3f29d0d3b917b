//! Affiliate commission crediting.
//!
//! Invoked when an affiliate network posts back a conversion for a click
//! this service issued. Computes the user's share by plan tier and appends
//! one positive ledger entry, idempotently keyed on the click id.

use crate::db::Repository;
use crate::domain::{Currency, Decimal, EntryStatus, EntryType, LedgerEntry, TimeMs, UserId};
use crate::engine::commission;
use serde::Serialize;
use std::sync::Arc;
use thiserror::Error;
use tracing::info;

/// What a postback did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum CreditOutcome {
    /// A commission entry was appended.
    Credited { user_id: UserId, amount: Decimal },
    /// This click was already credited; nothing appended.
    Duplicate,
}

#[derive(Debug, Error)]
pub enum CreditError {
    #[error("Unknown click: {0}")]
    UnknownClick(String),
    #[error("Unknown user: {0}")]
    UnknownUser(String),
    #[error(transparent)]
    Db(#[from] sqlx::Error),
}

/// Commission crediting orchestrator.
pub struct CommissionCrediter {
    repo: Arc<Repository>,
}

impl CommissionCrediter {
    pub fn new(repo: Arc<Repository>) -> Self {
        Self { repo }
    }

    /// Credit a conversion postback to the click's owner.
    ///
    /// The raw commission amount is what the network reported for the
    /// conversion; the caller has already rejected non-positive amounts.
    /// Replayed postbacks for the same click credit nothing twice.
    ///
    /// # Errors
    /// Returns an error if the click or user is unknown, or a query fails.
    pub async fn credit(
        &self,
        click_id: &str,
        raw_commission: Decimal,
    ) -> Result<CreditOutcome, CreditError> {
        let click = self
            .repo
            .get_click(click_id)
            .await?
            .ok_or_else(|| CreditError::UnknownClick(click_id.to_string()))?;

        let user = self
            .repo
            .get_user(&click.user_id)
            .await?
            .ok_or_else(|| CreditError::UnknownUser(click.user_id.to_string()))?;

        let share = commission(raw_commission, user.plan);

        let note = match self.repo.get_merchant(&click.merchant_id).await? {
            Some(merchant) => format!("cashback from {}", merchant.name),
            None => format!("cashback from {}", click.merchant_id),
        };

        let entry = LedgerEntry::new(
            user.id.clone(),
            share,
            Currency::aud(),
            EntryType::Commission,
            EntryStatus::Confirmed,
            note,
            TimeMs::now(),
            Some(click_id),
        );

        if !self.repo.append_ledger_entry(&entry).await? {
            return Ok(CreditOutcome::Duplicate);
        }

        info!(
            "click {}: credited {} to user {} (raw {}, plan {})",
            click_id, share, user.id, raw_commission, user.plan
        );

        Ok(CreditOutcome::Credited {
            user_id: user.id,
            amount: share,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::init_db;
    use crate::domain::{AffiliateNetwork, Click, Merchant, PlanTier, UserProfile};
    use std::str::FromStr;
    use tempfile::TempDir;

    async fn setup(plan: PlanTier) -> (CommissionCrediter, Arc<Repository>, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db_path = temp_dir
            .path()
            .join("test.db")
            .to_string_lossy()
            .to_string();
        let pool = init_db(&db_path).await.expect("init_db failed");
        let repo = Arc::new(Repository::new(pool));

        repo.upsert_user(&UserProfile {
            id: UserId::new("u1".to_string()),
            plan,
            streak: 0,
            last_login: None,
        })
        .await
        .unwrap();
        repo.upsert_merchant(&Merchant {
            id: "m1".to_string(),
            name: "Example Store".to_string(),
            base_commission_rate: Decimal::from_str("0.05").unwrap(),
            tracking_link_template: "https://t.example/t/X".to_string(),
            affiliate_network: AffiliateNetwork::Impact,
        })
        .await
        .unwrap();
        repo.insert_click(&Click {
            id: "c1".to_string(),
            user_id: UserId::new("u1".to_string()),
            merchant_id: "m1".to_string(),
            created_at: TimeMs::new(1000),
        })
        .await
        .unwrap();

        (CommissionCrediter::new(repo.clone()), repo, temp_dir)
    }

    #[tokio::test]
    async fn credits_free_tier_share() {
        let (crediter, repo, _temp) = setup(PlanTier::Free).await;

        let outcome = crediter
            .credit("c1", Decimal::from_str("100").unwrap())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreditOutcome::Credited {
                user_id: UserId::new("u1".to_string()),
                amount: Decimal::from_str("15").unwrap(),
            }
        );

        let entries = repo
            .query_ledger(&UserId::new("u1".to_string()))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].entry_type, EntryType::Commission);
        assert_eq!(entries[0].amount.to_canonical_string(), "15");
        assert_eq!(entries[0].note, "cashback from Example Store");
        assert_eq!(entries[0].event_key, "commission:c1");
    }

    #[tokio::test]
    async fn credits_pro_tier_share() {
        let (crediter, _repo, _temp) = setup(PlanTier::Pro).await;

        let outcome = crediter
            .credit("c1", Decimal::from_str("100").unwrap())
            .await
            .unwrap();
        assert_eq!(
            outcome,
            CreditOutcome::Credited {
                user_id: UserId::new("u1".to_string()),
                amount: Decimal::from_str("50").unwrap(),
            }
        );
    }

    #[tokio::test]
    async fn replayed_postback_is_duplicate() {
        let (crediter, repo, _temp) = setup(PlanTier::Free).await;

        crediter
            .credit("c1", Decimal::from_str("100").unwrap())
            .await
            .unwrap();
        let outcome = crediter
            .credit("c1", Decimal::from_str("100").unwrap())
            .await
            .unwrap();
        assert_eq!(outcome, CreditOutcome::Duplicate);

        let entries = repo
            .query_ledger(&UserId::new("u1".to_string()))
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
    }

    #[tokio::test]
    async fn unknown_click_is_an_error() {
        let (crediter, _repo, _temp) = setup(PlanTier::Free).await;

        let err = crediter
            .credit("missing", Decimal::from_str("100").unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, CreditError::UnknownClick(_)));
    }
}
