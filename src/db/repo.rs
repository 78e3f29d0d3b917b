//! Repository layer for database operations.
//!
//! The wallet ledger is append-only: this layer exposes append and query
//! only, never update or delete. Withdrawal status transitions are guarded
//! in SQL so a request leaves `pending` at most once.

use crate::domain::{
    Click, Currency, Decimal, EntryStatus, EntryType, LedgerEntry, Merchant, PlanTier, TimeMs,
    UserId, UserProfile, WithdrawRequest, WithdrawStatus,
};
use sqlx::sqlite::SqlitePool;
use sqlx::Row;
use std::str::FromStr;

/// Repository for database operations.
pub struct Repository {
    pool: SqlitePool,
}

impl Repository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: SqlitePool) -> Self {
        Repository { pool }
    }

    // --- withdraw requests ---

    /// Insert a withdrawal request if no row with its id exists yet.
    ///
    /// Never overwrites: an existing row may already carry a committed
    /// terminal state that a stale snapshot must not clobber.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_withdraw_request_if_absent(
        &self,
        req: &WithdrawRequest,
    ) -> Result<bool, sqlx::Error> {
        let now = TimeMs::now().as_ms();
        let result = sqlx::query(
            r#"
            INSERT INTO withdraw_requests (
                id, user_id, amount, currency, stripe_account_id,
                approve_payout, status, transfer_id, reason, paid_at,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&req.id)
        .bind(req.user_id.as_str())
        .bind(req.amount.to_canonical_string())
        .bind(req.currency.as_str())
        .bind(&req.stripe_account_id)
        .bind(req.approve_payout)
        .bind(req.status.as_str())
        .bind(&req.transfer_id)
        .bind(&req.reason)
        .bind(req.paid_at.map(|t| t.as_ms()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Fetch a withdrawal request by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_withdraw_request(
        &self,
        id: &str,
    ) -> Result<Option<WithdrawRequest>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, amount, currency, stripe_account_id,
                   approve_payout, status, transfer_id, reason, paid_at
            FROM withdraw_requests
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| parse_withdraw_row(&r)))
    }

    /// Record a terminal failure on a still-pending request.
    ///
    /// Returns false if the request had already left `pending` (the
    /// transition is ignored; paid/failed are terminal).
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn set_withdraw_failed(&self, id: &str, reason: &str) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE withdraw_requests
            SET status = 'failed', reason = ?, updated_at = ?
            WHERE id = ? AND status = 'pending'
            "#,
        )
        .bind(reason)
        .bind(TimeMs::now().as_ms())
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Commit a successful payout: mark the request paid and append the
    /// withdrawal ledger entry in one transaction (both or neither).
    ///
    /// The UPDATE is guarded on `status = 'pending' AND transfer_id IS
    /// NULL`; a guard miss means a concurrent duplicate already committed,
    /// so the transaction rolls back and nothing is appended. Returns
    /// whether the guard matched.
    ///
    /// # Errors
    /// Returns an error if the transaction fails; safe to retry, the guard
    /// and the unique ledger event key keep redelivery idempotent.
    pub async fn commit_payout(
        &self,
        id: &str,
        transfer_id: &str,
        paid_at: TimeMs,
        entry: &LedgerEntry,
    ) -> Result<bool, sqlx::Error> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE withdraw_requests
            SET status = 'paid', transfer_id = ?, paid_at = ?, updated_at = ?
            WHERE id = ? AND status = 'pending' AND transfer_id IS NULL
            "#,
        )
        .bind(transfer_id)
        .bind(paid_at.as_ms())
        .bind(TimeMs::now().as_ms())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            tx.rollback().await?;
            return Ok(false);
        }

        sqlx::query(
            r#"
            INSERT INTO wallet_ledger (
                event_key, user_id, amount, currency, entry_type, status, note, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_key) DO NOTHING
            "#,
        )
        .bind(&entry.event_key)
        .bind(entry.user_id.as_str())
        .bind(entry.amount.to_canonical_string())
        .bind(entry.currency.as_str())
        .bind(entry.entry_type.as_str())
        .bind(entry.status.as_str())
        .bind(&entry.note)
        .bind(entry.created_at.as_ms())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(true)
    }

    // --- wallet ledger ---

    /// Append a ledger entry idempotently.
    ///
    /// Returns false if an entry with the same event key already exists.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn append_ledger_entry(&self, entry: &LedgerEntry) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            INSERT INTO wallet_ledger (
                event_key, user_id, amount, currency, entry_type, status, note, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
            ON CONFLICT(event_key) DO NOTHING
            "#,
        )
        .bind(&entry.event_key)
        .bind(entry.user_id.as_str())
        .bind(entry.amount.to_canonical_string())
        .bind(entry.currency.as_str())
        .bind(entry.entry_type.as_str())
        .bind(entry.status.as_str())
        .bind(&entry.note)
        .bind(entry.created_at.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    /// Query a user's ledger entries in append order.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn query_ledger(&self, user: &UserId) -> Result<Vec<LedgerEntry>, sqlx::Error> {
        let rows = sqlx::query(
            r#"
            SELECT event_key, user_id, amount, currency, entry_type, status, note, created_at
            FROM wallet_ledger
            WHERE user_id = ?
            ORDER BY created_at ASC, id ASC
            "#,
        )
        .bind(user.as_str())
        .fetch_all(&self.pool)
        .await?;

        let entries = rows
            .iter()
            .map(|row| {
                let amount_str: String = row.get("amount");
                let entry_type_str: String = row.get("entry_type");
                let status_str: String = row.get("status");

                LedgerEntry {
                    event_key: row.get("event_key"),
                    user_id: UserId::new(row.get("user_id")),
                    amount: Decimal::from_str(&amount_str).unwrap_or_default(),
                    currency: Currency::new(row.get("currency")),
                    entry_type: EntryType::from_str(&entry_type_str)
                        .unwrap_or(EntryType::Deposit),
                    status: EntryStatus::from_str(&status_str).unwrap_or(EntryStatus::Confirmed),
                    note: row.get("note"),
                    created_at: TimeMs::new(row.get("created_at")),
                }
            })
            .collect();

        Ok(entries)
    }

    // --- users ---

    /// Insert or replace a user profile.
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_user(&self, user: &UserProfile) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO users (id, plan, streak, last_login_ms)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                plan = excluded.plan,
                streak = excluded.streak,
                last_login_ms = excluded.last_login_ms
            "#,
        )
        .bind(user.id.as_str())
        .bind(user.plan.as_str())
        .bind(user.streak as i64)
        .bind(user.last_login.map(|t| t.as_ms()))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a user profile by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_user(&self, id: &UserId) -> Result<Option<UserProfile>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, plan, streak, last_login_ms
            FROM users
            WHERE id = ?
            "#,
        )
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let plan_str: String = r.get("plan");
            let streak: i64 = r.get("streak");
            let last_login_ms: Option<i64> = r.get("last_login_ms");

            UserProfile {
                id: UserId::new(r.get("id")),
                plan: PlanTier::from_str(&plan_str).unwrap_or_default(),
                streak: streak.max(0) as u32,
                last_login: last_login_ms.map(TimeMs::new),
            }
        }))
    }

    /// Persist a recalculated streak and login time for a user.
    ///
    /// # Errors
    /// Returns an error if the update fails.
    pub async fn update_streak(
        &self,
        id: &UserId,
        streak: u32,
        last_login: TimeMs,
    ) -> Result<bool, sqlx::Error> {
        let result = sqlx::query(
            r#"
            UPDATE users SET streak = ?, last_login_ms = ? WHERE id = ?
            "#,
        )
        .bind(streak as i64)
        .bind(last_login.as_ms())
        .bind(id.as_str())
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() > 0)
    }

    // --- merchants ---

    /// Insert or replace a merchant (administrative seeding path).
    ///
    /// # Errors
    /// Returns an error if the upsert fails.
    pub async fn upsert_merchant(&self, merchant: &Merchant) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO merchants (id, name, base_commission_rate, tracking_link_template, affiliate_network)
            VALUES (?, ?, ?, ?, ?)
            ON CONFLICT(id) DO UPDATE SET
                name = excluded.name,
                base_commission_rate = excluded.base_commission_rate,
                tracking_link_template = excluded.tracking_link_template,
                affiliate_network = excluded.affiliate_network
            "#,
        )
        .bind(&merchant.id)
        .bind(&merchant.name)
        .bind(merchant.base_commission_rate.to_canonical_string())
        .bind(&merchant.tracking_link_template)
        .bind(merchant.affiliate_network.as_str())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a merchant by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_merchant(&self, id: &str) -> Result<Option<Merchant>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, name, base_commission_rate, tracking_link_template, affiliate_network
            FROM merchants
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| {
            let rate_str: String = r.get("base_commission_rate");
            let network_str: String = r.get("affiliate_network");

            Merchant {
                id: r.get("id"),
                name: r.get("name"),
                base_commission_rate: Decimal::from_str(&rate_str).unwrap_or_default(),
                tracking_link_template: r.get("tracking_link_template"),
                affiliate_network: crate::domain::AffiliateNetwork::from_str(&network_str)
                    .unwrap_or(crate::domain::AffiliateNetwork::Impact),
            }
        }))
    }

    // --- clicks ---

    /// Record an outbound click.
    ///
    /// # Errors
    /// Returns an error if the insert fails.
    pub async fn insert_click(&self, click: &Click) -> Result<(), sqlx::Error> {
        sqlx::query(
            r#"
            INSERT INTO clicks (id, user_id, merchant_id, created_at)
            VALUES (?, ?, ?, ?)
            ON CONFLICT(id) DO NOTHING
            "#,
        )
        .bind(&click.id)
        .bind(click.user_id.as_str())
        .bind(&click.merchant_id)
        .bind(click.created_at.as_ms())
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Fetch a recorded click by id.
    ///
    /// # Errors
    /// Returns an error if the query fails.
    pub async fn get_click(&self, id: &str) -> Result<Option<Click>, sqlx::Error> {
        let row = sqlx::query(
            r#"
            SELECT id, user_id, merchant_id, created_at
            FROM clicks
            WHERE id = ?
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(row.map(|r| Click {
            id: r.get("id"),
            user_id: UserId::new(r.get("user_id")),
            merchant_id: r.get("merchant_id"),
            created_at: TimeMs::new(r.get("created_at")),
        }))
    }
}

fn parse_withdraw_row(row: &sqlx::sqlite::SqliteRow) -> WithdrawRequest {
    let amount_str: String = row.get("amount");
    let status_str: String = row.get("status");
    let paid_at: Option<i64> = row.get("paid_at");

    WithdrawRequest {
        id: row.get("id"),
        user_id: UserId::new(row.get("user_id")),
        amount: Decimal::from_str(&amount_str).unwrap_or_default(),
        currency: Currency::new(row.get("currency")),
        stripe_account_id: row.get("stripe_account_id"),
        approve_payout: row.get("approve_payout"),
        status: WithdrawStatus::from_str(&status_str).unwrap_or_default(),
        transfer_id: row.get("transfer_id"),
        reason: row.get("reason"),
        paid_at: paid_at.map(TimeMs::new),
    }
}
