//! Ledger client backed by the in-memory ledger.
//!
//! The service works in minor units; the ledger stores major units. Amounts
//! are divided by 100 on the way in and multiplied by 100 on the way out.
//! Posting divides before applying the size factor, so amounts that are not
//! multiples of 100 are truncated.

use std::sync::Arc;

use async_trait::async_trait;

use reserve_core::config::LedgerConfig;
use reserve_core::error::AppError;
use reserve_core::result::AppResult;
use reserve_core::traits::LedgerClient;
use reserve_core::types::{Reserve, ReserveId, ReserveRequest, UserId};

use crate::memory::MemoryLedger;

/// Minor units per major unit at the ledger boundary.
const MINOR_UNITS: i64 = 100;

/// [`LedgerClient`] over a [`MemoryLedger`] with failure injection.
#[derive(Debug, Clone)]
pub struct SimulatedLedgerClient {
    /// Backing store.
    ledger: Arc<MemoryLedger>,
    /// Percentage of posts that fail.
    post_failure_percent: u8,
    /// Percentage of splits that fail.
    split_failure_percent: u8,
}

impl SimulatedLedgerClient {
    /// Build a client and its backing ledger from configuration.
    pub fn new(config: &LedgerConfig) -> Self {
        Self::with_ledger(Arc::new(MemoryLedger::new(config)), config)
    }

    /// Build a client over an existing ledger.
    pub fn with_ledger(ledger: Arc<MemoryLedger>, config: &LedgerConfig) -> Self {
        Self {
            ledger,
            post_failure_percent: config.post_failure_percent,
            split_failure_percent: config.split_failure_percent,
        }
    }

    /// The backing ledger.
    pub fn ledger(&self) -> &Arc<MemoryLedger> {
        &self.ledger
    }
}

/// Roll a failure with the given percentage.
fn injected_failure(percent: u8) -> bool {
    percent > 0 && rand::random::<f64>() * 100.0 < f64::from(percent)
}

/// Ledger-side amount for `amount` minor units times `size_factor`. Fails
/// when the result, or its minor-unit view, does not fit in an `i64`.
fn to_major(amount: i64, size_factor: i64) -> AppResult<i64> {
    (amount / MINOR_UNITS)
        .checked_mul(size_factor)
        .filter(|major| major.checked_mul(MINOR_UNITS).is_some())
        .ok_or_else(|| {
            AppError::ledger(format!(
                "amount {amount} times {size_factor} exceeds the ledger range"
            ))
        })
}

fn to_minor(mut reserve: Reserve) -> AppResult<Reserve> {
    reserve.amount = reserve.amount.checked_mul(MINOR_UNITS).ok_or_else(|| {
        AppError::ledger(format!(
            "reserve {} exceeds the minor-unit range",
            reserve.id
        ))
    })?;
    Ok(reserve)
}

#[async_trait]
impl LedgerClient for SimulatedLedgerClient {
    async fn post(&self, request: &ReserveRequest, size_factor: i64) -> AppResult<Reserve> {
        if injected_failure(self.post_failure_percent) {
            tracing::warn!(user_id = request.user_id, "Injected ledger post failure");
            return Err(AppError::ledger("ledger rejected the reserve"));
        }

        let scaled = request.with_amount(to_major(request.amount, size_factor)?);
        self.ledger.insert(&scaled).await.and_then(to_minor)
    }

    async fn split(
        &self,
        request: &ReserveRequest,
        parent_id: ReserveId,
    ) -> AppResult<(Reserve, Reserve)> {
        if injected_failure(self.split_failure_percent) {
            tracing::warn!(
                user_id = request.user_id,
                parent_id,
                "Injected ledger split failure"
            );
            return Err(AppError::ledger("ledger rejected the split"));
        }

        let scaled = request.with_amount(to_major(request.amount, 1)?);
        let (remainder, child) = self.ledger.split(&scaled, parent_id).await?;
        Ok((to_minor(remainder)?, to_minor(child)?))
    }

    async fn release(&self, reserve_id: ReserveId) -> AppResult<()> {
        self.ledger.release(reserve_id);
        Ok(())
    }

    async fn list(&self, user_id: UserId) -> AppResult<Vec<Reserve>> {
        self.ledger.list(user_id).into_iter().map(to_minor).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use reserve_core::error::ErrorKind;
    use reserve_core::types::{Mode, Reason, ReserveStatus, ReserveVersion};

    fn request(amount: i64) -> ReserveRequest {
        ReserveRequest {
            amount,
            mode: Mode::Partial,
            reason: Reason::ReserveForPayment,
            external_reference: "order-9".to_string(),
            idempotency_key: "idem-9".to_string(),
            client_id: "client-9".to_string(),
            user_id: 9,
        }
    }

    #[tokio::test]
    async fn test_post_applies_scaling_and_factor() {
        let client = SimulatedLedgerClient::new(&LedgerConfig::instant());

        let pooled = client.post(&request(2500), 10).await.expect("post");

        assert_eq!(pooled.amount, 25_000);
        assert_eq!(pooled.version, Some(ReserveVersion::InitialTbs));
        assert_eq!(client.ledger().get(pooled.id).map(|r| r.amount), Some(250));
    }

    #[tokio::test]
    async fn test_post_truncates_non_multiples_of_hundred() {
        let client = SimulatedLedgerClient::new(&LedgerConfig::instant());
        let reserve = client.post(&request(2550), 1).await.expect("post");
        assert_eq!(reserve.amount, 2500);
    }

    #[tokio::test]
    async fn test_split_returns_scaled_pair() {
        let client = SimulatedLedgerClient::new(&LedgerConfig::instant());
        let parent = client.post(&request(2500), 10).await.expect("post");

        let (rest, child) = client.split(&request(2500), parent.id).await.expect("split");

        assert_eq!(rest.amount, 22_500);
        assert_eq!(child.amount, 2_500);
        assert_eq!(child.status, ReserveStatus::Reserved);
        assert_eq!(rest.amount + child.amount, parent.amount);
    }

    #[tokio::test]
    async fn test_oversized_post_is_refused_before_storing() {
        let client = SimulatedLedgerClient::new(&LedgerConfig::instant());

        let err = client
            .post(&request(i64::MAX), 10)
            .await
            .expect_err("overflow");

        assert_eq!(err.kind, ErrorKind::Ledger);
        assert!(client.list(9).await.expect("list").is_empty());
    }

    #[tokio::test]
    async fn test_sub_unit_split_is_refused() {
        let client = SimulatedLedgerClient::new(&LedgerConfig::instant());
        let parent = client.post(&request(2500), 10).await.expect("post");

        let err = client
            .split(&request(50), parent.id)
            .await
            .expect_err("rounds to zero");

        assert_eq!(err.kind, ErrorKind::Ledger);
        assert_eq!(
            client.ledger().get(parent.id).map(|r| r.status),
            Some(ReserveStatus::Reserved)
        );
    }

    #[tokio::test]
    async fn test_injected_failures() {
        let config = LedgerConfig {
            post_failure_percent: 100,
            split_failure_percent: 100,
            ..LedgerConfig::instant()
        };
        let client = SimulatedLedgerClient::new(&config);

        let post = client.post(&request(2500), 1).await.expect_err("post fails");
        assert_eq!(post.kind, ErrorKind::Ledger);

        let split = client.split(&request(2500), 1).await.expect_err("split fails");
        assert_eq!(split.kind, ErrorKind::Ledger);
    }

    #[tokio::test]
    async fn test_list_and_release() {
        let client = SimulatedLedgerClient::new(&LedgerConfig::instant());
        let reserve = client.post(&request(1000), 1).await.expect("post");

        client.release(reserve.id).await.expect("release");
        client.release(reserve.id).await.expect("release twice");

        let listed = client.list(9).await.expect("list");
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].amount, 1000);
        assert_eq!(listed[0].status, ReserveStatus::Released);
    }
}
