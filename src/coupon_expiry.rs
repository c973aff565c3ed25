//! Coupon expiry
//!
//! Active coupons past their expiration date are marked as expired in the background. Readers
//! never depend on it, see [`Coupon::status_at`](crate::coupons::Coupon::status_at).

use std::time::Duration;

use chrono::DateTime;
use chrono::Utc;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::storage::Storage;

/// Expire overdue coupons every `interval` until `shutdown` is cancelled
pub async fn run<S: Storage>(storage: S, interval: Duration, shutdown: CancellationToken) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            biased;

            () = shutdown.cancelled() => {
                tracing::debug!("Coupon expiry stopped");
                break;
            }
            _ = ticker.tick() => {
                sweep(&storage, Utc::now()).await;
            }
        }
    }
}

/// Expire all overdue coupons once, returns how many expired
pub async fn sweep<S: Storage>(storage: &S, now: DateTime<Utc>) -> u64 {
    match storage.expire_coupons(now).await {
        Ok(expired) => {
            if expired > 0 {
                tracing::info!("Expired {expired} coupon(s)");
            }

            expired
        }
        Err(err) => {
            tracing::error!("Could not expire coupons: {err}");

            0
        }
    }
}
