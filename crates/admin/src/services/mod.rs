//! Business services composing the repository layer.
//!
//! Aggregation is performed in-process: every analytics call loads the
//! matching settled orders into memory and groups them there. This is fine
//! at moderate order volumes; past that, grouping and windowing must move
//! into the query layer.

pub mod customers;
pub mod dashboard;
pub mod stock;

use std::future::Future;
use std::time::Duration;

use chrono::{DateTime, Datelike, NaiveDate, NaiveTime, TimeZone, Utc};

pub use customers::CustomerDirectory;
pub use dashboard::DashboardService;
pub use stock::StockService;

use crate::db::RepositoryError;
use crate::error::AppError;

/// Run a store query with an upper bound on its duration.
///
/// A query that outlives the bound fails the whole request with a 503
/// rather than hanging; no retry is attempted.
pub(crate) async fn bounded<T, F>(timeout: Duration, what: &str, fut: F) -> Result<T, AppError>
where
    F: Future<Output = Result<T, RepositoryError>>,
{
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => Ok(result?),
        Err(_) => Err(AppError::Timeout(what.to_string())),
    }
}

/// First instant of the month containing `now`.
#[must_use]
pub fn month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let date = now.date_naive();
    let first = date.with_day(1).unwrap_or(date);
    Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN))
}

/// First instant of the month before the one containing `now`.
///
/// Together with [`month_start`] this gives the previous calendar month as
/// the half-open window `[previous_month_start, month_start)`.
#[must_use]
pub fn previous_month_start(now: DateTime<Utc>) -> DateTime<Utc> {
    let first = month_start(now);
    let (year, month) = if first.month() == 1 {
        (first.year() - 1, 12)
    } else {
        (first.year(), first.month() - 1)
    };
    NaiveDate::from_ymd_opt(year, month, 1)
        .map_or(first, |d| Utc.from_utc_datetime(&d.and_time(NaiveTime::MIN)))
}
