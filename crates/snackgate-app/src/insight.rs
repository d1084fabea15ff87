//! Advisory insight collaborator.
//!
//! An [`InsightService`] turns a snapshot of the day's activity into a short
//! piece of advice. It is only called on explicit operator request; a failure
//! degrades to [`FALLBACK_INSIGHT`] and is never retried automatically.

use async_trait::async_trait;
use thiserror::Error;

/// Shown when the insight service fails.
pub const FALLBACK_INSIGHT: &str = "Keep a glass of water nearby and take a short walk before the next snack.";

/// Snapshot handed to the insight service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsightRequest {
    /// Visits counted in the current period.
    pub count_today: u32,
    /// Visit quota.
    pub limit: u32,
    /// Lockout length in minutes.
    pub lock_duration_minutes: u32,
    /// Most recent diagnostic lines, newest first.
    pub recent_log: Vec<String>,
}

/// Insight generation failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum InsightError {
    /// No credential is configured for the service.
    #[error("insight service has no credential configured")]
    MissingCredential,

    /// The service could not produce a tip.
    #[error("insight service unavailable: {0}")]
    ServiceUnavailable(String),
}

/// Produces advisory text for the operator.
#[async_trait]
pub trait InsightService: Send + Sync {
    /// Generate a tip for `request`.
    async fn generate(&self, request: &InsightRequest) -> Result<String, InsightError>;
}

/// Service used when nothing is configured. Always fails with
/// [`InsightError::MissingCredential`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Unconfigured;

#[async_trait]
impl InsightService for Unconfigured {
    async fn generate(&self, _request: &InsightRequest) -> Result<String, InsightError> {
        Err(InsightError::MissingCredential)
    }
}

/// Local, deterministic tips derived from the quota figures.
#[derive(Debug, Clone, Copy, Default)]
pub struct RuleOfThumb;

impl RuleOfThumb {
    fn tip(request: &InsightRequest) -> String {
        let left = request.limit.saturating_sub(request.count_today);
        match left {
            0 if request.lock_duration_minutes > 0 => format!(
                "Quota reached. The gate stays shut for {} minutes after locking; plan something away from the kitchen.",
                request.lock_duration_minutes
            ),
            0 => "Quota reached. Try a lower limit tomorrow to keep the habit going.".to_owned(),
            1 => "One visit left. Make it count and pair it with some protein.".to_owned(),
            _ if request.count_today == 0 => {
                format!("No visits yet. {left} available; spacing them out keeps cravings steady.")
            },
            _ => format!("{} of {} visits used. Pace yourself, {left} remain.", request.count_today, request.limit),
        }
    }
}

#[async_trait]
impl InsightService for RuleOfThumb {
    async fn generate(&self, request: &InsightRequest) -> Result<String, InsightError> {
        Ok(Self::tip(request))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(count_today: u32, limit: u32, lock_duration_minutes: u32) -> InsightRequest {
        InsightRequest { count_today, limit, lock_duration_minutes, recent_log: Vec::new() }
    }

    #[tokio::test]
    async fn unconfigured_reports_missing_credential() {
        let result = Unconfigured.generate(&request(1, 5, 0)).await;
        assert_eq!(result, Err(InsightError::MissingCredential));
    }

    #[tokio::test]
    async fn rule_of_thumb_is_deterministic() {
        let first = RuleOfThumb.generate(&request(2, 5, 0)).await;
        let second = RuleOfThumb.generate(&request(2, 5, 0)).await;
        assert_eq!(first, second);
        assert_eq!(first.as_deref(), Ok("2 of 5 visits used. Pace yourself, 3 remain."));
    }

    #[test]
    fn quota_reached_mentions_lockout() {
        let tip = RuleOfThumb::tip(&request(5, 5, 10));
        assert!(tip.contains("10 minutes"));
    }

    #[test]
    fn service_is_object_safe() {
        let services: Vec<Box<dyn InsightService>> = vec![Box::new(Unconfigured), Box::new(RuleOfThumb)];
        assert_eq!(services.len(), 2);
    }
}
