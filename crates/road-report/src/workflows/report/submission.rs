use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::info;

use super::domain::{DraftReport, ReferenceId};

/// What the backend hands back once it has accepted a report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionReceipt {
    pub reference_id: ReferenceId,
    pub submitted_at: DateTime<Utc>,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmissionError {
    #[error("report service unavailable: {0}")]
    Unavailable(String),
    #[error("report rejected: {0}")]
    Rejected(String),
}

/// Backend that accepts a finished report. Implementations may suspend for as long as the
/// transport needs; the wizard decides afterwards whether the receipt still applies.
#[async_trait]
pub trait SubmissionService: Send + Sync {
    async fn submit(&self, draft: &DraftReport) -> Result<SubmissionReceipt, SubmissionError>;
}

/// Accepts every report after a fixed delay, standing in for a real API call.
#[derive(Debug, Clone)]
pub struct SimulatedSubmissionService {
    latency: Duration,
}

impl SimulatedSubmissionService {
    pub const DEFAULT_LATENCY: Duration = Duration::from_millis(2000);

    pub fn new(latency: Duration) -> Self {
        Self { latency }
    }

    pub fn latency(&self) -> Duration {
        self.latency
    }
}

impl Default for SimulatedSubmissionService {
    fn default() -> Self {
        Self::new(Self::DEFAULT_LATENCY)
    }
}

#[async_trait]
impl SubmissionService for SimulatedSubmissionService {
    async fn submit(&self, draft: &DraftReport) -> Result<SubmissionReceipt, SubmissionError> {
        tokio::time::sleep(self.latency).await;

        let submitted_at = Utc::now();
        let reference_id = ReferenceId::generate(submitted_at);
        info!(
            reference_id = %reference_id,
            issue_type = draft.issue_type.map(|issue| issue.code()),
            "simulated report service accepted submission"
        );

        Ok(SubmissionReceipt {
            reference_id,
            submitted_at,
        })
    }
}
