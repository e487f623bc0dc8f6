use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use crate::workflows::report::domain::{Coordinates, DraftReport, PersistedReport};
use crate::workflows::report::geolocation::{
    AddressResolver, GeolocationOptions, LocationError, Position, PositionProvider,
};
use crate::workflows::report::store::{InMemoryReportStore, ReportStore, StoreError};
use crate::workflows::report::submission::{
    SimulatedSubmissionService, SubmissionError, SubmissionReceipt, SubmissionService,
};
use crate::workflows::report::{IssueType, Severity, WizardController};

pub(super) type SimulatedWizard = WizardController<SimulatedSubmissionService, InMemoryReportStore>;

pub(super) fn wizard() -> (Arc<SimulatedWizard>, Arc<InMemoryReportStore>) {
    let store = Arc::new(InMemoryReportStore::default());
    let service = Arc::new(SimulatedSubmissionService::new(Duration::from_millis(2000)));
    let wizard = Arc::new(WizardController::new(service, store.clone()));
    (wizard, store)
}

/// Walks a fresh wizard to the review step with a pothole on Main Street.
pub(super) fn filled_to_review(wizard: &SimulatedWizard) {
    wizard.set_location("Main Street");
    wizard.advance().expect("location step passes");
    wizard.select_issue_type(IssueType::Pothole);
    wizard.select_severity(Severity::High);
    wizard.advance().expect("classification step passes");
}

pub(super) struct FixedProvider {
    pub(super) result: Result<Position, LocationError>,
    pub(super) delay: Duration,
}

#[async_trait]
impl PositionProvider for FixedProvider {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Position, LocationError> {
        tokio::time::sleep(self.delay).await;
        self.result
    }
}

pub(super) fn downtown_fix(accuracy_meters: f64) -> Position {
    Position {
        lat: 40.7128,
        lng: -74.0060,
        accuracy_meters,
    }
}

pub(super) struct FixedResolver(pub(super) &'static str);

#[async_trait]
impl AddressResolver for FixedResolver {
    async fn resolve(&self, _coordinates: Coordinates) -> String {
        self.0.to_string()
    }
}

/// Fails every submission and counts the attempts.
#[derive(Default)]
pub(super) struct UnavailableService {
    pub(super) attempts: AtomicUsize,
}

#[async_trait]
impl SubmissionService for UnavailableService {
    async fn submit(&self, _draft: &DraftReport) -> Result<SubmissionReceipt, SubmissionError> {
        self.attempts.fetch_add(1, Ordering::SeqCst);
        Err(SubmissionError::Unavailable("offline".to_string()))
    }
}

/// Rejects every append, as a full or read-only disk would.
#[derive(Default)]
pub(super) struct FailingStore;

impl ReportStore for FailingStore {
    fn append(&self, _record: PersistedReport) -> Result<(), StoreError> {
        Err(StoreError::Unavailable("disk full".to_string()))
    }

    fn read_all(&self) -> Result<Vec<PersistedReport>, StoreError> {
        Ok(Vec::new())
    }
}
