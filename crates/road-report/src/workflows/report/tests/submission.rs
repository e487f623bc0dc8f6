use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use super::common::*;
use crate::workflows::report::domain::{ReportStatus, WizardStep};
use crate::workflows::report::store::{InMemoryReportStore, ReportStore};
use crate::workflows::report::validation::ValidationError;
use crate::workflows::report::submission::SimulatedSubmissionService;
use crate::workflows::report::{SubmitError, SubmitOutcome, WizardController};

#[tokio::test(start_paused = true)]
async fn full_walkthrough_stores_pending_report_and_resets() {
    let (wizard, store) = wizard();
    filled_to_review(&wizard);
    wizard.set_contact_email("reporter@example.com");

    let started = tokio::time::Instant::now();
    let outcome = wizard.submit().await.expect("submission succeeds");
    assert!(started.elapsed() >= Duration::from_millis(2000));

    let record = match outcome {
        SubmitOutcome::Submitted(record) => record,
        other => panic!("expected stored record, got {other:?}"),
    };
    assert_eq!(record.status, ReportStatus::Pending);
    assert!(record.reference_id.is_well_formed(), "{}", record.reference_id);
    assert_eq!(record.report.location, "Main Street");
    assert_eq!(record.report.contact_email, "reporter@example.com");

    assert_eq!(store.read_all().expect("read"), vec![record]);
    assert_eq!(wizard.current_step(), WizardStep::Location);
    assert_eq!(wizard.draft(), Default::default());
    assert!(!wizard.is_submitting());
}

#[tokio::test(start_paused = true)]
async fn invalid_submit_forces_first_step() {
    let (wizard, store) = wizard();
    filled_to_review(&wizard);
    wizard.set_location("");

    match wizard.submit().await {
        Err(SubmitError::Validation(ValidationError::MissingLocation)) => {}
        other => panic!("expected validation failure, got {other:?}"),
    }
    assert_eq!(wizard.current_step(), WizardStep::Location);
    assert!(store.read_all().expect("read").is_empty());
}

#[tokio::test(start_paused = true)]
async fn second_submit_while_in_flight_is_ignored() {
    let (wizard, store) = wizard();
    filled_to_review(&wizard);

    let first = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.submit().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert!(wizard.is_submitting());

    let second = wizard.submit().await.expect("second call returns");
    assert_eq!(second, SubmitOutcome::AlreadyInFlight);

    let first = first.await.expect("task joins").expect("first succeeds");
    assert!(matches!(first, SubmitOutcome::Submitted(_)));
    assert_eq!(store.read_all().expect("read").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn reset_during_submission_discards_the_result() {
    let (wizard, store) = wizard();
    filled_to_review(&wizard);

    let pending = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.submit().await })
    };
    tokio::time::sleep(Duration::from_millis(500)).await;

    wizard.reset_draft();
    wizard.set_location("Park Avenue, Midtown");

    let outcome = pending.await.expect("task joins").expect("no error");
    assert_eq!(outcome, SubmitOutcome::Discarded);
    assert!(store.read_all().expect("read").is_empty());
    assert_eq!(wizard.draft().location, "Park Avenue, Midtown");
    assert_eq!(wizard.current_step(), WizardStep::Location);
}

#[tokio::test(start_paused = true)]
async fn resubmitting_after_reset_is_not_blocked_by_the_stale_call() {
    let (wizard, store) = wizard();
    filled_to_review(&wizard);

    let stale = {
        let wizard = wizard.clone();
        tokio::spawn(async move { wizard.submit().await })
    };
    tokio::time::sleep(Duration::from_millis(100)).await;
    wizard.reset_draft();
    filled_to_review(&wizard);

    let fresh = wizard.submit().await.expect("fresh submission");
    assert!(matches!(fresh, SubmitOutcome::Submitted(_)));
    assert_eq!(
        stale.await.expect("task joins").expect("no error"),
        SubmitOutcome::Discarded
    );
    assert_eq!(store.read_all().expect("read").len(), 1);
}

#[tokio::test]
async fn service_failure_keeps_draft_and_allows_retry() {
    let service = Arc::new(UnavailableService::default());
    let store = Arc::new(InMemoryReportStore::default());
    let wizard = WizardController::new(service.clone(), store.clone());
    wizard.set_location("Main Street");
    wizard.advance().expect("location ok");
    wizard.select_issue_type(crate::workflows::report::IssueType::Signage);
    wizard.select_severity(crate::workflows::report::Severity::Medium);
    wizard.advance().expect("classification ok");

    for _ in 0..2 {
        assert!(matches!(
            wizard.submit().await,
            Err(SubmitError::Submission(_))
        ));
        assert!(!wizard.is_submitting());
    }
    assert_eq!(service.attempts.load(Ordering::SeqCst), 2);
    assert_eq!(wizard.current_step(), WizardStep::Review);
    assert_eq!(wizard.draft().location, "Main Street");
    assert!(store.read_all().expect("read").is_empty());
}

#[tokio::test(start_paused = true)]
async fn abandoned_submission_releases_the_busy_flag() {
    let (wizard, store) = wizard();
    filled_to_review(&wizard);

    let abandoned = tokio::time::timeout(Duration::from_millis(100), wizard.submit()).await;
    assert!(abandoned.is_err());
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.current_step(), WizardStep::Review);
    assert_eq!(wizard.draft().location, "Main Street");

    let outcome = wizard.submit().await.expect("retry succeeds");
    assert!(matches!(outcome, SubmitOutcome::Submitted(_)));
    assert_eq!(store.read_all().expect("read").len(), 1);
}

#[tokio::test(start_paused = true)]
async fn store_failure_keeps_draft_and_step() {
    let service = Arc::new(SimulatedSubmissionService::new(Duration::from_millis(1500)));
    let wizard = WizardController::new(service, Arc::new(FailingStore));
    wizard.set_location("Main Street");
    wizard.advance().expect("location ok");
    wizard.select_issue_type(crate::workflows::report::IssueType::Debris);
    wizard.select_severity(crate::workflows::report::Severity::Low);
    wizard.advance().expect("classification ok");
    let before = wizard.draft();

    assert!(matches!(wizard.submit().await, Err(SubmitError::Store(_))));
    assert!(!wizard.is_submitting());
    assert_eq!(wizard.draft(), before);
    assert_eq!(wizard.current_step(), WizardStep::Review);
}
