use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::{info, warn};

use super::attachment::{prepare_attachment, ImageError, ImageFile};
use super::domain::{
    DraftReport, IssueType, LocationDetails, PersistedReport, ReportStatus, Severity, WizardStep,
};
use super::geolocation::{
    AddressResolver, GeolocationAdapter, GeolocationOptions, LocationError, Position,
    PositionProvider, PositionTracker,
};
use super::store::{ReportStore, StoreError};
use super::submission::{SubmissionError, SubmissionService};
use super::suggestions::{resolve_candidate, LocationCandidate};
use super::summary::{render_summary, SummaryView};
use super::validation::{validate, validate_for_submit, ValidationError};

/// Navigation pointer, draft, and in-flight bookkeeping for one reporter.
#[derive(Debug, Clone, Default)]
struct WizardSession {
    step: WizardStep,
    draft: DraftReport,
    summary: Option<SummaryView>,
    tracker: PositionTracker,
    submitting: bool,
    /// Bumped on every reset; async completions tagged with an older value are dropped.
    generation: u64,
}

impl WizardSession {
    fn reset(&mut self) {
        let generation = self.generation + 1;
        *self = Self {
            generation,
            ..Self::default()
        };
    }

    /// Coordinates are only kept alongside a non-blank address.
    fn apply_location(&mut self, details: LocationDetails) -> bool {
        if details.address.trim().is_empty() {
            return false;
        }
        self.draft.location = details.address.clone();
        self.draft.location_details = Some(details);
        true
    }
}

/// Holds the busy flag for one submit call. Dropping the call early releases it.
struct InFlight<'a> {
    session: &'a Mutex<WizardSession>,
    generation: u64,
    armed: bool,
}

impl InFlight<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let mut session = self.session.lock().unwrap_or_else(PoisonError::into_inner);
        if session.generation == self.generation {
            session.submitting = false;
            warn!("submission abandoned before completion");
        }
    }
}

/// How a call to [`WizardController::submit`] ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The report was stored and the session started over.
    Submitted(PersistedReport),
    /// Another submission was already running; this call did nothing.
    AlreadyInFlight,
    /// The draft was reset while the call was pending; its result was dropped.
    Discarded,
}

/// How a location lookup ended, when it did not fail.
#[derive(Debug, Clone, PartialEq)]
pub enum LocateOutcome {
    Resolved(LocationDetails),
    /// The fix did not replace the current location.
    Unchanged,
    /// The draft was reset while the lookup was pending.
    Discarded,
}

#[derive(Debug, thiserror::Error)]
pub enum SubmitError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Submission(#[from] SubmissionError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Drives the three-step report wizard and owns its draft.
pub struct WizardController<S, R> {
    session: Mutex<WizardSession>,
    service: Arc<S>,
    store: Arc<R>,
    geolocation: GeolocationOptions,
}

impl<S, R> WizardController<S, R>
where
    S: SubmissionService + 'static,
    R: ReportStore + 'static,
{
    pub fn new(service: Arc<S>, store: Arc<R>) -> Self {
        Self::with_geolocation(service, store, GeolocationOptions::default())
    }

    pub fn with_geolocation(
        service: Arc<S>,
        store: Arc<R>,
        geolocation: GeolocationOptions,
    ) -> Self {
        Self {
            session: Mutex::new(WizardSession::default()),
            service,
            store,
            geolocation,
        }
    }

    fn session(&self) -> MutexGuard<'_, WizardSession> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.session().generation != generation
    }

    pub fn current_step(&self) -> WizardStep {
        self.session().step
    }

    pub fn draft(&self) -> DraftReport {
        self.session().draft.clone()
    }

    pub fn is_submitting(&self) -> bool {
        self.session().submitting
    }

    /// Review projection computed when the review step was last entered.
    pub fn summary(&self) -> Option<SummaryView> {
        self.session().summary.clone()
    }

    pub fn store(&self) -> &Arc<R> {
        &self.store
    }

    /// Moves forward one step once the current step validates.
    pub fn advance(&self) -> Result<WizardStep, ValidationError> {
        let mut session = self.session();
        let from = session.step;
        if let Err(err) = validate(from, &session.draft) {
            warn!(step = from.number(), error = %err, "step validation failed");
            return Err(err);
        }

        let to = from.next();
        session.step = to;
        if to == WizardStep::Review {
            session.summary = Some(render_summary(&session.draft));
        }
        info!(from = from.number(), to = to.number(), "wizard advanced");
        Ok(to)
    }

    pub fn retreat(&self) -> WizardStep {
        let mut session = self.session();
        session.step = session.step.previous();
        session.step
    }

    /// Clears the draft and returns to the first step. Pending lookups and submissions
    /// started before this call will not touch the new draft.
    pub fn reset_draft(&self) {
        let mut session = self.session();
        session.reset();
        info!(generation = session.generation, "wizard reset");
    }

    pub async fn submit(&self) -> Result<SubmitOutcome, SubmitError> {
        let (generation, draft) = {
            let mut session = self.session();
            if session.submitting {
                warn!("submission already in flight; ignoring");
                return Ok(SubmitOutcome::AlreadyInFlight);
            }
            if let Err(err) = validate_for_submit(&session.draft) {
                warn!(error = %err, "submission blocked by validation");
                session.step = WizardStep::Location;
                return Err(err.into());
            }
            session.submitting = true;
            (session.generation, session.draft.clone())
        };

        let mut in_flight = InFlight {
            session: &self.session,
            generation,
            armed: true,
        };
        let result = self.service.submit(&draft).await;

        let mut session = self.session();
        in_flight.disarm();
        if session.generation != generation {
            info!("draft was reset during submission; dropping result");
            return Ok(SubmitOutcome::Discarded);
        }
        session.submitting = false;

        let receipt = result.inspect_err(|err| warn!(error = %err, "submission failed"))?;
        let record = PersistedReport {
            report: draft,
            reference_id: receipt.reference_id,
            submitted_at: receipt.submitted_at,
            status: ReportStatus::Pending,
        };
        self.store.append(record.clone())?;

        session.reset();
        info!(reference_id = %record.reference_id, "report submitted");
        Ok(SubmitOutcome::Submitted(record))
    }

    /// Manual address entry. Typing a different address drops stale coordinates.
    pub fn set_location(&self, text: &str) {
        let mut session = self.session();
        session.draft.location = text.to_string();
        let stale = session
            .draft
            .location_details
            .as_ref()
            .is_some_and(|details| details.address != text);
        if stale || text.trim().is_empty() {
            session.draft.location_details = None;
        }
    }

    pub fn clear_location(&self) {
        let mut session = self.session();
        session.draft.location.clear();
        session.draft.location_details = None;
        session.tracker = PositionTracker::default();
    }

    /// Resolves a picked candidate. Blank candidates are ignored.
    pub fn pick_suggestion(&self, candidate: &LocationCandidate) -> Option<LocationDetails> {
        let details = resolve_candidate(candidate);
        self.session()
            .apply_location(details.clone())
            .then_some(details)
    }

    /// One-shot detection followed by reverse geocoding of the fix.
    pub async fn detect_location<P, A>(
        &self,
        adapter: &GeolocationAdapter<P>,
        resolver: &A,
    ) -> Result<LocateOutcome, LocationError>
    where
        P: PositionProvider,
        A: AddressResolver,
    {
        let generation = self.session().generation;
        let detected = adapter.detect_location(&self.geolocation).await;
        if self.is_stale(generation) {
            return Ok(LocateOutcome::Discarded);
        }
        let position = detected?;

        {
            let mut session = self.session();
            if session.generation != generation {
                return Ok(LocateOutcome::Discarded);
            }
            session.tracker = PositionTracker::default();
            session.tracker.observe(position);
        }

        Ok(self.resolve_and_apply(generation, position, resolver).await)
    }

    /// Feeds a fix from continuous tracking. Only refines a fix from `detect_location`,
    /// while the reporter is still on the location step and the device has moved far
    /// enough.
    pub async fn observe_position<A>(&self, position: Position, resolver: &A) -> LocateOutcome
    where
        A: AddressResolver,
    {
        let generation = {
            let mut session = self.session();
            if session.step != WizardStep::Location
                || session.tracker.current().is_none()
                || !session.tracker.observe(position)
            {
                return LocateOutcome::Unchanged;
            }
            session.generation
        };

        self.resolve_and_apply(generation, position, resolver).await
    }

    async fn resolve_and_apply<A>(
        &self,
        generation: u64,
        position: Position,
        resolver: &A,
    ) -> LocateOutcome
    where
        A: AddressResolver,
    {
        let address = resolver.resolve(position.coordinates()).await;

        let mut session = self.session();
        if session.generation != generation {
            return LocateOutcome::Discarded;
        }
        let details = LocationDetails {
            address,
            coordinates: position.coordinates(),
            accuracy_meters: position.accuracy_meters,
            resolved_at: chrono::Utc::now(),
        };
        if !session.apply_location(details.clone()) {
            warn!("resolver returned a blank address; keeping current location");
            return LocateOutcome::Unchanged;
        }
        info!(
            address = %details.address,
            accuracy = position.accuracy_level().label(),
            "location resolved"
        );
        LocateOutcome::Resolved(details)
    }

    pub fn select_issue_type(&self, issue_type: IssueType) {
        self.session().draft.issue_type = Some(issue_type);
    }

    pub fn select_severity(&self, severity: Severity) {
        self.session().draft.severity = Some(severity);
    }

    pub fn set_description(&self, description: &str) {
        self.session().draft.description = description.trim().to_string();
    }

    pub fn set_contact_email(&self, email: &str) {
        self.session().draft.contact_email = email.trim().to_string();
    }

    /// Replaces any current photo. A rejected file leaves the draft untouched.
    pub fn attach_image(&self, file: &ImageFile) -> Result<(), ImageError> {
        let attachment = prepare_attachment(file).inspect_err(|err| {
            warn!(error = %err, "image rejected");
        })?;
        self.session().draft.attached_image = Some(attachment);
        Ok(())
    }

    pub fn remove_image(&self) {
        self.session().draft.attached_image = None;
    }

    /// Link to the full map centered on the resolved location.
    pub fn map_link(&self) -> Option<String> {
        self.session()
            .draft
            .coordinates()
            .map(|c| format!("map.html?lat={}&lng={}", c.lat, c.lng))
    }
}
