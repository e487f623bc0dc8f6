//! Road issue report wizard: location capture, classification, review, and submission.

pub mod attachment;
pub mod domain;
pub mod geolocation;
pub mod store;
pub mod submission;
pub mod suggestions;
pub mod summary;
pub mod validation;
pub mod wizard;

#[cfg(test)]
mod tests;

pub use attachment::{ImageError, ImageFile, MAX_IMAGE_BYTES};
pub use domain::{
    Coordinates, DraftReport, ImageAttachment, IssueType, LocationDetails, PersistedReport,
    ReferenceId, ReportStatus, Severity, UnknownVariant, WizardStep,
};
pub use geolocation::{
    AccuracyLevel, AddressResolver, GeolocationAdapter, GeolocationOptions, LocationError,
    Position, PositionProvider, PositionTracker, SampleAddressResolver,
};
pub use store::{InMemoryReportStore, JsonFileReportStore, ReportStore, StoreError};
pub use submission::{
    SimulatedSubmissionService, SubmissionError, SubmissionReceipt, SubmissionService,
};
pub use suggestions::{Gazetteer, LocationCandidate, SearchOutcome, SuggestionSearch};
pub use summary::{render_printable, render_summary, SummaryView};
pub use validation::{validate, ValidationError};
pub use wizard::{LocateOutcome, SubmitError, SubmitOutcome, WizardController};
