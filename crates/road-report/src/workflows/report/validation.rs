use super::domain::{DraftReport, WizardStep};

/// Reasons a step cannot be left going forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("Please enter or detect a location for the issue.")]
    MissingLocation,
    #[error("Please select the type of issue.")]
    MissingIssueType,
    #[error("Please select the severity level.")]
    MissingSeverity,
}

impl ValidationError {
    /// Step the reporter must return to in order to fix the problem.
    pub const fn step(self) -> WizardStep {
        match self {
            Self::MissingLocation => WizardStep::Location,
            Self::MissingIssueType | Self::MissingSeverity => WizardStep::Classification,
        }
    }
}

pub fn validate(step: WizardStep, draft: &DraftReport) -> Result<(), ValidationError> {
    match step {
        WizardStep::Location => validate_location(draft),
        WizardStep::Classification => validate_classification(draft),
        WizardStep::Review => validate_for_submit(draft),
    }
}

/// Final gate before submission; re-checks every earlier step.
pub fn validate_for_submit(draft: &DraftReport) -> Result<(), ValidationError> {
    validate_location(draft)?;
    validate_classification(draft)
}

fn validate_location(draft: &DraftReport) -> Result<(), ValidationError> {
    if draft.has_location() {
        Ok(())
    } else {
        Err(ValidationError::MissingLocation)
    }
}

fn validate_classification(draft: &DraftReport) -> Result<(), ValidationError> {
    if draft.issue_type.is_none() {
        return Err(ValidationError::MissingIssueType);
    }
    if draft.severity.is_none() {
        return Err(ValidationError::MissingSeverity);
    }
    Ok(())
}
