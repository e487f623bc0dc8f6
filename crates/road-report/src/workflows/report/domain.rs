use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};

/// Category of road defect being reported.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueType {
    Pothole,
    Crack,
    SpeedHump,
    Flooding,
    Debris,
    Signage,
    Other,
}

impl IssueType {
    pub const fn ordered() -> [Self; 7] {
        [
            Self::Pothole,
            Self::Crack,
            Self::SpeedHump,
            Self::Flooding,
            Self::Debris,
            Self::Signage,
            Self::Other,
        ]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::Pothole => "pothole",
            Self::Crack => "crack",
            Self::SpeedHump => "speed-hump",
            Self::Flooding => "flooding",
            Self::Debris => "debris",
            Self::Signage => "signage",
            Self::Other => "other",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Pothole => "Pothole",
            Self::Crack => "Crack",
            Self::SpeedHump => "Speed hump",
            Self::Flooding => "Flooding",
            Self::Debris => "Debris",
            Self::Signage => "Signage",
            Self::Other => "Other",
        }
    }
}

impl FromStr for IssueType {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|issue| issue.code() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "issue type",
                value: value.to_string(),
            })
    }
}

/// Urgency chosen by the reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    High,
    Medium,
    Low,
}

impl Severity {
    pub const fn ordered() -> [Self; 3] {
        [Self::High, Self::Medium, Self::Low]
    }

    pub const fn code(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }

    /// Short form used on printed reports.
    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }

    pub const fn priority_label(self) -> &'static str {
        match self {
            Self::High => "High Priority (Immediate danger)",
            Self::Medium => "Medium Priority (Needs attention soon)",
            Self::Low => "Low Priority (Minor issue)",
        }
    }

    pub const fn color(self) -> &'static str {
        match self {
            Self::High => "#e63946",
            Self::Medium => "#ffc107",
            Self::Low => "#2a9d8f",
        }
    }
}

impl FromStr for Severity {
    type Err = UnknownVariant;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let needle = value.trim().to_ascii_lowercase();
        Self::ordered()
            .into_iter()
            .find(|severity| severity.code() == needle)
            .ok_or_else(|| UnknownVariant {
                kind: "severity",
                value: value.to_string(),
            })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown {kind} '{value}'")]
pub struct UnknownVariant {
    pub kind: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub lat: f64,
    pub lng: f64,
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.lat, self.lng)
    }
}

/// A resolved location, either detected or picked from the suggestions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LocationDetails {
    pub address: String,
    pub coordinates: Coordinates,
    pub accuracy_meters: f64,
    pub resolved_at: DateTime<Utc>,
}

/// An accepted photo of the issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ImageAttachment {
    pub mime_type: String,
    pub size_bytes: u64,
    pub preview_data: String,
}

/// The in-progress report assembled across the wizard steps.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DraftReport {
    pub location: String,
    pub location_details: Option<LocationDetails>,
    pub issue_type: Option<IssueType>,
    pub severity: Option<Severity>,
    pub description: String,
    pub attached_image: Option<ImageAttachment>,
    pub contact_email: String,
}

impl DraftReport {
    pub fn has_location(&self) -> bool {
        !self.location.trim().is_empty()
    }

    pub fn coordinates(&self) -> Option<Coordinates> {
        self.location_details
            .as_ref()
            .map(|details| details.coordinates)
    }
}

/// Position of the wizard. Navigation moves by one step at a time.
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum WizardStep {
    #[default]
    Location,
    Classification,
    Review,
}

impl WizardStep {
    pub const fn number(self) -> u8 {
        match self {
            Self::Location => 1,
            Self::Classification => 2,
            Self::Review => 3,
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Location => "Location",
            Self::Classification => "Issue Details",
            Self::Review => "Review & Submit",
        }
    }

    pub const fn next(self) -> Self {
        match self {
            Self::Location => Self::Classification,
            Self::Classification | Self::Review => Self::Review,
        }
    }

    pub const fn previous(self) -> Self {
        match self {
            Self::Location | Self::Classification => Self::Location,
            Self::Review => Self::Classification,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
}

impl ReportStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "pending",
        }
    }
}

/// Identifier handed back to the reporter, formatted `SRM-<year>-<4 digits>`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReferenceId(pub String);

impl ReferenceId {
    pub fn generate(now: DateTime<Utc>) -> Self {
        use rand::Rng;

        let suffix: u16 = rand::rng().random_range(1000..=9999);
        Self(format!("SRM-{}-{suffix}", now.year()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True when the id has the `SRM-dddd-dddd` shape.
    pub fn is_well_formed(&self) -> bool {
        let mut parts = self.0.split('-');
        let digits = |part: Option<&str>| {
            part.is_some_and(|p| p.len() == 4 && p.bytes().all(|b| b.is_ascii_digit()))
        };
        parts.next() == Some("SRM")
            && digits(parts.next())
            && digits(parts.next())
            && parts.next().is_none()
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A finalized report as appended to the history store. Never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PersistedReport {
    #[serde(flatten)]
    pub report: DraftReport,
    pub reference_id: ReferenceId,
    pub submitted_at: DateTime<Utc>,
    pub status: ReportStatus,
}
