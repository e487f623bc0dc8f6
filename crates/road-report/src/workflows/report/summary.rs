use std::fmt::Write as _;

use serde::Serialize;

use super::domain::{DraftReport, IssueType, PersistedReport, Severity};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LocationSection {
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub coordinates_line: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SeveritySection {
    pub severity: Severity,
    pub label: &'static str,
    pub color: &'static str,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImageSection {
    pub mime_type: String,
    pub size_label: String,
}

/// Structured review shown on the last wizard step.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SummaryView {
    pub location: LocationSection,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub issue_type: Option<IssueType>,
    pub issue_type_label: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub severity: Option<SeveritySection>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub image: Option<ImageSection>,
}

pub fn render_summary(draft: &DraftReport) -> SummaryView {
    let location = LocationSection {
        address: draft.location.clone(),
        coordinates_line: draft
            .coordinates()
            .map(|coordinates| format!("Coordinates: {coordinates}")),
    };

    let severity = draft.severity.map(|severity| SeveritySection {
        severity,
        label: severity.priority_label(),
        color: severity.color(),
    });

    let description = if draft.description.is_empty() {
        None
    } else {
        Some(draft.description.clone())
    };

    let image = draft.attached_image.as_ref().map(|image| ImageSection {
        mime_type: image.mime_type.clone(),
        size_label: format!("Image attached ({:.1} KB)", image.size_bytes as f64 / 1024.0),
    });

    SummaryView {
        location,
        issue_type: draft.issue_type,
        issue_type_label: draft.issue_type.map(IssueType::label).unwrap_or_default(),
        severity,
        description,
        image,
    }
}

impl SummaryView {
    /// Plain-text rendering for terminals and logs.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        writeln!(out, "Location: {}", self.location.address).expect("write location");
        if let Some(line) = &self.location.coordinates_line {
            writeln!(out, "  {line}").expect("write coordinates");
        }
        writeln!(out, "Issue Type: {}", self.issue_type_label).expect("write issue type");
        let severity = self.severity.as_ref().map(|s| s.label).unwrap_or_default();
        writeln!(out, "Severity: {severity}").expect("write severity");
        if let Some(description) = &self.description {
            writeln!(out, "Description: {description}").expect("write description");
        }
        if let Some(image) = &self.image {
            writeln!(out, "Image: {}", image.size_label).expect("write image");
        }
        out
    }
}

/// Printable copy of a submitted report.
pub fn render_printable(record: &PersistedReport) -> String {
    let report = &record.report;
    let mut out = String::new();

    writeln!(out, "Smart Road Monitor\nRoad Issue Report\n").expect("write heading");
    writeln!(out, "Reference ID: {}", record.reference_id).expect("write reference id");
    writeln!(
        out,
        "Submitted: {}",
        record.submitted_at.format("%Y-%m-%d %H:%M:%S UTC")
    )
    .expect("write submitted at");
    writeln!(out, "Status: {}", record.status.label()).expect("write status");
    writeln!(out, "Location: {}", report.location).expect("write location");
    writeln!(
        out,
        "Issue Type: {}",
        report.issue_type.map(IssueType::label).unwrap_or_default()
    )
    .expect("write issue type");
    writeln!(
        out,
        "Severity: {}",
        report.severity.map(Severity::label).unwrap_or_default()
    )
    .expect("write severity");
    if !report.description.is_empty() {
        writeln!(out, "Description: {}", report.description).expect("write description");
    }
    writeln!(
        out,
        "\nThank you for reporting this issue. You can track its status on our website."
    )
    .expect("write closing");
    writeln!(out, "Smart Road Condition Monitoring System").expect("write footer");
    out
}
