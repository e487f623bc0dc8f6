use std::path::PathBuf;

use clap::Args;
use road_report::config::AppConfig;
use road_report::error::AppError;
use road_report::workflows::report::geolocation::accuracy_percent;
use road_report::workflows::report::suggestions::passes_length_gate;
use road_report::workflows::report::{
    render_printable, Gazetteer, GeolocationAdapter, IssueType, LocateOutcome, PersistedReport,
    Position, ReportStore, SampleAddressResolver, SearchOutcome, Severity, SubmitOutcome,
    SuggestionSearch,
};
use tracing::info;

use crate::infra::{read_image, report_store, wizard, CommandLinePosition};

#[derive(Args, Debug)]
pub(crate) struct SubmitArgs {
    /// Street address typed by the reporter
    #[arg(long, conflicts_with_all = ["suggest", "lat"])]
    location: Option<String>,
    /// Pick the first address suggestion matching this query
    #[arg(long)]
    suggest: Option<String>,
    /// Latitude of a detected position
    #[arg(long, requires = "lng", allow_hyphen_values = true)]
    lat: Option<f64>,
    /// Longitude of a detected position
    #[arg(long, requires = "lat", allow_hyphen_values = true)]
    lng: Option<f64>,
    /// Reported accuracy of the detected position in meters
    #[arg(long, default_value_t = 25.0)]
    accuracy: f64,
    /// pothole, crack, speed-hump, flooding, debris, signage, or other
    #[arg(long)]
    issue_type: String,
    /// high, medium, or low
    #[arg(long)]
    severity: String,
    #[arg(long)]
    description: Option<String>,
    /// JPG, PNG, or GIF photo of the issue
    #[arg(long)]
    image: Option<PathBuf>,
    #[arg(long)]
    email: Option<String>,
    /// Print the printable copy of the submitted report
    #[arg(long)]
    print: bool,
}

#[derive(Args, Debug)]
pub(crate) struct HistoryArgs {
    /// Emit the stored records as JSON
    #[arg(long)]
    json: bool,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    query: String,
}

pub(crate) async fn run_submit(config: &AppConfig, args: SubmitArgs) -> Result<(), AppError> {
    let issue_type: IssueType = args.issue_type.parse()?;
    let severity: Severity = args.severity.parse()?;
    let wizard = wizard(config);

    if let (Some(lat), Some(lng)) = (args.lat, args.lng) {
        let adapter = GeolocationAdapter::new(CommandLinePosition(Some(Position {
            lat,
            lng,
            accuracy_meters: args.accuracy,
        })));
        if let LocateOutcome::Resolved(details) = wizard
            .detect_location(&adapter, &SampleAddressResolver)
            .await?
        {
            println!(
                "Detected {} (accuracy {:.0} m, gauge {:.0}%)",
                details.address,
                details.accuracy_meters,
                accuracy_percent(details.accuracy_meters)
            );
        }
    } else if let Some(query) = args.suggest.as_deref() {
        let search = SuggestionSearch::new(Gazetteer::reference(), config.wizard.search_debounce());
        if let SearchOutcome::Candidates(candidates) = search.on_input(query).await {
            if let Some(candidate) = candidates.first() {
                wizard.pick_suggestion(candidate);
            }
        }
    } else if let Some(location) = args.location.as_deref() {
        wizard.set_location(location);
    }
    wizard.advance()?;

    wizard.select_issue_type(issue_type);
    wizard.select_severity(severity);
    if let Some(description) = args.description.as_deref() {
        wizard.set_description(description);
    }
    if let Some(path) = args.image.as_deref() {
        wizard.attach_image(&read_image(path)?)?;
    }
    wizard.advance()?;

    if let Some(summary) = wizard.summary() {
        println!("Review\n{}", summary.to_text());
    }
    if let Some(email) = args.email.as_deref() {
        wizard.set_contact_email(email);
    }

    println!("Submitting...");
    match wizard.submit().await? {
        SubmitOutcome::Submitted(record) => {
            info!(reference_id = %record.reference_id, "report stored");
            println!(
                "Report submitted. Reference ID: {} ({})",
                record.reference_id,
                record.submitted_at.format("%H:%M")
            );
            if args.print {
                println!("\n{}", render_printable(&record));
            }
        }
        SubmitOutcome::AlreadyInFlight | SubmitOutcome::Discarded => {
            println!("Submission did not complete; nothing was stored.");
        }
    }
    Ok(())
}

pub(crate) fn run_history(config: &AppConfig, args: HistoryArgs) -> Result<(), AppError> {
    let records = report_store(config).read_all()?;

    if args.json {
        let body = serde_json::to_string_pretty(&records)
            .map_err(|err| AppError::Io(std::io::Error::other(err)))?;
        println!("{body}");
        return Ok(());
    }

    if records.is_empty() {
        println!("No reports submitted from this installation yet.");
        return Ok(());
    }
    println!("Submitted reports ({})", records.len());
    for record in &records {
        println!("- {}", history_line(record));
    }
    Ok(())
}

fn history_line(record: &PersistedReport) -> String {
    let report = &record.report;
    format!(
        "{} | {} | {} | {} | {} | {}",
        record.reference_id,
        record.status.label(),
        report.issue_type.map(IssueType::label).unwrap_or("-"),
        report.severity.map(Severity::label).unwrap_or("-"),
        report.location,
        record.submitted_at.format("%Y-%m-%d %H:%M")
    )
}

pub(crate) async fn run_search(config: &AppConfig, args: SearchArgs) -> Result<(), AppError> {
    if !passes_length_gate(&args.query) {
        println!("Type at least 3 characters to see suggestions.");
        return Ok(());
    }

    let search = SuggestionSearch::new(Gazetteer::reference(), config.wizard.search_debounce());
    match search.on_input(&args.query).await {
        SearchOutcome::Candidates(candidates) if !candidates.is_empty() => {
            for candidate in candidates {
                println!("- {}", candidate.display_text);
            }
        }
        _ => println!("No matching locations."),
    }
    Ok(())
}
