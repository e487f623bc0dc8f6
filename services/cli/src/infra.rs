use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use road_report::config::AppConfig;
use road_report::error::AppError;
use road_report::workflows::report::{
    GeolocationOptions, ImageFile, JsonFileReportStore, LocationError, Position,
    PositionProvider, SimulatedSubmissionService, WizardController,
};

pub(crate) type CliWizard = WizardController<SimulatedSubmissionService, JsonFileReportStore>;

pub(crate) fn report_store(config: &AppConfig) -> JsonFileReportStore {
    JsonFileReportStore::new(&config.storage.data_dir, &config.storage.installation_id)
}

pub(crate) fn wizard(config: &AppConfig) -> CliWizard {
    let service = Arc::new(SimulatedSubmissionService::new(
        config.wizard.submit_latency(),
    ));
    let store = Arc::new(report_store(config));
    let options = GeolocationOptions::with_timeout_ms(config.wizard.geolocation_timeout_ms);
    WizardController::with_geolocation(service, store, options)
}

/// Stands in for the device's location service with a fix supplied on the command line.
pub(crate) struct CommandLinePosition(pub(crate) Option<Position>);

#[async_trait]
impl PositionProvider for CommandLinePosition {
    async fn current_position(
        &self,
        _options: &GeolocationOptions,
    ) -> Result<Position, LocationError> {
        self.0.ok_or(LocationError::PositionUnavailable)
    }
}

pub(crate) fn read_image(path: &Path) -> Result<ImageFile, AppError> {
    let bytes = std::fs::read(path)?;
    let mime_type = mime_guess::from_path(path)
        .first_or_octet_stream()
        .essence_str()
        .to_string();
    Ok(ImageFile::new(mime_type, bytes))
}
