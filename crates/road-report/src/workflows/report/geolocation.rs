use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use super::domain::Coordinates;

/// Mean Earth radius in meters.
const EARTH_RADIUS_METERS: f64 = 6_371_000.0;

/// Minimum movement before a tracked fix replaces the current one.
pub const TRACKING_THRESHOLD_METERS: f64 = 10.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeolocationOptions {
    pub high_accuracy: bool,
    pub timeout_ms: u64,
    pub max_cache_age_ms: u64,
}

impl Default for GeolocationOptions {
    fn default() -> Self {
        Self {
            high_accuracy: true,
            timeout_ms: 10_000,
            max_cache_age_ms: 0,
        }
    }
}

impl GeolocationOptions {
    pub fn with_timeout_ms(timeout_ms: u64) -> Self {
        Self {
            timeout_ms,
            ..Self::default()
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// A single fix reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
    pub accuracy_meters: f64,
}

impl Position {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            lat: self.lat,
            lng: self.lng,
        }
    }

    pub fn accuracy_level(&self) -> AccuracyLevel {
        AccuracyLevel::classify(self.accuracy_meters)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum LocationError {
    #[error("Location access denied. Please enable location services in your browser settings.")]
    PermissionDenied,
    #[error("Location information is unavailable. Please check your device settings.")]
    PositionUnavailable,
    #[error("Location request timed out. Please try again.")]
    Timeout,
    #[error("An unknown error occurred while detecting location.")]
    Unknown,
    #[error("Geolocation is not supported by your browser.")]
    Unsupported,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccuracyLevel {
    High,
    Medium,
    Low,
}

impl AccuracyLevel {
    pub fn classify(accuracy_meters: f64) -> Self {
        if accuracy_meters < 20.0 {
            Self::High
        } else if accuracy_meters < 50.0 {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "High",
            Self::Medium => "Medium",
            Self::Low => "Low",
        }
    }
}

/// Fill percentage of the accuracy gauge, clamped to 10..=100.
pub fn accuracy_percent(accuracy_meters: f64) -> f64 {
    (100.0 - accuracy_meters / 100.0).clamp(10.0, 100.0)
}

/// Great-circle distance between two points using the haversine formula.
pub fn distance_meters(from: Coordinates, to: Coordinates) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let delta_phi = (to.lat - from.lat).to_radians();
    let delta_lambda = (to.lng - from.lng).to_radians();

    let a = (delta_phi / 2.0).sin().powi(2)
        + phi1.cos() * phi2.cos() * (delta_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_METERS * c
}

/// One-shot position lookup offered by the platform.
#[async_trait]
pub trait PositionProvider: Send + Sync {
    async fn current_position(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Position, LocationError>;
}

/// Applies the caller's timeout to a provider and reports the outcome. Never retries.
pub struct GeolocationAdapter<P> {
    provider: P,
}

impl<P: PositionProvider> GeolocationAdapter<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub async fn detect_location(
        &self,
        options: &GeolocationOptions,
    ) -> Result<Position, LocationError> {
        let lookup = self.provider.current_position(options);
        let outcome = match tokio::time::timeout(options.timeout(), lookup).await {
            Ok(result) => result,
            Err(_) => Err(LocationError::Timeout),
        };

        match &outcome {
            Ok(position) => info!(
                accuracy_meters = position.accuracy_meters,
                level = position.accuracy_level().label(),
                "location detected"
            ),
            Err(err) => warn!(error = ?err, "location detection failed"),
        }

        outcome
    }
}

/// Keeps the best known fix and accepts a newer one only once it has moved far enough.
#[derive(Debug, Default, Clone)]
pub struct PositionTracker {
    current: Option<Position>,
}

impl PositionTracker {
    pub fn current(&self) -> Option<Position> {
        self.current
    }

    /// Returns true when `position` replaced the current fix.
    pub fn observe(&mut self, position: Position) -> bool {
        let moved = match self.current {
            None => true,
            Some(previous) => {
                distance_meters(previous.coordinates(), position.coordinates())
                    > TRACKING_THRESHOLD_METERS
            }
        };
        if moved {
            self.current = Some(position);
        }
        moved
    }
}

/// Turns coordinates into a street address.
#[async_trait]
pub trait AddressResolver: Send + Sync {
    async fn resolve(&self, coordinates: Coordinates) -> String;
}

/// Offline stand-in for a geocoding service backed by a handful of sample streets.
#[derive(Debug, Default, Clone, Copy)]
pub struct SampleAddressResolver;

impl SampleAddressResolver {
    pub const ADDRESSES: [&'static str; 5] = [
        "Main Street, Downtown, New York",
        "Broadway, Manhattan, New York",
        "5th Avenue, New York",
        "Park Avenue, Manhattan",
        "Wall Street, Financial District",
    ];
}

#[async_trait]
impl AddressResolver for SampleAddressResolver {
    async fn resolve(&self, _coordinates: Coordinates) -> String {
        use rand::seq::IndexedRandom;

        Self::ADDRESSES
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or(Self::ADDRESSES[0])
            .to_string()
    }
}
