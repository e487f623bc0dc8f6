use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rand::Rng;
use serde::Serialize;
use tracing::debug;

use super::domain::{Coordinates, LocationDetails};

/// Queries at or below this many characters (after trimming) are never searched.
pub const MAX_GATED_QUERY_CHARS: usize = 2;

pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(300);

/// Center of the reference gazetteer, used when a picked candidate is placed on the map.
const REFERENCE_CENTER: Coordinates = Coordinates {
    lat: 40.7128,
    lng: -74.0060,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LocationCandidate {
    pub display_text: String,
}

/// Fixed list of well-known places offered as address suggestions.
#[derive(Debug, Clone)]
pub struct Gazetteer {
    entries: Vec<String>,
}

impl Gazetteer {
    pub fn new<I, S>(entries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            entries: entries.into_iter().map(Into::into).collect(),
        }
    }

    pub fn reference() -> Self {
        Self::new([
            "Main Street, Downtown, New York",
            "Broadway & 42nd Street, Times Square",
            "Central Park West, New York",
            "5th Avenue, Manhattan",
            "Wall Street, Financial District",
            "Park Avenue, Midtown",
            "Brooklyn Bridge, New York",
            "Times Square, Manhattan",
            "Empire State Building, 34th Street",
            "Statue of Liberty, Liberty Island",
        ])
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Case-insensitive substring match in gazetteer order.
    pub fn search(&self, query: &str) -> Vec<LocationCandidate> {
        let needle = query.to_lowercase();
        self.entries
            .iter()
            .filter(|entry| entry.to_lowercase().contains(&needle))
            .map(|entry| LocationCandidate {
                display_text: entry.clone(),
            })
            .collect()
    }
}

impl Default for Gazetteer {
    fn default() -> Self {
        Self::reference()
    }
}

/// True when the trimmed query is long enough to be searched.
pub fn passes_length_gate(query: &str) -> bool {
    query.trim().chars().count() > MAX_GATED_QUERY_CHARS
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Suggestions to display. Empty means no match.
    Candidates(Vec<LocationCandidate>),
    /// The query was too short; suggestions should be hidden.
    Hidden,
    /// Newer input arrived during the debounce window; nothing was searched.
    Superseded,
}

/// Debounced front end for the gazetteer.
///
/// Every call to [`SuggestionSearch::on_input`] claims a new generation and waits out the
/// debounce window. Only the call still holding the latest generation afterwards runs the
/// search, so a burst of keystrokes produces at most one lookup.
#[derive(Debug, Clone)]
pub struct SuggestionSearch {
    gazetteer: Arc<Gazetteer>,
    debounce: Duration,
    generation: Arc<AtomicU64>,
}

impl SuggestionSearch {
    pub fn new(gazetteer: Gazetteer, debounce: Duration) -> Self {
        Self {
            gazetteer: Arc::new(gazetteer),
            debounce,
            generation: Arc::new(AtomicU64::new(0)),
        }
    }

    pub fn gazetteer(&self) -> &Gazetteer {
        &self.gazetteer
    }

    pub async fn on_input(&self, query: &str) -> SearchOutcome {
        let ticket = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        tokio::time::sleep(self.debounce).await;

        if self.generation.load(Ordering::SeqCst) != ticket {
            debug!(query, "suggestion search superseded");
            return SearchOutcome::Superseded;
        }
        self.run(query)
    }

    /// Focusing the field searches right away, without debouncing.
    pub fn on_focus(&self, query: &str) -> SearchOutcome {
        self.generation.fetch_add(1, Ordering::SeqCst);
        self.run(query)
    }

    fn run(&self, query: &str) -> SearchOutcome {
        let query = query.trim();
        if !passes_length_gate(query) {
            return SearchOutcome::Hidden;
        }
        let candidates = self.gazetteer.search(query);
        debug!(query, matches = candidates.len(), "suggestion search ran");
        SearchOutcome::Candidates(candidates)
    }
}

impl Default for SuggestionSearch {
    fn default() -> Self {
        Self::new(Gazetteer::reference(), DEFAULT_DEBOUNCE)
    }
}

/// Places a picked suggestion near the reference center with a coarse accuracy.
pub fn resolve_candidate(candidate: &LocationCandidate) -> LocationDetails {
    let mut rng = rand::rng();
    LocationDetails {
        address: candidate.display_text.clone(),
        coordinates: Coordinates {
            lat: REFERENCE_CENTER.lat + (rng.random::<f64>() - 0.5) * 0.01,
            lng: REFERENCE_CENTER.lng + (rng.random::<f64>() - 0.5) * 0.01,
        },
        accuracy_meters: 50.0 + rng.random::<f64>() * 100.0,
        resolved_at: Utc::now(),
    }
}
