//! The ordered occurrence list and the queries over it.

use std::io::BufRead;
use std::sync::Arc;

use chrono::NaiveDateTime;
use derive_more::Deref;
use itertools::Itertools;
use parking_lot::RwLock;

use crate::{
    classify::Classifier,
    ingest::{IngestError, IngestReport, Ingestor},
    occurrence::{EventKind, Occurrence},
    types::TimeWindow,
};

/// Occurrences sorted by start, then kind, then feed order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct EventCatalog {
    occurrences: Vec<Occurrence>,
}

impl EventCatalog {
    /// Sort and drop exact duplicates, keeping the first.
    pub fn rebuild(occurrences: Vec<Occurrence>) -> Self {
        let total = occurrences.len();
        let mut occurrences = occurrences.into_iter().unique().collect_vec();
        if occurrences.len() < total {
            tracing::debug!(dropped = total - occurrences.len(), "dropped duplicate occurrences");
        }
        occurrences.sort_by(|a, b| a.start().cmp(&b.start()).then(a.kind().cmp(&b.kind())));
        Self { occurrences }
    }

    pub fn occurrences(&self) -> &[Occurrence] {
        &self.occurrences
    }

    /// Occurrences starting strictly after `after`.
    pub fn query_after(&self, after: NaiveDateTime) -> Vec<&Occurrence> {
        self.occurrences
            .iter()
            .filter(|o| o.start() > after)
            .collect()
    }

    /// Occurrences that contain the window or lie within it.
    pub fn query_on(&self, window: &TimeWindow) -> Vec<&Occurrence> {
        self.occurrences
            .iter()
            .filter(|o| window.is_within(o.start(), o.end()) || window.contains(o.start(), o.end()))
            .collect()
    }

    /// Occurrences of `kind` starting after `after`.
    ///
    /// With `suppress_duplicates`, only the first occurrence per calendar
    /// start day is returned.
    pub fn query_by_type(
        &self,
        kind: EventKind,
        after: NaiveDateTime,
        suppress_duplicates: bool,
    ) -> Vec<&Occurrence> {
        let matching = self
            .occurrences
            .iter()
            .filter(move |o| o.start() > after && o.kind() == kind);
        if suppress_duplicates {
            matching.unique_by(|o| o.start().date()).collect()
        } else {
            matching.collect()
        }
    }

    /// Upcoming confirmed gigs, one per day.
    pub fn confirmed_upcoming(&self, now: NaiveDateTime) -> Vec<&Occurrence> {
        self.query_by_type(EventKind::Gig, now, true)
            .into_iter()
            .filter(|o| o.is_confirmed())
            .collect()
    }

    /// The most recently modified occurrence; the first one wins a tie.
    pub fn latest_update(&self) -> Option<&Occurrence> {
        let mut latest: Option<(&Occurrence, NaiveDateTime)> = None;
        for occurrence in &self.occurrences {
            let Some(modified) = occurrence.last_modified() else {
                continue;
            };
            if latest.is_none_or(|(_, best)| modified > best) {
                latest = Some((occurrence, modified));
            }
        }
        latest.map(|(occurrence, _)| occurrence)
    }

    /// Occurrences starting after `after` that pass the second-stage
    /// privacy check.
    pub fn public_after<C: Classifier>(
        &self,
        classifier: &C,
        after: NaiveDateTime,
    ) -> Vec<&Occurrence> {
        self.query_after(after)
            .into_iter()
            .filter(|o| !classifier.is_private_occurrence(o))
            .collect()
    }
}

/// The current catalog, replaced wholesale on refresh.
///
/// Readers take a snapshot and keep it as long as they like; a refresh
/// only swaps the pointer once the new catalog is complete.
#[derive(Debug, Default)]
pub struct CatalogHandle {
    current: RwLock<Arc<EventCatalog>>,
}

impl CatalogHandle {
    pub fn new(catalog: EventCatalog) -> Self {
        Self {
            current: RwLock::new(Arc::new(catalog)),
        }
    }

    pub fn snapshot(&self) -> Arc<EventCatalog> {
        Arc::clone(&self.current.read())
    }

    pub fn replace(&self, catalog: EventCatalog) -> Arc<EventCatalog> {
        std::mem::replace(&mut *self.current.write(), Arc::new(catalog))
    }

    /// Ingest a fresh feed and swap it in. On error the old catalog stays.
    pub fn refresh<R: BufRead, C: Classifier + Clone>(
        &self,
        ingestor: &Ingestor<C>,
        reader: R,
        now: NaiveDateTime,
    ) -> Result<IngestReport, IngestError> {
        let ingest = ingestor.ingest(reader, now)?;
        self.replace(ingest.catalog);
        Ok(ingest.report)
    }
}
