//! Derive semantic flags from the free text of an event.
//!
//! Matching is case-insensitive substring search with no word boundaries, so
//! "Gigantic sale" counts as a gig.

use chrono::NaiveDateTime;

use crate::{
    component::RawEvent,
    occurrence::{EventKind, Occurrence},
    types::{DateError, parse_timestamp},
};

pub const GIG: &str = "gig";
pub const UNAVAILABLE: &str = "unavailable";
pub const NOT_AVAILABLE: &str = "not available";
pub const PRIVATE: &str = "private";
pub const WEDDING: &str = "wedding";
pub const CONFIRMED: &str = "confirmed";

#[inline]
fn mentions(text: Option<&str>, marker: &str) -> bool {
    text.is_some_and(|text| text.to_lowercase().contains(marker))
}

/// Classification rules applied to every expanded record.
pub trait Classifier {
    fn kind(&self, event: &RawEvent) -> EventKind;

    fn is_private(&self, event: &RawEvent) -> bool;

    fn is_confirmed(&self, event: &RawEvent) -> bool;

    /// Second-stage privacy check over a built occurrence.
    fn is_private_occurrence(&self, occurrence: &Occurrence) -> bool;

    fn last_modified(&self, event: &RawEvent) -> Result<Option<NaiveDateTime>, DateError> {
        event.last_modified().map(parse_timestamp).transpose()
    }
}

/// The marker-word rules.
#[derive(Debug, Clone, Copy, Default)]
pub struct MarkerClassifier;

impl Classifier for MarkerClassifier {
    /// Gig wins over unavailability wording in the same summary.
    fn kind(&self, event: &RawEvent) -> EventKind {
        let summary = event.summary();
        if mentions(summary, GIG) {
            EventKind::Gig
        } else if mentions(summary, UNAVAILABLE) || mentions(summary, NOT_AVAILABLE) {
            EventKind::Unavailable
        } else {
            EventKind::Info
        }
    }

    fn is_private(&self, event: &RawEvent) -> bool {
        mentions(event.summary(), PRIVATE)
            || mentions(event.summary(), WEDDING)
            || mentions(event.location(), PRIVATE)
            || mentions(event.class(), PRIVATE)
    }

    fn is_confirmed(&self, event: &RawEvent) -> bool {
        mentions(event.summary(), CONFIRMED)
    }

    fn is_private_occurrence(&self, occurrence: &Occurrence) -> bool {
        occurrence.is_private()
            || mentions(Some(occurrence.location()), PRIVATE)
            || mentions(Some(occurrence.notes()), PRIVATE)
    }
}
