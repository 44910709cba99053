//! Concrete event occurrences, the unit the catalog stores and queries.

use chrono::NaiveDateTime;
use derive_more::Display;

/// Semantic category of an occurrence.
///
/// Declaration order is the catalog's tie-break order for equal starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum EventKind {
    #[display("GIG")]
    Gig,
    #[display("UNAVAILABLE")]
    Unavailable,
    #[display("INFO")]
    Info,
}

#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field: {0}")]
    MissingField(&'static str),
    #[error("end {end} is not after start {start}")]
    EndNotAfterStart {
        start: NaiveDateTime,
        end: NaiveDateTime,
    },
}

/// One concrete instance of a calendar event.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Occurrence {
    start: NaiveDateTime,
    end: NaiveDateTime,
    summary: String,
    location: String,
    notes: String,
    last_modified: Option<NaiveDateTime>,
    last_modified_by: String,
    kind: EventKind,
    #[cfg_attr(feature = "serde", serde(rename = "isPrivate"))]
    private: bool,
    #[cfg_attr(feature = "serde", serde(rename = "isConfirmed"))]
    confirmed: bool,
}

impl Occurrence {
    pub fn builder(start: NaiveDateTime, end: NaiveDateTime) -> OccurrenceBuilder {
        OccurrenceBuilder {
            start,
            end,
            ..Default::default()
        }
    }

    pub fn start(&self) -> NaiveDateTime {
        self.start
    }

    pub fn end(&self) -> NaiveDateTime {
        self.end
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    pub fn location(&self) -> &str {
        &self.location
    }

    pub fn notes(&self) -> &str {
        &self.notes
    }

    pub fn last_modified(&self) -> Option<NaiveDateTime> {
        self.last_modified
    }

    pub fn last_modified_by(&self) -> &str {
        &self.last_modified_by
    }

    pub fn kind(&self) -> EventKind {
        self.kind
    }

    pub fn is_private(&self) -> bool {
        self.private
    }

    pub fn is_confirmed(&self) -> bool {
        self.confirmed
    }
}

#[derive(Debug, Clone)]
pub struct OccurrenceBuilder {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub summary: Option<String>,
    pub location: Option<String>,
    pub notes: Option<String>,
    pub last_modified: Option<NaiveDateTime>,
    pub last_modified_by: Option<String>,
    pub kind: EventKind,
    pub private: bool,
    pub confirmed: bool,
}

impl Default for OccurrenceBuilder {
    fn default() -> Self {
        Self {
            start: NaiveDateTime::MIN,
            end: NaiveDateTime::MIN,
            summary: None,
            location: None,
            notes: None,
            last_modified: None,
            last_modified_by: None,
            kind: EventKind::Info,
            private: false,
            confirmed: false,
        }
    }
}

impl OccurrenceBuilder {
    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = Some(summary.into());
        self
    }

    pub fn location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn last_modified(mut self, last_modified: Option<NaiveDateTime>) -> Self {
        self.last_modified = last_modified;
        self
    }

    pub fn last_modified_by(mut self, by: impl Into<String>) -> Self {
        self.last_modified_by = Some(by.into());
        self
    }

    pub fn kind(mut self, kind: EventKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn private(mut self, private: bool) -> Self {
        self.private = private;
        self
    }

    pub fn confirmed(mut self, confirmed: bool) -> Self {
        self.confirmed = confirmed;
        self
    }

    /// Check the invariants and freeze the occurrence.
    pub fn build(self) -> Result<Occurrence, ValidationError> {
        let summary = self.summary.ok_or(ValidationError::MissingField("SUMMARY"))?;
        if self.end <= self.start {
            return Err(ValidationError::EndNotAfterStart {
                start: self.start,
                end: self.end,
            });
        }
        Ok(Occurrence {
            start: self.start,
            end: self.end,
            summary,
            location: self.location.unwrap_or_default(),
            notes: self.notes.unwrap_or_default(),
            last_modified: self.last_modified,
            last_modified_by: self.last_modified_by.unwrap_or_default(),
            kind: self.kind,
            private: self.private,
            confirmed: self.confirmed,
        })
    }
}
