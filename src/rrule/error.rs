use crate::{component::RawEvent, occurrence::ValidationError, rrule::RecurrenceKind, types::DateError};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecurrenceFault {
    #[error("expected exactly one recurrence rule, found {0:?}")]
    ConflictingRules(Vec<RecurrenceKind>),
    #[error("DTSTART is missing")]
    MissingStart,
}

/// Failure to expand one record. Carries the record for diagnostics.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ExpandError {
    #[error("malformed recurrence in event {record}: {reason}")]
    MalformedRecurrence {
        reason: RecurrenceFault,
        record: Box<RawEvent>,
    },
    #[error("invalid date in event {record}: {source}")]
    InvalidDate {
        source: DateError,
        record: Box<RawEvent>,
    },
    #[error("invalid occurrence of event {record}: {source}")]
    Validation {
        source: ValidationError,
        record: Box<RawEvent>,
    },
}

impl ExpandError {
    pub(crate) fn malformed(reason: RecurrenceFault, record: &RawEvent) -> Self {
        Self::MalformedRecurrence {
            reason,
            record: Box::new(record.clone()),
        }
    }

    pub(crate) fn date(source: DateError, record: &RawEvent) -> Self {
        Self::InvalidDate {
            source,
            record: Box::new(record.clone()),
        }
    }

    pub(crate) fn validation(source: ValidationError, record: &RawEvent) -> Self {
        Self::Validation {
            source,
            record: Box::new(record.clone()),
        }
    }

    /// The record whose expansion failed.
    pub fn record(&self) -> &RawEvent {
        match self {
            Self::MalformedRecurrence { record, .. }
            | Self::InvalidDate { record, .. }
            | Self::Validation { record, .. } => record,
        }
    }
}
