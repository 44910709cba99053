use chrono::NaiveDateTime;
use derive_more::Display;

use super::{ExclusionSet, ExpandError, RecurrenceFault, RecurrenceSpec};
use crate::{
    classify::{Classifier, MarkerClassifier},
    component::RawEvent,
    occurrence::{Occurrence, OccurrenceBuilder},
    types::{DateError, Recency, end_of_day, is_before, is_on_or_before, parse_timestamp, roll_by, subtract_one_instant},
};

/// Something odd in the feed that did not stop expansion.
#[derive(Debug, Clone, Display)]
pub enum Warning {
    #[display("end date missing on {event}, using {defaulted_to}")]
    MissingEnd {
        event: String,
        defaulted_to: NaiveDateTime,
    },
    #[display("until {until} is before end {end} on {event}, clamping to end")]
    UntilClamped {
        event: String,
        until: NaiveDateTime,
        end: NaiveDateTime,
    },
    #[display("unsupported recurrence rule {rule:?} on {event}, expanding as a single occurrence")]
    UnsupportedRule { event: String, rule: String },
    #[display("skipped {_0}")]
    Skipped(ExpandError),
}

/// Occurrences produced from one record, and what was odd about it.
#[derive(Debug, Clone, Default)]
pub struct Expansion {
    pub occurrences: Vec<Occurrence>,
    pub warnings: Vec<Warning>,
}

impl Expansion {
    fn warn(&mut self, warning: Warning) {
        match &warning {
            Warning::MissingEnd {
                event,
                defaulted_to,
            } => tracing::warn!(%event, %defaulted_to, "end date missing, defaulting to end of day"),
            Warning::UntilClamped { event, until, end } => {
                tracing::warn!(%event, %until, %end, "until before end, clamping to end")
            }
            Warning::UnsupportedRule { event, rule } => {
                tracing::warn!(%event, rule = %rule, "unsupported recurrence rule, expanding once")
            }
            Warning::Skipped(err) => tracing::warn!(record = ?err.record(), "{err}, skipping record"),
        }
        self.warnings.push(warning);
    }
}

/// Turns raw records into occurrences.
#[derive(Debug, Clone)]
pub struct Expander<C: Classifier = MarkerClassifier> {
    classifier: C,
    recency: Recency,
}

impl Default for Expander<MarkerClassifier> {
    fn default() -> Self {
        Self::new(MarkerClassifier, Recency::keep_all())
    }
}

impl<C: Classifier> Expander<C> {
    pub fn new(classifier: C, recency: Recency) -> Self {
        Self {
            classifier,
            recency,
        }
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    pub fn recency(&self) -> Recency {
        self.recency
    }

    /// Everything an occurrence of `event` shares with its siblings.
    fn template(&self, event: &RawEvent) -> Result<OccurrenceBuilder, ExpandError> {
        let last_modified = self
            .classifier
            .last_modified(event)
            .map_err(|err| ExpandError::date(err, event))?;
        Ok(OccurrenceBuilder {
            summary: event.summary().map(str::to_owned),
            location: event.location().map(str::to_owned),
            notes: event.description().map(str::to_owned),
            last_modified,
            last_modified_by: event.organizer().map(str::to_owned),
            kind: self.classifier.kind(event),
            private: self.classifier.is_private(event),
            confirmed: self.classifier.is_confirmed(event),
            ..Default::default()
        })
    }

    fn start(&self, event: &RawEvent) -> Result<NaiveDateTime, ExpandError> {
        let raw = event
            .start()
            .ok_or_else(|| ExpandError::malformed(RecurrenceFault::MissingStart, event))?;
        parse_timestamp(raw).map_err(|err| ExpandError::date(err, event))
    }

    /// The record's end, or the end of its start day with a warning.
    fn end(
        &self,
        event: &RawEvent,
        start: NaiveDateTime,
        expansion: &mut Expansion,
    ) -> Result<Option<NaiveDateTime>, ExpandError> {
        match event.end() {
            Some(raw) => parse_timestamp(raw)
                .map(Some)
                .map_err(|err| ExpandError::date(err, event)),
            None => {
                let defaulted_to = end_of_day(start);
                expansion.warn(Warning::MissingEnd {
                    event: event.to_string(),
                    defaulted_to,
                });
                Ok(None)
            }
        }
    }

    fn emit(
        &self,
        template: &OccurrenceBuilder,
        start: NaiveDateTime,
        end: NaiveDateTime,
        event: &RawEvent,
    ) -> Result<Occurrence, ExpandError> {
        OccurrenceBuilder {
            start,
            end,
            ..template.clone()
        }
        .build()
        .map_err(|err| ExpandError::validation(err, event))
    }

    /// Expand one record.
    ///
    /// Any error abandons the whole record: no occurrences from a record
    /// that failed part way are returned.
    pub fn expand(&self, event: &RawEvent) -> Result<Expansion, ExpandError> {
        let mut expansion = Expansion::default();
        let spec = RecurrenceSpec::from_event(event)?;
        let template = self.template(event)?;

        let Some(spec) = spec else {
            for rule in event.unsupported_rules() {
                expansion.warn(Warning::UnsupportedRule {
                    event: event.to_string(),
                    rule: rule.clone(),
                });
            }
            self.expand_single(event, &template, &mut expansion)?;
            return Ok(expansion);
        };

        self.expand_repeating(event, spec, &template, &mut expansion)?;
        Ok(expansion)
    }

    fn expand_single(
        &self,
        event: &RawEvent,
        template: &OccurrenceBuilder,
        expansion: &mut Expansion,
    ) -> Result<(), ExpandError> {
        let start = self.start(event)?;
        let end = self
            .end(event, start, expansion)?
            .unwrap_or_else(|| end_of_day(start));

        if self.recency.is_recent_enough_to_keep(end) {
            tracing::debug!(event = %event, %start, "adding single occurrence");
            expansion
                .occurrences
                .push(self.emit(template, start, end, event)?);
        } else {
            tracing::trace!(event = %event, %end, "stale, not added");
        }
        Ok(())
    }

    fn expand_repeating(
        &self,
        event: &RawEvent,
        spec: RecurrenceSpec,
        template: &OccurrenceBuilder,
        expansion: &mut Expansion,
    ) -> Result<(), ExpandError> {
        let start = self.start(event)?;
        // A feed end marks the first instant after the event
        let end = match self.end(event, start, expansion)? {
            Some(end) => subtract_one_instant(end).map_err(|err| ExpandError::date(err, event))?,
            None => end_of_day(start),
        };

        let mut until = spec.until;
        if is_before(until, end) {
            expansion.warn(Warning::UntilClamped {
                event: event.to_string(),
                until,
                end,
            });
            until = end;
        }

        let exclusions = ExclusionSet::parse(event.exclusions().iter().map(String::as_str))
            .map_err(|err| ExpandError::date(err, event))?;

        tracing::debug!(
            event = %event,
            rule = %spec.kind,
            %until,
            "expanding repeating event"
        );

        // Only the start is rolled; a month clamp must not pull the end
        // before it.
        let step = spec.step();
        let duration = end - start;
        let mut count = 0u32;
        loop {
            let current_start =
                roll_by(start, step, count).map_err(|err| ExpandError::date(err, event))?;
            let current_end = current_start
                .checked_add_signed(duration)
                .ok_or_else(|| ExpandError::date(DateError::OutOfRange(current_start), event))?;
            if !is_on_or_before(current_end, until) {
                break;
            }

            if !self.recency.is_recent_enough_to_keep(current_end) {
                tracing::trace!(event = %event, start = %current_start, "stale, not added");
            } else if exclusions.excludes(current_start) {
                tracing::debug!(event = %event, start = %current_start, "excluded date, not added");
            } else {
                tracing::trace!(event = %event, start = %current_start, "adding repeating occurrence");
                expansion
                    .occurrences
                    .push(self.emit(template, current_start, current_end, event)?);
            }

            count += 1;
        }
        Ok(())
    }
}
