//! Recurrence expansion.
//!
//! Only three rule shapes are recognised, each a `RRULE` with a frequency
//! and an `UNTIL` date and nothing else:
//!
//! ```text
//! RRULE:FREQ=DAILY;UNTIL=20240103
//! RRULE:FREQ=WEEKLY;UNTIL=20240301T000000Z
//! RRULE:FREQ=MONTHLY;UNTIL=20241231
//! ```

mod error;
pub use error::{ExpandError, RecurrenceFault};

mod exclusion;
pub use exclusion::ExclusionSet;

mod expand;
pub use expand::{Expander, Expansion, Warning};

use chrono::NaiveDateTime;
use derive_more::Display;

use crate::{
    component::RawEvent,
    property,
    types::{Step, end_of_day, parse_timestamp},
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display)]
pub enum RecurrenceKind {
    #[display("DAILY")]
    Daily,
    #[display("WEEKLY")]
    Weekly,
    #[display("MONTHLY")]
    Monthly,
}

impl RecurrenceKind {
    pub fn step(self) -> Step {
        match self {
            Self::Daily => Step::Days(1),
            Self::Weekly => Step::Days(7),
            Self::Monthly => Step::Months(1),
        }
    }

    /// Field key of this rule after line splitting.
    pub fn key(self) -> &'static str {
        match self {
            Self::Daily => property::RULE_DAILY,
            Self::Weekly => property::RULE_WEEKLY,
            Self::Monthly => property::RULE_MONTHLY,
        }
    }
}

/// How a record repeats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RecurrenceSpec {
    pub kind: RecurrenceKind,
    /// End of the day named by the rule's until token.
    pub until: NaiveDateTime,
}

impl RecurrenceSpec {
    /// `Ok(None)` for a record without a supported rule.
    pub fn from_event(event: &RawEvent) -> Result<Option<Self>, ExpandError> {
        let mut rules = event.rules();
        let Some((kind, until)) = rules.next() else {
            return Ok(None);
        };
        if rules.next().is_some() {
            let kinds = event.rules().map(|(kind, _)| kind).collect();
            return Err(ExpandError::malformed(
                RecurrenceFault::ConflictingRules(kinds),
                event,
            ));
        }
        let until = parse_timestamp(until).map_err(|err| ExpandError::date(err, event))?;
        Ok(Some(Self {
            kind,
            until: end_of_day(until),
        }))
    }

    #[inline]
    pub fn step(&self) -> Step {
        self.kind.step()
    }
}

#[cfg(test)]
mod tests {
    use super::{RecurrenceFault, RecurrenceKind, RecurrenceSpec};
    use crate::{
        component::{RawEvent, RawEventBuilder},
        parser::FieldLine,
        rrule::ExpandError,
        types::Step,
    };

    fn event(lines: &[&str]) -> RawEvent {
        let mut builder = RawEventBuilder::new();
        for line in lines {
            builder.add_field(FieldLine::split(line).unwrap());
        }
        builder.build()
    }

    #[test]
    fn no_rule() {
        assert_eq!(RecurrenceSpec::from_event(&event(&["SUMMARY:x"])).unwrap(), None);
    }

    #[test]
    fn weekly_until_end_of_day() {
        let spec = RecurrenceSpec::from_event(&event(&["RRULE:FREQ=WEEKLY;UNTIL=20240301T000000Z"]))
            .unwrap()
            .unwrap();
        assert_eq!(spec.kind, RecurrenceKind::Weekly);
        assert_eq!(spec.step(), Step::Days(7));
        assert_eq!(spec.until.to_string(), "2024-03-01 23:59:59.999");
    }

    #[test]
    fn conflicting_rules() {
        let err = RecurrenceSpec::from_event(&event(&[
            "RRULE:FREQ=DAILY;UNTIL=20240103",
            "RRULE:FREQ=MONTHLY;UNTIL=20240103",
        ]))
        .unwrap_err();
        assert!(matches!(
            err,
            ExpandError::MalformedRecurrence {
                reason: RecurrenceFault::ConflictingRules(ref kinds),
                ..
            } if kinds == &[RecurrenceKind::Daily, RecurrenceKind::Monthly]
        ));
    }

    #[test]
    fn keys_round_trip_through_field_lookup() {
        for kind in [RecurrenceKind::Daily, RecurrenceKind::Weekly, RecurrenceKind::Monthly] {
            assert_eq!(
                crate::property::Field::lookup(kind.key()),
                Some(crate::property::Field::Rule(kind))
            );
        }
    }
}
