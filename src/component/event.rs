use std::collections::BTreeMap;
use std::fmt;

use crate::{
    PARAM_VALUE_DELIMITER,
    parser::FieldLine,
    property::{self, Field},
    rrule::RecurrenceKind,
};

/// One `VEVENT` block as raw text, immutable once built.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEvent {
    uid: Option<String>,
    start: Option<String>,
    end: Option<String>,
    summary: Option<String>,
    location: Option<String>,
    description: Option<String>,
    organizer: Option<String>,
    last_modified: Option<String>,
    class: Option<String>,
    rules: BTreeMap<RecurrenceKind, String>,
    exclusions: Vec<String>,
    unsupported_rules: Vec<String>,
    other: Vec<FieldLine>,
}

/// Collects the field lines of a block in order.
#[derive(Debug, Clone, Default)]
pub struct RawEventBuilder {
    properties: Vec<FieldLine>,
}

impl RawEventBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn add_field(&mut self, field: FieldLine) {
        self.properties.push(field);
    }

    /// Later lines overwrite earlier ones, except exclusion lines, which
    /// accumulate.
    pub fn build(self) -> RawEvent {
        let mut event = RawEvent::default();
        for FieldLine { key, value } in self.properties {
            let Some(field) = Field::lookup(&key) else {
                if property::is_rule_key(&key) {
                    event.unsupported_rules.push(format!("{key}={value}"));
                } else {
                    event.other.push(FieldLine { key, value });
                }
                continue;
            };
            let value = if field.is_text() {
                property::unescape_text(&value)
            } else {
                value
            };
            match field {
                Field::Uid => event.uid = Some(value),
                Field::Start => event.start = Some(value),
                Field::End => event.end = Some(value),
                Field::Exclusion => event.exclusions.push(value),
                Field::Summary => event.summary = Some(value),
                Field::Location => event.location = Some(value),
                Field::Description => event.description = Some(value),
                Field::Organizer => event.organizer = Some(value),
                Field::LastModified => event.last_modified = Some(value),
                Field::Class => event.class = Some(value),
                Field::Rule(kind) => {
                    event.rules.insert(kind, value);
                }
            }
        }
        event
    }
}

impl RawEvent {
    pub fn uid(&self) -> Option<&str> {
        self.uid.as_deref()
    }

    /// Raw start token, parameters included.
    pub fn start(&self) -> Option<&str> {
        self.start.as_deref()
    }

    /// Raw end token, parameters included.
    pub fn end(&self) -> Option<&str> {
        self.end.as_deref()
    }

    pub fn summary(&self) -> Option<&str> {
        self.summary.as_deref()
    }

    pub fn location(&self) -> Option<&str> {
        self.location.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn organizer(&self) -> Option<&str> {
        self.organizer.as_deref()
    }

    pub fn last_modified(&self) -> Option<&str> {
        self.last_modified.as_deref()
    }

    /// The privacy class, e.g. `PRIVATE` or `PUBLIC`.
    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    /// Until token of the given rule, if present.
    pub fn rule(&self, kind: RecurrenceKind) -> Option<&str> {
        self.rules.get(&kind).map(String::as_str)
    }

    pub fn rules(&self) -> impl Iterator<Item = (RecurrenceKind, &str)> {
        self.rules.iter().map(|(kind, until)| (*kind, until.as_str()))
    }

    pub fn has_rule(&self) -> bool {
        !self.rules.is_empty()
    }

    /// One entry per exclusion line, each possibly holding several
    /// comma-separated dates.
    pub fn exclusions(&self) -> &[String] {
        &self.exclusions
    }

    /// All exclusion lines, comma-joined.
    pub fn exclusion_field(&self) -> Option<String> {
        (!self.exclusions.is_empty())
            .then(|| self.exclusions.join(&*PARAM_VALUE_DELIMITER.to_string()))
    }

    /// `RRULE` lines of a shape other than the three supported ones.
    pub fn unsupported_rules(&self) -> &[String] {
        &self.unsupported_rules
    }

    /// Fields the expander does not use.
    pub fn other_fields(&self) -> &[FieldLine] {
        &self.other
    }
}

impl fmt::Display for RawEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match (self.uid(), self.summary()) {
            (Some(uid), Some(summary)) => write!(f, "{uid} ({summary:?})"),
            (Some(uid), None) => write!(f, "{uid}"),
            (None, Some(summary)) => write!(f, "{summary:?}"),
            (None, None) => write!(f, "<unnamed event>"),
        }
    }
}
