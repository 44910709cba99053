//! Field names the feed parser and the expander care about.

use phf::phf_map;

use crate::PARAM_DELIMITER;
use crate::rrule::RecurrenceKind;

pub const START: &str = "DTSTART";
pub const END: &str = "DTEND";
pub const EXCLUSION: &str = "EXDATE";
pub const RULE: &str = "RRULE";

/// Rule keys as produced by splitting a `RRULE:` line at its last `=`.
pub const RULE_DAILY: &str = "RRULE:FREQ=DAILY;UNTIL";
pub const RULE_WEEKLY: &str = "RRULE:FREQ=WEEKLY;UNTIL";
pub const RULE_MONTHLY: &str = "RRULE:FREQ=MONTHLY;UNTIL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Field {
    Uid,
    Start,
    End,
    Exclusion,
    Summary,
    Location,
    Description,
    Organizer,
    LastModified,
    Class,
    Rule(RecurrenceKind),
}

static FIELDS: phf::Map<&'static str, Field> = phf_map! {
    "UID" => Field::Uid,
    "DTSTART" => Field::Start,
    "DTEND" => Field::End,
    "EXDATE" => Field::Exclusion,
    "SUMMARY" => Field::Summary,
    "LOCATION" => Field::Location,
    "DESCRIPTION" => Field::Description,
    "ORGANIZER" => Field::Organizer,
    "LAST-MODIFIED" => Field::LastModified,
    "CLASS" => Field::Class,
    "RRULE:FREQ=DAILY;UNTIL" => Field::Rule(RecurrenceKind::Daily),
    "RRULE:FREQ=WEEKLY;UNTIL" => Field::Rule(RecurrenceKind::Weekly),
    "RRULE:FREQ=MONTHLY;UNTIL" => Field::Rule(RecurrenceKind::Monthly),
};

impl Field {
    /// Look up a field key, ignoring ASCII case.
    ///
    /// Keys that still carry parameters (`SUMMARY;LANGUAGE=en`) fall back to
    /// the name before the first `;`.
    pub fn lookup(key: &str) -> Option<Self> {
        let key = key.to_ascii_uppercase();
        FIELDS
            .get(key.as_str())
            .or_else(|| {
                key.split_once(PARAM_DELIMITER)
                    .and_then(|(name, _)| FIELDS.get(name))
            })
            .copied()
    }

    /// Text fields whose values carry RFC 5545 escapes.
    pub fn is_text(&self) -> bool {
        matches!(self, Self::Summary | Self::Location | Self::Description)
    }
}

/// Whether an unrecognised key is a recurrence rule of some other shape.
pub fn is_rule_key(key: &str) -> bool {
    key.get(..RULE.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(RULE))
}

/// Undo TEXT escaping: `\n`, `\,`, `\;` and `\\`.
pub fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();
    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n' | 'N') => out.push('\n'),
            Some(',') => out.push(','),
            Some(';') => out.push(';'),
            Some('\\') | None => out.push('\\'),
            Some(other) => {
                out.push('\\');
                out.push(other);
            }
        }
    }
    out
}
