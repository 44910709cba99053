//! Split a line into a field key and its raw value.
//!
//! The split point depends on the field:
//! - `DTSTART;`, `DTEND;` and `EXDATE;` lines split at the first `;`, so the
//!   value keeps its parameters (`VALUE=DATE:20240101`) for the date
//!   normaliser to strip.
//! - `RRULE:` lines split at the last `=`, so the key names the whole rule
//!   (`RRULE:FREQ=WEEKLY;UNTIL`) and the value is the until token.
//! - Everything else splits at the first `:`.

use std::fmt;

use crate::{PARAM_DELIMITER, PARAM_NAME_DELIMITER, VALUE_DELIMITER, property};

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldLine {
    pub key: String,
    pub value: String,
}

impl fmt::Display for FieldLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} => {:?}", self.key, self.value)
    }
}

#[inline]
fn starts_with_ignore_case(line: &str, prefix: &str) -> bool {
    line.get(..prefix.len())
        .is_some_and(|head| head.eq_ignore_ascii_case(prefix))
}

impl FieldLine {
    /// Returns `None` for lines without a usable separator, or with an empty
    /// key.
    pub fn split(line: &str) -> Option<Self> {
        let params_follow = [property::START, property::END, property::EXCLUSION]
            .iter()
            .any(|name| {
                starts_with_ignore_case(line, name)
                    && line[name.len()..].starts_with(PARAM_DELIMITER)
            });

        let split_at = if params_follow {
            line.find(PARAM_DELIMITER)
        } else if starts_with_ignore_case(line, property::RULE)
            && line[property::RULE.len()..].starts_with(VALUE_DELIMITER)
        {
            line.rfind(PARAM_NAME_DELIMITER)
        } else {
            line.find(VALUE_DELIMITER)
        }?;

        if split_at == 0 {
            return None;
        }
        Some(FieldLine {
            key: line[..split_at].to_owned(),
            value: line[split_at + 1..].to_owned(),
        })
    }
}
