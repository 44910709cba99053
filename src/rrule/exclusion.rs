use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};
use derive_more::Deref;

use crate::{
    PARAM_VALUE_DELIMITER, VALUE_DELIMITER,
    types::{DateError, parse_timestamp},
};

/// Calendar days on which a repeating event does not occur.
///
/// Membership is by day, so `EXDATE:20240102T100000Z` excludes an
/// occurrence starting at any time on 2 January.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deref)]
pub struct ExclusionSet(BTreeSet<NaiveDate>);

impl ExclusionSet {
    /// Parse exclusion values such as `TZID=Europe/London:20240102T100000`
    /// or `20240102T100000Z,20240109T100000Z`.
    pub fn parse<'a>(values: impl IntoIterator<Item = &'a str>) -> Result<Self, DateError> {
        let mut days = BTreeSet::new();
        for value in values {
            let dates = value
                .rsplit_once(VALUE_DELIMITER)
                .map_or(value, |(_, dates)| dates);
            for token in dates
                .split(PARAM_VALUE_DELIMITER)
                .map(str::trim)
                .filter(|token| !token.is_empty())
            {
                days.insert(parse_timestamp(token)?.date());
            }
        }
        Ok(Self(days))
    }

    #[inline]
    pub fn excludes(&self, start: NaiveDateTime) -> bool {
        self.0.contains(&start.date())
    }
}
