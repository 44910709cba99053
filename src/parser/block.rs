//! Group feed lines into raw event records.
//!
//! Lines between `BEGIN:VEVENT` and `END:VEVENT` become fields of one
//! [`RawEvent`], except for lines inside a nested `VALARM` block. Everything
//! outside an event block is ignored. A block that is never closed is
//! dropped without a partial record.

use std::io::BufRead;

use super::{FieldLine, LineReader, ParserError};
use crate::component::{RawEvent, RawEventBuilder};

const BEGIN_EVENT: &str = "BEGIN:VEVENT";
const END_EVENT: &str = "END:VEVENT";
const BEGIN_ALARM: &str = "BEGIN:VALARM";
const END_ALARM: &str = "END:VALARM";

enum LineKind {
    BeginEvent,
    EndEvent,
    BeginAlarm,
    EndAlarm,
    Field,
}

impl LineKind {
    fn of(line: &str) -> Self {
        let line = line.trim_end();
        if line.eq_ignore_ascii_case(BEGIN_EVENT) {
            Self::BeginEvent
        } else if line.eq_ignore_ascii_case(END_EVENT) {
            Self::EndEvent
        } else if line.eq_ignore_ascii_case(BEGIN_ALARM) {
            Self::BeginAlarm
        } else if line.eq_ignore_ascii_case(END_ALARM) {
            Self::EndAlarm
        } else {
            Self::Field
        }
    }
}

/// Iterator over the event blocks of a feed, in file order.
pub struct FeedParser<R: BufRead> {
    lines: LineReader<R>,
    current: Option<RawEventBuilder>,
    in_alarm: bool,
    events: usize,
    finished: bool,
}

impl<'a> FeedParser<&'a [u8]> {
    pub fn from_slice(slice: &'a [u8]) -> Self {
        Self::new(slice)
    }
}

impl<R: BufRead> FeedParser<R> {
    pub fn new(reader: R) -> Self {
        FeedParser {
            lines: LineReader::new(reader),
            current: None,
            in_alarm: false,
            events: 0,
            finished: false,
        }
    }

    /// Physical lines consumed so far.
    pub fn lines_read(&self) -> usize {
        self.lines.lines_read()
    }

    /// Completed event blocks yielded so far.
    pub fn events_found(&self) -> usize {
        self.events
    }

    fn finish(&mut self) {
        if self.finished {
            return;
        }
        self.finished = true;
        if self.current.take().is_some() {
            tracing::debug!("dropping unterminated event block at end of feed");
        }
        tracing::info!(
            lines = self.lines_read(),
            events = self.events,
            "{} lines in calendar extract - {} raw events found",
            self.lines_read(),
            self.events
        );
    }
}

impl<R: BufRead> Iterator for FeedParser<R> {
    type Item = Result<RawEvent, ParserError>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next() {
                Some(Ok(line)) => line,
                Some(Err(err)) => return Some(Err(err)),
                None => {
                    self.finish();
                    return None;
                }
            };

            match LineKind::of(line.as_str()) {
                LineKind::BeginEvent => {
                    if self.current.is_some() {
                        tracing::debug!(line = line.number(), "event block reopened before END");
                    }
                    self.current = Some(RawEventBuilder::new());
                    self.in_alarm = false;
                }
                LineKind::EndEvent => {
                    if let Some(builder) = self.current.take() {
                        self.in_alarm = false;
                        self.events += 1;
                        return Some(Ok(builder.build()));
                    }
                }
                LineKind::BeginAlarm => self.in_alarm = true,
                LineKind::EndAlarm => self.in_alarm = false,
                LineKind::Field => {
                    if self.in_alarm {
                        continue;
                    }
                    if let Some(builder) = self.current.as_mut()
                        && let Some(field) = FieldLine::split(line.as_str())
                    {
                        builder.add_field(field);
                    }
                }
            }
        }
    }
}
