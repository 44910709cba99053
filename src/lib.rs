//! Ingest an iCalendar-style feed into an ordered catalog of event
//! occurrences, with daily, weekly and monthly rules expanded and every
//! occurrence classified as a gig, an unavailability or plain information.
//!
//! ```rust
//! use chrono::NaiveDate;
//! use gigfeed::{EventKind, Ingestor};
//!
//! let feed = "BEGIN:VEVENT\r\n\
//!     DTSTART:20240601T200000\r\n\
//!     DTEND:20240601T230000\r\n\
//!     SUMMARY:Gig at Venue X - Confirmed\r\n\
//!     END:VEVENT\r\n";
//! let now = NaiveDate::from_ymd_opt(2024, 5, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
//!
//! let ingest = Ingestor::default().ingest(feed.as_bytes(), now).unwrap();
//! let gigs = ingest.catalog.query_by_type(EventKind::Gig, now, true);
//! assert_eq!(gigs.len(), 1);
//! assert!(gigs[0].is_confirmed());
//! ```

const VALUE_DELIMITER: char = ':';
const PARAM_DELIMITER: char = ';';
const PARAM_NAME_DELIMITER: char = '=';
const PARAM_VALUE_DELIMITER: char = ',';

pub mod component;
pub use component::{RawEvent, RawEventBuilder};

pub mod parser;
pub use parser::{FeedParser, FieldLine, LineReader, ParserError};

pub mod property;

pub mod types;
pub use types::{DateError, Recency, TimeWindow};

pub mod occurrence;
pub use occurrence::{EventKind, Occurrence, OccurrenceBuilder, ValidationError};

pub mod classify;
pub use classify::{Classifier, MarkerClassifier};

pub mod rrule;
pub use rrule::{ExpandError, Expander, Expansion, RecurrenceKind, RecurrenceSpec, Warning};

pub mod catalog;
pub use catalog::{CatalogHandle, EventCatalog};

pub mod ingest;
pub use ingest::{ErrorPolicy, FeedSource, FileFeed, Ingest, IngestError, IngestOptions, IngestReport, Ingestor};
