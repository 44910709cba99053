//! The ingestion driver: feed in, catalog out.

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use chrono::{NaiveDateTime, TimeDelta};

use crate::{
    catalog::EventCatalog,
    classify::{Classifier, MarkerClassifier},
    component::RawEvent,
    parser::{FeedParser, ParserError},
    rrule::{ExpandError, Expander, Warning},
    types::Recency,
};

/// What to do with a record that fails to expand.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ErrorPolicy {
    /// Warn, drop the record and carry on.
    #[default]
    SkipRecord,
    /// Fail the whole ingestion.
    AbortIngestion,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct IngestOptions {
    /// How long after its end an occurrence is still kept.
    pub retention_hours: u32,
    pub error_policy: ErrorPolicy,
}

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("malformed feed: {0}")]
    Feed(#[from] ParserError),
    #[error(transparent)]
    Record(#[from] ExpandError),
}

/// Counters and warnings collected over one ingestion.
#[derive(Debug, Clone, Default)]
pub struct IngestReport {
    pub lines: usize,
    pub raw_events: usize,
    pub occurrences: usize,
    pub skipped: usize,
    pub warnings: Vec<Warning>,
}

#[derive(Debug, Clone)]
pub struct Ingest {
    pub catalog: EventCatalog,
    pub report: IngestReport,
}

/// Supplies a fresh reader over the feed for every ingestion.
pub trait FeedSource {
    type Reader: BufRead;

    fn open(&self) -> io::Result<Self::Reader>;
}

/// A feed stored in a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileFeed(PathBuf);

impl FileFeed {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

impl FeedSource for FileFeed {
    type Reader = BufReader<File>;

    fn open(&self) -> io::Result<Self::Reader> {
        File::open(&self.0).map(BufReader::new)
    }
}

#[derive(Debug, Clone)]
pub struct Ingestor<C: Classifier = MarkerClassifier> {
    options: IngestOptions,
    classifier: C,
}

impl Default for Ingestor<MarkerClassifier> {
    fn default() -> Self {
        Self::new(IngestOptions::default())
    }
}

impl Ingestor<MarkerClassifier> {
    pub fn new(options: IngestOptions) -> Self {
        Self {
            options,
            classifier: MarkerClassifier,
        }
    }
}

impl<C: Classifier + Clone> Ingestor<C> {
    pub fn with_classifier(options: IngestOptions, classifier: C) -> Self {
        Self {
            options,
            classifier,
        }
    }

    pub fn options(&self) -> &IngestOptions {
        &self.options
    }

    pub fn classifier(&self) -> &C {
        &self.classifier
    }

    fn recency(&self, now: NaiveDateTime) -> Recency {
        Recency::relative_to(now, TimeDelta::hours(i64::from(self.options.retention_hours)))
    }

    /// Read every event block first; a broken feed yields no catalog at all.
    fn read_feed<R: BufRead>(reader: R, report: &mut IngestReport) -> Result<Vec<RawEvent>, ParserError> {
        let mut parser = FeedParser::new(reader);
        let events = parser.by_ref().collect::<Result<Vec<_>, _>>()?;
        report.lines = parser.lines_read();
        report.raw_events = events.len();
        Ok(events)
    }

    /// Parse, expand and sort one feed.
    pub fn ingest<R: BufRead>(&self, reader: R, now: NaiveDateTime) -> Result<Ingest, IngestError> {
        let mut report = IngestReport::default();
        let events = Self::read_feed(reader, &mut report)?;

        let expander = Expander::new(self.classifier.clone(), self.recency(now));
        let mut occurrences = Vec::new();
        for event in &events {
            match expander.expand(event) {
                Ok(mut expansion) => {
                    occurrences.append(&mut expansion.occurrences);
                    report.warnings.append(&mut expansion.warnings);
                }
                Err(err) => match self.options.error_policy {
                    ErrorPolicy::SkipRecord => {
                        tracing::warn!(record = ?err.record(), "{err}, skipping record");
                        report.skipped += 1;
                        report.warnings.push(Warning::Skipped(err));
                    }
                    ErrorPolicy::AbortIngestion => {
                        tracing::error!(record = ?err.record(), "{err}, aborting ingestion");
                        return Err(err.into());
                    }
                },
            }
        }

        let catalog = EventCatalog::rebuild(occurrences);
        report.occurrences = catalog.len();
        tracing::info!(
            occurrences = report.occurrences,
            skipped = report.skipped,
            warnings = report.warnings.len(),
            "ingested feed"
        );
        Ok(Ingest { catalog, report })
    }

    pub fn ingest_source<S: FeedSource>(&self, source: &S, now: NaiveDateTime) -> Result<Ingest, IngestError> {
        let reader = source.open().map_err(ParserError::from)?;
        self.ingest(reader, now)
    }
}
