use chrono::{NaiveDate, NaiveDateTime};
use gigfeed::{Ingest, Ingestor};

const BAND_CALENDAR: &str = include_str!("./resources/band_calendar.ics");

pub fn at(m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(2024, m, d)
        .unwrap()
        .and_hms_opt(h, min, 0)
        .unwrap()
}

pub fn now() -> NaiveDateTime {
    at(5, 1, 0, 0)
}

pub fn ingest_band_calendar() -> Ingest {
    Ingestor::default()
        .ingest(BAND_CALENDAR.as_bytes(), now())
        .unwrap()
}

pub mod parser {
    use crate::BAND_CALENDAR;
    use gigfeed::{FeedParser, LineReader};

    #[test]
    fn band_calendar_blocks() {
        let mut parser = FeedParser::from_slice(BAND_CALENDAR.as_bytes());
        let events = parser.by_ref().collect::<Result<Vec<_>, _>>().unwrap();
        let uids: Vec<_> = events.iter().filter_map(|e| e.uid()).collect();
        similar_asserts::assert_eq!(
            uids,
            vec![
                "gig-venue-x",
                "gig-late-set",
                "rehearsals",
                "lessons",
                "broken-1",
                "smith-wedding",
                "drummer-away",
                "winter-gig",
            ]
        );
        assert_eq!(parser.lines_read(), 70);
    }

    #[test]
    fn alarm_does_not_leak_into_event() {
        let event = FeedParser::from_slice(BAND_CALENDAR.as_bytes())
            .next()
            .unwrap()
            .unwrap();
        assert_eq!(event.summary(), Some("Gig at Venue X - Confirmed"));
        assert_eq!(event.location(), Some("Venue X, High Street"));
        assert_eq!(event.organizer(), Some("mailto:band@example.com"));
    }

    #[test]
    fn folded_description() {
        let wedding = FeedParser::from_slice(BAND_CALENDAR.as_bytes())
            .map(Result::unwrap)
            .find(|e| e.uid() == Some("smith-wedding"))
            .unwrap();
        assert_eq!(
            wedding.description(),
            Some("Ceremony at 2pm, reception\nto follow")
        );
    }

    #[test]
    fn crlf_and_lf_read_the_same() {
        let crlf = BAND_CALENDAR.replace('\n', "\r\n");
        let lf: Vec<_> = LineReader::from_slice(BAND_CALENDAR.as_bytes())
            .map(|line| line.unwrap().inner)
            .collect();
        let crlf: Vec<_> = LineReader::from_slice(crlf.as_bytes())
            .map(|line| line.unwrap().inner)
            .collect();
        similar_asserts::assert_eq!(lf, crlf);
    }
}

pub mod ingest {
    use crate::{BAND_CALENDAR, at, ingest_band_calendar, now};
    use gigfeed::{
        ErrorPolicy, EventKind, ExpandError, FileFeed, IngestError, IngestOptions, Ingestor,
        Occurrence, Warning,
    };
    use itertools::Itertools;

    #[test_log::test]
    fn band_calendar_catalog() {
        let ingest = ingest_band_calendar();
        let rows = ingest
            .catalog
            .iter()
            .map(|o| format!("{} {} {} {}", o.start(), o.end(), o.kind(), o.summary()))
            .collect_vec();
        similar_asserts::assert_eq!(
            rows,
            vec![
                "2024-06-01 20:00:00 2024-06-01 23:00:00 GIG Gig at Venue X - Confirmed",
                "2024-06-01 23:30:00 2024-06-02 01:00:00 GIG Gig - late set",
                "2024-06-03 19:00:00 2024-06-03 20:59:59.999 INFO Rehearsal",
                "2024-06-04 17:00:00 2024-06-04 18:00:00 INFO Guitar lesson",
                "2024-06-05 19:00:00 2024-06-05 20:59:59.999 INFO Rehearsal",
                "2024-06-06 19:00:00 2024-06-06 20:59:59.999 INFO Rehearsal",
                "2024-06-08 14:00:00 2024-06-08 23:00:00 GIG Smith Wedding gig",
                "2024-06-10 00:00:00 2024-06-11 00:00:00 UNAVAILABLE Drummer unavailable",
            ]
        );
    }

    #[test_log::test]
    fn band_calendar_report() {
        let report = ingest_band_calendar().report;
        assert_eq!(report.lines, 70);
        assert_eq!(report.raw_events, 8);
        assert_eq!(report.occurrences, 8);
        assert_eq!(report.skipped, 1);
        assert!(matches!(
            report.warnings[..],
            [
                Warning::UnsupportedRule { .. },
                Warning::Skipped(ExpandError::MalformedRecurrence { .. })
            ]
        ));
        let Warning::Skipped(err) = &report.warnings[1] else {
            unreachable!()
        };
        assert_eq!(err.record().uid(), Some("broken-1"));
    }

    #[test]
    fn flags_and_text() {
        let ingest = ingest_band_calendar();
        let first = &ingest.catalog[0];
        assert!(first.is_confirmed());
        assert!(!first.is_private());
        assert_eq!(first.location(), "Venue X, High Street");
        assert_eq!(first.last_modified_by(), "mailto:band@example.com");
        assert_eq!(first.last_modified(), Some(at(5, 20, 10, 15)));

        let wedding = ingest
            .catalog
            .iter()
            .find(|o| o.summary() == "Smith Wedding gig")
            .unwrap();
        assert!(wedding.is_private());
        assert_eq!(wedding.kind(), EventKind::Gig);
        assert_eq!(wedding.notes(), "Ceremony at 2pm, reception\nto follow");
    }

    #[test]
    fn catalog_invariants() {
        let ingest = ingest_band_calendar();
        assert!(ingest.catalog.iter().all(|o| o.end() > o.start()));
        assert!(
            ingest
                .catalog
                .iter()
                .tuple_windows()
                .all(|(a, b)| a.start() <= b.start())
        );
    }

    #[test]
    fn ingestion_is_deterministic() {
        similar_asserts::assert_eq!(
            ingest_band_calendar().catalog,
            ingest_band_calendar().catalog
        );
    }

    #[test]
    fn listing_the_same_feed_twice_changes_nothing() {
        let doubled = BAND_CALENDAR.repeat(2);
        let ingest = Ingestor::default()
            .ingest(doubled.as_bytes(), now())
            .unwrap();
        assert_eq!(ingest.report.raw_events, 16);
        similar_asserts::assert_eq!(ingest.catalog, ingest_band_calendar().catalog);
    }

    #[test_log::test]
    fn abort_policy() {
        let ingestor = Ingestor::new(IngestOptions {
            error_policy: ErrorPolicy::AbortIngestion,
            ..Default::default()
        });
        let err = ingestor
            .ingest(BAND_CALENDAR.as_bytes(), now())
            .unwrap_err();
        let IngestError::Record(err) = err else {
            panic!("expected a record error");
        };
        assert_eq!(err.record().uid(), Some("broken-1"));
    }

    #[test]
    fn later_now_drops_stale_occurrences() {
        let ingest = Ingestor::default()
            .ingest(BAND_CALENDAR.as_bytes(), at(6, 5, 12, 0))
            .unwrap();
        let starts = ingest.catalog.iter().map(Occurrence::start).collect_vec();
        assert_eq!(
            starts,
            vec![
                at(6, 5, 19, 0),
                at(6, 6, 19, 0),
                at(6, 8, 14, 0),
                at(6, 10, 0, 0)
            ]
        );
    }

    #[test]
    fn file_feed() {
        let feed = FileFeed::new(concat!(
            env!("CARGO_MANIFEST_DIR"),
            "/tests/resources/band_calendar.ics"
        ));
        let ingest = Ingestor::default().ingest_source(&feed, now()).unwrap();
        similar_asserts::assert_eq!(ingest.catalog, ingest_band_calendar().catalog);

        let missing = FileFeed::new(concat!(env!("CARGO_MANIFEST_DIR"), "/tests/resources/missing.ics"));
        assert!(matches!(
            Ingestor::default().ingest_source(&missing, now()),
            Err(IngestError::Feed(_))
        ));
    }
}

pub mod queries {
    use crate::{at, ingest_band_calendar, now};
    use gigfeed::{EventKind, MarkerClassifier, Occurrence, TimeWindow};
    use chrono::NaiveDate;
    use itertools::Itertools;
    use rstest::rstest;

    fn summaries(occurrences: Vec<&Occurrence>) -> Vec<&str> {
        occurrences.into_iter().map(Occurrence::summary).collect()
    }

    #[test]
    fn gigs_one_per_day() {
        let ingest = ingest_band_calendar();
        similar_asserts::assert_eq!(
            summaries(ingest.catalog.query_by_type(EventKind::Gig, now(), true)),
            vec!["Gig at Venue X - Confirmed", "Smith Wedding gig"]
        );
        assert_eq!(
            ingest
                .catalog
                .query_by_type(EventKind::Gig, now(), false)
                .len(),
            3
        );
    }

    #[test]
    fn confirmed_upcoming() {
        let ingest = ingest_band_calendar();
        similar_asserts::assert_eq!(
            summaries(ingest.catalog.confirmed_upcoming(now())),
            vec!["Gig at Venue X - Confirmed"]
        );
        assert!(ingest.catalog.confirmed_upcoming(at(6, 2, 0, 0)).is_empty());
    }

    #[rstest]
    #[case(1, &["Gig at Venue X - Confirmed"])]
    #[case(4, &["Guitar lesson"])]
    #[case(7, &[])]
    #[case(10, &["Drummer unavailable"])]
    fn on_day(#[case] day: u32, #[case] expected: &[&str]) {
        let ingest = ingest_band_calendar();
        let window = TimeWindow::day(NaiveDate::from_ymd_opt(2024, 6, day).unwrap());
        similar_asserts::assert_eq!(summaries(ingest.catalog.query_on(&window)), expected.to_vec());
    }

    #[test]
    fn after_is_strict() {
        let ingest = ingest_band_calendar();
        let after = ingest.catalog.query_after(at(6, 8, 14, 0));
        assert_eq!(summaries(after), vec!["Drummer unavailable"]);
    }

    #[test]
    fn latest_update() {
        let ingest = ingest_band_calendar();
        let latest = ingest.catalog.latest_update().unwrap();
        assert_eq!(latest.summary(), "Smith Wedding gig");
        assert_eq!(latest.last_modified(), Some(at(5, 25, 8, 0)));
    }

    #[test]
    fn public_listing_hides_private_occurrences() {
        let ingest = ingest_band_calendar();
        let public = ingest.catalog.public_after(&MarkerClassifier, now());
        assert_eq!(public.len(), 7);
        assert!(public.iter().all(|o| !o.summary().contains("Wedding")));
        assert_eq!(
            public.iter().map(|o| o.kind()).counts()[&EventKind::Info],
            4
        );
    }
}

pub mod handle {
    use crate::{BAND_CALENDAR, at, now};
    use gigfeed::{CatalogHandle, IngestError, Ingestor};
    use std::io::{self, BufReader, Read};
    use std::sync::Arc;

    struct Disconnected;

    impl Read for Disconnected {
        fn read(&mut self, _: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::other("feed connection dropped"))
        }
    }

    #[test]
    fn refresh_swaps_only_on_success() {
        let handle = CatalogHandle::default();
        let ingestor = Ingestor::default();
        let report = handle
            .refresh(&ingestor, BAND_CALENDAR.as_bytes(), now())
            .unwrap();
        assert_eq!(report.occurrences, 8);

        let before = handle.snapshot();
        let broken = BufReader::new(BAND_CALENDAR.as_bytes().chain(Disconnected));
        let err = handle.refresh(&ingestor, broken, now()).unwrap_err();
        assert!(matches!(err, IngestError::Feed(_)));
        assert!(Arc::ptr_eq(&before, &handle.snapshot()));
        assert_eq!(before.len(), 8);
    }

    #[test]
    fn snapshot_outlives_refresh() {
        let handle = CatalogHandle::default();
        let ingestor = Ingestor::default();
        handle
            .refresh(&ingestor, BAND_CALENDAR.as_bytes(), now())
            .unwrap();
        let old = handle.snapshot();
        handle
            .refresh(&ingestor, BAND_CALENDAR.as_bytes(), at(6, 7, 0, 0))
            .unwrap();
        assert_eq!(old.len(), 8);
        assert_eq!(handle.snapshot().len(), 2);
    }
}

#[cfg(feature = "serde")]
pub mod wire {
    use crate::ingest_band_calendar;

    #[test]
    fn occurrence_json() {
        let ingest = ingest_band_calendar();
        let json = serde_json::to_value(&ingest.catalog[0]).unwrap();
        similar_asserts::assert_eq!(
            json,
            serde_json::json!({
                "start": "2024-06-01T20:00:00",
                "end": "2024-06-01T23:00:00",
                "summary": "Gig at Venue X - Confirmed",
                "location": "Venue X, High Street",
                "notes": "",
                "lastModified": "2024-05-20T10:15:00",
                "lastModifiedBy": "mailto:band@example.com",
                "kind": "GIG",
                "isPrivate": false,
                "isConfirmed": true,
            })
        );
    }
}
