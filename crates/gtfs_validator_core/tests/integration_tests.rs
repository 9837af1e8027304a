use chrono::NaiveDate;
use gtfs_validator_core::{
    rules, validate_path, Channels, FeedDateRange, GtfsFeed, GtfsInput, MemorySink, ReportSection,
    ValidatorConfig,
};
use std::path::{Path, PathBuf};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .parent() // crates/
        .unwrap()
        .parent() // root
        .unwrap()
        .to_path_buf()
}

fn test_feeds_root() -> PathBuf {
    project_root().join("test-gtfs-feeds")
}

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

#[test]
fn loads_metro_valley_fixture() {
    let feed_path = test_feeds_root().join("metro-valley");
    let input = GtfsInput::from_path(&feed_path).expect("Failed to create input");
    let feed = GtfsFeed::from_input(&input).expect("Failed to load feed");

    assert_eq!(feed.agency.len(), 2);
    assert_eq!(feed.stops.len(), 6);
    assert_eq!(feed.stop_times.len(), 6);
    assert_eq!(feed.calendar_date_rows().len(), 4);
    assert!(feed.shapes.is_none());
}

#[test]
fn default_plan_on_metro_valley() {
    let feed_path = test_feeds_root().join("metro-valley");
    let config = ValidatorConfig::default().with_validation_date(date(2024, 6, 29));
    let plan = rules::default_plan(&config);

    let mut sink = MemorySink::new();
    let mut channels = Channels::new(&mut sink, false);
    let outcome = validate_path(&feed_path, &plan, &config, &mut channels).expect("outcome");

    let sizes: Vec<_> = outcome
        .results
        .iter()
        .map(|(section, result)| (section, result.size()))
        .collect();
    assert_eq!(
        sizes,
        vec![
            (ReportSection::Routes, 0),
            (ReportSection::Trips, 0),
            (ReportSection::Stops, 3),
            (ReportSection::Shapes, 0),
            (ReportSection::Dates, 4),
        ]
    );

    let duplicates: Vec<_> = outcome
        .results
        .get(ReportSection::Stops)
        .iter()
        .map(|finding| finding.affected_entity_id().unwrap_or_default())
        .collect();
    assert_eq!(duplicates, vec!["A2", "B2", "C2"]);

    let empty_days: Vec<_> = outcome
        .results
        .get(ReportSection::Dates)
        .iter()
        .map(|finding| finding.affected_entity_id().unwrap_or_default())
        .collect();
    assert_eq!(
        empty_days,
        vec!["2024-01-01", "2024-07-01", "2024-07-02", "2024-07-03"]
    );

    assert_eq!(
        outcome.summary.date_range,
        FeedDateRange::new(date(2023, 12, 31), date(2024, 7, 4))
    );
    assert_eq!(outcome.summary.agency_names, vec!["Metro", "Valley Transit"]);
    assert_eq!(outcome.active_days.len(), 30);
    assert_eq!(outcome.active_days[0].trips, 2);
    assert_eq!(outcome.active_days[2].trips, 0);
}
