//! End-to-end flow: file source -> freshness cache -> query -> rendered text.

use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

use chrono::Utc;

use bedwatch::data::cache::FreshnessCache;
use bedwatch::data::state::{load_state, parse_time};
use bedwatch::report::query::{query, QueryOutcome, ReportFilter};
use bedwatch::report::render::{render_broadcast, render_report, NO_HOSPITALS_MESSAGE};
use bedwatch::sheet::source::FileSource;

const FIXTURE_ROWS: &str = r#"[
  {
    "timestamp": "01/05/2021 09:00:00",
    "hospitalname": "General Hospital",
    "zone": "EAST",
    "pincode": "560001",
    "phonenumber": "080-1111",
    "generalbeds": "7",
    "hdubeds": "-",
    "icubeds": "-",
    "icuventilatorbeds": "-",
    "remarks": "older report",
    "type": "Government",
    "interested": "Yes"
  },
  {
    "timestamp": "01/05/2021 09:30:00",
    "hospitalname": "Closed Hospital",
    "zone": "EAST",
    "pincode": "560001",
    "phonenumber": "080-2222",
    "generalbeds": "0",
    "hdubeds": "0",
    "icubeds": "0",
    "icuventilatorbeds": "0",
    "remarks": "",
    "type": "Government",
    "interested": "Yes"
  },
  {
    "timestamp": "01/05/2021 11:30:00",
    "hospitalname": "General Hospital",
    "zone": "EAST",
    "pincode": "560001",
    "phonenumber": "080-1111",
    "generalbeds": "4",
    "hdubeds": "1",
    "icubeds": "-",
    "icuventilatorbeds": "0",
    "remarks": "call ahead",
    "type": "Government",
    "interested": "Yes"
  },
  {
    "timestamp": "01/05/2021 10:15:00",
    "hospitalname": "South Hospital",
    "zone": "SOUTH",
    "pincode": "560034",
    "phonenumber": "080-3333",
    "generalbeds": "-",
    "hdubeds": "-",
    "icubeds": "-",
    "icuventilatorbeds": "-",
    "remarks": "",
    "type": "Private",
    "interested": "Yes"
  },
  {
    "timestamp": "01/05/2021 10:20:00",
    "hospitalname": "Westside Clinic",
    "zone": "WEST",
    "pincode": "560099",
    "phonenumber": "080-4444",
    "generalbeds": "9",
    "hdubeds": "2",
    "icubeds": "1",
    "icuventilatorbeds": "1",
    "remarks": "",
    "type": "Government",
    "interested": "No"
  },
  {
    "timestamp": "01/05/2021 10:25:00",
    "hospitalname": "Lab Corner",
    "zone": "EAST",
    "pincode": "560001",
    "phonenumber": "080-5555",
    "generalbeds": "6",
    "hdubeds": "0",
    "icubeds": "0",
    "icuventilatorbeds": "0",
    "remarks": "",
    "type": "Lab",
    "interested": "Yes"
  }
]"#;

fn unique_temp_path(name: &str) -> PathBuf {
    let stamp = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("clock should be after unix epoch")
        .as_nanos();
    std::env::temp_dir().join(format!("bedwatch-{name}-{stamp}.json"))
}

struct Fixture {
    cache: FreshnessCache,
    rows_path: PathBuf,
    state_path: PathBuf,
}

impl Drop for Fixture {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.rows_path);
        let _ = fs::remove_file(&self.state_path);
    }
}

fn open_fixture(name: &str) -> Fixture {
    let rows_path = unique_temp_path(&format!("{name}-rows"));
    fs::write(&rows_path, FIXTURE_ROWS).expect("fixture rows should write");
    let state_path = unique_temp_path(&format!("{name}-state"));
    let cache = FreshnessCache::open(Box::new(FileSource::new(&rows_path)), &state_path, 60);
    Fixture {
        cache,
        rows_path,
        state_path,
    }
}

#[test]
fn zone_report_shows_only_the_latest_status_of_available_hospitals() {
    let mut fixture = open_fixture("zone-report");
    let dataset = fixture.cache.dataset(Utc::now()).expect("dataset should load");

    let outcome = query(dataset, &ReportFilter::Zone("EAST".to_string()), 1);
    let rendered = render_report("EAST", &outcome);

    assert_eq!(
        rendered,
        "Bed availability for EAST\n\
         \n\
         *General Hospital*\n\
         Phone: 080-1111\n\
         Last updated: 01/05/2021 11:30:00\n\
         General Beds: 4\n\
         HDU: 1\n\
         ICU: -\n\
         Ventilator ICU: 0\n\
         Remarks: call ahead\n"
    );
    // the zeroed hospital is omitted from the body, the stale report is not shown
    assert!(!rendered.contains("Closed Hospital"));
    assert!(!rendered.contains("older report"));
}

#[test]
fn filtered_out_rows_appear_in_no_result() {
    let mut fixture = open_fixture("filtered-rows");
    let dataset = fixture.cache.dataset(Utc::now()).expect("dataset should load");

    // the only WEST row declined participation; the Lab row is in EAST
    let west = query(dataset, &ReportFilter::Zone("WEST".to_string()), 1);
    assert_eq!(west, QueryOutcome::NoHospitals);
    assert_eq!(render_report("WEST", &west), NO_HOSPITALS_MESSAGE);

    let east = render_report(
        "EAST",
        &query(dataset, &ReportFilter::Zone("EAST".to_string()), 1),
    );
    assert!(!east.contains("Lab Corner"));
}

#[test]
fn unknown_pincode_renders_the_exact_literal() {
    let mut fixture = open_fixture("unknown-pincode");
    let dataset = fixture.cache.dataset(Utc::now()).expect("dataset should load");
    let rendered = render_report(
        "999999",
        &query(dataset, &ReportFilter::Pincode("999999".to_string()), 1),
    );
    assert_eq!(rendered, "No hospitals found");
}

#[test]
fn zone_with_no_free_beds_gets_the_footer_not_the_literal() {
    let mut fixture = open_fixture("no-free-beds");
    let dataset = fixture.cache.dataset(Utc::now()).expect("dataset should load");
    let rendered = render_report(
        "SOUTH",
        &query(dataset, &ReportFilter::Zone("SOUTH".to_string()), 1),
    );
    assert_eq!(
        rendered,
        "Bed availability for SOUTH\n\nNo beds available in 1 tracked hospital(s)"
    );
}

#[test]
fn repeated_queries_render_byte_identical_reports() {
    let mut fixture = open_fixture("idempotent");
    let now = Utc::now();
    let first = {
        let dataset = fixture.cache.dataset(now).expect("dataset should load");
        render_report(
            "EAST",
            &query(dataset, &ReportFilter::Zone("EAST".to_string()), 1),
        )
    };
    let second = {
        let dataset = fixture.cache.dataset(now).expect("dataset should load");
        render_report(
            "EAST",
            &query(dataset, &ReportFilter::Zone("EAST".to_string()), 1),
        )
    };
    assert_eq!(first, second);
}

#[test]
fn refresh_persists_known_zones_and_pincodes() {
    let mut fixture = open_fixture("persisted-state");
    fixture.cache.dataset(Utc::now()).expect("dataset should load");

    let persisted = load_state(&fixture.state_path);
    assert_eq!(persisted.known_zones, ["EAST", "SOUTH"]);
    assert_eq!(persisted.known_pincodes, ["560001", "560034"]);
    assert!(persisted.last_fetch_time.is_some());
}

#[test]
fn broadcast_summarizes_every_reporting_zone() {
    let mut fixture = open_fixture("broadcast");
    let dataset = fixture.cache.dataset(Utc::now()).expect("dataset should load");
    let banner_time = parse_time("2021-05-01 18:00:00").expect("fixture time");

    assert_eq!(
        render_broadcast(dataset, banner_time),
        "Bed availability as of 2021-05-01 18:00:00\n\
         \n\
         EAST: 1 of 2 hospital(s) with beds\n\
         SOUTH: 0 of 1 hospital(s) with beds\n\
         \n\
         Send /zone or /pincode for hospital details"
    );
}

#[test]
fn latest_n_two_includes_the_previous_report() {
    let mut fixture = open_fixture("latest-two");
    let dataset = fixture.cache.dataset(Utc::now()).expect("dataset should load");
    let outcome = query(dataset, &ReportFilter::Zone("EAST".to_string()), 2);
    let QueryOutcome::Available { hospitals, .. } = outcome else {
        panic!("expected an available outcome");
    };
    let general = &hospitals[0];
    assert_eq!(general.hospital, "General Hospital");
    let timestamps: Vec<_> = general
        .entries
        .iter()
        .map(|entry| entry.timestamp_raw.as_str())
        .collect();
    assert_eq!(timestamps, ["01/05/2021 11:30:00", "01/05/2021 09:00:00"]);
}
