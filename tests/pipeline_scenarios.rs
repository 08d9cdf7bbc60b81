//! Chart pipeline behavior over small fixed datasets.

use std::collections::HashMap;

use launchdash::chart::ScatterPoint;
use launchdash::data::{Dataset, Outcome, Row};
use launchdash::pipeline::{outcome_distribution, payload_correlation};
use launchdash::selection::{PayloadRange, SiteSelection};

/// Three CCAFS launches: outcomes [1,0,1], payloads [500,1500,2500].
fn scenario_dataset() -> Dataset {
    Dataset::from_rows(vec![
        Row::new("CCAFS", 500.0, Outcome::Success, "v1.1"),
        Row::new("CCAFS", 1500.0, Outcome::Failure, "v1.1"),
        Row::new("CCAFS", 2500.0, Outcome::Success, "FT"),
    ])
    .unwrap()
}

fn mixed_dataset() -> Dataset {
    let sites = ["CCAFS LC-40", "KSC LC-39A", "VAFB SLC-4E", "CCAFS SLC-40"];
    let categories = ["v1.0", "v1.1", "FT", "B4", "B5"];
    let rows = (0..40)
        .map(|i| {
            let outcome = if (i * 7) % 3 == 0 { Outcome::Failure } else { Outcome::Success };
            Row::new(
                sites[i % sites.len()],
                ((i * 733) % 9700) as f64,
                outcome,
                categories[(i / 3) % categories.len()],
            )
        })
        .collect();
    Dataset::from_rows(rows).unwrap()
}

fn site(name: &str) -> SiteSelection {
    SiteSelection::Site(name.to_string())
}

fn range(low: f64, high: f64) -> PayloadRange {
    PayloadRange::new(low, high).unwrap()
}

#[test]
fn scenario_a_pie_all_and_single_site() {
    let ds = scenario_dataset();

    let all = outcome_distribution(&ds, &SiteSelection::All);
    let pie = all.as_pie().unwrap();
    assert_eq!(pie.slices.len(), 1);
    assert_eq!(pie.value_of("CCAFS"), Some(2));

    let one = outcome_distribution(&ds, &site("CCAFS"));
    let pie = one.as_pie().unwrap();
    assert_eq!(pie.value_of("Success"), Some(2));
    assert_eq!(pie.value_of("Failure"), Some(1));
    assert_eq!(pie.slices[0].label, "Success");
}

#[test]
fn scenario_b_scatter_range_filter() {
    let ds = scenario_dataset();
    let chart = payload_correlation(&ds, &SiteSelection::All, &range(1000.0, 2000.0));
    let scatter = chart.as_scatter().unwrap();
    assert_eq!(scatter.points.len(), 1);
    assert_eq!((scatter.points[0].x, scatter.points[0].y), (1500.0, 0));
}

#[test]
fn scenario_c_empty_range_is_not_an_error() {
    let ds = scenario_dataset();
    let chart = payload_correlation(&ds, &SiteSelection::All, &range(9000.0, 9500.0));
    assert!(chart.is_empty());
    assert!(!chart.title().is_empty());
}

#[test]
fn scenario_d_absent_site_yields_empty_charts() {
    let ds = scenario_dataset();
    let absent = site("Boca Chica");
    assert!(outcome_distribution(&ds, &absent).is_empty());
    assert!(payload_correlation(&ds, &absent, &range(0.0, 10000.0)).is_empty());
}

#[test]
fn scatter_contains_exactly_matching_rows() {
    let ds = mixed_dataset();
    let selections = [
        SiteSelection::All,
        site("CCAFS LC-40"),
        site("VAFB SLC-4E"),
        site("nowhere"),
    ];
    let ranges = [range(0.0, 10000.0), range(2500.0, 5000.0), range(733.0, 733.0), range(9800.0, 9900.0)];

    for sel in &selections {
        for r in &ranges {
            let chart = payload_correlation(&ds, sel, r);
            let mut got: Vec<ScatterPoint> = chart.as_scatter().unwrap().points.clone();
            let mut expected: Vec<ScatterPoint> = ds
                .rows()
                .iter()
                .filter(|row| r.low() <= row.payload_mass_kg && row.payload_mass_kg <= r.high())
                .filter(|row| sel.is_all() || row.launch_site == sel.as_str())
                .map(|row| ScatterPoint {
                    x: row.payload_mass_kg,
                    y: row.outcome.as_u8(),
                    group: row.booster_version_category.clone(),
                    site: row.launch_site.clone(),
                })
                .collect();
            let key = |p: &ScatterPoint| (p.x as i64, p.site.clone(), p.y, p.group.clone());
            got.sort_by_key(key);
            expected.sort_by_key(key);
            assert_eq!(got, expected, "site={} range={:?}", sel, r);
        }
    }
}

#[test]
fn pie_all_counts_successes_per_site() {
    let ds = mixed_dataset();
    let chart = outcome_distribution(&ds, &SiteSelection::All);
    let pie = chart.as_pie().unwrap();

    let mut expected: HashMap<&str, u64> = HashMap::new();
    for row in ds.rows() {
        *expected.entry(row.launch_site.as_str()).or_insert(0) += u64::from(row.outcome.as_u8());
    }
    assert_eq!(pie.slices.len(), ds.sites().len());
    for slice in &pie.slices {
        assert_eq!(Some(&slice.value), expected.get(slice.label.as_str()));
    }
    assert_eq!(pie.total(), ds.success_count() as u64);
}

#[test]
fn pie_single_site_sums_to_site_rows() {
    let ds = mixed_dataset();
    for name in ds.sites() {
        let chart = outcome_distribution(&ds, &site(&name));
        let rows = ds.rows().iter().filter(|r| r.launch_site == name).count() as u64;
        assert_eq!(chart.as_pie().unwrap().total(), rows, "site {}", name);
    }
}

#[test]
fn pipelines_are_idempotent() {
    let ds = mixed_dataset();
    let sel = site("KSC LC-39A");
    let r = range(1000.0, 8000.0);
    assert_eq!(outcome_distribution(&ds, &sel), outcome_distribution(&ds, &sel));
    assert_eq!(payload_correlation(&ds, &sel, &r), payload_correlation(&ds, &sel, &r));
    assert_eq!(
        outcome_distribution(&ds, &SiteSelection::All),
        outcome_distribution(&ds, &SiteSelection::All)
    );
}
