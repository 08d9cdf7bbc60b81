//! Smoke tests over the bundled dataset: the server's startup path end to end,
//! minus the socket.

use std::path::Path;
use std::sync::Arc;

use launchdash::binding::{Dashboard, InputId, OutputId};
use launchdash::data::analyze;
use launchdash::layout::Layout;
use launchdash::selection::RawSelection;

const BUNDLED_CSV: &str = "data/spacex_launch_dash.csv";

fn bundled() -> Option<Dashboard> {
    if !Path::new(BUNDLED_CSV).exists() {
        eprintln!("SKIP: {} not found", BUNDLED_CSV);
        return None;
    }
    let (dataset, _) = analyze(Path::new(BUNDLED_CSV)).expect("bundled dataset loads");
    Some(Dashboard::new(Arc::new(dataset)))
}

#[test]
fn s01_bundled_dataset_loads_with_four_sites() {
    let Some(dash) = bundled() else { return };
    let layout = Layout::for_dataset(dash.dataset());
    assert_eq!(layout.site_dropdown.options.len(), 5);
    assert_eq!(layout.payload_slider.value, [0.0, 9600.0]);
}

#[test]
fn s02_initial_render_produces_both_charts() {
    let Some(dash) = bundled() else { return };
    let charts = dash.render_all(&dash.initial_selection());
    assert_eq!(charts.len(), 2);
    assert_eq!(charts[0].output, OutputId::SuccessPieChart);
    let pie = charts[0].figure.as_pie().unwrap();
    assert_eq!(pie.total(), dash.dataset().success_count() as u64);
    let scatter = charts[1].figure.as_scatter().unwrap();
    assert_eq!(scatter.points.len(), dash.dataset().len());
}

#[test]
fn s03_every_site_round_trips_through_resolve() {
    let Some(dash) = bundled() else { return };
    for site in dash.dataset().sites() {
        let raw = RawSelection::new(&site, 0.0, 10000.0);
        let resolved = dash.resolve(&raw, &InputId::ALL);
        assert!(resolved.error.is_none(), "site {} rejected", site);
        let pie = resolved.charts[0].figure.as_pie().unwrap();
        let rows = dash
            .dataset()
            .rows()
            .iter()
            .filter(|r| r.launch_site == site)
            .count() as u64;
        assert_eq!(pie.total(), rows);
    }
}
