//! Filter-and-aggregate pipeline feeding the two charts.
//!
//! Both functions are pure: the output depends only on the dataset and the
//! arguments, and category/point order is fixed by dataset order so repeated
//! calls produce identical charts.

use crate::chart::{ChartDescription, PieChart, ScatterChart, ScatterPoint, Slice};
use crate::data::{Dataset, Outcome};
use crate::logging::{v_str, ProfileScope};
use crate::selection::{PayloadRange, SiteSelection};

pub const PIE_TITLE_ALL: &str = "Total Successful Launches by Site";
pub const SCATTER_X_LABEL: &str = "Payload Mass (kg)";
pub const SCATTER_Y_LABEL: &str = "Launch Outcome (1=Success, 0=Failure)";

/// Success counts per site (`ALL`) or success/failure split for one site.
pub fn outcome_distribution(dataset: &Dataset, site: &SiteSelection) -> ChartDescription {
    let _scope = ProfileScope::with_context("outcome_distribution", &[("site", v_str(site.as_str()))]);
    let pie = match site {
        SiteSelection::All => PieChart {
            title: PIE_TITLE_ALL.to_string(),
            slices: successes_by_site(dataset),
        },
        SiteSelection::Site(name) => PieChart {
            title: format!("Total Launch Outcomes for {}", name),
            slices: outcome_counts(dataset, name),
        },
    };
    ChartDescription::Pie(pie)
}

/// One category per site in order of first appearance; zero-success sites stay.
fn successes_by_site(dataset: &Dataset) -> Vec<Slice> {
    let mut slices: Vec<Slice> = Vec::new();
    for row in dataset.rows() {
        let hit = u64::from(row.outcome.as_u8());
        match slices.iter_mut().find(|s| s.label == row.launch_site) {
            Some(slice) => slice.value += hit,
            None => slices.push(Slice {
                label: row.launch_site.clone(),
                value: hit,
            }),
        }
    }
    slices
}

/// Outcome value counts for one site: descending count, ties by first seen.
/// Zero-count outcomes are omitted.
fn outcome_counts(dataset: &Dataset, site: &str) -> Vec<Slice> {
    // (outcome, count) in first-seen order
    let mut seen: Vec<(Outcome, u64)> = Vec::with_capacity(2);
    for row in dataset.rows().iter().filter(|r| r.launch_site == site) {
        match seen.iter_mut().find(|(o, _)| *o == row.outcome) {
            Some((_, count)) => *count += 1,
            None => seen.push((row.outcome, 1)),
        }
    }
    // stable sort keeps first-seen order among equal counts
    seen.sort_by(|a, b| b.1.cmp(&a.1));
    seen.into_iter()
        .map(|(outcome, count)| Slice {
            label: outcome.label().to_string(),
            value: count,
        })
        .collect()
}

/// Payload vs outcome for rows inside `range` (inclusive) at the selected site.
pub fn payload_correlation(
    dataset: &Dataset,
    site: &SiteSelection,
    range: &PayloadRange,
) -> ChartDescription {
    let _scope = ProfileScope::with_context(
        "payload_correlation",
        &[("site", v_str(site.as_str()))],
    );
    let mut groups: Vec<String> = Vec::new();
    let points: Vec<ScatterPoint> = dataset
        .rows()
        .iter()
        .filter(|r| range.contains(r.payload_mass_kg))
        .filter(|r| site.admits(&r.launch_site))
        .map(|r| {
            if !groups.contains(&r.booster_version_category) {
                groups.push(r.booster_version_category.clone());
            }
            ScatterPoint {
                x: r.payload_mass_kg,
                y: r.outcome.as_u8(),
                group: r.booster_version_category.clone(),
                site: r.launch_site.clone(),
            }
        })
        .collect();

    let title = match site {
        SiteSelection::All => "Correlation between Payload and Success for All Sites".to_string(),
        SiteSelection::Site(name) => format!("Correlation between Payload and Success for {}", name),
    };
    ChartDescription::Scatter(ScatterChart {
        title,
        x_label: SCATTER_X_LABEL.to_string(),
        y_label: SCATTER_Y_LABEL.to_string(),
        groups,
        points,
    })
}
