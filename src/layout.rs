//! Page layout contract: which controls exist, their options and bounds.

use serde::Serialize;

use crate::binding::{InputId, OutputId};
use crate::data::Dataset;
use crate::selection::ALL_SITES;

pub const PAGE_TITLE: &str = "SpaceX Launch Records Dashboard";
pub const SLIDER_MIN: f64 = 0.0;
pub const SLIDER_MAX: f64 = 10_000.0;
pub const SLIDER_STEP: f64 = 1_000.0;
pub const SLIDER_MARK_EVERY: f64 = 2_500.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DropdownOption {
    pub label: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dropdown {
    pub id: InputId,
    pub options: Vec<DropdownOption>,
    pub value: String,
    pub placeholder: String,
    pub searchable: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RangeSlider {
    pub id: InputId,
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub marks: Vec<f64>,
    pub value: [f64; 2],
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Layout {
    pub title: String,
    pub site_dropdown: Dropdown,
    pub payload_slider: RangeSlider,
    pub graphs: Vec<OutputId>,
}

impl Layout {
    pub fn for_dataset(dataset: &Dataset) -> Self {
        let mut options = vec![DropdownOption {
            label: "All Sites".to_string(),
            value: ALL_SITES.to_string(),
        }];
        options.extend(dataset.sites().into_iter().map(|s| DropdownOption {
            label: s.clone(),
            value: s,
        }));

        Self {
            title: PAGE_TITLE.to_string(),
            site_dropdown: Dropdown {
                id: InputId::SiteDropdown,
                options,
                value: ALL_SITES.to_string(),
                placeholder: "Select a Launch Site here".to_string(),
                searchable: true,
            },
            payload_slider: RangeSlider {
                id: InputId::PayloadSlider,
                min: SLIDER_MIN,
                max: SLIDER_MAX,
                step: SLIDER_STEP,
                marks: slider_marks(),
                value: [dataset.min_payload(), dataset.max_payload()],
            },
            graphs: vec![OutputId::SuccessPieChart, OutputId::SuccessPayloadScatterChart],
        }
    }
}

fn slider_marks() -> Vec<f64> {
    let count = (SLIDER_MAX / SLIDER_MARK_EVERY) as usize;
    (0..=count).map(|i| SLIDER_MIN + i as f64 * SLIDER_MARK_EVERY).collect()
}
