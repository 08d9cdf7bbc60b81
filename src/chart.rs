//! Renderer-agnostic chart descriptions returned by the pipeline.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub label: String,
    pub value: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PieChart {
    pub title: String,
    pub slices: Vec<Slice>,
}

impl PieChart {
    pub fn total(&self) -> u64 {
        self.slices.iter().map(|s| s.value).sum()
    }

    pub fn value_of(&self, label: &str) -> Option<u64> {
        self.slices.iter().find(|s| s.label == label).map(|s| s.value)
    }
}

/// One launch plotted as payload against outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterPoint {
    pub x: f64,
    pub y: u8,
    /// Color key: booster version category.
    pub group: String,
    /// Hover metadata: launch site.
    pub site: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScatterChart {
    pub title: String,
    pub x_label: String,
    pub y_label: String,
    /// Distinct `group` values in first-seen order.
    pub groups: Vec<String>,
    pub points: Vec<ScatterPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartDescription {
    Pie(PieChart),
    Scatter(ScatterChart),
}

impl ChartDescription {
    pub fn title(&self) -> &str {
        match self {
            ChartDescription::Pie(p) => &p.title,
            ChartDescription::Scatter(s) => &s.title,
        }
    }

    /// Number of slices or points.
    pub fn len(&self) -> usize {
        match self {
            ChartDescription::Pie(p) => p.slices.len(),
            ChartDescription::Scatter(s) => s.points.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Same chart with its data removed, title kept.
    pub fn emptied(&self) -> Self {
        match self {
            ChartDescription::Pie(p) => ChartDescription::Pie(PieChart {
                title: p.title.clone(),
                slices: Vec::new(),
            }),
            ChartDescription::Scatter(s) => ChartDescription::Scatter(ScatterChart {
                title: s.title.clone(),
                x_label: s.x_label.clone(),
                y_label: s.y_label.clone(),
                groups: Vec::new(),
                points: Vec::new(),
            }),
        }
    }

    pub fn as_pie(&self) -> Option<&PieChart> {
        match self {
            ChartDescription::Pie(p) => Some(p),
            _ => None,
        }
    }

    pub fn as_scatter(&self) -> Option<&ScatterChart> {
        match self {
            ChartDescription::Scatter(s) => Some(s),
            _ => None,
        }
    }
}
