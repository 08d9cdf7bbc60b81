//! Reactive binding layer.
//!
//! An explicit table maps sets of named inputs to pure chart handlers and
//! named outputs. The table is built once at startup; a change to one input
//! recomputes only the outputs subscribed to it.

use serde::Serialize;
use serde_json::json;
use std::sync::Arc;

use crate::chart::ChartDescription;
use crate::data::Dataset;
use crate::error::SelectionError;
use crate::logging::{log, log_selection_rejected, obj, Domain, Level};
use crate::pipeline::{outcome_distribution, payload_correlation};
use crate::selection::{PayloadRange, RawSelection, Selection, SiteSelection};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum InputId {
    #[serde(rename = "site-dropdown")]
    SiteDropdown,
    #[serde(rename = "payload-slider")]
    PayloadSlider,
}

impl InputId {
    pub const ALL: [InputId; 2] = [InputId::SiteDropdown, InputId::PayloadSlider];

    pub fn as_str(&self) -> &'static str {
        match self {
            InputId::SiteDropdown => "site-dropdown",
            InputId::PayloadSlider => "payload-slider",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|id| id.as_str() == raw.trim())
    }

    /// Parses a comma-separated list, skipping unknown names.
    pub fn parse_list(raw: &str) -> Vec<Self> {
        let mut ids = Vec::new();
        for id in raw.split(',').filter_map(Self::parse) {
            if !ids.contains(&id) {
                ids.push(id);
            }
        }
        ids
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum OutputId {
    #[serde(rename = "success-pie-chart")]
    SuccessPieChart,
    #[serde(rename = "success-payload-scatter-chart")]
    SuccessPayloadScatterChart,
}

impl OutputId {
    pub fn as_str(&self) -> &'static str {
        match self {
            OutputId::SuccessPieChart => "success-pie-chart",
            OutputId::SuccessPayloadScatterChart => "success-payload-scatter-chart",
        }
    }
}

pub type Handler = fn(&Dataset, &Selection) -> ChartDescription;

pub struct Binding {
    pub output: OutputId,
    pub inputs: &'static [InputId],
    pub handler: Handler,
}

impl Binding {
    pub fn depends_on(&self, input: InputId) -> bool {
        self.inputs.contains(&input)
    }
}

fn pie_handler(dataset: &Dataset, selection: &Selection) -> ChartDescription {
    outcome_distribution(dataset, &selection.site)
}

fn scatter_handler(dataset: &Dataset, selection: &Selection) -> ChartDescription {
    payload_correlation(dataset, &selection.site, &selection.payload)
}

pub struct BindingTable {
    bindings: Vec<Binding>,
}

impl BindingTable {
    pub fn new(bindings: Vec<Binding>) -> Self {
        Self { bindings }
    }

    /// Pie depends on the site only; scatter on site and payload range.
    pub fn standard() -> Self {
        Self::new(vec![
            Binding {
                output: OutputId::SuccessPieChart,
                inputs: &[InputId::SiteDropdown],
                handler: pie_handler,
            },
            Binding {
                output: OutputId::SuccessPayloadScatterChart,
                inputs: &[InputId::SiteDropdown, InputId::PayloadSlider],
                handler: scatter_handler,
            },
        ])
    }

    pub fn bindings(&self) -> &[Binding] {
        &self.bindings
    }

    /// Bindings subscribed to any of `changed`, in table order.
    pub fn dependents<'a>(&'a self, changed: &'a [InputId]) -> impl Iterator<Item = &'a Binding> + 'a {
        self.bindings
            .iter()
            .filter(move |b| changed.iter().any(|id| b.depends_on(*id)))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartUpdate {
    pub output: OutputId,
    pub figure: ChartDescription,
}

/// Charts produced for one UI interaction.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Resolved {
    pub selection: Option<Selection>,
    pub error: Option<String>,
    pub charts: Vec<ChartUpdate>,
}

pub struct Dashboard {
    dataset: Arc<Dataset>,
    table: BindingTable,
    initial: Selection,
}

impl Dashboard {
    pub fn new(dataset: Arc<Dataset>) -> Self {
        Self::with_table(dataset, BindingTable::standard())
    }

    pub fn with_table(dataset: Arc<Dataset>, table: BindingTable) -> Self {
        let initial = Selection {
            site: SiteSelection::All,
            payload: PayloadRange::covering(&dataset),
        };
        Self {
            dataset,
            table,
            initial,
        }
    }

    pub fn dataset(&self) -> &Dataset {
        &self.dataset
    }

    pub fn table(&self) -> &BindingTable {
        &self.table
    }

    /// `ALL` sites over `[min_payload, max_payload]`.
    pub fn initial_selection(&self) -> Selection {
        self.initial.clone()
    }

    pub fn validate(&self, raw: &RawSelection) -> Result<Selection, SelectionError> {
        raw.validate(&self.dataset, &self.initial)
    }

    pub fn render_all(&self, selection: &Selection) -> Vec<ChartUpdate> {
        self.on_change(selection, &InputId::ALL)
    }

    pub fn on_change(&self, selection: &Selection, changed: &[InputId]) -> Vec<ChartUpdate> {
        let updates: Vec<ChartUpdate> = self
            .table
            .dependents(changed)
            .map(|b| ChartUpdate {
                output: b.output,
                figure: (b.handler)(&self.dataset, selection),
            })
            .collect();
        log(
            Level::Debug,
            Domain::Binding,
            "recompute",
            obj(&[
                ("site", json!(selection.site.as_str())),
                (
                    "changed",
                    json!(changed.iter().map(|c| c.as_str()).collect::<Vec<_>>()),
                ),
                (
                    "outputs",
                    json!(updates.iter().map(|u| u.output.as_str()).collect::<Vec<_>>()),
                ),
            ]),
        );
        updates
    }

    /// Validates and recomputes; an invalid selection yields empty charts,
    /// never an error.
    pub fn resolve(&self, raw: &RawSelection, changed: &[InputId]) -> Resolved {
        match self.validate(raw) {
            Ok(selection) => {
                let charts = self.on_change(&selection, changed);
                Resolved {
                    selection: Some(selection),
                    error: None,
                    charts,
                }
            }
            Err(err) => {
                let site = raw
                    .site
                    .as_deref()
                    .map(SiteSelection::parse)
                    .unwrap_or_else(|| self.initial.site.clone());
                log_selection_rejected(
                    site.as_str(),
                    raw.low.unwrap_or(self.initial.payload.low()),
                    raw.high.unwrap_or(self.initial.payload.high()),
                    &err.to_string(),
                );
                // titles follow the requested site; the range is irrelevant once emptied
                let placeholder = Selection {
                    site,
                    payload: self.initial.payload,
                };
                let charts = self
                    .table
                    .dependents(changed)
                    .map(|b| ChartUpdate {
                        output: b.output,
                        figure: (b.handler)(&self.dataset, &placeholder).emptied(),
                    })
                    .collect();
                Resolved {
                    selection: None,
                    error: Some(err.to_string()),
                    charts,
                }
            }
        }
    }
}
