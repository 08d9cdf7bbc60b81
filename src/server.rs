//! HTTP surface: the page, the layout contract and chart JSON.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{Html, IntoResponse},
    routing::get,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;

use crate::binding::{Dashboard, InputId, Resolved};
use crate::config::Config;
use crate::data::DatasetManifest;
use crate::layout::Layout;
use crate::logging::{log, log_request, obj, v_str, Domain, Level};
use crate::selection::RawSelection;

#[derive(Clone)]
pub struct AppState {
    dashboard: Arc<Dashboard>,
    layout: Arc<Layout>,
    manifest: Option<Arc<DatasetManifest>>,
}

impl AppState {
    pub fn new(dashboard: Dashboard, manifest: Option<DatasetManifest>) -> Self {
        let layout = Layout::for_dataset(dashboard.dataset());
        Self {
            dashboard: Arc::new(dashboard),
            layout: Arc::new(layout),
            manifest: manifest.map(Arc::new),
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(get_index))
        .route("/api/layout", get(get_layout))
        .route("/api/charts", get(get_charts))
        .route("/api/update", get(get_update))
        .route("/api/manifest", get(get_manifest))
        .route("/api/health", get(get_health))
        .with_state(state)
}

pub async fn serve(cfg: &Config, state: AppState) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await?;
    log(
        Level::Info,
        Domain::Server,
        "listening",
        obj(&[
            ("addr", v_str(&cfg.bind_addr())),
            ("msg", v_str(&format!("dashboard at http://{}", cfg.bind_addr()))),
        ]),
    );
    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log(Level::Info, Domain::System, "shutdown", obj(&[]));
    Ok(())
}

async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}

/// Query values arrive as text so a malformed number degrades to an empty
/// chart instead of a rejected request.
#[derive(Debug, Default, Deserialize)]
struct ChartQuery {
    site: Option<String>,
    low: Option<String>,
    high: Option<String>,
    changed: Option<String>,
}

impl ChartQuery {
    fn raw_selection(&self) -> RawSelection {
        RawSelection {
            site: self.site.clone().filter(|s| !s.trim().is_empty()),
            low: self.low.as_deref().and_then(parse_bound),
            high: self.high.as_deref().and_then(parse_bound),
        }
    }

    fn describe(&self) -> String {
        format!(
            "site={} low={} high={} changed={}",
            self.site.as_deref().unwrap_or("-"),
            self.low.as_deref().unwrap_or("-"),
            self.high.as_deref().unwrap_or("-"),
            self.changed.as_deref().unwrap_or("-"),
        )
    }
}

/// Empty means "not given"; anything unparseable becomes NaN and fails validation.
fn parse_bound(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.parse().unwrap_or(f64::NAN))
    }
}

async fn get_index(State(state): State<AppState>) -> impl IntoResponse {
    Html(render_index_html(&state.layout))
}

async fn get_layout(State(state): State<AppState>) -> Json<Layout> {
    Json(state.layout.as_ref().clone())
}

async fn get_charts(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Json<Resolved> {
    log_request("/api/charts", &query.describe());
    Json(state.dashboard.resolve(&query.raw_selection(), &InputId::ALL))
}

async fn get_update(
    State(state): State<AppState>,
    Query(query): Query<ChartQuery>,
) -> Json<Resolved> {
    log_request("/api/update", &query.describe());
    let changed = match query.changed.as_deref() {
        Some(raw) => InputId::parse_list(raw),
        None => InputId::ALL.to_vec(),
    };
    Json(state.dashboard.resolve(&query.raw_selection(), &changed))
}

async fn get_manifest(State(state): State<AppState>) -> impl IntoResponse {
    match &state.manifest {
        Some(m) => (StatusCode::OK, Json(json!(m.as_ref()))),
        None => (StatusCode::NOT_FOUND, Json(json!({"error": "no manifest"}))),
    }
}

async fn get_health() -> Json<serde_json::Value> {
    Json(json!({"status": "ok"}))
}

// =============================================================================
// Page
// =============================================================================

const PAGE_SCRIPT: &str = r#"<script>
(function () {
  const site = document.getElementById('site-dropdown');
  const low = document.getElementById('payload-low');
  const high = document.getElementById('payload-high');

  function el(tag, text) {
    const node = document.createElement(tag);
    if (text !== undefined) node.textContent = text;
    return node;
  }

  function renderPie(target, fig) {
    target.replaceChildren(el('h3', fig.title));
    const total = fig.slices.reduce((acc, s) => acc + s.value, 0);
    const list = el('ul');
    for (const s of fig.slices) {
      const pct = total > 0 ? (100 * s.value / total).toFixed(1) : '0.0';
      list.appendChild(el('li', s.label + ': ' + s.value + ' (' + pct + '%)'));
    }
    target.appendChild(list);
  }

  function renderScatter(target, fig) {
    target.replaceChildren(el('h3', fig.title));
    const table = el('table');
    const head = el('tr');
    for (const h of [fig.x_label, fig.y_label, 'Booster Version Category', 'Launch Site']) {
      head.appendChild(el('th', h));
    }
    table.appendChild(head);
    for (const p of fig.points) {
      const tr = el('tr');
      for (const v of [p.x, p.y, p.group, p.site]) tr.appendChild(el('td', String(v)));
      table.appendChild(tr);
    }
    target.appendChild(table);
  }

  function refresh(changed) {
    const q = new URLSearchParams({
      changed: changed.join(','),
      site: site.value,
      low: low.value,
      high: high.value,
    });
    fetch('/api/update?' + q.toString())
      .then((r) => r.json())
      .then((res) => {
        for (const c of res.charts) {
          const target = document.getElementById(c.output);
          if (c.figure.kind === 'pie') renderPie(target, c.figure);
          else renderScatter(target, c.figure);
        }
      });
  }

  site.addEventListener('change', () => refresh(['site-dropdown']));
  low.addEventListener('change', () => refresh(['payload-slider']));
  high.addEventListener('change', () => refresh(['payload-slider']));
  refresh(['site-dropdown', 'payload-slider']);
})();
</script>"#;

pub fn render_index_html(layout: &Layout) -> String {
    let options: String = layout
        .site_dropdown
        .options
        .iter()
        .map(|o| {
            let selected = if o.value == layout.site_dropdown.value {
                " selected"
            } else {
                ""
            };
            format!(
                "<option value=\"{}\"{}>{}</option>",
                escape_html(&o.value),
                selected,
                escape_html(&o.label)
            )
        })
        .collect();
    let slider = &layout.payload_slider;
    let marks = slider
        .marks
        .iter()
        .map(|m| format!("{}", m))
        .collect::<Vec<_>>()
        .join(" | ");
    let graphs: String = layout
        .graphs
        .iter()
        .map(|g| format!("<div id=\"{}\"></div>", g.as_str()))
        .collect();

    format!(
        "<!doctype html>\n<html><head><meta charset=\"utf-8\"><title>{title}</title></head>\n<body>\n\
         <h1>{title}</h1>\n\
         <select id=\"{dropdown_id}\" aria-label=\"{placeholder}\">{options}</select>\n\
         <p>Payload range (Kg):</p>\n\
         <input id=\"payload-low\" type=\"number\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{low}\">\n\
         <input id=\"payload-high\" type=\"number\" min=\"{min}\" max=\"{max}\" step=\"{step}\" value=\"{high}\">\n\
         <p>{marks}</p>\n\
         {graphs}\n\
         {script}\n\
         </body></html>\n",
        title = escape_html(&layout.title),
        dropdown_id = layout.site_dropdown.id.as_str(),
        placeholder = escape_html(&layout.site_dropdown.placeholder),
        options = options,
        min = slider.min,
        max = slider.max,
        step = slider.step,
        low = slider.value[0],
        high = slider.value[1],
        marks = marks,
        graphs = graphs,
        script = PAGE_SCRIPT,
    )
}

fn escape_html(input: &str) -> String {
    input
        .replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Dataset, Outcome, Row};
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use serde_json::Value;
    use tower::ServiceExt;

    fn app() -> Router {
        let ds = Dataset::from_rows(vec![
            Row::new("CCAFS", 500.0, Outcome::Success, "v1.1"),
            Row::new("CCAFS", 1500.0, Outcome::Failure, "v1.1"),
            Row::new("CCAFS", 2500.0, Outcome::Success, "FT"),
        ])
        .unwrap();
        router(AppState::new(Dashboard::new(Arc::new(ds)), None))
    }

    async fn get_json(uri: &str) -> (StatusCode, Value) {
        let resp = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = resp.status();
        let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn health_is_ok() {
        let (status, body) = get_json("/api/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn charts_default_to_initial_selection() {
        let (status, body) = get_json("/api/charts").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["selection"]["site"], "ALL");
        assert_eq!(body["charts"][0]["output"], "success-pie-chart");
        assert_eq!(body["charts"][0]["figure"]["slices"][0]["value"], 2);
        assert_eq!(body["charts"][1]["figure"]["points"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn inverted_range_returns_empty_scatter() {
        let (status, body) = get_json("/api/charts?site=ALL&low=2000&high=1000").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["selection"].is_null());
        assert!(body["error"].as_str().unwrap().contains("inverted"));
        assert_eq!(body["charts"][1]["figure"]["points"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn non_numeric_bound_degrades() {
        let (status, body) = get_json("/api/charts?low=abc").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["error"].is_string());
    }

    #[tokio::test]
    async fn update_recomputes_only_dependents() {
        let (_, body) = get_json("/api/update?changed=payload-slider&low=1000&high=2000").await;
        let charts = body["charts"].as_array().unwrap();
        assert_eq!(charts.len(), 1);
        assert_eq!(charts[0]["output"], "success-payload-scatter-chart");
        assert_eq!(charts[0]["figure"]["points"][0]["x"], 1500.0);
        assert_eq!(charts[0]["figure"]["points"][0]["y"], 0);
    }

    #[tokio::test]
    async fn layout_lists_sites() {
        let (_, body) = get_json("/api/layout").await;
        assert_eq!(body["site_dropdown"]["options"][1]["value"], "CCAFS");
        assert_eq!(body["payload_slider"]["max"], 10000.0);
    }

    #[tokio::test]
    async fn manifest_missing_is_404() {
        let (status, _) = get_json("/api/manifest").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn index_html_escapes_site_names() {
        let ds = Dataset::from_rows(vec![Row::new("<Pad>", 1.0, Outcome::Success, "FT")]).unwrap();
        let html = render_index_html(&Layout::for_dataset(&ds));
        assert!(html.contains("&lt;Pad&gt;"));
        assert!(html.contains("id=\"success-pie-chart\""));
        assert!(!html.contains("<Pad>"));
    }
}
