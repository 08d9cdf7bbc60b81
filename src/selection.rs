//! Selection state driving the two charts.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::data::Dataset;
use crate::error::SelectionError;

/// Wire value of the "every site" choice.
pub const ALL_SITES: &str = "ALL";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum SiteSelection {
    All,
    Site(String),
}

impl SiteSelection {
    pub fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        if trimmed == ALL_SITES {
            SiteSelection::All
        } else {
            SiteSelection::Site(trimmed.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SiteSelection::All => ALL_SITES,
            SiteSelection::Site(s) => s,
        }
    }

    pub fn is_all(&self) -> bool {
        matches!(self, SiteSelection::All)
    }

    /// True when `site` passes this filter.
    pub fn admits(&self, site: &str) -> bool {
        match self {
            SiteSelection::All => true,
            SiteSelection::Site(s) => s == site,
        }
    }
}

impl fmt::Display for SiteSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for SiteSelection {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for SiteSelection {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(SiteSelection::parse(&raw))
    }
}

/// Closed payload interval `[low, high]` with `0 <= low <= high`.
///
/// Construction is the only place the ordering is checked; every
/// `PayloadRange` in circulation is well formed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PayloadRange {
    low: f64,
    high: f64,
}

impl PayloadRange {
    pub fn new(low: f64, high: f64) -> Result<Self, SelectionError> {
        if !low.is_finite() || !high.is_finite() {
            return Err(SelectionError::NonFinite);
        }
        if low < 0.0 {
            return Err(SelectionError::NegativeBound(low));
        }
        if high < 0.0 {
            return Err(SelectionError::NegativeBound(high));
        }
        if low > high {
            return Err(SelectionError::InvertedRange { low, high });
        }
        Ok(Self { low, high })
    }

    /// The full payload span of a dataset.
    pub fn covering(dataset: &Dataset) -> Self {
        Self {
            low: dataset.min_payload(),
            high: dataset.max_payload(),
        }
    }

    pub fn low(&self) -> f64 {
        self.low
    }

    pub fn high(&self) -> f64 {
        self.high
    }

    pub fn contains(&self, payload: f64) -> bool {
        self.low <= payload && payload <= self.high
    }
}

/// A validated `(selected_site, payload_range)` pair.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Selection {
    pub site: SiteSelection,
    pub payload: PayloadRange,
}

/// Selection values as they arrive from the UI, before validation.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct RawSelection {
    #[serde(default)]
    pub site: Option<String>,
    #[serde(default)]
    pub low: Option<f64>,
    #[serde(default)]
    pub high: Option<f64>,
}

impl RawSelection {
    pub fn new(site: &str, low: f64, high: f64) -> Self {
        Self {
            site: Some(site.to_string()),
            low: Some(low),
            high: Some(high),
        }
    }

    /// Checks the raw values against the dataset, filling gaps from `fallback`.
    pub fn validate(&self, dataset: &Dataset, fallback: &Selection) -> Result<Selection, SelectionError> {
        let site = match &self.site {
            Some(raw) => SiteSelection::parse(raw),
            None => fallback.site.clone(),
        };
        if let SiteSelection::Site(name) = &site {
            if !dataset.contains_site(name) {
                return Err(SelectionError::UnknownSite(name.clone()));
            }
        }
        let low = self.low.unwrap_or(fallback.payload.low());
        let high = self.high.unwrap_or(fallback.payload.high());
        let payload = PayloadRange::new(low, high)?;
        Ok(Selection { site, payload })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{Outcome, Row};

    fn dataset() -> Dataset {
        Dataset::from_rows(vec![
            Row::new("CCAFS", 500.0, Outcome::Success, "v1.1"),
            Row::new("VAFB", 2500.0, Outcome::Failure, "FT"),
        ])
        .unwrap()
    }

    #[test]
    fn test_site_parse() {
        assert_eq!(SiteSelection::parse("ALL"), SiteSelection::All);
        assert_eq!(SiteSelection::parse(" VAFB "), SiteSelection::Site("VAFB".into()));
        assert!(SiteSelection::All.admits("anything"));
        assert!(!SiteSelection::Site("VAFB".into()).admits("CCAFS"));
    }

    #[test]
    fn test_range_rejects_inverted() {
        assert_eq!(
            PayloadRange::new(2000.0, 1000.0),
            Err(SelectionError::InvertedRange { low: 2000.0, high: 1000.0 })
        );
        assert_eq!(PayloadRange::new(-1.0, 10.0), Err(SelectionError::NegativeBound(-1.0)));
        assert_eq!(PayloadRange::new(f64::NAN, 10.0), Err(SelectionError::NonFinite));
    }

    #[test]
    fn test_range_is_inclusive() {
        let r = PayloadRange::new(1000.0, 2000.0).unwrap();
        assert!(r.contains(1000.0));
        assert!(r.contains(2000.0));
        assert!(!r.contains(2000.5));
        let point = PayloadRange::new(5.0, 5.0).unwrap();
        assert!(point.contains(5.0));
    }

    #[test]
    fn test_raw_validate_fills_from_fallback() {
        let ds = dataset();
        let fallback = Selection {
            site: SiteSelection::All,
            payload: PayloadRange::covering(&ds),
        };
        let raw = RawSelection {
            site: Some("VAFB".into()),
            low: Some(1000.0),
            high: None,
        };
        let sel = raw.validate(&ds, &fallback).unwrap();
        assert_eq!(sel.site, SiteSelection::Site("VAFB".into()));
        assert_eq!(sel.payload.low(), 1000.0);
        assert_eq!(sel.payload.high(), 2500.0);
    }

    #[test]
    fn test_raw_validate_unknown_site() {
        let ds = dataset();
        let fallback = Selection {
            site: SiteSelection::All,
            payload: PayloadRange::covering(&ds),
        };
        let err = RawSelection::new("KSC", 0.0, 10.0).validate(&ds, &fallback).unwrap_err();
        assert_eq!(err, SelectionError::UnknownSite("KSC".into()));
    }
}
