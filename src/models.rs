use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Normalized measurement for one entity in one calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct YearRecord {
    /// Emission mass in gigatonnes.
    pub absolute: f64,
    /// Emission mass per person in tonnes.
    ///
    /// Always `0.0`: no population source is wired into ingestion. The field is
    /// reserved for a population-weighted mode.
    #[serde(rename = "perCapita")]
    pub per_capita: f64,
    /// Source cell was absent, non-numeric, or exactly zero.
    pub uncertainty: bool,
}

impl YearRecord {
    /// Record for a cell that parsed to `absolute` gigatonnes.
    /// Zero is never trusted, so a zero value is flagged uncertain.
    pub fn measured(absolute: f64) -> Self {
        Self {
            absolute,
            per_capita: 0.0,
            uncertainty: absolute == 0.0,
        }
    }

    /// Zero-filled record for a cell that could not be used.
    pub fn unknown() -> Self {
        Self {
            absolute: 0.0,
            per_capita: 0.0,
            uncertainty: true,
        }
    }

    /// Usable as input to aggregation and trend estimation.
    #[inline]
    pub fn is_reliable(&self) -> bool {
        !self.uncertainty
    }
}

/// What an [`Entity`] stands for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EntityKind {
    /// One country row of the source table (the only kind ingestion produces).
    #[default]
    Country,
    /// Reserved for region-level entities; never materialized at ingestion.
    Continent,
}

/// One country of the dataset with its sparse yearly series.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    /// Alpha-3 style code, unique across the dataset.
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: EntityKind,
    /// Grouping key for region aggregates. Empty means "no region".
    pub region: String,
    /// Only years the source row actually listed are present.
    pub years: BTreeMap<i32, YearRecord>,
}

impl Entity {
    pub fn new(id: impl Into<String>, name: impl Into<String>, region: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            kind: EntityKind::Country,
            region: region.into(),
            years: BTreeMap::new(),
        }
    }

    /// Builder-style insert, handy for constructing fixtures.
    pub fn with_year(mut self, year: i32, record: YearRecord) -> Self {
        self.years.insert(year, record);
        self
    }

    pub fn record(&self, year: i32) -> Option<&YearRecord> {
        self.years.get(&year)
    }

    /// The record for `year` only if it is not flagged uncertain.
    pub fn reliable_record(&self, year: i32) -> Option<&YearRecord> {
        self.record(year).filter(|r| r.is_reliable())
    }

    pub fn has_region(&self) -> bool {
        !self.region.is_empty()
    }
}

/// Region-level totals for one `(region, year)` query. Computed fresh each time.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, Default)]
pub struct RegionAggregate {
    /// Sum of included members' `absolute`.
    pub absolute: f64,
    /// Mean of included members' `per_capita`.
    #[serde(rename = "perCapita")]
    pub per_capita: f64,
    /// Members that contributed. Zero means "no data", not "zero emissions".
    #[serde(rename = "memberCount")]
    pub member_count: usize,
}

impl RegionAggregate {
    pub fn has_data(&self) -> bool {
        self.member_count > 0
    }
}

/// Direction of a short-horizon emission trend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrendLabel {
    Rising,
    Falling,
    Stable,
}

impl TrendLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            TrendLabel::Rising => "rising",
            TrendLabel::Falling => "falling",
            TrendLabel::Stable => "stable",
        }
    }
}

/// Whether the full trailing window was available to the regression.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Confidence {
    High,
    Low,
}

impl Confidence {
    pub fn as_str(&self) -> &'static str {
        match self {
            Confidence::High => "high",
            Confidence::Low => "low",
        }
    }
}

/// Output of the trend estimator.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrendResult {
    /// Least-squares slope in gigatonnes per year.
    pub slope: f64,
    #[serde(rename = "trendLabel")]
    pub label: TrendLabel,
    pub confidence: Confidence,
}

impl TrendResult {
    /// Neutral result for inputs too short or mismatched to regress.
    pub const DEGENERATE: TrendResult = TrendResult {
        slope: 0.0,
        label: TrendLabel::Stable,
        confidence: Confidence::Low,
    };
}
