//! Per-hover query payloads.
//!
//! A [`Sample`] is either one entity's reading for a year or a region's
//! aggregate for a year, each with the trend over its trailing window.

use crate::aggregate::aggregate;
use crate::models::{RegionAggregate, TrendResult, YearRecord};
use crate::store::Store;
use crate::trend::{TrendInput, entity_window, region_window};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Sample {
    Entity(EntitySample),
    Region(RegionSample),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntitySample {
    pub id: String,
    pub name: String,
    pub region: String,
    pub year: i32,
    /// `None` when the source row did not list this year.
    pub record: Option<YearRecord>,
    pub window: TrendInput,
    pub trend: TrendResult,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionSample {
    pub region: String,
    pub year: i32,
    pub aggregate: RegionAggregate,
    pub window: TrendInput,
    pub trend: TrendResult,
}

impl Sample {
    pub fn year(&self) -> i32 {
        match self {
            Sample::Entity(s) => s.year,
            Sample::Region(s) => s.year,
        }
    }

    pub fn trend(&self) -> &TrendResult {
        match self {
            Sample::Entity(s) => &s.trend,
            Sample::Region(s) => &s.trend,
        }
    }

    /// Label to show: the entity name or the region name.
    pub fn display_name(&self) -> &str {
        match self {
            Sample::Entity(s) => &s.name,
            Sample::Region(s) => &s.region,
        }
    }
}

/// Sample for entity `id`; `None` for an unknown id.
pub fn entity_sample(store: &Store, id: &str, year: i32) -> Option<Sample> {
    let entity = store.get_by_id(id)?;
    let window = entity_window(store, id, year);
    let trend = window.estimate();
    Some(Sample::Entity(EntitySample {
        id: entity.id.clone(),
        name: entity.name.clone(),
        region: entity.region.clone(),
        year,
        record: entity.record(year).copied(),
        window,
        trend,
    }))
}

/// Sample for `region`; `None` for a region the index does not know.
pub fn region_sample(store: &Store, region: &str, year: i32) -> Option<Sample> {
    if !store.has_region(region) {
        return None;
    }
    let window = region_window(store, region, year);
    let trend = window.estimate();
    Some(Sample::Region(RegionSample {
        region: region.to_string(),
        year,
        aggregate: aggregate(store, region, year),
        window,
        trend,
    }))
}
