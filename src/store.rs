//! Immutable in-memory snapshot of the parsed dataset with lookup indices.
//!
//! Built exactly once; there is no mutation API. A changed dataset means a new
//! [`Store`].

use crate::config::ParseOptions;
use crate::error::LoadError;
use crate::models::Entity;
use crate::parser::{self, ParseReport, ParsedTable};
use ahash::AHashMap;
use log::info;
use std::path::Path;

/// Region name to member ids, in order of first encounter.
#[derive(Debug, Clone, Default)]
pub struct RegionIndex {
    order: Vec<String>,
    members: AHashMap<String, Vec<String>>,
}

impl RegionIndex {
    /// Entities without a region are left out; they cannot be aggregated.
    pub fn build<'a>(entities: impl IntoIterator<Item = &'a Entity>) -> Self {
        let mut idx = RegionIndex::default();
        for e in entities {
            if !e.has_region() {
                continue;
            }
            match idx.members.get_mut(&e.region) {
                Some(ids) => ids.push(e.id.clone()),
                None => {
                    idx.order.push(e.region.clone());
                    idx.members.insert(e.region.clone(), vec![e.id.clone()]);
                }
            }
        }
        idx
    }

    pub fn members(&self, region: &str) -> Option<&[String]> {
        self.members.get(region).map(Vec::as_slice)
    }

    pub fn regions(&self) -> &[String] {
        &self.order
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Read-only view over all entities.
#[derive(Debug, Clone)]
pub struct Store {
    entities: Vec<Entity>,
    by_id: AHashMap<String, usize>,
    regions: RegionIndex,
    years: Vec<i32>,
}

impl Store {
    /// Parse `text` and build the indices. Fails on invalid options or when no
    /// usable table is found.
    pub fn from_text(text: &str, opts: &ParseOptions) -> Result<(Self, ParseReport), LoadError> {
        let (table, report) = parser::parse_text(text, opts)?;
        let store = Self::from_table(table);
        info!(
            "loaded {} entities in {} regions, years {:?} ({} rows dropped, {} uncertain cells)",
            store.len(),
            store.regions.len(),
            store.year_range(),
            report.rows_dropped + report.duplicate_ids,
            report.uncertain_cells
        );
        Ok((store, report))
    }

    /// Read a UTF-8 file and delegate to [`Store::from_text`].
    pub fn from_path<P: AsRef<Path>>(
        path: P,
        opts: &ParseOptions,
    ) -> Result<(Self, ParseReport), LoadError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_text(&text, opts)
    }

    pub fn from_table(table: ParsedTable) -> Self {
        Self::from_entities(table.entities, table.years)
    }

    /// Build from already-normalized entities. Later entities with an id that
    /// is already present are ignored. `years` is sorted and deduplicated.
    pub fn from_entities(entities: Vec<Entity>, mut years: Vec<i32>) -> Self {
        years.sort_unstable();
        years.dedup();
        let mut by_id = AHashMap::with_capacity(entities.len());
        let mut kept = Vec::with_capacity(entities.len());
        for e in entities {
            if by_id.contains_key(&e.id) {
                continue;
            }
            by_id.insert(e.id.clone(), kept.len());
            kept.push(e);
        }
        let regions = RegionIndex::build(&kept);
        Self {
            entities: kept,
            by_id,
            regions,
            years,
        }
    }

    pub fn get_by_id(&self, id: &str) -> Option<&Entity> {
        self.by_id.get(id).map(|&i| &self.entities[i])
    }

    /// Member ids of `region`; empty for an unknown region.
    pub fn region_members(&self, region: &str) -> &[String] {
        self.regions.members(region).unwrap_or(&[])
    }

    pub fn has_region(&self, region: &str) -> bool {
        self.regions.members(region).is_some()
    }

    /// Region names in order of first appearance in the source.
    pub fn list_regions(&self) -> &[String] {
        self.regions.regions()
    }

    pub fn region_index(&self) -> &RegionIndex {
        &self.regions
    }

    /// Years named by the header, ascending.
    pub fn list_years(&self) -> &[i32] {
        &self.years
    }

    pub fn year_range(&self) -> Option<(i32, i32)> {
        Some((*self.years.first()?, *self.years.last()?))
    }

    pub fn region_of(&self, id: &str) -> Option<&str> {
        self.get_by_id(id)
            .filter(|e| e.has_region())
            .map(|e| e.region.as_str())
    }

    /// Entities in source row order.
    pub fn entities(&self) -> &[Entity] {
        &self.entities
    }

    /// Resolved members of `region`.
    pub fn members_of<'a>(&'a self, region: &str) -> impl Iterator<Item = &'a Entity> + 'a {
        self.region_members(region)
            .iter()
            .filter_map(|id| self.get_by_id(id))
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::YearRecord;

    fn store() -> Store {
        Store::from_entities(
            vec![
                Entity::new("AAA", "Alpha", "North"),
                Entity::new("BBB", "Beta", "South"),
                Entity::new("CCC", "Gamma", "North"),
                Entity::new("DDD", "Delta", ""),
                Entity::new("AAA", "Alpha again", "South").with_year(2000, YearRecord::measured(1.0)),
            ],
            vec![2001, 2000, 2001],
        )
    }

    #[test]
    fn regions_keep_first_encounter_order() {
        let s = store();
        assert_eq!(s.list_regions(), ["North".to_string(), "South".to_string()]);
        assert_eq!(s.region_members("North"), ["AAA".to_string(), "CCC".to_string()]);
        assert!(s.region_members("Nowhere").is_empty());
    }

    #[test]
    fn first_id_wins_and_regionless_entities_are_unindexed() {
        let s = store();
        assert_eq!(s.len(), 4);
        assert_eq!(s.get_by_id("AAA").unwrap().name, "Alpha");
        assert_eq!(s.region_members("South"), ["BBB".to_string()]);
        assert!(s.get_by_id("DDD").is_some());
        assert_eq!(s.region_of("DDD"), None);
        assert_eq!(s.region_of("CCC"), Some("North"));
        assert!(s.get_by_id("ZZZ").is_none());
    }

    #[test]
    fn years_sorted_and_deduplicated() {
        let s = store();
        assert_eq!(s.list_years(), [2000, 2001]);
        assert_eq!(s.year_range(), Some((2000, 2001)));
    }
}
