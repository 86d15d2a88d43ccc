use crate::models::Entity;
use crate::store::Store;
use anyhow::{Context, Result};
use csv::WriterBuilder;
use serde::Serialize;
use std::fs::File;
use std::io::Write;
use std::path::Path;

#[derive(Serialize)]
struct RegionGroup<'a> {
    name: &'a str,
    members: &'a [String],
}

#[derive(Serialize)]
struct Snapshot<'a> {
    entities: &'a [Entity],
    regions: Vec<RegionGroup<'a>>,
}

/// Save entities and region groupings as pretty JSON.
pub fn save_json<P: AsRef<Path>>(store: &Store, path: P) -> Result<()> {
    let path = path.as_ref();
    let snapshot = Snapshot {
        entities: store.entities(),
        regions: store
            .list_regions()
            .iter()
            .map(|r| RegionGroup {
                name: r,
                members: store.region_members(r),
            })
            .collect(),
    };
    let mut f = File::create(path).with_context(|| format!("create {}", path.display()))?;
    let s = serde_json::to_string_pretty(&snapshot)?;
    f.write_all(s.as_bytes())?;
    Ok(())
}

/// Save one row per entity-year with header.
pub fn save_csv<P: AsRef<Path>>(store: &Store, path: P) -> Result<()> {
    let path = path.as_ref();
    let mut wtr = WriterBuilder::new()
        .from_path(path)
        .with_context(|| format!("create {}", path.display()))?;
    wtr.serialize(("id", "name", "region", "year", "absolute", "per_capita", "uncertainty"))?;
    for e in store.entities() {
        for (year, r) in &e.years {
            wtr.serialize((
                &e.id,
                &e.name,
                &e.region,
                year,
                r.absolute,
                r.per_capita,
                r.uncertainty,
            ))?;
        }
    }
    wtr.flush()?;
    Ok(())
}
