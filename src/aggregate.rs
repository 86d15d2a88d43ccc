use crate::models::RegionAggregate;
use crate::store::Store;

/// Totals for `region` in `year`.
///
/// Members with no record, or an uncertain record, for `year` are left out of
/// both the sum and the mean. An unknown region, or one with no qualifying
/// member, yields the zero aggregate with `member_count == 0`.
pub fn aggregate(store: &Store, region: &str, year: i32) -> RegionAggregate {
    let mut absolute = 0.0;
    let mut per_capita = 0.0;
    let mut member_count = 0usize;
    for rec in store.members_of(region).filter_map(|e| e.reliable_record(year)) {
        absolute += rec.absolute;
        per_capita += rec.per_capita;
        member_count += 1;
    }
    if member_count > 0 {
        per_capita /= member_count as f64;
    }
    RegionAggregate {
        absolute,
        per_capita,
        member_count,
    }
}

/// Aggregates for every region in index order.
pub fn aggregate_all(store: &Store, year: i32) -> Vec<(String, RegionAggregate)> {
    store
        .list_regions()
        .iter()
        .map(|r| (r.clone(), aggregate(store, r, year)))
        .collect()
}

/// Sum of `absolute` over every entity that has a record for `year`,
/// regions or not. Uncertain records carry zero and so add nothing.
pub fn global_total(store: &Store, year: i32) -> f64 {
    store
        .entities()
        .iter()
        .filter_map(|e| e.record(year))
        .map(|r| r.absolute)
        .sum()
}
