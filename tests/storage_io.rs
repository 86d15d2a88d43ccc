use co2_trends::models::{Entity, YearRecord};
use co2_trends::{Store, storage};
use std::fs;

fn sample(n: usize) -> Store {
    let entity = (0..n).fold(Entity::new("DEU", "Germany", "OECD_Europe"), |e, i| {
        e.with_year(2000 + i as i32, YearRecord::measured(0.8 + i as f64 / 100.0))
    });
    let blank = Entity::new("XKX", "Kosovo", "").with_year(2000, YearRecord::unknown());
    Store::from_entities(vec![entity, blank], (2000..2000 + n as i32).collect())
}

#[test]
fn save_csv_and_json() {
    let store = sample(3);
    let dir = tempfile::tempdir().unwrap();

    let csv_path = dir.path().join("co2_test.csv");
    storage::save_csv(&store, &csv_path).unwrap();
    let csv_txt = fs::read_to_string(&csv_path).unwrap();
    assert!(csv_txt.starts_with("id,name,region,year,"));
    // header + 3 years of DEU + 1 year of XKX
    assert_eq!(csv_txt.lines().count(), 1 + 3 + 1);

    let json_path = dir.path().join("co2_test.json");
    storage::save_json(&store, &json_path).unwrap();
    let json_txt = fs::read_to_string(&json_path).unwrap();
    let v: serde_json::Value = serde_json::from_str(&json_txt).unwrap();
    let entities = v["entities"].as_array().unwrap();
    assert_eq!(entities.len(), 2);
    assert_eq!(entities[0]["type"], "country");
    assert_eq!(entities[0]["years"]["2000"]["uncertainty"], false);
    assert_eq!(entities[1]["years"]["2000"]["perCapita"], 0.0);
    // regionless entity is not part of any grouping
    let regions = v["regions"].as_array().unwrap();
    assert_eq!(regions.len(), 1);
    assert_eq!(regions[0]["members"][0], "DEU");
}

#[test]
fn csv_rows_read_back() {
    let store = sample(2);
    let dir = tempfile::tempdir().unwrap();
    let p = dir.path().join("long.csv");
    storage::save_csv(&store, &p).unwrap();

    let mut rdr = csv::Reader::from_path(&p).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);
    assert_eq!(&rows[0][0], "DEU");
    assert_eq!(&rows[0][3], "2000");
    assert_eq!(&rows[2][0], "XKX");
    assert_eq!(&rows[2][6], "true");
}
