use co2_trends::trend::{STABLE_THRESHOLD, entity_window, region_window, trend};
use co2_trends::{Confidence, ParseOptions, Store, TrendLabel, TrendResult};

#[test]
fn wobbling_series_is_stable() {
    let r = trend(&[2020, 2021, 2022, 2023], &[100.0, 101.0, 100.4, 100.2]);
    assert!((r.slope / 100.4).abs() < STABLE_THRESHOLD);
    assert_eq!(r.label, TrendLabel::Stable);
    assert_eq!(r.confidence, Confidence::High);
}

#[test]
fn steady_growth_is_rising() {
    // ~1% per year
    let r = trend(&[2019, 2020, 2021, 2022], &[10.0, 10.1, 10.2, 10.3]);
    assert_eq!(r.label, TrendLabel::Rising);
    assert!(r.slope > 0.0);

    let r = trend(&[2019, 2020, 2021, 2022], &[10.3, 10.2, 10.1, 10.0]);
    assert_eq!(r.label, TrendLabel::Falling);
}

#[test]
fn threshold_boundary() {
    // slope 0.4 on mean 100 is 0.4% per year
    let r = trend(&[2000, 2001], &[99.8, 100.2]);
    assert_eq!(r.label, TrendLabel::Stable);
    // 0.6% per year
    let r = trend(&[2000, 2001], &[99.7, 100.3]);
    assert_eq!(r.label, TrendLabel::Rising);
    assert_eq!(r.confidence, Confidence::Low);
}

#[test]
fn single_point_is_degenerate() {
    let r = trend(&[2023], &[50.0]);
    assert_eq!(r.slope, 0.0);
    assert_eq!(r.label, TrendLabel::Stable);
    assert_eq!(r.confidence, Confidence::Low);
    assert_eq!(r, TrendResult::DEGENERATE);
}

#[test]
fn repeated_calls_are_bit_identical() {
    let ys = [2020, 2021, 2022, 2023];
    let vs = [3.1, 2.9, 3.3, 3.7];
    let a = trend(&ys, &vs);
    let b = trend(&ys, &vs);
    assert_eq!(a.slope.to_bits(), b.slope.to_bits());
    assert_eq!(a, b);
}

#[test]
fn windows_built_from_the_store() {
    let text = "\
region;code;name;Y_1970;Y_1971;Y_1972;Y_1973;Y_1974
R;AAA;A;1000;1100;0;1300;1400
R;BBB;B;500;500;500;500;500
";
    let (store, _) = Store::from_text(text, &ParseOptions::default()).unwrap();

    // 1971..=1974, 1972 uncertain for AAA
    let w = entity_window(&store, "AAA", 1974);
    assert_eq!(w.years, vec![1971, 1973, 1974]);
    let r = w.estimate();
    assert_eq!(r.label, TrendLabel::Rising);
    assert_eq!(r.confidence, Confidence::Low);

    let w = entity_window(&store, "BBB", 1974);
    assert_eq!(w.len(), 4);
    let r = w.estimate();
    assert_eq!(r.label, TrendLabel::Stable);
    assert_eq!(r.confidence, Confidence::High);

    // clipped at the first year of the dataset
    let w = entity_window(&store, "BBB", 1971);
    assert_eq!(w.years, vec![1970, 1971]);

    let w = region_window(&store, "R", 1974);
    assert_eq!(w.years, vec![1971, 1972, 1973, 1974]);
    assert!((w.values[1] - 0.5).abs() < 1e-12);
}
