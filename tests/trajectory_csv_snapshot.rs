use epicurve::io::export_trajectory;
use epicurve::{ModelState, SimulationResult};

#[test]
fn trajectory_csv_snapshot_small() {
    let mut result = SimulationResult::with_capacity(3);
    result.push(0.0, &ModelState::new(0.99, 0.01, 0.0));
    result.push(0.5, &ModelState::new(0.985, 0.0125, 0.0025));
    result.push(1.0, &ModelState::new(0.978, 0.0155, 0.0065));

    let tmp = tempfile::tempdir().expect("tempdir");
    let path = export_trajectory(tmp.path().join("runs"), "TEST-SMALL", &result)
        .expect("export trajectory");
    assert!(path.ends_with("runs/TEST-SMALL.csv"));

    let s = std::fs::read_to_string(path).expect("read trajectory");
    insta::assert_snapshot!(s.trim_end(), @r"
    t,S,I,R
    0.000000,0.990000,0.010000,0.000000
    0.500000,0.985000,0.012500,0.002500
    1.000000,0.978000,0.015500,0.006500
    ");
}

#[test]
fn mismatched_series_are_rejected() {
    let mut result = SimulationResult::default();
    result.push(0.0, &ModelState::new(1.0, 0.0, 0.0));
    result.i.push(0.5);

    let mut buf = Vec::new();
    assert!(epicurve::io::write_trajectory_csv(&mut buf, &result).is_err());
}
