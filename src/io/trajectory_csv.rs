use std::path::{Path, PathBuf};

use anyhow::Context;

use crate::model::result::SimulationResult;

/// Write `t,S,I,R` rows with six decimals.
pub fn write_trajectory_csv<W: std::io::Write>(
    writer: W,
    result: &SimulationResult,
) -> anyhow::Result<()> {
    let n = result.t.len();
    anyhow::ensure!(
        result.s.len() == n && result.i.len() == n && result.r.len() == n,
        "trajectory series lengths differ"
    );

    let mut wtr = csv::WriterBuilder::new()
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(writer);
    wtr.write_record(["t", "S", "I", "R"])?;
    for (t, s, i, r) in result.rows() {
        wtr.write_record([
            format!("{:.6}", t),
            format!("{:.6}", s),
            format!("{:.6}", i),
            format!("{:.6}", r),
        ])?;
    }
    wtr.flush().context("flush trajectory csv failed")?;
    Ok(())
}

/// Write `<out_dir>/<run_id>.csv`, creating the directory if needed.
pub fn export_trajectory(
    out_dir: impl AsRef<Path>,
    run_id: &str,
    result: &SimulationResult,
) -> anyhow::Result<PathBuf> {
    std::fs::create_dir_all(out_dir.as_ref()).context("create export dir failed")?;
    let path = out_dir.as_ref().join(format!("{}.csv", run_id));
    let file = std::fs::File::create(&path)
        .with_context(|| format!("create trajectory file failed (path={:?})", path))?;
    write_trajectory_csv(file, result)
        .with_context(|| format!("write trajectory failed (path={:?})", path))?;
    Ok(path)
}
