//! Logs a sine and cosine pair over a fixed-step run.
//!
//! Usage: `cargo run --example sine_logger [output path]`

use slotlog::harness::FixedStepHost;
use slotlog::{HostParams, LogResult, SaveDataBlock};
use std::f64::consts::TAU;

fn main() -> LogResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter("slotlog=debug,sine_logger=info")
        .init();

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "sine.dat".to_string());
    let params = HostParams::standard(2, [0.0, 2.0], 0.01, &path, "%10.6f ", 0);
    let mut block = SaveDataBlock::from_params(&params)?;

    // Steps after T_end are dropped by the recorder.
    let summary = FixedStepHost::new(2.5).run(&mut block, |t, port| {
        if let Some(values) = port.values_mut::<f64>() {
            values[0] = (TAU * t).sin();
            values[1] = (TAU * t).cos();
        }
    })?;

    tracing::info!(
        steps = summary.steps,
        rows = summary.drain.map(|d| d.rows).unwrap_or(0),
        path = %path,
        "run complete"
    );
    Ok(())
}
