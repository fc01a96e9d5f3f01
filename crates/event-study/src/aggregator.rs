use core_types::ConfidencePolicy;
use polars::prelude::*;

use crate::error::StudyError;
use crate::report::{CarPoint, OffsetStats};

/// Critical value for the ~95% normal-approximation band.
const Z_95: f64 = 1.96;

/// Per-offset summary statistics over aligned window rows.
///
/// Mean, median, and standard deviation skip null returns; `n` counts the
/// non-null sample. The SE denominator clamps the count to 1 so an empty or
/// singleton offset reports SE 0 instead of NaN.
pub fn per_offset_stats(rows: &DataFrame) -> Result<Vec<OffsetStats>, StudyError> {
    if rows.height() == 0 {
        return Ok(Vec::new());
    }

    let grouped = rows
        .clone()
        .lazy()
        .group_by([col("rel_day")])
        .agg([
            col("logret").mean().alias("mean"),
            col("logret").median().alias("median"),
            col("logret").is_not_null().sum().alias("n"),
            col("logret").std(1).alias("sd"),
        ])
        .collect()?
        .sort(["rel_day"], vec![false], false)?;

    let rel_days = grouped.column("rel_day")?.i32()?;
    let means = grouped.column("mean")?.f64()?;
    let medians = grouped.column("median")?.f64()?;
    let ns = grouped.column("n")?.u32()?;
    let sds = grouped.column("sd")?.f64()?;

    let mut out = Vec::with_capacity(grouped.height());
    for i in 0..grouped.height() {
        let n = ns.get(i).unwrap_or(0);
        let std_dev = sds.get(i).unwrap_or(0.0);
        out.push(OffsetStats {
            rel_day: rel_days.get(i).unwrap_or(0),
            mean: means.get(i).unwrap_or(0.0),
            median: medians.get(i).unwrap_or(0.0),
            n,
            std_dev,
            std_err: std_dev / (n.max(1) as f64).sqrt(),
        });
    }
    Ok(out)
}

/// Builds the CAR series from per-offset stats already sorted ascending.
///
/// CAR is the running prefix sum of per-offset means, starting from the
/// most negative offset. The band depends on the policy:
/// `Naive` prefix-sums the `mean ± z·SE` series separately; `Propagated`
/// accumulates SE² and widens around CAR itself.
pub fn car_series(stats: &[OffsetStats], policy: ConfidencePolicy) -> Vec<CarPoint> {
    let mut car = 0.0;
    let mut lower_acc = 0.0;
    let mut upper_acc = 0.0;
    let mut var_acc = 0.0;

    let mut out = Vec::with_capacity(stats.len());
    for s in stats {
        car += s.mean;
        let (lower, upper) = match policy {
            ConfidencePolicy::Naive => {
                lower_acc += s.mean - Z_95 * s.std_err;
                upper_acc += s.mean + Z_95 * s.std_err;
                (lower_acc, upper_acc)
            }
            ConfidencePolicy::Propagated => {
                var_acc += s.std_err * s.std_err;
                let half_width = Z_95 * var_acc.sqrt();
                (car - half_width, car + half_width)
            }
        };
        out.push(CarPoint {
            rel_day: s.rel_day,
            car,
            lower,
            upper,
            n: s.n,
            car_pct: car.exp_m1(),
        });
    }
    out
}
