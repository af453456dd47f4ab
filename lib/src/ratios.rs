//! Efficiency and per-90 ratios computed from already-windowed sums.
//!
//! Numerators and denominators are summed over the window first and divided
//! afterwards, so every ratio is a rate over the window rather than a mean of
//! per-fixture rates.

use crate::config::{Width, MINUTES_PER_MATCH};
use crate::stats::{COMPOSITES, EFFICIENCIES, PER_90_STATS};
use crate::window::rolling_column;
use itertools::iproduct;
use polars::prelude::*;

/// `num / den`, or 0 when the denominator is zero, negative or null.
///
/// A window with no shots or no expected goals carries no signal, and the
/// model reads that as a neutral 0 rather than a missing value.
pub fn safe_div(num: Expr, den: Expr) -> Expr {
    when(den.clone().gt(lit(0.0)))
        .then(num.fill_null(lit(0.0)) / den)
        .otherwise(lit(0.0))
}

/// `stat / (minutes / 90)`, 0 for players without minutes in the window.
pub fn per_90(stat: Expr, minutes: Expr) -> Expr {
    safe_div(stat, minutes / lit(MINUTES_PER_MATCH))
}

fn composite_exprs(widths: &[Width]) -> Vec<Expr> {
    iproduct!(widths, COMPOSITES)
        .map(|(&width, (name, operands))| {
            operands
                .iter()
                .map(|stat| col(&rolling_column(width, stat)).fill_null(lit(0.0)))
                .reduce(|acc, expr| acc + expr)
                .unwrap_or_else(|| lit(0.0))
                .alias(&rolling_column(width, name))
        })
        .collect()
}

fn ratio_exprs(widths: &[Width]) -> Vec<Expr> {
    let mut exprs = Vec::new();
    for &width in widths {
        let rolled = |stat: &str| col(&rolling_column(width, stat));

        for (name, num, den) in EFFICIENCIES {
            exprs.push(safe_div(rolled(*num), rolled(*den)).alias(&rolling_column(width, name)));
        }
        for stat in PER_90_STATS {
            let name = format!("{stat}_per_90");
            exprs.push(per_90(rolled(*stat), rolled("minutes")).alias(&rolling_column(width, &name)));
        }
    }
    exprs
}

/// Adds composite sums, efficiency ratios and per-90 rates for each width.
/// Expects the rolling player sums for those widths to be present.
pub fn with_ratios(lf: LazyFrame, widths: &[Width]) -> LazyFrame {
    log::trace!("ratios::with_ratios {} windows", widths.len());
    lf.with_columns(composite_exprs(widths))
        .with_columns(ratio_exprs(widths))
}

pub fn ratio_columns(widths: &[Width]) -> Vec<String> {
    let mut names = Vec::new();
    for &width in widths {
        names.extend(COMPOSITES.iter().map(|(name, _)| rolling_column(width, name)));
        names.extend(EFFICIENCIES.iter().map(|(name, _, _)| rolling_column(width, name)));
        names.extend(
            PER_90_STATS
                .iter()
                .map(|stat| rolling_column(width, &format!("{stat}_per_90"))),
        );
    }
    names
}
