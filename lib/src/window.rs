//! Windowed sums over per-entity fixture timelines.
//!
//! Every rolling feature is an instance of one primitive: a sum over the rows of
//! a partition that lie between two offsets behind the current row. Training
//! features stop one row short of the current fixture so its own outcome never
//! leaks into them; inference features include the latest completed fixture
//! because they are projected onto the next, unplayed one.

use crate::config::Width;
use itertools::iproduct;
use parse_display::{Display, FromStr};
use polars::prelude::*;

#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, FromStr)]
#[display(style = "lowercase")]
pub enum Mode {
    /// Window ends on the row before the current one.
    Exclusive,
    /// Window ends on the current row.
    Inclusive,
}

impl Mode {
    fn end_offset(self) -> usize {
        match self {
            Mode::Exclusive => 1,
            Mode::Inclusive => 0,
        }
    }
}

/// Window bounds expressed as rows behind the current row, both ends inclusive.
/// `start: None` reaches back to the first row of the partition.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Frame {
    pub start: Option<usize>,
    pub end: usize,
}

impl Frame {
    pub fn new(mode: Mode, width: Width) -> Self {
        let end = mode.end_offset();
        match width {
            Width::Unbounded => Frame { start: None, end },
            // inverted, sums to nothing; config validation rejects it anyway
            Width::Last(0) => Frame {
                start: Some(end),
                end: end + 1,
            },
            Width::Last(n) => Frame {
                start: Some(end + n - 1),
                end,
            },
        }
    }

    fn is_empty(&self) -> bool {
        matches!(self.start, Some(start) if start < self.end)
    }
}

pub fn rolling_column(width: Width, stat: &str) -> String {
    format!("rolling_{width}_{stat}")
}

/// Sum of `stat` over `frame`, evaluated per `partition`. Rows must already be
/// sorted by partition and order keys.
///
/// Unbounded frames are a lagged running total. Bounded frames add the lagged
/// values oldest first, so a trailing window equals the plain sum of its rows
/// with no error carried in from earlier fixtures. Nulls count as 0.
pub fn windowed_sum(stat: &str, partition: &[&str], frame: Frame) -> Expr {
    if frame.is_empty() {
        return lit(0.0);
    }

    let value = col(stat).cast(DataType::Float64).fill_null(lit(0.0));
    let sum = match frame.start {
        Some(start) => (frame.end..=start)
            .rev()
            .map(|rows| lagged(value.clone(), rows))
            .reduce(|acc, expr| acc + expr)
            .unwrap_or_else(|| lit(0.0)),
        None => lagged(value.cum_sum(false), frame.end),
    };

    let partition: Vec<Expr> = partition.iter().map(|c| col(c)).collect();
    sum.over(partition)
}

fn lagged(expr: Expr, rows: usize) -> Expr {
    if rows == 0 {
        return expr;
    }
    expr.shift(lit(rows as i64)).fill_null(lit(0.0))
}

/// Adds a `rolling_{width}_{stat}` column for every width and statistic.
pub fn rolling_sums(
    lf: LazyFrame,
    partition: &[&str],
    order: &[&str],
    stats: &[&str],
    widths: &[Width],
    mode: Mode,
) -> LazyFrame {
    log::trace!("window::rolling_sums {mode} {} stats", stats.len());

    let sort_by: Vec<&str> = partition.iter().chain(order).copied().collect();
    let columns: Vec<Expr> = iproduct!(widths, stats)
        .map(|(&width, stat)| {
            windowed_sum(stat, partition, Frame::new(mode, width))
                .alias(&rolling_column(width, stat))
        })
        .collect();

    lf.sort(sort_by, SortMultipleOptions::default())
        .with_columns(columns)
}

pub fn rolling_columns(stats: &[&str], widths: &[Width]) -> Vec<String> {
    iproduct!(widths, stats)
        .map(|(&width, stat)| rolling_column(width, stat))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Result;

    const PARTITION: [&str; 2] = ["player_id", "season"];
    const ORDER: [&str; 2] = ["game_week", "fix_id"];

    fn timeline() -> Result<DataFrame> {
        let df = df!(
            "player_id" => &[7i64, 7, 7, 7, 7],
            "season" => &["2023-24"; 5],
            "game_week" => &[1i64, 2, 3, 4, 5],
            "fix_id" => &[1i64, 2, 3, 4, 5],
            "goals" => &[Some(1.0), Some(2.0), Some(3.0), Some(4.0), Some(5.0)],
        )?;
        Ok(df)
    }

    fn rolled(df: DataFrame, mode: Mode) -> Result<DataFrame> {
        let widths = [Width::Unbounded, Width::Last(3)];
        let df = rolling_sums(df.lazy(), &PARTITION, &ORDER, &["goals"], &widths, mode).collect()?;
        Ok(df)
    }

    fn values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
        Ok(df.column(name)?.f64()?.into_no_null_iter().collect())
    }

    #[test]
    fn frames_for_each_mode() {
        assert_eq!(
            Frame::new(Mode::Exclusive, Width::Last(3)),
            Frame { start: Some(3), end: 1 }
        );
        assert_eq!(
            Frame::new(Mode::Inclusive, Width::Last(3)),
            Frame { start: Some(2), end: 0 }
        );
        assert_eq!(
            Frame::new(Mode::Exclusive, Width::Unbounded),
            Frame { start: None, end: 1 }
        );
        assert!(Frame::new(Mode::Exclusive, Width::Last(0)).is_empty());
        assert!(Frame::new(Mode::Inclusive, Width::Last(0)).is_empty());
        assert!(!Frame::new(Mode::Inclusive, Width::Last(1)).is_empty());
    }

    #[test]
    fn exclusive_sums_never_see_the_current_row() -> Result<()> {
        let df = rolled(timeline()?, Mode::Exclusive)?;

        let unbounded = values(&df, "rolling_ub_goals")?;
        assert_eq!(unbounded, vec![0.0, 1.0, 3.0, 6.0, 10.0]);
        // third fixture sees 1 + 2, never its own 3
        assert_eq!(unbounded[2], 3.0);

        let last_3 = values(&df, "rolling_3_goals")?;
        assert_eq!(last_3, vec![0.0, 1.0, 3.0, 6.0, 9.0]);
        Ok(())
    }

    #[test]
    fn partial_windows_sum_available_rows() -> Result<()> {
        let df = rolled(timeline()?, Mode::Exclusive)?;
        let last_3 = values(&df, "rolling_3_goals")?;
        // second fixture: exactly one prior row
        assert_eq!(last_3[1], 1.0);
        assert_eq!(last_3[0], 0.0);
        Ok(())
    }

    #[test]
    fn inclusive_is_exclusive_plus_current_row() -> Result<()> {
        let exclusive = rolled(timeline()?, Mode::Exclusive)?;
        let inclusive = rolled(timeline()?, Mode::Inclusive)?;
        let raw = values(&exclusive, "goals")?;

        let ex = values(&exclusive, "rolling_ub_goals")?;
        let inc = values(&inclusive, "rolling_ub_goals")?;
        for i in 0..raw.len() {
            assert_eq!(inc[i], ex[i] + raw[i], "rolling_ub_goals row {i}");
        }

        // a full trailing window also drops the row that falls out of it
        let ex = values(&exclusive, "rolling_3_goals")?;
        let inc = values(&inclusive, "rolling_3_goals")?;
        for i in 0..raw.len() {
            let dropped = i.checked_sub(3).map_or(0.0, |j| raw[j]);
            assert_eq!(inc[i], ex[i] + raw[i] - dropped, "rolling_3_goals row {i}");
        }
        assert_eq!(inc[3], 9.0);
        assert_eq!(inc[4], 12.0);
        assert_eq!(values(&inclusive, "rolling_ub_goals")?[4], 15.0);
        Ok(())
    }

    #[test]
    fn trailing_sums_match_a_direct_sum_of_the_window() -> Result<()> {
        let xg = [0.7, 0.1, 0.2, 0.3, 0.1, 0.1, 0.1, 0.4, 0.2];
        let n = xg.len();
        let df = df!(
            "player_id" => vec![7i64; n],
            "season" => vec!["2023-24"; n],
            "game_week" => (1..=n as i64).collect::<Vec<_>>(),
            "fix_id" => (1..=n as i64).collect::<Vec<_>>(),
            "xg" => &xg,
        )?;
        let df = rolling_sums(
            df.lazy(),
            &PARTITION,
            &ORDER,
            &["xg"],
            &[Width::Last(3)],
            Mode::Inclusive,
        )
        .collect()?;

        let rolled = values(&df, "rolling_3_xg")?;
        for i in 0..n {
            let expected = xg[i.saturating_sub(2)..=i].iter().fold(0.0, |acc, x| acc + x);
            assert_eq!(rolled[i], expected, "row {i}");
        }
        Ok(())
    }

    #[test]
    fn sums_reset_at_season_boundary() -> Result<()> {
        let df = df!(
            "player_id" => &[7i64, 7, 7, 7],
            "season" => &["2022-23", "2022-23", "2023-24", "2023-24"],
            "game_week" => &[37i64, 38, 1, 2],
            "fix_id" => &[1i64, 2, 3, 4],
            "goals" => &[2.0, 3.0, 1.0, 1.0],
        )?;
        let df = rolled(df, Mode::Exclusive)?;

        assert_eq!(values(&df, "rolling_ub_goals")?, vec![0.0, 2.0, 0.0, 1.0]);
        assert_eq!(values(&df, "rolling_3_goals")?, vec![0.0, 2.0, 0.0, 1.0]);
        Ok(())
    }

    #[test]
    fn partitions_are_independent_and_unsorted_input_is_ordered() -> Result<()> {
        let df = df!(
            "player_id" => &[8i64, 7, 8, 7],
            "season" => &["2023-24"; 4],
            "game_week" => &[2i64, 2, 1, 1],
            "fix_id" => &[12i64, 12, 11, 11],
            "goals" => &[10.0, 1.0, 20.0, 2.0],
        )?;
        let df = rolled(df, Mode::Inclusive)?;

        let players: Vec<i64> = df.column("player_id")?.i64()?.into_no_null_iter().collect();
        assert_eq!(players, vec![7, 7, 8, 8]);
        assert_eq!(values(&df, "rolling_ub_goals")?, vec![2.0, 3.0, 20.0, 30.0]);
        Ok(())
    }

    #[test]
    fn null_statistics_do_not_poison_sums() -> Result<()> {
        let df = df!(
            "player_id" => &[7i64, 7, 7],
            "season" => &["2023-24"; 3],
            "game_week" => &[1i64, 2, 3],
            "fix_id" => &[1i64, 2, 3],
            "goals" => &[Some(1.0), None, Some(2.0)],
        )?;
        let df = rolled(df, Mode::Inclusive)?;
        assert_eq!(values(&df, "rolling_ub_goals")?, vec![1.0, 1.0, 3.0]);
        Ok(())
    }

    #[test]
    fn double_gameweek_orders_by_fixture() -> Result<()> {
        let df = df!(
            "player_id" => &[7i64, 7, 7],
            "season" => &["2023-24"; 3],
            "game_week" => &[1i64, 2, 2],
            "fix_id" => &[1i64, 9, 5],
            "goals" => &[1.0, 4.0, 2.0],
        )?;
        let df = rolled(df, Mode::Exclusive)?;
        let fixtures: Vec<i64> = df.column("fix_id")?.i64()?.into_no_null_iter().collect();
        assert_eq!(fixtures, vec![1, 5, 9]);
        assert_eq!(values(&df, "rolling_ub_goals")?, vec![0.0, 1.0, 3.0]);
        Ok(())
    }

    #[test]
    fn column_names_follow_width_labels() {
        let names = rolling_columns(&["minutes", "goals"], &[Width::Unbounded, Width::Last(6)]);
        assert_eq!(
            names,
            vec![
                "rolling_ub_minutes",
                "rolling_ub_goals",
                "rolling_6_minutes",
                "rolling_6_goals"
            ]
        );
    }
}
