//! Player-to-team membership intervals.
//!
//! A tenure is a run of consecutive appearances for one team. The latest run of
//! each player stays open (`end_date` null) because it extends through the most
//! recent fixture we know about.

use crate::{error::Error, fixtures::Fixtures, Result};
use derive_deref::Deref;
use polars::prelude::*;

#[derive(Clone, Deref)]
pub struct Tenures(DataFrame);

impl Tenures {
    /// Wraps an existing tenure table, rejecting overlapping intervals.
    pub fn new(df: DataFrame) -> Result<Self> {
        let df = crate::cast_columns(
            df,
            &[
                ("player_id", DataType::Int64),
                ("team_id", DataType::Int64),
                ("start_date", DataType::Date),
                ("end_date", DataType::Date),
            ],
        )?;
        let tenures = Tenures(df);
        tenures.validate()?;
        Ok(tenures)
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Self::new(df)
    }

    pub fn lazy(&self) -> LazyFrame {
        self.0.clone().lazy()
    }

    /// Builds tenures from observed appearances (`player_id`, `team_id`, `fix_id`).
    pub fn derive(appearances: DataFrame, fixtures: &Fixtures) -> Result<Self> {
        log::trace!("tenure::derive");
        let player = || [col("player_id")];

        let dates = fixtures.lazy().select([col("fix_id"), col("game_date")]);
        let df = appearances
            .lazy()
            .with_columns([
                col("player_id").cast(DataType::Int64),
                col("team_id").cast(DataType::Int64),
                col("fix_id").cast(DataType::Int64),
            ])
            .join(dates, [col("fix_id")], [col("fix_id")], JoinArgs::new(JoinType::Inner))
            .sort(["player_id", "game_date"], SortMultipleOptions::default())
            .with_column(
                col("team_id")
                    .neq_missing(col("team_id").shift(lit(1i64)))
                    .over(player())
                    .alias("new_spell"),
            )
            .with_column(
                col("new_spell")
                    .cast(DataType::UInt32)
                    .cum_sum(false)
                    .over(player())
                    .alias("spell"),
            )
            .group_by_stable([col("player_id"), col("spell")])
            .agg([
                col("team_id").first(),
                col("game_date").min().alias("start_date"),
                col("game_date").max().alias("end_date"),
            ])
            .with_column(
                when(col("spell").eq(col("spell").max().over(player())))
                    .then(lit(NULL).cast(DataType::Date))
                    .otherwise(col("end_date"))
                    .alias("end_date"),
            )
            .select([
                col("player_id"),
                col("team_id"),
                col("start_date"),
                col("end_date"),
            ])
            .sort(["player_id", "start_date"], SortMultipleOptions::default())
            .collect()?;

        log::debug!("{} tenures derived", df.height());
        Self::new(df)
    }

    /// Fails with the offending player ids when any two intervals of a player
    /// overlap. An open interval overlaps everything that starts after it.
    pub fn validate(&self) -> Result<()> {
        let player = || [col("player_id")];
        let overlapping = self
            .lazy()
            .sort(["player_id", "start_date"], SortMultipleOptions::default())
            .with_columns([
                col("start_date")
                    .shift(lit(1i64))
                    .over(player())
                    .alias("prev_start"),
                col("end_date")
                    .shift(lit(1i64))
                    .over(player())
                    .alias("prev_end"),
            ])
            .filter(
                col("prev_start").is_not_null().and(
                    col("prev_end")
                        .is_null()
                        .or(col("prev_end").gt_eq(col("start_date"))),
                ),
            )
            .select([col("player_id")])
            .unique_stable(None, UniqueKeepStrategy::First)
            .collect()?;

        if overlapping.height() == 0 {
            Ok(())
        } else {
            let players = crate::format_keys(&overlapping, &["player_id"])?;
            Err(Error::OverlappingTenures(players))
        }
    }

    /// Adds the covering tenure's `team_id` to every event row. Events need
    /// `player_id`, `fix_id` and `game_date`; each must match exactly one tenure.
    pub fn attribute(&self, events: DataFrame) -> Result<DataFrame> {
        log::trace!("tenure::attribute");
        let keys = ["player_id", "fix_id"];
        let key_exprs = || [col("player_id"), col("fix_id")];

        let covered = col("game_date").is_between(
            col("start_date"),
            col("end_date").fill_null(col("game_date")),
            ClosedInterval::Both,
        );
        let resolved = events
            .clone()
            .lazy()
            .select([col("player_id"), col("fix_id"), col("game_date")])
            .join(
                self.lazy(),
                [col("player_id")],
                [col("player_id")],
                JoinArgs::new(JoinType::Inner),
            )
            .filter(covered)
            .select([col("player_id"), col("fix_id"), col("team_id")])
            .collect()?;

        let ambiguous = crate::duplicate_keys(&resolved, &keys)?;
        if !ambiguous.is_empty() {
            return Err(Error::AmbiguousTenure(ambiguous));
        }

        let attributed = events
            .lazy()
            .join(
                resolved.lazy(),
                key_exprs(),
                key_exprs(),
                JoinArgs::new(JoinType::Left),
            )
            .collect()?;

        let missing = attributed
            .clone()
            .lazy()
            .filter(col("team_id").is_null())
            .select(key_exprs())
            .collect()?;
        if missing.height() > 0 {
            return Err(Error::UnattributedEvents(crate::format_keys(&missing, &keys)?));
        }

        log::debug!("{} events attributed to teams", attributed.height());
        Ok(attributed)
    }
}
