use crate::{
    fixtures::Fixtures,
    stats::{PLAYER_STATS, TEAM_STATS},
    tenure::Tenures,
    Position, Result,
};
use derive_deref::Deref;
use polars::prelude::*;

/// Fixture attributes every normalized event row carries.
const FIXTURE_COLUMNS: [&str; 4] = ["fix_id", "season", "game_week", "game_date"];

fn coalesced_stats(stats: &[&str]) -> Vec<Expr> {
    stats
        .iter()
        .map(|stat| col(stat).cast(DataType::Float64).fill_null(lit(0.0)))
        .collect()
}

/// Raw per-fixture player statistics, one row per (player, fixture).
#[derive(Clone, Deref)]
pub struct PlayerEvents(DataFrame);

impl PlayerEvents {
    pub fn new(df: DataFrame) -> Self {
        PlayerEvents(df)
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Ok(PlayerEvents(df))
    }

    /// Outfield events of finished fixtures with fixture context and the
    /// player's team attached. Null statistics become 0.
    pub fn normalize(&self, fixtures: &Fixtures, tenures: &Tenures) -> Result<DataFrame> {
        log::trace!("events::PlayerEvents::normalize");
        crate::assert_unique(&self.0, &["player_id", "fix_id"], "player event")?;

        let fixture_cols: Vec<Expr> = FIXTURE_COLUMNS.iter().map(|c| col(c)).collect();
        let played = fixtures
            .lazy()
            .filter(col("finished"))
            .select(fixture_cols);

        let goalkeeper = lit(Position::Gk.to_string());
        let df = self
            .0
            .clone()
            .lazy()
            .filter(col("position").neq_missing(goalkeeper))
            .with_columns([col("player_id").cast(DataType::Int64), col("fix_id").cast(DataType::Int64)])
            .with_columns(coalesced_stats(PLAYER_STATS))
            .join(played, [col("fix_id")], [col("fix_id")], JoinArgs::new(JoinType::Inner))
            .collect()?;
        log::debug!("{} outfield events in finished fixtures", df.height());

        tenures.attribute(df)
    }
}

/// Per-fixture team results, one row per (team, fixture).
#[derive(Clone, Deref)]
pub struct TeamEvents(DataFrame);

impl TeamEvents {
    pub fn new(df: DataFrame) -> Self {
        TeamEvents(df)
    }

    /// Both sides of every finished fixture.
    pub fn from_fixtures(fixtures: &Fixtures) -> Result<Self> {
        let mut columns: Vec<Expr> = FIXTURE_COLUMNS.iter().map(|c| col(c)).collect();
        columns.push(col("team_id"));
        columns.extend(TEAM_STATS.iter().map(|stat| col(stat)));

        let df = fixtures
            .sides()?
            .filter(col("finished"))
            .select(columns)
            .collect()?;
        log::debug!("{} team results", df.height());
        Ok(TeamEvents(df))
    }

    pub fn normalize(&self) -> Result<DataFrame> {
        log::trace!("events::TeamEvents::normalize");
        crate::assert_unique(&self.0, &["team_id", "fix_id"], "team event")?;
        let df = self
            .0
            .clone()
            .lazy()
            .with_columns(coalesced_stats(TEAM_STATS))
            .collect()?;
        Ok(df)
    }
}
