use crate::{Error, Result};
use derive_deref::Deref;
use polars::{prelude::*, sql::SQLContext};

pub(crate) static HOME_SIDE_QUERY: &str = r#"
    SELECT
        fix_id,
        season,
        game_week,
        game_date,
        finished,
        home_id AS team_id,
        away_id AS opponent_id,
        1 AS was_home,
        home_goals AS goals_scored,
        away_goals AS goals_conceded,
        CASE WHEN away_goals = 0 THEN 1 ELSE 0 END AS clean_sheets,
        CASE WHEN home_goals > away_goals THEN 1 ELSE 0 END AS wins,
        CASE WHEN home_goals = away_goals THEN 1 ELSE 0 END AS draws,
        CASE WHEN home_goals < away_goals THEN 1 ELSE 0 END AS losses
    FROM fixtures
"#;

pub(crate) static AWAY_SIDE_QUERY: &str = r#"
    SELECT
        fix_id,
        season,
        game_week,
        game_date,
        finished,
        away_id AS team_id,
        home_id AS opponent_id,
        0 AS was_home,
        away_goals AS goals_scored,
        home_goals AS goals_conceded,
        CASE WHEN home_goals = 0 THEN 1 ELSE 0 END AS clean_sheets,
        CASE WHEN away_goals > home_goals THEN 1 ELSE 0 END AS wins,
        CASE WHEN away_goals = home_goals THEN 1 ELSE 0 END AS draws,
        CASE WHEN away_goals < home_goals THEN 1 ELSE 0 END AS losses
    FROM fixtures
"#;

/// The fixture table: one row per match, finished or scheduled.
#[derive(Clone, Deref)]
pub struct Fixtures(DataFrame);

impl Fixtures {
    pub fn new(df: DataFrame) -> Result<Self> {
        let df = crate::cast_columns(
            df,
            &[
                ("fix_id", DataType::Int64),
                ("game_week", DataType::Int64),
                ("home_id", DataType::Int64),
                ("away_id", DataType::Int64),
                ("home_goals", DataType::Float64),
                ("away_goals", DataType::Float64),
                ("game_date", DataType::Date),
            ],
        )?;
        crate::assert_unique(&df, &["fix_id"], "fixture")?;
        Ok(Fixtures(df))
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Self::new(df)
    }

    pub fn lazy(&self) -> LazyFrame {
        self.0.clone().lazy()
    }

    /// Each fixture seen from both teams: one row per (fix_id, team_id) with the
    /// opponent, venue and that side's result counters.
    pub fn sides(&self) -> Result<LazyFrame> {
        log::trace!("fixtures::sides");
        let mut ctx = SQLContext::new();
        ctx.register("fixtures", self.lazy());

        let home = ctx.execute(HOME_SIDE_QUERY)?;
        let away = ctx.execute(AWAY_SIDE_QUERY)?;
        let sides = concat([home, away], UnionArgs::default())?;
        Ok(sides)
    }

    /// Latest season present in the table. Seasons are `YYYY-YY` strings, so
    /// they order lexically.
    pub fn latest_season(&self) -> Result<String> {
        let df = self
            .lazy()
            .select([col("season")])
            .sort(["season"], SortMultipleOptions::default().with_order_descending(true))
            .limit(1)
            .collect()?;

        let season = df.column("season")?.str()?.get(0).map(str::to_string);
        season.ok_or(Error::NoFixtures)
    }

    /// The game week after the last one with a finished fixture, or `None`
    /// if nothing in the season has been played yet.
    pub fn next_game_week(&self, season: &str) -> Result<Option<i64>> {
        let df = self
            .lazy()
            .filter(col("season").eq(lit(season)).and(col("finished")))
            .select([col("game_week").max()])
            .collect()?;

        let last_played = df.column("game_week")?.i64()?.get(0);
        log::debug!("season {season}: last finished game week {last_played:?}");
        Ok(last_played.map(|gw| gw + 1))
    }
}

/// Per-season team strength ratings.
#[derive(Clone, Deref)]
pub struct TeamSeasons(DataFrame);

impl TeamSeasons {
    pub fn new(df: DataFrame) -> Result<Self> {
        let df = crate::cast_columns(
            df,
            &[
                ("team_id", DataType::Int64),
                ("home_attack_score", DataType::Float64),
                ("home_defence_score", DataType::Float64),
                ("away_attack_score", DataType::Float64),
                ("away_defence_score", DataType::Float64),
            ],
        )?;
        crate::assert_unique(&df, &["team_id", "season"], "team season")?;
        Ok(TeamSeasons(df))
    }

    pub fn load<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let df = crate::load_parquet(path)?;
        Self::new(df)
    }

    pub fn lazy(&self) -> LazyFrame {
        self.0.clone().lazy()
    }
}
