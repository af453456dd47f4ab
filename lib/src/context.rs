//! Venue and strength context for a (team, fixture) pair.

use crate::fixtures::TeamSeasons;
use polars::prelude::*;

pub static CONTEXT_COLUMNS: &[&str] = &[
    "was_home",
    "opponent_id",
    "team_attack",
    "team_defence",
    "opponent_attack",
    "opponent_defence",
];

const SCORES: [&str; 4] = [
    "home_attack_score",
    "home_defence_score",
    "away_attack_score",
    "away_defence_score",
];

/// Picks the home or away variant of a rating depending on where the side plays.
fn by_venue(home: &str, away: &str) -> Expr {
    when(col("was_home").eq(lit(1)))
        .then(col(home))
        .otherwise(col(away))
}

/// Joins venue, opponent and venue-specific strengths onto rows keyed by
/// `fix_id`, `team_id` and `season`. `sides` comes from `Fixtures::sides`.
///
/// The side playing at home is rated on its home scores and its opponent on
/// their away scores, and the reverse for the away side.
pub fn attach(lf: LazyFrame, sides: LazyFrame, team_seasons: &TeamSeasons) -> LazyFrame {
    log::trace!("context::attach");
    let venue = sides.select([
        col("fix_id"),
        col("team_id"),
        col("opponent_id"),
        col("was_home"),
    ]);

    let mut own: Vec<Expr> = vec![col("team_id"), col("season")];
    own.extend(SCORES.iter().map(|c| col(c)));

    let mut opponent: Vec<Expr> = vec![col("team_id").alias("opponent_id"), col("season")];
    opponent.extend(SCORES.iter().map(|c| col(c).alias(&format!("opponent_{c}"))));

    let left = || JoinArgs::new(JoinType::Left);
    lf.join(
        venue,
        [col("fix_id"), col("team_id")],
        [col("fix_id"), col("team_id")],
        left(),
    )
    .join(
        team_seasons.lazy().select(own),
        [col("team_id"), col("season")],
        [col("team_id"), col("season")],
        left(),
    )
    .join(
        team_seasons.lazy().select(opponent),
        [col("opponent_id"), col("season")],
        [col("opponent_id"), col("season")],
        left(),
    )
    .with_columns([
        by_venue("home_attack_score", "away_attack_score").alias("team_attack"),
        by_venue("home_defence_score", "away_defence_score").alias("team_defence"),
        by_venue("opponent_away_attack_score", "opponent_home_attack_score")
            .alias("opponent_attack"),
        by_venue("opponent_away_defence_score", "opponent_home_defence_score")
            .alias("opponent_defence"),
    ])
}
