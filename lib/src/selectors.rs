//! Training and inference feature tables.

use crate::{
    config::{FeatureConfig, Width},
    context::{self, CONTEXT_COLUMNS},
    dataset::Dataset,
    ratios,
    window::{self, Mode},
    Entity, Result,
};
use polars::prelude::*;

const ORDER: [&str; 2] = ["game_week", "fix_id"];

fn partition(entity: Entity) -> [&'static str; 2] {
    [entity.id_column(), "season"]
}

fn key_columns(entity: Entity) -> Vec<&'static str> {
    match entity {
        Entity::Player => vec!["player_id", "team_id", "fix_id", "season", "game_week"],
        Entity::Team => vec!["team_id", "fix_id", "season", "game_week"],
    }
}

fn label_column(stat: &str) -> String {
    format!("label_{stat}")
}

/// Rolling sums and, for players, the ratio family, in the given mode.
fn features(events: DataFrame, entity: Entity, config: &FeatureConfig, mode: Mode) -> LazyFrame {
    let lf = window::rolling_sums(
        events.lazy(),
        &partition(entity),
        &ORDER,
        entity.stats(),
        &config.windows,
        mode,
    );
    match entity {
        Entity::Player => ratios::with_ratios(lf, &config.ratio_windows),
        Entity::Team => lf,
    }
}

fn feature_columns(entity: Entity, config: &FeatureConfig) -> Vec<Expr> {
    let mut names = window::rolling_columns(entity.stats(), &config.windows);
    if entity == Entity::Player {
        names.extend(ratios::ratio_columns(&config.ratio_windows));
    }
    names.iter().map(|name| col(name)).collect()
}

fn output_columns(entity: Entity, config: &FeatureConfig, labels: &[&str]) -> Vec<Expr> {
    let mut columns: Vec<Expr> = key_columns(entity).into_iter().map(col).collect();
    columns.extend(CONTEXT_COLUMNS.iter().map(|c| col(c)));
    columns.extend(labels.iter().map(|l| col(&label_column(l))));
    columns.extend(feature_columns(entity, config));
    columns
}

fn sorted(lf: LazyFrame, entity: Entity) -> LazyFrame {
    lf.sort(
        [entity.id_column(), "season", "game_week", "fix_id"],
        SortMultipleOptions::default(),
    )
}

/// Exclusive-mode features for every played fixture, labelled with the
/// fixture's own outcome. Player rows need `min_rolling_minutes` of season
/// playing time behind them.
pub fn history(data: &Dataset, entity: Entity, config: &FeatureConfig) -> Result<DataFrame> {
    log::trace!("selectors::history {entity}");
    config.validate()?;

    let events = data.events(entity)?;
    let mut lf = features(events, entity, config, Mode::Exclusive).with_columns(
        entity
            .labels()
            .iter()
            .map(|l| col(l).alias(&label_column(l)))
            .collect::<Vec<_>>(),
    );

    if let Some(minutes) = entity.minutes_column() {
        let banked = col(&window::rolling_column(Width::Unbounded, minutes));
        lf = lf.filter(banked.gt_eq(lit(config.min_rolling_minutes)));
    }

    let lf = context::attach(lf, data.fixtures.sides()?, &data.team_seasons);
    let df = sorted(lf, entity)
        .select(output_columns(entity, config, entity.labels()))
        .collect()?;

    crate::assert_unique(&df, &[entity.id_column(), "fix_id"], "historical feature")?;
    log::debug!("{} historical {entity} rows", df.height());
    Ok(df)
}

/// Inclusive-mode features projected onto each entity's fixture in the next
/// game week of `season` (the latest season when `None`).
///
/// Features come from the entity's most recent row in the last completed game
/// week. Only entities with such a row are projected: a player who sat out
/// that game week gets no row even when their team is scheduled, and neither
/// does an entity whose team has no fixture in the next game week. Returns an
/// empty frame when there is nothing to project.
pub fn next_fixture(
    data: &Dataset,
    entity: Entity,
    config: &FeatureConfig,
    season: Option<&str>,
) -> Result<DataFrame> {
    log::trace!("selectors::next_fixture {entity}");
    config.validate()?;

    let season = match season {
        Some(season) => season.to_string(),
        None => data.fixtures.latest_season()?,
    };
    let Some(next_week) = data.fixtures.next_game_week(&season)? else {
        log::warn!("season {season} has no finished fixtures, nothing to project");
        return Ok(DataFrame::empty());
    };
    log::info!("Projecting {entity} features onto {season} game week {next_week}");

    let id = entity.id_column();
    let events = data.events(entity)?;
    let latest = features(events, entity, config, Mode::Inclusive)
        .filter(
            col("season")
                .eq(lit(season.as_str()))
                .and(col("game_week").eq(lit(next_week - 1))),
        )
        .sort(["fix_id"], SortMultipleOptions::default().with_order_descending(true))
        .filter(col(id).is_first_distinct());

    let mut carried: Vec<Expr> = vec![col(id)];
    if entity == Entity::Player {
        carried.push(col("team_id"));
    }
    carried.push(col("season"));
    carried.extend(feature_columns(entity, config));
    let projected = latest
        .select(carried)
        .with_column(lit(next_week).cast(DataType::Int64).alias("game_week"));

    let sides = data.fixtures.sides()?;
    let schedule = sides
        .clone()
        .filter(
            col("season")
                .eq(lit(season.as_str()))
                .and(col("game_week").eq(lit(next_week))),
        )
        .select([col("team_id"), col("season"), col("game_week"), col("fix_id")]);

    let join_keys = || [col("team_id"), col("season"), col("game_week")];
    let lf = projected.join(
        schedule,
        join_keys(),
        join_keys(),
        JoinArgs::new(JoinType::Inner),
    );

    let lf = context::attach(lf, sides, &data.team_seasons);
    let df = sorted(lf, entity)
        .select(output_columns(entity, config, &[]))
        .collect()?;

    if df.height() == 0 {
        log::warn!("no {entity} is scheduled for {season} game week {next_week}");
    }
    crate::assert_unique(&df, &[id, "fix_id"], "next fixture feature")?;
    log::debug!("{} next-fixture {entity} rows", df.height());
    Ok(df)
}
