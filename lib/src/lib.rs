use parse_display::{Display, FromStr};
use polars::prelude::*;
use std::path::Path;

pub mod config;
pub mod context;
pub mod dataset;
mod error;
pub mod events;
pub mod filter;
pub mod fixtures;
pub mod ratios;
pub mod selectors;
pub mod stats;
pub mod tenure;
pub mod window;

#[cfg(test)]
mod test_data;

pub use config::{FeatureConfig, Width};
pub use dataset::Dataset;
pub use error::Error;
pub use window::Mode;

type Result<T> = std::result::Result<T, error::Error>;

#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Display, FromStr)]
#[display(style = "UPPERCASE")]
pub enum Position {
    Gk,
    Df,
    Mf,
    Fw,
}

/// What a feature row describes: a player's or a team's form.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Display, FromStr)]
#[display(style = "lowercase")]
pub enum Entity {
    Player,
    Team,
}

impl Entity {
    pub fn id_column(self) -> &'static str {
        match self {
            Entity::Player => "player_id",
            Entity::Team => "team_id",
        }
    }

    pub fn stats(self) -> &'static [&'static str] {
        match self {
            Entity::Player => stats::PLAYER_STATS,
            Entity::Team => stats::TEAM_STATS,
        }
    }

    /// Raw columns carried into historical rows as training targets.
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            Entity::Player => &["goals", "assists"],
            Entity::Team => &["goals_scored", "goals_conceded"],
        }
    }

    /// Teams have no playing time, so only players are gated on rolling minutes.
    pub fn minutes_column(self) -> Option<&'static str> {
        match self {
            Entity::Player => Some("minutes"),
            Entity::Team => None,
        }
    }
}

pub fn load_parquet<P: AsRef<Path>>(path: P) -> Result<DataFrame> {
    let mut file = std::fs::File::open(path)?;
    let df = ParquetReader::new(&mut file).finish()?;
    Ok(df)
}

pub fn write_parquet<P: AsRef<Path>>(df: &mut DataFrame, path: P) -> Result<()> {
    let mut file = std::fs::File::create(path)?;
    ParquetWriter::new(&mut file).finish(df)?;
    Ok(())
}

pub(crate) fn cast_columns(df: DataFrame, columns: &[(&str, DataType)]) -> Result<DataFrame> {
    let casts: Vec<Expr> = columns
        .iter()
        .map(|(name, dtype)| col(name).cast(dtype.clone()))
        .collect();
    let df = df.lazy().with_columns(casts).collect()?;
    Ok(df)
}

/// Returns the key tuples that appear on more than one row, formatted as `a/b`.
pub(crate) fn duplicate_keys(df: &DataFrame, keys: &[&str]) -> Result<Vec<String>> {
    let key_exprs: Vec<Expr> = keys.iter().map(|k| col(k)).collect();
    let dups = df
        .clone()
        .lazy()
        .group_by(key_exprs)
        .agg([len().alias("rows")])
        .filter(col("rows").gt(lit(1)))
        .sort(keys.to_vec(), SortMultipleOptions::default())
        .collect()?;
    format_keys(&dups, keys)
}

pub(crate) fn assert_unique(df: &DataFrame, keys: &[&str], table: &'static str) -> Result<()> {
    let dups = duplicate_keys(df, keys)?;
    if dups.is_empty() {
        Ok(())
    } else {
        Err(Error::DuplicateRows { table, keys: dups })
    }
}

pub(crate) fn format_keys(df: &DataFrame, keys: &[&str]) -> Result<Vec<String>> {
    let columns = keys
        .iter()
        .map(|k| df.column(k)?.cast(&DataType::String))
        .collect::<PolarsResult<Vec<_>>>()?;

    let mut formatted = Vec::with_capacity(df.height());
    for idx in 0..df.height() {
        let values = columns
            .iter()
            .map(|s| -> PolarsResult<&str> { Ok(s.str()?.get(idx).unwrap_or("null")) })
            .collect::<PolarsResult<Vec<_>>>()?;
        formatted.push(values.join("/"));
    }
    Ok(formatted)
}
