use anyhow::{bail, Result};
use clap::{Args, Parser, Subcommand};
use gwform::{
    filter::FeatureFilter, fixtures::Fixtures, selectors, tenure::Tenures, Dataset, Entity,
    FeatureConfig,
};
use log::LevelFilter;
use polars::prelude::*;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Cli {
    /// Feature configuration (JSON); defaults apply to omitted fields
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Training rows: features from prior fixtures, labelled with each fixture's outcome
    History {
        #[command(flatten)]
        source: Source,

        #[command(flatten)]
        filter: FilterArgs,

        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Inference rows for the next unplayed game week
    Next {
        #[command(flatten)]
        source: Source,

        /// Season to project; the latest season in the fixture table by default
        #[arg(short, long)]
        season: Option<String>,

        #[arg(short, long, value_name = "FILE")]
        out: Option<PathBuf>,
    },
    /// Derive player tenures from observed appearances
    Tenures {
        #[arg(long, value_name = "FILE")]
        appearances: PathBuf,

        #[arg(long, value_name = "FILE")]
        fixtures: PathBuf,

        #[arg(short, long, value_name = "FILE")]
        out: PathBuf,
    },
}

#[derive(Args, Debug)]
struct Source {
    /// Directory holding the input parquet tables
    #[arg(short, long, value_name = "DIR")]
    data: PathBuf,

    #[arg(short, long, default_value = "player")]
    entity: Entity,
}

#[derive(Args, Debug)]
struct FilterArgs {
    #[arg(long)]
    season: Option<String>,

    #[arg(short = 'w', long = "week")]
    game_week: Option<i64>,

    #[arg(long, value_names = ["FROM", "TO"], num_args = 2, conflicts_with = "game_week")]
    weeks: Option<Vec<i64>>,

    #[arg(short, long)]
    player: Option<i64>,

    #[arg(short, long)]
    team: Option<i64>,
}

impl FilterArgs {
    fn build(&self) -> Result<Expr> {
        let mut filter = FeatureFilter::new();
        if let Some(season) = &self.season {
            filter = filter.season(season);
        }
        if let Some(game_week) = self.game_week {
            filter = filter.game_week(game_week);
        }
        if let Some(weeks) = &self.weeks {
            let &[from, to] = weeks.as_slice() else {
                bail!("--weeks takes exactly two game weeks");
            };
            filter = filter.game_week_range(from, to);
        }
        if let Some(player) = self.player {
            filter = filter.player(player);
        }
        if let Some(team) = self.team {
            filter = filter.team(team);
        }
        Ok(filter.build())
    }
}

fn emit(mut df: DataFrame, out: Option<&Path>) -> Result<()> {
    match out {
        Some(path) => {
            gwform::write_parquet(&mut df, path)?;
            log::info!("Wrote {} rows to {}", df.height(), path.display());
        }
        None => println!("{}", df),
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set the default level based on verbosity
    let default_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let log_config = ConfigBuilder::new().add_filter_allow_str("gwform").build();
    TermLogger::init(
        default_level,
        log_config,
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )?;

    log::trace!("Args {:#?}", cli);

    let config = match &cli.config {
        Some(path) => FeatureConfig::from_json_file(path)?,
        None => FeatureConfig::default(),
    };

    match cli.command {
        Command::History {
            source,
            filter,
            out,
        } => {
            let data = Dataset::load(&source.data)?;
            let df = selectors::history(&data, source.entity, &config)?;
            let df = df.lazy().filter(filter.build()?).collect()?;
            emit(df, out.as_deref())
        }
        Command::Next {
            source,
            season,
            out,
        } => {
            let data = Dataset::load(&source.data)?;
            let df = selectors::next_fixture(&data, source.entity, &config, season.as_deref())?;
            emit(df, out.as_deref())
        }
        Command::Tenures {
            appearances,
            fixtures,
            out,
        } => {
            let fixtures = Fixtures::load(fixtures)?;
            let appearances = gwform::load_parquet(appearances)?;
            log::info!("Loaded {} appearances", appearances.height());

            let tenures = Tenures::derive(appearances, &fixtures)?;
            let df: DataFrame = (*tenures).clone();
            emit(df, Some(&out))
        }
    }
}
