//! A small synthetic season shared by the unit tests.
//!
//! Four teams play three finished game weeks of two fixtures each; game week 4
//! is scheduled but unplayed.
//!
//! | gw | fixture | home | away | score |
//! |----|---------|------|------|-------|
//! | 1  | 1       | 10   | 20   | 2-1   |
//! | 1  | 2       | 30   | 40   | 0-0   |
//! | 2  | 3       | 20   | 30   | 1-1   |
//! | 2  | 4       | 40   | 10   | 0-3   |
//! | 3  | 5       | 10   | 30   | 1-0   |
//! | 3  | 6       | 20   | 40   | 2-2   |
//! | 4  | 7       | 10   | 40   |       |
//! | 4  | 8       | 30   | 20   |       |

use crate::{
    dataset::Dataset,
    events::PlayerEvents,
    fixtures::{Fixtures, TeamSeasons},
    stats::PLAYER_STATS,
    tenure::Tenures,
    Position, Result,
};
use polars::prelude::*;

pub const SEASON: &str = "2023-24";

// game dates as days since the epoch
pub const GW1: i32 = 19600;
pub const GW2: i32 = 19607;
pub const GW3: i32 = 19614;
pub const GW4: i32 = 19621;

pub const KEEPER: i64 = 4;

pub fn fixtures() -> Result<Fixtures> {
    let df = df!(
        "fix_id" => &[1i64, 2, 3, 4, 5, 6, 7, 8],
        "season" => &[SEASON; 8],
        "game_week" => &[1i64, 1, 2, 2, 3, 3, 4, 4],
        "game_date" => &[GW1, GW1, GW2, GW2, GW3, GW3, GW4, GW4],
        "finished" => &[true, true, true, true, true, true, false, false],
        "home_id" => &[10i64, 30, 20, 40, 10, 20, 10, 30],
        "away_id" => &[20i64, 40, 30, 10, 30, 40, 40, 20],
        "home_goals" => &[Some(2.0), Some(0.0), Some(1.0), Some(0.0), Some(1.0), Some(2.0), None, None],
        "away_goals" => &[Some(1.0), Some(0.0), Some(1.0), Some(3.0), Some(0.0), Some(2.0), None, None],
    )?;
    Fixtures::new(df)
}

pub fn home_attack(team: i64) -> f64 {
    team as f64 * 1.5
}

pub fn away_attack(team: i64) -> f64 {
    team as f64 * 1.25
}

pub fn home_defence(team: i64) -> f64 {
    team as f64 * 0.5
}

pub fn away_defence(team: i64) -> f64 {
    team as f64 * 0.75
}

pub fn team_seasons() -> Result<TeamSeasons> {
    let teams = [10i64, 20, 30, 40];
    let df = df!(
        "team_id" => &teams,
        "season" => &[SEASON; 4],
        "season_team_id" => &[110i64, 120, 130, 140],
        "home_attack_score" => teams.iter().map(|&t| home_attack(t)).collect::<Vec<_>>(),
        "home_defence_score" => teams.iter().map(|&t| home_defence(t)).collect::<Vec<_>>(),
        "away_attack_score" => teams.iter().map(|&t| away_attack(t)).collect::<Vec<_>>(),
        "away_defence_score" => teams.iter().map(|&t| away_defence(t)).collect::<Vec<_>>(),
    )?;
    TeamSeasons::new(df)
}

/// One player's line for one fixture. Statistics left unset are null.
#[derive(Clone, Debug)]
pub struct EventRow {
    player_id: i64,
    fix_id: i64,
    game_week: i64,
    position: Position,
    stats: Vec<(&'static str, f64)>,
}

impl EventRow {
    pub fn new(player_id: i64, fix_id: i64, game_week: i64) -> Self {
        EventRow {
            player_id,
            fix_id,
            game_week,
            position: Position::Mf,
            stats: Vec::new(),
        }
    }

    pub fn stat(mut self, name: &'static str, value: f64) -> Self {
        self.stats.push((name, value));
        self
    }

    pub fn position(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    fn value(&self, stat: &str) -> Option<f64> {
        self.stats
            .iter()
            .find(|(name, _)| *name == stat)
            .map(|(_, value)| *value)
    }
}

/// Event rows in `SEASON` with every player statistic column present.
pub fn player_events(rows: &[EventRow]) -> Result<DataFrame> {
    let mut columns = vec![
        Series::new("player_id", rows.iter().map(|r| r.player_id).collect::<Vec<_>>()),
        Series::new("fix_id", rows.iter().map(|r| r.fix_id).collect::<Vec<_>>()),
        Series::new("season", vec![SEASON; rows.len()]),
        Series::new("game_week", rows.iter().map(|r| r.game_week).collect::<Vec<_>>()),
        Series::new(
            "position",
            rows.iter().map(|r| r.position.to_string()).collect::<Vec<_>>(),
        ),
    ];
    for stat in PLAYER_STATS {
        let values: Vec<Option<f64>> = rows.iter().map(|r| r.value(stat)).collect();
        columns.push(Series::new(stat, values));
    }
    Ok(DataFrame::new(columns)?)
}

/// (player, fixture, game week, minutes, goals, assists)
const APPEARANCES: &[(i64, i64, i64, f64, f64, f64)] = &[
    // team 10
    (1, 1, 1, 90.0, 1.0, 0.0),
    (1, 4, 2, 90.0, 0.0, 1.0),
    (1, 5, 3, 90.0, 2.0, 0.0),
    // team 20
    (2, 1, 1, 90.0, 0.0, 1.0),
    (2, 3, 2, 90.0, 1.0, 0.0),
    (2, 6, 3, 90.0, 0.0, 0.0),
    (6, 1, 1, 45.0, 0.0, 0.0),
    (6, 3, 2, 45.0, 0.0, 0.0),
    // team 30
    (3, 2, 1, 90.0, 0.0, 0.0),
    (3, 3, 2, 90.0, 0.0, 0.0),
    (3, 5, 3, 90.0, 0.0, 0.0),
];

fn appearance_rows() -> Vec<EventRow> {
    let mut rows: Vec<EventRow> = APPEARANCES
        .iter()
        .map(|&(player, fix, gw, minutes, goals, assists)| {
            EventRow::new(player, fix, gw)
                .stat("minutes", minutes)
                .stat("goals", goals)
                .stat("assists", assists)
                .stat("shots", goals + 1.0)
                .stat("xg", 0.5)
        })
        .collect();

    // team 40's keeper
    for (fix, gw) in [(2, 1), (4, 2), (6, 3)] {
        rows.push(
            EventRow::new(KEEPER, fix, gw)
                .position(Position::Gk)
                .stat("minutes", 90.0),
        );
    }
    // placeholder line for the unplayed fixture
    rows.push(EventRow::new(1, 7, 4));
    rows
}

pub fn tenures() -> Result<Tenures> {
    let df = df!(
        "player_id" => &[1i64, 2, 3, KEEPER, 6],
        "team_id" => &[10i64, 20, 30, 40, 20],
        "start_date" => &[GW1 - 30; 5],
        "end_date" => &[None::<i32>; 5],
    )?;
    Tenures::new(df)
}

pub fn dataset() -> Result<Dataset> {
    // raw feeds carry no fixture attributes beyond the id
    let events = player_events(&appearance_rows())?
        .drop("season")?
        .drop("game_week")?;

    Ok(Dataset {
        fixtures: fixtures()?,
        team_seasons: team_seasons()?,
        tenures: tenures()?,
        player_events: PlayerEvents::new(events),
    })
}
