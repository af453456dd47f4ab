use crate::{
    events::{PlayerEvents, TeamEvents},
    fixtures::{Fixtures, TeamSeasons},
    tenure::Tenures,
    Entity, Result,
};
use polars::prelude::*;
use std::path::Path;

pub const FIXTURES_FILE: &str = "fixtures.parquet";
pub const TEAM_SEASONS_FILE: &str = "team_seasons.parquet";
pub const TENURES_FILE: &str = "tenures.parquet";
pub const PLAYER_EVENTS_FILE: &str = "player_events.parquet";

/// Snapshot of the upstream tables a feature run reads.
#[derive(Clone)]
pub struct Dataset {
    pub fixtures: Fixtures,
    pub team_seasons: TeamSeasons,
    pub tenures: Tenures,
    pub player_events: PlayerEvents,
}

impl Dataset {
    pub fn load<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        log::info!("Loading tables from {}", dir.display());

        let data = Dataset {
            fixtures: Fixtures::load(dir.join(FIXTURES_FILE))?,
            team_seasons: TeamSeasons::load(dir.join(TEAM_SEASONS_FILE))?,
            tenures: Tenures::load(dir.join(TENURES_FILE))?,
            player_events: PlayerEvents::load(dir.join(PLAYER_EVENTS_FILE))?,
        };
        log::info!(
            "Loaded {} fixtures, {} tenures, {} player events",
            data.fixtures.height(),
            data.tenures.height(),
            data.player_events.height()
        );
        Ok(data)
    }

    /// Normalized event rows for `entity`, ready for rolling.
    pub fn events(&self, entity: Entity) -> Result<DataFrame> {
        match entity {
            Entity::Player => self.player_events.normalize(&self.fixtures, &self.tenures),
            Entity::Team => TeamEvents::from_fixtures(&self.fixtures)?.normalize(),
        }
    }
}
