use crate::{error::Error, Result};
use itertools::Itertools;
use parse_display::{Display, FromStr};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Trailing window used for short-term form and its ratios.
pub const SHORT_WINDOW: usize = 3;
/// Trailing window used for medium-term form.
pub const LONG_WINDOW: usize = 6;
/// Season minutes a player must have banked before a fixture counts for training.
pub const MIN_ROLLING_MINUTES: f64 = 90.0;
pub const MINUTES_PER_MATCH: f64 = 90.0;

/// How far back a rolling sum looks. Renders as `ub` or the row count, which is
/// also how it appears in feature column names.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Display, FromStr, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum Width {
    #[display("ub")]
    Unbounded,
    #[display("{0}")]
    Last(usize),
}

impl TryFrom<String> for Width {
    type Error = parse_display::ParseError;

    fn try_from(value: String) -> std::result::Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<Width> for String {
    fn from(width: Width) -> Self {
        width.to_string()
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    pub windows: Vec<Width>,
    pub ratio_windows: Vec<Width>,
    pub min_rolling_minutes: f64,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            windows: vec![
                Width::Unbounded,
                Width::Last(SHORT_WINDOW),
                Width::Last(LONG_WINDOW),
            ],
            // LONG_WINDOW is left out of the ratio family on purpose
            ratio_windows: vec![Width::Unbounded, Width::Last(SHORT_WINDOW)],
            min_rolling_minutes: MIN_ROLLING_MINUTES,
        }
    }
}

impl FeatureConfig {
    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let file = std::fs::File::open(path)?;
        let config: Self = serde_json::from_reader(std::io::BufReader::new(file))?;
        config.validate()?;
        Ok(config)
    }

    /// Derive ratios for every rolling window, long window included.
    pub fn with_symmetric_ratios(mut self) -> Self {
        self.ratio_windows = self.windows.clone();
        self
    }

    pub fn validate(&self) -> Result<()> {
        if !self.windows.contains(&Width::Unbounded) {
            return Err(Error::InvalidConfig(
                "the unbounded window is required for the minutes threshold".into(),
            ));
        }
        if self.windows.contains(&Width::Last(0)) || self.ratio_windows.contains(&Width::Last(0)) {
            return Err(Error::InvalidConfig("window width must be at least 1".into()));
        }
        for (label, widths) in [("window", &self.windows), ("ratio window", &self.ratio_windows)] {
            if let Some(width) = widths.iter().duplicates().next() {
                return Err(Error::InvalidConfig(format!("{label} {width} is listed twice")));
            }
        }
        if let Some(width) = self.ratio_windows.iter().find(|w| !self.windows.contains(*w)) {
            return Err(Error::InvalidConfig(format!(
                "ratio window {width} has no rolling sums"
            )));
        }
        if !(self.min_rolling_minutes >= 0.0) {
            return Err(Error::InvalidConfig(format!(
                "minimum rolling minutes must be non-negative, got {}",
                self.min_rolling_minutes
            )));
        }
        Ok(())
    }
}
