//! Base statistic tables that drive the rolling and ratio column generators.

/// Per-fixture player counters, as delivered by the match-log collector.
pub static PLAYER_STATS: &[&str] = &[
    "minutes",
    "goals",
    "assists",
    "pens_made",
    "pens_att",
    "shots",
    "shots_on_target",
    "yellow_cards",
    "red_cards",
    "touches",
    "tackles",
    "interceptions",
    "blocks",
    "xg",
    "npxg",
    "xag",
    "sca",
    "gca",
    "passes_completed",
    "passes_attempted",
    "progressive_passes",
    "carries",
    "progressive_carries",
    "take_ons_attempted",
    "take_ons_succeeded",
];

/// Per-fixture team counters, derived from fixture results.
pub static TEAM_STATS: &[&str] = &[
    "goals_scored",
    "goals_conceded",
    "clean_sheets",
    "wins",
    "draws",
    "losses",
];

/// Composite sums built from windowed player statistics: (name, operands).
pub static COMPOSITES: &[(&str, &[&str])] = &[
    ("real_contribution", &["goals", "assists"]),
    ("xgi", &["xg", "xag"]),
    ("npxgi", &["npxg", "xag"]),
];

/// Zero-guarded ratios over windowed sums: (name, numerator, denominator).
pub static EFFICIENCIES: &[(&str, &str, &str)] = &[
    ("goal_efficiency", "goals", "xg"),
    ("assist_efficiency", "assists", "xag"),
    ("shot_conversion", "goals", "shots"),
    ("xgi_efficiency", "real_contribution", "xgi"),
    ("npxgi_efficiency", "real_contribution", "npxgi"),
];

/// Base and composite statistics normalized to a 90-minute basis.
pub static PER_90_STATS: &[&str] = &[
    "goals",
    "assists",
    "shots",
    "shots_on_target",
    "touches",
    "tackles",
    "interceptions",
    "blocks",
    "xg",
    "npxg",
    "xag",
    "sca",
    "gca",
    "passes_completed",
    "progressive_passes",
    "carries",
    "progressive_carries",
    "take_ons_succeeded",
    "real_contribution",
    "xgi",
    "npxgi",
];
