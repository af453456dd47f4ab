use polars::prelude::*;

/// Predicates over feature tables, combined with AND.
#[derive(Clone, Debug, Default)]
pub struct FeatureFilter {
    filter_expr: Option<Expr>,
}

impl FeatureFilter {
    pub fn new() -> Self {
        Self { filter_expr: None }
    }

    pub fn season(mut self, season: &str) -> Self {
        let expr = col("season").eq(lit(season));
        self.extend_filter(expr)
    }

    // Adds a filter for the game week
    pub fn game_week(mut self, game_week: i64) -> Self {
        let expr = col("game_week").eq(lit(game_week));
        self.extend_filter(expr)
    }

    pub fn game_week_range(mut self, start: i64, end: i64) -> Self {
        let expr = col("game_week").is_between(lit(start), lit(end), ClosedInterval::Both);
        self.extend_filter(expr)
    }

    pub fn player(mut self, player_id: i64) -> Self {
        let expr = col("player_id").eq(lit(player_id));
        self.extend_filter(expr)
    }

    pub fn team(mut self, team_id: i64) -> Self {
        let expr = col("team_id").eq(lit(team_id));
        self.extend_filter(expr)
    }

    // Combines the current filter with a new one using AND logic
    fn extend_filter(&mut self, new_expr: Expr) -> Self {
        self.filter_expr = match self.filter_expr.take() {
            Some(existing_expr) => Some(existing_expr.and(new_expr)),
            None => Some(new_expr),
        };
        self.clone()
    }

    pub fn build(self) -> Expr {
        self.filter_expr.unwrap_or_else(|| lit(true))
    }
}
