//! Search, then trust score and recent activity for the first hit
//!
//! The downstream stages only wait on the selected address, so once it is
//! known they run side by side.

use serde_json::Value;

use super::{Gate, Queries, QueryState};
use crate::api::{ClientError, SearchResult, TrustScore};

#[derive(Debug, Clone, Default)]
pub struct SearchOutcome {
    pub query: String,
    pub search: QueryState<Vec<SearchResult>>,
    pub selected_address: Option<String>,
    pub trust_score: QueryState<TrustScore>,
    pub activity: QueryState<Value>,
}

impl SearchOutcome {
    fn new(query: &str) -> Self {
        Self {
            query: query.to_string(),
            ..Self::default()
        }
    }

    /// True while any stage is still loading
    pub fn is_loading(&self) -> bool {
        self.search.is_loading() || self.trust_score.is_loading() || self.activity.is_loading()
    }

    /// First error in stage order
    pub fn error(&self) -> Option<&ClientError> {
        self.search
            .error()
            .or_else(|| self.trust_score.error())
            .or_else(|| self.activity.error())
    }
}

/// Address of the first search hit, when it resolves to one
pub fn select_address(results: &[SearchResult]) -> Option<&str> {
    results.first().and_then(|hit| hit.address.as_deref())
}

#[derive(Clone)]
pub struct SearchPipeline {
    queries: Queries,
}

impl SearchPipeline {
    pub fn new(queries: Queries) -> Self {
        Self { queries }
    }

    pub async fn run(&self, query: &str) -> SearchOutcome {
        self.run_observed(query, |_| {}).await
    }

    /// Like [`run`](Self::run), calling `observe` with every intermediate
    /// snapshot and the final outcome.
    pub async fn run_observed<F>(&self, query: &str, mut observe: F) -> SearchOutcome
    where
        F: FnMut(&SearchOutcome),
    {
        let mut outcome = SearchOutcome::new(query);
        if !Gate::Text(query).is_open() {
            observe(&outcome);
            return outcome;
        }

        outcome.search = QueryState::Loading;
        observe(&outcome);
        outcome.search = self.queries.search(query).await;
        outcome.selected_address = outcome
            .search
            .data()
            .and_then(|hits| select_address(hits))
            .map(str::to_string);

        let Some(address) = outcome.selected_address.clone() else {
            observe(&outcome);
            return outcome;
        };

        outcome.trust_score = QueryState::Loading;
        outcome.activity = QueryState::Loading;
        observe(&outcome);

        let (trust_score, activity) = tokio::join!(
            self.queries.trust_score_when(Gate::Text(&address), &address),
            self.queries.recent_activity_when(Gate::Text(&address), &address),
        );
        outcome.trust_score = trust_score;
        outcome.activity = activity;
        observe(&outcome);
        outcome
    }
}
