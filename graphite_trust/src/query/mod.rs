//! Gated, cached queries over the explorer API
//!
//! Each query checks its readiness gate first. A closed gate yields
//! [`QueryState::Idle`] without touching the network; otherwise the shared
//! [`QueryCache`] is consulted before the API is called. Failures are
//! reported, never cached.

pub mod cache;
pub mod pipeline;
pub mod readiness;
pub mod state;

#[cfg(test)]
pub(crate) mod testing;

use log::{debug, warn};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;

use crate::api::{
    AccountCounters, BalanceHistoryEntry, BalanceHistoryOptions, ClientError, ExplorerApi,
    MinedBlock, PageOptions, SearchResult, TopAccount, TrustScore,
};

pub use cache::{CacheConfig, CacheStats, QueryCache, QueryKey};
pub use pipeline::{SearchOutcome, SearchPipeline};
pub use readiness::{is_address_ready, is_text_ready, Gate};
pub use state::QueryState;

#[derive(Clone)]
pub struct Queries {
    api: Arc<dyn ExplorerApi>,
    cache: Arc<QueryCache>,
}

impl Queries {
    pub fn new(api: Arc<dyn ExplorerApi>, cache: Arc<QueryCache>) -> Self {
        Self { api, cache }
    }

    pub fn cache(&self) -> &Arc<QueryCache> {
        &self.cache
    }

    pub async fn search(&self, query: &str) -> QueryState<Vec<SearchResult>> {
        let key = QueryKey::new("search").param("query", query);
        self.run(Gate::Text(query), key, || self.api.search(query))
            .await
    }

    pub async fn trust_score(&self, address: &str) -> QueryState<TrustScore> {
        self.trust_score_when(Gate::Address(address), address).await
    }

    pub(crate) async fn trust_score_when(
        &self,
        gate: Gate<'_>,
        address: &str,
    ) -> QueryState<TrustScore> {
        let key = QueryKey::new("trustScore").param("address", address);
        self.run(gate, key, || self.api.trust_score(address)).await
    }

    pub async fn balance_history(
        &self,
        address: &str,
        options: &BalanceHistoryOptions,
    ) -> QueryState<Vec<BalanceHistoryEntry>> {
        let key = QueryKey::new("balanceHistory")
            .param("address", address)
            .param("starttimestamp", optional(options.start_timestamp))
            .param("endtimestamp", optional(options.end_timestamp))
            .param("offset", options.page.offset)
            .param("limit", options.page.limit)
            .param("sort", options.sort.as_str());
        self.run(Gate::Address(address), key, || {
            self.api.balance_history(address, options)
        })
        .await
    }

    pub async fn mined_blocks(
        &self,
        address: &str,
        page: &PageOptions,
    ) -> QueryState<Vec<MinedBlock>> {
        let key = QueryKey::new("minedBlocks")
            .param("address", address)
            .param("offset", page.offset)
            .param("limit", page.limit);
        self.run(Gate::Address(address), key, || {
            self.api.mined_blocks(address, page)
        })
        .await
    }

    pub async fn top_accounts(&self, page: &PageOptions) -> QueryState<Vec<TopAccount>> {
        let key = QueryKey::new("topAccounts")
            .param("offset", page.offset)
            .param("limit", page.limit);
        self.run(Gate::Always, key, || self.api.top_accounts(page))
            .await
    }

    pub async fn account_counters(&self, address: &str) -> QueryState<AccountCounters> {
        let key = QueryKey::new("accountCounters").param("address", address);
        self.run(Gate::Address(address), key, || {
            self.api.account_counters(address)
        })
        .await
    }

    pub async fn recent_activity(&self, address: &str) -> QueryState<Value> {
        self.recent_activity_when(Gate::Address(address), address)
            .await
    }

    pub(crate) async fn recent_activity_when(
        &self,
        gate: Gate<'_>,
        address: &str,
    ) -> QueryState<Value> {
        let key = QueryKey::new("activity").param("address", address);
        self.run(gate, key, || self.api.recent_activity(address))
            .await
    }

    async fn run<T, F, Fut>(&self, gate: Gate<'_>, key: QueryKey, fetch: F) -> QueryState<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ClientError>>,
    {
        if !gate.is_open() {
            debug!("{} skipped, input not ready", key);
            return QueryState::Idle;
        }

        if let Some(cached) = self.cache.get::<T>(&key).await {
            debug!("{} served from cache", key);
            return QueryState::Ready(cached);
        }

        match fetch().await {
            Ok(value) => {
                self.cache.insert(key, &value).await;
                QueryState::Ready(value)
            }
            Err(err) => {
                warn!("{} failed: {}", key, err);
                QueryState::Failed(Arc::new(err))
            }
        }
    }
}

fn optional(value: Option<i64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}
