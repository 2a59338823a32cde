//! Graphite explorer API access

pub mod client;
pub mod errors;
pub mod types;

use async_trait::async_trait;
use serde_json::Value;

pub use client::GraphiteClient;
pub use errors::ClientError;
pub use types::{
    AccountCounters, BalanceHistoryEntry, BalanceHistoryOptions, DirectionalCount, MinedBlock,
    PageOptions, SearchResult, SortOrder, TopAccount, TrustScore,
};

/// Read side of the explorer, as the query layer sees it
#[async_trait]
pub trait ExplorerApi: Send + Sync {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ClientError>;

    async fn trust_score(&self, address: &str) -> Result<TrustScore, ClientError>;

    async fn balance_history(
        &self,
        address: &str,
        options: &BalanceHistoryOptions,
    ) -> Result<Vec<BalanceHistoryEntry>, ClientError>;

    async fn mined_blocks(
        &self,
        address: &str,
        page: &PageOptions,
    ) -> Result<Vec<MinedBlock>, ClientError>;

    async fn top_accounts(&self, page: &PageOptions) -> Result<Vec<TopAccount>, ClientError>;

    async fn account_counters(&self, address: &str) -> Result<AccountCounters, ClientError>;

    async fn recent_activity(&self, address: &str) -> Result<Value, ClientError>;
}
