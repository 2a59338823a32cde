//! In-memory explorer for unit tests

use async_trait::async_trait;
use serde_json::{json, Value};
use std::sync::Mutex;

use crate::api::{
    AccountCounters, BalanceHistoryEntry, BalanceHistoryOptions, ClientError, DirectionalCount,
    ExplorerApi, MinedBlock, PageOptions, SearchResult, TopAccount, TrustScore,
};

pub(crate) const TEST_ADDRESS: &str = "0x1234567890abcdef1234567890abcdef12345678";

/// `None` in an optional field makes that call fail.
pub(crate) struct StubApi {
    calls: Mutex<Vec<&'static str>>,
    pub search: Vec<SearchResult>,
    pub trust_score: Option<TrustScore>,
    pub balance_history: Vec<BalanceHistoryEntry>,
    pub mined_blocks: Option<Vec<MinedBlock>>,
    pub top_accounts: Vec<TopAccount>,
    pub counters: AccountCounters,
    pub activity: Option<Value>,
}

impl StubApi {
    pub fn healthy() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            search: vec![SearchResult {
                name: "Graphite Wallet".to_string(),
                kind: "address".to_string(),
                description: "EOA".to_string(),
                address: Some(TEST_ADDRESS.to_string()),
            }],
            trust_score: Some(trust_score("150", "1", "3")),
            balance_history: vec![BalanceHistoryEntry {
                block_number: "1024".to_string(),
                time_stamp: "1700000000".to_string(),
                balance: "1500000000000000000".to_string(),
                balance_change: "-500000000000000000".to_string(),
            }],
            mined_blocks: Some(vec![MinedBlock {
                block_number: "2048".to_string(),
                time_stamp: "1700000100".to_string(),
                block_reward: "2000000000000000000".to_string(),
            }]),
            top_accounts: vec![
                TopAccount {
                    address: "0xaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa".to_string(),
                    balance: "9000000000000000000000".to_string(),
                    percentage: "12.5".to_string(),
                    transaction_count: "420".to_string(),
                },
                TopAccount {
                    address: "0xbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb".to_string(),
                    balance: "1000000000000000000000".to_string(),
                    percentage: "1.25".to_string(),
                    transaction_count: "17".to_string(),
                },
            ],
            counters: AccountCounters {
                gas_used: "21000".to_string(),
                transaction_count: DirectionalCount {
                    total: "5".to_string(),
                    incoming: "3".to_string(),
                    outgoing: "2".to_string(),
                },
                produced_block_count: "1".to_string(),
                ..AccountCounters::default()
            },
            activity: Some(json!({ "transactions": [] })),
        }
    }

    pub fn calls(&self) -> Vec<&'static str> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self, operation: &str) -> usize {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|call| **call == operation)
            .count()
    }

    fn record(&self, operation: &'static str) {
        self.calls.lock().unwrap().push(operation);
    }
}

pub(crate) fn trust_score(reputation: &str, kyc_level: &str, filter_level: &str) -> TrustScore {
    TrustScore {
        activated: true,
        activation_block_number: Some("100".to_string()),
        activation_tx_hash: None,
        filter_last_update_block_number: None,
        filter_level: filter_level.to_string(),
        kyc_last_update_block_number: None,
        kyc_level: kyc_level.to_string(),
        reputation: reputation.to_string(),
    }
}

fn unavailable() -> ClientError {
    ClientError::Network("connection refused".to_string())
}

#[async_trait]
impl ExplorerApi for StubApi {
    async fn search(&self, _query: &str) -> Result<Vec<SearchResult>, ClientError> {
        self.record("search");
        Ok(self.search.clone())
    }

    async fn trust_score(&self, _address: &str) -> Result<TrustScore, ClientError> {
        self.record("trust_score");
        self.trust_score.clone().ok_or_else(|| {
            ClientError::envelope("trustScore", "0", "NOTOK")
        })
    }

    async fn balance_history(
        &self,
        _address: &str,
        _options: &BalanceHistoryOptions,
    ) -> Result<Vec<BalanceHistoryEntry>, ClientError> {
        self.record("balance_history");
        Ok(self.balance_history.clone())
    }

    async fn mined_blocks(
        &self,
        _address: &str,
        _page: &PageOptions,
    ) -> Result<Vec<MinedBlock>, ClientError> {
        self.record("mined_blocks");
        self.mined_blocks.clone().ok_or_else(unavailable)
    }

    async fn top_accounts(&self, _page: &PageOptions) -> Result<Vec<TopAccount>, ClientError> {
        self.record("top_accounts");
        Ok(self.top_accounts.clone())
    }

    async fn account_counters(&self, _address: &str) -> Result<AccountCounters, ClientError> {
        self.record("account_counters");
        Ok(self.counters.clone())
    }

    async fn recent_activity(&self, _address: &str) -> Result<Value, ClientError> {
        self.record("recent_activity");
        self.activity.clone().ok_or_else(unavailable)
    }
}
