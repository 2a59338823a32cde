use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::time::Duration;

use super::errors::ClientError;
use super::types::{
    AccountCounters, BalanceHistoryEntry, BalanceHistoryOptions, Envelope, MinedBlock,
    PageOptions, RawTrustScore, SearchResult, TopAccount, TrustScore,
};
use super::ExplorerApi;
use crate::config::Config;

type Params = Vec<(&'static str, String)>;

/// Graphite explorer API client
///
/// Every call is a single GET: no retries, no local validation, and no
/// timeout beyond what the configuration asks of the HTTP client.
#[derive(Clone)]
pub struct GraphiteClient {
    client: Client,
    base_url: String,
    api_key: Option<String>,
}

impl GraphiteClient {
    /// Create a new explorer client
    pub fn new(base_url: impl Into<String>, api_key: Option<String>) -> Result<Self, ClientError> {
        Self::build(base_url.into(), api_key, None)
    }

    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        Self::build(
            config.api_base_url.clone(),
            config.api_key.clone(),
            config.http_timeout,
        )
    }

    fn build(
        base_url: String,
        api_key: Option<String>,
        timeout: Option<Duration>,
    ) -> Result<Self, ClientError> {
        if base_url.trim().is_empty() {
            return Err(ClientError::Config("base_url is empty".to_string()));
        }

        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| ClientError::Config(format!("failed to build http client: {e}")))?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.filter(|key| !key.is_empty()),
        })
    }

    /// Get the API base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Free-text entity search
    pub async fn search_entity(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
        let url = self.join("search");
        let params = vec![("query", query.to_string())];
        let envelope = self.get_envelope("search", &url, &params).await?;
        decode_result("search", envelope)
    }

    /// KYC level, filter level and reputation of a wallet
    pub async fn get_trust_score(&self, address: &str) -> Result<TrustScore, ClientError> {
        let mut params = account_params("kyc");
        params.push(("address", address.to_string()));
        params.push(("tag", "latest".to_string()));
        let params = self.with_api_key(params);

        let envelope = self.get_envelope("trust_score", &self.base_url, &params).await?;
        if !envelope.is_ok() {
            warn!(
                "trust score rejected for {}: status={} message={}",
                address,
                envelope.status_text(),
                envelope.message
            );
            return Err(ClientError::envelope(
                "trust_score",
                &envelope.status_text(),
                &envelope.message,
            ));
        }

        let result = match envelope.result {
            Some(result) if !result.is_null() => result,
            _ => {
                return Err(ClientError::envelope(
                    "trust_score",
                    &envelope.status_text(),
                    &envelope.message,
                ))
            }
        };

        let raw: RawTrustScore =
            serde_json::from_value(result).map_err(|e| ClientError::decode("trust_score", e))?;
        Ok(raw.into())
    }

    pub async fn get_account_counters(&self, address: &str) -> Result<AccountCounters, ClientError> {
        let mut params = account_params("counters");
        params.push(("address", address.to_string()));
        params.push(("tag", "latest".to_string()));
        let params = self.with_api_key(params);

        let envelope = self
            .get_envelope("account_counters", &self.base_url, &params)
            .await?;
        decode_result("account_counters", envelope)
    }

    pub async fn get_balance_history(
        &self,
        address: &str,
        options: &BalanceHistoryOptions,
    ) -> Result<Vec<BalanceHistoryEntry>, ClientError> {
        let mut params = account_params("balancehistory");
        params.push(("address", address.to_string()));
        if let Some(start) = options.start_timestamp {
            params.push(("starttimestamp", start.to_string()));
        }
        if let Some(end) = options.end_timestamp {
            params.push(("endtimestamp", end.to_string()));
        }
        params.push(("offset", options.page.offset.to_string()));
        params.push(("limit", options.page.limit.to_string()));
        params.push(("sort", options.sort.as_str().to_string()));
        let params = self.with_api_key(params);

        let envelope = self
            .get_envelope("balance_history", &self.base_url, &params)
            .await?;
        decode_result("balance_history", envelope)
    }

    pub async fn get_mined_blocks(
        &self,
        address: &str,
        page: &PageOptions,
    ) -> Result<Vec<MinedBlock>, ClientError> {
        let mut params = account_params("getminedblocks");
        params.push(("address", address.to_string()));
        params.push(("offset", page.offset.to_string()));
        params.push(("limit", page.limit.to_string()));
        let params = self.with_api_key(params);

        let envelope = self
            .get_envelope("mined_blocks", &self.base_url, &params)
            .await?;
        decode_result("mined_blocks", envelope)
    }

    /// Richest accounts, in the order the explorer ranks them
    pub async fn get_top_accounts(&self, page: &PageOptions) -> Result<Vec<TopAccount>, ClientError> {
        let mut params = account_params("topbalance");
        params.push(("offset", page.offset.to_string()));
        params.push(("limit", page.limit.to_string()));
        let params = self.with_api_key(params);

        let envelope = self
            .get_envelope("top_accounts", &self.base_url, &params)
            .await?;
        decode_result("top_accounts", envelope)
    }

    /// Recent activity feed; this endpoint is not enveloped
    pub async fn get_recent_activity(&self, address: &str) -> Result<Value, ClientError> {
        let url = self.join(&format!("activity/{address}"));
        let body = self.get_body("recent_activity", &url, &[]).await?;
        serde_json::from_str(&body).map_err(|e| ClientError::decode("recent_activity", e))
    }

    fn join(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    fn with_api_key(&self, mut params: Params) -> Params {
        if let Some(key) = &self.api_key {
            params.push(("apikey", key.clone()));
        }
        params
    }

    async fn get_envelope(
        &self,
        operation: &'static str,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<Envelope, ClientError> {
        let body = self.get_body(operation, url, params).await?;
        let envelope: Envelope =
            serde_json::from_str(&body).map_err(|e| ClientError::decode(operation, e))?;
        debug!(
            "{} response: status={} message={}",
            operation,
            envelope.status_text(),
            envelope.message
        );
        Ok(envelope)
    }

    async fn get_body(
        &self,
        operation: &'static str,
        url: &str,
        params: &[(&'static str, String)],
    ) -> Result<String, ClientError> {
        debug!("{} -> GET {}", operation, url);

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| {
                warn!("{} request failed: {}", operation, e);
                ClientError::Network(e.to_string())
            })?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            warn!("{} returned http {}", operation, status.as_u16());
            return Err(ClientError::HttpStatus {
                status: status.as_u16(),
                body,
            });
        }

        Ok(body)
    }
}

fn account_params(action: &str) -> Params {
    vec![
        ("module", "account".to_string()),
        ("action", action.to_string()),
    ]
}

/// Lenient unwrap used by the list and counter endpoints: any status is
/// accepted as long as `result` is present and decodes.
fn decode_result<T>(operation: &'static str, envelope: Envelope) -> Result<T, ClientError>
where
    T: DeserializeOwned,
{
    let ok = envelope.is_ok();
    let status = envelope.status_text();
    let Envelope { message, result, .. } = envelope;

    let result = match result {
        Some(result) if !result.is_null() => result,
        _ => return Err(ClientError::envelope(operation, &status, &message)),
    };

    serde_json::from_value(result).map_err(|e| {
        // A string `result` next to status "0" is the explorer's error text.
        if !ok {
            ClientError::envelope(operation, &status, &message)
        } else {
            ClientError::decode(operation, e)
        }
    })
}

#[async_trait]
impl ExplorerApi for GraphiteClient {
    async fn search(&self, query: &str) -> Result<Vec<SearchResult>, ClientError> {
        self.search_entity(query).await
    }

    async fn trust_score(&self, address: &str) -> Result<TrustScore, ClientError> {
        self.get_trust_score(address).await
    }

    async fn balance_history(
        &self,
        address: &str,
        options: &BalanceHistoryOptions,
    ) -> Result<Vec<BalanceHistoryEntry>, ClientError> {
        self.get_balance_history(address, options).await
    }

    async fn mined_blocks(
        &self,
        address: &str,
        page: &PageOptions,
    ) -> Result<Vec<MinedBlock>, ClientError> {
        self.get_mined_blocks(address, page).await
    }

    async fn top_accounts(&self, page: &PageOptions) -> Result<Vec<TopAccount>, ClientError> {
        self.get_top_accounts(page).await
    }

    async fn account_counters(&self, address: &str) -> Result<AccountCounters, ClientError> {
        self.get_account_counters(address).await
    }

    async fn recent_activity(&self, address: &str) -> Result<Value, ClientError> {
        self.get_recent_activity(address).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SortOrder;
    use std::collections::HashMap;
    use wiremock::matchers::{method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const ADDRESS: &str = "0x0000000000000000000000000000000000000000";

    fn client_for(server: &MockServer) -> GraphiteClient {
        GraphiteClient::new(format!("{}/api", server.uri()), Some("test-key".to_string())).unwrap()
    }

    async fn last_query(server: &MockServer) -> HashMap<String, String> {
        let requests = server.received_requests().await.unwrap();
        let request = requests.last().expect("no request recorded");
        request.url.query_pairs().into_owned().collect()
    }

    #[tokio::test]
    async fn trust_score_success() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("module", "account"))
            .and(query_param("action", "kyc"))
            .and(query_param("address", ADDRESS))
            .and(query_param("tag", "latest"))
            .and(query_param("apikey", "test-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": {
                    "activated": true,
                    "activationBlockNumber": "12",
                    "activationTxHash": null,
                    "reputation": "150",
                    "kycLevel": "2",
                    "filterLevel": "3"
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let score = client_for(&server).get_trust_score(ADDRESS).await.unwrap();
        assert!(score.activated);
        assert_eq!(score.reputation, "150");
        assert_eq!(score.kyc_level, "2");
        assert_eq!(score.filter_level, "3");
        assert_eq!(score.activation_block_number.as_deref(), Some("12"));
        assert_eq!(score.activation_tx_hash, None);
    }

    #[tokio::test]
    async fn trust_score_defaults_missing_fields() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": { "activated": "yes", "filterLevel": "1" }
            })))
            .mount(&server)
            .await;

        let score = client_for(&server).get_trust_score(ADDRESS).await.unwrap();
        assert!(!score.activated);
        assert_eq!(score.reputation, "0");
        assert_eq!(score.kyc_level, "0");
    }

    #[tokio::test]
    async fn trust_score_rejects_non_ok_status_even_with_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "0",
                "message": "NOTOK",
                "result": { "activated": true, "reputation": "900" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_trust_score(ADDRESS).await.unwrap_err();
        assert!(matches!(err, ClientError::Envelope { .. }));
        assert!(!err.is_transport());
    }

    #[tokio::test]
    async fn trust_score_requires_string_status() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": 1,
                "message": "OK",
                "result": { "activated": true, "reputation": "150" }
            })))
            .mount(&server)
            .await;

        let err = client_for(&server).get_trust_score(ADDRESS).await.unwrap_err();
        match err {
            ClientError::Envelope { ref status, .. } => assert_eq!(status, "1"),
            other => panic!("expected envelope error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn trust_score_rejects_missing_result() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({ "status": "1", "message": "OK" })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server).get_trust_score(ADDRESS).await.unwrap_err();
        assert!(matches!(err, ClientError::Envelope { .. }));
    }

    #[tokio::test]
    async fn balance_history_default_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "balancehistory"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": [{
                    "blockNumber": "100",
                    "timeStamp": "1700000000",
                    "balance": "1000000000000000000",
                    "balanceChange": "+500000000000000000"
                }]
            })))
            .mount(&server)
            .await;

        let entries = client_for(&server)
            .get_balance_history(ADDRESS, &BalanceHistoryOptions::default())
            .await
            .unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].block_number, "100");

        let query = last_query(&server).await;
        assert_eq!(query.get("offset").map(String::as_str), Some("0"));
        assert_eq!(query.get("limit").map(String::as_str), Some("10"));
        assert_eq!(query.get("sort").map(String::as_str), Some("desc"));
        assert!(!query.contains_key("starttimestamp"));
        assert!(!query.contains_key("endtimestamp"));
    }

    #[tokio::test]
    async fn balance_history_passes_explicit_options() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": []
            })))
            .mount(&server)
            .await;

        let options = BalanceHistoryOptions::default()
            .between(1_700_000_000, 1_700_003_600)
            .with_page(20, 0)
            .with_sort(SortOrder::Asc);
        client_for(&server)
            .get_balance_history(ADDRESS, &options)
            .await
            .unwrap();

        let query = last_query(&server).await;
        assert_eq!(query["starttimestamp"], "1700000000");
        assert_eq!(query["endtimestamp"], "1700003600");
        assert_eq!(query["offset"], "20");
        assert_eq!(query["limit"], "0");
        assert_eq!(query["sort"], "asc");
    }

    #[tokio::test]
    async fn search_encodes_query() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/search"))
            .and(query_param("query", "graphite bridge & co"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": [
                    { "name": "Graphite Bridge", "type": "contract", "description": "Bridge" }
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let results = client_for(&server)
            .search_entity("graphite bridge & co")
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].kind, "contract");

        // search is not an account module call and carries no key
        assert!(!last_query(&server).await.contains_key("apikey"));
    }

    #[tokio::test]
    async fn top_accounts_keep_upstream_order() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "topbalance"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": [
                    { "address": "0xb", "balance": "1", "percentage": "0.1", "transactionCount": "3" },
                    { "address": "0xa", "balance": "9", "percentage": "0.9", "transactionCount": "7" }
                ]
            })))
            .mount(&server)
            .await;

        let accounts = client_for(&server)
            .get_top_accounts(&PageOptions::default())
            .await
            .unwrap();
        let order: Vec<&str> = accounts.iter().map(|a| a.address.as_str()).collect();
        assert_eq!(order, vec!["0xb", "0xa"]);
    }

    #[tokio::test]
    async fn list_endpoint_reports_explorer_error_text() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "0",
                "message": "NOTOK",
                "result": "Missing or invalid API key"
            })))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_mined_blocks(ADDRESS, &PageOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Envelope { .. }));
    }

    #[tokio::test]
    async fn mined_blocks_http_failure_is_transport() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .respond_with(ResponseTemplate::new(503).set_body_string("maintenance"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .get_mined_blocks(ADDRESS, &PageOptions::default())
            .await
            .unwrap_err();
        match err {
            ClientError::HttpStatus { status, ref body } => {
                assert_eq!(status, 503);
                assert_eq!(body, "maintenance");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn unreachable_upstream_is_network_error() {
        let client = GraphiteClient::new("http://127.0.0.1:1/api", None).unwrap();
        let err = client
            .get_top_accounts(&PageOptions::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ClientError::Network(_)));
        assert!(err.is_transport());
    }

    #[tokio::test]
    async fn account_counters_decode() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api"))
            .and(query_param("action", "counters"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "status": "1",
                "message": "OK",
                "result": {
                    "gasUsed": "21000",
                    "transactionCount": { "total": "5", "incoming": "2", "outgoing": "3" },
                    "internalTransactionCount": { "total": "0", "incoming": "0", "outgoing": "0" },
                    "tokenTransferCount": { "total": 4, "incoming": 1, "outgoing": 3 },
                    "producedBlockCount": "7",
                    "balanceChangesCount": "9"
                }
            })))
            .mount(&server)
            .await;

        let counters = client_for(&server)
            .get_account_counters(ADDRESS)
            .await
            .unwrap();
        assert_eq!(counters.gas_used, "21000");
        assert_eq!(counters.transaction_count.outgoing, "3");
        assert_eq!(counters.token_transfer_count.total, "4");
        assert_eq!(counters.produced_block_count, "7");
    }

    #[tokio::test]
    async fn recent_activity_is_raw_json() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path(format!("/api/activity/{ADDRESS}")))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!([{ "hash": "0xabc", "value": "1" }])),
            )
            .mount(&server)
            .await;

        let activity = client_for(&server)
            .get_recent_activity(ADDRESS)
            .await
            .unwrap();
        assert_eq!(activity[0]["hash"], "0xabc");
    }

    #[test]
    fn empty_base_url_is_rejected() {
        assert!(matches!(
            GraphiteClient::new("  ", None),
            Err(ClientError::Config(_))
        ));
    }

    #[test]
    fn empty_api_key_is_dropped() {
        let client = GraphiteClient::new("http://localhost:3001/api/", Some(String::new())).unwrap();
        assert_eq!(client.base_url(), "http://localhost:3001/api");
        assert!(client.api_key.is_none());
    }
}
