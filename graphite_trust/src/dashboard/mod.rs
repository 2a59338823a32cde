//! Dashboard composition
//!
//! The wallet view fetches every card concurrently through the shared query
//! layer; the search view follows the search pipeline.

pub mod cards;
pub mod format;
pub mod tiers;

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::Arc;

use crate::api::{BalanceHistoryOptions, ClientError, GraphiteClient, PageOptions};
use crate::config::Config;
use crate::query::{CacheConfig, Queries, QueryCache, SearchOutcome, SearchPipeline};

pub use cards::{Card, CardBody};
pub use tiers::{ComplianceTier, KycTier, Tone, TrustAssessment, TrustTier};

#[derive(Clone)]
pub struct Dashboard {
    queries: Queries,
    pipeline: SearchPipeline,
    history: BalanceHistoryOptions,
    page: PageOptions,
}

impl Dashboard {
    pub fn new(queries: Queries) -> Self {
        Self {
            pipeline: SearchPipeline::new(queries.clone()),
            queries,
            history: BalanceHistoryOptions::default(),
            page: PageOptions::default(),
        }
    }

    /// Live client plus a session cache sized from `config`
    pub fn from_config(config: &Config) -> Result<Self, ClientError> {
        let client = GraphiteClient::from_config(config)?;
        let cache = QueryCache::new(CacheConfig::from(config));
        Ok(Self::new(Queries::new(Arc::new(client), Arc::new(cache))))
    }

    pub fn with_history_options(mut self, options: BalanceHistoryOptions) -> Self {
        self.history = options;
        self
    }

    /// Page used by the mined blocks and top accounts cards
    pub fn with_page(mut self, page: PageOptions) -> Self {
        self.page = page;
        self
    }

    pub fn queries(&self) -> &Queries {
        &self.queries
    }

    pub async fn wallet(&self, address: &str) -> WalletDashboard {
        self.wallet_at(address, Utc::now()).await
    }

    pub async fn wallet_at(&self, address: &str, now: DateTime<Utc>) -> WalletDashboard {
        let (trust_score, counters, history, mined_blocks, top_accounts) = tokio::join!(
            self.queries.trust_score(address),
            self.queries.account_counters(address),
            self.queries.balance_history(address, &self.history),
            self.queries.mined_blocks(address, &self.page),
            self.queries.top_accounts(&self.page),
        );

        WalletDashboard {
            address: address.to_string(),
            assessment: trust_score.data().map(TrustAssessment::assess),
            cards: vec![
                cards::trust_score_card(&trust_score),
                cards::compliance_card(&trust_score),
                cards::account_counters_card(&counters),
                cards::balance_history_card(&history),
                cards::mined_blocks_card(&mined_blocks, now),
                cards::top_accounts_card(&top_accounts),
            ],
        }
    }

    pub async fn search(&self, query: &str) -> SearchView {
        let outcome = self.pipeline.run(query).await;
        SearchView::new(outcome)
    }
}

fn find_card<'a>(cards: &'a [Card], title: &str) -> Option<&'a Card> {
    cards.iter().find(|card| card.title == title)
}

#[derive(Debug, Clone)]
pub struct WalletDashboard {
    pub address: String,
    pub assessment: Option<TrustAssessment>,
    pub cards: Vec<Card>,
}

impl WalletDashboard {
    pub fn card(&self, title: &str) -> Option<&Card> {
        find_card(&self.cards, title)
    }

    pub fn failed_cards(&self) -> usize {
        self.cards.iter().filter(|card| card.is_error()).count()
    }
}

impl fmt::Display for WalletDashboard {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Wallet {}", format::shorten_address(&self.address))?;
        for card in &self.cards {
            writeln!(f)?;
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone)]
pub struct SearchView {
    pub outcome: SearchOutcome,
    pub cards: Vec<Card>,
}

impl SearchView {
    fn new(outcome: SearchOutcome) -> Self {
        let cards = vec![
            cards::search_results_card(&outcome.search),
            cards::trust_score_card(&outcome.trust_score),
            cards::recent_activity_card(&outcome.activity),
        ];
        Self { outcome, cards }
    }

    pub fn card(&self, title: &str) -> Option<&Card> {
        find_card(&self.cards, title)
    }

    pub fn selected_address(&self) -> Option<&str> {
        self.outcome.selected_address.as_deref()
    }
}

impl fmt::Display for SearchView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Search \"{}\"", self.outcome.query)?;
        for card in &self.cards {
            writeln!(f)?;
            write!(f, "{}", card)?;
        }
        Ok(())
    }
}
