//! Text cards, one per dashboard panel
//!
//! A card never fails as a whole: a query error becomes that card's error
//! line and the rest of the dashboard renders unaffected.

use chrono::{DateTime, Utc};
use serde_json::Value;
use std::fmt;

use super::format::{
    format_percentage, format_relative_time, format_signed_wei, format_timestamp, format_wei,
    shorten_address,
};
use super::tiers::TrustAssessment;
use crate::api::{
    AccountCounters, BalanceHistoryEntry, DirectionalCount, MinedBlock, SearchResult, TopAccount,
    TrustScore,
};
use crate::query::QueryState;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CardBody {
    Loading,
    Error(String),
    Empty(String),
    Lines(Vec<String>),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Card {
    pub title: &'static str,
    pub body: CardBody,
}

impl Card {
    fn from_state<T, F>(
        title: &'static str,
        subject: &str,
        empty: &str,
        state: &QueryState<T>,
        render: F,
    ) -> Self
    where
        F: FnOnce(&T) -> Vec<String>,
    {
        let body = match state {
            QueryState::Loading => CardBody::Loading,
            QueryState::Failed(_) => {
                CardBody::Error(format!("Error loading {}. Please try again.", subject))
            }
            QueryState::Idle => CardBody::Empty(empty.to_string()),
            QueryState::Ready(data) => {
                let lines = render(data);
                if lines.is_empty() {
                    CardBody::Empty(empty.to_string())
                } else {
                    CardBody::Lines(lines)
                }
            }
        };
        Card { title, body }
    }

    pub fn is_error(&self) -> bool {
        matches!(self.body, CardBody::Error(_))
    }

    /// Body as plain lines, whatever its state
    pub fn lines(&self) -> Vec<&str> {
        match &self.body {
            CardBody::Loading => vec!["Loading..."],
            CardBody::Error(message) | CardBody::Empty(message) => vec![message.as_str()],
            CardBody::Lines(lines) => lines.iter().map(String::as_str).collect(),
        }
    }
}

impl fmt::Display for Card {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ==", self.title)?;
        for line in self.lines() {
            writeln!(f, "  {}", line)?;
        }
        Ok(())
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

pub fn trust_score_card(state: &QueryState<TrustScore>) -> Card {
    Card::from_state(
        "Trust Score",
        "trust score",
        "No trust score available",
        state,
        |score| {
            let assessment = TrustAssessment::assess(score);
            let mut lines = vec![
                format!("{} ({})", assessment.trust, assessment.trust.tone().as_str()),
                format!("Reputation: {}", assessment.reputation),
                format!("KYC: {} (level {})", assessment.kyc, assessment.kyc_level),
                format!("Activated: {}", yes_no(score.activated)),
            ];
            if let Some(block) = &score.activation_block_number {
                lines.push(format!("Activation block: {}", block));
            }
            if let Some(block) = &score.kyc_last_update_block_number {
                lines.push(format!("KYC updated at block: {}", block));
            }
            lines
        },
    )
}

pub fn compliance_card(state: &QueryState<TrustScore>) -> Card {
    Card::from_state(
        "Compliance",
        "compliance data",
        "No compliance data available",
        state,
        |score| {
            let assessment = TrustAssessment::assess(score);
            let mut lines = vec![
                format!(
                    "{} ({})",
                    assessment.compliance,
                    assessment.compliance.tone().as_str()
                ),
                format!("Filter level: {}", assessment.filter_level),
            ];
            if let Some(block) = &score.filter_last_update_block_number {
                lines.push(format!("Filter updated at block: {}", block));
            }
            lines
        },
    )
}

fn directional(label: &str, count: &DirectionalCount) -> String {
    format!(
        "{}: {} (in {}, out {})",
        label, count.total, count.incoming, count.outgoing
    )
}

pub fn account_counters_card(state: &QueryState<AccountCounters>) -> Card {
    Card::from_state(
        "Account Counters",
        "account counters",
        "No account counters available",
        state,
        |counters| {
            vec![
                directional("Transactions", &counters.transaction_count),
                directional("Internal transactions", &counters.internal_transaction_count),
                directional("Token transfers", &counters.token_transfer_count),
                format!("Gas used: {}", counters.gas_used),
                format!("Produced blocks: {}", counters.produced_block_count),
                format!("Balance changes: {}", counters.balance_changes_count),
            ]
        },
    )
}

pub fn balance_history_card(state: &QueryState<Vec<BalanceHistoryEntry>>) -> Card {
    Card::from_state(
        "Balance History",
        "balance history",
        "No balance history available",
        state,
        |entries| {
            entries
                .iter()
                .map(|entry| {
                    format!(
                        "#{}  {}  {} ETH  ({})",
                        entry.block_number,
                        format_timestamp(&entry.time_stamp),
                        format_wei(&entry.balance),
                        format_signed_wei(&entry.balance_change)
                    )
                })
                .collect()
        },
    )
}

pub fn mined_blocks_card(state: &QueryState<Vec<MinedBlock>>, now: DateTime<Utc>) -> Card {
    Card::from_state(
        "Mined Blocks",
        "mined blocks",
        "No mined blocks found",
        state,
        |blocks| {
            blocks
                .iter()
                .map(|block| {
                    let when = block
                        .time_stamp
                        .trim()
                        .parse::<i64>()
                        .map(|ts| format_relative_time(ts, now))
                        .unwrap_or_else(|_| block.time_stamp.clone());
                    format!(
                        "#{}  {}  reward {} ETH",
                        block.block_number,
                        when,
                        format_wei(&block.block_reward)
                    )
                })
                .collect()
        },
    )
}

pub fn top_accounts_card(state: &QueryState<Vec<TopAccount>>) -> Card {
    Card::from_state(
        "Top Accounts",
        "top accounts",
        "No top accounts available",
        state,
        |accounts| {
            accounts
                .iter()
                .enumerate()
                .map(|(rank, account)| {
                    format!(
                        "{}. {}  {} ETH  {}  {} txs",
                        rank + 1,
                        shorten_address(&account.address),
                        format_wei(&account.balance),
                        format_percentage(&account.percentage),
                        account.transaction_count
                    )
                })
                .collect()
        },
    )
}

pub fn search_results_card(state: &QueryState<Vec<SearchResult>>) -> Card {
    Card::from_state(
        "Search Results",
        "search results",
        "No results found",
        state,
        |results| {
            results
                .iter()
                .map(|hit| {
                    let mut line = format!("{} [{}]", hit.name, hit.kind);
                    if !hit.description.is_empty() {
                        line.push_str(&format!(" {}", hit.description));
                    }
                    if let Some(address) = &hit.address {
                        line.push_str(&format!(" ({})", shorten_address(address)));
                    }
                    line
                })
                .collect()
        },
    )
}

/// Activity payloads are passed through as the explorer sends them.
pub fn recent_activity_card(state: &QueryState<Value>) -> Card {
    Card::from_state(
        "Recent Activity",
        "recent activity",
        "No recent activity available",
        state,
        |activity| {
            let is_empty = match activity {
                Value::Null => true,
                Value::Array(items) => items.is_empty(),
                Value::Object(fields) => fields.is_empty(),
                _ => false,
            };
            if is_empty {
                return Vec::new();
            }
            serde_json::to_string_pretty(activity)
                .map(|text| text.lines().map(str::to_string).collect())
                .unwrap_or_default()
        },
    )
}
