//! Canonical event types emitted by the crowdfunding contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/crowdfunding/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the crowdfunding contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// A campaign was opened (`created` topic).
    CampaignCreated,
    /// A contribution was made (`funded` topic).
    Funded,
    /// The creator collected the raised funds (`completed` topic).
    CampaignCompleted,
    /// A contributor took their contribution back (`refunded` topic).
    Refunded,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "created" => Self::CampaignCreated,
            "funded" => Self::Funded,
            "completed" => Self::CampaignCompleted,
            "refunded" => Self::Refunded,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::CampaignCreated => "campaign_created",
            Self::Funded => "funded",
            Self::CampaignCompleted => "campaign_completed",
            Self::Refunded => "refunded",
            Self::Unknown => "unknown",
        }
    }

    /// Inverse of [`EventKind::as_str`].
    pub fn from_stored(s: &str) -> Self {
        match s {
            "campaign_created" => Self::CampaignCreated,
            "funded" => Self::Funded,
            "campaign_completed" => Self::CampaignCompleted,
            "refunded" => Self::Refunded,
            _ => Self::Unknown,
        }
    }
}

/// A fully decoded crowdfunding event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignEvent {
    pub event_type: String,
    pub campaign_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub campaign_id: Option<String>,
    pub actor: Option<String>,
    pub amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// A campaign's state as reconstructed from its indexed events.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CampaignSummary {
    pub campaign_id: String,
    pub creator: Option<String>,
    /// Amounts are kept as strings: contract amounts are `i128`.
    pub goal: Option<String>,
    pub raised: String,
    pub contributions: u32,
    pub refunds: u32,
    pub completed: bool,
    pub last_ledger: i64,
}

impl CampaignSummary {
    /// Fold `events` (ordered by ledger) into a summary.
    ///
    /// Returns `None` when there are no events. Amounts that fail to parse are
    /// counted but contribute nothing to `raised`.
    pub fn from_events(campaign_id: &str, events: &[EventRecord]) -> Option<Self> {
        if events.is_empty() {
            return None;
        }

        let mut summary = CampaignSummary {
            campaign_id: campaign_id.to_string(),
            ..Default::default()
        };
        let mut raised: i128 = 0;

        for ev in events {
            let amount = ev
                .amount
                .as_deref()
                .and_then(|a| a.parse::<i128>().ok())
                .unwrap_or(0);
            match EventKind::from_stored(&ev.event_type) {
                EventKind::CampaignCreated => {
                    summary.creator = ev.actor.clone();
                    summary.goal = ev.amount.clone();
                }
                EventKind::Funded => {
                    summary.contributions += 1;
                    raised = raised.saturating_add(amount);
                }
                EventKind::Refunded => {
                    summary.refunds += 1;
                    raised = raised.saturating_sub(amount);
                }
                EventKind::CampaignCompleted => {
                    summary.completed = true;
                    raised = amount;
                }
                EventKind::Unknown => {}
            }
            summary.last_ledger = summary.last_ledger.max(ev.ledger);
        }

        summary.raised = raised.to_string();
        Some(summary)
    }
}
