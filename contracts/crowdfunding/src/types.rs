//! # Types
//!
//! Shared data structures used across the crowdfunding contract.
//!
//! ## Config / State split
//!
//! A `Campaign` is stored as two ledger entries:
//!
//! - [`CampaignConfig`]: written once by `create_campaign`, never mutated.
//! - [`CampaignState`]: rewritten on every contribution, refund and completion.
//!
//! The public API returns the reconstructed [`Campaign`].
//!
//! ## Lifecycle
//!
//! ```text
//! Active ──► Completed
//! ```
//!
//! `Completed` is terminal. Refunds are only possible while `Active`.

use soroban_sdk::{contracttype, Address, String};

/// Lifecycle status of a campaign.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum CampaignStatus {
    /// Accepting contributions and refund requests.
    Active,
    /// Goal met; raised funds released to the creator.
    Completed,
}

/// Immutable campaign configuration.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignConfig {
    pub id: u64,
    pub creator: Address,
    pub title: String,
    pub description: String,
    pub goal: i128,
    pub token: Address,
}

/// Mutable campaign state.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignState {
    pub raised: i128,
    pub contributors: u32,
    pub status: CampaignStatus,
}

/// Full on-chain view of a campaign.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Campaign {
    /// Sequential identifier, starting at 0.
    pub id: u64,
    /// Address that created the campaign and receives the funds.
    pub creator: Address,
    pub title: String,
    pub description: String,
    /// Target amount, in base units of `token`.
    pub goal: i128,
    /// Token contributions are made in.
    pub token: Address,
    /// Outstanding contributed amount (refunds are subtracted).
    pub raised: i128,
    /// Number of contributors with a non-zero outstanding amount.
    pub contributors: u32,
    pub status: CampaignStatus,
}

impl Campaign {
    pub(crate) fn from_parts(config: CampaignConfig, state: CampaignState) -> Self {
        Campaign {
            id: config.id,
            creator: config.creator,
            title: config.title,
            description: config.description,
            goal: config.goal,
            token: config.token,
            raised: state.raised,
            contributors: state.contributors,
            status: state.status,
        }
    }
}
