//! # Events
//!
//! Every state-changing entry point publishes exactly one event, after all
//! token transfers have succeeded. Topics are `(symbol, campaign_id)` so
//! indexers can filter per campaign; the payload is one of the structs below.
//!
//! | Topic       | Payload              |
//! |-------------|----------------------|
//! | `created`   | [`CampaignCreated`]  |
//! | `funded`    | [`Funded`]           |
//! | `completed` | [`CampaignCompleted`]|
//! | `refunded`  | [`Refunded`]         |

use soroban_sdk::{contracttype, symbol_short, Address, Env, String};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignCreated {
    pub campaign_id: u64,
    pub creator: Address,
    pub title: String,
    pub goal: i128,
    pub token: Address,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Funded {
    pub campaign_id: u64,
    pub contributor: Address,
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CampaignCompleted {
    pub campaign_id: u64,
    pub raised: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Refunded {
    pub campaign_id: u64,
    pub contributor: Address,
    pub amount: i128,
}

pub fn emit_campaign_created(env: &Env, event: CampaignCreated) {
    env.events()
        .publish((symbol_short!("created"), event.campaign_id), event);
}

pub fn emit_funded(env: &Env, campaign_id: u64, contributor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("funded"), campaign_id),
        Funded {
            campaign_id,
            contributor,
            amount,
        },
    );
}

pub fn emit_campaign_completed(env: &Env, campaign_id: u64, raised: i128) {
    env.events().publish(
        (symbol_short!("completed"), campaign_id),
        CampaignCompleted {
            campaign_id,
            raised,
        },
    );
}

pub fn emit_refunded(env: &Env, campaign_id: u64, contributor: Address, amount: i128) {
    env.events().publish(
        (symbol_short!("refunded"), campaign_id),
        Refunded {
            campaign_id,
            contributor,
            amount,
        },
    );
}
