//! # Storage
//!
//! Typed helpers over the two Soroban storage tiers used by the contract.
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key             | Type  | Description                         |
//! |-----------------|-------|-------------------------------------|
//! | `CampaignCount` | `u64` | Auto-increment campaign ID counter  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                       | Type             | Description                   |
//! |---------------------------|------------------|-------------------------------|
//! | `CampConfig(id)`          | `CampaignConfig` | Immutable campaign settings   |
//! | `CampState(id)`           | `CampaignState`  | Raised total, status          |
//! | `Contribution(id, addr)`  | `i128`           | Outstanding amount per backer |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days remaining.

use soroban_sdk::{contracttype, panic_with_error, Address, Env};

use crate::types::{Campaign, CampaignConfig, CampaignState};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
pub(crate) const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Global auto-increment counter for campaign IDs (Instance).
    CampaignCount,
    /// Immutable campaign configuration keyed by ID (Persistent).
    CampConfig(u64),
    /// Mutable campaign state keyed by ID (Persistent).
    CampState(u64),
    /// Outstanding contribution of one backer to one campaign (Persistent).
    Contribution(u64, Address),
}

// ── Instance Storage Helpers ─────────────────────────────────────────

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Reads, increments and stores the campaign counter.
/// Returns the pre-increment value, which is the ID of the new campaign.
pub fn next_campaign_id(env: &Env) -> u64 {
    bump_instance(env);
    let current = campaign_count(env);
    env.storage()
        .instance()
        .set(&DataKey::CampaignCount, &(current + 1));
    current
}

/// Number of campaigns created so far.
pub fn campaign_count(env: &Env) -> u64 {
    env.storage()
        .instance()
        .get(&DataKey::CampaignCount)
        .unwrap_or(0)
}

// ── Persistent Storage Helpers ───────────────────────────────────────

fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Save the config and initial state of a new campaign.
pub fn save_campaign(env: &Env, config: &CampaignConfig, state: &CampaignState) {
    let config_key = DataKey::CampConfig(config.id);
    env.storage().persistent().set(&config_key, config);
    bump_persistent(env, &config_key);
    save_campaign_state(env, config.id, state);
}

/// Load the full `Campaign`. Panics with `CampaignNotFound` if absent.
pub fn load_campaign(env: &Env, id: u64) -> Campaign {
    Campaign::from_parts(load_campaign_config(env, id), load_campaign_state(env, id))
}

pub fn load_campaign_config(env: &Env, id: u64) -> CampaignConfig {
    let key = DataKey::CampConfig(id);
    let config: CampaignConfig = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, Error::CampaignNotFound));
    bump_persistent(env, &key);
    config
}

pub fn load_campaign_state(env: &Env, id: u64) -> CampaignState {
    let key = DataKey::CampState(id);
    let state: CampaignState = env
        .storage()
        .persistent()
        .get(&key)
        .unwrap_or_else(|| panic_with_error!(env, Error::CampaignNotFound));
    bump_persistent(env, &key);
    state
}

pub fn save_campaign_state(env: &Env, id: u64, state: &CampaignState) {
    let key = DataKey::CampState(id);
    env.storage().persistent().set(&key, state);
    bump_persistent(env, &key);
}

/// Outstanding contribution of `contributor`; 0 when none is recorded.
pub fn get_contribution(env: &Env, id: u64, contributor: &Address) -> i128 {
    let key = DataKey::Contribution(id, contributor.clone());
    match env.storage().persistent().get::<_, i128>(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

/// Store the outstanding contribution; a zero amount removes the entry.
pub fn set_contribution(env: &Env, id: u64, contributor: &Address, amount: i128) {
    let key = DataKey::Contribution(id, contributor.clone());
    if amount == 0 {
        env.storage().persistent().remove(&key);
    } else {
        env.storage().persistent().set(&key, &amount);
        bump_persistent(env, &key);
    }
}
