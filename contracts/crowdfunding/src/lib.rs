//! # Crowdfunding Contract
//!
//! A token-based crowdfunding contract. Anyone can open a campaign with a
//! funding goal in a given token; backers contribute through the standard
//! approve / `transfer_from` flow; the creator collects the funds once the
//! goal is met, and backers can take their contribution back while it is not.
//!
//! | Phase        | Entry Point(s)                                   |
//! |--------------|--------------------------------------------------|
//! | Creation     | [`Crowdfunding::create_campaign`]                |
//! | Funding      | [`Crowdfunding::contribute`]                     |
//! | Settlement   | [`Crowdfunding::complete_campaign`], [`Crowdfunding::refund`] |
//! | Queries      | `get_campaign`, `get_contribution`, `campaign_count` |
//!
//! Storage access is delegated to [`storage`], event payloads live in
//! [`events`]. This file holds the entry points and their checks.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, panic_with_error, token, Address, Env, String,
};

pub mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

pub use types::{Campaign, CampaignStatus};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    CampaignNotFound = 1,
    InvalidGoal      = 2,
    InvalidAmount    = 3,
    CampaignClosed   = 4,
    GoalNotReached   = 5,
    GoalReached      = 6,
    NothingToRefund  = 7,
    EmptyTitle       = 8,
    Overflow         = 9,
}

#[contract]
pub struct Crowdfunding;

#[contractimpl]
impl Crowdfunding {
    /// Open a new campaign and return its ID.
    ///
    /// IDs are sequential, the first campaign is `0`.
    /// - `creator` must sign and receives the funds on completion.
    /// - `goal` is expressed in base units of `token` and must be positive.
    pub fn create_campaign(
        env: Env,
        creator: Address,
        title: String,
        description: String,
        goal: i128,
        token: Address,
    ) -> u64 {
        creator.require_auth();

        if goal <= 0 {
            panic_with_error!(&env, Error::InvalidGoal);
        }
        if title.len() == 0 {
            panic_with_error!(&env, Error::EmptyTitle);
        }

        let id = storage::next_campaign_id(&env);
        let config = types::CampaignConfig {
            id,
            creator: creator.clone(),
            title: title.clone(),
            description,
            goal,
            token: token.clone(),
        };
        let state = types::CampaignState {
            raised: 0,
            contributors: 0,
            status: CampaignStatus::Active,
        };
        storage::save_campaign(&env, &config, &state);

        events::emit_campaign_created(
            &env,
            events::CampaignCreated {
                campaign_id: id,
                creator,
                title,
                goal,
                token,
            },
        );
        id
    }

    /// Contribute `amount` of the campaign token.
    ///
    /// The contributor must have approved this contract for at least `amount`
    /// on the token beforehand; the contract pulls the funds with
    /// `transfer_from`.
    pub fn contribute(env: Env, campaign_id: u64, contributor: Address, amount: i128) {
        contributor.require_auth();

        if amount <= 0 {
            panic_with_error!(&env, Error::InvalidAmount);
        }

        let config = storage::load_campaign_config(&env, campaign_id);
        let mut state = storage::load_campaign_state(&env, campaign_id);
        if state.status != CampaignStatus::Active {
            panic_with_error!(&env, Error::CampaignClosed);
        }

        let this = env.current_contract_address();
        token::Client::new(&env, &config.token).transfer_from(&this, &contributor, &this, &amount);

        let previous = storage::get_contribution(&env, campaign_id, &contributor);
        if previous == 0 {
            state.contributors += 1;
        }
        let updated = previous
            .checked_add(amount)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
        state.raised = state
            .raised
            .checked_add(amount)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));

        storage::set_contribution(&env, campaign_id, &contributor, updated);
        storage::save_campaign_state(&env, campaign_id, &state);

        events::emit_funded(&env, campaign_id, contributor, amount);
    }

    /// Release the raised funds to the creator once the goal is met.
    ///
    /// Only the campaign creator can complete it. A campaign completes once.
    pub fn complete_campaign(env: Env, campaign_id: u64) {
        let config = storage::load_campaign_config(&env, campaign_id);
        config.creator.require_auth();

        let mut state = storage::load_campaign_state(&env, campaign_id);
        if state.status != CampaignStatus::Active {
            panic_with_error!(&env, Error::CampaignClosed);
        }
        if state.raised < config.goal {
            panic_with_error!(&env, Error::GoalNotReached);
        }

        let raised = state.raised;
        token::Client::new(&env, &config.token).transfer(
            &env.current_contract_address(),
            &config.creator,
            &raised,
        );

        state.status = CampaignStatus::Completed;
        storage::save_campaign_state(&env, campaign_id, &state);

        events::emit_campaign_completed(&env, campaign_id, raised);
    }

    /// Return the caller's whole outstanding contribution.
    ///
    /// Allowed while the campaign is active and its goal is not met.
    pub fn refund(env: Env, campaign_id: u64, contributor: Address) {
        contributor.require_auth();

        let config = storage::load_campaign_config(&env, campaign_id);
        let mut state = storage::load_campaign_state(&env, campaign_id);
        if state.status != CampaignStatus::Active {
            panic_with_error!(&env, Error::CampaignClosed);
        }
        if state.raised >= config.goal {
            panic_with_error!(&env, Error::GoalReached);
        }

        let amount = storage::get_contribution(&env, campaign_id, &contributor);
        if amount <= 0 {
            panic_with_error!(&env, Error::NothingToRefund);
        }

        // Zero the record before paying out.
        storage::set_contribution(&env, campaign_id, &contributor, 0);
        state.raised -= amount;
        state.contributors -= 1;
        storage::save_campaign_state(&env, campaign_id, &state);

        token::Client::new(&env, &config.token).transfer(
            &env.current_contract_address(),
            &contributor,
            &amount,
        );

        events::emit_refunded(&env, campaign_id, contributor, amount);
    }

    /// Retrieve a campaign by its ID.
    pub fn get_campaign(env: Env, campaign_id: u64) -> Campaign {
        storage::load_campaign(&env, campaign_id)
    }

    /// Outstanding amount `contributor` has in the campaign, 0 if none.
    pub fn get_contribution(env: Env, campaign_id: u64, contributor: Address) -> i128 {
        storage::get_contribution(&env, campaign_id, &contributor)
    }

    /// Number of campaigns created so far.
    pub fn campaign_count(env: Env) -> u64 {
        storage::campaign_count(&env)
    }
}
