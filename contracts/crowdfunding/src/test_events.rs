extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events},
    token, vec, Address, Env, IntoVal, String, TryIntoVal,
};

use crate::events::{CampaignCompleted, CampaignCreated, Funded, Refunded};
use crate::storage::DAY_IN_LEDGERS;
use crate::{Crowdfunding, CrowdfundingClient};

struct Setup<'a> {
    env: Env,
    client: CrowdfundingClient<'a>,
    token: token::Client<'a>,
    owner: Address,
    addr1: Address,
    addr2: Address,
}

/// Deploy a token and the contract, then hand 1000 tokens to `addr1` and `addr2`.
fn setup<'a>() -> Setup<'a> {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let addr1 = Address::generate(&env);
    let addr2 = Address::generate(&env);

    let sac = env.register_stellar_asset_contract_v2(owner.clone());
    let token = token::Client::new(&env, &sac.address());
    let minter = token::StellarAssetClient::new(&env, &sac.address());
    minter.mint(&owner, &1_000_000);
    token.transfer(&owner, &addr1, &1_000);
    token.transfer(&owner, &addr2, &1_000);

    let contract_id = env.register(Crowdfunding, ());
    let client = CrowdfundingClient::new(&env, &contract_id);

    Setup {
        env,
        client,
        token,
        owner,
        addr1,
        addr2,
    }
}

fn create_campaign(s: &Setup, goal: i128) -> u64 {
    s.client.create_campaign(
        &s.owner,
        &String::from_str(&s.env, "Test Campaign"),
        &String::from_str(&s.env, "A sample"),
        &goal,
        &s.token.address,
    )
}

fn approve_and_contribute(s: &Setup, campaign_id: u64, from: &Address, amount: i128) {
    let expiration = s.env.ledger().sequence() + DAY_IN_LEDGERS;
    s.token.approve(from, &s.client.address, &amount, &expiration);
    s.client.contribute(&campaign_id, from, &amount);
}

#[test]
fn test_campaign_created_event() {
    let s = setup();
    let id = create_campaign(&s, 100);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.client.address);
    let expected_topics = vec![
        &s.env,
        symbol_short!("created").into_val(&s.env),
        id.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: CampaignCreated = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        CampaignCreated {
            campaign_id: 0,
            creator: s.owner.clone(),
            title: String::from_str(&s.env, "Test Campaign"),
            goal: 100,
            token: s.token.address.clone(),
        }
    );
}

#[test]
fn test_funded_event() {
    let s = setup();
    let id = create_campaign(&s, 100);

    approve_and_contribute(&s, id, &s.addr1, 50);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.client.address);
    let expected_topics = vec![
        &s.env,
        symbol_short!("funded").into_val(&s.env),
        id.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: Funded = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        Funded {
            campaign_id: 0,
            contributor: s.addr1.clone(),
            amount: 50,
        }
    );
}

#[test]
fn test_campaign_completed_event_when_goal_met() {
    let s = setup();
    let id = create_campaign(&s, 100);
    approve_and_contribute(&s, id, &s.addr1, 100);

    s.client.complete_campaign(&id);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.client.address);
    let expected_topics = vec![
        &s.env,
        symbol_short!("completed").into_val(&s.env),
        id.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: CampaignCompleted = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        CampaignCompleted {
            campaign_id: 0,
            raised: 100,
        }
    );
}

#[test]
fn test_refunded_event_when_goal_not_met() {
    let s = setup();
    let id = create_campaign(&s, 100);
    approve_and_contribute(&s, id, &s.addr1, 50);

    s.client.refund(&id, &s.addr1);

    let all_events = s.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, s.client.address);
    let expected_topics = vec![
        &s.env,
        symbol_short!("refunded").into_val(&s.env),
        id.into_val(&s.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: Refunded = last_event.2.try_into_val(&s.env).unwrap();
    assert_eq!(
        event_data,
        Refunded {
            campaign_id: 0,
            contributor: s.addr1.clone(),
            amount: 50,
        }
    );
    assert_eq!(s.token.balance(&s.addr1), 1_000);
    assert_eq!(s.token.balance(&s.addr2), 1_000);
}
