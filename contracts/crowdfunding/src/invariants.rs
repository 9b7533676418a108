#![allow(dead_code)]

extern crate std;

use soroban_sdk::Address;

use crate::types::{Campaign, CampaignStatus};

/// INV-1: The raised total must never be negative.
pub fn assert_raised_non_negative(campaign: &Campaign) {
    assert!(
        campaign.raised >= 0,
        "INV-1 violated: campaign {} has negative raised total ({})",
        campaign.id,
        campaign.raised
    );
}

/// INV-2: Campaign goal must always be positive.
pub fn assert_goal_positive(campaign: &Campaign) {
    assert!(
        campaign.goal > 0,
        "INV-2 violated: campaign {} has non-positive goal ({})",
        campaign.id,
        campaign.goal
    );
}

/// INV-3: A completed campaign reached its goal.
pub fn assert_completed_met_goal(campaign: &Campaign) {
    if campaign.status == CampaignStatus::Completed {
        assert!(
            campaign.raised >= campaign.goal,
            "INV-3 violated: campaign {} completed with {} of {}",
            campaign.id,
            campaign.raised,
            campaign.goal
        );
    }
}

/// INV-4: An active campaign with no contributors holds nothing.
pub fn assert_contributors_consistent(campaign: &Campaign) {
    if campaign.contributors == 0 && campaign.status == CampaignStatus::Active {
        assert_eq!(
            campaign.raised, 0,
            "INV-4 violated: campaign {} has no contributors but raised {}",
            campaign.id, campaign.raised
        );
    }
}

/// INV-5: `raised` equals the sum of the outstanding contributions.
pub fn assert_raised_matches_contributions(campaign: &Campaign, contributions: &[i128]) {
    let sum: i128 = contributions.iter().sum();
    assert_eq!(
        campaign.raised, sum,
        "INV-5 violated: campaign {} raised {} but contributions sum to {}",
        campaign.id, campaign.raised, sum
    );
}

/// INV-6: Campaign IDs are sequential starting from 0.
pub fn assert_sequential_ids(campaigns: &[Campaign]) {
    for (i, campaign) in campaigns.iter().enumerate() {
        assert_eq!(
            campaign.id, i as u64,
            "INV-6 violated: expected id {}, got {}",
            i, campaign.id
        );
    }
}

/// INV-7: Only `Active -> Completed` (or no change) is a valid transition.
pub fn assert_valid_status_transition(from: &CampaignStatus, to: &CampaignStatus) {
    let valid = from == to
        || matches!(
            (from, to),
            (CampaignStatus::Active, CampaignStatus::Completed)
        );

    assert!(
        valid,
        "INV-7 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-8: Fields fixed at creation stay unchanged.
pub fn assert_campaign_immutable_fields(original: &Campaign, current: &Campaign) {
    assert_eq!(original.id, current.id, "INV-8 violated: campaign id changed");
    assert_eq!(
        original.creator, current.creator,
        "INV-8 violated: campaign creator changed"
    );
    assert_eq!(
        original.title, current.title,
        "INV-8 violated: campaign title changed"
    );
    assert_eq!(
        original.description, current.description,
        "INV-8 violated: campaign description changed"
    );
    assert_eq!(original.goal, current.goal, "INV-8 violated: campaign goal changed");
    assert_eq!(
        original.token, current.token,
        "INV-8 violated: campaign token changed"
    );
}

/// INV-9: The contract holds exactly what its active campaigns raised.
pub fn assert_contract_balance_matches(
    contract_balance: i128,
    campaigns: &[Campaign],
    token: &Address,
) {
    let owed: i128 = campaigns
        .iter()
        .filter(|c| &c.token == token && c.status == CampaignStatus::Active)
        .map(|c| c.raised)
        .sum();
    assert_eq!(
        contract_balance, owed,
        "INV-9 violated: contract holds {} but active campaigns raised {}",
        contract_balance, owed
    );
}

/// Run all stateless campaign invariants.
pub fn assert_all_campaign_invariants(campaign: &Campaign) {
    assert_raised_non_negative(campaign);
    assert_goal_positive(campaign);
    assert_completed_met_goal(campaign);
    assert_contributors_consistent(campaign);
}
