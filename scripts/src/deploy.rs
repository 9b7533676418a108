//! The deploy script: token, crowdfunding contract, then a funded test campaign.
//!
//! Every step waits for the previous one. A reverted step aborts the script
//! with a [`DeployError`] naming it; nothing is retried.

use std::fmt::Debug;

use crowdfunding::CrowdfundingClient;
use soroban_sdk::{testutils::Address as _, token, Address, Env, InvokeError, String};
use tracing::info;

use crate::config::Config;
use crate::errors::{DeployError, Result};
use crate::ignition::{crowdfunding_module, strkey, ContractRegistry, DeployedModule, CROWDFUNDING};

/// How long the contribution allowance stays valid (~1 day of ledgers).
const ALLOWANCE_LEDGERS: u32 = 17_280;

/// What the script deployed and did.
#[derive(Debug, Clone)]
pub struct DeployReport {
    pub deployer: Address,
    pub token: Address,
    pub module: DeployedModule,
    pub crowdfunding: Address,
    pub campaign_id: u64,
    pub raised: i128,
}

/// Run the script against `env`.
///
/// The caller decides how transactions are authorised; the sandbox binary
/// mocks every signature for the generated deployer account.
pub fn run(env: &Env, config: &Config) -> Result<DeployReport> {
    let deployer = Address::generate(env);
    info!("Deploying contracts with the account: {}", strkey(&deployer)?);

    // Token
    let sac = env.register_stellar_asset_contract_v2(deployer.clone());
    let token_address = sac.address();
    check(
        "mint",
        token::StellarAssetClient::new(env, &token_address)
            .try_mint(&deployer, &config.initial_supply),
    )?;
    info!("Token deployed at: {}", strkey(&token_address)?);

    // Crowdfunding
    let module = crowdfunding_module()?.deploy(env, &ContractRegistry::with_defaults())?;
    let crowdfunding = module
        .address(CROWDFUNDING)
        .cloned()
        .ok_or_else(|| DeployError::UnknownContract(CROWDFUNDING.to_string()))?;
    info!("Crowdfunding contract deployed at: {}", strkey(&crowdfunding)?);

    let client = CrowdfundingClient::new(env, &crowdfunding);

    info!("Creating a test campaign...");
    let campaign_id = check(
        "createCampaign",
        client.try_create_campaign(
            &deployer,
            &String::from_str(env, &config.campaign_title),
            &String::from_str(env, &config.campaign_description),
            &config.campaign_goal,
            &token_address,
        ),
    )?;
    info!("Test campaign created! (id {campaign_id})");

    info!("Funding the campaign...");
    let expiration = env.ledger().sequence() + ALLOWANCE_LEDGERS;
    check(
        "approve",
        token::Client::new(env, &token_address).try_approve(
            &deployer,
            &crowdfunding,
            &config.contribution,
            &expiration,
        ),
    )?;
    check(
        "contribute",
        client.try_contribute(&campaign_id, &deployer, &config.contribution),
    )?;
    let raised = check("getCampaign", client.try_get_campaign(&campaign_id))?.raised;
    info!("Campaign funded successfully! (raised {raised})");

    Ok(DeployReport {
        deployer,
        token: token_address,
        module,
        crowdfunding,
        campaign_id,
        raised,
    })
}

/// Unwrap the result of a generated `try_*` client call.
fn check<T, C, E>(
    step: &'static str,
    result: std::result::Result<std::result::Result<T, C>, std::result::Result<E, InvokeError>>,
) -> Result<T>
where
    C: Debug,
    E: Debug,
{
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(e)) => Err(DeployError::Conversion {
            step,
            detail: format!("{e:?}"),
        }),
        Err(Ok(e)) => Err(DeployError::Reverted {
            step,
            detail: format!("{e:?}"),
        }),
        Err(Err(e)) => Err(DeployError::Invoke {
            step,
            detail: format!("{e:?}"),
        }),
    }
}
