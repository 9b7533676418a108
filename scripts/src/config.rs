//! Deploy script parameters loaded from environment variables.

use std::path::PathBuf;

use crate::errors::{DeployError, Result};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// Tokens minted to the deployer right after the token is deployed
    pub initial_supply: i128,
    /// Title of the test campaign
    pub campaign_title: String,
    /// Description of the test campaign
    pub campaign_description: String,
    /// Goal of the test campaign, in token base units
    pub campaign_goal: i128,
    /// Amount the deployer approves and contributes to the test campaign
    pub contribution: i128,
    /// Where to write the deployed addresses (JSON); skipped when unset
    pub deployments_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            initial_supply: 1_000_000,
            campaign_title: "Test Campaign".to_string(),
            campaign_description: "A sample project".to_string(),
            campaign_goal: 100,
            contribution: 100,
            deployments_path: None,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build a config from an arbitrary variable source, falling back to
    /// [`Config::default`] for anything unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let defaults = Config::default();
        Ok(Config {
            initial_supply: parse_amount(&lookup, "INITIAL_SUPPLY", defaults.initial_supply)?,
            campaign_title: lookup("CAMPAIGN_TITLE").unwrap_or(defaults.campaign_title),
            campaign_description: lookup("CAMPAIGN_DESCRIPTION")
                .unwrap_or(defaults.campaign_description),
            campaign_goal: parse_amount(&lookup, "CAMPAIGN_GOAL", defaults.campaign_goal)?,
            contribution: parse_amount(&lookup, "CONTRIBUTION", defaults.contribution)?,
            deployments_path: lookup("DEPLOYMENTS_PATH").map(PathBuf::from),
        })
    }
}

fn parse_amount(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: i128,
) -> Result<i128> {
    match lookup(key) {
        None => Ok(default),
        Some(raw) => raw
            .parse()
            .map_err(|_| DeployError::Config(format!("Invalid {key}: {raw}"))),
    }
}
