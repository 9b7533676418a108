//! Deployment tooling for the crowdfunding contract.
//!
//! - [`ignition`]: declarative deployment modules (which contracts to install).
//! - [`deploy`]: the deploy script that installs the token and the contract and
//!   funds a test campaign.
//!
//! Both run against a Soroban [`soroban_sdk::Env`], the SDK's local ledger.

pub mod config;
pub mod deploy;
pub mod errors;
pub mod ignition;

pub use config::Config;
pub use deploy::{run, DeployReport};
pub use errors::{DeployError, Result};
