//! Declarative deployment modules.
//!
//! A [`DeploymentModule`] lists the contracts to instantiate, in order, and a
//! [`ContractRegistry`] knows how to install each of them on an [`Env`].
//! Deploying a module yields a [`DeployedModule`] whose JSON form matches a
//! deployed-addresses file:
//!
//! ```json
//! { "Crowdfunding#Crowdfunding": "CA…" }
//! ```

use std::collections::BTreeMap;

use serde::ser::{Error as _, Serialize, SerializeMap, Serializer};
use soroban_sdk::xdr::{AccountId, Hash, PublicKey, ScAddress, Uint256};
use soroban_sdk::{Address, Env};
use tracing::{debug, info};

use crate::errors::{DeployError, Result};

pub const CROWDFUNDING: &str = "Crowdfunding";

/// Installs one contract on the ledger and returns its address.
pub type Installer = fn(&Env) -> Address;

/// A contract to instantiate, identified by its registry name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContractFuture {
    pub name: String,
}

#[derive(Debug, Default)]
pub struct ModuleBuilder {
    futures: Vec<ContractFuture>,
    duplicate: Option<String>,
}

impl ModuleBuilder {
    /// Declare a contract instance. Returns the future for chaining.
    pub fn contract(&mut self, name: &str) -> ContractFuture {
        let future = ContractFuture {
            name: name.to_string(),
        };
        if self.futures.contains(&future) {
            self.duplicate.get_or_insert_with(|| name.to_string());
        } else {
            self.futures.push(future.clone());
        }
        future
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeploymentModule {
    pub id: String,
    pub futures: Vec<ContractFuture>,
}

/// Build a module by declaring its contracts inside `define`.
pub fn build_module(id: &str, define: impl FnOnce(&mut ModuleBuilder)) -> Result<DeploymentModule> {
    let mut builder = ModuleBuilder::default();
    define(&mut builder);
    if let Some(name) = builder.duplicate {
        return Err(DeployError::DuplicateContract(name));
    }
    Ok(DeploymentModule {
        id: id.to_string(),
        futures: builder.futures,
    })
}

/// The module that instantiates the crowdfunding contract.
pub fn crowdfunding_module() -> Result<DeploymentModule> {
    build_module(CROWDFUNDING, |m| {
        m.contract(CROWDFUNDING);
    })
}

/// Maps contract names to installers.
#[derive(Default, Clone)]
pub struct ContractRegistry {
    installers: BTreeMap<String, Installer>,
}

impl ContractRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry that knows every contract in this workspace.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(CROWDFUNDING, install_crowdfunding);
        registry
    }

    pub fn register(&mut self, name: &str, installer: Installer) {
        self.installers.insert(name.to_string(), installer);
    }

    fn installer(&self, name: &str) -> Result<Installer> {
        self.installers
            .get(name)
            .copied()
            .ok_or_else(|| DeployError::UnknownContract(name.to_string()))
    }
}

fn install_crowdfunding(env: &Env) -> Address {
    env.register(crowdfunding::Crowdfunding, ())
}

impl DeploymentModule {
    /// Instantiate every declared contract, in declaration order.
    ///
    /// Names are resolved against `registry` before anything is installed, so
    /// an unknown name leaves the ledger untouched.
    pub fn deploy(&self, env: &Env, registry: &ContractRegistry) -> Result<DeployedModule> {
        let installers = self
            .futures
            .iter()
            .map(|f| registry.installer(&f.name).map(|i| (f.name.clone(), i)))
            .collect::<Result<Vec<_>>>()?;

        let mut contracts = Vec::with_capacity(installers.len());
        for (name, install) in installers {
            let address = install(env);
            debug!("{}#{name} installed", self.id);
            contracts.push((name, address));
        }
        info!("Module {} deployed ({} contracts)", self.id, contracts.len());

        Ok(DeployedModule {
            module_id: self.id.clone(),
            contracts,
        })
    }
}

/// Addresses of the contracts a module instantiated.
#[derive(Debug, Clone)]
pub struct DeployedModule {
    pub module_id: String,
    contracts: Vec<(String, Address)>,
}

impl DeployedModule {
    pub fn address(&self, name: &str) -> Option<&Address> {
        self.contracts
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, address)| address)
    }

    pub fn len(&self) -> usize {
        self.contracts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contracts.is_empty()
    }
}

impl Serialize for DeployedModule {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.contracts.len()))?;
        for (name, address) in &self.contracts {
            let address = strkey(address).map_err(S::Error::custom)?;
            map.serialize_entry(&format!("{}#{name}", self.module_id), &address)?;
        }
        map.end()
    }
}

/// Render an address as its strkey (`G…` account, `C…` contract).
pub fn strkey(address: &Address) -> Result<String> {
    let address = ScAddress::try_from(address)
        .map_err(|e| DeployError::Address(format!("{e:?}")))?;
    Ok(match address {
        ScAddress::Account(AccountId(PublicKey::PublicKeyTypeEd25519(Uint256(key)))) => {
            stellar_strkey::ed25519::PublicKey(key).to_string()
        }
        ScAddress::Contract(Hash(id)) => stellar_strkey::Contract(id).to_string(),
    })
}
