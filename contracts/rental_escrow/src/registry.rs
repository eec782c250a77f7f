//! Cross-contract view of the property registry.
//!
//! Only the calls the escrow makes are declared here, so the escrow wasm
//! does not link the registry contract itself.

use soroban_sdk::{contractclient, contracttype, Address, Env, Error};

use crate::types::EscrowError;

/// Mirrors the registry's `PropertyInfo`; field names must match.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyInfo {
    pub landlord: Address,
    pub is_available: bool,
    pub rent_price: i128,
    pub security_deposit: i128,
}

#[contractclient(name = "PropertyRegistryClient")]
pub trait PropertyRegistry {
    fn get_property_info(e: Env, property_id: u64) -> PropertyInfo;
    fn set_rented(e: Env, property_id: u64, rented: bool);
}

/// Registry's `RegistryError::NotFound` code.
const REGISTRY_NOT_FOUND: u32 = 4;

/// Registry lookup with unknown ids mapped to `NotFound`. Any other
/// failure traps the invocation.
pub fn property_info(
    e: &Env,
    registry: &Address,
    property_id: u64,
) -> Result<PropertyInfo, EscrowError> {
    match PropertyRegistryClient::new(e, registry).try_get_property_info(&property_id) {
        Ok(Ok(info)) => Ok(info),
        Err(Ok(err)) if err == Error::from_contract_error(REGISTRY_NOT_FOUND) => {
            Err(EscrowError::NotFound)
        }
        _ => panic!("registry lookup failed"),
    }
}

pub fn set_rented(e: &Env, registry: &Address, property_id: u64, rented: bool) {
    PropertyRegistryClient::new(e, registry).set_rented(&property_id, &rented);
}
