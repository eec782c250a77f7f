use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{Property, RegistryError};

/// Persistent entries are bumped to ~60 days whenever they drop below ~30.
const TTL_THRESHOLD: u32 = 518_400;
const TTL_EXTEND: u32 = 1_036_800;

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,                     // instance
    Manager,                   // instance
    NextId,                    // instance
    Landlord(Address),         // persistent, registration flag
    Property(u64),             // persistent
    LandlordProperties(Address), // persistent, Vec<u64>
}

/* ---------------- ADMIN / MANAGER ---------------- */

pub fn has_admin(e: &Env) -> bool {
    e.storage().instance().has(&DataKey::Admin)
}

pub fn get_admin(e: &Env) -> Result<Address, RegistryError> {
    e.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(RegistryError::NotInitialized)
}

pub fn set_admin(e: &Env, admin: &Address) {
    e.storage().instance().set(&DataKey::Admin, admin);
}

/// Checks that `caller` is the stored admin and that it signed.
pub fn require_admin(e: &Env, caller: &Address) -> Result<(), RegistryError> {
    caller.require_auth();
    let admin = get_admin(e)?;
    if &admin != caller {
        return Err(RegistryError::Unauthorized);
    }
    Ok(())
}

pub fn get_manager(e: &Env) -> Option<Address> {
    e.storage().instance().get(&DataKey::Manager)
}

pub fn set_manager(e: &Env, manager: &Address) {
    e.storage().instance().set(&DataKey::Manager, manager);
}

/* ---------------- COUNTER ---------------- */

pub fn next_id(e: &Env) -> u64 {
    let mut n: u64 = e.storage().instance().get(&DataKey::NextId).unwrap_or(0);
    n += 1;
    e.storage().instance().set(&DataKey::NextId, &n);
    n
}

pub fn property_count(e: &Env) -> u64 {
    e.storage().instance().get(&DataKey::NextId).unwrap_or(0)
}

/* ---------------- LANDLORDS ---------------- */

pub fn is_landlord(e: &Env, who: &Address) -> bool {
    let key = DataKey::Landlord(who.clone());
    e.storage().persistent().get(&key).unwrap_or(false)
}

pub fn set_landlord(e: &Env, who: &Address, registered: bool) {
    let key = DataKey::Landlord(who.clone());
    e.storage().persistent().set(&key, &registered);
    e.storage().persistent().extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND);
}

pub fn get_landlord_properties(e: &Env, landlord: &Address) -> Vec<u64> {
    e.storage()
        .persistent()
        .get(&DataKey::LandlordProperties(landlord.clone()))
        .unwrap_or(Vec::new(e))
}

pub fn push_landlord_property(e: &Env, landlord: &Address, id: u64) {
    let key = DataKey::LandlordProperties(landlord.clone());
    let mut ids = get_landlord_properties(e, landlord);
    ids.push_back(id);
    e.storage().persistent().set(&key, &ids);
    e.storage().persistent().extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND);
}

/* ---------------- PROPERTIES ---------------- */

pub fn load_property(e: &Env, id: u64) -> Result<Property, RegistryError> {
    e.storage()
        .persistent()
        .get(&DataKey::Property(id))
        .ok_or(RegistryError::NotFound)
}

pub fn save_property(e: &Env, property: &Property) {
    let key = DataKey::Property(property.id);
    e.storage().persistent().set(&key, property);
    e.storage().persistent().extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND);
}
