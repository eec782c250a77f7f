use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{CompletedRental, EscrowError, Rental};

const TTL_THRESHOLD: u32 = 518_400; // ~30 days
const TTL_EXTEND: u32 = 1_036_800;  // ~60 days

#[contracttype]
#[derive(Clone)]
pub enum DataKey {
    Admin,
    Registry,
    Token,
    Rental(u64),
    History(u64),
}

/* ---------------- CONFIG ---------------- */

pub fn is_initialized(e: &Env) -> bool {
    e.storage().instance().has(&DataKey::Admin)
}

pub fn set_config(e: &Env, admin: &Address, registry: &Address, token: &Address) {
    e.storage().instance().set(&DataKey::Admin, admin);
    e.storage().instance().set(&DataKey::Registry, registry);
    e.storage().instance().set(&DataKey::Token, token);
}

pub fn get_admin(e: &Env) -> Result<Address, EscrowError> {
    e.storage()
        .instance()
        .get(&DataKey::Admin)
        .ok_or(EscrowError::NotInitialized)
}

pub fn get_registry(e: &Env) -> Result<Address, EscrowError> {
    e.storage()
        .instance()
        .get(&DataKey::Registry)
        .ok_or(EscrowError::NotInitialized)
}

pub fn get_token(e: &Env) -> Result<Address, EscrowError> {
    e.storage()
        .instance()
        .get(&DataKey::Token)
        .ok_or(EscrowError::NotInitialized)
}

/* ---------------- RENTALS ---------------- */

pub fn load_rental(e: &Env, property_id: u64) -> Option<Rental> {
    e.storage().persistent().get(&DataKey::Rental(property_id))
}

pub fn save_rental(e: &Env, rental: &Rental) {
    let key = DataKey::Rental(rental.property_id);
    e.storage().persistent().set(&key, rental);
    e.storage().persistent().extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND);
}

pub fn remove_rental(e: &Env, property_id: u64) {
    e.storage().persistent().remove(&DataKey::Rental(property_id));
}

/* ---------------- HISTORY ---------------- */

pub fn get_history(e: &Env, property_id: u64) -> Vec<CompletedRental> {
    e.storage()
        .persistent()
        .get(&DataKey::History(property_id))
        .unwrap_or(Vec::new(e))
}

pub fn push_history(e: &Env, property_id: u64, entry: CompletedRental) {
    let key = DataKey::History(property_id);
    let mut history = get_history(e, property_id);
    history.push_back(entry);
    e.storage().persistent().set(&key, &history);
    e.storage().persistent().extend_ttl(&key, TTL_THRESHOLD, TTL_EXTEND);
}
