#![no_std]
use soroban_sdk::{contract, contractimpl, log, symbol_short, Address, Env, String, Vec};

mod storage;
mod types;


pub use types::{Property, PropertyInfo, RegistryError};

use storage::*;

/// Longest metadata URI accepted, in bytes.
pub const MAX_URI_LEN: u32 = 256;

#[contract]
pub struct RentalProperty;

#[contractimpl]
impl RentalProperty {
    /// One-time initializer. `admin` registers landlords and wires the escrow.
    pub fn init(e: Env, admin: Address) -> Result<(), RegistryError> {
        if has_admin(&e) {
            return Err(RegistryError::AlreadyInitialized);
        }
        admin.require_auth();
        set_admin(&e, &admin);
        Ok(())
    }

    pub fn admin(e: Env) -> Result<Address, RegistryError> {
        get_admin(&e)
    }

    pub fn transfer_admin(
        e: Env,
        admin: Address,
        new_admin: Address,
    ) -> Result<(), RegistryError> {
        require_admin(&e, &admin)?;
        set_admin(&e, &new_admin);
        e.events().publish((symbol_short!("admin"),), new_admin);
        Ok(())
    }

    /// Grant `landlord` the right to create listings.
    pub fn register_landlord(
        e: Env,
        admin: Address,
        landlord: Address,
    ) -> Result<(), RegistryError> {
        require_admin(&e, &admin)?;
        set_landlord(&e, &landlord, true);
        e.events().publish((symbol_short!("ll_reg"),), landlord);
        Ok(())
    }

    /// Revoke listing rights. Existing properties keep their landlord.
    pub fn remove_landlord(e: Env, admin: Address, landlord: Address) -> Result<(), RegistryError> {
        require_admin(&e, &admin)?;
        set_landlord(&e, &landlord, false);
        e.events().publish((symbol_short!("ll_rm"),), landlord);
        Ok(())
    }

    pub fn is_landlord(e: Env, who: Address) -> bool {
        storage::is_landlord(&e, &who)
    }

    /// Let `manager` (the escrow contract) mark properties rented on the
    /// registry's behalf. The admin may re-point it later.
    pub fn transfer_management_rights(
        e: Env,
        admin: Address,
        manager: Address,
    ) -> Result<(), RegistryError> {
        require_admin(&e, &admin)?;
        set_manager(&e, &manager);
        e.events().publish((symbol_short!("manager"),), manager);
        Ok(())
    }

    pub fn manager(e: Env) -> Option<Address> {
        get_manager(&e)
    }

    /// List a new property. It starts unavailable until the landlord opens it.
    pub fn create_property(
        e: Env,
        landlord: Address,
        rent_price: i128,
        security_deposit: i128,
        metadata_uri: String,
    ) -> Result<u64, RegistryError> {
        landlord.require_auth();
        if !storage::is_landlord(&e, &landlord) {
            return Err(RegistryError::Unauthorized);
        }
        if rent_price < 0 || security_deposit < 0 {
            return Err(RegistryError::InvalidPrice);
        }
        validate_uri(&metadata_uri)?;

        let id = next_id(&e);
        let property = Property {
            id,
            landlord: landlord.clone(),
            available: false,
            rented: false,
            rent_price,
            security_deposit,
            metadata_uri,
            created_at: e.ledger().timestamp(),
        };
        save_property(&e, &property);
        push_landlord_property(&e, &landlord, id);

        log!(&e, "property {} listed by {}", id, landlord);
        e.events().publish(
            (symbol_short!("created"), id),
            (landlord, rent_price, security_deposit),
        );
        Ok(id)
    }

    /// Landlord opens or closes the listing. Not allowed while a tenant
    /// occupies it; the manager reopens it when the rental ends.
    pub fn set_availability(
        e: Env,
        caller: Address,
        property_id: u64,
        available: bool,
    ) -> Result<(), RegistryError> {
        caller.require_auth();
        let mut property = load_property(&e, property_id)?;
        if property.landlord != caller {
            return Err(RegistryError::Unauthorized);
        }
        if property.rented {
            return Err(RegistryError::PropertyRented);
        }
        property.available = available;
        save_property(&e, &property);
        e.events().publish((symbol_short!("avail"), property_id), available);
        Ok(())
    }

    pub fn set_metadata_uri(
        e: Env,
        caller: Address,
        property_id: u64,
        metadata_uri: String,
    ) -> Result<(), RegistryError> {
        caller.require_auth();
        let mut property = load_property(&e, property_id)?;
        if property.landlord != caller {
            return Err(RegistryError::Unauthorized);
        }
        validate_uri(&metadata_uri)?;
        property.metadata_uri = metadata_uri.clone();
        save_property(&e, &property);
        e.events().publish((symbol_short!("meta"), property_id), metadata_uri);
        Ok(())
    }

    /// Manager-only. Renting a property closes it; releasing it reopens it.
    pub fn set_rented(e: Env, property_id: u64, rented: bool) -> Result<(), RegistryError> {
        let manager = get_manager(&e).ok_or(RegistryError::ManagerNotSet)?;
        manager.require_auth();
        let mut property = load_property(&e, property_id)?;
        property.rented = rented;
        property.available = !rented;
        save_property(&e, &property);
        e.events().publish((symbol_short!("rented"), property_id), rented);
        Ok(())
    }

    pub fn get_property_info(e: Env, property_id: u64) -> Result<PropertyInfo, RegistryError> {
        let property = load_property(&e, property_id)?;
        Ok(PropertyInfo::from(&property))
    }

    pub fn get_property(e: Env, property_id: u64) -> Result<Property, RegistryError> {
        load_property(&e, property_id)
    }

    pub fn is_available(e: Env, property_id: u64) -> Result<bool, RegistryError> {
        Ok(load_property(&e, property_id)?.available)
    }

    pub fn is_rented(e: Env, property_id: u64) -> Result<bool, RegistryError> {
        Ok(load_property(&e, property_id)?.rented)
    }

    pub fn metadata_uri(e: Env, property_id: u64) -> Result<String, RegistryError> {
        Ok(load_property(&e, property_id)?.metadata_uri)
    }

    /// Number of properties ever created; ids run from 1 to this value.
    pub fn property_count(e: Env) -> u64 {
        storage::property_count(&e)
    }

    pub fn landlord_properties(e: Env, landlord: Address) -> Vec<u64> {
        get_landlord_properties(&e, &landlord)
    }

    pub fn landlord_property_count(e: Env, landlord: Address) -> u32 {
        get_landlord_properties(&e, &landlord).len()
    }
}

fn validate_uri(uri: &String) -> Result<(), RegistryError> {
    if uri.len() == 0 || uri.len() > MAX_URI_LEN {
        return Err(RegistryError::InvalidMetadata);
    }
    Ok(())
}
