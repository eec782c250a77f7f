#![no_std]
use soroban_sdk::{contract, contractimpl, log, symbol_short, token, Address, Env, Vec};

mod registry;
mod storage;
mod types;


pub use types::{CompletedRental, EscrowError, Rental, RentalState};

use storage::*;

#[contract]
pub struct RentalEscrow;

#[contractimpl]
impl RentalEscrow {
    /// One-time initializer. `registry` must later name this contract as its
    /// manager (`transfer_management_rights`) before rentals can activate.
    pub fn init(
        e: Env,
        admin: Address,
        registry: Address,
        token: Address,
    ) -> Result<(), EscrowError> {
        if is_initialized(&e) {
            return Err(EscrowError::AlreadyInitialized);
        }
        admin.require_auth();
        set_config(&e, &admin, &registry, &token);
        Ok(())
    }

    /// Tenant requests the property for `duration` periods and pays
    /// `rent_price * duration + security_deposit` into escrow.
    pub fn start_rental(
        e: Env,
        tenant: Address,
        property_id: u64,
        duration: u32,
    ) -> Result<(), EscrowError> {
        tenant.require_auth();
        if duration == 0 {
            return Err(EscrowError::InvalidDuration);
        }
        let registry = get_registry(&e)?;
        let token = get_token(&e)?;

        // a request in flight or an occupied property loses the race
        if let Some(current) = load_rental(&e, property_id) {
            if !current.state.is_open() {
                return Err(EscrowError::NotAvailable);
            }
        }
        let info = registry::property_info(&e, &registry, property_id)?;
        if !info.is_available {
            return Err(EscrowError::NotAvailable);
        }
        if tenant == info.landlord {
            return Err(EscrowError::InvalidCaller);
        }

        let rent_due = info
            .rent_price
            .checked_mul(duration as i128)
            .ok_or(EscrowError::AmountOverflow)?;
        let total = rent_due
            .checked_add(info.security_deposit)
            .ok_or(EscrowError::AmountOverflow)?;

        if total > 0 {
            token::Client::new(&e, &token).transfer(&tenant, &e.current_contract_address(), &total);
        }

        let rental = Rental {
            property_id,
            landlord: info.landlord,
            tenant: Some(tenant.clone()),
            duration,
            rent_due,
            deposit: info.security_deposit,
            tenant_approved: false,
            landlord_approved: false,
            state: RentalState::Requested,
            requested_at: e.ledger().timestamp(),
        };
        save_rental(&e, &rental);

        e.events().publish((symbol_short!("requested"), property_id), (tenant, duration, total));
        Ok(())
    }

    /// Record the caller's approval. Once landlord and tenant have both
    /// approved, the rental becomes `Active`, the registry marks the
    /// property rented and the rent is released to the landlord.
    pub fn approve(e: Env, caller: Address, property_id: u64) -> Result<RentalState, EscrowError> {
        caller.require_auth();
        let mut rental = load_rental(&e, property_id).ok_or(EscrowError::NoPendingRental)?;

        let is_landlord = caller == rental.landlord;
        let is_tenant = rental.tenant.as_ref() == Some(&caller);

        match rental.state {
            RentalState::Listed | RentalState::Closed => return Err(EscrowError::NoPendingRental),
            RentalState::Active => {
                return if is_landlord || is_tenant {
                    Ok(RentalState::Active)
                } else {
                    Err(EscrowError::InvalidCaller)
                };
            }
            RentalState::Requested => {}
        }

        if is_landlord {
            if rental.landlord_approved {
                return Ok(rental.state);
            }
            rental.landlord_approved = true;
        } else if is_tenant {
            if rental.tenant_approved {
                return Ok(rental.state);
            }
            rental.tenant_approved = true;
        } else {
            return Err(EscrowError::InvalidCaller);
        }
        e.events().publish((symbol_short!("approved"), property_id), caller);

        if rental.landlord_approved && rental.tenant_approved {
            let registry = get_registry(&e)?;
            let token = get_token(&e)?;
            registry::set_rented(&e, &registry, property_id, true);
            pay(&e, &token, &rental.landlord, rental.rent_due);
            rental.state = RentalState::Active;

            log!(&e, "rental of property {} active", property_id);
            e.events().publish((symbol_short!("active"), property_id), rental.rent_due);
        }

        save_rental(&e, &rental);
        Ok(rental.state)
    }

    /// Landlord closes an active rental: the deposit goes back to the
    /// tenant and the property is reopened in the registry.
    pub fn end_rental(e: Env, caller: Address, property_id: u64) -> Result<(), EscrowError> {
        caller.require_auth();
        let rental = load_rental(&e, property_id).ok_or(EscrowError::NotActive)?;
        if rental.state != RentalState::Active {
            return Err(EscrowError::NotActive);
        }
        if caller != rental.landlord {
            return Err(EscrowError::InvalidCaller);
        }
        let tenant = rental.tenant.clone().ok_or(EscrowError::NotActive)?;
        let registry = get_registry(&e)?;
        let token = get_token(&e)?;

        pay(&e, &token, &tenant, rental.deposit);
        registry::set_rented(&e, &registry, property_id, false);

        push_history(
            &e,
            property_id,
            CompletedRental {
                tenant: tenant.clone(),
                landlord: rental.landlord.clone(),
                duration: rental.duration,
                rent_paid: rental.rent_due,
                closed_at: e.ledger().timestamp(),
            },
        );
        save_rental(
            &e,
            &Rental {
                property_id,
                landlord: rental.landlord,
                tenant: None,
                duration: 0,
                rent_due: 0,
                deposit: 0,
                tenant_approved: false,
                landlord_approved: false,
                state: RentalState::Closed,
                requested_at: rental.requested_at,
            },
        );

        e.events().publish((symbol_short!("ended"), property_id), tenant);
        Ok(())
    }

    /// Withdraw a request that has not activated yet. Either party may
    /// cancel; the tenant is refunded in full.
    pub fn cancel_request(e: Env, caller: Address, property_id: u64) -> Result<(), EscrowError> {
        caller.require_auth();
        let rental = load_rental(&e, property_id).ok_or(EscrowError::NoPendingRental)?;
        if rental.state != RentalState::Requested {
            return Err(EscrowError::NoPendingRental);
        }
        let tenant = rental.tenant.clone().ok_or(EscrowError::NoPendingRental)?;
        if caller != tenant && caller != rental.landlord {
            return Err(EscrowError::InvalidCaller);
        }
        let token = get_token(&e)?;

        pay(&e, &token, &tenant, rental.escrowed());
        remove_rental(&e, property_id);

        e.events().publish((symbol_short!("cancelled"), property_id), caller);
        Ok(())
    }

    /* ---------------- READS ---------------- */

    pub fn tenant(e: Env, property_id: u64) -> Option<Address> {
        load_rental(&e, property_id).and_then(|r| r.tenant)
    }

    /// Landlord of the rental in progress, or the registry's landlord when
    /// the property has never been requested.
    pub fn landlord(e: Env, property_id: u64) -> Result<Address, EscrowError> {
        if let Some(rental) = load_rental(&e, property_id) {
            return Ok(rental.landlord);
        }
        let registry = get_registry(&e)?;
        Ok(registry::property_info(&e, &registry, property_id)?.landlord)
    }

    pub fn is_approved(e: Env, property_id: u64, party: Address) -> bool {
        match load_rental(&e, property_id) {
            Some(r) if r.landlord == party => r.landlord_approved,
            Some(r) if r.tenant.as_ref() == Some(&party) => r.tenant_approved,
            _ => false,
        }
    }

    /// False only while a tenant occupies the property.
    pub fn is_listed(e: Env, property_id: u64) -> bool {
        Self::rental_state(e, property_id) != RentalState::Active
    }

    pub fn rental_state(e: Env, property_id: u64) -> RentalState {
        load_rental(&e, property_id)
            .map(|r| r.state)
            .unwrap_or(RentalState::Listed)
    }

    pub fn get_rental(e: Env, property_id: u64) -> Option<Rental> {
        load_rental(&e, property_id)
    }

    pub fn escrowed(e: Env, property_id: u64) -> i128 {
        load_rental(&e, property_id).map(|r| r.escrowed()).unwrap_or(0)
    }

    pub fn rental_count(e: Env, property_id: u64) -> u32 {
        get_history(&e, property_id).len()
    }

    pub fn rental_history(e: Env, property_id: u64) -> Vec<CompletedRental> {
        get_history(&e, property_id)
    }

    pub fn admin(e: Env) -> Result<Address, EscrowError> {
        get_admin(&e)
    }

    pub fn registry(e: Env) -> Result<Address, EscrowError> {
        get_registry(&e)
    }

    pub fn token(e: Env) -> Result<Address, EscrowError> {
        get_token(&e)
    }
}

fn pay(e: &Env, token: &Address, to: &Address, amount: i128) {
    if amount > 0 {
        token::Client::new(e, token).transfer(&e.current_contract_address(), to, &amount);
    }
}
