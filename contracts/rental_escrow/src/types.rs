use soroban_sdk::{contracterror, contracttype, Address};

/// Lifecycle of a property's current rental instance.
///
/// `Closed` is terminal for one instance only; a fresh `start_rental`
/// treats it like `Listed`.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
#[repr(u32)]
pub enum RentalState {
    Listed = 0,
    Requested = 1,
    Active = 2,
    Closed = 3,
}

impl RentalState {
    /// No instance in flight, so a tenant may request the property.
    pub fn is_open(self) -> bool {
        matches!(self, RentalState::Listed | RentalState::Closed)
    }
}

/// Escrow-side record of the rental in progress for one property.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Rental {
    pub property_id: u64,
    pub landlord: Address,      // snapshot of the registry landlord at request time
    pub tenant: Option<Address>,
    pub duration: u32,          // rental periods
    pub rent_due: i128,         // rent_price * duration
    pub deposit: i128,
    pub tenant_approved: bool,
    pub landlord_approved: bool,
    pub state: RentalState,
    pub requested_at: u64,
}

impl Rental {
    /// Funds the escrow currently holds for this rental.
    pub fn escrowed(&self) -> i128 {
        match self.state {
            RentalState::Requested => self.rent_due + self.deposit,
            RentalState::Active => self.deposit,
            RentalState::Listed | RentalState::Closed => 0,
        }
    }
}

/// History entry appended when a landlord ends an active rental.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CompletedRental {
    pub tenant: Address,
    pub landlord: Address,
    pub duration: u32,
    pub rent_paid: i128,
    pub closed_at: u64,
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum EscrowError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    NotFound = 3,
    NotAvailable = 4,
    InvalidCaller = 5,
    NotActive = 6,
    NoPendingRental = 7,
    InvalidDuration = 8,
    AmountOverflow = 9,
}
