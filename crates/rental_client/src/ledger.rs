//! The ledger capability a session is handed, and the views it reads back.

use rental_escrow::RentalState;

use crate::config::Deployment;
use crate::error::ClientError;
use crate::pending::Pending;

/// State-changing calls a signer can submit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RentalCall {
    RegisterLandlord { landlord: String },
    CreateProperty { rent_price: i128, security_deposit: i128, metadata_uri: String },
    SetAvailability { property_id: u64, available: bool },
    StartRental { property_id: u64, duration: u32 },
    Approve { property_id: u64 },
    EndRental { property_id: u64 },
    CancelRequest { property_id: u64 },
}

impl RentalCall {
    pub fn name(&self) -> &'static str {
        match self {
            RentalCall::RegisterLandlord { .. } => "register_landlord",
            RentalCall::CreateProperty { .. } => "create_property",
            RentalCall::SetAvailability { .. } => "set_availability",
            RentalCall::StartRental { .. } => "start_rental",
            RentalCall::Approve { .. } => "approve",
            RentalCall::EndRental { .. } => "end_rental",
            RentalCall::CancelRequest { .. } => "cancel_request",
        }
    }

    pub fn property_id(&self) -> Option<u64> {
        match self {
            RentalCall::RegisterLandlord { .. } | RentalCall::CreateProperty { .. } => None,
            RentalCall::SetAvailability { property_id, .. }
            | RentalCall::StartRental { property_id, .. }
            | RentalCall::Approve { property_id }
            | RentalCall::EndRental { property_id }
            | RentalCall::CancelRequest { property_id } => Some(*property_id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CallOutcome {
    Done,
    PropertyCreated(u64),
    Rental(RentalState),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyView {
    pub id: u64,
    pub landlord: String,
    pub available: bool,
    pub rented: bool,
    pub rent_price: i128,
    pub security_deposit: i128,
    pub metadata_uri: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RentalView {
    pub property_id: u64,
    pub state: RentalState,
    pub landlord: String,
    pub tenant: Option<String>,
    pub tenant_approved: bool,
    pub landlord_approved: bool,
    pub escrowed: i128,
    pub completed_rentals: u32,
}

impl RentalView {
    pub fn has_approved(&self, account: &str) -> bool {
        (self.landlord == account && self.landlord_approved)
            || (self.tenant.as_deref() == Some(account) && self.tenant_approved)
    }
}

/// A ledger hosting one deployment of the rental contracts, reachable
/// through a wallet provider.
pub trait RentalLedger {
    fn network_id(&self) -> u32;

    /// Accounts the provider exposes, current user first.
    fn request_accounts(&self) -> Vec<String>;

    fn deployment(&self) -> Deployment;

    fn property_count(&self) -> Result<u64, ClientError>;

    fn property(&self, property_id: u64) -> Result<PropertyView, ClientError>;

    fn rental(&self, property_id: u64) -> Result<RentalView, ClientError>;

    fn submit(&self, signer: &str, call: RentalCall) -> Pending<CallOutcome>;
}
