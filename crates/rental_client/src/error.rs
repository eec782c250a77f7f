use std::time::Duration;

use rental_escrow::EscrowError;
use rental_property::RegistryError;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ClientError {
    #[error("Not authorized: {message}")]
    Unauthorized { message: String },

    #[error("Property {property_id} not found")]
    NotFound { property_id: u64 },

    #[error("Property {property_id} is not available for rent")]
    NotAvailable { property_id: u64 },

    #[error("This account cannot perform that action on property {property_id}")]
    InvalidCaller { property_id: u64 },

    #[error("Rental for property {property_id} is not in the right state: {message}")]
    InvalidState { property_id: u64, message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    #[error("No deployment configured for network {network_id}")]
    NetworkMismatch { network_id: u32 },

    #[error("Could not load metadata from {uri}: {message}")]
    MetadataFetchFailed { uri: String, message: String },

    #[error("Account {account} is not known to the wallet provider")]
    UnknownAccount { account: String },

    #[error("No wallet account connected")]
    NoAccount,

    #[error("Session halted until the network configuration is fixed: {reason}")]
    SessionHalted { reason: String },

    #[error("{call} was not confirmed within {after:?}")]
    ConfirmationTimeout { call: &'static str, after: Duration },

    #[error("{call} was dropped before it settled")]
    Dropped { call: &'static str },

    #[error("Config error for {path}: {message}")]
    Config { path: String, message: String },

    #[error("Ledger error: {message}")]
    Ledger { message: String },
}

impl ClientError {
    pub fn from_registry(err: RegistryError, property_id: u64) -> Self {
        match err {
            RegistryError::NotFound => ClientError::NotFound { property_id },
            RegistryError::Unauthorized => ClientError::Unauthorized {
                message: "caller lacks the landlord or administrator role".to_string(),
            },
            RegistryError::InvalidPrice => ClientError::InvalidInput {
                message: "rent and deposit must not be negative".to_string(),
            },
            RegistryError::InvalidMetadata => ClientError::InvalidInput {
                message: "metadata URI must be 1 to 256 bytes".to_string(),
            },
            RegistryError::PropertyRented => ClientError::InvalidState {
                property_id,
                message: "property is occupied by a tenant".to_string(),
            },
            RegistryError::AlreadyInitialized
            | RegistryError::NotInitialized
            | RegistryError::ManagerNotSet => ClientError::Ledger {
                message: format!("registry misconfigured: {:?}", err),
            },
        }
    }

    pub fn from_escrow(err: EscrowError, property_id: u64) -> Self {
        match err {
            EscrowError::NotFound => ClientError::NotFound { property_id },
            EscrowError::NotAvailable => ClientError::NotAvailable { property_id },
            EscrowError::InvalidCaller => ClientError::InvalidCaller { property_id },
            EscrowError::NotActive => ClientError::InvalidState {
                property_id,
                message: "rental is not active".to_string(),
            },
            EscrowError::NoPendingRental => ClientError::InvalidState {
                property_id,
                message: "no rental request is pending".to_string(),
            },
            EscrowError::InvalidDuration => ClientError::InvalidInput {
                message: "rental duration must be at least one period".to_string(),
            },
            EscrowError::AmountOverflow => ClientError::InvalidInput {
                message: "rental amount overflows".to_string(),
            },
            EscrowError::AlreadyInitialized | EscrowError::NotInitialized => ClientError::Ledger {
                message: format!("escrow misconfigured: {:?}", err),
            },
        }
    }

    /// Failures that must stop all further ledger calls for the session.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            ClientError::NetworkMismatch { .. } | ClientError::SessionHalted { .. }
        )
    }
}
