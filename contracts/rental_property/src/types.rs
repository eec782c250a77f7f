use soroban_sdk::{contracterror, contracttype, Address, String};

/// A listed property. Records are permanent; only availability, the
/// rented flag and the metadata URI change after creation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Property {
    pub id: u64,
    pub landlord: Address,
    pub available: bool,
    pub rented: bool,
    pub rent_price: i128,       // per rental period
    pub security_deposit: i128,
    pub metadata_uri: String,   // off-chain JSON: image, name, address, attributes
    pub created_at: u64,        // ledger timestamp
}

/// Projection returned by `get_property_info`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PropertyInfo {
    pub landlord: Address,
    pub is_available: bool,
    pub rent_price: i128,
    pub security_deposit: i128,
}

impl From<&Property> for PropertyInfo {
    fn from(p: &Property) -> Self {
        PropertyInfo {
            landlord: p.landlord.clone(),
            is_available: p.available,
            rent_price: p.rent_price,
            security_deposit: p.security_deposit,
        }
    }
}

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum RegistryError {
    AlreadyInitialized = 1,
    NotInitialized = 2,
    Unauthorized = 3,
    NotFound = 4,
    InvalidPrice = 5,
    InvalidMetadata = 6,
    ManagerNotSet = 7,
    PropertyRented = 8,
}
