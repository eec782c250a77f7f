//! Off-chain side of the rental contracts: deployment config, metadata,
//! wallet account stream, pending calls, the rental session and an
//! in-process development ledger.

pub mod config;
pub mod error;
pub mod ledger;
pub mod local;
pub mod metadata;
pub mod pending;
pub mod session;
pub mod wallet;

pub use config::{Deployment, NetworkConfig, LOCAL_NETWORK_ID};
pub use error::ClientError;
pub use ledger::{CallOutcome, PropertyView, RentalCall, RentalLedger, RentalView};
pub use local::LocalChain;
pub use metadata::{MetadataFetcher, PropertyMetadata};
pub use pending::Pending;
pub use rental_escrow::RentalState;
pub use session::{Listing, PropertyStatus, RentalSession};
pub use wallet::AccountWatch;

/// Smallest-unit count of one whole token (7 decimals).
pub const UNIT: i128 = 10_000_000;

/// Whole tokens in smallest units, saturating at the `i128` bounds.
pub fn tokens(whole: i128) -> i128 {
    whole.saturating_mul(UNIT)
}

/// Renders an amount in whole tokens, e.g. `15_000_000` as `"1.5"`.
pub fn format_units(amount: i128) -> String {
    let sign = if amount < 0 { "-" } else { "" };
    let abs = amount.unsigned_abs();
    let unit = UNIT as u128;
    let whole = abs / unit;
    let frac = abs % unit;
    if frac == 0 {
        return format!("{}{}", sign, whole);
    }
    let frac = format!("{:07}", frac);
    format!("{}{}.{}", sign, whole, frac.trim_end_matches('0'))
}
