//! A user's session against one deployment.
//!
//! The session carries its context explicitly: the ledger capability it was
//! handed, the deployment it is bound to, the wallet account stream and the
//! confirmation timeout. A network mismatch halts the session; every later
//! ledger call fails with `SessionHalted` until [`RentalSession::rebind`]
//! succeeds.

use std::cell::RefCell;
use std::time::Duration;

use tracing::{info, instrument, warn};

use crate::config::{Deployment, NetworkConfig};
use crate::error::ClientError;
use crate::ledger::{CallOutcome, PropertyView, RentalCall, RentalLedger, RentalView};
use crate::metadata::{MetadataFetcher, PropertyMetadata};
use crate::wallet::AccountWatch;
use crate::{format_units, RentalState};

/// A property with whatever metadata could be loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct Listing {
    pub property: PropertyView,
    pub metadata: PropertyMetadata,
    pub metadata_error: Option<String>,
}

impl Listing {
    pub fn is_partial(&self) -> bool {
        self.metadata_error.is_some()
    }

    pub fn title(&self) -> &str {
        self.metadata.display_name()
    }
}

/// Where a property stands from the point of view of the listing view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyStatus {
    Unlisted,
    Available,
    Requested { tenant: String },
    RentedBy { tenant: String },
}

pub struct RentalSession<'l, L: RentalLedger> {
    ledger: &'l L,
    network_id: u32,
    deployment: Deployment,
    accounts: AccountWatch,
    metadata: MetadataFetcher,
    confirm_timeout: Duration,
    halted: RefCell<Option<String>>,
}

impl<'l, L: RentalLedger> RentalSession<'l, L> {
    /// Binds to the deployment `config` names for the ledger's network.
    /// Fails with `NetworkMismatch` when there is none, or when the
    /// configured addresses are not the contracts the ledger hosts.
    pub fn connect(
        ledger: &'l L,
        config: &NetworkConfig,
        metadata: MetadataFetcher,
        confirm_timeout: Duration,
    ) -> Result<Self, ClientError> {
        let network_id = ledger.network_id();
        let deployment = bind(ledger, config)?;
        info!(network_id, registry = %deployment.rental_property.address, "Session connected");

        Ok(RentalSession {
            ledger,
            network_id,
            deployment,
            accounts: AccountWatch::new(),
            metadata,
            confirm_timeout,
            halted: RefCell::new(None),
        })
    }

    /// Re-reads the deployment for the ledger's current network and lifts a
    /// halt if it matches.
    pub fn rebind(&mut self, config: &NetworkConfig) -> Result<(), ClientError> {
        let deployment = bind(self.ledger, config)?;
        self.network_id = self.ledger.network_id();
        self.deployment = deployment;
        self.halted.replace(None);
        info!(network_id = self.network_id, "Session rebound");
        Ok(())
    }

    pub fn deployment(&self) -> &Deployment {
        &self.deployment
    }

    pub fn accounts(&self) -> &AccountWatch {
        &self.accounts
    }

    pub fn is_halted(&self) -> bool {
        self.halted.borrow().is_some()
    }

    /// Asks the provider for its accounts; the first becomes current.
    pub fn connect_wallet(&self) -> Result<String, ClientError> {
        self.ensure_bound()?;
        self.accounts
            .accounts_changed(&self.ledger.request_accounts())
            .ok_or(ClientError::NoAccount)
    }

    pub fn current_account(&self) -> Result<String, ClientError> {
        self.accounts.current().ok_or(ClientError::NoAccount)
    }

    /* ---------------- READS ---------------- */

    pub fn property(&self, property_id: u64) -> Result<PropertyView, ClientError> {
        self.ensure_bound()?;
        self.ledger.property(property_id)
    }

    pub fn rental(&self, property_id: u64) -> Result<RentalView, ClientError> {
        self.ensure_bound()?;
        self.ledger.rental(property_id)
    }

    pub fn status(&self, property_id: u64) -> Result<PropertyStatus, ClientError> {
        let property = self.property(property_id)?;
        let rental = self.ledger.rental(property_id)?;
        let status = match (rental.state, rental.tenant) {
            (RentalState::Active, Some(tenant)) => PropertyStatus::RentedBy { tenant },
            (RentalState::Requested, Some(tenant)) => PropertyStatus::Requested { tenant },
            _ if property.available => PropertyStatus::Available,
            _ => PropertyStatus::Unlisted,
        };
        Ok(status)
    }

    /// Every property with its metadata. A metadata failure leaves that
    /// listing partial instead of failing the whole view.
    #[instrument(skip(self))]
    pub async fn listings(&self) -> Result<Vec<Listing>, ClientError> {
        self.ensure_bound()?;
        let count = self.ledger.property_count()?;
        let mut listings = Vec::with_capacity(count as usize);

        for property_id in 1..=count {
            let property = self.ledger.property(property_id)?;
            let listing = match self.metadata.fetch(&property.metadata_uri).await {
                Ok(metadata) => Listing { property, metadata, metadata_error: None },
                Err(err) => {
                    warn!(property_id, %err, "Showing listing without metadata");
                    Listing {
                        property,
                        metadata: PropertyMetadata::default(),
                        metadata_error: Some(err.to_string()),
                    }
                }
            };
            listings.push(listing);
        }
        Ok(listings)
    }

    /* ---------------- TRANSITIONS ---------------- */

    pub async fn register_landlord(&self, landlord: &str) -> Result<(), ClientError> {
        self.submit(RentalCall::RegisterLandlord { landlord: landlord.to_string() })
            .await
            .map(|_| ())
    }

    pub async fn create_property(
        &self,
        rent_price: i128,
        security_deposit: i128,
        metadata_uri: &str,
    ) -> Result<u64, ClientError> {
        let outcome = self
            .submit(RentalCall::CreateProperty {
                rent_price,
                security_deposit,
                metadata_uri: metadata_uri.to_string(),
            })
            .await?;
        match outcome {
            CallOutcome::PropertyCreated(id) => Ok(id),
            other => Err(unexpected("create_property", other)),
        }
    }

    pub async fn set_availability(
        &self,
        property_id: u64,
        available: bool,
    ) -> Result<(), ClientError> {
        self.submit(RentalCall::SetAvailability { property_id, available })
            .await
            .map(|_| ())
    }

    /// Tenant side: request the property and approve in one go.
    #[instrument(skip(self))]
    pub async fn rent(&self, property_id: u64, duration: u32) -> Result<RentalState, ClientError> {
        let property = self.property(property_id)?;
        info!(
            property_id,
            rent = %format_units(property.rent_price),
            deposit = %format_units(property.security_deposit),
            "Requesting rental"
        );
        self.submit(RentalCall::StartRental { property_id, duration }).await?;
        self.approve(property_id).await
    }

    pub async fn approve(&self, property_id: u64) -> Result<RentalState, ClientError> {
        match self.submit(RentalCall::Approve { property_id }).await? {
            CallOutcome::Rental(state) => Ok(state),
            other => Err(unexpected("approve", other)),
        }
    }

    /// Landlord side: closes an active rental and refunds the deposit.
    pub async fn end_rental(&self, property_id: u64) -> Result<(), ClientError> {
        self.submit(RentalCall::EndRental { property_id }).await.map(|_| ())
    }

    pub async fn cancel_request(&self, property_id: u64) -> Result<(), ClientError> {
        self.submit(RentalCall::CancelRequest { property_id })
            .await
            .map(|_| ())
    }

    async fn submit(&self, call: RentalCall) -> Result<CallOutcome, ClientError> {
        self.ensure_bound()?;
        let signer = self.current_account()?;
        let name = call.name();
        let property_id = call.property_id();

        let outcome = self
            .ledger
            .submit(&signer, call)
            .wait(self.confirm_timeout)
            .await?;
        info!(call = name, ?property_id, signer = %signer, ?outcome, "Confirmed");
        Ok(outcome)
    }

    /// Halts the session if the ledger moved to a network this session is
    /// not bound to.
    fn ensure_bound(&self) -> Result<(), ClientError> {
        if let Some(reason) = self.halted.borrow().as_ref() {
            return Err(ClientError::SessionHalted { reason: reason.clone() });
        }
        let current = self.ledger.network_id();
        if current != self.network_id {
            let err = ClientError::NetworkMismatch { network_id: current };
            warn!(bound = self.network_id, current, "Halting session");
            self.halted.replace(Some(err.to_string()));
            return Err(err);
        }
        Ok(())
    }
}

fn bind<L: RentalLedger>(ledger: &L, config: &NetworkConfig) -> Result<Deployment, ClientError> {
    let network_id = ledger.network_id();
    let deployment = config.deployment(network_id)?;
    if *deployment != ledger.deployment() {
        warn!(network_id, "Configured contracts are not deployed on this network");
        return Err(ClientError::NetworkMismatch { network_id });
    }
    Ok(deployment.clone())
}

fn unexpected(call: &str, outcome: CallOutcome) -> ClientError {
    ClientError::Ledger {
        message: format!("{} settled with unexpected outcome {:?}", call, outcome),
    }
}
