//! In-process development ledger.
//!
//! `LocalChain` hosts both rental contracts and a stellar asset contract in a
//! Soroban test environment. Authorization is mocked, so any known account
//! can sign.

use std::cell::Cell;
use std::fmt;

use rental_escrow::{RentalEscrow, RentalEscrowClient, RentalState};
use rental_property::{Property, RentalProperty, RentalPropertyClient};
use soroban_sdk::testutils::{Address as _, EnvTestConfig};
use soroban_sdk::token::{StellarAssetClient, TokenClient};
use soroban_sdk::{Address, Env, String as SorobanString};
use tracing::{debug, info, warn};

use crate::config::{Deployment, LOCAL_NETWORK_ID};
use crate::error::ClientError;
use crate::ledger::{CallOutcome, PropertyView, RentalCall, RentalLedger, RentalView};
use crate::pending::Pending;

pub struct LocalChain {
    env: Env,
    network_id: Cell<u32>,
    accounts: Vec<(String, Address)>,
    registry: Address,
    escrow: Address,
    token: Address,
}

impl fmt::Debug for LocalChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LocalChain")
            .field("network_id", &self.network_id.get())
            .field("accounts", &self.accounts.len())
            .finish()
    }
}

impl LocalChain {
    /// Deploys and wires the registry and escrow, then funds `accounts`
    /// generated accounts with `funds` each. The first account is the
    /// deployer and administrator of both contracts.
    pub fn boot(accounts: usize, funds: i128) -> Result<Self, ClientError> {
        if accounts == 0 {
            return Err(ClientError::InvalidInput {
                message: "local chain needs at least one account".to_string(),
            });
        }
        let env = Env::new_with_config(EnvTestConfig {
            capture_snapshot_at_drop: false,
            ..Default::default()
        });
        env.mock_all_auths();

        let accounts: Vec<(String, Address)> = (0..accounts)
            .map(|_| {
                let address = Address::generate(&env);
                (strkey(&address), address)
            })
            .collect();
        let admin = accounts[0].1.clone();

        let registry = env.register(RentalProperty, ());
        let escrow = env.register(RentalEscrow, ());
        let token = env.register_stellar_asset_contract_v2(admin.clone()).address();

        let registry_client = RentalPropertyClient::new(&env, &registry);
        let escrow_client = RentalEscrowClient::new(&env, &escrow);
        settle(registry_client.try_init(&admin), |e| ClientError::from_registry(e, 0))?;
        settle(escrow_client.try_init(&admin, &registry, &token), |e| {
            ClientError::from_escrow(e, 0)
        })?;
        settle(
            registry_client.try_transfer_management_rights(&admin, &escrow),
            |e| ClientError::from_registry(e, 0),
        )?;

        let mint = StellarAssetClient::new(&env, &token);
        for (_, account) in &accounts {
            settle(mint.try_mint(account, &funds), host_error)?;
        }

        let chain = LocalChain {
            env,
            network_id: Cell::new(LOCAL_NETWORK_ID),
            accounts,
            registry,
            escrow,
            token,
        };
        info!(
            registry = %strkey(&chain.registry),
            escrow = %strkey(&chain.escrow),
            accounts = chain.accounts.len(),
            "Local chain ready"
        );
        Ok(chain)
    }

    /// Simulates the wallet moving to another network.
    pub fn switch_network(&self, network_id: u32) {
        info!(from = self.network_id.get(), to = network_id, "Switching network");
        self.network_id.set(network_id);
    }

    pub fn token_balance(&self, account: &str) -> Result<i128, ClientError> {
        let who = self.account(account)?;
        settle(TokenClient::new(&self.env, &self.token).try_balance(&who), host_error)
    }

    pub fn escrow_balance(&self) -> Result<i128, ClientError> {
        settle(
            TokenClient::new(&self.env, &self.token).try_balance(&self.escrow),
            host_error,
        )
    }

    pub fn landlord_properties(&self, landlord: &str) -> Result<Vec<u64>, ClientError> {
        let who = self.account(landlord)?;
        let ids = settle(self.registry_client().try_landlord_properties(&who), host_error)?;
        Ok(ids.iter().collect())
    }

    /// Address the registry trusts to mark properties rented.
    pub fn registry_manager(&self) -> Result<Option<String>, ClientError> {
        let manager = settle(self.registry_client().try_manager(), host_error)?;
        Ok(manager.as_ref().map(strkey))
    }

    fn account(&self, account: &str) -> Result<Address, ClientError> {
        self.accounts
            .iter()
            .find(|(name, _)| name == account)
            .map(|(_, address)| address.clone())
            .ok_or_else(|| ClientError::UnknownAccount {
                account: account.to_string(),
            })
    }

    fn registry_client(&self) -> RentalPropertyClient<'_> {
        RentalPropertyClient::new(&self.env, &self.registry)
    }

    fn escrow_client(&self) -> RentalEscrowClient<'_> {
        RentalEscrowClient::new(&self.env, &self.escrow)
    }

    fn execute(&self, signer: &str, call: RentalCall) -> Result<CallOutcome, ClientError> {
        let who = self.account(signer)?;
        let registry = self.registry_client();
        let escrow = self.escrow_client();

        match call {
            RentalCall::RegisterLandlord { landlord } => {
                let landlord = self.account(&landlord)?;
                settle(registry.try_register_landlord(&who, &landlord), |e| {
                    ClientError::from_registry(e, 0)
                })?;
                Ok(CallOutcome::Done)
            }
            RentalCall::CreateProperty {
                rent_price,
                security_deposit,
                metadata_uri,
            } => {
                let uri = SorobanString::from_str(&self.env, &metadata_uri);
                let id = settle(
                    registry.try_create_property(&who, &rent_price, &security_deposit, &uri),
                    |e| ClientError::from_registry(e, 0),
                )?;
                Ok(CallOutcome::PropertyCreated(id))
            }
            RentalCall::SetAvailability { property_id, available } => {
                settle(
                    registry.try_set_availability(&who, &property_id, &available),
                    |e| ClientError::from_registry(e, property_id),
                )?;
                Ok(CallOutcome::Done)
            }
            RentalCall::StartRental { property_id, duration } => {
                settle(escrow.try_start_rental(&who, &property_id, &duration), |e| {
                    ClientError::from_escrow(e, property_id)
                })?;
                Ok(CallOutcome::Rental(RentalState::Requested))
            }
            RentalCall::Approve { property_id } => {
                let state = settle(escrow.try_approve(&who, &property_id), |e| {
                    ClientError::from_escrow(e, property_id)
                })?;
                Ok(CallOutcome::Rental(state))
            }
            RentalCall::EndRental { property_id } => {
                settle(escrow.try_end_rental(&who, &property_id), |e| {
                    ClientError::from_escrow(e, property_id)
                })?;
                Ok(CallOutcome::Rental(RentalState::Closed))
            }
            RentalCall::CancelRequest { property_id } => {
                settle(escrow.try_cancel_request(&who, &property_id), |e| {
                    ClientError::from_escrow(e, property_id)
                })?;
                Ok(CallOutcome::Rental(RentalState::Listed))
            }
        }
    }
}

impl RentalLedger for LocalChain {
    fn network_id(&self) -> u32 {
        self.network_id.get()
    }

    fn request_accounts(&self) -> Vec<String> {
        self.accounts.iter().map(|(name, _)| name.clone()).collect()
    }

    fn deployment(&self) -> Deployment {
        Deployment::new(strkey(&self.registry), strkey(&self.escrow))
    }

    fn property_count(&self) -> Result<u64, ClientError> {
        settle(self.registry_client().try_property_count(), host_error)
    }

    fn property(&self, property_id: u64) -> Result<PropertyView, ClientError> {
        let property = settle(self.registry_client().try_get_property(&property_id), |e| {
            ClientError::from_registry(e, property_id)
        })?;
        Ok(property_view(&property))
    }

    fn rental(&self, property_id: u64) -> Result<RentalView, ClientError> {
        let escrow = self.escrow_client();
        let landlord = settle(escrow.try_landlord(&property_id), |e| {
            ClientError::from_escrow(e, property_id)
        })?;
        let rental = settle(escrow.try_get_rental(&property_id), host_error)?;
        let completed_rentals = settle(escrow.try_rental_count(&property_id), host_error)?;

        let view = match rental {
            Some(r) => RentalView {
                property_id,
                state: r.state,
                landlord: strkey(&r.landlord),
                tenant: r.tenant.as_ref().map(strkey),
                tenant_approved: r.tenant_approved,
                landlord_approved: r.landlord_approved,
                escrowed: r.escrowed(),
                completed_rentals,
            },
            None => RentalView {
                property_id,
                state: RentalState::Listed,
                landlord: strkey(&landlord),
                tenant: None,
                tenant_approved: false,
                landlord_approved: false,
                escrowed: 0,
                completed_rentals,
            },
        };
        Ok(view)
    }

    fn submit(&self, signer: &str, call: RentalCall) -> Pending<CallOutcome> {
        let name = call.name();
        let result = self.execute(signer, call);
        match &result {
            Ok(outcome) => debug!(call = name, signer, ?outcome, "Call settled"),
            Err(err) => warn!(call = name, signer, %err, "Call rejected"),
        }
        Pending::settled(name, result)
    }
}

fn property_view(property: &Property) -> PropertyView {
    PropertyView {
        id: property.id,
        landlord: strkey(&property.landlord),
        available: property.available,
        rented: property.rented,
        rent_price: property.rent_price,
        security_deposit: property.security_deposit,
        metadata_uri: std_string(&property.metadata_uri),
    }
}

/// Unwraps a `try_` client result, mapping contract errors with `map`.
fn settle<T, CE, E, IE>(
    result: Result<Result<T, CE>, Result<E, IE>>,
    map: impl FnOnce(E) -> ClientError,
) -> Result<T, ClientError>
where
    CE: fmt::Debug,
    IE: fmt::Debug,
{
    match result {
        Ok(Ok(value)) => Ok(value),
        Ok(Err(err)) => Err(ClientError::Ledger {
            message: format!("undecodable result: {:?}", err),
        }),
        Err(Ok(err)) => Err(map(err)),
        Err(Err(err)) => Err(ClientError::Ledger {
            message: format!("invocation failed: {:?}", err),
        }),
    }
}

fn host_error<E: fmt::Debug>(err: E) -> ClientError {
    ClientError::Ledger {
        message: format!("{:?}", err),
    }
}

fn strkey(address: &Address) -> String {
    std_string(&address.to_string())
}

fn std_string(s: &SorobanString) -> String {
    let mut buf = vec![0u8; s.len() as usize];
    s.copy_into_slice(&mut buf);
    String::from_utf8_lossy(&buf).into_owned()
}
