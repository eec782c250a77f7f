use anyhow::{bail, Context, Result};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use rental_client::config::confirm_timeout_from_env;
use rental_client::{
    format_units, tokens, CallOutcome, LocalChain, MetadataFetcher, NetworkConfig, RentalCall,
    RentalLedger,
};

const PROPERTY_URI: &str = concat!(
    "https://indigo-tiny-aardvark-637.mypinata.cloud/ipfs/",
    "QmUnZNzrjsxU4KkeKkEV2qiBNJyZhMXABNcFwL2LiNhuPL"
);

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    info!("Starting deployment");
    let timeout = confirm_timeout_from_env();

    // deployer, landlord, tenant
    let chain = LocalChain::boot(3, tokens(1_000)).context("booting local chain")?;
    let accounts = chain.request_accounts();
    let (deployer, landlord) = (&accounts[0], &accounts[1]);
    let balance = chain.token_balance(landlord)?;
    info!(
        landlord = %landlord,
        balance = %format_units(balance),
        "Deploying with landlord account"
    );

    chain
        .submit(deployer, RentalCall::RegisterLandlord { landlord: landlord.clone() })
        .wait(timeout)
        .await
        .context("registering landlord")?;

    let created = chain
        .submit(
            landlord,
            RentalCall::CreateProperty {
                rent_price: tokens(1),
                security_deposit: tokens(2),
                metadata_uri: PROPERTY_URI.to_string(),
            },
        )
        .wait(timeout)
        .await
        .context("creating property")?;
    let property_id = match created {
        CallOutcome::PropertyCreated(id) => id,
        other => bail!("create_property settled with {:?}", other),
    };

    chain
        .submit(landlord, RentalCall::SetAvailability { property_id, available: true })
        .wait(timeout)
        .await
        .context("listing property")?;

    verify(&chain, property_id, landlord)?;

    let path = NetworkConfig::default_path();
    let mut config = NetworkConfig::load_or_default(&path)?;
    config.insert(chain.network_id(), chain.deployment());
    config.save(&path)?;
    info!(path = %path.display(), "Config written");

    let fetcher = MetadataFetcher::new(timeout)?;
    match fetcher.fetch(PROPERTY_URI).await {
        Ok(metadata) => info!(
            name = metadata.display_name(),
            attributes = metadata.attributes.len(),
            "Property metadata"
        ),
        Err(err) => warn!("Could not fetch metadata, please verify manually: {}", err),
    }

    info!("Deployment completed successfully");
    Ok(())
}

fn verify(chain: &LocalChain, property_id: u64, landlord: &str) -> Result<()> {
    info!("Verifying contract state");

    let property = chain.property(property_id)?;
    if property.landlord != landlord || !property.available || property.rented {
        bail!("property {} was not listed as expected: {:?}", property_id, property);
    }
    info!(
        property_id,
        uri = %property.metadata_uri,
        rent = %format_units(property.rent_price),
        deposit = %format_units(property.security_deposit),
        "Property listed"
    );

    let owned = chain.landlord_properties(landlord)?;
    info!(count = owned.len(), properties = ?owned, "Landlord properties");

    let deployment = chain.deployment();
    let manager = chain.registry_manager()?;
    if manager.as_deref() != Some(deployment.rental_escrow.address.as_str()) {
        bail!("registry manager is {:?}, expected the escrow", manager);
    }
    info!(
        registry = %deployment.rental_property.address,
        escrow = %deployment.rental_escrow.address,
        "Escrow wired as registry manager"
    );
    Ok(())
}
