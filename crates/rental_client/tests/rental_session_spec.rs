use std::time::Duration;

use httptest::{matchers::*, responders::*, Expectation, Server};
use rental_client::{
    tokens, ClientError, Deployment, LocalChain, MetadataFetcher, NetworkConfig, PropertyStatus,
    RentalLedger, RentalSession, RentalState,
};
use serde_json::json;

const FUNDS: i128 = 100;
const URI: &str = "https://metadata.example/ipfs/house.json";

struct World {
    chain: LocalChain,
    config: NetworkConfig,
    deployer: String,
    landlord: String,
    tenant: String,
    other: String,
}

fn world() -> World {
    let chain = LocalChain::boot(4, tokens(FUNDS)).unwrap();
    let accounts = chain.request_accounts();
    let mut config = NetworkConfig::default();
    config.insert(chain.network_id(), chain.deployment());
    World {
        config,
        deployer: accounts[0].clone(),
        landlord: accounts[1].clone(),
        tenant: accounts[2].clone(),
        other: accounts[3].clone(),
        chain,
    }
}

fn fetcher() -> MetadataFetcher {
    MetadataFetcher::new(Duration::from_secs(2)).unwrap()
}

fn session(w: &World) -> RentalSession<'_, LocalChain> {
    RentalSession::connect(&w.chain, &w.config, fetcher(), Duration::from_secs(5)).unwrap()
}

fn act_as<L: RentalLedger>(session: &RentalSession<'_, L>, account: &str) {
    session.accounts().accounts_changed(&[account.to_string()]);
}

/// Registers the landlord and lists one property at 1 token rent, 2 deposit.
async fn list_property(w: &World, s: &RentalSession<'_, LocalChain>, uri: &str) -> u64 {
    act_as(s, &w.deployer);
    s.register_landlord(&w.landlord).await.unwrap();
    act_as(s, &w.landlord);
    let id = s.create_property(tokens(1), tokens(2), uri).await.unwrap();
    s.set_availability(id, true).await.unwrap();
    id
}

#[tokio::test]
async fn test_full_rental_lifecycle() {
    let w = world();
    let s = session(&w);
    let id = list_property(&w, &s, URI).await;
    assert_eq!(id, 1);
    assert_eq!(s.status(id).unwrap(), PropertyStatus::Available);

    act_as(&s, &w.tenant);
    assert_eq!(s.rent(id, 1).await.unwrap(), RentalState::Requested);
    assert_eq!(
        s.status(id).unwrap(),
        PropertyStatus::Requested { tenant: w.tenant.clone() }
    );
    assert_eq!(w.chain.escrow_balance().unwrap(), tokens(3));
    assert!(s.rental(id).unwrap().has_approved(&w.tenant));

    act_as(&s, &w.landlord);
    assert_eq!(s.approve(id).await.unwrap(), RentalState::Active);
    assert_eq!(
        s.status(id).unwrap(),
        PropertyStatus::RentedBy { tenant: w.tenant.clone() }
    );
    let property = s.property(id).unwrap();
    assert!(property.rented);
    assert!(!property.available);
    assert_eq!(w.chain.token_balance(&w.landlord).unwrap(), tokens(FUNDS + 1));
    assert_eq!(w.chain.escrow_balance().unwrap(), tokens(2));

    s.end_rental(id).await.unwrap();
    assert_eq!(s.status(id).unwrap(), PropertyStatus::Available);
    let rental = s.rental(id).unwrap();
    assert_eq!(rental.state, RentalState::Closed);
    assert_eq!(rental.tenant, None);
    assert_eq!(rental.completed_rentals, 1);
    assert_eq!(w.chain.token_balance(&w.tenant).unwrap(), tokens(FUNDS - 1));
    assert_eq!(w.chain.escrow_balance().unwrap(), 0);
}

#[tokio::test]
async fn test_double_rental_race_has_one_winner() {
    let w = world();
    let s = session(&w);
    let id = list_property(&w, &s, URI).await;

    act_as(&s, &w.tenant);
    s.rent(id, 1).await.unwrap();

    act_as(&s, &w.other);
    assert_eq!(
        s.rent(id, 1).await,
        Err(ClientError::NotAvailable { property_id: id })
    );
    assert_eq!(w.chain.token_balance(&w.other).unwrap(), tokens(FUNDS));
    assert_eq!(s.rental(id).unwrap().tenant, Some(w.tenant.clone()));
}

#[tokio::test]
async fn test_precondition_failures_surface_as_errors() {
    let w = world();
    let s = session(&w);
    let id = list_property(&w, &s, URI).await;

    // landlord renting their own listing
    assert_eq!(
        s.rent(id, 1).await,
        Err(ClientError::InvalidCaller { property_id: id })
    );

    act_as(&s, &w.tenant);
    assert!(matches!(
        s.create_property(tokens(1), tokens(1), URI).await,
        Err(ClientError::Unauthorized { .. })
    ));
    assert_eq!(s.rent(99, 1).await, Err(ClientError::NotFound { property_id: 99 }));
    assert!(matches!(
        s.rent(id, 0).await,
        Err(ClientError::InvalidInput { .. })
    ));

    act_as(&s, &w.landlord);
    assert!(matches!(
        s.end_rental(id).await,
        Err(ClientError::InvalidState { property_id, .. }) if property_id == id
    ));
    assert!(matches!(
        s.approve(id).await,
        Err(ClientError::InvalidState { .. })
    ));
}

#[tokio::test]
async fn test_only_parties_drive_the_rental() {
    let w = world();
    let s = session(&w);
    let id = list_property(&w, &s, URI).await;

    act_as(&s, &w.tenant);
    s.rent(id, 1).await.unwrap();

    act_as(&s, &w.other);
    assert_eq!(s.approve(id).await, Err(ClientError::InvalidCaller { property_id: id }));
    assert_eq!(
        s.cancel_request(id).await,
        Err(ClientError::InvalidCaller { property_id: id })
    );

    act_as(&s, &w.landlord);
    s.approve(id).await.unwrap();
    assert!(matches!(
        s.set_availability(id, true).await,
        Err(ClientError::InvalidState { property_id, .. }) if property_id == id
    ));
    assert!(!s.property(id).unwrap().available);

    act_as(&s, &w.tenant);
    assert_eq!(
        s.end_rental(id).await,
        Err(ClientError::InvalidCaller { property_id: id })
    );
    assert_eq!(s.rental(id).unwrap().state, RentalState::Active);
}

#[tokio::test]
async fn test_cancel_request_refunds_tenant() {
    let w = world();
    let s = session(&w);
    let id = list_property(&w, &s, URI).await;

    act_as(&s, &w.tenant);
    s.rent(id, 2).await.unwrap();
    assert_eq!(w.chain.token_balance(&w.tenant).unwrap(), tokens(FUNDS - 4));

    s.cancel_request(id).await.unwrap();
    assert_eq!(w.chain.token_balance(&w.tenant).unwrap(), tokens(FUNDS));
    assert_eq!(s.rental(id).unwrap().state, RentalState::Listed);
    assert_eq!(s.status(id).unwrap(), PropertyStatus::Available);
}

#[tokio::test]
async fn test_calls_require_a_connected_account() {
    let w = world();
    let s = session(&w);

    assert_eq!(s.current_account(), Err(ClientError::NoAccount));
    assert_eq!(s.approve(1).await, Err(ClientError::NoAccount));

    let mut rx = s.accounts().subscribe();
    assert_eq!(s.connect_wallet().unwrap(), w.deployer);
    assert!(rx.has_changed().unwrap());
    assert_eq!(rx.borrow_and_update().as_deref(), Some(w.deployer.as_str()));
}

#[test]
fn test_connect_requires_matching_deployment() {
    let w = world();

    let empty = NetworkConfig::default();
    let result = RentalSession::connect(&w.chain, &empty, fetcher(), Duration::from_secs(1));
    assert!(matches!(
        result,
        Err(ClientError::NetworkMismatch { network_id }) if network_id == w.chain.network_id()
    ));

    let mut stale = NetworkConfig::default();
    stale.insert(w.chain.network_id(), Deployment::new("CSTALE", "CSTALE"));
    let result = RentalSession::connect(&w.chain, &stale, fetcher(), Duration::from_secs(1));
    assert!(matches!(result, Err(ClientError::NetworkMismatch { .. })));
}

#[tokio::test]
async fn test_network_switch_halts_until_rebound() {
    let w = world();
    let mut s = session(&w);
    let id = list_property(&w, &s, URI).await;

    w.chain.switch_network(5);
    assert_eq!(s.property(id), Err(ClientError::NetworkMismatch { network_id: 5 }));
    assert!(s.is_halted());

    // switching back alone does not lift the halt
    w.chain.switch_network(w.config.networks().next().unwrap());
    assert!(matches!(s.property(id), Err(ClientError::SessionHalted { .. })));
    assert!(matches!(
        s.set_availability(id, false).await,
        Err(err) if err.is_fatal()
    ));

    s.rebind(&w.config).unwrap();
    assert!(!s.is_halted());
    assert!(s.property(id).unwrap().available);
}

#[tokio::test]
async fn test_listings_degrade_on_metadata_failure() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/house.json")).respond_with(
            json_encoded(json!({ "name": "Harbour View", "attributes": [] })),
        ),
    );

    let w = world();
    let s = session(&w);
    let good = list_property(&w, &s, &server.url_str("/house.json")).await;
    let bad = s
        .create_property(tokens(2), tokens(4), "http://127.0.0.1:1/gone.json")
        .await
        .unwrap();

    let listings = s.listings().await.unwrap();
    assert_eq!(listings.len(), 2);

    assert_eq!(listings[0].property.id, good);
    assert!(!listings[0].is_partial());
    assert_eq!(listings[0].title(), "Harbour View");

    assert_eq!(listings[1].property.id, bad);
    assert!(listings[1].is_partial());
    assert_eq!(listings[1].title(), "Unnamed property");
    assert!(!listings[1].property.available);
}
