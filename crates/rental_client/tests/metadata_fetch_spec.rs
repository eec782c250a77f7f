use std::time::Duration;

use httptest::{matchers::*, responders::*, Expectation, Server};
use rental_client::metadata::AttributeValue;
use rental_client::{ClientError, MetadataFetcher};
use serde_json::json;

fn fetcher() -> MetadataFetcher {
    MetadataFetcher::new(Duration::from_secs(5)).unwrap()
}

#[tokio::test]
async fn test_fetch_metadata_success() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/ipfs/house.json")).respond_with(
            json_encoded(json!({
                "name": "Harbour View",
                "address": "1 Quay Street",
                "image": "https://img.example/house.png",
                "attributes": [
                    { "trait_type": "Bedrooms", "value": 2 },
                    { "trait_type": "Type of Residence", "value": "Apartment" }
                ]
            })),
        ),
    );

    let metadata = fetcher()
        .fetch(&server.url_str("/ipfs/house.json"))
        .await
        .unwrap();

    assert_eq!(metadata.display_name(), "Harbour View");
    assert_eq!(metadata.address.as_deref(), Some("1 Quay Street"));
    assert_eq!(metadata.description, None);
    assert_eq!(metadata.attribute("Bedrooms"), Some(&AttributeValue::Number(2.0)));
}

#[tokio::test]
async fn test_fetch_metadata_not_found() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/missing.json"))
            .respond_with(status_code(404)),
    );

    let uri = server.url_str("/missing.json");
    let result = fetcher().fetch(&uri).await;
    assert!(matches!(
        result,
        Err(ClientError::MetadataFetchFailed { uri: ref u, .. }) if *u == uri
    ));
}

#[tokio::test]
async fn test_fetch_metadata_not_json() {
    let server = Server::run();
    server.expect(
        Expectation::matching(request::method_path("GET", "/page"))
            .respond_with(status_code(200).body("<html>gateway timeout</html>")),
    );

    let result = fetcher().fetch(&server.url_str("/page")).await;
    match result {
        Err(ClientError::MetadataFetchFailed { message, .. }) => {
            assert!(message.starts_with("not a metadata document"));
        }
        other => panic!("expected MetadataFetchFailed, got {:?}", other),
    }
}

#[tokio::test]
async fn test_fetch_metadata_unreachable() {
    let result = fetcher().fetch("http://127.0.0.1:1/house.json").await;
    assert!(matches!(result, Err(ClientError::MetadataFetchFailed { .. })));
}
