//! Integration test: pin a file against a local pinning endpoint, register it
//! on an in-memory ledger, then gate and pay for it from a second account.

mod common;

use std::sync::Arc;

use common::gateway_server::{self, GatewayServerOptions};
use tempfile::tempdir;
use vidgate_core::ledger::{Address, Ledger, MemoryLedger, VideoId, Wei};
use vidgate_core::market::{self, Access, MarketError, UploadRequest};
use vidgate_core::pinning::{PinningClient, PinningError};
use vidgate_core::session::{Session, StaticWallet, Wallet};

fn addr(n: u8) -> Address {
    Address::parse(&format!("0x{:040x}", n)).unwrap()
}

async fn session(ledger: &Arc<MemoryLedger>, who: u8) -> Session {
    let wallet: Arc<dyn Wallet> = Arc::new(StaticWallet::new(vec![addr(who)]));
    let mut s = Session::new(Some(wallet), Arc::clone(ledger) as Arc<dyn Ledger>);
    s.connect().await.unwrap();
    s
}

#[test]
fn pin_file_sends_credentials_and_returns_identifier() {
    let server = gateway_server::start(Vec::new());
    let dir = tempdir().unwrap();
    let path = dir.path().join("clip.mp4");
    std::fs::write(&path, vec![7u8; 2048]).unwrap();

    let client = PinningClient::new(format!("{}pinning/pinFileToIPFS", server.base), " key ", "secret");
    let id = client.pin_file(&path).unwrap();
    assert_eq!(id.as_str(), "QmPinnedByServer");

    let reqs = server.requests();
    assert_eq!(reqs.len(), 1);
    let req = &reqs[0];
    assert_eq!(req.method, "POST");
    assert_eq!(req.path, "/pinning/pinFileToIPFS");
    assert_eq!(req.headers.get("pinata_api_key").map(String::as_str), Some("key"));
    assert_eq!(
        req.headers.get("pinata_secret_api_key").map(String::as_str),
        Some("secret")
    );
    let body = String::from_utf8_lossy(&req.body);
    assert!(body.contains("name=\"file\""));
    assert!(body.contains("name=\"pinataMetadata\""));
    assert!(body.contains("video/mp4"));
}

#[test]
fn pin_rejection_reports_service_details() {
    let server = gateway_server::start_with_options(
        Vec::new(),
        GatewayServerOptions {
            post_status: 401,
            post_body: r#"{"error":{"reason":"INVALID_CREDENTIALS","details":"Invalid API key"}}"#
                .to_string(),
            ..Default::default()
        },
    );
    let dir = tempdir().unwrap();
    let path = dir.path().join("clip.webm");
    std::fs::write(&path, b"webm bytes").unwrap();

    let client = PinningClient::new(server.base.clone(), "bad", "bad");
    match client.pin_file(&path) {
        Err(PinningError::Rejected { status, details }) => {
            assert_eq!(status, 401);
            assert_eq!(details, "Invalid API key");
        }
        other => panic!("expected Rejected, got {:?}", other),
    }
}

#[tokio::test]
async fn publish_then_pay_to_watch() {
    let server = gateway_server::start(Vec::new());
    let dir = tempdir().unwrap();
    let path = dir.path().join("lecture.mp4");
    std::fs::write(&path, vec![1u8; 512]).unwrap();

    let ledger = Arc::new(MemoryLedger::new());
    let owner = session(&ledger, 1).await;
    let viewer = session(&ledger, 2).await;
    let pinning = PinningClient::new(server.base.clone(), "k", "s");

    let published = market::publish(
        &owner,
        &pinning,
        &UploadRequest {
            path,
            title: " Lecture 1 ".to_string(),
            description: "intro".to_string(),
            price_ether: "0.05".to_string(),
        },
    )
    .await
    .unwrap();
    assert_eq!(published.content_id.as_str(), "QmPinnedByServer");

    let listed = market::catalog(ledger.as_ref()).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].title, "Lecture 1");
    assert_eq!(listed[0].price.to_ether_string(), "0.05");

    let id = VideoId(0);
    let price = match market::access(&viewer, id).await.unwrap() {
        Access::PaymentRequired { price } => price,
        other => panic!("expected PaymentRequired, got {:?}", other),
    };
    assert_eq!(price, Wei::from_ether_str("0.05").unwrap());

    market::pay_to_watch(&viewer, id).await.unwrap();
    assert!(matches!(
        market::access(&viewer, id).await.unwrap(),
        Access::Granted { .. }
    ));
    assert_eq!(ledger.earnings_of(&addr(1)), price);

    assert!(matches!(
        market::remove(&viewer, id).await,
        Err(MarketError::Ledger(_))
    ));
    market::remove(&owner, id).await.unwrap();
    assert!(market::catalog(ledger.as_ref()).await.unwrap().is_empty());
}
