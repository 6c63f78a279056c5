use std::{
    net::SocketAddr,
    sync::{
        atomic::{AtomicU32, Ordering},
        Arc,
    },
};

use ed25519_dalek::SigningKey;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{TcpListener, TcpStream},
};

use og_drop_checker::{
    config::{Config, DelayRange, RetryOptions},
    runner::run_batch,
    signer::{derive_keypair, public_key},
    writer::write_results,
};

fn test_config(endpoint: String) -> Config {
    Config {
        api_endpoint: endpoint,
        signature_message: "airdrop eligibility check".to_string(),
        signature_token: "shared-token".to_string(),
        user_agent: "test-agent".to_string(),
        enable_proxy: false,
        concurrency: 2,
        delay_between_accounts: DelayRange { min: 0, max: 1 },
        retry_options: RetryOptions {
            retries: 2,
            min_timeout: 1,
            max_timeout: 5,
        },
    }
}

fn encoded_key(seed: u8) -> String {
    let key = SigningKey::from_bytes(&[seed; 32]);
    bs58::encode(key.to_keypair_bytes()).into_string()
}

fn pubkey_of(encoded: &str) -> String {
    public_key(&derive_keypair(encoded).unwrap())
}

async fn read_request(socket: &mut TcpStream) -> String {
    let mut buf = Vec::new();
    let mut tmp = [0u8; 1024];

    loop {
        let n = match socket.read(&mut tmp).await {
            Ok(0) | Err(_) => break,
            Ok(n) => n,
        };
        buf.extend_from_slice(&tmp[..n]);

        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            let headers = String::from_utf8_lossy(&buf[..pos]).to_lowercase();
            let content_length = headers
                .lines()
                .find_map(|l| l.strip_prefix("content-length:"))
                .and_then(|v| v.trim().parse::<usize>().ok())
                .unwrap_or(0);
            if buf.len() >= pos + 4 + content_length {
                break;
            }
        }
    }

    String::from_utf8_lossy(&buf).into_owned()
}

/// Minimal HTTP stub. The responder maps a request (start line, headers and
/// JSON body as one string) to a status and body; `None` drops the
/// connection without responding, which the client sees as a transport
/// failure. Returns the stub address and an accepted-connections counter.
fn spawn_stub<F>(listener: TcpListener, responder: F) -> (SocketAddr, Arc<AtomicU32>)
where
    F: Fn(&str) -> Option<(u16, String)> + Send + Sync + 'static,
{
    let addr = listener.local_addr().unwrap();
    let accepted = Arc::new(AtomicU32::new(0));
    let accepted_clone = Arc::clone(&accepted);
    let responder = Arc::new(responder);

    tokio::spawn(async move {
        loop {
            let (mut socket, _) = match listener.accept().await {
                Ok(conn) => conn,
                Err(_) => break,
            };
            accepted_clone.fetch_add(1, Ordering::SeqCst);
            let responder = Arc::clone(&responder);

            tokio::spawn(async move {
                let request = read_request(&mut socket).await;
                if let Some((status, body)) = responder(&request) {
                    let reason = match status {
                        200 => "OK",
                        400 => "Bad Request",
                        _ => "Error",
                    };
                    let response = format!(
                        "HTTP/1.1 {status} {reason}\r\ncontent-type: application/json\r\ncontent-length: {}\r\nconnection: close\r\n\r\n{body}",
                        body.len()
                    );
                    let _ = socket.write_all(response.as_bytes()).await;
                }
                let _ = socket.shutdown().await;
            });
        }
    });

    (addr, accepted)
}

async fn start_stub<F>(responder: F) -> (String, Arc<AtomicU32>)
where
    F: Fn(&str) -> Option<(u16, String)> + Send + Sync + 'static,
{
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let (addr, accepted) = spawn_stub(listener, responder);
    (format!("http://{addr}/check"), accepted)
}

#[tokio::test]
async fn all_wallets_eligible() {
    let (endpoint, _) =
        start_stub(|_| Some((200, r#"{"success":true,"data":100}"#.to_string()))).await;

    let keys = vec![encoded_key(1), encoded_key(2)];
    let mut config = test_config(endpoint);
    config.concurrency = 1;

    let outcomes = run_batch(keys.clone(), vec![], Arc::new(config)).await.unwrap();

    assert_eq!(outcomes.len(), 2);
    assert!(outcomes.iter().all(|o| o.eligible && o.amount == 100.0));

    let dir = tempfile::tempdir().unwrap();
    let eligible_path = dir.path().join("eligible.txt");
    let not_eligible_path = dir.path().join("not_eligible.txt");
    write_results(&outcomes, &eligible_path, &not_eligible_path).await;

    let eligible = std::fs::read_to_string(&eligible_path).unwrap();
    assert_eq!(eligible.lines().count(), 2);
    assert_eq!(std::fs::read_to_string(&not_eligible_path).unwrap(), "");
}

#[tokio::test]
async fn sentinel_and_eligible_mix_partition_correctly() {
    let key1 = encoded_key(11);
    let key2 = encoded_key(12);
    let pub1 = pubkey_of(&key1);

    let (endpoint, _) = start_stub(move |request| {
        if request.contains(&pub1) {
            Some((400, r#"{"success":false,"error":"No OG drop"}"#.to_string()))
        } else {
            Some((200, r#"{"success":true,"data":50}"#.to_string()))
        }
    })
    .await;

    let config = test_config(endpoint);
    let outcomes = run_batch(vec![key1.clone(), key2.clone()], vec![], Arc::new(config))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 2);
    let first = outcomes.iter().find(|o| o.private_key == key1).unwrap();
    assert!(!first.eligible);
    assert_eq!(first.error.as_deref(), Some("No OG drop"));
    let second = outcomes.iter().find(|o| o.private_key == key2).unwrap();
    assert!(second.eligible);
    assert_eq!(second.amount, 50.0);

    let dir = tempfile::tempdir().unwrap();
    let eligible_path = dir.path().join("eligible.txt");
    let not_eligible_path = dir.path().join("not_eligible.txt");
    write_results(&outcomes, &eligible_path, &not_eligible_path).await;

    let eligible = std::fs::read_to_string(&eligible_path).unwrap();
    assert_eq!(eligible, format!("{key2}:{}:50\n", pubkey_of(&key2)));
    let not_eligible = std::fs::read_to_string(&not_eligible_path).unwrap();
    assert_eq!(not_eligible, format!("{key1}:{}\n", pubkey_of(&key1)));
}

#[tokio::test]
async fn sentinel_response_is_not_retried() {
    let (endpoint, accepted) =
        start_stub(|_| Some((400, r#"{"success":false,"error":"No OG drop"}"#.to_string())))
            .await;

    let config = test_config(endpoint);
    let outcomes = run_batch(vec![encoded_key(21)], vec![], Arc::new(config))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert_eq!(outcomes[0].error.as_deref(), Some("No OG drop"));
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn transport_failures_are_retried_to_budget() {
    // Connections accepted, then closed without a response.
    let (endpoint, accepted) = start_stub(|_| None).await;

    let config = test_config(endpoint);
    let outcomes = run_batch(vec![encoded_key(31)], vec![], Arc::new(config))
        .await
        .unwrap();

    assert_eq!(outcomes.len(), 1);
    assert!(!outcomes[0].eligible);
    assert!(outcomes[0].error.is_some());
    // retries = 2 -> exactly 3 attempts
    assert_eq!(accepted.load(Ordering::SeqCst), 3);

    let dir = tempfile::tempdir().unwrap();
    let eligible_path = dir.path().join("eligible.txt");
    let not_eligible_path = dir.path().join("not_eligible.txt");
    write_results(&outcomes, &eligible_path, &not_eligible_path).await;
    assert_eq!(
        std::fs::read_to_string(&not_eligible_path)
            .unwrap()
            .lines()
            .count(),
        1
    );
}

#[tokio::test]
async fn empty_key_list_aborts_before_any_request() {
    let (endpoint, accepted) =
        start_stub(|_| Some((200, r#"{"success":true,"data":1}"#.to_string()))).await;

    let config = test_config(endpoint);
    let result = run_batch(vec![], vec![], Arc::new(config)).await;

    assert!(result.is_err());
    assert_eq!(accepted.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn malformed_key_still_produces_a_traceable_outcome() {
    let (endpoint, accepted) =
        start_stub(|_| Some((200, r#"{"success":true,"data":10}"#.to_string()))).await;

    let bad_key = "0OIl-not-base58".to_string();
    let good_key = encoded_key(41);
    let config = test_config(endpoint);

    let outcomes = run_batch(
        vec![bad_key.clone(), good_key.clone()],
        vec![],
        Arc::new(config),
    )
    .await
    .unwrap();

    assert_eq!(outcomes.len(), 2);
    let bad = outcomes.iter().find(|o| o.private_key == bad_key).unwrap();
    assert_eq!(bad.public_key, "unknown");
    assert_eq!(bad.error.as_deref(), Some("Failed to create keypair"));
    let good = outcomes.iter().find(|o| o.private_key == good_key).unwrap();
    assert!(good.eligible);

    // Only the well-formed wallet reached the API.
    assert_eq!(accepted.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn one_outcome_per_wallet_under_concurrency() {
    let (endpoint, _) =
        start_stub(|_| Some((200, r#"{"success":true,"data":5}"#.to_string()))).await;

    let keys: Vec<String> = (50..58).map(encoded_key).collect();
    let mut config = test_config(endpoint);
    config.concurrency = 3;

    let outcomes = run_batch(keys.clone(), vec![], Arc::new(config)).await.unwrap();

    assert_eq!(outcomes.len(), keys.len());
    for key in &keys {
        assert_eq!(
            outcomes.iter().filter(|o| &o.private_key == key).count(),
            1
        );
    }
}
