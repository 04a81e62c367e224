//! Session lifecycle over HTTP: issuance, interaction, one-shot
//! consumption, expiry.

use std::time::Duration;

use crate::*;

#[tokio::test]
async fn start_returns_token_and_partial_signature() {
    let server = spawn_server(500).await;

    let (status, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);

    let token = body["token"].as_str().unwrap();
    let signature = body["signature"].as_str().unwrap();
    assert_eq!(token.len(), 64);
    assert_eq!(signature.len(), 16);
    assert_eq!(server.registry.len(), 1);
}

#[tokio::test]
async fn interact_with_unknown_token_is_ignored() {
    let server = spawn_server(500).await;

    let (status, body) = post(
        &format!("{}/session/interact", server.base),
        serde_json::json!({ "token": "deadbeef" }),
    )
    .await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], false);

    // Missing token gets the identical answer
    let (_, body) = post(&format!("{}/session/interact", server.base), serde_json::json!({})).await;
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn full_session_flow_earns_the_verified_flag() {
    let server = spawn_server(500).await;

    let (_, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    let token = body["token"].as_str().unwrap().to_string();

    for _ in 0..3 {
        let (_, body) = post(
            &format!("{}/session/interact", server.base),
            serde_json::json!({ "token": token }),
        )
        .await;
        assert_eq!(body["success"], true);
    }

    // Let the session clock run past claimed - grace
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let mut body = submission("ada", 3000);
    body["token"] = serde_json::json!(token);
    let (status, body) = post(&format!("{}/scores", server.base), body).await;
    assert_eq!(status, 200);
    assert_eq!(body["score"]["verified"], true);

    // Consumed and deleted
    assert_eq!(server.registry.len(), 0);
}

#[tokio::test]
async fn spent_token_is_worthless_on_a_second_submission() {
    let server = spawn_server(500).await;

    let (_, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    let token = body["token"].as_str().unwrap().to_string();
    for _ in 0..3 {
        post(
            &format!("{}/session/interact", server.base),
            serde_json::json!({ "token": token }),
        )
        .await;
    }
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let mut first = submission("ada", 3000);
    first["token"] = serde_json::json!(token);
    let (_, body) = post(&format!("{}/scores", server.base), first).await;
    assert_eq!(body["score"]["verified"], true);

    let mut second = submission("bob", 3000);
    second["token"] = serde_json::json!(token);
    let (status, body) = post(&format!("{}/scores", server.base), second).await;
    // Still accepted — just never verified
    assert_eq!(status, 200);
    assert_eq!(body["score"]["verified"], false);
}

#[tokio::test(flavor = "multi_thread")]
async fn racing_submissions_verify_at_most_one() {
    let server = spawn_server(500).await;

    let (_, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    let token = body["token"].as_str().unwrap().to_string();
    for _ in 0..3 {
        post(
            &format!("{}/session/interact", server.base),
            serde_json::json!({ "token": token }),
        )
        .await;
    }
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let mut a = submission("first", 3000);
    a["token"] = serde_json::json!(token);
    let mut b = submission("second", 3000);
    b["token"] = serde_json::json!(token);

    let url = format!("{}/scores", server.base);
    let (ra, rb) = tokio::join!(post(&url, a), post(&url, b));

    let verified = [ra.1, rb.1]
        .iter()
        .filter(|body| body["score"]["verified"] == true)
        .count();
    assert_eq!(verified, 1, "exactly one racer may consume the session");
}

#[tokio::test]
async fn swept_session_is_gone_even_if_never_submitted() {
    let server = spawn_server(500).await;

    let (_, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    let token = body["token"].as_str().unwrap().to_string();

    // Zero lifetime stands in for a 30-minute-old session
    let evicted = server.registry.sweep(Duration::ZERO);
    assert_eq!(evicted, 1);

    let (_, body) = post(
        &format!("{}/session/interact", server.base),
        serde_json::json!({ "token": token }),
    )
    .await;
    assert_eq!(body["success"], false);
}
