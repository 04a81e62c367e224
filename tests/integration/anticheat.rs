//! Anti-cheat behavior through the full pipeline: the flag toggles, the
//! submission always lands.

use std::time::Duration;

use crate::*;

#[tokio::test]
async fn anonymous_submission_is_stored_but_never_verified() {
    let server = spawn_server(500).await;

    let (status, body) = post(&format!("{}/scores", server.base), submission("anon", 5000)).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["score"]["verified"], false);
}

#[tokio::test]
async fn unknown_token_is_stored_but_never_verified() {
    let server = spawn_server(500).await;

    let mut body = submission("p", 5000);
    body["token"] = serde_json::json!("0000000000000000");
    let (status, body) = post(&format!("{}/scores", server.base), body).await;
    assert_eq!(status, 200);
    assert_eq!(body["score"]["verified"], false);
}

#[tokio::test]
async fn claim_faster_than_the_session_ran_is_unverified() {
    let server = spawn_server(500).await;

    let (_, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    let token = body["token"].as_str().unwrap().to_string();
    for _ in 0..5 {
        post(
            &format!("{}/session/interact", server.base),
            serde_json::json!({ "token": token }),
        )
        .await;
    }

    // The session is only milliseconds old; a 9.5 s claim is implausible
    let mut body = submission("hasty", 9500);
    body["token"] = serde_json::json!(token);
    let (status, body) = post(&format!("{}/scores", server.base), body).await;
    assert_eq!(status, 200);
    assert_eq!(body["success"], true);
    assert_eq!(body["score"]["verified"], false);
}

#[tokio::test]
async fn too_few_interactions_is_unverified_despite_plausible_timing() {
    let server = spawn_server(500).await;

    let (_, body) = post(&format!("{}/session/start", server.base), serde_json::json!({})).await;
    let token = body["token"].as_str().unwrap().to_string();
    for _ in 0..2 {
        post(
            &format!("{}/session/interact", server.base),
            serde_json::json!({ "token": token }),
        )
        .await;
    }
    tokio::time::sleep(Duration::from_millis(1200)).await;

    let mut body = submission("idle", 3000);
    body["token"] = serde_json::json!(token);
    let (status, body) = post(&format!("{}/scores", server.base), body).await;
    assert_eq!(status, 200);
    assert_eq!(body["score"]["verified"], false);
}
