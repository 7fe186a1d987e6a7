use super::*;
use dropclub_types::api::Profile;
use futures::StreamExt;
use reqwest::StatusCode;
use serde_json::{json, Value};
use std::net::SocketAddr;
use tokio::net::TcpStream;
use tokio::time::{sleep, timeout, Duration};
use tokio_tungstenite::{
    connect_async, tungstenite::Message as WsMessage, MaybeTlsStream, WebSocketStream,
};

/// Config used by tests unless a test overrides a knob: known webhook
/// secret, no arcade cooldown, one admin email, reset enabled, and a
/// throwaway upload directory.
fn test_config() -> Config {
    Config {
        webhook_secret: "whsec_test".to_string(),
        arcade_cooldown_hours: 0,
        admin_emails: vec!["admin@example.com".to_string()],
        enable_reset: true,
        upload_dir: std::env::temp_dir()
            .join(format!("dropclub-test-{}", Uuid::new_v4()))
            .to_string_lossy()
            .into_owned(),
        ..Config::default()
    }
}

struct TestContext {
    service: Arc<Service>,
    base_url: String,
    http: reqwest::Client,
    server_handle: tokio::task::JoinHandle<()>,
}

impl TestContext {
    async fn new() -> Self {
        Self::with_config(test_config()).await
    }

    async fn with_config(config: Config) -> Self {
        let service = Arc::new(Service::new(config));
        let api = Api::new(service.clone());

        // Start server on random port
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));
        let router = api.router();
        let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
        let actual_addr = listener.local_addr().unwrap();
        let base_url = format!("http://{actual_addr}");

        let server_handle = tokio::spawn(async move {
            axum::serve(
                listener,
                router.into_make_service_with_connect_info::<SocketAddr>(),
            )
            .await
            .unwrap();
        });

        // Give server time to start
        sleep(Duration::from_millis(100)).await;

        Self {
            service,
            base_url,
            http: reqwest::Client::new(),
            server_handle,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn secret(&self) -> &str {
        &self.service.config().webhook_secret
    }

    async fn finish(request: reqwest::RequestBuilder) -> (StatusCode, Value) {
        let response = request.send().await.unwrap();
        let status = response.status();
        let body: Value = response.json().await.unwrap();
        (status, body)
    }

    async fn get(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = self.http.get(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::finish(request).await
    }

    async fn post(&self, path: &str, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut request = self.http.post(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::finish(request).await
    }

    async fn patch(&self, path: &str, token: Option<&str>, body: &Value) -> (StatusCode, Value) {
        let mut request = self.http.patch(self.url(path)).json(body);
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::finish(request).await
    }

    async fn delete(&self, path: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut request = self.http.delete(self.url(path));
        if let Some(token) = token {
            request = request.bearer_auth(token);
        }
        Self::finish(request).await
    }

    /// Register `<username>@example.com` and hand back the session token
    /// with the fresh profile.
    async fn register(&self, username: &str) -> (String, Profile) {
        let (status, body) = self
            .post(
                "/api/register",
                None,
                &json!({
                    "email": format!("{username}@example.com"),
                    "username": username,
                    "password": "hunter2!",
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        let token = body["token"].as_str().unwrap().to_string();
        let profile: Profile = serde_json::from_value(body["profile"].clone()).unwrap();
        (token, profile)
    }

    async fn create_drop(&self, admin_token: &str, title: &str, entry_cost: u64) -> u64 {
        let (status, body) = self
            .post(
                "/api/admin/drops",
                Some(admin_token),
                &json!({
                    "title": title,
                    "prize": title,
                    "ends_at": Utc::now() + chrono::Duration::days(7),
                    "entry_cost": entry_cost,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK);
        body["drop"]["id"].as_u64().unwrap()
    }

    /// Credit points through the signed payment webhook, the only door
    /// purchased points come in through.
    async fn fund(&self, account: AccountId, points: u64) {
        let event_id = format!("evt_{}", Uuid::new_v4().simple());
        let body = purchase_event(&event_id, account, points).to_string();
        let header = webhook::sign(self.secret(), &body, Utc::now());
        let (status, ack) = self.post_webhook(&body, Some(&header)).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(ack["received"], true);
    }

    async fn post_webhook(&self, body: &str, header: Option<&str>) -> (StatusCode, Value) {
        let mut request = self
            .http
            .post(self.url("/api/stripe/webhook"))
            .body(body.to_string());
        if let Some(header) = header {
            request = request.header("stripe-signature", header);
        }
        Self::finish(request).await
    }
}

impl Drop for TestContext {
    fn drop(&mut self) {
        self.server_handle.abort();
    }
}

fn purchase_event(event_id: &str, account: AccountId, points: u64) -> Value {
    json!({
        "id": event_id,
        "type": "checkout.session.completed",
        "data": {
            "object": {
                "metadata": {
                    "type": "point_purchase",
                    "user_id": account,
                    "points": points.to_string(),
                    "pack_id": "pack_small",
                }
            }
        }
    })
}

/// Wait for the next text frame on an updates socket and parse it.
async fn next_update(socket: &mut WebSocketStream<MaybeTlsStream<TcpStream>>) -> Value {
    loop {
        let message = timeout(Duration::from_secs(5), socket.next())
            .await
            .expect("timed out waiting for an update")
            .expect("updates stream ended")
            .unwrap();
        if let WsMessage::Text(text) = message {
            return serde_json::from_str(&text).unwrap();
        }
    }
}

#[tokio::test]
async fn test_register_login_and_me() {
    let ctx = TestContext::new().await;

    let (token, profile) = ctx.register("alice").await;
    assert_eq!(profile.username, "alice");
    assert_eq!(profile.points, 0);
    assert_eq!(profile.lifetime_points, 0);
    assert!(!profile.admin);

    let (status, body) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["email"], "alice@example.com");
    assert_eq!(body["entries"], 0);
    assert_eq!(body["wins"], 0);
    assert_eq!(body["referrals"], 0);

    // No token, no profile
    let (status, body) = ctx.get("/api/me", None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);

    // A made-up token is just as dead
    let (status, _) = ctx.get("/api/me", Some(&Uuid::new_v4().to_string())).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // Emails are unique, case-insensitively
    let (status, _) = ctx
        .post(
            "/api/register",
            None,
            &json!({
                "email": "ALICE@example.com",
                "username": "alice2",
                "password": "hunter2!",
            }),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Bad credentials never say which half was wrong
    let (status, body) = ctx
        .post(
            "/api/login",
            None,
            &json!({"email": "alice@example.com", "password": "wrong"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"], "Invalid email or password");
    let (status, _) = ctx
        .post(
            "/api/login",
            None,
            &json!({"email": "nobody@example.com", "password": "hunter2!"}),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // A fresh login issues a second, independent session
    let (status, body) = ctx
        .post(
            "/api/login",
            None,
            &json!({"email": "alice@example.com", "password": "hunter2!"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let second = body["token"].as_str().unwrap().to_string();
    assert_ne!(second, token);
    let (status, _) = ctx.get("/api/me", Some(&second)).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_register_validation() {
    let ctx = TestContext::new().await;

    let (status, _) = ctx
        .post(
            "/api/register",
            None,
            &json!({"email": "nope", "username": "bob", "password": "pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = ctx
        .post(
            "/api/register",
            None,
            &json!({"email": "bob@example.com", "username": "   ", "password": "pw"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_gate() {
    let ctx = TestContext::new().await;
    let (admin, admin_profile) = ctx.register("admin").await;
    assert!(admin_profile.admin);
    let (member, _) = ctx.register("bob").await;

    let request = json!({
        "title": "PS6 Launch Console",
        "prize": "PS6",
        "ends_at": Utc::now() + chrono::Duration::days(3),
    });
    let (status, _) = ctx.post("/api/admin/drops", None, &request).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = ctx.post("/api/admin/drops", Some(&member), &request).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["success"], false);
    let (status, body) = ctx.post("/api/admin/drops", Some(&admin), &request).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drop"]["id"], 1);
    assert_eq!(body["drop"]["entry_cost"], 0);
    assert_eq!(body["drop"]["status"], "active");

    let (status, _) = ctx.get("/api/admin/stats", Some(&member)).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, body) = ctx.get("/api/admin/stats", Some(&admin)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["accounts"], 2);
    assert_eq!(body["drops"], 1);
    assert_eq!(body["entries"], 0);
}

#[tokio::test]
async fn test_drop_lifecycle() {
    let ctx = TestContext::new().await;
    let (admin, _) = ctx.register("admin").await;

    // Blank titles and past deadlines never go up
    let (status, _) = ctx
        .post(
            "/api/admin/drops",
            Some(&admin),
            &json!({
                "title": "   ",
                "prize": "Sneakers",
                "ends_at": Utc::now() + chrono::Duration::days(1),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = ctx
        .post(
            "/api/admin/drops",
            Some(&admin),
            &json!({
                "title": "Too Late",
                "prize": "Sneakers",
                "ends_at": Utc::now() - chrono::Duration::hours(1),
            }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let id = ctx.create_drop(&admin, "Air Jordan 1", 25).await;

    // Listing and detail agree
    let (status, body) = ctx.get("/api/drops", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drops"].as_array().unwrap().len(), 1);
    let (status, body) = ctx.get(&format!("/api/drops/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drop"]["title"], "Air Jordan 1");
    assert_eq!(body["drop"]["entry_cost"], 25);
    assert_eq!(body["drop"]["image_url"], "/placeholder.jpg");

    let (status, body) = ctx
        .patch(
            &format!("/api/admin/drops/{id}"),
            Some(&admin),
            &json!({"title": "Air Jordan 1 Retro"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drop"]["title"], "Air Jordan 1 Retro");
    assert_eq!(body["drop"]["entry_cost"], 25);

    let (status, body) = ctx
        .delete(&format!("/api/admin/drops/{id}"), Some(&admin))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let (status, _) = ctx.get(&format!("/api/drops/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = ctx.get("/api/drops/999", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_entry_flow() {
    let ctx = TestContext::new().await;
    let (admin, _) = ctx.register("admin").await;
    let (token, profile) = ctx.register("carol").await;
    let drop_id = ctx.create_drop(&admin, "Limited Hoodie", 25).await;
    let enter_path = format!("/api/drops/{drop_id}/enter");

    // Broke accounts stay out
    let (status, body) = ctx.post(&enter_path, Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);

    ctx.fund(profile.id, 100).await;
    let (_, body) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(body["profile"]["points"], 100);

    let (status, body) = ctx.post(&enter_path, Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["points"], 75);
    assert_eq!(body["entry_count"], 1);

    // One ticket per account
    let (status, _) = ctx.post(&enter_path, Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (_, body) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(body["profile"]["points"], 75);
    assert_eq!(body["entries"], 1);

    // The vault lists the entered drop
    let (_, body) = ctx.get("/api/me/entries", Some(&token)).await;
    let entries = body["entries"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["drop"]["id"], drop_id);

    // First entry unlocks its achievement
    let (_, body) = ctx.get("/api/achievements", Some(&token)).await;
    let earned: Vec<&Value> = body["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|item| item["earned"] == true)
        .collect();
    assert_eq!(earned.len(), 1);
    assert_eq!(earned[0]["id"], "first_entry");

    // The point history carries the purchase and the entry debit
    let (_, body) = ctx.get("/api/me/ledger", Some(&token)).await;
    let records = body["records"].as_array().unwrap();
    assert_eq!(records.len(), 2);
    let net: i64 = records
        .iter()
        .map(|record| record["amount"].as_i64().unwrap())
        .sum();
    assert_eq!(net, 75);

    // Settling the drop notifies the winner and lands in their wins
    let (status, body) = ctx
        .post(
            &format!("/api/admin/drops/{drop_id}/winner"),
            Some(&admin),
            &json!({"account_id": profile.id}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["drop"]["status"], "completed");
    assert_eq!(body["drop"]["winner"], json!(profile.id));

    let (_, body) = ctx.get("/api/me/wins", Some(&token)).await;
    let wins = body["wins"].as_array().unwrap();
    assert_eq!(wins.len(), 1);
    assert_eq!(wins[0]["id"], drop_id);

    let (_, body) = ctx.get("/api/notifications", Some(&token)).await;
    let notifications = body["notifications"].as_array().unwrap();
    assert_eq!(notifications.len(), 1);
    assert_eq!(notifications[0]["read"], false);
    let (_, body) = ctx.post("/api/notifications/read", Some(&token), &json!({})).await;
    assert_eq!(body["updated"], 1);
    let (_, body) = ctx.post("/api/notifications/read", Some(&token), &json!({})).await;
    assert_eq!(body["updated"], 0);

    // Settled means settled
    let (status, _) = ctx
        .post(
            &format!("/api/admin/drops/{drop_id}/winner"),
            Some(&admin),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::CONFLICT);

    // Balances stay consistent with the stored rows
    let account = ctx
        .service
        .query(|state| state.account(&profile.id))
        .unwrap()
        .unwrap();
    assert_eq!(account.points, 75);
    assert_eq!(account.lifetime_points, 100);
}

#[tokio::test]
async fn test_entering_closed_drop_rejected() {
    let ctx = TestContext::new().await;
    let (admin, _) = ctx.register("admin").await;
    let (token, entrant) = ctx.register("carol").await;
    let (other_token, _) = ctx.register("dan").await;
    let drop_id = ctx.create_drop(&admin, "Ticket Raffle", 0).await;

    ctx.fund(entrant.id, 50).await;
    let (status, _) = ctx
        .post(&format!("/api/drops/{drop_id}/enter"), Some(&token), &json!({}))
        .await;
    assert_eq!(status, StatusCode::OK);

    // Settle it, then try to squeeze in
    let (status, _) = ctx
        .post(
            &format!("/api/admin/drops/{drop_id}/winner"),
            Some(&admin),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = ctx
        .post(
            &format!("/api/drops/{drop_id}/enter"),
            Some(&other_token),
            &json!({}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "This drop has ended");
}

#[tokio::test]
async fn test_webhook_signature_and_replay() {
    let ctx = TestContext::new().await;
    let (token, profile) = ctx.register("dave").await;
    let body = purchase_event("evt_1", profile.id, 500).to_string();

    // Unsigned, forged and stale deliveries all bounce
    let (status, _) = ctx.post_webhook(&body, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let forged = webhook::sign("whsec_wrong", &body, Utc::now());
    let (status, _) = ctx.post_webhook(&body, Some(&forged)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let stale = webhook::sign(ctx.secret(), &body, Utc::now() - chrono::Duration::seconds(600));
    let (status, _) = ctx.post_webhook(&body, Some(&stale)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["points"], 0);

    // A good signature credits exactly once
    let header = webhook::sign(ctx.secret(), &body, Utc::now());
    let (status, ack) = ctx.post_webhook(&body, Some(&header)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["points"], 500);

    // Redelivery of the same event id is acknowledged but credits nothing
    let header = webhook::sign(ctx.secret(), &body, Utc::now());
    let (status, _) = ctx.post_webhook(&body, Some(&header)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["points"], 500);

    // A purchase event missing its points is refused outright
    let body = json!({
        "id": "evt_malformed",
        "type": "checkout.session.completed",
        "data": {"object": {"metadata": {"type": "point_purchase", "user_id": profile.id}}},
    })
    .to_string();
    let header = webhook::sign(ctx.secret(), &body, Utc::now());
    let (status, _) = ctx.post_webhook(&body, Some(&header)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    // Subscription checkouts flip the flag instead of crediting
    let body = json!({
        "id": "evt_2",
        "type": "checkout.session.completed",
        "data": {"object": {"metadata": {"type": "subscription", "user_id": profile.id}}},
    })
    .to_string();
    let header = webhook::sign(ctx.secret(), &body, Utc::now());
    let (status, _) = ctx.post_webhook(&body, Some(&header)).await;
    assert_eq!(status, StatusCode::OK);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["subscriber"], true);
    assert_eq!(me["profile"]["points"], 500);

    // Unrelated event kinds are acknowledged and ignored
    let body = json!({"id": "evt_3", "type": "invoice.paid", "data": {"object": {}}}).to_string();
    let header = webhook::sign(ctx.secret(), &body, Utc::now());
    let (status, ack) = ctx.post_webhook(&body, Some(&header)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(ack["received"], true);
}

#[tokio::test]
async fn test_arcade_play() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register("erin").await;

    let (status, _) = ctx
        .post("/api/arcade/play", None, &json!({"game": "scratch"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, body) = ctx
        .post("/api/arcade/play", Some(&token), &json!({"game": "scratch"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["game"], "scratch");
    let payout = body["outcome"]["payout"].as_u64().unwrap();
    assert!(payout >= 10);
    assert_eq!(body["points"], payout);
    assert_eq!(body["lifetime_points"], payout);

    // Every scratch pays, so the first arcade win is already earned
    let (_, body) = ctx.get("/api/achievements", Some(&token)).await;
    assert!(body["achievements"]
        .as_array()
        .unwrap()
        .iter()
        .any(|item| item["id"] == "first_win" && item["earned"] == true));

    // Hi-lo needs the call up front
    let (status, body) = ctx
        .post("/api/arcade/play", Some(&token), &json!({"game": "hilo"}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Pick higher or lower first");
    let (status, body) = ctx
        .post(
            "/api/arcade/play",
            Some(&token),
            &json!({"game": "hilo", "guess": "higher"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["outcome"]["game"], "hilo");
    assert_eq!(body["outcome"]["guess"], "higher");
    let first = body["outcome"]["first"].as_u64().unwrap();
    let second = body["outcome"]["second"].as_u64().unwrap();
    assert!((1..=13).contains(&first));
    assert!((1..=13).contains(&second));
}

#[tokio::test]
async fn test_arcade_cooldown() {
    let mut config = test_config();
    config.arcade_cooldown_hours = 24;
    let ctx = TestContext::with_config(config).await;
    let (token, profile) = ctx.register("frank").await;

    let (status, _) = ctx
        .post("/api/arcade/play", Some(&token), &json!({"game": "wheel"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    let (status, body) = ctx
        .post("/api/arcade/play", Some(&token), &json!({"game": "wheel"}))
        .await;
    assert_eq!(status, StatusCode::TOO_MANY_REQUESTS);
    assert_eq!(body["error"], "Free play is still on cooldown");

    // The paid box is not a free play and ignores the cooldown
    ctx.fund(profile.id, 100).await;
    let (status, _) = ctx.post("/api/arcade/mystery", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_mystery_box() {
    let ctx = TestContext::new().await;
    let (token, profile) = ctx.register("gina").await;

    let (status, body) = ctx.post("/api/arcade/mystery", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Not enough points");

    ctx.fund(profile.id, 100).await;
    let (status, body) = ctx.post("/api/arcade/mystery", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    let value = body["reward"]["value"].as_u64().unwrap();
    assert!(value >= 25);
    // 100 in, 100 spent, reward back out
    assert_eq!(body["points"], value);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["lifetime_points"], 100 + value);
}

#[tokio::test]
async fn test_streak_claim() {
    let ctx = TestContext::new().await;
    let (token, _) = ctx.register("hana").await;

    let (status, body) = ctx.post("/api/me/streak", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streak"], 1);
    assert_eq!(body["bonus"], 0);
    assert_eq!(body["already_claimed"], false);

    // Second claim the same day changes nothing
    let (status, body) = ctx.post("/api/me/streak", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["streak"], 1);
    assert_eq!(body["already_claimed"], true);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["login_streak"], 1);
    assert_eq!(me["profile"]["points"], 0);
}

#[tokio::test]
async fn test_referral_flow() {
    let ctx = TestContext::new().await;
    let (alice_token, _) = ctx.register("alice").await;
    let (bob_token, _) = ctx.register("bob").await;
    let (carol_token, _) = ctx.register("carol").await;

    // The code mints once and then sticks
    let (status, body) = ctx.get("/api/me/referral", Some(&alice_token)).await;
    assert_eq!(status, StatusCode::OK);
    let code = body["code"].as_str().unwrap().to_string();
    assert_eq!(code.len(), 8);
    let (_, body) = ctx.get("/api/me/referral", Some(&alice_token)).await;
    assert_eq!(body["code"], code.as_str());

    // Redeeming pays both sides
    let (status, body) = ctx
        .post("/api/me/referral", Some(&bob_token), &json!({"code": code}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["points"], 50);
    let (_, body) = ctx.get("/api/me", Some(&alice_token)).await;
    assert_eq!(body["profile"]["points"], 50);
    assert_eq!(body["referrals"], 1);

    // The referrer hears about it
    let (_, body) = ctx.get("/api/notifications", Some(&alice_token)).await;
    assert_eq!(body["notifications"].as_array().unwrap().len(), 1);

    // Each account redeems at most once, and never its own code
    let (status, _) = ctx
        .post("/api/me/referral", Some(&bob_token), &json!({"code": code}))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    let (status, body) = ctx
        .post("/api/me/referral", Some(&alice_token), &json!({"code": code}))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Can't refer yourself!");
    let (status, _) = ctx
        .post(
            "/api/me/referral",
            Some(&carol_token),
            &json!({"code": "ZZZZZZZZ"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_rewards_redeem_and_packs() {
    let ctx = TestContext::new().await;
    let (token, profile) = ctx.register("ivan").await;

    let (status, body) = ctx.get("/api/rewards", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["rewards"].as_array().unwrap().len(), 4);
    let (status, body) = ctx.get("/api/packs", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["packs"].as_array().unwrap().len(), 3);

    // Checkout links out to the provider without touching the balance
    let (status, _) = ctx
        .post("/api/stripe/checkout", None, &json!({"pack_id": "pack_small"}))
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, _) = ctx
        .post(
            "/api/stripe/checkout",
            Some(&token),
            &json!({"pack_id": "pack_unknown"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, body) = ctx
        .post(
            "/api/stripe/checkout",
            Some(&token),
            &json!({"pack_id": "pack_medium"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    let url = body["url"].as_str().unwrap();
    assert!(url.contains("pack=pack_medium"));
    assert!(url.contains(&profile.id.to_string()));
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["points"], 0);

    // Redemption burns points and flips the VIP badge
    let (status, _) = ctx
        .post(
            "/api/rewards/redeem",
            Some(&token),
            &json!({"reward_id": "badge_vip"}),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    ctx.fund(profile.id, 600).await;
    let (status, body) = ctx
        .post(
            "/api/rewards/redeem",
            Some(&token),
            &json!({"reward_id": "badge_vip"}),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["cost"], 500);
    assert_eq!(body["points"], 100);
    let (_, me) = ctx.get("/api/me", Some(&token)).await;
    assert_eq!(me["profile"]["vip"], true);
    // Spending moves the balance but not the lifetime total
    assert_eq!(me["profile"]["lifetime_points"], 600);

    let (status, _) = ctx
        .post(
            "/api/rewards/redeem",
            Some(&token),
            &json!({"reward_id": "gold_toilet"}),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_leaderboard_order() {
    let ctx = TestContext::new().await;
    let (alice_token, alice) = ctx.register("alice").await;
    let (_, bob) = ctx.register("bob").await;
    ctx.fund(alice.id, 100).await;
    ctx.fund(bob.id, 300).await;

    let (status, body) = ctx.get("/api/leaderboard", None).await;
    assert_eq!(status, StatusCode::OK);
    let standings = body["standings"].as_array().unwrap();
    assert_eq!(standings.len(), 2);
    assert_eq!(standings[0]["username"], "bob");
    assert_eq!(standings[0]["lifetime_points"], 300);
    assert_eq!(standings[1]["username"], "alice");

    let (_, me) = ctx.get("/api/me", Some(&alice_token)).await;
    assert_eq!(me["rank"], 2);
}

#[tokio::test]
async fn test_feed_and_comments() {
    let ctx = TestContext::new().await;
    let (admin, _) = ctx.register("admin").await;
    let (token, _) = ctx.register("bob").await;
    let drop_id = ctx.create_drop(&admin, "Vinyl Box Set", 0).await;
    let comments_path = format!("/api/drops/{drop_id}/comments");

    // Creation lands on the public feed, newest first
    let (status, body) = ctx.get("/api/feed", None).await;
    assert_eq!(status, StatusCode::OK);
    let items = body["items"].as_array().unwrap();
    assert!(!items.is_empty());
    assert_eq!(items[0]["kind"], "drop_new");

    let (status, _) = ctx.post(&comments_path, None, &json!({"body": "hyped"})).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    let (status, body) = ctx
        .post(&comments_path, Some(&token), &json!({"body": "hyped for this"}))
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["comment"]["body"], "hyped for this");
    assert_eq!(body["comment"]["username"], "bob");
    let (_, body) = ctx.get(&comments_path, None).await;
    assert_eq!(body["comments"].as_array().unwrap().len(), 1);

    // Blank bodies and dead drops are rejected
    let (status, _) = ctx.post(&comments_path, Some(&token), &json!({"body": "  "})).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = ctx
        .post("/api/drops/999/comments", Some(&token), &json!({"body": "hi"}))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = ctx.get("/api/drops/999/comments", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_reset_gating() {
    let mut config = test_config();
    config.enable_reset = false;
    let ctx = TestContext::with_config(config).await;
    let (token, _) = ctx.register("judy").await;
    let (status, _) = ctx.post("/api/me/reset", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let ctx = TestContext::new().await;
    let (token, profile) = ctx.register("kara").await;
    ctx.fund(profile.id, 250).await;
    let (status, body) = ctx.post("/api/me/reset", Some(&token), &json!({})).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["profile"]["points"], 0);
    assert_eq!(body["profile"]["lifetime_points"], 0);
    assert_eq!(body["profile"]["login_streak"], 0);
}

#[tokio::test]
async fn test_upload_roundtrip() {
    let ctx = TestContext::new().await;
    let (admin, _) = ctx.register("admin").await;
    let (member, _) = ctx.register("bob").await;
    let pixels: &[u8] = &[0x89, 0x50, 0x4e, 0x47, 0x0d, 0x0a, 0x1a, 0x0a];

    let response = ctx
        .http
        .post(ctx.url("/api/admin/uploads"))
        .bearer_auth(&member)
        .header("content-type", "image/png")
        .body(pixels.to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = ctx
        .http
        .post(ctx.url("/api/admin/uploads"))
        .bearer_auth(&admin)
        .header("content-type", "image/png")
        .body(pixels.to_vec())
        .send()
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body: Value = response.json().await.unwrap();
    let url = body["url"].as_str().unwrap().to_string();
    assert!(url.starts_with("/uploads/"));
    assert!(url.ends_with(".png"));

    // The stored file is served straight back
    let fetched = ctx.http.get(ctx.url(&url)).send().await.unwrap();
    assert_eq!(fetched.status(), StatusCode::OK);
    assert_eq!(fetched.bytes().await.unwrap().as_ref(), pixels);
}

#[tokio::test]
async fn test_updates_stream() {
    let ctx = TestContext::new().await;
    let (admin, _) = ctx.register("admin").await;

    let ws_url = format!("{}/api/updates?filter=all", ctx.base_url.replace("http", "ws"));
    let (mut socket, _) = connect_async(&ws_url).await.unwrap();
    // Give the subscription time to attach before triggering updates
    sleep(Duration::from_millis(100)).await;

    ctx.create_drop(&admin, "Signed Poster", 0).await;

    // A new drop announces itself on the feed, then as the drop row
    let update = next_update(&mut socket).await;
    assert_eq!(update["type"], "feed");
    assert_eq!(update["item"]["kind"], "drop_new");
    let update = next_update(&mut socket).await;
    assert_eq!(update["type"], "drop");
    assert_eq!(update["drop"]["title"], "Signed Poster");
}

#[tokio::test]
async fn test_updates_stream_account_filter() {
    let ctx = TestContext::new().await;
    let (_, alice) = ctx.register("alice").await;
    let (_, bob) = ctx.register("bob").await;

    let ws_url = format!(
        "{}/api/updates?filter=account:{}",
        ctx.base_url.replace("http", "ws"),
        bob.id
    );
    let (mut socket, _) = connect_async(&ws_url).await.unwrap();
    sleep(Duration::from_millis(100)).await;

    // Alice's balance change is someone else's business
    ctx.fund(alice.id, 100).await;
    ctx.fund(bob.id, 200).await;

    let update = next_update(&mut socket).await;
    assert_eq!(update["type"], "balance");
    assert_eq!(update["account"], json!(bob.id));
    assert_eq!(update["points"], 200);
}
