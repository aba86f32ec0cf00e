//! Integration tests for the OpenCards backend.

use std::sync::Arc;

use reqwest::{Client, StatusCode};
use serde_json::{json, Value};
use sqlx::SqlitePool;
use tempfile::TempDir;

use crate::config::{Config, DEFAULT_ASSET_BASE_URL};
use crate::db::{init_database, Repository};
use crate::deck::ModelCatalog;
use crate::{create_router, AppState};

const PASSWORD: &str = "hunter22";

/// Test fixture for integration tests.
struct TestFixture {
    client: Client,
    base_url: String,
    pool: SqlitePool,
    _temp_dir: TempDir,
}

impl TestFixture {
    async fn new() -> Self {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let db_path = temp_dir.path().join("test.sqlite");

        // Initialize database
        let pool = init_database(&db_path).await.expect("Failed to init DB");
        let repo = Arc::new(Repository::new(pool.clone()));

        // Create config
        let config = Config {
            db_path,
            bind_addr: "127.0.0.1:0".parse().unwrap(),
            log_level: "warn".to_string(),
            log_json: false,
            token_secret: "test-secret".to_string(),
            token_secret_generated: false,
            bcrypt_cost: 4,
            models_path: None,
            asset_base_url: DEFAULT_ASSET_BASE_URL.to_string(),
        };

        let state = AppState {
            repo,
            config: Arc::new(config),
            models: Arc::new(ModelCatalog::default()),
        };

        let app = create_router(state);

        // Bind to random port
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind");
        let addr = listener.local_addr().expect("Failed to get addr");
        let base_url = format!("http://{}", addr);

        // Spawn server
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        // Wait for server to start
        tokio::time::sleep(tokio::time::Duration::from_millis(100)).await;

        let client = Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()
            .unwrap();

        TestFixture {
            client,
            base_url,
            pool,
            _temp_dir: temp_dir,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Register an account and return its bearer token.
    async fn signup(&self, email: &str) -> String {
        let resp = self
            .client
            .post(self.url("/users/create"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = resp.json().await.unwrap();
        body["token"].as_str().unwrap().to_string()
    }

    async fn get(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .get(self.url(path))
            .bearer_auth(token)
            .send()
            .await
            .unwrap()
    }

    async fn post(&self, path: &str, token: &str, body: Value) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .bearer_auth(token)
            .json(&body)
            .send()
            .await
            .unwrap()
    }

    async fn user_data(&self, token: &str) -> Value {
        let resp = self.get("/users", token).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["userData"].clone()
    }

    async fn coins(&self, token: &str) -> i64 {
        let resp = self.get("/users/refresh", token).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let body: Value = resp.json().await.unwrap();
        body["coins"].as_i64().unwrap()
    }

    async fn profile_id(&self, email: &str) -> String {
        sqlx::query_scalar("SELECT id FROM user_data WHERE email = ?")
            .bind(email)
            .fetch_one(&self.pool)
            .await
            .unwrap()
    }
}

fn capture_payload(model: &str, xp: i64, coverage: i64, cloudiness: i64) -> Value {
    json!({
        "lat": 52.3086,
        "lon": 4.7639,
        "alt": 3500.0,
        "speed": 210.0,
        "reg": "PH-BXA",
        "callsign": "KLM1234",
        "gpsLat": 52.31,
        "gpsLon": 4.76,
        "distance": 1.2,
        "radarLat": 52.3,
        "radarLon": 4.7,
        "radarRange": 50.0,
        "associatedAirportId": 580,
        "flightId": 987654,
        "track": 240.0,
        "icon": 3,
        "status": 1,
        "timestamp": 1746057600000i64,
        "onGround": false,
        "source": 0,
        "model": model,
        "xp": xp,
        "xpUserBonus": 0,
        "coverage": coverage,
        "cloudiness": cloudiness,
        "imageLarge": null,
        "imageThumb": null,
        "imageCopy": null,
        "glow": false,
        "coins": coverage / 100 + cloudiness / 100
    })
}

// ==================== ACCOUNTS ====================

#[tokio::test]
async fn test_health_check() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/health"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_signup_duplicate_email() {
    let fixture = TestFixture::new().await;
    fixture.signup("pilot@example.com").await;

    let resp = fixture
        .client
        .post(fixture.url("/users/create"))
        .json(&json!({ "email": "pilot@example.com", "password": "other" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "CONFLICT");
}

#[tokio::test]
async fn test_malformed_body_uses_error_envelope() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/users/create"))
        .header("content-type", "application/json")
        .body("{\"email\": ")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_login_returns_empty_progress() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .client
        .post(fixture.url("/users"))
        .json(&json!({ "email": "pilot@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["token"], token);
    assert_eq!(body["capturedRegs"], json!([]));
    assert_eq!(body["missions"], json!([]));

    let user = &body["userData"];
    assert_eq!(user["xp"], 0);
    assert_eq!(user["coins"], 0);
    assert_eq!(user["numExposures"], 5);
    assert_eq!(user["name"], "User");
    assert_eq!(user["cards"], json!([]));
    assert_eq!(user["items"], json!([]));
    assert_eq!(user["achievements"], json!([]));
    assert_eq!(user["numAircraftModels"], 0);
    assert_eq!(user["unlimitedPhotosTimeLeft"], 0.0);
    assert_eq!(user["radarExpandTimeLeft"], 0.0);
    assert_eq!(user["relocationTimeLeft"], 0.0);
}

#[tokio::test]
async fn test_login_wrong_password() {
    let fixture = TestFixture::new().await;
    fixture.signup("pilot@example.com").await;

    let resp = fixture
        .client
        .post(fixture.url("/users"))
        .json(&json!({ "email": "pilot@example.com", "password": "wrong" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = fixture
        .client
        .post(fixture.url("/users"))
        .json(&json!({ "email": "nobody@example.com", "password": PASSWORD }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_authed_routes_require_token() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/users"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "No token provided");

    let resp = fixture.get("/users/refresh", "not-a-token").await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Invalid token");

    let resp = fixture
        .client
        .post(fixture.url("/items/purchase"))
        .json(&json!({ "productId": "item_catch_again_1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_rename() {
    let fixture = TestFixture::new().await;
    let ace = fixture.signup("ace@example.com").await;
    let rookie = fixture.signup("rookie@example.com").await;

    let resp = fixture.post("/users/name", &ace, json!({ "name": "  " })).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = fixture.post("/users/name", &ace, json!({ "name": "Ace" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = fixture.post("/users/name", &rookie, json!({ "name": "Ace" })).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);

    // Keeping your own name is fine
    let resp = fixture.post("/users/name", &ace, json!({ "name": "Ace" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert_eq!(fixture.user_data(&ace).await["name"], "Ace");
    assert_eq!(fixture.user_data(&rookie).await["name"], "User");
}

#[tokio::test]
async fn test_resubmitting_shared_default_name() {
    let fixture = TestFixture::new().await;
    let first = fixture.signup("first@example.com").await;
    let second = fixture.signup("second@example.com").await;

    // Every new player starts as "User"
    let resp = fixture.post("/users/name", &first, json!({ "name": "User" })).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let resp = fixture.post("/users/name", &second, json!({ "name": "User" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = fixture.post("/users/name", &first, json!({ "name": "Maverick" })).await;
    assert_eq!(resp.status(), StatusCode::OK);

    // Still held by the second player
    let resp = fixture.post("/users/name", &first, json!({ "name": "User" })).await;
    assert_eq!(resp.status(), StatusCode::CONFLICT);
    assert_eq!(fixture.user_data(&first).await["name"], "Maverick");
}

#[tokio::test]
async fn test_messaging_token() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .client
        .patch(fixture.url("/users"))
        .bearer_auth(&token)
        .json(&json!({ "messagingToken": "fcm-123" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["messagingToken"], "fcm-123");
    assert_eq!(body["unlimitedPhotosTimeLeft"], 0.0);
    assert_eq!(body["isVerified"], true);

    assert_eq!(fixture.user_data(&token).await["messagingToken"], "fcm-123");
}

#[tokio::test]
async fn test_consume_photo() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/users/consume/photo", &token, json!({ "amount": 2 }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["numExposures"], 3);

    let resp = fixture
        .post("/users/consume/photo", &token, json!({ "amount": -1 }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fixture.user_data(&token).await["numExposures"], 3);
}

#[tokio::test]
async fn test_oversized_photo_amount_rejected() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/users/consume/photo", &token, json!({ "amount": i64::MAX }))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "VALIDATION_ERROR");

    // The profile is still readable and unchanged
    assert_eq!(fixture.user_data(&token).await["numExposures"], 5);

    let resp = fixture
        .post("/users/consume/photo", &token, json!({ "amount": 1 }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["numExposures"], 4);
}

// ==================== CAPTURES ====================

#[tokio::test]
async fn test_perfect_capture_grants_two_coins() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/captures/3", &token, capture_payload("B738", 1200, 100, 100))
        .await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["coins"], 2);
    assert_eq!(body["userXp"], 1200);
    assert_eq!(body["card"]["aircraftId"], "B738");
    assert_eq!(body["card"]["modelId"], "B738");
    assert_eq!(body["card"]["tier"], "paper");
    assert_eq!(body["card"]["coverage"], 100.0);
    assert_eq!(body["capture"]["reg"], "PH-BXA");
    assert_eq!(body["capture"]["destination"], "580");
    assert!(body["capture"]["userId"].is_string());

    assert_eq!(fixture.coins(&token).await, 2);
}

#[tokio::test]
async fn test_capture_reward_per_condition() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    fixture
        .post("/captures/3", &token, capture_payload("B738", 10, 100, 40))
        .await;
    assert_eq!(fixture.coins(&token).await, 1);

    fixture
        .post("/captures/3", &token, capture_payload("B738", 10, 30, 40))
        .await;
    assert_eq!(fixture.coins(&token).await, 1);
}

#[tokio::test]
async fn test_captures_accumulate_on_one_card() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let first: Value = fixture
        .post("/captures/3", &token, capture_payload("B738", 10_000, 100, 0))
        .await
        .json()
        .await
        .unwrap();
    let second: Value = fixture
        .post("/captures/3", &token, capture_payload("B738", 5_000, 0, 0))
        .await
        .json()
        .await
        .unwrap();
    assert_eq!(first["card"]["id"], second["card"]["id"]);
    assert_eq!(second["card"]["xp"], 15_000);
    assert_eq!(second["card"]["tier"], "silver");
    assert_eq!(second["card"]["coverage"], 50.0);
    // Client coins plus the balance before this capture
    assert_eq!(second["coins"], 1);

    fixture
        .post("/captures/3", &token, capture_payload("A320", 60_000, 0, 0))
        .await;

    let resp = fixture.get("/users", &token).await;
    let body: Value = resp.json().await.unwrap();
    let user = &body["userData"];
    assert_eq!(user["xp"], 75_000);
    assert_eq!(user["numAircraftModels"], 2);
    assert_eq!(user["cards"].as_array().unwrap().len(), 2);
    assert_eq!(user["unlockedModelIds"], json!(["B738", "A320"]));
    assert_eq!(body["capturedRegs"].as_array().unwrap().len(), 3);

    let gold = user["cards"]
        .as_array()
        .unwrap()
        .iter()
        .find(|c| c["aircraftId"] == "A320")
        .unwrap();
    assert_eq!(gold["tier"], "gold");
    assert_eq!(gold["glowCount"], 0);
}

#[tokio::test]
async fn test_invalid_capture_rejected() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/captures/3", &token, capture_payload("B738", 10, 101, 0))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let resp = fixture
        .post("/captures/3", &token, capture_payload("", 10, 0, 0))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(fixture.user_data(&token).await["cards"], json!([]));
}

#[tokio::test]
async fn test_oversized_capture_xp_rejected() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/captures/3", &token, capture_payload("B738", i64::MAX, 100, 100))
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut payload = capture_payload("B738", 10, 100, 100);
    payload["xpUserBonus"] = json!(i64::MAX);
    let resp = fixture.post("/captures/3", &token, payload).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    // Two captures at the limit still add up
    for _ in 0..2 {
        let resp = fixture
            .post("/captures/3", &token, capture_payload("B738", 1_000_000, 0, 0))
            .await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let resp = fixture.get("/users", &token).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["userData"]["cards"].as_array().unwrap().len(), 1);
    assert_eq!(body["userData"]["xp"], 2_000_000);
}

#[tokio::test]
async fn test_oversized_capture_coins_rejected() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let mut payload = capture_payload("B738", 10, 100, 100);
    payload["coins"] = json!(i64::MAX);
    let resp = fixture.post("/captures/3", &token, payload).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let mut payload = capture_payload("B738", 10, 100, 100);
    payload["coins"] = json!(-1);
    let resp = fixture.post("/captures/3", &token, payload).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    assert_eq!(fixture.coins(&token).await, 0);
    assert_eq!(fixture.user_data(&token).await["cards"], json!([]));
}

// ==================== ITEMS ====================

#[tokio::test]
async fn test_item_catalog() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/items"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["itemProducts"].as_array().unwrap().len(), 9);
    assert_eq!(body["itemProducts"][0]["itemType"], "CATCH_ANYWHERE");
    assert_eq!(body["availableItems"]["CATCH_AGAIN"], 1);
    assert_eq!(body["availableItems"]["TRAVEL_ANYWHERE"], 1);
    assert_eq!(body["availableItems"]["CAMERA_STABILIZER"], 0);
}

#[tokio::test]
async fn test_item_purchase_and_removal() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/items/purchase", &token, json!({ "productId": "item_catch_again_2" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    // No floor: the balance may go negative
    assert_eq!(body["coins"], -100);
    assert_eq!(body["addedItems"]["CATCH_AGAIN"], 3);
    assert_eq!(body["addedItems"]["CATCH_ANYWHERE"], 0);
    assert_eq!(fixture.coins(&token).await, -100);

    let items = fixture.user_data(&token).await["items"].clone();
    assert_eq!(items.as_array().unwrap().len(), 3);
    assert_eq!(items[0]["type"], "CATCH_AGAIN");

    let resp = fixture
        .client
        .delete(fixture.url("/items/remove/CATCH_AGAIN"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], true);

    let items = fixture.user_data(&token).await["items"].clone();
    assert_eq!(items.as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_remove_missing_item_is_not_found() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;
    let other = fixture.signup("other@example.com").await;

    fixture
        .post("/items/purchase", &token, json!({ "productId": "item_catch_again_1" }))
        .await;
    fixture
        .post("/items/purchase", &other, json!({ "productId": "item_cameras_stabilizer_1" }))
        .await;

    let resp = fixture
        .client
        .delete(fixture.url("/items/remove/CAMERA_STABILIZER"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Neither player's items changed
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(count, 2);
}

#[tokio::test]
async fn test_unknown_item_product_causes_no_mutation() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/items/purchase", &token, json!({ "productId": "item_free_money" }))
        .await;
    assert!(resp.status().is_client_error());

    assert_eq!(fixture.coins(&token).await, 0);
    assert_eq!(fixture.user_data(&token).await["items"], json!([]));
}

#[tokio::test]
async fn test_purchase_without_profile_is_forbidden() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    sqlx::query("DELETE FROM user_data WHERE email = ?")
        .bind("pilot@example.com")
        .execute(&fixture.pool)
        .await
        .unwrap();

    let resp = fixture
        .post("/items/purchase", &token, json!({ "productId": "item_catch_again_1" }))
        .await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["code"], "PROFILE_MISSING");

    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM items")
        .fetch_one(&fixture.pool)
        .await
        .unwrap();
    assert_eq!(count, 0);
}

// ==================== BOOSTS ====================

#[tokio::test]
async fn test_boost_purchase() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/users/purchase", &token, json!({ "productId": "photos_unlimited_1" }))
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    // Balance before the purchase
    assert_eq!(body["coins"], 0);
    let left = body["unlimitedPhotosTimeLeft"].as_f64().unwrap();
    assert!(left > 1790.0 && left <= 1800.0);
    assert_eq!(body["radarExpandTimeLeft"], 0.0);

    assert_eq!(fixture.coins(&token).await, -75);

    let resp = fixture
        .post("/users/purchase", &token, json!({ "productId": "radar_expand_1" }))
        .await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["coins"], -75);
    assert!(body["radarExpandTimeLeft"].as_f64().unwrap() > 1790.0);
}

#[tokio::test]
async fn test_unknown_boost_causes_no_mutation() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post("/users/purchase", &token, json!({ "productId": "photos_infinite" }))
        .await;
    assert!(resp.status().is_client_error());
    assert_eq!(fixture.coins(&token).await, 0);
}

#[tokio::test]
async fn test_relocate() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post(
            "/users/relocate",
            &token,
            json!({ "destination": "LHR", "destinationId": 2233, "cost": 20 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["coins"], -20);
    assert_eq!(body["photosUnlimited"], false);
    assert!(body["relocationTimeLeft"].as_f64().unwrap() > 1790.0);

    let resp = fixture.get("/users", &token).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["relocation"]["airport"], 2233);
    assert_eq!(body["relocation"]["airportId"], 2233);

    let resp = fixture
        .post(
            "/users/relocate",
            &token,
            json!({ "destination": "LHR", "destinationId": 2233, "cost": -5 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fixture.coins(&token).await, -20);
}

#[tokio::test]
async fn test_oversized_relocation_cost_rejected() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    let resp = fixture
        .post(
            "/users/relocate",
            &token,
            json!({ "destination": "LHR", "destinationId": 2233, "cost": i64::MAX }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    assert_eq!(fixture.coins(&token).await, 0);

    let resp = fixture
        .post(
            "/users/relocate",
            &token,
            json!({ "destination": "LHR", "destinationId": 2233, "cost": 1_000_000 }),
        )
        .await;
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(fixture.coins(&token).await, -1_000_000);
}

#[tokio::test]
async fn test_expired_boosts_report_zero() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;

    sqlx::query(
        "UPDATE user_data SET unlimited_photos_expiry_time = 1000, radar_expand_expiry_time = 1000, relocation_expiry_time = 1000",
    )
    .execute(&fixture.pool)
    .await
    .unwrap();

    let resp = fixture.get("/users/refresh", &token).await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["unlimitedPhotosTimeLeft"], 0.0);
    assert_eq!(body["radarExpandTimeLeft"], 0.0);
    assert_eq!(body["relocationTimeLeft"], 0.0);
}

// ==================== READ-ONLY COLLECTIONS ====================

#[tokio::test]
async fn test_seeded_collections_in_snapshot() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;
    let profile_id = fixture.profile_id("pilot@example.com").await;

    sqlx::query("INSERT INTO achievements (id, user_id, progress_numerator, is_achieved) VALUES ('RARE100', ?, 8, 0)")
        .bind(&profile_id)
        .execute(&fixture.pool)
        .await
        .unwrap();
    sqlx::query("INSERT INTO missions (id, user_id, type, unclaimed, unfinished) VALUES (1, ?, 'daily', 0, 2)")
        .bind(&profile_id)
        .execute(&fixture.pool)
        .await
        .unwrap();
    sqlx::query(
        r#"
        INSERT INTO mission_data (id, mission_id, key, title, award, type, timestamp, claimed, percentage, length) VALUES
            (2, 1, 'LondonParis', 'Catch a flight going from London to Paris or back', 10, 'daily', 1746057600000, 0, 0, 1),
            (1, 1, 'catchR44', 'Catch an aircraft of type ROBINSON R-44', 8, 'daily', 1746057600000, 0, 0, 1)
        "#,
    )
    .execute(&fixture.pool)
    .await
    .unwrap();
    for (table, column, value) in [
        ("friends", "friend_id", "friend-1"),
        ("unlocked_models", "model_id", "C172"),
        ("battle_deck", "card_id", "card-1"),
    ] {
        sqlx::query(&format!("INSERT INTO {} (user_id, {}) VALUES (?, ?)", table, column))
            .bind(&profile_id)
            .bind(value)
            .execute(&fixture.pool)
            .await
            .unwrap();
    }

    fixture
        .post("/captures/3", &token, capture_payload("B738", 10, 0, 0))
        .await;

    let resp = fixture.get("/users", &token).await;
    let body: Value = resp.json().await.unwrap();
    let user = &body["userData"];

    assert_eq!(user["achievements"][0]["id"], "RARE100");
    assert_eq!(user["achievements"][0]["progressNumerator"], 8);
    assert_eq!(user["friendIds"], json!(["friend-1"]));
    assert_eq!(user["battleDeck"], json!(["card-1"]));
    assert_eq!(user["unlockedModelIds"], json!(["C172", "B738"]));

    let missions = user["missions"].as_array().unwrap();
    assert_eq!(missions.len(), 1);
    assert_eq!(missions[0]["type"], "daily");
    assert_eq!(missions[0]["data"][0]["key"], "catchR44");
    assert_eq!(missions[0]["data"][1]["key"], "LondonParis");
    assert_eq!(body["missions"], user["missions"]);

    // The capture response carries the same collections
    let resp = fixture
        .post("/captures/3", &token, capture_payload("B738", 10, 0, 0))
        .await;
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["achievements"][0]["id"], "RARE100");
    assert_eq!(body["missions"][0]["unfinished"], 2);
}

// ==================== MISC ROUTES ====================

#[tokio::test]
async fn test_battle_rules() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/battle/rules/202518"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["isoYearWeek"], 202518);
    assert_eq!(body["name"], "Boom week");
    assert_eq!(body["description"], "Manifacturer is BOOM");
    assert_eq!(body["predicate"]["manufacturer"], "BOOM");

    let resp = fixture
        .client
        .get(fixture.url("/battle/rules/202519"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let resp = fixture
        .client
        .get(fixture.url("/battle/rules/this-week"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_route() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .post(fixture.url("/leaderboard"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "API route not found");
}

// ==================== DECK VIEWS ====================

#[tokio::test]
async fn test_deck_requires_session() {
    let fixture = TestFixture::new().await;

    let resp = fixture
        .client
        .get(fixture.url("/app/deck"))
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"], "/app/login");

    let resp = fixture
        .client
        .get(fixture.url("/app/deck"))
        .header("cookie", "authToken=not-a-token")
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
    assert!(resp.text().await.unwrap().contains("User not found"));
}

#[tokio::test]
async fn test_login_form_and_deck() {
    let fixture = TestFixture::new().await;
    let token = fixture.signup("pilot@example.com").await;
    fixture
        .post("/captures/3", &token, capture_payload("B738", 100, 0, 0))
        .await;
    fixture
        .post("/captures/3", &token, capture_payload("A320", 20_000, 0, 0))
        .await;

    let resp = fixture
        .client
        .get(fixture.url("/app/login"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert!(resp.text().await.unwrap().contains("<form"));

    let resp = fixture
        .client
        .post(fixture.url("/app/login"))
        .form(&[("email", "pilot@example.com"), ("password", "wrong")])
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let resp = fixture
        .client
        .post(fixture.url("/app/login"))
        .form(&[("email", "pilot@example.com"), ("password", PASSWORD)])
        .send()
        .await
        .unwrap();
    assert!(resp.status().is_redirection());
    assert_eq!(resp.headers()["location"], "/app/deck");
    let cookie = resp.headers()["set-cookie"].to_str().unwrap().to_string();
    assert!(cookie.starts_with(&format!("authToken={}", token)));

    let resp = fixture
        .client
        .get(fixture.url("/app/deck"))
        .header("cookie", format!("authToken={}", token))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let html = resp.text().await.unwrap();
    let silver = html.find("A320").unwrap();
    let paper = html.find("B738").unwrap();
    assert!(silver < paper);
    assert!(html.contains("/models/images/silver/A320_lg.png"));
}
