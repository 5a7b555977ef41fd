// Integration tests for `GatewayClient` using wiremock.

use serde_json::json;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use lxgate_api::types::{SimulationTarget, UserAccount};
use lxgate_api::{Error, GatewayClient};

// ── Helpers ─────────────────────────────────────────────────────────

async fn setup() -> (MockServer, GatewayClient) {
    let server = MockServer::start().await;
    let client = GatewayClient::from_reqwest(&server.uri(), reqwest::Client::new()).unwrap();
    (server, client)
}

// ── Happy-path tests ────────────────────────────────────────────────

#[tokio::test]
async fn test_list_logs() {
    let (server, client) = setup().await;

    let body = json!({
        "logs": [
            {
                "timestamp": "2026-03-01T10:00:05Z",
                "sensor_id": "soil-0001",
                "attack_type": "spoofing",
                "severity": "High",
                "message": "ECC signature mismatch",
                "blocked": true
            },
            {
                "timestamp": "2026-03-01T10:00:00Z",
                "sensor_id": "water-0002",
                "attack_type": "replay",
                "severity": "Medium",
                "message": "Nonce reuse detected"
            }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let logs = client.list_logs().await.unwrap();

    assert_eq!(logs.len(), 2);
    assert_eq!(logs[0].sensor_id.as_deref(), Some("soil-0001"));
    assert_eq!(logs[0].attack_type.as_deref(), Some("spoofing"));
    assert_eq!(logs[0].blocked, Some(true));
    assert_eq!(logs[1].severity.as_deref(), Some("Medium"));
    assert_eq!(logs[1].blocked, None);
}

#[tokio::test]
async fn test_list_logs_empty() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "logs": [] })))
        .mount(&server)
        .await;

    let logs = client.list_logs().await.unwrap();
    assert!(logs.is_empty());
}

#[tokio::test]
async fn test_clear_logs() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client.clear_logs().await.unwrap();
}

#[tokio::test]
async fn test_sensor_catalog() {
    let (server, client) = setup().await;

    let body = json!({
        "sensor_types": ["soil", "atmosphere", "water", "plant", "threat"],
        "sensor_ids": ["soil-0001", "water-0002"]
    });

    Mock::given(method("GET"))
        .and(path("/api/sensor-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let catalog = client.sensor_catalog().await.unwrap();

    assert_eq!(catalog.sensor_types.len(), 5);
    assert_eq!(catalog.sensor_ids[0], "soil-0001");
}

#[tokio::test]
async fn test_attack_types() {
    let (server, client) = setup().await;

    let body = json!({
        "attack_types": [
            { "type": "spoofing", "label": "Sensor Spoofing", "description": "Forged sensor identity" },
            { "type": "ddos", "label": "DDoS Flood", "description": "Request flood against a sensor" }
        ]
    });

    Mock::given(method("GET"))
        .and(path("/api/attack-types"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let kinds = client.attack_types().await.unwrap();

    assert_eq!(kinds.len(), 2);
    assert_eq!(kinds[0].kind, "spoofing");
    assert_eq!(kinds[1].label.as_deref(), Some("DDoS Flood"));
}

#[tokio::test]
async fn test_averages() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/averages"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "soil_moisture": 41.5,
            "air_temperature": 22.1
        })))
        .mount(&server)
        .await;

    let averages = client.averages().await.unwrap();

    assert_eq!(averages.len(), 2);
    assert!((averages["soil_moisture"] - 41.5).abs() < f64::EPSILON);
}

#[tokio::test]
async fn test_simulate_spoofing_hits_validate_endpoint() {
    let (server, client) = setup().await;

    let payload = json!({
        "sensor_id": "soil-0001",
        "payload": { "moisture": 44.0 },
        "ecc_signature": "wronghash"
    });

    let response = json!({
        "timestamp": "2026-03-01T10:00:00Z",
        "sensor_id": "soil-0001",
        "attack_type": "spoofing",
        "severity": "High",
        "message": "Signature validation failed",
        "blocked": true
    });

    Mock::given(method("POST"))
        .and(path("/api/validate"))
        .and(body_json(&payload))
        .respond_with(ResponseTemplate::new(200).set_body_json(&response))
        .mount(&server)
        .await;

    let alert = client
        .simulate(SimulationTarget::Spoofing, &payload)
        .await
        .unwrap();

    assert_eq!(alert.attack_type.as_deref(), Some("spoofing"));
    assert_eq!(alert.blocked, Some(true));
}

#[tokio::test]
async fn test_simulate_ddos_hits_threat_endpoint() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/sensor/threat/ddos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "attack_type": "ddos",
            "severity": "High",
            "message": "Threshold exceeded"
        })))
        .mount(&server)
        .await;

    let alert = client
        .simulate(SimulationTarget::Ddos, &json!({ "threshold": 10 }))
        .await
        .unwrap();

    assert_eq!(alert.attack_type.as_deref(), Some("ddos"));
}

#[tokio::test]
async fn test_explain() {
    let (server, client) = setup().await;

    let body = json!({
        "base_value": 0.12,
        "prediction": 0.91,
        "feature_contributions": [
            { "feature": "packet_rate", "value": 412.0, "contribution": 0.55 },
            { "feature": "nonce_age", "value": 3.0, "contribution": 0.24 }
        ]
    });

    Mock::given(method("POST"))
        .and(path("/api/explain"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(&server)
        .await;

    let explanation = client
        .explain(&json!({ "packet_rate": 412.0, "nonce_age": 3.0 }))
        .await
        .unwrap();

    let prediction = explanation.prediction.unwrap();
    assert!((prediction - 0.91).abs() < f64::EPSILON);
    assert_eq!(explanation.feature_contributions.len(), 2);
    assert_eq!(explanation.feature_contributions[0].feature, "packet_rate");
}

#[tokio::test]
async fn test_login_and_users() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/login"))
        .and(body_json(json!({ "username": "admin", "password": "hunter2" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "tok-abc",
            "token_type": "bearer"
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "users": [
                { "username": "admin", "role": "admin" },
                { "username": "viewer", "role": "viewer" }
            ]
        })))
        .mount(&server)
        .await;

    let login = client.login("admin", "hunter2").await.unwrap();
    assert_eq!(login.access_token, "tok-abc");

    let users = client.list_users().await.unwrap();
    assert_eq!(users.len(), 2);
    assert_eq!(users[1].role.as_deref(), Some("viewer"));
}

#[tokio::test]
async fn test_delete_user() {
    let (server, client) = setup().await;

    Mock::given(method("DELETE"))
        .and(path("/api/admin/users/viewer"))
        .respond_with(ResponseTemplate::new(200))
        .mount(&server)
        .await;

    client.delete_user("viewer").await.unwrap();
}

#[tokio::test]
async fn test_create_user() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/admin/users"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "username": "operator",
            "role": "operator"
        })))
        .mount(&server)
        .await;

    let created = client
        .create_user(&UserAccount {
            username: "operator".into(),
            role: Some("operator".into()),
        })
        .await
        .unwrap();

    assert_eq!(created.username, "operator");
    assert_eq!(created.role.as_deref(), Some("operator"));
}

// ── Error tests ─────────────────────────────────────────────────────

#[tokio::test]
async fn test_error_401_invalid_token() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let result = client.list_logs().await;

    assert!(
        matches!(result, Err(Error::InvalidToken)),
        "expected InvalidToken, got: {result:?}"
    );
}

#[tokio::test]
async fn test_error_404_not_found() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .and(path("/api/sensor-types"))
        .respond_with(
            ResponseTemplate::new(404).set_body_json(json!({ "message": "Not found" })),
        )
        .mount(&server)
        .await;

    let result = client.sensor_catalog().await;

    match result {
        Err(Error::Gateway {
            status,
            ref message,
            ..
        }) => {
            assert_eq!(status, 404);
            assert_eq!(message, "Not found");
        }
        other => panic!("expected Gateway error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_422_fastapi_detail_field() {
    let (server, client) = setup().await;

    Mock::given(method("POST"))
        .and(path("/api/validate"))
        .respond_with(ResponseTemplate::new(422).set_body_json(json!({
            "detail": "ecc_signature is required"
        })))
        .mount(&server)
        .await;

    let result = client
        .simulate(SimulationTarget::Spoofing, &json!({ "sensor_id": "soil-0001" }))
        .await;

    match result {
        Err(Error::Gateway {
            status,
            ref message,
            ..
        }) => {
            assert_eq!(status, 422);
            assert_eq!(message, "ecc_signature is required");
        }
        other => panic!("expected Gateway 422 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_error_500_server_error() {
    let (server, client) = setup().await;

    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let result = client.list_logs().await;

    match result {
        Err(Error::Gateway { status, ref code, .. }) => {
            assert_eq!(status, 500);
            assert!(code.is_none());
        }
        other => panic!("expected Gateway 500 error, got: {other:?}"),
    }
}

#[tokio::test]
async fn test_non_json_multibyte_body_is_deserialization_error() {
    let (server, client) = setup().await;

    // Long enough that the error preview is truncated, with the cut
    // landing inside a two-byte character.
    let body = format!("{}{}", "a".repeat(199), "é".repeat(20));
    Mock::given(method("GET"))
        .and(path("/api/logs"))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(&server)
        .await;

    let result = client.list_logs().await;

    assert!(
        matches!(result, Err(Error::Deserialization { .. })),
        "expected Deserialization error, got: {result:?}"
    );
}
