// tests/call_tests.rs

use std::{path::PathBuf, sync::Arc, time::Duration};

use aptimaster::{
    config::{Config, DEFAULT_MEET_LINK},
    routes,
    state::AppState,
    store::{PlatformStore, persistence::MemoryStorage},
};
use serde_json::{Value, json};

async fn spawn_app() -> String {
    let config = Config {
        jwt_secret: "call_test_secret".to_string(),
        ephemeral_secret: false,
        jwt_expiration: 600,
        admin_passcode: "admin123".to_string(),
        data_dir: PathBuf::from("unused"),
        default_meet_link: DEFAULT_MEET_LINK.to_string(),
        bind_addr: "127.0.0.1:0".to_string(),
        cors_origins: Vec::new(),
        rust_log: "error".to_string(),
    };

    let store = PlatformStore::load(Arc::new(MemoryStorage::new()), DEFAULT_MEET_LINK).unwrap();
    let app = routes::create_router(AppState::new(store, config));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    address
}

async fn token(client: &reqwest::Client, address: &str, body: Value) -> String {
    let resp: Value = client
        .post(format!("{}/api/auth/login", address))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    resp["token"].as_str().unwrap().to_string()
}

async fn student(client: &reqwest::Client, address: &str, id: &str) -> String {
    token(
        client,
        address,
        json!({"mode": "student", "name": format!("Student {id}"), "studentId": id}),
    )
    .await
}

async fn admin(client: &reqwest::Client, address: &str) -> String {
    token(client, address, json!({"mode": "admin", "passcode": "admin123"})).await
}

async fn start_call(client: &reqwest::Client, address: &str, token: &str) -> String {
    let resp = client
        .post(format!("{}/api/calls", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status().as_u16(), 201);
    let body: Value = resp.json().await.unwrap();
    body["callId"].as_str().unwrap().to_string()
}

async fn list_calls(client: &reqwest::Client, address: &str, token: &str) -> Vec<Value> {
    client
        .get(format!("{}/api/calls", address))
        .bearer_auth(token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap()
}

#[tokio::test]
async fn student_call_is_deduplicated_and_joinable() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let stu = student(&client, &address, "STU-001").await;
    let adm = admin(&client, &address).await;

    let first = start_call(&client, &address, &stu).await;
    let second = start_call(&client, &address, &stu).await;
    assert_eq!(first, second);

    let calls = list_calls(&client, &address, &adm).await;
    assert_eq!(calls.len(), 1);
    assert_eq!(calls[0]["status"], "waiting");
    assert_eq!(calls[0]["initiator"], "student");

    // Admin picks up
    let joined: Value = client
        .post(format!("{}/api/calls/{}/join", address, first))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(joined["status"], "active");
    assert_eq!(joined["studentId"], "STU-001");
    assert_eq!(joined["initiator"], "student");

    let session: Value = client
        .get(format!("{}/api/calls/{}/session", address, first))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(session["statusLabel"], "Line Secure");
    assert_eq!(session["meetLink"], DEFAULT_MEET_LINK);
    assert_eq!(session["mirrored"], true);
    assert_eq!(session["constraints"]["video"]["idealWidth"], 1280);
}

#[tokio::test]
async fn ended_call_is_gone_and_repeat_operations_are_harmless() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let stu = student(&client, &address, "STU-001").await;

    let id = start_call(&client, &address, &stu).await;

    for _ in 0..2 {
        let ended = client
            .delete(format!("{}/api/calls/{}", address, id))
            .bearer_auth(&stu)
            .send()
            .await
            .unwrap();
        assert_eq!(ended.status().as_u16(), 204);
    }

    let join = client
        .post(format!("{}/api/calls/{}/join", address, id))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap();
    assert_eq!(join.status().as_u16(), 404);
    assert!(list_calls(&client, &address, &stu).await.is_empty());
}

#[tokio::test]
async fn admin_call_reaches_student_and_first_initiator_wins() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let stu = student(&client, &address, "STU-001").await;
    let adm = admin(&client, &address).await;

    // Unknown students cannot be called
    let unknown = client
        .post(format!("{}/api/admin/students/STU-404/call", address))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status().as_u16(), 404);

    // Student shows up in the log
    client
        .post(format!("{}/api/questions/1/answer", address))
        .bearer_auth(&stu)
        .json(&json!({"answer": 1}))
        .send()
        .await
        .unwrap();

    let created: Value = client
        .post(format!("{}/api/admin/students/stu-001/call", address))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_call = created["callId"].as_str().unwrap().to_string();

    let incoming: Value = client
        .get(format!("{}/api/calls/incoming", address))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(incoming["id"], admin_call.as_str());
    assert_eq!(incoming["initiator"], "admin");
    assert_eq!(incoming["studentName"], "Student STU-001");

    // Student's own request returns the admin's call
    let from_student = start_call(&client, &address, &stu).await;
    assert_eq!(from_student, admin_call);
    assert_eq!(list_calls(&client, &address, &adm).await.len(), 1);

    // Report marks the student busy
    let reports: Vec<Value> = client
        .get(format!("{}/api/admin/reports", address))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(reports[0]["studentId"], "STU-001");
    assert_eq!(reports[0]["busy"], true);
    assert_eq!(reports[0]["accuracy"], 100);

    // Accepting clears the incoming prompt
    client
        .post(format!("{}/api/calls/{}/join", address, admin_call))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap();
    let incoming: Value = client
        .get(format!("{}/api/calls/incoming", address))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert!(incoming.is_null());
}

#[tokio::test]
async fn initiator_cannot_pick_up_own_call() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let stu = student(&client, &address, "STU-001").await;
    let other = student(&client, &address, "STU-002").await;
    let adm = admin(&client, &address).await;

    // A student cannot accept their own request
    let own = start_call(&client, &address, &other).await;
    let self_join = client
        .post(format!("{}/api/calls/{}/join", address, own))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(self_join.status().as_u16(), 403);
    assert_eq!(list_calls(&client, &address, &other).await[0]["status"], "waiting");

    // Nor can the administrator accept a call they placed
    client
        .post(format!("{}/api/questions/1/answer", address))
        .bearer_auth(&stu)
        .json(&json!({"answer": 1}))
        .send()
        .await
        .unwrap();
    let created: Value = client
        .post(format!("{}/api/admin/students/STU-001/call", address))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let admin_call = created["callId"].as_str().unwrap().to_string();

    let admin_join = client
        .post(format!("{}/api/calls/{}/join", address, admin_call))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap();
    assert_eq!(admin_join.status().as_u16(), 403);

    let incoming: Value = client
        .get(format!("{}/api/calls/incoming", address))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(incoming["id"], admin_call.as_str());
    assert_eq!(incoming["status"], "waiting");
}

#[tokio::test]
async fn students_cannot_touch_other_calls() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let owner = student(&client, &address, "STU-001").await;
    let other = student(&client, &address, "STU-002").await;

    let id = start_call(&client, &address, &owner).await;

    let end = client
        .delete(format!("{}/api/calls/{}", address, id))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(end.status().as_u16(), 403);

    let session = client
        .get(format!("{}/api/calls/{}/session", address, id))
        .bearer_auth(&other)
        .send()
        .await
        .unwrap();
    assert_eq!(session.status().as_u16(), 403);

    assert!(list_calls(&client, &address, &other).await.is_empty());
    assert_eq!(list_calls(&client, &address, &owner).await.len(), 1);
}

#[tokio::test]
async fn event_stream_announces_incoming_call() {
    let address = spawn_app().await;
    let client = reqwest::Client::new();
    let stu = student(&client, &address, "STU-001").await;
    let adm = admin(&client, &address).await;

    client
        .post(format!("{}/api/questions/2/answer", address))
        .bearer_auth(&stu)
        .json(&json!({"answer": 2}))
        .send()
        .await
        .unwrap();

    let mut events = client
        .get(format!("{}/api/calls/events", address))
        .bearer_auth(&stu)
        .send()
        .await
        .unwrap();
    assert_eq!(events.status().as_u16(), 200);

    // Wait for the subscription to be live before triggering the call.
    let mut received = String::new();
    while !received.contains("connected") {
        let chunk = events.chunk().await.unwrap().unwrap();
        received.push_str(&String::from_utf8_lossy(&chunk));
    }

    client
        .post(format!("{}/api/admin/students/STU-001/call", address))
        .bearer_auth(&adm)
        .send()
        .await
        .unwrap();

    let found = tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            let chunk = events.chunk().await.unwrap().unwrap();
            received.push_str(&String::from_utf8_lossy(&chunk));
            if received.contains("initiated") {
                break;
            }
        }
    })
    .await;

    assert!(found.is_ok(), "no call event received: {received}");
    assert!(received.contains("\"initiator\":\"admin\""));
}
