#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;

use serde_json::{json, Value};
use tokio::net::TcpListener;

use service_tracker::app_state::AppState;
use service_tracker::config::Config;
use service_tracker::db::memory::{InMemoryServiceRequestStore, InMemoryUserStore};
use service_tracker::server::build_router;

pub struct TestApp {
    pub addr: SocketAddr,
    pub store: Arc<InMemoryServiceRequestStore>,
    pub client: reqwest::Client,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    /// Signs up a fresh account and returns its bearer token.
    pub async fn token(&self) -> String {
        let resp = self
            .client
            .post(self.url("/auth/signup"))
            .json(&json!({ "email": "tech@millat.in", "password": "secret1" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 201);
        let body: Value = resp.json().await.unwrap();
        body["data"]["token"].as_str().unwrap().to_string()
    }
}

pub async fn spawn_app() -> TestApp {
    let mut config = Config::for_memory("integration-secret");
    config.bcrypt_cost = 4;

    let store = Arc::new(InMemoryServiceRequestStore::new());
    let state = AppState::new(config, store.clone(), Arc::new(InMemoryUserStore::new())).unwrap();
    let app = build_router(state);

    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let client = reqwest::Client::builder()
        .redirect(reqwest::redirect::Policy::none())
        .build()
        .unwrap();

    TestApp { addr, store, client }
}

pub fn amit() -> Value {
    json!({
        "customer_name": "Amit",
        "complaint": "AC noise",
        "mobile": "9999999999",
        "technician_name": "Raj",
        "service_date": "2024-05-01"
    })
}
