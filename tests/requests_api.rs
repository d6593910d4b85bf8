mod common;

use common::{amit, spawn_app};
use serde_json::{json, Value};
use service_tracker::db::store::ServiceRequestStore;

#[tokio::test]
async fn requests_require_a_token() {
    let app = spawn_app().await;
    let resp = app.client.get(app.url("/requests")).send().await.unwrap();
    assert_eq!(resp.status(), 401);

    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn create_list_complete_scenario() {
    let app = spawn_app().await;
    let token = app.token().await;

    let resp = app
        .client
        .post(app.url("/requests"))
        .bearer_auth(&token)
        .json(&amit())
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 201);

    let body: Value = app
        .client
        .get(app.url("/requests"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let rows = body["data"].as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["status"], "pending");
    assert_eq!(rows[0]["customer_name"], "Amit");
    let id = rows[0]["id"].as_str().unwrap().to_string();

    let resp = app
        .client
        .post(app.url(&format!("/requests/{id}/complete")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["data"]["applied"], true);

    let body: Value = app
        .client
        .get(app.url(&format!("/requests/{id}")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["status"], "completed");
    assert_eq!(body["data"]["mobile"], "9999999999");
    assert_eq!(body["data"]["service_date"], "2024-05-01");

    // no longer offered once the list shows it completed
    let body: Value = app
        .client
        .post(app.url(&format!("/requests/{id}/complete")))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(body["data"]["applied"], false);
}

#[tokio::test]
async fn missing_field_is_unprocessable() {
    let app = spawn_app().await;
    let token = app.token().await;

    let mut payload = amit();
    payload["mobile"] = json!("   ");
    let resp = app
        .client
        .post(app.url("/requests"))
        .bearer_auth(&token)
        .json(&payload)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 422);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["errors"]["field"], "mobile");
    assert!(app.store.list().await.unwrap().is_empty());
}

#[tokio::test]
async fn status_patch_accepts_any_status_by_default() {
    let app = spawn_app().await;
    let token = app.token().await;
    app.client
        .post(app.url("/requests"))
        .bearer_auth(&token)
        .json(&amit())
        .send()
        .await
        .unwrap();
    let body: Value = app
        .client
        .get(app.url("/requests"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    let id = body["data"][0]["id"].as_str().unwrap().to_string();

    for status in ["cancelled", "pending", "in_progress"] {
        let resp = app
            .client
            .patch(app.url(&format!("/requests/{id}/status")))
            .bearer_auth(&token)
            .json(&json!({ "status": status }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 200, "transition to {status}");
    }

    let resp = app
        .client
        .patch(app.url(&format!("/requests/{}/status", uuid::Uuid::new_v4())))
        .bearer_auth(&token)
        .json(&json!({ "status": "completed" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 404);
}

#[tokio::test]
async fn list_failure_reports_server_error() {
    let app = spawn_app().await;
    let token = app.token().await;
    app.store.set_unavailable(true);

    let resp = app
        .client
        .get(app.url("/requests"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 500);

    let resp = app.client.get(app.url("/health/ready")).send().await.unwrap();
    assert_eq!(resp.status(), 503);
}

#[tokio::test]
async fn export_returns_workbook_attachment() {
    let app = spawn_app().await;
    let token = app.token().await;
    app.client
        .post(app.url("/requests"))
        .bearer_auth(&token)
        .json(&amit())
        .send()
        .await
        .unwrap();

    let resp = app
        .client
        .get(app.url("/requests/export"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);
    assert_eq!(
        resp.headers()["content-type"],
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet"
    );
    assert!(resp.headers()["content-disposition"]
        .to_str()
        .unwrap()
        .contains("service-requests.xlsx"));
    let bytes = resp.bytes().await.unwrap();
    assert_eq!(&bytes[..2], b"PK");
}

#[tokio::test]
async fn signin_failures_use_friendly_messages() {
    let app = spawn_app().await;
    app.token().await;

    let resp = app
        .client
        .post(app.url("/auth/signin"))
        .json(&json!({ "email": "tech@millat.in", "password": "wrong-one" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "Invalid email or password");

    let resp = app
        .client
        .post(app.url("/auth/signup"))
        .json(&json!({ "email": "tech@millat.in", "password": "secret1" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 409);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["message"], "This email is already registered");
}

#[tokio::test]
async fn signout_revokes_the_token() {
    let app = spawn_app().await;
    let token = app.token().await;

    let resp = app
        .client
        .post(app.url("/auth/signout"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 200);

    let resp = app
        .client
        .get(app.url("/requests"))
        .bearer_auth(&token)
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 401);
}
