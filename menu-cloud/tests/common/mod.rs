//! In-process harness: the full router over an in-memory database

#![allow(dead_code)]

use std::sync::Arc;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use menu_cloud::AppState;
use menu_cloud::db::DbService;
use menu_cloud::services::{
    CheckoutSession, LocalAuthProvider, LocalStorage, LogEmailSender, PaymentProvider,
    SvgQrGenerator,
};
use serde_json::{Value, json};
use shared::models::TenantPlan;
use tower::ServiceExt;

type BoxError = Box<dyn std::error::Error + Send + Sync>;

pub const BASE_DOMAIN: &str = "menu.test";

/// Sessions whose id starts with `paid_` are paid
pub struct FakeCheckout;

#[async_trait]
impl PaymentProvider for FakeCheckout {
    async fn create_checkout_session(
        &self,
        _email: &str,
        _plan: TenantPlan,
        subdomain: &str,
    ) -> Result<String, BoxError> {
        Ok(format!("https://checkout.test/{subdomain}"))
    }

    async fn retrieve_session(&self, session_id: &str) -> Result<CheckoutSession, BoxError> {
        Ok(CheckoutSession {
            id: session_id.to_string(),
            paid: session_id.starts_with("paid_"),
            customer_email: None,
            plan: Some(TenantPlan::Pro),
            subdomain: None,
        })
    }
}

pub struct TestApp {
    pub state: AppState,
    router: Router,
    _uploads: tempfile::TempDir,
}

/// A provisioned restaurant and its owner session
pub struct Owner {
    pub token: String,
    pub tenant_id: String,
    pub subdomain: String,
}

impl TestApp {
    pub async fn new() -> Self {
        let pool = DbService::in_memory().await.unwrap().pool;
        let uploads = tempfile::tempdir().unwrap();
        let state = AppState {
            auth: Arc::new(LocalAuthProvider::new(pool.clone())),
            pool,
            jwt_secret: "test-jwt-secret".to_string(),
            base_domain: BASE_DOMAIN.to_string(),
            local_upload_dir: None,
            storage: Arc::new(LocalStorage::new(
                uploads.path(),
                "http://localhost:8080/uploads",
            )),
            qr: Arc::new(SvgQrGenerator::default()),
            email: Arc::new(LogEmailSender),
            payments: Arc::new(FakeCheckout),
        };
        Self {
            router: menu_cloud::api::router(state.clone()),
            state,
            _uploads: uploads,
        }
    }

    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };
        self.send(request).await
    }

    pub async fn send(&self, request: Request<Body>) -> (StatusCode, Value) {
        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn put(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PUT, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// Paid signup through the public API
    pub async fn signup(&self, email: &str, subdomain: &str) -> Owner {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/provision",
                None,
                Some(json!({
                    "session_id": format!("paid_{subdomain}"),
                    "email": email,
                    "password": "supersecret",
                    "restaurant_name": format!("Restaurante {subdomain}"),
                    "subdomain": subdomain,
                })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "provision failed: {body}");
        Owner {
            token: body["token"].as_str().unwrap().to_string(),
            tenant_id: body["tenant"]["id"].as_str().unwrap().to_string(),
            subdomain: body["tenant"]["subdomain"].as_str().unwrap().to_string(),
        }
    }

    pub async fn create_category(&self, owner: &Owner, name: &str) -> i64 {
        let (status, body) = self
            .post("/api/categories", &owner.token, json!({ "name": name }))
            .await;
        assert_eq!(status, StatusCode::OK, "category create failed: {body}");
        body["id"].as_i64().unwrap()
    }

    pub async fn create_item(&self, owner: &Owner, payload: Value) -> Value {
        let (status, body) = self.post("/api/menu-items", &owner.token, payload).await;
        assert_eq!(status, StatusCode::OK, "item create failed: {body}");
        body
    }
}

/// Option id by label inside a modifier group body
pub fn option_id(group: &Value, label: &str) -> i64 {
    group["options"]
        .as_array()
        .unwrap()
        .iter()
        .find(|o| o["label"] == label)
        .and_then(|o| o["id"].as_i64())
        .unwrap()
}

pub fn money(value: &Value) -> f64 {
    value.as_f64().unwrap()
}
