use std::sync::Arc;

use auth::Authenticator;
use finance_api::domain::user::models::UserId;
use finance_api::domain::user::models::UserStatus;
use finance_api::domain::user::ports::AuthServicePort;
use finance_api::domain::user::service::AuthService;
use finance_api::inbound::http::router::create_router;
use finance_api::outbound::repositories::InMemoryUserDirectory;
use serde_json::json;
use serde_json::Value;

pub const TEST_SECRET: &[u8] = b"test-secret-key-for-jwt-signing-at-least-32-bytes";

/// Test application that spawns a real server backed by the in-memory directory
pub struct TestApp {
    pub address: String,
    pub port: u16,
    pub api_client: reqwest::Client,
    pub authenticator: Arc<Authenticator>,
    pub auth_service: Arc<AuthService<InMemoryUserDirectory>>,
}

impl TestApp {
    /// Spawn the application in a background task and return TestApp
    pub async fn spawn() -> Self {
        Self::spawn_with_email_verification(false).await
    }

    pub async fn spawn_with_email_verification(require_email_verification: bool) -> Self {
        // Use random port (0 = OS assigns)
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind random port");
        let port = listener.local_addr().unwrap().port();
        let address = format!("http://127.0.0.1:{}", port);

        let user_directory = Arc::new(InMemoryUserDirectory::new());
        let authenticator =
            Arc::new(Authenticator::new(TEST_SECRET).expect("Failed to create authenticator"));

        let auth_service = Arc::new(
            AuthService::new(Arc::clone(&user_directory), Arc::clone(&authenticator))
                .with_email_verification(require_email_verification),
        );

        let router = create_router(
            Arc::clone(&auth_service) as Arc<dyn AuthServicePort>,
            user_directory,
            Arc::clone(&authenticator),
            &["http://localhost:3000".to_string()],
        );

        // Spawn server in background
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("Server error");
        });

        Self {
            address,
            port,
            api_client: reqwest::Client::new(),
            authenticator,
            auth_service,
        }
    }

    /// Helper to make GET request
    pub fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.get(&format!("{}{}", self.address, path))
    }

    /// Helper to make POST request
    pub fn post(&self, path: &str) -> reqwest::RequestBuilder {
        self.api_client.post(&format!("{}{}", self.address, path))
    }

    /// Helper to make GET request with Bearer token
    pub fn get_authenticated(&self, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.get(path).bearer_auth(token)
    }

    /// Register a user with the given credentials
    pub async fn register(&self, username: &str, email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/register")
            .json(&json!({
                "username": username,
                "email": email,
                "password": password,
                "firstName": "Alice",
                "lastName": "Liddell"
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Register the canonical test user and return the response body
    pub async fn register_alice(&self) -> Value {
        let response = self.register("alice", "alice@x.com", "Passw0rd!").await;
        assert_eq!(response.status(), reqwest::StatusCode::CREATED);
        response.json().await.expect("Failed to parse response")
    }

    pub async fn login(&self, username_or_email: &str, password: &str) -> reqwest::Response {
        self.post("/auth/login")
            .json(&json!({
                "usernameOrEmail": username_or_email,
                "password": password
            }))
            .send()
            .await
            .expect("Failed to execute request")
    }

    /// Administrative status change, bypassing HTTP
    pub async fn set_status(&self, user_id: &str, status: UserStatus) {
        let id = UserId::from_string(user_id).expect("Invalid user id");
        self.auth_service
            .change_status(&id, status, "test-admin")
            .await
            .expect("Failed to change status");
    }
}
