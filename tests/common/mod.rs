//! Shared helpers for the integration tests

use std::net::TcpListener;
use std::sync::Arc;

use acl_service::auth::TokenService;
use acl_service::configuration::{CookieSettings, JwtSettings};
use acl_service::models::{NewUser, Role, User};
use acl_service::repository::{InMemoryUserRepository, UserRepository};
use acl_service::startup::run;

pub struct TestApp {
    pub address: String,
    pub repository: Arc<InMemoryUserRepository>,
    pub tokens: TokenService,
    pub client: reqwest::Client,
}

#[allow(dead_code)]
impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    /// Store a user directly and mint a token for it. The stored hash is a
    /// placeholder, so these users cannot sign in.
    pub async fn seed_user(&self, email: &str, role: Role) -> (User, String) {
        let user = self
            .repository
            .insert(NewUser {
                name: "Seeded User".to_string(),
                email: email.to_string(),
                password_hash: "$2b$10$placeholderplaceholderplaceholderplaceholderpl".to_string(),
                role,
            })
            .await
            .expect("Failed to seed user");
        let token = self.tokens.issue(&user.identity()).expect("Failed to issue token");
        (user, token)
    }

    pub async fn user_count(&self) -> usize {
        self.repository.list_all().await.expect("Failed to list users").len()
    }
}

pub fn spawn_app() -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let repository = Arc::new(InMemoryUserRepository::new());
    let tokens = TokenService::new(&JwtSettings {
        secret: "integration-test-secret-integration-test".to_string(),
        token_expiry: 3600,
        issuer: "acl-service-test".to_string(),
    });

    let server = run(
        listener,
        repository.clone(),
        tokens.clone(),
        CookieSettings { secure: false },
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        repository,
        tokens,
        client: reqwest::Client::new(),
    }
}
