#![allow(dead_code)]

use chirpy::clock::ManualClock;
use chirpy::configuration::{
    ApplicationSettings, AuthSettings, DatabaseSettings, Platform, Settings, StorageBackend,
};
use chirpy::startup::run;
use chirpy::store::{InMemoryStore, Stores};
use serde_json::{json, Value};
use std::net::TcpListener;
use std::sync::Arc;

pub const POLKA_KEY: &str = "f271c81ff7084ee5b99a5091b42d486e";
pub const PASSWORD: &str = "04234";

pub struct TestApp {
    pub address: String,
    pub store: Arc<InMemoryStore>,
    pub clock: Arc<ManualClock>,
    pub client: reqwest::Client,
}

pub struct TestUser {
    pub id: String,
    pub email: String,
    pub token: String,
    pub refresh_token: String,
}

pub fn test_settings(platform: Platform) -> Settings {
    Settings {
        application: ApplicationSettings {
            host: "127.0.0.1".to_string(),
            port: 0,
            platform,
            storage: StorageBackend::Memory,
            static_dir: "./public".to_string(),
        },
        database: DatabaseSettings {
            username: "postgres".to_string(),
            password: "password".to_string(),
            port: 5432,
            host: "localhost".to_string(),
            database_name: "chirpy".to_string(),
            max_connections: 1,
        },
        auth: AuthSettings {
            jwt_secret: "integration-test-secret".to_string(),
            issuer: "chirpy-access".to_string(),
            access_token_ttl_seconds: 3600,
            refresh_token_ttl_days: 60,
            polka_key: POLKA_KEY.to_string(),
        },
    }
}

pub async fn spawn_app() -> TestApp {
    spawn_app_on(Platform::Dev).await
}

pub async fn spawn_app_on(platform: Platform) -> TestApp {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind random port");
    let port = listener.local_addr().unwrap().port();
    let address = format!("http://127.0.0.1:{}", port);

    let store = Arc::new(InMemoryStore::new());
    let clock = Arc::new(ManualClock::default());
    let server = run(
        listener,
        Stores::in_memory(store.clone()),
        test_settings(platform),
        clock.clone(),
    )
    .expect("Failed to bind address");
    let _ = tokio::spawn(server);

    TestApp {
        address,
        store,
        clock,
        client: reqwest::Client::new(),
    }
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.address, path)
    }

    pub async fn create_user(&self, email: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/users"))
            .json(&json!({ "email": email, "password": PASSWORD }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    pub async fn login(&self, email: &str, password: &str) -> reqwest::Response {
        self.client
            .post(self.url("/api/login"))
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await
            .expect("Failed to execute request.")
    }

    /// Registers and logs in a user
    pub async fn signed_in_user(&self, email: &str) -> TestUser {
        assert_eq!(201, self.create_user(email).await.status().as_u16());

        let response = self.login(email, PASSWORD).await;
        assert_eq!(200, response.status().as_u16());
        let body: Value = response.json().await.expect("Failed to parse response");

        TestUser {
            id: body["id"].as_str().unwrap().to_string(),
            email: body["email"].as_str().unwrap().to_string(),
            token: body["token"].as_str().unwrap().to_string(),
            refresh_token: body["refresh_token"].as_str().unwrap().to_string(),
        }
    }

    pub async fn post_with_bearer(&self, path: &str, token: &str) -> reqwest::Response {
        self.client
            .post(self.url(path))
            .header("Authorization", format!("Bearer {}", token))
            .send()
            .await
            .expect("Failed to execute request.")
    }
}
