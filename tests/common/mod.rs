//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::Utc;
use tokio::net::TcpListener;

use hero_api::auth::types::{NewUser, User};
use hero_api::heroes::types::{Hero, HeroCreate, HeroUpdate, Pagination};
use hero_api::persistence::{Database, DbError, HeroRepository, PersistenceError, UserRepository};
use hero_api::{AppConfig, AppState, HttpServer, Shutdown};

/// Merge the present fields of a patch, as `COALESCE` does in SQL.
fn apply_update(hero: &mut Hero, changes: HeroUpdate) {
    if let Some(name) = changes.name {
        hero.name = name;
    }
    if let Some(secret_name) = changes.secret_name {
        hero.secret_name = secret_name;
    }
    if let Some(age) = changes.age {
        hero.age = Some(age);
    }
}

/// How the fake store answers persistence calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    Healthy,
    /// Every call fails with a connection error.
    DatabaseDown,
    /// Every call fails with a non-driver error.
    Broken,
    /// Every call panics.
    Panic,
    /// The next call fails with a connection error, then healthy.
    FlakyOnce,
}

struct Inner {
    mode: Mutex<Mode>,
    heroes: Mutex<Vec<Hero>>,
    users: Mutex<Vec<User>>,
    calls: AtomicUsize,
}

/// In-memory store with failure injection.
#[derive(Clone)]
pub struct FakeStore {
    inner: Arc<Inner>,
}

impl FakeStore {
    pub fn new(mode: Mode) -> Self {
        Self {
            inner: Arc::new(Inner {
                mode: Mutex::new(mode),
                heroes: Mutex::new(Vec::new()),
                users: Mutex::new(Vec::new()),
                calls: AtomicUsize::new(0),
            }),
        }
    }

    pub fn set_mode(&self, mode: Mode) {
        *self.inner.mode.lock().unwrap() = mode;
    }

    /// Number of persistence calls observed.
    pub fn calls(&self) -> usize {
        self.inner.calls.load(Ordering::SeqCst)
    }

    fn gate(&self) -> Result<(), PersistenceError> {
        self.inner.calls.fetch_add(1, Ordering::SeqCst);
        let mut mode = self.inner.mode.lock().unwrap();
        let current = *mode;
        match current {
            Mode::Healthy => Ok(()),
            Mode::DatabaseDown => Err(DbError::Connection("connection refused".into()).into()),
            Mode::Broken => Err(PersistenceError::Other("unexpected row shape".into())),
            Mode::Panic => {
                drop(mode);
                panic!("null pointer dereference in store");
            }
            Mode::FlakyOnce => {
                *mode = Mode::Healthy;
                Err(DbError::Connection("connection reset by peer".into()).into())
            }
        }
    }
}

#[async_trait]
impl Database for FakeStore {
    async fn execute(&self, _query: &str) -> Result<u64, PersistenceError> {
        self.gate()?;
        Ok(1)
    }
}

#[async_trait]
impl HeroRepository for FakeStore {
    async fn list(&self, page: Pagination) -> Result<Vec<Hero>, PersistenceError> {
        self.gate()?;
        let heroes = self.inner.heroes.lock().unwrap();
        Ok(heroes
            .iter()
            .skip(page.offset as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn get(&self, id: i64) -> Result<Option<Hero>, PersistenceError> {
        self.gate()?;
        Ok(self.inner.heroes.lock().unwrap().iter().find(|h| h.id == id).cloned())
    }

    async fn create(&self, hero: HeroCreate) -> Result<Hero, PersistenceError> {
        self.gate()?;
        let mut heroes = self.inner.heroes.lock().unwrap();
        let hero = Hero {
            id: heroes.iter().map(|h| h.id).max().unwrap_or(0) + 1,
            name: hero.name,
            secret_name: hero.secret_name,
            age: hero.age,
        };
        heroes.push(hero.clone());
        Ok(hero)
    }

    async fn update(&self, id: i64, changes: HeroUpdate) -> Result<Option<Hero>, PersistenceError> {
        self.gate()?;
        let mut heroes = self.inner.heroes.lock().unwrap();
        Ok(heroes.iter_mut().find(|h| h.id == id).map(|hero| {
            apply_update(hero, changes);
            hero.clone()
        }))
    }

    async fn delete(&self, id: i64) -> Result<bool, PersistenceError> {
        self.gate()?;
        let mut heroes = self.inner.heroes.lock().unwrap();
        let before = heroes.len();
        heroes.retain(|h| h.id != id);
        Ok(heroes.len() != before)
    }
}

#[async_trait]
impl UserRepository for FakeStore {
    async fn create(&self, user: NewUser) -> Result<User, PersistenceError> {
        self.gate()?;
        let mut users = self.inner.users.lock().unwrap();
        let user = User {
            id: users.len() as i64 + 1,
            email: user.email,
            full_name: user.full_name,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError> {
        self.gate()?;
        Ok(self.inner.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PersistenceError> {
        self.gate()?;
        Ok(self.inner.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

/// Configuration suitable for tests: no migrations, fixed messages.
pub fn test_config() -> AppConfig {
    let mut config = AppConfig::default();
    config.listener.bind_address = "127.0.0.1:0".into();
    config.migrations.enabled = false;
    config.auth.jwt_secret = "test-secret".into();
    config.messages.database_unavailable = "database unavailable, try again later".into();
    config.messages.internal_error = "something went wrong".into();
    config
}

/// A running server on an ephemeral port.
pub struct TestApp {
    pub addr: SocketAddr,
    pub store: FakeStore,
    pub client: reqwest::Client,
    shutdown: Shutdown,
}

impl TestApp {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }
}

impl Drop for TestApp {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// Start the full application over `store`.
pub async fn spawn_app(store: FakeStore) -> TestApp {
    spawn_app_with(store, test_config()).await
}

pub async fn spawn_app_with(store: FakeStore, config: AppConfig) -> TestApp {
    let listener = TcpListener::bind(&config.listener.bind_address).await.unwrap();
    let addr = listener.local_addr().unwrap();

    let state = AppState::new(store.clone(), &config);
    let server = HttpServer::new(config, state);

    let shutdown = Shutdown::new();
    let receiver = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, receiver).await;
    });

    let client = reqwest::Client::builder()
        .pool_max_idle_per_host(0)
        .no_proxy()
        .build()
        .unwrap();

    TestApp {
        addr,
        store,
        client,
        shutdown,
    }
}
