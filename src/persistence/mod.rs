//! Persistence subsystem.
//!
//! # Data Flow
//! ```text
//! handler
//!     → HeroRepository / UserRepository (domain queries)
//!     → postgres.rs (sqlx on a lazily connected PgPool)
//!     → sqlx::Error mapped into DbError (error.rs)
//!
//! health prober
//!     → Database::execute("SELECT 1")
//! ```
//!
//! # Design Decisions
//! - Handlers only see traits, so tests swap in in-memory stores
//! - The pool connects lazily: the process starts while Postgres is down
//! - Driver failures always surface as `DbError`, never as a generic error

pub mod error;
pub mod postgres;

use async_trait::async_trait;

use crate::auth::types::{NewUser, User};
use crate::heroes::types::{Hero, HeroCreate, HeroUpdate, Pagination};

pub use error::{DbError, PersistenceError};
pub use postgres::PgStore;

/// Raw statement execution, used for liveness probing.
#[async_trait]
pub trait Database: Send + Sync {
    /// Execute a statement and return the number of affected rows.
    async fn execute(&self, query: &str) -> Result<u64, PersistenceError>;
}

/// Storage for heroes.
#[async_trait]
pub trait HeroRepository: Send + Sync {
    async fn list(&self, page: Pagination) -> Result<Vec<Hero>, PersistenceError>;

    async fn get(&self, id: i64) -> Result<Option<Hero>, PersistenceError>;

    async fn create(&self, hero: HeroCreate) -> Result<Hero, PersistenceError>;

    /// Returns `None` when no hero has this id.
    async fn update(&self, id: i64, changes: HeroUpdate) -> Result<Option<Hero>, PersistenceError>;

    /// Returns whether a hero was removed.
    async fn delete(&self, id: i64) -> Result<bool, PersistenceError>;
}

/// Storage for accounts.
#[async_trait]
pub trait UserRepository: Send + Sync {
    async fn create(&self, user: NewUser) -> Result<User, PersistenceError>;

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, PersistenceError>;

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, PersistenceError>;
}
