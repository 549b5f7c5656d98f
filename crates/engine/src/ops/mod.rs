use argon2::Params;
use chrono_tz::Tz;
use sea_orm::DatabaseConnection;

use crate::{ResultEngine, credentials};

mod expenses;
mod queries;
mod reports;
mod users;

pub use reports::{CategoryTotal, MonthlyStatistic, Summary};

/// Run a block inside a DB transaction, committing on success and rolling back on error.
macro_rules! with_tx {
    ($self:expr, |$tx:ident| $body:expr) => {{
        let $tx = $self.database.begin().await?;
        let result = $body;
        match result {
            Ok(value) => {
                $tx.commit().await?;
                Ok(value)
            }
            Err(err) => Err(err),
        }
    }};
}

pub(crate) use with_tx;

/// Handle to the expense and credential stores.
///
/// Holds only the connection pool and immutable settings, so a single
/// instance is shared by every request.
#[derive(Debug)]
pub struct Engine {
    database: DatabaseConnection,
    timezone: Tz,
    password_params: Params,
    /// Verified against on unknown emails so every failed login pays for
    /// one hash.
    dummy_hash: String,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    database: DatabaseConnection,
    timezone: Tz,
    password_memory_kib: u32,
    password_iterations: u32,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            database: DatabaseConnection::default(),
            timezone: chrono_tz::UTC,
            password_memory_kib: credentials::DEFAULT_MEMORY_KIB,
            password_iterations: credentials::DEFAULT_ITERATIONS,
        }
    }
}

impl EngineBuilder {
    /// Pass the required database
    pub fn database(mut self, db: DatabaseConnection) -> EngineBuilder {
        self.database = db;
        self
    }

    /// Time zone for calendar computations (default UTC).
    pub fn timezone(mut self, timezone: Tz) -> EngineBuilder {
        self.timezone = timezone;
        self
    }

    /// Argon2 passes for newly stored passwords.
    pub fn password_iterations(mut self, iterations: u32) -> EngineBuilder {
        self.password_iterations = iterations;
        self
    }

    /// Argon2 memory cost in KiB for newly stored passwords.
    pub fn password_memory_kib(mut self, memory_kib: u32) -> EngineBuilder {
        self.password_memory_kib = memory_kib;
        self
    }

    /// Construct `Engine`. Fails when the password cost is out of range.
    pub async fn build(self) -> ResultEngine<Engine> {
        let password_params =
            credentials::params(self.password_memory_kib, self.password_iterations)?;
        let dummy_hash = credentials::hash_password(
            uuid::Uuid::new_v4().to_string(),
            password_params.clone(),
        )
        .await?;

        Ok(Engine {
            database: self.database,
            timezone: self.timezone,
            password_params,
            dummy_hash,
        })
    }
}
