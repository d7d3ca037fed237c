//! Owner-scoped waiter resource core.
//! Authorization and pagination rules live here; HTTP routing and
//! authentication stay with the hosting application.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig, DatabaseTarget};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::caller::{CallerIdentity, UserId};
pub use model::waiter::{
    Message, Waiter, WaiterCreate, WaiterId, WaiterUpdate, WaiterValidationError, WaitersPage,
};
pub use policy::ownership::{can_access, visibility_scope, VisibilityScope};
pub use repo::waiter_repo::{
    RepoError, RepoResult, SqliteWaiterRepository, UnitOfWork, WaiterRepository,
};
pub use service::waiter_service::{
    ServiceResult, WaiterListQuery, WaiterService, WaiterServiceError, DEFAULT_LIST_LIMIT,
};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
