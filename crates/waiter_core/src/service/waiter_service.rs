//! Waiter use-case service.
//!
//! # Responsibility
//! - Expose list/get/create/update/delete over waiters for one caller.
//! - Enforce ownership authorization before any mutation.
//! - Translate repository failures into caller-facing outcomes.
//!
//! # Invariants
//! - Every operation runs inside exactly one repository unit of work, which
//!   is committed on success and rolled back on every other exit path.
//! - `Forbidden` is decided before any write, so denials leave no state.
//! - Created waiters are always owned by the calling identity.
//! - The service never logs business field contents.

use crate::model::caller::CallerIdentity;
use crate::model::waiter::{
    Message, Waiter, WaiterCreate, WaiterId, WaiterUpdate, WaiterValidationError, WaitersPage,
    WAITER_DELETED_MESSAGE,
};
use crate::policy::ownership::{can_access, visibility_scope};
use crate::repo::waiter_repo::{RepoError, WaiterRepository};
use log::{debug, error, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Page size used when the caller does not supply one.
pub const DEFAULT_LIST_LIMIT: u32 = 100;

pub type ServiceResult<T> = Result<T, WaiterServiceError>;

/// Pagination window for list calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WaiterListQuery {
    pub skip: u32,
    /// Not clamped; hosts that need a ceiling enforce it before calling.
    pub limit: u32,
}

impl Default for WaiterListQuery {
    fn default() -> Self {
        Self {
            skip: 0,
            limit: DEFAULT_LIST_LIMIT,
        }
    }
}

/// Logical outcome of a failed waiter operation.
#[derive(Debug)]
pub enum WaiterServiceError {
    /// No waiter exists with the given id.
    NotFound(WaiterId),
    /// The waiter exists but the caller neither owns it nor is a superuser.
    Forbidden(WaiterId),
    /// Payload failed business field validation.
    InvalidInput(WaiterValidationError),
    /// Opaque persistence failure, passed through unchanged.
    Store(RepoError),
}

impl WaiterServiceError {
    /// Stable machine-readable error code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "not_found",
            Self::Forbidden(_) => "forbidden",
            Self::InvalidInput(_) => "invalid_input",
            Self::Store(_) => "store_error",
        }
    }

    /// Conventional HTTP status for hosts that mount the service over HTTP.
    ///
    /// Denials map to 400 to stay compatible with existing API clients.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Forbidden(_) => 400,
            Self::InvalidInput(_) => 422,
            Self::Store(_) => 500,
        }
    }
}

impl Display for WaiterServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotFound(_) => write!(f, "Waiter not found"),
            Self::Forbidden(_) => write!(f, "Not enough permissions"),
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for WaiterServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for WaiterServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::Validation(err) => Self::InvalidInput(err),
            other => Self::Store(other),
        }
    }
}

impl From<WaiterValidationError> for WaiterServiceError {
    fn from(value: WaiterValidationError) -> Self {
        Self::InvalidInput(value)
    }
}

/// Owner-scoped access controller over a waiter repository.
pub struct WaiterService<R: WaiterRepository> {
    repo: R,
}

impl<R: WaiterRepository> WaiterService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists the waiters visible to `caller`.
    ///
    /// # Contract
    /// - Superusers see every waiter; other callers only their own.
    /// - `count` is the size of the whole visible set, not of the page.
    /// - Ordering is insertion order (`id ASC`).
    pub fn list(
        &self,
        caller: &CallerIdentity,
        query: WaiterListQuery,
    ) -> ServiceResult<WaitersPage> {
        let started_at = Instant::now();
        let result = self.list_inner(caller, query);
        log_outcome("waiter_list", caller, None, started_at, &result);
        result
    }

    /// Gets one waiter by id.
    ///
    /// Fails with `NotFound` for unknown ids and `Forbidden` when the caller
    /// may not access the record.
    pub fn get(&self, caller: &CallerIdentity, id: WaiterId) -> ServiceResult<Waiter> {
        let started_at = Instant::now();
        let result = self.get_inner(caller, id);
        log_outcome("waiter_get", caller, Some(id), started_at, &result);
        result
    }

    /// Creates a waiter owned by `caller` and returns it with its assigned id.
    pub fn create(&self, caller: &CallerIdentity, payload: &WaiterCreate) -> ServiceResult<Waiter> {
        let started_at = Instant::now();
        let result = self.create_inner(caller, payload);
        let created_id = result.as_ref().ok().map(|waiter| waiter.id);
        log_outcome("waiter_create", caller, created_id, started_at, &result);
        result
    }

    /// Applies the fields present in `patch` to one waiter.
    ///
    /// # Contract
    /// - Existence and authorization are checked before payload validation.
    /// - Fields absent from `patch` keep their stored values.
    /// - An empty patch returns the stored waiter without writing.
    pub fn update(
        &self,
        caller: &CallerIdentity,
        id: WaiterId,
        patch: &WaiterUpdate,
    ) -> ServiceResult<Waiter> {
        let started_at = Instant::now();
        let result = self.update_inner(caller, id, patch);
        log_outcome("waiter_update", caller, Some(id), started_at, &result);
        result
    }

    /// Permanently removes one waiter.
    pub fn delete(&self, caller: &CallerIdentity, id: WaiterId) -> ServiceResult<Message> {
        let started_at = Instant::now();
        let result = self.delete_inner(caller, id);
        log_outcome("waiter_delete", caller, Some(id), started_at, &result);
        result
    }

    fn list_inner(
        &self,
        caller: &CallerIdentity,
        query: WaiterListQuery,
    ) -> ServiceResult<WaitersPage> {
        let scope = visibility_scope(caller);
        let unit = self.repo.begin()?;
        let count = self.repo.count(scope)?;
        let data = self.repo.list(scope, query.skip, query.limit)?;
        unit.commit()?;
        Ok(WaitersPage { data, count })
    }

    fn get_inner(&self, caller: &CallerIdentity, id: WaiterId) -> ServiceResult<Waiter> {
        let unit = self.repo.begin()?;
        let waiter = self.load_authorized(caller, id)?;
        unit.commit()?;
        Ok(waiter)
    }

    fn create_inner(
        &self,
        caller: &CallerIdentity,
        payload: &WaiterCreate,
    ) -> ServiceResult<Waiter> {
        payload.validate()?;
        let unit = self.repo.begin()?;
        let waiter = self.repo.insert(caller.id, payload)?;
        unit.commit()?;
        Ok(waiter)
    }

    fn update_inner(
        &self,
        caller: &CallerIdentity,
        id: WaiterId,
        patch: &WaiterUpdate,
    ) -> ServiceResult<Waiter> {
        let unit = self.repo.begin()?;
        let waiter = self.load_authorized(caller, id)?;
        if patch.is_empty() {
            unit.commit()?;
            return Ok(waiter);
        }
        patch.validate()?;
        let updated = self.repo.apply_update(&waiter, patch)?;
        unit.commit()?;
        Ok(updated)
    }

    fn delete_inner(&self, caller: &CallerIdentity, id: WaiterId) -> ServiceResult<Message> {
        let unit = self.repo.begin()?;
        let waiter = self.load_authorized(caller, id)?;
        self.repo.delete(&waiter)?;
        unit.commit()?;
        Ok(Message::new(WAITER_DELETED_MESSAGE))
    }

    fn load_authorized(&self, caller: &CallerIdentity, id: WaiterId) -> ServiceResult<Waiter> {
        let waiter = self
            .repo
            .get(id)?
            .ok_or(WaiterServiceError::NotFound(id))?;
        if !can_access(caller, &waiter) {
            return Err(WaiterServiceError::Forbidden(id));
        }
        Ok(waiter)
    }
}

fn log_outcome<T>(
    event: &'static str,
    caller: &CallerIdentity,
    waiter_id: Option<WaiterId>,
    started_at: Instant,
    result: &ServiceResult<T>,
) {
    let waiter_id = waiter_id.map_or_else(|| "-".to_string(), |id| id.to_string());
    let duration_ms = started_at.elapsed().as_millis();
    match result {
        Ok(_) => debug!(
            "event={event} module=service status=ok caller_id={} superuser={} waiter_id={waiter_id} duration_ms={duration_ms}",
            caller.id, caller.is_superuser
        ),
        Err(WaiterServiceError::Store(err)) => error!(
            "event={event} module=service status=error caller_id={} waiter_id={waiter_id} duration_ms={duration_ms} error_code=store_error error={err}",
            caller.id
        ),
        Err(err) => warn!(
            "event={event} module=service status=rejected caller_id={} superuser={} waiter_id={waiter_id} duration_ms={duration_ms} error_code={}",
            caller.id,
            caller.is_superuser,
            err.code()
        ),
    }
}
