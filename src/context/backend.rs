//! Model backend seam
//!
//! The backend is an oracle: it answers header requests and runs compiled
//! predict and select queries. Transport, retries and the statistics behind
//! the answers are the implementor's concern.

use std::future::Future;
use std::pin::Pin;

use super::errors::BackendResult;
use crate::pql::{BackendQuery, ResponseTable};
use crate::schema::ModelHeader;

/// Boxed future returned by backend calls
pub type BackendFuture<'a, T> = Pin<Box<dyn Future<Output = BackendResult<T>> + Send + 'a>>;

/// A model serving backend
pub trait ModelBackend: Send + Sync {
    /// Fields of `model`
    fn header<'a>(&'a self, model: &'a str) -> BackendFuture<'a, ModelHeader>;

    /// Runs one compiled query
    fn execute<'a>(&'a self, query: &'a BackendQuery) -> BackendFuture<'a, ResponseTable>;
}
