//! Single-flight coordination for concurrent recovery operations
//!
//! When many logically-concurrent callers need the same asynchronous
//! recovery operation (silent sign-in, or token refresh after a 401), only
//! one underlying operation may execute; every caller that arrives while it
//! is outstanding joins it and observes its single outcome.
//!
//! The implementation is a keyed map from operation kind to a shared
//! future. The entry is removed *inside* the shared future, after the
//! operation settles but before its result is yielded to any waiter, so a
//! subsequent (not concurrent) caller always starts a fresh attempt instead
//! of replaying a finished one.

use std::collections::HashMap;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

use futures::FutureExt;
use futures::future::{BoxFuture, Shared};
use tokio::sync::Mutex;

use crate::error::Result;

type SharedOutcome<T> = Shared<BoxFuture<'static, Result<T>>>;

/// Collapses N concurrent requests for the same keyed operation into one
/// underlying execution.
///
/// State is instance-scoped: independent coordinators (one per logical
/// client, or one per test) never interfere with each other. Distinct keys
/// are fully independent as well, so a refresh failure is never conflated
/// with a silent-sign-in failure.
pub struct SingleFlight<K, T> {
    in_flight: Arc<Mutex<HashMap<K, SharedOutcome<T>>>>,
}

impl<K, T> SingleFlight<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty coordinator
    #[must_use]
    pub fn new() -> Self {
        Self {
            in_flight: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    /// Run `operation` under single-flight semantics for `key`.
    ///
    /// If no operation is currently in flight for `key`, `operation` is
    /// started and its shared future recorded. If one is already in flight,
    /// the existing future is joined instead and `operation` is dropped
    /// without running. All joined callers resolve with the identical
    /// success value or the identical error.
    ///
    /// # Errors
    ///
    /// Returns whatever error the single underlying operation settled with.
    pub async fn run<F>(&self, key: K, operation: F) -> Result<T>
    where
        F: Future<Output = Result<T>> + Send + 'static,
    {
        let shared = {
            let mut in_flight = self.in_flight.lock().await;
            if let Some(existing) = in_flight.get(&key) {
                tracing::debug!(?key, "joining in-flight operation");
                existing.clone()
            } else {
                tracing::debug!(?key, "starting new operation");
                let slot = Arc::clone(&self.in_flight);
                let cleanup_key = key.clone();
                let shared = async move {
                    let result = operation.await;
                    // Clear the slot before any waiter observes the settled
                    // value, so a subsequent caller starts a fresh attempt.
                    slot.lock().await.remove(&cleanup_key);
                    result
                }
                .boxed()
                .shared();
                in_flight.insert(key, shared.clone());
                shared
            }
        };

        shared.await
    }

    /// Number of operations currently in flight (diagnostics and tests)
    pub async fn in_flight(&self) -> usize {
        self.in_flight.lock().await.len()
    }
}

impl<K, T> Default for SingleFlight<K, T>
where
    K: Eq + Hash + Clone + fmt::Debug + Send + 'static,
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, T> Clone for SingleFlight<K, T> {
    fn clone(&self) -> Self {
        Self {
            in_flight: Arc::clone(&self.in_flight),
        }
    }
}

impl<K, T> fmt::Debug for SingleFlight<K, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SingleFlight").finish_non_exhaustive()
    }
}
