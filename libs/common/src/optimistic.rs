//! Optimistic-update rollback helper
//!
//! Mutating operations apply their change to local store state first, then
//! confirm it against the remote backend. Every such operation shares this
//! one implementation of the failure path: take a snapshot before mutating,
//! and restore it when the remote call fails.

use std::future::Future;

use tracing::warn;

use crate::error::StoreResult;

/// Run a remote confirmation for an already-applied local mutation
///
/// The caller captures `snapshot` from the store, applies the optimistic
/// mutation, then hands the in-flight remote call here. On `Err` the
/// snapshot is given back to `restore` and the error is passed through;
/// on `Ok` the optimistic state is already the committed state.
pub async fn with_rollback<Snap, T, Remote, Restore, RestoreFut>(
    snapshot: Snap,
    remote: Remote,
    restore: Restore,
) -> StoreResult<T>
where
    Remote: Future<Output = StoreResult<T>>,
    Restore: FnOnce(Snap) -> RestoreFut,
    RestoreFut: Future<Output = ()>,
{
    match remote.await {
        Ok(value) => Ok(value),
        Err(err) => {
            warn!("Remote call failed, rolling back optimistic state: {}", err);
            restore(snapshot).await;
            Err(err)
        }
    }
}
