//! Current-user identity channel
//!
//! Authentication itself is delegated to the hosted provider; the client
//! core only needs "current user id or none" plus a way to observe changes.
//! The auth layer owns an [`IdentityHandle`] and publishes transitions;
//! services hold cloned [`IdentityWatcher`]s and react to them.

use tokio::sync::watch;
use tracing::info;
use uuid::Uuid;

/// Writer side of the identity channel, owned by the auth layer
#[derive(Debug, Clone)]
pub struct IdentityHandle {
    tx: watch::Sender<Option<Uuid>>,
}

/// Reader side of the identity channel, cloned into services
#[derive(Debug, Clone)]
pub struct IdentityWatcher {
    rx: watch::Receiver<Option<Uuid>>,
}

/// Create a connected handle/watcher pair with no user signed in
pub fn channel() -> (IdentityHandle, IdentityWatcher) {
    let (tx, rx) = watch::channel(None);
    (IdentityHandle { tx }, IdentityWatcher { rx })
}

impl IdentityHandle {
    /// Publish a sign-in for the given user
    pub fn sign_in(&self, user_id: Uuid) {
        info!("Identity changed: signed in as {}", user_id);
        self.tx.send_replace(Some(user_id));
    }

    /// Publish a sign-out
    pub fn sign_out(&self) {
        info!("Identity changed: signed out");
        self.tx.send_replace(None);
    }

    /// Create an additional watcher for this channel
    pub fn watcher(&self) -> IdentityWatcher {
        IdentityWatcher {
            rx: self.tx.subscribe(),
        }
    }
}

impl IdentityWatcher {
    /// The currently signed-in user, if any
    pub fn current_user(&self) -> Option<Uuid> {
        *self.rx.borrow()
    }

    /// Wait for the next identity transition and return the new value
    ///
    /// Returns `None` for sign-out as well as for a closed channel (the
    /// auth layer dropping its handle is treated as a sign-out).
    pub async fn changed(&mut self) -> Option<Uuid> {
        if self.rx.changed().await.is_err() {
            return None;
        }
        *self.rx.borrow_and_update()
    }

    /// Wait for the next identity transition
    ///
    /// Returns false once the auth layer has dropped its handle; watch
    /// loops use this as their termination condition.
    pub async fn wait(&mut self) -> bool {
        self.rx.changed().await.is_ok()
    }
}
