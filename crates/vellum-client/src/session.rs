//! Authenticated-user session cache.
//!
//! Loads the signed-in user's profile once per session and keeps the
//! notification-subscription list in memory, mutating it optimistically and
//! rolling back when the server rejects the change.

use std::sync::Mutex;

use tracing::error;

use vellum_api::{ApiClient, Result};
use vellum_shared::{Subscription, SubscriptionType, UserProfile};

/// Session-scoped cache of the signed-in user.
#[derive(Debug)]
pub struct AuthenticatedUser {
    api: ApiClient,
    info: Mutex<Option<UserProfile>>,
    subscriptions: Mutex<Option<Vec<Subscription>>>,
}

impl AuthenticatedUser {
    pub fn new(api: ApiClient) -> Self {
        Self {
            api,
            info: Mutex::new(None),
            subscriptions: Mutex::new(None),
        }
    }

    /// The cached profile.
    ///
    /// # Panics
    ///
    /// Panics if [`load_info`](Self::load_info) has not completed; a
    /// route-level guard is expected to have run it first.
    pub fn info(&self) -> UserProfile {
        self.info
            .lock()
            .unwrap()
            .clone()
            .expect("profile must be loaded before use")
    }

    /// Snapshot of the cached subscription list, `None` until the first
    /// [`fetch_subscriptions`](Self::fetch_subscriptions).
    pub fn subscriptions(&self) -> Option<Vec<Subscription>> {
        self.subscriptions.lock().unwrap().clone()
    }

    /// Fetch and cache the user's profile. On failure, logs and re-raises
    /// so the caller (typically a route guard) can handle it.
    pub async fn load_info(&self) -> Result<()> {
        match self.api.me().await {
            Ok(profile) => {
                *self.info.lock().unwrap() = Some(profile);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error getting user information");
                Err(e)
            }
        }
    }

    /// Fetch the subscription list, replacing the cache wholesale. A user
    /// with no subscriptions yields an empty list, not `None`.
    pub async fn fetch_subscriptions(&self) -> Result<()> {
        match self.api.subscriptions().await {
            Ok(areas) => {
                let subscriptions = areas
                    .unwrap_or_default()
                    .into_iter()
                    .map(Subscription::instant)
                    .collect();
                *self.subscriptions.lock().unwrap() = Some(subscriptions);
                Ok(())
            }
            Err(e) => {
                error!(error = %e, "Error loading subscriptions");
                Err(e)
            }
        }
    }

    /// Add a subscription and save the index. The local list is updated
    /// before the request; a failed save restores the previous list.
    ///
    /// # Panics
    ///
    /// Panics if the subscription list has not been fetched yet.
    pub async fn add_subscription(
        &self,
        product_area: String,
        subscription_type: SubscriptionType,
    ) -> Result<()> {
        let snapshot = {
            let mut guard = self.subscriptions.lock().unwrap();
            let list = guard
                .as_mut()
                .expect("add_subscription expects a fetched subscription list");
            let snapshot = list.clone();
            list.push(Subscription {
                product_area,
                subscription_type,
            });
            snapshot
        };

        self.save_index_or_restore(snapshot).await
    }

    /// Remove a subscription and save the index, with the same optimistic
    /// update and rollback as [`add_subscription`](Self::add_subscription).
    ///
    /// # Panics
    ///
    /// Panics if the list has not been fetched, or if `product_area` is not
    /// currently subscribed; callers must only offer removal for areas
    /// that exist.
    pub async fn remove_subscription(
        &self,
        product_area: &str,
        _subscription_type: SubscriptionType,
    ) -> Result<()> {
        let snapshot = {
            let mut guard = self.subscriptions.lock().unwrap();
            let list = guard
                .as_mut()
                .expect("remove_subscription expects a fetched subscription list");
            let position = list
                .iter()
                .position(|s| s.product_area == product_area)
                .expect("remove_subscription expects a subscribed product area");
            let snapshot = list.clone();
            list.remove(position);
            snapshot
        };

        self.save_index_or_restore(snapshot).await
    }

    /// POST the current list; restore `snapshot` if the server rejects it.
    async fn save_index_or_restore(&self, snapshot: Vec<Subscription>) -> Result<()> {
        let areas: Vec<String> = {
            let guard = self.subscriptions.lock().unwrap();
            guard
                .as_ref()
                .map(|list| list.iter().map(|s| s.product_area.clone()).collect())
                .unwrap_or_default()
        };

        match self.api.set_subscriptions(&areas).await {
            Ok(()) => Ok(()),
            Err(e) => {
                error!(error = %e, "Error updating subscriptions");
                *self.subscriptions.lock().unwrap() = Some(snapshot);
                Err(e)
            }
        }
    }
}
