//! Transient order store
//!
//! Bridges checkout creation and the payment webhook, which arrive as two
//! unrelated requests. Orders live in process memory only: a restart or a
//! second instance loses them, and the webhook handler logs such misses for
//! manual fulfilment instead of retrying.
//!
//! Each order is written once when the buyer proceeds to checkout and
//! removed once its print has been delivered. Anything older than the TTL
//! is evicted on the next write or by the background sweeper.

use chrono::{DateTime, Utc};
use etyma_common::{ColourPalette, NameAnalysis};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tracing::{debug, info};
use uuid::Uuid;

/// Everything needed to fulfil a print without calling the model again
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderDraft {
    pub name: String,
    pub analysis: NameAnalysis,
    pub palette: ColourPalette,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub art_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub imagery_style: Option<String>,
}

/// Order as held by the store
#[derive(Debug, Clone)]
pub struct StoredOrder {
    pub id: Uuid,
    pub draft: OrderDraft,
    pub created_at: DateTime<Utc>,
}

impl StoredOrder {
    fn is_expired(&self, now: DateTime<Utc>, ttl: Duration) -> bool {
        match now.signed_duration_since(self.created_at).to_std() {
            Ok(age) => age >= ttl,
            // Clock went backwards: keep the order
            Err(_) => false,
        }
    }
}

/// Process-local order map with time-bounded eviction
#[derive(Clone)]
pub struct OrderStore {
    orders: Arc<RwLock<HashMap<Uuid, StoredOrder>>>,
    ttl: Duration,
}

impl OrderStore {
    pub fn new(ttl: Duration) -> Self {
        Self {
            orders: Arc::new(RwLock::new(HashMap::new())),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Store a new order under a fresh random id
    ///
    /// Expired orders are purged first.
    pub async fn insert(&self, draft: OrderDraft) -> Uuid {
        let now = Utc::now();
        let mut orders = self.orders.write().await;
        let purged = purge_locked(&mut orders, now, self.ttl);
        if purged > 0 {
            debug!(purged, "Purged expired orders");
        }

        let id = Uuid::new_v4();
        debug!(order_id = %id, name = %draft.name, palette = %draft.palette, "Stored order");
        orders.insert(
            id,
            StoredOrder {
                id,
                draft,
                created_at: now,
            },
        );
        id
    }

    /// Look up an order; expired orders are treated as missing
    pub async fn get(&self, id: &Uuid) -> Option<StoredOrder> {
        let now = Utc::now();
        self.orders
            .read()
            .await
            .get(id)
            .filter(|order| !order.is_expired(now, self.ttl))
            .cloned()
    }

    pub async fn remove(&self, id: &Uuid) -> Option<StoredOrder> {
        self.orders.write().await.remove(id)
    }

    /// Remove and return a live order; only one caller can claim it
    pub async fn take(&self, id: &Uuid) -> Option<StoredOrder> {
        let now = Utc::now();
        let mut orders = self.orders.write().await;
        match orders.get(id) {
            Some(order) if !order.is_expired(now, self.ttl) => orders.remove(id),
            _ => None,
        }
    }

    /// Put a claimed order back, keeping its original creation time
    pub async fn restore(&self, order: StoredOrder) {
        self.orders.write().await.insert(order.id, order);
    }

    /// Drop every expired order, returning how many were removed
    pub async fn purge_expired(&self) -> usize {
        let mut orders = self.orders.write().await;
        purge_locked(&mut orders, Utc::now(), self.ttl)
    }

    /// Number of entries held, including expired ones not yet purged
    pub async fn len(&self) -> usize {
        self.orders.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Periodically purge expired orders in the background
    pub fn spawn_sweeper(&self, every: Duration) -> JoinHandle<()> {
        let store = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                ticker.tick().await;
                let purged = store.purge_expired().await;
                if purged > 0 {
                    info!(purged, "Order sweeper evicted expired orders");
                }
            }
        })
    }
}

fn purge_locked(
    orders: &mut HashMap<Uuid, StoredOrder>,
    now: DateTime<Utc>,
    ttl: Duration,
) -> usize {
    let before = orders.len();
    orders.retain(|_, order| !order.is_expired(now, ttl));
    before - orders.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(name: &str) -> OrderDraft {
        OrderDraft {
            name: name.to_string(),
            analysis: NameAnalysis {
                name: name.to_string(),
                ..Default::default()
            },
            palette: ColourPalette::Ocean,
            art_url: Some("https://example.com/art.jpg".to_string()),
            imagery_style: None,
        }
    }

    #[tokio::test]
    async fn test_insert_get_remove() {
        let store = OrderStore::new(Duration::from_secs(3600));
        let id = store.insert(draft("Felix")).await;

        let order = store.get(&id).await.expect("order stored");
        assert_eq!(order.id, id);
        assert_eq!(order.draft.name, "Felix");
        assert_eq!(order.draft.palette, ColourPalette::Ocean);

        assert!(store.remove(&id).await.is_some());
        assert!(store.get(&id).await.is_none());
        assert!(store.remove(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_take_claims_once_and_restore_returns() {
        let store = OrderStore::new(Duration::from_secs(3600));
        let id = store.insert(draft("Felix")).await;

        let claimed = store.take(&id).await.expect("order claimed");
        assert!(store.take(&id).await.is_none());
        assert!(store.get(&id).await.is_none());

        let created_at = claimed.created_at;
        store.restore(claimed).await;
        let order = store.get(&id).await.expect("order restored");
        assert_eq!(order.created_at, created_at);
    }

    #[tokio::test]
    async fn test_take_ignores_expired() {
        let store = OrderStore::new(Duration::ZERO);
        let id = store.insert(draft("Felix")).await;
        assert!(store.take(&id).await.is_none());
    }

    #[tokio::test]
    async fn test_ids_are_unique() {
        let store = OrderStore::new(Duration::from_secs(3600));
        let a = store.insert(draft("A")).await;
        let b = store.insert(draft("B")).await;
        assert_ne!(a, b);
        assert_eq!(store.len().await, 2);
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let store = OrderStore::new(Duration::from_secs(3600));
        assert!(store.get(&Uuid::new_v4()).await.is_none());
    }

    #[tokio::test]
    async fn test_expired_orders_are_invisible_and_purged() {
        let store = OrderStore::new(Duration::ZERO);
        let first = store.insert(draft("Iris")).await;
        assert!(store.get(&first).await.is_none());

        // Next write evicts the stale entry before storing its own
        let second = store.insert(draft("Willow")).await;
        assert_eq!(store.len().await, 1);
        assert!(store.remove(&first).await.is_none());

        assert_eq!(store.purge_expired().await, 1);
        assert!(store.is_empty().await);
        assert!(store.get(&second).await.is_none());
    }

    #[tokio::test]
    async fn test_sweeper_purges() {
        let store = OrderStore::new(Duration::ZERO);
        store.insert(draft("Oliver")).await;

        let handle = store.spawn_sweeper(Duration::from_millis(10));
        tokio::time::sleep(Duration::from_millis(50)).await;
        handle.abort();

        assert!(store.is_empty().await);
    }

    #[test]
    fn test_draft_wire_format() {
        let json = serde_json::json!({
            "name": "Luna",
            "analysis": {"name": "Luna"},
            "palette": "cool-midnight",
            "artUrl": "https://example.com/luna.png"
        });
        let draft: OrderDraft = serde_json::from_value(json).unwrap();
        assert_eq!(draft.palette, ColourPalette::CoolMidnight);
        assert_eq!(draft.art_url.as_deref(), Some("https://example.com/luna.png"));
        assert!(draft.imagery_style.is_none());
    }
}
