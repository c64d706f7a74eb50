//! Feed de cambios en tiempo real
//!
//! `ChangeFeed::subscribe` entrega un `Subscription` con alcance: al soltarlo
//! (fin de la pantalla, fin del stream SSE) el listener se libera. El contador
//! de suscripciones activas permite detectar listeners filtrados.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, warn};
use uuid::Uuid;

/// Entidad observada
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Entity {
    Profiles,
    Bookings,
    Notifications,
}

/// Tipo de cambio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Insert,
    Update,
    Delete,
}

impl ChangeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ChangeKind::Insert => "insert",
            ChangeKind::Update => "update",
            ChangeKind::Delete => "delete",
        }
    }
}

/// Evento de cambio publicado tras una escritura confirmada
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChangeEvent {
    pub entity: Entity,
    pub kind: ChangeKind,
    pub record_id: Uuid,
    /// Usuarios dueños o contraparte del registro
    pub owner_ids: Vec<Uuid>,
    pub record: serde_json::Value,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new<T: Serialize>(
        entity: Entity,
        kind: ChangeKind,
        record_id: Uuid,
        owner_ids: Vec<Uuid>,
        record: &T,
    ) -> Self {
        Self {
            entity,
            kind,
            record_id,
            owner_ids,
            record: serde_json::to_value(record).unwrap_or(serde_json::Value::Null),
            at: Utc::now(),
        }
    }
}

/// Filtro de una suscripción
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SubscriptionFilter {
    pub record_id: Option<Uuid>,
    pub owner_id: Option<Uuid>,
}

impl SubscriptionFilter {
    pub fn owner(owner_id: Uuid) -> Self {
        Self {
            record_id: None,
            owner_id: Some(owner_id),
        }
    }

    pub fn record(record_id: Uuid) -> Self {
        Self {
            record_id: Some(record_id),
            owner_id: None,
        }
    }

    fn matches(&self, event: &ChangeEvent) -> bool {
        self.record_id.map_or(true, |id| id == event.record_id)
            && self.owner_id.map_or(true, |id| event.owner_ids.contains(&id))
    }
}

/// Feed de cambios compartido por el estado de la aplicación
#[derive(Clone)]
pub struct ChangeFeed {
    sender: broadcast::Sender<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

impl ChangeFeed {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            active: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Publicar un cambio; sin suscriptores el evento se descarta
    pub fn publish(&self, event: ChangeEvent) {
        debug!(
            "📡 {:?}/{} {} -> {} listener(s)",
            event.entity,
            event.kind.as_str(),
            event.record_id,
            self.sender.receiver_count()
        );
        let _ = self.sender.send(event);
    }

    /// Suscribirse a una entidad y a un conjunto de tipos de cambio
    pub fn subscribe(
        &self,
        entity: Entity,
        kinds: &[ChangeKind],
        filter: SubscriptionFilter,
    ) -> Subscription {
        let id = Uuid::new_v4();
        let count = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("🔔 Suscripción {} a {:?} abierta ({} activas)", id, entity, count);

        Subscription {
            id,
            entity,
            kinds: kinds.to_vec(),
            filter,
            receiver: self.sender.subscribe(),
            active: Arc::clone(&self.active),
        }
    }

    pub fn active_subscriptions(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }
}

/// Suscripción activa; se libera en `Drop`
pub struct Subscription {
    id: Uuid,
    entity: Entity,
    kinds: Vec<ChangeKind>,
    filter: SubscriptionFilter,
    receiver: broadcast::Receiver<ChangeEvent>,
    active: Arc<AtomicUsize>,
}

impl Subscription {
    pub fn id(&self) -> Uuid {
        self.id
    }

    fn wants(&self, event: &ChangeEvent) -> bool {
        event.entity == self.entity
            && (self.kinds.is_empty() || self.kinds.contains(&event.kind))
            && self.filter.matches(event)
    }

    /// Siguiente evento que pasa el filtro; `None` cuando el feed se cierra
    pub async fn next(&mut self) -> Option<ChangeEvent> {
        loop {
            match self.receiver.recv().await {
                Ok(event) if self.wants(&event) => return Some(event),
                Ok(_) => continue,
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    warn!("⚠️ Suscripción {} perdió {} eventos", self.id, skipped);
                    continue;
                }
                Err(broadcast::error::RecvError::Closed) => return None,
            }
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let remaining = self.active.fetch_sub(1, Ordering::SeqCst) - 1;
        debug!("🔕 Suscripción {} liberada ({} activas)", self.id, remaining);
    }
}
