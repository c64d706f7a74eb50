//! Bandeja de notificaciones optimista
//!
//! Reducer local: cada acción se aplica de inmediato y devuelve su
//! compensación. Si la llamada remota falla, el llamador despacha la
//! compensación de forma explícita; nunca se revierte de forma implícita.

use uuid::Uuid;

use crate::models::notification::Notification;

#[derive(Debug, Clone, PartialEq)]
pub enum InboxAction {
    /// Reemplaza el contenido con lo leído del servidor
    Loaded(Vec<Notification>),
    MarkRead(Uuid),
    RestoreUnread(Uuid),
    Remove(Uuid),
    Reinsert { index: usize, notification: Notification },
}

#[derive(Debug, Clone, Default)]
pub struct NotificationInbox {
    items: Vec<Notification>,
}

impl NotificationInbox {
    pub fn new(items: Vec<Notification>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Notification] {
        &self.items
    }

    pub fn unread_count(&self) -> usize {
        self.items.iter().filter(|n| !n.read).count()
    }

    pub fn get(&self, id: Uuid) -> Option<&Notification> {
        self.items.iter().find(|n| n.id == id)
    }

    /// Aplica `action` y devuelve la acción que la deshace, si hubo cambio
    pub fn reduce(&mut self, action: InboxAction) -> Option<InboxAction> {
        match action {
            InboxAction::Loaded(items) => {
                self.items = items;
                None
            }
            InboxAction::MarkRead(id) => {
                let notification = self.items.iter_mut().find(|n| n.id == id && !n.read)?;
                notification.read = true;
                Some(InboxAction::RestoreUnread(id))
            }
            InboxAction::RestoreUnread(id) => {
                if let Some(notification) = self.items.iter_mut().find(|n| n.id == id) {
                    notification.read = false;
                }
                None
            }
            InboxAction::Remove(id) => {
                let index = self.items.iter().position(|n| n.id == id)?;
                let notification = self.items.remove(index);
                Some(InboxAction::Reinsert { index, notification })
            }
            InboxAction::Reinsert { index, notification } => {
                if self.get(notification.id).is_none() {
                    let index = index.min(self.items.len());
                    self.items.insert(index, notification);
                }
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::notification::NotificationKind;
    use chrono::Utc;

    fn notification(read: bool) -> Notification {
        Notification {
            id: Uuid::new_v4(),
            user_id: Uuid::new_v4(),
            kind: NotificationKind::ReservaConfirmada,
            message: "Tu reserva ha sido confirmada".to_string(),
            read,
            related_booking_id: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_mark_read_compensation_restores_unread() {
        let n = notification(false);
        let mut inbox = NotificationInbox::new(vec![n.clone()]);

        let compensation = inbox.reduce(InboxAction::MarkRead(n.id));
        assert_eq!(inbox.unread_count(), 0);
        assert_eq!(compensation, Some(InboxAction::RestoreUnread(n.id)));

        inbox.reduce(compensation.unwrap());
        assert_eq!(inbox.unread_count(), 1);
    }

    #[test]
    fn test_mark_read_on_already_read_has_nothing_to_undo() {
        let n = notification(true);
        let mut inbox = NotificationInbox::new(vec![n.clone()]);
        assert_eq!(inbox.reduce(InboxAction::MarkRead(n.id)), None);
        assert_eq!(inbox.reduce(InboxAction::MarkRead(Uuid::new_v4())), None);
    }

    #[test]
    fn test_remove_compensation_reinserts_at_original_index() {
        let (a, b, c) = (notification(false), notification(false), notification(true));
        let mut inbox = NotificationInbox::new(vec![a.clone(), b.clone(), c.clone()]);

        let compensation = inbox.reduce(InboxAction::Remove(b.id)).unwrap();
        assert_eq!(inbox.items().len(), 2);

        inbox.reduce(compensation);
        let ids: Vec<Uuid> = inbox.items().iter().map(|n| n.id).collect();
        assert_eq!(ids, vec![a.id, b.id, c.id]);
    }

    #[test]
    fn test_reinsert_is_idempotent_and_clamped() {
        let a = notification(false);
        let mut inbox = NotificationInbox::default();
        inbox.reduce(InboxAction::Reinsert {
            index: 7,
            notification: a.clone(),
        });
        inbox.reduce(InboxAction::Reinsert {
            index: 0,
            notification: a.clone(),
        });
        assert_eq!(inbox.items().len(), 1);
    }
}
