use super::{settle, Loadable, PageContext, PageEvent, PageTasks};
use crate::domain::Notification;

pub const LOAD_FAILED: &str = "Failed to load notifications.";
pub const EMPTY: &str = "No notifications at the moment.";

#[derive(Debug, Clone)]
pub enum NotificationsEvent {
    Loaded(Loadable<Vec<Notification>>),
}

#[derive(Debug)]
pub struct NotificationsPage {
    pub items: Loadable<Vec<Notification>>,
    pub scroll: usize,
}

impl NotificationsPage {
    pub fn mount(ctx: &PageContext, tasks: &mut PageTasks) -> Self {
        let user_id = ctx.config.api.user_id;
        let task_ctx = ctx.clone();
        tasks.spawn(async move {
            let result = task_ctx.api.notifications(user_id).await;
            if let Some(state) = settle(result, LOAD_FAILED) {
                task_ctx.emit(PageEvent::Notifications(NotificationsEvent::Loaded(state)));
            }
        });
        Self {
            items: Loadable::Loading,
            scroll: 0,
        }
    }

    pub fn apply(&mut self, event: NotificationsEvent) {
        let NotificationsEvent::Loaded(state) = event;
        self.items = state;
        self.scroll = 0;
    }

    pub fn is_empty(&self) -> bool {
        self.items.loaded().is_some_and(Vec::is_empty)
    }

    pub fn scroll_down(&mut self) {
        let len = self.items.loaded().map(Vec::len).unwrap_or(0);
        if self.scroll < len.saturating_sub(1) {
            self.scroll += 1;
        }
    }

    pub fn scroll_up(&mut self) {
        self.scroll = self.scroll.saturating_sub(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::NotificationKind;
    use crate::pages::testing::harness;
    use reqwest::Method;

    async fn mounted(h: &mut crate::pages::testing::Harness) -> NotificationsPage {
        let mut tasks = PageTasks::new();
        let mut page = NotificationsPage::mount(&h.ctx, &mut tasks);
        let Some(PageEvent::Notifications(event)) = h.rx.recv().await.map(|m| m.event) else {
            panic!("expected notifications event");
        };
        page.apply(event);
        page
    }

    #[tokio::test]
    async fn test_loads_kinds() {
        let mut h = harness();
        let page = mounted(&mut h).await;
        let kinds: Vec<NotificationKind> = page
            .items
            .loaded()
            .unwrap()
            .iter()
            .map(|n| n.kind.clone())
            .collect();
        assert_eq!(kinds.len(), 4);
        assert!(kinds.contains(&NotificationKind::Alert));
    }

    #[tokio::test]
    async fn test_empty_and_failure() {
        let mut h = harness();
        h.demo.respond(Method::GET, "/notifications/1", 200, "[]");
        assert!(mounted(&mut h).await.is_empty());

        h.demo.respond(Method::GET, "/notifications/1", 503, "");
        let page = mounted(&mut h).await;
        assert_eq!(page.items.failure(), Some(LOAD_FAILED));
    }
}
