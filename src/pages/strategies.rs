use tracing::info;

use super::{settle, Loadable, PageAction, PageContext, PageEvent, PageTasks};
use crate::domain::Strategy;
use crate::routing::Route;

pub const LOAD_FAILED: &str = "Failed to load strategies.";
pub const EMPTY: &str = "You haven't created any strategies yet.";
pub const TOGGLE_FAILED: &str = "Failed to change strategy status.";
pub const DELETE_FAILED: &str = "Failed to delete strategy. Please try again.";
pub const DELETE_CONFIRM: &str = "Are you sure you want to delete this strategy?";

#[derive(Debug, Clone)]
pub enum StrategiesEvent {
    Loaded(Loadable<Vec<Strategy>>),
    /// Id and new activation flag, once the backend accepted the change
    Toggled(Result<(u64, bool), String>),
    Deleted(Result<u64, String>),
}

#[derive(Debug)]
pub struct StrategiesPage {
    pub list: Loadable<Vec<Strategy>>,
    pub selected: usize,
    /// One-shot message carried over from another page
    pub flash: Option<String>,
    /// Blocking failure popup; dismissed by the user
    pub popup: Option<String>,
}

impl StrategiesPage {
    pub fn mount(ctx: &PageContext, tasks: &mut PageTasks, flash: Option<String>) -> Self {
        let page = Self {
            list: Loadable::Loading,
            selected: 0,
            flash,
            popup: None,
        };
        Self::load(ctx, tasks);
        page
    }

    fn load(ctx: &PageContext, tasks: &mut PageTasks) {
        let ctx = ctx.clone();
        tasks.spawn(async move {
            if let Some(state) = settle(ctx.api.strategies().await, LOAD_FAILED) {
                ctx.emit(PageEvent::Strategies(StrategiesEvent::Loaded(state)));
            }
        });
    }

    pub fn reload(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        self.list = Loadable::Loading;
        Self::load(ctx, tasks);
    }

    pub fn is_empty(&self) -> bool {
        self.list.loaded().is_some_and(Vec::is_empty)
    }

    pub fn selected_strategy(&self) -> Option<&Strategy> {
        self.list.loaded().and_then(|list| list.get(self.selected))
    }

    pub fn select_next(&mut self) {
        if let Some(list) = self.list.loaded() {
            if !list.is_empty() {
                self.selected = (self.selected + 1).min(list.len() - 1);
            }
        }
    }

    pub fn select_prev(&mut self) {
        self.selected = self.selected.saturating_sub(1);
    }

    /// Flip `is_active` of the selected strategy on the backend
    pub fn toggle_selected(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        let Some(updated) = self.selected_strategy().map(Strategy::toggled) else {
            return;
        };
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let result = ctx.api.update_strategy(&updated).await;
            let outcome = match settle(result, TOGGLE_FAILED) {
                Some(Loadable::Loaded(())) => Ok((updated.id, updated.is_active)),
                Some(Loadable::Failed(message)) => Err(message),
                Some(Loadable::Loading) | None => return,
            };
            ctx.emit(PageEvent::Strategies(StrategiesEvent::Toggled(outcome)));
        });
    }

    /// Delete strategy `id`; callers confirm with [`DELETE_CONFIRM`] first
    pub fn delete(&mut self, id: u64, ctx: &PageContext, tasks: &mut PageTasks) {
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let outcome = match settle(ctx.api.delete_strategy(id).await, DELETE_FAILED) {
                Some(Loadable::Loaded(())) => Ok(id),
                Some(Loadable::Failed(message)) => Err(message),
                Some(Loadable::Loading) | None => return,
            };
            ctx.emit(PageEvent::Strategies(StrategiesEvent::Deleted(outcome)));
        });
    }

    pub fn apply(&mut self, event: StrategiesEvent) -> PageAction {
        match event {
            StrategiesEvent::Loaded(state) => {
                self.list = state;
                self.selected = 0;
            }
            StrategiesEvent::Toggled(Ok((id, is_active))) => {
                if let Some(strategy) = self
                    .list
                    .loaded_mut()
                    .and_then(|list| list.iter_mut().find(|s| s.id == id))
                {
                    strategy.is_active = is_active;
                    info!(id, is_active, "strategy status changed");
                }
            }
            StrategiesEvent::Deleted(Ok(id)) => {
                if let Some(list) = self.list.loaded_mut() {
                    list.retain(|s| s.id != id);
                    self.selected = self.selected.min(list.len().saturating_sub(1));
                }
                info!(id, "strategy deleted");
            }
            StrategiesEvent::Toggled(Err(message)) | StrategiesEvent::Deleted(Err(message)) => {
                self.popup = Some(message);
            }
        }
        PageAction::None
    }

    pub fn dismiss(&mut self) {
        self.popup = None;
        self.flash = None;
    }

    pub fn new_strategy(&self) -> PageAction {
        PageAction::Navigate(Route::NewStrategy, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::DemoTransport;
    use crate::pages::testing::{harness, harness_with};
    use crate::pages::PageMessage;
    use reqwest::Method;
    use tokio::sync::mpsc::UnboundedReceiver;

    async fn next_event(rx: &mut UnboundedReceiver<PageMessage>) -> StrategiesEvent {
        match rx.recv().await.map(|m| m.event) {
            Some(PageEvent::Strategies(event)) => event,
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_list_is_not_an_error() {
        let mut h = harness_with(DemoTransport::new().with_strategies(Vec::new()));
        let mut tasks = PageTasks::new();
        let mut page = StrategiesPage::mount(&h.ctx, &mut tasks, None);

        let event = next_event(&mut h.rx).await;
        page.apply(event);
        assert!(page.is_empty());
        assert!(page.list.failure().is_none());
    }

    #[tokio::test]
    async fn test_load_failure_message() {
        let mut h = harness();
        h.demo.fail(Method::GET, "/strategies", "connection refused");
        let mut tasks = PageTasks::new();
        let mut page = StrategiesPage::mount(&h.ctx, &mut tasks, None);

        let event = next_event(&mut h.rx).await;
        page.apply(event);
        assert_eq!(page.list.failure(), Some(LOAD_FAILED));
    }

    #[tokio::test]
    async fn test_toggle_updates_after_success_only() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = StrategiesPage::mount(&h.ctx, &mut tasks, None);
        let event = next_event(&mut h.rx).await;
        page.apply(event);

        let before = page.selected_strategy().unwrap().is_active;
        page.toggle_selected(&h.ctx, &mut tasks);
        // No optimistic update.
        assert_eq!(page.selected_strategy().unwrap().is_active, before);

        let event = next_event(&mut h.rx).await;
        page.apply(event);
        assert_eq!(page.selected_strategy().unwrap().is_active, !before);
    }

    #[tokio::test]
    async fn test_failed_toggle_and_delete_raise_popup() {
        let mut h = harness();
        h.demo.respond(Method::PUT, "/strategies/1", 500, "{}");
        h.demo.respond(Method::DELETE, "/strategies/1", 500, "{}");
        let mut tasks = PageTasks::new();
        let mut page = StrategiesPage::mount(&h.ctx, &mut tasks, None);
        let event = next_event(&mut h.rx).await;
        page.apply(event);

        page.toggle_selected(&h.ctx, &mut tasks);
        let event = next_event(&mut h.rx).await;
        page.apply(event);
        assert_eq!(page.popup.as_deref(), Some(TOGGLE_FAILED));

        page.dismiss();
        page.delete(1, &h.ctx, &mut tasks);
        let event = next_event(&mut h.rx).await;
        page.apply(event);
        assert_eq!(page.popup.as_deref(), Some(DELETE_FAILED));
        assert_eq!(page.list.loaded().map(Vec::len), Some(2));
    }

    #[tokio::test]
    async fn test_delete_removes_row() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = StrategiesPage::mount(&h.ctx, &mut tasks, Some("Strategy created successfully!".into()));
        let event = next_event(&mut h.rx).await;
        page.apply(event);
        assert!(page.flash.is_some());

        page.select_next();
        page.delete(2, &h.ctx, &mut tasks);
        let event = next_event(&mut h.rx).await;
        page.apply(event);

        let ids: Vec<u64> = page.list.loaded().unwrap().iter().map(|s| s.id).collect();
        assert_eq!(ids, vec![1]);
        assert_eq!(page.selected, 0);
    }
}
