use super::{settle, Loadable, PageContext, PageEvent, PageTasks};

pub const UNREACHABLE: &str = "Could not connect to the backend.";

#[derive(Debug, Clone)]
pub enum HealthEvent {
    Pinged(Loadable<String>),
}

/// Liveness probe against `GET /ping`
#[derive(Debug)]
pub struct HealthPage {
    pub status: Loadable<String>,
    pub base_url: String,
}

impl HealthPage {
    pub fn mount(ctx: &PageContext, tasks: &mut PageTasks) -> Self {
        let page = Self {
            status: Loadable::Loading,
            base_url: ctx.config.api.base_url.clone(),
        };
        Self::ping(ctx, tasks);
        page
    }

    fn ping(ctx: &PageContext, tasks: &mut PageTasks) {
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let result = ctx.api.ping().await.map(|pong| pong.message);
            if let Some(state) = settle(result, UNREACHABLE) {
                ctx.emit(PageEvent::Health(HealthEvent::Pinged(state)));
            }
        });
    }

    pub fn reload(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        self.status = Loadable::Loading;
        Self::ping(ctx, tasks);
    }

    pub fn apply(&mut self, event: HealthEvent) {
        let HealthEvent::Pinged(state) = event;
        self.status = state;
    }
}
