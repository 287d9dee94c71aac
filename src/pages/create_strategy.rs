use super::form::{FormState, TextField};
use super::{settle, Loadable, PageAction, PageContext, PageEvent, PageTasks};
use crate::domain::NewStrategy;
use crate::routing::Route;

pub const CREATED: &str = "Strategy created successfully!";
pub const CREATE_FAILED: &str = "Failed to create strategy. Please check your data.";

const NAME: usize = 0;
const DESCRIPTION: usize = 1;

#[derive(Debug, Clone)]
pub enum CreateStrategyEvent {
    Submitted(Result<(), String>),
}

#[derive(Debug)]
pub struct CreateStrategyPage {
    pub form: FormState,
    pub submitting: bool,
    pub error: Option<String>,
}

impl Default for CreateStrategyPage {
    fn default() -> Self {
        Self::mount()
    }
}

impl CreateStrategyPage {
    pub fn mount() -> Self {
        Self {
            form: FormState::new(vec![
                TextField::new("Name").with_placeholder("e.g. SMA crossover"),
                TextField::new("Description").with_placeholder("optional"),
            ]),
            submitting: false,
            error: None,
        }
    }

    /// Validate locally, then `POST /strategies/`
    pub fn submit(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        if self.submitting {
            return;
        }
        let strategy = match NewStrategy::new(self.form.value(NAME), self.form.value(DESCRIPTION)) {
            Ok(strategy) => strategy,
            Err(message) => {
                self.error = Some(message);
                return;
            }
        };

        self.error = None;
        self.submitting = true;
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let outcome = match settle(ctx.api.create_strategy(&strategy).await, CREATE_FAILED) {
                Some(Loadable::Loaded(())) => Ok(()),
                Some(Loadable::Failed(message)) => Err(message),
                Some(Loadable::Loading) | None => return,
            };
            ctx.emit(PageEvent::CreateStrategy(CreateStrategyEvent::Submitted(outcome)));
        });
    }

    pub fn apply(&mut self, event: CreateStrategyEvent) -> PageAction {
        match event {
            CreateStrategyEvent::Submitted(Ok(())) => {
                self.submitting = false;
                PageAction::Navigate(Route::Strategies, Some(CREATED.to_string()))
            }
            CreateStrategyEvent::Submitted(Err(message)) => {
                self.submitting = false;
                self.error = Some(message);
                PageAction::None
            }
        }
    }

    pub fn cancel(&self) -> PageAction {
        PageAction::Navigate(Route::Strategies, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::harness;
    use reqwest::Method;

    fn type_text(page: &mut CreateStrategyPage, text: &str) {
        for c in text.chars() {
            page.form.insert(c);
        }
    }

    #[tokio::test]
    async fn test_blank_name_blocks_submission() {
        let h = harness();
        let mut tasks = PageTasks::new();
        let mut page = CreateStrategyPage::mount();
        page.form.focus_next();
        type_text(&mut page, "only a description");

        page.submit(&h.ctx, &mut tasks);
        assert_eq!(page.error.as_deref(), Some("Strategy name is required."));
        assert!(!page.submitting);
        assert!(h.demo.requests().is_empty());
    }

    #[tokio::test]
    async fn test_success_navigates_with_flash() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = CreateStrategyPage::mount();
        type_text(&mut page, "Breakout");

        page.submit(&h.ctx, &mut tasks);
        let Some(PageEvent::CreateStrategy(event)) = h.rx.recv().await.map(|m| m.event) else {
            panic!("expected create event");
        };
        assert_eq!(
            page.apply(event),
            PageAction::Navigate(Route::Strategies, Some(CREATED.to_string()))
        );

        let sent = h.demo.requests();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].path, "/strategies/");
    }

    #[tokio::test]
    async fn test_failure_keeps_form() {
        let mut h = harness();
        h.demo.respond(Method::POST, "/strategies/", 422, r#"{"detail":"bad"}"#);
        let mut tasks = PageTasks::new();
        let mut page = CreateStrategyPage::mount();
        type_text(&mut page, "Breakout");

        page.submit(&h.ctx, &mut tasks);
        let Some(PageEvent::CreateStrategy(event)) = h.rx.recv().await.map(|m| m.event) else {
            panic!("expected create event");
        };
        assert_eq!(page.apply(event), PageAction::None);
        assert_eq!(page.error.as_deref(), Some(CREATE_FAILED));
        assert_eq!(page.form.value(0), "Breakout");
    }
}
