use zeroize::Zeroizing;

use super::form::{FormState, TextField};
use super::{PageAction, PageContext, PageEvent, PageTasks};
use crate::domain::RegisterRequest;
use crate::routing::Route;

pub const REGISTERED: &str = "Account created. Please sign in.";
pub const REGISTER_FAILED: &str = "Registration failed. Please check your data.";

#[derive(Debug, Clone)]
pub enum RegisterEvent {
    Submitted(Result<(), String>),
}

#[derive(Debug)]
pub struct RegisterPage {
    pub form: FormState,
    pub submitting: bool,
    pub error: Option<String>,
}

impl Default for RegisterPage {
    fn default() -> Self {
        Self::mount()
    }
}

impl RegisterPage {
    pub fn mount() -> Self {
        Self {
            form: FormState::new(vec![
                TextField::new("Username"),
                TextField::new("Email").with_placeholder("you@example.com"),
                TextField::new("Password").masked(),
            ]),
            submitting: false,
            error: None,
        }
    }

    pub fn request(&self) -> RegisterRequest {
        RegisterRequest {
            username: self.form.value(0).to_string(),
            email: self.form.value(1).to_string(),
            password: Zeroizing::new(self.form.value(2).to_string()),
        }
    }

    pub fn submit(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        if self.submitting {
            return;
        }
        let request = self.request();
        if let Err(message) = request.check() {
            self.error = Some(message);
            return;
        }

        self.error = None;
        self.submitting = true;
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let outcome = ctx
                .api
                .register(&request)
                .await
                .map(|_| ())
                .map_err(|e| {
                    tracing::warn!(error = %e, "registration rejected");
                    REGISTER_FAILED.to_string()
                });
            ctx.emit(PageEvent::Register(RegisterEvent::Submitted(outcome)));
        });
    }

    pub fn apply(&mut self, event: RegisterEvent) -> PageAction {
        self.submitting = false;
        match event {
            RegisterEvent::Submitted(Ok(())) => {
                PageAction::Navigate(Route::Login, Some(REGISTERED.to_string()))
            }
            RegisterEvent::Submitted(Err(message)) => {
                self.error = Some(message);
                PageAction::None
            }
        }
    }

    pub fn go_login(&self) -> PageAction {
        PageAction::Navigate(Route::Login, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pages::testing::harness;
    use reqwest::Method;

    fn filled() -> RegisterPage {
        let mut page = RegisterPage::mount();
        page.form.set_value(0, "ana");
        page.form.set_value(1, "ana@example.com");
        page.form.set_value(2, "s3cret");
        page
    }

    #[tokio::test]
    async fn test_register_success_goes_to_login() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = filled();
        page.submit(&h.ctx, &mut tasks);

        let Some(PageEvent::Register(event)) = h.rx.recv().await.map(|m| m.event) else {
            panic!("expected register event");
        };
        assert_eq!(
            page.apply(event),
            PageAction::Navigate(Route::Login, Some(REGISTERED.to_string()))
        );
    }

    #[tokio::test]
    async fn test_register_failure() {
        let mut h = harness();
        h.demo.respond(
            Method::POST,
            "/auth/register",
            400,
            r#"{"detail":"Email already registered."}"#,
        );
        let mut tasks = PageTasks::new();
        let mut page = filled();
        page.submit(&h.ctx, &mut tasks);

        let Some(PageEvent::Register(event)) = h.rx.recv().await.map(|m| m.event) else {
            panic!("expected register event");
        };
        assert_eq!(page.apply(event), PageAction::None);
        assert_eq!(page.error.as_deref(), Some(REGISTER_FAILED));
    }

    #[tokio::test]
    async fn test_invalid_email_blocks_submit() {
        let h = harness();
        let mut tasks = PageTasks::new();
        let mut page = filled();
        page.form.set_value(1, "nope");
        page.submit(&h.ctx, &mut tasks);
        assert_eq!(page.error.as_deref(), Some("Please enter a valid email address."));
        assert!(h.demo.requests().is_empty());
    }
}
