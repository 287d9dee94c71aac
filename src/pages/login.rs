use tracing::{info, warn};

use super::form::{FormState, TextField};
use super::{PageAction, PageContext, PageEvent, PageTasks};
use crate::error::ErrorKind;
use crate::routing::Route;

pub const INVALID_CREDENTIALS: &str = "Invalid username or password.";
pub const UNREACHABLE: &str = "Could not connect to the backend.";
pub const MISSING_FIELDS: &str = "Please enter your username and password.";

const USERNAME: usize = 0;
const PASSWORD: usize = 1;

#[derive(Debug, Clone)]
pub enum LoginEvent {
    LoggedIn,
    Failed(String),
}

#[derive(Debug)]
pub struct LoginPage {
    pub form: FormState,
    pub submitting: bool,
    pub error: Option<String>,
    pub flash: Option<String>,
}

impl LoginPage {
    pub fn mount(flash: Option<String>) -> Self {
        Self {
            form: FormState::new(vec![
                TextField::new("Username"),
                TextField::new("Password").masked(),
            ]),
            submitting: false,
            error: None,
            flash,
        }
    }

    /// Exchange credentials for a token and start the session
    pub fn submit(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        if self.submitting {
            return;
        }
        let username = self.form.value(USERNAME).trim().to_string();
        let password = zeroize::Zeroizing::new(self.form.value(PASSWORD).to_string());
        if username.is_empty() || password.is_empty() {
            self.error = Some(MISSING_FIELDS.to_string());
            return;
        }

        self.error = None;
        self.submitting = true;
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let event = match ctx.api.login(&username, &password).await {
                Ok(token) => {
                    ctx.session.login(&token.access_token, None);
                    match ctx.api.current_user().await {
                        Ok(user) => ctx.session.set_user(user),
                        Err(e) => warn!(error = %e, "could not fetch profile after login"),
                    }
                    info!(username = %username, "signed in");
                    LoginEvent::LoggedIn
                }
                Err(e) if e.kind() == ErrorKind::Transport => LoginEvent::Failed(UNREACHABLE.into()),
                Err(e) => {
                    warn!(error = %e, "sign in rejected");
                    LoginEvent::Failed(INVALID_CREDENTIALS.into())
                }
            };
            ctx.emit(PageEvent::Login(event));
        });
    }

    pub fn apply(&mut self, event: LoginEvent) -> PageAction {
        self.submitting = false;
        match event {
            LoginEvent::LoggedIn => {
                self.form.clear();
                PageAction::Navigate(Route::Dashboard, None)
            }
            LoginEvent::Failed(message) => {
                self.form.set_value(PASSWORD, "");
                self.error = Some(message);
                PageAction::None
            }
        }
    }

    pub fn go_register(&self) -> PageAction {
        PageAction::Navigate(Route::Register, None)
    }
}
