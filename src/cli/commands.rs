//! One-shot command runners.
//!
//! Each command hydrates the same session the dashboard uses, issues its
//! requests through [`BackendApi`] and prints the result. A 401 anywhere
//! clears the stored credential and ends the command with
//! [`SESSION_EXPIRED`].

use std::sync::Arc;

use anyhow::{anyhow, bail};
use rust_decimal::Decimal;
use serde::Serialize;
use tabled::Tabled;
use tracing::debug;
use zeroize::Zeroizing;

use super::output::{self, OutputMode};
use super::{Commands, StrategyCommands};
use crate::adapters::{ApiClient, BackendApi, Transport};
use crate::config::AppConfig;
use crate::domain::{
    backtest, BacktestForm, NewStrategy, Notification, PortfolioPosition, RegisterRequest,
    Strategy,
};
use crate::error::{DeskError, ErrorKind};
use crate::pages::{create_strategy, login, notifications, portfolio, register, strategies};
use crate::session::{SessionHandle, SessionProvider, SharedTokenStore};

pub const SESSION_EXPIRED: &str = "Session expired, please log in again.";
pub const NOT_SIGNED_IN: &str = "Not signed in. Run `tradedesk login` first.";

/// Client, session and settings shared by every command
pub struct CommandContext {
    pub api: BackendApi,
    pub session: SessionHandle,
    pub config: Arc<AppConfig>,
    pub mode: OutputMode,
    _provider: SessionProvider,
}

impl CommandContext {
    pub fn new(
        config: Arc<AppConfig>,
        transport: Arc<dyn Transport>,
        store: SharedTokenStore,
        mode: OutputMode,
    ) -> Self {
        let client = ApiClient::new(transport, store.clone());
        let mut provider = SessionProvider::new(store);
        provider.attach(client.subscribe());
        provider.hydrate();
        Self {
            api: BackendApi::new(client),
            session: provider.handle(),
            config,
            mode,
            _provider: provider,
        }
    }

    fn require_session(&self) -> anyhow::Result<()> {
        if self.session.is_authenticated() {
            Ok(())
        } else {
            bail!(NOT_SIGNED_IN)
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct StrategyRow {
    pub id: u64,
    pub name: String,
    pub status: String,
    pub description: String,
}

impl From<&Strategy> for StrategyRow {
    fn from(strategy: &Strategy) -> Self {
        Self {
            id: strategy.id,
            name: strategy.name.clone(),
            status: strategy.status_label().to_string(),
            description: strategy.description.clone().unwrap_or_default(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct PositionRow {
    pub asset: String,
    pub quantity: String,
    pub average_price: String,
    pub pnl: String,
}

impl From<&PortfolioPosition> for PositionRow {
    fn from(position: &PortfolioPosition) -> Self {
        Self {
            asset: position.asset.clone(),
            quantity: position.quantity.normalize().to_string(),
            average_price: format!("{:.2}", position.average_price),
            pnl: format!("{:.2}", position.pnl),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct NotificationRow {
    #[tabled(rename = "")]
    pub marker: String,
    #[tabled(rename = "type")]
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub source: String,
    pub timestamp: String,
}

impl From<&Notification> for NotificationRow {
    fn from(item: &Notification) -> Self {
        Self {
            marker: item.kind.marker().to_string(),
            kind: item.kind.as_str().to_string(),
            message: item.message.clone(),
            source: item.source.clone(),
            timestamp: item.timestamp.clone(),
        }
    }
}

/// Run `command`, turning authorization loss into [`SESSION_EXPIRED`]
pub async fn execute(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match dispatch(command, ctx).await {
        Err(e) if is_unauthorized(&e) => Err(anyhow!(SESSION_EXPIRED)),
        other => other,
    }
}

fn is_unauthorized(error: &anyhow::Error) -> bool {
    error
        .downcast_ref::<DeskError>()
        .is_some_and(DeskError::is_unauthorized)
}

async fn dispatch(command: Commands, ctx: &CommandContext) -> anyhow::Result<()> {
    match command {
        Commands::Login { username } => login(ctx, username).await,
        Commands::Register { username, email } => register_account(ctx, username, email).await,
        Commands::Logout => {
            ctx.session.logout();
            output::print_success("Signed out.");
            Ok(())
        }
        Commands::Whoami => {
            ctx.require_session()?;
            let user = ctx.api.current_user().await?;
            output::print_item(&user, ctx.mode)
        }
        Commands::Ping => {
            let pong = ctx.api.ping().await?;
            output::print_kv(&ctx.config.api.base_url, &pong.message);
            Ok(())
        }
        Commands::Config => match ctx.mode {
            OutputMode::Json => output::print_item(ctx.config.as_ref(), ctx.mode),
            OutputMode::Table => {
                println!("{}", render_config(&ctx.config)?);
                Ok(())
            }
        },
        Commands::Strategies(cmd) => {
            ctx.require_session()?;
            run_strategies(ctx, cmd).await
        }
        Commands::Portfolio => {
            ctx.require_session()?;
            let positions = ctx.api.portfolio(ctx.config.api.user_id).await?;
            let rows: Vec<PositionRow> = positions.iter().map(PositionRow::from).collect();
            output::print_items(&rows, portfolio::EMPTY, ctx.mode)?;
            if ctx.mode == OutputMode::Table && !positions.is_empty() {
                let total: Decimal = positions.iter().map(|p| p.pnl).sum();
                output::print_kv("Total PnL", &format!("{total:.2}"));
            }
            Ok(())
        }
        Commands::Notifications => {
            ctx.require_session()?;
            let items = ctx.api.notifications(ctx.config.api.user_id).await?;
            let rows: Vec<NotificationRow> = items.iter().map(NotificationRow::from).collect();
            output::print_items(&rows, notifications::EMPTY, ctx.mode)
        }
        Commands::Backtest {
            asset,
            condition,
            rule,
            start,
            end,
        } => {
            let request = BacktestForm {
                asset,
                condition,
                rule,
                start,
                end,
            }
            .validate()?;
            let result = backtest::simulate(&request, ctx.config.backtest.simulated_delay()).await;
            output::print_item(&result, ctx.mode)
        }
        Commands::Dashboard { .. } => bail!("the dashboard is started by the binary, not as a command"),
    }
}

pub fn render_config(config: &AppConfig) -> anyhow::Result<String> {
    Ok(toml::to_string_pretty(config)?)
}

async fn login(ctx: &CommandContext, username: Option<String>) -> anyhow::Result<()> {
    let username = match username {
        Some(name) => name,
        None => output::prompt_line("Username: ")?,
    };
    let password = Zeroizing::new(rpassword::prompt_password("Password: ")?);
    if username.trim().is_empty() || password.is_empty() {
        bail!(login::MISSING_FIELDS);
    }

    let token = ctx.api.login(&username, &password).await.map_err(|e| {
        debug!(error = %e, "login failed");
        if e.kind() == ErrorKind::Transport {
            anyhow!(login::UNREACHABLE)
        } else {
            anyhow!(login::INVALID_CREDENTIALS)
        }
    })?;
    ctx.session.login(&token.access_token, None);

    match ctx.api.current_user().await {
        Ok(user) => {
            output::print_success(&format!("Signed in as {}.", user.username));
            ctx.session.set_user(user);
        }
        Err(_) => output::print_success("Signed in."),
    }
    Ok(())
}

async fn register_account(
    ctx: &CommandContext,
    username: Option<String>,
    email: Option<String>,
) -> anyhow::Result<()> {
    let username = match username {
        Some(name) => name,
        None => output::prompt_line("Username: ")?,
    };
    let email = match email {
        Some(email) => email,
        None => output::prompt_line("Email: ")?,
    };
    let password = Zeroizing::new(rpassword::prompt_password("Password: ")?);

    let request = RegisterRequest {
        username,
        email,
        password,
    };
    request.check().map_err(|message| anyhow!(message))?;
    ctx.api.register(&request).await.map_err(|e| {
        debug!(error = %e, "registration failed");
        anyhow!(register::REGISTER_FAILED)
    })?;
    output::print_success(register::REGISTERED);
    Ok(())
}

async fn run_strategies(ctx: &CommandContext, cmd: StrategyCommands) -> anyhow::Result<()> {
    match cmd {
        StrategyCommands::List => {
            let list = ctx.api.strategies().await?;
            let rows: Vec<StrategyRow> = list.iter().map(StrategyRow::from).collect();
            output::print_items(&rows, strategies::EMPTY, ctx.mode)
        }
        StrategyCommands::Create { name, description } => {
            let strategy = NewStrategy::new(&name, &description).map_err(|message| anyhow!(message))?;
            ctx.api
                .create_strategy(&strategy)
                .await
                .map_err(creation_error)?;
            output::print_success(create_strategy::CREATED);
            Ok(())
        }
        StrategyCommands::Toggle { id } => {
            let list = ctx.api.strategies().await?;
            let Some(current) = list.iter().find(|s| s.id == id) else {
                bail!("Strategy {id} not found.");
            };
            let updated = current.toggled();
            ctx.api.update_strategy(&updated).await.map_err(|e| {
                if e.is_unauthorized() {
                    anyhow::Error::from(e)
                } else {
                    anyhow!(strategies::TOGGLE_FAILED)
                }
            })?;
            output::print_success(&format!(
                "{} is now {}.",
                updated.name,
                updated.status_label()
            ));
            Ok(())
        }
        StrategyCommands::Delete { id, yes } => {
            if !yes && !output::confirm(strategies::DELETE_CONFIRM) {
                output::print_warn("Cancelled.");
                return Ok(());
            }
            ctx.api.delete_strategy(id).await.map_err(|e| {
                if e.is_unauthorized() {
                    anyhow::Error::from(e)
                } else {
                    anyhow!(strategies::DELETE_FAILED)
                }
            })?;
            output::print_success(&format!("Strategy {id} deleted."));
            Ok(())
        }
    }
}

fn creation_error(e: DeskError) -> anyhow::Error {
    if e.is_unauthorized() {
        e.into()
    } else {
        debug!(error = %e, "strategy creation failed");
        anyhow!(create_strategy::CREATE_FAILED)
    }
}
