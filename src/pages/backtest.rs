use tracing::info;

use super::form::{FormState, TextField};
use super::{PageContext, PageEvent, PageTasks};
use crate::domain::{backtest, BacktestForm, BacktestResult};

#[derive(Debug, Clone)]
pub enum BacktestEvent {
    Finished(BacktestResult),
}

#[derive(Debug)]
pub struct BacktestPage {
    pub form: FormState,
    pub running: bool,
    pub error: Option<String>,
    pub result: Option<BacktestResult>,
}

impl Default for BacktestPage {
    fn default() -> Self {
        Self::mount()
    }
}

impl BacktestPage {
    pub fn mount() -> Self {
        Self {
            form: FormState::new(vec![
                TextField::new("Asset").with_placeholder("PETR4"),
                TextField::new("Condition").with_placeholder("RSI < 30"),
                TextField::new("Rule").with_placeholder("buy"),
                TextField::new("Start date").with_placeholder("YYYY-MM-DD"),
                TextField::new("End date").with_placeholder("YYYY-MM-DD"),
            ]),
            running: false,
            error: None,
            result: None,
        }
    }

    pub fn form_input(&self) -> BacktestForm {
        BacktestForm {
            asset: self.form.value(0).to_string(),
            condition: self.form.value(1).to_string(),
            rule: self.form.value(2).to_string(),
            start: self.form.value(3).to_string(),
            end: self.form.value(4).to_string(),
        }
    }

    /// Validate and run the local simulation; never touches the network
    pub fn submit(&mut self, ctx: &PageContext, tasks: &mut PageTasks) {
        if self.running {
            return;
        }
        let request = match self.form_input().validate() {
            Ok(request) => request,
            Err(e) => {
                self.error = Some(e.to_string());
                return;
            }
        };

        self.error = None;
        self.result = None;
        self.running = true;
        let delay = ctx.config.backtest.simulated_delay();
        let ctx = ctx.clone();
        tasks.spawn(async move {
            let result = backtest::simulate(&request, delay).await;
            info!(asset = %request.asset, pnl = %result.pnl, "backtest finished");
            ctx.emit(PageEvent::Backtest(BacktestEvent::Finished(result)));
        });
    }

    pub fn apply(&mut self, event: BacktestEvent) {
        let BacktestEvent::Finished(result) = event;
        self.running = false;
        self.result = Some(result);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::BacktestFormError;
    use crate::pages::testing::harness;

    fn fill(page: &mut BacktestPage, values: [&str; 5]) {
        for (idx, value) in values.iter().enumerate() {
            page.form.set_value(idx, value);
        }
    }

    #[tokio::test]
    async fn test_reversed_dates_rejected_without_network() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = BacktestPage::mount();
        fill(&mut page, ["PETR4", "RSI < 30", "buy", "2024-02-01", "2024-01-01"]);

        page.submit(&h.ctx, &mut tasks);
        assert_eq!(
            page.error.as_deref(),
            Some(BacktestFormError::StartAfterEnd.to_string().as_str())
        );
        assert!(!page.running);
        assert_eq!(tasks.active(), 0);
        assert!(h.demo.requests().is_empty());
        assert!(h.rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_valid_submission_yields_mock_result() {
        let mut h = harness();
        let mut tasks = PageTasks::new();
        let mut page = BacktestPage::mount();
        fill(&mut page, ["PETR4", "RSI < 30", "buy", "2024-01-01", "2024-02-01"]);

        page.submit(&h.ctx, &mut tasks);
        assert!(page.running);

        let Some(PageEvent::Backtest(event)) = h.rx.recv().await.map(|m| m.event) else {
            panic!("expected backtest event");
        };
        page.apply(event);
        let result = page.result.as_ref().unwrap();
        assert!(result.success);
        assert_eq!(result.orders, 14);
        assert!(!page.running);
        assert!(h.demo.requests().is_empty());
    }

    #[test]
    fn test_blank_fields_message() {
        let page = BacktestPage::mount();
        assert_eq!(
            page.form_input().validate().unwrap_err().to_string(),
            "Please fill in all fields."
        );
    }
}
