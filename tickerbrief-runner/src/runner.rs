//! One monitoring run: compute the plan, then drive step execution until the
//! plan is exhausted.
//!
//! The loop realizes the supervisor state machine: Supervising pops the next
//! step, ExecutingStep hands the whole state to that step's component, and
//! control returns to Supervising unconditionally when the component does.
//! Done is reached when the plan is empty. Only the parse step may abort the
//! run; every other step degrades.

use std::time::Duration;

use thiserror::Error;
use tracing::{debug, info, warn};

use tickerbrief_core::alert::evaluate_alerts;
use tickerbrief_core::collect::{collect_news, collect_snapshots, FETCH_PAUSE};
use tickerbrief_core::interpret::{interpret, InterpretError};
use tickerbrief_core::plan::{compute_initial_plan, next_step, Step};
use tickerbrief_core::providers::{
    ChatCompletionClient, Completion, ConsoleSink, DiscordSink, MarketData, NewsFeed, Notifier,
    NotifySink, YahooMarketData, YahooNews,
};
use tickerbrief_core::report::{build_context, build_report_prompt, context_lines, fallback_brief};
use tickerbrief_core::state::WorkflowState;

use crate::settings::Settings;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("requirement interpretation failed: {0}")]
    Interpret(#[from] InterpretError),
}

/// Everything one run needs: providers, the notifier, and the market knobs.
///
/// Built explicitly and passed in — no process-wide client state — so the
/// orchestration loop is exercisable with mocks.
pub struct RunContext {
    market: Box<dyn MarketData>,
    news: Box<dyn NewsFeed>,
    completion: Box<dyn Completion>,
    notifier: Notifier,
    timezone: String,
    news_top_k: usize,
    fetch_pause: Duration,
}

impl RunContext {
    pub fn new(
        market: Box<dyn MarketData>,
        news: Box<dyn NewsFeed>,
        completion: Box<dyn Completion>,
        notifier: Notifier,
    ) -> Self {
        Self {
            market,
            news,
            completion,
            notifier,
            timezone: "America/Toronto".to_string(),
            news_top_k: 5,
            fetch_pause: FETCH_PAUSE,
        }
    }

    /// Wire up the real providers from operator settings. The completion API
    /// key is read from the environment variable named in the settings.
    pub fn from_settings(settings: &Settings) -> Self {
        let api_key = std::env::var(&settings.completion.api_key_env).ok();
        let completion = ChatCompletionClient::new(
            settings.completion.base_url.clone(),
            settings.completion.model.clone(),
            api_key,
        );
        let discord = settings
            .discord
            .webhook_url
            .as_ref()
            .map(|url| DiscordSink::new(url.clone(), settings.discord.mention_id.clone()));
        let notifier = Notifier::new(
            Box::new(ConsoleSink),
            discord.map(|sink| Box::new(sink) as Box<dyn NotifySink>),
        );

        let mut ctx = Self::new(
            Box::new(YahooMarketData::new()),
            Box::new(YahooNews::new()),
            Box::new(completion),
            notifier,
        );
        ctx.timezone = settings.market.timezone.clone();
        ctx.news_top_k = settings.market.news_top_k;
        ctx
    }

    pub fn with_timezone(mut self, timezone: impl Into<String>) -> Self {
        self.timezone = timezone.into();
        self
    }

    pub fn with_news_top_k(mut self, top_k: usize) -> Self {
        self.news_top_k = top_k;
        self
    }

    pub fn with_fetch_pause(mut self, pause: Duration) -> Self {
        self.fetch_pause = pause;
        self
    }
}

/// Execute one cold-start run for a free-text requirement.
///
/// The terminal state always has a non-empty `brief`; the error case is a
/// failed parse step, in which case nothing was notified.
pub fn run(requirement: &str, ctx: &RunContext) -> Result<WorkflowState, RunError> {
    resume(WorkflowState::new(requirement), ctx)
}

/// Compute the initial plan for a (possibly pre-populated) state and drive
/// it to completion.
pub fn resume(mut state: WorkflowState, ctx: &RunContext) -> Result<WorkflowState, RunError> {
    state.plan = compute_initial_plan(&state);
    info!(
        plan = %render_plan(&state),
        requirement = %state.requirement,
        "starting run"
    );

    while let Some(step) = next_step(&mut state) {
        debug!(step = %step, remaining = state.plan.len(), "executing step");
        execute_step(step, &mut state, ctx)?;
    }

    info!(
        snapshots = state.snapshots.as_ref().map_or(0, Vec::len),
        alerts = state.alerts.len(),
        "run complete"
    );
    Ok(state)
}

fn render_plan(state: &WorkflowState) -> String {
    state
        .plan
        .iter()
        .map(|s| s.name())
        .collect::<Vec<_>>()
        .join(" -> ")
}

fn execute_step(step: Step, state: &mut WorkflowState, ctx: &RunContext) -> Result<(), RunError> {
    if step == Step::Parse {
        let config = interpret(&state.requirement, ctx.completion.as_ref())?;
        info!(tickers = ?config.tickers, "requirement interpreted");
        state.configuration = Some(config);
        return Ok(());
    }

    let Some(config) = state.configuration.clone() else {
        warn!(step = %step, "step needs a configuration but none is present; skipping");
        return Ok(());
    };

    match step {
        Step::Parse => unreachable!("handled above"),
        Step::Price => {
            let snapshots = collect_snapshots(
                ctx.market.as_ref(),
                &config.tickers,
                &ctx.timezone,
                ctx.fetch_pause,
            );
            debug!(count = snapshots.len(), "snapshots collected");
            state.snapshots = Some(snapshots);
        }
        Step::News => {
            let news = collect_news(ctx.news.as_ref(), &config.tickers, ctx.news_top_k);
            debug!(tickers = news.len(), "news collected");
            state.news_by_ticker = Some(news);
        }
        Step::Judge => {
            let snapshots = state.snapshots.as_deref().unwrap_or(&[]);
            state.alerts = evaluate_alerts(snapshots, config.alert_threshold);
            debug!(alerts = state.alerts.len(), "alerts evaluated");
        }
        Step::Brief => {
            let snapshots = state.snapshots.as_deref().unwrap_or(&[]);
            let empty = Default::default();
            let news = state.news_by_ticker.as_ref().unwrap_or(&empty);
            let lines = context_lines(snapshots, news);
            let context = build_context(&lines);
            let prompt =
                build_report_prompt(&context, config.alert_threshold, config.report_language);
            let brief = ctx.completion.complete(&prompt);
            state.brief = if brief.trim().is_empty() {
                warn!("completion returned nothing; using fallback brief");
                fallback_brief(&lines)
            } else {
                brief
            };
        }
        Step::Notify => {
            if !state.alerts.is_empty() {
                let body = format!("[ALERT]\n{}", state.alerts.join("\n"));
                ctx.notifier.dispatch(config.notify_method, &body);
            }
            let body = format!("[DAILY BRIEF]\n{}", state.brief);
            ctx.notifier.dispatch(config.notify_method, &body);
        }
    }
    Ok(())
}
