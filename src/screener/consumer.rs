//! The polling, decision, and dispatch loop.
//!
//! Each tick pulls one snapshot from the [`Producer`], skips symbols still
//! in cooldown, measures the rest over the configured window, and alerts on
//! every symbol whose change is strictly above the threshold. The cooldown
//! is armed before the alert is dispatched, and all of a tick's dispatches
//! are awaited before the next tick begins.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use super::cooldown::CooldownTracker;
use super::price_change;
use super::producer::Producer;
use crate::config::ScreenerConfig;
use crate::error::SurgeError;
use crate::notify::{Alert, AlertFormat, Notifier};
use crate::settings::{Settings, SettingsHandle};

/// Pause between two ticks unless configured otherwise.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_secs(1);

/// Upper bound for a single alert delivery unless configured otherwise.
pub const DEFAULT_DISPATCH_TIMEOUT: Duration = Duration::from_secs(10);

/// Lifecycle of a [`Consumer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerState {
    Idle,
    Running,
    Stopping,
    Stopped,
}

impl fmt::Display for ConsumerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ConsumerState::Idle => "idle",
            ConsumerState::Running => "running",
            ConsumerState::Stopping => "stopping",
            ConsumerState::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Loop timing and alert rendering options.
#[derive(Debug, Clone)]
pub struct ConsumerOptions {
    pub tick_interval: Duration,
    pub dispatch_timeout: Duration,
    pub format: AlertFormat,
}

impl Default for ConsumerOptions {
    fn default() -> Self {
        Self {
            tick_interval: DEFAULT_TICK_INTERVAL,
            dispatch_timeout: DEFAULT_DISPATCH_TIMEOUT,
            format: AlertFormat::default(),
        }
    }
}

impl From<&ScreenerConfig> for ConsumerOptions {
    fn from(config: &ScreenerConfig) -> Self {
        Self {
            tick_interval: config.tick_interval,
            dispatch_timeout: config.dispatch_timeout,
            format: AlertFormat {
                exchange: config.exchange,
                market_type: config.market_type,
                locale: config.locale,
            },
        }
    }
}

/// Counters for one processed tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TickStats {
    /// Symbols present in the snapshot.
    pub symbols: usize,
    /// Symbols left out because their cooldown was still running.
    pub cooled_down: usize,
    /// Alerts that were decided and handed to the transport.
    pub dispatched: usize,
    /// Dispatched alerts that failed, timed out, or panicked.
    pub failed: usize,
}

/// What a single tick did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    /// Settings lack a chat id or bot token; nothing was examined.
    NotReady,
    Processed(TickStats),
}

/// Orchestrates producer polling, detection, cooldowns, and alert dispatch.
///
/// Create it with [`Consumer::new`], keep a [`ConsumerHandle`] from
/// [`Consumer::handle`], then drive it with [`Consumer::start`].
pub struct Consumer {
    producer: Arc<dyn Producer>,
    notifier: Arc<dyn Notifier>,
    settings: SettingsHandle,
    cooldowns: CooldownTracker<String>,
    options: ConsumerOptions,
    state: Arc<watch::Sender<ConsumerState>>,
}

impl Consumer {
    #[must_use]
    pub fn new(
        producer: Arc<dyn Producer>,
        notifier: Arc<dyn Notifier>,
        settings: Settings,
        options: ConsumerOptions,
    ) -> Self {
        let (state, _) = watch::channel(ConsumerState::Idle);
        Self {
            producer,
            notifier,
            settings: SettingsHandle::new(settings),
            cooldowns: CooldownTracker::new(),
            options,
            state: Arc::new(state),
        }
    }

    /// Returns a cloneable handle for stopping and reconfiguring the loop.
    pub fn handle(&self) -> ConsumerHandle {
        ConsumerHandle {
            settings: self.settings.clone(),
            state: Arc::clone(&self.state),
        }
    }

    /// Runs the polling loop until [`ConsumerHandle::stop`] is called.
    ///
    /// Per-tick failures are logged and never end the loop. On exit the
    /// transport is closed and the state becomes [`ConsumerState::Stopped`].
    ///
    /// # Errors
    ///
    /// Returns [`SurgeError::InvalidState`] if the consumer was stopped
    /// before it was started.
    pub async fn start(mut self) -> crate::Result<()> {
        let started = self.state.send_if_modified(|state| {
            if *state == ConsumerState::Idle {
                *state = ConsumerState::Running;
                true
            } else {
                false
            }
        });
        if !started {
            return Err(SurgeError::InvalidState(format!(
                "cannot start a consumer that is {}",
                *self.state.borrow()
            )));
        }

        info!(
            tick_ms = self.options.tick_interval.as_millis() as u64,
            "Starting consumer"
        );

        let mut state_rx = self.state.subscribe();

        while *state_rx.borrow_and_update() == ConsumerState::Running {
            match self.tick().await {
                Ok(TickOutcome::NotReady) => debug!("Settings not ready, skipping tick"),
                Ok(TickOutcome::Processed(stats)) => {
                    if stats.dispatched > 0 {
                        info!(
                            dispatched = stats.dispatched,
                            failed = stats.failed,
                            "Sent {} signals",
                            stats.dispatched - stats.failed
                        );
                    } else {
                        debug!(
                            symbols = stats.symbols,
                            cooled_down = stats.cooled_down,
                            "Tick complete"
                        );
                    }
                }
                Err(e) => error!("Tick failed: {e}"),
            }

            tokio::select! {
                () = tokio::time::sleep(self.options.tick_interval) => {}
                _ = state_rx.changed() => {}
            }
        }

        self.notifier.close().await;
        self.state.send_replace(ConsumerState::Stopped);
        info!("Consumer stopped");

        Ok(())
    }

    /// Runs one pass over a fresh producer snapshot.
    ///
    /// Settings are read once, so an update arriving mid-tick only takes
    /// effect on the next tick.
    async fn tick(&mut self) -> crate::Result<TickOutcome> {
        let settings = self.settings.current();
        let Some(target) = settings.target() else {
            return Ok(TickOutcome::NotReady);
        };

        let snapshot = self.producer.fetch_collected_data().await?;
        let now_ms = crate::time::now_ms();

        self.cooldowns.purge_expired();

        let mut stats = TickStats {
            symbols: snapshot.len(),
            ..TickStats::default()
        };
        let mut dispatches = JoinSet::new();

        for (symbol, candles) in snapshot {
            if self.cooldowns.is_blocked(symbol.as_str()) {
                stats.cooled_down += 1;
                continue;
            }

            let change = price_change::calculate(&candles, settings.interval, now_ms);
            if change.percent <= settings.min_growth {
                continue;
            }

            self.cooldowns.block(symbol.clone(), settings.cooldown());
            debug!(
                %symbol,
                change = change.percent,
                start = change.start_price,
                last = change.last_price,
                "Price surge detected"
            );

            let daily = self
                .producer
                .daily_stats(&symbol)
                .await
                .unwrap_or_default();
            let alert = Alert {
                symbol,
                change,
                daily,
            };
            let text = self.options.format.render(&alert);

            let notifier = Arc::clone(&self.notifier);
            let bot_token = target.bot_token.to_string();
            let chat_id = target.chat_id;
            let timeout = self.options.dispatch_timeout;

            dispatches.spawn(async move {
                let sent = tokio::time::timeout(
                    timeout,
                    notifier.send_message(&bot_token, chat_id, &text),
                )
                .await
                .unwrap_or_else(|_| Err(SurgeError::DispatchTimeout(timeout)));
                (alert.symbol, sent)
            });
            stats.dispatched += 1;
        }

        while let Some(joined) = dispatches.join_next().await {
            match joined {
                Ok((_, Ok(()))) => {}
                Ok((symbol, Err(e))) => {
                    stats.failed += 1;
                    warn!(%symbol, "Failed to send signal: {e}");
                }
                Err(e) => {
                    stats.failed += 1;
                    error!("Signal dispatch task panicked: {e}");
                }
            }
        }

        Ok(TickOutcome::Processed(stats))
    }
}

/// Cloneable control surface of a [`Consumer`].
#[derive(Clone)]
pub struct ConsumerHandle {
    settings: SettingsHandle,
    state: Arc<watch::Sender<ConsumerState>>,
}

impl ConsumerHandle {
    /// Replaces the active settings; the next tick uses the new value.
    pub fn update_settings(&self, settings: Settings) {
        info!(
            interval = settings.interval,
            min_growth = settings.min_growth,
            timeout = settings.timeout,
            ready = settings.is_ready(),
            "Updating screener settings"
        );
        self.settings.replace(settings);
    }

    /// Returns the settings the next tick will use.
    pub fn settings(&self) -> Arc<Settings> {
        self.settings.current()
    }

    pub fn state(&self) -> ConsumerState {
        *self.state.borrow()
    }

    /// Stops the loop and waits until it has fully shut down.
    ///
    /// The tick in progress, including its outstanding dispatches, runs to
    /// completion first. A consumer that never started goes straight to
    /// [`ConsumerState::Stopped`]. Calling `stop` again is a no-op.
    pub async fn stop(&self) {
        let mut state_rx = self.state.subscribe();

        self.state.send_if_modified(|state| match state {
            ConsumerState::Idle => {
                *state = ConsumerState::Stopped;
                true
            }
            ConsumerState::Running => {
                info!("Stopping consumer...");
                *state = ConsumerState::Stopping;
                true
            }
            ConsumerState::Stopping | ConsumerState::Stopped => false,
        });

        // The handle keeps the sender alive, so this only returns once stopped.
        let _ = state_rx
            .wait_for(|state| *state == ConsumerState::Stopped)
            .await;
    }
}
