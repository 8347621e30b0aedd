//! Dispatch surface: start, stop and immediate control commands.
//!
//! The controller owns the registry of running game tasks. Its lock is held
//! for the whole of each operation, so concurrent requests apply one at a
//! time.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::sync::{watch, Mutex};
use tokio::task::JoinHandle;
use tokio::time::sleep;
use tracing::{info, warn};

use curtain_engine::{split_slots, BoardSlot, Engine, GameConfig, GameStats, LayoutError};
use curtain_frame::wire::{init_sequence, ControlCommand};
use curtain_link::{Connector, LinkError, LinkManager};

use crate::protocol::{AckStatus, ErrorCode};
use crate::runtime::{run_game, TickSettings};
use crate::types::INIT_DELAY_MS;

#[derive(Debug, Error)]
pub enum DispatchError {
    #[error("link failure: {0}")]
    Link(#[from] LinkError),
    #[error("unknown command key: {0}")]
    UnknownKey(String),
    #[error("invalid board layout: {0}")]
    Layout(#[from] LayoutError),
}

impl DispatchError {
    pub fn code(&self) -> ErrorCode {
        match self {
            DispatchError::Link(_) => ErrorCode::LinkFailure,
            DispatchError::UnknownKey(_) => ErrorCode::UnknownKey,
            DispatchError::Layout(_) => ErrorCode::InvalidLayout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StartOutcome {
    Started,
    AlreadyRunning,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopOutcome {
    Stopped,
    NotRunning,
}

impl From<StartOutcome> for AckStatus {
    fn from(o: StartOutcome) -> Self {
        match o {
            StartOutcome::Started => AckStatus::Started,
            StartOutcome::AlreadyRunning => AckStatus::AlreadyRunning,
        }
    }
}

impl From<StopOutcome> for AckStatus {
    fn from(o: StopOutcome) -> Self {
        match o {
            StopOutcome::Stopped => AckStatus::Stopped,
            StopOutcome::NotRunning => AckStatus::NotRunning,
        }
    }
}

/// What `start` launches.
#[derive(Debug, Clone)]
pub struct RunSettings {
    pub tick: TickSettings,
    pub slots: Vec<BoardSlot>,
    /// Rules for every game; `autoplay` is overridden per start request
    pub game: GameConfig,
}

impl Default for RunSettings {
    fn default() -> Self {
        Self {
            tick: TickSettings::default(),
            slots: split_slots(),
            game: GameConfig::default(),
        }
    }
}

impl RunSettings {
    /// Defaults, with `CURTAIN_FPS` overriding the tick rate
    pub fn from_env() -> Self {
        let mut settings = Self::default();
        if let Some(fps) = std::env::var("CURTAIN_FPS")
            .ok()
            .and_then(|s| s.trim().parse::<u32>().ok())
            .filter(|&n| n > 0)
        {
            settings.tick.fps = fps;
        }
        settings
    }
}

struct GameTask {
    name: String,
    stop: watch::Sender<bool>,
    handle: JoinHandle<GameStats>,
}

pub struct Controller<C: Connector> {
    link: Arc<LinkManager<C>>,
    settings: RunSettings,
    tasks: Mutex<Vec<GameTask>>,
}

impl<C: Connector> Controller<C> {
    /// Fails if the configured boards do not fit the display.
    pub fn new(link: Arc<LinkManager<C>>, settings: RunSettings) -> Result<Self, LayoutError> {
        Engine::new(
            settings.tick.rows,
            settings.tick.cols,
            settings.slots.clone(),
            settings.game.clone(),
        )?;
        Ok(Self {
            link,
            settings,
            tasks: Mutex::new(Vec::new()),
        })
    }

    pub fn link(&self) -> &Arc<LinkManager<C>> {
        &self.link
    }

    pub fn settings(&self) -> &RunSettings {
        &self.settings
    }

    pub async fn is_running(&self) -> bool {
        self.tasks
            .lock()
            .await
            .iter()
            .any(|t| !t.handle.is_finished())
    }

    /// Connect, switch the curtain to per-pixel mode and launch one task per
    /// board. A no-op while games are running.
    pub async fn start(&self, autoplay: bool) -> Result<StartOutcome, DispatchError> {
        let mut tasks = self.tasks.lock().await;
        tasks.retain(|t| !t.handle.is_finished());
        if !tasks.is_empty() {
            return Ok(StartOutcome::AlreadyRunning);
        }

        let config = GameConfig {
            autoplay,
            ..self.settings.game.clone()
        };
        let engine = Engine::new(
            self.settings.tick.rows,
            self.settings.tick.cols,
            self.settings.slots.clone(),
            config,
        )?;

        self.link.acquire_connection().await?;
        self.enter_per_pixel_mode().await?;

        for game in engine.into_games() {
            let (stop, stop_rx) = watch::channel(false);
            let name = game.name().to_string();
            let handle = tokio::spawn(run_game(
                game,
                Arc::clone(&self.link),
                self.settings.tick,
                stop_rx,
            ));
            tasks.push(GameTask { name, stop, handle });
        }
        info!(games = tasks.len(), autoplay, "games started");
        Ok(StartOutcome::Started)
    }

    /// Signal every game task and wait for it to finish its current tick.
    /// A no-op when nothing is running.
    pub async fn stop(&self) -> StopOutcome {
        let mut tasks = self.tasks.lock().await;
        Self::stop_tasks(&mut tasks).await
    }

    /// Stop any running games, then send the control command named `key`.
    pub async fn send_immediate(&self, key: &str) -> Result<(), DispatchError> {
        let command = ControlCommand::from_key(key)
            .ok_or_else(|| DispatchError::UnknownKey(key.to_string()))?;

        let mut tasks = self.tasks.lock().await;
        Self::stop_tasks(&mut tasks).await;
        self.link.send_control(&command.encode()).await?;
        info!(key, "control command sent");
        Ok(())
    }

    async fn enter_per_pixel_mode(&self) -> Result<(), LinkError> {
        for blob in init_sequence() {
            self.link.send_batch(&[blob]).await?;
            sleep(Duration::from_millis(INIT_DELAY_MS)).await;
        }
        Ok(())
    }

    async fn stop_tasks(tasks: &mut Vec<GameTask>) -> StopOutcome {
        let running = tasks.iter().any(|t| !t.handle.is_finished());
        for task in tasks.iter() {
            let _ = task.stop.send(true);
        }
        for GameTask { name, handle, .. } in tasks.drain(..) {
            match handle.await {
                Ok(stats) => info!(
                    board = %name,
                    locked = stats.locked_pieces,
                    rows_cleared = stats.rows_cleared,
                    "game stopped"
                ),
                Err(e) => warn!(board = %name, error = %e, "game task ended abnormally"),
            }
        }
        if running {
            StopOutcome::Stopped
        } else {
            StopOutcome::NotRunning
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curtain_link::{DryRunConnector, LinkConfig};

    fn controller() -> (Controller<DryRunConnector>, DryRunConnector) {
        let connector = DryRunConnector::new();
        let link = Arc::new(LinkManager::new(connector.clone(), LinkConfig::default()));
        (Controller::new(link, RunSettings::default()).unwrap(), connector)
    }

    #[tokio::test(start_paused = true)]
    async fn start_is_idempotent_while_running() {
        let (controller, connector) = controller();
        assert_eq!(controller.start(true).await.unwrap(), StartOutcome::Started);
        // Three init commands.
        assert!(connector.writes() >= 3);
        assert!(controller.is_running().await);
        assert_eq!(
            controller.start(true).await.unwrap(),
            StartOutcome::AlreadyRunning
        );
        assert_eq!(controller.stop().await, StopOutcome::Stopped);
        assert_eq!(controller.stop().await, StopOutcome::NotRunning);
        assert!(!controller.is_running().await);
    }

    #[tokio::test(start_paused = true)]
    async fn immediate_command_stops_games_first() {
        let (controller, connector) = controller();
        controller.start(false).await.unwrap();
        sleep(Duration::from_secs(2)).await;

        let before = connector.writes();
        controller.send_immediate("Red").await.unwrap();
        assert!(!controller.is_running().await);
        assert!(connector.writes() > before);
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_key_leaves_games_running() {
        let (controller, _) = controller();
        controller.start(true).await.unwrap();
        let err = controller.send_immediate("sparkle").await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::UnknownKey);
        assert!(controller.is_running().await);
        controller.stop().await;
    }

    #[test]
    fn overlapping_layout_is_rejected() {
        let connector = DryRunConnector::new();
        let link = Arc::new(LinkManager::new(connector, LinkConfig::default()));
        let settings = RunSettings {
            slots: vec![BoardSlot::new("a", 0, 12, 1), BoardSlot::new("b", 10, 10, 2)],
            ..RunSettings::default()
        };
        assert!(Controller::new(link, settings).is_err());
    }
}
