//! Game task runtime.
//!
//! One task per board: tick, render, diff, encode, transmit, sleep. A failed
//! transmission never stops the game; the differ is invalidated so the next
//! tick repaints the whole board once the link is back.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::time::sleep;
use tracing::{debug, info, warn};

use curtain_engine::{Game, GameStats, TickEvent};
use curtain_frame::{encode_batches, Frame, FrameDiffer};
use curtain_link::{Connector, LinkManager};

use crate::types::{Rgb, DISPLAY_COLS, DISPLAY_ROWS, FPS};

/// Display geometry and pacing shared by every game task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSettings {
    pub rows: u8,
    pub cols: u8,
    pub fps: u32,
}

impl Default for TickSettings {
    fn default() -> Self {
        Self {
            rows: DISPLAY_ROWS,
            cols: DISPLAY_COLS,
            fps: FPS,
        }
    }
}

impl TickSettings {
    /// Delay between ticks
    pub fn period(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.fps.max(1) as f64)
    }
}

/// Drive `game` until `stop` flips to true (or its sender is dropped).
///
/// The stop signal is only observed between ticks, so a batch that has
/// started transmitting always finishes. Returns the game's final counters.
pub async fn run_game<C: Connector>(
    mut game: Game,
    link: Arc<LinkManager<C>>,
    settings: TickSettings,
    mut stop: watch::Receiver<bool>,
) -> GameStats {
    let period = settings.period();
    let mut frame = Frame::new(settings.rows, settings.cols);
    let mut differ = FrameDiffer::new(settings.rows, settings.cols);
    let mut changed = Vec::new();

    info!(board = game.name(), "game task started");

    loop {
        if *stop.borrow() {
            break;
        }

        if let TickEvent::Locked { rows_cleared } = game.tick() {
            if rows_cleared > 0 {
                let stats = game.stats();
                debug!(
                    board = game.name(),
                    locked = stats.locked_pieces,
                    rows_cleared = stats.rows_cleared,
                    resets = stats.resets,
                    "stats"
                );
            }
        }

        frame.clear(Rgb::BLACK);
        game.render(&mut frame);
        differ.diff_into(&frame, &mut changed);

        if !changed.is_empty() {
            let batches = encode_batches(&changed);
            debug!(
                board = game.name(),
                pixels = changed.len(),
                commands = batches.len(),
                "sending changes"
            );
            if let Err(e) = link.send_batch(&batches).await {
                warn!(board = game.name(), error = %e, "transmission failed; resyncing next tick");
                differ.invalidate();
            }
        }

        tokio::select! {
            res = stop.changed() => {
                if res.is_err() || *stop.borrow() {
                    break;
                }
            }
            _ = sleep(period) => {}
        }
    }

    let stats = game.stats();
    info!(
        board = game.name(),
        ticks = stats.ticks,
        locked = stats.locked_pieces,
        rows_cleared = stats.rows_cleared,
        resets = stats.resets,
        "game task stopped"
    );
    stats
}

#[cfg(test)]
mod tests {
    use super::*;
    use curtain_engine::{BoardSlot, GameConfig};
    use curtain_frame::wire::{BATCH_HEADER, BATCH_LEN, ENTRY_LEN, PADDING_ENTRY};
    use curtain_link::{DeviceTarget, DryRunConnector, Link, LinkConfig, TransportError};
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex as StdMutex;

    /// Connector whose device can be switched off; records delivered writes.
    #[derive(Clone, Default)]
    struct Switchable {
        down: Arc<AtomicBool>,
        delivered: Arc<StdMutex<Vec<Vec<u8>>>>,
    }

    struct SwitchableLink(Switchable);

    impl Connector for Switchable {
        type Link = SwitchableLink;

        async fn connect(&self, _target: &DeviceTarget) -> Result<SwitchableLink, TransportError> {
            if self.down.load(Ordering::SeqCst) {
                return Err(TransportError::NotFound("switched off".into()));
            }
            Ok(SwitchableLink(self.clone()))
        }

        async fn is_available(&self, _target: &DeviceTarget) -> bool {
            !self.down.load(Ordering::SeqCst)
        }
    }

    impl Link for SwitchableLink {
        fn is_connected(&self) -> bool {
            !self.0.down.load(Ordering::SeqCst)
        }

        async fn write(&mut self, data: &[u8]) -> Result<(), TransportError> {
            if self.0.down.load(Ordering::SeqCst) {
                return Err(TransportError::NotConnected);
            }
            self.0.delivered.lock().unwrap().push(data.to_vec());
            Ok(())
        }

        async fn close(&mut self) -> Result<(), TransportError> {
            Ok(())
        }
    }

    #[test]
    fn period_follows_fps() {
        let settings = TickSettings {
            fps: 4,
            ..TickSettings::default()
        };
        assert_eq!(settings.period(), Duration::from_millis(250));
    }

    #[tokio::test(start_paused = true)]
    async fn game_task_ticks_until_stopped() {
        let connector = DryRunConnector::new();
        let link = Arc::new(LinkManager::new(connector.clone(), LinkConfig::default()));
        let game = Game::new(BoardSlot::new("left", 0, 10, 1), GameConfig::default());
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(run_game(game, link, TickSettings::default(), stop_rx));
        sleep(Duration::from_secs(10)).await;
        stop_tx.send(true).unwrap();
        let stats = task.await.unwrap();

        assert!(stats.ticks >= 20);
        assert!(connector.writes() > 0);
    }

    #[tokio::test(start_paused = true)]
    async fn failed_sends_keep_ticking_and_repaint_after_recovery() {
        let connector = Switchable::default();
        connector.down.store(true, Ordering::SeqCst);
        let config = LinkConfig {
            attempts: 1,
            settle_delay: Duration::ZERO,
            ..LinkConfig::default()
        };
        let link = Arc::new(LinkManager::new(connector.clone(), config));
        let game = Game::new(BoardSlot::new("left", 0, 10, 1), GameConfig::default());
        let settings = TickSettings::default();
        let (stop_tx, stop_rx) = watch::channel(false);

        let task = tokio::spawn(run_game(game, link, settings, stop_rx));
        sleep(Duration::from_millis(1900)).await;
        assert!(connector.delivered.lock().unwrap().is_empty());

        connector.down.store(false, Ordering::SeqCst);
        sleep(settings.period() + Duration::from_millis(10)).await;
        stop_tx.send(true).unwrap();
        let stats = task.await.unwrap();

        // Six failed ticks, then at least one delivered one.
        assert!(stats.ticks >= 7, "ticks = {}", stats.ticks);

        // The first delivered send repaints every interior cell.
        let cells = settings.rows as usize * settings.cols as usize;
        let delivered = connector.delivered.lock().unwrap();
        let repaint = &delivered[..cells / 10];
        let mut seen = HashSet::new();
        for batch in repaint {
            assert_eq!(batch.len(), BATCH_LEN);
            assert_eq!(&batch[..3], &BATCH_HEADER);
            for entry in batch[3..BATCH_LEN - 1].chunks(ENTRY_LEN) {
                if entry != PADDING_ENTRY {
                    seen.insert((entry[0], entry[1]));
                }
            }
        }
        assert_eq!(seen.len(), cells);
    }
}
