use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use segue_stage::Stage;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use super::cue_engine::CueEngine;
use crate::clock::ClockSource;

/// Drives a [`CueEngine`] at the sheet's poll interval until disposed.
///
/// The stand-in for the display's refresh callback in headless embeddings:
/// one tokio task, one tick per interval, the stage locked only for the
/// duration of a tick. Disposing cancels the pending tick; tearing a slide
/// down without disposing would leak a perpetually-rescheduling task.
pub struct CueRunner {
    shutdown: watch::Sender<bool>,
    handle: JoinHandle<()>,
}

impl CueRunner {
    pub fn spawn(
        mut engine: CueEngine,
        stage: Arc<Mutex<Stage>>,
        clock: Arc<dyn ClockSource>,
    ) -> CueRunner {
        let (shutdown, mut shutdown_rx) = watch::channel(false);
        let poll = Duration::from_millis(u64::from(engine.sheet().poll_ms));

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(poll);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let mut stage = stage.lock();
                        engine.tick(&mut stage, clock.as_ref());
                    }
                    changed = shutdown_rx.changed() => {
                        if changed.is_err() || *shutdown_rx.borrow() {
                            break;
                        }
                    }
                }
            }
            log::debug!("cue runner stopped");
        });

        CueRunner { shutdown, handle }
    }

    /// Cancel the pending tick and wait for the task to wind down.
    pub async fn dispose(self) {
        let _ = self.shutdown.send(true);
        let _ = self.handle.await;
    }

    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }
}

#[cfg(test)]
mod tests {
    use segue_stage::{Element, Stage};
    use serde_json::json;

    use super::*;
    use crate::clock::ManualClock;
    use crate::preset::preset_library::PresetLibrary;
    use crate::resolve::ANIM_KEY_ATTR;
    use crate::sheet::normalizer::normalize_sheet;
    use crate::style::applicator::StaticApplicator;

    #[tokio::test]
    async fn test_runner_ticks_and_disposes() {
        let mut stage = Stage::new();
        let root = stage.insert(None, Element::new("section"));
        let node = stage.insert(Some(root), {
            let mut el = Element::new("h1");
            el.set_attr(ANIM_KEY_ATTR, "title");
            el
        });

        let sheet = normalize_sheet(&json!({
            "pollMs": 16,
            "cues": [{ "at": 0.5, "action": "classAdd", "target": "title", "className": "shown" }]
        }))
        .unwrap();

        let engine = CueEngine::start(
            &mut stage,
            root,
            sheet,
            PresetLibrary::builtin(),
            Box::new(StaticApplicator::new()),
        )
        .ok()
        .expect("engine should arm");

        let stage = Arc::new(Mutex::new(stage));
        let clock = Arc::new(ManualClock::new());
        clock.set(1.0);

        let runner = CueRunner::spawn(engine, Arc::clone(&stage), clock.clone());
        tokio::time::sleep(Duration::from_millis(100)).await;
        runner.dispose().await;

        assert!(stage.lock().element(node).has_class("shown"));
    }
}
