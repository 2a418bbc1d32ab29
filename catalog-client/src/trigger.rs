use async_trait::async_trait;
use tokio::sync::mpsc;

/// Source of "the user is near the end of the list" events.
#[async_trait]
pub trait NearBottom: Send {
    /// Resolves when more items are wanted. Returns `false` once the source is closed.
    async fn wait(&mut self) -> bool;

    /// Called after new cards were appended, so the source watches the new last card.
    fn rewatch(&mut self) {}
}

/// "Load more" button: every [`LoadMore::fire`] yields one event.
pub struct ManualTrigger {
    rx: mpsc::UnboundedReceiver<()>,
}

#[derive(Clone)]
pub struct LoadMore {
    tx: mpsc::UnboundedSender<()>,
}

impl ManualTrigger {
    pub fn new() -> (LoadMore, ManualTrigger) {
        let (tx, rx) = mpsc::unbounded_channel();
        (LoadMore { tx }, ManualTrigger { rx })
    }
}

impl LoadMore {
    pub fn fire(&self) {
        if self.tx.send(()).is_err() {
            log::debug!("Load more fired after the listing stopped");
        }
    }
}

#[async_trait]
impl NearBottom for ManualTrigger {
    async fn wait(&mut self) -> bool {
        self.rx.recv().await.is_some()
    }
}

/// Default distance ahead of the viewport at which the last card counts as visible.
pub const TRIGGER_MARGIN: f64 = 100.0;

/// Edge-triggered visibility check for the last rendered card.
#[derive(Debug, Clone)]
pub struct Proximity {
    margin: f64,
    visible: bool,
}

impl Default for Proximity {
    fn default() -> Self {
        Self::new(TRIGGER_MARGIN)
    }
}

impl Proximity {
    pub fn new(margin: f64) -> Self {
        Self {
            margin,
            visible: false,
        }
    }

    /// Card edges are relative to the viewport top. The viewport is grown by the margin
    /// on both ends. Returns `true` only when the card becomes visible, not while it
    /// stays visible.
    pub fn observe(&mut self, target_top: f64, target_bottom: f64, viewport_height: f64) -> bool {
        let visible =
            target_top <= viewport_height + self.margin && target_bottom >= -self.margin;
        let fired = visible && !self.visible;
        self.visible = visible;
        fired
    }

    pub fn reset(&mut self) {
        self.visible = false;
    }
}

/// Position of the last card, reported on every scroll.
#[derive(Debug, Clone, Copy)]
pub struct ScrollPosition {
    pub target_top: f64,
    pub target_bottom: f64,
    pub viewport_height: f64,
}

/// Visibility trigger fed by scroll positions.
pub struct ScrollTrigger {
    rx: mpsc::UnboundedReceiver<ScrollPosition>,
    proximity: Proximity,
}

impl ScrollTrigger {
    pub fn new(proximity: Proximity) -> (mpsc::UnboundedSender<ScrollPosition>, Self) {
        let (tx, rx) = mpsc::unbounded_channel();
        (tx, Self { rx, proximity })
    }
}

#[async_trait]
impl NearBottom for ScrollTrigger {
    async fn wait(&mut self) -> bool {
        while let Some(pos) = self.rx.recv().await {
            if self
                .proximity
                .observe(pos.target_top, pos.target_bottom, pos.viewport_height)
            {
                return true;
            }
        }
        false
    }

    fn rewatch(&mut self) {
        self.proximity.reset();
    }
}
