// Player background - a slowly rotating four-stop gradient
// Colours come from the cover art when it can be sampled, otherwise a fixed dark palette

use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::debug;

/// Degrees the gradient turns per frame.
pub const ANGLE_STEP: f32 = 0.3;

const FALLBACK: [&str; 4] = ["#1a1a2e", "#2d1b4e", "#0f0f23", "#1a0a2e"];

/// Four CSS colour stops.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: [String; 4],
}

impl Default for Palette {
    fn default() -> Self {
        Self {
            colors: FALLBACK.map(String::from),
        }
    }
}

impl Palette {
    /// A missing fourth stop repeats the first one.
    pub fn new(colors: Vec<String>) -> Option<Self> {
        let mut colors = colors.into_iter();
        let first = colors.next()?;
        let second = colors.next()?;
        let third = colors.next()?;
        let fourth = colors.next().unwrap_or_else(|| first.clone());
        Some(Self {
            colors: [first, second, third, fourth],
        })
    }

    /// Build from sampled cover pixels, each darkened by 5%.
    pub fn from_pixels(pixels: &[(u8, u8, u8)]) -> Option<Self> {
        let darken = |c: u8| (f32::from(c) * 0.95).floor() as u8;
        Self::new(
            pixels
                .iter()
                .take(4)
                .map(|&(r, g, b)| format!("rgb({}, {}, {})", darken(r), darken(g), darken(b)))
                .collect(),
        )
    }

    pub fn colors(&self) -> &[String; 4] {
        &self.colors
    }
}

/// Pulls colours out of cover art. Image decoding lives outside this crate.
pub trait CoverSampler: Send + Sync {
    fn sample(&self, cover_url: &str) -> Option<Palette>;
}

/// Never samples; every song gets the fallback palette.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoSampler;

impl CoverSampler for NoSampler {
    fn sample(&self, _cover_url: &str) -> Option<Palette> {
        None
    }
}

/// Palette for a song's cover, falling back when there is none or sampling fails.
pub fn palette_for(sampler: &dyn CoverSampler, cover: Option<&str>) -> Palette {
    cover.and_then(|url| sampler.sample(url)).unwrap_or_default()
}

#[derive(Debug, Clone, PartialEq)]
pub struct GradientFrame {
    pub angle: f32,
    pub colors: [String; 4],
}

impl GradientFrame {
    pub fn css(&self) -> String {
        let [a, b, c, d] = &self.colors;
        format!(
            "linear-gradient({}deg, {} 0%, {} 35%, {} 65%, {} 100%)",
            self.angle, a, b, c, d
        )
    }
}

impl fmt::Display for GradientFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.css())
    }
}

/// Runs at most one animation loop, publishing frames on a watch channel.
///
/// `None` on the channel means no animation is running.
pub struct Visualizer {
    frame_interval: Duration,
    frames: Arc<watch::Sender<Option<GradientFrame>>>,
    task: Option<JoinHandle<()>>,
}

impl Visualizer {
    pub fn new(frame_interval: Duration) -> Self {
        let (frames, _) = watch::channel(None);
        Self {
            frame_interval,
            frames: Arc::new(frames),
            task: None,
        }
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<GradientFrame>> {
        self.frames.subscribe()
    }

    pub fn is_running(&self) -> bool {
        self.task.as_ref().is_some_and(|task| !task.is_finished())
    }

    /// Start animating `palette`, replacing whatever loop was running.
    /// Must be called from within a tokio runtime.
    pub fn start(&mut self, palette: Palette) {
        self.abort();

        let frames = Arc::clone(&self.frames);
        let frame_interval = self.frame_interval;
        debug!("Visualizer starting with {:?}", palette.colors());

        self.task = Some(tokio::spawn(async move {
            let mut ticker = tokio::time::interval(frame_interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            let mut angle = 0.0_f32;
            loop {
                ticker.tick().await;
                angle = (angle + ANGLE_STEP) % 360.0;
                frames.send_replace(Some(GradientFrame {
                    angle,
                    colors: palette.colors.clone(),
                }));
            }
        }));
    }

    pub fn stop(&mut self) {
        if self.abort() {
            debug!("Visualizer stopped");
        }
        self.frames.send_replace(None);
    }

    fn abort(&mut self) -> bool {
        match self.task.take() {
            Some(task) => {
                task.abort();
                true
            }
            None => false,
        }
    }
}

impl Drop for Visualizer {
    fn drop(&mut self) {
        self.abort();
    }
}
