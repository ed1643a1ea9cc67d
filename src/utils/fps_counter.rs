use std::time::{Duration, Instant};

const WINDOW: Duration = Duration::from_secs(1);

/// Frame rate for the window title, averaged over one-second windows.
pub struct FpsCounter {
    window_start: Instant,
    frames: u32,
}

impl Default for FpsCounter {
    fn default() -> Self {
        Self::new()
    }
}

impl FpsCounter {
    #[must_use]
    pub fn new() -> Self {
        Self {
            window_start: Instant::now(),
            frames: 0,
        }
    }

    /// Counts one frame. Returns the rate whenever a window closes.
    pub fn frame(&mut self) -> Option<f32> {
        self.record(Instant::now())
    }

    fn record(&mut self, now: Instant) -> Option<f32> {
        self.frames += 1;
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < WINDOW {
            return None;
        }
        let fps = self.frames as f32 / elapsed.as_secs_f32();
        self.window_start = now;
        self.frames = 0;
        Some(fps)
    }
}
