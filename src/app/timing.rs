use std::time::{Duration, Instant};
use winit::window::Window;

pub struct FrameTiming {
    last_frame_time: Option<Instant>,
    last_fps_time: Instant,
    frame_count: u32,
    frame_dt: f32,
    fps: f32,
    base_title: String,
}

impl FrameTiming {
    pub fn new(base_title: String) -> Self {
        Self {
            last_frame_time: None,
            last_fps_time: Instant::now(),
            frame_count: 0,
            frame_dt: 1.0 / 60.0,
            fps: 0.0,
            base_title,
        }
    }

    /// Count a frame; true once per half second when the fps figure refreshes.
    pub fn tick(&mut self, now: Instant) -> bool {
        let dt_duration = match self.last_frame_time {
            Some(last) => now.saturating_duration_since(last),
            None => Duration::from_millis(16),
        };
        self.last_frame_time = Some(now);
        self.frame_dt = dt_duration.as_secs_f32().max(0.0);

        self.frame_count = self.frame_count.saturating_add(1);
        let elapsed = now.saturating_duration_since(self.last_fps_time);
        if elapsed.as_secs_f32() < 0.5 {
            return false;
        }
        self.fps = self.frame_count as f32 / elapsed.as_secs_f32();
        self.frame_count = 0;
        self.last_fps_time = now;
        true
    }

    pub fn title(&self, selection: Option<&str>, mode: &str) -> String {
        format!(
            "{} - {} [{}] - {:.1} fps ({:.2} ms)",
            self.base_title,
            selection.unwrap_or("no selection"),
            mode,
            self.fps,
            self.frame_dt * 1000.0
        )
    }

    pub fn update(&mut self, window: Option<&Window>, now: Instant, selection: Option<&str>, mode: &str) {
        if self.tick(now) {
            if let Some(window) = window {
                window.set_title(&self.title(selection, mode));
            }
        }
    }
}
