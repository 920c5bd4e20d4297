//! Marking-mode gesture recognition.
//!
//! While an item is dragged, the pointer path is split into straight strokes. A turn
//! between two strokes, a pause at the end of a stroke or (optionally) a stroke
//! exceeding a fixed length each count as a selection at the point where it happened.

use crate::geometry::{FULL_CIRCLE, Vec2};
use serde::{Deserialize, Serialize};
use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GestureSettings {
    /// Strokes shorter than this never select anything.
    pub min_stroke_length: f64,
    /// Minimum direction change in degrees that counts as a turn.
    pub min_turn_angle: f64,
    /// Movements below this distance are ignored.
    pub jitter_threshold: f64,
    pub pause_timeout_ms: u64,
    /// If non-zero, every stroke longer than this selects immediately.
    pub fixed_stroke_length: f64,
}

impl Default for GestureSettings {
    fn default() -> Self {
        Self {
            min_stroke_length: 150.0,
            min_turn_angle: 20.0,
            jitter_threshold: 10.0,
            pause_timeout_ms: 100,
            fixed_stroke_length: 0.0,
        }
    }
}

impl GestureSettings {
    pub fn pause_timeout(&self) -> Duration {
        Duration::from_millis(self.pause_timeout_ms)
    }
}

#[derive(Debug, Clone, Default)]
pub struct GestureDetector {
    settings: GestureSettings,
    stroke_start: Option<Vec2>,
    stroke_end: Option<Vec2>,
    last_motion: Option<Duration>,
}

impl GestureDetector {
    pub fn new(settings: GestureSettings) -> Self {
        Self {
            settings,
            ..Default::default()
        }
    }

    pub fn set_settings(&mut self, settings: GestureSettings) {
        self.settings = settings;
    }

    /// Feeds one pointer sample. Returns the coordinate of a recognized selection.
    pub fn on_motion(&mut self, coords: Vec2, timestamp: Duration) -> Option<Vec2> {
        let (Some(start), Some(end)) = (self.stroke_start, self.stroke_end) else {
            self.stroke_start = Some(coords);
            self.stroke_end = Some(coords);
            self.last_motion = Some(timestamp);
            return None;
        };

        if coords.distance(end) < self.settings.jitter_threshold {
            return None;
        }

        let stroke_length = coords.distance(start);
        if self.settings.fixed_stroke_length > 0.0
            && stroke_length > self.settings.fixed_stroke_length
        {
            self.restart_stroke(coords, coords, timestamp);
            return Some(coords);
        }

        if end.distance(start) > self.settings.min_stroke_length {
            let stroke_angle = (end - start).angle();
            let current_angle = (coords - end).angle();
            if Self::turn_angle(stroke_angle, current_angle) > self.settings.min_turn_angle {
                self.restart_stroke(end, coords, timestamp);
                return Some(end);
            }
        }

        self.stroke_end = Some(coords);
        self.last_motion = Some(timestamp);
        None
    }

    /// Checks for a pause at the end of a long enough stroke.
    pub fn on_tick(&mut self, timestamp: Duration) -> Option<Vec2> {
        let (start, end, last) = (self.stroke_start?, self.stroke_end?, self.last_motion?);

        let long_enough = end.distance(start) > self.settings.min_stroke_length;
        let paused = timestamp.saturating_sub(last) >= self.settings.pause_timeout();
        if long_enough && paused {
            self.restart_stroke(end, end, timestamp);
            return Some(end);
        }
        None
    }

    pub fn reset(&mut self) {
        self.stroke_start = None;
        self.stroke_end = None;
        self.last_motion = None;
    }

    fn restart_stroke(&mut self, start: Vec2, end: Vec2, timestamp: Duration) {
        self.stroke_start = Some(start);
        self.stroke_end = Some(end);
        self.last_motion = Some(timestamp);
    }

    fn turn_angle(a: f64, b: f64) -> f64 {
        let diff = (b - a).rem_euclid(FULL_CIRCLE);
        diff.min(FULL_CIRCLE - diff)
    }
}
