//! Swipe gesture detection
//!
//! Turns a press / move / release pointer stream on the profile card into a
//! single outcome. Only horizontal displacement matters. The detector also
//! exposes the card's visual offset, tilt and fade while a drag is live.

use matchcall_common::LifecycleConfig;

/// Resolved swipe direction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SwipeDecision {
    Accept,
    Reject,
    None,
}

/// Image navigation requested by tapping one half of the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageNavigation {
    Previous,
    Next,
}

/// Result of one press-to-release gesture
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    Swipe(SwipeDecision),
    Tap(ImageNavigation),
}

impl GestureOutcome {
    /// Swipe decision of this gesture; taps never accept or reject
    pub fn decision(self) -> SwipeDecision {
        match self {
            Self::Swipe(decision) => decision,
            Self::Tap(_) => SwipeDecision::None,
        }
    }
}

/// Geometry of the swipe
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SwipeConfig {
    pub threshold: f64,
    pub tap_slop: f64,
    /// Degrees of tilt per pixel of offset
    pub rotation_factor: f64,
    /// Offset at which the card reaches minimum opacity
    pub fade_distance: f64,
    pub min_opacity: f64,
}

impl Default for SwipeConfig {
    fn default() -> Self {
        Self {
            threshold: 100.0,
            tap_slop: 5.0,
            rotation_factor: 0.05,
            fade_distance: 400.0,
            min_opacity: 0.5,
        }
    }
}

impl From<&LifecycleConfig> for SwipeConfig {
    fn from(config: &LifecycleConfig) -> Self {
        Self {
            threshold: config.swipe_threshold,
            tap_slop: config.tap_slop,
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct Press {
    start_x: f64,
    offset: f64,
}

/// Pointer-stream state machine for the profile card
#[derive(Debug, Clone)]
pub struct SwipeGestureDetector {
    config: SwipeConfig,
    card_width: f64,
    press: Option<Press>,
}

impl SwipeGestureDetector {
    pub fn new(config: SwipeConfig, card_width: f64) -> Self {
        Self {
            config,
            card_width,
            press: None,
        }
    }

    pub fn set_card_width(&mut self, width: f64) {
        self.card_width = width;
    }

    /// Pointer down at `x` (card-relative)
    pub fn press(&mut self, x: f64) {
        self.press = Some(Press {
            start_x: x,
            offset: 0.0,
        });
    }

    /// Pointer moved; ignored when no press is active
    pub fn move_to(&mut self, x: f64) {
        if let Some(press) = self.press.as_mut() {
            press.offset = x - press.start_x;
        }
    }

    /// Pointer up (or left the card); `None` when nothing was pressed
    pub fn release(&mut self) -> Option<GestureOutcome> {
        let press = self.press.take()?;
        let d = press.offset;

        let outcome = if d.abs() <= self.config.tap_slop {
            if press.start_x < self.card_width / 2.0 {
                GestureOutcome::Tap(ImageNavigation::Previous)
            } else {
                GestureOutcome::Tap(ImageNavigation::Next)
            }
        } else if d > self.config.threshold {
            GestureOutcome::Swipe(SwipeDecision::Accept)
        } else if d < -self.config.threshold {
            GestureOutcome::Swipe(SwipeDecision::Reject)
        } else {
            GestureOutcome::Swipe(SwipeDecision::None)
        };

        tracing::trace!(offset = d, ?outcome, "Gesture released");
        Some(outcome)
    }

    /// Drop the in-flight press without resolving it
    pub fn reset(&mut self) {
        self.press = None;
    }

    pub fn is_dragging(&self) -> bool {
        self.press.is_some()
    }

    /// Current horizontal offset; zero when idle
    pub fn offset(&self) -> f64 {
        self.press.map_or(0.0, |p| p.offset)
    }

    /// Tilt in degrees
    pub fn rotation(&self) -> f64 {
        self.offset() * self.config.rotation_factor
    }

    pub fn opacity(&self) -> f64 {
        (1.0 - self.offset().abs() / self.config.fade_distance).max(self.config.min_opacity)
    }
}

impl Default for SwipeGestureDetector {
    fn default() -> Self {
        Self::new(SwipeConfig::default(), 360.0)
    }
}
