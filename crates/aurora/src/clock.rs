/// Seconds added to the clock on every animation tick.
///
/// The step is a literal rather than a measured frame delta, so the animation
/// speed follows the host's refresh rate.
pub const DEFAULT_TIME_STEP: f64 = 0.016;

/// Monotonic animation clock advanced once per frame.
///
/// The clock stores whole ticks and derives seconds from them, so the value
/// after `n` ticks is exactly `n * step` no matter how long the loop runs.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Clock {
    ticks: u64,
    step: f64,
}

impl Clock {
    /// Creates a clock at zero with the given per-tick step.
    ///
    /// Non-finite or non-positive steps fall back to [`DEFAULT_TIME_STEP`].
    pub fn new(step: f64) -> Self {
        let step = if step.is_finite() && step > 0.0 {
            step
        } else {
            tracing::warn!(step, "invalid clock step; using default");
            DEFAULT_TIME_STEP
        };
        Self { ticks: 0, step }
    }

    /// Creates a clock positioned at the tick closest to `seconds`.
    pub fn starting_at(seconds: f64, step: f64) -> Self {
        let mut clock = Self::new(step);
        if seconds.is_finite() && seconds > 0.0 {
            clock.ticks = (seconds / clock.step).round() as u64;
        }
        clock
    }

    pub fn advance(&mut self) {
        self.ticks = self.ticks.saturating_add(1);
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn step(&self) -> f64 {
        self.step
    }

    pub fn seconds(&self) -> f64 {
        self.ticks as f64 * self.step
    }

    /// Time value as fed to the colour function.
    pub fn uniform(&self) -> f32 {
        self.seconds() as f32
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new(DEFAULT_TIME_STEP)
    }
}
