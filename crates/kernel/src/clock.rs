use serde::{Deserialize, Serialize};

use crate::KernelError;

/// Upper bound on the frame delta handed to variable-rate consumers, in seconds.
pub const MAX_FRAME_DELTA_SECONDS: f32 = 0.1;

/// Relative slack when comparing the accumulator against one tick.
///
/// Frame times that are exact multiples of the tick length can land a few ulps
/// short after subtraction; without the slack such a frame would emit nothing
/// and the next one would emit two.
const TICK_SNAP: f64 = 1e-9;

/// Clock tuning. Times are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClockConfig {
    /// Length of one fixed simulation tick.
    pub tick_length_ms: f64,
    /// Multiplier applied to elapsed real time. 0 freezes simulation time.
    pub time_scale: f64,
    /// Largest scaled frame delta fed into the accumulator.
    pub max_frame_delta_ms: f64,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            tick_length_ms: 1000.0 / 60.0,
            time_scale: 1.0,
            max_frame_delta_ms: 100.0,
        }
    }
}

impl ClockConfig {
    /// Config ticking at `hz` times per simulated second.
    pub fn with_tick_rate(hz: f64) -> Self {
        Self {
            tick_length_ms: 1000.0 / hz,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> Result<(), KernelError> {
        if !self.tick_length_ms.is_finite() || self.tick_length_ms <= 0.0 {
            return Err(KernelError::InvalidTickLength(self.tick_length_ms));
        }
        validate_time_scale(self.time_scale)?;
        if !self.max_frame_delta_ms.is_finite() || self.max_frame_delta_ms <= 0.0 {
            return Err(KernelError::InvalidMaxFrameDelta(self.max_frame_delta_ms));
        }
        Ok(())
    }
}

fn validate_time_scale(scale: f64) -> Result<(), KernelError> {
    if !scale.is_finite() || scale < 0.0 {
        return Err(KernelError::InvalidTimeScale(scale));
    }
    Ok(())
}

/// Fixed-timestep scheduler.
///
/// Turns wall-clock frame times into a whole number of fixed ticks per frame,
/// carrying the remainder in an accumulator. Pausing stops tick emission while
/// keeping the remainder; resuming folds the paused span into a running total
/// so elapsed time is measured as if the pause never happened.
#[derive(Debug, Clone)]
pub struct Clock {
    config: ClockConfig,
    time_scale: f64,
    /// Set by the first update.
    started: bool,
    last_adjusted_ms: f64,
    accumulated_ms: f64,
    paused: bool,
    pause_started_ms: f64,
    paused_total_ms: f64,
    tick_count: u64,
}

impl Clock {
    pub fn new(config: ClockConfig) -> Result<Self, KernelError> {
        config.validate()?;
        Ok(Self {
            config,
            time_scale: config.time_scale,
            started: false,
            last_adjusted_ms: 0.0,
            accumulated_ms: 0.0,
            paused: false,
            pause_started_ms: 0.0,
            paused_total_ms: 0.0,
            tick_count: 0,
        })
    }

    pub fn config(&self) -> &ClockConfig {
        &self.config
    }

    pub fn tick_length_ms(&self) -> f64 {
        self.config.tick_length_ms
    }

    pub fn time_scale(&self) -> f64 {
        self.time_scale
    }

    pub fn set_time_scale(&mut self, scale: f64) -> Result<(), KernelError> {
        validate_time_scale(scale)?;
        tracing::debug!(old = self.time_scale, new = scale, "time scale changed");
        self.time_scale = scale;
        Ok(())
    }

    pub fn is_paused(&self) -> bool {
        self.paused
    }

    /// Whether the first update has happened.
    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Total fixed ticks emitted since creation or the last reset.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Time carried over to the next frame, always below one tick.
    pub fn accumulated_ms(&self) -> f64 {
        self.accumulated_ms
    }

    /// Cumulative time spent paused.
    pub fn paused_total_ms(&self) -> f64 {
        self.paused_total_ms
    }

    /// Fraction of the next tick already elapsed, in `[0, 1)`. Used to
    /// interpolate rendered positions between the last two ticks.
    pub fn interpolation_alpha(&self) -> f64 {
        self.accumulated_ms / self.config.tick_length_ms
    }

    /// Stop emitting ticks. Has no effect if already paused.
    pub fn pause(&mut self, now_ms: f64) {
        if self.paused {
            return;
        }
        self.paused = true;
        self.pause_started_ms = now_ms;
        tracing::debug!(now_ms, accumulated_ms = self.accumulated_ms, "clock paused");
    }

    /// Resume ticking. The paused span is excluded from the next frame delta.
    pub fn resume(&mut self, now_ms: f64) {
        if !self.paused {
            return;
        }
        let span = (now_ms - self.pause_started_ms).max(0.0);
        self.paused_total_ms += span;
        self.paused = false;
        tracing::debug!(now_ms, span_ms = span, total_ms = self.paused_total_ms, "clock resumed");
    }

    /// Forget all timing state; the next update re-initializes.
    pub fn reset(&mut self) {
        *self = Self {
            config: self.config,
            time_scale: self.time_scale,
            started: false,
            last_adjusted_ms: 0.0,
            accumulated_ms: 0.0,
            paused: false,
            pause_started_ms: 0.0,
            paused_total_ms: 0.0,
            tick_count: 0,
        };
    }

    /// Advance without a tick callback. See [`Clock::update_with`].
    pub fn update(&mut self, now_ms: f64) -> f32 {
        self.update_with(now_ms, |_| {})
    }

    /// Advance to `now_ms`, calling `on_tick(tick_length_ms)` once per whole
    /// tick elapsed. Returns the scaled frame delta in seconds, clamped to
    /// [`MAX_FRAME_DELTA_SECONDS`], for consumers that run per frame.
    pub fn update_with(&mut self, now_ms: f64, mut on_tick: impl FnMut(f64)) -> f32 {
        if !now_ms.is_finite() {
            tracing::warn!(now_ms, "ignoring non-finite frame time");
            return 0.0;
        }

        if !self.started {
            self.started = true;
            // Paused before the first frame: baseline at the pause start.
            let baseline_ms = if self.paused {
                self.pause_started_ms
            } else {
                now_ms
            };
            self.last_adjusted_ms = baseline_ms - self.paused_total_ms;
            tracing::debug!(now_ms, "clock started");
            return 0.0;
        }

        if self.paused {
            return 0.0;
        }

        let adjusted_ms = now_ms - self.paused_total_ms;
        let raw_ms = (adjusted_ms - self.last_adjusted_ms).max(0.0);
        self.last_adjusted_ms = adjusted_ms;

        let delta_ms = (raw_ms * self.time_scale).min(self.config.max_frame_delta_ms);
        self.accumulated_ms += delta_ms;

        let tick_ms = self.config.tick_length_ms;
        let slack = tick_ms * TICK_SNAP;
        let mut ticks = 0u32;
        while self.accumulated_ms + slack >= tick_ms {
            self.accumulated_ms -= tick_ms;
            on_tick(tick_ms);
            ticks += 1;
        }
        if self.accumulated_ms < 0.0 {
            self.accumulated_ms = 0.0;
        }
        self.tick_count += u64::from(ticks);

        tracing::trace!(
            delta_ms,
            ticks,
            accumulated_ms = self.accumulated_ms,
            "clock update"
        );

        ((delta_ms / 1000.0) as f32).min(MAX_FRAME_DELTA_SECONDS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clock_with_tick(tick_length_ms: f64) -> Clock {
        Clock::new(ClockConfig {
            tick_length_ms,
            ..ClockConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn first_update_initializes_without_ticks() {
        let mut clock = clock_with_tick(10.0);
        let mut ticks = 0;
        let dt = clock.update_with(5_000.0, |_| ticks += 1);
        assert_eq!(dt, 0.0);
        assert_eq!(ticks, 0);
        assert!(clock.is_started());
    }

    #[test]
    fn exact_multiples_tick_once_per_step() {
        let tick = 1000.0 / 60.0;
        let mut clock = clock_with_tick(tick);
        clock.update(0.0);

        let mut total = 0u64;
        for k in 1..=10_000u64 {
            let mut this_frame = 0;
            clock.update_with(k as f64 * tick, |dt| {
                assert_eq!(dt, tick);
                this_frame += 1;
            });
            assert_eq!(this_frame, 1, "step {k} emitted {this_frame} ticks");
            total += this_frame;
            assert!(clock.accumulated_ms() < tick);
            assert!(clock.accumulated_ms().abs() < tick * 1e-6);
        }
        assert_eq!(total, 10_000);
        assert_eq!(clock.tick_count(), 10_000);
    }

    #[test]
    fn accumulator_carries_remainder() {
        let mut clock = clock_with_tick(10.0);
        clock.update(0.0);

        let mut ticks = 0;
        clock.update_with(25.0, |_| ticks += 1);
        assert_eq!(ticks, 2);
        assert!((clock.accumulated_ms() - 5.0).abs() < 1e-9);
        assert!((clock.interpolation_alpha() - 0.5).abs() < 1e-9);

        clock.update_with(30.0, |_| ticks += 1);
        assert_eq!(ticks, 3);
        assert!(clock.accumulated_ms() < 1e-9);
    }

    #[test]
    fn frame_delta_is_clamped() {
        let mut clock = clock_with_tick(10.0);
        clock.update(0.0);
        let mut ticks = 0;
        let dt = clock.update_with(5_000.0, |_| ticks += 1);
        assert_eq!(dt, MAX_FRAME_DELTA_SECONDS);
        // Only the clamped 100 ms reach the accumulator.
        assert_eq!(ticks, 10);
        assert!(clock.accumulated_ms() < 10.0);
    }

    #[test]
    fn pause_suppresses_ticks_and_resume_rebaselines() {
        let mut clock = clock_with_tick(10.0);
        let mut ticks = 0;
        clock.update(0.0);
        clock.update_with(50.0, |_| ticks += 1);
        assert_eq!(ticks, 5);

        clock.pause(80.0);
        assert!(clock.is_paused());
        assert_eq!(clock.update_with(100.0, |_| ticks += 1), 0.0);
        assert_eq!(clock.update_with(900.0, |_| ticks += 1), 0.0);
        assert_eq!(ticks, 5);

        clock.resume(1_080.0);
        assert!(!clock.is_paused());
        assert_eq!(clock.paused_total_ms(), 1_000.0);

        // Only the 30 ms that elapsed before the pause are seen.
        let dt = clock.update_with(1_080.0, |_| ticks += 1);
        assert!((dt - 0.030).abs() < 1e-6);
        assert_eq!(ticks, 8);

        let dt = clock.update_with(1_090.0, |_| ticks += 1);
        assert!((dt - 0.010).abs() < 1e-6);
        assert_eq!(ticks, 9);
    }

    #[test]
    fn pause_before_first_update_keeps_unpaused_time() {
        let mut clock = clock_with_tick(5.0);
        clock.pause(80.0);
        assert_eq!(clock.update(100.0), 0.0);
        assert!(clock.is_started());
        clock.resume(1_080.0);

        let mut ticks = 0;
        let dt = clock.update_with(1_090.0, |_| ticks += 1);
        assert!((dt - 0.010).abs() < 1e-6);
        assert_eq!(ticks, 2);
        assert_eq!(clock.paused_total_ms(), 1_000.0);
    }

    #[test]
    fn pause_keeps_fractional_accumulator() {
        let mut clock = clock_with_tick(10.0);
        clock.update(0.0);
        clock.update(14.0);
        let carried = clock.accumulated_ms();
        assert!((carried - 4.0).abs() < 1e-9);

        clock.pause(14.0);
        clock.update(500.0);
        assert_eq!(clock.accumulated_ms(), carried);
        clock.resume(500.0);

        let mut ticks = 0;
        clock.update_with(506.0, |_| ticks += 1);
        assert_eq!(ticks, 1);
    }

    #[test]
    fn pause_and_resume_are_idempotent() {
        let mut clock = clock_with_tick(10.0);
        clock.update(0.0);
        clock.pause(10.0);
        clock.pause(20.0);
        clock.resume(30.0);
        clock.resume(40.0);
        assert_eq!(clock.paused_total_ms(), 20.0);
    }

    #[test]
    fn time_scale_slows_simulation() {
        let mut clock = clock_with_tick(10.0);
        clock.set_time_scale(0.5).unwrap();
        clock.update(0.0);
        let mut ticks = 0;
        let dt = clock.update_with(40.0, |_| ticks += 1);
        assert_eq!(ticks, 2);
        assert!((dt - 0.020).abs() < 1e-6);

        clock.set_time_scale(0.0).unwrap();
        clock.update_with(90.0, |_| ticks += 1);
        assert_eq!(ticks, 2);
    }

    #[test]
    fn rejects_invalid_configuration() {
        assert_eq!(
            Clock::new(ClockConfig {
                tick_length_ms: 0.0,
                ..ClockConfig::default()
            })
            .unwrap_err(),
            KernelError::InvalidTickLength(0.0)
        );
        let mut clock = clock_with_tick(10.0);
        assert!(clock.set_time_scale(-1.0).is_err());
        assert!(clock.set_time_scale(f64::NAN).is_err());
        assert_eq!(clock.time_scale(), 1.0);
    }

    #[test]
    fn backwards_time_emits_nothing() {
        let mut clock = clock_with_tick(10.0);
        clock.update(100.0);
        let mut ticks = 0;
        assert_eq!(clock.update_with(50.0, |_| ticks += 1), 0.0);
        assert_eq!(ticks, 0);
        assert_eq!(clock.update_with(f64::NAN, |_| ticks += 1), 0.0);
    }

    #[test]
    fn reset_requires_new_bootstrap() {
        let mut clock = clock_with_tick(10.0);
        clock.update(0.0);
        clock.update(35.0);
        clock.reset();
        assert!(!clock.is_started());
        assert_eq!(clock.tick_count(), 0);
        assert_eq!(clock.update(1_000.0), 0.0);
    }

    #[test]
    fn tick_rate_constructor() {
        let config = ClockConfig::with_tick_rate(50.0);
        assert_eq!(config.tick_length_ms, 20.0);
        assert!(config.validate().is_ok());
    }
}
