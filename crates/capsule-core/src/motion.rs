//! Orientation smoothing for camera framing.
//!
//! Raw device-orientation samples arrive at sensor rate (~60 Hz) and
//! are noisy. The smoother calibrates against the first sample of a
//! session (so whatever way the viewer holds the device becomes the
//! neutral pose), subtracts that offset from every later sample, and
//! exponentially smooths the result toward a damped target.

use serde::{Deserialize, Serialize};

/// Raw orientation angles, in degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OrientationSample {
    pub beta: f64,
    pub gamma: f64,
}

impl OrientationSample {
    pub const ZERO: Self = Self {
        beta: 0.0,
        gamma: 0.0,
    };
}

/// Smoothing parameters. `alpha` is the lerp factor per sample,
/// `damping` scales the corrected sample before smoothing. The settle
/// profile (used once the capsule is opening) is tighter and slower so
/// the camera visually comes to rest.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmoothingProfile {
    pub alpha: f64,
    pub damping: f64,
}

/// Per-session orientation smoother.
///
/// One instance per `RevealSession`; never shared, so sessions cannot
/// interfere with each other's calibration.
#[derive(Debug, Clone)]
pub struct MotionSmoother {
    offset: Option<OrientationSample>,
    smoothed: OrientationSample,
    profile: SmoothingProfile,
}

impl MotionSmoother {
    pub fn new(profile: SmoothingProfile) -> Self {
        Self {
            offset: None,
            smoothed: OrientationSample::ZERO,
            profile,
        }
    }

    pub fn is_calibrated(&self) -> bool {
        self.offset.is_some()
    }

    /// Switch smoothing parameters; applied from the next sample on.
    pub fn set_profile(&mut self, profile: SmoothingProfile) {
        self.profile = profile;
    }

    /// Capture the zero offset. Idempotent: only the first call takes
    /// effect, since sensor delivery can race session setup.
    pub fn calibrate(&mut self, sample: OrientationSample) {
        if self.offset.is_none() {
            self.offset = Some(sample);
        }
    }

    /// Offset-corrected sample, before damping. None until calibrated.
    pub fn target_for(&self, sample: OrientationSample) -> Option<OrientationSample> {
        self.offset.map(|offset| OrientationSample {
            beta: sample.beta - offset.beta,
            gamma: sample.gamma - offset.gamma,
        })
    }

    /// Feed one sample and get the smoothed orientation.
    ///
    /// The first sample an uncalibrated smoother sees calibrates it
    /// and yields the zero orientation.
    pub fn update(&mut self, sample: OrientationSample) -> OrientationSample {
        let Some(corrected) = self.target_for(sample) else {
            self.calibrate(sample);
            self.smoothed = OrientationSample::ZERO;
            return self.smoothed;
        };
        let target = OrientationSample {
            beta: corrected.beta * self.profile.damping,
            gamma: corrected.gamma * self.profile.damping,
        };
        self.smoothed = OrientationSample {
            beta: lerp(self.smoothed.beta, target.beta, self.profile.alpha),
            gamma: lerp(self.smoothed.gamma, target.gamma, self.profile.alpha),
        };
        self.smoothed
    }

    pub fn orientation(&self) -> OrientationSample {
        self.smoothed
    }
}

fn lerp(from: f64, to: f64, t: f64) -> f64 {
    from + (to - from) * t
}
