use std::f32::consts::PI;

use crate::{
    animation::{ease::Ease, idle::IdleSpin},
    foundation::{
        core::Vec3,
        error::{BackdropError, BackdropResult},
        math::Rng64,
    },
};

#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Bounds the placeholder field is drawn from.
pub struct FallbackOptions {
    /// Number of bodies.
    pub count: usize,
    /// Bodies are placed uniformly in `[-half_extent, half_extent]` per axis.
    pub half_extent: Vec3,
    pub scale_range: [f32; 2],
    pub opacity_range: [f32; 2],
    /// Idle swing per axis is drawn from `[-max_swing, max_swing]` radians.
    pub max_swing: f32,
    pub duration_range_secs: [f32; 2],
    pub max_delay_secs: f32,
    /// Body radius before scaling.
    pub radius: f32,
    /// Body color as `0xRRGGBB`.
    pub color: u32,
    /// Fixed layout seed; `None` draws a fresh layout per mount.
    pub seed: Option<u64>,
}

impl Default for FallbackOptions {
    fn default() -> Self {
        Self {
            count: 28,
            half_extent: Vec3::new(30.0, 20.0, 50.0),
            scale_range: [0.6, 1.8],
            opacity_range: [0.06, 0.31],
            max_swing: 1.0,
            duration_range_secs: [8.0, 14.0],
            max_delay_secs: 2.0,
            radius: 1.5,
            color: 0x7dd3fc,
            seed: None,
        }
    }
}

impl FallbackOptions {
    pub fn validate(&self) -> BackdropResult<()> {
        let ranges = [
            ("scale_range", self.scale_range),
            ("opacity_range", self.opacity_range),
            ("duration_range_secs", self.duration_range_secs),
        ];
        for (name, [lo, hi]) in ranges {
            if !lo.is_finite() || !hi.is_finite() || lo < 0.0 || hi < lo {
                return Err(BackdropError::validation(format!(
                    "fallback {name} must be finite, non-negative and ordered"
                )));
            }
        }
        if self.opacity_range[1] > 1.0 {
            return Err(BackdropError::validation(
                "fallback opacity_range must stay within [0, 1]",
            ));
        }
        if !self.half_extent.is_finite() || self.half_extent.min_element() < 0.0 {
            return Err(BackdropError::validation(
                "fallback half_extent must be finite and >= 0",
            ));
        }
        for (name, v) in [
            ("max_swing", self.max_swing),
            ("max_delay_secs", self.max_delay_secs),
            ("radius", self.radius),
        ] {
            if !v.is_finite() || v < 0.0 {
                return Err(BackdropError::validation(format!(
                    "fallback {name} must be finite and >= 0"
                )));
            }
        }
        if self.color > 0xff_ffff {
            return Err(BackdropError::validation(
                "fallback color must be a 0xRRGGBB value",
            ));
        }
        Ok(())
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// One placeholder body.
pub struct PlaceholderBody {
    pub position: Vec3,
    /// Base Euler rotation (XYZ, radians).
    pub rotation: Vec3,
    pub scale: f32,
    pub opacity: f32,
    /// Idle swing; absent under reduced motion.
    pub idle: Option<IdleSpin>,
}

impl PlaceholderBody {
    /// Euler rotation at `t_secs` after population.
    pub fn rotation_at(&self, t_secs: f64) -> Vec3 {
        match &self.idle {
            Some(spin) => self.rotation + spin.offset_at(t_secs),
            None => self.rotation,
        }
    }
}

#[derive(Clone, Debug, PartialEq, serde::Serialize)]
/// Procedural stand-in shown when no model resolves in time.
pub struct FallbackField {
    pub bodies: Vec<PlaceholderBody>,
    pub radius: f32,
    pub color: u32,
    /// Seed the layout was drawn from.
    pub seed: u64,
}

impl FallbackField {
    /// Draw a field from `opts`. The same seed and options always give the same field.
    pub fn populate(opts: &FallbackOptions, seed: u64, reduced_motion: bool) -> Self {
        let mut rng = Rng64::new(seed);
        let bodies = (0..opts.count)
            .map(|_| {
                let position = Vec3::new(
                    rng.centered_f32(opts.half_extent.x),
                    rng.centered_f32(opts.half_extent.y),
                    rng.centered_f32(opts.half_extent.z),
                );
                let scale = rng.range_f32(opts.scale_range[0], opts.scale_range[1]);
                let opacity = rng.range_f32(opts.opacity_range[0], opts.opacity_range[1]);
                let rotation = Vec3::new(
                    rng.range_f32(0.0, PI),
                    rng.range_f32(0.0, PI),
                    rng.range_f32(0.0, PI),
                );
                // Drawn even under reduced motion so both layouts match for a seed.
                let idle = IdleSpin {
                    delay_secs: rng.range_f32(0.0, opts.max_delay_secs),
                    delta: Vec3::new(
                        rng.centered_f32(opts.max_swing),
                        rng.centered_f32(opts.max_swing),
                        rng.centered_f32(opts.max_swing),
                    ),
                    duration_secs: rng
                        .range_f32(opts.duration_range_secs[0], opts.duration_range_secs[1]),
                    ease: Ease::InOutSine,
                };
                PlaceholderBody {
                    position,
                    rotation,
                    scale,
                    opacity,
                    idle: (!reduced_motion).then_some(idle),
                }
            })
            .collect();

        Self {
            bodies,
            radius: opts.radius,
            color: opts.color,
            seed,
        }
    }

    pub fn len(&self) -> usize {
        self.bodies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bodies.is_empty()
    }

    /// Whether any body moves over time.
    pub fn is_animated(&self) -> bool {
        self.bodies.iter().any(|b| b.idle.is_some())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/resolver/fallback.rs"]
mod tests;
