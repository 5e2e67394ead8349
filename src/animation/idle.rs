use crate::{animation::ease::Ease, foundation::core::Vec3};

/// Slow back-and-forth rotation of a placeholder body.
///
/// After `delay_secs` the offset eases from zero to `delta` over `duration_secs`, then back,
/// forever.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct IdleSpin {
    /// Euler offset (radians) at the far end of a swing.
    pub delta: Vec3,
    /// Length of one leg of the swing.
    pub duration_secs: f32,
    pub delay_secs: f32,
    pub ease: Ease,
}

impl IdleSpin {
    pub fn offset_at(&self, t_secs: f64) -> Vec3 {
        let local = t_secs - f64::from(self.delay_secs);
        let leg_len = f64::from(self.duration_secs);
        if !(local > 0.0 && leg_len > 0.0) {
            return Vec3::ZERO;
        }
        let cycle = local / leg_len;
        let leg = cycle.floor();
        let frac = cycle - leg;
        let u = if (leg as u64) % 2 == 0 { frac } else { 1.0 - frac };
        self.delta * self.ease.apply(u) as f32
    }
}
