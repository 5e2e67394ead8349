//! Time and scroll driven motion.

/// Scroll-keyframed camera path.
pub mod camera;
/// Easing curves.
pub mod ease;
/// Idle swing of placeholder bodies.
pub mod idle;
