//! Great-circle distance and relative bearing.

use safecross_core::Position;
use serde::{Deserialize, Serialize};

/// Mean Earth radius in meters.
pub const EARTH_RADIUS_M: f64 = 6_371_000.0;

/// Haversine distance between two positions, in meters.
pub fn haversine_distance(from: Position, to: Position) -> f64 {
    let phi1 = from.lat.to_radians();
    let phi2 = to.lat.to_radians();
    let d_phi = (to.lat - from.lat).to_radians();
    let d_lambda = (to.lng - from.lng).to_radians();

    let a = (d_phi / 2.0).sin().powi(2) + phi1.cos() * phi2.cos() * (d_lambda / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_M * c
}

/// Angle from `from` to `to` as `atan2(Δlng, Δlat)` in degrees.
///
/// 0° points north, 90° east, ±180° south. Result lies in [-180, 180].
pub fn bearing_degrees(from: Position, to: Position) -> f64 {
    (to.lng - from.lng).atan2(to.lat - from.lat).to_degrees()
}

/// Relative direction of a signal, in eight 45° sectors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Direction {
    Ahead,
    AheadRight,
    Right,
    BehindRight,
    Behind,
    BehindLeft,
    Left,
    AheadLeft,
}

impl Direction {
    /// Sectors in clockwise order starting at `Ahead`.
    pub const ALL: [Direction; 8] = [
        Direction::Ahead,
        Direction::AheadRight,
        Direction::Right,
        Direction::BehindRight,
        Direction::Behind,
        Direction::BehindLeft,
        Direction::Left,
        Direction::AheadLeft,
    ];

    /// Bucket an angle in degrees into a sector.
    ///
    /// Sectors are centred on multiples of 45° and include their upper
    /// bound: `Ahead` covers (-22.5, 22.5], `AheadRight` (22.5, 67.5], and so
    /// on. Any finite angle is accepted; non-finite input yields `Ahead`.
    pub fn from_bearing(degrees: f64) -> Self {
        if !degrees.is_finite() {
            return Direction::Ahead;
        }
        let sector = ((degrees - 22.5) / 45.0).ceil() as i64;
        Self::ALL[sector.rem_euclid(8) as usize]
    }

    /// Phrase used in utterances.
    pub fn label(&self) -> &'static str {
        match self {
            Direction::Ahead => "ahead",
            Direction::AheadRight => "ahead-right",
            Direction::Right => "right",
            Direction::BehindRight => "behind-right",
            Direction::Behind => "behind",
            Direction::BehindLeft => "behind-left",
            Direction::Left => "left",
            Direction::AheadLeft => "ahead-left",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
