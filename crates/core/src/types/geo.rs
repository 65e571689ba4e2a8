use serde::{Deserialize, Serialize};

/// A point on the globe in decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub lat: f64,
    pub lng: f64,
}

impl Position {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both coordinates are finite and within their valid ranges.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// A traffic-signal location the pedestrian should be warned about.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalLocation {
    /// Stable identifier.
    pub id: u32,
    /// Latitude in degrees.
    pub lat: f64,
    /// Longitude in degrees.
    pub lng: f64,
    /// Name spoken in alerts.
    pub name: String,
}

impl SignalLocation {
    pub fn new(id: u32, lat: f64, lng: f64, name: impl Into<String>) -> Self {
        Self {
            id,
            lat,
            lng,
            name: name.into(),
        }
    }

    pub fn position(&self) -> Position {
        Position::new(self.lat, self.lng)
    }
}
