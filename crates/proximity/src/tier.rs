use safecross_core::config::TierThresholds;
use serde::{Deserialize, Serialize};

/// Discrete proximity classification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProximityTier {
    Distant,
    Approaching,
    Near,
    VeryNear,
}

impl ProximityTier {
    /// Classify a distance in meters. Thresholds are strict upper bounds, so
    /// a distance exactly on a boundary falls into the looser tier.
    pub fn classify(distance_m: f64, thresholds: &TierThresholds) -> Self {
        if distance_m < thresholds.very_near_m {
            ProximityTier::VeryNear
        } else if distance_m < thresholds.near_m {
            ProximityTier::Near
        } else if distance_m < thresholds.approaching_m {
            ProximityTier::Approaching
        } else {
            ProximityTier::Distant
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ProximityTier::Distant => "distant",
            ProximityTier::Approaching => "approaching",
            ProximityTier::Near => "near",
            ProximityTier::VeryNear => "very-near",
        }
    }

    pub fn is_urgent(&self) -> bool {
        matches!(self, ProximityTier::VeryNear)
    }
}

impl std::fmt::Display for ProximityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}
