//! Anti-spam rules deciding when an alert is spoken.

use std::time::{Duration, Instant};

use safecross_core::config::SpeakCadence;
use serde::Serialize;

use crate::tier::ProximityTier;

/// The last utterance and the rounded distance it announced.
#[derive(Debug, Clone, PartialEq)]
pub struct LastSpokenAlert {
    pub text: String,
    pub distance_m: u32,
}

/// Outcome of the speak decision for one evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SpeakDecision {
    Speak,
    /// Same rounded distance as the last utterance.
    Unchanged,
    /// Distance is not on the tier's announcement cadence.
    OffCadence,
    /// A previous utterance is still being spoken.
    InFlight,
    /// Too soon after the previous utterance.
    Throttled,
    /// Nothing to announce.
    NoSignal,
}

impl SpeakDecision {
    pub fn is_speak(&self) -> bool {
        matches!(self, SpeakDecision::Speak)
    }
}

/// Re-entrancy guard: one utterance in flight, and a minimum gap between
/// utterances.
#[derive(Debug, Clone, Default)]
pub struct SpeechGuard {
    in_flight: bool,
    last_started: Option<Instant>,
}

impl SpeechGuard {
    pub fn in_flight(&self) -> bool {
        self.in_flight
    }

    pub fn last_started(&self) -> Option<Instant> {
        self.last_started
    }

    /// Why a new utterance may not start now, if anything.
    pub fn check(&self, now: Instant, throttle: Duration) -> Option<SpeakDecision> {
        if self.in_flight {
            return Some(SpeakDecision::InFlight);
        }
        match self.last_started {
            Some(started) if now.saturating_duration_since(started) < throttle => {
                Some(SpeakDecision::Throttled)
            }
            _ => None,
        }
    }

    pub fn begin(&mut self, now: Instant) {
        self.in_flight = true;
        self.last_started = Some(now);
    }

    pub fn finish(&mut self) {
        self.in_flight = false;
    }
}

/// Tier cadence plus throttle.
#[derive(Debug, Clone)]
pub struct SpeakPolicy {
    cadence: SpeakCadence,
    throttle: Duration,
}

impl SpeakPolicy {
    pub fn new(cadence: SpeakCadence, throttle: Duration) -> Self {
        Self { cadence, throttle }
    }

    pub fn throttle(&self) -> Duration {
        self.throttle
    }

    /// Whether the alert deserves an announcement, ignoring the guard.
    ///
    /// The first alert is always announced and very-near alerts always
    /// interrupt. Otherwise the rounded distance must have moved since the
    /// last utterance and land on the tier's cadence.
    pub fn announcement(
        &self,
        tier: ProximityTier,
        distance_m: u32,
        last: Option<&LastSpokenAlert>,
    ) -> SpeakDecision {
        let Some(last) = last else {
            return SpeakDecision::Speak;
        };
        if tier.is_urgent() {
            return SpeakDecision::Speak;
        }
        if last.distance_m == distance_m {
            return SpeakDecision::Unchanged;
        }

        let every = match tier {
            ProximityTier::VeryNear => 1,
            ProximityTier::Near => self.cadence.near_every_m,
            ProximityTier::Approaching => self.cadence.approaching_every_m,
            ProximityTier::Distant => self.cadence.distant_every_m,
        };
        if is_multiple(distance_m, every) {
            SpeakDecision::Speak
        } else {
            SpeakDecision::OffCadence
        }
    }

    /// Full decision: announcement rules gated by the speech guard.
    pub fn decide(
        &self,
        tier: ProximityTier,
        distance_m: u32,
        last: Option<&LastSpokenAlert>,
        guard: &SpeechGuard,
        now: Instant,
    ) -> SpeakDecision {
        match self.announcement(tier, distance_m, last) {
            SpeakDecision::Speak => guard.check(now, self.throttle).unwrap_or(SpeakDecision::Speak),
            other => other,
        }
    }
}

impl Default for SpeakPolicy {
    fn default() -> Self {
        Self::new(SpeakCadence::default(), Duration::from_secs(2))
    }
}

// A zero cadence announces every change.
fn is_multiple(distance_m: u32, every: u32) -> bool {
    every == 0 || distance_m % every == 0
}
