//! The proximity monitor: nearest signal, tier, and speak decision.

use std::time::{Duration, Instant};

use safecross_core::{config::ProximityConfig, Position, SignalLocation, Utterance};
use serde::Serialize;

use crate::geo::{bearing_degrees, haversine_distance, Direction};
use crate::policy::{LastSpokenAlert, SpeakDecision, SpeakPolicy, SpeechGuard};
use crate::tier::ProximityTier;

/// The closest signal to a position.
#[derive(Debug, Clone, Copy)]
pub struct NearestSignal<'a> {
    pub signal: &'a SignalLocation,
    pub distance_m: f64,
}

/// Pick the signal with the smallest great-circle distance. Ties go to the
/// earliest entry.
pub fn nearest_signal(position: Position, signals: &[SignalLocation]) -> Option<NearestSignal<'_>> {
    let mut best: Option<NearestSignal<'_>> = None;
    for signal in signals {
        let distance_m = haversine_distance(position, signal.position());
        match best {
            Some(current) if distance_m >= current.distance_m => {}
            _ => best = Some(NearestSignal { signal, distance_m }),
        }
    }
    best
}

/// What the pedestrian is told about the nearest signal.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertState {
    pub signal_id: u32,
    pub signal_name: String,
    /// Rounded to the nearest meter.
    pub distance_m: u32,
    pub direction: Direction,
    pub tier: ProximityTier,
}

impl AlertState {
    /// Whether `self` should replace `previous`.
    pub fn differs_significantly(&self, previous: &AlertState, threshold_m: u32) -> bool {
        self.signal_name != previous.signal_name
            || self.distance_m.abs_diff(previous.distance_m) > threshold_m
            || self.tier != previous.tier
    }

    /// `"<name> at <distance> meters <direction>"`, prefixed when urgent.
    pub fn utterance_text(&self, urgent_prefix: &str) -> String {
        let prefix = if self.tier.is_urgent() { urgent_prefix } else { "" };
        format!(
            "{}{} at {} meters {}",
            prefix, self.signal_name, self.distance_m, self.direction
        )
    }
}

/// Result of one evaluation tick.
#[derive(Debug, Clone, Serialize)]
pub struct Evaluation {
    /// Alert currently held by the monitor.
    pub alert: Option<AlertState>,
    /// The held alert was replaced during this tick.
    pub alert_changed: bool,
    pub decision: SpeakDecision,
    pub utterance: Option<Utterance>,
    /// No device position was available and the default was used.
    pub location_unavailable: bool,
    pub position: Position,
}

impl Evaluation {
    pub fn should_speak(&self) -> bool {
        self.utterance.is_some()
    }
}

/// Owns the signal list and all state carried between evaluations.
#[derive(Debug, Clone)]
pub struct ProximityMonitor {
    config: ProximityConfig,
    signals: Vec<SignalLocation>,
    policy: SpeakPolicy,
    current: Option<AlertState>,
    last_spoken: Option<LastSpokenAlert>,
    guard: SpeechGuard,
}

impl ProximityMonitor {
    pub fn new(config: ProximityConfig, signals: Vec<SignalLocation>) -> Self {
        let policy = SpeakPolicy::new(config.cadence, Duration::from_millis(config.throttle_ms));
        Self {
            config,
            signals,
            policy,
            current: None,
            last_spoken: None,
            guard: SpeechGuard::default(),
        }
    }

    pub fn config(&self) -> &ProximityConfig {
        &self.config
    }

    pub fn signals(&self) -> &[SignalLocation] {
        &self.signals
    }

    pub fn current_alert(&self) -> Option<&AlertState> {
        self.current.as_ref()
    }

    pub fn last_spoken(&self) -> Option<&LastSpokenAlert> {
        self.last_spoken.as_ref()
    }

    pub fn is_speaking(&self) -> bool {
        self.guard.in_flight()
    }

    /// Resolve a possibly missing or invalid fix to a usable position.
    /// The flag is set when the default position was substituted.
    pub fn resolve_position(&self, position: Option<Position>) -> (Position, bool) {
        match position {
            Some(p) if p.is_valid() => (p, false),
            _ => (self.config.default_position, true),
        }
    }

    /// Compute the alert for a position without touching any state.
    pub fn assess(&self, position: Position) -> Option<AlertState> {
        let nearest = nearest_signal(position, &self.signals)?;
        let bearing = bearing_degrees(position, nearest.signal.position());

        Some(AlertState {
            signal_id: nearest.signal.id,
            signal_name: nearest.signal.name.clone(),
            distance_m: nearest.distance_m.round() as u32,
            direction: Direction::from_bearing(bearing),
            tier: ProximityTier::classify(nearest.distance_m, &self.config.tiers),
        })
    }

    /// Build the utterance for an alert using the tier's delivery.
    pub fn utterance_for(&self, alert: &AlertState) -> Utterance {
        let urgent = alert.tier.is_urgent();
        let delivery = if urgent {
            self.config.urgent_delivery
        } else {
            self.config.normal_delivery
        };
        Utterance {
            text: alert.utterance_text(&self.config.urgent_prefix),
            urgent,
            speaking_rate: delivery.speaking_rate,
            pitch: delivery.pitch,
        }
    }

    /// Evaluate the latest position.
    ///
    /// When the result carries an utterance the monitor considers it in
    /// flight until [`ProximityMonitor::utterance_finished`] is called.
    pub fn evaluate(&mut self, position: Option<Position>, now: Instant) -> Evaluation {
        let (position, location_unavailable) = self.resolve_position(position);
        if location_unavailable {
            tracing::debug!(
                lat = position.lat,
                lng = position.lng,
                "Location unavailable, using default position"
            );
        }

        let Some(fresh) = self.assess(position) else {
            return Evaluation {
                alert: None,
                alert_changed: false,
                decision: SpeakDecision::NoSignal,
                utterance: None,
                location_unavailable,
                position,
            };
        };

        let alert_changed = match &self.current {
            Some(previous) => fresh.differs_significantly(previous, self.config.significant_change_m),
            None => true,
        };
        if alert_changed {
            tracing::debug!(
                signal = %fresh.signal_name,
                distance_m = fresh.distance_m,
                direction = %fresh.direction,
                tier = %fresh.tier,
                "Alert state updated"
            );
            self.current = Some(fresh.clone());
        }

        let decision = self.policy.decide(
            fresh.tier,
            fresh.distance_m,
            self.last_spoken.as_ref(),
            &self.guard,
            now,
        );

        let utterance = if decision.is_speak() {
            let utterance = self.utterance_for(&fresh);
            self.guard.begin(now);
            self.last_spoken = Some(LastSpokenAlert {
                text: utterance.text.clone(),
                distance_m: fresh.distance_m,
            });
            metrics::counter!("proximity_utterances_total", "tier" => fresh.tier.label())
                .increment(1);
            tracing::info!(text = %utterance.text, urgent = utterance.urgent, "Announcing signal");
            Some(utterance)
        } else {
            None
        };

        Evaluation {
            alert: self.current.clone(),
            alert_changed,
            decision,
            utterance,
            location_unavailable,
            position,
        }
    }

    /// The speaker finished (or failed) the in-flight utterance.
    pub fn utterance_finished(&mut self) {
        self.guard.finish();
    }
}
