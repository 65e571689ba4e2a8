#![deny(unused)]
//! Proximity monitoring and progressive voice alerts for SafeCross.
//!
//! The [`ProximityMonitor`] is a pure state machine fed with positions; the
//! [`MonitorRuntime`] drives it on a timer and dispatches utterances to a
//! [`safecross_core::Speaker`].

pub mod geo;
pub mod monitor;
pub mod policy;
pub mod runtime;
pub mod speaker;
pub mod tier;

pub use geo::{bearing_degrees, haversine_distance, Direction, EARTH_RADIUS_M};
pub use monitor::{nearest_signal, AlertState, Evaluation, NearestSignal, ProximityMonitor};
pub use policy::{LastSpokenAlert, SpeakDecision, SpeakPolicy, SpeechGuard};
pub use runtime::MonitorRuntime;
pub use speaker::{GatewaySynthesizer, LogSpeaker, SynthesizingSpeaker};
pub use tier::ProximityTier;
