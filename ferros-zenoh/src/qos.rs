//! QoS profile mapping onto Zenoh primitives.
//!
//! Following rmw_zenoh: reliability rides on the transport configuration,
//! `KeepAll` + `Reliable` publishers block on congestion instead of
//! dropping, and `TransientLocal` maps to the advanced publisher cache /
//! subscriber history query. Zenoh itself has no notion of incompatible
//! QoS; matching is purely key-expression based, which is why the endpoint
//! registry performs the request-vs-offer check before an endpoint ever
//! reaches this layer.

use ferros_core::qos::{DurabilityPolicy, HistoryPolicy, Profile, ReliabilityPolicy};
use zenoh::qos::CongestionControl;

/// Queue depth used when a profile leaves the depth at 0, per the
/// rmw_zenoh specification.
pub const DEFAULT_DEPTH: usize = 42;

/// QoS mapping utilities.
pub struct QosMapping;

impl QosMapping {
    /// The sample queue / cache depth for a profile.
    ///
    /// `KeepAll` has no bound of its own; it is clamped to the rmw_zenoh
    /// default so the channel stays bounded, with congestion control
    /// providing the back-pressure.
    pub fn effective_depth(profile: &Profile) -> usize {
        match profile.history {
            HistoryPolicy::KeepAll => DEFAULT_DEPTH,
            _ if profile.depth == 0 => DEFAULT_DEPTH,
            _ => profile.depth,
        }
    }

    /// True when the profile asks for transient-local durability.
    pub fn is_transient_local(profile: &Profile) -> bool {
        matches!(profile.durability, DurabilityPolicy::TransientLocal)
    }

    /// True when the profile asks for reliable delivery (or leaves it to
    /// the system default, which rmw_zenoh treats as reliable).
    pub fn is_reliable(profile: &Profile) -> bool {
        matches!(
            profile.reliability,
            ReliabilityPolicy::Reliable | ReliabilityPolicy::SystemDefault
        )
    }

    /// Congestion control for a publisher: `Block` only for reliable
    /// `KeepAll` publishers, `Drop` otherwise.
    pub fn congestion_control(profile: &Profile) -> CongestionControl {
        if matches!(profile.history, HistoryPolicy::KeepAll) && Self::is_reliable(profile) {
            CongestionControl::Block
        } else {
            CongestionControl::Drop
        }
    }

    /// Cache / history depth for transient-local endpoints, 0 otherwise.
    pub fn replay_depth(profile: &Profile) -> usize {
        if Self::is_transient_local(profile) {
            Self::effective_depth(profile)
        } else {
            0
        }
    }

    /// Warn about profile settings this adapter cannot honor.
    pub fn warn_unsupported(profile: &Profile) {
        use ferros_core::qos::LivelinessPolicy;

        if matches!(profile.liveliness, LivelinessPolicy::ManualByTopic) {
            tracing::warn!("ManualByTopic liveliness is not supported over Zenoh, using Automatic");
        }
        if !profile.deadline.is_zero() {
            tracing::warn!("deadline QoS is not enforced over Zenoh, ignoring");
        }
        if !profile.lifespan.is_zero() {
            tracing::warn!("lifespan QoS is not enforced over Zenoh, ignoring");
        }
    }
}
