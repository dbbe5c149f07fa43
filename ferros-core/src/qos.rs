//! Quality of Service (QoS) policies and profiles.
//!
//! The enumerated policy effects are the usual ROS2 ones: `Reliable`
//! retransmits until acknowledged, `BestEffort` drops on loss, `Volatile`
//! replays no history, and `TransientLocal` replays the last `depth` samples
//! to late-joining subscribers.

use std::{fmt, time::Duration};

/// QoS history policy - how samples are stored.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum HistoryPolicy {
    /// Implementation default for history policy.
    SystemDefault,

    /// Only store up to `depth` samples, dropping the oldest once exceeded.
    KeepLast,

    /// Store all samples, subject to resource limits.
    KeepAll,
}

/// QoS reliability policy - how messages are delivered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReliabilityPolicy {
    /// Implementation specific default.
    SystemDefault,

    /// Guarantee delivery, retransmitting until acknowledged.
    Reliable,

    /// Attempt delivery once; samples may be lost on a lossy network.
    BestEffort,
}

/// QoS durability policy - how samples persist for late joiners.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DurabilityPolicy {
    /// Implementation specific default.
    SystemDefault,

    /// The publisher keeps the last `depth` samples for late-joining
    /// subscribers.
    TransientLocal,

    /// Samples are not persistent.
    Volatile,
}

/// QoS liveliness policy - how a publisher reports its alive status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LivelinessPolicy {
    /// Implementation specific default.
    SystemDefault,

    /// Liveliness is asserted by the middleware layer.
    Automatic,

    /// Liveliness is asserted by publishing or an explicit application
    /// signal on the topic.
    ManualByTopic,
}

/// The QoS policy dimensions that participate in compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QosPolicyKind {
    /// Reliability request/offer dimension.
    Reliability,
    /// Durability request/offer dimension.
    Durability,
}

impl fmt::Display for QosPolicyKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Reliability => write!(f, "reliability"),
            Self::Durability => write!(f, "durability"),
        }
    }
}

/// A QoS profile attached to one endpoint.
#[derive(Debug, Clone)]
pub struct Profile {
    /// History retention mode.
    pub history: HistoryPolicy,

    /// Queue depth for `KeepLast` history.
    pub depth: usize,

    /// Reliability policy.
    pub reliability: ReliabilityPolicy,

    /// Durability policy.
    pub durability: DurabilityPolicy,

    /// Expected period between messages. Zero means unspecified.
    pub deadline: Duration,

    /// Age at which messages expire. Zero means unspecified.
    pub lifespan: Duration,

    /// Liveliness policy.
    pub liveliness: LivelinessPolicy,

    /// Lease within which liveliness must be asserted. Zero means
    /// unspecified.
    pub liveliness_lease_duration: Duration,
}

impl Default for Profile {
    /// Default QoS profile: keep last 10, reliable, volatile.
    fn default() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 10,
            reliability: ReliabilityPolicy::Reliable,
            durability: DurabilityPolicy::Volatile,
            deadline: Duration::ZERO,
            lifespan: Duration::ZERO,
            liveliness: LivelinessPolicy::SystemDefault,
            liveliness_lease_duration: Duration::ZERO,
        }
    }
}

impl Profile {
    /// Services QoS profile: keep last 10, reliable, volatile.
    pub fn services_default() -> Self {
        Self::default()
    }

    /// Sensor data QoS profile: keep last 5, best effort, volatile.
    pub const fn sensor_data() -> Self {
        Self {
            history: HistoryPolicy::KeepLast,
            depth: 5,
            reliability: ReliabilityPolicy::BestEffort,
            durability: DurabilityPolicy::Volatile,
            deadline: Duration::ZERO,
            lifespan: Duration::ZERO,
            liveliness: LivelinessPolicy::SystemDefault,
            liveliness_lease_duration: Duration::ZERO,
        }
    }

    /// Transient-local variant of the default profile, for latched topics.
    pub fn transient_local(depth: usize) -> Self {
        Self {
            durability: DurabilityPolicy::TransientLocal,
            depth,
            ..Default::default()
        }
    }

    /// Check a subscriber request (`self`) against a publisher offer.
    ///
    /// Follows the request-vs-offer convention: an offer satisfies a request
    /// when it is at least as strong on every checked dimension. Returns the
    /// first violated policy, or `None` when the pairing is compatible.
    ///
    /// `SystemDefault` on either side is treated as the weaker setting, so it
    /// never causes a rejection.
    pub fn incompatibility_with_offer(&self, offered: &Profile) -> Option<QosPolicyKind> {
        if self.reliability == ReliabilityPolicy::Reliable
            && offered.reliability == ReliabilityPolicy::BestEffort
        {
            return Some(QosPolicyKind::Reliability);
        }

        if self.durability == DurabilityPolicy::TransientLocal
            && matches!(
                offered.durability,
                DurabilityPolicy::Volatile | DurabilityPolicy::SystemDefault
            )
        {
            return Some(QosPolicyKind::Durability);
        }

        None
    }

    /// True when a subscriber with this profile can match a publisher
    /// offering `offered`.
    pub fn is_compatible_with_offer(&self, offered: &Profile) -> bool {
        self.incompatibility_with_offer(offered).is_none()
    }
}
