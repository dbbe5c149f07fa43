//! Middleware implementation selection.
//!
//! The runtime resolves the middleware once at startup and injects the
//! matching transport context. The native implementation is Zenoh
//! (`rmw_zenoh_cpp`-compatible); selecting any other RMW name is a
//! deterministic initialization error, mirroring what happens when the
//! corresponding shared library is absent from a process.

use ferros_core::{config::RMW_IMPLEMENTATION, error::Error};
use std::{env, fmt, str::FromStr, sync::Arc};

/// A loadable middleware implementation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Middleware {
    /// The native Zenoh transport (`rmw_zenoh_cpp`-compatible).
    Zenoh,
}

impl Middleware {
    /// RMW names accepted for the Zenoh transport.
    pub const ZENOH_NAMES: &'static [&'static str] = &["rmw_zenoh_cpp", "zenoh"];

    /// Resolve the middleware from an explicit name, falling back to
    /// `RMW_IMPLEMENTATION`, then to the native default.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] for a name with no loadable
    /// implementation.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, Error> {
        match explicit {
            Some(name) => name.parse(),
            None => match env::var(RMW_IMPLEMENTATION) {
                Ok(name) if !name.is_empty() => name.parse(),
                _ => Ok(Self::Zenoh),
            },
        }
    }

    /// Open a session for this middleware.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Initialization`] when the session cannot be
    /// brought up.
    pub fn open(self) -> Result<Arc<ferros_zenoh::Context>, Error> {
        match self {
            Self::Zenoh => ferros_zenoh::Context::new()
                .map_err(|e| Error::Initialization(format!("failed to open zenoh session: {e}"))),
        }
    }
}

impl FromStr for Middleware {
    type Err = Error;

    fn from_str(name: &str) -> Result<Self, Error> {
        if Self::ZENOH_NAMES.contains(&name) {
            Ok(Self::Zenoh)
        } else {
            Err(Error::Initialization(format!(
                "middleware implementation '{name}' is not loadable (available: {})",
                Self::ZENOH_NAMES.join(", ")
            )))
        }
    }
}

impl fmt::Display for Middleware {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zenoh => write!(f, "rmw_zenoh_cpp"),
        }
    }
}
