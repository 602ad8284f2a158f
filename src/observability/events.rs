//! Lifecycle events
//!
//! Events are explicit and typed. Per-request and per-store-call logging
//! uses free-form event names through `ObservationScope` instead.

use std::fmt;

/// Observable process lifecycle events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Boot & Lifecycle
    /// Process startup begins
    BootStart,
    /// Startup complete, ready to serve
    BootComplete,
    /// Shutdown signal received
    ShutdownSignal,
    /// Shutdown complete
    ShutdownComplete,

    // Configuration
    /// Configuration loaded and validated
    ConfigLoaded,
    /// Configuration file absent, defaults in use
    ConfigDefaulted,
    /// Configuration rejected (FATAL)
    ConfigInvalid,

    // Remote store
    /// Table store client constructed
    StoreClientReady,

    // Server
    /// Listener bound, serving requests
    ServerListening,
    /// Server loop exited with an error (FATAL)
    ServerFailed,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::BootStart => "BOOT_START",
            Event::BootComplete => "BOOT_COMPLETE",
            Event::ShutdownSignal => "SHUTDOWN_SIGNAL",
            Event::ShutdownComplete => "SHUTDOWN_COMPLETE",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::ConfigDefaulted => "CONFIG_DEFAULTED",
            Event::ConfigInvalid => "CONFIG_INVALID",
            Event::StoreClientReady => "STORE_CLIENT_READY",
            Event::ServerListening => "SERVER_LISTENING",
            Event::ServerFailed => "SERVER_FAILED",
        }
    }

    /// Whether this event ends the process
    pub fn is_fatal(&self) -> bool {
        matches!(self, Event::ConfigInvalid | Event::ServerFailed)
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
