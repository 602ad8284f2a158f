//! Observability for the review service
//!
//! - Structured logging (JSON, one object per line)
//! - Typed lifecycle events
//! - Scope-based timing of remote store calls
//!
//! ```ignore
//! use bookreview::observability::{log_event, Event, Logger, ObservationScope};
//!
//! log_event(Event::BootStart);
//! Logger::info("REVIEW_CREATED", &[("isbn", "9780141439518")]);
//!
//! let scope = ObservationScope::new("STORE_LIST");
//! // ... remote call ...
//! scope.complete();
//! ```

mod events;
mod logger;
mod scope;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use scope::{ObservationScope, Timer};

/// Log a lifecycle event
pub fn log_event(event: Event) {
    log_event_with_fields(event, &[]);
}

/// Log a lifecycle event with fields
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    let severity = if event.is_fatal() {
        Severity::Fatal
    } else {
        Severity::Info
    };
    Logger::log(severity, event.as_str(), fields);
}
