//! Post-hoc classification of sync failures.

use tracing::error;

use careledger_common::Error;

use crate::events::SyncErrorEvent;

/// What kind of failure a sync error represents.
///
/// `NetworkRelated` and `Unauthenticated` are normal operating conditions
/// of an offline-first system and are only logged. `ServerError` and
/// `Unexpected` indicate defects worth investigating and are additionally
/// forwarded to the crash reporter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SyncFault {
    /// Connectivity or timeout failure; expected and transient.
    NetworkRelated,
    /// Server rejected the credentials or session.
    Unauthenticated,
    /// Server returned an unexpected or invalid response.
    ServerError,
    /// Anything else: programming errors, serialization bugs.
    Unexpected,
}

impl SyncFault {
    /// Whether this fault should be sent to the crash reporter.
    pub fn is_reportable(self) -> bool {
        matches!(self, SyncFault::ServerError | SyncFault::Unexpected)
    }
}

/// Classify a raised error into a [`SyncFault`].
pub fn classify(error: &Error) -> SyncFault {
    match error {
        Error::Network(_) | Error::Io(_) => SyncFault::NetworkRelated,
        Error::Unauthenticated(_) => SyncFault::Unauthenticated,
        Error::Server(_) | Error::Serialization(_) => SyncFault::ServerError,
        _ => SyncFault::Unexpected,
    }
}

/// Opaque crash/event reporting sink.
pub trait ErrorReporter: Send + Sync {
    /// Report one classified sync failure.
    fn report(&self, event: &SyncErrorEvent);
}

/// Reporter that drops every event. Useful for tests and headless tools.
pub struct NoopReporter;

impl ErrorReporter for NoopReporter {
    fn report(&self, _event: &SyncErrorEvent) {}
}

/// Reporter that logs events at error level.
pub struct TracingReporter;

impl ErrorReporter for TracingReporter {
    fn report(&self, event: &SyncErrorEvent) {
        error!(
            entity = event.entity,
            fault = ?event.fault,
            message = %event.message,
            "Sync failure reported"
        );
    }
}
