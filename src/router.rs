//! Delivery of connection outcomes.
//!
//! Every submitted connection request carries a [`CallbackRouter`]. The
//! platform (or the legacy connector) calls exactly one of
//! [`CallbackRouter::on_available`] or [`CallbackRouter::on_unavailable`];
//! both consume the router, so a request cannot report twice. The outcome
//! lands on an unbounded channel that the observer drains whenever it is
//! ready. If the observer has already gone away the outcome is dropped.

use serde::Serialize;
use tokio::sync::mpsc;
use tracing::debug;

/// Opaque reference to an activated network.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkHandle(pub String);

impl std::fmt::Display for NetworkHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one connection attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConnectionOutcome {
    pub ssid: String,
    pub success: bool,
    /// Present only when `success` is true.
    pub handle: Option<NetworkHandle>,
}

pub type OutcomeReceiver = mpsc::UnboundedReceiver<ConnectionOutcome>;

/// Producer side, cloned once per submitted request.
#[derive(Debug, Clone)]
pub struct OutcomeSender {
    tx: mpsc::UnboundedSender<ConnectionOutcome>,
}

/// Creates the outcome channel.
pub fn outcome_channel() -> (OutcomeSender, OutcomeReceiver) {
    let (tx, rx) = mpsc::unbounded_channel();
    (OutcomeSender { tx }, rx)
}

impl OutcomeSender {
    /// Router for a single request against `ssid`.
    pub fn router(&self, ssid: &str) -> CallbackRouter {
        CallbackRouter {
            ssid: ssid.to_string(),
            tx: self.tx.clone(),
        }
    }
}

/// Single-shot notification target for one request.
#[derive(Debug)]
pub struct CallbackRouter {
    ssid: String,
    tx: mpsc::UnboundedSender<ConnectionOutcome>,
}

impl CallbackRouter {
    pub fn ssid(&self) -> &str {
        &self.ssid
    }

    pub fn on_available(self, handle: NetworkHandle) {
        self.emit(true, Some(handle));
    }

    pub fn on_unavailable(self) {
        self.emit(false, None);
    }

    /// Routes a boolean activation result.
    pub fn report(self, success: bool, handle: NetworkHandle) {
        if success {
            self.on_available(handle);
        } else {
            self.on_unavailable();
        }
    }

    fn emit(self, success: bool, handle: Option<NetworkHandle>) {
        let outcome = ConnectionOutcome {
            ssid: self.ssid,
            success,
            handle,
        };
        if let Err(mpsc::error::SendError(outcome)) = self.tx.send(outcome) {
            debug!(ssid = %outcome.ssid, success = outcome.success, "outcome observer gone, dropping");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn available_carries_handle() {
        let (sender, mut rx) = outcome_channel();
        sender.router("Lab").on_available(NetworkHandle("uuid-1".into()));

        let outcome = rx.try_recv().unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.ssid, "Lab");
        assert_eq!(outcome.handle, Some(NetworkHandle("uuid-1".into())));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn unavailable_has_no_handle() {
        let (sender, mut rx) = outcome_channel();
        sender.router("Lab").on_unavailable();

        let outcome = rx.try_recv().unwrap();
        assert!(!outcome.success);
        assert!(outcome.handle.is_none());
    }

    #[test]
    fn report_maps_flag() {
        let (sender, mut rx) = outcome_channel();
        sender.router("A").report(false, NetworkHandle("7".into()));
        sender.router("B").report(true, NetworkHandle("8".into()));

        assert!(!rx.try_recv().unwrap().success);
        assert_eq!(rx.try_recv().unwrap().handle, Some(NetworkHandle("8".into())));
    }

    #[test]
    fn late_outcome_after_observer_dropped() {
        let (sender, rx) = outcome_channel();
        let router = sender.router("Gone");
        drop(rx);
        router.on_available(NetworkHandle("x".into()));
    }
}
