//! User-facing flow: radio toggle, scan requests, selection and password
//! entry.
//!
//! [`WifiController`] owns the scan store and a [`WifiContext`]. Every
//! operation is a single fire-and-forget call into the platform; failures
//! come back as [`WifiError`] values that map onto a [`UserMessage`].
//! Nothing here retries.

use anyhow::Result;
use std::fmt;
use tracing::{debug, info};

use crate::connection::WifiContext;
use crate::error::WifiError;
use crate::platform::WifiState;
use crate::router::ConnectionOutcome;
use crate::scan::{AccessPoint, NetworkRow, ScanResultStore};
use crate::security::is_secured;

/// Short message shown to the user after an action.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UserMessage {
    Scanning,
    ScanFailed,
    PermissionRequired,
    RadioDisabled,
    PasswordRequired(String),
    Radio(WifiState),
    Connected(String),
    ConnectionFailed(String),
}

impl UserMessage {
    /// Message for a failed action, if the failure is one the user can act on.
    pub fn from_error(error: &anyhow::Error) -> Option<Self> {
        let message = match error.downcast_ref::<WifiError>()? {
            WifiError::PermissionDenied => UserMessage::PermissionRequired,
            WifiError::RadioDisabled => UserMessage::RadioDisabled,
            WifiError::ScanFailed => UserMessage::ScanFailed,
            WifiError::PasswordRequired(ssid) => UserMessage::PasswordRequired(ssid.clone()),
            WifiError::ConnectionFailed(ssid) => UserMessage::ConnectionFailed(ssid.clone()),
            _ => return None,
        };
        Some(message)
    }

    pub fn from_outcome(outcome: &ConnectionOutcome) -> Self {
        if outcome.success {
            UserMessage::Connected(outcome.ssid.clone())
        } else {
            UserMessage::ConnectionFailed(outcome.ssid.clone())
        }
    }
}

impl fmt::Display for UserMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UserMessage::Scanning => write!(f, "Scanning for WiFi networks..."),
            UserMessage::ScanFailed => write!(f, "Failed to start scan"),
            UserMessage::PermissionRequired => {
                write!(f, "Scanning for networks requires the WiFi scan permission")
            }
            UserMessage::RadioDisabled => write!(f, "WiFi is off, turn it on to scan"),
            UserMessage::PasswordRequired(ssid) => write!(f, "Password required for '{}'", ssid),
            UserMessage::Radio(state) => match state {
                WifiState::Disabling => write!(f, "WiFi is turning off"),
                WifiState::Disabled => write!(f, "WiFi is off"),
                WifiState::Enabling => write!(f, "WiFi is turning on"),
                WifiState::Enabled => write!(f, "WiFi is on"),
                WifiState::Unknown => write!(f, "WiFi state unknown"),
            },
            UserMessage::Connected(ssid) => write!(f, "Connected to '{}'", ssid),
            UserMessage::ConnectionFailed(ssid) => write!(f, "Failed to connect to '{}'", ssid),
        }
    }
}

/// What happened after the user picked a network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// Secured network; ask for a password and call
    /// [`WifiController::submit_password`].
    PromptPassword(AccessPoint),
    /// Open network; submitted with an empty password.
    Submitted(AccessPoint),
}

pub struct WifiController {
    ctx: WifiContext,
    store: ScanResultStore,
}

impl WifiController {
    pub fn new(ctx: WifiContext) -> Self {
        WifiController {
            ctx,
            store: ScanResultStore::default(),
        }
    }

    pub fn context(&self) -> &WifiContext {
        &self.ctx
    }

    pub fn store(&self) -> &ScanResultStore {
        &self.store
    }

    pub fn rows(&self) -> Vec<NetworkRow> {
        self.store.rows()
    }

    pub fn radio_state(&self) -> Result<WifiState> {
        self.ctx.platform().wifi_state()
    }

    pub fn set_radio(&self, enabled: bool) -> Result<WifiState> {
        info!(enabled, "setting radio");
        self.ctx.platform().set_wifi_enabled(enabled)?;
        self.radio_state()
    }

    /// Flips the radio and returns the state afterwards.
    pub fn toggle_radio(&self) -> Result<WifiState> {
        let enabled = self.radio_state()? == WifiState::Enabled;
        self.set_radio(!enabled)
    }

    /// Asks the platform to scan. Results arrive later through
    /// [`WifiController::on_scan_results`].
    pub fn request_scan(&self) -> Result<()> {
        let platform = self.ctx.platform();

        if platform.wifi_state()? != WifiState::Enabled {
            return Err(WifiError::RadioDisabled.into());
        }
        if !platform.has_scan_permission()? {
            return Err(WifiError::PermissionDenied.into());
        }
        if !platform.start_scan()? {
            return Err(WifiError::ScanFailed.into());
        }

        info!("scan requested");
        Ok(())
    }

    /// Scan-complete notification. Replaces the stored batch and returns
    /// the number of entries kept.
    pub fn on_scan_results(&mut self, results_updated: bool) -> Result<usize> {
        let batch = self.ctx.platform().scan_results()?;
        debug!(results_updated, received = batch.len(), "scan results");
        self.store.replace(batch);
        Ok(self.store.len())
    }

    /// User picked the entry at `index` of the presented list.
    pub fn select(&self, index: usize) -> Result<Selection> {
        let access_point = self
            .store
            .get(index)
            .ok_or_else(|| WifiError::NetworkNotFound(format!("#{}", index)))?;
        self.select_access_point(access_point)
    }

    /// User picked a network by name.
    pub fn select_ssid(&self, ssid: &str) -> Result<Selection> {
        let access_point = self
            .store
            .find(ssid)
            .ok_or_else(|| WifiError::NetworkNotFound(ssid.to_string()))?;
        self.select_access_point(access_point)
    }

    fn select_access_point(&self, access_point: &AccessPoint) -> Result<Selection> {
        if is_secured(&access_point.capabilities) {
            debug!(ssid = %access_point.ssid, "secured network, prompting");
            return Ok(Selection::PromptPassword(access_point.clone()));
        }

        debug!(ssid = %access_point.ssid, "open network, connecting");
        self.ctx.connect(access_point, "")?;
        Ok(Selection::Submitted(access_point.clone()))
    }

    /// Password entered for a secured network. Surrounding whitespace is
    /// trimmed; an empty result is rejected without reaching the platform.
    pub fn submit_password(&self, access_point: &AccessPoint, password: &str) -> Result<()> {
        let password = password.trim();
        if password.is_empty() && is_secured(&access_point.capabilities) {
            return Err(WifiError::PasswordRequired(access_point.ssid.clone()).into());
        }
        self.ctx.connect(access_point, password)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_typed_errors() {
        let err: anyhow::Error = WifiError::PasswordRequired("SecureNet".into()).into();
        let msg = UserMessage::from_error(&err).unwrap();
        assert_eq!(msg, UserMessage::PasswordRequired("SecureNet".into()));
        assert_eq!(msg.to_string(), "Password required for 'SecureNet'");

        let err: anyhow::Error = WifiError::NmcliExecution("boom".into()).into();
        assert!(UserMessage::from_error(&err).is_none());

        let err = anyhow::anyhow!("untyped");
        assert!(UserMessage::from_error(&err).is_none());
    }

    #[test]
    fn outcome_messages() {
        let ok = ConnectionOutcome {
            ssid: "Lab".into(),
            success: true,
            handle: None,
        };
        assert_eq!(UserMessage::from_outcome(&ok).to_string(), "Connected to 'Lab'");

        let failed = ConnectionOutcome {
            success: false,
            ..ok
        };
        assert_eq!(UserMessage::from_outcome(&failed), UserMessage::ConnectionFailed("Lab".into()));
    }
}
