//! Connection request building.
//!
//! Turning a selected access point and a password into a platform request
//! depends on which API the platform offers:
//!
//! - [`LegacyConnector`] reuses a saved profile for the SSID when one
//!   exists, otherwise builds a [`WifiProfile`] from the capability string,
//!   adds it and activates it.
//! - [`ModernConnector`] submits an ephemeral [`NetworkRequest`] scoped to
//!   the SSID and lets the platform report back asynchronously.
//!
//! Both report through the request's [`CallbackRouter`]. The strategy is
//! picked once when the [`WifiContext`] is built.
//!
//! Callers must reject an empty password on a secured network before
//! submitting; nothing here validates it.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use wifi_connect::connection::WifiContext;
//! use wifi_connect::nmcli::NmcliPlatform;
//! use wifi_connect::router::outcome_channel;
//! use wifi_connect::scan::AccessPoint;
//!
//! let (outcomes, _rx) = outcome_channel();
//! let ctx = WifiContext::new(Arc::new(NmcliPlatform::new("wlan0")), outcomes);
//!
//! let ap = AccessPoint::new("HomeNet", "[WPA2-PSK-CCMP][ESS]", -48);
//! ctx.connect(&ap, "password123").expect("Submit failed");
//! ```

use anyhow::Result;
use std::sync::Arc;
use tracing::{info, warn};

use crate::platform::{CapabilityLevel, NetworkRequest, WifiPlatform};
use crate::profile::{find_saved, WifiProfile};
use crate::router::{CallbackRouter, NetworkHandle, OutcomeSender};
use crate::scan::AccessPoint;
use crate::security::is_eap_fallback;

/// One way of turning an access point into a platform connection.
pub trait ConnectStrategy: Send + Sync {
    fn level(&self) -> CapabilityLevel;

    /// Submits a single connection attempt. `Err` means nothing reached the
    /// platform's connection machinery and `router` was never notified.
    fn submit(
        &self,
        platform: &dyn WifiPlatform,
        access_point: &AccessPoint,
        password: &str,
        router: CallbackRouter,
    ) -> Result<()>;
}

/// Saved-profile path.
#[derive(Debug, Default)]
pub struct LegacyConnector;

impl ConnectStrategy for LegacyConnector {
    fn level(&self) -> CapabilityLevel {
        CapabilityLevel::Legacy
    }

    fn submit(
        &self,
        platform: &dyn WifiPlatform,
        access_point: &AccessPoint,
        password: &str,
        router: CallbackRouter,
    ) -> Result<()> {
        let ssid = &access_point.ssid;
        let saved = platform.configured_networks()?;

        let id = match find_saved(&saved, ssid) {
            Some(existing) => {
                info!(%ssid, id = %existing.id, "activating saved profile");
                existing.id.clone()
            }
            None => {
                if is_eap_fallback(&access_point.capabilities) {
                    warn!(
                        %ssid,
                        capabilities = %access_point.capabilities,
                        "EAP network has no profile layout, configuring as open"
                    );
                }
                let profile = WifiProfile::build(ssid, password, access_point.security_class());
                let id = platform.add_network(&profile)?;
                info!(%ssid, %id, security = %access_point.security_class(), "added profile");
                id
            }
        };

        let activated = platform.enable_network(&id)?;
        info!(%ssid, activated, "legacy connect");
        router.report(activated, NetworkHandle(id.0));

        Ok(())
    }
}

/// Ephemeral network-request path.
#[derive(Debug, Default)]
pub struct ModernConnector;

impl ConnectStrategy for ModernConnector {
    fn level(&self) -> CapabilityLevel {
        CapabilityLevel::Modern
    }

    fn submit(
        &self,
        platform: &dyn WifiPlatform,
        access_point: &AccessPoint,
        password: &str,
        router: CallbackRouter,
    ) -> Result<()> {
        let request = NetworkRequest::scoped(&access_point.ssid, password);
        info!(ssid = %request.ssid, secured = request.wpa2_passphrase.is_some(), "requesting network");
        platform.request_network(request, router)
    }
}

pub fn strategy_for(level: CapabilityLevel) -> Box<dyn ConnectStrategy> {
    match level {
        CapabilityLevel::Legacy => Box::new(LegacyConnector),
        CapabilityLevel::Modern => Box::new(ModernConnector),
    }
}

/// Platform handle plus the connection strategy resolved for it.
pub struct WifiContext {
    platform: Arc<dyn WifiPlatform>,
    strategy: Box<dyn ConnectStrategy>,
    outcomes: OutcomeSender,
}

impl WifiContext {
    /// Uses the capability level the platform reports.
    pub fn new(platform: Arc<dyn WifiPlatform>, outcomes: OutcomeSender) -> Self {
        let level = platform.capability_level();
        Self::with_level(platform, level, outcomes)
    }

    pub fn with_level(
        platform: Arc<dyn WifiPlatform>,
        level: CapabilityLevel,
        outcomes: OutcomeSender,
    ) -> Self {
        WifiContext {
            platform,
            strategy: strategy_for(level),
            outcomes,
        }
    }

    pub fn platform(&self) -> &dyn WifiPlatform {
        self.platform.as_ref()
    }

    pub fn level(&self) -> CapabilityLevel {
        self.strategy.level()
    }

    /// Submits one connection attempt for `access_point`.
    pub fn connect(&self, access_point: &AccessPoint, password: &str) -> Result<()> {
        let router = self.outcomes.router(&access_point.ssid);
        self.strategy
            .submit(self.platform.as_ref(), access_point, password, router)
    }
}
