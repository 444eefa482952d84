//! The platform surface consumed by this crate.
//!
//! Everything that touches the radio goes through [`WifiPlatform`]. The
//! shipped implementation is [`crate::nmcli::NmcliPlatform`]; tests use an
//! in-memory fake.

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::profile::{NetworkId, SavedProfile, WifiProfile};
use crate::router::CallbackRouter;
use crate::scan::AccessPoint;

/// Android SDK level from which ephemeral network requests replace the
/// saved-profile API.
pub const MODERN_SDK_LEVEL: u32 = 29;

/// Which connection API the platform offers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CapabilityLevel {
    /// Persistent saved-profile table.
    Legacy,
    /// Ephemeral, scoped network requests resolved asynchronously.
    Modern,
}

impl CapabilityLevel {
    pub fn from_sdk(sdk: u32) -> Self {
        if sdk >= MODERN_SDK_LEVEL {
            CapabilityLevel::Modern
        } else {
            CapabilityLevel::Legacy
        }
    }
}

impl fmt::Display for CapabilityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CapabilityLevel::Legacy => f.write_str("legacy"),
            CapabilityLevel::Modern => f.write_str("modern"),
        }
    }
}

/// Radio state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum WifiState {
    Disabling,
    Disabled,
    Enabling,
    Enabled,
    Unknown,
}

/// Ephemeral request for a single SSID.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkRequest {
    pub ssid: String,
    /// WPA2 passphrase. `None` requests an open network.
    pub wpa2_passphrase: Option<String>,
    pub requires_internet: bool,
    pub trusted: bool,
    pub restricted: bool,
}

impl NetworkRequest {
    /// Scoped, trusted, unrestricted request that does not need internet.
    pub fn scoped(ssid: &str, passphrase: &str) -> Self {
        NetworkRequest {
            ssid: ssid.to_string(),
            wpa2_passphrase: (!passphrase.is_empty()).then(|| passphrase.to_string()),
            requires_internet: false,
            trusted: true,
            restricted: false,
        }
    }
}

/// Current connection state of the bound interface.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ConnectionStatus {
    pub interface: String,

    /// Raw state string, e.g. "100 (connected)".
    pub state: String,

    /// Active connection profile name.
    pub connection: Option<String>,

    /// IPv4 address with prefix, e.g. "192.168.4.2/24".
    pub ip_address: Option<String>,

    pub gateway: Option<String>,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }
}

/// Prints connection status.
///
/// ```text
/// Interface: wlan0
/// State:     100 (connected)
/// Connected: HomeNet
/// IP:        192.168.1.20/24
/// Gateway:   192.168.1.1
/// ```
pub fn display_status(status: &ConnectionStatus) {
    println!("Interface: {}", status.interface);
    println!("State:     {}", status.state);

    match status.connection {
        Some(ref conn) => println!("Connected: {}", conn),
        None => println!("Connected: (none)"),
    }

    if let Some(ref ip) = status.ip_address {
        println!("IP:        {}", ip);
    }
    if let Some(ref gw) = status.gateway {
        println!("Gateway:   {}", gw);
    }
}

/// Network-service handle for one WiFi interface.
pub trait WifiPlatform: Send + Sync {
    fn capability_level(&self) -> CapabilityLevel;

    /// Whether the caller may request scans.
    fn has_scan_permission(&self) -> Result<bool>;

    fn wifi_state(&self) -> Result<WifiState>;

    fn set_wifi_enabled(&self, enabled: bool) -> Result<()>;

    /// Triggers a scan. `Ok(false)` means the platform refused it.
    fn start_scan(&self) -> Result<bool>;

    /// Results of the most recent scan, unfiltered and unsorted.
    fn scan_results(&self) -> Result<Vec<AccessPoint>>;

    fn configured_networks(&self) -> Result<Vec<SavedProfile>>;

    fn add_network(&self, profile: &WifiProfile) -> Result<NetworkId>;

    fn remove_network(&self, id: &NetworkId) -> Result<()>;

    /// Activates a saved profile. Returns the platform's success flag.
    fn enable_network(&self, id: &NetworkId) -> Result<bool>;

    /// Submits an ephemeral request. The outcome arrives later through
    /// `router`; returning `Ok` only means the request was accepted.
    fn request_network(&self, request: NetworkRequest, router: CallbackRouter) -> Result<()>;

    fn status(&self) -> Result<ConnectionStatus>;

    fn disconnect(&self) -> Result<()>;
}
