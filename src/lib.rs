//! WiFi scanning and connection library.
//!
//! Lists nearby access points, classifies their advertised security and
//! connects to a chosen one through the platform's network service. Two
//! connection paths exist: a legacy one that goes through the saved-profile
//! table, and a modern one that submits an ephemeral, SSID-scoped request
//! and waits for the platform to report back.
//!
//! # Modules
//!
//! - [`config`] - Configuration file with saved credentials and defaults
//! - [`connection`] - Connection strategies and the [`WifiContext`]
//! - [`controller`] - Scan, selection and password-entry flow
//! - [`error`] - Custom error types for the library
//! - [`interface`] - WiFi interface discovery
//! - [`nmcli`] - NetworkManager backend
//! - [`platform`] - The [`WifiPlatform`] trait and its request/status types
//! - [`profile`] - Saved-profile records for the legacy path
//! - [`router`] - Asynchronous connection outcome delivery
//! - [`scan`] - Scan result store and presentation
//! - [`security`] - Capability string classification
//!
//! # Example Usage
//!
//! ```no_run
//! use std::sync::Arc;
//! use wifi_connect::{outcome_channel, NmcliPlatform, Selection, WifiContext, WifiController};
//!
//! let (outcomes, _rx) = outcome_channel();
//! let ctx = WifiContext::new(Arc::new(NmcliPlatform::new("wlan0")), outcomes);
//! let mut controller = WifiController::new(ctx);
//!
//! controller.request_scan().expect("Scan refused");
//! controller.on_scan_results(true).expect("No results");
//!
//! if let Selection::PromptPassword(ap) = controller.select(0).expect("Empty list") {
//!     controller.submit_password(&ap, "password123").expect("Submit failed");
//! }
//! ```

/// Configuration module for saved networks and application settings.
/// Handles reading/writing TOML config files and credential storage.
pub mod config;

/// Connection request building for the legacy and modern paths.
pub mod connection;

/// Radio, scan and connect flow driven by user actions.
pub mod controller;

/// Error module defining custom error types for the library.
/// Uses `thiserror` for ergonomic error handling.
pub mod error;

/// Interface module for WiFi adapter discovery.
pub mod interface;

/// NetworkManager (`nmcli`) implementation of the platform trait.
pub mod nmcli;

/// Platform service surface consumed by the rest of the crate.
pub mod platform;

/// Saved-profile layout per security class.
pub mod profile;

/// Single-shot outcome routing over a channel.
pub mod router;

/// Scan result storage, sorting and display.
pub mod scan;

/// Capability string classification.
pub mod security;

pub use connection::{ConnectStrategy, LegacyConnector, ModernConnector, WifiContext};
pub use controller::{Selection, UserMessage, WifiController};
pub use error::WifiError;
pub use interface::{get_interface, list_wifi_interfaces, resolve_interface, WifiInterface};
pub use nmcli::NmcliPlatform;
pub use platform::{CapabilityLevel, ConnectionStatus, NetworkRequest, WifiPlatform, WifiState};
pub use router::{outcome_channel, CallbackRouter, ConnectionOutcome, NetworkHandle};
pub use scan::{signal_tier, AccessPoint, ScanResultStore};
pub use security::{classify, is_secured, SecurityClass};
