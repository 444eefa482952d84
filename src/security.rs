//! Security classification of advertised capability strings.
//!
//! Access points advertise their security elements as a flat text
//! descriptor such as `[WPA2-PSK-CCMP][ESS]`. Two predicates run over that
//! text:
//!
//! - [`classify`] picks the profile layout used when a new saved profile is
//!   created on the legacy connection path.
//! - [`is_secured`] decides whether the user is asked for a password and
//!   whether the network is labelled open or secured.
//!
//! The two disagree on EAP: `is_secured` treats it as secured while
//! `classify` falls through to [`SecurityClass::Open`]. Callers that hit
//! that combination should log it; see [`is_eap_fallback`].

use serde::Serialize;
use std::fmt;

/// Security family derived from a capability string.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum SecurityClass {
    Open,
    Wep,
    WpaPsk,
    WpsOnly,
}

impl fmt::Display for SecurityClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SecurityClass::Open => "open",
            SecurityClass::Wep => "WEP",
            SecurityClass::WpaPsk => "WPA-PSK",
            SecurityClass::WpsOnly => "WPS",
        };
        f.write_str(name)
    }
}

/// Classifies a capability string. First match wins: WEP, then PSK, then WPS.
///
/// # Example
/// ```
/// use wifi_connect::security::{classify, SecurityClass};
///
/// assert_eq!(classify("[WPA2-PSK-CCMP][ESS]"), SecurityClass::WpaPsk);
/// assert_eq!(classify("[WEP][PSK]"), SecurityClass::Wep);
/// assert_eq!(classify("[ESS]"), SecurityClass::Open);
/// ```
pub fn classify(capabilities: &str) -> SecurityClass {
    if capabilities.contains("WEP") {
        SecurityClass::Wep
    } else if capabilities.contains("PSK") {
        SecurityClass::WpaPsk
    } else if capabilities.contains("WPS") {
        SecurityClass::WpsOnly
    } else {
        SecurityClass::Open
    }
}

/// Returns true when a password prompt is needed before connecting.
pub fn is_secured(capabilities: &str) -> bool {
    capabilities.contains("WEP") || capabilities.contains("PSK") || capabilities.contains("EAP")
}

/// Secured for the prompt, but configured as open by [`classify`].
pub fn is_eap_fallback(capabilities: &str) -> bool {
    is_secured(capabilities) && classify(capabilities) == SecurityClass::Open
}

/// Label shown next to a network name.
pub fn security_label(capabilities: &str) -> &'static str {
    if is_secured(capabilities) {
        "secured"
    } else {
        "open"
    }
}
