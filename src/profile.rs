//! Saved-profile records for the legacy connection path.
//!
//! A [`WifiProfile`] is what gets written to the platform's saved-network
//! store when no profile exists yet for an SSID. SSIDs and secrets are kept
//! in their quoted form (`"HomeNet"`), which is also how existing profiles
//! are matched.

use serde::Serialize;

use crate::security::SecurityClass;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum KeyMgmt {
    None,
    WpaPsk,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuthAlgorithm {
    Open,
    Shared,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Cipher {
    Tkip,
    Ccmp,
}

/// Profile record handed to the platform's saved-network store.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct WifiProfile {
    /// Quoted SSID, e.g. `"HomeNet"` including the quotes.
    pub ssid: String,
    pub hidden_ssid: bool,
    pub key_mgmt: Vec<KeyMgmt>,
    pub auth_algorithms: Vec<AuthAlgorithm>,
    pub group_ciphers: Vec<Cipher>,
    pub pairwise_ciphers: Vec<Cipher>,
    /// Quoted WEP key for slot 0.
    pub wep_key0: Option<String>,
    pub wep_tx_key_index: u8,
    /// Quoted WPA pre-shared key.
    pub pre_shared_key: Option<String>,
    pub enabled: bool,
}

impl WifiProfile {
    /// Builds a new profile for `ssid` laid out for `security`.
    ///
    /// WPS-only networks get the same layout as open ones.
    pub fn build(ssid: &str, password: &str, security: SecurityClass) -> Self {
        let mut profile = WifiProfile {
            ssid: quoted(ssid),
            ..WifiProfile::default()
        };

        match security {
            SecurityClass::Open | SecurityClass::WpsOnly => {
                profile.key_mgmt = vec![KeyMgmt::None];
            }
            SecurityClass::Wep => {
                profile.hidden_ssid = true;
                profile.wep_key0 = Some(quoted(password));
                profile.auth_algorithms = vec![AuthAlgorithm::Open, AuthAlgorithm::Shared];
                profile.key_mgmt = vec![KeyMgmt::None];
                profile.wep_tx_key_index = 0;
            }
            SecurityClass::WpaPsk => {
                profile.hidden_ssid = true;
                profile.pre_shared_key = Some(quoted(password));
                profile.auth_algorithms = vec![AuthAlgorithm::Open];
                profile.key_mgmt = vec![KeyMgmt::WpaPsk];
                profile.group_ciphers = vec![Cipher::Tkip, Cipher::Ccmp];
                profile.pairwise_ciphers = vec![Cipher::Tkip, Cipher::Ccmp];
                profile.enabled = true;
            }
        }

        profile
    }

    /// SSID with the surrounding quotes removed.
    pub fn bare_ssid(&self) -> &str {
        unquoted(&self.ssid)
    }
}

/// A profile already present in the platform's saved-network store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedProfile {
    pub id: NetworkId,
    /// Quoted SSID.
    pub ssid: String,
}

/// Identifier of a saved profile in the platform's store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct NetworkId(pub String);

impl std::fmt::Display for NetworkId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn quoted(value: &str) -> String {
    format!("\"{}\"", value)
}

pub fn unquoted(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|v| v.strip_suffix('"'))
        .unwrap_or(value)
}

/// Finds the saved profile whose quoted SSID equals `ssid` quoted.
pub fn find_saved<'a>(profiles: &'a [SavedProfile], ssid: &str) -> Option<&'a SavedProfile> {
    let wanted = quoted(ssid);
    profiles.iter().find(|p| p.ssid == wanted)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_profile_has_no_ciphers() {
        let profile = WifiProfile::build("OpenCafe", "", SecurityClass::Open);
        assert_eq!(profile.ssid, "\"OpenCafe\"");
        assert_eq!(profile.key_mgmt, [KeyMgmt::None]);
        assert!(profile.group_ciphers.is_empty());
        assert!(profile.pairwise_ciphers.is_empty());
        assert!(!profile.hidden_ssid);
        assert!(profile.pre_shared_key.is_none());
    }

    #[test]
    fn wps_only_matches_open_layout() {
        let open = WifiProfile::build("Net", "", SecurityClass::Open);
        let wps = WifiProfile::build("Net", "", SecurityClass::WpsOnly);
        assert_eq!(open, wps);
    }

    #[test]
    fn wep_profile() {
        let profile = WifiProfile::build("Old", "abcde", SecurityClass::Wep);
        assert!(profile.hidden_ssid);
        assert_eq!(profile.wep_key0.as_deref(), Some("\"abcde\""));
        assert_eq!(profile.auth_algorithms, [AuthAlgorithm::Open, AuthAlgorithm::Shared]);
        assert_eq!(profile.key_mgmt, [KeyMgmt::None]);
        assert_eq!(profile.wep_tx_key_index, 0);
        assert!(!profile.enabled);
    }

    #[test]
    fn wpa_psk_profile() {
        let profile = WifiProfile::build("SecureNet", "hunter22", SecurityClass::WpaPsk);
        assert!(profile.hidden_ssid);
        assert_eq!(profile.pre_shared_key.as_deref(), Some("\"hunter22\""));
        assert_eq!(profile.auth_algorithms, [AuthAlgorithm::Open]);
        assert_eq!(profile.key_mgmt, [KeyMgmt::WpaPsk]);
        assert_eq!(profile.group_ciphers, [Cipher::Tkip, Cipher::Ccmp]);
        assert_eq!(profile.pairwise_ciphers, [Cipher::Tkip, Cipher::Ccmp]);
        assert!(profile.enabled);
    }

    #[test]
    fn saved_lookup_uses_quoted_form() {
        let profiles = vec![
            SavedProfile { id: NetworkId("1".into()), ssid: "HomeNet".into() },
            SavedProfile { id: NetworkId("2".into()), ssid: "\"HomeNet\"".into() },
        ];
        assert_eq!(find_saved(&profiles, "HomeNet").map(|p| p.id.0.as_str()), Some("2"));
        assert!(find_saved(&profiles, "homenet").is_none());
    }

    #[test]
    fn unquote() {
        assert_eq!(unquoted("\"a:b\""), "a:b");
        assert_eq!(unquoted("plain"), "plain");
        assert_eq!(WifiProfile::build("x", "", SecurityClass::Open).bare_ssid(), "x");
    }
}
