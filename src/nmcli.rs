//! NetworkManager backend.
//!
//! Implements [`WifiPlatform`] by shelling out to `nmcli` for a single
//! WiFi interface. All parsing works on terse (`-t`) output, where fields
//! are separated by `:` and literal colons and backslashes are escaped.
//!
//! # Requirements
//!
//! - NetworkManager must be installed and running
//! - The `nmcli` command must be available in PATH
//! - The user must be allowed to manage network connections
//!
//! # Commands Executed
//! ```bash
//! nmcli device wifi rescan ifname <interface>
//! nmcli -t -f SSID,SIGNAL,SECURITY,WPA-FLAGS,RSN-FLAGS device wifi list ifname <interface> --rescan no
//! nmcli -t -f NAME,UUID,TYPE connection show
//! nmcli connection add type wifi ifname <interface> ssid <ssid> ...
//! nmcli connection up uuid <uuid> ifname <interface>
//! nmcli connection delete uuid <uuid>
//! nmcli radio wifi [on|off]
//! nmcli -t -f PERMISSION,VALUE general permissions
//! nmcli -t device show <interface>
//! nmcli device disconnect <interface>
//! ```

use anyhow::{Context, Result};
use std::process::{Command, Output};
use std::thread;
use tracing::{debug, info, warn};

use crate::error::WifiError;
use crate::platform::{CapabilityLevel, ConnectionStatus, NetworkRequest, WifiPlatform, WifiState};
use crate::profile::{
    quoted, unquoted, AuthAlgorithm, Cipher, KeyMgmt, NetworkId, SavedProfile, WifiProfile,
};
use crate::router::{CallbackRouter, NetworkHandle};
use crate::scan::AccessPoint;

const WIFI_CONNECTION_TYPE: &str = "802-11-wireless";
const SCAN_PERMISSION: &str = "org.freedesktop.NetworkManager.wifi.scan";
const SECRET_KEYS: [&str; 3] = ["wifi-sec.psk", "wifi-sec.wep-key0", "password"];

/// `nmcli`-driven platform bound to one interface.
#[derive(Debug, Clone)]
pub struct NmcliPlatform {
    interface: String,
    level: CapabilityLevel,
}

impl NmcliPlatform {
    /// Uses ephemeral requests for connecting.
    pub fn new(interface: &str) -> Self {
        Self::with_level(interface, CapabilityLevel::Modern)
    }

    pub fn with_level(interface: &str, level: CapabilityLevel) -> Self {
        NmcliPlatform {
            interface: interface.to_string(),
            level,
        }
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }

    fn saved_ssid(&self, uuid: &str) -> Result<String> {
        let stdout = nmcli(&["-t", "-g", "802-11-wireless.ssid", "connection", "show", "uuid", uuid])?;
        Ok(unescape_terse(stdout.trim_end_matches('\n')))
    }
}

impl WifiPlatform for NmcliPlatform {
    fn capability_level(&self) -> CapabilityLevel {
        self.level
    }

    fn has_scan_permission(&self) -> Result<bool> {
        let stdout = nmcli(&["-t", "-f", "PERMISSION,VALUE", "general", "permissions"])?;
        Ok(parse_scan_permission(&stdout))
    }

    fn wifi_state(&self) -> Result<WifiState> {
        let stdout = nmcli(&["radio", "wifi"])?;
        Ok(parse_radio_state(&stdout))
    }

    fn set_wifi_enabled(&self, enabled: bool) -> Result<()> {
        nmcli(&["radio", "wifi", if enabled { "on" } else { "off" }])?;
        Ok(())
    }

    fn start_scan(&self) -> Result<bool> {
        let output = run(&["device", "wifi", "rescan", "ifname", &self.interface])?;
        if !output.status.success() {
            debug!(error = %error_text(&output), "rescan refused");
        }
        Ok(output.status.success())
    }

    fn scan_results(&self) -> Result<Vec<AccessPoint>> {
        let stdout = nmcli(&[
            "-t",
            "-f",
            "SSID,SIGNAL,SECURITY,WPA-FLAGS,RSN-FLAGS",
            "device",
            "wifi",
            "list",
            "ifname",
            &self.interface,
            "--rescan",
            "no",
        ])?;
        Ok(parse_wifi_list(&stdout))
    }

    fn configured_networks(&self) -> Result<Vec<SavedProfile>> {
        let stdout = nmcli(&["-t", "-f", "NAME,UUID,TYPE", "connection", "show"])?;
        Ok(collect_saved(&stdout, |uuid| self.saved_ssid(uuid)))
    }

    fn add_network(&self, profile: &WifiProfile) -> Result<NetworkId> {
        let args = profile_args(profile, &self.interface);
        let stdout = nmcli(&as_strs(&args))?;
        let uuid = parse_added_uuid(&stdout)
            .ok_or_else(|| WifiError::NmcliParse(format!("no uuid in '{}'", stdout.trim())))?;
        Ok(NetworkId(uuid))
    }

    fn remove_network(&self, id: &NetworkId) -> Result<()> {
        nmcli(&["connection", "delete", "uuid", &id.0])?;
        Ok(())
    }

    fn enable_network(&self, id: &NetworkId) -> Result<bool> {
        let output = run(&["connection", "up", "uuid", &id.0, "ifname", &self.interface])?;
        if !output.status.success() {
            warn!(id = %id, error = %error_text(&output), "activation failed");
        }
        Ok(output.status.success())
    }

    fn request_network(&self, request: NetworkRequest, router: CallbackRouter) -> Result<()> {
        let args = request_args(&request, &self.interface);
        let stdout = nmcli(&as_strs(&args))?;
        let uuid = parse_added_uuid(&stdout)
            .ok_or_else(|| WifiError::NmcliParse(format!("no uuid in '{}'", stdout.trim())))?;

        let interface = self.interface.clone();
        thread::Builder::new()
            .name("nmcli-request".to_string())
            .spawn(move || resolve_request(&interface, &uuid, router))
            .context("Failed to spawn request worker")?;

        Ok(())
    }

    fn status(&self) -> Result<ConnectionStatus> {
        let stdout = nmcli(&["-t", "device", "show", &self.interface])?;
        Ok(parse_device_show(&self.interface, &stdout))
    }

    fn disconnect(&self) -> Result<()> {
        nmcli(&["device", "disconnect", &self.interface])?;
        Ok(())
    }
}

/// Brings an in-memory request connection up and reports the result.
fn resolve_request(interface: &str, uuid: &str, router: CallbackRouter) {
    match run(&["connection", "up", "uuid", uuid, "ifname", interface]) {
        Ok(output) if output.status.success() => {
            info!(ssid = %router.ssid(), %uuid, "network available");
            router.on_available(NetworkHandle(uuid.to_string()));
        }
        result => {
            match result {
                Ok(output) => warn!(ssid = %router.ssid(), error = %error_text(&output), "network unavailable"),
                Err(e) => warn!(ssid = %router.ssid(), error = %e, "network unavailable"),
            }
            if let Err(e) = nmcli(&["connection", "delete", "uuid", uuid]) {
                debug!(%uuid, error = %e, "failed to drop request connection");
            }
            router.on_unavailable();
        }
    }
}

fn run(args: &[&str]) -> Result<Output> {
    debug!(args = %redacted(args), "nmcli");
    Command::new("nmcli")
        .args(args)
        .output()
        .context("Failed to execute nmcli")
}

/// Runs nmcli and returns stdout, failing on a non-zero exit.
fn nmcli(args: &[&str]) -> Result<String> {
    let output = run(args)?;
    if !output.status.success() {
        return Err(WifiError::NmcliExecution(error_text(&output)).into());
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// stderr if present, otherwise stdout.
fn error_text(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    if stderr.trim().is_empty() {
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    } else {
        stderr.trim().to_string()
    }
}

fn as_strs(args: &[String]) -> Vec<&str> {
    args.iter().map(String::as_str).collect()
}

/// Joins arguments for logging with secret values masked.
fn redacted(args: &[&str]) -> String {
    let mut out = Vec::with_capacity(args.len());
    let mut mask_next = false;
    for arg in args {
        if mask_next {
            out.push("***");
            mask_next = false;
        } else {
            out.push(arg);
            mask_next = SECRET_KEYS.contains(arg);
        }
    }
    out.join(" ")
}

/// Splits one line of terse output, honouring `\:` and `\\` escapes.
pub fn split_terse(line: &str) -> Vec<String> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    current.push(next);
                }
            }
            ':' => fields.push(std::mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    fields.push(current);

    fields
}

/// Removes terse escapes from a single value such as `-g` output.
pub fn unescape_terse(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(next) = chars.next() {
                out.push(next);
            }
        } else {
            out.push(c);
        }
    }

    out
}

/// Builds saved profiles from `NAME:UUID:TYPE` lines, looking each WiFi
/// connection's SSID up with `lookup`. Connections whose lookup fails are
/// skipped.
pub fn collect_saved<F>(stdout: &str, mut lookup: F) -> Vec<SavedProfile>
where
    F: FnMut(&str) -> Result<String>,
{
    let mut profiles = Vec::new();

    for line in stdout.lines() {
        let fields = split_terse(line);
        if fields.len() < 3 || fields[2] != WIFI_CONNECTION_TYPE {
            continue;
        }
        let uuid = &fields[1];
        match lookup(uuid) {
            Ok(ssid) => profiles.push(SavedProfile {
                id: NetworkId(uuid.clone()),
                ssid: quoted(&ssid),
            }),
            Err(e) => debug!(%uuid, error = %e, "skipping saved connection"),
        }
    }

    profiles
}

/// Approximate dBm for an nmcli signal percentage.
pub fn percent_to_dbm(percent: u8) -> i32 {
    i32::from(percent.min(100)) / 2 - 100
}

/// Builds an advertisement-style capability string from nmcli's security
/// columns, e.g. `[WPA2-PSK-CCMP][ESS]`.
pub fn capability_string(security: &str, wpa_flags: &str, rsn_flags: &str) -> String {
    let mut tags = String::new();

    if security.contains("WEP") {
        tags.push_str("[WEP]");
    }

    for (proto, flags) in [("WPA", wpa_flags), ("WPA2", rsn_flags)] {
        let flags: Vec<&str> = flags.split_whitespace().collect();

        let mut keys = Vec::new();
        if flags.contains(&"psk") {
            keys.push("PSK");
        }
        if flags.contains(&"802.1X") {
            keys.push("EAP");
        }
        if flags.contains(&"sae") {
            keys.push("SAE");
        }
        if keys.is_empty() {
            continue;
        }

        let mut ciphers = Vec::new();
        if flags.contains(&"pair_ccmp") {
            ciphers.push("CCMP");
        }
        if flags.contains(&"pair_tkip") {
            ciphers.push("TKIP");
        }

        tags.push('[');
        tags.push_str(proto);
        tags.push('-');
        tags.push_str(&keys.join("+"));
        if !ciphers.is_empty() {
            tags.push('-');
            tags.push_str(&ciphers.join("+"));
        }
        tags.push(']');
    }

    if tags.is_empty() && security.contains("802.1X") {
        tags.push_str("[EAP]");
    }

    tags.push_str("[ESS]");
    tags
}

/// Parses `SSID:SIGNAL:SECURITY:WPA-FLAGS:RSN-FLAGS` lines. Malformed lines
/// are logged and dropped.
pub fn parse_wifi_list(stdout: &str) -> Vec<AccessPoint> {
    stdout
        .lines()
        .filter(|l| !l.is_empty())
        .filter_map(|line| match parse_wifi_line(line) {
            Ok(ap) => Some(ap),
            Err(e) => {
                warn!(%line, error = %e, "skipping scan line");
                None
            }
        })
        .collect()
}

fn parse_wifi_line(line: &str) -> Result<AccessPoint, WifiError> {
    let fields = split_terse(line);
    if fields.len() < 5 {
        return Err(WifiError::NmcliParse(format!("expected 5 fields in '{}'", line)));
    }

    let percent: u8 = fields[1]
        .parse()
        .map_err(|_| WifiError::NmcliParse(format!("bad signal '{}'", fields[1])))?;

    Ok(AccessPoint {
        ssid: fields[0].clone(),
        capabilities: capability_string(&fields[2], &fields[3], &fields[4]),
        level: percent_to_dbm(percent),
    })
}

/// Arguments for `nmcli connection add` creating a saved profile.
pub fn profile_args(profile: &WifiProfile, interface: &str) -> Vec<String> {
    let ssid = profile.bare_ssid().to_string();
    let mut args: Vec<String> = vec![
        "connection".into(),
        "add".into(),
        "type".into(),
        "wifi".into(),
        "con-name".into(),
        ssid.clone(),
        "ifname".into(),
        interface.into(),
        "ssid".into(),
        ssid,
    ];
    let mut set = |key: &str, value: String| {
        args.push(key.to_string());
        args.push(value);
    };

    if profile.hidden_ssid {
        set("802-11-wireless.hidden", "yes".into());
    }

    if profile.key_mgmt.contains(&KeyMgmt::WpaPsk) {
        set("wifi-sec.key-mgmt", "wpa-psk".into());
    } else if profile.wep_key0.is_some() {
        set("wifi-sec.key-mgmt", "none".into());
    }

    if profile.auth_algorithms == [AuthAlgorithm::Shared] {
        set("wifi-sec.auth-alg", "shared".into());
    }

    if let Some(ref key) = profile.wep_key0 {
        set("wifi-sec.wep-key-type", "1".into());
        set("wifi-sec.wep-key0", unquoted(key).to_string());
        set("wifi-sec.wep-tx-keyidx", profile.wep_tx_key_index.to_string());
    }

    if let Some(ref psk) = profile.pre_shared_key {
        set("wifi-sec.psk", unquoted(psk).to_string());
    }

    if !profile.group_ciphers.is_empty() {
        set("wifi-sec.group", cipher_list(&profile.group_ciphers));
    }
    if !profile.pairwise_ciphers.is_empty() {
        set("wifi-sec.pairwise", cipher_list(&profile.pairwise_ciphers));
    }

    set(
        "connection.autoconnect",
        if profile.enabled { "yes" } else { "no" }.into(),
    );

    args
}

fn cipher_list(ciphers: &[Cipher]) -> String {
    ciphers
        .iter()
        .map(|c| match c {
            Cipher::Tkip => "tkip",
            Cipher::Ccmp => "ccmp",
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Arguments for `nmcli connection add` creating an in-memory request.
pub fn request_args(request: &NetworkRequest, interface: &str) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "connection".into(),
        "add".into(),
        "save".into(),
        "no".into(),
        "type".into(),
        "wifi".into(),
        "con-name".into(),
        format!("wifi-connect-{}", request.ssid),
        "ifname".into(),
        interface.into(),
        "ssid".into(),
        request.ssid.clone(),
        "connection.autoconnect".into(),
        "no".into(),
    ];

    if !request.requires_internet {
        args.extend(["ipv4.never-default", "yes", "ipv6.never-default", "yes"].map(String::from));
    }

    if let Some(ref passphrase) = request.wpa2_passphrase {
        args.extend(["wifi-sec.key-mgmt".to_string(), "wpa-psk".to_string()]);
        args.extend(["wifi-sec.psk".to_string(), passphrase.clone()]);
    }

    args
}

/// Extracts the UUID from "Connection 'x' (uuid) successfully added."
pub fn parse_added_uuid(stdout: &str) -> Option<String> {
    let start = stdout.rfind('(')? + 1;
    let end = start + stdout[start..].find(')')?;
    let uuid = stdout[start..end].trim();
    (!uuid.is_empty()).then(|| uuid.to_string())
}

/// Missing permission rows are treated as granted; older NetworkManager
/// versions do not report the scan permission.
pub fn parse_scan_permission(stdout: &str) -> bool {
    for line in stdout.lines() {
        let fields = split_terse(line);
        if fields.len() >= 2 && fields[0] == SCAN_PERMISSION {
            return matches!(fields[1].as_str(), "yes" | "auth");
        }
    }
    true
}

pub fn parse_radio_state(stdout: &str) -> WifiState {
    match stdout.trim() {
        "enabled" => WifiState::Enabled,
        "disabled" => WifiState::Disabled,
        _ => WifiState::Unknown,
    }
}

/// Parses `nmcli -t device show` key/value lines.
pub fn parse_device_show(interface: &str, stdout: &str) -> ConnectionStatus {
    let mut status = ConnectionStatus {
        interface: interface.to_string(),
        state: "unknown".to_string(),
        ..ConnectionStatus::default()
    };

    for line in stdout.lines() {
        let Some((key, raw)) = line.split_once(':') else {
            continue;
        };
        let value = unescape_terse(raw);
        let present = !value.is_empty() && value != "--";

        match key {
            "GENERAL.STATE" => status.state = value,
            "GENERAL.CONNECTION" if present => status.connection = Some(value),
            "IP4.ADDRESS[1]" if present => status.ip_address = Some(value),
            "IP4.GATEWAY" if present => status.gateway = Some(value),
            _ => {}
        }
    }

    status
}
