use anyhow::{Context, Result};
use serde::Serialize;
use std::process::Command;

use crate::error::WifiError;
use crate::nmcli::split_terse;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WifiInterface {
    pub name: String,
    pub state: String,
}

/// List all WiFi interfaces on the system
pub fn list_wifi_interfaces() -> Result<Vec<WifiInterface>> {
    let output = Command::new("nmcli")
        .args(["-t", "-f", "DEVICE,TYPE,STATE", "device"])
        .output()
        .context("Failed to execute nmcli")?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(WifiError::NmcliExecution(stderr.to_string()).into());
    }

    Ok(parse_devices(&String::from_utf8_lossy(&output.stdout)))
}

/// Keeps `wifi` rows of `DEVICE:TYPE:STATE` output.
pub fn parse_devices(stdout: &str) -> Vec<WifiInterface> {
    stdout
        .lines()
        .map(split_terse)
        .filter(|parts| parts.len() >= 3 && parts[1] == "wifi")
        .map(|parts| WifiInterface {
            name: parts[0].clone(),
            state: parts[2].clone(),
        })
        .collect()
}

/// Get a specific interface by name, verifying it's a WiFi interface
pub fn get_interface(name: &str) -> Result<WifiInterface> {
    let interfaces = list_wifi_interfaces()?;

    interfaces
        .into_iter()
        .find(|i| i.name == name)
        .ok_or_else(|| WifiError::InterfaceNotFound(name.to_string()).into())
}

/// Resolve interface: explicit name, then configured default, then the first
/// WiFi device
pub fn resolve_interface(interface: Option<&str>, default: Option<&str>) -> Result<WifiInterface> {
    match interface.or(default) {
        Some(name) => get_interface(name),
        None => pick_default(list_wifi_interfaces()?),
    }
}

/// Prefers a device that is not `unavailable`.
pub fn pick_default(interfaces: Vec<WifiInterface>) -> Result<WifiInterface> {
    let fallback = interfaces.first().cloned();
    interfaces
        .into_iter()
        .find(|i| i.state != "unavailable")
        .or(fallback)
        .ok_or_else(|| WifiError::NoWifiInterface.into())
}
