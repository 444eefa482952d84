use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum WifiError {
    #[error("Permission to scan for WiFi networks was not granted")]
    PermissionDenied,

    #[error("WiFi radio is disabled")]
    RadioDisabled,

    #[error("Failed to start WiFi scan")]
    ScanFailed,

    #[error("Password required for '{0}'")]
    PasswordRequired(String),

    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("No WiFi interface found")]
    NoWifiInterface,

    #[error("Interface '{0}' not found")]
    InterfaceNotFound(String),

    #[error("Failed to execute nmcli: {0}")]
    NmcliExecution(String),

    #[error("Failed to parse nmcli output: {0}")]
    NmcliParse(String),

    #[error("Network '{0}' not found")]
    NetworkNotFound(String),

    #[error("No saved profile for '{0}'")]
    ProfileNotFound(String),
}
