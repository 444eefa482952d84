//! Scan results and their presentation.
//!
//! The platform delivers a fresh batch of access points each time a scan
//! completes. [`ScanResultStore::replace`] swaps the whole batch in:
//!
//! 1. Entries with an empty SSID (hidden networks) are dropped
//! 2. The remaining entries are sorted by signal level, strongest first
//! 3. Ties keep the order the platform reported them in
//!
//! Nothing is merged across scans; the previous batch is discarded.
//!
//! # Example
//!
//! ```
//! use wifi_connect::scan::{AccessPoint, ScanResultStore};
//!
//! let mut store = ScanResultStore::default();
//! store.replace(vec![
//!     AccessPoint::new("Cafe", "[ESS]", -72),
//!     AccessPoint::new("", "[ESS]", -30),
//!     AccessPoint::new("Home", "[WPA2-PSK-CCMP][ESS]", -41),
//! ]);
//!
//! let names: Vec<_> = store.access_points().iter().map(|ap| ap.ssid.as_str()).collect();
//! assert_eq!(names, ["Home", "Cafe"]);
//! ```

use serde::Serialize;

use crate::security::{classify, security_label, SecurityClass};

/// A discovered access point from one scan cycle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AccessPoint {
    /// Network name. Empty for hidden networks.
    pub ssid: String,

    /// Raw capability string as advertised, e.g. `[WPA2-PSK-CCMP][ESS]`.
    pub capabilities: String,

    /// Signal level in dBm. Closer to zero is stronger.
    pub level: i32,
}

impl AccessPoint {
    pub fn new(ssid: impl Into<String>, capabilities: impl Into<String>, level: i32) -> Self {
        Self {
            ssid: ssid.into(),
            capabilities: capabilities.into(),
            level,
        }
    }

    pub fn security_class(&self) -> SecurityClass {
        classify(&self.capabilities)
    }

    pub fn signal_tier(&self) -> u8 {
        signal_tier(self.level)
    }
}

/// Holds the most recent batch of access points, filtered and sorted.
#[derive(Debug, Default)]
pub struct ScanResultStore {
    access_points: Vec<AccessPoint>,
}

impl ScanResultStore {
    /// Replaces the stored batch with `batch`.
    pub fn replace(&mut self, batch: Vec<AccessPoint>) {
        self.access_points = batch.into_iter().filter(|ap| !ap.ssid.is_empty()).collect();
        sort_by_level(&mut self.access_points);
    }

    pub fn access_points(&self) -> &[AccessPoint] {
        &self.access_points
    }

    pub fn get(&self, index: usize) -> Option<&AccessPoint> {
        self.access_points.get(index)
    }

    /// First entry with an exact SSID match.
    pub fn find(&self, ssid: &str) -> Option<&AccessPoint> {
        self.access_points.iter().find(|ap| ap.ssid == ssid)
    }

    pub fn len(&self) -> usize {
        self.access_points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.access_points.is_empty()
    }

    /// Presentation rows in display order.
    pub fn rows(&self) -> Vec<NetworkRow> {
        self.access_points.iter().map(NetworkRow::from).collect()
    }
}

/// Stable sort, strongest signal first.
pub fn sort_by_level(access_points: &mut [AccessPoint]) {
    access_points.sort_by(|a, b| b.level.cmp(&a.level));
}

/// Maps a dBm level to one of five strength tiers.
///
/// | level (dBm)   | tier |
/// |---------------|------|
/// | >= -50        | 5    |
/// | [-70, -50)    | 4    |
/// | [-80, -70)    | 3    |
/// | [-100, -80)   | 2    |
/// | < -100        | 1    |
pub fn signal_tier(level: i32) -> u8 {
    match level {
        l if l >= -50 => 5,
        l if l >= -70 => 4,
        l if l >= -80 => 3,
        l if l >= -100 => 2,
        _ => 1,
    }
}

/// One rendered line of the network list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NetworkRow {
    pub ssid: String,
    pub security: &'static str,
    pub level: i32,
    pub tier: u8,
}

impl From<&AccessPoint> for NetworkRow {
    fn from(ap: &AccessPoint) -> Self {
        NetworkRow {
            ssid: ap.ssid.clone(),
            security: security_label(&ap.capabilities),
            level: ap.level,
            tier: ap.signal_tier(),
        }
    }
}

/// Prints the network list as a table.
///
/// ```text
/// SSID                             SIGNAL       SECURITY
/// ------------------------------------------------------------
/// HomeNet                          -41 dBm ████ secured
/// OpenCafe                         -72 dBm ██░░ open
/// ```
pub fn display_networks(rows: &[NetworkRow]) {
    if rows.is_empty() {
        println!("No networks found.");
        return;
    }

    println!("{:<32} {:<12} {}", "SSID", "SIGNAL", "SECURITY");
    println!("{}", "-".repeat(60));

    for row in rows {
        println!(
            "{:<32} {:>4} dBm {} {}",
            truncate_ssid(&row.ssid, 32),
            row.level,
            tier_to_bar(row.tier),
            row.security
        );
    }
}

/// Truncates to `max_len` characters, ending in "..." when cut.
fn truncate_ssid(ssid: &str, max_len: usize) -> String {
    if ssid.chars().count() > max_len {
        let kept: String = ssid.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", kept)
    } else {
        ssid.to_string()
    }
}

fn tier_to_bar(tier: u8) -> &'static str {
    match tier {
        5 => "████",
        4 => "███░",
        3 => "██░░",
        2 => "█░░░",
        _ => "░░░░",
    }
}
