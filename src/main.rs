use anyhow::{anyhow, bail, Result};
use clap::{Parser, Subcommand, ValueEnum};
use std::sync::Arc;
use std::time::Duration;
use tracing::warn;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use wifi_connect::{
    config::{self, Config, NetworkConfig},
    interface,
    platform::display_status,
    profile::find_saved,
    router::OutcomeReceiver,
    scan, CapabilityLevel, NmcliPlatform, Selection, UserMessage, WifiContext, WifiController,
    WifiError,
};

#[derive(Parser)]
#[command(name = "wifi-connect")]
#[command(about = "Scan for nearby WiFi access points and connect to them")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum Mode {
    /// Saved-profile connection path
    Legacy,
    /// Ephemeral network-request path
    Modern,
}

impl From<Mode> for CapabilityLevel {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Legacy => CapabilityLevel::Legacy,
            Mode::Modern => CapabilityLevel::Modern,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum RadioAction {
    On,
    Off,
    Toggle,
}

#[derive(Subcommand)]
enum Commands {
    /// List available WiFi interfaces
    ListInterfaces,

    /// Scan for WiFi networks
    Scan {
        /// Interface to use (defaults to the configured or first WiFi interface)
        #[arg(short, long)]
        interface: Option<String>,

        /// Print results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Connect to a WiFi network
    Connect {
        /// SSID of the network to connect to
        ssid: String,

        /// Password for the network (uses saved password if not provided)
        #[arg(short, long)]
        password: Option<String>,

        /// Interface to use (defaults to the configured or first WiFi interface)
        #[arg(short, long)]
        interface: Option<String>,

        /// Save credentials to config file
        #[arg(short, long)]
        save: bool,

        /// Connection path (defaults to config, then modern)
        #[arg(short, long, value_enum)]
        mode: Option<Mode>,
    },

    /// Show connection status
    Status {
        /// Interface to check
        #[arg(short, long)]
        interface: Option<String>,
    },

    /// Disconnect from the current network
    Disconnect {
        /// Interface to disconnect
        #[arg(short, long)]
        interface: Option<String>,
    },

    /// Show or change the WiFi radio state
    Radio {
        #[arg(value_enum)]
        action: Option<RadioAction>,
    },

    /// Remove a saved network profile and any saved credentials
    Forget {
        /// SSID of the network
        ssid: String,

        /// Interface the profile belongs to
        #[arg(short, long)]
        interface: Option<String>,
    },

    /// Save network credentials to config file
    SaveNetwork {
        /// SSID of the network
        ssid: String,

        /// Password for the network
        #[arg(short, long)]
        password: String,

        /// Preferred interface for this network
        #[arg(short, long)]
        interface: Option<String>,
    },

    /// Show saved configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let result = match cli.command {
        Commands::ListInterfaces => cmd_list_interfaces(),
        Commands::Scan { interface, json } => cmd_scan(interface.as_deref(), json).await,
        Commands::Connect {
            ssid,
            password,
            interface,
            save,
            mode,
        } => {
            cmd_connect(
                &ssid,
                password.as_deref(),
                interface.as_deref(),
                save,
                mode.map(CapabilityLevel::from),
            )
            .await
        }
        Commands::Status { interface } => cmd_status(interface.as_deref()),
        Commands::Disconnect { interface } => cmd_disconnect(interface.as_deref()),
        Commands::Radio { action } => cmd_radio(action),
        Commands::Forget { ssid, interface } => cmd_forget(&ssid, interface.as_deref()),
        Commands::SaveNetwork {
            ssid,
            password,
            interface,
        } => cmd_save_network(&ssid, &password, interface.as_deref()),
        Commands::ShowConfig => cmd_show_config(),
    };

    match result {
        Err(e) => match UserMessage::from_error(&e) {
            Some(msg) => {
                eprintln!("{}", msg);
                std::process::exit(1);
            }
            None => Err(e),
        },
        ok => ok,
    }
}

fn init_tracing(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default)))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .init();
}

fn open_controller(
    cfg: &Config,
    interface: Option<&str>,
    mode: Option<CapabilityLevel>,
) -> Result<(WifiController, OutcomeReceiver)> {
    let iface = interface::resolve_interface(interface, cfg.default_interface.as_deref())?;
    let level = mode.or(cfg.connect_mode).unwrap_or(CapabilityLevel::Modern);

    let platform = Arc::new(NmcliPlatform::with_level(&iface.name, level));
    let (outcomes, rx) = wifi_connect::outcome_channel();
    let ctx = WifiContext::new(platform, outcomes);

    Ok((WifiController::new(ctx), rx))
}

/// Requests a scan and loads the results. A refused scan falls back to the
/// platform's cached results.
async fn scan_into(controller: &mut WifiController, settle: Duration) -> Result<()> {
    match controller.request_scan() {
        Ok(()) => {
            println!("{}", UserMessage::Scanning);
            tokio::time::sleep(settle).await;
            controller.on_scan_results(true)?;
        }
        Err(e) if matches!(e.downcast_ref::<WifiError>(), Some(WifiError::ScanFailed)) => {
            warn!("scan refused, using cached results");
            controller.on_scan_results(false)?;
        }
        Err(e) => return Err(e),
    }
    Ok(())
}

fn cmd_list_interfaces() -> Result<()> {
    let interfaces = interface::list_wifi_interfaces()?;

    if interfaces.is_empty() {
        println!("No WiFi interfaces found.");
        return Ok(());
    }

    println!("{:<16} {}", "INTERFACE", "STATE");
    println!("{}", "-".repeat(32));

    for iface in interfaces {
        println!("{:<16} {}", iface.name, iface.state);
    }

    Ok(())
}

async fn cmd_scan(interface: Option<&str>, json: bool) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let (mut controller, _rx) = open_controller(&cfg, interface, None)?;

    scan_into(&mut controller, cfg.scan_settle()).await?;

    let rows = controller.rows();
    if json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!();
        scan::display_networks(&rows);
    }

    Ok(())
}

async fn cmd_connect(
    ssid: &str,
    password: Option<&str>,
    interface: Option<&str>,
    save: bool,
    mode: Option<CapabilityLevel>,
) -> Result<()> {
    let mut cfg = Config::load().unwrap_or_default();
    let (mut controller, mut rx) = open_controller(&cfg, interface, mode)?;

    scan_into(&mut controller, cfg.scan_settle()).await?;

    // Password from argument or config
    let password = match password {
        Some(p) => p.to_string(),
        None => match cfg.find_network(ssid) {
            Some(network) => {
                println!("Using saved password for '{}'", ssid);
                network.password.clone()
            }
            None => String::new(),
        },
    };

    println!(
        "Connecting to '{}' ({} path)...",
        ssid,
        controller.context().level()
    );

    match controller.select_ssid(ssid)? {
        Selection::Submitted(_) => {}
        Selection::PromptPassword(ap) => controller.submit_password(&ap, &password)?,
    }

    let outcome = tokio::time::timeout(cfg.outcome_timeout(), rx.recv())
        .await
        .map_err(|_| anyhow!("Timed out waiting for '{}'", ssid))?
        .ok_or_else(|| anyhow!("Outcome channel closed"))?;

    if !outcome.success {
        return Err(WifiError::ConnectionFailed(ssid.to_string()).into());
    }
    println!("{}", UserMessage::from_outcome(&outcome));

    if save && !password.is_empty() {
        cfg.add_network(NetworkConfig {
            ssid: ssid.to_string(),
            password,
            interface: interface.map(String::from),
        });
        cfg.save()?;
        println!("Credentials saved to config.");
    }

    println!();
    let status = controller.context().platform().status()?;
    display_status(&status);

    Ok(())
}

fn cmd_status(interface: Option<&str>) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let (controller, _rx) = open_controller(&cfg, interface, None)?;

    let status = controller.context().platform().status()?;
    display_status(&status);

    Ok(())
}

fn cmd_disconnect(interface: Option<&str>) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let (controller, _rx) = open_controller(&cfg, interface, None)?;

    let platform = controller.context().platform();
    println!("Disconnecting...");
    platform.disconnect()?;
    println!("Disconnected.");

    Ok(())
}

fn cmd_radio(action: Option<RadioAction>) -> Result<()> {
    let cfg = Config::load().unwrap_or_default();
    let (controller, _rx) = open_controller(&cfg, None, None)?;

    let state = match action {
        None => controller.radio_state()?,
        Some(RadioAction::On) => controller.set_radio(true)?,
        Some(RadioAction::Off) => controller.set_radio(false)?,
        Some(RadioAction::Toggle) => controller.toggle_radio()?,
    };
    println!("{}", UserMessage::Radio(state));

    Ok(())
}

fn cmd_forget(ssid: &str, interface: Option<&str>) -> Result<()> {
    let mut cfg = Config::load().unwrap_or_default();
    let (controller, _rx) = open_controller(&cfg, interface, None)?;
    let platform = controller.context().platform();

    let saved = platform.configured_networks()?;
    let removed_profile = match find_saved(&saved, ssid) {
        Some(profile) => {
            platform.remove_network(&profile.id)?;
            println!("Removed profile '{}' ({})", ssid, profile.id);
            true
        }
        None => false,
    };

    let removed_credentials = cfg.remove_network(ssid);
    if removed_credentials {
        cfg.save()?;
        println!("Removed saved credentials for '{}'", ssid);
    }

    if !removed_profile && !removed_credentials {
        bail!(WifiError::ProfileNotFound(ssid.to_string()));
    }

    Ok(())
}

fn cmd_save_network(ssid: &str, password: &str, interface: Option<&str>) -> Result<()> {
    let mut cfg = Config::load().unwrap_or_default();

    cfg.add_network(NetworkConfig {
        ssid: ssid.to_string(),
        password: password.to_string(),
        interface: interface.map(String::from),
    });

    cfg.save()?;

    let path = config::config_path()?;
    println!("Saved network '{}' to {}", ssid, path.display());

    Ok(())
}

fn cmd_show_config() -> Result<()> {
    let path = config::config_path()?;
    println!("Config file: {}", path.display());
    println!();

    let cfg = Config::load()?;

    if let Some(ref iface) = cfg.default_interface {
        println!("Default interface: {}", iface);
    }
    if let Some(mode) = cfg.connect_mode {
        println!("Connect mode:      {}", mode);
    }

    if cfg.networks.is_empty() {
        println!("No saved networks.");
    } else {
        println!("{:<24} {:<20} {}", "SSID", "INTERFACE", "PASSWORD");
        println!("{}", "-".repeat(60));
        for network in &cfg.networks {
            let iface = network.interface.as_deref().unwrap_or("-");
            let masked_pw = "*".repeat(network.password.len().min(12));
            println!("{:<24} {:<20} {}", network.ssid, iface, masked_pw);
        }
    }

    Ok(())
}
