mod config;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Parser, Subcommand, ValueEnum};
use ecocharge_client::{ApiClient, AuthGate, CredentialStore, Terminal, TelemetryPoller};
use ecocharge_core::{ChargingMode, PowerSource, TelemetrySnapshot, TerminalError};

use crate::config::TerminalConfig;

/// Command line arguments for the ecocharge terminal
#[derive(Parser, Debug)]
#[command(name = "ecocharge-term")]
#[command(about = "EcoCharge charging-network terminal and operator dashboard")]
struct Args {
    /// Path to a terminal configuration JSON file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Backend base URL, overrides the configuration file
    #[arg(long)]
    base_url: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Register a vehicle and request a charging slot
    Connect {
        /// Vehicle identifier, e.g. MH-12-AB-1234
        vehicle: String,
        /// Charging mode
        #[arg(long, value_enum, default_value = "charge-now")]
        mode: ModeArg,
        /// Energy limit in kWh, custom mode only
        #[arg(long)]
        kwh: Option<u32>,
    },
    /// Log in as an operator
    Login { username: String, password: String },
    /// Drop the stored operator credential
    Logout,
    /// Follow live grid telemetry until Ctrl-C
    Watch,
}

#[derive(ValueEnum, Debug, Clone, Copy)]
enum ModeArg {
    ChargeNow,
    FullCharge,
    Custom,
}

impl From<ModeArg> for ChargingMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::ChargeNow => ChargingMode::ChargeNow,
            ModeArg::FullCharge => ChargingMode::FullCharge,
            ModeArg::Custom => ChargingMode::Custom,
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    tracing_subscriber::fmt().pretty().init();

    // Load configuration, file first, flags on top
    let mut config = match &args.config {
        Some(path) => {
            let contents = tokio::fs::read_to_string(path).await.map_err(|e| {
                format!("Failed to read config file '{}': {}", path.display(), e)
            })?;
            serde_json::from_str::<TerminalConfig>(&contents).map_err(|e| {
                format!("Failed to parse config file '{}': {}", path.display(), e)
            })?
        }
        None => TerminalConfig::default(),
    };
    if let Some(base_url) = args.base_url {
        config.base_url = base_url;
    }

    tracing::info!("Using backend at {}", config.base_url);

    let credentials = Arc::new(match &config.credential_dir {
        Some(dir) => CredentialStore::with_dir(dir.clone()),
        None => CredentialStore::open_default(),
    });
    let api = ApiClient::new(config.base_url.clone(), credentials);

    match args.command {
        Command::Connect { vehicle, mode, kwh } => connect(api, &vehicle, mode.into(), kwh).await,
        Command::Login { username, password } => {
            let gate = AuthGate::new(api);
            gate.login(&username, &password).await?;
            println!("Login successful");
            Ok(())
        }
        Command::Logout => {
            AuthGate::new(api).logout();
            println!("Logged out");
            Ok(())
        }
        // A zero interval would spin the print loop
        Command::Watch => watch(api, Duration::from_secs(config.poll_interval_secs.max(1))).await,
    }
}

async fn connect(
    api: ApiClient,
    vehicle: &str,
    mode: ChargingMode,
    kwh: Option<u32>,
) -> Result<(), Box<dyn std::error::Error>> {
    let terminal = Terminal::new(api);

    // Feed the identifier through the segmented composer; a malformed
    // identifier surfaces as IncompleteIdentifier at submit time
    for (segment, part) in vehicle.split('-').take(4).enumerate() {
        terminal.input(segment, part);
    }
    terminal.select_mode(mode);
    if let Some(kwh) = kwh {
        terminal.set_custom_kwh(kwh);
    }

    match terminal.submit().await {
        Ok(Some(result)) => {
            println!("Assigned slot: {}", result.slot_id);
            println!("{}", source_banner(result.power_source()));
            println!("Total estimated bill: {:.2}", result.est_bill);
            Ok(())
        }
        Ok(None) => Ok(()),
        Err(TerminalError::IncompleteIdentifier) => {
            Err("Please enter a valid vehicle number (AA-11-AA-1111)".into())
        }
        Err(TerminalError::GridCapacityExceeded) => {
            Err("Grid capacity reached. Please wait.".into())
        }
        Err(_) => Err("Connection failed. Reconnecting to Grid...".into()),
    }
}

fn source_banner(source: Option<PowerSource>) -> &'static str {
    match source {
        Some(PowerSource::Renewable) => "Powered by Green Energy",
        Some(PowerSource::Conventional) => "Grid Power (High Load)",
        Some(PowerSource::Paused) => "Waiting for Solar Peak",
        None => "Power source pending",
    }
}

async fn watch(api: ApiClient, period: Duration) -> Result<(), Box<dyn std::error::Error>> {
    let gate = AuthGate::new(api.clone());
    if gate.check_access().is_err() {
        return Err("Not logged in. Run `ecocharge-term login <username> <password>` first.".into());
    }

    let mut poller = TelemetryPoller::with_period(api, period);
    poller.start();
    println!("Watching grid telemetry, Ctrl-C to stop");

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            _ = tokio::time::sleep(period) => {
                if let Some(snapshot) = poller.latest() {
                    print_snapshot(&snapshot);
                }
            }
        }
    }

    poller.stop();
    Ok(())
}

fn print_snapshot(snapshot: &TelemetrySnapshot) {
    println!(
        "load {:.0}/{:.0} kW ({:.0}%) | green score {:.0} | mix R:{} C:{} P:{} | solar {:.0} kW wind {:.0} kW net green {:.0} kW",
        snapshot.current_load.value,
        snapshot.current_load.capacity,
        snapshot.current_load.percentage,
        snapshot.system_health.green_score,
        snapshot.energy_mix.renewable_users,
        snapshot.energy_mix.conventional_users,
        snapshot.energy_mix.paused_users,
        snapshot.predictions.solar_now_kw,
        snapshot.predictions.wind_now_kw,
        snapshot.predictions.net_green_available_kw,
    );
    for session in &snapshot.live_sessions {
        println!(
            "  slot {} vehicle {} mode {} source {}",
            session.slot, session.vehicle, session.mode, session.source
        );
    }
}
