// Command-line front end: one device operation per invocation

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use tracing::info;

use crate::config::{CubeConfig, PROJECT_URL};
use crate::constants::Constants;
use crate::cube::Cube;
use crate::error::{CubeError, Result};
use crate::motor::Motor;
use crate::transport::{BtleTransport, Transport};

#[derive(Debug, Parser)]
#[command(
    name = "circuit-cubes",
    version,
    about = "Control a Circuit Cube over Bluetooth Low Energy",
    after_help = PROJECT_URL
)]
pub struct Cli {
    /// Connect to this address instead of scanning
    #[arg(long, global = true)]
    pub address: Option<String>,

    /// Substring to look for in advertised device names
    #[arg(long, global = true)]
    pub name_marker: Option<String>,

    /// Scan timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub scan_timeout: Option<u64>,

    /// Only log progress at debug level
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// JSON config file; flags override its values
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Scan for a cube and print its address
    Scan,

    /// Print the constant table, or one entry of it
    Constants { index: Option<usize> },

    #[command(flatten)]
    Device(DeviceCommand),
}

/// Commands that need a connected cube
#[derive(Debug, Clone, Subcommand)]
pub enum DeviceCommand {
    /// Print device information
    Info {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the battery voltage
    Battery,

    /// Run motors, e.g. `run A:40 B:-20 --duration 2`
    Run {
        /// MOTOR:VELOCITY pairs, velocity in -100..=100
        #[arg(required = true, value_parser = parse_motor_velocity)]
        motors: Vec<(Motor, i32)>,

        /// Seconds to run before stopping
        #[arg(short, long, default_value = "1", value_parser = parse_duration)]
        duration: Duration,

        /// Leave the motors running afterwards
        #[arg(long)]
        smooth: bool,
    },

    /// Stop all motors
    Halt,
}

impl Cli {
    /// Config file (or defaults) with command-line overrides applied
    pub fn cube_config(&self) -> Result<CubeConfig> {
        let mut config = match &self.config {
            Some(path) => CubeConfig::from_json_file(path)?,
            None => CubeConfig::default(),
        };
        if let Some(address) = &self.address {
            config.address = Some(address.clone());
        }
        if let Some(marker) = &self.name_marker {
            config.name_marker = marker.clone();
        }
        if let Some(secs) = self.scan_timeout {
            config.scan_timeout_secs = secs;
        }
        if self.quiet {
            config.verbose = false;
        }
        Ok(config)
    }
}

pub async fn run(cli: Cli) -> Result<()> {
    let config = cli.cube_config()?;

    match cli.command {
        Command::Constants { index } => print_constants(index),
        Command::Scan => {
            let transport = BtleTransport::new(config.scan_timeout()).await?;
            match transport.discover(&config.name_marker).await? {
                Some(address) => {
                    println!("{}", address);
                    Ok(())
                }
                None => Err(CubeError::NoDevice {
                    marker: config.name_marker,
                }),
            }
        }
        Command::Device(command) => {
            let transport = BtleTransport::new(config.scan_timeout()).await?;
            let mut cube = Cube::new(transport, config);
            cube.connect(None).await?;

            // Always disconnect, but report the command's error first
            let result = execute(&mut cube, &command).await;
            let closed = cube.disconnect().await;
            result.and(closed)
        }
    }
}

/// Run one device command against a connected cube
pub async fn execute<T: Transport>(cube: &mut Cube<T>, command: &DeviceCommand) -> Result<()> {
    match command {
        DeviceCommand::Info { json } => {
            let device = cube.information().await?;
            if *json {
                println!("{}", serde_json::to_string_pretty(&device)?);
            } else {
                println!("{}", device);
            }
        }
        DeviceCommand::Battery => println!("{}", cube.battery().await?),
        DeviceCommand::Run {
            motors,
            duration,
            smooth,
        } => {
            info!("Running {} motor(s) for {:?}", motors.len(), duration);
            cube.run_motors(motors, *duration, *smooth).await?;
        }
        DeviceCommand::Halt => cube.halt().await?,
    }
    Ok(())
}

fn print_constants(index: Option<usize>) -> Result<()> {
    let constants = Constants::new();
    match index {
        Some(i) => println!("{}", constants.get(i)?),
        None => {
            for (i, name, value) in constants.entries() {
                println!("{:>2}  {:<42} {}", i, name, value);
            }
        }
    }
    Ok(())
}

/// Parse "A:40" into (Motor::A, 40)
fn parse_motor_velocity(s: &str) -> std::result::Result<(Motor, i32), String> {
    let (motor, velocity) = s
        .split_once(':')
        .ok_or_else(|| format!("expected MOTOR:VELOCITY, got {:?}", s))?;
    let motor: Motor = motor.trim().parse().map_err(|e: CubeError| e.to_string())?;
    let velocity: i32 = velocity
        .trim()
        .parse()
        .map_err(|e| format!("invalid velocity {:?}: {}", velocity, e))?;
    Ok((motor, velocity))
}

fn parse_duration(s: &str) -> std::result::Result<Duration, String> {
    let secs: f64 = s.parse().map_err(|e| format!("invalid duration {:?}: {}", s, e))?;
    Duration::try_from_secs_f64(secs).map_err(|e| format!("invalid duration {:?}: {}", s, e))
}
