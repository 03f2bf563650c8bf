// High-level Circuit Cube handle
//
// Owns at most one transport session. Every device operation other than
// connect needs that session and fails with NotConnected without it.

use std::fmt;
use std::time::Duration;

use tracing::{debug, error, info, warn};
use uuid::Uuid;

use crate::config::{BATTERY_QUERY, CubeConfig};
use crate::constants::{Constants, device_information, gap, uart};
use crate::device::{DeviceInfo, decode_be_uint, decode_text};
use crate::error::{CubeError, Result};
use crate::motor::{Motor, MotorCommand};
use crate::platform::Platform;
use crate::transport::{Session, Transport};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CubeState {
    Disconnected,
    Connected,
}

// Progress messages are info when verbose, debug otherwise
fn progress(verbose: bool, message: fmt::Arguments<'_>) {
    if verbose {
        info!("{}", message);
    } else {
        debug!("{}", message);
    }
}

fn warn_still_running(commands: &[MotorCommand]) {
    let running: Vec<String> = commands
        .iter()
        .filter(|c| c.magnitude() != 0)
        .map(|c| c.motor().to_string())
        .collect();
    if !running.is_empty() {
        warn!("Motor write failed, motors {} may still be running", running.join(", "));
    }
}

pub struct Cube<T: Transport> {
    transport: T,
    config: CubeConfig,
    constants: Constants,
    session: Option<T::Session>,
}

impl<T: Transport> Cube<T> {
    /// Create a disconnected handle; call [`Cube::connect`] before anything else
    pub fn new(transport: T, config: CubeConfig) -> Self {
        let platform = Platform::current();
        progress(config.verbose, format_args!("Platform is {}", platform));
        if platform.hides_mac_addresses() {
            debug!("Peers on {} are identified by opaque ids", platform);
        }

        Self {
            transport,
            config,
            constants: Constants::new(),
            session: None,
        }
    }

    pub fn state(&self) -> CubeState {
        match self.session {
            Some(_) => CubeState::Connected,
            None => CubeState::Disconnected,
        }
    }

    pub fn is_connected(&self) -> bool {
        self.session.is_some()
    }

    /// Address of the most recently connected cube
    pub fn address(&self) -> Option<&str> {
        Some(self.constants.address()).filter(|a| !a.is_empty())
    }

    pub fn config(&self) -> &CubeConfig {
        &self.config
    }

    pub fn constants(&self) -> &Constants {
        &self.constants
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Look up an entry of the constant table
    pub fn get_constant(&self, index: usize) -> Result<String> {
        let value = self.constants.get(index)?;
        progress(self.config.verbose, format_args!("Constant {}: {}", index, value));
        Ok(value)
    }

    /// Connect to `address`, or to the configured address, or else to the
    /// first cube found advertising the name marker
    pub async fn connect(&mut self, address: Option<&str>) -> Result<()> {
        let explicit = address
            .filter(|a| !a.is_empty())
            .or(self.config.address())
            .map(str::to_string);

        if self.session.is_some() {
            progress(
                self.config.verbose,
                format_args!("Closing current session before reconnecting"),
            );
            if let Err(e) = self.disconnect().await {
                warn!("Failed to close previous session: {}", e);
            }
        }

        let address = match explicit {
            Some(address) => address,
            None => {
                progress(self.config.verbose, format_args!("Scanning for Circuit Cube"));
                match self.transport.discover(&self.config.name_marker).await? {
                    Some(address) => address,
                    None => {
                        warn!("No Circuit Cube device found");
                        return Err(CubeError::NoDevice {
                            marker: self.config.name_marker.clone(),
                        });
                    }
                }
            }
        };

        progress(
            self.config.verbose,
            format_args!("Connecting to Circuit Cube with address {}", address),
        );
        let session = self
            .transport
            .open(&address)
            .await
            .inspect_err(|e| error!("Connection to {} failed: {}", address, e))?;

        self.constants.set_address(address);
        self.session = Some(session);
        Ok(())
    }

    /// Read name, appearance, serial number, revisions and battery voltage
    pub async fn information(&mut self) -> Result<DeviceInfo> {
        self.ensure_connected()?;

        let name = decode_text("device name", &self.read(gap::DEVICE_NAME).await?)?;
        let appearance = decode_be_uint("appearance", &self.read(gap::APPEARANCE).await?)?;
        let serial_number = decode_text(
            "serial number",
            &self.read(device_information::SERIAL_NUMBER).await?,
        )?;
        let firmware = decode_text(
            "firmware revision",
            &self.read(device_information::FIRMWARE_REVISION).await?,
        )?;
        let hardware = decode_text(
            "hardware revision",
            &self.read(device_information::HARDWARE_REVISION).await?,
        )?;
        let software = decode_text(
            "software revision",
            &self.read(device_information::SOFTWARE_REVISION).await?,
        )?;
        let battery_voltage = self.query_battery().await?;

        let info = DeviceInfo {
            name,
            appearance,
            serial_number,
            firmware,
            hardware,
            software,
            battery_voltage,
        };
        progress(self.config.verbose, format_args!("{}", info));
        Ok(info)
    }

    /// Battery voltage as reported by the cube, e.g. "3.92"
    pub async fn battery(&mut self) -> Result<String> {
        self.ensure_connected()?;
        let voltage = self.query_battery().await?;
        progress(self.config.verbose, format_args!("Battery voltage is {}", voltage));
        Ok(voltage)
    }

    /// Run one motor for `duration`, then stop it unless `smooth`
    pub async fn run_motor(
        &mut self,
        motor: Motor,
        velocity: i32,
        duration: Duration,
        smooth: bool,
    ) -> Result<()> {
        self.run_motors(&[(motor, velocity)], duration, smooth).await
    }

    /// Start each motor in order, wait `duration`, then stop them in the same
    /// order unless `smooth`. Nothing is written if any velocity is invalid.
    pub async fn run_motors(
        &mut self,
        motors: &[(Motor, i32)],
        duration: Duration,
        smooth: bool,
    ) -> Result<()> {
        let commands = motors
            .iter()
            .map(|&(motor, velocity)| MotorCommand::new(motor, velocity))
            .collect::<Result<Vec<_>>>()?;
        self.ensure_connected()?;

        for (sent, command) in commands.iter().enumerate() {
            if let Err(e) = self.send(command).await {
                warn_still_running(&commands[..sent]);
                return Err(e);
            }
        }

        tokio::time::sleep(duration).await;

        if !smooth {
            for (stopped, command) in commands.iter().enumerate() {
                if let Err(e) = self.send(&MotorCommand::stop(command.motor())).await {
                    warn_still_running(&commands[stopped..]);
                    return Err(e);
                }
            }
        }
        Ok(())
    }

    /// Stop all three motors, whether running or not
    pub async fn halt(&mut self) -> Result<()> {
        self.ensure_connected()?;
        progress(self.config.verbose, format_args!("Stopping all motors"));
        for motor in Motor::ALL {
            self.send(&MotorCommand::stop(motor)).await?;
        }
        Ok(())
    }

    /// Close the session. Does nothing when already disconnected.
    pub async fn disconnect(&mut self) -> Result<()> {
        match self.session.take() {
            Some(session) => {
                progress(
                    self.config.verbose,
                    format_args!("Disconnecting Circuit Cube"),
                );
                session.close().await
            }
            None => {
                debug!("Disconnect requested with no open session");
                Ok(())
            }
        }
    }

    fn ensure_connected(&self) -> Result<()> {
        match self.session {
            Some(_) => Ok(()),
            None => Err(CubeError::NotConnected),
        }
    }

    async fn query_battery(&mut self) -> Result<String> {
        self.write(uart::TX, BATTERY_QUERY).await?;
        let raw = self.read(uart::RX).await?;
        decode_text("battery voltage", &raw)
    }

    async fn send(&mut self, command: &MotorCommand) -> Result<()> {
        progress(self.config.verbose, format_args!("Command string: {}", command));
        self.write(uart::TX, &command.to_payload()).await
    }

    async fn read(&mut self, characteristic: Uuid) -> Result<Vec<u8>> {
        let session = self.session.as_ref().ok_or(CubeError::NotConnected)?;
        let result = session.read(characteristic).await;
        self.check(result)
    }

    async fn write(&mut self, characteristic: Uuid, payload: &[u8]) -> Result<()> {
        let session = self.session.as_ref().ok_or(CubeError::NotConnected)?;
        let result = session.write(characteristic, payload).await;
        self.check(result)
    }

    /// Drop the session when the transport reports the peer is gone
    fn check<R>(&mut self, result: Result<R>) -> Result<R> {
        if let Err(e) = &result {
            if e.is_fatal() && self.session.take().is_some() {
                warn!("Lost connection to Circuit Cube: {}", e);
            }
        }
        result
    }
}
