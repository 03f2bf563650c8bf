// Circuit Cubes
//
// Control a Circuit Cubes battery cube over Bluetooth Low Energy: connect,
// read device information and battery voltage, drive the three motors.
//
// Example:
//
// use std::time::Duration;
// use circuit_cubes::{BlockingCube, CubeConfig, Motor};
//
// fn main() -> circuit_cubes::Result<()> {
//     // Scans for a cube advertising "Tenka" and connects to it
//     let mut cube = BlockingCube::connect_with(CubeConfig::default())?;
//
//     println!("{}", cube.information()?);
//     cube.run_motor(Motor::A, 40, Duration::from_secs(2), false)?;
//     cube.halt()?;
//     cube.disconnect()
// }

pub mod blocking;
pub mod cli;
pub mod config;
pub mod constants;
pub mod cube;
pub mod device;
pub mod error;
pub mod motor;
pub mod platform;
pub mod transport;

pub use blocking::{BlockingCube, Dispatcher, OwnedRuntime, block_on};
pub use config::CubeConfig;
pub use constants::Constants;
pub use cube::{Cube, CubeState};
pub use device::DeviceInfo;
pub use error::{CubeError, Result};
pub use motor::{Motor, MotorCommand, encode_motor_command};
pub use transport::{BtleTransport, Session, Transport};
