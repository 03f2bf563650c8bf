// Motor command encoding
//
// Wire format: [sign][magnitude, 3 digits][motor letter], e.g. "+095a".
// The motors do not turn below a raw magnitude of 55, so non-zero velocities
// are shifted up by that dead zone.

use std::fmt;
use std::str::FromStr;

use tracing::debug;

use crate::error::{CubeError, Result};

/// Raw magnitude below which the motor does not move
pub const DEAD_ZONE: u16 = 55;

/// Largest accepted velocity magnitude
pub const MAX_VELOCITY: i32 = 100;

/// One of the three motor channels on a cube
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Motor {
    A,
    B,
    C,
}

impl Motor {
    pub const ALL: [Motor; 3] = [Motor::A, Motor::B, Motor::C];

    /// Channel number: A=0, B=1, C=2
    pub fn channel(self) -> u8 {
        match self {
            Motor::A => 0,
            Motor::B => 1,
            Motor::C => 2,
        }
    }

    /// Lower-case letter used on the wire
    pub fn wire_letter(self) -> char {
        (b'a' + self.channel()) as char
    }
}

impl fmt::Display for Motor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let letter = match self {
            Motor::A => "A",
            Motor::B => "B",
            Motor::C => "C",
        };
        f.write_str(letter)
    }
}

impl FromStr for Motor {
    type Err = CubeError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "A" | "a" => Ok(Motor::A),
            "B" | "b" => Ok(Motor::B),
            "C" | "c" => Ok(Motor::C),
            other => Err(CubeError::InvalidMotor(other.to_string())),
        }
    }
}

/// A validated (motor, velocity) pair ready to be written to TX
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MotorCommand {
    motor: Motor,
    velocity: i32,
}

impl MotorCommand {
    /// Velocity must lie in -100..=100
    pub fn new(motor: Motor, velocity: i32) -> Result<Self> {
        // Doubled to the motor's nominal -200..=200 range before checking
        if velocity.unsigned_abs().saturating_mul(2) > 200 {
            return Err(CubeError::VelocityOutOfRange(velocity));
        }
        Ok(Self { motor, velocity })
    }

    pub fn stop(motor: Motor) -> Self {
        Self { motor, velocity: 0 }
    }

    pub fn motor(&self) -> Motor {
        self.motor
    }

    pub fn velocity(&self) -> i32 {
        self.velocity
    }

    /// Raw magnitude sent to the motor, 0 or 56..=155
    pub fn magnitude(&self) -> u16 {
        match self.velocity {
            0 => 0,
            v => DEAD_ZONE + v.unsigned_abs() as u16,
        }
    }

    pub fn to_payload(&self) -> Vec<u8> {
        self.to_string().into_bytes()
    }
}

impl fmt::Display for MotorCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.velocity < 0 { '-' } else { '+' };
        write!(f, "{}{:03}{}", sign, self.magnitude(), self.motor.wire_letter())
    }
}

/// Encode a motor command from a motor letter ("A", "B" or "C") and a velocity
pub fn encode_motor_command(motor: &str, velocity: i32) -> Result<String> {
    let command = MotorCommand::new(motor.parse()?, velocity)?.to_string();
    debug!("Command string: {}", command);
    Ok(command)
}
