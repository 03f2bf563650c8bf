// Motor control module for Circuit Cubes
//
// Provides:
// - Motor channel identifiers (A, B, C)
// - Motor command encoding for the TX characteristic

pub mod command;

pub use command::{DEAD_ZONE, MAX_VELOCITY, Motor, MotorCommand, encode_motor_command};
