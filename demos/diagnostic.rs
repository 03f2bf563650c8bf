// Cube diagnostic: READ-ONLY check of the Bluetooth link
//
// Connects, prints device information and battery voltage, disconnects.
// Nothing is written except the battery query, so no motor moves.
//
// Usage: cargo run --example diagnostic -- [address]
// Without an address the first cube advertising "Tenka" is used.

use circuit_cubes::{BlockingCube, CubeConfig};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("debug".parse().unwrap()),
        )
        .init();

    let config = CubeConfig {
        address: std::env::args().nth(1),
        ..CubeConfig::default()
    };

    println!("Circuit Cube diagnostic (read-only)");
    println!();
    match &config.address {
        Some(address) => println!("Target address: {}", address),
        None => println!("Scanning for a cube advertising {:?}", config.name_marker),
    }
    println!();

    println!("Step 1: Connecting...");
    let mut cube = match BlockingCube::connect_with(config) {
        Ok(cube) => {
            println!("  ✓ Connected to {}", cube.address().unwrap_or("?"));
            cube
        }
        Err(e) => {
            println!("  ✗ Failed to connect: {}", e);
            println!();
            println!("Troubleshooting:");
            println!("  - Check the cube is switched on (the LED blinks while advertising)");
            println!("  - Make sure no phone or tablet is still connected to it");
            println!("  - On macOS, allow Bluetooth access for your terminal");
            return Err(e.into());
        }
    };
    println!();

    println!("Step 2: Reading device information...");
    match cube.information() {
        Ok(info) => println!("{}", info),
        Err(e) => println!("  ✗ ERROR: {}", e),
    }
    println!();

    println!("Step 3: Reading battery voltage...");
    match cube.battery() {
        Ok(voltage) => println!("  Battery voltage: {}", voltage),
        Err(e) => println!("  ✗ ERROR: {}", e),
    }
    println!();

    cube.disconnect()?;
    println!("Diagnostic complete.");
    println!("Next step: cargo run --example motor_test");

    Ok(())
}
