mod common;

use std::time::Duration;

use circuit_cubes::{BlockingCube, CubeConfig, CubeError, CubeState, Dispatcher, Motor, block_on};
use common::{ADDRESS, MockTransport, Op};

fn quiet_config() -> CubeConfig {
    CubeConfig {
        verbose: false,
        ..CubeConfig::default()
    }
}

fn exercise(cube: &mut BlockingCube<MockTransport>, transport: &MockTransport) {
    cube.connect(Some(ADDRESS)).unwrap();
    assert_eq!(cube.state(), CubeState::Connected);

    assert_eq!(cube.battery().unwrap(), "3.92");
    assert_eq!(cube.information().unwrap().name, "Tenka-7F3A");

    transport.clear_ops();
    cube.run_motor(Motor::A, 40, Duration::from_millis(10), false)
        .unwrap();
    cube.run_motors(&[(Motor::B, -10), (Motor::C, 0)], Duration::ZERO, true)
        .unwrap();
    cube.halt().unwrap();
    assert_eq!(
        transport.writes(),
        vec!["+095a", "+000a", "-065b", "+000c", "+000a", "+000b", "+000c"]
    );

    cube.disconnect().unwrap();
    assert_eq!(cube.state(), CubeState::Disconnected);
}

#[test]
fn test_blocking_without_runtime() {
    assert!(matches!(Dispatcher::new().unwrap(), Dispatcher::Owned(_)));

    let transport = MockTransport::circuit_cube();
    let mut cube = BlockingCube::new(transport.clone(), quiet_config()).unwrap();
    exercise(&mut cube, &transport);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 2)]
async fn test_blocking_reuses_running_runtime() {
    assert!(matches!(Dispatcher::new().unwrap(), Dispatcher::Ambient(_)));

    let transport = MockTransport::circuit_cube();
    let mut cube = BlockingCube::new(transport.clone(), quiet_config()).unwrap();
    exercise(&mut cube, &transport);
}

#[tokio::test]
async fn test_blocking_refused_on_current_thread_runtime() {
    assert!(matches!(
        Dispatcher::new(),
        Err(CubeError::BlockingUnsupported)
    ));
    assert!(BlockingCube::new(MockTransport::circuit_cube(), quiet_config()).is_err());
}

#[test]
fn test_owned_dispatcher_inside_multi_thread_runtime() {
    let transport = MockTransport::circuit_cube();
    let mut cube = BlockingCube::new(transport.clone(), quiet_config()).unwrap();
    cube.connect(Some(ADDRESS)).unwrap();
    transport.clear_ops();

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async move {
        cube.halt().unwrap();
        assert_eq!(cube.battery().unwrap(), "3.92");
        // Dropping in async code disconnects and shuts the owned runtime down
        drop(cube);
    });

    assert_eq!(transport.writes(), vec!["+000a", "+000b", "+000c", "b"]);
    assert_eq!(transport.ops().last(), Some(&Op::Close));
}

#[test]
fn test_owned_dispatcher_refused_on_current_thread_runtime() {
    let transport = MockTransport::circuit_cube();
    let mut cube = BlockingCube::new(transport.clone(), quiet_config()).unwrap();
    cube.connect(Some(ADDRESS)).unwrap();
    transport.clear_ops();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .unwrap();
    runtime.block_on(async move {
        assert!(matches!(cube.halt(), Err(CubeError::BlockingUnsupported)));
        assert_eq!(cube.state(), CubeState::Connected);
        // Drop logs the failed disconnect instead of panicking
        drop(cube);
    });

    assert!(transport.ops().is_empty());
}

#[test]
fn test_block_on_helper() {
    let value = block_on(async {
        tokio::time::sleep(Duration::from_millis(1)).await;
        42
    })
    .unwrap();
    assert_eq!(value, 42);
}

#[test]
fn test_drop_disconnects() {
    let transport = MockTransport::circuit_cube();
    {
        let mut cube = BlockingCube::new(transport.clone(), quiet_config()).unwrap();
        cube.connect(Some(ADDRESS)).unwrap();
    }
    assert_eq!(transport.ops().last(), Some(&Op::Close));
}

#[test]
fn test_blocking_errors_propagate() {
    let transport = MockTransport::new();
    let mut cube = BlockingCube::new(transport, quiet_config()).unwrap();

    assert!(matches!(cube.connect(None), Err(CubeError::NoDevice { .. })));
    assert!(matches!(cube.halt(), Err(CubeError::NotConnected)));
    assert!(matches!(
        cube.run_motor(Motor::A, 500, Duration::ZERO, false),
        Err(CubeError::VelocityOutOfRange(500))
    ));
    assert_eq!(cube.get_constant(3).unwrap(), "6e400003-b5a3-f393-e0a9-e50e24dcca9e");
}
