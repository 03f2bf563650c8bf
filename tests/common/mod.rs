// Recording mock transport shared by the integration tests

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use circuit_cubes::constants::{device_information, gap, uart};
use circuit_cubes::{CubeError, Result, Session, Transport};
use uuid::Uuid;

pub const ADDRESS: &str = "AA:BB:CC:DD:EE:FF";
pub const DISCOVERED: &str = "11:22:33:44:55:66";

/// Everything the cube asked the transport to do, in order
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Op {
    Discover(String),
    Open(String),
    Read(Uuid),
    Write(Uuid, String),
    Close,
}

#[derive(Default)]
struct MockState {
    ops: Vec<Op>,
    // (advertised name, address)
    advertised: Vec<(String, String)>,
    reads: HashMap<Uuid, Vec<u8>>,
    fail_open: bool,
    connection_lost: bool,
    // writes accepted before every later write is rejected
    write_budget: Option<usize>,
}

#[derive(Clone, Default)]
pub struct MockTransport {
    state: Arc<Mutex<MockState>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// A transport whose only peer is a cube with realistic, NUL-padded values
    pub fn circuit_cube() -> Self {
        Self::new()
            .advertise("Tenka-7F3A", DISCOVERED)
            .with_read(gap::DEVICE_NAME, b"Tenka-7F3A\0")
            .with_read(gap::APPEARANCE, &[0x00, 0x00])
            .with_read(device_information::SERIAL_NUMBER, b"SN0042\0\0")
            .with_read(device_information::FIRMWARE_REVISION, b"FW1.3")
            .with_read(device_information::HARDWARE_REVISION, b"HW2.0")
            .with_read(device_information::SOFTWARE_REVISION, b"SW1.1\0")
            .with_read(uart::RX, b"3.92\0\0\0\0")
    }

    pub fn advertise(self, name: &str, address: &str) -> Self {
        self.lock()
            .advertised
            .push((name.to_string(), address.to_string()));
        self
    }

    pub fn with_read(self, characteristic: Uuid, value: &[u8]) -> Self {
        self.lock().reads.insert(characteristic, value.to_vec());
        self
    }

    pub fn failing_open(self) -> Self {
        self.lock().fail_open = true;
        self
    }

    /// Every later read or write reports the peer as disconnected
    pub fn lose_connection(&self) {
        self.lock().connection_lost = true;
    }

    /// Accept `count` more writes, then reject writes without dropping the link
    pub fn reject_writes_after(&self, count: usize) {
        self.lock().write_budget = Some(count);
    }

    pub fn ops(&self) -> Vec<Op> {
        self.lock().ops.clone()
    }

    /// Payloads written to TX, in order
    pub fn writes(&self) -> Vec<String> {
        self.lock()
            .ops
            .iter()
            .filter_map(|op| match op {
                Op::Write(uuid, payload) if *uuid == uart::TX => Some(payload.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn clear_ops(&self) {
        self.lock().ops.clear();
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap()
    }

    fn record(&self, op: Op) {
        self.lock().ops.push(op);
    }
}

#[async_trait]
impl Transport for MockTransport {
    type Session = MockSession;

    async fn discover(&self, name_marker: &str) -> Result<Option<String>> {
        self.record(Op::Discover(name_marker.to_string()));
        Ok(self
            .lock()
            .advertised
            .iter()
            .find(|(name, _)| name.contains(name_marker))
            .map(|(_, address)| address.clone()))
    }

    async fn open(&self, address: &str) -> Result<MockSession> {
        self.record(Op::Open(address.to_string()));
        if self.lock().fail_open {
            return Err(CubeError::ConnectionFailed {
                address: address.to_string(),
                reason: "peer refused".to_string(),
            });
        }
        Ok(MockSession {
            transport: self.clone(),
        })
    }
}

pub struct MockSession {
    transport: MockTransport,
}

impl MockSession {
    fn check_link(&self) -> Result<()> {
        if self.transport.lock().connection_lost {
            return Err(CubeError::Ble(btleplug::Error::NotConnected));
        }
        Ok(())
    }
}

#[async_trait]
impl Session for MockSession {
    async fn read(&self, characteristic: Uuid) -> Result<Vec<u8>> {
        self.transport.record(Op::Read(characteristic));
        self.check_link()?;
        self.transport
            .lock()
            .reads
            .get(&characteristic)
            .cloned()
            .ok_or(CubeError::CharacteristicNotFound(characteristic))
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<()> {
        self.transport.record(Op::Write(
            characteristic,
            String::from_utf8_lossy(payload).into_owned(),
        ));
        self.check_link()?;
        match &mut self.transport.lock().write_budget {
            Some(0) => Err(CubeError::CharacteristicNotFound(characteristic)),
            Some(remaining) => {
                *remaining -= 1;
                Ok(())
            }
            None => Ok(()),
        }
    }

    async fn close(&self) -> Result<()> {
        self.transport.record(Op::Close);
        Ok(())
    }
}
