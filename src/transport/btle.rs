// btleplug implementation of the transport boundary

use std::time::Duration;

use async_trait::async_trait;
use btleplug::api::{
    Central, CentralEvent, Characteristic, Manager as _, Peripheral as _, ScanFilter, WriteType,
};
use btleplug::platform::{Adapter, Manager, Peripheral};
use futures::StreamExt;
use tokio::time::{Instant, timeout_at};
use tracing::{debug, info, warn};
use uuid::Uuid;

use super::{Session, Transport};
use crate::constants::gap;
use crate::error::{CubeError, Result};

/// What a scan is looking for
#[derive(Debug, Clone, Copy)]
enum Target<'a> {
    NameContains(&'a str),
    Address(&'a str),
}

impl Target<'_> {
    async fn matches(&self, peripheral: &Peripheral) -> Result<bool> {
        Ok(match *self {
            Target::Address(address) => peripheral_address(peripheral).eq_ignore_ascii_case(address),
            Target::NameContains(marker) => peripheral
                .properties()
                .await?
                .and_then(|props| props.local_name)
                .is_some_and(|name| name.contains(marker)),
        })
    }
}

/// Address handed out by discovery and accepted by `open`
#[cfg(not(target_os = "macos"))]
fn peripheral_address(peripheral: &Peripheral) -> String {
    peripheral.address().to_string()
}

// CoreBluetooth reports an all-zero address, peers are only known by id
#[cfg(target_os = "macos")]
fn peripheral_address(peripheral: &Peripheral) -> String {
    peripheral.id().to_string()
}

/// BLE central on the first adapter of the host
pub struct BtleTransport {
    adapter: Adapter,
    scan_timeout: Duration,
}

impl BtleTransport {
    /// Use the host's first Bluetooth adapter
    pub async fn new(scan_timeout: Duration) -> Result<Self> {
        let manager = Manager::new().await?;
        let adapter = manager
            .adapters()
            .await?
            .into_iter()
            .next()
            .ok_or(CubeError::NoAdapter)?;
        info!("Bluetooth adapter: {}", adapter.adapter_info().await?);
        Ok(Self::with_adapter(adapter, scan_timeout))
    }

    pub fn with_adapter(adapter: Adapter, scan_timeout: Duration) -> Self {
        Self {
            adapter,
            scan_timeout,
        }
    }

    /// Scan until a peripheral matches `target` or the scan timeout elapses
    async fn find(&self, target: Target<'_>) -> Result<Option<Peripheral>> {
        let mut events = self.adapter.events().await?;
        self.adapter.start_scan(ScanFilter::default()).await?;
        debug!("Scanning for {:?} ({:?} timeout)", target, self.scan_timeout);

        let found = self.watch(target, &mut events).await;

        if let Err(e) = self.adapter.stop_scan().await {
            warn!("Failed to stop scan: {}", e);
        }
        found
    }

    async fn watch(
        &self,
        target: Target<'_>,
        events: &mut (impl futures::Stream<Item = CentralEvent> + Unpin + Send),
    ) -> Result<Option<Peripheral>> {
        // Devices seen by an earlier scan never produce a new discovery event
        for peripheral in self.adapter.peripherals().await? {
            if target.matches(&peripheral).await? {
                return Ok(Some(peripheral));
            }
        }

        let deadline = Instant::now() + self.scan_timeout;
        loop {
            let id = match timeout_at(deadline, events.next()).await {
                Ok(Some(CentralEvent::DeviceDiscovered(id)))
                | Ok(Some(CentralEvent::DeviceUpdated(id))) => id,
                Ok(Some(_)) => continue,
                Ok(None) | Err(_) => return Ok(None),
            };

            let peripheral = self.adapter.peripheral(&id).await?;
            if target.matches(&peripheral).await? {
                return Ok(Some(peripheral));
            }
        }
    }
}

#[async_trait]
impl Transport for BtleTransport {
    type Session = BtleSession;

    async fn discover(&self, name_marker: &str) -> Result<Option<String>> {
        let found = self.find(Target::NameContains(name_marker)).await?;
        Ok(found.as_ref().map(peripheral_address))
    }

    async fn open(&self, address: &str) -> Result<BtleSession> {
        let peripheral = self
            .find(Target::Address(address))
            .await?
            .ok_or_else(|| CubeError::DeviceNotFound {
                address: address.to_string(),
            })?;

        if !peripheral.is_connected().await? {
            peripheral
                .connect()
                .await
                .map_err(|e| CubeError::ConnectionFailed {
                    address: address.to_string(),
                    reason: e.to_string(),
                })?;
        }
        peripheral.discover_services().await?;
        debug!(
            "Discovered {} characteristics on {}",
            peripheral.characteristics().len(),
            address
        );

        Ok(BtleSession { peripheral })
    }
}

/// Connected btleplug peripheral
pub struct BtleSession {
    peripheral: Peripheral,
}

impl BtleSession {
    fn characteristic(&self, uuid: Uuid) -> Result<Characteristic> {
        self.peripheral
            .characteristics()
            .into_iter()
            .find(|c| c.uuid == uuid)
            .ok_or(CubeError::CharacteristicNotFound(uuid))
    }
}

#[async_trait]
impl Session for BtleSession {
    async fn read(&self, characteristic: Uuid) -> Result<Vec<u8>> {
        match self.characteristic(characteristic) {
            Ok(c) => Ok(self.peripheral.read(&c).await?),
            // BlueZ keeps the GAP service to itself; the advertised name is the same value
            Err(CubeError::CharacteristicNotFound(_)) if characteristic == gap::DEVICE_NAME => {
                debug!("Device name characteristic hidden, using advertised name");
                self.peripheral
                    .properties()
                    .await?
                    .and_then(|props| props.local_name)
                    .map(String::into_bytes)
                    .ok_or(CubeError::CharacteristicNotFound(characteristic))
            }
            Err(e) => Err(e),
        }
    }

    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<()> {
        let c = self.characteristic(characteristic)?;
        self.peripheral
            .write(&c, payload, WriteType::WithoutResponse)
            .await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.peripheral.disconnect().await?;
        Ok(())
    }
}
