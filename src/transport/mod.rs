// Transport boundary
//
// Everything the cube needs from a BLE stack: find a peer by advertised name,
// open a session to an address, then read and write characteristics on it.
// btle::BtleTransport implements this over btleplug.

use async_trait::async_trait;
use uuid::Uuid;

use crate::error::Result;

pub mod btle;

pub use btle::{BtleSession, BtleTransport};

#[async_trait]
pub trait Transport: Send + Sync {
    type Session: Session;

    /// Scan for a peer whose advertised name contains `name_marker`.
    ///
    /// Returns the address of the first match, or `None` when the scan
    /// times out without one.
    async fn discover(&self, name_marker: &str) -> Result<Option<String>>;

    /// Open a session to the peer at `address`
    async fn open(&self, address: &str) -> Result<Self::Session>;
}

/// A live connection to one peer
#[async_trait]
pub trait Session: Send + Sync {
    async fn read(&self, characteristic: Uuid) -> Result<Vec<u8>>;

    /// Write without waiting for an acknowledgment
    async fn write(&self, characteristic: Uuid, payload: &[u8]) -> Result<()>;

    async fn close(&self) -> Result<()>;
}
