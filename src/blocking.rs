// Blocking facade over Cube
//
// Each call runs the async operation to completion before returning. The
// runtime context is checked on every call: inside a multi-thread tokio
// runtime the work runs under block_in_place, with no runtime it is driven
// directly, and inside a current-thread runtime it is refused. A facade
// created outside any runtime owns a current-thread runtime for as long as it
// lives, so the BLE session's background tasks stay on one scheduler.

use std::future::Future;
use std::time::Duration;

use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tracing::{debug, warn};

use crate::config::CubeConfig;
use crate::cube::{Cube, CubeState};
use crate::device::DeviceInfo;
use crate::error::{CubeError, Result};
use crate::motor::Motor;
use crate::transport::{BtleTransport, Transport};

/// Runs futures to completion on an ambient or owned runtime
pub enum Dispatcher {
    /// Caller's multi-thread runtime
    Ambient(Handle),
    /// Runtime created because none was running
    Owned(OwnedRuntime),
}

/// Current-thread runtime owned by a [`Dispatcher`]
pub struct OwnedRuntime(Option<Runtime>);

impl OwnedRuntime {
    fn new() -> Result<Self> {
        Ok(Self(Some(Builder::new_current_thread().enable_all().build()?)))
    }
}

impl Drop for OwnedRuntime {
    fn drop(&mut self) {
        // Dropping a runtime from async code panics, so shut it down detached
        if let Some(runtime) = self.0.take() {
            if Handle::try_current().is_ok() {
                debug!("Shutting down owned runtime in the background");
                runtime.shutdown_background();
            }
        }
    }
}

/// Where the calling thread is, as far as blocking is concerned
fn caller_in_runtime() -> Result<bool> {
    match Handle::try_current() {
        Ok(handle) if handle.runtime_flavor() == RuntimeFlavor::CurrentThread => {
            Err(CubeError::BlockingUnsupported)
        }
        Ok(_) => Ok(true),
        Err(_) => Ok(false),
    }
}

impl Dispatcher {
    pub fn new() -> Result<Self> {
        if caller_in_runtime()? {
            debug!("Reusing the running tokio runtime");
            Ok(Dispatcher::Ambient(Handle::current()))
        } else {
            debug!("No runtime running, starting one");
            Ok(Dispatcher::Owned(OwnedRuntime::new()?))
        }
    }

    /// Run `future` to completion, blocking the caller. Fails with
    /// `BlockingUnsupported` when called from a current-thread runtime.
    pub fn block_on<F: Future>(&self, future: F) -> Result<F::Output> {
        let in_runtime = caller_in_runtime()?;
        let run = || match self {
            Dispatcher::Ambient(handle) => Ok(handle.block_on(future)),
            Dispatcher::Owned(OwnedRuntime(Some(runtime))) => Ok(runtime.block_on(future)),
            Dispatcher::Owned(OwnedRuntime(None)) => Err(CubeError::BlockingUnsupported),
        };
        if in_runtime {
            tokio::task::block_in_place(run)
        } else {
            run()
        }
    }
}

/// Run a single future to completion, wherever the caller happens to be
pub fn block_on<F: Future>(future: F) -> Result<F::Output> {
    Dispatcher::new()?.block_on(future)
}

/// [`Cube`] with a blocking call surface
pub struct BlockingCube<T: Transport = BtleTransport> {
    // Field order matters: the cube (and its session) drops before the runtime
    inner: Cube<T>,
    dispatcher: Dispatcher,
}

impl BlockingCube<BtleTransport> {
    /// Open the host's Bluetooth adapter and connect using `config`
    pub fn connect_with(config: CubeConfig) -> Result<Self> {
        let dispatcher = Dispatcher::new()?;
        let transport = dispatcher.block_on(BtleTransport::new(config.scan_timeout()))??;
        let mut cube = Self::with_dispatcher(Cube::new(transport, config), dispatcher);
        cube.connect(None)?;
        Ok(cube)
    }
}

impl<T: Transport> BlockingCube<T> {
    /// Wrap a disconnected cube
    pub fn new(transport: T, config: CubeConfig) -> Result<Self> {
        Ok(Self::with_dispatcher(
            Cube::new(transport, config),
            Dispatcher::new()?,
        ))
    }

    pub fn with_dispatcher(inner: Cube<T>, dispatcher: Dispatcher) -> Self {
        Self { inner, dispatcher }
    }

    pub fn state(&self) -> CubeState {
        self.inner.state()
    }

    pub fn address(&self) -> Option<&str> {
        self.inner.address()
    }

    pub fn get_constant(&self, index: usize) -> Result<String> {
        self.inner.get_constant(index)
    }

    /// Borrow the async handle
    pub fn as_async(&mut self) -> &mut Cube<T> {
        &mut self.inner
    }

    pub fn connect(&mut self, address: Option<&str>) -> Result<()> {
        self.dispatcher.block_on(self.inner.connect(address))?
    }

    pub fn information(&mut self) -> Result<DeviceInfo> {
        self.dispatcher.block_on(self.inner.information())?
    }

    pub fn battery(&mut self) -> Result<String> {
        self.dispatcher.block_on(self.inner.battery())?
    }

    pub fn run_motor(
        &mut self,
        motor: Motor,
        velocity: i32,
        duration: Duration,
        smooth: bool,
    ) -> Result<()> {
        self.dispatcher
            .block_on(self.inner.run_motor(motor, velocity, duration, smooth))?
    }

    pub fn run_motors(
        &mut self,
        motors: &[(Motor, i32)],
        duration: Duration,
        smooth: bool,
    ) -> Result<()> {
        self.dispatcher
            .block_on(self.inner.run_motors(motors, duration, smooth))?
    }

    pub fn halt(&mut self) -> Result<()> {
        self.dispatcher.block_on(self.inner.halt())?
    }

    pub fn disconnect(&mut self) -> Result<()> {
        self.dispatcher.block_on(self.inner.disconnect())?
    }
}

impl<T: Transport> Drop for BlockingCube<T> {
    fn drop(&mut self) {
        if self.inner.is_connected() {
            if let Err(e) = self.disconnect() {
                warn!("Failed to disconnect on drop: {}", e);
            }
        }
    }
}
