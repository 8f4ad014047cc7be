//! Raw Ethernet transmit through a pnet datalink channel

use linkscope_core::{Error, FrameSender, Result};
use parking_lot::Mutex;
use pnet_datalink::{Channel, DataLinkSender};
use tracing::{debug, trace};

/// Persistent transmit handle for one interface
pub struct DatalinkSender {
    interface: String,
    tx: Mutex<Box<dyn DataLinkSender>>,
}

impl DatalinkSender {
    /// Open a datalink channel on `name` and keep its sending half
    pub fn open(name: &str) -> Result<Self> {
        let interface = pnet_datalink::interfaces()
            .into_iter()
            .find(|iface| iface.name == name)
            .ok_or_else(|| Error::InterfaceNotFound(name.to_string()))?;

        let tx = match pnet_datalink::channel(&interface, Default::default()) {
            Ok(Channel::Ethernet(tx, _rx)) => tx,
            Ok(_) => return Err(Error::Interface("Unsupported channel type".to_string())),
            Err(e) => {
                return Err(Error::Interface(format!(
                    "Failed to open channel on {}: {}",
                    name, e
                )))
            }
        };

        debug!(interface = %name, "Datalink sender ready");
        Ok(Self {
            interface: name.to_string(),
            tx: Mutex::new(tx),
        })
    }

    pub fn interface(&self) -> &str {
        &self.interface
    }
}

impl FrameSender for DatalinkSender {
    fn send_frame(&self, frame: &[u8]) -> Result<()> {
        let mut tx = self.tx.lock();
        tx.send_to(frame, None)
            .ok_or_else(|| Error::transmit(format!("{}: frame too large for buffer", self.interface)))?
            .map_err(|e| Error::transmit(format!("{}: {}", self.interface, e)))?;

        trace!(interface = %self.interface, bytes = frame.len(), "Frame sent");
        Ok(())
    }
}
