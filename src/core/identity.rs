//! Hardware identity resolution.

use crate::error::Result;
use crate::platform::Platform;

/// Fixed hardware identity, resolved once at startup and immutable after.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HardwareIdentity {
    address: [u8; 6],
    display: String,
}

impl HardwareIdentity {
    /// Read the platform's 6-byte hardware address and render the display
    /// string. Called exactly once at startup; failure is fatal.
    pub fn resolve(platform: &mut dyn Platform) -> Result<Self> {
        let address = platform.hardware_address()?;
        Ok(Self::from_address(address))
    }

    pub fn from_address(address: [u8; 6]) -> Self {
        let display = address
            .iter()
            .map(|byte| format!("{byte:02x}"))
            .collect::<Vec<_>>()
            .join(":");
        Self { address, display }
    }

    pub fn address(&self) -> [u8; 6] {
        self.address
    }

    /// Colon-separated lowercase hex form, e.g. `aa:bb:cc:11:22:33`.
    pub fn display(&self) -> &str {
        &self.display
    }
}
