use thiserror::Error;

/// Errors from the host counter source.
///
/// `netpulse-core` maps these into per-cycle fault entries; nothing here
/// is fatal to a collection run.
#[derive(Debug, Error)]
pub enum NetError {
    /// The named interface does not exist on this host (or vanished
    /// between enumeration and the counter read).
    #[error("Interface '{interface}' not found or not active")]
    InterfaceNotFound { interface: String },

    /// The platform counter read failed for a reason other than a
    /// missing interface (permissions, transient OS error).
    #[error("Failed to read interface counters: {message}")]
    Counters { message: String },
}

impl NetError {
    /// Returns `true` if this error means the interface is simply absent,
    /// as opposed to a counter-read fault.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::InterfaceNotFound { .. })
    }
}
