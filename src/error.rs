use thiserror::Error;

/// Reasons a ring buffer operation was rejected.
///
/// A rejected operation never modifies the buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum BufferError {
    /// Construction was requested with a capacity of zero
    #[error("ring buffer capacity must be greater than zero")]
    InvalidCapacity,
    /// Slot storage could not be allocated
    #[error("failed to allocate ring buffer storage")]
    AllocationFailure,
    /// No free slot is left for a write
    #[error("ring buffer is full")]
    BufferFull,
    /// No handle is available to read
    #[error("ring buffer is empty")]
    BufferEmpty,
    /// An exact bulk read asked for more handles than are stored
    #[error("exact read of {requested} handles but only {available} stored")]
    InsufficientData {
        /// Number of handles requested
        requested: usize,
        /// Number of handles currently stored
        available: usize,
    },
    /// An exact bulk write asked for more slots than are free
    #[error("exact write of {requested} handles but only {free} slots free")]
    InsufficientRoom {
        /// Number of handles offered
        requested: usize,
        /// Number of free slots
        free: usize,
    },
    /// A bulk request with a zero count, a slice shorter than the count,
    /// or an exact count larger than the buffer capacity
    #[error("invalid bulk request")]
    InvalidRequest,
}
