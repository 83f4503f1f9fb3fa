//! # circbuf - Fixed-capacity FIFO ring buffer
//!
//! A ring buffer of opaque, copyable handles (pointer-sized words, ids,
//! `NonNull<T>` and the like) meant as a building block for moving data
//! between a producer and a consumer.
//!
//! ## Design
//!
//! - Capacity fixed at construction; the buffer never grows, shrinks or overwrites
//! - Single-handle `read`/`write` plus bulk `bulk_read`/`bulk_write`
//! - Bulk transfers split into two contiguous copies when they cross the end of storage
//! - Exact bulk mode is all-or-nothing, up-to mode moves what it can
//! - Rejected operations leave the buffer untouched
//! - Not synchronized: share it between threads only behind a lock
//!
//! ## Example
//!
//! ```
//! use circbuf::{BulkMode, RingBuffer};
//!
//! // Create a ring buffer with 8 slots
//! let mut rb = RingBuffer::<u64>::new(8).unwrap();
//!
//! // Producer: single and bulk writes
//! assert!(rb.write(1));
//! assert_eq!(rb.bulk_write(&[2, 3, 4], 3, BulkMode::Exact), 3);
//!
//! // Consumer: drain in FIFO order
//! assert_eq!(rb.read(), Some(1));
//! let mut out = [0u64; 8];
//! let n = rb.bulk_read(&mut out, 8, BulkMode::UpTo);
//! assert_eq!(&out[..n], &[2, 3, 4]);
//!
//! // Nothing left to hand back on teardown
//! rb.destroy_with(|_handle| unreachable!());
//! ```

#![warn(missing_docs)]

mod error;
mod ring_buffer;

pub use error::BufferError;
pub use ring_buffer::{destroy, BulkMode, RingBuffer};
