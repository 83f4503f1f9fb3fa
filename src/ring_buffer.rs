use std::fmt;

use crate::error::BufferError;

/// Semantics of a bulk transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BulkMode {
    /// Move exactly the requested number of handles, or nothing at all
    Exact,
    /// Move as many handles as currently possible, up to the requested number
    UpTo,
}

impl BulkMode {
    /// Map an `exact` flag onto a mode
    pub fn from_exact(exact: bool) -> Self {
        if exact {
            BulkMode::Exact
        } else {
            BulkMode::UpTo
        }
    }
}

/// Fixed-capacity FIFO ring buffer of copyable handles
///
/// - Never grows, shrinks or overwrites unread handles
/// - Each slot is either empty (`None`) or holds one handle
/// - Not synchronized; wrap it in a lock to share it between threads
///
/// Handles are stored by value and never interpreted. Whatever a handle
/// refers to stays owned by the caller; see [`RingBuffer::destroy_with`].
pub struct RingBuffer<T> {
    /// Slot storage, `capacity` entries long
    slots: Box<[Option<T>]>,
    /// Next slot to read (oldest stored handle)
    read_cursor: usize,
    /// Next slot to write (first free slot)
    write_cursor: usize,
    /// Number of occupied slots
    count: usize,
}

impl<T> fmt::Debug for RingBuffer<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RingBuffer")
            .field("capacity", &self.slots.len())
            .field("read_cursor", &self.read_cursor)
            .field("write_cursor", &self.write_cursor)
            .field("count", &self.count)
            .finish()
    }
}

impl<T: Copy> RingBuffer<T> {
    /// Create an empty ring buffer with room for `capacity` handles
    ///
    /// # Arguments
    /// * `capacity` - Number of slots to allocate
    ///
    /// # Returns
    /// * `Ok(RingBuffer)` on success
    /// * `Err(BufferError::InvalidCapacity)` if `capacity` is 0
    /// * `Err(BufferError::AllocationFailure)` if the slots cannot be allocated
    pub fn new(capacity: usize) -> Result<Self, BufferError> {
        if capacity == 0 {
            tracing::trace!("refusing to create a zero-capacity ring buffer");
            return Err(BufferError::InvalidCapacity);
        }

        let mut slots = Vec::new();
        slots.try_reserve_exact(capacity).map_err(|err| {
            tracing::debug!(capacity, error = %err, "ring buffer storage allocation failed");
            BufferError::AllocationFailure
        })?;
        slots.resize_with(capacity, || None);

        tracing::debug!(capacity, "created ring buffer");

        Ok(RingBuffer {
            slots: slots.into_boxed_slice(),
            read_cursor: 0,
            write_cursor: 0,
            count: 0,
        })
    }

    /// Read the oldest handle, or `None` if the buffer is empty
    pub fn read(&mut self) -> Option<T> {
        self.try_read().ok()
    }

    /// Read the oldest handle and clear its slot
    ///
    /// # Returns
    /// * `Ok(handle)` with the oldest stored handle
    /// * `Err(BufferError::BufferEmpty)` if nothing is stored
    pub fn try_read(&mut self) -> Result<T, BufferError> {
        if self.count == 0 {
            return Err(self.reject("read", BufferError::BufferEmpty));
        }

        let handle = self.slots[self.read_cursor]
            .take()
            .ok_or(BufferError::BufferEmpty)?;
        self.count -= 1;
        self.read_cursor = self.wrap(self.read_cursor + 1);

        self.debug_check_invariants();
        Ok(handle)
    }

    /// Write a handle, returning `false` if the buffer is full
    pub fn write(&mut self, handle: T) -> bool {
        self.try_write(handle).is_ok()
    }

    /// Store `handle` in the first free slot
    ///
    /// # Returns
    /// * `Ok(())` once the handle is stored
    /// * `Err(BufferError::BufferFull)` if no slot is free; stored handles
    ///   are never overwritten
    pub fn try_write(&mut self, handle: T) -> Result<(), BufferError> {
        if self.count == self.capacity() {
            return Err(self.reject("write", BufferError::BufferFull));
        }

        self.slots[self.write_cursor] = Some(handle);
        self.count += 1;
        self.write_cursor = self.wrap(self.write_cursor + 1);

        self.debug_check_invariants();
        Ok(())
    }

    /// Move up to `count` of the oldest handles into `dst`
    ///
    /// Returns the number of handles moved; 0 when the request is rejected.
    pub fn bulk_read(&mut self, dst: &mut [T], count: usize, mode: BulkMode) -> usize {
        self.try_bulk_read(dst, count, mode).unwrap_or(0)
    }

    /// Move the oldest handles into the front of `dst`, clearing their slots
    ///
    /// In [`BulkMode::Exact`] either all `count` handles are moved or none
    /// are. In [`BulkMode::UpTo`] `min(len, count)` handles are moved.
    /// Handles land in `dst` in FIFO order even when the stored run wraps
    /// past the end of the slot storage.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of handles moved
    /// * `Err(BufferError::InvalidRequest)` if `count` is 0, `dst` is shorter
    ///   than `count`, or an exact `count` exceeds the capacity
    /// * `Err(BufferError::InsufficientData)` if fewer than `count` handles
    ///   are stored in exact mode
    /// * `Err(BufferError::BufferEmpty)` if nothing is stored in up-to mode
    pub fn try_bulk_read(
        &mut self,
        dst: &mut [T],
        count: usize,
        mode: BulkMode,
    ) -> Result<usize, BufferError> {
        if !self.is_valid_request(count, dst.len(), mode) {
            return Err(self.reject("bulk_read", BufferError::InvalidRequest));
        }

        let ops = match mode {
            BulkMode::Exact if self.count < count => {
                let err = BufferError::InsufficientData {
                    requested: count,
                    available: self.count,
                };
                return Err(self.reject("bulk_read", err));
            }
            BulkMode::Exact => count,
            BulkMode::UpTo if self.count == 0 => {
                return Err(self.reject("bulk_read", BufferError::BufferEmpty));
            }
            BulkMode::UpTo => count.min(self.count),
        };

        let start = self.read_cursor;
        let to_end = self.capacity() - start;
        if to_end < ops {
            // Split at the physical end of storage
            drain_run(&mut self.slots[start..], &mut dst[..to_end]);
            drain_run(&mut self.slots[..ops - to_end], &mut dst[to_end..ops]);
            self.read_cursor = ops - to_end;
        } else {
            drain_run(&mut self.slots[start..start + ops], &mut dst[..ops]);
            self.read_cursor = self.wrap(start + ops);
        }
        self.count -= ops;

        self.debug_check_invariants();
        Ok(ops)
    }

    /// Copy up to `count` handles from `src` into free slots
    ///
    /// Returns the number of handles stored; 0 when the request is rejected.
    pub fn bulk_write(&mut self, src: &[T], count: usize, mode: BulkMode) -> usize {
        self.try_bulk_write(src, count, mode).unwrap_or(0)
    }

    /// Copy handles from the front of `src` into the free slots
    ///
    /// In [`BulkMode::Exact`] either all `count` handles are stored or none
    /// are. In [`BulkMode::UpTo`] `min(free_slots, count)` handles are stored.
    ///
    /// # Returns
    /// * `Ok(n)` with the number of handles stored
    /// * `Err(BufferError::InvalidRequest)` if `count` is 0, `src` is shorter
    ///   than `count`, or an exact `count` exceeds the capacity
    /// * `Err(BufferError::InsufficientRoom)` if fewer than `count` slots are
    ///   free in exact mode
    /// * `Err(BufferError::BufferFull)` if no slot is free in up-to mode
    pub fn try_bulk_write(
        &mut self,
        src: &[T],
        count: usize,
        mode: BulkMode,
    ) -> Result<usize, BufferError> {
        if !self.is_valid_request(count, src.len(), mode) {
            return Err(self.reject("bulk_write", BufferError::InvalidRequest));
        }

        let free = self.free_slots();
        let ops = match mode {
            BulkMode::Exact if free < count => {
                let err = BufferError::InsufficientRoom {
                    requested: count,
                    free,
                };
                return Err(self.reject("bulk_write", err));
            }
            BulkMode::Exact => count,
            BulkMode::UpTo if free == 0 => {
                return Err(self.reject("bulk_write", BufferError::BufferFull));
            }
            BulkMode::UpTo => count.min(free),
        };

        let start = self.write_cursor;
        let to_end = self.capacity() - start;
        if to_end < ops {
            fill_run(&mut self.slots[start..], &src[..to_end]);
            fill_run(&mut self.slots[..ops - to_end], &src[to_end..ops]);
            self.write_cursor = ops - to_end;
        } else {
            fill_run(&mut self.slots[start..start + ops], &src[..ops]);
            self.write_cursor = self.wrap(start + ops);
        }
        self.count += ops;

        self.debug_check_invariants();
        Ok(ops)
    }

    /// Tear the buffer down without touching the stored handles
    pub fn destroy(self) {
        tracing::debug!(
            capacity = self.capacity(),
            resident = self.count,
            "destroying ring buffer"
        );
    }

    /// Tear the buffer down, handing every stored handle to `release` first
    ///
    /// Handles are visited in physical slot order. Empty slots are skipped.
    pub fn destroy_with<F>(self, mut release: F)
    where
        F: FnMut(T),
    {
        tracing::debug!(
            capacity = self.capacity(),
            resident = self.count,
            "destroying ring buffer and releasing resident handles"
        );
        for handle in self.slots.iter().flatten() {
            release(*handle);
        }
    }

    /// Get the capacity in slots
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Get the number of stored handles
    pub fn len(&self) -> usize {
        self.count
    }

    /// Get the number of free slots
    pub fn free_slots(&self) -> usize {
        self.capacity() - self.count
    }

    /// Check if no handle is stored
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Check if every slot is occupied
    pub fn is_full(&self) -> bool {
        self.count == self.capacity()
    }

    /// Index of the next slot to read
    pub fn read_cursor(&self) -> usize {
        self.read_cursor
    }

    /// Index of the next slot to write
    pub fn write_cursor(&self) -> usize {
        self.write_cursor
    }

    /// Raw state of the physical slot at `index`
    ///
    /// Returns `None` if `index` is out of range, `Some(None)` for an empty
    /// slot and `Some(Some(handle))` for an occupied one.
    pub fn slot(&self, index: usize) -> Option<Option<T>> {
        self.slots.get(index).copied()
    }

    fn is_valid_request(&self, count: usize, slice_len: usize, mode: BulkMode) -> bool {
        count > 0
            && slice_len >= count
            && !(mode == BulkMode::Exact && count > self.capacity())
    }

    /// Fold `index` back into `[0, capacity)`; `index` must be below `2 * capacity`
    #[inline]
    fn wrap(&self, index: usize) -> usize {
        let capacity = self.capacity();
        debug_assert!(index < 2 * capacity);
        if index >= capacity {
            index - capacity
        } else {
            index
        }
    }

    fn reject(&self, op: &'static str, err: BufferError) -> BufferError {
        tracing::trace!(
            op,
            error = %err,
            capacity = self.capacity(),
            count = self.count,
            read_cursor = self.read_cursor,
            write_cursor = self.write_cursor,
            "ring buffer operation rejected"
        );
        err
    }

    #[inline]
    fn debug_check_invariants(&self) {
        let capacity = self.capacity();
        debug_assert!(self.read_cursor < capacity, "read cursor out of bounds");
        debug_assert!(self.write_cursor < capacity, "write cursor out of bounds");
        debug_assert!(self.count <= capacity, "count exceeds capacity");
        debug_assert_eq!(
            self.wrap(self.read_cursor + self.count),
            self.write_cursor,
            "cursors disagree with count"
        );

        #[cfg(test)]
        for offset in 0..capacity {
            let index = self.wrap(self.read_cursor + offset);
            assert_eq!(
                self.slots[index].is_some(),
                offset < self.count,
                "slot {index} occupancy disagrees with count"
            );
        }
    }
}

/// Move every handle in `run` into `out`, leaving the slots empty
fn drain_run<T: Copy>(run: &mut [Option<T>], out: &mut [T]) {
    debug_assert_eq!(run.len(), out.len());
    for (dst, slot) in out.iter_mut().zip(run) {
        if let Some(handle) = slot.take() {
            *dst = handle;
        }
    }
}

fn fill_run<T: Copy>(run: &mut [Option<T>], src: &[T]) {
    debug_assert_eq!(run.len(), src.len());
    for (slot, &handle) in run.iter_mut().zip(src) {
        *slot = Some(handle);
    }
}

/// Tear down an optional buffer
///
/// Does nothing for `None`. When `release_handles` is set every stored
/// handle is passed to `release` before the storage is freed.
pub fn destroy<T, F>(buffer: Option<RingBuffer<T>>, release_handles: bool, release: F)
where
    T: Copy,
    F: FnMut(T),
{
    let Some(buffer) = buffer else {
        return;
    };
    if release_handles {
        buffer.destroy_with(release);
    } else {
        buffer.destroy();
    }
}
