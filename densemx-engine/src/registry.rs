//! Generational arena owning every live matrix.
//!
//! A [`MatrixHandle`] is a 64-bit token, not an address: the low 32 bits are
//! `slot index + 1` (so the token is never zero) and the high 32 bits are the
//! slot generation. Removing an entry bumps its slot's generation, so a
//! token that outlived its matrix no longer matches and is reported as
//! stale instead of being dereferenced, even after the slot is reused.
//!
//! Entries are `Arc<DenseMatrix>`: a lookup clones the `Arc` and the caller
//! works on the matrix after the registry lock is dropped.

use std::fmt;
use std::sync::Arc;

use densemx_core::{DenseMatrix, MatrixError, Result};
use parking_lot::Mutex;

/// Slots are addressed by `u32` and the token stores `index + 1`.
const MAX_SLOTS: usize = u32::MAX as usize - 1;

/// Opaque reference to an engine-owned matrix.
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MatrixHandle(u64);

impl MatrixHandle {
    /// The null handle. Never refers to a matrix.
    pub const NULL: MatrixHandle = MatrixHandle(0);

    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn into_raw(self) -> u64 {
        self.0
    }

    #[inline]
    pub const fn is_null(self) -> bool {
        self.0 == 0
    }

    fn new(index: u32, generation: u32) -> Self {
        Self(((generation as u64) << 32) | (index as u64 + 1))
    }

    fn index(self) -> Option<usize> {
        ((self.0 & 0xFFFF_FFFF) as usize).checked_sub(1)
    }

    fn generation(self) -> u32 {
        (self.0 >> 32) as u32
    }
}

impl fmt::Debug for MatrixHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MatrixHandle({:#x})", self.0)
    }
}

impl fmt::Display for MatrixHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x}", self.0)
    }
}

struct Slot {
    generation: u32,
    matrix: Option<Arc<DenseMatrix>>,
}

/// Arena of matrices addressed by [`MatrixHandle`].
pub struct Registry {
    slots: Vec<Slot>,
    free: Vec<u32>,
    live: usize,
}

impl Registry {
    pub const fn new() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
            live: 0,
        }
    }

    /// Store `matrix` and return its handle.
    ///
    /// Fails with `Alloc` if the arena cannot grow; `matrix` is dropped in
    /// that case and nothing stays registered.
    pub fn insert(&mut self, matrix: DenseMatrix) -> Result<MatrixHandle> {
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.matrix = Some(Arc::new(matrix));
            self.live += 1;
            return Ok(MatrixHandle::new(index, slot.generation));
        }

        if self.slots.len() >= MAX_SLOTS {
            return Err(MatrixError::Alloc { elements: matrix.len() });
        }
        // Keep `free` able to hold every slot so `remove` never allocates.
        let grow = MatrixError::Alloc { elements: matrix.len() };
        self.slots.try_reserve(1).map_err(|_| grow.clone())?;
        self.free
            .try_reserve(self.slots.len() + 1 - self.free.len())
            .map_err(|_| grow)?;

        let index = self.slots.len() as u32;
        self.slots.push(Slot {
            generation: 1,
            matrix: Some(Arc::new(matrix)),
        });
        self.live += 1;
        Ok(MatrixHandle::new(index, 1))
    }

    /// Shared reference to the matrix behind `handle`.
    pub fn get(&self, handle: MatrixHandle) -> Result<Arc<DenseMatrix>> {
        if handle.is_null() {
            return Err(MatrixError::Null("matrix handle"));
        }
        handle
            .index()
            .and_then(|i| self.slots.get(i))
            .filter(|slot| slot.generation == handle.generation())
            .and_then(|slot| slot.matrix.clone())
            .ok_or(MatrixError::StaleHandle(handle.into_raw()))
    }

    /// Unregister `handle` and hand back its matrix.
    ///
    /// The caller drops the returned `Arc`; the buffer is freed once no
    /// in-flight lookup still holds it.
    pub fn remove(&mut self, handle: MatrixHandle) -> Result<Arc<DenseMatrix>> {
        if handle.is_null() {
            return Err(MatrixError::Null("matrix handle"));
        }
        let stale = MatrixError::StaleHandle(handle.into_raw());
        let index = handle.index().ok_or_else(|| stale.clone())?;
        let slot = self.slots.get_mut(index).ok_or_else(|| stale.clone())?;
        if slot.generation != handle.generation() {
            return Err(stale);
        }
        let matrix = slot.matrix.take().ok_or(stale)?;
        slot.generation = slot.generation.wrapping_add(1);
        self.free.push(index as u32);
        self.live -= 1;
        Ok(matrix)
    }

    /// Number of registered matrices.
    #[inline]
    pub fn live(&self) -> usize {
        self.live
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

static REGISTRY: Mutex<Registry> = parking_lot::const_mutex(Registry::new());

/// The process-wide registry behind the engine API.
pub(crate) fn global() -> &'static Mutex<Registry> {
    &REGISTRY
}
