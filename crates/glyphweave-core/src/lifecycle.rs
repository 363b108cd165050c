//! Acquire, use, release: once, on every path
//!
//! Every resource a caller holds implements [`Release`]. Releasing frees the
//! heavy data right away instead of waiting for the handle to go out of
//! scope, and doing it twice is a no-op. Anything that reads a released
//! resource gets [`ResourceError::Released`] back.
//!
//! [`ResourceCell`] is the shared slot behind a face: the owning handle keeps
//! an `Arc` to the cell, fonts keep a `Weak` one. A font can therefore tell a
//! released face (cell emptied) from a dropped face (cell gone) and report
//! both instead of dangling.
//!
//! [`Scoped`] releases whatever it wraps when it leaves scope.

use std::ops::{Deref, DerefMut};
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{ResourceError, ResourceKind};

/// Explicit, idempotent release
pub trait Release {
    /// Free the resource. Calling it again does nothing.
    fn release(&mut self);

    /// Whether [`Release::release`] has run
    fn is_released(&self) -> bool;
}

/// A value that can be emptied exactly once while other handles watch it
#[derive(Debug)]
pub struct ResourceCell<T> {
    kind: ResourceKind,
    value: RwLock<Option<Arc<T>>>,
}

impl<T> ResourceCell<T> {
    pub fn new(kind: ResourceKind, value: T) -> Self {
        Self {
            kind,
            value: RwLock::new(Some(Arc::new(value))),
        }
    }

    pub fn kind(&self) -> ResourceKind {
        self.kind
    }

    /// Snapshot of the live value
    ///
    /// The returned `Arc` stays valid even if the cell is released while the
    /// caller is still working with it.
    pub fn get(&self) -> Result<Arc<T>, ResourceError> {
        self.value
            .read()
            .clone()
            .ok_or(ResourceError::Released(self.kind))
    }

    /// Empty the cell; returns true only for the call that actually released
    pub fn take(&self) -> bool {
        self.value.write().take().is_some()
    }

    pub fn is_live(&self) -> bool {
        self.value.read().is_some()
    }
}

/// Releases the wrapped resource when dropped
#[derive(Debug)]
pub struct Scoped<T: Release> {
    inner: T,
}

impl<T: Release> Scoped<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }
}

impl<T: Release> Deref for Scoped<T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.inner
    }
}

impl<T: Release> DerefMut for Scoped<T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.inner
    }
}

impl<T: Release> Drop for Scoped<T> {
    fn drop(&mut self) {
        self.inner.release();
    }
}

/// Wrap a resource so it is released at the end of the current scope
pub fn scoped<T: Release>(resource: T) -> Scoped<T> {
    Scoped::new(resource)
}
