//! Generic box for COM-style reference-counted interop handles
//!
//! External APIs hand out handles whose lifetime is governed by the object's
//! own reference count. [`RcHandle`] owns exactly one share of such a count:
//! adopting takes a share without incrementing, cloning increments, dropping
//! decrements. The box never assumes it is the sole owner — the count may be
//! shared with code outside this crate entirely.

/// Capability contract for a reference-counted external handle.
///
/// Implementations forward to the external object's own increment and
/// decrement operations (`AddRef`/`Release` in COM terms); the object
/// destroys itself when the count reaches zero.
pub trait RefCounted: Copy {
    /// Increment the external reference count.
    ///
    /// # Safety
    /// The handle must refer to a live object; the caller must already hold
    /// at least one reference.
    unsafe fn add_ref(self);

    /// Decrement the external reference count, destroying the object at
    /// zero.
    ///
    /// # Safety
    /// The caller must own the reference being given up and must not use
    /// the handle afterwards.
    unsafe fn release(self);
}

/// Capability to request a related interface `U` from a handle.
///
/// On success the returned handle carries one fresh reference of its own;
/// the source handle is unaffected. On failure the implementation returns a
/// platform status code (an `HRESULT` in COM terms).
pub trait QueryInterface<U: RefCounted>: RefCounted {
    /// Query the object for interface `U`.
    fn query_interface(self) -> Result<U, i32>;
}

/// Owning box around at most one share of a reference-counted handle.
///
/// The box either holds a valid handle or is empty — never a dangling one.
#[derive(Debug)]
pub struct RcHandle<T: RefCounted> {
    handle: Option<T>,
}

impl<T: RefCounted> RcHandle<T> {
    /// An empty box.
    pub const fn empty() -> Self {
        Self { handle: None }
    }

    /// Take ownership of `handle` without incrementing its count.
    ///
    /// The caller must hold exactly one logical reference and is
    /// transferring it to the box.
    pub fn adopt(handle: T) -> Self {
        Self {
            handle: Some(handle),
        }
    }

    /// Whether the box currently holds no handle.
    pub fn is_empty(&self) -> bool {
        self.handle.is_none()
    }

    /// The held handle.
    ///
    /// # Panics
    /// Panics if the box is empty; callers that can tolerate an empty box
    /// use [`try_get`](Self::try_get).
    pub fn get(&self) -> T {
        self.handle.expect("RcHandle is empty")
    }

    /// The held handle, or `None` if the box is empty.
    pub fn try_get(&self) -> Option<T> {
        self.handle
    }

    /// Give up ownership of the handle without decrementing its count.
    ///
    /// The caller becomes responsible for the share the box held.
    pub fn into_raw(mut self) -> Option<T> {
        self.handle.take()
    }

    /// Request interface `U` from the held handle.
    ///
    /// Returns the new box and a status code: zero on success, the
    /// platform's failure code otherwise, in which case the box is empty.
    /// The source box is left intact either way.
    ///
    /// # Panics
    /// Panics if the box is empty.
    pub fn query<U>(&self) -> (RcHandle<U>, i32)
    where
        T: QueryInterface<U>,
        U: RefCounted,
    {
        match self.get().query_interface() {
            Ok(interface) => (RcHandle::adopt(interface), 0),
            Err(status) => (RcHandle::empty(), status),
        }
    }
}

impl<T: RefCounted> Default for RcHandle<T> {
    fn default() -> Self {
        Self::empty()
    }
}

impl<T: RefCounted> Clone for RcHandle<T> {
    fn clone(&self) -> Self {
        if let Some(handle) = self.handle {
            // The box holds a live share, so incrementing is permitted.
            unsafe { handle.add_ref() };
        }
        Self {
            handle: self.handle,
        }
    }
}

impl<T: RefCounted> Drop for RcHandle<T> {
    fn drop(&mut self) {
        if let Some(handle) = self.handle.take() {
            // Gives up the one share this box owned; never panics.
            unsafe { handle.release() };
        }
    }
}
