//! Side-channel table resolving native window handles to owner state
//!
//! The platform delivers messages with nothing but the native handle; this
//! table maps that handle to the address of the owning window's heap-pinned
//! state block so the message procedure can recover its owner. Each entry is
//! bound when the platform announces creation and removed when the handle is
//! torn down; because the key is the handle, there is never more than one
//! live slot per window, and because the state block never relocates, a
//! resolved address is valid for as long as the entry exists.

use std::collections::HashMap;
use std::sync::{Mutex, OnceLock};

/// Address-keyed lookup table for per-window state blocks.
pub struct WindowMap {
    slots: Mutex<HashMap<usize, usize>>,
}

impl WindowMap {
    /// An empty table.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// Bind `handle` to the state block at `state`, replacing any previous
    /// binding for the same handle.
    pub fn bind(&self, handle: usize, state: usize) {
        self.slots
            .lock()
            .expect("window map poisoned")
            .insert(handle, state);
    }

    /// Remove the binding for `handle`, if any.
    pub fn remove(&self, handle: usize) {
        self.slots
            .lock()
            .expect("window map poisoned")
            .remove(&handle);
    }

    /// Address of the state block bound to `handle`.
    pub fn resolve(&self, handle: usize) -> Option<usize> {
        self.slots
            .lock()
            .expect("window map poisoned")
            .get(&handle)
            .copied()
    }

    /// Number of live bindings.
    pub fn len(&self) -> usize {
        self.slots.lock().expect("window map poisoned").len()
    }

    /// Whether the table holds no bindings.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for WindowMap {
    fn default() -> Self {
        Self::new()
    }
}

/// The process-wide table the message procedure consults.
pub fn global() -> &'static WindowMap {
    static MAP: OnceLock<WindowMap> = OnceLock::new();
    MAP.get_or_init(WindowMap::new)
}

#[cfg(test)]
mod tests {
    use super::*;

    struct State {
        marker: u32,
    }

    fn addr(state: &State) -> usize {
        state as *const State as usize
    }

    #[test]
    fn bind_then_resolve_round_trips() {
        let map = WindowMap::new();
        let state = Box::new(State { marker: 7 });
        map.bind(0x1000, addr(&state));
        assert_eq!(map.resolve(0x1000), Some(addr(&state)));
        assert_eq!(map.resolve(0x2000), None);
    }

    #[test]
    fn moving_the_owner_never_stales_the_slot() {
        let map = WindowMap::new();
        let state = Box::new(State { marker: 42 });
        map.bind(0x1000, addr(&state));

        // The owning value moves; the heap-pinned state block does not.
        let moved = state;
        assert_eq!(map.len(), 1);
        let resolved = map.resolve(0x1000).expect("slot lost across move");
        assert_eq!(resolved, addr(&moved));

        // A synthetic message resolving the handle reaches the live owner.
        let recovered = unsafe { &*(resolved as *const State) };
        assert_eq!(recovered.marker, 42);
    }

    #[test]
    fn rebinding_replaces_rather_than_duplicates() {
        let map = WindowMap::new();
        let first = Box::new(State { marker: 1 });
        let second = Box::new(State { marker: 2 });
        map.bind(0x1000, addr(&first));
        map.bind(0x1000, addr(&second));
        assert_eq!(map.len(), 1);
        assert_eq!(map.resolve(0x1000), Some(addr(&second)));
    }

    #[test]
    fn removed_handles_no_longer_resolve() {
        let map = WindowMap::new();
        let state = Box::new(State { marker: 3 });
        map.bind(0x1000, addr(&state));
        map.remove(0x1000);
        assert_eq!(map.resolve(0x1000), None);
        assert!(map.is_empty());
    }
}
