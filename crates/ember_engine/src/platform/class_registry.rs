//! Process-wide, reference-counted window-class registration
//!
//! A window class is registered with the platform once and shared by every
//! window created from it; the registration is torn down when the last share
//! drops. The platform calls themselves sit behind [`ClassRegistrar`] so the
//! counting logic can be exercised against a mock.

use std::collections::hash_map::{Entry, HashMap};
use std::fmt;
use std::sync::{Arc, Mutex};

use bitflags::bitflags;

use crate::platform::{ModuleHandle, PlatformError};

bitflags! {
    /// Window-class style options, mirroring the Win32 `CS_*` constants.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ClassStyle: u32 {
        /// Redraw the full window on vertical size changes
        const VREDRAW = 0x0001;
        /// Redraw the full window on horizontal size changes
        const HREDRAW = 0x0002;
        /// Deliver double-click messages
        const DBLCLKS = 0x0008;
    }
}

impl Default for ClassStyle {
    fn default() -> Self {
        Self::HREDRAW | Self::VREDRAW
    }
}

/// Registration token returned by the platform (the Win32 `ATOM`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClassAtom(pub u16);

/// Platform calls behind the registry.
///
/// `register` is invoked at most once per live span of a class name;
/// `unregister` exactly once when the last share drops. Teardown errors are
/// the registrar's to log and swallow — the registry never fails a release.
pub trait ClassRegistrar: Send + Sync {
    /// Register `name` under `module` with the given style options.
    fn register(
        &self,
        module: ModuleHandle,
        name: &str,
        style: ClassStyle,
    ) -> Result<ClassAtom, PlatformError>;

    /// Unregister a class previously registered through this registrar.
    fn unregister(&self, module: ModuleHandle, name: &str);
}

struct ClassEntry {
    module: ModuleHandle,
    atom: ClassAtom,
    live: usize,
}

/// Reference-counted registry of window classes, keyed by class name.
///
/// The increment-check-register and decrement-check-unregister sequences
/// each run as one critical section under the registry lock, so concurrent
/// acquisitions from multiple window-owning threads stay consistent.
pub struct WindowClassRegistry {
    registrar: Box<dyn ClassRegistrar>,
    classes: Mutex<HashMap<String, ClassEntry>>,
}

impl WindowClassRegistry {
    /// A registry driving the given platform registrar.
    pub fn new(registrar: impl ClassRegistrar + 'static) -> Arc<Self> {
        Arc::new(Self {
            registrar: Box::new(registrar),
            classes: Mutex::new(HashMap::new()),
        })
    }

    /// Acquire a share of the registration for `name`.
    ///
    /// Registers the class on the first acquisition. Fails with
    /// [`PlatformError::ClassModuleMismatch`] if the class is already live
    /// under a different module handle, and with
    /// [`PlatformError::ClassRegistrationFailed`] if the platform refuses —
    /// in both cases the live count is left unchanged.
    pub fn acquire(
        self: &Arc<Self>,
        module: ModuleHandle,
        name: &str,
        style: ClassStyle,
    ) -> Result<ClassRegistration, PlatformError> {
        let mut classes = self.classes.lock().expect("window class registry poisoned");
        let atom = match classes.entry(name.to_owned()) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().module != module {
                    return Err(PlatformError::ClassModuleMismatch {
                        name: name.to_owned(),
                    });
                }
                occupied.get_mut().live += 1;
                occupied.get().atom
            }
            Entry::Vacant(vacant) => {
                let atom = self.registrar.register(module, name, style)?;
                log::debug!("registered window class {name} (atom {})", atom.0);
                vacant.insert(ClassEntry {
                    module,
                    atom,
                    live: 1,
                });
                atom
            }
        };
        drop(classes);

        Ok(ClassRegistration {
            registry: Arc::clone(self),
            name: name.to_owned(),
            module,
            atom,
        })
    }

    /// Number of live shares for `name` (zero if not registered).
    pub fn live_count(&self, name: &str) -> usize {
        self.classes
            .lock()
            .expect("window class registry poisoned")
            .get(name)
            .map_or(0, |entry| entry.live)
    }

    fn retain(&self, name: &str) {
        let mut classes = self.classes.lock().expect("window class registry poisoned");
        let entry = classes
            .get_mut(name)
            .expect("retain on a class with no live registration");
        entry.live += 1;
    }

    fn release(&self, name: &str) {
        let mut classes = self.classes.lock().expect("window class registry poisoned");
        let Some(entry) = classes.get_mut(name) else {
            return;
        };
        entry.live -= 1;
        if entry.live == 0 {
            let module = entry.module;
            classes.remove(name);
            // Unregister inside the critical section so a concurrent acquire
            // observes either the live entry or the fully cleared state.
            self.registrar.unregister(module, name);
            log::debug!("unregistered window class {name}");
        }
    }
}

/// One share of a window-class registration.
///
/// Cloning increments the live count; dropping decrements it, unregistering
/// the class when the count reaches zero.
pub struct ClassRegistration {
    registry: Arc<WindowClassRegistry>,
    name: String,
    module: ModuleHandle,
    atom: ClassAtom,
}

impl ClassRegistration {
    /// Name of the registered class.
    pub fn class_name(&self) -> &str {
        &self.name
    }

    /// Module handle the class was registered under.
    pub fn module(&self) -> ModuleHandle {
        self.module
    }

    /// Registration token the platform returned for this class.
    pub fn atom(&self) -> ClassAtom {
        self.atom
    }
}

impl fmt::Debug for ClassRegistration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClassRegistration")
            .field("name", &self.name)
            .field("module", &self.module)
            .field("atom", &self.atom)
            .finish_non_exhaustive()
    }
}

impl Clone for ClassRegistration {
    fn clone(&self) -> Self {
        self.registry.retain(&self.name);
        Self {
            registry: Arc::clone(&self.registry),
            name: self.name.clone(),
            module: self.module,
            atom: self.atom,
        }
    }
}

impl Drop for ClassRegistration {
    fn drop(&mut self) {
        self.registry.release(&self.name);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MockRegistrar {
        registrations: AtomicUsize,
        unregistrations: AtomicUsize,
        refuse_first: AtomicUsize,
    }

    struct MockHooks(Arc<MockRegistrar>);

    impl ClassRegistrar for MockHooks {
        fn register(
            &self,
            _module: ModuleHandle,
            name: &str,
            _style: ClassStyle,
        ) -> Result<ClassAtom, PlatformError> {
            if self.0.refuse_first.load(Ordering::SeqCst) > 0 {
                self.0.refuse_first.fetch_sub(1, Ordering::SeqCst);
                return Err(PlatformError::ClassRegistrationFailed {
                    name: name.to_owned(),
                    detail: "mock refusal".to_owned(),
                });
            }
            let count = self.0.registrations.fetch_add(1, Ordering::SeqCst);
            Ok(ClassAtom((count + 1) as u16))
        }

        fn unregister(&self, _module: ModuleHandle, _name: &str) {
            self.0.unregistrations.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn registry() -> (Arc<WindowClassRegistry>, Arc<MockRegistrar>) {
        let mock = Arc::new(MockRegistrar::default());
        let registry = WindowClassRegistry::new(MockHooks(Arc::clone(&mock)));
        (registry, mock)
    }

    const MODULE_A: ModuleHandle = ModuleHandle::from_raw(0x10);
    const MODULE_B: ModuleHandle = ModuleHandle::from_raw(0x20);

    #[test]
    fn first_acquire_registers_and_later_ones_share() {
        let (registry, mock) = registry();
        let first = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        let second = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        assert_eq!(mock.registrations.load(Ordering::SeqCst), 1);
        assert_eq!(registry.live_count("main"), 2);
        drop(first);
        drop(second);
    }

    #[test]
    fn net_live_count_matches_unreleased_acquisitions() {
        let (registry, mock) = registry();
        let shares: Vec<_> = (0..3)
            .map(|_| {
                registry
                    .acquire(MODULE_A, "main", ClassStyle::default())
                    .unwrap()
            })
            .collect();
        assert_eq!(registry.live_count("main"), 3);

        let mut shares = shares;
        shares.pop();
        shares.pop();
        assert_eq!(registry.live_count("main"), 1);
        assert_eq!(mock.unregistrations.load(Ordering::SeqCst), 0);

        shares.pop();
        assert_eq!(registry.live_count("main"), 0);
        assert_eq!(mock.unregistrations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn module_mismatch_fails_without_touching_the_count() {
        let (registry, _mock) = registry();
        let share = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        let err = registry
            .acquire(MODULE_B, "main", ClassStyle::default())
            .unwrap_err();
        assert!(matches!(
            err,
            PlatformError::ClassModuleMismatch { ref name } if name == "main"
        ));
        assert_eq!(registry.live_count("main"), 1);
        drop(share);
    }

    #[test]
    fn registration_refusal_rolls_back() {
        let (registry, mock) = registry();
        mock.refuse_first.store(1, Ordering::SeqCst);

        let err = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap_err();
        assert!(matches!(err, PlatformError::ClassRegistrationFailed { .. }));
        assert_eq!(registry.live_count("main"), 0);

        // The refusal left no residue; the next acquire registers fresh.
        let share = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        assert_eq!(registry.live_count("main"), 1);
        drop(share);
    }

    #[test]
    fn clone_increments_and_keeps_the_class_alive() {
        let (registry, mock) = registry();
        let share = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        let copy = share.clone();
        assert_eq!(registry.live_count("main"), 2);

        drop(share);
        assert_eq!(registry.live_count("main"), 1);
        assert_eq!(mock.unregistrations.load(Ordering::SeqCst), 0);

        drop(copy);
        assert_eq!(mock.unregistrations.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn class_reregisters_after_dropping_to_zero() {
        let (registry, mock) = registry();
        drop(
            registry
                .acquire(MODULE_A, "main", ClassStyle::default())
                .unwrap(),
        );
        // A different module may claim the name once the count hits zero.
        drop(
            registry
                .acquire(MODULE_B, "main", ClassStyle::default())
                .unwrap(),
        );
        assert_eq!(mock.registrations.load(Ordering::SeqCst), 2);
        assert_eq!(mock.unregistrations.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn shares_of_one_class_report_the_same_atom() {
        let (registry, _mock) = registry();
        let first = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        let second = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        assert_eq!(first.atom(), second.atom());
        // Registrations format for diagnostics without exposing the registry.
        let rendered = format!("{first:?}");
        assert!(rendered.contains("main"));
    }

    #[test]
    fn distinct_class_names_are_independent() {
        let (registry, mock) = registry();
        let main = registry
            .acquire(MODULE_A, "main", ClassStyle::default())
            .unwrap();
        let tool = registry
            .acquire(MODULE_B, "tool", ClassStyle::DBLCLKS)
            .unwrap();
        assert_eq!(mock.registrations.load(Ordering::SeqCst), 2);
        assert_eq!(main.class_name(), "main");
        assert_eq!(tool.module(), MODULE_B);
        drop(main);
        assert_eq!(registry.live_count("tool"), 1);
        drop(tool);
    }
}
