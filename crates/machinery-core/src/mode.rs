//! Interaction-mode state machine.
//!
//! Exactly one [`Mode`] is active at a time. The [`ModeController`] owns an
//! ordered, duplicate-free list of [`ModeListener`]s and notifies them on
//! every transition: every listener's exit callback runs before any
//! listener's enter callback, and both passes follow registration order.
//!
//! # Boot sequence
//!
//! [`ModeController::start`] sets the configured initial mode silently and
//! then announces it: every listener gets one `on_enter_mode(current)` and
//! observers receive a `(current, current)` change, even though no real
//! transition happened.
//!
//! # Late registration
//!
//! A listener registered mid-session immediately receives a synthetic
//! `on_enter_mode(current)` so it can initialize without waiting for the next
//! transition.

use serde::{Deserialize, Serialize};
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, warn};

// ---------------------------------------------------------------------------
// Mode
// ---------------------------------------------------------------------------

/// The active interaction mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Mode {
    #[default]
    Selection,
    ComponentPlacement,
    WirePlacement,
    PipePlacement,
    Simulation,
}

impl Mode {
    pub fn all() -> [Mode; 5] {
        [
            Mode::Selection,
            Mode::ComponentPlacement,
            Mode::WirePlacement,
            Mode::PipePlacement,
            Mode::Simulation,
        ]
    }

    /// Number-row hotkey binding.
    pub fn from_hotkey(digit: u8) -> Option<Mode> {
        match digit {
            1 => Some(Mode::Simulation),
            2 => Some(Mode::ComponentPlacement),
            3 => Some(Mode::WirePlacement),
            4 => Some(Mode::PipePlacement),
            5 => Some(Mode::Selection),
            _ => None,
        }
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            Mode::Selection => "Selection",
            Mode::ComponentPlacement => "Component Placement",
            Mode::WirePlacement => "Wire Placement",
            Mode::PipePlacement => "Pipe Placement",
            Mode::Simulation => "Simulation",
        };
        f.write_str(label)
    }
}

// ---------------------------------------------------------------------------
// Listeners and observers
// ---------------------------------------------------------------------------

/// Receives mode transitions.
pub trait ModeListener {
    /// Called after `mode` becomes active.
    fn on_enter_mode(&mut self, mode: Mode);

    /// Called before `mode` is left.
    fn on_exit_mode(&mut self, mode: Mode);
}

/// A listener shared between the controller and its owner.
pub type SharedListener = Rc<RefCell<dyn ModeListener>>;

/// A completed transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub old: Mode,
    pub new: Mode,
}

/// Process-wide observer of completed transitions.
pub type ModeObserver = Box<dyn FnMut(ModeChange)>;

/// Startup configuration for a [`ModeController`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ModeControllerConfig {
    pub initial_mode: Mode,
}

// ---------------------------------------------------------------------------
// ModeController
// ---------------------------------------------------------------------------

/// The single owner of the current interaction mode.
pub struct ModeController {
    current: Mode,
    initial: Mode,
    listeners: Vec<SharedListener>,
    observers: Vec<ModeObserver>,
}

impl std::fmt::Debug for ModeController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModeController")
            .field("current", &self.current)
            .field("initial", &self.initial)
            .field("listeners", &self.listeners.len())
            .field("observers", &self.observers.len())
            .finish()
    }
}

impl Default for ModeController {
    fn default() -> Self {
        Self::new(ModeControllerConfig::default())
    }
}

impl ModeController {
    /// Create a controller. The configured initial mode takes effect on
    /// [`start`](Self::start); until then the mode is [`Mode::Selection`].
    pub fn new(config: ModeControllerConfig) -> Self {
        Self {
            current: Mode::default(),
            initial: config.initial_mode,
            listeners: Vec::new(),
            observers: Vec::new(),
        }
    }

    pub fn current(&self) -> Mode {
        self.current
    }

    pub fn is(&self, mode: Mode) -> bool {
        self.current == mode
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }

    /// Set the initial mode silently, then announce it to every listener.
    pub fn start(&mut self) {
        self.set_mode(self.initial, false);
        self.announce();
    }

    /// Register a listener. Duplicates (by identity) are ignored and return
    /// false; a new listener is immediately told the current mode.
    pub fn register(&mut self, listener: SharedListener) -> bool {
        if self.position_of(&listener).is_some() {
            return false;
        }
        self.listeners.push(listener.clone());
        notify(&listener, |l| l.on_enter_mode(self.current));
        debug!(current = ?self.current, count = self.listeners.len(), "mode listener registered");
        true
    }

    /// Remove a listener. Returns false if it was not registered.
    pub fn unregister(&mut self, listener: &SharedListener) -> bool {
        match self.position_of(listener) {
            Some(i) => {
                self.listeners.remove(i);
                true
            }
            None => false,
        }
    }

    /// Subscribe to completed transitions.
    pub fn subscribe(&mut self, observer: ModeObserver) {
        self.observers.push(observer);
    }

    /// Switch modes.
    ///
    /// With `fire_events`, re-entering the current mode is a no-op and
    /// returns `None`; otherwise listeners see all exits, then all enters,
    /// then observers see the change. Without `fire_events` the mode is
    /// switched with no notification at all.
    pub fn set_mode(&mut self, new: Mode, fire_events: bool) -> Option<ModeChange> {
        if new == self.current && fire_events {
            return None;
        }
        let old = self.current;

        if fire_events {
            for listener in &self.listeners {
                notify(listener, |l| l.on_exit_mode(old));
            }
        }

        self.current = new;
        let change = ModeChange { old, new };

        if fire_events {
            for listener in &self.listeners {
                notify(listener, |l| l.on_enter_mode(new));
            }
            for observer in &mut self.observers {
                observer(change);
            }
            debug!(?old, ?new, "mode changed");
        }
        Some(change)
    }

    /// Flip between Simulation and Selection.
    pub fn toggle_simulation(&mut self) -> Option<ModeChange> {
        if self.current == Mode::Simulation {
            self.set_mode(Mode::Selection, true)
        } else {
            self.set_mode(Mode::Simulation, true)
        }
    }

    fn announce(&mut self) {
        let current = self.current;
        for listener in &self.listeners {
            notify(listener, |l| l.on_enter_mode(current));
        }
        for observer in &mut self.observers {
            observer(ModeChange {
                old: current,
                new: current,
            });
        }
        debug!(?current, "mode announced");
    }

    fn position_of(&self, listener: &SharedListener) -> Option<usize> {
        self.listeners
            .iter()
            .position(|l| std::ptr::addr_eq(Rc::as_ptr(l), Rc::as_ptr(listener)))
    }
}

/// Invoke a listener callback. A listener that is already borrowed (its
/// owner is mid-call) cannot be re-entered and is skipped with a warning.
fn notify(listener: &SharedListener, f: impl FnOnce(&mut dyn ModeListener)) {
    match listener.try_borrow_mut() {
        Ok(mut l) => f(&mut *l),
        Err(_) => warn!("mode listener is borrowed during notification; skipped"),
    }
}
