/*!
Input sampling.

Platform events reach the core through the [`InputSource`] trait: the host
delivers key transitions and pointer motion, and the [`InputSampler`] folds them
into the held-action set plus an accumulated look delta that the controller
consumes once per frame.

Gating
- While movement is disabled key-down and pointer motion are dropped.
- Key-up is always accepted so a key released while disabled does not stay held.
*/

use std::collections::{HashMap, VecDeque};

use crate::bitmask_flags::{ActionSet, MoveAction};

/// A key transition, identified by its physical key code name (e.g. `"KeyW"`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum KeyEvent {
    Down(String),
    Up(String),
}

/// Platform input, injected into the sampler each frame.
pub trait InputSource {
    /// Deliver (and consume) every pending key transition, oldest first.
    fn for_each_key_event(&mut self, f: &mut dyn FnMut(KeyEvent));

    /// Deliver (and consume) every pending pointer motion `(dx, dy)`, oldest first.
    fn for_each_pointer_move(&mut self, f: &mut dyn FnMut(f32, f32));

    /// Whether the pointer is exclusively captured by the view.
    fn is_pointer_captured(&self) -> bool;
}

/// In-memory `InputSource` for tests and simple hosts.
#[derive(Clone, Debug, Default)]
pub struct QueuedInput {
    keys: VecDeque<KeyEvent>,
    moves: VecDeque<(f32, f32)>,
    pub captured: bool,
}

impl QueuedInput {
    pub fn new(captured: bool) -> Self {
        Self {
            captured,
            ..Default::default()
        }
    }

    pub fn key_down(&mut self, code: impl Into<String>) -> &mut Self {
        self.keys.push_back(KeyEvent::Down(code.into()));
        self
    }

    pub fn key_up(&mut self, code: impl Into<String>) -> &mut Self {
        self.keys.push_back(KeyEvent::Up(code.into()));
        self
    }

    pub fn pointer_move(&mut self, dx: f32, dy: f32) -> &mut Self {
        self.moves.push_back((dx, dy));
        self
    }

    #[inline]
    pub fn is_drained(&self) -> bool {
        self.keys.is_empty() && self.moves.is_empty()
    }
}

impl InputSource for QueuedInput {
    fn for_each_key_event(&mut self, f: &mut dyn FnMut(KeyEvent)) {
        while let Some(ev) = self.keys.pop_front() {
            f(ev);
        }
    }

    fn for_each_pointer_move(&mut self, f: &mut dyn FnMut(f32, f32)) {
        while let Some((dx, dy)) = self.moves.pop_front() {
            f(dx, dy);
        }
    }

    fn is_pointer_captured(&self) -> bool {
        self.captured
    }
}

/// Key code name to logical action.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyBindings {
    entries: Vec<(String, MoveAction)>,
}

impl KeyBindings {
    pub fn empty() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Add a binding. Several codes may map to the same action.
    pub fn bind(&mut self, code: impl Into<String>, action: MoveAction) -> &mut Self {
        self.entries.push((code.into(), action));
        self
    }

    pub fn action_for(&self, code: &str) -> Option<MoveAction> {
        self.entries
            .iter()
            .find(|(c, _)| c == code)
            .map(|(_, a)| *a)
    }

    pub fn codes(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(c, _)| c.as_str())
    }

    /// Codes bound to `action`, in binding order.
    pub fn codes_for(&self, action: MoveAction) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|(_, a)| *a == action)
            .map(|(c, _)| c.as_str())
            .collect()
    }
}

impl Default for KeyBindings {
    fn default() -> Self {
        let mut b = Self::empty();
        b.bind("KeyW", MoveAction::Forward)
            .bind("ArrowUp", MoveAction::Forward)
            .bind("KeyS", MoveAction::Back)
            .bind("ArrowDown", MoveAction::Back)
            .bind("KeyA", MoveAction::Left)
            .bind("ArrowLeft", MoveAction::Left)
            .bind("KeyD", MoveAction::Right)
            .bind("ArrowRight", MoveAction::Right)
            .bind("KeyE", MoveAction::Interact);
        b
    }
}

/// Held actions plus the look delta accumulated since the last `take_mouse_delta`.
#[derive(Clone, Debug)]
pub struct InputSampler {
    bindings: KeyBindings,
    /// Physical keys currently down, with the action each one holds.
    held_keys: HashMap<String, MoveAction>,
    actions: ActionSet,
    mouse_delta: (f32, f32),
    enabled: bool,
}

impl InputSampler {
    pub fn new(bindings: KeyBindings) -> Self {
        Self {
            bindings,
            held_keys: HashMap::new(),
            actions: ActionSet::default(),
            mouse_delta: (0.0, 0.0),
            enabled: true,
        }
    }

    pub fn on_key_down(&mut self, code: &str) {
        if !self.enabled {
            return;
        }
        let Some(action) = self.bindings.action_for(code) else {
            return;
        };
        self.held_keys.insert(code.to_string(), action);
        self.actions.add(action);
    }

    pub fn on_key_up(&mut self, code: &str) {
        let Some(action) = self.held_keys.remove(code) else {
            return;
        };
        // Another key bound to the same action may still be down.
        if !self.held_keys.values().any(|a| *a == action) {
            self.actions.remove(action);
        }
    }

    pub fn on_mouse_move(&mut self, dx: f32, dy: f32, pointer_captured: bool) {
        if !self.enabled || !pointer_captured || !dx.is_finite() || !dy.is_finite() {
            return;
        }
        self.mouse_delta.0 += dx;
        self.mouse_delta.1 += dy;
    }

    /// Return the accumulated look delta and reset it.
    pub fn take_mouse_delta(&mut self) -> (f32, f32) {
        std::mem::take(&mut self.mouse_delta)
    }

    #[inline]
    pub fn actions(&self) -> ActionSet {
        self.actions
    }

    #[inline]
    pub fn is_held(&self, action: MoveAction) -> bool {
        self.actions.has(action)
    }

    #[inline]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Turning input off forgets everything held or pending.
    pub fn set_enabled(&mut self, enabled: bool) {
        if self.enabled == enabled {
            return;
        }
        self.enabled = enabled;
        if !enabled {
            self.held_keys.clear();
            self.actions.clear();
            self.mouse_delta = (0.0, 0.0);
        }
    }

    /// Drain everything pending in `source`.
    pub fn pump(&mut self, source: &mut dyn InputSource) {
        source.for_each_key_event(&mut |ev| match ev {
            KeyEvent::Down(code) => self.on_key_down(&code),
            KeyEvent::Up(code) => self.on_key_up(&code),
        });
        let captured = source.is_pointer_captured();
        source.for_each_pointer_move(&mut |dx, dy| self.on_mouse_move(dx, dy, captured));
    }

    #[inline]
    pub fn bindings(&self) -> &KeyBindings {
        &self.bindings
    }
}

impl Default for InputSampler {
    fn default() -> Self {
        Self::new(KeyBindings::default())
    }
}
