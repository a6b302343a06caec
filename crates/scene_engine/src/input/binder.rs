//! Data-driven input bindings

use super::{Action, InputEvent, InputQueue, InputSource, KeyState, MouseTarget, TriggerMode};

/// One `(source, mode, action)` binding with its last observed state
#[derive(Debug, Clone, PartialEq)]
pub struct KeyBinding {
    /// Watched key or button
    pub source: InputSource,
    /// Firing rule
    pub mode: TriggerMode,
    /// Result when it fires
    pub action: Action,
    was_pressed: bool,
}

/// Something the binder decided should happen this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fired {
    /// A key binding fired
    Action(Action),
    /// The surface reported a close request
    CloseRequested,
    /// A cursor sample for a mouse subscription
    Cursor {
        /// Subscriber
        target: MouseTarget,
        /// Horizontal position
        x: f64,
        /// Vertical position
        y: f64,
    },
}

/// Input bindings plus the event queue surfaces write into
#[derive(Debug, Default)]
pub struct InputBinder {
    bindings: Vec<KeyBinding>,
    mouse_subscribers: Vec<MouseTarget>,
    queue: InputQueue,
}

impl InputBinder {
    /// Create a binder without bindings
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a binding; bindings fire in registration order
    pub fn bind(&mut self, source: impl Into<InputSource>, mode: TriggerMode, action: Action) {
        let source = source.into();
        log::debug!("Bound {:?} ({:?}) -> {:?}", source, mode, action);
        self.bindings.push(KeyBinding {
            source,
            mode,
            action,
            was_pressed: false,
        });
    }

    /// Remove every binding that targets `action`
    pub fn unbind(&mut self, action: Action) {
        self.bindings.retain(|binding| binding.action != action);
    }

    /// Deliver cursor movement to `target`
    pub fn subscribe_mouse(&mut self, target: MouseTarget) {
        if !self.mouse_subscribers.contains(&target) {
            self.mouse_subscribers.push(target);
        }
    }

    /// Registered bindings
    pub fn bindings(&self) -> &[KeyBinding] {
        &self.bindings
    }

    /// Queue the surface fills during swap-and-poll
    pub fn queue_mut(&mut self) -> &mut InputQueue {
        &mut self.queue
    }

    /// Evaluate one tick
    ///
    /// Queued events are handled first, in arrival order: cursor samples go
    /// to every mouse subscriber and close requests are passed through. Then
    /// every binding is checked against `keys` and its previous state, in
    /// registration order.
    pub fn process(&mut self, keys: &dyn KeyState) -> Vec<Fired> {
        let mut fired = Vec::new();

        for event in self.queue.drain() {
            match event {
                InputEvent::CursorMoved { x, y } => fired.extend(
                    self.mouse_subscribers
                        .iter()
                        .map(|target| Fired::Cursor { target: *target, x, y }),
                ),
                InputEvent::CloseRequested => fired.push(Fired::CloseRequested),
            }
        }

        for binding in &mut self.bindings {
            let pressed = keys.is_pressed(binding.source);
            if binding.mode.fires(pressed, binding.was_pressed) {
                fired.push(Fired::Action(binding.action));
            }
            binding.was_pressed = pressed;
        }

        fired
    }
}
