//! Scripted surface without a window
//!
//! Used for automated runs and tests: it reports a fixed size, closes
//! after a frame budget, and replays scripted key states and queued events
//! frame by frame.

use super::backend::PresentationSurface;
use crate::input::{InputEvent, InputQueue, InputSource, KeyState};
use std::collections::{HashMap, HashSet};

/// Window stand-in driven by a script
#[derive(Debug)]
pub struct HeadlessSurface {
    size: (u32, u32),
    frame: u64,
    max_frames: Option<u64>,
    close_requested: bool,
    resized: bool,
    pressed: HashSet<InputSource>,
    key_script: HashMap<u64, Vec<(InputSource, bool)>>,
    event_script: HashMap<u64, Vec<InputEvent>>,
}

impl HeadlessSurface {
    /// Surface of the given size that never closes by itself
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            size: (width, height),
            frame: 0,
            max_frames: None,
            close_requested: false,
            resized: true,
            pressed: HashSet::new(),
            key_script: HashMap::new(),
            event_script: HashMap::new(),
        }
    }

    /// Close after `frames` presented frames
    pub fn with_frame_limit(mut self, frames: u64) -> Self {
        self.max_frames = Some(frames);
        self
    }

    /// Change a source's state when frame `frame` is presented
    ///
    /// Frame numbers count presented frames starting at 1, so a change
    /// scheduled at frame 1 is visible to the second tick.
    pub fn set_pressed_at(&mut self, frame: u64, source: impl Into<InputSource>, pressed: bool) {
        self.key_script
            .entry(frame)
            .or_default()
            .push((source.into(), pressed));
    }

    /// Deliver `event` when frame `frame` is presented
    pub fn push_event_at(&mut self, frame: u64, event: InputEvent) {
        self.event_script.entry(frame).or_default().push(event);
    }

    /// Press a source immediately
    pub fn press(&mut self, source: impl Into<InputSource>) {
        self.pressed.insert(source.into());
    }

    /// Resize and flag it for the next tick
    pub fn resize(&mut self, width: u32, height: u32) {
        self.size = (width, height);
        self.resized = true;
    }

    /// Frames presented so far
    pub fn frames_presented(&self) -> u64 {
        self.frame
    }
}

impl KeyState for HeadlessSurface {
    fn is_pressed(&self, source: InputSource) -> bool {
        self.pressed.contains(&source)
    }
}

impl PresentationSurface for HeadlessSurface {
    fn should_close(&self) -> bool {
        self.close_requested || self.max_frames.is_some_and(|max| self.frame >= max)
    }

    fn request_close(&mut self) {
        self.close_requested = true;
    }

    fn swap_and_poll(&mut self, events: &mut InputQueue) {
        self.frame += 1;

        for (source, pressed) in self.key_script.remove(&self.frame).unwrap_or_default() {
            if pressed {
                self.pressed.insert(source);
            } else {
                self.pressed.remove(&source);
            }
        }

        for event in self.event_script.remove(&self.frame).unwrap_or_default() {
            events.push(event);
        }
    }

    fn size(&self) -> (u32, u32) {
        self.size
    }

    fn take_resized(&mut self) -> bool {
        std::mem::replace(&mut self.resized, false)
    }
}
