//! Terminal events exposed as size and visibility sources.

use std::cell::RefCell;
use std::rc::Rc;

use driftweb_field::{ResizeHandler, SizeSource, Visibility, VisibilityHandler, VisibilitySource};

/// Fans terminal resize and focus events out to subscribed handlers.
///
/// Clones share their subscribers, so the app keeps one handle while the
/// field subscribes through another.
#[derive(Debug, Clone, Default)]
pub struct TerminalSignals {
    resize: Rc<RefCell<Vec<ResizeHandler>>>,
    visibility: Rc<RefCell<Vec<VisibilityHandler>>>,
}

impl TerminalSignals {
    /// The terminal changed size.
    pub fn resized(&self) {
        for handler in self.resize.borrow().iter() {
            handler.notify();
        }
    }

    /// The terminal gained or lost focus, or was paused by the user.
    pub fn visibility_changed(&self, visibility: Visibility) {
        for handler in self.visibility.borrow().iter() {
            handler.notify(visibility);
        }
    }
}

impl SizeSource for TerminalSignals {
    fn on_change(&mut self, handler: ResizeHandler) {
        self.resize.borrow_mut().push(handler);
    }
}

impl VisibilitySource for TerminalSignals {
    fn on_change(&mut self, handler: VisibilityHandler) {
        self.visibility.borrow_mut().push(handler);
    }
}
