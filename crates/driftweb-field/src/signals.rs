//! Size and visibility notifications from the host.
//!
//! Sources receive a handler at mount time and call it whenever the host
//! observes a change. Handlers only queue the event; the field applies
//! queued events between frames.

use std::sync::mpsc::Sender;

/// Whether the document hosting the surface is shown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    Visible,
    Hidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum FieldEvent {
    Resized,
    VisibilityChanged(Visibility),
}

/// Handle a [`SizeSource`] calls when the container changes size.
#[derive(Debug, Clone)]
pub struct ResizeHandler {
    tx: Sender<FieldEvent>,
}

impl ResizeHandler {
    pub(crate) fn new(tx: Sender<FieldEvent>) -> Self {
        Self { tx }
    }

    /// Report a size change. A no-op once the field is gone.
    pub fn notify(&self) {
        if self.tx.send(FieldEvent::Resized).is_err() {
            tracing::trace!("resize after the particle field was dropped");
        }
    }
}

/// Handle a [`VisibilitySource`] calls when visibility flips.
#[derive(Debug, Clone)]
pub struct VisibilityHandler {
    tx: Sender<FieldEvent>,
}

impl VisibilityHandler {
    pub(crate) fn new(tx: Sender<FieldEvent>) -> Self {
        Self { tx }
    }

    /// Report the new visibility. A no-op once the field is gone.
    pub fn notify(&self, visibility: Visibility) {
        if self
            .tx
            .send(FieldEvent::VisibilityChanged(visibility))
            .is_err()
        {
            tracing::trace!(?visibility, "visibility change after the particle field was dropped");
        }
    }
}

/// Something that can observe size changes.
pub trait SizeSource {
    fn on_change(&mut self, handler: ResizeHandler);
}

/// Something that can observe document visibility.
pub trait VisibilitySource {
    fn on_change(&mut self, handler: VisibilityHandler);
}
