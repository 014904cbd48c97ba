//! Redraw notifications for the rendering collaborator.
//!
//! The structure never draws anything. Mutations raise [`GraphicsChange`] bits on a
//! [`GraphicsChanges`] sink; the renderer drains them once per frame.

use bitflags::bitflags;
use std::fmt;

bitflags! {
    /// What kind of redraw a mutation requires.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct GraphicsChange: u32 {
        const SHAPE = 0x01;
        const COLOR = 0x02;
        const SELECT = 0x04;
        const RIBBON = 0x08;
        const ADDDEL = 0x10;
        const DISPLAY = 0x20;
        const RING = 0x40;
    }
}

/// Sink for redraw notifications.
///
/// Only [`set_changes`](GraphicsChanges::set_changes), [`changes`](GraphicsChanges::changes)
/// and [`take_changes`](GraphicsChanges::take_changes) are required; the `set_gc_*`
/// helpers raise a single bit.
pub trait GraphicsChanges: fmt::Debug {
    /// Raises the given bits, keeping those already pending.
    fn set_changes(&mut self, change: GraphicsChange);

    fn changes(&self) -> GraphicsChange;

    /// Returns the pending bits and resets them.
    fn take_changes(&mut self) -> GraphicsChange;

    fn set_gc_shape(&mut self) {
        self.set_changes(GraphicsChange::SHAPE);
    }

    fn set_gc_color(&mut self) {
        self.set_changes(GraphicsChange::COLOR);
    }

    fn set_gc_select(&mut self) {
        self.set_changes(GraphicsChange::SELECT);
    }

    fn set_gc_ribbon(&mut self) {
        self.set_changes(GraphicsChange::RIBBON);
    }

    fn set_gc_adddel(&mut self) {
        self.set_changes(GraphicsChange::ADDDEL);
    }

    fn set_gc_display(&mut self) {
        self.set_changes(GraphicsChange::DISPLAY);
    }

    fn set_gc_ring(&mut self) {
        self.set_changes(GraphicsChange::RING);
    }
}

/// Accumulates bits until taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct GraphicsFlags {
    pending: GraphicsChange,
}

impl GraphicsFlags {
    pub fn new() -> Self {
        Self::default()
    }
}

impl GraphicsChanges for GraphicsFlags {
    fn set_changes(&mut self, change: GraphicsChange) {
        self.pending |= change;
    }

    fn changes(&self) -> GraphicsChange {
        self.pending
    }

    fn take_changes(&mut self) -> GraphicsChange {
        std::mem::take(&mut self.pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn helpers_accumulate_bits() {
        let mut flags = GraphicsFlags::new();
        flags.set_gc_ribbon();
        flags.set_gc_adddel();
        flags.set_gc_ribbon();
        assert_eq!(flags.changes(), GraphicsChange::RIBBON | GraphicsChange::ADDDEL);
    }

    #[test]
    fn take_changes_resets_pending_bits() {
        let mut flags = GraphicsFlags::new();
        flags.set_gc_color();
        assert_eq!(flags.take_changes(), GraphicsChange::COLOR);
        assert!(flags.changes().is_empty());
    }
}
