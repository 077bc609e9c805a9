//! Menu System
//!
//! Stack-based navigation over an immutable menu tree, driven entirely by
//! knob gestures: a long press enters and leaves the menu, rotation moves
//! the cursor, a short press selects. The tree itself is static; the only
//! mutable state is the cursor (ancestor stack + current node + selected
//! index), owned here.
//!
//! The controller renders nothing. Every cursor movement publishes a
//! render notification carrying the menu group and entry index; the
//! display collaborator turns those into text.

use crate::event::{Event, EventKind, Outbox};
use crate::types::Mode;
use crate::Error;

/// Configuration change a menu leaf performs when selected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MenuAction {
    /// Switch to lower sideband
    SelectLsb,
    /// Switch to upper sideband
    SelectUsb,
    /// Enable the receiver AGC
    AgcOn,
    /// Disable the receiver AGC
    AgcOff,
}

impl MenuAction {
    /// Configuration event published when the leaf fires
    #[must_use]
    pub const fn event(self) -> EventKind {
        match self {
            Self::SelectLsb => EventKind::ModeSelect(Mode::Lsb),
            Self::SelectUsb => EventKind::ModeSelect(Mode::Usb),
            Self::AgcOn => EventKind::AgcEnable,
            Self::AgcOff => EventKind::AgcDisable,
        }
    }
}

/// One node of the immutable menu tree
#[derive(Debug)]
pub enum MenuNode {
    /// Submenu with ordered children
    Node {
        /// Group id carried in render notifications
        group: u8,
        /// Ordered children
        children: &'static [MenuNode],
    },
    /// Selectable action
    Leaf {
        /// What selecting this entry does
        action: MenuAction,
    },
    /// Back entry: selecting it pops to the parent
    Pop,
}

impl MenuNode {
    /// Children of a `Node`; empty for leaves
    #[must_use]
    pub const fn children(&self) -> &'static [MenuNode] {
        match self {
            Self::Node { children, .. } => *children,
            Self::Leaf { .. } | Self::Pop => &[],
        }
    }

    /// Group id of a `Node`; zero for leaves
    #[must_use]
    pub const fn group(&self) -> u8 {
        match self {
            Self::Node { group, .. } => *group,
            Self::Leaf { .. } | Self::Pop => 0,
        }
    }
}

/// Emission submenu: sideband selection
const EMISSION_MENU: MenuNode = MenuNode::Node {
    group: 1,
    children: &[
        MenuNode::Leaf {
            action: MenuAction::SelectLsb,
        },
        MenuNode::Leaf {
            action: MenuAction::SelectUsb,
        },
        MenuNode::Pop,
    ],
};

/// AGC submenu
const AGC_MENU: MenuNode = MenuNode::Node {
    group: 2,
    children: &[
        MenuNode::Leaf {
            action: MenuAction::AgcOn,
        },
        MenuNode::Leaf {
            action: MenuAction::AgcOff,
        },
        MenuNode::Pop,
    ],
};

/// Menu tree root, built once
pub static MENU_ROOT: MenuNode = MenuNode::Node {
    group: 0,
    children: &[EMISSION_MENU, AGC_MENU],
};

/// Deepest supported nesting (root + three levels)
const MENU_MAX_DEPTH: usize = 4;

/// Menu navigation state machine
pub struct MenuController {
    // Ancestors with the index selected at the time of descent
    stack: heapless::Vec<(&'static MenuNode, usize), MENU_MAX_DEPTH>,
    current: &'static MenuNode,
    index: usize,
    in_menu_system: bool,
}

impl MenuController {
    /// Create a controller parked at the tree root, menu inactive
    #[must_use]
    pub fn new() -> Self {
        Self {
            stack: heapless::Vec::new(),
            current: &MENU_ROOT,
            index: 0,
            in_menu_system: false,
        }
    }

    /// Whether the menu currently owns the knob
    ///
    /// Consulted by the executive to retag encoder pulses.
    #[must_use]
    pub const fn active(&self) -> bool {
        self.in_menu_system
    }

    /// Current node and selected entry index (for diagnostics and tests)
    #[must_use]
    pub fn cursor(&self) -> (u8, usize) {
        (self.current.group(), self.index)
    }

    /// React to one published event
    ///
    /// # Errors
    ///
    /// Outbox overflow only; the menu performs no hardware I/O.
    pub fn handle(&mut self, event: &Event, out: &mut Outbox) -> Result<(), Error> {
        match event.kind {
            EventKind::KnobReleasedLong => {
                if self.in_menu_system {
                    self.exit(out)
                } else {
                    self.enter(out)
                }
            }
            EventKind::KnobReleased if self.in_menu_system => self.select(out),
            EventKind::KnobMenuCw if self.in_menu_system => self.move_cursor(1, out),
            EventKind::KnobMenuCcw if self.in_menu_system => self.move_cursor(-1, out),
            _ => Ok(()),
        }
    }

    /// Enter the menu: cursor to root, announce, render
    fn enter(&mut self, out: &mut Outbox) -> Result<(), Error> {
        self.in_menu_system = true;
        self.stack.clear();
        self.current = &MENU_ROOT;
        self.index = 0;
        out.emit(EventKind::MenuEnter)?;
        self.render(out)
    }

    /// Leave the menu, tree untouched
    fn exit(&mut self, out: &mut Outbox) -> Result<(), Error> {
        self.in_menu_system = false;
        out.emit(EventKind::MenuExit)?;
        Ok(())
    }

    /// Act on the selected entry
    fn select(&mut self, out: &mut Outbox) -> Result<(), Error> {
        let Some(child) = self.current.children().get(self.index) else {
            return Ok(());
        };
        match child {
            MenuNode::Pop => self.pop(),
            MenuNode::Leaf { action } => {
                out.emit(action.event())?;
                self.pop();
            }
            node @ MenuNode::Node { .. } => {
                // A tree deeper than the stack refuses to descend
                if self.stack.push((self.current, self.index)).is_ok() {
                    self.current = node;
                    self.index = 0;
                }
            }
        }
        self.render(out)
    }

    /// Pop one level, restoring the parent's cursor; root when the stack
    /// is empty
    fn pop(&mut self) {
        match self.stack.pop() {
            Some((parent, index)) => {
                self.current = parent;
                self.index = index;
            }
            None => {
                self.current = &MENU_ROOT;
                self.index = 0;
            }
        }
    }

    /// Move the cursor one entry, wrapping both directions
    fn move_cursor(&mut self, delta: i32, out: &mut Outbox) -> Result<(), Error> {
        let len = self.current.children().len();
        if len == 0 {
            return Ok(());
        }
        self.index = if delta > 0 {
            (self.index + 1) % len
        } else if self.index == 0 {
            len - 1
        } else {
            self.index - 1
        };
        self.render(out)
    }

    /// Publish a render notification for the current cursor
    #[allow(clippy::cast_possible_truncation)]
    fn render(&self, out: &mut Outbox) -> Result<(), Error> {
        out.emit(EventKind::MenuRender {
            group: self.current.group(),
            entry: self.index as u8,
        })?;
        Ok(())
    }
}

impl Default for MenuController {
    fn default() -> Self {
        Self::new()
    }
}
