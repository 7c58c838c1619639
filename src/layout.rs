//! Control surface layout
//!
//! Classifies the surface's numeric control ids into device roles. The id
//! space is declared as a table built once at startup; anything outside the
//! table is unmapped and ignored by the device.
//!
//! Surface id layout (8x8 grid plus edges):
//!
//! ```text
//!      1   2   3   4   5   6   7   8
//!     ┌───┬───┬───┬───┬───┬───┬───┬───┐
//!  91 │   track selectors (91-98)    │ 98
//!     ├───┼───┼───┼───┼───┼───┼───┼───┤
//!  81 │   │   │   │   │   │   │   │   │ 89  <- nav up
//!  71 │   │   │   │   │   │   │   │   │ 79  <- nav right
//!  61 │   │          8x8 grid        │ 69  <- nav down
//!  51 │   │  id = row * 10 + col     │ 59  <- nav left
//!  41 │   │   │   │   │   │   │   │   │
//!  31 │   │   │   │   │   │   │   │   │
//!  21 │   │   │   │   │   │   │   │   │
//!  11 │   │   │   │   │   │   │   │   │ 18
//!     └───┴───┴───┴───┴───┴───┴───┴───┘
//!    104 option  105 edit  106 shift      <- function row
//! ```

use once_cell::sync::Lazy;
use std::collections::HashMap;

/// Numeric control identifier (a MIDI note number, so 7-bit).
pub type ControlId = u8;

/// Grid dimensions. Pads are addressed as `row * 10 + col`, both 1-based.
pub const GRID_ROWS: u8 = 8;
pub const GRID_COLS: u8 = 8;

/// First track-selector id; selectors occupy a contiguous block of eight.
pub const TRACK_SELECT_BASE: ControlId = 91;
pub const TRACK_COUNT: u8 = 8;

pub const NAV_UP: ControlId = 89;
pub const NAV_RIGHT: ControlId = 79;
pub const NAV_DOWN: ControlId = 69;
pub const NAV_LEFT: ControlId = 59;

/// Navigation keys in boot-pattern order.
pub const NAV_KEYS: [ControlId; 4] = [NAV_UP, NAV_RIGHT, NAV_DOWN, NAV_LEFT];

pub const FN_OPTION: ControlId = 104;
pub const FN_EDIT: ControlId = 105;
pub const FN_SHIFT: ControlId = 106;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavDirection {
    Up,
    Right,
    Down,
    Left,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionKey {
    Option,
    Edit,
    Shift,
}

/// Role of a control id on the surface.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Main grid pad, 1-based row and column.
    Pad { row: u8, col: u8 },
    /// Track selector, 0-based index.
    TrackSelect { index: u8 },
    Nav(NavDirection),
    Function(FunctionKey),
}

static ROLES: Lazy<HashMap<ControlId, Role>> = Lazy::new(|| {
    let mut table = HashMap::new();

    for row in 1..=GRID_ROWS {
        for col in 1..=GRID_COLS {
            table.insert(pad_id(row, col), Role::Pad { row, col });
        }
    }

    for index in 0..TRACK_COUNT {
        table.insert(track_select_id(index), Role::TrackSelect { index });
    }

    table.insert(NAV_UP, Role::Nav(NavDirection::Up));
    table.insert(NAV_RIGHT, Role::Nav(NavDirection::Right));
    table.insert(NAV_DOWN, Role::Nav(NavDirection::Down));
    table.insert(NAV_LEFT, Role::Nav(NavDirection::Left));

    table.insert(FN_OPTION, Role::Function(FunctionKey::Option));
    table.insert(FN_EDIT, Role::Function(FunctionKey::Edit));
    table.insert(FN_SHIFT, Role::Function(FunctionKey::Shift));

    table
});

/// Classify a control id. Unknown ids are unmapped, never an error.
pub fn role_of(id: ControlId) -> Option<Role> {
    ROLES.get(&id).copied()
}

/// Pad id for a 1-based row/col pair.
pub const fn pad_id(row: u8, col: u8) -> ControlId {
    row * 10 + col
}

/// Selector id for a 0-based track index.
pub const fn track_select_id(index: u8) -> ControlId {
    TRACK_SELECT_BASE + index
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pad_corners() {
        assert_eq!(role_of(11), Some(Role::Pad { row: 1, col: 1 }));
        assert_eq!(role_of(18), Some(Role::Pad { row: 1, col: 8 }));
        assert_eq!(role_of(81), Some(Role::Pad { row: 8, col: 1 }));
        assert_eq!(role_of(88), Some(Role::Pad { row: 8, col: 8 }));
    }

    #[test]
    fn test_every_pad_classifies() {
        for row in 1..=GRID_ROWS {
            for col in 1..=GRID_COLS {
                assert_eq!(role_of(pad_id(row, col)), Some(Role::Pad { row, col }));
            }
        }
    }

    #[test]
    fn test_track_selectors() {
        assert_eq!(role_of(91), Some(Role::TrackSelect { index: 0 }));
        assert_eq!(role_of(98), Some(Role::TrackSelect { index: 7 }));
        assert_eq!(track_select_id(3), 94);
    }

    #[test]
    fn test_navigation_keys() {
        assert_eq!(role_of(NAV_UP), Some(Role::Nav(NavDirection::Up)));
        assert_eq!(role_of(NAV_RIGHT), Some(Role::Nav(NavDirection::Right)));
        assert_eq!(role_of(NAV_DOWN), Some(Role::Nav(NavDirection::Down)));
        assert_eq!(role_of(NAV_LEFT), Some(Role::Nav(NavDirection::Left)));
    }

    #[test]
    fn test_function_keys() {
        assert_eq!(role_of(FN_OPTION), Some(Role::Function(FunctionKey::Option)));
        assert_eq!(role_of(FN_EDIT), Some(Role::Function(FunctionKey::Edit)));
        assert_eq!(role_of(FN_SHIFT), Some(Role::Function(FunctionKey::Shift)));
    }

    #[test]
    fn test_ids_outside_every_range_are_unmapped() {
        // Edges of the grid numbering that are not pads
        for id in [0, 9, 10, 19, 20, 90, 99, 100, 103, 107, 127] {
            assert_eq!(role_of(id), None, "id {} should be unmapped", id);
        }
    }

    #[test]
    fn test_roles_are_disjoint() {
        // Every mapped id belongs to exactly one role by construction;
        // check the table size matches the sum of the declared ranges.
        let mapped = (0..=127).filter(|&id| role_of(id).is_some()).count();
        assert_eq!(mapped, 64 + 8 + 4 + 3);
    }
}
