//! BoardCheck - printed-circuit-board design rule check library
//!
//! This library checks a board layout against manufacturing rules:
//! copper spacing, copper overlap, trace and silk widths, annular rings,
//! drill sizes, and the clearance of features inside polygon fills.
//!
//! # Quick Start
//!
//! ```no_run
//! use boardcheck::{BoardCheckCore, DrcOptions};
//! use std::path::Path;
//!
//! let result = BoardCheckCore::check_board(
//!     Path::new("design.board.json"),
//!     &DrcOptions::default(),
//! ).unwrap();
//!
//! for violation in result.rule_violations() {
//!     println!("{}: required {}", violation.title(), violation.required());
//! }
//! ```
//!
//! # Features
//!
//! - **Connectivity probes**: shrink and bloat every net to find thin joints
//!   and copper that is too close
//! - **Polygon clearance**: features that should clear a fill, and features
//!   that should bond to it but do not
//! - **Size rules**: minimum width, silk width, drill and annular ring
//! - **Reports**: a stable text dump and JSON

pub mod board;
pub mod core;
pub mod drc;

// Re-export main types
pub use board::{
    Board, BoundingBox, Coord, DesignRules, ObjectFlag, ObjectFlags, ObjectHandle, ObjectId,
    ObjectKind, ObjectRef, Point,
};
pub use crate::core::{
    discover_board_files, load_board, save_board, BoardCheckCore, BoardCheckError, CheckResult,
    DrcOptions, DrcSession,
};
pub use drc::{
    run_drc, CancelToken, DrcRun, DrcSummary, FlagApplication, FlagJournal, UndoJournal,
    Violation, ViolationList,
};

/// Check an in-memory board (convenience wrapper).
pub fn check(board: &Board, options: &DrcOptions) -> Result<DrcRun, BoardCheckError> {
    run_drc(board, options)
}

/// Prelude for convenient imports.
pub mod prelude {
    pub use crate::{
        Board, BoardCheckCore, BoardCheckError, CancelToken, CheckResult, DesignRules, DrcOptions,
        DrcSession, DrcSummary, ObjectFlag, ObjectKind, ObjectRef, Point, UndoJournal, Violation,
        ViolationList,
    };
}
