//! DRC controller
//!
//! A scan runs in three passes over a borrowed board: connectivity probes
//! seeded at every pin, pad and via; per-feature checks (polygon clearance,
//! width, annular ring, drill); silk width checks. All scratch state lives
//! in [`Scan`], so the board is never written and concurrent scans of one
//! board are safe.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::clearance;
use super::connectivity::{ConnectivityIndex, Mark, MarkSet};
use super::list::ViolationList;
use super::probe;
use super::violation::Violation;
use crate::board::{Board, CopperRef, DesignRules, ObjectHandle, ObjectRef};
use crate::core::{BoardCheckError, DrcOptions};

pub const SCOPE_NOTICE: &str = "WARNING: DRC doesn't catch everything";
const SCOPE_NOTICE_EXPLANATION: &str = "Detection of outright shorts, missing connections, etc.\n\
     is handled by net-list reconciliation, not by this check.";

pub const OVERLAP_ADVISORY: &str = "Features narrower than twice the minimum overlap";
const OVERLAP_ADVISORY_EXPLANATION: &str = "Copper this narrow cannot overlap its neighbours by the \
     minimum amount,\nso joints to it are likely to be reported as potential broken traces.";

const MIN_WIDTH_EXPLANATION: &str =
    "Process specifications dictate a minimum feature-width\nthat can reliably be reproduced";
const PAD_WIDTH_EXPLANATION: &str = "Pads which are too thin may erode during etching,\n\
     resulting in a broken or unreliable connection";
const RING_EXPLANATION: &str = "Annular rings that are too small may erode during etching,\n\
     resulting in a broken connection";
const DRILL_EXPLANATION: &str = "Process rules dictate the minimum drill size which can be used";
const SILK_EXPLANATION: &str = "Process specifications dictate a minimum silkscreen\n\
     feature-width that can reliably be reproduced";

/// Shared flag asking a running scan to stop at the next checkpoint
#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

/// Counts from one scan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct DrcSummary {
    /// Violations found by rule checks; the scope notice, the overlap
    /// advisory and rejected duplicates are not counted
    pub violations: usize,
    pub duplicates: usize,
    pub no_paste_pads: usize,
    /// The scan was cancelled; the counts cover the work done so far
    pub aborted: bool,
}

/// Result of [`run_drc`]
#[derive(Debug, Clone)]
pub struct DrcRun {
    pub summary: DrcSummary,
    pub violations: ViolationList,
}

/// Per-scan context passed through the probe and the clearance checks
pub(crate) struct Scan<'a> {
    pub(crate) board: &'a Board,
    pub(crate) rules: DesignRules,
    pub(crate) index: ConnectivityIndex,
    pub(crate) marks: MarkSet,
    pub(crate) list: ViolationList,
    pub(crate) produced: usize,
    log_violations: bool,
    cancel: Option<CancelToken>,
}

impl<'a> Scan<'a> {
    pub(crate) fn new(board: &'a Board, rules: DesignRules, options: &DrcOptions) -> Self {
        Self {
            board,
            rules,
            index: ConnectivityIndex::build(board),
            marks: MarkSet::new(),
            list: ViolationList::new(),
            produced: 0,
            log_violations: options.log_violations,
            cancel: options.cancel.clone(),
        }
    }

    fn cancelled(&self) -> bool {
        self.cancel.as_ref().is_some_and(CancelToken::is_cancelled)
    }

    pub(crate) fn refs(&self, handles: &[ObjectHandle]) -> Vec<ObjectRef> {
        handles
            .iter()
            .filter_map(|&h| self.board.object_ref(h))
            .collect()
    }

    fn log(&self, violation: &Violation) {
        if !self.log_violations {
            return;
        }
        match violation.location() {
            Some(at) => warn!("Design rule error - {} near {}", violation.title(), at),
            None => warn!("Design rule error - {}", violation.title()),
        }
    }

    /// Append a rule violation
    pub(crate) fn record(&mut self, violation: Violation) -> Result<(), BoardCheckError> {
        self.log(&violation);
        self.list.push(violation)?;
        self.produced += 1;
        Ok(())
    }

    /// Append a rule violation unless an equal one was already recorded
    pub(crate) fn record_unique(&mut self, violation: Violation) -> Result<(), BoardCheckError> {
        if self.list.contains(&violation) {
            debug!("duplicate violation: {}", violation.title());
        } else {
            self.log(&violation);
        }
        if self.list.push_unique(violation)? {
            self.produced += 1;
        }
        Ok(())
    }

    fn probe_seeds(&mut self) -> Result<bool, BoardCheckError> {
        let board = self.board;
        let mut seeds = Vec::new();
        for (ei, element) in board.elements.iter().enumerate() {
            seeds.extend((0..element.pins.len()).map(|index| ObjectHandle::Pin { element: ei, index }));
            seeds.extend((0..element.pads.len()).map(|index| ObjectHandle::Pad { element: ei, index }));
        }
        seeds.extend((0..board.vias.len()).map(|index| ObjectHandle::Via { index }));

        for seed in seeds {
            if self.cancelled() {
                return Ok(true);
            }
            if self.marks.has(seed, Mark::PROBED) {
                continue;
            }
            probe::probe(self, seed)?;
        }
        Ok(false)
    }

    fn check_copper(&mut self, overlap_candidates: &mut Vec<ObjectRef>) -> Result<bool, BoardCheckError> {
        let board = self.board;
        for handle in feature_order(board) {
            if self.cancelled() {
                return Ok(true);
            }
            clearance::check_feature(self, handle)?;

            let Some(copper) = board.copper(handle) else {
                continue;
            };
            self.check_width(handle, copper)?;
            if let CopperRef::Pin(pin) | CopperRef::Via(pin) = copper {
                let noun = copper.kind().name();
                if !pin.flags.hole && pin.thickness - pin.drill < 2 * self.rules.min_ring {
                    let v = Violation::new(
                        &format!("{} annular ring too small", noun),
                        RING_EXPLANATION,
                        board.locate(handle),
                        Some((pin.thickness - pin.drill) / 2),
                        self.rules.min_ring,
                        Some(&self.refs(&[handle])),
                    );
                    self.record(v)?;
                }
                if pin.drill < self.rules.min_drill {
                    let v = Violation::new(
                        &format!("{} drill size is too small", noun),
                        DRILL_EXPLANATION,
                        board.locate(handle),
                        Some(pin.drill),
                        self.rules.min_drill,
                        Some(&self.refs(&[handle])),
                    );
                    self.record(v)?;
                }
            }

            let shrink = self.rules.shrink;
            if shrink > 0 && copper.width().is_some_and(|w| w < 2 * shrink) {
                overlap_candidates.extend(board.object_ref(handle));
            }
        }
        Ok(false)
    }

    fn check_width(&mut self, handle: ObjectHandle, copper: CopperRef<'_>) -> Result<(), BoardCheckError> {
        let (title, explanation) = match copper {
            CopperRef::Line(_) => ("Line width is too thin", MIN_WIDTH_EXPLANATION),
            CopperRef::Arc(_) => ("Arc width is too thin", MIN_WIDTH_EXPLANATION),
            CopperRef::Pad(_) => ("Pad is too thin", PAD_WIDTH_EXPLANATION),
            _ => return Ok(()),
        };
        let Some(width) = copper.width() else {
            return Ok(());
        };
        if width < self.rules.min_width {
            let v = Violation::new(
                title,
                explanation,
                self.board.locate(handle),
                Some(width),
                self.rules.min_width,
                Some(&self.refs(&[handle])),
            );
            self.record(v)?;
        }
        Ok(())
    }

    fn check_silk(&mut self) -> Result<(), BoardCheckError> {
        let board = self.board;
        let min_silk = self.rules.min_silk;

        for (li, layer) in board.silk_layers() {
            for (index, line) in layer.lines.iter().enumerate() {
                if line.thickness < min_silk {
                    let handle = ObjectHandle::Line { layer: li, index };
                    let v = Violation::new(
                        "Silk line is too thin",
                        SILK_EXPLANATION,
                        board.locate(handle),
                        Some(line.thickness),
                        min_silk,
                        Some(&self.refs(&[handle])),
                    );
                    self.record(v)?;
                }
            }
        }

        for (index, element) in board.elements.iter().enumerate() {
            let thin: Vec<i64> = element
                .silk_lines
                .iter()
                .map(|l| l.thickness)
                .filter(|&t| t < min_silk)
                .collect();
            let Some(&thinnest) = thin.iter().min() else {
                continue;
            };
            let name = if element.name.is_empty() {
                "(unknown)"
            } else {
                element.name.as_str()
            };
            let handle = ObjectHandle::Element { index };
            let v = Violation::new(
                &format!("Element {} has {} silk lines which are too thin", name, thin.len()),
                SILK_EXPLANATION,
                board.locate(handle),
                Some(thinnest),
                min_silk,
                Some(&self.refs(&[handle])),
            );
            self.record(v)?;
        }
        Ok(())
    }
}

/// Copper lines, then arcs, pins, pads and vias
fn feature_order(board: &Board) -> Vec<ObjectHandle> {
    let mut order = Vec::new();
    for (li, layer) in board.copper_layers() {
        order.extend((0..layer.lines.len()).map(|index| ObjectHandle::Line { layer: li, index }));
    }
    for (li, layer) in board.copper_layers() {
        order.extend((0..layer.arcs.len()).map(|index| ObjectHandle::Arc { layer: li, index }));
    }
    for (ei, element) in board.elements.iter().enumerate() {
        order.extend((0..element.pins.len()).map(|index| ObjectHandle::Pin { element: ei, index }));
    }
    for (ei, element) in board.elements.iter().enumerate() {
        order.extend((0..element.pads.len()).map(|index| ObjectHandle::Pad { element: ei, index }));
    }
    order.extend((0..board.vias.len()).map(|index| ObjectHandle::Via { index }));
    order
}

fn effective_rules(board: &Board, options: &DrcOptions) -> DesignRules {
    let mut rules = options.rules.unwrap_or(board.rules);
    rules.bloat = rules.bloat.max(0);
    rules.shrink = rules.shrink.max(0);
    rules
}

/// Check `board` against its design rules
///
/// The returned list always starts with the scope notice. An allocation
/// failure aborts the scan with [`BoardCheckError::Allocation`]; cancellation
/// is not an error and returns what was found so far.
pub fn run_drc(board: &Board, options: &DrcOptions) -> Result<DrcRun, BoardCheckError> {
    let rules = effective_rules(board, options);
    if options.log_overview {
        info!(
            "Rules are minspace {}, minoverlap {}, minwidth {}, minsilk {}, min drill {}, min annular ring {}",
            rules.bloat, rules.shrink, rules.min_width, rules.min_silk, rules.min_drill, rules.min_ring
        );
    }

    let mut scan = Scan::new(board, rules, options);
    scan.list.push(Violation::new(
        SCOPE_NOTICE,
        SCOPE_NOTICE_EXPLANATION,
        None,
        None,
        0,
        None,
    ))?;

    let mut overlap_candidates = Vec::new();
    let mut aborted = scan.probe_seeds()?;
    scan.marks = MarkSet::new();

    if !aborted {
        aborted = scan.check_copper(&mut overlap_candidates)?;
    }
    if !aborted {
        scan.check_silk()?;
    }

    if rules.shrink > 0 && !overlap_candidates.is_empty() {
        let advisory = Violation::new(
            OVERLAP_ADVISORY,
            OVERLAP_ADVISORY_EXPLANATION,
            None,
            None,
            2 * rules.shrink,
            Some(&overlap_candidates),
        );
        scan.list.insert(1, advisory)?;
    }

    let no_paste_pads = board
        .elements
        .iter()
        .flat_map(|e| e.pads.iter())
        .filter(|p| p.flags.no_paste)
        .count();
    match no_paste_pads {
        0 => {}
        1 => warn!("Warning: 1 pad has the nopaste flag set."),
        n => warn!("Warning: {} pads have the nopaste flag set.", n),
    }

    let summary = DrcSummary {
        violations: scan.produced,
        duplicates: scan.list.duplicates(),
        no_paste_pads,
        aborted,
    };
    if aborted {
        info!("Aborted DRC after {} design rule errors.", summary.violations);
    } else if summary.violations == 0 {
        info!("No DRC problems found.");
    } else {
        info!("Found {} design rule errors.", summary.violations);
    }

    Ok(DrcRun {
        summary,
        violations: scan.list,
    })
}
