//! Connectivity probe
//!
//! Shrinking or growing every feature by the manufacturing tolerance must
//! not change what a net reaches. A probe floods from one seed at nominal
//! size and again at perturbed size; the first object whose membership
//! differs, together with the object it was reached from, is the violation.

use tracing::debug;

use super::connectivity::{FloodOutcome, Mark};
use super::engine::Scan;
use super::violation::Violation;
use crate::board::ObjectHandle;
use crate::core::BoardCheckError;

pub const BROKEN_TRACE: &str = "Potential for broken trace";
const BROKEN_TRACE_EXPLANATION: &str = "Insufficient overlap between objects can lead to broken \
     tracks\ndue to registration errors with old wheel style photo-plotters.";

pub const TOO_CLOSE: &str = "Copper areas too close";
pub(crate) const TOO_CLOSE_EXPLANATION: &str = "Circuits that are too close may bridge during \
     imaging, etching,\nplating, or soldering processes resulting in a direct short.";

/// Run both perturbation checks from `seed`
pub(crate) fn probe(scan: &mut Scan<'_>, seed: ObjectHandle) -> Result<(), BoardCheckError> {
    shrink_check(scan, seed)?;
    bloat_check(scan, seed)
}

fn shrink_check(scan: &mut Scan<'_>, seed: ObjectHandle) -> Result<(), BoardCheckError> {
    let shrink = scan.rules.shrink;
    if shrink <= 0 {
        return Ok(());
    }

    scan.index
        .flood(scan.board, &mut scan.marks, seed, Mark::SHRUNK, -shrink, None);
    let outcome = scan.index.flood(
        scan.board,
        &mut scan.marks,
        seed,
        Mark::FOUND,
        0,
        Some(Mark::SHRUNK),
    );

    if let FloodOutcome::NewMember { from, to } = outcome {
        debug!("shrunk net of {:?} loses {:?} (via {:?})", seed, to, from);
        let objects = scan.refs(&[from, to]);
        let violation = Violation::new(
            BROKEN_TRACE,
            BROKEN_TRACE_EXPLANATION,
            scan.board.locate(to),
            None,
            shrink,
            Some(&objects),
        );
        scan.record_unique(violation)?;
    }

    // everything the shrunk fill reached is covered; later seeds there are skipped
    scan.marks.promote(Mark::SHRUNK, Mark::PROBED);
    scan.marks.clear(Mark::FOUND);
    Ok(())
}

fn bloat_check(scan: &mut Scan<'_>, seed: ObjectHandle) -> Result<(), BoardCheckError> {
    let bloat = scan.rules.bloat;

    scan.index
        .flood(scan.board, &mut scan.marks, seed, Mark::ESTABLISHED, 0, None);

    loop {
        let outcome = scan.index.flood(
            scan.board,
            &mut scan.marks,
            seed,
            Mark::FOUND,
            bloat,
            Some(Mark::ESTABLISHED),
        );
        let FloodOutcome::NewMember { from, to } = outcome else {
            break;
        };

        debug!("bloated net of {:?} reaches {:?} (via {:?})", seed, to, from);
        let objects = scan.refs(&[from, to]);
        let violation = Violation::new(
            TOO_CLOSE,
            TOO_CLOSE_EXPLANATION,
            scan.board.locate(to),
            None,
            bloat,
            Some(&objects),
        );
        scan.record_unique(violation)?;

        // adopt the intruding net so it is reported once
        scan.index
            .flood(scan.board, &mut scan.marks, to, Mark::ESTABLISHED, 0, None);
        scan.marks.clear(Mark::FOUND);
    }

    scan.marks.clear(Mark::FOUND);
    scan.marks.clear(Mark::ESTABLISHED);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::DesignRules;
    use crate::core::DrcOptions;
    use crate::drc::fixtures::*;

    fn rules(bloat: i64, shrink: i64) -> DesignRules {
        DesignRules {
            bloat,
            shrink,
            min_width: 1,
            min_silk: 1,
            min_drill: 1,
            min_ring: 1,
        }
    }

    #[test]
    fn test_bloat_check_reports_pair_once_per_net() {
        let board = board_with(
            vec![copper_layer("top", 0, vec![
                line(1, 0, 0, 1000, 0, 4),
                line(2, 200, 12, 1200, 12, 4),
            ], vec![])],
            vec![via(3, 0, 0, 20, 10)],
        );
        let options = DrcOptions::default();
        let mut scan = Scan::new(&board, rules(10, 0), &options);
        probe(&mut scan, board.find(3).unwrap()).unwrap();

        assert_eq!(scan.list.len(), 1);
        let v = scan.list.get(0).unwrap();
        assert_eq!(v.title(), TOO_CLOSE);
        assert_eq!(v.required(), 10);
        let mut ids: Vec<u64> = v.objects().iter().map(|o| o.id).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 2]);
        assert!(scan.marks.is_empty());
    }

    #[test]
    fn test_shrink_check_finds_thin_overlap() {
        // second line only overlaps the first by 2 units at the joint
        let board = board_with(
            vec![copper_layer("top", 0, vec![
                line(1, 0, 0, 100, 0, 10),
                line(2, 108, 0, 200, 0, 10),
            ], vec![])],
            vec![via(3, 0, 0, 30, 10)],
        );
        let options = DrcOptions::default();
        let mut scan = Scan::new(&board, rules(0, 4), &options);
        let seed = board.find(3).unwrap();
        probe(&mut scan, seed).unwrap();

        assert_eq!(scan.list.len(), 1);
        assert_eq!(scan.list.get(0).unwrap().title(), BROKEN_TRACE);
        assert_eq!(scan.list.get(0).unwrap().required(), 4);
        assert!(scan.marks.has(seed, Mark::PROBED));
        assert!(scan.marks.has(board.find(1).unwrap(), Mark::PROBED));
        assert!(!scan.marks.has(board.find(2).unwrap(), Mark::PROBED));
    }

    #[test]
    fn test_clean_net_leaves_no_marks_but_probed() {
        let board = board_with(
            vec![copper_layer("top", 0, vec![line(1, 0, 0, 100, 0, 10)], vec![])],
            vec![via(2, 0, 0, 30, 10)],
        );
        let options = DrcOptions::default();
        let mut scan = Scan::new(&board, rules(10, 2), &options);
        probe(&mut scan, board.find(2).unwrap()).unwrap();

        assert!(scan.list.is_empty());
        assert!(scan.marks.has(board.find(1).unwrap(), Mark::PROBED));
        assert_eq!(scan.marks.count(Mark::PROBED), 2);
        assert_eq!(scan.marks.count(Mark::FOUND), 0);
        assert_eq!(scan.marks.count(Mark::ESTABLISHED), 0);
    }
}
