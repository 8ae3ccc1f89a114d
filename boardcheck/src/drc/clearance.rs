//! Polygon clearance checks
//!
//! Every copper feature near a fill polygon either keeps its clearance hole
//! free of the fill or is meant to bond to it. Box overlap alone proves
//! nothing, so each candidate pair is confirmed against the real outlines
//! and re-tested at grown size before anything is reported.

use tracing::warn;

use super::connectivity::{ConnectivityIndex, Mark, MarkSet};
use super::engine::Scan;
use super::probe::TOO_CLOSE_EXPLANATION;
use super::violation::Violation;
use crate::board::{BoundingBox, CopperRef, ObjectHandle, ObjectKind};
use crate::core::BoardCheckError;

const NOT_CONNECTED_EXPLANATION: &str = "A feature meant to join a polygon fill does not reach \
     its copper,\nso the connection is never made.";

/// Polygons sharing a copper group with `object` whose boxes meet `search`
pub fn polygons_near(
    index: &ConnectivityIndex,
    object: ObjectHandle,
    search: &BoundingBox,
) -> Vec<ObjectHandle> {
    index
        .candidates(search)
        .into_iter()
        .filter(|&c| c != object && c.kind() == ObjectKind::Polygon)
        .filter(|&c| index.shares_group(object, c))
        .collect()
}

/// Run the clearance check against every polygon near `object`
pub(crate) fn check_feature(scan: &mut Scan<'_>, object: ObjectHandle) -> Result<(), BoardCheckError> {
    let Some(bbox) = scan.index.bounding_box(object) else {
        return Ok(());
    };
    let search = bbox.bloated(scan.rules.bloat);
    for polygon in polygons_near(&scan.index, object, &search) {
        check_polygon_clearance(scan, object, polygon)?;
    }
    Ok(())
}

/// Decide whether `object` violates clearance to, or fails to bond with, `polygon`
pub(crate) fn check_polygon_clearance(
    scan: &mut Scan<'_>,
    object: ObjectHandle,
    polygon: ObjectHandle,
) -> Result<(), BoardCheckError> {
    let board = scan.board;
    let (Some(copper), Some(CopperRef::Polygon(poly))) = (board.copper(object), board.copper(polygon))
    else {
        return Ok(());
    };
    if !scan.index.overlaps_uncleared(object, polygon) {
        return Ok(());
    }

    let bloat = scan.rules.bloat;
    let clears = copper.clears(poly);
    let kind = copper.kind();

    match copper {
        CopperRef::Line(_) | CopperRef::Arc(_) if clears => {
            if copper.clearance() < 2 * bloat
                && scan.index.polygon_contact(board, object, polygon, bloat as f64)
            {
                let v = insufficient_clearance(scan, kind, copper.clearance(), object, polygon);
                scan.record(v)?;
            }
        }
        CopperRef::Line(_) | CopperRef::Arc(_) => {
            let mut contact = MarkSet::new();
            scan.index
                .flood(board, &mut contact, object, Mark::FOUND, 0, None);
            if !contact.has(polygon, Mark::FOUND) {
                let v = not_connected(scan, kind, object, polygon);
                scan.record(v)?;
            }
        }
        CopperRef::Via(_) if !clears => {
            if !scan.index.polygon_contact(board, object, polygon, 0.0) {
                let v = not_connected(scan, kind, object, polygon);
                scan.record(v)?;
            }
        }
        CopperRef::Via(_) | CopperRef::Pin(_) | CopperRef::Pad(_) => {
            let clearance = copper.clearance();
            if clears
                && clearance < 2 * bloat
                && scan.index.polygon_contact(board, object, polygon, bloat as f64)
            {
                let v = insufficient_clearance(scan, kind, clearance, object, polygon);
                scan.record(v)?;
            }
        }
        CopperRef::Polygon(_) => {
            warn!("{} reached the polygon clearance check; skipping", kind);
        }
    }
    Ok(())
}

fn insufficient_clearance(
    scan: &Scan<'_>,
    kind: ObjectKind,
    clearance: i64,
    object: ObjectHandle,
    polygon: ObjectHandle,
) -> Violation {
    let title = format!("{} with insufficient clearance inside polygon", kind.name());
    Violation::new(
        &title,
        TOO_CLOSE_EXPLANATION,
        scan.board.locate(object),
        Some(clearance / 2),
        scan.rules.bloat,
        Some(&scan.refs(&[object, polygon])),
    )
}

fn not_connected(
    scan: &Scan<'_>,
    kind: ObjectKind,
    object: ObjectHandle,
    polygon: ObjectHandle,
) -> Violation {
    let title = format!("{} not connected to polygon", kind.name());
    Violation::new(
        &title,
        NOT_CONNECTED_EXPLANATION,
        scan.board.locate(object),
        None,
        0,
        Some(&scan.refs(&[object, polygon])),
    )
}
