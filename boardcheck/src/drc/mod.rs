//! Design rule check engine

pub mod clearance;
pub mod connectivity;
pub mod engine;
pub mod list;
pub mod probe;
pub mod report;
pub mod violation;

pub use connectivity::{ConnectivityIndex, FloodOutcome, Mark, MarkSet};
pub use engine::{run_drc, CancelToken, DrcRun, DrcSummary, OVERLAP_ADVISORY, SCOPE_NOTICE};
pub use list::ViolationList;
pub use report::{report_json, report_to_string, write_report, write_violation};
pub use violation::{FlagApplication, FlagJournal, UndoJournal, Violation};

#[cfg(test)]
pub(crate) mod fixtures {
    use crate::board::{
        Arc, Board, Coord, DesignRules, Element, Layer, LayerKind, Line, ObjectFlags, ObjectId,
        Pad, Pin, Point, Polygon,
    };

    pub fn line(id: ObjectId, x1: Coord, y1: Coord, x2: Coord, y2: Coord, thickness: Coord) -> Line {
        Line {
            id,
            point1: Point::new(x1, y1),
            point2: Point::new(x2, y2),
            thickness,
            clearance: 0,
            flags: ObjectFlags::default(),
        }
    }

    pub fn via(id: ObjectId, x: Coord, y: Coord, thickness: Coord, drill: Coord) -> Pin {
        Pin {
            id,
            number: String::new(),
            position: Point::new(x, y),
            thickness,
            drill,
            clearance: 0,
            flags: ObjectFlags::default(),
        }
    }

    pub fn pin(id: ObjectId, x: Coord, y: Coord, thickness: Coord, drill: Coord) -> Pin {
        Pin {
            number: "1".to_string(),
            ..via(id, x, y, thickness, drill)
        }
    }

    /// Arc with angles in degrees
    pub fn arc(id: ObjectId, cx: Coord, cy: Coord, radius: Coord, start: f64, delta: f64, thickness: Coord) -> Arc {
        Arc {
            id,
            center: Point::new(cx, cy),
            radius,
            start_angle: start,
            delta_angle: delta,
            thickness,
            clearance: 0,
            flags: ObjectFlags::default(),
        }
    }

    pub fn pad(id: ObjectId, x1: Coord, y1: Coord, x2: Coord, y2: Coord, thickness: Coord) -> Pad {
        Pad {
            id,
            number: "1".to_string(),
            point1: Point::new(x1, y1),
            point2: Point::new(x2, y2),
            thickness,
            clearance: 0,
            flags: ObjectFlags::default(),
        }
    }

    pub fn element(id: ObjectId, pins: Vec<Pin>, pads: Vec<Pad>) -> Element {
        Element {
            id,
            name: String::new(),
            mark: Point::default(),
            pins,
            pads,
            silk_lines: vec![],
            flags: ObjectFlags::default(),
        }
    }

    pub fn polygon(id: ObjectId, points: &[(Coord, Coord)]) -> Polygon {
        Polygon {
            id,
            points: points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
            flags: ObjectFlags::default(),
        }
    }

    pub fn copper_layer(name: &str, group: u32, lines: Vec<Line>, polygons: Vec<Polygon>) -> Layer {
        Layer {
            name: name.to_string(),
            kind: LayerKind::Copper,
            group,
            visible: true,
            lines,
            arcs: vec![],
            polygons,
        }
    }

    pub fn silk_layer(name: &str, lines: Vec<Line>) -> Layer {
        Layer {
            name: name.to_string(),
            kind: LayerKind::Silk,
            group: 0,
            visible: true,
            lines,
            arcs: vec![],
            polygons: vec![],
        }
    }

    /// Rules small enough that only the behaviour under test fires
    pub fn loose_rules() -> DesignRules {
        DesignRules {
            bloat: 1,
            shrink: 0,
            min_width: 1,
            min_silk: 1,
            min_drill: 1,
            min_ring: 1,
        }
    }

    pub fn board_with(layers: Vec<Layer>, vias: Vec<Pin>) -> Board {
        Board {
            name: "test".to_string(),
            layers,
            vias,
            ..Default::default()
        }
    }
}
