//! Connectivity index and flood fill
//!
//! The index is built once per scan. An R-tree over copper bounding boxes
//! answers candidate queries; a petgraph graph caches which features touch
//! at nominal size, so zero and negative deltas never go back to the tree.
//! Clearing polygons keep a list of the holes cut into them, used to decide
//! whether a bonding feature actually reaches copper.

use std::collections::{HashMap, VecDeque};

use petgraph::graph::{NodeIndex, UnGraph};
use rstar::{RTree, RTreeObject, AABB};
use tracing::debug;

use crate::board::geometry::Shape;
use crate::board::{Board, BoundingBox, Coord, CopperRef, ObjectHandle, ObjectKind};

/// Scan-local scratch mark
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mark(u8);

impl Mark {
    /// Reached by the shrunk fill
    pub const SHRUNK: Mark = Mark(1 << 0);
    /// Known member of the net being probed
    pub const ESTABLISHED: Mark = Mark(1 << 1);
    pub const FOUND: Mark = Mark(1 << 2);
    /// Already covered by an earlier probe
    pub const PROBED: Mark = Mark(1 << 3);
}

/// Marks attached to objects for the duration of one scan
#[derive(Debug, Clone, Default)]
pub struct MarkSet {
    marks: HashMap<ObjectHandle, u8>,
}

impl MarkSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set(&mut self, handle: ObjectHandle, mark: Mark) {
        *self.marks.entry(handle).or_insert(0) |= mark.0;
    }

    pub fn has(&self, handle: ObjectHandle, mark: Mark) -> bool {
        self.marks.get(&handle).is_some_and(|m| m & mark.0 != 0)
    }

    pub fn clear(&mut self, mark: Mark) {
        self.marks.retain(|_, m| {
            *m &= !mark.0;
            *m != 0
        });
    }

    /// Add `to` wherever `from` is set, then drop `from`
    pub fn promote(&mut self, from: Mark, to: Mark) {
        for m in self.marks.values_mut() {
            if *m & from.0 != 0 {
                *m |= to.0;
            }
        }
        self.clear(from);
    }

    pub fn count(&self, mark: Mark) -> usize {
        self.marks.values().filter(|m| *m & mark.0 != 0).count()
    }

    pub fn is_empty(&self) -> bool {
        self.marks.is_empty()
    }
}

/// How a flood fill ended
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FloodOutcome {
    /// Every reachable object was marked
    Complete { reached: usize },
    /// Stopped at `to`, reached from `from`, which lacked the required mark
    NewMember { from: ObjectHandle, to: ObjectHandle },
}

struct Indexed {
    handle: ObjectHandle,
    envelope: AABB<[i64; 2]>,
}

impl RTreeObject for Indexed {
    type Envelope = AABB<[i64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        self.envelope
    }
}

fn to_aabb(b: &BoundingBox) -> AABB<[i64; 2]> {
    AABB::from_corners([b.x1, b.y1], [b.x2, b.y2])
}

struct Feature {
    shape: Shape,
    groups: u64,
    bbox: BoundingBox,
    node: NodeIndex,
}

/// Hole cut into a clearing polygon around one feature
struct Cutout {
    shape: Shape,
}

pub struct ConnectivityIndex {
    tree: RTree<Indexed>,
    graph: UnGraph<ObjectHandle, ()>,
    features: HashMap<ObjectHandle, Feature>,
    cutouts: HashMap<ObjectHandle, Vec<Cutout>>,
}

impl ConnectivityIndex {
    pub fn build(board: &Board) -> Self {
        let mut graph = UnGraph::new_undirected();
        let mut features = HashMap::new();
        let mut indexed = Vec::new();

        for handle in board.copper_handles() {
            let Some(copper) = board.copper(handle) else {
                continue;
            };
            let bbox = copper.bounding_box();
            let node = graph.add_node(handle);
            features.insert(
                handle,
                Feature {
                    shape: copper.shape(),
                    groups: board.group_mask(handle),
                    bbox,
                    node,
                },
            );
            indexed.push(Indexed {
                handle,
                envelope: to_aabb(&bbox),
            });
        }

        let mut index = Self {
            tree: RTree::bulk_load(indexed),
            graph,
            features,
            cutouts: HashMap::new(),
        };
        index.collect_cutouts(board);
        index.link_nominal(board);
        debug!(
            "connectivity index: {} features, {} nominal contacts, {} clearing polygons",
            index.features.len(),
            index.graph.edge_count(),
            index.cutouts.len()
        );
        index
    }

    fn collect_cutouts(&mut self, board: &Board) {
        let handles = board.copper_handles();
        let max_clearance = handles
            .iter()
            .filter_map(|&h| board.copper(h))
            .map(|c| c.clearance())
            .max()
            .unwrap_or(0);

        for &handle in &handles {
            let Some(CopperRef::Polygon(polygon)) = board.copper(handle) else {
                continue;
            };
            if !polygon.flags.clear_poly {
                continue;
            }
            let Some(feature) = self.features.get(&handle) else {
                continue;
            };
            let mut holes = Vec::new();
            for other in self.candidates(&feature.bbox.bloated(max_clearance / 2 + 1)) {
                if other == handle || !self.shares_group(handle, other) {
                    continue;
                }
                let Some(copper) = board.copper(other) else {
                    continue;
                };
                if copper.clears(polygon) {
                    holes.push(Cutout {
                        shape: copper.inflated_by(copper.clearance()),
                    });
                }
            }
            self.cutouts.insert(handle, holes);
        }
    }

    fn link_nominal(&mut self, board: &Board) {
        let mut edges = Vec::new();
        for (&handle, feature) in &self.features {
            for other in self.tree.locate_in_envelope_intersecting(&to_aabb(&feature.bbox)) {
                if other.handle > handle && self.touches(board, handle, other.handle, 0) {
                    edges.push((handle, other.handle));
                }
            }
        }
        edges.sort_unstable();
        for (a, b) in edges {
            if let (Some(fa), Some(fb)) = (self.features.get(&a), self.features.get(&b)) {
                self.graph.add_edge(fa.node, fb.node, ());
            }
        }
    }

    /// Indexed features whose boxes meet `search`, in handle order
    pub fn candidates(&self, search: &BoundingBox) -> Vec<ObjectHandle> {
        let mut out: Vec<ObjectHandle> = self
            .tree
            .locate_in_envelope_intersecting(&to_aabb(search))
            .map(|i| i.handle)
            .collect();
        out.sort_unstable();
        out
    }

    pub fn bounding_box(&self, handle: ObjectHandle) -> Option<BoundingBox> {
        self.features.get(&handle).map(|f| f.bbox)
    }

    pub fn shares_group(&self, a: ObjectHandle, b: ObjectHandle) -> bool {
        match (self.features.get(&a), self.features.get(&b)) {
            (Some(fa), Some(fb)) => fa.groups & fb.groups != 0,
            _ => false,
        }
    }

    /// Whether `a` and `b` make contact once every feature is inflated by `delta`
    pub fn touches(&self, board: &Board, a: ObjectHandle, b: ObjectHandle, delta: Coord) -> bool {
        if a == b || !self.shares_group(a, b) {
            return false;
        }
        let grow = delta as f64;
        match (a.kind() == ObjectKind::Polygon, b.kind() == ObjectKind::Polygon) {
            (false, true) => self.polygon_contact(board, a, b, grow),
            (true, false) => self.polygon_contact(board, b, a, grow),
            _ => match (self.features.get(&a), self.features.get(&b)) {
                (Some(fa), Some(fb)) => fa.shape.gap(&fb.shape) <= grow,
                _ => false,
            },
        }
    }

    /// Whether `object` overlaps the polygon outline before any clearance is cut
    pub fn overlaps_uncleared(&self, object: ObjectHandle, polygon: ObjectHandle) -> bool {
        match (self.features.get(&object), self.features.get(&polygon)) {
            (Some(fo), Some(fp)) => {
                fo.groups & fp.groups != 0 && fo.shape.gap(&fp.shape) <= 0.0
            }
            _ => false,
        }
    }

    /// Contact between a feature grown by `grow` and the copper actually poured in `polygon`
    ///
    /// A clearing feature sits in its own hole, whose rim is half its
    /// clearance away. Any other feature touches when it reaches the outline
    /// somewhere outside the holes cut by clearing features.
    pub fn polygon_contact(
        &self,
        board: &Board,
        object: ObjectHandle,
        polygon: ObjectHandle,
        grow: f64,
    ) -> bool {
        let (Some(fo), Some(fp)) = (self.features.get(&object), self.features.get(&polygon)) else {
            return false;
        };
        if fo.groups & fp.groups == 0 {
            return false;
        }
        let gap = fo.shape.gap(&fp.shape);
        if gap > grow {
            return false;
        }
        let (Some(copper), Some(CopperRef::Polygon(poly))) =
            (board.copper(object), board.copper(polygon))
        else {
            return false;
        };
        if copper.clears(poly) {
            return gap.max(copper.clearance() as f64 / 2.0) <= grow;
        }
        !self.swallowed(fo, fp, polygon, grow)
    }

    /// Every sample of the feature that reaches the outline lies inside a single hole
    fn swallowed(&self, fo: &Feature, fp: &Feature, polygon: ObjectHandle, grow: f64) -> bool {
        let Some(holes) = self.cutouts.get(&polygon).filter(|h| !h.is_empty()) else {
            return false;
        };
        let reach = (fo.shape.radius + grow).max(0.0);
        fo.shape
            .core
            .samples(fo.shape.radius)
            .into_iter()
            .filter(|&s| fp.shape.core.distance_to_point(s) <= reach)
            .all(|s| {
                holes
                    .iter()
                    .any(|h| h.shape.core.distance_to_point(s) + reach <= h.shape.radius)
            })
    }

    /// Features touching `handle` at `delta`, in handle order
    pub fn neighbors(&self, board: &Board, handle: ObjectHandle, delta: Coord) -> Vec<ObjectHandle> {
        let Some(feature) = self.features.get(&handle) else {
            return Vec::new();
        };
        let mut out: Vec<ObjectHandle> = if delta == 0 {
            self.graph.neighbors(feature.node).map(|n| self.graph[n]).collect()
        } else if delta < 0 {
            self.graph
                .neighbors(feature.node)
                .map(|n| self.graph[n])
                .filter(|&other| self.touches(board, handle, other, delta))
                .collect()
        } else {
            self.candidates(&feature.bbox.bloated(delta))
                .into_iter()
                .filter(|&other| self.touches(board, handle, other, delta))
                .collect()
        };
        out.sort_unstable();
        out.dedup();
        out
    }

    /// Breadth-first fill from `seed`, marking everything reached with `mark`
    ///
    /// Objects already carrying `mark` are not entered. With `stop_unless`,
    /// the fill stops at the first newly reached object lacking that mark
    /// and reports the pair; the stopping object is marked too.
    pub fn flood(
        &self,
        board: &Board,
        marks: &mut MarkSet,
        seed: ObjectHandle,
        mark: Mark,
        delta: Coord,
        stop_unless: Option<Mark>,
    ) -> FloodOutcome {
        let mut queue = VecDeque::from([seed]);
        marks.set(seed, mark);
        let mut reached = 1;

        while let Some(current) = queue.pop_front() {
            for next in self.neighbors(board, current, delta) {
                if marks.has(next, mark) {
                    continue;
                }
                marks.set(next, mark);
                if let Some(required) = stop_unless {
                    if !marks.has(next, required) {
                        return FloodOutcome::NewMember {
                            from: current,
                            to: next,
                        };
                    }
                }
                reached += 1;
                queue.push_back(next);
            }
        }
        FloodOutcome::Complete { reached }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::drc::fixtures::*;

    #[test]
    fn test_mark_set() {
        let h = ObjectHandle::Via { index: 0 };
        let mut marks = MarkSet::new();
        marks.set(h, Mark::SHRUNK);
        marks.set(h, Mark::FOUND);
        assert!(marks.has(h, Mark::SHRUNK));
        marks.promote(Mark::SHRUNK, Mark::PROBED);
        assert!(!marks.has(h, Mark::SHRUNK));
        assert!(marks.has(h, Mark::PROBED));
        marks.clear(Mark::FOUND);
        marks.clear(Mark::PROBED);
        assert!(marks.is_empty());
    }

    #[test]
    fn test_neighbors_by_delta() {
        let board = board_with(
            vec![copper_layer("top", 0, vec![
                line(1, 0, 0, 100, 0, 4),
                line(2, 100, 0, 200, 0, 4),
                line(3, 0, 12, 100, 12, 4),
            ], vec![])],
            vec![],
        );
        let index = ConnectivityIndex::build(&board);
        let l1 = board.find(1).unwrap();
        let l2 = board.find(2).unwrap();
        let l3 = board.find(3).unwrap();

        assert_eq!(index.neighbors(&board, l1, 0), vec![l2]);
        assert_eq!(index.neighbors(&board, l1, 8), vec![l2, l3]);
        assert_eq!(index.neighbors(&board, l1, 7), vec![l2]);
        // endpoints meet with full round caps: overlap is the line width
        assert_eq!(index.neighbors(&board, l1, -4), vec![l2]);
        assert!(index.neighbors(&board, l1, -5).is_empty());
    }

    #[test]
    fn test_layers_in_other_groups_do_not_touch() {
        let board = board_with(
            vec![
                copper_layer("top", 0, vec![line(1, 0, 0, 100, 0, 4)], vec![]),
                copper_layer("bottom", 1, vec![line(2, 0, 0, 100, 0, 4)], vec![]),
            ],
            vec![via(3, 100, 0, 20, 10)],
        );
        let index = ConnectivityIndex::build(&board);
        let l1 = board.find(1).unwrap();
        let l2 = board.find(2).unwrap();
        let v = board.find(3).unwrap();
        assert!(!index.touches(&board, l1, l2, 0));
        assert!(index.touches(&board, l1, v, 0));
        assert!(index.touches(&board, l2, v, 0));
    }

    #[test]
    fn test_flood_stops_at_unmarked() {
        let board = board_with(
            vec![copper_layer("top", 0, vec![
                line(1, 0, 0, 100, 0, 4),
                line(2, 100, 0, 200, 0, 4),
                line(3, 200, 0, 300, 0, 4),
            ], vec![])],
            vec![],
        );
        let index = ConnectivityIndex::build(&board);
        let (l1, l2, l3) = (board.find(1).unwrap(), board.find(2).unwrap(), board.find(3).unwrap());

        let mut marks = MarkSet::new();
        let outcome = index.flood(&board, &mut marks, l1, Mark::ESTABLISHED, 0, None);
        assert_eq!(outcome, FloodOutcome::Complete { reached: 3 });

        let mut marks = MarkSet::new();
        marks.set(l1, Mark::ESTABLISHED);
        marks.set(l2, Mark::ESTABLISHED);
        let outcome = index.flood(&board, &mut marks, l1, Mark::FOUND, 0, Some(Mark::ESTABLISHED));
        assert_eq!(outcome, FloodOutcome::NewMember { from: l2, to: l3 });
    }

    #[test]
    fn test_clearing_line_is_isolated_from_polygon() {
        let mut clearing = line(1, 20, 50, 80, 50, 10);
        clearing.clearance = 20;
        clearing.flags.clear_line = true;
        let mut poly = polygon(2, &[(0, 0), (100, 0), (100, 100), (0, 100)]);
        poly.flags.clear_poly = true;

        let board = board_with(vec![copper_layer("top", 0, vec![clearing], vec![poly])], vec![]);
        let index = ConnectivityIndex::build(&board);
        let (l, p) = (board.find(1).unwrap(), board.find(2).unwrap());

        assert!(index.overlaps_uncleared(l, p));
        assert!(!index.touches(&board, l, p, 0));
        assert!(!index.touches(&board, l, p, 9));
        assert!(index.touches(&board, l, p, 10));
    }

    #[test]
    fn test_feature_inside_clearance_hole_is_swallowed() {
        let mut pin_like = via(1, 50, 50, 10, 5);
        pin_like.clearance = 60;
        let mut poly = polygon(3, &[(0, 0), (100, 0), (100, 100), (0, 100)]);
        poly.flags.clear_poly = true;
        // short stub entirely inside the via's 30-unit clearance ring
        let stub = line(2, 50, 50, 60, 50, 4);
        let reaching = line(4, 50, 50, 95, 50, 4);

        let board = board_with(
            vec![copper_layer("top", 0, vec![stub, reaching], vec![poly])],
            vec![pin_like],
        );
        let index = ConnectivityIndex::build(&board);
        let p = board.find(3).unwrap();
        assert!(!index.touches(&board, board.find(2).unwrap(), p, 0));
        assert!(index.touches(&board, board.find(4).unwrap(), p, 0));
    }
}
