//! Board data model
//!
//! A board is a stack of copper and silk layers, a set of elements
//! (footprints carrying pins, pads and silk lines) and board-level vias.
//! Copper layers sharing a `group` number are electrically the same copper.
//! Boards are stored as JSON; every field except the object geometry has a
//! default so hand-written fixtures stay short.

pub mod copper;
pub mod geometry;

use serde::{Deserialize, Serialize};

pub use copper::CopperRef;

/// Board coordinate in nanometres
pub type Coord = i64;

/// Unique, board-wide object identifier
pub type ObjectId = u64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: Coord,
    pub y: Coord,
}

impl Point {
    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }

    pub fn midpoint(a: Point, b: Point) -> Point {
        Point::new((a.x + b.x) / 2, (a.y + b.y) / 2)
    }

    pub(crate) fn to_vec2(self) -> geometry::Vec2 {
        [self.x as f64, self.y as f64]
    }
}

impl std::fmt::Display for Point {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({}, {})", self.x, self.y)
    }
}

/// Axis-aligned box, inclusive on all sides
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BoundingBox {
    pub x1: Coord,
    pub y1: Coord,
    pub x2: Coord,
    pub y2: Coord,
}

impl BoundingBox {
    pub fn new(x1: Coord, y1: Coord, x2: Coord, y2: Coord) -> Self {
        Self {
            x1: x1.min(x2),
            y1: y1.min(y2),
            x2: x1.max(x2),
            y2: y1.max(y2),
        }
    }

    /// Box grown by `d` on every side (shrunk when negative)
    pub fn bloated(&self, d: Coord) -> Self {
        Self {
            x1: self.x1 - d,
            y1: self.y1 - d,
            x2: self.x2 + d,
            y2: self.y2 + d,
        }
    }

    pub fn center(&self) -> Point {
        Point::new((self.x1 + self.x2) / 2, (self.y1 + self.y2) / 2)
    }
}

/// Board-scoped manufacturing rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DesignRules {
    /// Minimum copper-to-copper clearance
    pub bloat: Coord,
    /// Minimum overlap between connected copper
    pub shrink: Coord,
    pub min_width: Coord,
    pub min_silk: Coord,
    pub min_drill: Coord,
    pub min_ring: Coord,
}

impl Default for DesignRules {
    fn default() -> Self {
        // 10 mil space/overlap/width, 7 mil silk, 15 mil drill, 10 mil ring
        Self {
            bloat: 254_000,
            shrink: 254_000,
            min_width: 254_000,
            min_silk: 177_800,
            min_drill: 381_000,
            min_ring: 254_000,
        }
    }
}

/// Per-object flag bits
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObjectFlags {
    pub found: bool,
    pub selected: bool,
    pub drc: bool,
    pub clear_line: bool,
    pub clear_poly: bool,
    pub hole: bool,
    pub locked: bool,
    pub square: bool,
    pub on_solder: bool,
    pub no_paste: bool,
}

/// A single flag, used when flags are set by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ObjectFlag {
    Found,
    Selected,
    Drc,
    ClearLine,
    ClearPoly,
    Hole,
    Locked,
    Square,
    OnSolder,
    NoPaste,
}

impl ObjectFlags {
    pub fn get(&self, flag: ObjectFlag) -> bool {
        *self.slot(flag)
    }

    pub fn set(&mut self, flag: ObjectFlag, value: bool) {
        *self.slot_mut(flag) = value;
    }

    fn slot(&self, flag: ObjectFlag) -> &bool {
        match flag {
            ObjectFlag::Found => &self.found,
            ObjectFlag::Selected => &self.selected,
            ObjectFlag::Drc => &self.drc,
            ObjectFlag::ClearLine => &self.clear_line,
            ObjectFlag::ClearPoly => &self.clear_poly,
            ObjectFlag::Hole => &self.hole,
            ObjectFlag::Locked => &self.locked,
            ObjectFlag::Square => &self.square,
            ObjectFlag::OnSolder => &self.on_solder,
            ObjectFlag::NoPaste => &self.no_paste,
        }
    }

    fn slot_mut(&mut self, flag: ObjectFlag) -> &mut bool {
        match flag {
            ObjectFlag::Found => &mut self.found,
            ObjectFlag::Selected => &mut self.selected,
            ObjectFlag::Drc => &mut self.drc,
            ObjectFlag::ClearLine => &mut self.clear_line,
            ObjectFlag::ClearPoly => &mut self.clear_poly,
            ObjectFlag::Hole => &mut self.hole,
            ObjectFlag::Locked => &mut self.locked,
            ObjectFlag::Square => &mut self.square,
            ObjectFlag::OnSolder => &mut self.on_solder,
            ObjectFlag::NoPaste => &mut self.no_paste,
        }
    }
}

/// Object kind, with the numeric type codes used in reports
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ObjectKind {
    Via,
    Element,
    Line,
    Polygon,
    Pin,
    Pad,
    Arc,
}

impl ObjectKind {
    pub fn code(self) -> u32 {
        match self {
            ObjectKind::Via => 0x0001,
            ObjectKind::Element => 0x0002,
            ObjectKind::Line => 0x0004,
            ObjectKind::Polygon => 0x0008,
            ObjectKind::Pin => 0x0100,
            ObjectKind::Pad => 0x0200,
            ObjectKind::Arc => 0x8000,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ObjectKind::Via => "Via",
            ObjectKind::Element => "Element",
            ObjectKind::Line => "Line",
            ObjectKind::Polygon => "Polygon",
            ObjectKind::Pin => "Pin",
            ObjectKind::Pad => "Pad",
            ObjectKind::Arc => "Arc",
        }
    }
}

impl std::fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Identity of an object as recorded in a violation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ObjectRef {
    pub id: ObjectId,
    pub kind: ObjectKind,
}

impl ObjectRef {
    pub fn new(id: ObjectId, kind: ObjectKind) -> Self {
        Self { id, kind }
    }
}

/// Position of a live object inside a board
///
/// Handles are only valid for the board they were taken from and only until
/// that board is edited; violations store [`ObjectRef`]s instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectHandle {
    Line { layer: usize, index: usize },
    Arc { layer: usize, index: usize },
    Polygon { layer: usize, index: usize },
    Pin { element: usize, index: usize },
    Pad { element: usize, index: usize },
    Via { index: usize },
    Element { index: usize },
}

impl ObjectHandle {
    pub fn kind(self) -> ObjectKind {
        match self {
            ObjectHandle::Line { .. } => ObjectKind::Line,
            ObjectHandle::Arc { .. } => ObjectKind::Arc,
            ObjectHandle::Polygon { .. } => ObjectKind::Polygon,
            ObjectHandle::Pin { .. } => ObjectKind::Pin,
            ObjectHandle::Pad { .. } => ObjectKind::Pad,
            ObjectHandle::Via { .. } => ObjectKind::Via,
            ObjectHandle::Element { .. } => ObjectKind::Element,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Line {
    pub id: ObjectId,
    pub point1: Point,
    pub point2: Point,
    pub thickness: Coord,
    #[serde(default)]
    pub clearance: Coord,
    #[serde(default)]
    pub flags: ObjectFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Arc {
    pub id: ObjectId,
    pub center: Point,
    pub radius: Coord,
    /// Degrees, counter-clockwise from +x
    pub start_angle: f64,
    pub delta_angle: f64,
    pub thickness: Coord,
    #[serde(default)]
    pub clearance: Coord,
    #[serde(default)]
    pub flags: ObjectFlags,
}

impl Arc {
    /// Centre line of the arc, with the sweep normalised
    pub fn core(&self) -> geometry::ArcCore {
        geometry::ArcCore::from_degrees(
            self.center.to_vec2(),
            self.radius as f64,
            self.start_angle,
            self.delta_angle,
        )
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polygon {
    pub id: ObjectId,
    pub points: Vec<Point>,
    #[serde(default)]
    pub flags: ObjectFlags,
}

/// Plated through-hole; board-level vias use the same shape
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pin {
    pub id: ObjectId,
    #[serde(default)]
    pub number: String,
    pub position: Point,
    pub thickness: Coord,
    pub drill: Coord,
    #[serde(default)]
    pub clearance: Coord,
    #[serde(default)]
    pub flags: ObjectFlags,
}

/// Surface-mount pad, on the component side unless `on_solder` is set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pad {
    pub id: ObjectId,
    #[serde(default)]
    pub number: String,
    pub point1: Point,
    pub point2: Point,
    pub thickness: Coord,
    #[serde(default)]
    pub clearance: Coord,
    #[serde(default)]
    pub flags: ObjectFlags,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Element {
    pub id: ObjectId,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub mark: Point,
    #[serde(default)]
    pub pins: Vec<Pin>,
    #[serde(default)]
    pub pads: Vec<Pad>,
    #[serde(default)]
    pub silk_lines: Vec<Line>,
    #[serde(default)]
    pub flags: ObjectFlags,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    #[default]
    Copper,
    Silk,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    pub name: String,
    #[serde(default)]
    pub kind: LayerKind,
    #[serde(default)]
    pub group: u32,
    #[serde(default = "default_visible")]
    pub visible: bool,
    #[serde(default)]
    pub lines: Vec<Line>,
    #[serde(default)]
    pub arcs: Vec<Arc>,
    #[serde(default)]
    pub polygons: Vec<Polygon>,
}

fn default_visible() -> bool {
    true
}

fn default_bottom_group() -> u32 {
    1
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Board {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub rules: DesignRules,
    #[serde(default)]
    pub layers: Vec<Layer>,
    #[serde(default)]
    pub elements: Vec<Element>,
    #[serde(default)]
    pub vias: Vec<Pin>,
    /// Copper group of the component side, where unflipped pads live
    #[serde(default)]
    pub top_group: u32,
    #[serde(default = "default_bottom_group")]
    pub bottom_group: u32,
}

impl Default for Board {
    fn default() -> Self {
        Self {
            name: String::new(),
            rules: DesignRules::default(),
            layers: Vec::new(),
            elements: Vec::new(),
            vias: Vec::new(),
            top_group: 0,
            bottom_group: default_bottom_group(),
        }
    }
}

impl Board {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Copper feature behind a handle; `None` for elements, silk and stale handles
    pub fn copper(&self, handle: ObjectHandle) -> Option<CopperRef<'_>> {
        match handle {
            ObjectHandle::Line { layer, index } => {
                let l = self.layers.get(layer)?;
                (l.kind == LayerKind::Copper)
                    .then(|| l.lines.get(index).map(CopperRef::Line))
                    .flatten()
            }
            ObjectHandle::Arc { layer, index } => {
                let l = self.layers.get(layer)?;
                (l.kind == LayerKind::Copper)
                    .then(|| l.arcs.get(index).map(CopperRef::Arc))
                    .flatten()
            }
            ObjectHandle::Polygon { layer, index } => {
                let l = self.layers.get(layer)?;
                (l.kind == LayerKind::Copper)
                    .then(|| l.polygons.get(index).map(CopperRef::Polygon))
                    .flatten()
            }
            ObjectHandle::Pin { element, index } => self
                .elements
                .get(element)?
                .pins
                .get(index)
                .map(CopperRef::Pin),
            ObjectHandle::Pad { element, index } => self
                .elements
                .get(element)?
                .pads
                .get(index)
                .map(CopperRef::Pad),
            ObjectHandle::Via { index } => self.vias.get(index).map(CopperRef::Via),
            ObjectHandle::Element { .. } => None,
        }
    }

    /// Identity of the object behind a handle
    pub fn object_ref(&self, handle: ObjectHandle) -> Option<ObjectRef> {
        let id = match handle {
            ObjectHandle::Line { layer, index } => self.layers.get(layer)?.lines.get(index)?.id,
            ObjectHandle::Arc { layer, index } => self.layers.get(layer)?.arcs.get(index)?.id,
            ObjectHandle::Polygon { layer, index } => {
                self.layers.get(layer)?.polygons.get(index)?.id
            }
            ObjectHandle::Pin { element, index } => {
                self.elements.get(element)?.pins.get(index)?.id
            }
            ObjectHandle::Pad { element, index } => {
                self.elements.get(element)?.pads.get(index)?.id
            }
            ObjectHandle::Via { index } => self.vias.get(index)?.id,
            ObjectHandle::Element { index } => self.elements.get(index)?.id,
        };
        Some(ObjectRef::new(id, handle.kind()))
    }

    /// Look an object up by id
    pub fn find(&self, id: ObjectId) -> Option<ObjectHandle> {
        for (li, layer) in self.layers.iter().enumerate() {
            if let Some(index) = layer.lines.iter().position(|o| o.id == id) {
                return Some(ObjectHandle::Line { layer: li, index });
            }
            if let Some(index) = layer.arcs.iter().position(|o| o.id == id) {
                return Some(ObjectHandle::Arc { layer: li, index });
            }
            if let Some(index) = layer.polygons.iter().position(|o| o.id == id) {
                return Some(ObjectHandle::Polygon { layer: li, index });
            }
        }
        for (ei, element) in self.elements.iter().enumerate() {
            if element.id == id {
                return Some(ObjectHandle::Element { index: ei });
            }
            if let Some(index) = element.pins.iter().position(|o| o.id == id) {
                return Some(ObjectHandle::Pin { element: ei, index });
            }
            if let Some(index) = element.pads.iter().position(|o| o.id == id) {
                return Some(ObjectHandle::Pad { element: ei, index });
            }
        }
        self.vias
            .iter()
            .position(|v| v.id == id)
            .map(|index| ObjectHandle::Via { index })
    }

    pub fn flags(&self, handle: ObjectHandle) -> Option<&ObjectFlags> {
        Some(match handle {
            ObjectHandle::Line { layer, index } => &self.layers.get(layer)?.lines.get(index)?.flags,
            ObjectHandle::Arc { layer, index } => &self.layers.get(layer)?.arcs.get(index)?.flags,
            ObjectHandle::Polygon { layer, index } => {
                &self.layers.get(layer)?.polygons.get(index)?.flags
            }
            ObjectHandle::Pin { element, index } => {
                &self.elements.get(element)?.pins.get(index)?.flags
            }
            ObjectHandle::Pad { element, index } => {
                &self.elements.get(element)?.pads.get(index)?.flags
            }
            ObjectHandle::Via { index } => &self.vias.get(index)?.flags,
            ObjectHandle::Element { index } => &self.elements.get(index)?.flags,
        })
    }

    pub fn flags_mut(&mut self, handle: ObjectHandle) -> Option<&mut ObjectFlags> {
        Some(match handle {
            ObjectHandle::Line { layer, index } => {
                &mut self.layers.get_mut(layer)?.lines.get_mut(index)?.flags
            }
            ObjectHandle::Arc { layer, index } => {
                &mut self.layers.get_mut(layer)?.arcs.get_mut(index)?.flags
            }
            ObjectHandle::Polygon { layer, index } => {
                &mut self.layers.get_mut(layer)?.polygons.get_mut(index)?.flags
            }
            ObjectHandle::Pin { element, index } => {
                &mut self.elements.get_mut(element)?.pins.get_mut(index)?.flags
            }
            ObjectHandle::Pad { element, index } => {
                &mut self.elements.get_mut(element)?.pads.get_mut(index)?.flags
            }
            ObjectHandle::Via { index } => &mut self.vias.get_mut(index)?.flags,
            ObjectHandle::Element { index } => &mut self.elements.get_mut(index)?.flags,
        })
    }

    /// Representative point used when reporting a violation on this object
    pub fn locate(&self, handle: ObjectHandle) -> Option<Point> {
        if let ObjectHandle::Element { index } = handle {
            return self.elements.get(index).map(|e| e.mark);
        }
        self.copper(handle).map(|c| c.location()).or_else(|| {
            // silk-layer lines are not copper but still have a midpoint
            match handle {
                ObjectHandle::Line { layer, index } => {
                    let line = self.layers.get(layer)?.lines.get(index)?;
                    Some(Point::midpoint(line.point1, line.point2))
                }
                _ => None,
            }
        })
    }

    /// Copper groups an object conducts on, as a bit mask
    pub(crate) fn group_mask(&self, handle: ObjectHandle) -> u64 {
        let bit = |g: u32| 1u64 << (g % 64);
        match handle {
            ObjectHandle::Line { layer, .. }
            | ObjectHandle::Arc { layer, .. }
            | ObjectHandle::Polygon { layer, .. } => {
                self.layers.get(layer).map(|l| bit(l.group)).unwrap_or(0)
            }
            ObjectHandle::Pad { .. } => match self.flags(handle) {
                Some(f) if f.on_solder => bit(self.bottom_group),
                Some(_) => bit(self.top_group),
                None => 0,
            },
            ObjectHandle::Pin { .. } | ObjectHandle::Via { .. } => u64::MAX,
            ObjectHandle::Element { .. } => 0,
        }
    }

    /// Every copper feature, in scan order: layer objects, then pins, pads and vias
    pub fn copper_handles(&self) -> Vec<ObjectHandle> {
        let mut out = Vec::new();
        for (li, layer) in self.copper_layers() {
            out.extend((0..layer.lines.len()).map(|index| ObjectHandle::Line { layer: li, index }));
            out.extend((0..layer.arcs.len()).map(|index| ObjectHandle::Arc { layer: li, index }));
            out.extend(
                (0..layer.polygons.len()).map(|index| ObjectHandle::Polygon { layer: li, index }),
            );
        }
        for (ei, element) in self.elements.iter().enumerate() {
            out.extend((0..element.pins.len()).map(|index| ObjectHandle::Pin { element: ei, index }));
            out.extend((0..element.pads.len()).map(|index| ObjectHandle::Pad { element: ei, index }));
        }
        out.extend((0..self.vias.len()).map(|index| ObjectHandle::Via { index }));
        out
    }

    pub fn copper_layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind == LayerKind::Copper)
    }

    pub fn silk_layers(&self) -> impl Iterator<Item = (usize, &Layer)> {
        self.layers
            .iter()
            .enumerate()
            .filter(|(_, l)| l.kind == LayerKind::Silk)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_board() -> Board {
        Board {
            name: "sample".to_string(),
            layers: vec![
                Layer {
                    name: "top".to_string(),
                    kind: LayerKind::Copper,
                    group: 0,
                    visible: true,
                    lines: vec![Line {
                        id: 1,
                        point1: Point::new(0, 0),
                        point2: Point::new(100, 0),
                        thickness: 10,
                        clearance: 0,
                        flags: ObjectFlags::default(),
                    }],
                    arcs: vec![],
                    polygons: vec![],
                },
                Layer {
                    name: "silk".to_string(),
                    kind: LayerKind::Silk,
                    group: 0,
                    visible: false,
                    lines: vec![Line {
                        id: 2,
                        point1: Point::new(0, 50),
                        point2: Point::new(20, 50),
                        thickness: 3,
                        clearance: 0,
                        flags: ObjectFlags::default(),
                    }],
                    arcs: vec![],
                    polygons: vec![],
                },
            ],
            elements: vec![Element {
                id: 10,
                name: "U1".to_string(),
                mark: Point::new(500, 500),
                pins: vec![],
                pads: vec![Pad {
                    id: 11,
                    number: "1".to_string(),
                    point1: Point::new(490, 500),
                    point2: Point::new(510, 500),
                    thickness: 8,
                    clearance: 0,
                    flags: ObjectFlags {
                        on_solder: true,
                        ..Default::default()
                    },
                }],
                silk_lines: vec![],
                flags: ObjectFlags::default(),
            }],
            vias: vec![Pin {
                id: 20,
                number: String::new(),
                position: Point::new(100, 0),
                thickness: 20,
                drill: 10,
                clearance: 0,
                flags: ObjectFlags::default(),
            }],
            ..Default::default()
        }
    }

    #[test]
    fn test_find_and_object_ref() {
        let board = sample_board();
        let h = board.find(11).unwrap();
        assert_eq!(h, ObjectHandle::Pad { element: 0, index: 0 });
        assert_eq!(board.object_ref(h), Some(ObjectRef::new(11, ObjectKind::Pad)));
        assert_eq!(board.find(10), Some(ObjectHandle::Element { index: 0 }));
        assert_eq!(board.find(999), None);
    }

    #[test]
    fn test_locate() {
        let board = sample_board();
        assert_eq!(board.locate(board.find(1).unwrap()), Some(Point::new(50, 0)));
        assert_eq!(board.locate(board.find(10).unwrap()), Some(Point::new(500, 500)));
        assert_eq!(board.locate(board.find(20).unwrap()), Some(Point::new(100, 0)));
        assert_eq!(board.locate(board.find(2).unwrap()), Some(Point::new(10, 50)));
    }

    #[test]
    fn test_silk_is_not_copper() {
        let board = sample_board();
        let silk = board.find(2).unwrap();
        assert!(board.copper(silk).is_none());
        assert!(!board.copper_handles().contains(&silk));
        assert_eq!(board.copper_handles().len(), 3);
    }

    #[test]
    fn test_pad_group_follows_side() {
        let board = sample_board();
        let pad = board.find(11).unwrap();
        assert_eq!(board.group_mask(pad), 1 << 1);
        let line = board.find(1).unwrap();
        assert_eq!(board.group_mask(line), 1);
        assert_eq!(board.group_mask(board.find(20).unwrap()), u64::MAX);
    }

    #[test]
    fn test_flags_by_name() {
        let mut flags = ObjectFlags::default();
        flags.set(ObjectFlag::Selected, true);
        assert!(flags.selected);
        assert!(flags.get(ObjectFlag::Selected));
        assert!(!flags.get(ObjectFlag::Drc));
    }

    #[test]
    fn test_json_defaults() {
        let board = Board::from_json(r#"{"layers":[{"name":"top"}]}"#).unwrap();
        assert_eq!(board.rules, DesignRules::default());
        assert_eq!(board.bottom_group, 1);
        assert!(board.layers[0].visible);
        assert_eq!(board.layers[0].kind, LayerKind::Copper);
    }

    #[test]
    fn test_json_round_trip_keeps_flags() {
        let board = sample_board();
        let json = board.to_json().unwrap();
        let back = Board::from_json(&json).unwrap();
        assert_eq!(board, back);
    }

    #[test]
    fn test_kind_codes() {
        assert_eq!(ObjectKind::Via.code(), 1);
        assert_eq!(ObjectKind::Line.code(), 4);
        assert_eq!(ObjectKind::Pin.code(), 256);
        assert_eq!(ObjectKind::Arc.code(), 32768);
    }

    #[test]
    fn test_bounding_box_ops() {
        let b = BoundingBox::new(11, 5, -1, -1);
        assert_eq!(b, BoundingBox::new(-1, -1, 11, 5));
        assert_eq!(b.bloated(2).x1, -3);
        assert_eq!(b.bloated(-1), BoundingBox::new(0, 0, 10, 4));
        assert_eq!(b.center(), Point::new(5, 2));
    }
}
