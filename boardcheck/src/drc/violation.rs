//! Violation records and flag re-application

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::board::{Board, Coord, ObjectFlag, ObjectRef, Point};

/// One design rule violation
///
/// Violations own copies of everything they describe, so they stay valid
/// after the board is edited. Implicated objects are resolved against the
/// live board only when a flag is applied.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Violation {
    title: String,
    explanation: String,
    location: Option<Point>,
    measured: Option<Coord>,
    required: Coord,
    objects: Vec<ObjectRef>,
}

impl Violation {
    pub fn new(
        title: &str,
        explanation: &str,
        location: Option<Point>,
        measured: Option<Coord>,
        required: Coord,
        objects: Option<&[ObjectRef]>,
    ) -> Self {
        debug_assert!(!title.is_empty(), "violation title must not be empty");
        debug_assert!(!explanation.is_empty(), "violation explanation must not be empty");
        Self {
            title: title.to_string(),
            explanation: explanation.to_string(),
            location,
            measured,
            required,
            objects: objects.map(<[ObjectRef]>::to_vec).unwrap_or_default(),
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn explanation(&self) -> &str {
        &self.explanation
    }

    pub fn location(&self) -> Option<Point> {
        self.location
    }

    pub fn measured(&self) -> Option<Coord> {
        self.measured
    }

    pub fn have_measured(&self) -> bool {
        self.measured.is_some()
    }

    pub fn required(&self) -> Coord {
        self.required
    }

    pub fn objects(&self) -> &[ObjectRef] {
        &self.objects
    }

    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    fn sorted_ids(&self) -> Vec<u64> {
        let mut ids: Vec<u64> = self.objects.iter().map(|o| o.id).collect();
        ids.sort_unstable();
        ids
    }

    /// Set `flag` on every implicated object that still exists
    ///
    /// Each change is recorded in `journal`, and the batch is committed at
    /// the end so it can be undone as one step. References whose id is gone
    /// or now names a different kind of object are skipped and returned as
    /// stale.
    pub fn apply_flag(
        &self,
        board: &mut Board,
        flag: ObjectFlag,
        journal: &mut dyn FlagJournal,
    ) -> FlagApplication {
        let mut outcome = FlagApplication::default();
        for object in &self.objects {
            let handle = match board.find(object.id) {
                Some(h) if h.kind() == object.kind => h,
                Some(h) => {
                    debug!(
                        "object {} is now a {}, expected {}; skipping",
                        object.id,
                        h.kind(),
                        object.kind
                    );
                    outcome.stale.push(*object);
                    continue;
                }
                None => {
                    debug!("object {} ({}) no longer exists; skipping", object.id, object.kind);
                    outcome.stale.push(*object);
                    continue;
                }
            };
            if let Some(flags) = board.flags_mut(handle) {
                journal.record(*object, flag, flags.get(flag));
                flags.set(flag, true);
                outcome.applied += 1;
            }
        }
        journal.commit();
        outcome
    }
}

/// Titles match exactly and the implicated ids form the same multiset
impl PartialEq for Violation {
    fn eq(&self, other: &Self) -> bool {
        self.title == other.title
            && self.objects.len() == other.objects.len()
            && self.sorted_ids() == other.sorted_ids()
    }
}

/// Result of [`Violation::apply_flag`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagApplication {
    pub applied: usize,
    pub stale: Vec<ObjectRef>,
}

/// Receives every flag change so it can be reverted later
pub trait FlagJournal {
    fn record(&mut self, object: ObjectRef, flag: ObjectFlag, previous: bool);

    /// Close the current batch of changes
    fn commit(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct JournalEntry {
    serial: u32,
    object: ObjectRef,
    flag: ObjectFlag,
    previous: bool,
}

/// In-memory journal grouping changes into serial-numbered batches
#[derive(Debug, Default)]
pub struct UndoJournal {
    entries: Vec<JournalEntry>,
    serial: u32,
}

impl UndoJournal {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Revert the most recent committed batch; returns how many flags were restored
    pub fn undo(&mut self, board: &mut Board) -> usize {
        let Some(last) = self.entries.last().map(|e| e.serial) else {
            return 0;
        };
        let mut restored = 0;
        while self.entries.last().is_some_and(|e| e.serial == last) {
            let Some(entry) = self.entries.pop() else { break };
            if let Some(flags) = board
                .find(entry.object.id)
                .and_then(|h| board.flags_mut(h))
            {
                flags.set(entry.flag, entry.previous);
                restored += 1;
            }
        }
        restored
    }
}

impl FlagJournal for UndoJournal {
    fn record(&mut self, object: ObjectRef, flag: ObjectFlag, previous: bool) {
        self.entries.push(JournalEntry {
            serial: self.serial,
            object,
            flag,
            previous,
        });
    }

    fn commit(&mut self) {
        self.serial = self.serial.wrapping_add(1);
    }
}
