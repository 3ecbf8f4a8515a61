//! Carries locations from an old version of a file into a new one.
//!
//! The diff is scanned in order with a cursor. Equal chunks move the cursor and
//! close every item that ends before it: nothing changed inside those. Inserted
//! or deleted text that overlaps a pending item invalidates it, including text
//! inserted exactly at its start; otherwise the item is shifted by the edit. Items still pending when the diff runs out saw
//! no further edits and are kept.

use crate::mutants::{Location, Mutant, Position};
use crate::position_diff::{DiffChunk, DiffOp, Offset};

/// Anything that carries a location in a file.
pub trait Located {
    fn location(&self) -> &Location;
    fn location_mut(&mut self) -> &mut Location;
}

impl Located for Mutant {
    fn location(&self) -> &Location {
        &self.location
    }

    fn location_mut(&mut self) -> &mut Location {
        &mut self.location
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Remapped<T> {
    /// Items untouched by any edit, with locations in new-text coordinates, in input order.
    pub retained: Vec<T>,
    /// Number of items an edit overlapped.
    pub removed: usize,
}

pub fn remap_locations<T: Located>(chunks: &[DiffChunk], items: Vec<T>) -> Remapped<T> {
    let mut pending: Vec<(usize, T)> = items.into_iter().enumerate().collect();
    let mut closed: Vec<(usize, T)> = Vec::with_capacity(pending.len());
    let mut removed = 0;
    let mut cursor = Position::ORIGIN;

    for chunk in chunks {
        if pending.is_empty() {
            break;
        }
        let offset = Offset::of(&chunk.text);

        match chunk.op {
            DiffOp::Equal => {
                cursor = offset.advance(cursor);
                let (done, open): (Vec<_>, Vec<_>) = pending
                    .into_iter()
                    .partition(|(_, item)| item.location().end <= cursor);
                closed.extend(done);
                pending = open;
            }
            DiffOp::Insert => {
                let before = pending.len();
                pending.retain_mut(|(_, item)| {
                    let location = item.location_mut();
                    if location.start <= cursor && cursor <= location.end {
                        return false;
                    }
                    location.start = shift_inserted(location.start, cursor, offset);
                    location.end = shift_inserted(location.end, cursor, offset);
                    true
                });
                removed += before - pending.len();
                cursor = offset.advance(cursor);
            }
            DiffOp::Delete => {
                // Deleted text is gone from the new document: the cursor stays put.
                let deleted_until = offset.advance(cursor);
                let before = pending.len();
                pending.retain_mut(|(_, item)| {
                    let location = item.location_mut();
                    if deleted_until >= location.start {
                        return false;
                    }
                    location.start = shift_deleted(location.start, cursor, deleted_until);
                    location.end = shift_deleted(location.end, cursor, deleted_until);
                    true
                });
                removed += before - pending.len();
            }
        }
    }

    closed.extend(pending);
    closed.sort_by_key(|(idx, _)| *idx);
    Remapped {
        retained: closed.into_iter().map(|(_, item)| item).collect(),
        removed,
    }
}

/// Move `pos` (at or after `at`) past text of extent `offset` inserted at `at`.
fn shift_inserted(pos: Position, at: Position, offset: Offset) -> Position {
    if pos.is_end_of_file() {
        return pos;
    }
    if pos.line == at.line {
        let landed = offset.advance(at);
        Position::new(landed.line, landed.column + pos.column.saturating_sub(at.column))
    } else {
        Position::new(pos.line + offset.lines, pos.column)
    }
}

/// Move `pos` (after `until`) back over the text between `from` and `until`.
fn shift_deleted(pos: Position, from: Position, until: Position) -> Position {
    if pos.is_end_of_file() {
        return pos;
    }
    if pos.line == until.line {
        Position::new(from.line, from.column + pos.column.saturating_sub(until.column))
    } else {
        Position::new(pos.line - (until.line - from.line), pos.column)
    }
}
