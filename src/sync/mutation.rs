//! The pending mutation log and its replay.

use std::collections::BTreeMap;

use super::{CollectionError, SyncEntity};

/// What a pending mutation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MutationKind {
    Insert,
    Update,
    Delete,
}

/// A mutation the Gateway rejected, kept for the view layer to report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationFailure {
    pub seq: u64,
    pub id: i32,
    pub kind: MutationKind,
    pub error: CollectionError,
}

#[derive(Debug, Clone)]
pub(crate) enum Op<E: SyncEntity> {
    Insert(E),
    Update(E::Patch),
    Delete,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Status {
    InFlight,
    /// Confirmed while `epoch` snapshots had been requested. Only snapshots
    /// requested later are guaranteed to contain the effect.
    Confirmed { epoch: u64 },
    Failed,
}

#[derive(Debug, Clone)]
pub(crate) struct Mutation<E: SyncEntity> {
    pub seq: u64,
    /// Target row. Re-keyed from the provisional id once its insert is confirmed.
    pub id: i32,
    pub op: Op<E>,
    pub status: Status,
}

impl<E: SyncEntity> Mutation<E> {
    pub fn kind(&self) -> MutationKind {
        match self.op {
            Op::Insert(_) => MutationKind::Insert,
            Op::Update(_) => MutationKind::Update,
            Op::Delete => MutationKind::Delete,
        }
    }

    pub fn is_confirmed(&self) -> bool {
        matches!(self.status, Status::Confirmed { .. })
    }

    /// Whether a snapshot requested at `epoch` retires this mutation.
    pub fn retired_by(&self, epoch: u64) -> bool {
        match self.status {
            Status::InFlight => false,
            Status::Confirmed { epoch: confirmed } => confirmed < epoch,
            Status::Failed => true,
        }
    }
}

/// Rows of a snapshot in display order: creation time, then id.
pub(crate) fn ordered<E: SyncEntity>(authoritative: &BTreeMap<i32, E>) -> Vec<E> {
    let mut rows: Vec<E> = authoritative.values().cloned().collect();
    rows.sort_by_key(|row| (row.created_at(), row.id()));
    rows
}

/// Replay `pending` over the snapshot in sequence order.
///
/// Rows inserted locally and not yet in the snapshot are appended in issue order.
pub(crate) fn replay<E: SyncEntity>(authoritative: &BTreeMap<i32, E>, pending: &[Mutation<E>]) -> Vec<E> {
    let mut rows = ordered(authoritative);

    for mutation in pending {
        match &mutation.op {
            Op::Insert(entity) => match rows.iter().position(|row| row.id() == mutation.id) {
                // the snapshot already carries the confirmed row, and is at least as fresh
                Some(_) if mutation.is_confirmed() => {}
                Some(index) => rows[index] = entity.clone(),
                None => rows.push(entity.clone()),
            },
            Op::Update(patch) => {
                if let Some(row) = rows.iter_mut().find(|row| row.id() == mutation.id) {
                    row.apply(patch);
                }
            }
            Op::Delete => rows.retain(|row| row.id() != mutation.id),
        }
    }

    rows
}
