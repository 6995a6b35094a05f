//! Optimistic client-side mirror of one entity table.
//!
//! A [`Collection`] keeps three pieces of state:
//!
//! * the **authoritative** snapshot last fetched from the Gateway,
//! * the **pending** log of local mutations not yet retired,
//! * the **view**: the snapshot with every pending mutation replayed on top.
//!
//! Mutations update the view synchronously and are dispatched to the Gateway
//! on spawned tasks. Dispatches touching the same row run strictly in issue
//! order, and inserts run in issue order among themselves, so server ids
//! follow creation order. A refresh swaps in a new snapshot and retires the
//! mutations it is guaranteed to contain. While an insert is in flight the
//! snapshot is held back until the insert settles, since it may already
//! carry the server row under an id the view does not know yet.
//!
//! The state sits behind a mutex that is never held across an await, so every
//! view recomputation is atomic with respect to the other tasks.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use log::{debug, info, warn};
use tokio::sync::{oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::gateway::{GatewayError, GatewayResult};

use super::mutation::{ordered, replay, Mutation, MutationFailure, MutationKind, Op, Status};
use super::{CollectionError, Remote, SyncEntity};

/// Dispatch ordering domain. Each lane remembers its latest mutation, and
/// the next mutation in the lane waits for it before calling the Gateway.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
enum Lane {
    Create,
    Row(i32),
}

/// What became of a fetched snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Reconciled {
    Applied,
    /// Waiting for in-flight inserts to settle.
    Held,
    /// Older than a snapshot already applied or held.
    Stale,
}

/// Gateway call prepared from a pending mutation.
enum Call<E: SyncEntity> {
    Create(E),
    Update(i32, E::Patch),
    Delete(i32),
}

struct State<E: SyncEntity> {
    authoritative: BTreeMap<i32, E>,
    pending: Vec<Mutation<E>>,
    view: Vec<E>,
    /// Provisional id -> server id, for callers still holding the old id.
    aliases: HashMap<i32, i32>,
    /// Completion signal of the latest mutation per lane. The sender is
    /// dropped when that mutation settles.
    lanes: HashMap<Lane, (u64, watch::Receiver<()>)>,
    /// Rejected mutations still shown in the view.
    failures: Vec<MutationFailure>,
    /// Snapshot waiting for in-flight inserts to settle, with its epoch.
    held: Option<(u64, Vec<E>)>,
    next_seq: u64,
    next_provisional: i32,
    /// Snapshots requested so far.
    fetch_epoch: u64,
    /// Epoch of the snapshot currently in `authoritative`.
    applied_epoch: u64,
    loaded: bool,
}

impl<E: SyncEntity> State<E> {
    fn new() -> Self {
        Self {
            authoritative: BTreeMap::new(),
            pending: Vec::new(),
            view: Vec::new(),
            aliases: HashMap::new(),
            lanes: HashMap::new(),
            failures: Vec::new(),
            held: None,
            next_seq: 1,
            next_provisional: -1,
            fetch_epoch: 0,
            applied_epoch: 0,
            loaded: false,
        }
    }

    fn resolve(&self, id: i32) -> i32 {
        self.aliases.get(&id).copied().unwrap_or(id)
    }

    fn find(&self, id: i32) -> Option<&E> {
        self.view.iter().find(|row| row.id() == id)
    }

    fn position(&self, seq: u64) -> Option<usize> {
        self.pending.iter().position(|mutation| mutation.seq == seq)
    }

    fn rebuild(&mut self) {
        self.view = replay(&self.authoritative, &self.pending);
    }

    /// Append a mutation and recompute the view.
    fn push(&mut self, id: i32, op: Op<E>) -> u64 {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.pending.push(Mutation {
            seq,
            id,
            op,
            status: Status::InFlight,
        });
        self.rebuild();
        seq
    }

    /// Make `seq` the tail of `lane`, returning the signal of the previous tail.
    fn claim_lane(&mut self, lane: Lane, seq: u64, signal: watch::Receiver<()>) -> Option<watch::Receiver<()>> {
        self.lanes.insert(lane, (seq, signal)).map(|(_, previous)| previous)
    }

    fn release_lanes(&mut self, seq: u64) {
        self.lanes.retain(|_, (tail, _)| *tail != seq);
    }

    /// Turn the pending mutation `seq` into a Gateway call, if it still needs one.
    fn prepare(&mut self, seq: u64, id: i32) -> Result<Call<E>, CollectionError> {
        let Some(index) = self.position(seq) else {
            // discarded while queued: its row is gone
            return Err(CollectionError::NotFound { kind: E::KIND, id });
        };

        let mutation = &self.pending[index];
        let target = mutation.id;
        let call = match &mutation.op {
            Op::Insert(entity) => return Ok(Call::Create(entity.clone())),
            Op::Update(patch) => Call::Update(target, patch.clone()),
            Op::Delete => Call::Delete(target),
        };

        if target < 0 {
            // the insert ahead of us settled without producing a server id
            let error = CollectionError::Unconfirmed { kind: E::KIND, id: target };
            let kind = mutation.kind();
            self.pending[index].status = Status::Failed;
            self.failures.push(MutationFailure {
                seq,
                id: target,
                kind,
                error: error.clone(),
            });
            return Err(error);
        }

        Ok(call)
    }

    /// Record the Gateway outcome of mutation `seq`.
    fn settle(&mut self, seq: u64, id: i32, kind: MutationKind, result: GatewayResult<E>) -> Result<E, CollectionError> {
        let Some(index) = self.position(seq) else {
            // retired or discarded while in flight
            return result.map_err(CollectionError::from);
        };

        let outcome = match result {
            Ok(row) => {
                self.confirm(index, row.clone());
                debug!("✅ {} {:?} of {} confirmed", E::KIND, kind, row.id());
                Ok(row)
            }
            Err(err) if err.is_not_found() && kind == MutationKind::Insert => {
                // the row it belongs to is gone, so it can never be created
                let target = self.pending[index].id;
                self.forget(target);
                warn!("⚠️  {} insert {target} rejected: {err}", E::KIND);
                Err(CollectionError::Gateway(err))
            }
            Err(err) if err.is_not_found() => {
                let target = self.pending[index].id;
                self.forget(target);
                warn!("⚠️  {} {target} vanished on the server, dropping local changes", E::KIND);
                Err(CollectionError::NotFound { kind: E::KIND, id: target })
            }
            Err(err) => {
                warn!("❌ {} {kind:?} of {id} failed: {err}", E::KIND);
                self.fail(index, err)
            }
        };

        self.rebuild();
        outcome
    }

    fn confirm(&mut self, index: usize, row: E) {
        let epoch = self.fetch_epoch;
        let provisional = self.pending[index].id;
        let server_id = row.id();

        let mutation = &mut self.pending[index];
        mutation.status = Status::Confirmed { epoch };
        let Op::Insert(entity) = &mut mutation.op else {
            return;
        };
        *entity = row;
        mutation.id = server_id;

        if provisional != server_id {
            self.aliases.insert(provisional, server_id);
            for later in self.pending.iter_mut().filter(|m| m.id == provisional) {
                later.id = server_id;
            }
            if let Some(tail) = self.lanes.remove(&Lane::Row(provisional)) {
                self.lanes.entry(Lane::Row(server_id)).or_insert(tail);
            }
        }
    }

    fn fail(&mut self, index: usize, err: GatewayError) -> Result<E, CollectionError> {
        let error = CollectionError::from(err);
        let mutation = &mut self.pending[index];
        mutation.status = Status::Failed;
        self.failures.push(MutationFailure {
            seq: mutation.seq,
            id: mutation.id,
            kind: mutation.kind(),
            error: error.clone(),
        });
        Err(error)
    }

    /// Drop a row the server no longer has, together with everything pending against it.
    fn forget(&mut self, id: i32) {
        self.pending.retain(|mutation| mutation.id != id);
        self.failures.retain(|failure| failure.id != id);
        self.authoritative.remove(&id);
    }

    fn inserts_in_flight(&self) -> bool {
        self.pending
            .iter()
            .any(|mutation| mutation.status == Status::InFlight && matches!(mutation.op, Op::Insert(_)))
    }

    /// Take in a snapshot requested at `epoch`.
    ///
    /// With inserts in flight the snapshot is held and applied by
    /// [`State::release_held`] once they settle.
    fn reconcile(&mut self, epoch: u64, rows: Vec<E>) -> Reconciled {
        let newest_held = self.held.as_ref().map_or(0, |(held, _)| *held);
        if epoch < self.applied_epoch || epoch < newest_held {
            return Reconciled::Stale;
        }
        if self.inserts_in_flight() {
            self.held = Some((epoch, rows));
            return Reconciled::Held;
        }
        self.held = None;
        self.apply(epoch, rows);
        Reconciled::Applied
    }

    /// Apply the held snapshot if no insert is in flight any more.
    fn release_held(&mut self) {
        if self.inserts_in_flight() {
            return;
        }
        if let Some((epoch, rows)) = self.held.take() {
            self.apply(epoch, rows);
        }
    }

    fn apply(&mut self, epoch: u64, rows: Vec<E>) {
        self.applied_epoch = epoch;
        self.authoritative = rows.into_iter().map(|row| (row.id(), row)).collect();
        self.pending.retain(|mutation| !mutation.retired_by(epoch));
        let pending = &self.pending;
        self.failures
            .retain(|failure| pending.iter().any(|mutation| mutation.seq == failure.seq));
        self.loaded = true;
        self.rebuild();
    }
}

struct Inner<E: SyncEntity> {
    remote: Arc<dyn Remote<E>>,
    state: Mutex<State<E>>,
    changes: watch::Sender<u64>,
}

impl<E: SyncEntity> Inner<E> {
    fn lock(&self) -> MutexGuard<'_, State<E>> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn notify(&self) {
        self.changes.send_modify(|version| *version += 1);
    }

    async fn call(&self, call: Call<E>) -> GatewayResult<E> {
        match call {
            Call::Create(entity) => self.remote.create(&entity).await,
            Call::Update(id, patch) => self.remote.update(id, &patch).await,
            Call::Delete(id) => self.remote.delete(id).await,
        }
    }
}

/// Resolves to the Gateway outcome of one mutation.
#[derive(Debug)]
pub struct MutationHandle<E> {
    id: i32,
    kind: MutationKind,
    outcome: oneshot::Receiver<Result<E, CollectionError>>,
}

impl<E> MutationHandle<E> {
    fn ready(id: i32, kind: MutationKind, result: Result<E, CollectionError>) -> Self {
        let (reply, outcome) = oneshot::channel();
        let _ = reply.send(result);
        Self { id, kind, outcome }
    }

    /// Row id in the view when the mutation was issued.
    pub fn id(&self) -> i32 {
        self.id
    }

    pub fn kind(&self) -> MutationKind {
        self.kind
    }

    /// Wait for the Gateway. Yields the row the server returned.
    pub async fn outcome(self) -> Result<E, CollectionError> {
        self.outcome.await.unwrap_or(Err(CollectionError::Dropped))
    }
}

/// Optimistic, eventually consistent mirror of one remote entity set.
///
/// Cloning yields another handle on the same state.
pub struct Collection<E: SyncEntity> {
    inner: Arc<Inner<E>>,
}

impl<E: SyncEntity> Clone for Collection<E> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<E: SyncEntity> Collection<E> {
    pub fn new(remote: Arc<dyn Remote<E>>) -> Self {
        let (changes, _) = watch::channel(0);
        Self {
            inner: Arc::new(Inner {
                remote,
                state: Mutex::new(State::new()),
                changes,
            }),
        }
    }

    /// Allocate a provisional id for a row about to be inserted.
    ///
    /// Provisional ids are negative so they never collide with server ids.
    pub fn provisional_id(&self) -> i32 {
        let mut state = self.inner.lock();
        let id = state.next_provisional;
        state.next_provisional -= 1;
        id
    }

    /// Insert a row carrying a provisional id.
    ///
    /// The row shows up in the view immediately; the handle resolves to the
    /// server row once the create call returns.
    pub fn insert(&self, entity: E) -> Result<MutationHandle<E>, CollectionError> {
        let id = entity.id();
        if id >= 0 {
            return Err(CollectionError::NotProvisional { kind: E::KIND, id });
        }

        let (seq, waits, done) = {
            let mut state = self.inner.lock();
            if state.find(id).is_some() || state.aliases.contains_key(&id) {
                return Err(CollectionError::DuplicateKey { kind: E::KIND, id });
            }
            if id <= state.next_provisional {
                state.next_provisional = id - 1;
            }

            let seq = state.push(id, Op::Insert(entity));
            let (done, signal) = watch::channel(());
            let waits = [Lane::Create, Lane::Row(id)]
                .into_iter()
                .filter_map(|lane| state.claim_lane(lane, seq, signal.clone()))
                .collect();
            (seq, waits, done)
        };

        self.inner.notify();
        debug!("➕ Optimistic {} insert {id}", E::KIND);
        Ok(self.dispatch(seq, id, MutationKind::Insert, waits, done))
    }

    /// Apply `mutator` to the row `id` and send the changed fields to the Gateway.
    ///
    /// Fails with [`CollectionError::NotFound`] when `id` is not in the view.
    /// A mutator that changes nothing issues no call.
    pub fn update<F>(&self, id: i32, mutator: F) -> Result<MutationHandle<E>, CollectionError>
    where
        F: FnOnce(&mut E),
    {
        let (id, before) = {
            let state = self.inner.lock();
            let id = state.resolve(id);
            let before = state.find(id).cloned().ok_or(CollectionError::NotFound { kind: E::KIND, id })?;
            (id, before)
        };

        let mut after = before.clone();
        mutator(&mut after);
        after.set_id(id);

        let Some(patch) = E::diff(&before, &after) else {
            return Ok(MutationHandle::ready(id, MutationKind::Update, Ok(before)));
        };

        let (seq, waits, done) = {
            let mut state = self.inner.lock();
            if state.find(id).is_none() {
                return Err(CollectionError::NotFound { kind: E::KIND, id });
            }

            let seq = state.push(id, Op::Update(patch));
            let (done, signal) = watch::channel(());
            let waits: Vec<_> = state.claim_lane(Lane::Row(id), seq, signal).into_iter().collect();
            (seq, waits, done)
        };

        self.inner.notify();
        debug!("✏️  Optimistic {} update {id}", E::KIND);
        Ok(self.dispatch(seq, id, MutationKind::Update, waits, done))
    }

    /// Remove the row `id` from the view and delete it on the server.
    pub fn delete(&self, id: i32) -> Result<MutationHandle<E>, CollectionError> {
        let (id, seq, waits, done) = {
            let mut state = self.inner.lock();
            let id = state.resolve(id);
            if state.find(id).is_none() {
                return Err(CollectionError::NotFound { kind: E::KIND, id });
            }

            let seq = state.push(id, Op::Delete);
            let (done, signal) = watch::channel(());
            let waits: Vec<_> = state.claim_lane(Lane::Row(id), seq, signal).into_iter().collect();
            (id, seq, waits, done)
        };

        self.inner.notify();
        debug!("🗑️  Optimistic {} delete {id}", E::KIND);
        Ok(self.dispatch(seq, id, MutationKind::Delete, waits, done))
    }

    fn dispatch(
        &self,
        seq: u64,
        id: i32,
        kind: MutationKind,
        waits: Vec<watch::Receiver<()>>,
        done: watch::Sender<()>,
    ) -> MutationHandle<E> {
        let (reply, outcome) = oneshot::channel();
        let inner = Arc::clone(&self.inner);

        tokio::spawn(async move {
            for mut wait in waits {
                // errors once the predecessor's sender is dropped, which is the signal
                let _ = wait.changed().await;
            }

            let prepared = inner.lock().prepare(seq, id);
            let result = match prepared {
                Ok(call) => {
                    let response = inner.call(call).await;
                    inner.lock().settle(seq, id, kind, response)
                }
                Err(err) => Err(err),
            };

            {
                let mut state = inner.lock();
                state.release_lanes(seq);
                state.release_held();
            }
            inner.notify();
            drop(done);
            let _ = reply.send(result);
        });

        MutationHandle { id, kind, outcome }
    }

    /// Fetch a full snapshot and reconcile the pending log against it.
    ///
    /// Returns `Ok(false)` when a newer snapshot was applied while this one
    /// was in flight. A snapshot arriving while inserts are in flight is held
    /// and applied as soon as the last of them settles.
    pub async fn refresh(&self) -> Result<bool, CollectionError> {
        let epoch = {
            let mut state = self.inner.lock();
            state.fetch_epoch += 1;
            state.fetch_epoch
        };

        let rows = self.inner.remote.fetch_all().await.map_err(|err| {
            warn!("❌ Failed to fetch {}s: {err}", E::KIND);
            CollectionError::from(err)
        })?;

        let count = rows.len();
        let (outcome, pending) = {
            let mut state = self.inner.lock();
            (state.reconcile(epoch, rows), state.pending.len())
        };

        match outcome {
            Reconciled::Applied => {
                debug!("🔄 Reconciled {count} {}s, {pending} pending", E::KIND);
                self.inner.notify();
                Ok(true)
            }
            Reconciled::Held => {
                debug!("⏸️  Holding {} snapshot {epoch} until inserts settle", E::KIND);
                Ok(true)
            }
            Reconciled::Stale => {
                debug!("⏭️  Discarded stale {} snapshot {epoch}", E::KIND);
                Ok(false)
            }
        }
    }

    /// Refresh every `interval` on a background task until the handle is aborted.
    pub fn start_polling(&self, interval: Duration) -> JoinHandle<()> {
        let collection = self.clone();
        info!("⏱️  Polling {}s every {}ms", E::KIND, interval.as_millis());

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticker.tick().await;
                // failures are already logged; the next tick retries
                let _ = collection.refresh().await;
            }
        })
    }

    /// Current view, in display order.
    pub fn list(&self) -> Vec<E> {
        self.inner.lock().view.clone()
    }

    /// Rows of the view matching `predicate`, in display order.
    pub fn filter<P>(&self, predicate: P) -> Vec<E>
    where
        P: Fn(&E) -> bool,
    {
        self.inner.lock().view.iter().filter(|row| predicate(row)).cloned().collect()
    }

    /// Row `id` as currently seen, following provisional-id aliases.
    pub fn get(&self, id: i32) -> Option<E> {
        let state = self.inner.lock();
        state.find(state.resolve(id)).cloned()
    }

    /// Server id for a provisional id that has been confirmed, else `id` itself.
    pub fn resolve(&self, id: i32) -> i32 {
        self.inner.lock().resolve(id)
    }

    pub fn len(&self) -> usize {
        self.inner.lock().view.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.lock().view.is_empty()
    }

    /// The last authoritative snapshot, in display order.
    pub fn snapshot(&self) -> Vec<E> {
        ordered(&self.inner.lock().authoritative)
    }

    pub fn pending_count(&self) -> usize {
        self.inner.lock().pending.len()
    }

    /// Whether at least one snapshot has been applied.
    pub fn is_loaded(&self) -> bool {
        self.inner.lock().loaded
    }

    /// Rejected mutations still shown in the view. The next applied
    /// snapshot reverts them and clears the list.
    pub fn failures(&self) -> Vec<MutationFailure> {
        self.inner.lock().failures.clone()
    }

    /// Change notifications: the value is bumped on every view change.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.inner.changes.subscribe()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};

    use async_trait::async_trait;
    use chrono::{DateTime, TimeZone, Utc};
    use tokio::sync::Semaphore;

    use super::*;

    #[derive(Clone, Debug, PartialEq)]
    struct Note {
        id: i32,
        body: String,
        created_at: DateTime<Utc>,
    }

    impl SyncEntity for Note {
        type Patch = String;
        const KIND: &'static str = "note";

        fn id(&self) -> i32 {
            self.id
        }

        fn set_id(&mut self, id: i32) {
            self.id = id;
        }

        fn created_at(&self) -> DateTime<Utc> {
            self.created_at
        }

        fn diff(before: &Self, after: &Self) -> Option<String> {
            (before.body != after.body).then(|| after.body.clone())
        }

        fn apply(&mut self, patch: &String) {
            self.body = patch.clone();
        }
    }

    /// In-memory server whose mutating calls wait for a permit.
    struct GatedRemote {
        rows: Mutex<BTreeMap<i32, Note>>,
        next_id: AtomicI32,
        gate: Semaphore,
        calls: Mutex<Vec<String>>,
        fail_next: Mutex<Option<GatewayError>>,
        /// Store created rows before waiting, so snapshots see them ahead of the response.
        commit_early: AtomicBool,
    }

    impl GatedRemote {
        fn new() -> Arc<Self> {
            Arc::new(Self {
                rows: Mutex::new(BTreeMap::new()),
                next_id: AtomicI32::new(1),
                gate: Semaphore::new(0),
                calls: Mutex::new(Vec::new()),
                fail_next: Mutex::new(None),
                commit_early: AtomicBool::new(false),
            })
        }

        fn open(&self, permits: usize) {
            self.gate.add_permits(permits);
        }

        fn seed(&self, body: &str) -> i32 {
            self.store(body).id
        }

        fn store(&self, body: &str) -> Note {
            let id = self.next_id.fetch_add(1, Ordering::SeqCst);
            let note = Note {
                id,
                body: body.to_string(),
                created_at: Utc.timestamp_opt(1_700_000_000 + i64::from(id), 0).unwrap(),
            };
            self.rows.lock().unwrap().insert(id, note.clone());
            note
        }

        fn row_count(&self) -> usize {
            self.rows.lock().unwrap().len()
        }

        fn remove(&self, id: i32) {
            self.rows.lock().unwrap().remove(&id);
        }

        fn calls(&self) -> Vec<String> {
            self.calls.lock().unwrap().clone()
        }

        async fn pass(&self, call: String) -> GatewayResult<()> {
            self.gate.acquire().await.unwrap().forget();
            self.calls.lock().unwrap().push(call);
            match self.fail_next.lock().unwrap().take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl Remote<Note> for GatedRemote {
        async fn fetch_all(&self) -> GatewayResult<Vec<Note>> {
            Ok(self.rows.lock().unwrap().values().cloned().collect())
        }

        async fn create(&self, entity: &Note) -> GatewayResult<Note> {
            if self.commit_early.load(Ordering::SeqCst) {
                let note = self.store(&entity.body);
                self.pass(format!("create {}", entity.body)).await?;
                return Ok(note);
            }
            self.pass(format!("create {}", entity.body)).await?;
            Ok(self.store(&entity.body))
        }

        async fn update(&self, id: i32, patch: &String) -> GatewayResult<Note> {
            self.pass(format!("update {id} {patch}")).await?;
            let mut rows = self.rows.lock().unwrap();
            let row = rows
                .get_mut(&id)
                .ok_or_else(|| GatewayError::not_found(format!("note {id}")))?;
            row.body = patch.clone();
            Ok(row.clone())
        }

        async fn delete(&self, id: i32) -> GatewayResult<Note> {
            self.pass(format!("delete {id}")).await?;
            self.rows
                .lock()
                .unwrap()
                .remove(&id)
                .ok_or_else(|| GatewayError::not_found(format!("note {id}")))
        }
    }

    fn draft(collection: &Collection<Note>, body: &str) -> Note {
        Note {
            id: collection.provisional_id(),
            body: body.to_string(),
            created_at: Utc::now(),
        }
    }

    fn bodies(collection: &Collection<Note>) -> Vec<String> {
        collection.list().into_iter().map(|note| note.body).collect()
    }

    #[tokio::test]
    async fn mutations_show_in_issue_order_before_any_response() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        let first = draft(&notes, "first");
        let first_id = first.id;
        notes.insert(first).unwrap();
        notes.insert(draft(&notes, "second")).unwrap();
        notes.update(first_id, |n| n.body = "first, edited".to_string()).unwrap();
        notes.insert(draft(&notes, "third")).unwrap();
        notes.delete(first_id).unwrap();

        assert_eq!(bodies(&notes), vec!["second", "third"]);
        assert_eq!(notes.pending_count(), 5);
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn confirmed_insert_takes_the_server_id_without_duplicates() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        let note = draft(&notes, "Home");
        let provisional = note.id;
        assert!(provisional < 0);
        let handle = notes.insert(note).unwrap();
        assert_eq!(notes.list()[0].id, provisional);

        remote.open(1);
        let server = handle.outcome().await.unwrap();
        assert!(server.id > 0);

        let view = notes.list();
        assert_eq!(view.len(), 1);
        assert_eq!(view[0].id, server.id);
        assert_eq!(notes.resolve(provisional), server.id);
        assert_eq!(notes.get(provisional).unwrap().id, server.id);

        notes.refresh().await.unwrap();
        assert_eq!(notes.pending_count(), 0);
        assert_eq!(notes.list(), notes.snapshot());
    }

    #[tokio::test]
    async fn update_waits_for_insert_and_targets_the_server_id() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        let note = draft(&notes, "draft");
        let provisional = note.id;
        let created = notes.insert(note).unwrap();
        let updated = notes.update(provisional, |n| n.body = "final".to_string()).unwrap();

        remote.open(2);
        let server = created.outcome().await.unwrap();
        updated.outcome().await.unwrap();

        assert_eq!(
            remote.calls(),
            vec!["create draft".to_string(), format!("update {} final", server.id)]
        );
        assert_eq!(bodies(&notes), vec!["final"]);
    }

    #[tokio::test]
    async fn update_of_unknown_id_fails_and_leaves_view_alone() {
        let remote = GatedRemote::new();
        remote.seed("kept");
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        notes.refresh().await.unwrap();
        let before = notes.list();

        let err = notes.update(999, |n| n.body = "nope".to_string()).unwrap_err();
        assert_eq!(err, CollectionError::NotFound { kind: "note", id: 999 });
        assert!(notes.delete(999).unwrap_err().is_not_found());
        assert_eq!(notes.list(), before);
        assert_eq!(notes.pending_count(), 0);
    }

    #[tokio::test]
    async fn noop_update_issues_no_call() {
        let remote = GatedRemote::new();
        let id = remote.seed("same");
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        notes.refresh().await.unwrap();

        let handle = notes.update(id, |n| n.body = "same".to_string()).unwrap();
        assert_eq!(handle.outcome().await.unwrap().body, "same");
        assert_eq!(notes.pending_count(), 0);
        assert!(remote.calls().is_empty());
    }

    #[tokio::test]
    async fn not_found_drops_the_row_and_everything_queued_behind_it() {
        let remote = GatedRemote::new();
        let id = remote.seed("doomed");
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        notes.refresh().await.unwrap();

        // another client deletes it
        remote.remove(id);

        let first = notes.update(id, |n| n.body = "one".to_string()).unwrap();
        let second = notes.update(id, |n| n.body = "two".to_string()).unwrap();
        assert_eq!(bodies(&notes), vec!["two"]);

        remote.open(2);
        assert!(first.outcome().await.unwrap_err().is_not_found());
        assert!(second.outcome().await.unwrap_err().is_not_found());

        assert!(notes.is_empty());
        assert_eq!(notes.pending_count(), 0);
        assert_eq!(remote.calls(), vec![format!("update {id} one")]);
    }

    #[tokio::test]
    async fn failed_mutation_stays_visible_until_next_refresh() {
        let remote = GatedRemote::new();
        let id = remote.seed("original");
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        notes.refresh().await.unwrap();

        *remote.fail_next.lock().unwrap() = Some(GatewayError::store("disk full"));
        let handle = notes.update(id, |n| n.body = "edited".to_string()).unwrap();
        remote.open(1);

        let err = handle.outcome().await.unwrap_err();
        assert_eq!(err, CollectionError::Gateway(GatewayError::store("disk full")));
        assert_eq!(bodies(&notes), vec!["edited"]);

        let failures = notes.failures();
        assert_eq!(failures.len(), 1);
        assert_eq!(failures[0].kind, MutationKind::Update);
        assert_eq!(failures[0].id, id);

        notes.refresh().await.unwrap();
        assert_eq!(bodies(&notes), vec!["original"]);
        assert_eq!(notes.pending_count(), 0);
        assert!(notes.failures().is_empty());
    }

    #[tokio::test]
    async fn mutations_behind_a_failed_insert_are_not_sent() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        *remote.fail_next.lock().unwrap() = Some(GatewayError::validation("body must not be blank"));
        let note = draft(&notes, "bad");
        let provisional = note.id;
        let created = notes.insert(note).unwrap();
        let updated = notes.update(provisional, |n| n.body = "still bad".to_string()).unwrap();

        remote.open(1);
        assert!(matches!(
            created.outcome().await,
            Err(CollectionError::Gateway(GatewayError::Validation(_)))
        ));
        assert_eq!(
            updated.outcome().await.unwrap_err(),
            CollectionError::Unconfirmed { kind: "note", id: provisional }
        );
        assert_eq!(remote.calls(), vec!["create bad".to_string()]);

        notes.refresh().await.unwrap();
        assert!(notes.is_empty());
    }

    #[tokio::test]
    async fn snapshot_taken_before_confirmation_does_not_retire_it() {
        let remote = GatedRemote::new();
        let id = remote.seed("v1");
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        notes.refresh().await.unwrap();

        let handle = notes.update(id, |n| n.body = "v2".to_string()).unwrap();
        remote.open(1);
        handle.outcome().await.unwrap();

        // a snapshot requested before the confirmation carries the old value
        let stale = notes.inner.lock().fetch_epoch;
        let outcome = notes.inner.lock().reconcile(
            stale,
            vec![Note {
                id,
                body: "v1".to_string(),
                created_at: Utc.timestamp_opt(1_700_000_001, 0).unwrap(),
            }],
        );
        assert_eq!(outcome, Reconciled::Applied);
        assert_eq!(bodies(&notes), vec!["v2"]);
        assert_eq!(notes.pending_count(), 1);

        notes.refresh().await.unwrap();
        assert_eq!(notes.pending_count(), 0);
        assert_eq!(bodies(&notes), vec!["v2"]);
    }

    #[tokio::test]
    async fn older_snapshot_is_discarded() {
        let remote = GatedRemote::new();
        remote.seed("a");
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        notes.refresh().await.unwrap();
        notes.refresh().await.unwrap();

        let outcome = notes.inner.lock().reconcile(1, Vec::new());
        assert_eq!(outcome, Reconciled::Stale);
        assert_eq!(bodies(&notes), vec!["a"]);
    }

    #[tokio::test]
    async fn inserts_reach_the_server_in_issue_order() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        let handles: Vec<_> = ["one", "two", "three"]
            .into_iter()
            .map(|body| notes.insert(draft(&notes, body)).unwrap())
            .collect();
        remote.open(3);
        for handle in handles {
            handle.outcome().await.unwrap();
        }

        assert_eq!(remote.calls(), vec!["create one", "create two", "create three"]);
        notes.refresh().await.unwrap();
        assert_eq!(bodies(&notes), vec!["one", "two", "three"]);
    }

    #[tokio::test]
    async fn insert_rejects_server_ids_and_duplicates() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote as Arc<dyn Remote<Note>>);

        let mut positive = draft(&notes, "x");
        positive.id = 7;
        assert!(matches!(notes.insert(positive), Err(CollectionError::NotProvisional { .. })));

        let note = draft(&notes, "y");
        notes.insert(note.clone()).unwrap();
        assert!(matches!(notes.insert(note), Err(CollectionError::DuplicateKey { .. })));
    }

    #[tokio::test]
    async fn subscribers_see_every_view_change() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);
        let mut changes = notes.subscribe();

        let handle = notes.insert(draft(&notes, "ping")).unwrap();
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();

        remote.open(1);
        handle.outcome().await.unwrap();
        assert!(changes.has_changed().unwrap());
        changes.borrow_and_update();

        notes.refresh().await.unwrap();
        assert!(changes.has_changed().unwrap());
    }

    #[tokio::test]
    async fn snapshot_racing_an_insert_response_shows_the_row_once() {
        let remote = GatedRemote::new();
        remote.commit_early.store(true, Ordering::SeqCst);
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        let note = draft(&notes, "Home");
        let provisional = note.id;
        let handle = notes.insert(note).unwrap();

        // the server has the row, the response has not arrived
        while remote.row_count() == 0 {
            tokio::task::yield_now().await;
        }
        notes.refresh().await.unwrap();

        let during: Vec<_> = notes.list().into_iter().map(|n| (n.id, n.body)).collect();
        assert_eq!(during, vec![(provisional, "Home".to_string())]);

        remote.open(1);
        let server = handle.outcome().await.unwrap();
        let after: Vec<_> = notes.list().into_iter().map(|n| (n.id, n.body)).collect();
        assert_eq!(after, vec![(server.id, "Home".to_string())]);
        assert_eq!(notes.snapshot().len(), 1);

        notes.refresh().await.unwrap();
        assert_eq!(notes.pending_count(), 0);
        assert_eq!(notes.list(), notes.snapshot());
    }

    #[tokio::test]
    async fn insert_rejected_as_not_found_is_dropped_at_once() {
        let remote = GatedRemote::new();
        let notes = Collection::new(remote.clone() as Arc<dyn Remote<Note>>);

        *remote.fail_next.lock().unwrap() = Some(GatewayError::not_found("Folder 4 not found"));
        let note = draft(&notes, "orphan");
        let provisional = note.id;
        let created = notes.insert(note).unwrap();
        let edited = notes.update(provisional, |n| n.body = "still orphan".to_string()).unwrap();
        assert_eq!(bodies(&notes), vec!["still orphan"]);

        remote.open(1);
        assert_eq!(
            created.outcome().await.unwrap_err(),
            CollectionError::Gateway(GatewayError::not_found("Folder 4 not found"))
        );
        assert!(edited.outcome().await.unwrap_err().is_not_found());

        assert!(notes.is_empty());
        assert_eq!(notes.pending_count(), 0);
        assert!(notes.failures().is_empty());
        assert_eq!(remote.calls(), vec!["create orphan".to_string()]);
    }
}
