// src/db/session.rs
//
// Storage session: one pooled connection plus a change tracker.
//
// RULES:
// - Writes are staged, never executed directly
// - save_changes applies every staged write in one SQLite transaction
// - A failed save rolls back and keeps the staged writes
// - A single staged write can be withdrawn by its WriteId
// - Reads consult the identity map before storage
// - An entity is tracked at most once per key; detach before re-attaching
//   a different copy

use std::any::{Any, TypeId};
use std::collections::HashMap;
use std::fmt;

use log::{debug, warn};
use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};
use tokio::sync::oneshot;

use super::connection::PooledConn;
use super::sql;
use crate::error::{AppError, AppResult};
use crate::repositories::{Entity, PrimaryKey};

// ============================================================================
// IDENTITY MAP
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    /// Matches storage as last read or saved
    Unchanged,
    /// Insert staged, not saved yet
    Added,
    /// Update staged, not saved yet
    Modified,
    /// Delete staged, not saved yet
    Deleted,
}

impl fmt::Display for EntryState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EntryState::Unchanged => write!(f, "unchanged"),
            EntryState::Added => write!(f, "added"),
            EntryState::Modified => write!(f, "modified"),
            EntryState::Deleted => write!(f, "deleted"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct TrackedEntry<E> {
    pub entity: E,
    pub state: EntryState,
}

type EntrySet<E> = HashMap<<E as Entity>::Key, TrackedEntry<E>>;

/// Type-erased per-entity set
trait TrackedSet: Send {
    fn as_any(&self) -> &dyn Any;
    fn as_any_mut(&mut self) -> &mut dyn Any;
    fn discard_pending(&mut self);
    fn len(&self) -> usize;
}

impl<E: Entity> TrackedSet for EntrySet<E> {
    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }

    fn discard_pending(&mut self) {
        self.retain(|_, entry| entry.state == EntryState::Unchanged);
    }

    fn len(&self) -> usize {
        HashMap::len(self)
    }
}

/// Every tracked entity of a session, keyed by type then primary key
#[derive(Default)]
pub struct IdentityMap {
    sets: HashMap<TypeId, Box<dyn TrackedSet>>,
}

impl IdentityMap {
    fn set<E: Entity>(&self) -> Option<&EntrySet<E>> {
        self.sets
            .get(&TypeId::of::<E>())
            .and_then(|set| set.as_any().downcast_ref::<EntrySet<E>>())
    }

    fn set_mut<E: Entity>(&mut self) -> &mut EntrySet<E> {
        self.sets
            .entry(TypeId::of::<E>())
            .or_insert_with(|| Box::new(EntrySet::<E>::new()))
            .as_any_mut()
            .downcast_mut::<EntrySet<E>>()
            .expect("identity map set is keyed by its own TypeId")
    }

    pub fn get<E: Entity>(&self, key: &E::Key) -> Option<&TrackedEntry<E>> {
        self.set::<E>().and_then(|set| set.get(key))
    }

    pub fn insert<E: Entity>(&mut self, entity: E, state: EntryState) {
        self.set_mut::<E>()
            .insert(entity.key(), TrackedEntry { entity, state });
    }

    pub fn remove<E: Entity>(&mut self, key: &E::Key) -> Option<TrackedEntry<E>> {
        self.set_mut::<E>().remove(key)
    }

    /// Total tracked entities across all types
    pub fn len(&self) -> usize {
        self.sets.values().map(|set| set.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn discard_pending(&mut self) {
        for set in self.sets.values_mut() {
            set.discard_pending();
        }
    }
}

// ============================================================================
// STAGED WRITES
// ============================================================================

trait PendingWrite: Send {
    /// Execute against the open transaction; may run again after a rollback
    fn apply(&mut self, conn: &Connection) -> AppResult<usize>;

    /// Reflect the committed write in the identity map
    fn complete(self: Box<Self>, identity: &mut IdentityMap);

    /// Undo what staging did to the identity map; the write will never apply
    fn withdraw(self: Box<Self>, identity: &mut IdentityMap);

    fn describe(&self) -> String;
}

struct InsertWrite<E: Entity> {
    entity: E,
    generated: Option<i64>,
    notify: Option<oneshot::Sender<E>>,
}

impl<E: Entity> PendingWrite for InsertWrite<E> {
    fn apply(&mut self, conn: &Connection) -> AppResult<usize> {
        let key = self.entity.key();
        if E::GENERATED_KEY && key.is_unset() {
            conn.execute(&sql::insert::<E>(false), params_from_iter(self.entity.values()))?;
            self.generated = Some(conn.last_insert_rowid());
        } else {
            let params = key.values().into_iter().chain(self.entity.values());
            conn.execute(&sql::insert::<E>(true), params_from_iter(params))?;
        }
        Ok(1)
    }

    fn complete(self: Box<Self>, identity: &mut IdentityMap) {
        let InsertWrite {
            entity,
            generated,
            notify,
        } = *self;
        let entity = match generated {
            Some(id) => entity.with_generated_key(id),
            None => entity,
        };
        identity.insert(entity.clone(), EntryState::Unchanged);
        if let Some(sender) = notify {
            // receiver may be gone; the row is saved either way
            let _ = sender.send(entity);
        }
    }

    fn withdraw(self: Box<Self>, identity: &mut IdentityMap) {
        let key = self.entity.key();
        if matches!(identity.get::<E>(&key), Some(entry) if entry.state == EntryState::Added) {
            identity.remove::<E>(&key);
        }
    }

    fn describe(&self) -> String {
        format!("insert {} {}", E::KIND, self.entity.key())
    }
}

struct UpdateWrite<E: Entity> {
    entity: E,
}

impl<E: Entity> PendingWrite for UpdateWrite<E> {
    fn apply(&mut self, conn: &Connection) -> AppResult<usize> {
        let key = self.entity.key();
        let params = self.entity.values().into_iter().chain(key.values());
        let affected = conn.execute(&sql::update::<E>(), params_from_iter(params))?;
        if affected == 0 {
            return Err(AppError::Conflict(format!(
                "{} {} matched no row when saving; it may have been deleted",
                E::KIND,
                key
            )));
        }
        Ok(affected)
    }

    fn complete(self: Box<Self>, identity: &mut IdentityMap) {
        identity.insert(self.entity, EntryState::Unchanged);
    }

    // the stored row is unknown here; the next read tracks it afresh
    fn withdraw(self: Box<Self>, identity: &mut IdentityMap) {
        identity.remove::<E>(&self.entity.key());
    }

    fn describe(&self) -> String {
        format!("update {} {}", E::KIND, self.entity.key())
    }
}

struct DeleteWrite<E: Entity> {
    key: E::Key,
}

impl<E: Entity> PendingWrite for DeleteWrite<E> {
    fn apply(&mut self, conn: &Connection) -> AppResult<usize> {
        let affected = conn.execute(&sql::delete::<E>(), params_from_iter(self.key.values()))?;
        if affected == 0 {
            return Err(AppError::Conflict(format!(
                "{} {} matched no row when deleting",
                E::KIND,
                self.key
            )));
        }
        Ok(affected)
    }

    fn complete(self: Box<Self>, identity: &mut IdentityMap) {
        identity.remove::<E>(&self.key);
    }

    fn withdraw(self: Box<Self>, identity: &mut IdentityMap) {
        identity.remove::<E>(&self.key);
    }

    fn describe(&self) -> String {
        format!("delete {} {}", E::KIND, self.key)
    }
}

/// Handle to a staged insert; yields the saved entity once a save commits it
#[derive(Debug)]
pub struct PendingInsert<E>(oneshot::Receiver<E>);

impl<E> PendingInsert<E> {
    /// The entity as saved (generated key filled in), or `None` before commit
    pub fn saved(mut self) -> Option<E> {
        self.0.try_recv().ok()
    }
}

/// Names one staged write, in staging order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WriteId(u64);

struct StagedWrite {
    id: WriteId,
    write: Box<dyn PendingWrite>,
}

// ============================================================================
// SESSION
// ============================================================================

pub struct Session {
    conn: PooledConn,
    identity: IdentityMap,
    pending: Vec<StagedWrite>,
    next_write: u64,
}

impl Session {
    pub fn new(conn: PooledConn) -> Self {
        Self {
            conn,
            identity: IdentityMap::default(),
            pending: Vec::new(),
            next_write: 0,
        }
    }

    /// Raw connection, for reads outside the tracked entity model
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn identity_map(&self) -> &IdentityMap {
        &self.identity
    }

    pub fn has_pending_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Tracking state of `key`, if tracked
    pub fn entry_state<E: Entity>(&self, key: &E::Key) -> Option<EntryState> {
        self.identity.get::<E>(key).map(|entry| entry.state)
    }

    // ===== STAGING =====

    /// Stage an insert. Keys assigned by storage are known only after saving.
    pub fn add<E: Entity>(&mut self, entity: E) -> AppResult<PendingInsert<E>> {
        let key = entity.key();
        if !key.is_unset() {
            if let Some(entry) = self.identity.get::<E>(&key) {
                return Err(AppError::TrackingConflict(format!(
                    "{} {} is already tracked ({})",
                    E::KIND,
                    key,
                    entry.state
                )));
            }
            self.identity.insert(entity.clone(), EntryState::Added);
        }

        let (sender, receiver) = oneshot::channel();
        self.stage(InsertWrite {
            entity,
            generated: None,
            notify: Some(sender),
        });
        Ok(PendingInsert(receiver))
    }

    /// Stage an update of every column.
    ///
    /// Fails when the key is tracked with different values; the tracked
    /// copy must be detached first.
    pub fn update<E: Entity>(&mut self, entity: E) -> AppResult<()> {
        let key = entity.key();
        if let Some(entry) = self.identity.get::<E>(&key) {
            let conflict = match entry.state {
                EntryState::Unchanged => entry.entity.values() != entity.values(),
                EntryState::Modified => false,
                EntryState::Added | EntryState::Deleted => true,
            };
            if conflict {
                return Err(AppError::TrackingConflict(format!(
                    "{} {} is already tracked ({}) with other values; detach it before updating",
                    E::KIND,
                    key,
                    entry.state
                )));
            }
        }

        self.identity.insert(entity.clone(), EntryState::Modified);
        self.stage(UpdateWrite { entity });
        Ok(())
    }

    /// Stage a delete
    pub fn remove<E: Entity>(&mut self, entity: E) -> AppResult<()> {
        let key = entity.key();
        match self.entry_state::<E>(&key) {
            Some(EntryState::Deleted) => return Ok(()),
            Some(EntryState::Added) => {
                return Err(AppError::TrackingConflict(format!(
                    "{} {} has an unsaved insert",
                    E::KIND,
                    key
                )))
            }
            _ => {}
        }

        self.identity.insert(entity, EntryState::Deleted);
        self.stage(DeleteWrite::<E> { key });
        Ok(())
    }

    /// Stop tracking `key`. Staged writes for it still apply.
    pub fn detach<E: Entity>(&mut self, key: &E::Key) -> bool {
        self.identity.remove::<E>(key).is_some()
    }

    /// Drop every staged write and every entity they touched
    pub fn discard_changes(&mut self) {
        if !self.pending.is_empty() {
            debug!("event=session_discard pending={}", self.pending.len());
        }
        self.pending.clear();
        self.identity.discard_pending();
    }

    /// Id the next staged write will get
    pub fn next_write_id(&self) -> WriteId {
        WriteId(self.next_write)
    }

    /// Withdraw one staged write and stop tracking the entity it touched.
    /// Returns false when `id` is no longer pending.
    pub fn discard_write(&mut self, id: WriteId) -> bool {
        let Some(position) = self.pending.iter().position(|staged| staged.id == id) else {
            return false;
        };
        let staged = self.pending.remove(position);
        debug!("event=session_withdraw write=\"{}\"", staged.write.describe());
        staged.write.withdraw(&mut self.identity);
        true
    }

    fn stage<W: PendingWrite + 'static>(&mut self, write: W) {
        debug!("event=session_stage write=\"{}\"", write.describe());
        let id = WriteId(self.next_write);
        self.next_write += 1;
        self.pending.push(StagedWrite {
            id,
            write: Box::new(write),
        });
    }

    // ===== READS =====

    /// Look up by key: tracked entities first, then storage.
    /// A staged delete reads as absent.
    pub fn find<E: Entity>(&mut self, key: &E::Key) -> AppResult<Option<E>> {
        if let Some(entry) = self.identity.get::<E>(key) {
            return Ok(match entry.state {
                EntryState::Deleted => None,
                _ => Some(entry.entity.clone()),
            });
        }

        let rows = self.load::<E>(&sql::select_by_key::<E>(), &key.values())?;
        Ok(rows.into_iter().next().and_then(|row| self.resolve(row)))
    }

    pub fn all<E: Entity>(&mut self) -> AppResult<Vec<E>> {
        self.query(&sql::select_all::<E>(), &[])
    }

    /// Run a SELECT returning every column of `E`.
    ///
    /// Rows already tracked come back as the tracked copy; rows with a
    /// staged delete are skipped; the rest start being tracked.
    pub fn query<E: Entity>(&mut self, sql: &str, params: &[Value]) -> AppResult<Vec<E>> {
        let rows = self.load::<E>(sql, params)?;
        Ok(rows.into_iter().filter_map(|row| self.resolve(row)).collect())
    }

    fn load<E: Entity>(&self, sql: &str, params: &[Value]) -> AppResult<Vec<E>> {
        let mut stmt = self.conn.prepare(sql)?;
        let rows = stmt
            .query_map(params_from_iter(params.iter()), |row| E::from_row(row))?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    fn resolve<E: Entity>(&mut self, loaded: E) -> Option<E> {
        match self.identity.get::<E>(&loaded.key()) {
            Some(entry) if entry.state == EntryState::Deleted => None,
            Some(entry) => Some(entry.entity.clone()),
            None => {
                self.identity.insert(loaded.clone(), EntryState::Unchanged);
                Some(loaded)
            }
        }
    }

    // ===== FLUSH =====

    /// Apply every staged write atomically; returns the affected row count.
    pub fn save_changes(&mut self) -> AppResult<usize> {
        if self.pending.is_empty() {
            return Ok(0);
        }

        let tx = self.conn.transaction()?;
        let mut affected = 0;
        for staged in self.pending.iter_mut() {
            affected += staged.write.apply(&tx)?;
        }
        tx.commit()?;

        for staged in self.pending.drain(..) {
            staged.write.complete(&mut self.identity);
        }

        debug!("event=session_saved rows={}", affected);
        Ok(affected)
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        if !self.pending.is_empty() {
            warn!(
                "event=session_dropped unsaved={} writes=[{}]",
                self.pending.len(),
                self.pending
                    .iter()
                    .map(|staged| staged.write.describe())
                    .collect::<Vec<_>>()
                    .join(", ")
            );
        }
    }
}
