//! [`SqliteStore`], the SQLite implementation of [`PlannerStore`].

use std::{path::Path, time::Duration};

use chrono::{DateTime, Utc};
use rusqlite::{Connection, Transaction, TransactionBehavior};
use uuid::Uuid;
use voyage_core::{
  import::{ImportOutcome, ReplanOutcome, Snapshot},
  itinerary::{Itinerary, NewItinerary},
  owner::Owner,
  place::{LinkedPlace, NewPlace},
  plan::Plan,
  recommend::GenerationOutcome,
  schedule::ScheduleDraft,
  store::PlannerStore,
};

use crate::{Error, Result, curation, itineraries, linkage, plans, resolver, schema::SCHEMA};

// ─── Store ───────────────────────────────────────────────────────────────────

/// How long a writer waits for another connection's write lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// A Voyage planner store backed by a single SQLite file.
///
/// Cloning is cheap; the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store, for tests.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.busy_timeout(BUSY_TIMEOUT)?;
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Run `f` inside a `BEGIN IMMEDIATE` transaction.
  ///
  /// The write lock is taken before `f` reads anything, so decisions made on
  /// what `f` reads can't be invalidated by another writer before commit. Any
  /// error rolls the whole transaction back.
  async fn write<R, F>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&Transaction<'_>, DateTime<Utc>) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    let now = Utc::now();
    self
      .conn
      .call(move |conn| Ok(in_transaction(conn, TransactionBehavior::Immediate, |tx| f(tx, now))))
      .await?
  }

  /// Run `f` inside a read transaction, so multi-statement reads see one
  /// snapshot.
  async fn read<R, F>(&self, f: F) -> Result<R>
  where
    F: FnOnce(&Transaction<'_>) -> Result<R> + Send + 'static,
    R: Send + 'static,
  {
    self
      .conn
      .call(move |conn| Ok(in_transaction(conn, TransactionBehavior::Deferred, f)))
      .await?
  }
}

fn in_transaction<R>(
  conn: &mut Connection,
  behavior: TransactionBehavior,
  f: impl FnOnce(&Transaction<'_>) -> Result<R>,
) -> Result<R> {
  let tx = conn.transaction_with_behavior(behavior)?;
  let out = f(&tx)?;
  tx.commit()?;
  Ok(out)
}

// ─── PlannerStore impl ───────────────────────────────────────────────────────

impl PlannerStore for SqliteStore {
  type Error = Error;

  // ── Owners ────────────────────────────────────────────────────────────────

  async fn add_owner(&self, email: String) -> Result<Owner> {
    self.write(move |tx, now| itineraries::insert_owner(tx, &email, now)).await
  }

  async fn get_owner(&self, owner_id: Uuid) -> Result<Option<Owner>> {
    self.read(move |tx| itineraries::owner(tx, owner_id)).await
  }

  // ── Import ────────────────────────────────────────────────────────────────

  async fn import_snapshot(&self, owner_id: Uuid, snapshot: Snapshot) -> Result<ImportOutcome> {
    self.write(move |tx, now| resolver::import(tx, owner_id, snapshot, now)).await
  }

  // ── Itineraries ───────────────────────────────────────────────────────────

  async fn create_itinerary(&self, owner_id: Uuid, input: NewItinerary) -> Result<Itinerary> {
    self
      .write(move |tx, now| {
        itineraries::require_owner(tx, owner_id)?;
        let metadata = itineraries::creation_metadata(&input);
        itineraries::insert(tx, owner_id, &input, None, metadata, now)
      })
      .await
  }

  async fn get_itinerary(&self, owner_id: Uuid, itinerary_id: Uuid) -> Result<Itinerary> {
    self.read(move |tx| itineraries::owned(tx, owner_id, itinerary_id)).await
  }

  async fn list_itineraries(&self, owner_id: Uuid) -> Result<Vec<Itinerary>> {
    self
      .read(move |tx| {
        itineraries::require_owner(tx, owner_id)?;
        itineraries::list(tx, owner_id)
      })
      .await
  }

  async fn itinerary_for_session<'a>(
    &'a self,
    owner_id: Uuid,
    session_key: &'a str,
  ) -> Result<Option<Itinerary>> {
    let key = session_key.to_owned();
    self.read(move |tx| itineraries::owned_by_session(tx, owner_id, &key)).await
  }

  async fn complete_generation(&self, itinerary_id: Uuid, outcome: GenerationOutcome) -> Result<()> {
    self
      .write(move |tx, now| itineraries::complete_generation(tx, itinerary_id, outcome, now))
      .await
  }

  // ── Curation ──────────────────────────────────────────────────────────────

  async fn list_places(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    pinned_only: bool,
  ) -> Result<Vec<LinkedPlace>> {
    self
      .read(move |tx| {
        itineraries::owned(tx, owner_id, itinerary_id)?;
        linkage::list(tx, itinerary_id, pinned_only)
      })
      .await
  }

  async fn pinned_places_for_session<'a>(
    &'a self,
    owner_id: Uuid,
    session_key: &'a str,
  ) -> Result<Vec<LinkedPlace>> {
    let key = session_key.to_owned();
    self
      .read(move |tx| match itineraries::owned_by_session(tx, owner_id, &key)? {
        Some(itinerary) => linkage::list(tx, itinerary.itinerary_id, true),
        None => Ok(Vec::new()),
      })
      .await
  }

  async fn set_pinned(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    place_id: Uuid,
    pinned: bool,
  ) -> Result<LinkedPlace> {
    self
      .write(move |tx, _| curation::set_pinned(tx, owner_id, itinerary_id, place_id, pinned))
      .await
  }

  async fn add_place(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    place: NewPlace,
  ) -> Result<LinkedPlace> {
    self
      .write(move |tx, now| curation::add_place(tx, owner_id, itinerary_id, &place, now))
      .await
  }

  async fn remove_place(&self, owner_id: Uuid, itinerary_id: Uuid, place_id: Uuid) -> Result<()> {
    self
      .write(move |tx, now| curation::remove_place(tx, owner_id, itinerary_id, place_id, now))
      .await
  }

  // ── Plans ─────────────────────────────────────────────────────────────────

  async fn replan(
    &self,
    owner_id: Uuid,
    itinerary_id: Uuid,
    schedule: ScheduleDraft,
  ) -> Result<ReplanOutcome> {
    self
      .write(move |tx, now| plans::replan(tx, owner_id, itinerary_id, &schedule, now))
      .await
  }

  async fn current_plan(&self, owner_id: Uuid, itinerary_id: Uuid) -> Result<Option<Plan>> {
    self
      .read(move |tx| {
        itineraries::owned(tx, owner_id, itinerary_id)?;
        plans::current(tx, itinerary_id)
      })
      .await
  }

  async fn plan_history(&self, owner_id: Uuid, itinerary_id: Uuid) -> Result<Vec<Plan>> {
    self
      .read(move |tx| {
        itineraries::owned(tx, owner_id, itinerary_id)?;
        plans::history(tx, itinerary_id)
      })
      .await
  }
}
