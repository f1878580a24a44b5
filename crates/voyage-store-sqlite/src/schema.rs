//! SQL schema for the Voyage SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE ... IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

CREATE TABLE IF NOT EXISTS owners (
    owner_id    TEXT PRIMARY KEY,
    email       TEXT NOT NULL UNIQUE,
    created_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS itineraries (
    itinerary_id          TEXT PRIMARY KEY,
    owner_id              TEXT NOT NULL REFERENCES owners(owner_id),
    destination           TEXT NOT NULL,
    start_date            TEXT NOT NULL,   -- RFC 3339 with offset
    end_date              TEXT NOT NULL,
    budget_cents          INTEGER NOT NULL,
    budget_per_meal_cents INTEGER,
    travel_pace           TEXT NOT NULL DEFAULT 'MODERATE',
    travel_mode           TEXT,
    number_of_travelers   INTEGER,
    has_children          INTEGER,
    has_elderly           INTEGER,
    preferred_categories  TEXT NOT NULL DEFAULT '[]',
    session_key           TEXT UNIQUE,     -- at most one itinerary per agent session
    metadata              TEXT NOT NULL DEFAULT '{}',
    created_at            TEXT NOT NULL,
    updated_at            TEXT NOT NULL
);

-- Catalog rows. Imports never look existing rows up, so poi_external_id
-- repeats across itineraries.
CREATE TABLE IF NOT EXISTS places (
    place_id        TEXT PRIMARY KEY,
    poi_external_id TEXT,
    external_ref    TEXT,
    name            TEXT NOT NULL,
    address         TEXT NOT NULL,
    latitude        REAL NOT NULL,
    longitude       REAL NOT NULL,
    description     TEXT,
    image_url       TEXT,
    opening_hours   TEXT,              -- JSON or NULL
    source          TEXT NOT NULL,
    metadata        TEXT NOT NULL DEFAULT '{}',
    created_at      TEXT NOT NULL
);

-- Only written by creating imports and manual adds; only removed by an
-- explicit delete.
CREATE TABLE IF NOT EXISTS itinerary_places (
    itinerary_id TEXT NOT NULL REFERENCES itineraries(itinerary_id),
    place_id     TEXT NOT NULL REFERENCES places(place_id),
    pinned       INTEGER NOT NULL DEFAULT 1,
    name         TEXT NOT NULL,
    description  TEXT,
    added_at     TEXT NOT NULL,
    PRIMARY KEY (itinerary_id, place_id)
);

-- Plans are append-only apart from the active flag.
CREATE TABLE IF NOT EXISTS plans (
    plan_id      TEXT PRIMARY KEY,
    itinerary_id TEXT NOT NULL REFERENCES itineraries(itinerary_id),
    version      INTEGER NOT NULL CHECK (version >= 1),
    active       INTEGER NOT NULL,
    body         TEXT NOT NULL,    -- JSON PlanBody
    digest       TEXT NOT NULL,    -- hex SHA-256 of body
    created_at   TEXT NOT NULL,
    UNIQUE (itinerary_id, version)
);

CREATE UNIQUE INDEX IF NOT EXISTS places_external_ref_idx
    ON places(external_ref) WHERE external_ref IS NOT NULL;
CREATE UNIQUE INDEX IF NOT EXISTS plans_active_idx
    ON plans(itinerary_id) WHERE active = 1;
CREATE INDEX IF NOT EXISTS itineraries_owner_idx ON itineraries(owner_id);
CREATE INDEX IF NOT EXISTS itinerary_places_place_idx ON itinerary_places(place_id);

PRAGMA user_version = 1;
";
