//! SQLite schema for the delivery store.

use rusqlite::{Connection, OptionalExtension, Transaction, TransactionBehavior};

use crate::StoreError;

pub(super) const SCHEMA_VERSION: i64 = 1;

/// Create missing tables and check the recorded schema version.
///
/// Safe to run on every open; existing databases must already carry
/// [`SCHEMA_VERSION`].
pub(super) fn initialise_schema(connection: &mut Connection) -> Result<(), StoreError> {
    connection
        .pragma_update(None, "foreign_keys", true)
        .map_err(|source| StoreError::Sqlite {
            operation: "enabling foreign keys",
            source,
        })?;

    // Take the write lock up front: a deferred transaction that reads first
    // cannot wait for it later and fails with SQLITE_BUSY instead.
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|source| StoreError::Sqlite {
            operation: "beginning schema transaction",
            source,
        })?;

    create_network_tables(&transaction)?;
    create_entity_tables(&transaction)?;
    create_relation_tables(&transaction)?;
    ensure_schema_version(&transaction)?;

    transaction.commit().map_err(|source| StoreError::Sqlite {
        operation: "committing schema transaction",
        source,
    })
}

fn create_network_tables(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "creating facilities",
        "CREATE TABLE IF NOT EXISTS facilities (
            name TEXT PRIMARY KEY CHECK (length(name) > 0),
            role TEXT NOT NULL CHECK (role IN ('origin', 'transfer', 'destination'))
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "creating connections",
        "CREATE TABLE IF NOT EXISTS connections (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            from_facility TEXT NOT NULL REFERENCES facilities(name),
            to_facility TEXT NOT NULL REFERENCES facilities(name),
            cost INTEGER NOT NULL CHECK (cost >= 0),
            transit_minutes INTEGER NOT NULL CHECK (transit_minutes >= 0),
            load_minutes INTEGER NOT NULL CHECK (load_minutes >= 0),
            bidirectional INTEGER NOT NULL CHECK (bidirectional IN (0, 1))
        )",
    )?;
    run_migration_step(
        transaction,
        "creating suppliers",
        "CREATE TABLE IF NOT EXISTS suppliers (
            id INTEGER PRIMARY KEY,
            name TEXT NOT NULL
        )",
    )
}

fn create_entity_tables(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "creating id counters",
        "CREATE TABLE IF NOT EXISTS id_counters (
            kind TEXT PRIMARY KEY,
            last_value INTEGER NOT NULL CHECK (last_value >= 0)
        ) WITHOUT ROWID",
    )?;
    run_migration_step(
        transaction,
        "seeding id counters",
        "INSERT OR IGNORE INTO id_counters (kind, last_value)
            VALUES ('package', 0), ('vehicle', 0)",
    )?;
    run_migration_step(
        transaction,
        "creating packages",
        "CREATE TABLE IF NOT EXISTS packages (
            id INTEGER PRIMARY KEY,
            time_budget_minutes INTEGER NOT NULL CHECK (time_budget_minutes >= 0),
            total_cost INTEGER NOT NULL CHECK (total_cost >= 0),
            delivery_class INTEGER NOT NULL CHECK (delivery_class IN (1, 2, 3)),
            created_at TEXT NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "creating vehicles",
        "CREATE TABLE IF NOT EXISTS vehicles (
            id INTEGER PRIMARY KEY,
            origin TEXT NOT NULL REFERENCES facilities(name),
            destination TEXT NOT NULL REFERENCES facilities(name),
            delivery_class INTEGER NOT NULL CHECK (delivery_class IN (1, 2, 3)),
            departure_time TEXT NOT NULL
        )",
    )?;
    run_migration_step(
        transaction,
        "creating vehicle positions",
        "CREATE TABLE IF NOT EXISTS vehicle_positions (
            vehicle_id INTEGER PRIMARY KEY REFERENCES vehicles(id),
            facility TEXT NOT NULL REFERENCES facilities(name),
            recorded_at TEXT NOT NULL,
            departed INTEGER NOT NULL CHECK (departed IN (0, 1))
        )",
    )
}

fn create_relation_tables(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "creating transports",
        "CREATE TABLE IF NOT EXISTS transports (
            package_id INTEGER PRIMARY KEY REFERENCES packages(id),
            vehicle_id INTEGER NOT NULL REFERENCES vehicles(id)
        )",
    )?;
    run_migration_step(
        transaction,
        "creating supplies",
        "CREATE TABLE IF NOT EXISTS supplies (
            package_id INTEGER PRIMARY KEY REFERENCES packages(id),
            supplier_id INTEGER NOT NULL REFERENCES suppliers(id),
            paid INTEGER NOT NULL DEFAULT 0 CHECK (paid IN (0, 1))
        )",
    )?;
    run_migration_step(
        transaction,
        "indexing supplies",
        "CREATE INDEX IF NOT EXISTS idx_supplies_supplier
            ON supplies(supplier_id, package_id)",
    )?;
    run_migration_step(
        transaction,
        "indexing waiting vehicles",
        "CREATE INDEX IF NOT EXISTS idx_vehicle_positions_waiting
            ON vehicle_positions(facility, departed, vehicle_id)",
    )
}

fn ensure_schema_version(transaction: &Transaction<'_>) -> Result<(), StoreError> {
    run_migration_step(
        transaction,
        "creating schema version table",
        "CREATE TABLE IF NOT EXISTS haulage_schema_version (
            version INTEGER PRIMARY KEY CHECK (version > 0),
            applied_at TEXT NOT NULL DEFAULT (strftime('%Y-%m-%dT%H:%M:%SZ', 'now'))
        ) WITHOUT ROWID",
    )?;

    let existing: Option<i64> = transaction
        .query_row(
            "SELECT version FROM haulage_schema_version LIMIT 1",
            [],
            |row| row.get(0),
        )
        .optional()
        .map_err(|source| StoreError::Sqlite {
            operation: "reading schema version",
            source,
        })?;

    match existing {
        Some(version) if version == SCHEMA_VERSION => Ok(()),
        Some(found) => Err(StoreError::SchemaVersion {
            expected: SCHEMA_VERSION,
            found,
        }),
        None => transaction
            .execute(
                "INSERT INTO haulage_schema_version (version) VALUES (?1)",
                [SCHEMA_VERSION],
            )
            .map(|_| ())
            .map_err(|source| StoreError::Sqlite {
                operation: "recording schema version",
                source,
            }),
    }
}

fn run_migration_step(
    transaction: &Transaction<'_>,
    operation: &'static str,
    sql: &str,
) -> Result<(), StoreError> {
    transaction
        .execute(sql, [])
        .map(|_| ())
        .map_err(|source| StoreError::Sqlite { operation, source })
}
