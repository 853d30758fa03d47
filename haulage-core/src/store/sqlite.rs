//! SQLite-backed [`EntityStore`].
//!
//! One connection is shared behind a mutex. Transactions start with
//! `BEGIN IMMEDIATE`, so concurrent writers in other processes wait for the
//! database write lock instead of failing half-way through a delivery.

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use log::{debug, warn};
use rusqlite::{Connection, ErrorCode, OptionalExtension, Row, TransactionBehavior, params};

use super::schema::initialise_schema;
use super::{EntityStore, ImportSummary, NetworkSeed, StoreTransaction};
use crate::{
    Connection as NetworkConnection, DeliveryClass, Facility, FacilityRole, IdKind, NetworkGraph,
    NetworkSnapshot, Package, PackageId, StoreError, SuppliedPackage, Supplier, SupplierId,
    TrackedVehicle, Vehicle, VehicleId, VehiclePosition,
};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Persistent store backed by a single SQLite database file.
///
/// # Examples
/// ```
/// use haulage_core::{
///     Connection, EntityStore, Facility, FacilityRole, NetworkGraph, NetworkSeed, SqliteStore,
///     Supplier,
/// };
///
/// let store = SqliteStore::open_in_memory()?;
/// store.import(&NetworkSeed {
///     facilities: vec![
///         Facility::new("A", FacilityRole::Origin),
///         Facility::new("B", FacilityRole::Destination),
///     ],
///     connections: vec![Connection::new("A", "B", 3, 10, 2)],
///     suppliers: vec![Supplier::new(1, "Acme")],
/// })?;
/// assert_eq!(store.snapshot()?.len(), 2);
/// # Ok::<(), haulage_core::StoreError>(())
/// ```
pub struct SqliteStore {
    connection: Mutex<Connection>,
}

impl fmt::Debug for SqliteStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteStore").finish_non_exhaustive()
    }
}

impl SqliteStore {
    /// Open or create the database at `path` and bring its schema up.
    ///
    /// # Errors
    ///
    /// [`StoreError::Sqlite`] when the file cannot be opened and
    /// [`StoreError::SchemaVersion`] when it was written by an incompatible
    /// build.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        let connection = Connection::open(path).map_err(sqlite_error("opening database"))?;
        debug!("opened delivery store at {}", path.display());
        Self::from_connection(connection)
    }

    /// Private in-memory database, mostly for tests.
    ///
    /// # Errors
    ///
    /// See [`SqliteStore::open`].
    pub fn open_in_memory() -> Result<Self, StoreError> {
        let connection =
            Connection::open_in_memory().map_err(sqlite_error("opening in-memory database"))?;
        Self::from_connection(connection)
    }

    fn from_connection(mut connection: Connection) -> Result<Self, StoreError> {
        connection
            .busy_timeout(BUSY_TIMEOUT)
            .map_err(sqlite_error("setting busy timeout"))?;
        initialise_schema(&mut connection)?;
        Ok(Self {
            connection: Mutex::new(connection),
        })
    }

    /// Apply a [`NetworkSeed`] in one transaction.
    ///
    /// # Errors
    ///
    /// [`StoreError::Constraint`] when a connection references an unknown
    /// facility; nothing is written in that case.
    pub fn import(&self, seed: &NetworkSeed) -> Result<ImportSummary, StoreError> {
        let mut connection = self.lock()?;
        let transaction = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(sqlite_error("beginning import"))?;
        {
            let mut insert_facility = transaction
                .prepare_cached(
                    "INSERT INTO facilities (name, role) VALUES (?1, ?2)
                        ON CONFLICT(name) DO UPDATE SET role = excluded.role",
                )
                .map_err(sqlite_error("preparing facility import"))?;
            for facility in &seed.facilities {
                insert_facility
                    .execute(params![facility.name, facility.role.as_str()])
                    .map_err(sqlite_error("importing a facility"))?;
            }

            let mut insert_connection = transaction
                .prepare_cached(
                    "INSERT INTO connections
                        (from_facility, to_facility, cost, transit_minutes, load_minutes, bidirectional)
                        VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
                )
                .map_err(sqlite_error("preparing connection import"))?;
            for link in &seed.connections {
                insert_connection
                    .execute(params![
                        link.from,
                        link.to,
                        link.cost,
                        link.transit_minutes,
                        link.load_minutes,
                        link.bidirectional,
                    ])
                    .map_err(sqlite_error("importing a connection"))?;
            }

            let mut insert_supplier = transaction
                .prepare_cached(
                    "INSERT INTO suppliers (id, name) VALUES (?1, ?2)
                        ON CONFLICT(id) DO UPDATE SET name = excluded.name",
                )
                .map_err(sqlite_error("preparing supplier import"))?;
            for supplier in &seed.suppliers {
                insert_supplier
                    .execute(params![supplier.id.get(), supplier.name])
                    .map_err(sqlite_error("importing a supplier"))?;
            }
        }
        transaction
            .commit()
            .map_err(sqlite_error("committing import"))?;
        debug!(
            "imported {} facilities, {} connections, {} suppliers",
            seed.facilities.len(),
            seed.connections.len(),
            seed.suppliers.len()
        );
        Ok(seed.summary())
    }

    fn lock(&self) -> Result<MutexGuard<'_, Connection>, StoreError> {
        self.connection.lock().map_err(|_| StoreError::LockPoisoned)
    }
}

impl NetworkGraph for SqliteStore {
    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
        load_facility(&*self.lock()?, name)
    }

    fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
        let (facilities, connections) = {
            let connection = self.lock()?;
            (load_facilities(&connection)?, load_connections(&connection)?)
        };
        NetworkSnapshot::new(facilities, connections)
    }
}

impl EntityStore for SqliteStore {
    type Tx<'a> = SqliteTransaction<'a>;

    fn begin(&self) -> Result<Self::Tx<'_>, StoreError> {
        let connection = self.lock()?;
        connection
            .execute_batch("BEGIN IMMEDIATE")
            .map_err(sqlite_error("beginning transaction"))?;
        Ok(SqliteTransaction {
            connection,
            open: true,
        })
    }

    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        load_package(&*self.lock()?, id)
    }

    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError> {
        load_tracked_vehicle(&*self.lock()?, id)
    }

    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError> {
        load_carrier(&*self.lock()?, package)
    }

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        load_supplier(&*self.lock()?, id)
    }

    fn supplied_packages(
        &self,
        supplier: SupplierId,
    ) -> Result<Vec<SuppliedPackage>, StoreError> {
        let connection = self.lock()?;
        let mut statement = connection
            .prepare_cached(
                "SELECT p.id, p.time_budget_minutes, p.total_cost, p.delivery_class, p.created_at,
                        s.paid
                    FROM supplies AS s
                    JOIN packages AS p ON p.id = s.package_id
                    WHERE s.supplier_id = ?1
                    ORDER BY p.id",
            )
            .map_err(sqlite_error("preparing supplied packages query"))?;
        let rows = statement
            .query_map([supplier.get()], |row| {
                Ok((package_columns(row)?, row.get::<_, bool>(5)?))
            })
            .map_err(sqlite_error("reading supplied packages"))?;
        rows.map(|row| {
            let (columns, paid) = row.map_err(sqlite_error("reading supplied packages"))?;
            Ok(SuppliedPackage {
                package: columns.decode()?,
                paid,
            })
        })
        .collect()
    }
}

/// Open `BEGIN IMMEDIATE` transaction on a [`SqliteStore`].
///
/// Rolled back when dropped without [`StoreTransaction::commit`].
pub struct SqliteTransaction<'a> {
    connection: MutexGuard<'a, Connection>,
    open: bool,
}

impl fmt::Debug for SqliteTransaction<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SqliteTransaction")
            .field("open", &self.open)
            .finish_non_exhaustive()
    }
}

impl Drop for SqliteTransaction<'_> {
    fn drop(&mut self) {
        if self.open {
            if let Err(err) = self.connection.execute_batch("ROLLBACK") {
                warn!("rolling back delivery store transaction failed: {err}");
            }
        }
    }
}

impl StoreTransaction for SqliteTransaction<'_> {
    fn next_id(&mut self, kind: IdKind) -> Result<u64, StoreError> {
        self.connection
            .query_row(
                "UPDATE id_counters SET last_value = last_value + 1
                    WHERE kind = ?1 AND last_value < 9223372036854775807
                    RETURNING last_value",
                [kind.as_str()],
                |row| row.get::<_, u64>(0),
            )
            .optional()
            .map_err(sqlite_error("allocating an id"))?
            .ok_or_else(|| StoreError::IdsExhausted {
                kind: kind.as_str(),
            })
    }

    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
        load_facility(&self.connection, name)
    }

    fn package(&self, id: PackageId) -> Result<Option<Package>, StoreError> {
        load_package(&self.connection, id)
    }

    fn supplier(&self, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
        load_supplier(&self.connection, id)
    }

    fn supplier_of(&self, package: PackageId) -> Result<Option<SupplierId>, StoreError> {
        self.connection
            .query_row(
                "SELECT supplier_id FROM supplies WHERE package_id = ?1",
                [package.get()],
                |row| row.get::<_, u64>(0),
            )
            .optional()
            .map(|id| id.map(SupplierId))
            .map_err(sqlite_error("reading package supplier"))
    }

    fn carrier(&self, package: PackageId) -> Result<Option<VehicleId>, StoreError> {
        load_carrier(&self.connection, package)
    }

    fn tracked_vehicle(&self, id: VehicleId) -> Result<Option<TrackedVehicle>, StoreError> {
        load_tracked_vehicle(&self.connection, id)
    }

    fn reusable_vehicle(
        &self,
        facility: &str,
        destination: &str,
        class: DeliveryClass,
    ) -> Result<Option<VehicleId>, StoreError> {
        self.connection
            .query_row(
                "SELECT v.id
                    FROM vehicles AS v
                    JOIN vehicle_positions AS p ON p.vehicle_id = v.id
                    WHERE p.facility = ?1
                      AND p.departed = 0
                      AND v.destination = ?2
                      AND v.delivery_class = ?3
                    ORDER BY v.id
                    LIMIT 1",
                params![facility, destination, class.code()],
                |row| row.get::<_, u64>(0),
            )
            .optional()
            .map(|id| id.map(VehicleId))
            .map_err(sqlite_error("looking for a reusable vehicle"))
    }

    fn insert_package(&mut self, package: &Package) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO packages
                    (id, time_budget_minutes, total_cost, delivery_class, created_at)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    package.id.get(),
                    package.time_budget_minutes,
                    package.total_cost,
                    package.delivery_class.code(),
                    package.created_at,
                ],
            )
            .map(|_| ())
            .map_err(sqlite_error("inserting a package"))
    }

    fn insert_vehicle(
        &mut self,
        vehicle: &Vehicle,
        position: &VehiclePosition,
    ) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO vehicles (id, origin, destination, delivery_class, departure_time)
                    VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    vehicle.id.get(),
                    vehicle.origin,
                    vehicle.destination,
                    vehicle.delivery_class.code(),
                    vehicle.departure_time,
                ],
            )
            .map_err(sqlite_error("inserting a vehicle"))?;
        self.connection
            .execute(
                "INSERT INTO vehicle_positions (vehicle_id, facility, recorded_at, departed)
                    VALUES (?1, ?2, ?3, ?4)",
                params![
                    vehicle.id.get(),
                    position.facility,
                    position.recorded_at,
                    position.departed,
                ],
            )
            .map(|_| ())
            .map_err(sqlite_error("placing a vehicle"))
    }

    fn attach_package(
        &mut self,
        vehicle: VehicleId,
        package: PackageId,
    ) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO transports (package_id, vehicle_id) VALUES (?1, ?2)",
                [package.get(), vehicle.get()],
            )
            .map(|_| ())
            .map_err(sqlite_error("attaching a package"))
    }

    fn link_supplier(
        &mut self,
        supplier: SupplierId,
        package: PackageId,
    ) -> Result<(), StoreError> {
        self.connection
            .execute(
                "INSERT INTO supplies (package_id, supplier_id, paid) VALUES (?1, ?2, 0)",
                [package.get(), supplier.get()],
            )
            .map(|_| ())
            .map_err(sqlite_error("linking a supplier"))
    }

    fn replace_position(
        &mut self,
        vehicle: VehicleId,
        position: &VehiclePosition,
    ) -> Result<(), StoreError> {
        let updated = self
            .connection
            .execute(
                "UPDATE vehicle_positions
                    SET facility = ?2, recorded_at = ?3, departed = ?4
                    WHERE vehicle_id = ?1",
                params![
                    vehicle.get(),
                    position.facility,
                    position.recorded_at,
                    position.departed,
                ],
            )
            .map_err(sqlite_error("moving a vehicle"))?;
        if updated == 0 {
            return Err(StoreError::Constraint {
                operation: "moving a vehicle",
                detail: format!("unknown vehicle {vehicle}"),
            });
        }
        Ok(())
    }

    fn set_paid(
        &mut self,
        supplier: SupplierId,
        package: PackageId,
        paid: bool,
    ) -> Result<bool, StoreError> {
        self.connection
            .execute(
                "UPDATE supplies SET paid = ?3 WHERE package_id = ?1 AND supplier_id = ?2",
                params![package.get(), supplier.get(), paid],
            )
            .map(|updated| updated > 0)
            .map_err(sqlite_error("updating paid flag"))
    }

    fn commit(mut self) -> Result<(), StoreError> {
        self.connection
            .execute_batch("COMMIT")
            .map_err(sqlite_error("committing transaction"))?;
        self.open = false;
        Ok(())
    }
}

/// Map a `rusqlite` error, singling out constraint violations.
fn sqlite_error(operation: &'static str) -> impl Fn(rusqlite::Error) -> StoreError {
    move |source| match source {
        rusqlite::Error::SqliteFailure(failure, message)
            if failure.code == ErrorCode::ConstraintViolation =>
        {
            StoreError::Constraint {
                operation,
                detail: message.unwrap_or_else(|| failure.to_string()),
            }
        }
        source => StoreError::Sqlite { operation, source },
    }
}

fn corrupt(entity: &'static str, detail: String) -> StoreError {
    StoreError::Corrupt { entity, detail }
}

fn decode_class(entity: &'static str, code: u8) -> Result<DeliveryClass, StoreError> {
    DeliveryClass::from_code(code)
        .ok_or_else(|| corrupt(entity, format!("unknown delivery class code {code}")))
}

fn load_facility(connection: &Connection, name: &str) -> Result<Option<Facility>, StoreError> {
    connection
        .query_row(
            "SELECT name, role FROM facilities WHERE name = ?1",
            [name],
            |row| Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?)),
        )
        .optional()
        .map_err(sqlite_error("reading a facility"))?
        .map(|(name, role)| decode_facility(name, &role))
        .transpose()
}

fn decode_facility(name: String, role: &str) -> Result<Facility, StoreError> {
    let role = FacilityRole::from_str(role).map_err(|err| corrupt("facility", err.to_string()))?;
    Ok(Facility::new(name, role))
}

fn load_facilities(connection: &Connection) -> Result<Vec<Facility>, StoreError> {
    let mut statement = connection
        .prepare_cached("SELECT name, role FROM facilities ORDER BY name")
        .map_err(sqlite_error("preparing facility scan"))?;
    let rows = statement
        .query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })
        .map_err(sqlite_error("scanning facilities"))?;
    rows.map(|row| {
        let (name, role) = row.map_err(sqlite_error("scanning facilities"))?;
        decode_facility(name, &role)
    })
    .collect()
}

fn load_connections(connection: &Connection) -> Result<Vec<NetworkConnection>, StoreError> {
    let mut statement = connection
        .prepare_cached(
            "SELECT from_facility, to_facility, cost, transit_minutes, load_minutes, bidirectional
                FROM connections
                ORDER BY id",
        )
        .map_err(sqlite_error("preparing connection scan"))?;
    let rows = statement
        .query_map([], |row| {
            Ok(NetworkConnection {
                from: row.get(0)?,
                to: row.get(1)?,
                cost: row.get(2)?,
                transit_minutes: row.get(3)?,
                load_minutes: row.get(4)?,
                bidirectional: row.get(5)?,
            })
        })
        .map_err(sqlite_error("scanning connections"))?;
    rows.map(|row| row.map_err(sqlite_error("scanning connections")))
        .collect()
}

struct PackageColumns {
    id: u64,
    time_budget_minutes: u64,
    total_cost: u64,
    class_code: u8,
    created_at: chrono::NaiveDateTime,
}

impl PackageColumns {
    fn decode(self) -> Result<Package, StoreError> {
        Ok(Package {
            id: PackageId(self.id),
            time_budget_minutes: self.time_budget_minutes,
            total_cost: self.total_cost,
            delivery_class: decode_class("package", self.class_code)?,
            created_at: self.created_at,
        })
    }
}

fn package_columns(row: &Row<'_>) -> rusqlite::Result<PackageColumns> {
    Ok(PackageColumns {
        id: row.get(0)?,
        time_budget_minutes: row.get(1)?,
        total_cost: row.get(2)?,
        class_code: row.get(3)?,
        created_at: row.get(4)?,
    })
}

fn load_package(connection: &Connection, id: PackageId) -> Result<Option<Package>, StoreError> {
    connection
        .query_row(
            "SELECT id, time_budget_minutes, total_cost, delivery_class, created_at
                FROM packages WHERE id = ?1",
            [id.get()],
            package_columns,
        )
        .optional()
        .map_err(sqlite_error("reading a package"))?
        .map(PackageColumns::decode)
        .transpose()
}

fn load_tracked_vehicle(
    connection: &Connection,
    id: VehicleId,
) -> Result<Option<TrackedVehicle>, StoreError> {
    let row = connection
        .query_row(
            "SELECT v.origin, v.destination, v.delivery_class, v.departure_time,
                    p.facility, p.recorded_at, p.departed
                FROM vehicles AS v
                LEFT JOIN vehicle_positions AS p ON p.vehicle_id = v.id
                WHERE v.id = ?1",
            [id.get()],
            |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, u8>(2)?,
                    row.get::<_, chrono::NaiveDateTime>(3)?,
                    row.get::<_, Option<String>>(4)?,
                    row.get::<_, Option<chrono::NaiveDateTime>>(5)?,
                    row.get::<_, Option<bool>>(6)?,
                ))
            },
        )
        .optional()
        .map_err(sqlite_error("reading a vehicle"))?;
    let Some((origin, destination, class_code, departure_time, facility, recorded_at, departed)) =
        row
    else {
        return Ok(None);
    };
    let (Some(facility), Some(recorded_at), Some(departed)) = (facility, recorded_at, departed)
    else {
        return Err(corrupt("vehicle", format!("vehicle {id} has no position")));
    };
    Ok(Some(TrackedVehicle {
        vehicle: Vehicle {
            id,
            origin,
            destination,
            delivery_class: decode_class("vehicle", class_code)?,
            departure_time,
        },
        position: VehiclePosition {
            facility,
            recorded_at,
            departed,
        },
    }))
}

fn load_carrier(connection: &Connection, package: PackageId) -> Result<Option<VehicleId>, StoreError> {
    connection
        .query_row(
            "SELECT vehicle_id FROM transports WHERE package_id = ?1",
            [package.get()],
            |row| row.get::<_, u64>(0),
        )
        .optional()
        .map(|id| id.map(VehicleId))
        .map_err(sqlite_error("reading package carrier"))
}

fn load_supplier(connection: &Connection, id: SupplierId) -> Result<Option<Supplier>, StoreError> {
    connection
        .query_row(
            "SELECT name FROM suppliers WHERE id = ?1",
            [id.get()],
            |row| row.get::<_, String>(0),
        )
        .optional()
        .map(|name| name.map(|name| Supplier::new(id, name)))
        .map_err(sqlite_error("reading a supplier"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Connection as Link, FacilityRole};
    use chrono::NaiveDate;
    use rstest::{fixture, rstest};

    fn at(hour: u32) -> chrono::NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 1)
            .and_then(|d| d.and_hms_opt(hour, 0, 0))
            .expect("valid timestamp")
    }

    #[fixture]
    fn store() -> SqliteStore {
        let store = SqliteStore::open_in_memory().expect("in-memory store");
        store
            .import(&NetworkSeed {
                facilities: vec![
                    Facility::new("A", FacilityRole::Origin),
                    Facility::new("B", FacilityRole::Transfer),
                    Facility::new("C", FacilityRole::Destination),
                ],
                connections: vec![Link::new("A", "B", 10, 30, 5), Link::one_way("B", "C", 15, 40, 5)],
                suppliers: vec![Supplier::new(1, "Acme")],
            })
            .expect("seed network");
        store
    }

    #[rstest]
    fn snapshot_round_trips_connections(store: SqliteStore) {
        let snapshot = store.snapshot().expect("snapshot");
        assert_eq!(snapshot.len(), 3);
        assert_eq!(
            snapshot.connections(),
            &[Link::new("A", "B", 10, 30, 5), Link::one_way("B", "C", 15, 40, 5)]
        );
    }

    #[rstest]
    fn dropped_transaction_rolls_back(store: SqliteStore) {
        {
            let mut tx = store.begin().expect("begin");
            let id = tx.next_id(IdKind::Package).expect("id");
            tx.insert_package(&Package {
                id: PackageId(id),
                time_budget_minutes: 80,
                total_cost: 25,
                delivery_class: DeliveryClass::Economy,
                created_at: at(9),
            })
            .expect("insert");
        }
        assert!(store.package(PackageId(1)).expect("read").is_none());
    }

    #[rstest]
    fn counters_advance_per_kind(store: SqliteStore) {
        let mut tx = store.begin().expect("begin");
        assert_eq!(tx.next_id(IdKind::Package).expect("id"), 1);
        assert_eq!(tx.next_id(IdKind::Package).expect("id"), 2);
        assert_eq!(tx.next_id(IdKind::Vehicle).expect("id"), 1);
        tx.commit().expect("commit");
        let mut tx = store.begin().expect("begin");
        assert_eq!(tx.next_id(IdKind::Package).expect("id"), 3);
    }

    #[rstest]
    fn second_supply_row_is_a_constraint_violation(store: SqliteStore) {
        let mut tx = store.begin().expect("begin");
        tx.insert_package(&Package {
            id: PackageId(1),
            time_budget_minutes: 80,
            total_cost: 25,
            delivery_class: DeliveryClass::Economy,
            created_at: at(9),
        })
        .expect("insert");
        tx.link_supplier(SupplierId(1), PackageId(1)).expect("first link");
        let err = tx
            .link_supplier(SupplierId(1), PackageId(1))
            .expect_err("duplicate link");
        assert!(matches!(err, StoreError::Constraint { operation: "linking a supplier", .. }));
    }

    #[rstest]
    fn unknown_facility_in_import_rejects_whole_seed(store: SqliteStore) {
        let err = store
            .import(&NetworkSeed {
                facilities: vec![Facility::new("D", FacilityRole::Transfer)],
                connections: vec![Link::new("D", "Z", 1, 1, 1)],
                suppliers: Vec::new(),
            })
            .expect_err("dangling connection");
        assert!(matches!(err, StoreError::Constraint { .. }));
        assert!(store.facility("D").expect("read").is_none());
    }
}
