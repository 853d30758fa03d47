//! Read-only view of the facility network.
//!
//! The [`NetworkGraph`] trait is implemented by stores. The router asks for a
//! [`NetworkSnapshot`] once per search, so a search always sees one
//! consistent version of the network.

use std::collections::HashMap;

use crate::{Connection, Facility, StoreError};

/// Read access to facilities and the connections between them.
///
/// # Examples
///
/// ```rust
/// use haulage_core::{Connection, Facility, FacilityRole, NetworkGraph, NetworkSnapshot, StoreError};
///
/// struct Fixed(NetworkSnapshot);
///
/// impl NetworkGraph for Fixed {
///     fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
///         Ok(self.0.facility_by_name(name).cloned())
///     }
///
///     fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
///         Ok(self.0.clone())
///     }
/// }
///
/// let snapshot = NetworkSnapshot::new(
///     vec![
///         Facility::new("A", FacilityRole::Origin),
///         Facility::new("B", FacilityRole::Destination),
///     ],
///     vec![Connection::new("A", "B", 1, 1, 0)],
/// )?;
/// let graph = Fixed(snapshot);
/// assert!(graph.facility("A")?.is_some());
/// # Ok::<(), StoreError>(())
/// ```
pub trait NetworkGraph {
    /// Look a facility up by name.
    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError>;

    /// Capture every facility and connection.
    fn snapshot(&self) -> Result<NetworkSnapshot, StoreError>;
}

impl<G: NetworkGraph + ?Sized> NetworkGraph for &G {
    fn facility(&self, name: &str) -> Result<Option<Facility>, StoreError> {
        (**self).facility(name)
    }

    fn snapshot(&self) -> Result<NetworkSnapshot, StoreError> {
        (**self).snapshot()
    }
}

/// One way of traversing a connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Edge {
    /// Facility index the edge leaves.
    pub(crate) from: usize,
    /// Facility index the edge reaches.
    pub(crate) to: usize,
    /// Index into the snapshot's connection list.
    pub(crate) connection: usize,
    /// Whether the connection is travelled in its stored direction.
    pub(crate) forward: bool,
    pub(crate) cost: u64,
    pub(crate) minutes: u64,
}

/// Immutable, indexed copy of the network.
///
/// Facilities are indexed in name order and adjacency lists are sorted by
/// neighbour name and then by connection order, which makes route searches
/// deterministic for a given snapshot.
#[derive(Debug, Clone, Default)]
pub struct NetworkSnapshot {
    facilities: Vec<Facility>,
    index: HashMap<String, usize>,
    connections: Vec<Connection>,
    outgoing: Vec<Vec<Edge>>,
    incoming: Vec<Vec<Edge>>,
}

impl NetworkSnapshot {
    /// Index `facilities` and `connections`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Corrupt`] when two facilities share a name or a
    /// connection references an unknown facility.
    pub fn new(
        mut facilities: Vec<Facility>,
        connections: Vec<Connection>,
    ) -> Result<Self, StoreError> {
        facilities.sort_by(|a, b| a.name.cmp(&b.name));
        let mut index = HashMap::with_capacity(facilities.len());
        for (position, facility) in facilities.iter().enumerate() {
            if index.insert(facility.name.clone(), position).is_some() {
                return Err(StoreError::Corrupt {
                    entity: "facility",
                    detail: format!("duplicate facility name '{}'", facility.name),
                });
            }
        }

        let mut outgoing = vec![Vec::new(); facilities.len()];
        let mut incoming = vec![Vec::new(); facilities.len()];
        for (position, connection) in connections.iter().enumerate() {
            let from = lookup(&index, &connection.from)?;
            let to = lookup(&index, &connection.to)?;
            let cost = connection.cost;
            let minutes = connection.traversal_minutes();
            let mut push = |edge: Edge| {
                if let Some(list) = outgoing.get_mut(edge.from) {
                    list.push(edge);
                }
                if let Some(list) = incoming.get_mut(edge.to) {
                    list.push(edge);
                }
            };
            push(Edge {
                from,
                to,
                connection: position,
                forward: true,
                cost,
                minutes,
            });
            if connection.bidirectional && from != to {
                push(Edge {
                    from: to,
                    to: from,
                    connection: position,
                    forward: false,
                    cost,
                    minutes,
                });
            }
        }
        for list in &mut outgoing {
            list.sort_by_key(|edge| (edge.to, edge.connection));
        }
        for list in &mut incoming {
            list.sort_by_key(|edge| (edge.from, edge.connection));
        }

        Ok(Self {
            facilities,
            index,
            connections,
            outgoing,
            incoming,
        })
    }

    /// Number of facilities.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.facilities.len()
    }

    /// Whether the snapshot has no facilities.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// All facilities in name order.
    #[must_use]
    pub fn facilities(&self) -> &[Facility] {
        &self.facilities
    }

    /// All connections in their stored order and direction.
    #[must_use]
    pub fn connections(&self) -> &[Connection] {
        &self.connections
    }

    /// Look a facility up by name.
    #[must_use]
    pub fn facility_by_name(&self, name: &str) -> Option<&Facility> {
        self.index
            .get(name)
            .and_then(|&position| self.facilities.get(position))
    }

    pub(crate) fn position(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn outgoing(&self, node: usize) -> &[Edge] {
        self.outgoing.get(node).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn incoming(&self, node: usize) -> &[Edge] {
        self.incoming.get(node).map_or(&[], Vec::as_slice)
    }

    /// The connection behind `edge`, oriented in travel direction.
    pub(crate) fn leg(&self, edge: &Edge) -> Option<Connection> {
        let connection = self.connections.get(edge.connection)?;
        Some(if edge.forward {
            connection.clone()
        } else {
            connection.reversed()
        })
    }
}

fn lookup(index: &HashMap<String, usize>, name: &str) -> Result<usize, StoreError> {
    index
        .get(name)
        .copied()
        .ok_or_else(|| StoreError::Corrupt {
            entity: "connection",
            detail: format!("connection references unknown facility '{name}'"),
        })
}
