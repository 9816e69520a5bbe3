//! Origins and destinations mapped onto edges.
//!
//! Mapping points onto the nearest edge happens outside this crate; what
//! arrives here is the mapped result: an edge, an offset along it, and the
//! object's weight (origin weight or destination value).

use rustc_hash::FxHashMap;

use acc_core::{EdgeId, ObjectId};

use crate::{Network, NetworkError, NetworkResult};

/// An object placed `offset` metres from the start node of `edge`.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LocatedObject {
    pub id:     ObjectId,
    pub edge:   EdgeId,
    pub offset: f64,
    /// Origin weight, or destination value.
    pub weight: f64,
}

impl LocatedObject {
    pub fn new(id: ObjectId, edge: EdgeId, offset: f64, weight: f64) -> Self {
        Self { id, edge, offset, weight }
    }
}

/// A set of located objects indexed by the edge they sit on.
#[derive(Clone, Debug, Default)]
pub struct ObjectLayer {
    objects: Vec<LocatedObject>,
    by_edge: FxHashMap<EdgeId, Vec<u32>>,
}

impl ObjectLayer {
    /// Check every object against `network` and index it by edge.
    ///
    /// Offsets are clamped to `[0, edge.length]`.  Objects on pruned edges
    /// are kept: they are simply never reached.
    pub fn new(network: &Network, objects: Vec<LocatedObject>) -> NetworkResult<Self> {
        let mut layer = Self {
            objects: Vec::with_capacity(objects.len()),
            by_edge: FxHashMap::default(),
        };
        for mut obj in objects {
            let edge = network
                .get_edge(obj.edge)
                .ok_or(NetworkError::EdgeNotFound(obj.edge))?;
            obj.offset = obj.offset.clamp(0.0, edge.length);
            let slot = layer.objects.len() as u32;
            layer.by_edge.entry(obj.edge).or_default().push(slot);
            layer.objects.push(obj);
        }
        Ok(layer)
    }

    /// Objects attached to `edge`.
    pub fn on_edge(&self, edge: EdgeId) -> impl Iterator<Item = &LocatedObject> + '_ {
        self.by_edge
            .get(&edge)
            .into_iter()
            .flatten()
            .map(|&i| &self.objects[i as usize])
    }

    #[inline]
    pub fn has_objects_on(&self, edge: EdgeId) -> bool {
        self.by_edge.contains_key(&edge)
    }

    pub fn iter(&self) -> impl Iterator<Item = &LocatedObject> + '_ {
        self.objects.iter()
    }

    pub fn as_slice(&self) -> &[LocatedObject] {
        &self.objects
    }

    pub fn len(&self) -> usize {
        self.objects.len()
    }

    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Number of distinct edges carrying at least one object.
    pub fn edge_count(&self) -> usize {
        self.by_edge.len()
    }
}
