//! Compressed sparse storage for cluster lists.
//!
//! A cluster of order `k` is an ordered tuple of `k` atom indices (an atom, a
//! pair, a triplet, ...). The clusters of order `k` are stored relative to
//! the clusters of order `k - 1`: each parent cluster owns a slice of child
//! atoms, and appending a child atom to the parent tuple gives the child
//! cluster. Three parallel arrays describe this one-to-many mapping:
//!
//! - `neighbours` contains the appended atom of every child cluster, making
//!   the position of a child in this array its dense linear index;
//! - `nb_neigh` contains the number of children of every parent cluster;
//! - `offsets` is the prefix sum of `nb_neigh`, so the children of parent `i`
//!   live in `neighbours[offsets[i]..offsets[i + 1]]`.

use crate::Error;

/// One order of a cluster hierarchy, in compressed sparse layout.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ClusterList {
    neighbours: Vec<usize>,
    nb_neigh: Vec<usize>,
    offsets: Vec<usize>,
}

impl ClusterList {
    /// Create an empty cluster list
    pub fn new() -> ClusterList {
        ClusterList::default()
    }

    /// Start the child slice of the next parent cluster. Every parent gets an
    /// entry, including parents which end up with no children.
    pub fn start_parent(&mut self) {
        self.nb_neigh.push(0);
    }

    /// Record `atom` as a child of the parent started last
    pub fn push_neighbour(&mut self, atom: usize) {
        let count = self.nb_neigh.last_mut()
            .expect("start_parent must be called before push_neighbour");
        *count += 1;
        self.neighbours.push(atom);
    }

    /// Recompute `offsets` as the prefix sum of `nb_neigh`. Must be called
    /// once all parents have been recorded, before any indexed access.
    pub fn set_offsets(&mut self) {
        self.offsets.clear();
        self.offsets.reserve(self.nb_neigh.len() + 1);
        self.offsets.push(0);
        let mut total = 0;
        for &count in &self.nb_neigh {
            total += count;
            self.offsets.push(total);
        }
    }

    /// Number of clusters stored at this order
    pub fn len(&self) -> usize {
        self.neighbours.len()
    }

    /// Check whether this list contains any cluster
    pub fn is_empty(&self) -> bool {
        self.neighbours.is_empty()
    }

    /// Number of parent clusters (at the order below) this list was built
    /// from
    pub fn nb_parents(&self) -> usize {
        self.nb_neigh.len()
    }

    /// Number of children of the given parent cluster
    pub fn nb_neighbours(&self, parent: usize) -> Option<usize> {
        self.nb_neigh.get(parent).copied()
    }

    /// Linear index of the first child of the given parent cluster
    pub fn offset(&self, parent: usize) -> Option<usize> {
        if parent < self.nb_parents() {
            self.offsets.get(parent).copied()
        } else {
            None
        }
    }

    /// Appended atoms of all children of the given parent cluster
    pub fn children(&self, parent: usize) -> Option<&[usize]> {
        if parent < self.nb_parents() {
            let start = self.offsets[parent];
            let stop = self.offsets[parent + 1];
            Some(&self.neighbours[start..stop])
        } else {
            None
        }
    }

    /// Appended atom of the `index`-th child of the given parent cluster
    pub fn neighbour(&self, parent: usize, index: usize) -> Option<usize> {
        let children = self.children(parent)?;
        children.get(index).copied()
    }

    /// Validate the compressed sparse invariants: `offsets` is a monotone
    /// prefix sum of `nb_neigh` closing on `neighbours.len()`.
    pub fn validate(&self) -> Result<(), Error> {
        if self.offsets.len() != self.nb_neigh.len() + 1 {
            return Err(Error::Internal(format!(
                "offsets has {} entries for {} parents",
                self.offsets.len(), self.nb_neigh.len(),
            )));
        }

        if self.offsets[0] != 0 {
            return Err(Error::Internal("offsets does not start at 0".into()));
        }

        for (parent, &count) in self.nb_neigh.iter().enumerate() {
            if self.offsets[parent + 1] < self.offsets[parent] {
                return Err(Error::Internal("offsets is not monotone".into()));
            }
            if self.offsets[parent + 1] - self.offsets[parent] != count {
                return Err(Error::Internal(format!(
                    "child slice of parent {} does not match its neighbour count",
                    parent,
                )));
            }
        }

        if *self.offsets.last().expect("offsets is never empty here") != self.neighbours.len() {
            return Err(Error::Internal(
                "offsets does not close on the number of stored clusters".into()
            ));
        }

        Ok(())
    }
}
