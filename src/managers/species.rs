use std::collections::BTreeMap;

use crate::{Error, Pair, UnitCell, Vector3D};

use super::{ClusterManager, for_each_cluster};

/// An adaptor partitioning the clusters of one order by the species
/// involved.
///
/// With species 1 and 2 and pairs as the target order, `update` sorts the
/// pair indices into the classes 1-1, 1-2 and 2-2; with triplets, into
/// 1-1-1, 1-1-2, 1-2-2 and 2-2-2; and so on. A class is identified by the
/// multiset of the species in the cluster, represented as a sorted list, so
/// the partition is independent of the atom ordering inside each cluster.
///
/// This adaptor does not construct any new order: every manager query
/// delegates unchanged to the wrapped layer, and the partition only offers
/// an additional, species-resolved view of the existing linear indices.
pub struct SpeciesFilter<'a, M: ClusterManager> {
    manager: &'a mut M,
    /// the cluster order being partitioned
    order: usize,
    /// linear cluster indices of every species class
    classes: BTreeMap<Vec<i32>, Vec<usize>>,
}

impl<'a, M: ClusterManager> SpeciesFilter<'a, M> {
    /// Wrap `manager` in a filter partitioning its clusters of the given
    /// `order`
    pub fn new(manager: &'a mut M, order: usize) -> Result<SpeciesFilter<'a, M>, Error> {
        if order < 1 {
            return Err(Error::InvalidParameter(
                "the partitioned order must be at least 1".into()
            ));
        }

        if order > manager.max_order() {
            return Err(Error::UnsupportedOrder(format!(
                "the wrapped chain stops at order {}, can not partition order {}",
                manager.max_order(), order,
            )));
        }

        Ok(SpeciesFilter {
            manager: manager,
            order: order,
            classes: BTreeMap::new(),
        })
    }

    /// Get the order being partitioned
    pub fn order(&self) -> usize {
        self.order
    }

    /// Get the species classes found by the last `update`, sorted
    pub fn keys(&self) -> impl Iterator<Item = &[i32]> {
        self.classes.keys().map(|key| key.as_slice())
    }

    /// Get the linear indices of the clusters whose species multiset matches
    /// `key` (sorted), in increasing order. Returns `None` for a class
    /// without any cluster.
    pub fn clusters(&self, key: &[i32]) -> Option<&[usize]> {
        self.classes.get(key).map(|indices| indices.as_slice())
    }
}

impl<M: ClusterManager> ClusterManager for SpeciesFilter<'_, M> {
    fn size(&self) -> usize {
        self.manager.size()
    }

    fn max_order(&self) -> usize {
        self.manager.max_order()
    }

    fn positions(&self) -> &[Vector3D] {
        self.manager.positions()
    }

    fn atom_types(&self) -> &[i32] {
        self.manager.atom_types()
    }

    fn cell(&self) -> &UnitCell {
        self.manager.cell()
    }

    fn periodic(&self) -> [bool; 3] {
        self.manager.periodic()
    }

    fn nb_clusters(&self, order: usize) -> Result<usize, Error> {
        self.manager.nb_clusters(order)
    }

    fn nb_neighbours(&self, order: usize, cluster: usize) -> Result<usize, Error> {
        self.manager.nb_neighbours(order, cluster)
    }

    fn neighbour(&self, order: usize, cluster: usize, index: usize) -> Result<usize, Error> {
        self.manager.neighbour(order, cluster, index)
    }

    fn pair(&self, index: usize) -> Result<Pair, Error> {
        self.manager.pair(index)
    }

    fn offset(&self, counters: &[usize]) -> Result<usize, Error> {
        self.manager.offset(counters)
    }

    fn update(&mut self) -> Result<(), Error> {
        self.manager.update()?;

        let mut classes = BTreeMap::<Vec<i32>, Vec<usize>>::new();
        let manager = &*self.manager;
        let types = manager.atom_types();

        for_each_cluster(manager, self.order, |index, tuple| {
            let mut key: Vec<i32> = tuple.iter().map(|&atom| types[atom]).collect();
            key.sort_unstable();
            classes.entry(key).or_default().push(index);
            Ok(())
        })?;

        self.classes = classes;
        Ok(())
    }
}
