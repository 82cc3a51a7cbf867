//! Managers expose a uniform read contract over a structure and the cluster
//! lists built on top of it.
//!
//! The bottom-most manager is a [`Structure`](crate::Structure), which only
//! knows about order-1 clusters (the atoms themselves). Each
//! [`MaxOrderAdaptor`] wraps exactly one lower manager and constructs the
//! next order, forming a linear chain from the structure up to the requested
//! maximum order. A layer serves queries for the single order it constructs
//! and transparently forwards everything else to the layer it wraps.

use crate::{Error, Pair, UnitCell, Vector3D};

mod extension;

mod max_order;
pub use self::max_order::{MaxOrderAdaptor, MaxOrderParameters, ListKind};

mod species;
pub use self::species::SpeciesFilter;

/// Read access to a structure and the cluster lists of every order a manager
/// chain constructs.
///
/// Clusters of a given order are identified by their dense linear index, the
/// position of the cluster in the storage arrays of the layer constructing
/// that order. The children of a cluster at order `k` are the order-`k + 1`
/// clusters sharing it as a prefix.
pub trait ClusterManager {
    /// Get the number of atoms in the underlying structure
    fn size(&self) -> usize;

    /// Get the highest cluster order this manager chain constructs
    fn max_order(&self) -> usize;

    /// Get the Cartesian positions of all atoms
    fn positions(&self) -> &[Vector3D];

    /// Get the species of all atoms, as arbitrary integer identifiers
    fn atom_types(&self) -> &[i32];

    /// Get the unit cell of the underlying structure
    fn cell(&self) -> &UnitCell;

    /// Get the per-axis periodicity flags of the underlying structure
    fn periodic(&self) -> [bool; 3];

    /// Get the number of clusters stored at the given `order`
    fn nb_clusters(&self, order: usize) -> Result<usize, Error>;

    /// Get the number of children of the cluster with linear index `cluster`
    /// at the given `order`
    fn nb_neighbours(&self, order: usize, cluster: usize) -> Result<usize, Error>;

    /// Get the atom index appended by the `index`-th child of the cluster
    /// with linear index `cluster` at the given `order`
    fn neighbour(&self, order: usize, cluster: usize, index: usize) -> Result<usize, Error>;

    /// Get the pair data (distance, vector, cell shift) of the order-2
    /// cluster with the given linear index
    fn pair(&self, index: usize) -> Result<Pair, Error>;

    /// Get the linear storage offset for the cluster identified by
    /// `counters`.
    ///
    /// `counters[0]` is an atom index, and each further entry is the local
    /// displacement inside the previous cluster's child slice. The returned
    /// value is the linear index, at the next order, of the first child of
    /// the identified cluster; adding a local displacement to it gives the
    /// linear index of one specific child.
    fn offset(&self, counters: &[usize]) -> Result<usize, Error>;

    /// Rebuild this manager and every layer below it, from the bottom up.
    /// Either all orders are consistently rebuilt, or the first failing layer
    /// leaves its previous arrays untouched and the error is returned.
    fn update(&mut self) -> Result<(), Error>;
}

/// Call `callback` with the linear index and full atom-index tuple of every
/// cluster at the given `order`, in linear storage order.
///
/// This walks the cluster hierarchy depth first; since every order is built
/// by scanning the order below in linear order, depth-first traversal visits
/// the clusters of each intermediate order exactly in their storage order.
pub fn for_each_cluster<M, F>(manager: &M, order: usize, mut callback: F) -> Result<(), Error>
where
    M: ClusterManager + ?Sized,
    F: FnMut(usize, &[usize]) -> Result<(), Error>,
{
    if order < 1 {
        return Err(Error::InvalidParameter("cluster order must be at least 1".into()));
    }
    if order > manager.max_order() {
        return Err(Error::UnsupportedOrder(format!(
            "this manager chain stops at order {}, can not iterate order {}",
            manager.max_order(), order,
        )));
    }

    let mut tuple = Vec::with_capacity(order);
    let mut counters = vec![0; order + 1];
    for atom in 0..manager.size() {
        tuple.push(atom);
        walk(manager, order, &mut tuple, atom, &mut counters, &mut callback)?;
        tuple.pop();
    }

    Ok(())
}

fn walk<M, F>(
    manager: &M,
    order: usize,
    tuple: &mut Vec<usize>,
    cluster: usize,
    counters: &mut [usize],
    callback: &mut F,
) -> Result<(), Error>
where
    M: ClusterManager + ?Sized,
    F: FnMut(usize, &[usize]) -> Result<(), Error>,
{
    let depth = tuple.len();
    if depth == order {
        return callback(cluster, tuple);
    }

    for index in 0..manager.nb_neighbours(depth, cluster)? {
        let atom = manager.neighbour(depth, cluster, index)?;
        let child = counters[depth + 1];
        counters[depth + 1] += 1;

        tuple.push(atom);
        walk(manager, order, tuple, child, counters, callback)?;
        tuple.pop();
    }

    Ok(())
}
