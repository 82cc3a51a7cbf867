//! The order-increasing extension algorithm: derive the order-(k+1) cluster
//! list from the order-k clusters and the order-2 neighborhoods of their
//! member atoms.

use std::collections::BTreeSet;

use crate::Error;
use crate::clusters::ClusterList;

use super::{ClusterManager, for_each_cluster};

/// Build the cluster list of order `manager.max_order() + 1`.
///
/// Every existing cluster of the highest constructed order becomes a parent:
/// its children are the neighbors of its member atoms with an index strictly
/// greater than the cluster's trailing index, minus the members themselves.
/// The ordering filter keeps the produced tuples canonical (strictly
/// increasing past the first element), so no permutation of the same atom
/// set is ever derived twice, and the set difference prevents tuples with a
/// repeated atom. Parents without any candidate still record an explicit
/// empty slice, keeping the compressed layout dense over all parents.
#[time_graph::instrument(name = "extend_clusters")]
pub(crate) fn extend_clusters<M>(manager: &M) -> Result<ClusterList, Error>
where
    M: ClusterManager + ?Sized,
{
    let order = manager.max_order();
    debug_assert!(order >= 2, "extension requires an existing neighbor list");

    let mut list = ClusterList::new();
    let mut candidates = BTreeSet::new();

    for_each_cluster(manager, order, |_, tuple| {
        let last = *tuple.last().expect("cluster tuples are never empty");

        candidates.clear();
        for &atom in tuple {
            for index in 0..manager.nb_neighbours(1, atom)? {
                let neighbour = manager.neighbour(1, atom, index)?;
                if neighbour > last {
                    candidates.insert(neighbour);
                }
            }
        }

        // a cluster never contains the same atom twice
        for atom in tuple {
            candidates.remove(atom);
        }

        list.start_parent();
        for &atom in &candidates {
            list.push_neighbour(atom);
        }

        Ok(())
    })?;

    list.set_offsets();
    return Ok(list);
}
