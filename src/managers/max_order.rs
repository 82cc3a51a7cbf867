use crate::{Error, Pair, UnitCell, Vector3D};
use crate::clusters::ClusterList;
use crate::neighbors::{half_neighbour_list, full_neighbour_list};

use super::ClusterManager;
use super::extension::extend_clusters;

/// Which kind of order-2 list an adaptor should build when it is the pair
/// layer of a chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[derive(serde::Deserialize, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ListKind {
    /// store each unordered pair once, with the smaller atom index first
    #[default]
    Half,
    /// store both directions of each pair, and periodic images as distinct
    /// entries
    Full,
}

/// Parameters of a [`MaxOrderAdaptor`]
#[derive(Debug, Clone, serde::Deserialize, serde::Serialize)]
pub struct MaxOrderParameters {
    /// Spherical cutoff for the pair construction
    pub cutoff: f64,
    /// Kind of order-2 list to build; ignored by layers constructing an
    /// order above 2
    #[serde(default)]
    pub list: ListKind,
}

/// An adaptor increasing the maximum cluster order of the manager it wraps
/// by one.
///
/// Wrapping a bare [`Structure`](crate::Structure) builds the order-2 list
/// (the neighbor list) from pairwise cutoff tests; wrapping another adaptor
/// builds triplets, quadruplets, etc. with the extension algorithm. Each
/// layer owns the arrays of the single order it constructs, and forwards
/// every query about lower orders to the layer it wraps.
///
/// The constructed list is empty until the first call to
/// [`update`](ClusterManager::update). `update` propagates to the wrapped
/// layer first, so updating the top of a chain rebuilds every order from the
/// bottom up; a layer which fails to rebuild keeps its previous arrays
/// untouched.
pub struct MaxOrderAdaptor<'a, M: ClusterManager> {
    manager: &'a mut M,
    parameters: MaxOrderParameters,
    /// the cluster order constructed by this layer
    order: usize,
    clusters: ClusterList,
    /// pair data, parallel to the stored clusters; only filled when this
    /// layer constructs order 2
    pairs: Vec<Pair>,
}

impl<'a, M: ClusterManager> MaxOrderAdaptor<'a, M> {
    /// Wrap `manager` in a new adaptor constructing the next cluster order
    pub fn new(manager: &'a mut M, parameters: MaxOrderParameters) -> Result<MaxOrderAdaptor<'a, M>, Error> {
        if !parameters.cutoff.is_finite() || parameters.cutoff <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be a positive finite number, got {}", parameters.cutoff,
            )));
        }

        if manager.max_order() < 1 {
            return Err(Error::InvalidParameter(
                "the wrapped manager must at least store atoms".into()
            ));
        }

        let order = manager.max_order() + 1;
        Ok(MaxOrderAdaptor {
            manager: manager,
            parameters: parameters,
            order: order,
            clusters: ClusterList::new(),
            pairs: Vec::new(),
        })
    }

    /// Get the cutoff used to build the pair list
    pub fn cutoff(&self) -> f64 {
        self.parameters.cutoff
    }

    /// Get the parameters of this adaptor as a JSON string
    pub fn parameters(&self) -> String {
        serde_json::to_string(&self.parameters).expect("failed to serialize to JSON")
    }

    #[cfg(test)]
    pub(crate) fn cluster_list(&self) -> &ClusterList {
        &self.clusters
    }
}

impl<M: ClusterManager> ClusterManager for MaxOrderAdaptor<'_, M> {
    fn size(&self) -> usize {
        self.manager.size()
    }

    fn max_order(&self) -> usize {
        self.order
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
        if order == self.order {
            Ok(self.clusters.len())
        } else {
            self.manager.nb_clusters(order)
        }
    }

    fn nb_neighbours(&self, order: usize, cluster: usize) -> Result<usize, Error> {
        if order + 1 == self.order {
            self.clusters.nb_neighbours(cluster).ok_or_else(|| Error::InvalidParameter(format!(
                "cluster index {} is out of bounds at order {}", cluster, order,
            )))
        } else if order + 1 < self.order {
            self.manager.nb_neighbours(order, cluster)
        } else {
            Err(Error::UnsupportedOrder(format!(
                "this chain stops at order {}, can not look up children at order {}",
                self.order, order + 1,
            )))
        }
    }

    fn neighbour(&self, order: usize, cluster: usize, index: usize) -> Result<usize, Error> {
        if order + 1 == self.order {
            self.clusters.neighbour(cluster, index).ok_or_else(|| Error::InvalidParameter(format!(
                "neighbour {} of cluster {} is out of bounds at order {}", index, cluster, order,
            )))
        } else if order + 1 < self.order {
            self.manager.neighbour(order, cluster, index)
        } else {
            Err(Error::UnsupportedOrder(format!(
                "this chain stops at order {}, can not look up children at order {}",
                self.order, order + 1,
            )))
        }
    }

    fn pair(&self, index: usize) -> Result<Pair, Error> {
        if self.order == 2 {
            self.pairs.get(index).copied().ok_or_else(|| Error::InvalidParameter(format!(
                "pair index {} is out of bounds", index,
            )))
        } else {
            self.manager.pair(index)
        }
    }

    fn offset(&self, counters: &[usize]) -> Result<usize, Error> {
        let length = counters.len();
        if length == 0 {
            return Err(Error::InvalidParameter("counters can not be empty".into()));
        }

        if length >= self.order {
            return Err(Error::UnsupportedOrder(format!(
                "counters of length {} can not be resolved by a chain stopping at order {}",
                length, self.order,
            )));
        }

        if length + 1 == self.order {
            let parent = if length == 1 {
                // an atom's linear index is the atom index itself
                counters[0]
            } else {
                self.manager.offset(&counters[..length - 1])? + counters[length - 1]
            };

            self.clusters.offset(parent).ok_or_else(|| Error::InvalidParameter(format!(
                "counters {:?} do not identify a stored cluster", counters,
            )))
        } else {
            self.manager.offset(counters)
        }
    }

    fn update(&mut self) -> Result<(), Error> {
        self.manager.update()?;

        if self.order == 2 {
            let positions = self.manager.positions();
            let cell = self.manager.cell();
            let periodic = self.manager.periodic();

            let (clusters, pairs) = match self.parameters.list {
                ListKind::Half => half_neighbour_list(positions, cell, periodic, self.parameters.cutoff)?,
                ListKind::Full => full_neighbour_list(positions, cell, periodic, self.parameters.cutoff)?,
            };

            self.clusters = clusters;
            self.pairs = pairs;
        } else {
            self.clusters = extend_clusters(&*self.manager)?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::structures::test_utils::test_structure;
    use crate::managers::for_each_cluster;

    use super::*;

    fn parameters(cutoff: f64) -> MaxOrderParameters {
        MaxOrderParameters { cutoff: cutoff, list: ListKind::Half }
    }

    fn clusters_at<M: ClusterManager>(manager: &M, order: usize) -> Vec<Vec<usize>> {
        let mut clusters = Vec::new();
        for_each_cluster(manager, order, |_, tuple| {
            clusters.push(tuple.to_vec());
            Ok(())
        }).unwrap();
        return clusters;
    }

    #[test]
    fn pair_layer() {
        let mut structure = test_structure("chain-3");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.5)).unwrap();
        pairs.update().unwrap();

        assert_eq!(pairs.max_order(), 2);
        assert_eq!(pairs.nb_clusters(1).unwrap(), 3);
        assert_eq!(pairs.nb_clusters(2).unwrap(), 1);

        assert_eq!(pairs.nb_neighbours(1, 0).unwrap(), 1);
        assert_eq!(pairs.neighbour(1, 0, 0).unwrap(), 1);
        assert_eq!(pairs.nb_neighbours(1, 1).unwrap(), 0);
        assert_eq!(pairs.nb_neighbours(1, 2).unwrap(), 0);

        let pair = pairs.pair(0).unwrap();
        assert_eq!((pair.first, pair.second), (0, 1));
        assert_eq!(pair.distance, 1.0);

        assert_eq!(clusters_at(&pairs, 2), [[0, 1]]);
    }

    #[test]
    fn triplets_from_chain() {
        let mut structure = test_structure("chain-4");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.1)).unwrap();
        let mut triplets = MaxOrderAdaptor::new(&mut pairs, parameters(1.1)).unwrap();
        triplets.update().unwrap();

        assert_eq!(triplets.max_order(), 3);
        assert_eq!(triplets.nb_clusters(2).unwrap(), 3);
        assert_eq!(clusters_at(&triplets, 2), [[0, 1], [1, 2], [2, 3]]);

        // (0, 1, 3) is not a triplet: atoms 1 and 3 are not neighbors
        assert_eq!(triplets.nb_clusters(3).unwrap(), 2);
        assert_eq!(clusters_at(&triplets, 3), [[0, 1, 2], [1, 2, 3]]);

        // pair data is still reachable from the top of the chain
        assert_eq!(triplets.pair(1).unwrap().second, 2);
    }

    #[test]
    fn no_triplets_without_shared_neighbours() {
        let mut structure = test_structure("chain-3");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.5)).unwrap();
        let mut triplets = MaxOrderAdaptor::new(&mut pairs, parameters(1.5)).unwrap();
        triplets.update().unwrap();

        assert_eq!(triplets.nb_clusters(2).unwrap(), 1);
        assert_eq!(triplets.nb_clusters(3).unwrap(), 0);
    }

    #[test]
    fn quadruplets_from_chain() {
        let mut structure = test_structure("chain-5");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.1)).unwrap();
        let mut triplets = MaxOrderAdaptor::new(&mut pairs, parameters(1.1)).unwrap();
        let mut quadruplets = MaxOrderAdaptor::new(&mut triplets, parameters(1.1)).unwrap();
        quadruplets.update().unwrap();

        assert_eq!(quadruplets.max_order(), 4);
        assert_eq!(clusters_at(&quadruplets, 3), [[0, 1, 2], [1, 2, 3], [2, 3, 4]]);
        assert_eq!(clusters_at(&quadruplets, 4), [[0, 1, 2, 3], [1, 2, 3, 4]]);
    }

    #[test]
    fn canonical_and_prefix_sharing() {
        let mut structure = test_structure("methane");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.5)).unwrap();
        let mut triplets = MaxOrderAdaptor::new(&mut pairs, parameters(1.5)).unwrap();
        triplets.update().unwrap();

        // the four hydrogen are all neighbors of the carbon, and only of the
        // carbon
        assert_eq!(triplets.nb_clusters(2).unwrap(), 4);
        assert_eq!(triplets.nb_clusters(3).unwrap(), 6);

        let all_triplets = clusters_at(&triplets, 3);
        for tuple in &all_triplets {
            // canonical: strictly increasing past the first element, so no
            // repeated atom either
            assert!(tuple[1] < tuple[2]);
            assert!(tuple[0] != tuple[1] && tuple[0] != tuple[2]);
        }

        // prefix sharing: the children of each pair, prefixed with it,
        // reconstruct exactly the triplets starting with this pair
        let mut reconstructed = Vec::new();
        for (pair_i, pair) in clusters_at(&triplets, 2).iter().enumerate() {
            for index in 0..triplets.nb_neighbours(2, pair_i).unwrap() {
                let atom = triplets.neighbour(2, pair_i, index).unwrap();
                let mut tuple = pair.clone();
                tuple.push(atom);
                reconstructed.push(tuple);
            }
        }
        assert_eq!(reconstructed, all_triplets);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut structure = test_structure("chain-4");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.1)).unwrap();
        let mut triplets = MaxOrderAdaptor::new(&mut pairs, parameters(1.1)).unwrap();

        triplets.update().unwrap();
        let first = triplets.cluster_list().clone();

        triplets.update().unwrap();
        assert_eq!(*triplets.cluster_list(), first);
        assert_eq!(clusters_at(&triplets, 2), [[0, 1], [1, 2], [2, 3]]);
    }

    #[test]
    fn offsets() {
        let mut structure = test_structure("chain-4");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.1)).unwrap();
        let mut triplets = MaxOrderAdaptor::new(&mut pairs, parameters(1.1)).unwrap();
        triplets.update().unwrap();

        // pairs are (0,1), (1,2), (2,3): the pairs of atom i start at linear
        // index i
        assert_eq!(triplets.offset(&[0]).unwrap(), 0);
        assert_eq!(triplets.offset(&[1]).unwrap(), 1);
        assert_eq!(triplets.offset(&[2]).unwrap(), 2);
        assert_eq!(triplets.offset(&[3]).unwrap(), 3);

        // triplets are (0,1,2) and (1,2,3): the pair (0,1) owns the first,
        // the pair (1,2) owns the second
        assert_eq!(triplets.offset(&[0, 0]).unwrap(), 0);
        assert_eq!(triplets.offset(&[1, 0]).unwrap(), 1);
        assert_eq!(triplets.offset(&[2, 0]).unwrap(), 2);

        assert!(matches!(triplets.offset(&[]), Err(Error::InvalidParameter(_))));
        assert!(matches!(triplets.offset(&[0, 0, 0]), Err(Error::UnsupportedOrder(_))));
    }

    #[test]
    fn full_list_layer() {
        let mut structure = test_structure("cscl");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, MaxOrderParameters {
            cutoff: 0.9,
            list: ListKind::Full,
        }).unwrap();
        pairs.update().unwrap();

        // each atom sees the 8 images of the other one in the cubic cell
        assert_eq!(pairs.nb_clusters(2).unwrap(), 16);
        assert_eq!(pairs.nb_neighbours(1, 0).unwrap(), 8);
        assert_eq!(pairs.nb_neighbours(1, 1).unwrap(), 8);

        for index in 0..8 {
            assert_eq!(pairs.neighbour(1, 0, index).unwrap(), 1);
            let pair = pairs.pair(index).unwrap();
            approx::assert_ulps_eq!(pair.distance, f64::sqrt(3.0) / 2.0, epsilon = 1e-12);
        }
    }

    #[test]
    fn configuration_errors() {
        let mut structure = test_structure("chain-3");
        let result = MaxOrderAdaptor::new(&mut structure, parameters(0.0));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let result = MaxOrderAdaptor::new(&mut structure, parameters(f64::INFINITY));
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn unsupported_order_queries() {
        let mut structure = test_structure("chain-3");
        let mut pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.5)).unwrap();
        pairs.update().unwrap();

        assert!(matches!(pairs.nb_clusters(3), Err(Error::UnsupportedOrder(_))));
        assert!(matches!(pairs.nb_neighbours(2, 0), Err(Error::UnsupportedOrder(_))));
        assert!(matches!(pairs.neighbour(2, 0, 0), Err(Error::UnsupportedOrder(_))));
        assert!(matches!(pairs.offset(&[0, 0]), Err(Error::UnsupportedOrder(_))));
    }

    #[test]
    fn parameters_as_json() {
        let mut structure = test_structure("chain-3");
        let pairs = MaxOrderAdaptor::new(&mut structure, parameters(1.5)).unwrap();
        assert_eq!(pairs.parameters(), "{\"cutoff\":1.5,\"list\":\"half\"}");

        let parameters: MaxOrderParameters = serde_json::from_str("{\"cutoff\":2.0}").unwrap();
        assert_eq!(parameters.list, ListKind::Half);
    }
}
