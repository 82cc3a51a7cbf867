use ndarray::ArrayView2;

use crate::{Error, Pair, Vector3D};
use crate::managers::ClusterManager;

mod cell;
pub use self::cell::{UnitCell, CellShape};

#[cfg(test)]
pub(crate) mod test_utils;

/// A `Structure` holds the atomic data of a single simulation frame:
/// Cartesian positions, integer species, the unit cell and one periodicity
/// flag per cell axis.
///
/// The structure is the bottom-most layer of every manager chain, and only
/// stores order-1 clusters (the atoms themselves). Higher orders are
/// constructed by wrapping it in [`MaxOrderAdaptor`](crate::MaxOrderAdaptor)
/// layers.
#[derive(Debug, Clone)]
pub struct Structure {
    positions: Vec<Vector3D>,
    types: Vec<i32>,
    cell: UnitCell,
    periodic: [bool; 3],
}

impl Structure {
    /// Create a new empty structure with the given unit cell and periodicity
    /// flags.
    ///
    /// A periodic axis requires actual cell boundaries: flagging any axis of
    /// an infinite cell periodic is a configuration error.
    pub fn new(cell: UnitCell, periodic: [bool; 3]) -> Result<Structure, Error> {
        if cell.is_infinite() && periodic.iter().any(|&p| p) {
            return Err(Error::InvalidParameter(
                "an infinite cell can not have periodic boundary conditions".into()
            ));
        }

        Ok(Structure {
            positions: Vec::new(),
            types: Vec::new(),
            cell: cell,
            periodic: periodic,
        })
    }

    /// Create a structure from the loader's dense data: a 3×N position
    /// matrix (one column per atom), N species identifiers, the unit cell
    /// and the periodicity flags.
    pub fn from_arrays(
        positions: ArrayView2<f64>,
        types: &[i32],
        cell: UnitCell,
        periodic: [bool; 3],
    ) -> Result<Structure, Error> {
        if positions.nrows() != 3 {
            return Err(Error::InvalidParameter(format!(
                "expected a 3 x N position matrix, got {} rows", positions.nrows(),
            )));
        }

        if positions.ncols() != types.len() {
            return Err(Error::InvalidParameter(format!(
                "got {} positions for {} species", positions.ncols(), types.len(),
            )));
        }

        let mut structure = Structure::new(cell, periodic)?;
        for (column, &atomic_type) in positions.columns().into_iter().zip(types) {
            structure.add_atom(atomic_type, Vector3D::new(column[0], column[1], column[2]));
        }

        Ok(structure)
    }

    /// Add an atom with the given species and position to this structure
    pub fn add_atom(&mut self, atomic_type: i32, position: Vector3D) {
        self.types.push(atomic_type);
        self.positions.push(position);
    }
}

impl ClusterManager for Structure {
    fn size(&self) -> usize {
        self.positions.len()
    }

    fn max_order(&self) -> usize {
        1
    }

    fn positions(&self) -> &[Vector3D] {
        &self.positions
    }

    fn atom_types(&self) -> &[i32] {
        &self.types
    }

    fn cell(&self) -> &UnitCell {
        &self.cell
    }

    fn periodic(&self) -> [bool; 3] {
        self.periodic
    }

    fn nb_clusters(&self, order: usize) -> Result<usize, Error> {
        if order == 1 {
            Ok(self.positions.len())
        } else {
            Err(Error::UnsupportedOrder(format!(
                "a structure only stores atoms, wrap it in an adaptor to construct order {}",
                order,
            )))
        }
    }

    fn nb_neighbours(&self, order: usize, _cluster: usize) -> Result<usize, Error> {
        Err(Error::UnsupportedOrder(format!(
            "a structure does not store clusters of order {}, wrap it in an adaptor",
            order + 1,
        )))
    }

    fn neighbour(&self, order: usize, _cluster: usize, _index: usize) -> Result<usize, Error> {
        Err(Error::UnsupportedOrder(format!(
            "a structure does not store clusters of order {}, wrap it in an adaptor",
            order + 1,
        )))
    }

    fn pair(&self, _index: usize) -> Result<Pair, Error> {
        Err(Error::UnsupportedOrder(
            "a structure does not store pairs, wrap it in an adaptor".into()
        ))
    }

    fn offset(&self, _counters: &[usize]) -> Result<usize, Error> {
        Err(Error::UnsupportedOrder(
            "a structure does not store offsets, wrap it in an adaptor".into()
        ))
    }

    fn update(&mut self) -> Result<(), Error> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use ndarray::arr2;

    use super::*;

    #[test]
    fn add_atoms() {
        let mut structure = Structure::new(UnitCell::cubic(10.0), [true; 3]).unwrap();
        structure.add_atom(3, Vector3D::new(2.0, 3.0, 4.0));
        structure.add_atom(1, Vector3D::new(1.0, 3.0, 4.0));
        structure.add_atom(3, Vector3D::new(5.0, 3.0, 4.0));

        assert_eq!(structure.size(), 3);
        assert_eq!(structure.nb_clusters(1).unwrap(), 3);
        assert_eq!(structure.atom_types(), &[3, 1, 3]);
        assert_eq!(structure.positions(), &[
            Vector3D::new(2.0, 3.0, 4.0),
            Vector3D::new(1.0, 3.0, 4.0),
            Vector3D::new(5.0, 3.0, 4.0),
        ]);
    }

    #[test]
    fn from_arrays() {
        let positions = arr2(&[
            [0.0, 1.0, 5.0],
            [0.0, 0.0, 0.0],
            [0.0, 0.0, 0.0],
        ]);
        let structure = Structure::from_arrays(
            positions.view(), &[1, 1, 8], UnitCell::infinite(), [false; 3],
        ).unwrap();

        assert_eq!(structure.size(), 3);
        assert_eq!(structure.positions()[2], Vector3D::new(5.0, 0.0, 0.0));
        assert_eq!(structure.atom_types(), &[1, 1, 8]);
    }

    #[test]
    fn validation() {
        let result = Structure::new(UnitCell::infinite(), [false, true, false]);
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let positions = arr2(&[[0.0], [0.0], [0.0]]);
        let result = Structure::from_arrays(
            positions.view(), &[1, 6], UnitCell::infinite(), [false; 3],
        );
        assert!(matches!(result, Err(Error::InvalidParameter(_))));

        let positions = arr2(&[[0.0], [0.0]]);
        let result = Structure::from_arrays(
            positions.view(), &[1], UnitCell::infinite(), [false; 3],
        );
        assert!(matches!(result, Err(Error::InvalidParameter(_))));
    }

    #[test]
    fn unsupported_queries() {
        let structure = Structure::new(UnitCell::infinite(), [false; 3]).unwrap();
        assert!(matches!(structure.nb_clusters(2), Err(Error::UnsupportedOrder(_))));
        assert!(matches!(structure.nb_neighbours(1, 0), Err(Error::UnsupportedOrder(_))));
        assert!(matches!(structure.pair(0), Err(Error::UnsupportedOrder(_))));
        assert!(matches!(structure.offset(&[0]), Err(Error::UnsupportedOrder(_))));
    }
}
