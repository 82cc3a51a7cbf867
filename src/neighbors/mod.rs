//! Construction of order-2 cluster lists (neighbor lists) from pairwise
//! cutoff tests.
//!
//! Two builders produce the same compressed sparse output: a direct O(N²)
//! half list where each unordered pair is stored once, and a bin-accelerated
//! full list where each atom owns its complete neighborhood, including every
//! periodic image as a distinct entry.

use log::warn;

use crate::{Error, Matrix3, UnitCell, Vector3D};
use crate::clusters::ClusterList;

mod bins;
pub(crate) use self::bins::BinGrid;

/// A cell shift represents the displacement along cell axes between the
/// actual position of an atom and a periodic image of this atom.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub struct CellShift(pub [i32; 3]);

impl std::ops::Add<CellShift> for CellShift {
    type Output = CellShift;

    fn add(mut self, rhs: CellShift) -> CellShift {
        self.0[0] += rhs[0];
        self.0[1] += rhs[1];
        self.0[2] += rhs[2];
        return self;
    }
}

impl std::ops::Sub<CellShift> for CellShift {
    type Output = CellShift;

    fn sub(mut self, rhs: CellShift) -> CellShift {
        self.0[0] -= rhs[0];
        self.0[1] -= rhs[1];
        self.0[2] -= rhs[2];
        return self;
    }
}

impl std::ops::Index<usize> for CellShift {
    type Output = i32;

    fn index(&self, index: usize) -> &i32 {
        &self.0[index]
    }
}

impl CellShift {
    /// Compute the shift vector in Cartesian coordinates, using the given
    /// cell matrix (stored in row major order).
    pub fn cartesian(&self, cell: &Matrix3) -> Vector3D {
        let x = cell[0][0] * f64::from(self[0]) + cell[1][0] * f64::from(self[1]) + cell[2][0] * f64::from(self[2]);
        let y = cell[0][1] * f64::from(self[0]) + cell[1][1] * f64::from(self[1]) + cell[2][1] * f64::from(self[2]);
        let z = cell[0][2] * f64::from(self[0]) + cell[1][2] * f64::from(self[1]) + cell[2][2] * f64::from(self[2]);
        Vector3D::new(x, y, z)
    }
}

/// Data attached to an order-2 cluster. The vector between the two atoms is
/// `position[second] - position[first] + shift * cell`, which accounts for
/// periodic boundary conditions.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pair {
    /// index of the first atom in the pair
    pub first: usize,
    /// index of the second atom in the pair
    pub second: usize,
    /// distance between the two atoms
    pub distance: f64,
    /// vector from the first atom to the second atom, accounting for
    /// periodic boundary conditions
    pub vector: Vector3D,
    /// how many cell shifts were applied to the `second` atom to create this
    /// pair
    pub cell_shift: CellShift,
}

/// Build a half neighbor list by direct pairwise cutoff testing, in O(N²).
///
/// For every pair of atoms `i < j`, the pair is recorded as a child of `i`
/// when the minimum image distance is below `cutoff`. Each unordered pair
/// appears exactly once, and each atom owns a (possibly empty) slice of the
/// output, with neighbors in ascending index order.
#[time_graph::instrument(name = "half_neighbour_list")]
pub fn half_neighbour_list(
    positions: &[Vector3D],
    cell: &UnitCell,
    periodic: [bool; 3],
    cutoff: f64,
) -> Result<(ClusterList, Vec<Pair>), Error> {
    if !cutoff.is_finite() || cutoff <= 0.0 {
        return Err(Error::InvalidParameter(format!(
            "cutoff must be a positive finite number, got {}", cutoff,
        )));
    }

    let cutoff2 = cutoff * cutoff;
    let mut list = ClusterList::new();
    let mut pairs = Vec::new();

    for (first, &position) in positions.iter().enumerate() {
        list.start_parent();
        for (second, &other) in positions.iter().enumerate().skip(first + 1) {
            let mut vector = other - position;
            let shift = cell.vector_image(&mut vector, periodic);

            let distance2 = vector.norm2();
            if distance2 <= cutoff2 {
                if distance2 < 1e-3 {
                    warn!(
                        "atoms {} and {} are very close to one another ({} A)",
                        first, second, distance2.sqrt()
                    );
                }

                list.push_neighbour(second);
                pairs.push(Pair {
                    first: first,
                    second: second,
                    distance: distance2.sqrt(),
                    vector: vector,
                    cell_shift: CellShift(shift),
                });
            }
        }
    }

    list.set_offsets();
    return Ok((list, pairs));
}

/// Build a full neighbor list with the bin grid, in O(N·k).
///
/// Each atom owns its complete neighborhood: for a pair of distinct atoms
/// both directions are recorded, and an atom close to a periodic boundary
/// sees each image of its neighbors (including images of itself) as a
/// distinct entry with a distinct cell shift. Per-atom slices are sorted by
/// (neighbor index, shift) so rebuilding from the same structure gives
/// identical arrays.
#[time_graph::instrument(name = "full_neighbour_list")]
pub fn full_neighbour_list(
    positions: &[Vector3D],
    cell: &UnitCell,
    periodic: [bool; 3],
    cutoff: f64,
) -> Result<(ClusterList, Vec<Pair>), Error> {
    let grid = BinGrid::new(cell, periodic, cutoff, positions)?;

    let cell_matrix = cell.matrix();
    let cutoff2 = cutoff * cutoff;

    let mut list = ClusterList::new();
    let mut pairs = Vec::new();
    let mut candidates = Vec::new();

    for (first, &position) in positions.iter().enumerate() {
        candidates.clear();

        let (bin, first_shift) = grid.assignment(first);
        for neighbour_bin in grid.neighbour_bins(bin) {
            for &second in grid.atoms_in(neighbour_bin.bin) {
                let (_, second_shift) = grid.assignment(second);
                let shift = neighbour_bin.shift + first_shift - second_shift;

                if first == second && shift == CellShift([0, 0, 0]) {
                    // an atom is not its own neighbor, only its images are
                    continue;
                }

                let mut vector = positions[second] - position;
                vector += shift.cartesian(&cell_matrix);

                let distance2 = vector.norm2();
                if distance2 <= cutoff2 {
                    if distance2 < 1e-3 {
                        warn!(
                            "atoms {} and {} are very close to one another ({} A)",
                            first, second, distance2.sqrt()
                        );
                    }

                    candidates.push(Pair {
                        first: first,
                        second: second,
                        distance: distance2.sqrt(),
                        vector: vector,
                        cell_shift: shift,
                    });
                }
            }
        }

        candidates.sort_unstable_by_key(|pair| (pair.second, pair.cell_shift));

        list.start_parent();
        for pair in &candidates {
            list.push_neighbour(pair.second);
            pairs.push(*pair);
        }
    }

    list.set_offsets();
    return Ok((list, pairs));
}
