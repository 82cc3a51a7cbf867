use ndarray::Array3;

use crate::{Error, UnitCell, Vector3D};
use super::CellShift;

/// Maximal number of bins, we need to use this to prevent having too many
/// bins with a small unit cell and a large cutoff
const MAX_NUMBER_OF_BINS: f64 = 1e5;

/// A neighboring bin of a given bin: the wrapped bin coordinates, and the
/// cell shift accumulated while wrapping around the periodic axes.
#[derive(Debug, Clone)]
pub(crate) struct NeighbourBin {
    pub bin: [usize; 3],
    pub shift: CellShift,
}

/// The bin grid partitions the unit cell into boxes with edges of at least
/// one cutoff along each reciprocal axis, and assigns every atom to exactly
/// one box by flooring its fractional coordinates.
///
/// For every box, the list of boxes to search for neighbors within one
/// cutoff is precomputed, wrapping around the axes flagged periodic and
/// stopping at the boundary along the other axes. Atoms located outside the
/// cell along a non-periodic axis are clamped into the boundary boxes.
#[derive(Debug, Clone)]
pub(crate) struct BinGrid {
    /// atoms in each bin, in ascending index order
    bins: Array3<Vec<usize>>,
    /// precomputed neighbor list of each bin
    neighbour_bins: Array3<Vec<NeighbourBin>>,
    /// bin and wrapping shift assigned to each atom
    assignments: Vec<([usize; 3], CellShift)>,
}

impl BinGrid {
    /// Create a grid for the given geometry and `cutoff`, and bin all
    /// `positions` into it.
    pub fn new(
        cell: &UnitCell,
        periodic: [bool; 3],
        cutoff: f64,
        positions: &[Vector3D],
    ) -> Result<BinGrid, Error> {
        if !cutoff.is_finite() || cutoff <= 0.0 {
            return Err(Error::InvalidParameter(format!(
                "cutoff must be a positive finite number, got {}", cutoff,
            )));
        }

        let distances = cell.distances_between_faces();
        let mut faces = [0.0; 3];
        for axis in 0..3 {
            if periodic[axis] {
                if !(distances[axis].is_finite() && distances[axis] > 0.0) {
                    return Err(Error::InvalidParameter(format!(
                        "cell has a zero reciprocal length along periodic axis {}", axis,
                    )));
                }
                faces[axis] = distances[axis];
            } else if distances[axis].is_finite() && distances[axis] > 0.0 {
                faces[axis] = distances[axis];
            } else {
                // no boundaries along this axis, pretend the face distance
                // is 1 and let the clamping below deal with outliers
                faces[axis] = 1.0;
            }
        }

        let mut nbins = [
            f64::clamp(f64::trunc(faces[0] / cutoff), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(faces[1] / cutoff), 1.0, f64::INFINITY),
            f64::clamp(f64::trunc(faces[2] / cutoff), 1.0, f64::INFINITY),
        ];

        // limit memory consumption by ensuring we have less than
        // `MAX_NUMBER_OF_BINS` bins to look through
        let total = nbins[0] * nbins[1] * nbins[2];
        if total > MAX_NUMBER_OF_BINS {
            // set the total number of bins close to the maximum, while
            // keeping roughly the ratio of bins in each direction
            let ratio_x_y = nbins[0] / nbins[1];
            let ratio_y_z = nbins[1] / nbins[2];

            nbins[2] = f64::trunc(f64::cbrt(MAX_NUMBER_OF_BINS / (ratio_x_y * ratio_y_z * ratio_y_z)));
            nbins[1] = f64::trunc(ratio_y_z * nbins[2]);
            nbins[0] = f64::trunc(ratio_x_y * nbins[1]);
        }

        let nbins = [nbins[0] as usize, nbins[1] as usize, nbins[2] as usize];

        // number of bins to search in each direction to make sure all
        // possible pairs below the cutoff are accounted for
        let mut n_search = [0_i32; 3];
        for axis in 0..3 {
            n_search[axis] = f64::ceil(cutoff * nbins[axis] as f64 / faces[axis]) as i32;
            if n_search[axis] < 1 {
                n_search[axis] = 1;
            }

            // a single bin with nothing to wrap into needs no search at all
            if nbins[axis] == 1 && !periodic[axis] {
                n_search[axis] = 0;
            }
        }

        let mut neighbour_bins = Array3::from_elem(nbins, Vec::new());
        for ((x, y, z), neighbours) in neighbour_bins.indexed_iter_mut() {
            let current = [x as i32, y as i32, z as i32];
            for delta_x in -n_search[0]..=n_search[0] {
                for delta_y in -n_search[1]..=n_search[1] {
                    'deltas: for delta_z in -n_search[2]..=n_search[2] {
                        let target = [
                            current[0] + delta_x,
                            current[1] + delta_y,
                            current[2] + delta_z,
                        ];

                        let mut bin = [0; 3];
                        let mut shift = [0; 3];
                        for axis in 0..3 {
                            if periodic[axis] {
                                let (quotient, remainder) = divmod(target[axis], nbins[axis]);
                                shift[axis] = quotient;
                                bin[axis] = remainder;
                            } else if target[axis] < 0 || target[axis] >= nbins[axis] as i32 {
                                // nothing beyond the boundary of a
                                // non-periodic axis
                                continue 'deltas;
                            } else {
                                bin[axis] = target[axis] as usize;
                            }
                        }

                        neighbours.push(NeighbourBin {
                            bin: bin,
                            shift: CellShift(shift),
                        });
                    }
                }
            }
        }

        let mut bins = Array3::from_elem(nbins, Vec::new());
        let mut assignments = Vec::with_capacity(positions.len());
        for (index, &position) in positions.iter().enumerate() {
            let fractional = if cell.is_infinite() {
                position
            } else {
                cell.fractional(position)
            };

            let mut bin = [0; 3];
            let mut shift = [0; 3];
            for axis in 0..3 {
                let target = f64::floor(fractional[axis] * nbins[axis] as f64) as i32;
                if periodic[axis] {
                    let (quotient, remainder) = divmod(target, nbins[axis]);
                    shift[axis] = quotient;
                    bin[axis] = remainder;
                } else {
                    bin[axis] = i32::clamp(target, 0, nbins[axis] as i32 - 1) as usize;
                }
            }

            bins[bin].push(index);
            assignments.push((bin, CellShift(shift)));
        }

        Ok(BinGrid {
            bins: bins,
            neighbour_bins: neighbour_bins,
            assignments: assignments,
        })
    }

    /// Get the number of bins along each axis
    #[cfg(test)]
    pub fn nbins(&self) -> [usize; 3] {
        let (x, y, z) = self.bins.dim();
        [x, y, z]
    }

    /// Get the bin and wrapping shift assigned to the given atom
    pub fn assignment(&self, atom: usize) -> ([usize; 3], CellShift) {
        self.assignments[atom]
    }

    /// Get the precomputed neighbor list of the given bin
    pub fn neighbour_bins(&self, bin: [usize; 3]) -> &[NeighbourBin] {
        &self.neighbour_bins[bin]
    }

    /// Get the atoms inside the given bin, in ascending index order
    pub fn atoms_in(&self, bin: [usize; 3]) -> &[usize] {
        &self.bins[bin]
    }
}

/// Compute both quotient and remainder of the division of a by b, following
/// Python convention: the remainder has the same sign as `b`.
fn divmod(a: i32, b: usize) -> (i32, usize) {
    debug_assert!(b < (i32::MAX as usize));
    let b = b as i32;
    let mut quotient = a / b;
    let mut remainder = a % b;
    if remainder < 0 {
        remainder += b;
        quotient -= 1;
    }
    return (quotient, remainder as usize);
}
