//! The `UnitCell` type represents the enclosing box of a simulated structure.
//!
//! Periodicity is not a property of the cell itself: the structure carries one
//! flag per axis, and the minimum image reduction below only folds the axes
//! actually flagged periodic.
use crate::{Error, Matrix3, Vector3D};

/// The shape of a cell determines how periodic boundary conditions can be
/// computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CellShape {
    /// Infinite unit cell, with no boundaries
    Infinite,
    /// Orthorhombic unit cell, with cuboid shape
    Orthorhombic,
    /// Triclinic unit cell, with arbitrary parallelepiped shape
    Triclinic,
}

/// An `UnitCell` defines the structure's physical boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitCell {
    /// Unit cell matrix, rows are the cell vectors
    matrix: Matrix3,
    /// Transpose of the unit cell matrix, cached from matrix
    transpose: Matrix3,
    /// Inverse of the transpose of the unit cell matrix, cached from matrix
    inverse: Matrix3,
    /// Unit cell shape
    shape: CellShape,
}

impl UnitCell {
    /// Create an infinite unit cell
    pub fn infinite() -> UnitCell {
        UnitCell {
            matrix: Matrix3::zero(),
            transpose: Matrix3::zero(),
            inverse: Matrix3::zero(),
            shape: CellShape::Infinite,
        }
    }

    /// Create an orthorhombic unit cell, with side lengths `a, b, c`.
    pub fn orthorhombic(a: f64, b: f64, c: f64) -> UnitCell {
        assert!(a > 0.0 && b > 0.0 && c > 0.0, "cell lengths must be positive");
        let matrix = Matrix3::new([
            [a, 0.0, 0.0],
            [0.0, b, 0.0],
            [0.0, 0.0, c],
        ]);
        UnitCell {
            matrix: matrix,
            transpose: matrix,
            inverse: matrix.inverse(),
            shape: CellShape::Orthorhombic,
        }
    }

    /// Create a cubic unit cell, with side lengths `length, length, length`.
    pub fn cubic(length: f64) -> UnitCell {
        UnitCell::orthorhombic(length, length, length)
    }

    /// Create an unit cell from an arbitrary cell matrix, validating that the
    /// matrix describes a non-degenerate cell. An all-zero matrix is accepted
    /// and gives an infinite cell.
    pub fn try_from_matrix(matrix: Matrix3) -> Result<UnitCell, Error> {
        let is_close_0 = |value: f64| f64::abs(value) < 1e-9;

        let all_zero = (0..3).all(|i| (0..3).all(|j| is_close_0(matrix[i][j])));
        if all_zero {
            return Ok(UnitCell::infinite());
        }

        if matrix.determinant().abs() < 1e-6 {
            return Err(Error::InvalidParameter(
                "unit cell matrix is degenerate, the cell vectors do not span space".into()
            ));
        }

        let is_diagonal = is_close_0(matrix[0][1]) && is_close_0(matrix[0][2])
            && is_close_0(matrix[1][0]) && is_close_0(matrix[1][2])
            && is_close_0(matrix[2][0]) && is_close_0(matrix[2][1]);

        let shape = if is_diagonal {
            CellShape::Orthorhombic
        } else {
            CellShape::Triclinic
        };

        Ok(UnitCell {
            matrix: matrix,
            transpose: matrix.transposed(),
            inverse: matrix.transposed().inverse(),
            shape: shape,
        })
    }

    /// Get the cell shape
    pub fn shape(&self) -> CellShape {
        self.shape
    }

    /// Check if this unit cell is infinite, *i.e.* if it does not define any
    /// boundaries.
    pub fn is_infinite(&self) -> bool {
        self.shape() == CellShape::Infinite
    }

    /// Get the matricial representation of the unit cell
    pub fn matrix(&self) -> Matrix3 {
        self.matrix
    }

    /// Get the first vector of the cell
    fn a_vector(&self) -> Vector3D {
        self.matrix[0].into()
    }

    /// Get the second vector of the cell
    fn b_vector(&self) -> Vector3D {
        self.matrix[1].into()
    }

    /// Get the third vector of the cell
    fn c_vector(&self) -> Vector3D {
        self.matrix[2].into()
    }

    /// Get the distances between opposite faces of the unit cell. These are
    /// the inverses of the reciprocal lattice vector lengths.
    pub fn distances_between_faces(&self) -> Vector3D {
        if self.shape == CellShape::Infinite {
            return Vector3D::new(f64::INFINITY, f64::INFINITY, f64::INFINITY);
        }

        let (a, b, c) = (self.a_vector(), self.b_vector(), self.c_vector());
        // plane normal vectors
        let na = (b ^ c).normalized();
        let nb = (c ^ a).normalized();
        let nc = (a ^ b).normalized();

        Vector3D::new(f64::abs(na * a), f64::abs(nb * b), f64::abs(nc * c))
    }

    /// Get the fractional representation of the `vector` in this cell
    pub fn fractional(&self, vector: Vector3D) -> Vector3D {
        // this needs to use the inverse of the transpose of the matrix, since
        // we only have code to multiply a vector by a matrix on the left
        return self.inverse * vector;
    }

    /// Get the Cartesian representation of the `fractional` vector in this
    /// cell
    pub fn cartesian(&self, fractional: Vector3D) -> Vector3D {
        return self.transpose * fractional;
    }

    /// Reduce `vector` to its minimum image along the axes flagged in
    /// `periodic`, and return the integer cell shift that was applied. For a
    /// fully periodic cubic cell of side `L`, the reduced vector has all
    /// components in `[-L/2, L/2)`.
    pub fn vector_image(&self, vector: &mut Vector3D, periodic: [bool; 3]) -> [i32; 3] {
        let mut shift = [0, 0, 0];
        if self.is_infinite() || !periodic.iter().any(|&p| p) {
            return shift;
        }

        let mut fractional = self.fractional(*vector);
        for (axis, &periodic) in periodic.iter().enumerate() {
            if periodic {
                let folds = f64::round(fractional[axis]);
                fractional[axis] -= folds;
                shift[axis] = -(folds as i32);
            }
        }
        *vector = self.cartesian(fractional);

        return shift;
    }
}
