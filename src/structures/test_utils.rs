use crate::{Matrix3, Vector3D};
use super::{UnitCell, Structure};

pub(crate) fn test_structure(name: &str) -> Structure {
    match name {
        "methane" => get_methane(),
        "water" => get_water(),
        "cscl" => get_cscl(),
        "fcc" => get_fcc(),
        "chain-3" => get_chain(&[0.0, 1.0, 5.0]),
        "chain-4" => get_chain(&[0.0, 1.0, 2.0, 3.0]),
        "chain-5" => get_chain(&[0.0, 1.0, 2.0, 3.0, 4.0]),
        _ => panic!("unknown test structure {}", name)
    }
}

fn get_methane() -> Structure {
    let mut structure = Structure::new(UnitCell::cubic(5.0), [true; 3]).unwrap();
    structure.add_atom(6, Vector3D::new(5.0000, 5.0000, 5.0000));
    structure.add_atom(1, Vector3D::new(5.5288, 5.1610, 5.9359));
    structure.add_atom(1, Vector3D::new(5.2051, 5.8240, 4.3214));
    structure.add_atom(1, Vector3D::new(5.3345, 4.0686, 4.5504));
    structure.add_atom(1, Vector3D::new(3.9315, 4.9463, 5.1921));
    return structure;
}

fn get_water() -> Structure {
    let mut structure = Structure::new(UnitCell::cubic(10.0), [true; 3]).unwrap();
    // species do not have to be atomic numbers
    structure.add_atom(-42, Vector3D::new(0.0, 0.0, 0.0));
    structure.add_atom(1, Vector3D::new(0.0, 0.75545, -0.58895));
    structure.add_atom(1, Vector3D::new(0.0, -0.75545, -0.58895));
    return structure;
}

/// CsCl structure: the primitive unit cell is the cubic cell with side
/// length one.
fn get_cscl() -> Structure {
    let mut structure = Structure::new(UnitCell::cubic(1.0), [true; 3]).unwrap();
    structure.add_atom(17, Vector3D::new(0.0, 0.0, 0.0));
    structure.add_atom(55, Vector3D::new(0.5, 0.5, 0.5));
    return structure;
}

/// A single atom in an fcc primitive cell, nearest image distance
/// 1.5 * sqrt(2)
fn get_fcc() -> Structure {
    let cell = UnitCell::try_from_matrix(Matrix3::new([
        [0.0, 1.5, 1.5],
        [1.5, 0.0, 1.5],
        [1.5, 1.5, 0.0],
    ])).unwrap();
    let mut structure = Structure::new(cell, [true; 3]).unwrap();
    structure.add_atom(29, Vector3D::new(0.0, 0.0, 0.0));
    return structure;
}

/// Atoms on the x axis at the given coordinates, without any periodicity
fn get_chain(coordinates: &[f64]) -> Structure {
    let mut structure = Structure::new(UnitCell::infinite(), [false; 3]).unwrap();
    for &x in coordinates {
        structure.add_atom(1, Vector3D::new(x, 0.0, 0.0));
    }
    return structure;
}
