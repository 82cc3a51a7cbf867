#![warn(clippy::all, clippy::pedantic)]

// disable some style lints
#![allow(clippy::needless_return, clippy::must_use_candidate)]
#![allow(clippy::redundant_field_names, clippy::redundant_closure_for_method_calls)]
#![allow(clippy::missing_errors_doc, clippy::missing_panics_doc, clippy::module_name_repetitions)]

#![allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_wrap, clippy::cast_lossless, clippy::cast_sign_loss)]

// Tests lints
#![cfg_attr(test, allow(clippy::float_cmp))]

pub mod types;
pub use types::{Vector3D, Matrix3};

mod errors;
pub use self::errors::Error;

pub mod structures;
pub use structures::{Structure, UnitCell, CellShape};

mod clusters;
pub use self::clusters::ClusterList;

pub mod neighbors;
pub use neighbors::{Pair, CellShift, half_neighbour_list, full_neighbour_list};

pub mod managers;
pub use managers::{ClusterManager, for_each_cluster};
pub use managers::{MaxOrderAdaptor, MaxOrderParameters, ListKind, SpeciesFilter};
