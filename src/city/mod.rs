//! City layer - cells, their storage, and the neighbour graph

pub mod arena;
pub mod cell;
pub mod neighbours;

pub use arena::CellArena;
pub use cell::{Cell, MeshBounds, Transform};
pub use neighbours::{
    add_self_to_neighbours, asymmetric_edges, insert_cell, remove_self_from_neighbours,
    retract_cell, update_neighbour_set,
};
