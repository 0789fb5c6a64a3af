//! Schelling City - a segregation model over a fixed city layout
//!
//! Static residencies are seeded with red, green, and blue households and
//! vacancies. Each tick, schools detected by an external camera pipeline are
//! placed into the city as heavy-weight neighbours, and every household that
//! sees too few neighbours of its own type moves.

pub mod city;
pub mod core;
pub mod detection;
pub mod render;
pub mod simulation;
pub mod spatial;
pub mod world;
