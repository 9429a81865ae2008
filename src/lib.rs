#![warn(missing_debug_implementations)]
#![deny(non_ascii_idents)]
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]
#![deny(unit_bindings)]
#![warn(unused_crate_dependencies)]
#![warn(unused_qualifications)]

//! A heuristic search engine for SAS+ planning tasks: delete-relaxation
//! heuristics (h^add, h^max, h^FF), LM-Cut with incremental variants, and
//! A* / enforced hill climbing / lazy best-first drivers over a packed
//! state pool.

pub mod search;

#[cfg(test)]
mod test_utils;
