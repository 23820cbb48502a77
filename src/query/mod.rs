// SPDX-License-Identifier: MIT OR Apache-2.0

//! Persona-aware query expansion.

pub mod expander;
pub mod vocab;

pub use expander::{EnrichedQuery, ExpansionTables, QueryDescriptor, QueryExpander};
