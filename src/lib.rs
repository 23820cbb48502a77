// SPDX-License-Identifier: MIT OR Apache-2.0

//! docrank - Persona-driven semantic ranking of document sections
//!
//! Shared modules for the docrank CLI tool.

pub mod config;
pub mod document;
pub mod embedding;
pub mod errors;
pub mod extract;
pub mod output;
pub mod pipeline;
pub mod query;
pub mod rank;
