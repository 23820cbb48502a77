// SPDX-License-Identifier: MIT OR Apache-2.0

//! Section extraction and quality filtering.

pub mod extractor;
pub mod filter;

pub use extractor::{Section, SectionExtractor, SectionKind};
pub use filter::{FilterConfig, SectionFilter};
