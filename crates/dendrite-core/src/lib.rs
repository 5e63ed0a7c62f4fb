//! Dendrite Core Types and Definitions
//!
//! This crate provides the foundational types for the Dendrite mind-map
//! layout engine. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Content**: The node content model ([`content`] module)
//! - **Measure**: The content measurement contract and measurers ([`measure`] module)
//! - **Tree**: The arena-backed node tree ([`tree`] module)

pub mod content;
pub mod geometry;
pub mod identifier;
pub mod measure;
pub mod tree;
