//! Knowflow Core Types and Definitions
//!
//! This crate provides the foundational types shared by every Knowflow crate.
//! It includes:
//!
//! - **Identifiers**: Label-derived node identifiers and the label interner ([`identifier`] module)
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Geometry**: Basic geometric types ([`geometry`] module)
//! - **Semantic**: The diagram model of nodes and edges ([`semantic`] module)
//! - **Classification**: Keyword heuristics assigning node and edge categories ([`classify`] module)

pub mod classify;
pub mod color;
pub mod geometry;
pub mod identifier;
pub mod semantic;
