//! Tessera Core Types and Definitions
//!
//! This crate provides the foundational types shared by every Tessera crate:
//!
//! - **Kinds**: The closed set of diagram grammars ([`kind::DiagramKind`]) and
//!   the user's requested kind ([`kind::RequestedKind`])
//! - **Themes**: The persisted light/dark preference ([`theme::ThemePreference`])
//! - **Colors**: Color handling with CSS color support ([`color::Color`])
//! - **Vector output**: Rendered SVG markup and its intrinsic size ([`vector`] module)
//! - **Export formats**: The supported download formats ([`export::ExportFormat`])

pub mod color;
pub mod export;
pub mod kind;
pub mod theme;
pub mod vector;
