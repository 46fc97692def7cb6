//! WebIDL Core Types
//!
//! This crate provides the foundational types shared by the WebIDL parser
//! and its front ends. It includes:
//!
//! - **Identifiers**: Efficient string-interned identifiers ([`identifier::Id`])
//! - **Spans**: Byte ranges into source text ([`span::Span`])
//! - **Locations**: Registered source files and renderable positions ([`location`] module)

pub mod identifier;
pub mod location;
pub mod span;
