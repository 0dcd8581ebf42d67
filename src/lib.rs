//! Docket - Validate structured project documents and render them to Markdown
//!
//! Documents are YAML sources laid out per category and doc_type. Docket
//! validates them against JSON Schemas and renders them to Markdown with
//! Mermaid diagrams. WBS documents get a progress roll-up over their work
//! breakdown elements.

pub mod cli;
pub mod domain;
pub mod render;
pub mod storage;

pub use domain::{
    DependencyGraph, ElementStatus, Hierarchy, Progress, TaskState, WbsDocument,
    WorkBreakdownElement,
};
