//! Domain models for docket
//!
//! Contains the WBS aggregation logic without any I/O concerns. Every
//! operation here is total: malformed input degrades to a default value.

mod code;
mod document;
mod element;
mod graph;
pub mod lenient;
mod progress;
mod task_state;
mod tree;

pub use code::{depth, parent_code, sort_key, SortKey};
pub use document::{
    AiContext, Blocker, Constraint, DecisionNode, Meta, NextAction, Overview, Reference,
    RelatedDoc, Risk, TaskDocument, TaskEntry, Thinking, WbsDocument,
};
pub use element::{status_label, ElementKind, ElementStatus, WorkBreakdownElement};
pub use graph::{DependencyEdge, DependencyGraph};
pub use progress::{
    remaining, CategoryBreakdown, Progress, StatusBreakdown, DEFAULT_WORK_CATEGORY,
    WORK_CATEGORIES,
};
pub use task_state::{
    collect_category_tasks, collect_task_states, CategoryTask, CategoryTasks, DocumentOrigin,
    TaskState, TaskSummary,
};
pub use tree::{Hierarchy, ParentEdge};
