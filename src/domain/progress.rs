//! Progress roll-up
//!
//! Completion is a flat aggregate over tasks and milestones: summary nodes
//! never count, and only `done` earns credit (no partial credit for `wip`).

use serde::Serialize;

use super::element::{ElementStatus, WorkBreakdownElement};

/// Completion statistics over work elements
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct Progress {
    /// Done elements as a percentage of all work elements
    pub task_pct: f64,
    /// Done hours as a percentage of all estimated hours
    pub hours_pct: f64,
    pub done_count: usize,
    pub total_count: usize,
    pub done_hours: f64,
    pub total_hours: f64,
}

impl Progress {
    /// Aggregates progress from a flat element list
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a WorkBreakdownElement>) -> Self {
        let mut progress = Self::default();

        for element in elements.into_iter().filter(|e| e.is_work()) {
            progress.total_count += 1;
            progress.total_hours += element.hours();

            if element.is_done() {
                progress.done_count += 1;
                progress.done_hours += element.hours();
            }
        }

        progress.task_pct = percentage(progress.done_count as f64, progress.total_count as f64);
        progress.hours_pct = percentage(progress.done_hours, progress.total_hours);
        progress
    }

    /// Returns true when there is nothing to measure
    pub fn is_empty(&self) -> bool {
        self.total_count == 0
    }
}

/// Zero when the total is empty or the sums overflowed
fn percentage(part: f64, total: f64) -> f64 {
    if total > 0.0 {
        let pct = part / total * 100.0;
        if pct.is_finite() {
            return pct;
        }
    }
    0.0
}

/// Work elements that are not done, in input order
pub fn remaining<'a>(
    elements: impl IntoIterator<Item = &'a WorkBreakdownElement>,
) -> Vec<&'a WorkBreakdownElement> {
    elements
        .into_iter()
        .filter(|e| e.is_work() && !e.is_done())
        .collect()
}

/// Work element counts per status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StatusBreakdown {
    pub todo: usize,
    pub wip: usize,
    pub done: usize,
}

impl StatusBreakdown {
    /// Counts work elements by status; unknown statuses are not counted
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a WorkBreakdownElement>) -> Self {
        let mut breakdown = Self::default();
        for element in elements.into_iter().filter(|e| e.is_work()) {
            match element.status {
                ElementStatus::Todo => breakdown.todo += 1,
                ElementStatus::Wip => breakdown.wip += 1,
                ElementStatus::Done => breakdown.done += 1,
                ElementStatus::Other(_) => {}
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.todo + self.wip + self.done
    }

    /// Non-zero `(status, count)` pairs in `todo, wip, done` order
    pub fn entries(&self) -> Vec<(ElementStatus, usize)> {
        [
            (ElementStatus::Todo, self.todo),
            (ElementStatus::Wip, self.wip),
            (ElementStatus::Done, self.done),
        ]
        .into_iter()
        .filter(|(_, count)| *count > 0)
        .collect()
    }
}

/// Work categories tracked in the category distribution, in display order
pub const WORK_CATEGORIES: [&str; 4] = ["investigation", "design", "development", "verification"];

/// Category assumed when an element names none
pub const DEFAULT_WORK_CATEGORY: &str = "development";

/// Work element counts per category
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CategoryBreakdown {
    counts: [usize; WORK_CATEGORIES.len()],
}

impl CategoryBreakdown {
    /// Counts work elements by category; unknown categories are not counted
    pub fn from_elements<'a>(elements: impl IntoIterator<Item = &'a WorkBreakdownElement>) -> Self {
        let mut breakdown = Self::default();
        for element in elements.into_iter().filter(|e| e.is_work()) {
            let category = element.category.as_deref().unwrap_or(DEFAULT_WORK_CATEGORY);
            if let Some(idx) = WORK_CATEGORIES.iter().position(|c| *c == category) {
                breakdown.counts[idx] += 1;
            }
        }
        breakdown
    }

    pub fn total(&self) -> usize {
        self.counts.iter().sum()
    }

    pub fn count(&self, category: &str) -> usize {
        WORK_CATEGORIES
            .iter()
            .position(|c| *c == category)
            .map(|idx| self.counts[idx])
            .unwrap_or(0)
    }

    /// Non-zero `(category, count)` pairs in display order
    pub fn entries(&self) -> Vec<(&'static str, usize)> {
        WORK_CATEGORIES
            .iter()
            .zip(self.counts.iter())
            .filter(|(_, count)| **count > 0)
            .map(|(category, count)| (*category, *count))
            .collect()
    }
}
