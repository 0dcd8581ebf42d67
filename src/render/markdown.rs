//! Markdown and Mermaid building blocks shared by renderers

use crate::domain::{AiContext, Overview, Reference};
use crate::storage::LinkResolver;

/// Thinking items drawn in the mindmap
const MINDMAP_ITEM_LIMIT: usize = 8;
const MINDMAP_LABEL_LIMIT: usize = 25;
const FLOW_LABEL_LIMIT: usize = 40;

/// Line-oriented Markdown builder
#[derive(Debug, Default)]
pub struct Markdown {
    lines: Vec<String>,
}

impl Markdown {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn line(&mut self, line: impl Into<String>) -> &mut Self {
        self.lines.push(line.into());
        self
    }

    pub fn blank(&mut self) -> &mut Self {
        self.line("")
    }

    /// Heading followed by a blank line
    pub fn heading(&mut self, level: usize, text: &str) -> &mut Self {
        self.line(format!("{} {}", "#".repeat(level), text)).blank()
    }

    /// Appends a pre-built section; empty sections are dropped
    pub fn section(&mut self, section: &str) -> &mut Self {
        let section = section.trim_end();
        if !section.is_empty() {
            self.line(section).blank();
        }
        self
    }

    /// A fenced Mermaid block followed by a blank line
    pub fn mermaid<I, S>(&mut self, body: I) -> &mut Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.line("```mermaid");
        for line in body {
            self.line(line);
        }
        self.line("```").blank()
    }

    /// A table with one header row; cells are escaped
    pub fn table<R>(&mut self, headers: &[&str], rows: R) -> &mut Self
    where
        R: IntoIterator<Item = Vec<String>>,
    {
        self.line(format!("| {} |", headers.join(" | ")));
        self.line(format!("|{}", "---|".repeat(headers.len())));
        for row in rows {
            let cells: Vec<String> = row.iter().map(|c| table_cell(c)).collect();
            self.line(format!("| {} |", cells.join(" | ")));
        }
        self
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn finish(self) -> String {
        self.lines.join("\n")
    }
}

/// Escapes a value for use inside a table cell
fn table_cell(value: &str) -> String {
    let value = value.trim();
    if value.is_empty() {
        return "-".to_string();
    }
    value.replace('|', "\\|").replace('\n', " ")
}

/// First `limit` characters of `text`
pub fn truncate(text: &str, limit: usize) -> &str {
    match text.char_indices().nth(limit) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

/// First `limit` characters of `text`, with `...` when cut
pub fn ellipsize(text: &str, limit: usize) -> String {
    let short = truncate(text, limit);
    if short.len() < text.len() {
        format!("{}...", short)
    } else {
        short.to_string()
    }
}

/// Text or `-` when blank
pub fn or_dash(text: &str) -> &str {
    if text.trim().is_empty() {
        "-"
    } else {
        text
    }
}

/// Mermaid node id: letters, digits and `_` only, `n` when empty
pub fn mermaid_id(raw: &str) -> String {
    let id: String = raw
        .chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect();
    if id.is_empty() {
        "n".to_string()
    } else {
        id
    }
}

/// Escapes double quotes for a quoted Mermaid label
pub fn mermaid_text(text: &str) -> String {
    text.replace('"', "\\\"")
}

/// Mermaid node label, quoted when it holds characters Mermaid treats as syntax
pub fn mermaid_label(label: &str, limit: usize) -> String {
    if label.is_empty() {
        return "\"\"".to_string();
    }
    let short = ellipsize(label, limit);
    if short.chars().any(|c| "():[],".contains(c)) {
        format!("\"{}\"", mermaid_text(&short))
    } else {
        short
    }
}

/// Rewrites a link for the output location when a resolver is present
pub fn link_target(url: &str, links: Option<&LinkResolver>) -> String {
    match links {
        Some(resolver) => resolver.resolve(url),
        None => url.trim().to_string(),
    }
}

/// Current thinking, next actions and decision flow
pub fn ai_context_section(context: &AiContext) -> String {
    let mut md = Markdown::new();

    let items = context
        .current_thinking
        .as_ref()
        .map(|thinking| thinking.items())
        .unwrap_or_default();
    if !items.is_empty() {
        md.heading(2, "Current thinking");
        let mut body = vec!["mindmap".to_string(), "  root((Current thinking))".to_string()];
        for (i, item) in items.iter().take(MINDMAP_ITEM_LIMIT).enumerate() {
            let short = ellipsize(item, MINDMAP_LABEL_LIMIT);
            body.push(format!("    item{} \"{}\"", i + 1, mermaid_text(&short)));
        }
        md.mermaid(body);
        for item in &items {
            md.line(format!("- {}", item));
        }
        md.blank();
    }

    if !context.next_actions.is_empty() {
        md.heading(2, "Next actions");
        let mut body = vec!["flowchart TB".to_string()];
        let mut previous: Option<String> = None;
        for action in &context.next_actions {
            let id = mermaid_id(&action.id);
            body.push(format!("    {}[{}]", id, mermaid_label(&action.label, FLOW_LABEL_LIMIT)));
            if let Some(previous) = &previous {
                body.push(format!("    {} --> {}", previous, id));
            }
            previous = Some(id);
        }
        md.mermaid(body);
        for action in &context.next_actions {
            match &action.detail {
                Some(detail) => md.line(format!("- **{}**: {}", or_dash(&action.label), detail)),
                None => md.line(format!("- {}", or_dash(&action.label))),
            };
        }
        md.blank();
    }

    if !context.decision_flow.is_empty() {
        md.heading(2, "Decision flow");
        let mut body = vec!["flowchart TB".to_string()];
        let mut declared = std::collections::HashSet::new();
        for node in &context.decision_flow {
            let id = mermaid_id(&node.id);
            if declared.insert(id.clone()) {
                body.push(format!("    {}[{}]", id, mermaid_label(&node.label, FLOW_LABEL_LIMIT)));
            }
            for next in node.next.iter().chain(&node.next_condition) {
                body.push(format!("    {} --> {}", id, mermaid_id(next)));
            }
        }
        md.mermaid(body);
    }

    md.finish().trim_end().to_string()
}

/// Background and purpose
///
/// Related documents are only checked for existence, never listed.
pub fn overview_section(overview: &Overview) -> String {
    let mut md = Markdown::new();

    if let Some(background) = &overview.background {
        md.heading(2, "Background").line(background.trim_end()).blank();
    }

    if let Some(goal) = &overview.goal {
        md.heading(2, "Purpose").line(goal.trim_end()).blank();
    }

    if md.is_empty() {
        return String::new();
    }
    format!("{}\n", md.finish().trim_end())
}

/// References as a link list
pub fn references_section(references: &[Reference], links: Option<&LinkResolver>) -> String {
    if references.is_empty() {
        return String::new();
    }

    let mut md = Markdown::new();
    md.heading(2, "References");
    for reference in references {
        md.line(format!(
            "- [{}]({})",
            or_dash(&reference.title),
            link_target(&reference.url, links)
        ));
    }
    md.blank();
    md.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{DecisionNode, NextAction, RelatedDoc, Thinking};

    #[test]
    fn builder_joins_lines() {
        let mut md = Markdown::new();
        md.heading(1, "Title").line("body");
        assert_eq!(md.finish(), "# Title\n\nbody");
    }

    #[test]
    fn table_escapes_cells() {
        let mut md = Markdown::new();
        md.table(&["A", "B"], vec![vec!["x|y".to_string(), "".to_string()]]);
        assert_eq!(md.finish(), "| A | B |\n|---|---|\n| x\\|y | - |");
    }

    #[test]
    fn truncation_counts_characters() {
        assert_eq!(truncate("日本語テキスト", 3), "日本語");
        assert_eq!(truncate("abc", 10), "abc");
        assert_eq!(ellipsize("abcdef", 3), "abc...");
        assert_eq!(ellipsize("abc", 3), "abc");
    }

    #[test]
    fn mermaid_ids_are_sanitized() {
        assert_eq!(mermaid_id("T-1.2"), "T_1_2");
        assert_eq!(mermaid_id(""), "n");
        assert_eq!(mermaid_id("step_1"), "step_1");
    }

    #[test]
    fn mermaid_labels_quoted_when_needed() {
        assert_eq!(mermaid_label("plain", 40), "plain");
        assert_eq!(mermaid_label("call f(x)", 40), "\"call f(x)\"");
        assert_eq!(mermaid_label("say \"hi\", ok", 40), "\"say \\\"hi\\\", ok\"");
        assert_eq!(mermaid_label("", 40), "\"\"");
    }

    #[test]
    fn ai_context_renders_all_parts() {
        let context = AiContext {
            current_thinking: Some(Thinking::Text("first\n\nsecond".to_string())),
            next_actions: vec![
                NextAction {
                    id: "a1".into(),
                    label: "Write".into(),
                    detail: Some("the draft".into()),
                },
                NextAction {
                    id: "a2".into(),
                    label: "Review".into(),
                    detail: None,
                },
            ],
            decision_flow: vec![DecisionNode {
                id: "d1".into(),
                label: "Ready?".into(),
                next: Some("d2".into()),
                next_condition: vec!["d3".into()],
            }],
        };

        let section = ai_context_section(&context);
        assert!(section.starts_with("## Current thinking"));
        assert!(section.contains("    item1 \"first\""));
        assert!(section.contains("- second"));
        assert!(section.contains("    a1 --> a2"));
        assert!(section.contains("- **Write**: the draft"));
        assert!(section.contains("- Review"));
        assert!(section.contains("    d1 --> d2\n    d1 --> d3"));
        assert!(section.ends_with("```"));
    }

    #[test]
    fn empty_ai_context_renders_nothing() {
        assert_eq!(ai_context_section(&AiContext::default()), "");
    }

    #[test]
    fn overview_without_related_docs() {
        let overview = Overview {
            background: Some("Why".into()),
            goal: Some("What".into()),
            related_docs: vec![RelatedDoc::Text("docs/a.md".into())],
        };

        let section = overview_section(&overview);
        assert_eq!(section, "## Background\n\nWhy\n\n## Purpose\n\nWhat\n");
    }

    #[test]
    fn empty_overview_renders_nothing() {
        assert_eq!(overview_section(&Overview::default()), "");
    }

    #[test]
    fn references_list() {
        let references = vec![Reference {
            title: "".into(),
            url: "https://example.com".into(),
        }];
        assert_eq!(
            references_section(&references, None),
            "## References\n\n- [-](https://example.com)\n"
        );
    }
}
