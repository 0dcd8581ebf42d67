//! Link and file path checks
//!
//! Documents reference other files by project-relative path; rendered
//! Markdown references them relative to its own directory. Both are checked
//! for existence here. Remote URLs are never fetched.

use std::fs;
use std::path::{Component, Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;
use serde_yaml::Value;

use super::config::LayoutConfig;
use super::project::absolute_path;
use super::Project;

fn markdown_link() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\]\(([^)]+)\)").expect("valid link pattern"))
}

fn is_remote(value: &str) -> bool {
    let lower = value.trim().to_lowercase();
    lower.starts_with("http://") || lower.starts_with("https://")
}

/// Link targets declared in a document
///
/// Collects `references[].url`, `overview.related_docs` (titled links or
/// plain strings) and `target.related_docs`, trimmed and deduplicated in
/// first-seen order.
pub fn declared_links(document: &Value) -> Vec<String> {
    let mut links = Vec::new();

    for reference in sequence(document.get("references")) {
        links.extend(reference.get("url").and_then(Value::as_str).map(str::to_string));
    }

    let overview_docs = document.get("overview").and_then(|o| o.get("related_docs"));
    for doc in sequence(overview_docs) {
        let url = match doc {
            Value::String(s) => Some(s.as_str()),
            Value::Mapping(_) => doc.get("url").and_then(Value::as_str),
            _ => None,
        };
        links.extend(url.map(str::to_string));
    }

    let target_docs = document.get("target").and_then(|t| t.get("related_docs"));
    for doc in sequence(target_docs) {
        links.extend(doc.as_str().map(str::to_string));
    }

    let mut seen = std::collections::HashSet::new();
    links
        .into_iter()
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty())
        .filter(|link| seen.insert(link.clone()))
        .collect()
}

fn sequence(value: Option<&Value>) -> &[Value] {
    value
        .and_then(Value::as_sequence)
        .map(Vec::as_slice)
        .unwrap_or(&[])
}

/// Checks that every local path a document declares exists
///
/// `file://` URLs are checked as given, `/`-prefixed paths and bare relative
/// paths resolve against `base` (the project root). Returns one message per
/// missing path.
pub fn missing_file_paths(document: &Value, base: &Path) -> Vec<String> {
    declared_links(document)
        .into_iter()
        .filter(|link| !is_remote(link))
        .filter_map(|link| {
            let resolved = resolve_declared_path(&link, base);
            (!resolved.exists()).then(|| format!("File path does not exist: {}", link))
        })
        .collect()
}

fn resolve_declared_path(link: &str, base: &Path) -> PathBuf {
    if link.to_lowercase().starts_with("file://") {
        PathBuf::from(&link["file://".len()..])
    } else if let Some(stripped) = link.strip_prefix('/') {
        base.join(stripped.trim_start_matches('/'))
    } else {
        base.join(link)
    }
}

/// Relative link targets in Markdown content
///
/// Anchors (`#...`), `http(s)` URLs and `mailto:` links are excluded.
pub fn relative_links(content: &str) -> Vec<String> {
    markdown_link()
        .captures_iter(content)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|href| !href.is_empty())
        .filter(|href| !href.starts_with('#'))
        .filter(|href| !is_remote(href))
        .filter(|href| !href.starts_with("mailto:"))
        .collect()
}

/// Checks the relative links of one rendered Markdown file
///
/// Links resolve against the directory holding the file. A `#fragment` is
/// ignored when checking the target.
pub fn broken_markdown_links(md_path: &Path) -> Vec<String> {
    if !md_path.exists() {
        return vec![format!("File does not exist: {}", md_path.display())];
    }

    let content = match fs::read_to_string(md_path) {
        Ok(content) => content,
        Err(err) => return vec![format!("Failed to read {}: {}", md_path.display(), err)],
    };

    let base = absolute_path(md_path)
        .parent()
        .map(Path::to_path_buf)
        .unwrap_or_default();

    relative_links(&content)
        .into_iter()
        .filter_map(|href| {
            let target = href.split('#').next().unwrap_or_default();
            let resolved = normalize(&base.join(target));
            (!resolved.exists()).then(|| {
                format!(
                    "Broken link in {}: {} → {}",
                    md_path.display(),
                    href,
                    resolved.display()
                )
            })
        })
        .collect()
}

/// Checks every rendered document of the project
pub fn broken_project_links(project: &Project) -> Vec<String> {
    project
        .available_categories()
        .iter()
        .flat_map(|category| {
            project
                .doc_types(category)
                .into_iter()
                .map(move |doc_type| project.human_document_path(category, &doc_type))
        })
        .filter(|path| path.exists())
        .flat_map(|path| broken_markdown_links(&path))
        .collect()
}

/// Rewrites document links so they work from a rendered Markdown file
///
/// Local paths are taken relative to the project root. Links to a YAML
/// source are redirected to its rendered Markdown, then made relative to
/// the output directory. Remote URLs, `file://` URLs and paths that do not
/// exist are returned unchanged (apart from the redirect).
#[derive(Debug, Clone)]
pub struct LinkResolver {
    project_root: PathBuf,
    output_dir: PathBuf,
    ai_document: String,
    human_document: String,
}

impl LinkResolver {
    pub fn new(project_root: &Path, output_path: &Path, layout: &LayoutConfig) -> Self {
        let output_dir = output_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_default();

        Self {
            project_root: absolute_path(project_root),
            output_dir: absolute_path(&output_dir),
            ai_document: layout.ai_document.clone(),
            human_document: layout.human_document.clone(),
        }
    }

    pub fn resolve(&self, url: &str) -> String {
        let url = url.trim();
        if url.is_empty() || is_remote(url) || url.to_lowercase().starts_with("file://") {
            return url.to_string();
        }

        let link = self.redirect_to_markdown(url);
        let target = self.project_root.join(link.trim_start_matches('/'));
        if !target.exists() {
            return link;
        }

        relative_path(&self.output_dir, &absolute_path(&target))
            .map(|path| path.to_string_lossy().replace('\\', "/"))
            .unwrap_or(link)
    }

    fn redirect_to_markdown(&self, url: &str) -> String {
        let yml_variant = self.ai_document.replace(".yaml", ".yml");
        if url.contains(&self.ai_document) {
            url.replace(&self.ai_document, &self.human_document)
        } else if url.contains(&yml_variant) {
            url.replace(&yml_variant, &self.human_document)
        } else {
            url.to_string()
        }
    }
}

/// Lexically removes `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                normalized.pop();
            }
            other => normalized.push(other),
        }
    }
    normalized
}

/// Path of `to` relative to the directory `from`; both must be absolute
fn relative_path(from: &Path, to: &Path) -> Option<PathBuf> {
    if !from.is_absolute() || !to.is_absolute() {
        return None;
    }

    let from = normalize(from);
    let to = normalize(to);
    let from: Vec<Component> = from.components().collect();
    let to: Vec<Component> = to.components().collect();
    let common = from.iter().zip(&to).take_while(|(a, b)| a == b).count();

    let mut relative = PathBuf::new();
    for _ in common..from.len() {
        relative.push("..");
    }
    for component in &to[common..] {
        relative.push(component);
    }

    if relative.as_os_str().is_empty() {
        relative.push(".");
    }
    Some(relative)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn yaml(source: &str) -> Value {
        serde_yaml::from_str(source).unwrap()
    }

    #[test]
    fn collects_declared_links() {
        let document = yaml(
            r#"
references:
  - {title: Spec, url: " docs/spec.md "}
  - {title: Web, url: "https://example.com"}
  - {title: No url}
overview:
  related_docs:
    - {title: Design, url: docs/design.md}
    - docs/spec.md
    - 42
target:
  related_docs: [docs/target.md, ""]
"#,
        );

        assert_eq!(
            declared_links(&document),
            vec![
                "docs/spec.md",
                "https://example.com",
                "docs/design.md",
                "docs/target.md"
            ]
        );
    }

    #[test]
    fn missing_paths_reported() {
        let dir = TempDir::new().unwrap();
        fs::create_dir_all(dir.path().join("docs")).unwrap();
        fs::write(dir.path().join("docs/exists.md"), "").unwrap();

        let document = yaml(
            r#"
references:
  - {url: docs/exists.md}
  - {url: /docs/exists.md}
  - {url: docs/missing.md}
  - {url: "https://example.com/missing"}
"#,
        );

        let missing = missing_file_paths(&document, dir.path());
        assert_eq!(missing, vec!["File path does not exist: docs/missing.md"]);
    }

    #[test]
    fn extracts_relative_markdown_links() {
        let content = "[a](../x.md) [b](#anchor) [c](https://x.y) [d](mailto:a@b.c) [e]( y.md )";
        assert_eq!(relative_links(content), vec!["../x.md", "y.md"]);
    }

    #[test]
    fn broken_links_in_markdown() {
        let dir = TempDir::new().unwrap();
        let human = dir.path().join("design/api/human");
        fs::create_dir_all(&human).unwrap();
        fs::write(dir.path().join("design/api/notes.md"), "").unwrap();
        let md = human.join("document.md");
        fs::write(&md, "[ok](../notes.md#top) [bad](../missing.md)").unwrap();

        let broken = broken_markdown_links(&md);
        assert_eq!(broken.len(), 1);
        assert!(broken[0].contains("../missing.md"));
    }

    #[test]
    fn missing_markdown_file() {
        let dir = TempDir::new().unwrap();
        let broken = broken_markdown_links(&dir.path().join("nope.md"));
        assert_eq!(broken.len(), 1);
    }

    #[test]
    fn relative_path_between_dirs() {
        assert_eq!(
            relative_path(Path::new("/p/a/b/human"), Path::new("/p/a/c/human/document.md")),
            Some(PathBuf::from("../../c/human/document.md"))
        );
        assert_eq!(
            relative_path(Path::new("/p/a"), Path::new("/p/a/x.md")),
            Some(PathBuf::from("x.md"))
        );
        assert_eq!(relative_path(Path::new("a"), Path::new("/b")), None);
    }

    #[test]
    fn resolver_redirects_sources_to_rendered_markdown() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        let target = root.join("categories/design/api/human");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("document.md"), "").unwrap();
        let output = root.join("categories/overview/wbs/human/document.md");
        fs::create_dir_all(output.parent().unwrap()).unwrap();

        let resolver = LinkResolver::new(root, &output, &LayoutConfig::default());

        assert_eq!(
            resolver.resolve("categories/design/api/ai/document.yaml"),
            "../../../design/api/human/document.md"
        );
        assert_eq!(resolver.resolve("https://example.com"), "https://example.com");
        assert_eq!(resolver.resolve("docs/missing.md"), "docs/missing.md");
    }

    #[cfg(unix)]
    #[test]
    fn resolver_is_stable_through_symlinked_root_before_output_exists() {
        let dir = TempDir::new().unwrap();
        let real = dir.path().join("real");
        let target = real.join("categories/design/api/human");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("document.md"), "").unwrap();
        let link = dir.path().join("link");
        std::os::unix::fs::symlink(&real, &link).unwrap();

        let output = link.join("categories/overview/wbs/human/document.md");
        let source = "categories/design/api/ai/document.yaml";
        let expected = "../../../design/api/human/document.md";

        let first = LinkResolver::new(&link, &output, &LayoutConfig::default()).resolve(source);
        fs::create_dir_all(output.parent().unwrap()).unwrap();
        let second = LinkResolver::new(&link, &output, &LayoutConfig::default()).resolve(source);

        assert_eq!(first, expected);
        assert_eq!(second, expected);
    }
}
