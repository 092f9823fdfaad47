//! Rendering of extracted snippets into rule file content.

use crate::config::{OutputFormat, RuleApplication};
use crate::output::OutputInfo;
use crate::snippet::Snippet;

const RULE_LINE: &str = "----------------------------------------";

/// Per-output rendering settings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RenderOptions {
    /// Frontmatter mode for `.mdc` output
    pub rule_application: RuleApplication,

    /// Frontmatter description, defaults to the output file name
    pub description: Option<String>,
}

/// Renders snippets into the content of one rule file.
///
/// Returns an empty string when nothing is renderable, which tells the
/// caller not to write a file at all.
#[must_use]
pub fn render(
    snippets: &[Snippet],
    output_info: &OutputInfo,
    format: OutputFormat,
    options: &RenderOptions,
) -> String {
    let blocks: Vec<String> = snippets
        .iter()
        .map(render_snippet)
        .filter(|block| !block.is_empty())
        .collect();

    if blocks.is_empty() {
        return String::new();
    }

    let mut content = String::new();

    if format == OutputFormat::Mdc {
        let description = options
            .description
            .as_deref()
            .unwrap_or(&output_info.output_file_name);
        content.push_str(&render_frontmatter(description, &options.rule_application));
    }

    content.push_str(&blocks.join("\n\n"));
    content.push_str("\n\n");
    content.push_str(&format_at_tag(&output_info.at_tag));

    content
}

/// Renders the `---` delimited `.mdc` header, including the trailing blank line.
fn render_frontmatter(description: &str, rule_application: &RuleApplication) -> String {
    let application = match rule_application {
        RuleApplication::Glob(pattern) => format!("glob: \"{pattern}\""),
        RuleApplication::AlwaysApply(enabled) => format!("alwaysApply: {enabled}"),
    };

    format!("---\ndescription: {description}\n{application}\n---\n\n")
}

/// Renders one snippet block, or nothing if it lacks a title or code.
fn render_snippet(snippet: &Snippet) -> String {
    if snippet.title.is_empty() || snippet.code.is_empty() {
        return String::new();
    }

    format!(
        "TITLE: {title}\n\
         DESCRIPTION: {description}\n\
         SOURCE: {source}\n\
         LANGUAGE: {language}\n\
         CODE:\n\
         ```{language}\n\
         {code}\n\
         ```\n\
         \n\
         {RULE_LINE}",
        title = snippet.title,
        description = snippet.description,
        source = snippet.source,
        language = snippet.language,
        code = snippet.code,
    )
}

fn format_at_tag(tag: &str) -> String {
    if tag.is_empty() || tag.contains('@') {
        tag.to_string()
    } else {
        format!("@{tag}")
    }
}
