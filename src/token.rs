//! Markdown tokenization.
//!
//! Flattens the `comrak` AST into a linear stream of block tokens in
//! document order. Snippet extraction only ever looks at this stream.

use comrak::nodes::{AstNode, NodeValue};
use comrak::{Arena, Options, parse_document};

/// A single block-level token of a markdown document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Token {
    /// Start of a heading; the next token carries its text.
    HeadingOpen {
        /// Heading level (1-6)
        level: u8,
    },
    /// End of a heading.
    HeadingClose,
    /// Start of a paragraph.
    ParagraphOpen,
    /// End of a paragraph.
    ParagraphClose,
    /// Plain text of a heading, paragraph or table cell.
    Inline(String),
    /// Fenced code block.
    Fence {
        /// Raw info string after the opening fence
        info: String,
        /// Raw block content
        content: String,
    },
    /// Any other block (indented code, HTML, thematic break).
    Other,
}

impl Token {
    /// Creates an inline text token.
    #[must_use]
    pub fn inline(text: impl Into<String>) -> Self {
        Self::Inline(text.into())
    }

    /// Creates a fenced code block token.
    #[must_use]
    pub fn fence(info: impl Into<String>, content: impl Into<String>) -> Self {
        Self::Fence {
            info: info.into(),
            content: content.into(),
        }
    }
}

/// Parses markdown and returns its block tokens in document order.
#[must_use]
pub fn tokenize(markdown: &str) -> Vec<Token> {
    let arena = Arena::new();
    let root = parse_document(&arena, markdown, &parser_options());

    let mut tokens = Vec::new();
    for child in root.children() {
        collect_block(child, &mut tokens);
    }
    tokens
}

fn parser_options() -> Options<'static> {
    let mut options = Options::default();
    options.extension.table = true;
    options.extension.strikethrough = true;
    options.extension.autolink = true;
    options.extension.tasklist = true;
    options
}

fn collect_block<'a>(node: &'a AstNode<'a>, tokens: &mut Vec<Token>) {
    match &node.data.borrow().value {
        NodeValue::Heading(heading) => {
            tokens.push(Token::HeadingOpen {
                level: heading.level,
            });
            tokens.push(Token::Inline(inline_text(node)));
            tokens.push(Token::HeadingClose);
        }
        NodeValue::Paragraph => {
            tokens.push(Token::ParagraphOpen);
            tokens.push(Token::Inline(inline_text(node)));
            tokens.push(Token::ParagraphClose);
        }
        NodeValue::CodeBlock(block) if block.fenced => {
            tokens.push(Token::fence(block.info.clone(), block.literal.clone()));
        }
        NodeValue::TableCell => tokens.push(Token::Inline(inline_text(node))),
        NodeValue::CodeBlock(_) | NodeValue::HtmlBlock(_) | NodeValue::ThematicBreak => {
            tokens.push(Token::Other);
        }
        _ => {
            for child in node.children() {
                collect_block(child, tokens);
            }
        }
    }
}

fn inline_text<'a>(node: &'a AstNode<'a>) -> String {
    let mut text = String::new();
    for child in node.children() {
        push_inline(child, &mut text);
    }
    text
}

fn push_inline<'a>(node: &'a AstNode<'a>, out: &mut String) {
    match &node.data.borrow().value {
        NodeValue::Text(text) => out.push_str(text),
        NodeValue::Code(code) => {
            out.push('`');
            out.push_str(&code.literal);
            out.push('`');
        }
        NodeValue::HtmlInline(html) => out.push_str(html),
        NodeValue::SoftBreak | NodeValue::LineBreak => out.push('\n'),
        NodeValue::Strong => push_wrapped(node, "**", out),
        NodeValue::Emph => push_wrapped(node, "*", out),
        NodeValue::Strikethrough => push_wrapped(node, "~~", out),
        NodeValue::Link(link) => {
            let text = inline_text(node);
            // Autolinks render as the bare address.
            let bare = ["", "mailto:", "http://"]
                .iter()
                .any(|scheme| link.url.strip_prefix(scheme) == Some(text.as_str()));
            if bare {
                out.push_str(&text);
            } else {
                out.push_str(&format!("[{text}]({})", link.url));
            }
        }
        NodeValue::Image(link) => {
            out.push_str(&format!("![{}]({})", inline_text(node), link.url));
        }
        _ => {
            for child in node.children() {
                push_inline(child, out);
            }
        }
    }
}

fn push_wrapped<'a>(node: &'a AstNode<'a>, marker: &str, out: &mut String) {
    out.push_str(marker);
    for child in node.children() {
        push_inline(child, out);
    }
    out.push_str(marker);
}
