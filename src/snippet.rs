//! Snippet extraction from markdown token streams.

use crate::token::Token;

const DEFAULT_LANGUAGE: &str = "text";

/// A fenced code block together with the context it was found in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Snippet {
    /// Nearest preceding heading, or `Snippet N`
    pub title: String,

    /// Text immediately preceding the block
    pub description: String,

    /// Path or URL of the source document
    pub source: String,

    /// Fence info string, `text` when absent
    pub language: String,

    /// Trimmed block content
    pub code: String,
}

/// State of the backward description scan.
#[derive(Debug, PartialEq, Eq)]
enum ScanState<'a> {
    Scanning,
    Found(&'a str),
    Blocked,
}

impl<'a> ScanState<'a> {
    fn step(self, token: &'a Token) -> Self {
        match (self, token) {
            (Self::Scanning, Token::ParagraphOpen) => Self::Scanning,
            (Self::Scanning, Token::Inline(text)) if !text.trim().is_empty() => {
                Self::Found(text.trim())
            }
            (Self::Scanning, Token::HeadingOpen { .. } | Token::Fence { .. }) => Self::Blocked,
            (state, _) => state,
        }
    }

    const fn is_done(&self) -> bool {
        !matches!(self, Self::Scanning)
    }
}

/// Extracts one snippet per fenced code block.
///
/// Titles come from the most recent heading, falling back to a positional
/// `Snippet N` (1-based, counted over every fence in the stream). The
/// description is the closest non-empty text before the fence, provided no
/// heading or other fence sits between them.
#[must_use]
pub fn extract_snippets(tokens: &[Token], source: &str) -> Vec<Snippet> {
    let mut snippets = Vec::new();
    let mut heading = String::new();
    let mut counter = 0usize;

    for (index, token) in tokens.iter().enumerate() {
        match token {
            Token::HeadingOpen { .. } => {
                heading = match tokens.get(index + 1) {
                    Some(Token::Inline(text)) => text.trim().to_string(),
                    _ => String::new(),
                };
            }
            Token::Fence { info, content } => {
                counter += 1;

                let title = if heading.is_empty() {
                    format!("Snippet {counter}")
                } else {
                    heading.clone()
                };

                let language = match info.trim() {
                    "" => DEFAULT_LANGUAGE,
                    lang => lang,
                };

                snippets.push(Snippet {
                    title,
                    description: find_description(&tokens[..index]),
                    source: source.to_string(),
                    language: language.to_string(),
                    code: content.trim().to_string(),
                });
            }
            _ => {}
        }
    }

    snippets
}

/// Scans backwards from the end of `preceding` for a description.
fn find_description(preceding: &[Token]) -> String {
    let mut state = ScanState::Scanning;
    for token in preceding.iter().rev() {
        state = state.step(token);
        if state.is_done() {
            break;
        }
    }

    match state {
        ScanState::Found(text) => text.to_string(),
        ScanState::Scanning | ScanState::Blocked => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::tokenize;

    fn heading(text: &str) -> [Token; 3] {
        [
            Token::HeadingOpen { level: 2 },
            Token::inline(text),
            Token::HeadingClose,
        ]
    }

    fn paragraph(text: &str) -> [Token; 3] {
        [
            Token::ParagraphOpen,
            Token::inline(text),
            Token::ParagraphClose,
        ]
    }

    #[test]
    fn test_no_fences_no_snippets() {
        let tokens: Vec<Token> = heading("Intro")
            .into_iter()
            .chain(paragraph("Just prose."))
            .chain([Token::Other])
            .collect();

        assert!(extract_snippets(&tokens, "doc.md").is_empty());
        assert!(extract_snippets(&[], "doc.md").is_empty());
    }

    #[test]
    fn test_positional_titles_without_heading() {
        let tokens = vec![
            Token::fence("js", "a()"),
            Token::fence("js", "b()"),
            Token::fence("js", "c()"),
        ];

        let titles: Vec<_> = extract_snippets(&tokens, "doc.md")
            .into_iter()
            .map(|s| s.title)
            .collect();
        assert_eq!(titles, vec!["Snippet 1", "Snippet 2", "Snippet 3"]);
    }

    #[test]
    fn test_counter_persists_across_headings() {
        let tokens = vec![
            Token::fence("", "first"),
            Token::HeadingOpen { level: 1 },
            Token::HeadingClose,
            Token::fence("", "second"),
        ];

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets[0].title, "Snippet 1");
        assert_eq!(snippets[1].title, "Snippet 2");
    }

    #[test]
    fn test_heading_text_becomes_title() {
        let tokens: Vec<Token> = heading("  Install  ")
            .into_iter()
            .chain([Token::fence("sh", "npm i")])
            .collect();

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets[0].title, "Install");
    }

    #[test]
    fn test_description_from_heading_inline() {
        let tokens = vec![
            Token::HeadingOpen { level: 1 },
            Token::inline("desc"),
            Token::fence("js", "x"),
        ];

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets[0].description, "desc");
    }

    #[test]
    fn test_back_to_back_fences_block_description() {
        let tokens: Vec<Token> = paragraph("Intro text")
            .into_iter()
            .chain([Token::fence("js", "one"), Token::fence("js", "two")])
            .collect();

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets[0].description, "Intro text");
        assert_eq!(snippets[1].description, "");
    }

    #[test]
    fn test_description_blocked_by_heading() {
        let tokens = vec![
            Token::ParagraphOpen,
            Token::inline("Belongs to the previous section"),
            Token::ParagraphClose,
            Token::HeadingOpen { level: 2 },
            Token::inline(""),
            Token::HeadingClose,
            Token::fence("js", "x"),
        ];

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets[0].description, "");
        assert_eq!(snippets[0].title, "Snippet 1");
    }

    #[test]
    fn test_description_skips_empty_inline() {
        let tokens = vec![
            Token::inline("Real description"),
            Token::ParagraphOpen,
            Token::inline("   "),
            Token::ParagraphClose,
            Token::fence("js", "x"),
        ];

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets[0].description, "Real description");
    }

    #[test]
    fn test_language_and_code_trimmed() {
        let tokens = vec![
            Token::fence("  python ", "\n\nprint('hi')\n\n"),
            Token::fence("   ", "plain"),
        ];

        let snippets = extract_snippets(&tokens, "https://example.com/doc.md");
        assert_eq!(snippets[0].language, "python");
        assert_eq!(snippets[0].code, "print('hi')");
        assert_eq!(snippets[0].source, "https://example.com/doc.md");
        assert_eq!(snippets[1].language, "text");
    }

    #[test]
    fn test_empty_fence_is_still_extracted() {
        let tokens = vec![Token::fence("js", "\n")];

        let snippets = extract_snippets(&tokens, "doc.md");
        assert_eq!(snippets.len(), 1);
        assert!(snippets[0].code.is_empty());
    }

    #[test]
    fn test_extract_from_markdown_document() {
        let markdown = "# Title\n\nSome desc.\n\n```js\nconsole.log(1);\n```\n\n## Usage\n\n```\nrun\n```\n";

        let snippets = extract_snippets(&tokenize(markdown), "readme.md");

        assert_eq!(
            snippets[0],
            Snippet {
                title: "Title".to_string(),
                description: "Some desc.".to_string(),
                source: "readme.md".to_string(),
                language: "js".to_string(),
                code: "console.log(1);".to_string(),
            }
        );
        assert_eq!(snippets[1].title, "Usage");
        assert_eq!(snippets[1].description, "Usage");
        assert_eq!(snippets[1].language, "text");
    }
}
