//! Line-oriented Markdown element extraction.

use std::collections::BTreeMap;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Kind of Markdown element recognized for scoring.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    Header,
    Paragraph,
    ListItem,
    CodeBlock,
    Image,
    Link,
    Blockquote,
    HorizontalRule,
    TableRow,
    Bold,
    Italic,
    InlineCode,
}

impl ElementKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ElementKind::Header => "header",
            ElementKind::Paragraph => "paragraph",
            ElementKind::ListItem => "list_item",
            ElementKind::CodeBlock => "code_block",
            ElementKind::Image => "image",
            ElementKind::Link => "link",
            ElementKind::Blockquote => "blockquote",
            ElementKind::HorizontalRule => "horizontal_rule",
            ElementKind::TableRow => "table_row",
            ElementKind::Bold => "bold",
            ElementKind::Italic => "italic",
            ElementKind::InlineCode => "inline_code",
        }
    }
}

impl std::fmt::Display for ElementKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One element found in a Markdown document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccuracyElement {
    pub kind: ElementKind,
    /// 1-based line number
    pub line: usize,
    /// Header level or list nesting level (0 otherwise)
    pub level: usize,
    pub metadata: BTreeMap<String, String>,
}

impl AccuracyElement {
    pub fn new(kind: ElementKind, line: usize) -> Self {
        Self {
            kind,
            line,
            level: 0,
            metadata: BTreeMap::new(),
        }
    }

    pub fn with_level(mut self, level: usize) -> Self {
        self.level = level;
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<String>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }
}

/// Extract the element list of a Markdown document.
pub fn extract_elements(markdown: &str) -> Result<Vec<AccuracyElement>> {
    Ok(MarkdownScanner::new()?.scan(markdown))
}

/// Compiled patterns for [`extract_elements`].
pub struct MarkdownScanner {
    header: Regex,
    fence: Regex,
    rule: Regex,
    list_item: Regex,
    blockquote: Regex,
    table_row: Regex,
    table_separator: Regex,
    image: Regex,
    link: Regex,
    bold: Regex,
    italic: Regex,
    code: Regex,
}

fn compile(pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|e| Error::Other(format!("Invalid pattern {}: {}", pattern, e)))
}

impl MarkdownScanner {
    /// Compile the scanner's patterns.
    pub fn new() -> Result<Self> {
        Ok(Self {
            header: compile(r"^ {0,3}(#{1,6})\s+(.+?)\s*#*\s*$")?,
            fence: compile(r"^ {0,3}(```|~~~)\s*([\w+-]*)")?,
            rule: compile(r"^ {0,3}(?:(?:\*[ \t]*){3,}|(?:-[ \t]*){3,}|(?:_[ \t]*){3,})$")?,
            list_item: compile(r"^(\s*)([-*+]|\d+[.)])\s+(.*)$")?,
            blockquote: compile(r"^ {0,3}>\s?(.*)$")?,
            table_row: compile(r"^\s*\|.*\|\s*$")?,
            table_separator: compile(r"^\s*\|?(?:\s*:?-{3,}:?\s*\|)+\s*(?::?-{3,}:?\s*)?\|?\s*$")?,
            image: compile(r"!\[([^\]]*)\]\(([^)\s]*)[^)]*\)")?,
            link: compile(r"\[([^\]]+)\]\(([^)\s]*)[^)]*\)")?,
            bold: compile(r"\*\*([^*]+)\*\*|__([^_]+)__")?,
            italic: compile(r"\*([^*\s][^*]*)\*|\b_([^_\s][^_]*)_\b")?,
            code: compile(r"`([^`]+)`")?,
        })
    }

    /// Scan a document line by line.
    pub fn scan(&self, markdown: &str) -> Vec<AccuracyElement> {
        let mut elements = Vec::new();
        let mut in_code = false;
        let mut in_paragraph = false;

        for (index, line) in markdown.lines().enumerate() {
            let line_no = index + 1;

            if let Some(caps) = self.fence.captures(line) {
                if !in_code {
                    let language = caps.get(2).map_or("", |m| m.as_str());
                    elements.push(AccuracyElement::new(ElementKind::CodeBlock, line_no).with_meta("language", language));
                }
                in_code = !in_code;
                in_paragraph = false;
                continue;
            }
            if in_code {
                continue;
            }

            if line.trim().is_empty() {
                in_paragraph = false;
                continue;
            }

            if self.rule.is_match(line) {
                elements.push(AccuracyElement::new(ElementKind::HorizontalRule, line_no));
                in_paragraph = false;
                continue;
            }

            if let Some(caps) = self.header.captures(line) {
                let level = caps.get(1).map_or(1, |m| m.as_str().len());
                let text = caps.get(2).map_or("", |m| m.as_str());
                elements.push(
                    AccuracyElement::new(ElementKind::Header, line_no)
                        .with_level(level)
                        .with_meta("text", text),
                );
                self.scan_inline(text, line_no, &mut elements);
                in_paragraph = false;
                continue;
            }

            if self.table_row.is_match(line) {
                if !self.table_separator.is_match(line) {
                    elements.push(AccuracyElement::new(ElementKind::TableRow, line_no));
                    self.scan_inline(line, line_no, &mut elements);
                }
                in_paragraph = false;
                continue;
            }

            if let Some(caps) = self.blockquote.captures(line) {
                elements.push(AccuracyElement::new(ElementKind::Blockquote, line_no));
                self.scan_inline(caps.get(1).map_or("", |m| m.as_str()), line_no, &mut elements);
                in_paragraph = false;
                continue;
            }

            if let Some(caps) = self.list_item.captures(line) {
                let indent = caps.get(1).map_or(0, |m| m.as_str().replace('\t', "    ").len());
                let marker = caps.get(2).map_or("", |m| m.as_str());
                let ordered = marker.chars().next().is_some_and(|c| c.is_ascii_digit());
                elements.push(
                    AccuracyElement::new(ElementKind::ListItem, line_no)
                        .with_level(indent / 2)
                        .with_meta("ordered", ordered.to_string()),
                );
                self.scan_inline(caps.get(3).map_or("", |m| m.as_str()), line_no, &mut elements);
                in_paragraph = false;
                continue;
            }

            if !in_paragraph && !self.is_image_line(line) {
                elements.push(AccuracyElement::new(ElementKind::Paragraph, line_no));
                in_paragraph = true;
            }
            self.scan_inline(line, line_no, &mut elements);
        }

        elements
    }

    fn is_image_line(&self, line: &str) -> bool {
        self.image.replace_all(line, "").trim().is_empty()
    }

    fn scan_inline(&self, text: &str, line_no: usize, out: &mut Vec<AccuracyElement>) {
        // Code spans first so markers inside them are not counted.
        for caps in self.code.captures_iter(text) {
            out.push(
                AccuracyElement::new(ElementKind::InlineCode, line_no)
                    .with_meta("code", caps.get(1).map_or("", |m| m.as_str())),
            );
        }
        let text = self.code.replace_all(text, "");

        for caps in self.image.captures_iter(&text) {
            out.push(
                AccuracyElement::new(ElementKind::Image, line_no)
                    .with_meta("alt", caps.get(1).map_or("", |m| m.as_str()))
                    .with_meta("url", caps.get(2).map_or("", |m| m.as_str())),
            );
        }
        let text = self.image.replace_all(&text, "");

        for caps in self.link.captures_iter(&text) {
            out.push(
                AccuracyElement::new(ElementKind::Link, line_no)
                    .with_meta("text", caps.get(1).map_or("", |m| m.as_str()))
                    .with_meta("url", caps.get(2).map_or("", |m| m.as_str())),
            );
        }

        let bold_count = self.bold.find_iter(&text).count();
        for _ in 0..bold_count {
            out.push(AccuracyElement::new(ElementKind::Bold, line_no));
        }

        // `***x***` leaves `*x*` behind and counts as both.
        let text = self.bold.replace_all(&text, "$1$2");
        for _ in self.italic.find_iter(&text) {
            out.push(AccuracyElement::new(ElementKind::Italic, line_no));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(markdown: &str) -> Vec<ElementKind> {
        extract_elements(markdown)
            .unwrap()
            .into_iter()
            .map(|e| e.kind)
            .collect()
    }

    #[test]
    fn test_headers_with_level() {
        let elements = extract_elements("# Title\n\n### Sub ###").unwrap();
        assert_eq!(elements.len(), 2);
        assert_eq!(elements[0].level, 1);
        assert_eq!(elements[0].metadata["text"], "Title");
        assert_eq!(elements[1].level, 3);
        assert_eq!(elements[1].metadata["text"], "Sub");
        assert_eq!(elements[1].line, 3);
    }

    #[test]
    fn test_paragraphs_span_lines() {
        assert_eq!(
            kinds("first line\nstill first\n\nsecond"),
            vec![ElementKind::Paragraph, ElementKind::Paragraph]
        );
    }

    #[test]
    fn test_list_items_and_nesting() {
        let elements = extract_elements("- a\n  - b\n1. c").unwrap();
        let levels: Vec<_> = elements.iter().map(|e| (e.kind, e.level)).collect();
        assert_eq!(
            levels,
            vec![
                (ElementKind::ListItem, 0),
                (ElementKind::ListItem, 1),
                (ElementKind::ListItem, 0),
            ]
        );
        assert_eq!(elements[2].metadata["ordered"], "true");
    }

    #[test]
    fn test_code_block_hides_content() {
        let elements = extract_elements("```rust\n# not a header\n**no**\n```\ntext").unwrap();
        assert_eq!(elements[0].kind, ElementKind::CodeBlock);
        assert_eq!(elements[0].metadata["language"], "rust");
        assert_eq!(elements[1].kind, ElementKind::Paragraph);
        assert_eq!(elements.len(), 2);
    }

    #[test]
    fn test_rules_quotes_and_tables() {
        assert_eq!(
            kinds("---\n* * *\n> quoted\n| a | b |\n|---|---|\n| 1 | 2 |"),
            vec![
                ElementKind::HorizontalRule,
                ElementKind::HorizontalRule,
                ElementKind::Blockquote,
                ElementKind::TableRow,
                ElementKind::TableRow,
            ]
        );
    }

    #[test]
    fn test_inline_markers() {
        assert_eq!(
            kinds("**bold** and *it* and `code` and [link](http://x) and ***both***"),
            vec![
                ElementKind::Paragraph,
                ElementKind::InlineCode,
                ElementKind::Link,
                ElementKind::Bold,
                ElementKind::Bold,
                ElementKind::Italic,
                ElementKind::Italic,
            ]
        );
    }

    #[test]
    fn test_image_line_is_not_a_paragraph() {
        let elements = extract_elements("![logo](img/logo.png)").unwrap();
        assert_eq!(elements.len(), 1);
        assert_eq!(elements[0].kind, ElementKind::Image);
        assert_eq!(elements[0].metadata["alt"], "logo");
        assert_eq!(elements[0].metadata["url"], "img/logo.png");
    }

    #[test]
    fn test_empty_document() {
        assert!(extract_elements("").unwrap().is_empty());
    }
}
