//! Rule document parser
//!
//! A rule file is YAML frontmatter followed by markdown:
//!
//! ~~~markdown
//! ---
//! title: Use Connection Pooling
//! impact: HIGH
//! tags: connections, performance
//! ---
//!
//! ## Use Connection Pooling
//!
//! Opening a connection per request wastes round trips.
//!
//! **Incorrect:** new client every call
//!
//! ```python
//! r = redis.Redis()
//! ```
//!
//! **Correct:**
//!
//! ```python
//! pool = redis.ConnectionPool()
//! ```
//!
//! Reference: [Clients](https://redis.io/docs/latest/develop/clients/)
//! ~~~
//!
//! Paragraphs before the first example form the explanation. A paragraph
//! that opens with bold text starts an example, and the next code block
//! belongs to it. Tables are skipped.

use crate::{
    diagnostics::{LintError, LintResult},
    parsers::frontmatter::parse_frontmatter,
    rule::{CodeExample, Rule},
};
use pulldown_cmark::{CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use serde::Deserialize;
use std::collections::BTreeMap;

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RuleFrontmatter {
    title: Option<String>,
    impact: Option<String>,
    impact_description: Option<String>,
    tags: Option<Tags>,
    #[serde(default)]
    references: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Tags {
    List(Vec<String>),
    Csv(String),
}

impl Tags {
    fn into_vec(self) -> Vec<String> {
        let raw = match self {
            Tags::List(list) => list,
            Tags::Csv(csv) => csv.split(',').map(str::to_string).collect(),
        };
        raw.into_iter()
            .map(|t| t.trim().to_string())
            .filter(|t| !t.is_empty())
            .collect()
    }
}

/// Section number for a rule file.
///
/// The longest key `k` in `section_map` for which the file stem equals `k`
/// or starts with `k-` wins, so `semantic-cache-ttl.md` maps to
/// `semantic-cache` rather than a shorter key.
pub fn section_for_file(file_name: &str, section_map: &BTreeMap<String, u32>) -> Option<u32> {
    let stem = file_name.strip_suffix(".md").unwrap_or(file_name);
    section_map
        .iter()
        .filter(|(key, _)| {
            stem == key.as_str()
                || stem
                    .strip_prefix(key.as_str())
                    .is_some_and(|rest| rest.starts_with('-'))
        })
        .max_by_key(|(key, _)| key.len())
        .map(|(_, section)| *section)
}

/// Parse a rule document.
///
/// `id` and `subsection` are left unset; they depend on sibling files.
pub fn parse_rule(
    content: &str,
    file_name: &str,
    section_map: &BTreeMap<String, u32>,
) -> LintResult<Rule> {
    let section = section_for_file(file_name, section_map).ok_or_else(|| {
        LintError::UnknownSection {
            file: file_name.to_string(),
        }
    })?;

    let (frontmatter, body): (RuleFrontmatter, String) = parse_frontmatter(content)?;
    let parsed = parse_body(&body);

    let mut references = frontmatter.references;
    references.extend(parsed.references);

    Ok(Rule {
        id: String::new(),
        title: frontmatter
            .title
            .filter(|t| !t.trim().is_empty())
            .or(parsed.first_heading)
            .unwrap_or_default(),
        section,
        subsection: None,
        impact: frontmatter.impact.unwrap_or_default(),
        impact_description: frontmatter.impact_description,
        explanation: parsed.explanation.join("\n\n"),
        examples: parsed.examples,
        references,
        tags: frontmatter.tags.map(Tags::into_vec).unwrap_or_default(),
    })
}

#[derive(Debug, Default)]
struct ParsedBody {
    first_heading: Option<String>,
    explanation: Vec<String>,
    examples: Vec<CodeExample>,
    references: Vec<String>,
}

/// Text of the paragraph currently being read
#[derive(Debug, Default)]
struct Paragraph {
    /// Bold text the paragraph opened with
    lead: Option<String>,
    in_lead: bool,
    text: String,
    links: Vec<String>,
}

impl Paragraph {
    fn push(&mut self, s: &str) {
        if self.in_lead {
            if let Some(lead) = self.lead.as_mut() {
                lead.push_str(s);
            }
        } else {
            self.text.push_str(s);
        }
    }

    fn is_empty(&self) -> bool {
        self.lead.is_none() && self.text.trim().is_empty()
    }

    fn full_text(&self) -> String {
        match &self.lead {
            Some(lead) => format!("{}{}", lead, self.text).trim().to_string(),
            None => self.text.trim().to_string(),
        }
    }
}

fn is_reference_text(text: &str) -> bool {
    text.starts_with("Reference:") || text.starts_with("References:")
}

fn parse_body(body: &str) -> ParsedBody {
    // No math or smart punctuation: `$VARS` and quotes must survive verbatim.
    let options = Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_FOOTNOTES;

    let mut out = ParsedBody::default();
    let mut paragraph: Option<Paragraph> = None;
    let mut heading: Option<String> = None;
    let mut code: Option<(Option<String>, String)> = None;
    let mut list_depth = 0usize;
    let mut list_text = String::new();
    let mut in_table = false;

    for event in Parser::new_ext(body, options) {
        match event {
            Event::Start(Tag::Heading { .. }) => heading = Some(String::new()),
            Event::End(TagEnd::Heading(_)) => {
                if let Some(text) = heading.take() {
                    let text = text.trim().to_string();
                    if out.first_heading.is_none() && !text.is_empty() {
                        out.first_heading = Some(text);
                    }
                }
            }

            Event::Start(Tag::Table(_)) => in_table = true,
            Event::End(TagEnd::Table) => in_table = false,

            Event::Start(Tag::List(_)) => list_depth += 1,
            Event::End(TagEnd::List(_)) => {
                list_depth = list_depth.saturating_sub(1);
                if list_depth == 0 {
                    let text = std::mem::take(&mut list_text);
                    add_prose(&mut out, text.trim().to_string());
                }
            }
            Event::Start(Tag::Item) => {
                if !list_text.is_empty() {
                    list_text.push('\n');
                }
                list_text.push_str(&"  ".repeat(list_depth.saturating_sub(1)));
                list_text.push_str("- ");
            }

            Event::Start(Tag::Paragraph) if list_depth == 0 => {
                paragraph = Some(Paragraph::default());
            }
            Event::End(TagEnd::Paragraph) if list_depth == 0 => {
                if let Some(p) = paragraph.take() {
                    finish_paragraph(&mut out, p);
                }
            }

            Event::Start(Tag::Strong) => {
                if let Some(p) = paragraph.as_mut() {
                    if p.is_empty() {
                        p.lead = Some(String::new());
                        p.in_lead = true;
                    }
                }
            }
            Event::End(TagEnd::Strong) => {
                if let Some(p) = paragraph.as_mut() {
                    p.in_lead = false;
                }
            }

            Event::Start(Tag::Link { dest_url, .. }) => {
                if let Some(p) = paragraph.as_mut() {
                    p.links.push(dest_url.to_string());
                }
            }

            Event::Start(Tag::CodeBlock(kind)) => {
                let language = match kind {
                    CodeBlockKind::Fenced(info) => info
                        .split_whitespace()
                        .next()
                        .map(str::to_string)
                        .filter(|l| !l.is_empty()),
                    CodeBlockKind::Indented => None,
                };
                code = Some((language, String::new()));
            }
            Event::End(TagEnd::CodeBlock) => {
                if let Some((language, text)) = code.take() {
                    attach_code(&mut out.examples, language, text);
                }
            }

            Event::Text(text) | Event::Code(text) => {
                if let Some((_, buf)) = code.as_mut() {
                    buf.push_str(&text);
                } else if let Some(h) = heading.as_mut() {
                    h.push_str(&text);
                } else if in_table {
                    continue;
                } else if list_depth > 0 {
                    list_text.push_str(&text);
                } else if let Some(p) = paragraph.as_mut() {
                    p.push(&text);
                }
            }
            Event::SoftBreak | Event::HardBreak => {
                if let Some(h) = heading.as_mut() {
                    h.push(' ');
                } else if list_depth > 0 {
                    list_text.push(' ');
                } else if let Some(p) = paragraph.as_mut() {
                    p.push(" ");
                }
            }
            _ => {}
        }
    }

    out
}

fn finish_paragraph(out: &mut ParsedBody, p: Paragraph) {
    let full = p.full_text();
    if full.is_empty() {
        return;
    }

    if is_reference_text(&full) {
        out.references.extend(p.links);
        return;
    }

    if let Some(lead) = p.lead {
        let label = lead.trim().trim_end_matches(':').trim().to_string();
        let description = p.text.trim().trim_start_matches(':').trim().to_string();
        out.examples.push(CodeExample {
            label,
            description: (!description.is_empty()).then_some(description),
            ..CodeExample::default()
        });
        return;
    }

    add_prose(out, full);
}

/// Route a prose block to the open example or to the explanation.
fn add_prose(out: &mut ParsedBody, text: String) {
    if text.is_empty() {
        return;
    }

    match out.examples.last_mut() {
        Some(example) if example.code.is_empty() => {
            append_text(&mut example.description, text);
        }
        Some(example) => append_text(&mut example.additional_text, text),
        None => out.explanation.push(text),
    }
}

fn append_text(slot: &mut Option<String>, text: String) {
    match slot {
        Some(existing) => {
            existing.push_str("\n\n");
            existing.push_str(&text);
        }
        None => *slot = Some(text),
    }
}

fn attach_code(examples: &mut Vec<CodeExample>, language: Option<String>, code: String) {
    let code = code.trim_end_matches('\n').to_string();

    match examples.last_mut() {
        Some(example) if example.code.is_empty() => {
            example.code = code;
            example.language = language;
        }
        Some(example) => {
            let label = example.label.clone();
            examples.push(CodeExample {
                label,
                code,
                language,
                ..CodeExample::default()
            });
        }
        None => examples.push(CodeExample {
            code,
            language,
            ..CodeExample::default()
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn section_map() -> BTreeMap<String, u32> {
        [("conn", 3), ("semantic-cache", 7), ("sub-pro", 3), ("sub", 9)]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v))
            .collect()
    }

    const RULE: &str = r#"---
title: Use Connection Pooling
impact: HIGH
impactDescription: Reduces connection overhead
tags: connections, performance
---

## Use Connection Pooling

Opening a new connection per request wastes round trips.

Pools keep connections warm.

**Incorrect:** new client every call

```python
r = redis.Redis()
```

**Correct (pooled):**

```python
pool = redis.ConnectionPool()
r = redis.Redis(connection_pool=pool)
```

Size the pool to match your worker count.

Reference: [Clients](https://redis.io/docs/latest/develop/clients/)
"#;

    fn parse(content: &str, file: &str) -> Rule {
        parse_rule(content, file, &section_map()).unwrap()
    }

    #[test]
    fn test_frontmatter_fields() {
        let rule = parse(RULE, "conn-pooling.md");
        assert_eq!(rule.title, "Use Connection Pooling");
        assert_eq!(rule.impact, "HIGH");
        assert_eq!(
            rule.impact_description.as_deref(),
            Some("Reduces connection overhead")
        );
        assert_eq!(rule.tags, vec!["connections", "performance"]);
        assert_eq!(rule.section, 3);
        assert!(rule.id.is_empty());
        assert!(rule.subsection.is_none());
    }

    #[test]
    fn test_explanation_joins_leading_paragraphs() {
        let rule = parse(RULE, "conn-pooling.md");
        assert_eq!(
            rule.explanation,
            "Opening a new connection per request wastes round trips.\n\nPools keep connections warm."
        );
    }

    #[test]
    fn test_examples() {
        let rule = parse(RULE, "conn-pooling.md");
        assert_eq!(rule.examples.len(), 2);

        let bad = &rule.examples[0];
        assert_eq!(bad.label, "Incorrect");
        assert_eq!(bad.description.as_deref(), Some("new client every call"));
        assert_eq!(bad.code, "r = redis.Redis()");
        assert_eq!(bad.language.as_deref(), Some("python"));

        let good = &rule.examples[1];
        assert_eq!(good.label, "Correct (pooled)");
        assert!(good.description.is_none());
        assert!(good.code.contains("ConnectionPool"));
        assert_eq!(
            good.additional_text.as_deref(),
            Some("Size the pool to match your worker count.")
        );
    }

    #[test]
    fn test_reference_links() {
        let rule = parse(RULE, "conn-pooling.md");
        assert_eq!(
            rule.references,
            vec!["https://redis.io/docs/latest/develop/clients/"]
        );
        assert!(!rule.explanation.contains("Reference"));
    }

    #[test]
    fn test_title_falls_back_to_heading() {
        let content = "---\nimpact: LOW\n---\n\n# Heading Title\n\nText.\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.title, "Heading Title");
        assert_eq!(rule.explanation, "Text.");
    }

    #[test]
    fn test_no_frontmatter() {
        let rule = parse("Just prose.\n", "conn-x.md");
        assert!(rule.title.is_empty());
        assert!(rule.impact.is_empty());
        assert_eq!(rule.explanation, "Just prose.");
        assert!(rule.examples.is_empty());
    }

    #[test]
    fn test_impact_kept_verbatim() {
        let rule = parse(
            "---\ntitle: T\nimpact: \" HIGH \"\n---\nWhy.\n",
            "conn-pad.md",
        );
        assert_eq!(rule.impact, " HIGH ");
        assert!(rule.impact_level().is_none());
    }

    #[test]
    fn test_invalid_yaml_is_error() {
        let result = parse_rule("---\ntitle: [oops\n---\nBody", "conn.md", &section_map());
        assert!(matches!(result, Err(LintError::YamlParse { .. })));
    }

    #[test]
    fn test_unknown_section_is_error() {
        let result = parse_rule(RULE, "mystery-rule.md", &section_map());
        match result {
            Err(LintError::UnknownSection { file }) => assert_eq!(file, "mystery-rule.md"),
            other => panic!("expected UnknownSection, got {:?}", other),
        }
    }

    #[test]
    fn test_section_longest_prefix_wins() {
        let map = section_map();
        assert_eq!(section_for_file("sub-pro-create.md", &map), Some(3));
        assert_eq!(section_for_file("sub-list.md", &map), Some(9));
        assert_eq!(section_for_file("semantic-cache-ttl.md", &map), Some(7));
        assert_eq!(section_for_file("conn.md", &map), Some(3));
    }

    #[test]
    fn test_section_requires_dash_boundary() {
        let map = section_map();
        assert_eq!(section_for_file("connection.md", &map), None);
        assert_eq!(section_for_file("subscriptions.md", &map), None);
    }

    #[test]
    fn test_tags_as_list() {
        let content = "---\ntitle: T\ntags:\n  - a\n  - b\n---\nx\n";
        assert_eq!(parse(content, "conn.md").tags, vec!["a", "b"]);
    }

    #[test]
    fn test_code_without_label_opens_unlabelled_example() {
        let content = "Explain.\n\n```bash\nredis-cli PING\n```\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.examples.len(), 1);
        assert_eq!(rule.examples[0].label, "");
        assert_eq!(rule.examples[0].language.as_deref(), Some("bash"));
    }

    #[test]
    fn test_second_code_block_reuses_label() {
        let content =
            "Explain.\n\n**Correct:**\n\n```python\na = 1\n```\n\n```typescript\nconst a = 1\n```\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.examples.len(), 2);
        assert_eq!(rule.examples[1].label, "Correct");
        assert_eq!(rule.examples[1].language.as_deref(), Some("typescript"));
    }

    #[test]
    fn test_label_with_colon_outside_bold() {
        let content = "Explain.\n\n**Avoid**: blocking calls\n\n```\nKEYS *\n```\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.examples[0].label, "Avoid");
        assert_eq!(rule.examples[0].description.as_deref(), Some("blocking calls"));
        assert!(rule.examples[0].language.is_none());
    }

    #[test]
    fn test_bold_mid_paragraph_is_prose() {
        let content = "Use **pipelines** for batches.\n";
        let rule = parse(content, "conn.md");
        assert!(rule.examples.is_empty());
        assert_eq!(rule.explanation, "Use pipelines for batches.");
    }

    #[test]
    fn test_lists_join_explanation() {
        let content = "Intro.\n\n- one\n- two\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.explanation, "Intro.\n\n- one\n- two");
    }

    #[test]
    fn test_tables_are_skipped() {
        let content = "Intro.\n\n| Code | Meaning |\n|---|---|\n| 400 | Bad |\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.explanation, "Intro.");
    }

    #[test]
    fn test_frontmatter_references_come_first() {
        let content = "---\ntitle: T\nreferences:\n  - https://a.example\n---\n\nx\n\nReferences: [b](https://b.example)\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.references, vec!["https://a.example", "https://b.example"]);
    }

    #[test]
    fn test_crlf_document() {
        let content = "---\r\ntitle: T\r\nimpact: LOW\r\n---\r\n\r\nBody text.\r\n";
        let rule = parse(content, "conn.md");
        assert_eq!(rule.title, "T");
        assert_eq!(rule.impact, "LOW");
        assert_eq!(rule.explanation, "Body text.");
    }
}
