//! Parsers for rule documents

pub mod frontmatter;
pub mod rule;

pub use rule::{parse_rule, section_for_file};
