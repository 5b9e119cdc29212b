//! Description fallback chain
//!
//! The description of a schema element is:
//! 1. the marker-provided text, trimmed, when non-blank
//! 2. otherwise the leading documentation comment of the element, taken from
//!    the comment the scanner attached or found in the owning type's source
//! 3. otherwise empty
//!
//! Extraction is best-effort. Failing to find a comment is not an error.

use crate::descriptor::{EnumValueDescriptor, Member, TypeDescriptor};
use once_cell::sync::Lazy;
use regex::Regex;

static DOC_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)/\*\*(.*?)\*/").expect("doc block pattern is valid"));

static WHITESPACE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\s+").expect("whitespace pattern is valid"));

/// An element whose description is being resolved
#[derive(Debug, Clone, Copy)]
pub enum DocElement<'a> {
    /// A declared type
    Type(&'a TypeDescriptor),
    /// An attribute or method of a type
    Member {
        /// Declaring type
        owner: &'a TypeDescriptor,
        /// The member
        member: Member<'a>,
    },
    /// An enum constant
    EnumValue {
        /// Declaring enum
        owner: &'a TypeDescriptor,
        /// The constant
        value: &'a EnumValueDescriptor,
    },
}

impl<'a> DocElement<'a> {
    fn attached_doc(&self) -> Option<&'a str> {
        match self {
            DocElement::Type(t) => t.doc.as_deref(),
            DocElement::Member { member, .. } => member.doc(),
            DocElement::EnumValue { value, .. } => value.doc.as_deref(),
        }
    }

    fn source(&self) -> Option<&'a str> {
        match self {
            DocElement::Type(t) => t.source.as_deref(),
            DocElement::Member { owner, .. } | DocElement::EnumValue { owner, .. } => {
                owner.source.as_deref()
            }
        }
    }

    /// Pattern locating the element's declaration in source text
    fn declaration_pattern(&self) -> Option<Regex> {
        let pattern = match self {
            DocElement::Type(t) => format!(
                r"\b(?:class|interface|enum|record|struct|trait)\s+{}\b",
                regex::escape(t.simple_name())
            ),
            DocElement::Member {
                member: Member::Method(m),
                ..
            } => format!(r"\b{}\s*\(", regex::escape(&m.name)),
            DocElement::Member {
                member: Member::Field(f),
                ..
            } => format!(r"\b{}\s*[;=:,]", regex::escape(&f.name)),
            DocElement::EnumValue { value, .. } => {
                format!(r"\b{}\b\s*[,;(}}]", regex::escape(&value.name))
            }
        };
        Regex::new(&pattern).ok()
    }
}

/// Resolve a description through the fallback chain
///
/// `include_source` disables step 2 when false.
pub fn describe(annotation: Option<&str>, element: DocElement<'_>, include_source: bool) -> String {
    // Marker text wins when present
    if let Some(text) = annotation.map(str::trim).filter(|s| !s.is_empty()) {
        return text.to_string();
    }

    if !include_source {
        return String::new();
    }

    extract(element).unwrap_or_default()
}

/// Description as an optional value, `None` when the chain yields empty
pub fn describe_opt(
    annotation: Option<&str>,
    element: DocElement<'_>,
    include_source: bool,
) -> Option<String> {
    Some(describe(annotation, element, include_source)).filter(|s| !s.is_empty())
}

fn extract(element: DocElement<'_>) -> Option<String> {
    if let Some(raw) = element.attached_doc() {
        let cleaned = clean_comment(raw);
        if !cleaned.is_empty() {
            return Some(cleaned);
        }
    }

    let source = element.source()?;
    let declaration = element.declaration_pattern()?.find(source)?;
    leading_comment(&source[..declaration.start()]).map(|raw| clean_comment(&raw))
}

/// The documentation comment directly above the end of `preceding`
fn leading_comment(preceding: &str) -> Option<String> {
    // Consecutive `///` lines directly above the declaration line; the
    // partial line holding modifiers is skipped
    let above = preceding.rfind('\n').map_or("", |i| &preceding[..i]);
    let mut lines: Vec<&str> = Vec::new();
    for line in above.lines().rev() {
        let trimmed = line.trim();
        if trimmed.starts_with("///") {
            lines.push(trimmed);
        } else if trimmed.is_empty() || trimmed.starts_with('@') || trimmed.starts_with("#[") {
            if !lines.is_empty() {
                break;
            }
        } else {
            break;
        }
    }
    if !lines.is_empty() {
        lines.reverse();
        return Some(lines.join("\n"));
    }

    // Last `/** ... */` block, unless another statement or body sits between
    // it and the declaration
    let block = DOC_BLOCK.find_iter(preceding).last()?;
    let between = &preceding[block.end()..];
    if between.contains([';', '{', '}']) {
        None
    } else {
        Some(block.as_str().to_string())
    }
}

/// Strip comment syntax, cut at the first block tag, collapse whitespace
pub fn clean_comment(raw: &str) -> String {
    let body = raw.trim();
    let body = body.strip_prefix("/**").unwrap_or(body);
    let body = body.strip_suffix("*/").unwrap_or(body);

    let mut kept = Vec::new();
    for line in body.lines() {
        let line = line.trim();
        let line = line
            .strip_prefix("///")
            .or_else(|| line.strip_prefix("//!"))
            .or_else(|| line.strip_prefix('*'))
            .unwrap_or(line)
            .trim();
        if line.starts_with('@') {
            break;
        }
        kept.push(line);
    }

    WHITESPACE.replace_all(kept.join(" ").trim(), " ").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::descriptor::{FieldDescriptor, MethodDescriptor, TypeKind, TypeSignature};

    const BOOK_SOURCE: &str = r#"
package com.example;

/**
 * A book in the catalogue.
 *
 * @author someone
 */
@GType
public class Book {
    /** The title as printed on the cover. */
    private String title;

    private String isbn;

    /**
     * Number of pages.
     * @return the count
     */
    public int getPages() { return pages; }
}
"#;

    fn book() -> TypeDescriptor {
        TypeDescriptor::new("com.example.Book", TypeKind::Class)
            .with_source(BOOK_SOURCE)
            .with_field(FieldDescriptor::new("title", TypeSignature::class("String")))
            .with_field(FieldDescriptor::new("isbn", TypeSignature::class("String")))
            .with_method(MethodDescriptor::new("getPages", TypeSignature::primitive("int")))
    }

    #[test]
    fn test_annotation_wins() {
        let book = book();
        let text = describe(Some("  Explicit text "), DocElement::Type(&book), true);
        assert_eq!(text, "Explicit text");
    }

    #[test]
    fn test_blank_annotation_falls_back_to_source() {
        let book = book();
        assert_eq!(describe(Some("   "), DocElement::Type(&book), true), "A book in the catalogue.");
    }

    #[test]
    fn test_member_comments_from_source() {
        let book = book();
        let title = DocElement::Member {
            owner: &book,
            member: Member::Field(&book.fields[0]),
        };
        assert_eq!(describe(None, title, true), "The title as printed on the cover.");

        let pages = DocElement::Member {
            owner: &book,
            member: Member::Method(&book.methods[0]),
        };
        assert_eq!(describe(None, pages, true), "Number of pages.");
    }

    #[test]
    fn test_undocumented_member_is_empty() {
        let book = book();
        let isbn = DocElement::Member {
            owner: &book,
            member: Member::Field(&book.fields[1]),
        };
        assert_eq!(describe(None, isbn, true), "");
        assert_eq!(describe_opt(None, isbn, true), None);
    }

    #[test]
    fn test_line_comments_from_source() {
        let source = "/// A reader of books.\n#[derive(Debug)]\npub struct Reader {\n    /// Display name.\n    pub name: String,\n}\n";
        let reader = TypeDescriptor::new("lib.Reader", TypeKind::Class)
            .with_source(source)
            .with_field(FieldDescriptor::new("name", TypeSignature::class("String")));

        assert_eq!(describe(None, DocElement::Type(&reader), true), "A reader of books.");

        let name = DocElement::Member {
            owner: &reader,
            member: Member::Field(&reader.fields[0]),
        };
        assert_eq!(describe(None, name, true), "Display name.");
    }

    #[test]
    fn test_attached_doc_preferred() {
        let book = book().with_doc("/// Attached by the scanner.\n/// Second line.");
        assert_eq!(
            describe(None, DocElement::Type(&book), true),
            "Attached by the scanner. Second line."
        );
    }

    #[test]
    fn test_source_extraction_can_be_disabled() {
        let book = book();
        assert_eq!(describe(None, DocElement::Type(&book), false), "");
    }

    #[test]
    fn test_clean_comment() {
        assert_eq!(
            clean_comment("/**\n * First   line\n * second\n * @param x ignored\n */"),
            "First line second"
        );
        assert_eq!(clean_comment("/// Rust style"), "Rust style");
    }
}
