#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_span::Span;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_PARSE: &str = "JSX-ERR-PARSE";
pub const ERR_SPECIAL_TAG: &str = "JSX-ERR-SPECIAL-TAG";
pub const ERR_SPECIAL_ATTRIBUTE: &str = "JSX-ERR-SPECIAL-ATTRIBUTE";
pub const ERR_SPECIAL_CHILD: &str = "JSX-ERR-SPECIAL-CHILD";

// ═══════════════════════════════════════════════════════════════════════════════
// STRUCTURAL ERRORS
// ═══════════════════════════════════════════════════════════════════════════════

/// Fatal shape errors raised while lowering a single markup root.
///
/// Only explicit markers are checked here. Runtime-shaped values (class maps,
/// aria arrays, ...) are never rejected at compile time.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("Unknown special tag: {tag}")]
    UnknownSpecialTag { tag: String, span: Span },

    #[error("Unknown special attribute: {name}")]
    UnknownSpecialAttribute { name: String, span: Span },

    #[error("Expected child element for {tag} tag.")]
    MissingSpecialTagChild { tag: String, span: Span },

    #[error("Expected a single text or non-empty expression child for {tag} tag.")]
    UnsupportedSpecialTagChild { tag: String, span: Span },
}

impl StructuralError {
    pub fn span(&self) -> Span {
        match self {
            StructuralError::UnknownSpecialTag { span, .. }
            | StructuralError::UnknownSpecialAttribute { span, .. }
            | StructuralError::MissingSpecialTagChild { span, .. }
            | StructuralError::UnsupportedSpecialTagChild { span, .. } => *span,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            StructuralError::UnknownSpecialTag { .. } => ERR_SPECIAL_TAG,
            StructuralError::UnknownSpecialAttribute { .. } => ERR_SPECIAL_ATTRIBUTE,
            StructuralError::MissingSpecialTagChild { .. }
            | StructuralError::UnsupportedSpecialTagChild { .. } => ERR_SPECIAL_CHILD,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

/// Host-facing diagnostic with a source position.
#[derive(Debug, Clone, Serialize, Deserialize, Error, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
#[error("{code}: {message} ({file}:{line}:{column})")]
pub struct CompilerError {
    pub code: String,
    pub message: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
}

impl CompilerError {
    pub fn new(code: &str, message: &str, file: &str, line: u32, column: u32) -> Self {
        CompilerError {
            code: code.to_string(),
            message: message.to_string(),
            file: file.to_string(),
            line,
            column,
        }
    }

    /// Builds a diagnostic positioned at `offset` (a byte offset into `source`).
    pub fn at_offset(code: &str, message: &str, file: &str, source: &str, offset: u32) -> Self {
        let (line, column) = line_column(source, offset);
        Self::new(code, message, file, line, column)
    }

    pub fn from_structural(err: &StructuralError, file: &str, source: &str) -> Self {
        Self::at_offset(err.code(), &err.to_string(), file, source, err.span().start)
    }
}

/// 1-based line and column of a byte offset. Columns count characters.
pub fn line_column(source: &str, offset: u32) -> (u32, u32) {
    let mut end = (offset as usize).min(source.len());
    while !source.is_char_boundary(end) {
        end -= 1;
    }
    let before = &source[..end];
    let line = before.matches('\n').count() as u32 + 1;
    let line_start = before.rfind('\n').map_or(0, |i| i + 1);
    let column = before[line_start..].chars().count() as u32 + 1;
    (line, column)
}
