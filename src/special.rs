//! Reserved `ui5` markers.
//!
//! Tags and attributes whose name starts with `ui5` carry a fixed meaning and
//! never reach the generic lowering path. Parsing them into closed enums keeps
//! the dispatch in the lowerer exhaustive.

use crate::error::StructuralError;
use oxc_span::Span;

/// Reserved name prefix for special tags and attributes.
pub const SPECIAL_PREFIX: &str = "ui5";

pub fn is_special(name: &str) -> bool {
    name.starts_with(SPECIAL_PREFIX)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialTag {
    /// `ui5control` / `ui5ctrl`: render a single control if present.
    Control,
    /// `ui5aggregation` / `ui5aggr`: render every control of an aggregation.
    Aggregation,
    /// `ui5icon`
    Icon,
}

impl SpecialTag {
    pub fn parse(tag: &str, span: Span) -> Result<Self, StructuralError> {
        match tag {
            "ui5control" | "ui5ctrl" => Ok(SpecialTag::Control),
            "ui5aggregation" | "ui5aggr" => Ok(SpecialTag::Aggregation),
            "ui5icon" => Ok(SpecialTag::Icon),
            _ => Err(StructuralError::UnknownSpecialTag {
                tag: tag.to_string(),
                span,
            }),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialAttribute {
    ControlData,
    ElementData,
    Accessibility,
}

impl SpecialAttribute {
    pub fn parse(name: &str, span: Span) -> Result<Self, StructuralError> {
        match name {
            "ui5control" => Ok(SpecialAttribute::ControlData),
            "ui5element" => Ok(SpecialAttribute::ElementData),
            "ui5aria" => Ok(SpecialAttribute::Accessibility),
            _ => Err(StructuralError::UnknownSpecialAttribute {
                name: name.to_string(),
                span,
            }),
        }
    }
}
