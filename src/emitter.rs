//! Instruction emitter
//!
//! Append-only builder for the two outputs of a lowered markup root: the
//! ordered render-manager call list and the ordered handler attachments.
//! Instructions are kept as data until the host renders them to text, so
//! tests can replay them against a reference writer.

use crate::markup::Precedence;
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref WHITESPACE_ONLY: Regex = Regex::new(r"^\s*$").unwrap();
}

/// The render-manager capability the generated code calls into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RenderMethod {
    Write,
    WriteEscaped,
    WriteAttribute,
    WriteAttributeEscaped,
    AddClass,
    WriteClasses,
    AddStyle,
    WriteStyles,
    WriteControlData,
    WriteElementData,
    WriteAccessibilityState,
    WriteIcon,
    RenderControl,
}

impl RenderMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            RenderMethod::Write => "write",
            RenderMethod::WriteEscaped => "writeEscaped",
            RenderMethod::WriteAttribute => "writeAttribute",
            RenderMethod::WriteAttributeEscaped => "writeAttributeEscaped",
            RenderMethod::AddClass => "addClass",
            RenderMethod::WriteClasses => "writeClasses",
            RenderMethod::AddStyle => "addStyle",
            RenderMethod::WriteStyles => "writeStyles",
            RenderMethod::WriteControlData => "writeControlData",
            RenderMethod::WriteElementData => "writeElementData",
            RenderMethod::WriteAccessibilityState => "writeAccessibilityState",
            RenderMethod::WriteIcon => "writeIcon",
            RenderMethod::RenderControl => "renderControl",
        }
    }
}

/// A call argument: a string literal known at compile time, or source code
/// passed through untouched.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Str(String),
    Code { text: String, precedence: Precedence },
}

impl Operand {
    pub fn str(value: impl Into<String>) -> Self {
        Operand::Str(value.into())
    }

    pub fn code(text: impl Into<String>, precedence: Precedence) -> Self {
        Operand::Code {
            text: text.into(),
            precedence,
        }
    }

    /// An identifier or another expression that never needs parentheses.
    pub fn atom(text: impl Into<String>) -> Self {
        Self::code(text, Precedence::Atomic)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Operand::Str(s) => Some(s),
            Operand::Code { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderCall {
    pub method: RenderMethod,
    pub args: Vec<Operand>,
}

/// Multi-statement templates whose shape is fixed and whose holes are filled
/// with operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Snippet {
    /// `id` attribute prefixed with the control id.
    ScopedId { control: String, id: Operand },
    /// Runtime class normalization (string, array, map of booleans).
    Classes(Operand),
    /// Runtime style normalization (string, array of `{name, value}`, object).
    Styles(Operand),
    /// Attribute spread over an object.
    Attributes(Operand),
    /// Render every control of an aggregation, tolerating null.
    Aggregation(Operand),
    /// Render a single control if it is present.
    Control(Operand),
    /// Value of an expression that embeds markup. The markup renders itself,
    /// so only a truthy non-array result is written.
    Content(Operand),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Instruction {
    Call(RenderCall),
    Snippet(Snippet),
}

/// Deferred event binding installed by the lifecycle hook.
#[derive(Debug, Clone, PartialEq)]
pub struct HandlerAttachment {
    /// CSS selector of the synthetic handler class (`.__handler3`).
    pub selector: String,
    /// Event name, the attribute name without its `on` prefix.
    pub event: String,
    pub handler: Operand,
}

#[derive(Debug, Default)]
pub struct InstructionEmitter {
    instructions: Vec<Instruction>,
    attachments: Vec<HandlerAttachment>,
}

impl InstructionEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn call(&mut self, method: RenderMethod, args: Vec<Operand>) {
        self.instructions.push(Instruction::Call(RenderCall { method, args }));
    }

    /// `write`, dropping literals that consist solely of whitespace.
    pub fn write(&mut self, text: Operand) {
        if Self::is_blank(&text) {
            tracing::trace!("suppressed blank write");
            return;
        }
        self.call(RenderMethod::Write, vec![text]);
    }

    /// `writeEscaped`, dropping literals that consist solely of whitespace.
    pub fn write_escaped(&mut self, text: Operand) {
        if Self::is_blank(&text) {
            tracing::trace!("suppressed blank writeEscaped");
            return;
        }
        self.call(RenderMethod::WriteEscaped, vec![text]);
    }

    pub fn snippet(&mut self, snippet: Snippet) {
        self.instructions.push(Instruction::Snippet(snippet));
    }

    pub fn attach(&mut self, attachment: HandlerAttachment) {
        self.attachments.push(attachment);
    }

    pub fn finish(self) -> (Vec<Instruction>, Vec<HandlerAttachment>) {
        (self.instructions, self.attachments)
    }

    fn is_blank(text: &Operand) -> bool {
        matches!(text, Operand::Str(s) if WHITESPACE_ONLY.is_match(s))
    }
}
