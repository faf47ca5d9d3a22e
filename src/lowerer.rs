//! Markup lowering
//!
//! Walks one markup root and turns it into render-manager instructions plus
//! deferred handler attachments. Nested markup found inside embedded
//! expressions is lowered with the same bindings and spliced back as an
//! immediately invoked function.

use crate::emitter::{HandlerAttachment, Instruction, InstructionEmitter, Operand, RenderMethod, Snippet};
use crate::error::StructuralError;
use crate::handler_id::HandlerIdAllocator;
use crate::markup::{AttrValue, Attribute, Element, Expr, ExprShape, MarkupNode, Precedence, Segment};
use crate::scope::ScopeBindings;
use crate::snippets;
use crate::special::{is_special, SpecialAttribute, SpecialTag};
use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    static ref IDENTIFIER: Regex = Regex::new(r"^[A-Za-z_$][A-Za-z0-9_$]*$").unwrap();
}

const EVENT_PREFIX: &str = "on";

/// Result of lowering one markup root.
#[derive(Debug, Clone, PartialEq)]
pub struct LoweredMarkup {
    pub instructions: Vec<Instruction>,
    pub attachments: Vec<HandlerAttachment>,
    /// Whether any instruction references the control binding.
    pub uses_control: bool,
    /// Markup lowered inside embedded expressions, at every depth.
    pub nested: Vec<NestedMarkup>,
}

/// Markup found inside an embedded expression, spliced back as `code`.
#[derive(Debug, Clone, PartialEq)]
pub struct NestedMarkup {
    /// The immediately invoked function standing in for the markup.
    pub code: String,
    pub instructions: Vec<Instruction>,
}

impl LoweredMarkup {
    pub fn statements(&self, render_manager: &str) -> Vec<String> {
        snippets::render_instructions(render_manager, &self.instructions)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// TREE LOWERER
// ═══════════════════════════════════════════════════════════════════════════════

pub struct TreeLowerer<'b> {
    bindings: &'b ScopeBindings,
    handler_ids: &'b HandlerIdAllocator,
    emitter: InstructionEmitter,
    uses_control: bool,
    nested: Vec<NestedMarkup>,
}

impl<'b> TreeLowerer<'b> {
    pub fn new(bindings: &'b ScopeBindings, handler_ids: &'b HandlerIdAllocator) -> Self {
        Self {
            bindings,
            handler_ids,
            emitter: InstructionEmitter::new(),
            uses_control: false,
            nested: Vec::new(),
        }
    }

    pub fn lower(mut self, root: &MarkupNode) -> Result<LoweredMarkup, StructuralError> {
        self.render_node(root)?;
        let (instructions, attachments) = self.emitter.finish();
        Ok(LoweredMarkup {
            instructions,
            attachments,
            uses_control: self.uses_control,
            nested: self.nested,
        })
    }

    fn render_node(&mut self, node: &MarkupNode) -> Result<(), StructuralError> {
        match node {
            MarkupNode::Element(el) => self.render_element(el),
            MarkupNode::Text(text) => {
                self.emitter.write_escaped(Operand::str(text.as_str()));
                Ok(())
            }
            MarkupNode::Expression(slot) => match slot {
                Some(expr) => self.render_expression(expr),
                None => Ok(()),
            },
            MarkupNode::Fragment(children) => {
                for child in children {
                    self.render_node(child)?;
                }
                Ok(())
            }
        }
    }

    fn render_element(&mut self, el: &Element) -> Result<(), StructuralError> {
        if is_special(&el.tag) {
            let tag = SpecialTag::parse(&el.tag, el.span)?;
            return self.render_special_tag(tag, el);
        }

        self.emitter.write(Operand::str(format!("<{}", el.tag)));

        let mut styles_flushed = false;
        for attr in &el.attributes {
            self.render_attribute(attr, &mut styles_flushed)?;
        }
        if !styles_flushed {
            self.emitter.call(RenderMethod::WriteStyles, vec![]);
        }
        self.emitter.call(RenderMethod::WriteClasses, vec![]);

        self.emitter
            .write(Operand::str(if el.self_closing { "/>" } else { ">" }));

        for child in &el.children {
            self.render_node(child)?;
        }

        if !el.self_closing {
            self.emitter.write(Operand::str(format!("</{}>", el.tag)));
        }
        Ok(())
    }

    /// `writeEscaped((<expr> || ""))`, or inline lowering when the slot holds
    /// nothing but markup. An expression embedding markup renders while it is
    /// evaluated, so its result goes through the content snippet instead.
    fn render_expression(&mut self, expr: &Expr) -> Result<(), StructuralError> {
        if let Some(markup) = expr.as_markup() {
            return self.render_node(markup);
        }
        let value = self.operand(expr)?;
        if expr.contains_markup() {
            self.emitter.snippet(Snippet::Content(value));
            return Ok(());
        }
        let text = format!("({} || \"\")", snippets::operand(&value));
        self.emitter.write_escaped(Operand::atom(text));
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Attributes
    // ───────────────────────────────────────────────────────────────────────────

    fn render_attribute(
        &mut self,
        attr: &Attribute,
        styles_flushed: &mut bool,
    ) -> Result<(), StructuralError> {
        let (name, value, span) = match attr {
            Attribute::Spread(expr) => {
                let attrs = self.operand(expr)?;
                self.emitter.snippet(Snippet::Attributes(attrs));
                return Ok(());
            }
            Attribute::Named { name, value, span } => (name.as_str(), value.as_ref(), *span),
        };

        if is_special(name) {
            let special = SpecialAttribute::parse(name, span)?;
            return self.render_special_attribute(special, value);
        }
        if name.starts_with(EVENT_PREFIX) {
            return self.render_event_handler(name, value);
        }

        match name {
            "id" => self.render_id(value),
            "class" => self.render_class(value),
            "style" => {
                self.render_style(value)?;
                *styles_flushed = true;
                Ok(())
            }
            _ => {
                let value = match value {
                    None => Operand::str(name),
                    Some(AttrValue::Literal(s)) => Operand::str(s.as_str()),
                    // Not produced from parsed source, see `AttrValue::Expression`.
                    Some(AttrValue::Expression(None)) => return Ok(()),
                    Some(AttrValue::Expression(Some(expr))) => self.operand(expr)?,
                };
                self.emitter.call(
                    RenderMethod::WriteAttributeEscaped,
                    vec![Operand::str(name), value],
                );
                Ok(())
            }
        }
    }

    fn render_id(&mut self, value: Option<&AttrValue>) -> Result<(), StructuralError> {
        let id = match value {
            Some(AttrValue::Literal(s)) => Operand::str(s.as_str()),
            Some(AttrValue::Expression(Some(expr))) => self.operand(expr)?,
            _ => return Ok(()),
        };
        self.uses_control = true;
        self.emitter.snippet(Snippet::ScopedId {
            control: self.bindings.control.clone(),
            id,
        });
        Ok(())
    }

    fn render_class(&mut self, value: Option<&AttrValue>) -> Result<(), StructuralError> {
        match value {
            Some(AttrValue::Literal(s)) => {
                for class in s.split_whitespace() {
                    self.emitter
                        .call(RenderMethod::AddClass, vec![Operand::str(class)]);
                }
            }
            Some(AttrValue::Expression(Some(expr))) => {
                let classes = self.operand(expr)?;
                self.emitter.snippet(Snippet::Classes(classes));
            }
            _ => {}
        }
        Ok(())
    }

    fn render_style(&mut self, value: Option<&AttrValue>) -> Result<(), StructuralError> {
        match value {
            Some(AttrValue::Literal(s)) => {
                for declaration in s.split(';').map(str::trim).filter(|d| !d.is_empty()) {
                    match declaration.split_once(':') {
                        Some((name, value)) => self.emitter.call(
                            RenderMethod::AddStyle,
                            vec![Operand::str(name.trim()), Operand::str(value.trim())],
                        ),
                        None => tracing::debug!(declaration, "skipping style without a value"),
                    }
                }
            }
            Some(AttrValue::Expression(Some(expr))) => {
                let styles = self.operand(expr)?;
                self.emitter.snippet(Snippet::Styles(styles));
            }
            _ => {}
        }
        self.emitter.call(RenderMethod::WriteStyles, vec![]);
        Ok(())
    }

    fn render_event_handler(
        &mut self,
        name: &str,
        value: Option<&AttrValue>,
    ) -> Result<(), StructuralError> {
        let handler = match value {
            Some(AttrValue::Literal(method)) => Operand::atom(bound_method(method)),
            Some(AttrValue::Expression(Some(expr))) => self.operand(expr)?,
            _ => {
                tracing::debug!(attribute = name, "event handler without a value");
                return Ok(());
            }
        };

        let class = self.handler_ids.next_class();
        self.emitter
            .call(RenderMethod::AddClass, vec![Operand::str(class.as_str())]);
        self.emitter.attach(HandlerAttachment {
            selector: format!(".{}", class),
            event: name[EVENT_PREFIX.len()..].to_string(),
            handler,
        });
        Ok(())
    }

    fn render_special_attribute(
        &mut self,
        attr: SpecialAttribute,
        value: Option<&AttrValue>,
    ) -> Result<(), StructuralError> {
        match attr {
            SpecialAttribute::ControlData => {
                let control = self.control();
                self.emitter.call(RenderMethod::WriteControlData, vec![control]);
            }
            SpecialAttribute::ElementData => {
                let control = self.control();
                self.emitter.call(RenderMethod::WriteElementData, vec![control]);
            }
            SpecialAttribute::Accessibility => match value {
                None => {
                    let control = self.control();
                    self.emitter.call(
                        RenderMethod::WriteAccessibilityState,
                        vec![control, Operand::atom("{}")],
                    );
                }
                Some(AttrValue::Expression(Some(expr))) => match &expr.shape {
                    ExprShape::Array(items) if items.len() == 2 => {
                        let element = self.operand(&items[0])?;
                        let properties = self.operand(&items[1])?;
                        self.emitter.call(
                            RenderMethod::WriteAccessibilityState,
                            vec![element, properties],
                        );
                    }
                    ExprShape::Object => {
                        let control = self.control();
                        let properties = self.operand(expr)?;
                        self.emitter.call(
                            RenderMethod::WriteAccessibilityState,
                            vec![control, properties],
                        );
                    }
                    _ => tracing::debug!("ui5aria value is neither a pair nor an object"),
                },
                Some(_) => tracing::debug!("ui5aria value is not an expression"),
            },
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Special tags
    // ───────────────────────────────────────────────────────────────────────────

    fn render_special_tag(&mut self, tag: SpecialTag, el: &Element) -> Result<(), StructuralError> {
        let child = self.special_child(el)?;
        match tag {
            SpecialTag::Control | SpecialTag::Aggregation => {
                let target = match child {
                    SpecialChild::Text(name) => {
                        let control = self.control();
                        Operand::atom(format!(
                            "{}.getAggregation({})",
                            snippets::argument(&control),
                            snippets::quote(name)
                        ))
                    }
                    SpecialChild::Expression(expr) => self.operand(expr)?,
                };
                self.emitter.snippet(match tag {
                    SpecialTag::Control => Snippet::Control(target),
                    _ => Snippet::Aggregation(target),
                });
            }
            SpecialTag::Icon => {
                let args = match child {
                    SpecialChild::Text(url) => vec![Operand::str(url)],
                    SpecialChild::Expression(expr) => match &expr.shape {
                        ExprShape::Array(items) if items.is_empty() => {
                            vec![Operand::atom("undefined")]
                        }
                        ExprShape::Array(items) => items
                            .iter()
                            .take(3)
                            .map(|item| self.operand(item))
                            .collect::<Result<Vec<_>, _>>()?,
                        _ => vec![self.operand(expr)?],
                    },
                };
                self.emitter.call(RenderMethod::WriteIcon, args);
            }
        }
        Ok(())
    }

    /// The single text or non-empty expression child of a special tag.
    /// Whitespace-only text is layout and does not count.
    fn special_child<'e>(&self, el: &'e Element) -> Result<SpecialChild<'e>, StructuralError> {
        let mut children = el.children.iter().filter(|child| {
            !matches!(child, MarkupNode::Text(t) if t.trim().is_empty())
        });

        let missing = || StructuralError::MissingSpecialTagChild {
            tag: el.tag.clone(),
            span: el.span,
        };
        let unsupported = || StructuralError::UnsupportedSpecialTagChild {
            tag: el.tag.clone(),
            span: el.span,
        };

        let child = children.next().ok_or_else(missing)?;
        if children.next().is_some() {
            return Err(unsupported());
        }

        match child {
            MarkupNode::Text(text) => Ok(SpecialChild::Text(text.trim())),
            MarkupNode::Expression(Some(expr)) => Ok(SpecialChild::Expression(expr)),
            _ => Err(unsupported()),
        }
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Operands
    // ───────────────────────────────────────────────────────────────────────────

    fn control(&mut self) -> Operand {
        self.uses_control = true;
        Operand::atom(self.bindings.control.as_str())
    }

    /// Source text of an embedded expression, with nested markup lowered in
    /// place.
    fn operand(&mut self, expr: &Expr) -> Result<Operand, StructuralError> {
        if let Some(text) = expr.plain_source() {
            return Ok(Operand::code(text, expr.precedence));
        }

        let mut text = String::new();
        for segment in &expr.segments {
            match segment {
                Segment::Code(code) => text.push_str(code),
                Segment::Markup(node) => text.push_str(&self.lower_nested(node)?),
            }
        }
        let precedence = if expr.as_markup().is_some() {
            Precedence::Atomic
        } else {
            expr.precedence
        };
        Ok(Operand::code(text, precedence))
    }

    fn lower_nested(&mut self, node: &MarkupNode) -> Result<String, StructuralError> {
        let nested = TreeLowerer::new(self.bindings, self.handler_ids).lower(node)?;
        self.uses_control |= nested.uses_control;
        let statements = nested.statements(&self.bindings.render_manager);
        for attachment in nested.attachments {
            self.emitter.attach(attachment);
        }
        let code = snippets::iife(&statements);
        self.nested.push(NestedMarkup {
            code: code.clone(),
            instructions: nested.instructions,
        });
        self.nested.extend(nested.nested);
        Ok(code)
    }
}

enum SpecialChild<'e> {
    Text(&'e str),
    Expression(&'e Expr),
}

/// `this.<method>.bind(this)` for a handler named by a string literal.
fn bound_method(method: &str) -> String {
    if IDENTIFIER.is_match(method) {
        format!("this.{}.bind(this)", method)
    } else {
        format!("this[{}].bind(this)", snippets::quote(method))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bound_method() {
        assert_eq!(bound_method("_onPress"), "this._onPress.bind(this)");
        assert_eq!(bound_method("on-press"), "this[\"on-press\"].bind(this)");
    }
}
