//! Owned markup tree
//!
//! The lowering pass never touches the oxc AST directly. A markup root is first
//! converted into this small owned tree: tags, attributes, text and embedded
//! expressions. Embedded expressions keep their verbatim source text, split
//! around any markup nested inside them so that nested roots can be lowered
//! with the same bindings as the outer one.

use oxc_ast::ast::*;
use oxc_ast_visit::Visit;
use oxc_span::{GetSpan, Span};

// ═══════════════════════════════════════════════════════════════════════════════
// TREE TYPES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum MarkupNode {
    Element(Element),
    Text(String),
    Expression(ExprSlot),
    Fragment(Vec<MarkupNode>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: String,
    pub attributes: Vec<Attribute>,
    pub children: Vec<MarkupNode>,
    pub self_closing: bool,
    pub span: Span,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Attribute {
    Named {
        name: String,
        value: Option<AttrValue>,
        span: Span,
    },
    Spread(Expr),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Literal(String),
    /// oxc rejects `a={}` as an attribute value, so the slot is only empty
    /// in trees built by hand.
    Expression(ExprSlot),
}

/// `{}` is an empty slot.
pub type ExprSlot = Option<Expr>;

/// An embedded expression.
#[derive(Debug, Clone, PartialEq)]
pub struct Expr {
    pub segments: Vec<Segment>,
    pub shape: ExprShape,
    pub precedence: Precedence,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Segment {
    Code(String),
    Markup(MarkupNode),
}

/// The few expression shapes the lowering grammar looks at.
#[derive(Debug, Clone, PartialEq)]
pub enum ExprShape {
    StringLiteral(String),
    Array(Vec<Expr>),
    Object,
    Markup(Box<MarkupNode>),
    Other,
}

/// How tightly an expression binds when spliced into generated code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Precedence {
    /// Safe anywhere (identifiers, calls, member chains, literals, parens).
    Atomic,
    /// Needs parentheses next to an operator.
    Operator,
    /// Comma expression, needs parentheses even as a call argument.
    Sequence,
}

impl Expr {
    /// Builds a plain code expression, used for synthesized operands.
    pub fn code(text: impl Into<String>, precedence: Precedence) -> Self {
        Expr {
            segments: vec![Segment::Code(text.into())],
            shape: ExprShape::Other,
            precedence,
        }
    }

    /// The markup this expression consists of, if it is nothing but markup.
    pub fn as_markup(&self) -> Option<&MarkupNode> {
        match &self.shape {
            ExprShape::Markup(node) => Some(node),
            _ => None,
        }
    }

    pub fn contains_markup(&self) -> bool {
        self.segments.iter().any(|s| matches!(s, Segment::Markup(_)))
    }

    /// Source text, or `None` when nested markup has to be lowered first.
    pub fn plain_source(&self) -> Option<String> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Code(code) => out.push_str(code),
                Segment::Markup(_) => return None,
            }
        }
        Some(out)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// CONVERSION FROM OXC
// ═══════════════════════════════════════════════════════════════════════════════

/// Converts oxc JSX nodes into owned markup, slicing expression text out of
/// `source`.
pub struct MarkupConverter<'s> {
    source: &'s str,
}

impl<'s> MarkupConverter<'s> {
    pub fn new(source: &'s str) -> Self {
        Self { source }
    }

    fn slice(&self, span: Span) -> &'s str {
        &self.source[span.start as usize..span.end as usize]
    }

    pub fn element(&self, element: &JSXElement<'_>) -> MarkupNode {
        let tag = get_tag_name(&element.opening_element.name);

        let attributes = element
            .opening_element
            .attributes
            .iter()
            .map(|item| match item {
                JSXAttributeItem::Attribute(attr) => Attribute::Named {
                    name: get_attribute_name(&attr.name),
                    value: attr.value.as_ref().map(|v| self.attribute_value(v)),
                    span: attr.span,
                },
                JSXAttributeItem::SpreadAttribute(spread) => {
                    Attribute::Spread(self.expression(&spread.argument))
                }
            })
            .collect();

        MarkupNode::Element(Element {
            tag,
            attributes,
            children: self.children(&element.children),
            self_closing: element.closing_element.is_none(),
            span: element.span,
        })
    }

    pub fn fragment(&self, fragment: &JSXFragment<'_>) -> MarkupNode {
        MarkupNode::Fragment(self.children(&fragment.children))
    }

    fn children(&self, children: &[JSXChild<'_>]) -> Vec<MarkupNode> {
        children
            .iter()
            .map(|child| match child {
                JSXChild::Text(t) => MarkupNode::Text(t.value.to_string()),
                JSXChild::Element(el) => self.element(el),
                JSXChild::Fragment(frag) => self.fragment(frag),
                JSXChild::ExpressionContainer(container) => {
                    MarkupNode::Expression(self.jsx_expression(&container.expression))
                }
                JSXChild::Spread(spread) => {
                    MarkupNode::Expression(Some(self.expression(&spread.expression)))
                }
            })
            .collect()
    }

    fn attribute_value(&self, value: &JSXAttributeValue<'_>) -> AttrValue {
        match value {
            JSXAttributeValue::StringLiteral(s) => AttrValue::Literal(s.value.to_string()),
            JSXAttributeValue::ExpressionContainer(container) => {
                AttrValue::Expression(self.jsx_expression(&container.expression))
            }
            JSXAttributeValue::Element(el) => {
                AttrValue::Expression(Some(markup_expr(self.element(el))))
            }
            JSXAttributeValue::Fragment(frag) => {
                AttrValue::Expression(Some(markup_expr(self.fragment(frag))))
            }
        }
    }

    fn jsx_expression(&self, jsx_expr: &JSXExpression<'_>) -> ExprSlot {
        jsx_expr.as_expression().map(|e| self.expression(e))
    }

    /// Converts an arbitrary expression, lowering-aware of nested markup.
    pub fn expression(&self, expr: &Expression<'_>) -> Expr {
        let inner = strip_parens(expr);
        let shape = match inner {
            Expression::StringLiteral(s) => ExprShape::StringLiteral(s.value.to_string()),
            Expression::ArrayExpression(arr) => ExprShape::Array(
                arr.elements
                    .iter()
                    .map(|element| match element.as_expression() {
                        Some(e) => self.expression(e),
                        None => match element {
                            ArrayExpressionElement::Elision(_) => {
                                Expr::code("undefined", Precedence::Atomic)
                            }
                            _ => Expr::code(self.slice(element.span()), Precedence::Sequence),
                        },
                    })
                    .collect(),
            ),
            Expression::ObjectExpression(_) => ExprShape::Object,
            Expression::JSXElement(el) => ExprShape::Markup(Box::new(self.element(el))),
            Expression::JSXFragment(frag) => ExprShape::Markup(Box::new(self.fragment(frag))),
            _ => ExprShape::Other,
        };

        let segments = match &shape {
            ExprShape::Markup(node) => vec![Segment::Markup((**node).clone())],
            _ => self.segments(expr),
        };

        Expr {
            segments,
            shape,
            precedence: precedence_of(expr),
        }
    }

    /// Splits the expression text around the outermost markup nested in it.
    fn segments(&self, expr: &Expression<'_>) -> Vec<Segment> {
        let mut finder = NestedMarkupFinder {
            converter: self,
            found: Vec::new(),
        };
        finder.visit_expression(expr);

        let span = expr.span();
        if finder.found.is_empty() {
            return vec![Segment::Code(self.slice(span).to_string())];
        }

        finder.found.sort_by_key(|(s, _)| s.start);
        let mut segments = Vec::new();
        let mut cursor = span.start;
        for (nested_span, node) in finder.found {
            if nested_span.start > cursor {
                segments.push(Segment::Code(
                    self.slice(Span::new(cursor, nested_span.start)).to_string(),
                ));
            }
            segments.push(Segment::Markup(node));
            cursor = nested_span.end;
        }
        if cursor < span.end {
            segments.push(Segment::Code(self.slice(Span::new(cursor, span.end)).to_string()));
        }
        segments
    }
}

/// Collects the outermost markup inside an expression without descending into it.
struct NestedMarkupFinder<'c, 's> {
    converter: &'c MarkupConverter<'s>,
    found: Vec<(Span, MarkupNode)>,
}

impl<'a, 'c, 's> Visit<'a> for NestedMarkupFinder<'c, 's> {
    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        self.found.push((it.span, self.converter.element(it)));
    }

    fn visit_jsx_fragment(&mut self, it: &JSXFragment<'a>) {
        self.found.push((it.span, self.converter.fragment(it)));
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn strip_parens<'b, 'a>(mut expr: &'b Expression<'a>) -> &'b Expression<'a> {
    while let Expression::ParenthesizedExpression(paren) = expr {
        expr = &paren.expression;
    }
    expr
}

fn markup_expr(node: MarkupNode) -> Expr {
    Expr {
        segments: vec![Segment::Markup(node.clone())],
        shape: ExprShape::Markup(Box::new(node)),
        precedence: Precedence::Atomic,
    }
}

fn precedence_of(expr: &Expression<'_>) -> Precedence {
    match expr {
        Expression::ParenthesizedExpression(_)
        | Expression::Identifier(_)
        | Expression::StringLiteral(_)
        | Expression::NumericLiteral(_)
        | Expression::BooleanLiteral(_)
        | Expression::NullLiteral(_)
        | Expression::BigIntLiteral(_)
        | Expression::RegExpLiteral(_)
        | Expression::TemplateLiteral(_)
        | Expression::TaggedTemplateExpression(_)
        | Expression::ThisExpression(_)
        | Expression::ArrayExpression(_)
        | Expression::ObjectExpression(_)
        | Expression::CallExpression(_)
        | Expression::NewExpression(_)
        | Expression::StaticMemberExpression(_)
        | Expression::ComputedMemberExpression(_)
        | Expression::PrivateFieldExpression(_)
        | Expression::ChainExpression(_)
        | Expression::JSXElement(_)
        | Expression::JSXFragment(_) => Precedence::Atomic,
        Expression::SequenceExpression(_) => Precedence::Sequence,
        _ => Precedence::Operator,
    }
}

pub fn get_tag_name(name: &JSXElementName<'_>) -> String {
    match name {
        JSXElementName::Identifier(id) => id.name.to_string(),
        JSXElementName::IdentifierReference(id) => id.name.to_string(),
        JSXElementName::NamespacedName(ns) => format!("{}:{}", ns.namespace.name, ns.name.name),
        JSXElementName::MemberExpression(me) => get_member_name(me),
        JSXElementName::ThisExpression(_) => "this".to_string(),
    }
}

fn get_member_name(me: &JSXMemberExpression<'_>) -> String {
    let object = match &me.object {
        JSXMemberExpressionObject::IdentifierReference(id) => id.name.to_string(),
        JSXMemberExpressionObject::MemberExpression(inner) => get_member_name(inner),
        JSXMemberExpressionObject::ThisExpression(_) => "this".to_string(),
    };
    format!("{}.{}", object, me.property.name)
}

fn get_attribute_name(name: &JSXAttributeName<'_>) -> String {
    match name {
        JSXAttributeName::Identifier(id) => id.name.to_string(),
        JSXAttributeName::NamespacedName(ns) => {
            format!("{}:{}", ns.namespace.name, ns.name.name)
        }
    }
}
