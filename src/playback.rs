//! Reference writer
//!
//! An in-memory render manager that replays lowered instructions and produces
//! the HTML a real render manager would write. Arguments are evaluated
//! statically: literals, arrays, objects, conditionals and `||` / `&&` / `??`
//! chains over them, `join`, and `map` with an arrow callback whose
//! parameters are bound while its body runs. Nested markup met during
//! evaluation is replayed in place. Anything else that needs a runtime (free
//! identifiers, calls into controls) is a [`PlaybackError`].

use crate::emitter::{Instruction, Operand, RenderCall, RenderMethod, Snippet};
use crate::lowerer::LoweredMarkup;
use oxc_allocator::Allocator;
use oxc_ast::ast::*;
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType};
use oxc_syntax::operator::{LogicalOperator, UnaryOperator};
use std::collections::HashMap;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PlaybackError {
    #[error("cannot evaluate `{0}` statically")]
    Dynamic(String),
    #[error("{0} is not supported by the reference writer")]
    Unsupported(&'static str),
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUES
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Undefined,
    Null,
    Bool(bool),
    Number(f64),
    Str(String),
    Array(Vec<Value>),
    /// Properties in insertion order.
    Object(Vec<(String, Value)>),
}

impl Value {
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Undefined | Value::Null => false,
            Value::Bool(b) => *b,
            Value::Number(n) => *n != 0.0 && !n.is_nan(),
            Value::Str(s) => !s.is_empty(),
            Value::Array(_) | Value::Object(_) => true,
        }
    }

    /// JavaScript `String(value)`.
    pub fn to_js_string(&self) -> String {
        match self {
            Value::Undefined => "undefined".to_string(),
            Value::Null => "null".to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Number(n) => number_to_string(*n),
            Value::Str(s) => s.clone(),
            Value::Array(items) => items
                .iter()
                .map(|item| match item {
                    Value::Undefined | Value::Null => String::new(),
                    other => other.to_js_string(),
                })
                .collect::<Vec<_>>()
                .join(","),
            Value::Object(_) => "[object Object]".to_string(),
        }
    }

    fn get(&self, key: &str) -> Value {
        match self {
            Value::Object(props) => props
                .iter()
                .find(|(k, _)| k == key)
                .map_or(Value::Undefined, |(_, v)| v.clone()),
            _ => Value::Undefined,
        }
    }
}

fn number_to_string(n: f64) -> String {
    if n.is_nan() {
        "NaN".to_string()
    } else if n.is_infinite() {
        if n > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e21 {
        format!("{}", n as i64)
    } else {
        format!("{}", n)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// REFERENCE WRITER
// ═══════════════════════════════════════════════════════════════════════════════

fn escape_text(s: &str) -> String {
    s.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;")
}

fn escape_attribute(s: &str) -> String {
    escape_text(s).replace('\'', "&apos;").replace('"', "&quot;")
}

/// (property, value that triggers the attribute, attribute)
const ACCESSIBILITY_STATES: [(&str, bool, &str); 6] = [
    ("editable", false, "aria-readonly"),
    ("enabled", false, "aria-disabled"),
    ("visible", false, "aria-hidden"),
    ("required", true, "aria-required"),
    ("selected", true, "aria-selected"),
    ("checked", true, "aria-checked"),
];

#[derive(Debug, Default)]
pub struct ReferenceWriter {
    content: String,
    classes: Vec<String>,
    styles: Vec<(String, String)>,
    control_count: u32,
    element_count: u32,
    /// `getId()` results for control identifiers.
    control_ids: HashMap<String, String>,
    /// Instructions of nested markup, by the code standing in for it.
    nested: HashMap<String, Vec<Instruction>>,
    /// Callback parameters in scope, innermost last.
    bindings: Vec<(String, Value)>,
}

impl ReferenceWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a control identifier and the id its `getId()` returns.
    pub fn with_control(mut self, name: &str, id: &str) -> Self {
        self.control_ids.insert(name.to_string(), id.to_string());
        self
    }

    pub fn html(&self) -> &str {
        &self.content
    }

    pub fn into_html(self) -> String {
        self.content
    }

    /// Replays a lowered root, including the markup nested in its expressions.
    pub fn play_lowered(&mut self, lowered: &LoweredMarkup) -> Result<(), PlaybackError> {
        for nested in &lowered.nested {
            self.nested
                .insert(nested.code.clone(), nested.instructions.clone());
        }
        self.play(&lowered.instructions)
    }

    pub fn play(&mut self, instructions: &[Instruction]) -> Result<(), PlaybackError> {
        for instruction in instructions {
            match instruction {
                Instruction::Call(call) => self.call(call)?,
                Instruction::Snippet(snippet) => self.snippet(snippet)?,
            }
        }
        Ok(())
    }

    fn arg(&mut self, call: &RenderCall, i: usize) -> Result<Value, PlaybackError> {
        match call.args.get(i) {
            Some(op) => self.eval_operand(op),
            None => Ok(Value::Undefined),
        }
    }

    fn call(&mut self, call: &RenderCall) -> Result<(), PlaybackError> {
        match call.method {
            RenderMethod::Write => {
                let text = self.arg(call, 0)?.to_js_string();
                self.content.push_str(&text);
            }
            RenderMethod::WriteEscaped => {
                let text = self.arg(call, 0)?.to_js_string();
                self.content.push_str(&escape_text(&text));
            }
            RenderMethod::WriteAttribute => {
                let (name, value) = (self.arg(call, 0)?, self.arg(call, 1)?);
                self.write_attribute(&name.to_js_string(), &value);
            }
            RenderMethod::WriteAttributeEscaped => {
                let (name, value) = (self.arg(call, 0)?, self.arg(call, 1)?);
                self.write_attribute_escaped(&name.to_js_string(), &value);
            }
            RenderMethod::AddClass => {
                let class = self.arg(call, 0)?.to_js_string();
                self.classes.push(class);
            }
            RenderMethod::WriteClasses => self.write_classes(),
            RenderMethod::AddStyle => {
                let (name, value) = (self.arg(call, 0)?, self.arg(call, 1)?);
                self.add_style(name.to_js_string(), value.to_js_string());
            }
            RenderMethod::WriteStyles => self.write_styles(),
            RenderMethod::WriteControlData => {
                let id = self.data_id(call.args.first(), "__control")?;
                self.write_attribute_escaped("id", &Value::Str(id));
            }
            RenderMethod::WriteElementData => {
                let id = self.data_id(call.args.first(), "__element")?;
                self.write_attribute_escaped("id", &Value::Str(id));
            }
            RenderMethod::WriteAccessibilityState => {
                let properties = self.arg(call, 1)?;
                for (property, trigger, attribute) in ACCESSIBILITY_STATES {
                    if properties.get(property) == Value::Bool(trigger) {
                        self.write_attribute(attribute, &Value::Str("true".to_string()));
                    }
                }
            }
            RenderMethod::WriteIcon => {
                let url = self.arg(call, 0)?;
                let classes = self.arg(call, 1)?;
                let attributes = self.arg(call, 2)?;
                self.write_icon(&url, &classes, &attributes);
            }
            RenderMethod::RenderControl => return Err(PlaybackError::Unsupported("renderControl")),
        }
        Ok(())
    }

    fn snippet(&mut self, snippet: &Snippet) -> Result<(), PlaybackError> {
        match snippet {
            Snippet::ScopedId { control, id } => {
                let prefix = self
                    .control_ids
                    .get(control)
                    .cloned()
                    .ok_or_else(|| PlaybackError::Dynamic(format!("{}.getId()", control)))?;
                let id = self.eval_operand(id)?.to_js_string();
                self.write_attribute_escaped("id", &Value::Str(format!("{}-{}", prefix, id)));
            }
            Snippet::Classes(op) => match self.eval_operand(op)? {
                v if !v.is_truthy() => {}
                Value::Str(s) => self
                    .classes
                    .extend(s.split_whitespace().map(str::to_string)),
                Value::Array(items) => self.classes.extend(
                    items
                        .iter()
                        .filter(|c| c.is_truthy())
                        .map(Value::to_js_string),
                ),
                Value::Object(props) => self.classes.extend(
                    props
                        .into_iter()
                        .filter(|(_, v)| v.is_truthy())
                        .map(|(k, _)| k),
                ),
                _ => {}
            },
            Snippet::Styles(op) => match self.eval_operand(op)? {
                v if !v.is_truthy() => {}
                Value::Str(s) => {
                    for declaration in s.split(';') {
                        if let Some((name, value)) = declaration.split_once(':') {
                            self.add_style(name.trim().to_string(), value.trim().to_string());
                        }
                    }
                }
                Value::Array(items) => {
                    for item in items {
                        self.add_style(item.get("name").to_js_string(), item.get("value").to_js_string());
                    }
                }
                Value::Object(props) => {
                    for (name, value) in props {
                        self.add_style(name, value.to_js_string());
                    }
                }
                _ => {}
            },
            Snippet::Attributes(op) => {
                if let Value::Object(props) = self.eval_operand(op)? {
                    for (name, value) in props {
                        self.write_attribute_escaped(&name, &value);
                    }
                }
            }
            Snippet::Content(op) => match self.eval_operand(op)? {
                Value::Array(_) => {}
                v if v.is_truthy() => self.content.push_str(&escape_text(&v.to_js_string())),
                _ => {}
            },
            Snippet::Aggregation(_) | Snippet::Control(_) => {
                return Err(PlaybackError::Unsupported("renderControl"))
            }
        }
        Ok(())
    }

    // ───────────────────────────────────────────────────────────────────────────
    // Evaluation
    // ───────────────────────────────────────────────────────────────────────────

    fn eval_operand(&mut self, op: &Operand) -> Result<Value, PlaybackError> {
        match op {
            Operand::Str(s) => Ok(Value::Str(s.clone())),
            Operand::Code { text, .. } => self.eval_code(text),
        }
    }

    fn eval_code(&mut self, code: &str) -> Result<Value, PlaybackError> {
        let allocator = Allocator::default();
        let source_type = SourceType::default().with_module(true);
        let expr = Parser::new(&allocator, code, source_type)
            .parse_expression()
            .map_err(|errors| PlaybackError::Dynamic(format!("{} ({:?})", code, errors)))?;
        self.eval_expr(code, &expr)
    }

    fn eval_expr(&mut self, code: &str, expr: &Expression<'_>) -> Result<Value, PlaybackError> {
        let dynamic = || {
            let span = expr.span();
            PlaybackError::Dynamic(code[span.start as usize..span.end as usize].to_string())
        };

        match expr {
            Expression::ParenthesizedExpression(paren) => self.eval_expr(code, &paren.expression),
            Expression::StringLiteral(s) => Ok(Value::Str(s.value.to_string())),
            Expression::NumericLiteral(n) => Ok(Value::Number(n.value)),
            Expression::BooleanLiteral(b) => Ok(Value::Bool(b.value)),
            Expression::NullLiteral(_) => Ok(Value::Null),
            Expression::Identifier(id) if id.name == "undefined" => Ok(Value::Undefined),
            Expression::Identifier(id) => self
                .bindings
                .iter()
                .rev()
                .find(|(name, _)| *name == id.name.as_str())
                .map(|(_, value)| value.clone())
                .ok_or_else(dynamic),
            Expression::TemplateLiteral(t) if t.expressions.is_empty() => Ok(Value::Str(
                t.quasis
                    .first()
                    .and_then(|q| q.value.cooked.as_ref())
                    .map(|c| c.to_string())
                    .unwrap_or_default(),
            )),
            Expression::ArrayExpression(arr) => {
                let mut items = Vec::with_capacity(arr.elements.len());
                for element in &arr.elements {
                    let item = match element {
                        ArrayExpressionElement::Elision(_) => Value::Undefined,
                        ArrayExpressionElement::SpreadElement(_) => return Err(dynamic()),
                        other => match other.as_expression() {
                            Some(e) => self.eval_expr(code, e)?,
                            None => return Err(dynamic()),
                        },
                    };
                    items.push(item);
                }
                Ok(Value::Array(items))
            }
            Expression::ObjectExpression(obj) => {
                let mut props: Vec<(String, Value)> = Vec::new();
                for property in &obj.properties {
                    let ObjectPropertyKind::ObjectProperty(prop) = property else {
                        return Err(dynamic());
                    };
                    let key = match &prop.key {
                        PropertyKey::StaticIdentifier(id) => id.name.to_string(),
                        PropertyKey::StringLiteral(s) => s.value.to_string(),
                        PropertyKey::NumericLiteral(n) => number_to_string(n.value),
                        _ => return Err(dynamic()),
                    };
                    let value = self.eval_expr(code, &prop.value)?;
                    match props.iter_mut().find(|(k, _)| *k == key) {
                        Some(slot) => slot.1 = value,
                        None => props.push((key, value)),
                    }
                }
                Ok(Value::Object(props))
            }
            Expression::LogicalExpression(logical) => {
                let left = self.eval_expr(code, &logical.left)?;
                let take_left = match logical.operator {
                    LogicalOperator::Or => left.is_truthy(),
                    LogicalOperator::And => !left.is_truthy(),
                    LogicalOperator::Coalesce => !matches!(left, Value::Undefined | Value::Null),
                };
                if take_left {
                    Ok(left)
                } else {
                    self.eval_expr(code, &logical.right)
                }
            }
            Expression::ConditionalExpression(cond) => {
                if self.eval_expr(code, &cond.test)?.is_truthy() {
                    self.eval_expr(code, &cond.consequent)
                } else {
                    self.eval_expr(code, &cond.alternate)
                }
            }
            Expression::UnaryExpression(unary) => {
                let value = self.eval_expr(code, &unary.argument)?;
                match (unary.operator, value) {
                    (UnaryOperator::UnaryNegation, Value::Number(n)) => Ok(Value::Number(-n)),
                    (UnaryOperator::LogicalNot, v) => Ok(Value::Bool(!v.is_truthy())),
                    _ => Err(dynamic()),
                }
            }
            Expression::CallExpression(call) => {
                let text = &code[call.span.start as usize..call.span.end as usize];
                if let Some(instructions) = self.nested.get(text).cloned() {
                    self.play(&instructions)?;
                    return Ok(Value::Undefined);
                }
                let Expression::StaticMemberExpression(member) = &call.callee else {
                    return Err(dynamic());
                };
                match member.property.name.as_str() {
                    // `[..].join(sep)` shows up in text children often enough to be worth folding.
                    "join" => {
                        let Value::Array(items) = self.eval_expr(code, &member.object)? else {
                            return Err(dynamic());
                        };
                        let separator = match call.arguments.first().and_then(|a| a.as_expression()) {
                            Some(e) => self.eval_expr(code, e)?.to_js_string(),
                            None => ",".to_string(),
                        };
                        Ok(Value::Str(
                            items
                                .iter()
                                .map(|item| match item {
                                    Value::Undefined | Value::Null => String::new(),
                                    other => other.to_js_string(),
                                })
                                .collect::<Vec<_>>()
                                .join(&separator),
                        ))
                    }
                    "map" => {
                        let Value::Array(items) = self.eval_expr(code, &member.object)? else {
                            return Err(dynamic());
                        };
                        let Some(Argument::ArrowFunctionExpression(arrow)) = call.arguments.first()
                        else {
                            return Err(dynamic());
                        };
                        let mut mapped = Vec::with_capacity(items.len());
                        for (index, item) in items.into_iter().enumerate() {
                            mapped.push(self.call_arrow(code, arrow, [item, Value::Number(index as f64)])?);
                        }
                        Ok(Value::Array(mapped))
                    }
                    _ => Err(dynamic()),
                }
            }
            _ => Err(dynamic()),
        }
    }

    /// Runs an arrow callback whose body is a single expression or `return`.
    fn call_arrow(
        &mut self,
        code: &str,
        arrow: &ArrowFunctionExpression<'_>,
        args: [Value; 2],
    ) -> Result<Value, PlaybackError> {
        let dynamic = || {
            PlaybackError::Dynamic(code[arrow.span.start as usize..arrow.span.end as usize].to_string())
        };
        let body = match arrow.body.statements.as_slice() {
            [Statement::ExpressionStatement(stmt)] if arrow.expression => &stmt.expression,
            [Statement::ReturnStatement(ret)] => match &ret.argument {
                Some(argument) => argument,
                None => return Ok(Value::Undefined),
            },
            _ => return Err(dynamic()),
        };

        let scope = self.bindings.len();
        for (param, value) in arrow.params.items.iter().zip(args) {
            let BindingPattern::BindingIdentifier(id) = &param.pattern else {
                self.bindings.truncate(scope);
                return Err(dynamic());
            };
            self.bindings.push((id.name.to_string(), value));
        }
        let result = self.eval_expr(code, body);
        self.bindings.truncate(scope);
        result
    }

    /// Id for control / element data: the registered control id, or a
    /// generated one when the argument is unknown.
    fn data_id(&mut self, arg: Option<&Operand>, prefix: &str) -> Result<String, PlaybackError> {
        if let Some(Operand::Code { text, .. }) = arg {
            if let Some(id) = self.control_ids.get(text) {
                return Ok(id.clone());
            }
        }
        let counter = if prefix == "__control" {
            &mut self.control_count
        } else {
            &mut self.element_count
        };
        let id = format!("{}{}", prefix, counter);
        *counter += 1;
        Ok(id)
    }

    fn write_attribute(&mut self, name: &str, value: &Value) {
        let value = if value.is_truthy() {
            value.to_js_string()
        } else {
            name.to_string()
        };
        self.content.push_str(&format!(" {}=\"{}\"", name, value));
    }

    fn write_attribute_escaped(&mut self, name: &str, value: &Value) {
        let value = if value.is_truthy() {
            value.to_js_string()
        } else {
            name.to_string()
        };
        let name = escape_attribute(name);
        self.write_attribute(&name, &Value::Str(escape_attribute(&value)));
    }

    fn write_classes(&mut self) {
        if !self.classes.is_empty() {
            let classes = std::mem::take(&mut self.classes).join(" ");
            self.write_attribute_escaped("class", &Value::Str(classes));
        }
    }

    fn add_style(&mut self, name: String, value: String) {
        match self.styles.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = value,
            None => self.styles.push((name, value)),
        }
    }

    fn write_styles(&mut self) {
        if !self.styles.is_empty() {
            let styles = std::mem::take(&mut self.styles)
                .into_iter()
                .map(|(name, value)| format!("{}: {}", name, value))
                .collect::<Vec<_>>()
                .join("; ");
            self.write_attribute_escaped("style", &Value::Str(styles));
        }
    }

    fn write_icon(&mut self, url: &Value, classes: &Value, attributes: &Value) {
        let mut icon = ReferenceWriter {
            control_count: self.control_count,
            element_count: self.element_count,
            ..ReferenceWriter::default()
        };
        icon.content.push_str("<icon");
        icon.write_attribute_escaped("src", url);
        if let Value::Array(items) = classes {
            icon.classes.extend(items.iter().map(Value::to_js_string));
        }
        icon.write_classes();
        if let Value::Object(props) = attributes {
            for (name, value) in props {
                icon.write_attribute_escaped(name, value);
            }
        }
        icon.content.push_str("/>");
        self.content.push_str(&icon.content);
    }
}

/// Replays a lowered root against a fresh writer.
pub fn render_to_html(lowered: &LoweredMarkup) -> Result<String, PlaybackError> {
    let mut writer = ReferenceWriter::new();
    writer.play_lowered(lowered)?;
    Ok(writer.into_html())
}

/// Evaluates a JavaScript expression built only from literals.
pub fn static_eval(code: &str) -> Result<Value, PlaybackError> {
    ReferenceWriter::new().eval_code(code)
}
