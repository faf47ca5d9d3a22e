//! Host transform
//!
//! Parses a script, finds every markup root, lowers it and splices the
//! generated render-manager statements back into the source. Handler
//! attachments are appended to the lifecycle hook of the enclosing control
//! definition; missing hooks and render-function parameters are synthesized.

#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::{Allocator, Vec as ArenaVec};
use oxc_ast::ast::*;
use oxc_ast_visit::{walk, Visit};
use oxc_parser::Parser;
use oxc_span::{GetSpan, SourceType, Span};
use oxc_syntax::scope::ScopeFlags;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::error::{CompilerError, StructuralError, ERR_PARSE};
use crate::handler_id::{HandlerIdAllocator, GLOBAL_HANDLER_IDS};
use crate::lowerer::{LoweredMarkup, TreeLowerer};
use crate::markup::{strip_parens, MarkupConverter, MarkupNode};
use crate::scope::{
    ClassContainer, Frame, FunctionFrame, HookBody, HookKey, HookLookup, LifecycleHook,
    ObjectContainer, ParamList, ScopeBindings, ScopeFrame, ScopeResolver, DEFAULT_CONTROL,
    DEFAULT_RENDER_MANAGER, LIFECYCLE_HOOK,
};
use crate::snippets;
use crate::splice::{self, SourceEdit};

// ═══════════════════════════════════════════════════════════════════════════════
// OPTIONS & OUTPUT
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct TransformOptions {
    /// Used in diagnostics only.
    pub file_path: String,
    pub typescript: bool,
    pub module: bool,
}

impl Default for TransformOptions {
    fn default() -> Self {
        Self {
            file_path: "<anonymous>".to_string(),
            typescript: false,
            module: true,
        }
    }
}

impl TransformOptions {
    pub fn for_file(file_path: impl Into<String>) -> Self {
        let file_path = file_path.into();
        let typescript = file_path.ends_with(".ts") || file_path.ends_with(".tsx");
        Self {
            file_path,
            typescript,
            ..Self::default()
        }
    }

    fn source_type(&self) -> SourceType {
        SourceType::default()
            .with_module(self.module)
            .with_jsx(true)
            .with_typescript(self.typescript)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct TransformOutput {
    pub code: String,
    pub markup_roots: u32,
    pub handler_attachments: u32,
    /// Attachments dropped because no control definition encloses them.
    pub discarded_handlers: u32,
}

/// Where the lowered statements of a root go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// Replace a whole statement.
    Statement { span: Span, in_list: bool },
    /// Replace an expression with an immediately invoked function.
    Expression { span: Span },
}

impl Placement {
    fn span(&self) -> Span {
        match self {
            Placement::Statement { span, .. } | Placement::Expression { span } => *span,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LoweredRoot {
    pub span: Span,
    pub placement: Placement,
    pub bindings: ScopeBindings,
    pub lowered: LoweredMarkup,
}

impl LoweredRoot {
    pub fn statements(&self) -> Vec<String> {
        self.lowered.statements(&self.bindings.render_manager)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Transforms a source file using the process-wide handler ids.
pub fn transform(source: &str, options: &TransformOptions) -> Result<TransformOutput, CompilerError> {
    transform_with_ids(source, options, &GLOBAL_HANDLER_IDS)
}

pub fn transform_with_ids(
    source: &str,
    options: &TransformOptions,
    ids: &HandlerIdAllocator,
) -> Result<TransformOutput, CompilerError> {
    let roots = lower_source(source, options, ids)?;
    Ok(splice_roots(source, &roots))
}

/// Lowers every markup root of `source` without splicing the results.
pub fn lower_source(
    source: &str,
    options: &TransformOptions,
    ids: &HandlerIdAllocator,
) -> Result<Vec<LoweredRoot>, CompilerError> {
    let allocator = Allocator::default();
    let ret = Parser::new(&allocator, source, options.source_type()).parse();

    if let Some(first) = ret.errors.first() {
        let offset = first
            .labels
            .as_ref()
            .and_then(|labels| labels.first())
            .map_or(0, |label| label.offset() as u32);
        return Err(CompilerError::at_offset(
            ERR_PARSE,
            &first.to_string(),
            &options.file_path,
            source,
            offset,
        ));
    }

    let mut collector = RootCollector::new(source, ids);
    collector.visit_program(&ret.program);

    if let Some(err) = collector.error {
        return Err(CompilerError::from_structural(&err, &options.file_path, source));
    }

    tracing::debug!(
        file = %options.file_path,
        roots = collector.roots.len(),
        "lowered markup roots"
    );
    Ok(collector.roots)
}

/// Transforms several files in parallel. Handler ids stay unique across the
/// whole batch.
pub fn transform_batch(
    files: &[(String, String)],
    options: &TransformOptions,
) -> Vec<Result<TransformOutput, CompilerError>> {
    files
        .par_iter()
        .map(|(path, source)| {
            let options = TransformOptions {
                file_path: path.clone(),
                ..options.clone()
            };
            transform(source, &options)
        })
        .collect()
}

#[cfg(feature = "napi")]
#[napi]
pub fn transform_jsx_native(code: String, options_json: Option<String>) -> napi::Result<TransformOutput> {
    let options: TransformOptions = match options_json {
        Some(json) => serde_json::from_str(&json)
            .map_err(|e| napi::Error::from_reason(format!("Options parse error: {}", e)))?,
        None => TransformOptions::default(),
    };
    transform(&code, &options).map_err(|e| napi::Error::from_reason(e.to_string()))
}

#[cfg(feature = "napi")]
#[napi]
pub fn reset_handler_ids_native(seed: Option<u32>) {
    GLOBAL_HANDLER_IDS.seed(seed.unwrap_or(0) as u64);
}

// ═══════════════════════════════════════════════════════════════════════════════
// SPLICING
// ═══════════════════════════════════════════════════════════════════════════════

struct HookGroup<'r> {
    key: HookKey,
    hook: &'r LifecycleHook,
    statements: Vec<String>,
}

struct RenderFunctionEdit {
    key: u32,
    params: ParamList,
    add_render_manager: bool,
    add_control: bool,
}

pub fn splice_roots(source: &str, roots: &[LoweredRoot]) -> TransformOutput {
    let mut edits = Vec::new();
    let mut hooks: Vec<HookGroup> = Vec::new();
    let mut functions: Vec<RenderFunctionEdit> = Vec::new();
    let mut attached = 0u32;
    let mut discarded = 0u32;

    // Roots sharing a placement (several markup arguments of one render call)
    // are replaced together.
    let mut index = 0;
    while index < roots.len() {
        let placement = roots[index].placement;
        let mut statements = Vec::new();
        while index < roots.len() && roots[index].placement.span() == placement.span() {
            statements.extend(roots[index].statements());
            index += 1;
        }
        edits.push(placement_edit(source, placement, &statements));
    }

    for root in roots {
        let attachments = &root.lowered.attachments;

        if !attachments.is_empty() {
            match &root.bindings.lifecycle_hook {
                Some(hook) => {
                    let key = hook.key();
                    let statements = attachments.iter().map(snippets::render_attachment);
                    match hooks.iter_mut().find(|g| g.key == key) {
                        Some(group) => group.statements.extend(statements),
                        None => hooks.push(HookGroup {
                            key,
                            hook,
                            statements: statements.collect(),
                        }),
                    }
                    attached += attachments.len() as u32;
                }
                None => {
                    tracing::warn!(
                        count = attachments.len(),
                        "no control definition encloses the markup; discarding handler attachments"
                    );
                    discarded += attachments.len() as u32;
                }
            }
        }

        if let Some(func) = &root.bindings.render_function {
            let add_control = func.missing_control && root.lowered.uses_control;
            match functions.iter_mut().find(|f| f.key == func.key) {
                Some(edit) => edit.add_control |= add_control,
                None => functions.push(RenderFunctionEdit {
                    key: func.key,
                    params: func.params.clone(),
                    add_render_manager: func.missing_render_manager,
                    add_control,
                }),
            }
        }
    }

    for group in &hooks {
        edits.push(hook_edit(source, group));
    }
    for func in &functions {
        if let Some(edit) = parameter_edit(source, func) {
            edits.push(edit);
        }
    }

    TransformOutput {
        code: splice::apply_edits(source, edits),
        markup_roots: roots.len() as u32,
        handler_attachments: attached,
        discarded_handlers: discarded,
    }
}

fn placement_edit(source: &str, placement: Placement, statements: &[String]) -> SourceEdit {
    match placement {
        Placement::Statement { span, in_list: true } => SourceEdit::replace(
            span.start,
            span.end,
            splice::join_statements(source, span.start, statements),
        ),
        Placement::Statement { span, in_list: false } => {
            let text = if statements.is_empty() {
                "{}".to_string()
            } else {
                format!("{{ {} }}", statements.join(" "))
            };
            SourceEdit::replace(span.start, span.end, text)
        }
        Placement::Expression { span } => {
            SourceEdit::replace(span.start, span.end, snippets::iife(statements))
        }
    }
}

fn hook_edit(source: &str, group: &HookGroup) -> SourceEdit {
    match group.hook {
        LifecycleHook::Existing(body) => {
            splice::block_insertion(source, body.close, &group.statements)
        }
        LifecycleHook::Created(container) => {
            let template = container.hooks().create_hook();
            tracing::debug!(container = container.hooks().key(), "creating {}", LIFECYCLE_HOOK);
            SourceEdit::insert(
                template.insert_at,
                splice::hook_insertion(source, &template, &group.statements),
            )
        }
    }
}

fn parameter_edit(source: &str, func: &RenderFunctionEdit) -> Option<SourceEdit> {
    let mut added = Vec::new();
    if func.add_render_manager {
        added.push(DEFAULT_RENDER_MANAGER);
    }
    if func.add_control {
        added.push(DEFAULT_CONTROL);
    }
    if added.is_empty() {
        return None;
    }
    let added = added.join(", ");
    let params = &func.params;

    if params.is_empty() {
        return params.open.map(|open| SourceEdit::insert(open, added));
    }
    if let Some(bare) = params.bare {
        let existing = source.get(bare.start as usize..bare.end as usize)?;
        return Some(SourceEdit::replace(
            bare.start,
            bare.end,
            format!("({}, {})", existing, added),
        ));
    }
    params
        .last_end
        .map(|end| SourceEdit::insert(end, format!(", {}", added)))
}

// ═══════════════════════════════════════════════════════════════════════════════
// ROOT COLLECTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Walks the program keeping the ancestor frames of the current node and
/// lowers every markup root it reaches.
struct RootCollector<'s> {
    source: &'s str,
    converter: MarkupConverter<'s>,
    ids: &'s HandlerIdAllocator,
    frames: Vec<Frame>,
    roots: Vec<LoweredRoot>,
    error: Option<StructuralError>,
    /// Expression statements sitting directly in a statement list.
    listed_statements: HashSet<u32>,
    /// Expression statements that are really concise arrow bodies.
    concise_bodies: HashSet<u32>,
    /// Names of functions assigned to a property or variable, by function start.
    value_names: HashMap<u32, String>,
    /// Object literals that are the value of an object property.
    nested_objects: HashSet<u32>,
}

impl<'s> RootCollector<'s> {
    fn new(source: &'s str, ids: &'s HandlerIdAllocator) -> Self {
        Self {
            source,
            converter: MarkupConverter::new(source),
            ids,
            frames: Vec::new(),
            roots: Vec::new(),
            error: None,
            listed_statements: HashSet::new(),
            concise_bodies: HashSet::new(),
            value_names: HashMap::new(),
            nested_objects: HashSet::new(),
        }
    }

    fn lower_root(&mut self, expr: &Expression<'_>, placement: Placement) {
        let node = match strip_parens(expr) {
            Expression::JSXElement(el) => self.converter.element(el),
            Expression::JSXFragment(frag) => self.converter.fragment(frag),
            _ => return,
        };
        self.lower_node(node, expr.span(), placement);
    }

    fn lower_node(&mut self, node: MarkupNode, span: Span, placement: Placement) {
        if self.error.is_some() {
            return;
        }
        let bindings = ScopeResolver::resolve(&self.frames);
        match TreeLowerer::new(&bindings, self.ids).lower(&node) {
            Ok(lowered) => {
                tracing::debug!(
                    start = span.start,
                    instructions = lowered.instructions.len(),
                    attachments = lowered.attachments.len(),
                    render_manager = %bindings.render_manager,
                    "lowered markup root"
                );
                self.roots.push(LoweredRoot {
                    span,
                    placement,
                    bindings,
                    lowered,
                });
            }
            Err(err) => self.error = Some(err),
        }
    }

    fn with_frame(&mut self, frame: Frame, f: impl FnOnce(&mut Self)) {
        self.frames.push(frame);
        f(self);
        self.frames.pop();
    }

    fn name_value(&mut self, name: Option<&str>, value: &Expression<'_>) {
        let Some(name) = name else { return };
        match strip_parens(value) {
            Expression::FunctionExpression(func) => {
                self.value_names.insert(func.span.start, name.to_string());
            }
            Expression::ArrowFunctionExpression(arrow) => {
                self.value_names.insert(arrow.span.start, name.to_string());
            }
            _ => {}
        }
    }

    fn function_frame(&self, own_name: Option<&str>, span: Span, params: &FormalParameters<'_>) -> Frame {
        let name = own_name
            .map(str::to_string)
            .or_else(|| self.value_names.get(&span.start).cloned());
        Frame::Function(FunctionFrame {
            name,
            span,
            params: param_list(self.source, params),
        })
    }
}

impl<'a, 's> Visit<'a> for RootCollector<'s> {
    fn visit_program(&mut self, it: &Program<'a>) {
        let scope = scan_scope(&it.body);
        self.with_frame(Frame::Scope(scope), |this| walk::walk_program(this, it));
    }

    fn visit_block_statement(&mut self, it: &BlockStatement<'a>) {
        let scope = scan_scope(&it.body);
        self.with_frame(Frame::Scope(scope), |this| walk::walk_block_statement(this, it));
    }

    fn visit_function_body(&mut self, it: &FunctionBody<'a>) {
        let scope = scan_scope(&it.statements);
        self.with_frame(Frame::Scope(scope), |this| walk::walk_function_body(this, it));
    }

    fn visit_statements(&mut self, it: &ArenaVec<'a, Statement<'a>>) {
        for stmt in it.iter() {
            if let Statement::ExpressionStatement(es) = stmt {
                self.listed_statements.insert(es.span.start);
            }
        }
        walk::walk_statements(self, it);
    }

    fn visit_function(&mut self, it: &Function<'a>, flags: ScopeFlags) {
        let own_name = it.id.as_ref().map(|id| id.name.as_str());
        let frame = self.function_frame(own_name, it.span, &it.params);
        self.with_frame(frame, |this| walk::walk_function(this, it, flags));
    }

    fn visit_arrow_function_expression(&mut self, it: &ArrowFunctionExpression<'a>) {
        if it.expression {
            if let Some(Statement::ExpressionStatement(es)) = it.body.statements.first() {
                self.concise_bodies.insert(es.span.start);
            }
        }
        let frame = self.function_frame(None, it.span, &it.params);
        self.with_frame(frame, |this| walk::walk_arrow_function_expression(this, it));
    }

    fn visit_method_definition(&mut self, it: &MethodDefinition<'a>) {
        if let Some(name) = property_key_name(&it.key) {
            self.value_names.insert(it.value.span.start, name.to_string());
        }
        walk::walk_method_definition(self, it);
    }

    fn visit_property_definition(&mut self, it: &PropertyDefinition<'a>) {
        if let Some(value) = &it.value {
            self.name_value(property_key_name(&it.key), value);
        }
        walk::walk_property_definition(self, it);
    }

    fn visit_variable_declarator(&mut self, it: &VariableDeclarator<'a>) {
        if let (BindingPattern::BindingIdentifier(id), Some(init)) = (&it.id, &it.init) {
            self.name_value(Some(id.name.as_str()), init);
        }
        walk::walk_variable_declarator(self, it);
    }

    fn visit_object_property(&mut self, it: &ObjectProperty<'a>) {
        self.name_value(property_key_name(&it.key), &it.value);
        if let Expression::ObjectExpression(obj) = strip_parens(&it.value) {
            self.nested_objects.insert(obj.span.start);
        }
        walk::walk_object_property(self, it);
    }

    fn visit_class(&mut self, it: &Class<'a>) {
        let frame = Frame::Class(class_container(it));
        self.with_frame(frame, |this| walk::walk_class(this, it));
    }

    fn visit_object_expression(&mut self, it: &ObjectExpression<'a>) {
        let frame = Frame::Object {
            container: object_container(it),
            nested: self.nested_objects.contains(&it.span.start),
        };
        self.with_frame(frame, |this| walk::walk_object_expression(this, it));
    }

    fn visit_assignment_expression(&mut self, it: &AssignmentExpression<'a>) {
        if let AssignmentTarget::StaticMemberExpression(member) = &it.left {
            self.name_value(Some(member.property.name.as_str()), &it.right);
        }
        match assignment_root(&it.left) {
            Some(target_root) => self.with_frame(Frame::Assignment { target_root }, |this| {
                walk::walk_assignment_expression(this, it)
            }),
            None => walk::walk_assignment_expression(self, it),
        }
    }

    fn visit_expression_statement(&mut self, it: &ExpressionStatement<'a>) {
        if self.concise_bodies.contains(&it.span.start) {
            walk::walk_expression_statement(self, it);
            return;
        }
        let placement = Placement::Statement {
            span: it.span,
            in_list: self.listed_statements.contains(&it.span.start),
        };

        let expr = strip_parens(&it.expression);
        if is_markup(expr) {
            self.lower_root(expr, placement);
            return;
        }

        if let Expression::CallExpression(call) = expr {
            if let Some(object) = render_call_object(call) {
                if call.arguments.iter().any(argument_is_markup) {
                    let frame = Frame::RenderCall {
                        object: object.to_string(),
                    };
                    self.with_frame(frame, |this| {
                        for arg in &call.arguments {
                            match arg.as_expression() {
                                Some(e) if is_markup(strip_parens(e)) => this.lower_root(e, placement),
                                _ => this.visit_argument(arg),
                            }
                        }
                    });
                    return;
                }
            }
        }

        walk::walk_expression_statement(self, it);
    }

    fn visit_call_expression(&mut self, it: &CallExpression<'a>) {
        let Some(object) = render_call_object(it) else {
            walk::walk_call_expression(self, it);
            return;
        };

        let frame = Frame::RenderCall {
            object: object.to_string(),
        };
        let whole_call = !it.arguments.is_empty() && it.arguments.iter().all(argument_is_markup);
        self.with_frame(frame, |this| {
            if whole_call {
                let placement = Placement::Expression { span: it.span };
                for arg in &it.arguments {
                    if let Some(e) = arg.as_expression() {
                        this.lower_root(e, placement);
                    }
                }
            } else {
                walk::walk_call_expression(this, it);
            }
        });
    }

    fn visit_jsx_element(&mut self, it: &JSXElement<'a>) {
        if self.error.is_none() {
            let node = self.converter.element(it);
            self.lower_node(node, it.span, Placement::Expression { span: it.span });
        }
    }

    fn visit_jsx_fragment(&mut self, it: &JSXFragment<'a>) {
        if self.error.is_none() {
            let node = self.converter.fragment(it);
            self.lower_node(node, it.span, Placement::Expression { span: it.span });
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// AST HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

fn is_markup(expr: &Expression<'_>) -> bool {
    matches!(expr, Expression::JSXElement(_) | Expression::JSXFragment(_))
}

fn argument_is_markup(arg: &Argument<'_>) -> bool {
    arg.as_expression().is_some_and(|e| is_markup(strip_parens(e)))
}

/// `X` of a call shaped `X.render(...)`.
fn render_call_object<'b>(call: &'b CallExpression<'_>) -> Option<&'b str> {
    match &call.callee {
        Expression::StaticMemberExpression(member) if member.property.name == "render" => {
            match &member.object {
                Expression::Identifier(id) => Some(id.name.as_str()),
                _ => None,
            }
        }
        _ => None,
    }
}

fn property_key_name<'b>(key: &'b PropertyKey<'_>) -> Option<&'b str> {
    match key {
        PropertyKey::StaticIdentifier(id) => Some(id.name.as_str()),
        PropertyKey::StringLiteral(s) => Some(s.value.as_str()),
        _ => None,
    }
}

/// Leftmost identifier of a member-expression assignment target.
fn assignment_root(target: &AssignmentTarget<'_>) -> Option<String> {
    let object = match target {
        AssignmentTarget::StaticMemberExpression(member) => &member.object,
        AssignmentTarget::ComputedMemberExpression(member) => &member.object,
        _ => return None,
    };
    member_root(object)
}

fn member_root(expr: &Expression<'_>) -> Option<String> {
    match strip_parens(expr) {
        Expression::Identifier(id) => Some(id.name.to_string()),
        Expression::StaticMemberExpression(member) => member_root(&member.object),
        Expression::ComputedMemberExpression(member) => member_root(&member.object),
        _ => None,
    }
}

fn param_list(source: &str, params: &FormalParameters<'_>) -> ParamList {
    let parenthesized = source.as_bytes().get(params.span.start as usize) == Some(&b'(');
    let names = params
        .items
        .iter()
        .map(|param| match &param.pattern {
            BindingPattern::BindingIdentifier(id) => Some(id.name.to_string()),
            _ => None,
        })
        .collect();

    ParamList {
        names,
        open: parenthesized.then_some(params.span.start + 1),
        last_end: params.items.last().map(|param| param.span.end),
        bare: (!parenthesized && params.items.len() == 1).then_some(params.span),
        has_rest: params.rest.is_some(),
    }
}

fn class_container(class: &Class<'_>) -> ClassContainer {
    let mut hook = None;
    for element in &class.body.body {
        if let ClassElement::MethodDefinition(method) = element {
            if method.kind == MethodDefinitionKind::Method
                && !method.r#static
                && property_key_name(&method.key) == Some(LIFECYCLE_HOOK)
            {
                hook = method.value.body.as_ref().map(|body| HookBody {
                    close: body.span.end.saturating_sub(1),
                });
            }
        }
    }
    ClassContainer {
        name: class.id.as_ref().map(|id| id.name.to_string()),
        body: class.body.span,
        hook,
    }
}

fn object_container(obj: &ObjectExpression<'_>) -> ObjectContainer {
    let mut hook = HookLookup::Missing;
    for property in &obj.properties {
        let ObjectPropertyKind::ObjectProperty(prop) = property else {
            continue;
        };
        if property_key_name(&prop.key) != Some(LIFECYCLE_HOOK) {
            continue;
        }
        hook = match strip_parens(&prop.value) {
            Expression::FunctionExpression(func) => match &func.body {
                Some(body) => HookLookup::Found(HookBody {
                    close: body.span.end.saturating_sub(1),
                }),
                None => HookLookup::Unusable,
            },
            _ => HookLookup::Unusable,
        };
    }
    ObjectContainer {
        span: obj.span,
        last_property_end: obj.properties.last().map(|p| p.span().end),
        hook,
    }
}

/// Declarations made directly in a statement list.
fn scan_scope(statements: &[Statement<'_>]) -> ScopeFrame {
    let mut scope = ScopeFrame::default();
    for stmt in statements {
        match stmt {
            Statement::ClassDeclaration(class) => declare_class(&mut scope, class),
            Statement::FunctionDeclaration(func) => declare_function(&mut scope, func),
            Statement::VariableDeclaration(decl) => declare_variables(&mut scope, decl),
            Statement::ExportNamedDeclaration(export) => match &export.declaration {
                Some(Declaration::ClassDeclaration(class)) => declare_class(&mut scope, class),
                Some(Declaration::FunctionDeclaration(func)) => declare_function(&mut scope, func),
                Some(Declaration::VariableDeclaration(decl)) => declare_variables(&mut scope, decl),
                _ => {}
            },
            Statement::ExportDefaultDeclaration(export) => {
                if let ExportDefaultDeclarationKind::ClassDeclaration(class) = &export.declaration {
                    declare_class(&mut scope, class);
                }
            }
            _ => {}
        }
    }
    scope
}

fn declare_class(scope: &mut ScopeFrame, class: &Class<'_>) {
    if let Some(id) = &class.id {
        scope.classes.insert(id.name.to_string(), class_container(class));
    }
}

fn declare_function(scope: &mut ScopeFrame, func: &Function<'_>) {
    if let Some(id) = &func.id {
        scope.names.insert(id.name.to_string());
    }
}

fn declare_variables(scope: &mut ScopeFrame, decl: &VariableDeclaration<'_>) {
    for declarator in &decl.declarations {
        if let BindingPattern::BindingIdentifier(id) = &declarator.id {
            scope.names.insert(id.name.to_string());
        }
    }
}
