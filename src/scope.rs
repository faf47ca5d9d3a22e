//! Scope resolution for markup roots.
//!
//! The host visitor records the ancestors of every markup root as a stack of
//! typed [`Frame`]s (outermost first). [`ScopeResolver::resolve`] is a pure
//! function of that stack: it finds the render manager and control names, the
//! enclosing control class or object definition, and its `onAfterRendering`
//! lifecycle hook.

use oxc_span::Span;
use std::collections::{HashMap, HashSet};

pub const DEFAULT_RENDER_MANAGER: &str = "rm";
pub const DEFAULT_CONTROL: &str = "control";
pub const LIFECYCLE_HOOK: &str = "onAfterRendering";
pub const RENDER_FUNCTION: &str = "render";

// ═══════════════════════════════════════════════════════════════════════════════
// HOOK CONTAINERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Body of an existing hook function. `close` is the offset of its `}`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HookBody {
    pub close: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HookLookup {
    Found(HookBody),
    Missing,
    /// A hook-named member exists but is not a function body we can extend.
    Unusable,
}

/// Where and how a synthesized hook is inserted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HookTemplate {
    pub insert_at: u32,
    /// Offset of the container's closing brace.
    pub close: u32,
    /// Written before the hook when it follows an existing member.
    pub separator: &'static str,
    /// Hook head up to and including its opening brace.
    pub header: String,
}

/// A definition that can own a lifecycle hook.
pub trait HookContainer {
    /// Stable identity of the container inside one source file.
    fn key(&self) -> u32;
    fn find_hook(&self) -> HookLookup;
    fn create_hook(&self) -> HookTemplate;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassContainer {
    pub name: Option<String>,
    /// Span of the class body, braces included.
    pub body: Span,
    pub hook: Option<HookBody>,
}

impl HookContainer for ClassContainer {
    fn key(&self) -> u32 {
        self.body.start
    }

    fn find_hook(&self) -> HookLookup {
        match self.hook {
            Some(body) => HookLookup::Found(body),
            None => HookLookup::Missing,
        }
    }

    fn create_hook(&self) -> HookTemplate {
        let close = self.body.end.saturating_sub(1);
        HookTemplate {
            insert_at: close,
            close,
            separator: "",
            header: format!("{}() {{", LIFECYCLE_HOOK),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectContainer {
    pub span: Span,
    pub last_property_end: Option<u32>,
    pub hook: HookLookup,
}

impl HookContainer for ObjectContainer {
    fn key(&self) -> u32 {
        self.span.start
    }

    fn find_hook(&self) -> HookLookup {
        self.hook
    }

    fn create_hook(&self) -> HookTemplate {
        let close = self.span.end.saturating_sub(1);
        let header = format!("{}: function _{}() {{", LIFECYCLE_HOOK, LIFECYCLE_HOOK);
        match self.last_property_end {
            Some(end) => HookTemplate {
                insert_at: end,
                close,
                separator: ",",
                header,
            },
            None => HookTemplate {
                insert_at: close,
                close,
                separator: "",
                header,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Container {
    Class(ClassContainer),
    Object(ObjectContainer),
}

impl Container {
    pub fn hooks(&self) -> &dyn HookContainer {
        match self {
            Container::Class(c) => c as &dyn HookContainer,
            Container::Object(o) => o as &dyn HookContainer,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LifecycleHook {
    Existing(HookBody),
    Created(Container),
}

/// Identity used to group attachments that end up in the same hook.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum HookKey {
    Existing(u32),
    Created(u32),
}

impl LifecycleHook {
    pub fn key(&self) -> HookKey {
        match self {
            LifecycleHook::Existing(body) => HookKey::Existing(body.close),
            LifecycleHook::Created(container) => HookKey::Created(container.hooks().key()),
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// FRAMES
// ═══════════════════════════════════════════════════════════════════════════════

/// Parameter list of a function, with the offsets needed to add parameters.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParamList {
    /// Identifier parameters by position; destructured parameters are `None`.
    pub names: Vec<Option<String>>,
    /// Offset right after the opening parenthesis.
    pub open: Option<u32>,
    /// End of the last parameter.
    pub last_end: Option<u32>,
    /// Span of an unparenthesized single arrow parameter.
    pub bare: Option<Span>,
    pub has_rest: bool,
}

impl ParamList {
    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).and_then(|n| n.as_deref())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunctionFrame {
    /// Own name, or the name of the property / variable it is assigned to.
    pub name: Option<String>,
    pub span: Span,
    pub params: ParamList,
}

/// Lexical scope with the declarations made directly in it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScopeFrame {
    pub classes: HashMap<String, ClassContainer>,
    pub names: HashSet<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Frame {
    Scope(ScopeFrame),
    Function(FunctionFrame),
    /// A call shaped `<identifier>.render(...)`.
    RenderCall { object: String },
    Class(ClassContainer),
    /// Assignment whose target is a member chain rooted at `target_root`.
    Assignment { target_root: String },
    /// Object literal; `nested` when it is the value of an object property.
    Object { container: ObjectContainer, nested: bool },
}

// ═══════════════════════════════════════════════════════════════════════════════
// RESOLVER
// ═══════════════════════════════════════════════════════════════════════════════

/// Enclosing `render` function whose parameter list supplies the bindings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderFunction {
    pub key: u32,
    pub params: ParamList,
    pub missing_render_manager: bool,
    pub missing_control: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScopeBindings {
    pub render_manager: String,
    pub control: String,
    pub container: Option<Container>,
    pub lifecycle_hook: Option<LifecycleHook>,
    pub render_function: Option<RenderFunction>,
}

pub struct ScopeResolver;

impl ScopeResolver {
    pub fn resolve(frames: &[Frame]) -> ScopeBindings {
        let (render_manager, control, render_function) = match Self::find_render_call(frames) {
            Some((index, object)) => (
                object.to_string(),
                Self::find_control(frames, index),
                None,
            ),
            None => Self::from_render_function(frames),
        };

        let container = Self::find_control_class(frames)
            .map(Container::Class)
            .or_else(|| Self::find_control_object(frames).map(Container::Object));
        let lifecycle_hook = container.as_ref().and_then(Self::find_or_create_lifecycle_hook);

        ScopeBindings {
            render_manager,
            control,
            container,
            lifecycle_hook,
            render_function,
        }
    }

    /// Nearest `<identifier>.render(...)` ancestor.
    pub fn find_render_call(frames: &[Frame]) -> Option<(usize, &str)> {
        frames.iter().enumerate().rev().find_map(|(i, f)| match f {
            Frame::RenderCall { object } => Some((i, object.as_str())),
            _ => None,
        })
    }

    /// Second parameter of the function enclosing the render call at `index`.
    pub fn find_control(frames: &[Frame], index: usize) -> String {
        frames[..index]
            .iter()
            .rev()
            .find_map(|f| match f {
                Frame::Function(func) => Some(func),
                _ => None,
            })
            .and_then(|func| func.params.name(1))
            .unwrap_or(DEFAULT_CONTROL)
            .to_string()
    }

    fn from_render_function(frames: &[Frame]) -> (String, String, Option<RenderFunction>) {
        let func = frames.iter().rev().find_map(|f| match f {
            Frame::Function(func) if func.name.as_deref() == Some(RENDER_FUNCTION) => Some(func),
            _ => None,
        });

        let Some(func) = func else {
            return (
                DEFAULT_RENDER_MANAGER.to_string(),
                DEFAULT_CONTROL.to_string(),
                None,
            );
        };

        let params = &func.params;
        let render_manager = params.name(0).unwrap_or(DEFAULT_RENDER_MANAGER).to_string();
        let control = params.name(1).unwrap_or(DEFAULT_CONTROL).to_string();
        let insertable = !params.has_rest;

        (
            render_manager,
            control,
            Some(RenderFunction {
                key: func.span.start,
                params: params.clone(),
                missing_render_manager: insertable && params.is_empty(),
                missing_control: insertable && params.len() < 2,
            }),
        )
    }

    /// Nearest class body, or class declaration reached through an
    /// assignment like `X.prototype.render = ...`.
    pub fn find_control_class(frames: &[Frame]) -> Option<ClassContainer> {
        for (i, frame) in frames.iter().enumerate().rev() {
            match frame {
                Frame::Class(class) => return Some(class.clone()),
                Frame::Assignment { target_root } => {
                    if let Some(class) = Self::lookup_class(&frames[..i], target_root) {
                        return Some(class.clone());
                    }
                }
                _ => {}
            }
        }
        None
    }

    fn lookup_class<'f>(frames: &'f [Frame], name: &str) -> Option<&'f ClassContainer> {
        for frame in frames.iter().rev() {
            if let Frame::Scope(scope) = frame {
                if let Some(class) = scope.classes.get(name) {
                    return Some(class);
                }
                if scope.names.contains(name) {
                    return None;
                }
            }
        }
        None
    }

    /// Nearest object literal that is not itself a property value.
    pub fn find_control_object(frames: &[Frame]) -> Option<ObjectContainer> {
        frames.iter().rev().find_map(|f| match f {
            Frame::Object {
                container,
                nested: false,
            } => Some(container.clone()),
            _ => None,
        })
    }

    pub fn find_or_create_lifecycle_hook(container: &Container) -> Option<LifecycleHook> {
        match container.hooks().find_hook() {
            HookLookup::Found(body) => Some(LifecycleHook::Existing(body)),
            HookLookup::Missing => Some(LifecycleHook::Created(container.clone())),
            HookLookup::Unusable => {
                tracing::warn!(
                    container = container.hooks().key(),
                    "{} is not a function; handlers cannot be attached",
                    LIFECYCLE_HOOK
                );
                None
            }
        }
    }
}
