//! # UI5 JSX Native
//!
//! Lowers JSX markup embedded in control renderers into imperative
//! render-manager calls, in place, without regenerating the rest of the file.
//!
//! ## Pipeline
//!
//! 1. **Parse**: the host source is parsed with oxc; every JSX element or
//!    fragment that is not nested in another one is a *markup root*.
//! 2. **Resolve**: the ancestors of each root are recorded as frames and
//!    resolved to the render-manager and control names, the enclosing control
//!    definition and its `onAfterRendering` hook (`scope`).
//! 3. **Lower**: the root is converted to a small markup tree (`markup`) and
//!    walked into an ordered instruction list plus deferred handler
//!    attachments (`lowerer`, `emitter`).
//! 4. **Splice**: instructions are rendered to statements (`snippets`) and
//!    spliced back together with the hook and parameter edits (`transform`,
//!    `splice`).
//!
//! ## Invariants
//!
//! - Element output order is fixed: `<tag`, attributes, pending styles,
//!   pending classes, `>` or `/>`, children, `</tag>`.
//! - Handler class ids are unique for the lifetime of a [`HandlerIdAllocator`],
//!   across files and threads.
//! - Tags and attributes prefixed `ui5` are reserved; unknown ones are fatal.
//! - Code outside markup roots is never rewritten, apart from synthesized
//!   render-function parameters and lifecycle hooks.

#[cfg(feature = "napi")]
use napi_derive::napi;

mod emitter;
mod error;
mod handler_id;
mod lowerer;
mod markup;
pub mod playback;
mod scope;
mod snippets;
mod special;
mod splice;
mod transform;

#[cfg(test)]
mod lowering_tests;
#[cfg(test)]
mod scope_tests;

pub use emitter::{HandlerAttachment, Instruction, Operand, RenderCall, RenderMethod, Snippet};
pub use error::{
    CompilerError, StructuralError, ERR_PARSE, ERR_SPECIAL_ATTRIBUTE, ERR_SPECIAL_CHILD,
    ERR_SPECIAL_TAG,
};
pub use handler_id::{HandlerIdAllocator, GLOBAL_HANDLER_IDS, HANDLER_CLASS_PREFIX};
pub use lowerer::{LoweredMarkup, NestedMarkup};
pub use markup::Precedence;
pub use scope::{Container, LifecycleHook, ScopeBindings};
pub use transform::{
    lower_source, splice_roots, transform, transform_batch, transform_with_ids, LoweredRoot,
    Placement, TransformOptions, TransformOutput,
};

#[cfg(feature = "napi")]
pub use transform::{reset_handler_ids_native, transform_jsx_native};

#[cfg(feature = "napi")]
#[napi]
pub fn native_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
