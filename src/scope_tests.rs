#[cfg(test)]
mod tests {
    use crate::handler_id::HandlerIdAllocator;
    use crate::scope::{Container, LifecycleHook, ScopeBindings};
    use crate::transform::{lower_source, LoweredRoot, TransformOptions};

    fn roots(source: &str) -> Vec<LoweredRoot> {
        let ids = HandlerIdAllocator::new();
        lower_source(source, &TransformOptions::default(), &ids).unwrap()
    }

    fn bindings(source: &str) -> ScopeBindings {
        let mut roots = roots(source);
        assert_eq!(roots.len(), 1, "expected a single markup root");
        roots.remove(0).bindings
    }

    #[test]
    fn test_top_level_markup_uses_defaults() {
        let b = bindings("<div></div>;");
        assert_eq!(b.render_manager, "rm");
        assert_eq!(b.control, "control");
        assert_eq!(b.container, None);
        assert_eq!(b.lifecycle_hook, None);
        assert_eq!(b.render_function, None);
    }

    #[test]
    fn test_render_call_names_the_render_manager() {
        let b = bindings("function paint(oRm, oControl) { oRm.render(<div></div>); }");
        assert_eq!(b.render_manager, "oRm");
        assert_eq!(b.control, "oControl");
        assert_eq!(b.render_function, None);
    }

    #[test]
    fn test_render_call_without_control_parameter() {
        let b = bindings("function paint(oRm) { oRm.render(<div></div>); }");
        assert_eq!(b.render_manager, "oRm");
        assert_eq!(b.control, "control");
    }

    #[test]
    fn test_render_function_parameters_supply_names() {
        let b = bindings("const r = { render: function (oRm, oCtrl) { <div></div>; } };");
        assert_eq!(b.render_manager, "oRm");
        assert_eq!(b.control, "oCtrl");
        let func = b.render_function.unwrap();
        assert!(!func.missing_render_manager);
        assert!(!func.missing_control);
    }

    #[test]
    fn test_concise_arrow_render_function() {
        let source = "const render = (oRm) => <div></div>;";
        let b = bindings(source);
        assert_eq!(b.render_manager, "oRm");
        let func = b.render_function.unwrap();
        assert!(func.missing_control);
        assert!(!func.missing_render_manager);
    }

    #[test]
    fn test_class_wins_over_object() {
        let b = bindings("class A { render(rm) { const o = { content: <div></div> }; } }");
        assert!(matches!(b.container, Some(Container::Class(_))));
        assert!(matches!(b.lifecycle_hook, Some(LifecycleHook::Created(_))));
    }

    #[test]
    fn test_object_hook_is_found() {
        let b = bindings(
            "({ onAfterRendering: function () {}, render: function (rm) { <div></div>; } });",
        );
        assert!(matches!(b.container, Some(Container::Object(_))));
        assert!(matches!(b.lifecycle_hook, Some(LifecycleHook::Existing(_))));
    }

    #[test]
    fn test_class_method_hook_is_found() {
        let b = bindings("class A { onAfterRendering() {} render(rm) { <div></div>; } }");
        assert!(matches!(b.lifecycle_hook, Some(LifecycleHook::Existing(_))));
    }

    #[test]
    fn test_static_hook_does_not_count() {
        let b = bindings("class A { static onAfterRendering() {} render(rm) { <div></div>; } }");
        assert!(matches!(b.lifecycle_hook, Some(LifecycleHook::Created(_))));
    }

    #[test]
    fn test_assignment_through_shadowing_name() {
        let source = r#"class Foo {}
function setup() {
  function Foo() {}
  Foo.prototype.render = function (rm) { <div></div>; };
}"#;
        let b = bindings(source);
        assert_eq!(b.container, None);
        assert_eq!(b.lifecycle_hook, None);
    }

    #[test]
    fn test_assignment_to_exported_class() {
        let source = r#"export default class Foo {}
Foo.prototype.render = function (rm) { <div></div>; };"#;
        let b = bindings(source);
        match b.container {
            Some(Container::Class(class)) => assert_eq!(class.name.as_deref(), Some("Foo")),
            other => panic!("expected class container, got {:?}", other),
        }
    }

    #[test]
    fn test_nested_markup_shares_outer_bindings() {
        let all = roots("function render(r, c) { <ul>{items.map(i => <li id={i}></li>)}</ul>; }");
        assert_eq!(all.len(), 1);
        let code = all[0].statements().join("\n");
        assert!(code.contains("r.write(\"<li\");"));
        assert!(code.contains("c.getId()"));
        assert!(all[0].lowered.uses_control);
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let source = r#"class A {
  render(oRm, oCtrl) {
    <div id="a"></div>;
    oRm.render(<span></span>);
  }
}"#;
        let first: Vec<ScopeBindings> = roots(source).into_iter().map(|r| r.bindings).collect();
        let second: Vec<ScopeBindings> = roots(source).into_iter().map(|r| r.bindings).collect();
        assert_eq!(first.len(), 2);
        assert_eq!(first, second);
    }
}
