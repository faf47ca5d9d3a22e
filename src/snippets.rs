//! Code templates
//!
//! Renders lowered instructions back to JavaScript source. Every template is
//! emitted on a single line so the host can splice and indent the statements
//! without reformatting them.

use crate::emitter::{HandlerAttachment, Instruction, Operand, RenderCall, Snippet};
use crate::markup::Precedence;

/// Quotes a string as a JavaScript string literal.
///
/// JSON leaves U+2028 and U+2029 raw, which pre-ES2019 engines read as line
/// terminators inside a string literal.
pub fn quote(value: &str) -> String {
    serde_json::to_string(value)
        .unwrap_or_else(|_| {
            format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
        })
        .replace('\u{2028}', "\\u2028")
        .replace('\u{2029}', "\\u2029")
}

/// An operand in call-argument position.
pub fn argument(op: &Operand) -> String {
    match op {
        Operand::Str(s) => quote(s),
        Operand::Code {
            text,
            precedence: Precedence::Sequence,
        } => format!("({})", text),
        Operand::Code { text, .. } => text.clone(),
    }
}

/// An operand next to a binary operator.
pub fn operand(op: &Operand) -> String {
    match op {
        Operand::Str(s) => quote(s),
        Operand::Code {
            text,
            precedence: Precedence::Atomic,
        } => text.clone(),
        Operand::Code { text, .. } => format!("({})", text),
    }
}

pub fn render_call(rm: &str, call: &RenderCall) -> String {
    let args: Vec<String> = call.args.iter().map(argument).collect();
    format!("{}.{}({});", rm, call.method.as_str(), args.join(", "))
}

pub fn render_snippet(rm: &str, snippet: &Snippet) -> String {
    match snippet {
        Snippet::ScopedId { control, id } => format!(
            "{rm}.writeAttributeEscaped(\"id\", {control}.getId() + \"-\" + {id});",
            id = operand(id)
        ),
        Snippet::Classes(classes) => format!(
            "(function (cls) {{ cls = cls || []; \
             if (typeof cls === \"string\") cls = cls.split(/\\s+/); \
             if (Array.isArray(cls)) cls.forEach(function (c) {{ if (c) {rm}.addClass(c); }}); \
             else if (typeof cls === \"object\") for (var key in cls) if (cls[key]) {rm}.addClass(key); \
             }})({});",
            argument(classes)
        ),
        Snippet::Styles(styles) => format!(
            "(function (styles) {{ styles = styles || {{}}; \
             if (typeof styles === \"string\") styles.split(\";\").forEach(function (style) {{ \
             var i = style.indexOf(\":\"); \
             if (i > 0) {rm}.addStyle(style.slice(0, i).trim(), style.slice(i + 1).trim()); }}); \
             else if (Array.isArray(styles)) styles.forEach(function (style) {{ {rm}.addStyle(style.name, style.value); }}); \
             else for (var key in styles) {rm}.addStyle(key, styles[key]); \
             }})({});",
            argument(styles)
        ),
        Snippet::Attributes(attrs) => format!(
            "(function (attrs) {{ attrs = attrs || {{}}; \
             for (var k in attrs) {rm}.writeAttributeEscaped(k, attrs[k]); \
             }})({});",
            argument(attrs)
        ),
        Snippet::Aggregation(aggregation) => format!(
            "({} || []).forEach({rm}.renderControl.bind({rm}));",
            operand(aggregation)
        ),
        Snippet::Control(control) => {
            let control = argument(control);
            format!("if ({control}) {rm}.renderControl({control});")
        }
        Snippet::Content(value) => format!(
            "(function (value) {{ if (value && !Array.isArray(value)) {rm}.writeEscaped(value); }})({});",
            argument(value)
        ),
    }
}

pub fn render_instruction(rm: &str, instruction: &Instruction) -> String {
    match instruction {
        Instruction::Call(call) => render_call(rm, call),
        Instruction::Snippet(snippet) => render_snippet(rm, snippet),
    }
}

pub fn render_instructions(rm: &str, instructions: &[Instruction]) -> Vec<String> {
    instructions
        .iter()
        .map(|i| render_instruction(rm, i))
        .collect()
}

pub fn render_attachment(attachment: &HandlerAttachment) -> String {
    format!(
        "this.$().find({}).on({}, {});",
        quote(&attachment.selector),
        quote(&attachment.event),
        argument(&attachment.handler)
    )
}

/// Wraps statements so they can stand in expression position.
pub fn iife(statements: &[String]) -> String {
    if statements.is_empty() {
        return "(() => {})()".to_string();
    }
    format!("(() => {{ {} }})()", statements.join(" "))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::emitter::RenderMethod;

    #[test]
    fn test_render_call_quotes_literals() {
        let call = RenderCall {
            method: RenderMethod::WriteAttributeEscaped,
            args: vec![Operand::str("title"), Operand::str("say \"hi\"\n")],
        };
        assert_eq!(
            render_call("oRM", &call),
            r#"oRM.writeAttributeEscaped("title", "say \"hi\"\n");"#
        );
    }

    #[test]
    fn test_quote_escapes_line_separators() {
        assert_eq!(quote("a\u{2028}b\u{2029}c"), r#""a\u2028b\u2029c""#);
        assert_eq!(quote("tab\there"), r#""tab\there""#);
    }

    #[test]
    fn test_sequence_arguments_are_parenthesized() {
        let call = RenderCall {
            method: RenderMethod::WriteEscaped,
            args: vec![Operand::code("a, b", Precedence::Sequence)],
        };
        assert_eq!(render_call("rm", &call), "rm.writeEscaped((a, b));");

        let call = RenderCall {
            method: RenderMethod::WriteEscaped,
            args: vec![Operand::code("a ? b : c", Precedence::Operator)],
        };
        assert_eq!(render_call("rm", &call), "rm.writeEscaped(a ? b : c);");
    }

    #[test]
    fn test_scoped_id() {
        let snippet = Snippet::ScopedId {
            control: "oControl".to_string(),
            id: Operand::str("test"),
        };
        assert_eq!(
            render_snippet("oRM", &snippet),
            r#"oRM.writeAttributeEscaped("id", oControl.getId() + "-" + "test");"#
        );

        let snippet = Snippet::ScopedId {
            control: "control".to_string(),
            id: Operand::code("a || b", Precedence::Operator),
        };
        assert!(render_snippet("rm", &snippet).ends_with(r#"+ "-" + (a || b));"#));
    }

    #[test]
    fn test_aggregation_and_control() {
        assert_eq!(
            render_snippet("rm", &Snippet::Aggregation(Operand::atom("control.getContent()"))),
            "(control.getContent() || []).forEach(rm.renderControl.bind(rm));"
        );
        assert_eq!(
            render_snippet(
                "rm",
                &Snippet::Aggregation(Operand::code("a ? b : c", Precedence::Operator))
            ),
            "((a ? b : c) || []).forEach(rm.renderControl.bind(rm));"
        );
        assert_eq!(
            render_snippet("rm", &Snippet::Control(Operand::atom("control.getAggregation(\"content\")"))),
            r#"if (control.getAggregation("content")) rm.renderControl(control.getAggregation("content"));"#
        );
    }

    #[test]
    fn test_content_skips_arrays() {
        assert_eq!(
            render_snippet("rm", &Snippet::Content(Operand::atom("items.map(f)"))),
            "(function (value) { if (value && !Array.isArray(value)) rm.writeEscaped(value); })(items.map(f));"
        );
    }

    #[test]
    fn test_normalization_snippets_use_render_manager() {
        let classes = render_snippet("oRM", &Snippet::Classes(Operand::atom("cls")));
        assert!(classes.starts_with("(function (cls) {"));
        assert!(classes.contains("oRM.addClass(key)"));
        assert!(classes.ends_with("})(cls);"));

        let styles = render_snippet("oRM", &Snippet::Styles(Operand::atom("s")));
        assert!(styles.contains("oRM.addStyle(style.name, style.value)"));
        assert!(!styles.contains("writeStyles"));

        let attrs = render_snippet("oRM", &Snippet::Attributes(Operand::atom("props")));
        assert!(attrs.contains("oRM.writeAttributeEscaped(k, attrs[k])"));
        assert!(attrs.ends_with("})(props);"));
    }

    #[test]
    fn test_handler_attachment() {
        let attachment = HandlerAttachment {
            selector: ".__handler3".to_string(),
            event: "click".to_string(),
            handler: Operand::atom("this._onPress.bind(this)"),
        };
        assert_eq!(
            render_attachment(&attachment),
            r#"this.$().find(".__handler3").on("click", this._onPress.bind(this));"#
        );
    }

    #[test]
    fn test_iife() {
        assert_eq!(
            iife(&["rm.write(\"<hr/>\");".to_string()]),
            "(() => { rm.write(\"<hr/>\"); })()"
        );
        assert_eq!(iife(&[]), "(() => {})()");
    }
}
