#[cfg(test)]
mod tests {
    use crate::emitter::{Instruction, RenderMethod};
    use crate::error::{ERR_SPECIAL_ATTRIBUTE, ERR_SPECIAL_CHILD, ERR_SPECIAL_TAG};
    use crate::handler_id::HandlerIdAllocator;
    use crate::playback::{PlaybackError, ReferenceWriter};
    use crate::transform::{lower_source, LoweredRoot, TransformOptions};

    fn lower(source: &str) -> Vec<LoweredRoot> {
        let ids = HandlerIdAllocator::new();
        lower_source(source, &TransformOptions::default(), &ids).unwrap()
    }

    fn render_with(source: &str, mut writer: ReferenceWriter) -> String {
        for root in lower(source) {
            writer.play_lowered(&root.lowered).unwrap();
        }
        writer.into_html()
    }

    fn render(source: &str) -> String {
        render_with(source, ReferenceWriter::new())
    }

    fn code_of(source: &str) -> String {
        lower(source)
            .iter()
            .flat_map(|root| root.statements())
            .collect::<Vec<_>>()
            .join("\n")
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ELEMENTS & TEXT
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_nested_tags() {
        assert_eq!(
            render("<div><hr/><div><span></span></div></div>;"),
            "<div><hr/><div><span></span></div></div>"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(render("<span>{'<>'}</span>;"), "<span>&lt;&gt;</span>");
        assert_eq!(
            render("<span>{['foo', 'bar'].join('')}</span>;"),
            "<span>foobar</span>"
        );
        assert_eq!(render("<span>{10}</span>;"), "<span>10</span>");
    }

    #[test]
    fn test_empty_values_render_nothing() {
        assert_eq!(render("<span>{null}</span>;"), "<span></span>");
        assert_eq!(render("<span>{undefined}{/* note */}</span>;"), "<span></span>");
    }

    #[test]
    fn test_fragment_children_are_inlined() {
        assert_eq!(render("<><b></b><i></i></>;"), "<b></b><i></i>");
    }

    #[test]
    fn test_whitespace_only_text_is_dropped() {
        let html = render("<div>\n    <span>hi</span>\n</div>;");
        assert_eq!(html, "<div><span>hi</span></div>");
    }

    #[test]
    fn test_tags_are_balanced() {
        let code = code_of("<section><p><b>x</b></p><br/><p></p></section>;");
        for tag in ["section", "p", "b"] {
            let opens = code.matches(&format!("\"<{}\"", tag)).count();
            let closes = code.matches(&format!("\"</{}>\"", tag)).count();
            assert_eq!(opens, closes, "unbalanced <{}> in\n{}", tag, code);
        }
        assert_eq!(code.matches("\"/>\"").count(), 1);
    }

    #[test]
    fn test_instruction_order_per_element() {
        let roots = lower("<div class=\"a\" style=\"color: red\" title=\"t\"></div>;");
        let methods: Vec<&str> = roots[0]
            .lowered
            .instructions
            .iter()
            .map(|i| match i {
                Instruction::Call(call) => call.method.as_str(),
                Instruction::Snippet(_) => "snippet",
            })
            .collect();
        assert_eq!(
            methods,
            vec![
                "write",
                "addClass",
                "addStyle",
                "writeStyles",
                "writeAttributeEscaped",
                "writeClasses",
                "write",
                "write",
            ]
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ATTRIBUTES
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_static_attribute() {
        assert_eq!(render("<div width=\"10\"></div>;"), "<div width=\"10\"></div>");
    }

    #[test]
    fn test_expression_attribute() {
        assert_eq!(render("<div width={10}></div>;"), "<div width=\"10\"></div>");
    }

    #[test]
    fn test_attribute_is_escaped() {
        assert_eq!(render("<img alt=\"<Foobar>\"/>;"), "<img alt=\"&lt;Foobar&gt;\"/>");
        assert_eq!(render("<img alt={\"<Foobar>\"}/>;"), "<img alt=\"&lt;Foobar&gt;\"/>");
    }

    #[test]
    fn test_valueless_attribute() {
        assert_eq!(render("<input disabled/>;"), "<input disabled=\"disabled\"/>");
    }

    #[test]
    fn test_spread_attributes() {
        assert_eq!(
            render("<div {...{width: 10, height: 10}}></div>;"),
            "<div width=\"10\" height=\"10\"></div>"
        );
    }

    #[test]
    fn test_classes() {
        let expected = "<div class=\"some class\"></div>";
        assert_eq!(render("<div class=\"some class\"></div>;"), expected);
        assert_eq!(render("<div class={\"some  class\"}></div>;"), expected);
        assert_eq!(render("<div class={[\"some\", null, \"class\"]}></div>;"), expected);
        assert_eq!(
            render("<div class={{foo: true, bar: 1, baz: false}}></div>;"),
            "<div class=\"foo bar\"></div>"
        );
        assert_eq!(render("<div class={null}></div>;"), "<div></div>");
    }

    #[test]
    fn test_styles() {
        let expected = "<div style=\"width: 10px; height: 20px\"></div>";
        assert_eq!(render("<div style=\"width: 10px; height: 20px\"></div>;"), expected);
        assert_eq!(
            render("<div style={{width: \"10px\", height: \"20px\"}}></div>;"),
            expected
        );
        assert_eq!(
            render(
                "<div style={[{name: \"width\", value: \"10px\"}, {name: \"height\", value: \"20px\"}]}></div>;"
            ),
            expected
        );
        assert_eq!(render("<div style={\"width:10px;height:20px;\"}></div>;"), expected);
        assert_eq!(render("<div style=\"width:10px;height:20px;\"></div>;"), expected);
    }

    #[test]
    fn test_last_style_wins() {
        assert_eq!(
            render("<div style=\"color: red; color: blue\"></div>;"),
            "<div style=\"color: blue\"></div>"
        );
    }

    #[test]
    fn test_id_is_scoped_to_control() {
        let writer = ReferenceWriter::new().with_control("control", "ctrl1");
        assert_eq!(
            render_with("<div id=\"inner\"></div>;", writer),
            "<div id=\"ctrl1-inner\"></div>"
        );

        let roots = lower("<div id=\"inner\"></div>;");
        assert!(roots[0].lowered.uses_control);
        assert!(roots[0].statements()[1]
            .contains("rm.writeAttributeEscaped(\"id\", control.getId() + \"-\" + \"inner\");"));
    }

    #[test]
    fn test_id_needs_a_known_control() {
        let roots = lower("<div id=\"inner\"></div>;");
        let mut writer = ReferenceWriter::new();
        assert_eq!(
            writer.play(&roots[0].lowered.instructions),
            Err(PlaybackError::Dynamic("control.getId()".to_string()))
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SPECIAL ATTRIBUTES & TAGS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_control_and_element_data() {
        assert_eq!(render("<div ui5control></div>;"), "<div id=\"__control0\"></div>");
        assert_eq!(render("<div ui5element></div>;"), "<div id=\"__element0\"></div>");

        let writer = ReferenceWriter::new().with_control("control", "ctrl1");
        assert_eq!(
            render_with("<div ui5control></div>;", writer),
            "<div id=\"ctrl1\"></div>"
        );
    }

    #[test]
    fn test_accessibility_state() {
        assert_eq!(
            render("<div ui5aria={{enabled: false, required: true}}></div>;"),
            "<div aria-disabled=\"true\" aria-required=\"true\"></div>"
        );
        assert_eq!(
            render("<div ui5aria={[control, {checked: true}]}></div>;"),
            "<div aria-checked=\"true\"></div>"
        );
        assert_eq!(render("<div ui5aria></div>;"), "<div></div>");
    }

    #[test]
    fn test_malformed_accessibility_value_is_ignored() {
        let roots = lower("<div ui5aria={state}></div>;");
        assert!(!roots[0].lowered.instructions.iter().any(|i| matches!(
            i,
            Instruction::Call(call) if call.method == RenderMethod::WriteAccessibilityState
        )));
    }

    #[test]
    fn test_icons() {
        assert_eq!(
            render("<ui5icon>sap-icon://edit</ui5icon>;"),
            "<icon src=\"sap-icon://edit\"/>"
        );
        assert_eq!(
            render(
                "<ui5icon>{[\"sap-icon://edit\", [\"foobar\", \"baz\"], {height: 10, width: 10}]}</ui5icon>;"
            ),
            "<icon src=\"sap-icon://edit\" class=\"foobar baz\" height=\"10\" width=\"10\"/>"
        );
        assert_eq!(
            render("<div><ui5icon>\n  sap-icon://add\n</ui5icon></div>;"),
            "<div><icon src=\"sap-icon://add\"/></div>"
        );
    }

    #[test]
    fn test_control_tags() {
        let code = code_of("<div><ui5control>content</ui5control></div>;");
        assert!(code.contains(
            "if (control.getAggregation(\"content\")) rm.renderControl(control.getAggregation(\"content\"));"
        ));

        let code = code_of("<div><ui5aggr>{this.items}</ui5aggr></div>;");
        assert!(code.contains("(this.items || []).forEach(rm.renderControl.bind(rm));"));

        let code = code_of("<ui5ctrl>{a || b}</ui5ctrl>;");
        assert!(code.contains("if (a || b) rm.renderControl(a || b);"));
    }

    #[test]
    fn test_render_control_cannot_be_replayed() {
        let roots = lower("<ui5control>{child}</ui5control>;");
        let mut writer = ReferenceWriter::new();
        assert_eq!(
            writer.play(&roots[0].lowered.instructions),
            Err(PlaybackError::Unsupported("renderControl"))
        );
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EVENT HANDLERS
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_event_handler_tags_element() {
        let roots = lower("<button onclick=\"_onButtonPress\"></button>;");
        let root = &roots[0];

        let mut writer = ReferenceWriter::new();
        writer.play(&root.lowered.instructions).unwrap();
        assert_eq!(writer.html(), "<button class=\"__handler0\"></button>");

        assert_eq!(root.lowered.attachments.len(), 1);
        let attachment = &root.lowered.attachments[0];
        assert_eq!(attachment.selector, ".__handler0");
        assert_eq!(attachment.event, "click");
    }

    #[test]
    fn test_handler_ids_never_repeat() {
        let ids = HandlerIdAllocator::seeded(7);
        let source = "<div><a onclick={f}></a><b onmouseover={g}></b></div>;";
        let first = lower_source(source, &TransformOptions::default(), &ids).unwrap();
        let second = lower_source(source, &TransformOptions::default(), &ids).unwrap();

        let selectors: Vec<&str> = first
            .iter()
            .chain(second.iter())
            .flat_map(|root| root.lowered.attachments.iter())
            .map(|a| a.selector.as_str())
            .collect();
        assert_eq!(
            selectors,
            vec![".__handler7", ".__handler8", ".__handler9", ".__handler10"]
        );
    }

    #[test]
    fn test_handler_classes_merge_with_class_attribute() {
        assert_eq!(
            render("<a class=\"link\" onclick={f}></a>;"),
            "<a class=\"link __handler0\"></a>"
        );
    }

    #[test]
    fn test_handler_without_value_is_skipped() {
        let roots = lower("<a onclick></a>;");
        assert!(roots[0].lowered.attachments.is_empty());
        assert_eq!(render("<a onclick></a>;"), "<a></a>");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NESTED MARKUP
    // ═══════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_nested_markup_becomes_iife() {
        let code = code_of("<ul>{items.map(item => <li onclick={item.press}>{item.text}</li>)}</ul>;");
        assert!(code.contains("items.map(item => (() => { rm.write(\"<li\");"));
        assert!(code.contains("rm.writeEscaped((item.text || \"\"));"));

        let roots = lower("<ul>{items.map(item => <li onclick={item.press}></li>)}</ul>;");
        assert_eq!(roots.len(), 1);
        assert_eq!(roots[0].lowered.attachments.len(), 1);
    }

    #[test]
    fn test_mapped_markup_renders_without_separators() {
        assert_eq!(
            render("<ul>{[1, 2, 3].map(i => <li>{i}</li>)}</ul>;"),
            "<ul><li>1</li><li>2</li><li>3</li></ul>"
        );
        assert_eq!(
            render("<ul>{['a', 'b'].map((s, n) => { return <li title={s}>{s}</li>; })}</ul>;"),
            "<ul><li title=\"a\">a</li><li title=\"b\">b</li></ul>"
        );

        let code = code_of("<ul>{[1, 2, 3].map(i => <li>{i}</li>)}</ul>;");
        assert!(code.contains(
            "(function (value) { if (value && !Array.isArray(value)) rm.writeEscaped(value); })([1, 2, 3].map(i => (() => {"
        ));
        assert!(!code.contains("rm.writeEscaped(([1, 2, 3]"));
    }

    #[test]
    fn test_markup_in_conditional_keeps_text_branch() {
        assert_eq!(render("<p>{true ? 'none' : <b/>}</p>;"), "<p>none</p>");
        assert_eq!(render("<p>{false ? 'none' : <b/>}</p>;"), "<p><b/></p>");
    }

    #[test]
    fn test_markup_only_expression_is_inlined() {
        assert_eq!(render("<div>{<b></b>}</div>;"), "<div><b></b></div>");
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ERRORS
    // ═══════════════════════════════════════════════════════════════════════════

    fn lower_err(source: &str) -> crate::error::CompilerError {
        let ids = HandlerIdAllocator::new();
        lower_source(source, &TransformOptions::for_file("view.js"), &ids).unwrap_err()
    }

    #[test]
    fn test_unknown_special_tag() {
        let err = lower_err("const x = 1;\n<div><ui5foobar/></div>;");
        assert_eq!(err.code, ERR_SPECIAL_TAG);
        assert_eq!(err.file, "view.js");
        assert_eq!(err.line, 2);
        assert!(err.message.contains("ui5foobar"));
    }

    #[test]
    fn test_unknown_special_attribute() {
        let err = lower_err("<div ui5foobar></div>;");
        assert_eq!(err.code, ERR_SPECIAL_ATTRIBUTE);
        assert!(err.message.contains("ui5foobar"));
    }

    #[test]
    fn test_special_tag_children() {
        assert_eq!(lower_err("<ui5control></ui5control>;").code, ERR_SPECIAL_CHILD);
        assert_eq!(lower_err("<ui5control>  </ui5control>;").code, ERR_SPECIAL_CHILD);
        assert_eq!(lower_err("<ui5icon><a/><b/></ui5icon>;").code, ERR_SPECIAL_CHILD);
        assert_eq!(lower_err("<ui5aggr><a/></ui5aggr>;").code, ERR_SPECIAL_CHILD);
    }

    #[test]
    fn test_prefix_lookalikes_are_plain_markup() {
        assert_eq!(render("<div UI5thing=\"x\"></div>;"), "<div UI5thing=\"x\"></div>");
    }
}
