//! Source splicing
//!
//! The transform never regenerates the whole file. It collects span edits
//! and applies them back to front, so untouched code keeps its formatting.

use crate::scope::HookTemplate;

const INDENT: &str = "  ";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEdit {
    pub start: u32,
    pub end: u32,
    pub text: String,
}

impl SourceEdit {
    pub fn replace(start: u32, end: u32, text: impl Into<String>) -> Self {
        Self {
            start,
            end,
            text: text.into(),
        }
    }

    pub fn insert(at: u32, text: impl Into<String>) -> Self {
        Self::replace(at, at, text)
    }
}

/// Applies edits back to front. Insertions at the same offset keep their
/// relative order; an edit overlapping one already applied is dropped.
pub fn apply_edits(source: &str, edits: Vec<SourceEdit>) -> String {
    let mut indexed: Vec<(usize, SourceEdit)> = edits.into_iter().enumerate().collect();
    indexed.sort_by(|(ia, a), (ib, b)| b.start.cmp(&a.start).then(ib.cmp(ia)));

    let mut out = source.to_string();
    let mut floor = u32::MAX;
    for (_, edit) in indexed {
        if edit.end > floor || edit.start > edit.end || edit.end as usize > source.len() {
            tracing::warn!(start = edit.start, end = edit.end, "dropping overlapping edit");
            continue;
        }
        out.replace_range(edit.start as usize..edit.end as usize, &edit.text);
        floor = edit.start;
    }
    out
}

/// Indentation of the line holding `pos`, if only whitespace precedes `pos`
/// on that line.
pub fn leading_indent(source: &str, pos: u32) -> Option<&str> {
    let pos = (pos as usize).min(source.len());
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let before = &source[line_start..pos];
    if before.chars().all(|c| c == ' ' || c == '\t') {
        Some(before)
    } else {
        None
    }
}

/// Indentation of the line holding `pos`.
pub fn line_indent(source: &str, pos: u32) -> &str {
    let pos = (pos as usize).min(source.len());
    let line_start = source[..pos].rfind('\n').map_or(0, |i| i + 1);
    let line = &source[line_start..];
    let width = line
        .find(|c: char| c != ' ' && c != '\t')
        .unwrap_or(line.len());
    &line[..width]
}

/// Joins statements that replace a statement starting at `at`, one per line
/// when the replaced statement starts its own line.
pub fn join_statements(source: &str, at: u32, statements: &[String]) -> String {
    match leading_indent(source, at) {
        Some(indent) => statements.join(&format!("\n{}", indent)),
        None => statements.join(" "),
    }
}

/// Edit appending statements to the block closed at `close`. A last
/// statement left without its `;` is terminated first.
pub fn block_insertion(source: &str, close: u32, statements: &[String]) -> SourceEdit {
    let before = source.get(..close as usize).unwrap_or(source);
    let content_end = before.trim_end().len();
    let terminated = content_end == 0 || before[..content_end].ends_with(&[';', '{', '}'][..]);

    let text = match leading_indent(source, close) {
        Some(indent) => statements
            .iter()
            .map(|s| format!("{}{}\n{}", INDENT, s, indent))
            .collect(),
        None => format!(" {} ", statements.join(" ")),
    };
    if terminated {
        return SourceEdit::insert(close, text);
    }
    let gap = if text.starts_with(' ') { "" } else { &before[content_end..] };
    SourceEdit::replace(content_end as u32, close, format!(";{}{}", gap, text))
}

/// Source of a synthesized hook holding `statements`, laid out to match the
/// surrounding container.
pub fn hook_insertion(source: &str, template: &HookTemplate, statements: &[String]) -> String {
    let after_member = !template.separator.is_empty();
    let multiline = if after_member {
        source
            .get(template.insert_at as usize..template.close as usize)
            .is_some_and(|between| between.contains('\n'))
    } else {
        leading_indent(source, template.close).is_some()
    };

    if !multiline {
        let hook = format!("{} {} }}", template.header, statements.join(" "));
        return if after_member {
            format!("{} {}", template.separator, hook)
        } else {
            format!(" {} ", hook)
        };
    }

    let close_indent = line_indent(source, template.close);
    let member_indent = if after_member {
        line_indent(source, template.insert_at).to_string()
    } else {
        format!("{}{}", close_indent, INDENT)
    };

    let mut text = String::new();
    if after_member {
        text.push_str(template.separator);
        text.push('\n');
        text.push_str(&member_indent);
    } else {
        text.push_str(INDENT);
    }
    text.push_str(&template.header);
    text.push('\n');
    for statement in statements {
        text.push_str(&member_indent);
        text.push_str(INDENT);
        text.push_str(statement);
        text.push('\n');
    }
    text.push_str(&member_indent);
    text.push('}');
    if !after_member {
        text.push('\n');
        text.push_str(close_indent);
    }
    text
}
