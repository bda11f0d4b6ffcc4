//! Help pages
//!
//! Plain-text listing of a class's methods, fields and nested classes,
//! optionally filtered by a wildcard pattern (`*` any run, `?` at most one
//! character) matched against each signature.

use regex::Regex;

use super::registry::{ClassRef, ClassRegistry};

const PREFIX: &str = "|";
const INDENT: &str = "  ";
const SEPARATOR: &str = "------------------------------------------------------------";

/// Compile a wildcard pattern. No pattern yields no regex, which matches
/// everything.
pub fn pattern_regex(pattern: Option<&str>) -> Option<Regex> {
    let pattern = pattern?;
    let mut source = String::from("^(?:");
    for c in pattern.trim().chars() {
        match c {
            '*' => source.push_str(".*"),
            '?' => source.push_str(".?"),
            other => source.push_str(&regex::escape(other.encode_utf8(&mut [0u8; 4]))),
        }
    }
    source.push_str(")$");
    Regex::new(&source).ok()
}

fn matches(regex: &Option<Regex>, signature: &str) -> bool {
    regex.as_ref().map_or(true, |r| r.is_match(signature))
}

/// Render the help page of a class
pub fn help_page(
    class: &ClassRef,
    classes: &ClassRegistry,
    pattern: Option<&str>,
    short_name: bool,
) -> String {
    let regex = pattern_regex(pattern);
    let prefix_indent = format!("{}{}", PREFIX, INDENT);
    let double_lines = format!("\n{}\n", prefix_indent);

    let mut methods: Vec<String> = Vec::new();
    let mut fields: Vec<String> = Vec::new();
    for owner in classes.hierarchy(class) {
        methods.extend(owner.declared_methods().iter().map(|m| m.signature(short_name)));
        fields.extend(owner.declared_fields().iter().map(|f| f.signature(short_name)));
    }
    methods.sort();
    methods.dedup();
    fields.sort();
    fields.dedup();

    let mut out = String::new();
    out.push_str("Help on class ");
    out.push_str(class.simple_name());
    out.push_str(" in package ");
    out.push_str(class.package());
    out.push_str(":\n\n");
    out.push_str(&class.signature(short_name));
    out.push_str(" {");
    out.push_str(&double_lines);

    let section = |title: &str, entries: &[String], filter: bool, out: &mut String| {
        out.push_str(&prefix_indent);
        out.push_str(title);
        out.push_str(&double_lines);
        for entry in entries.iter().filter(|e| !filter || matches(&regex, e)) {
            out.push_str(&prefix_indent);
            out.push_str(entry);
            out.push_str(&double_lines);
        }
    };

    section("Methods defined here:", &methods, true, &mut out);
    out.push_str(&format!("{}{}\n", prefix_indent, SEPARATOR));
    section("Fields defined here:", &fields, true, &mut out);
    out.push_str(&format!("{}{}\n", prefix_indent, SEPARATOR));

    let nested: Vec<String> = class
        .nested_classes()
        .iter()
        .map(|name| match classes.get(name) {
            Some(inner) => inner.signature(short_name),
            None => name.clone(),
        })
        .collect();
    section("Internal classes defined here:", &nested, false, &mut out);

    out.push_str("}\n");
    out
}
