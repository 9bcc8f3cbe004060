use std::fmt::Write as _;

use crate::element::{Element, Scene};

impl Scene {
    /// Markup for the scene's elements, suitable for a surface's inner HTML.
    pub fn to_svg_markup(&self) -> String {
        let mut out = String::new();
        for e in &self.elements {
            write_element(&mut out, e);
        }
        out
    }
}

impl Element {
    pub fn to_svg_markup(&self) -> String {
        let mut out = String::new();
        write_element(&mut out, self);
        out
    }
}

fn write_element(out: &mut String, e: &Element) {
    let tag = e.tag.name();
    out.push('<');
    out.push_str(tag);
    for (name, value) in &e.attrs {
        let _ = write!(out, " {name}=\"{}\"", escape(value));
    }
    if !e.styles.is_empty() {
        out.push_str(" style=\"");
        for (name, value) in &e.styles {
            let _ = write!(out, "{name}:{};", escape(value));
        }
        out.push('"');
    }

    if e.text.is_none() && e.children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');
    if let Some(text) = &e.text {
        out.push_str(&escape(text));
    }
    for c in &e.children {
        write_element(out, c);
    }
    let _ = write!(out, "</{tag}>");
}

pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for ch in s.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}
