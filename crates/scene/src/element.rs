/// SVG element kinds the renderers emit.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Tag {
    Group,
    Path,
    Circle,
    Ellipse,
    Text,
}

impl Tag {
    pub fn name(self) -> &'static str {
        match self {
            Tag::Group => "g",
            Tag::Path => "path",
            Tag::Circle => "circle",
            Tag::Ellipse => "ellipse",
            Tag::Text => "text",
        }
    }
}

/// One node of a rendered scene. Attributes and inline styles keep their
/// insertion order so that markup is stable across redraws.
#[derive(Debug, Clone, PartialEq)]
pub struct Element {
    pub tag: Tag,
    pub attrs: Vec<(&'static str, String)>,
    pub styles: Vec<(&'static str, String)>,
    pub text: Option<String>,
    pub children: Vec<Element>,
}

impl Element {
    pub fn new(tag: Tag) -> Self {
        Self {
            tag,
            attrs: Vec::new(),
            styles: Vec::new(),
            text: None,
            children: Vec::new(),
        }
    }

    pub fn group(class: &str) -> Self {
        Self::new(Tag::Group).with_attr("class", class)
    }

    pub fn path(d: impl Into<String>) -> Self {
        Self::new(Tag::Path).with_attr("d", d)
    }

    pub fn circle(cx: f64, cy: f64, r: f64) -> Self {
        Self::new(Tag::Circle)
            .with_attr("cx", num(cx))
            .with_attr("cy", num(cy))
            .with_attr("r", num(r))
    }

    pub fn ellipse(cx: f64, cy: f64, rx: f64, ry: f64) -> Self {
        Self::new(Tag::Ellipse)
            .with_attr("cx", num(cx))
            .with_attr("cy", num(cy))
            .with_attr("rx", num(rx))
            .with_attr("ry", num(ry))
    }

    pub fn text(content: impl Into<String>) -> Self {
        let mut e = Self::new(Tag::Text);
        e.text = Some(content.into());
        e
    }

    pub fn with_id(self, id: impl Into<String>) -> Self {
        self.with_attr("id", id)
    }

    pub fn with_class(self, class: impl Into<String>) -> Self {
        self.with_attr("class", class)
    }

    pub fn with_attr(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_style(mut self, name: &'static str, value: impl Into<String>) -> Self {
        self.set_style(name, value);
        self
    }

    pub fn with_children(mut self, children: Vec<Element>) -> Self {
        self.children = children;
        self
    }

    pub fn set_attr(&mut self, name: &'static str, value: impl Into<String>) {
        set_pair(&mut self.attrs, name, value.into());
    }

    pub fn set_style(&mut self, name: &'static str, value: impl Into<String>) {
        set_pair(&mut self.styles, name, value.into());
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        get_pair(&self.attrs, name)
    }

    pub fn style(&self, name: &str) -> Option<&str> {
        get_pair(&self.styles, name)
    }

    pub fn id(&self) -> Option<&str> {
        self.attr("id")
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.attr("class")
            .is_some_and(|c| c.split_whitespace().any(|c| c == class))
    }

    /// Depth-first search for the element with the given id.
    pub fn find(&self, id: &str) -> Option<&Element> {
        if self.id() == Some(id) {
            return Some(self);
        }
        self.children.iter().find_map(|c| c.find(id))
    }

    /// Depth-first walk over this element and all descendants.
    pub fn walk(&self) -> Vec<&Element> {
        let mut out = vec![self];
        for c in &self.children {
            out.extend(c.walk());
        }
        out
    }
}

/// Ordered top-level elements of one drawing surface.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Scene {
    pub elements: Vec<Element>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, element: Element) {
        self.elements.push(element);
    }

    pub fn find(&self, id: &str) -> Option<&Element> {
        self.elements.iter().find_map(|e| e.find(id))
    }

    /// First top-level element carrying `class`.
    pub fn layer(&self, class: &str) -> Option<&Element> {
        self.elements.iter().find(|e| e.has_class(class))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element> {
        self.elements.iter().flat_map(|e| e.walk())
    }
}

fn set_pair(pairs: &mut Vec<(&'static str, String)>, name: &'static str, value: String) {
    match pairs.iter_mut().find(|(k, _)| *k == name) {
        Some(slot) => slot.1 = value,
        None => pairs.push((name, value)),
    }
}

fn get_pair<'a>(pairs: &'a [(&'static str, String)], name: &str) -> Option<&'a str> {
    pairs
        .iter()
        .find(|(k, _)| *k == name)
        .map(|(_, v)| v.as_str())
}

/// Attribute form of a number: at most two decimals, no trailing zeros.
pub fn num(v: f64) -> String {
    let s = format!("{v:.2}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::{Element, Scene, Tag, num};
    use pretty_assertions::assert_eq;

    #[test]
    fn attributes_replace_in_place() {
        let mut e = Element::circle(1.0, 2.0, 3.0).with_id("a");
        e.set_attr("cx", "9");
        e.set_style("fill", "red");
        e.set_style("fill", "blue");
        assert_eq!(
            e.attrs,
            vec![
                ("cx", "9".to_string()),
                ("cy", "2".to_string()),
                ("r", "3".to_string()),
                ("id", "a".to_string()),
            ]
        );
        assert_eq!(e.style("fill"), Some("blue"));
        assert_eq!(e.styles.len(), 1);
    }

    #[test]
    fn finds_nested_elements_by_id() {
        let mut scene = Scene::new();
        scene.push(
            Element::group("points").with_children(vec![
                Element::path("M0,0").with_id("pwParis"),
                Element::path("M1,1").with_id("pwRome"),
            ]),
        );
        assert_eq!(scene.find("pwRome").map(|e| e.tag), Some(Tag::Path));
        assert!(scene.find("pwTokyo").is_none());
        assert!(scene.layer("points").is_some());
        assert_eq!(scene.iter().count(), 3);
    }

    #[test]
    fn class_lists_match_by_token() {
        let e = Element::path("").with_class("graticule noclicks");
        assert!(e.has_class("noclicks"));
        assert!(!e.has_class("noclick"));
    }

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(248.0), "248");
        assert_eq!(num(223.2), "223.2");
        assert_eq!(num(-0.004), "0");
    }
}
