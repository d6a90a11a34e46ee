use crate::errors::parse_error;
use failure::Error;
use xml::reader::EventReader;
use xml::reader::XmlEvent;

/// A parsed XML element. Namespaces are dropped; EC2 uses a single one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    text: String,
    children: Vec<Element>,
}

impl Element {
    pub fn parse(body: &str) -> Result<Element, Error> {
        let mut stack: Vec<Element> = Vec::new();
        let mut root = None;
        for event in EventReader::from_str(body) {
            match event.map_err(|e| parse_error(format!("malformed XML: {}", e)))? {
                XmlEvent::StartElement { name, .. } => stack.push(Element {
                    name: name.local_name,
                    text: String::new(),
                    children: Vec::new(),
                }),
                XmlEvent::Characters(s) | XmlEvent::CData(s) => {
                    if let Some(element) = stack.last_mut() {
                        element.text.push_str(&s);
                    }
                }
                XmlEvent::EndElement { .. } => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| parse_error("unbalanced XML"))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => root = Some(element),
                    }
                }
                _ => (),
            }
        }
        root.ok_or_else(|| parse_error("empty XML document"))
    }

    /// Parses an API reply, whose root is always `<ActionResponse>`.
    pub fn parse_response(body: &str) -> Result<Element, Error> {
        let root = Element::parse(body)?;
        if !root.name.ends_with("Response") {
            return Err(parse_error(format!("not an EC2 response: <{}>", root.name)));
        }
        Ok(root)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn text(&self) -> &str {
        self.text.trim()
    }

    /// All descendants reached by a `/`-separated path of element names.
    pub fn find_all(&self, path: &str) -> Vec<&Element> {
        let mut current = vec![self];
        for part in path.split('/') {
            current = current
                .into_iter()
                .flat_map(|element| element.children.iter().filter(move |c| c.name == part))
                .collect();
        }
        current
    }

    pub fn find(&self, path: &str) -> Option<&Element> {
        self.find_all(path).into_iter().next()
    }

    /// Text of the first match; empty elements count as absent.
    pub fn find_text(&self, path: &str) -> Option<&str> {
        self.find(path).map(Element::text).filter(|s| !s.is_empty())
    }

    pub fn require(&self, path: &str) -> Result<&Element, Error> {
        self.find(path)
            .ok_or_else(|| parse_error(format!("missing <{}> in <{}>", path, self.name)))
    }

    pub fn require_text(&self, path: &str) -> Result<&str, Error> {
        self.find_text(path)
            .ok_or_else(|| parse_error(format!("missing <{}> in <{}>", path, self.name)))
    }
}
