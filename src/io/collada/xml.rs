//! A minimal XML element tree with path queries.
//!
//! [`XmlDocument`] reads a whole document into memory with `quick-xml` and
//! answers path expressions through [`DocumentQuery`]. Namespace prefixes are
//! dropped, so COLLADA's default namespace needs no declaration.
//!
//! # Path language
//!
//! | Syntax | Meaning |
//! |--------|---------|
//! | `/a/b` | child elements named `b` of root elements named `a` |
//! | `//a` | descendant elements named `a` |
//! | `*` | any element name |
//! | `[n]` | the `n`-th (1-based) element of the step's whole result, in document order |
//! | `[@k='v']` | elements whose attribute `k` equals `v` |
//! | `/@k` | value of attribute `k` of the first matching element |
//! | `/string()` | text content of the first matching element |
//! | `count(path)` | number of matching elements |
//!
//! Positional predicates index the complete result of their step rather than
//! each parent's children, so `//geometry[3]` is the third geometry in the
//! document however the libraries are split.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use super::query::DocumentQuery;
use crate::error::{MeshError, Result};

#[derive(Debug, Clone)]
struct Element {
    name: String,
    attributes: Vec<(String, String)>,
    text: String,
    children: Vec<usize>,
}

impl Element {
    fn new(name: String, attributes: Vec<(String, String)>) -> Self {
        Self {
            name,
            attributes,
            text: String::new(),
            children: Vec::new(),
        }
    }

    fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// An in-memory XML document.
///
/// # Example
///
/// ```
/// use tessera::io::collada::{DocumentQuery, XmlDocument};
///
/// let doc = XmlDocument::parse(r#"<a><b id="x">1 2</b><b id="y">3</b></a>"#).unwrap();
/// assert_eq!(doc.evaluate("count(//b)").as_deref(), Some("2"));
/// assert_eq!(doc.evaluate("//b[@id='y']/string()").as_deref(), Some("3"));
/// assert_eq!(doc.evaluate("/a/b[1]/@id").as_deref(), Some("x"));
/// ```
#[derive(Debug, Clone)]
pub struct XmlDocument {
    /// Elements in document order; index 0 is the document node.
    elements: Vec<Element>,
}

fn xml_error(position: u64, error: impl std::fmt::Display) -> MeshError {
    MeshError::Xml {
        position,
        message: error.to_string(),
    }
}

fn read_start(start: &BytesStart<'_>, position: u64) -> Result<Element> {
    let name = String::from_utf8_lossy(start.local_name().as_ref()).into_owned();

    let mut attributes = Vec::new();
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(position, e))?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).into_owned();
        let value = attr
            .unescape_value()
            .map_err(|e| xml_error(position, e))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element::new(name, attributes))
}

impl XmlDocument {
    /// Parse a complete document.
    pub fn parse(xml: &str) -> Result<Self> {
        let mut reader = Reader::from_str(xml);
        reader.config_mut().trim_text(true);

        let mut elements = vec![Element::new(String::new(), Vec::new())];
        let mut open = vec![0usize];

        loop {
            let position = reader.buffer_position() as u64;
            match reader.read_event() {
                Ok(Event::Start(ref e)) => {
                    let id = Self::push(&mut elements, &open, read_start(e, position)?);
                    open.push(id);
                }
                Ok(Event::Empty(ref e)) => {
                    Self::push(&mut elements, &open, read_start(e, position)?);
                }
                Ok(Event::End(_)) => {
                    if open.len() > 1 {
                        open.pop();
                    }
                }
                Ok(Event::Text(ref e)) => {
                    let text = e.unescape().map_err(|e| xml_error(position, e))?;
                    Self::append_text(&mut elements, &open, &text);
                }
                Ok(Event::CData(ref e)) => {
                    let text = String::from_utf8_lossy(&e[..]).into_owned();
                    Self::append_text(&mut elements, &open, &text);
                }
                Ok(Event::Eof) => break,
                Err(e) => return Err(xml_error(reader.error_position() as u64, e)),
                _ => {}
            }
        }

        if open.len() > 1 {
            return Err(xml_error(
                reader.buffer_position() as u64,
                format!("unclosed element <{}>", elements[open[open.len() - 1]].name),
            ));
        }

        Ok(Self { elements })
    }

    fn push(elements: &mut Vec<Element>, open: &[usize], element: Element) -> usize {
        let id = elements.len();
        elements.push(element);
        if let Some(&parent) = open.last() {
            elements[parent].children.push(id);
        }
        id
    }

    fn append_text(elements: &mut [Element], open: &[usize], text: &str) {
        let Some(&current) = open.last() else {
            return;
        };
        let element = &mut elements[current];
        if !element.text.is_empty() {
            element.text.push(' ');
        }
        element.text.push_str(text);
    }

    /// Number of elements in the document.
    pub fn len(&self) -> usize {
        self.elements.len() - 1
    }

    /// Check if the document has no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Text of an element and all of its descendants, space separated.
    fn text_content(&self, id: usize) -> String {
        let mut parts = Vec::new();
        let mut stack = vec![id];
        while let Some(node) = stack.pop() {
            let element = &self.elements[node];
            if !element.text.is_empty() {
                parts.push(element.text.as_str());
            }
            stack.extend(element.children.iter().rev());
        }
        parts.join(" ")
    }

    fn select(&self, steps: &[Step]) -> Vec<usize> {
        let mut context = vec![0];
        for step in steps {
            let mut matched = Vec::new();
            for &node in &context {
                if step.descendant {
                    self.collect_descendants(node, &step.test, &mut matched);
                } else {
                    matched.extend(
                        self.elements[node]
                            .children
                            .iter()
                            .copied()
                            .filter(|&c| step.test.matches(&self.elements[c].name)),
                    );
                }
            }
            // Ids are assigned in document order
            matched.sort_unstable();
            matched.dedup();

            for filter in &step.filters {
                matched = match filter {
                    Filter::Position(n) => matched.get(n - 1).copied().into_iter().collect(),
                    Filter::Attribute { name, value } => matched
                        .into_iter()
                        .filter(|&id| self.elements[id].attribute(name) == Some(value.as_str()))
                        .collect(),
                };
            }

            if matched.is_empty() {
                return matched;
            }
            context = matched;
        }
        context
    }

    fn collect_descendants(&self, node: usize, test: &NameTest, out: &mut Vec<usize>) {
        let mut stack: Vec<usize> = self.elements[node].children.iter().rev().copied().collect();
        while let Some(id) = stack.pop() {
            let element = &self.elements[id];
            if test.matches(&element.name) {
                out.push(id);
            }
            stack.extend(element.children.iter().rev());
        }
    }
}

impl DocumentQuery for XmlDocument {
    fn evaluate(&self, query: &str) -> Option<String> {
        let expression = Expression::parse(query)?;
        match expression {
            Expression::Count(path) => {
                let nodes = self.select(&path.steps);
                let count = match &path.terminal {
                    Terminal::Attribute(name) => nodes
                        .iter()
                        .filter(|&&id| self.elements[id].attribute(name).is_some())
                        .count(),
                    Terminal::Element | Terminal::Text => nodes.len(),
                };
                Some(count.to_string())
            }
            Expression::Value(path) => {
                let nodes = self.select(&path.steps);
                match &path.terminal {
                    Terminal::Attribute(name) => nodes
                        .iter()
                        .find_map(|&id| self.elements[id].attribute(name))
                        .map(str::to_string),
                    Terminal::Element | Terminal::Text => {
                        nodes.first().map(|&id| self.text_content(id))
                    }
                }
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum NameTest {
    Any,
    Name(String),
}

impl NameTest {
    fn matches(&self, name: &str) -> bool {
        match self {
            NameTest::Any => true,
            NameTest::Name(n) => n == name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Filter {
    /// 1-based position.
    Position(usize),
    Attribute { name: String, value: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Step {
    descendant: bool,
    test: NameTest,
    filters: Vec<Filter>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Terminal {
    Element,
    Attribute(String),
    Text,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Path {
    steps: Vec<Step>,
    terminal: Terminal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Expression {
    Count(Path),
    Value(Path),
}

impl Expression {
    fn parse(query: &str) -> Option<Self> {
        let query = query.trim();
        match query
            .strip_prefix("count(")
            .and_then(|rest| rest.strip_suffix(')'))
        {
            Some(inner) => Some(Expression::Count(Path::parse(inner.trim())?)),
            None => Some(Expression::Value(Path::parse(query)?)),
        }
    }
}

impl Path {
    fn parse(path: &str) -> Option<Self> {
        let segments = split_segments(path)?;
        // Only absolute paths
        if segments.first().map(|s| !s.is_empty()).unwrap_or(true) {
            return None;
        }

        let mut steps = Vec::new();
        let mut terminal = Terminal::Element;
        let mut descendant = false;
        let last = segments.len() - 1;

        for (i, segment) in segments.iter().enumerate().skip(1) {
            if segment.is_empty() {
                if descendant || i == last {
                    return None;
                }
                descendant = true;
                continue;
            }

            if let Some(name) = segment.strip_prefix('@') {
                if i != last || descendant || name.is_empty() {
                    return None;
                }
                terminal = Terminal::Attribute(name.to_string());
            } else if *segment == "string()" || *segment == "text()" {
                if i != last || descendant {
                    return None;
                }
                terminal = Terminal::Text;
            } else {
                steps.push(Step::parse(segment, descendant)?);
                descendant = false;
            }
        }

        if steps.is_empty() {
            return None;
        }
        Some(Path { steps, terminal })
    }
}

impl Step {
    fn parse(segment: &str, descendant: bool) -> Option<Self> {
        let (name, mut rest) = match segment.find('[') {
            Some(i) => (&segment[..i], &segment[i..]),
            None => (segment, ""),
        };
        let test = match name {
            "" => return None,
            "*" => NameTest::Any,
            n => NameTest::Name(n.to_string()),
        };

        let mut filters = Vec::new();
        while !rest.is_empty() {
            let inner_end = rest.find(']')?;
            let inner = rest.get(1..inner_end)?.trim();
            if !rest.starts_with('[') {
                return None;
            }
            filters.push(Filter::parse(inner)?);
            rest = &rest[inner_end + 1..];
        }

        Some(Step {
            descendant,
            test,
            filters,
        })
    }
}

impl Filter {
    fn parse(inner: &str) -> Option<Self> {
        if let Ok(n) = inner.parse::<usize>() {
            return (n >= 1).then_some(Filter::Position(n));
        }

        let (name, value) = inner.strip_prefix('@')?.split_once('=')?;
        let value = value.trim();
        let quote = value.chars().next()?;
        if quote != '\'' && quote != '"' {
            return None;
        }
        let value = value.strip_prefix(quote)?.strip_suffix(quote)?;
        Some(Filter::Attribute {
            name: name.trim().to_string(),
            value: value.to_string(),
        })
    }
}

/// Split on `/` outside of predicates and quoted strings.
fn split_segments(path: &str) -> Option<Vec<&str>> {
    let mut segments = Vec::new();
    let mut depth = 0usize;
    let mut quote: Option<char> = None;
    let mut start = 0;

    for (i, c) in path.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'') | (None, '"') => quote = Some(c),
            (None, '[') => depth += 1,
            (None, ']') => depth = depth.checked_sub(1)?,
            (None, '/') if depth == 0 => {
                segments.push(&path[start..i]);
                start = i + 1;
            }
            _ => {}
        }
    }
    if depth != 0 || quote.is_some() {
        return None;
    }
    segments.push(&path[start..]);
    Some(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    const DOC: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<COLLADA xmlns="http://www.collada.org/2005/11/COLLADASchema" version="1.4.1">
  <library_geometries>
    <geometry id="a" name="First"><mesh><source id="a-pos"/></mesh></geometry>
  </library_geometries>
  <library_geometries>
    <geometry id="b"><mesh><float_array id="b-arr" count="3">1 2
      3</float_array></mesh></geometry>
  </library_geometries>
</COLLADA>"#;

    #[test]
    fn test_descendant_and_position() {
        let doc = XmlDocument::parse(DOC).unwrap();

        assert_eq!(doc.evaluate("count(//geometry)").as_deref(), Some("2"));
        // Positions index the whole result, across both libraries
        assert_eq!(doc.evaluate("//geometry[2]/@id").as_deref(), Some("b"));
        assert_eq!(doc.evaluate("//geometry[1]/@name").as_deref(), Some("First"));
        assert_eq!(doc.evaluate("//geometry[2]/@name"), None);
        assert_eq!(doc.evaluate("//geometry[3]/@id"), None);
    }

    #[test]
    fn test_attribute_predicate_and_text() {
        let doc = XmlDocument::parse(DOC).unwrap();

        assert_eq!(
            doc.evaluate("//float_array[@id='b-arr']/@count").as_deref(),
            Some("3")
        );
        let text = doc.evaluate("//float_array[@id=\"b-arr\"]/string()").unwrap();
        assert_eq!(text.split_whitespace().collect::<Vec<_>>(), vec!["1", "2", "3"]);
        assert_eq!(doc.evaluate("count(//float_array[@id='nope'])").as_deref(), Some("0"));
    }

    #[test]
    fn test_child_paths() {
        let doc = XmlDocument::parse(DOC).unwrap();

        assert_eq!(
            doc.evaluate("/COLLADA/library_geometries/geometry/@id").as_deref(),
            Some("a")
        );
        assert_eq!(doc.evaluate("count(/COLLADA/*)").as_deref(), Some("2"));
        assert_eq!(doc.evaluate("count(/geometry)").as_deref(), Some("0"));
        assert_eq!(doc.evaluate("count(//mesh/source/@id)").as_deref(), Some("1"));
    }

    #[test]
    fn test_malformed_queries() {
        let doc = XmlDocument::parse(DOC).unwrap();

        assert_eq!(doc.evaluate("geometry"), None);
        assert_eq!(doc.evaluate("//geometry[0]"), None);
        assert_eq!(doc.evaluate("//geometry[@id='a'"), None);
        assert_eq!(doc.evaluate("//geometry/@id/mesh"), None);
        assert_eq!(doc.evaluate("//"), None);
    }

    #[test]
    fn test_entities_and_cdata() {
        let doc = XmlDocument::parse("<a t=\"x&amp;y\"><b><![CDATA[<raw>]]></b></a>").unwrap();
        assert_eq!(doc.evaluate("/a/@t").as_deref(), Some("x&y"));
        assert_eq!(doc.evaluate("/a/b/string()").as_deref(), Some("<raw>"));
        assert_eq!(doc.len(), 2);
    }

    #[test]
    fn test_invalid_xml() {
        assert!(matches!(
            XmlDocument::parse("<a><b></a>"),
            Err(MeshError::Xml { .. })
        ));
        assert!(XmlDocument::parse("<a><b>").is_err());
    }
}
