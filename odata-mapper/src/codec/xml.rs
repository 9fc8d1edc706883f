//! Atom XML read path
//!
//! Response bodies are parsed with roxmltree and copied into an owned tree so a
//! document can outlive the text it was parsed from. Element names keep the
//! prefix the server used (`m:properties`, `d:Name`), which is how entries are
//! navigated.

use std::collections::HashMap;

use quick_xml::Reader;
use quick_xml::Writer;
use quick_xml::events::Event;

use crate::error::{DeserializationError, MappingError, Result};
use crate::mapping::{Record, Role};

const ENTRY: &str = "entry";
const CONTENT: &str = "content";
const PROPERTIES: &str = "m:properties";
const PROPERTY_PREFIX: &str = "d:";

/// An element with its qualified name, full text content and element children
#[derive(Debug, Clone, PartialEq)]
pub struct XmlElement {
    name: String,
    local_name: String,
    namespace: Option<String>,
    text: String,
    children: Vec<XmlElement>,
}

impl XmlElement {
    /// Qualified name as written in the document, e.g. `d:Name`
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Concatenated text of all descendants
    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn children(&self) -> &[XmlElement] {
        &self.children
    }

    /// First direct child with the qualified name
    pub fn child(&self, name: &str) -> Option<&XmlElement> {
        self.children.iter().find(|child| child.name == name)
    }

    /// This element and all descendants with the qualified name, in document order
    pub fn elements_named<'a>(&'a self, name: &str, found: &mut Vec<&'a XmlElement>) {
        if self.name == name {
            found.push(self);
        }
        for child in &self.children {
            child.elements_named(name, found);
        }
    }

    fn from_node(node: roxmltree::Node<'_, '_>) -> Self {
        let tag = node.tag_name();
        let local_name = tag.name().to_string();
        let name = match tag.namespace().and_then(|uri| node.lookup_prefix(uri)) {
            Some(prefix) if !prefix.is_empty() => format!("{}:{}", prefix, local_name),
            _ => local_name.clone(),
        };
        let text = node
            .descendants()
            .filter(|n| n.is_text())
            .filter_map(|n| n.text())
            .collect();
        let children = node
            .children()
            .filter(|n| n.is_element())
            .map(XmlElement::from_node)
            .collect();

        Self {
            name,
            local_name,
            namespace: tag.namespace().map(str::to_string),
            text,
            children,
        }
    }
}

/// A parsed response body
#[derive(Debug, Clone, PartialEq)]
pub struct XmlDocument {
    root: XmlElement,
}

impl XmlDocument {
    pub fn parse(text: &str) -> std::result::Result<Self, roxmltree::Error> {
        let document = roxmltree::Document::parse(text)?;
        Ok(Self {
            root: XmlElement::from_node(document.root_element()),
        })
    }

    pub fn root(&self) -> &XmlElement {
        &self.root
    }

    pub fn elements_named(&self, name: &str) -> Vec<&XmlElement> {
        let mut found = Vec::new();
        self.root.elements_named(name, &mut found);
        found
    }

    /// Every `entry` element, whether the root is a feed or a single entry
    pub fn entries(&self) -> Vec<&XmlElement> {
        self.elements_named(ENTRY)
    }

    pub fn first_text(&self, name: &str) -> Option<&str> {
        self.elements_named(name).first().map(|element| element.text())
    }
}

/// Flatten an entry's `d:` properties into `name → text`.
///
/// Properties are looked up under `content/m:properties`; media-link entries
/// carry `m:properties` directly under the entry, which is accepted as well.
pub fn properties(
    entry: &XmlElement,
) -> std::result::Result<HashMap<String, String>, DeserializationError> {
    let content = entry.child(CONTENT);
    let properties = match content.and_then(|content| content.child(PROPERTIES)) {
        Some(properties) => properties,
        None => match entry.child(PROPERTIES) {
            Some(properties) => properties,
            None if content.is_none() => return Err(DeserializationError::new(CONTENT)),
            None => return Err(DeserializationError::new(PROPERTIES)),
        },
    };

    Ok(properties
        .children()
        .iter()
        .filter_map(|child| {
            child
                .name()
                .strip_prefix(PROPERTY_PREFIX)
                .map(|name| (name.to_string(), child.text().to_string()))
        })
        .collect())
}

/// Apply one entry onto `record`; every setter of `role` must find its property
pub fn apply_entry<R: Record>(record: &mut R, entry: &XmlElement, role: Role) -> Result<()> {
    let map = properties(entry).map_err(|err| err.with_local_type(R::descriptor().type_name()))?;
    super::apply_flat_map(record, &map, role, true)
}

/// One record per entry; any count is accepted
pub fn records_from_document<R: Record>(document: &XmlDocument, role: Role) -> Result<Vec<R>> {
    document
        .entries()
        .into_iter()
        .map(|entry| {
            let mut record = R::default();
            apply_entry(&mut record, entry, role)?;
            Ok(record)
        })
        .collect()
}

/// Apply the document's only entry onto `record`
pub fn apply_single<R: Record>(record: &mut R, document: &XmlDocument, role: Role) -> Result<()> {
    let entries = document.entries();
    if entries.len() != 1 {
        return Err(MappingError::EntryCount {
            actual: entries.len(),
        }
        .into());
    }
    apply_entry(record, entries[0], role)
}

/// Re-indent XML for display; `None` if the text is not well-formed
pub fn pretty_print(text: &str) -> Option<String> {
    let mut reader = Reader::from_str(text);
    reader.config_mut().trim_text(true);
    let mut writer = Writer::new_with_indent(Vec::new(), b' ', 2);

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(event) => writer.write_event(event).ok()?,
            Err(_) => return None,
        }
    }

    String::from_utf8(writer.into_inner()).ok()
}
