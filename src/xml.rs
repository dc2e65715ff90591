// SPDX-License-Identifier: Apache-2.0
// Copyright 2026 Joe Pearson
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Element tree built on top of the quick-xml streaming reader.
//!
//! The decoder works on whole subtrees rather than events: AIXM wraps
//! feature properties in arbitrary nesting levels (time slices, GML
//! wrappers), so field lookup searches descendants by local name. Namespace
//! prefixes are stripped on both element and attribute names; AIXM documents
//! in the wild disagree on prefixes but not on local names.

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;

use crate::error::Error;

/// A single XML element with its attributes, text content and children.
#[derive(Clone, Debug, Default)]
pub struct Element {
    /// Local element name, namespace prefix stripped.
    pub name: String,
    /// Attributes as `(local name, value)` pairs in document order.
    /// Namespace declarations are dropped.
    pub attributes: Vec<(String, String)>,
    /// Concatenated direct text content.
    pub text: String,
    /// Child elements in document order.
    pub children: Vec<Element>,
}

impl Element {
    /// Parses a complete document into an element tree rooted at the
    /// document element.
    pub fn parse(data: &[u8]) -> Result<Element, Error> {
        let mut reader = Reader::from_reader(data);
        reader.config_mut().trim_text(true);

        let mut stack: Vec<Element> = Vec::new();
        let mut buf = Vec::new();

        loop {
            buf.clear();
            match reader.read_event_into(&mut buf)? {
                Event::Start(ref e) => stack.push(element_from_start(e)?),
                Event::Empty(ref e) => {
                    let element = element_from_start(e)?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::End(_) => {
                    let element = stack
                        .pop()
                        .ok_or_else(|| Error::Xml("unexpected end tag".into()))?;
                    match stack.last_mut() {
                        Some(parent) => parent.children.push(element),
                        None => return Ok(element),
                    }
                }
                Event::Text(ref t) => {
                    if let Some(top) = stack.last_mut() {
                        let text = t.unescape().map_err(|e| Error::Xml(e.to_string()))?;
                        top.text.push_str(&text);
                    }
                }
                Event::CData(ref t) => {
                    if let Some(top) = stack.last_mut() {
                        top.text.push_str(std::str::from_utf8(t)?);
                    }
                }
                Event::Eof => return Err(Error::Xml("unexpected end of document".into())),
                _ => {}
            }
        }
    }

    /// Returns the value of the attribute with the given local name.
    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Returns the trimmed text content.
    pub fn trimmed_text(&self) -> &str {
        self.text.trim()
    }

    /// Iterates over all descendant elements in document order,
    /// excluding `self`.
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants {
            stack: self.children.iter().rev().collect(),
        }
    }

    /// Iterates over all descendants with the given local name.
    pub fn descendants_named<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Element> {
        self.descendants().filter(move |e| e.name == name)
    }

    /// Returns the first descendant with the given local name.
    pub fn first_descendant(&self, name: &str) -> Option<&Element> {
        self.descendants().find(|e| e.name == name)
    }
}

/// Pre-order iterator over an element's descendants.
pub struct Descendants<'a> {
    stack: Vec<&'a Element>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a Element;

    fn next(&mut self) -> Option<Self::Item> {
        let element = self.stack.pop()?;
        for child in element.children.iter().rev() {
            self.stack.push(child);
        }
        Some(element)
    }
}

fn element_from_start(e: &BytesStart) -> Result<Element, Error> {
    let name = std::str::from_utf8(local_name(e.name().as_ref()))?.to_string();

    let mut attributes = Vec::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = attr.key.as_ref();
        if key == b"xmlns" || key.starts_with(b"xmlns:") {
            continue;
        }
        let key = std::str::from_utf8(local_name(key))?.to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| Error::Xml(e.to_string()))?
            .into_owned();
        attributes.push((key, value));
    }

    Ok(Element {
        name,
        attributes,
        text: String::new(),
        children: Vec::new(),
    })
}

/// Returns the local name of an XML element, stripping any namespace prefix.
fn local_name(name: &[u8]) -> &[u8] {
    name.iter()
        .position(|&b| b == b':')
        .map_or(name, |pos| &name[pos + 1..])
}
