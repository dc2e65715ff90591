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

//! Decoded feature records and their field values.
//!
//! Records are shared through [`FeatureRef`]: the batch result owns the
//! top-level records, nested records hang off their parent's fields, and
//! the [`DecodeContext`](crate::DecodeContext) registries hold additional
//! strong handles for lookup during one batch. XLink targets and parent
//! back-references are weak or id-based, so the graph never owns itself in
//! a cycle.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use indexmap::IndexMap;

use crate::geometry::GeometrySegment;

/// Shared handle to a decoded feature record.
pub type FeatureRef = Rc<RefCell<FeatureRecord>>;

/// Shared handle to an XLink placeholder, deduplicated by href.
pub type LinkRef = Rc<RefCell<XLink>>;

/// One feature decoded from a member element.
#[derive(Clone, Debug, Default)]
pub struct FeatureRecord {
    /// Schema type name, equal to the feature element's local name.
    pub type_name: String,
    /// Element identity from the `gml:id` attribute.
    pub id: Option<String>,
    /// Business key from the `gml:identifier` child, if present.
    pub identifier: Option<String>,
    /// Identity of the enclosing record. Context during decode only, never
    /// an ownership edge.
    pub parent: Option<String>,
    /// Decoded fields in schema declaration order.
    pub fields: IndexMap<String, FieldValue>,
}

impl FeatureRecord {
    pub fn new(type_name: &str, id: Option<String>, parent: Option<String>) -> Self {
        Self {
            type_name: type_name.to_string(),
            id,
            identifier: None,
            parent,
            fields: IndexMap::new(),
        }
    }

    /// Returns the decoded value of a field.
    pub fn field(&self, name: &str) -> Option<&FieldValue> {
        self.fields.get(name)
    }
}

/// A decoded field slot. The cardinality mirrors the document: zero
/// matching elements, exactly one, or two and more in document order.
#[derive(Clone, Debug, Default)]
pub enum FieldValue {
    /// No matching child element.
    #[default]
    Absent,
    /// Exactly one matching child element.
    One(Value),
    /// Two or more matching child elements, document order preserved.
    Many(Vec<Value>),
}

impl FieldValue {
    /// Aggregates per-tag matches into a field slot.
    pub fn from_values(mut values: Vec<Value>) -> Self {
        match values.len() {
            0 => Self::Absent,
            1 => Self::One(values.remove(0)),
            _ => Self::Many(values),
        }
    }

    /// Number of decoded values in this slot.
    pub fn len(&self) -> usize {
        match self {
            Self::Absent => 0,
            Self::One(_) => 1,
            Self::Many(values) => values.len(),
        }
    }

    /// Whether the slot holds no value.
    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Absent)
    }
}

/// A single decoded value inside a field slot.
#[derive(Clone, Debug)]
pub enum Value {
    /// Trimmed element text.
    Text(String),
    /// A nested or substituted feature record.
    Feature(FeatureRef),
    /// A deferred reference to another feature.
    Link(LinkRef),
    /// An explicit nil marker with its optional reason.
    Nil(Option<String>),
    /// A decoded GML curve or surface patch.
    Geometry(GeometrySegment),
}

/// A deferred cross-reference, deduplicated by href within one batch.
#[derive(Clone, Debug)]
pub struct XLink {
    /// The raw `xlink:href` value.
    pub href: String,
    /// The `xlink:title` value, if present.
    pub title: Option<String>,
    target: Option<Weak<RefCell<FeatureRecord>>>,
}

impl XLink {
    pub fn new(href: &str, title: Option<&str>) -> Self {
        Self {
            href: href.to_string(),
            title: title.map(str::to_string),
            target: None,
        }
    }

    /// The resolved target feature, if resolution found one and it is
    /// still alive.
    pub fn target(&self) -> Option<FeatureRef> {
        self.target.as_ref()?.upgrade()
    }

    /// Whether resolution has assigned a target.
    pub fn is_resolved(&self) -> bool {
        self.target.is_some()
    }

    pub(crate) fn set_target(&mut self, feature: &FeatureRef) {
        self.target = Some(Rc::downgrade(feature));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_value_cardinality_matches_count() {
        assert!(matches!(FieldValue::from_values(vec![]), FieldValue::Absent));
        assert!(matches!(
            FieldValue::from_values(vec![Value::Text("a".into())]),
            FieldValue::One(Value::Text(_))
        ));

        let many = FieldValue::from_values(vec![
            Value::Text("a".into()),
            Value::Text("b".into()),
        ]);
        assert_eq!(many.len(), 2);
    }

    #[test]
    fn xlink_target_is_weak() {
        let mut link = XLink::new("#x", None);
        {
            let feature = Rc::new(RefCell::new(FeatureRecord::new(
                "Navaid",
                Some("x".into()),
                None,
            )));
            link.set_target(&feature);
            assert!(link.target().is_some());
        }
        // The registry handle is gone, the link must not keep it alive.
        assert!(link.is_resolved());
        assert!(link.target().is_none());
    }
}
