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

//! Schema-driven feature decoding and batch orchestration.
//!
//! [`Decoder::decode`] walks every `hasMember` element of every input in
//! argument order, decodes each supported feature recursively against the
//! compiled schema, and runs XLink resolution exactly once after all
//! streams are done. References may therefore point at features defined in
//! a later stream of the same batch.
//!
//! Failures stay local: a stream that does not parse is skipped, a feature
//! that does not decode is omitted, and both are reported through
//! [`FeatureGraph::errors`]. The decode itself is a synchronous depth-first
//! walk with no internal scheduling.

use std::cell::RefCell;
use std::rc::Rc;

use log::{debug, warn};

use crate::context::DecodeContext;
use crate::error::Error;
use crate::feature::{FeatureRecord, FeatureRef, FieldValue, Value};
use crate::geometry;
use crate::schema::{Schema, TypeDescriptor, TypeRegistry, PATCH_TYPE, TEXT_TYPE};
use crate::xml::Element;

/// Local name of the member elements wrapping one feature each.
const MEMBER_TAG: &str = "hasMember";

/// Decodes a batch of AIXM documents against a schema.
///
/// # Examples
///
/// ```
/// use aixm_graph::{Decoder, Schema};
///
/// let schema = Schema::from_yaml("Navaid:\n  designator: string\n").unwrap();
/// let xml = br#"
///   <message:AIXMBasicMessage>
///     <message:hasMember>
///       <aixm:Navaid gml:id="uuid.n1">
///         <aixm:designator>BOR</aixm:designator>
///       </aixm:Navaid>
///     </message:hasMember>
///   </message:AIXMBasicMessage>"#;
///
/// let graph = Decoder::new(&schema).decode(&[&xml[..]]);
/// assert_eq!(graph.features().len(), 1);
/// ```
pub struct Decoder {
    types: TypeRegistry,
}

impl Decoder {
    /// Compiles the schema into a decoder.
    pub fn new(schema: &Schema) -> Self {
        Self {
            types: schema.compile(),
        }
    }

    /// Decodes all inputs into one feature graph and resolves references.
    ///
    /// Top-level features are ordered by input argument order, then by
    /// document order within each input.
    pub fn decode(&self, inputs: &[&[u8]]) -> FeatureGraph {
        let mut context = DecodeContext::new();
        let mut features = Vec::new();
        let mut errors = Vec::new();

        for (index, data) in inputs.iter().enumerate() {
            match Element::parse(data) {
                Ok(root) => {
                    self.decode_members(&root, &mut context, &mut features, &mut errors);
                }
                Err(e) => {
                    let error = Error::Stream {
                        index,
                        source: Box::new(e),
                    };
                    warn!("{error}");
                    errors.push(error);
                }
            }
        }

        // Resolution runs once per batch so cross-stream references work
        // regardless of input order.
        context.resolve();

        FeatureGraph {
            features,
            context,
            errors,
        }
    }

    /// Convenience for a single document.
    pub fn decode_one(&self, data: &[u8]) -> FeatureGraph {
        self.decode(&[data])
    }

    fn decode_members(
        &self,
        root: &Element,
        context: &mut DecodeContext,
        features: &mut Vec<FeatureRef>,
        errors: &mut Vec<Error>,
    ) {
        for member in root.descendants_named(MEMBER_TAG) {
            // The first child of a member element is the feature.
            let Some(element) = member.children.first() else {
                continue;
            };
            let Some(descriptor) = self.types.get(&element.name) else {
                debug!("no descriptor for {}, skipping member", element.name);
                continue;
            };

            match self.decode_record(descriptor, element, context, None) {
                Ok(feature) => features.push(feature),
                Err(e) => {
                    let error = Error::Feature {
                        type_name: element.name.clone(),
                        source: Box::new(e),
                    };
                    warn!("{error}");
                    errors.push(error);
                }
            }
        }
    }

    /// Decodes one element as the given type, registering it and recursing
    /// into composite fields.
    fn decode_record(
        &self,
        descriptor: &TypeDescriptor,
        element: &Element,
        context: &mut DecodeContext,
        parent: Option<String>,
    ) -> Result<FeatureRef, Error> {
        let id = element.attr("id").map(str::to_string);
        let mut record = FeatureRecord::new(&descriptor.type_name, id.clone(), parent);

        // The business key is a direct child, unlike fields which may hide
        // behind wrapper elements.
        if let Some(identifier) = element.children.iter().find(|c| c.name == "identifier") {
            let text = identifier.trimmed_text();
            if !text.is_empty() {
                record.identifier = Some(text.to_string());
            }
        }

        let feature = Rc::new(RefCell::new(record));
        context.register(&feature);

        for field in &descriptor.fields {
            let mut values = Vec::new();
            for matched in element.descendants_named(&field.source_tag) {
                self.decode_field_value(field.target_type.as_str(), matched, context, &id, &mut values)?;
            }
            feature
                .borrow_mut()
                .fields
                .insert(field.field_name.clone(), FieldValue::from_values(values));
        }

        Ok(feature)
    }

    /// Decodes one matched element into zero or more values.
    ///
    /// Precedence: a reference link wins over everything, then an explicit
    /// nil marker, then plain text, then recursion into the target type.
    fn decode_field_value(
        &self,
        target_type: &str,
        matched: &Element,
        context: &mut DecodeContext,
        parent: &Option<String>,
        values: &mut Vec<Value>,
    ) -> Result<(), Error> {
        if let Some(href) = matched.attr("href") {
            values.push(Value::Link(context.link(href, matched.attr("title"))));
        } else if is_nil(matched) {
            values.push(Value::Nil(matched.attr("nilReason").map(str::to_string)));
        } else if target_type == PATCH_TYPE {
            for patch in matched.descendants_named(PATCH_TYPE) {
                values.push(Value::Geometry(geometry::polygon_patch(patch)?));
            }
        } else if target_type == TEXT_TYPE {
            push_text(matched, values);
        } else if let Some(target) = self.types.get(target_type) {
            for nested in matched.descendants_named(&target.type_name) {
                let child = self.decode_record(target, nested, context, parent.clone())?;
                values.push(Value::Feature(child));
            }
        } else {
            // No descriptor for the target type: degrade to opaque text.
            debug!("no descriptor for target type {target_type}, decoding as text");
            push_text(matched, values);
        }

        Ok(())
    }
}

/// Decodes a batch with a one-off decoder.
pub fn decode(schema: &Schema, inputs: &[&[u8]]) -> FeatureGraph {
    Decoder::new(schema).decode(inputs)
}

fn push_text(element: &Element, values: &mut Vec<Value>) {
    // Empty text contributes nothing to the match count.
    let text = element.trimmed_text();
    if !text.is_empty() {
        values.push(Value::Text(text.to_string()));
    }
}

fn is_nil(element: &Element) -> bool {
    element
        .attr("nil")
        .is_some_and(|v| v == "true" || v == "1")
}

/// The result of one batch decode: the top-level features in order, the
/// batch context, and the diagnostics collected along the way.
#[derive(Debug, Default)]
pub struct FeatureGraph {
    features: Vec<FeatureRef>,
    context: DecodeContext,
    errors: Vec<Error>,
}

impl FeatureGraph {
    /// Top-level features in batch order.
    pub fn features(&self) -> &[FeatureRef] {
        &self.features
    }

    /// Recoverable errors collected during the batch.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// The batch decode context with its identity and link registries.
    pub fn context(&self) -> &DecodeContext {
        &self.context
    }

    /// Re-runs XLink resolution. Idempotent; [`Decoder::decode`] already
    /// resolves once per batch.
    pub fn resolve_links(&mut self) {
        self.context.resolve();
    }

    /// Replaces every resolved [`Value::Link`] in the graph with the
    /// feature it points to, recursing into composite fields.
    ///
    /// Each top-level feature is walked with a fresh visited set of feature
    /// ids, checked per descent path, so legitimately shared features stay
    /// shared while cyclic references are never expanded infinitely. Links
    /// whose target has no identity are left in place.
    pub fn substitute_links(&mut self) {
        for feature in &self.features {
            let mut path = Vec::new();
            substitute_record(feature, &mut path);
        }
    }
}

fn substitute_record(feature: &FeatureRef, path: &mut Vec<String>) {
    let pushed = match feature.borrow().id.clone() {
        Some(id) => {
            if path.contains(&id) {
                return;
            }
            path.push(id);
            true
        }
        None => false,
    };

    // Replace links first, then recurse without holding the borrow.
    let mut nested = Vec::new();
    {
        let mut record = feature.borrow_mut();
        for value in record.fields.values_mut() {
            match value {
                FieldValue::One(v) => substitute_value(v, path, &mut nested),
                FieldValue::Many(vs) => {
                    for v in vs {
                        substitute_value(v, path, &mut nested);
                    }
                }
                FieldValue::Absent => {}
            }
        }
    }
    for child in nested {
        substitute_record(&child, path);
    }

    if pushed {
        path.pop();
    }
}

fn substitute_value(value: &mut Value, path: &[String], nested: &mut Vec<FeatureRef>) {
    if let Value::Link(link) = value {
        let Some(target) = link.borrow().target() else {
            return;
        };
        // A failed borrow means the target is the record currently being
        // walked; its id is on the path, so the link stays as is.
        let target_id = match target.try_borrow() {
            Ok(record) => record.id.clone(),
            Err(_) => return,
        };
        match target_id {
            Some(id) if !path.contains(&id) => *value = Value::Feature(target),
            // On-path or anonymous targets stay links; expanding them
            // would not terminate or could not be guarded.
            _ => return,
        }
    }

    if let Value::Feature(feature) = value {
        nested.push(Rc::clone(feature));
    }
}
