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

//! Declarative feature schema and its compiled form.
//!
//! A [`Schema`] is a plain table `type name -> {source tag -> target type}`
//! loaded once per process, usually from YAML. [`Schema::compile`] turns it
//! into immutable [`TypeDescriptor`]s looked up by name at decode time.
//! Compilation is purely structural: target types are not checked for
//! existence, so mutually recursive and forward references between types
//! need no pre-resolution.

use std::collections::HashMap;

use indexmap::IndexMap;
use serde::Deserialize;

use crate::error::Error;

/// Target type name for plain text fields.
pub const TEXT_TYPE: &str = "string";

/// Target type name for GML polygon patch geometry.
pub const PATCH_TYPE: &str = "PolygonPatch";

const AIXM_SCHEMA: &str = include_str!("../schema/aixm.yaml");

/// Declarative feature schema: ordered table of type names to ordered
/// `{source tag -> target type name}` mappings.
#[derive(Clone, Debug, Default, Deserialize)]
#[serde(transparent)]
pub struct Schema {
    types: IndexMap<String, IndexMap<String, String>>,
}

impl Schema {
    /// Loads a schema from its YAML representation.
    ///
    /// # Examples
    ///
    /// ```
    /// use aixm_graph::Schema;
    ///
    /// let schema = Schema::from_yaml("Navaid:\n  designator: string\n").unwrap();
    /// let registry = schema.compile();
    /// assert!(registry.get("Navaid").is_some());
    /// ```
    pub fn from_yaml(text: &str) -> Result<Self, Error> {
        serde_yaml::from_str(text).map_err(|e| Error::Schema(e.to_string()))
    }

    /// Returns the built-in AIXM 5.1 schema table.
    pub fn aixm() -> Self {
        Self::from_yaml(AIXM_SCHEMA).expect("built-in AIXM schema parses")
    }

    /// Compiles the table into an immutable descriptor registry.
    pub fn compile(&self) -> TypeRegistry {
        let types = self
            .types
            .iter()
            .map(|(type_name, fields)| {
                let descriptor = TypeDescriptor {
                    type_name: type_name.clone(),
                    fields: fields
                        .iter()
                        .map(|(tag, target)| FieldDescriptor {
                            source_tag: tag.clone(),
                            // Hyphens are not valid in field names.
                            field_name: tag.replace('-', ""),
                            target_type: target.clone(),
                        })
                        .collect(),
                };
                (type_name.clone(), descriptor)
            })
            .collect();

        TypeRegistry { types }
    }
}

/// How one source tag of a feature type maps onto a decoded field.
#[derive(Clone, Debug)]
pub struct FieldDescriptor {
    /// Local name of the matched child elements.
    pub source_tag: String,
    /// Key under which the decoded value is stored.
    pub field_name: String,
    /// Name of the target type: [`TEXT_TYPE`], [`PATCH_TYPE`], or another
    /// descriptor's type name.
    pub target_type: String,
}

/// Compiled description of one feature type.
#[derive(Clone, Debug)]
pub struct TypeDescriptor {
    /// Local name of the feature element this descriptor decodes.
    pub type_name: String,
    /// Field descriptors in schema declaration order.
    pub fields: Vec<FieldDescriptor>,
}

/// Registry of compiled type descriptors, looked up lazily by name.
#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    types: HashMap<String, TypeDescriptor>,
}

impl TypeRegistry {
    /// Returns the descriptor for a type name, if the schema defines one.
    pub fn get(&self, type_name: &str) -> Option<&TypeDescriptor> {
        self.types.get(type_name)
    }

    /// Number of compiled types.
    pub fn len(&self) -> usize {
        self.types.len()
    }

    /// Whether the registry holds no types.
    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}
