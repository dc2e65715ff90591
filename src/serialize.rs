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

//! JSON rendition of the decoded graph.
//!
//! Every value variant carries an explicit [`ToJson`] capability; the
//! output tags each value with its variant name and keeps field keys in
//! schema order, so an external serializer needs no access to the decode
//! registries. Substituted graphs may share features: a feature already on
//! the current rendering path is emitted as a `{"FeatureRef": id}` stub
//! instead of being expanded again.

use serde_json::{json, Map, Value as Json};

use crate::decode::FeatureGraph;
use crate::feature::{FeatureRecord, FieldValue, Value, XLink};
use crate::geometry::GeometrySegment;

/// Renders a decoded value as a tagged [`serde_json::Value`].
pub trait ToJson {
    fn to_json(&self) -> Json;
}

impl ToJson for FeatureGraph {
    fn to_json(&self) -> Json {
        let mut path = Vec::new();
        Json::Array(
            self.features()
                .iter()
                .map(|f| record_json(&f.borrow(), &mut path))
                .collect(),
        )
    }
}

impl ToJson for FeatureRecord {
    fn to_json(&self) -> Json {
        record_json(self, &mut Vec::new())
    }
}

impl ToJson for FieldValue {
    fn to_json(&self) -> Json {
        field_json(self, &mut Vec::new())
    }
}

impl ToJson for Value {
    fn to_json(&self) -> Json {
        value_json(self, &mut Vec::new())
    }
}

impl ToJson for XLink {
    fn to_json(&self) -> Json {
        let target = self.target().map(|t| t.borrow().type_name.clone());
        json!({
            "XLink": {
                "href": self.href,
                "title": self.title,
                "target": target,
            }
        })
    }
}

impl ToJson for GeometrySegment {
    fn to_json(&self) -> Json {
        match self {
            GeometrySegment::LineString { positions } => {
                json!({ "LineString": { "positions": positions } })
            }
            GeometrySegment::ArcByCenterPoint {
                center,
                radius,
                radius_uom,
                start_angle,
                end_angle,
            } => json!({
                "ArcByCenterPoint": {
                    "center": center,
                    "radius": radius,
                    "radiusUom": radius_uom,
                    "startAngle": start_angle,
                    "endAngle": end_angle,
                }
            }),
            GeometrySegment::PolygonPatch { segments } => {
                let segments: Vec<_> = segments.iter().map(ToJson::to_json).collect();
                json!({ "PolygonPatch": { "segments": segments } })
            }
        }
    }
}

fn record_json(record: &FeatureRecord, path: &mut Vec<String>) -> Json {
    if let Some(id) = &record.id {
        if path.contains(id) {
            return json!({ "FeatureRef": id });
        }
        path.push(id.clone());
    }

    let mut inner = Map::new();
    inner.insert("id".into(), json_opt(&record.id));
    inner.insert("identifier".into(), json_opt(&record.identifier));
    for (name, value) in &record.fields {
        inner.insert(name.clone(), field_json(value, path));
    }

    if record.id.is_some() {
        path.pop();
    }

    let mut tagged = Map::new();
    tagged.insert(record.type_name.clone(), Json::Object(inner));
    Json::Object(tagged)
}

fn field_json(value: &FieldValue, path: &mut Vec<String>) -> Json {
    match value {
        FieldValue::Absent => Json::Null,
        FieldValue::One(v) => value_json(v, path),
        FieldValue::Many(values) => {
            Json::Array(values.iter().map(|v| value_json(v, path)).collect())
        }
    }
}

fn value_json(value: &Value, path: &mut Vec<String>) -> Json {
    match value {
        Value::Text(text) => Json::String(text.clone()),
        Value::Feature(feature) => record_json(&feature.borrow(), path),
        Value::Link(link) => link.borrow().to_json(),
        Value::Nil(reason) => json!({ "Nil": reason }),
        Value::Geometry(segment) => segment.to_json(),
    }
}

fn json_opt(value: &Option<String>) -> Json {
    match value {
        Some(v) => Json::String(v.clone()),
        None => Json::Null,
    }
}
