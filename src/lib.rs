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

//! Schema-driven AIXM (Aeronautical Information Exchange Model) decoder.
//!
//! This crate decodes AIXM 5.1 messages into a typed, cross-referenced
//! feature graph. Instead of one hand-written struct per feature type, a
//! declarative [`Schema`] table describes which child tags of each feature
//! map onto which target types; the [`Decoder`] walks the XML guided by the
//! compiled descriptors, decodes GML curve geometry, and resolves
//! `xlink:href` references across all inputs of a batch.
//!
//! # Examples
//!
//! ```
//! use aixm_graph::{decode, FieldValue, Schema, Value};
//!
//! let xml = br#"
//!   <message:AIXMBasicMessage
//!     xmlns:aixm="http://www.aixm.aero/schema/5.1"
//!     xmlns:gml="http://www.opengis.net/gml/3.2"
//!     xmlns:message="http://www.aixm.aero/schema/5.1/message">
//!     <message:hasMember>
//!       <aixm:Navaid gml:id="uuid.nav1">
//!         <aixm:timeSlice>
//!           <aixm:NavaidTimeSlice gml:id="ts1">
//!             <aixm:designator>BOR</aixm:designator>
//!             <aixm:name>BOORSPIJK</aixm:name>
//!           </aixm:NavaidTimeSlice>
//!         </aixm:timeSlice>
//!       </aixm:Navaid>
//!     </message:hasMember>
//!   </message:AIXMBasicMessage>"#;
//!
//! let graph = decode(&Schema::aixm(), &[&xml[..]]);
//! assert_eq!(graph.features().len(), 1);
//!
//! let navaid = graph.features()[0].borrow();
//! match navaid.field("designator") {
//!     Some(FieldValue::One(Value::Text(text))) => assert_eq!(text, "BOR"),
//!     other => panic!("unexpected field value: {other:?}"),
//! }
//! ```

mod context;
mod decode;
mod error;
mod feature;
mod geometry;
mod schema;
mod serialize;
pub mod xml;

pub use context::DecodeContext;
pub use decode::{decode, Decoder, FeatureGraph};
pub use error::Error;
pub use feature::{FeatureRecord, FeatureRef, FieldValue, LinkRef, Value, XLink};
pub use geometry::{arc_by_center_point, line_string, polygon_patch, GeometrySegment};
pub use schema::{FieldDescriptor, Schema, TypeDescriptor, TypeRegistry};
pub use serialize::ToJson;
