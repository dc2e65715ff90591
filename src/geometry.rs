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

//! GML curve segment decoding, independent of the feature schema.
//!
//! Geometry is structurally uniform across all feature types that embed it,
//! so these decoders work on raw [`Element`] subtrees. Positions are kept as
//! flat float sequences in token order; grouping into coordinate tuples is
//! left to the consumer since the document states its own dimensionality.

use crate::error::Error;
use crate::xml::Element;

/// A decoded GML curve segment or surface patch.
#[derive(Clone, Debug, PartialEq)]
pub enum GeometrySegment {
    /// A geodesic or straight run of positions (`gml:GeodesicString`,
    /// `gml:LineStringSegment`).
    LineString {
        /// Flat position values in token order.
        positions: Vec<f64>,
    },
    /// A circular arc around a center point (`gml:ArcByCenterPoint`).
    ///
    /// Absent start and end angles stay `None`; whether that means a full
    /// circle is the consumer's call.
    ArcByCenterPoint {
        center: Vec<f64>,
        radius: f64,
        radius_uom: Option<String>,
        start_angle: Option<f64>,
        end_angle: Option<f64>,
    },
    /// A polygon patch ring (`gml:PolygonPatch`): its segments in document
    /// order, line strings and arcs may interleave.
    PolygonPatch { segments: Vec<GeometrySegment> },
}

/// Decodes a `gml:PolygonPatch` subtree.
///
/// Iterates every `segments` container in document order and dispatches
/// each known segment element to its decoder. Unknown segment kinds are
/// skipped.
pub fn polygon_patch(element: &Element) -> Result<GeometrySegment, Error> {
    let mut segments = Vec::new();

    for container in element.descendants_named("segments") {
        for segment in &container.children {
            match segment.name.as_str() {
                "GeodesicString" | "LineStringSegment" => {
                    segments.push(line_string(segment)?);
                }
                "ArcByCenterPoint" => {
                    segments.push(arc_by_center_point(segment)?);
                }
                _ => {}
            }
        }
    }

    Ok(GeometrySegment::PolygonPatch { segments })
}

/// Decodes a line string segment into a flat position sequence.
///
/// Concatenates the text of every `posList` descendant, then of every `pos`
/// descendant, splitting on whitespace and keeping token order.
pub fn line_string(element: &Element) -> Result<GeometrySegment, Error> {
    let mut positions = Vec::new();

    for pos_list in element.descendants_named("posList") {
        positions.extend(parse_positions(pos_list.trimmed_text(), "posList")?);
    }
    for pos in element.descendants_named("pos") {
        positions.extend(parse_positions(pos.trimmed_text(), "pos")?);
    }

    Ok(GeometrySegment::LineString { positions })
}

/// Decodes a `gml:ArcByCenterPoint` segment.
pub fn arc_by_center_point(element: &Element) -> Result<GeometrySegment, Error> {
    let center = element
        .first_descendant("pos")
        .ok_or(Error::MissingField("pos"))?;
    let center = parse_positions(center.trimmed_text(), "pos")?;

    let radius = element
        .first_descendant("radius")
        .ok_or(Error::MissingField("radius"))?;
    let radius_uom = radius.attr("uom").map(str::to_string);
    let radius = parse_float(radius.trimmed_text(), "radius")?;

    let start_angle = element
        .first_descendant("startAngle")
        .map(|e| parse_float(e.trimmed_text(), "startAngle"))
        .transpose()?;
    let end_angle = element
        .first_descendant("endAngle")
        .map(|e| parse_float(e.trimmed_text(), "endAngle"))
        .transpose()?;

    Ok(GeometrySegment::ArcByCenterPoint {
        center,
        radius,
        radius_uom,
        start_angle,
        end_angle,
    })
}

fn parse_positions(text: &str, field: &'static str) -> Result<Vec<f64>, Error> {
    text.split_whitespace()
        .map(|token| parse_float(token, field))
        .collect()
}

fn parse_float(token: &str, field: &'static str) -> Result<f64, Error> {
    token.parse().map_err(|_| Error::InvalidValue {
        field,
        value: token.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(xml: &str) -> Element {
        Element::parse(xml.as_bytes()).unwrap()
    }

    #[test]
    fn line_string_keeps_token_order() {
        let e = element(
            r#"<gml:GeodesicString>
                 <gml:posList>52.0 -32.0 52.5 -32.0</gml:posList>
               </gml:GeodesicString>"#,
        );

        match line_string(&e).unwrap() {
            GeometrySegment::LineString { positions } => {
                assert_eq!(positions, [52.0, -32.0, 52.5, -32.0]);
            }
            other => panic!("expected LineString, got {other:?}"),
        }
    }

    #[test]
    fn line_string_concatenates_pos_lists_and_positions() {
        let e = element(
            r#"<seg>
                 <gml:posList>1.0 2.0</gml:posList>
                 <gml:pos>3.0 4.0</gml:pos>
               </seg>"#,
        );

        match line_string(&e).unwrap() {
            GeometrySegment::LineString { positions } => {
                assert_eq!(positions, [1.0, 2.0, 3.0, 4.0]);
            }
            other => panic!("expected LineString, got {other:?}"),
        }
    }

    #[test]
    fn arc_without_angles_stays_open() {
        let e = element(
            r#"<gml:ArcByCenterPoint>
                 <gml:pos>1.0 2.0</gml:pos>
                 <gml:radius uom="M">500</gml:radius>
               </gml:ArcByCenterPoint>"#,
        );

        match arc_by_center_point(&e).unwrap() {
            GeometrySegment::ArcByCenterPoint {
                center,
                radius,
                radius_uom,
                start_angle,
                end_angle,
            } => {
                assert_eq!(center, [1.0, 2.0]);
                assert_eq!(radius, 500.0);
                assert_eq!(radius_uom.as_deref(), Some("M"));
                // Absent angles are not defaulted to 0/360.
                assert_eq!(start_angle, None);
                assert_eq!(end_angle, None);
            }
            other => panic!("expected ArcByCenterPoint, got {other:?}"),
        }
    }

    #[test]
    fn arc_with_angles() {
        let e = element(
            r#"<gml:ArcByCenterPoint>
                 <gml:pos>1.0 2.0</gml:pos>
                 <gml:radius uom="NM">5</gml:radius>
                 <gml:startAngle>90.0</gml:startAngle>
                 <gml:endAngle>180.0</gml:endAngle>
               </gml:ArcByCenterPoint>"#,
        );

        match arc_by_center_point(&e).unwrap() {
            GeometrySegment::ArcByCenterPoint {
                start_angle,
                end_angle,
                ..
            } => {
                assert_eq!(start_angle, Some(90.0));
                assert_eq!(end_angle, Some(180.0));
            }
            other => panic!("expected ArcByCenterPoint, got {other:?}"),
        }
    }

    #[test]
    fn polygon_patch_preserves_mixed_segments() {
        let e = element(
            r#"<gml:PolygonPatch>
                 <gml:exterior>
                   <gml:Ring>
                     <gml:curveMember>
                       <gml:Curve>
                         <gml:segments>
                           <gml:GeodesicString>
                             <gml:posList>1.0 2.0 3.0 4.0</gml:posList>
                           </gml:GeodesicString>
                           <gml:ArcByCenterPoint>
                             <gml:pos>5.0 6.0</gml:pos>
                             <gml:radius uom="M">100</gml:radius>
                           </gml:ArcByCenterPoint>
                           <gml:LineStringSegment>
                             <gml:posList>7.0 8.0</gml:posList>
                           </gml:LineStringSegment>
                         </gml:segments>
                       </gml:Curve>
                     </gml:curveMember>
                   </gml:Ring>
                 </gml:exterior>
               </gml:PolygonPatch>"#,
        );

        match polygon_patch(&e).unwrap() {
            GeometrySegment::PolygonPatch { segments } => {
                assert_eq!(segments.len(), 3);
                assert!(matches!(segments[0], GeometrySegment::LineString { .. }));
                assert!(matches!(
                    segments[1],
                    GeometrySegment::ArcByCenterPoint { .. }
                ));
                assert!(matches!(segments[2], GeometrySegment::LineString { .. }));
            }
            other => panic!("expected PolygonPatch, got {other:?}"),
        }
    }

    #[test]
    fn bad_numeric_token_is_a_decode_failure() {
        let e = element(r#"<seg><gml:posList>1.0 bogus</gml:posList></seg>"#);
        match line_string(&e) {
            Err(Error::InvalidValue { field, value }) => {
                assert_eq!(field, "posList");
                assert_eq!(value, "bogus");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
    }
}
