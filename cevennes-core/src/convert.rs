//! Conversion from Overpass elements to GeoJSON features.
//!
//! Follows the conventions of the `osm2geojson` tool used to build the
//! original map layers:
//!
//! - nodes become points, except untagged nodes that only exist to carry the
//!   geometry of a way or relation in the same result;
//! - ways become lines, or polygons when closed and tagged as an area;
//!   a way whose geometry was clipped by the query's bounding box becomes a
//!   multilinestring of the pieces on either side of each gap;
//! - `multipolygon` and `boundary` relations become multipolygons assembled
//!   from their member ways, other relations (hiking routes in particular)
//!   become multilinestrings.

use std::collections::{HashMap, HashSet, VecDeque};

use geo::{Contains, Coord, LineString, MultiLineString, MultiPolygon, Point, Polygon};
use log::debug;

use crate::geojson::{ElementKind, Feature, FeatureCollection, FeatureProperties, Geometry};
use crate::overpass::{Element, LatLon, Member, MemberKind, Node, OverpassResponse, Relation, Tags, Way};

/// Which values of a tag key mark a closed way as an area.
enum AreaRule {
    All,
    Only(&'static [&'static str]),
    Except(&'static [&'static str]),
}

impl AreaRule {
    fn matches(&self, value: &str) -> bool {
        match self {
            Self::All => true,
            Self::Only(values) => values.contains(&value),
            Self::Except(values) => !values.contains(&value),
        }
    }
}

/// Polygon feature table used by `osm2geojson`.
const AREA_RULES: &[(&str, AreaRule)] = &[
    ("building", AreaRule::All),
    ("highway", AreaRule::Only(&["services", "rest_area", "escape", "elevator"])),
    ("natural", AreaRule::Except(&["coastline", "cliff", "ridge", "arete", "tree_row"])),
    ("landuse", AreaRule::All),
    ("waterway", AreaRule::Only(&["riverbank", "dock", "boatyard", "dam"])),
    ("amenity", AreaRule::All),
    ("leisure", AreaRule::All),
    (
        "barrier",
        AreaRule::Only(&["city_wall", "ditch", "hedge", "retaining_wall", "wall", "spikes"]),
    ),
    ("railway", AreaRule::Only(&["station", "turntable", "roundhouse", "platform"])),
    ("boundary", AreaRule::All),
    ("man_made", AreaRule::Except(&["cutline", "embankment", "pipeline"])),
    ("power", AreaRule::Only(&["plant", "substation", "generator", "transformer"])),
    ("place", AreaRule::All),
    ("shop", AreaRule::All),
    ("aeroway", AreaRule::Except(&["taxiway"])),
    ("tourism", AreaRule::All),
    ("historic", AreaRule::All),
    ("public_transport", AreaRule::All),
    ("office", AreaRule::All),
    ("building:part", AreaRule::All),
    ("military", AreaRule::All),
    ("ruins", AreaRule::All),
    ("area:highway", AreaRule::All),
    ("craft", AreaRule::All),
    ("golf", AreaRule::All),
    ("indoor", AreaRule::All),
    ("sport", AreaRule::All),
    ("emergency", AreaRule::All),
];

/// Relation `type` values assembled into polygons.
const POLYGON_RELATION_TYPES: &[&str] = &["multipolygon", "boundary"];

/// Minimum number of positions in a closed linear ring.
const MIN_RING_LEN: usize = 4;

/// Convert an Overpass result into a GeoJSON feature collection.
///
/// Features keep the order of the source elements. Elements whose geometry
/// cannot be resolved from the result are dropped.
///
/// # Examples
/// ```
/// use std::collections::BTreeMap;
/// use cevennes_core::{Element, Node, OverpassResponse, to_feature_collection};
///
/// let response = OverpassResponse {
///     elements: vec![Element::Node(Node {
///         id: 1,
///         lat: Some(44.32),
///         lon: Some(3.59),
///         tags: BTreeMap::from([("place".into(), "town".into())]),
///     })],
///     remark: None,
/// };
/// let collection = to_feature_collection(&response);
/// assert_eq!(collection.len(), 1);
/// ```
#[must_use]
pub fn to_feature_collection(response: &OverpassResponse) -> FeatureCollection {
    let index = ElementIndex::build(&response.elements);
    let features = response
        .elements
        .iter()
        .filter_map(|element| match element {
            Element::Node(node) => node_feature(node, &index),
            Element::Way(way) => way_feature(way, &index),
            Element::Relation(relation) => relation_feature(relation, &index),
            Element::Other => None,
        })
        .collect();
    FeatureCollection { features }
}

/// Lookup tables for resolving references within one result.
struct ElementIndex<'a> {
    nodes: HashMap<u64, Coord<f64>>,
    ways: HashMap<u64, &'a Way>,
    referenced_nodes: HashSet<u64>,
}

impl<'a> ElementIndex<'a> {
    fn build(elements: &'a [Element]) -> Self {
        let mut index = Self {
            nodes: HashMap::new(),
            ways: HashMap::new(),
            referenced_nodes: HashSet::new(),
        };
        for element in elements {
            match element {
                Element::Node(node) => {
                    if let Some(coord) = node.coord() {
                        index.nodes.insert(node.id, coord);
                    }
                }
                Element::Way(way) => {
                    index.referenced_nodes.extend(way.nodes.iter().copied());
                    index.ways.insert(way.id, way);
                }
                Element::Relation(relation) => {
                    index.referenced_nodes.extend(
                        relation
                            .members
                            .iter()
                            .filter(|member| member.kind == MemberKind::Node)
                            .map(|member| member.reference),
                    );
                }
                Element::Other => {}
            }
        }
        index
    }

    /// Runs of consecutive resolvable positions of `way`.
    fn way_parts(&self, way: &Way) -> Vec<Vec<Coord<f64>>> {
        if way.geometry.is_empty() {
            split_at_gaps(way.nodes.iter().map(|id| self.nodes.get(id).copied()))
        } else {
            inline_parts(&way.geometry)
        }
    }

    fn member_parts(&self, member: &Member) -> Vec<Vec<Coord<f64>>> {
        if member.geometry.is_empty() {
            self.ways
                .get(&member.reference)
                .map(|way| self.way_parts(way))
                .unwrap_or_default()
        } else {
            inline_parts(&member.geometry)
        }
    }
}

fn inline_parts(geometry: &[Option<LatLon>]) -> Vec<Vec<Coord<f64>>> {
    split_at_gaps(
        geometry
            .iter()
            .copied()
            .map(|position| position.map(Coord::<f64>::from)),
    )
}

/// Split a position sequence wherever a position is missing.
fn split_at_gaps(positions: impl Iterator<Item = Option<Coord<f64>>>) -> Vec<Vec<Coord<f64>>> {
    let mut parts = Vec::new();
    let mut current = Vec::new();
    for position in positions {
        match position {
            Some(coord) => current.push(coord),
            None if !current.is_empty() => parts.push(std::mem::take(&mut current)),
            None => {}
        }
    }
    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

fn feature(kind: ElementKind, id: u64, tags: &Tags, geometry: Geometry) -> Feature {
    Feature {
        properties: FeatureProperties {
            kind,
            id,
            tags: tags.clone(),
        },
        geometry,
    }
}

fn node_feature(node: &Node, index: &ElementIndex<'_>) -> Option<Feature> {
    let coord = node.coord()?;
    if node.tags.is_empty() && index.referenced_nodes.contains(&node.id) {
        return None;
    }
    Some(feature(
        ElementKind::Node,
        node.id,
        &node.tags,
        Geometry::Point(Point::from(coord)),
    ))
}

fn way_feature(way: &Way, index: &ElementIndex<'_>) -> Option<Feature> {
    let mut parts: Vec<_> = index
        .way_parts(way)
        .into_iter()
        .filter(|part| part.len() >= 2)
        .collect();
    if parts.len() > 1 {
        let lines = parts.into_iter().map(LineString::new).collect();
        return Some(feature(
            ElementKind::Way,
            way.id,
            &way.tags,
            Geometry::MultiLineString(MultiLineString::new(lines)),
        ));
    }
    let Some(coords) = parts.pop() else {
        debug!("skipping way {} without resolvable geometry", way.id);
        return None;
    };
    let polygonal = coords.len() >= MIN_RING_LEN && is_ring(&coords) && is_area(&way.tags);
    let line = LineString::new(coords);
    let geometry = if polygonal {
        Geometry::Polygon(Polygon::new(line, Vec::new()))
    } else {
        Geometry::LineString(line)
    };
    Some(feature(ElementKind::Way, way.id, &way.tags, geometry))
}

fn relation_feature(relation: &Relation, index: &ElementIndex<'_>) -> Option<Feature> {
    let polygonal = relation
        .tags
        .get("type")
        .is_some_and(|kind| POLYGON_RELATION_TYPES.contains(&kind.as_str()));
    let geometry = if polygonal {
        relation_polygons(relation, index).map(Geometry::MultiPolygon)
    } else {
        relation_lines(relation, index).map(Geometry::MultiLineString)
    };
    let Some(geometry) = geometry else {
        debug!("skipping relation {} without resolvable geometry", relation.id);
        return None;
    };
    Some(feature(
        ElementKind::Relation,
        relation.id,
        &relation.tags,
        geometry,
    ))
}

fn way_members<'r>(relation: &'r Relation) -> impl Iterator<Item = &'r Member> {
    relation
        .members
        .iter()
        .filter(|member| member.kind == MemberKind::Way)
}

fn relation_lines(relation: &Relation, index: &ElementIndex<'_>) -> Option<MultiLineString<f64>> {
    let lines: Vec<LineString<f64>> = way_members(relation)
        .flat_map(|member| index.member_parts(member))
        .filter(|coords| coords.len() >= 2)
        .map(LineString::new)
        .collect();
    if lines.is_empty() {
        None
    } else {
        Some(MultiLineString::new(lines))
    }
}

fn relation_polygons(relation: &Relation, index: &ElementIndex<'_>) -> Option<MultiPolygon<f64>> {
    let (inner, outer): (Vec<_>, Vec<_>) = way_members(relation)
        .flat_map(|member| {
            let is_inner = member.role == "inner";
            index
                .member_parts(member)
                .into_iter()
                .map(move |coords| (is_inner, coords))
        })
        .filter(|(_, coords)| coords.len() >= 2)
        .partition(|(is_inner, _)| *is_inner);

    let mut polygons: Vec<Polygon<f64>> = assemble_rings(outer.into_iter().map(|(_, c)| c))
        .into_iter()
        .map(|ring| Polygon::new(ring, Vec::new()))
        .collect();

    for ring in assemble_rings(inner.into_iter().map(|(_, c)| c)) {
        let hole = Polygon::new(ring.clone(), Vec::new());
        match polygons.iter_mut().find(|candidate| candidate.contains(&hole)) {
            Some(shell) => shell.interiors_push(ring),
            None => debug!(
                "dropping inner ring of relation {} outside every outer ring",
                relation.id
            ),
        }
    }

    if polygons.is_empty() {
        None
    } else {
        Some(MultiPolygon::new(polygons))
    }
}

/// Join way segments end to end into closed rings.
///
/// Segments may be stored in either direction. Chains that cannot be closed
/// are discarded.
fn assemble_rings(segments: impl Iterator<Item = Vec<Coord<f64>>>) -> Vec<LineString<f64>> {
    let mut pending: VecDeque<Vec<Coord<f64>>> = segments.collect();
    let mut rings = Vec::new();
    while let Some(mut ring) = pending.pop_front() {
        while !is_ring(&ring) {
            let Some(tail) = ring.last().copied() else {
                break;
            };
            let Some(position) = pending
                .iter()
                .position(|segment| segment.first() == Some(&tail) || segment.last() == Some(&tail))
            else {
                break;
            };
            let Some(mut next) = pending.remove(position) else {
                break;
            };
            if next.first() != Some(&tail) {
                next.reverse();
            }
            ring.extend(next.into_iter().skip(1));
        }
        if ring.len() >= MIN_RING_LEN && is_ring(&ring) {
            rings.push(LineString::new(ring));
        } else {
            debug!("dropping unclosed ring of {} positions", ring.len());
        }
    }
    rings
}

fn is_ring(coords: &[Coord<f64>]) -> bool {
    coords.len() >= 2 && coords.first() == coords.last()
}

fn is_area(tags: &Tags) -> bool {
    match tags.get("area").map(String::as_str) {
        Some("no") => false,
        Some("yes") => true,
        _ => tags.iter().any(|(key, value)| {
            AREA_RULES
                .iter()
                .find(|(area_key, _)| *area_key == key.as_str())
                .is_some_and(|(_, rule)| rule.matches(value))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::{fixture, rstest};

    fn tags(pairs: &[(&str, &str)]) -> Tags {
        pairs
            .iter()
            .map(|(key, value)| ((*key).to_owned(), (*value).to_owned()))
            .collect()
    }

    fn node(id: u64, lon: f64, lat: f64, node_tags: Tags) -> Element {
        Element::Node(Node {
            id,
            lat: Some(lat),
            lon: Some(lon),
            tags: node_tags,
        })
    }

    fn geometry(points: &[(f64, f64)]) -> Vec<Option<LatLon>> {
        points
            .iter()
            .map(|&(lon, lat)| Some(LatLon { lat, lon }))
            .collect()
    }

    fn way_with_geometry(id: u64, points: &[(f64, f64)], way_tags: Tags) -> Element {
        Element::Way(Way {
            id,
            nodes: Vec::new(),
            geometry: geometry(points),
            tags: way_tags,
        })
    }

    fn way_member(reference: u64, role: &str, points: &[(f64, f64)]) -> Member {
        Member {
            kind: MemberKind::Way,
            reference,
            role: role.to_owned(),
            geometry: geometry(points),
        }
    }

    fn convert(elements: Vec<Element>) -> FeatureCollection {
        to_feature_collection(&OverpassResponse {
            elements,
            remark: None,
        })
    }

    #[fixture]
    fn square() -> Vec<(f64, f64)> {
        vec![(0.0, 0.0), (4.0, 0.0), (4.0, 4.0), (0.0, 4.0), (0.0, 0.0)]
    }

    #[rstest]
    fn one_node_and_one_way_yield_two_features() {
        let collection = convert(vec![
            node(1, 3.59, 44.32, tags(&[("place", "town"), ("name", "Florac")])),
            way_with_geometry(
                10,
                &[(3.5, 44.3), (3.6, 44.4)],
                tags(&[("highway", "path")]),
            ),
        ]);

        assert_eq!(collection.len(), 2);
        let first = &collection.features[0];
        assert_eq!(first.properties.kind, ElementKind::Node);
        assert_eq!(first.properties.id, 1);
        assert_eq!(
            first.properties.tags.get("name").map(String::as_str),
            Some("Florac")
        );
        assert_eq!(first.geometry, Geometry::Point(Point::new(3.59, 44.32)));
        let second = &collection.features[1];
        assert_eq!(second.properties.kind, ElementKind::Way);
        assert!(matches!(second.geometry, Geometry::LineString(_)));
    }

    #[rstest]
    fn untagged_way_nodes_are_not_emitted() {
        let collection = convert(vec![
            node(1, 0.0, 0.0, Tags::new()),
            node(2, 1.0, 1.0, Tags::new()),
            node(3, 2.0, 2.0, Tags::new()),
            Element::Way(Way {
                id: 10,
                nodes: vec![1, 2],
                geometry: Vec::new(),
                tags: tags(&[("highway", "track")]),
            }),
        ]);

        let kinds: Vec<_> = collection
            .features
            .iter()
            .map(|feature| (feature.properties.kind, feature.properties.id))
            .collect();
        assert_eq!(kinds, vec![(ElementKind::Node, 3), (ElementKind::Way, 10)]);
    }

    #[rstest]
    fn way_geometry_resolves_from_node_refs() {
        let collection = convert(vec![
            node(1, 3.0, 44.0, Tags::new()),
            node(2, 3.1, 44.1, tags(&[("tourism", "viewpoint")])),
            Element::Way(Way {
                id: 10,
                nodes: vec![1, 2, 99],
                geometry: Vec::new(),
                tags: Tags::new(),
            }),
        ]);

        let way = collection
            .features
            .iter()
            .find(|feature| feature.properties.kind == ElementKind::Way)
            .expect("way feature should exist");
        match &way.geometry {
            Geometry::LineString(line) => {
                let coords: Vec<_> = line.coords().map(|c| (c.x, c.y)).collect();
                assert_eq!(coords, vec![(3.0, 44.0), (3.1, 44.1)]);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[rstest]
    #[case::building(&[("building", "yes")], true)]
    #[case::natural(&[("natural", "wood")], true)]
    #[case::coastline(&[("natural", "coastline")], false)]
    #[case::cliff(&[("natural", "cliff")], false)]
    #[case::shop(&[("shop", "supermarket")], true)]
    #[case::man_made(&[("man_made", "wastewater_plant")], true)]
    #[case::man_made_embankment(&[("man_made", "embankment")], false)]
    #[case::boundary(&[("boundary", "protected_area")], true)]
    #[case::sport(&[("sport", "climbing")], true)]
    #[case::riverbank(&[("waterway", "riverbank")], true)]
    #[case::stream(&[("waterway", "stream")], false)]
    #[case::rest_area(&[("highway", "rest_area")], true)]
    #[case::area_yes(&[("highway", "pedestrian"), ("area", "yes")], true)]
    #[case::area_no(&[("leisure", "track"), ("area", "no")], false)]
    #[case::roundabout(&[("highway", "primary")], false)]
    fn closed_ways_become_polygons_only_for_areas(
        square: Vec<(f64, f64)>,
        #[case] way_tags: &[(&str, &str)],
        #[case] expect_polygon: bool,
    ) {
        let collection = convert(vec![way_with_geometry(5, &square, tags(way_tags))]);

        assert_eq!(collection.len(), 1);
        let is_polygon = matches!(collection.features[0].geometry, Geometry::Polygon(_));
        assert_eq!(is_polygon, expect_polygon);
    }

    #[rstest]
    fn ways_without_geometry_are_dropped() {
        let collection = convert(vec![Element::Way(Way {
            id: 7,
            nodes: vec![1, 2],
            geometry: Vec::new(),
            tags: tags(&[("highway", "path")]),
        })]);

        assert!(collection.is_empty());
    }

    #[rstest]
    fn clipped_ways_split_at_each_gap() {
        let collection = convert(vec![Element::Way(Way {
            id: 7,
            nodes: Vec::new(),
            geometry: vec![
                Some(LatLon { lat: 44.0, lon: 3.0 }),
                Some(LatLon { lat: 44.1, lon: 3.1 }),
                None,
                None,
                Some(LatLon { lat: 44.4, lon: 3.4 }),
                Some(LatLon { lat: 44.5, lon: 3.5 }),
            ],
            tags: tags(&[("highway", "path")]),
        })]);

        match &collection.features[0].geometry {
            Geometry::MultiLineString(lines) => {
                let parts: Vec<Vec<(f64, f64)>> = lines
                    .iter()
                    .map(|line| line.coords().map(|c| (c.x, c.y)).collect())
                    .collect();
                assert_eq!(
                    parts,
                    vec![vec![(3.0, 44.0), (3.1, 44.1)], vec![(3.4, 44.4), (3.5, 44.5)]]
                );
            }
            other => panic!("expected multilinestring, got {other:?}"),
        }
    }

    #[rstest]
    #[case::leading(vec![None, Some((3.0, 44.0)), Some((3.2, 44.2))])]
    #[case::trailing(vec![Some((3.0, 44.0)), Some((3.2, 44.2)), None, Some((3.9, 44.9))])]
    fn a_single_surviving_piece_stays_a_line(#[case] points: Vec<Option<(f64, f64)>>) {
        let collection = convert(vec![Element::Way(Way {
            id: 7,
            nodes: Vec::new(),
            geometry: points
                .into_iter()
                .map(|point| point.map(|(lon, lat)| LatLon { lat, lon }))
                .collect(),
            tags: Tags::new(),
        })]);

        match &collection.features[0].geometry {
            Geometry::LineString(line) => {
                let coords: Vec<_> = line.coords().map(|c| (c.x, c.y)).collect();
                assert_eq!(coords, vec![(3.0, 44.0), (3.2, 44.2)]);
            }
            other => panic!("expected line, got {other:?}"),
        }
    }

    #[rstest]
    fn route_relations_become_multilinestrings() {
        let collection = convert(vec![Element::Relation(Relation {
            id: 100,
            members: vec![
                way_member(1, "", &[(3.0, 44.0), (3.1, 44.1)]),
                way_member(2, "", &[(3.1, 44.1), (3.2, 44.2)]),
                Member {
                    kind: MemberKind::Node,
                    reference: 9,
                    role: "guidepost".to_owned(),
                    geometry: Vec::new(),
                },
            ],
            tags: tags(&[("type", "route"), ("route", "hiking"), ("ref", "GR 70")]),
        })]);

        assert_eq!(collection.len(), 1);
        let route = &collection.features[0];
        assert_eq!(route.properties.kind, ElementKind::Relation);
        assert_eq!(
            route.properties.tags.get("ref").map(String::as_str),
            Some("GR 70")
        );
        match &route.geometry {
            Geometry::MultiLineString(lines) => assert_eq!(lines.0.len(), 2),
            other => panic!("expected multilinestring, got {other:?}"),
        }
    }

    #[rstest]
    fn multipolygon_joins_split_outer_ring_and_attaches_hole() {
        let collection = convert(vec![Element::Relation(Relation {
            id: 200,
            members: vec![
                way_member(1, "outer", &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)]),
                // Stored in the opposite direction to the first segment.
                way_member(2, "outer", &[(0.0, 0.0), (0.0, 4.0), (4.0, 4.0)]),
                way_member(3, "inner", &[(1.0, 1.0), (2.0, 1.0), (2.0, 2.0), (1.0, 1.0)]),
            ],
            tags: tags(&[("type", "multipolygon"), ("natural", "water")]),
        })]);

        assert_eq!(collection.len(), 1);
        match &collection.features[0].geometry {
            Geometry::MultiPolygon(polygons) => {
                assert_eq!(polygons.0.len(), 1);
                let polygon = &polygons.0[0];
                assert_eq!(polygon.exterior().0.len(), 5);
                assert!(polygon.exterior().is_closed());
                assert_eq!(polygon.interiors().len(), 1);
            }
            other => panic!("expected multipolygon, got {other:?}"),
        }
    }

    #[rstest]
    fn multipolygon_without_closed_ring_is_dropped() {
        let collection = convert(vec![Element::Relation(Relation {
            id: 201,
            members: vec![way_member(1, "outer", &[(0.0, 0.0), (4.0, 0.0), (4.0, 4.0)])],
            tags: tags(&[("type", "multipolygon")]),
        })]);

        assert!(collection.is_empty());
    }

    #[rstest]
    fn relation_members_resolve_from_ways_in_result() {
        let collection = convert(vec![
            way_with_geometry(1, &[(3.0, 44.0), (3.1, 44.1)], Tags::new()),
            Element::Relation(Relation {
                id: 300,
                members: vec![Member {
                    kind: MemberKind::Way,
                    reference: 1,
                    role: String::new(),
                    geometry: Vec::new(),
                }],
                tags: tags(&[("type", "route")]),
            }),
        ]);

        assert_eq!(collection.len(), 2);
        assert!(matches!(
            collection.features[1].geometry,
            Geometry::MultiLineString(_)
        ));
    }

    #[rstest]
    fn other_elements_are_ignored() {
        let collection = convert(vec![Element::Other]);

        assert!(collection.is_empty());
    }
}
