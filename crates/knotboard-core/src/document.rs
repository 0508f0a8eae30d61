//! Document records exchanged at load/save time.
//!
//! A document is `{ "nodes": [...], "lines": [...] }` with flat attribute
//! records. Numeric attributes are accepted either as JSON numbers or as
//! numeric strings, since documents saved from the canvas carry both.

use crate::error::{SceneError, SceneResult};
use crate::scene::{Link, LinkId, LinkStroke, LinkStyle, Node, NodeId, NodeMeta, NodeStyle, Scene};
use crate::shapes::{
    Circle, NodeShape, Polygon, Rectangle, ShapeKind, circumcenter_from_vertices, format_points,
    parse_points,
};
use kurbo::Point;
use serde::{Deserialize, Deserializer, Serialize};

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrText {
    Number(f64),
    Text(String),
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<NumberOrText>::deserialize(deserializer)? {
        Some(NumberOrText::Number(n)) => Some(n),
        Some(NumberOrText::Text(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Flat node record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NodeRecord {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub r: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub cx: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub cy: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub x: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub y: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub width: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub height: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub rx: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub ry: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub sides: Option<f64>,
    /// Polygon vertices as `"x,y x,y ..."`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub points: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pic: Option<String>,
    /// JSON-encoded [`NodeData`].
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
}

/// Business payload nested as a JSON string in [`NodeRecord::data`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeData {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_status", deserialize_with = "lenient_status")]
    pub status: i64,
    #[serde(default)]
    pub node_type: String,
}

fn default_status() -> i64 {
    1
}

fn lenient_status<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient_f64(deserializer)?.map_or(1, |n| n as i64))
}

/// Flat link record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineRecord {
    pub id: String,
    pub source_id: String,
    pub target_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fill: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64", skip_serializing_if = "Option::is_none")]
    pub stroke_width: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stroke_dasharray: Option<String>,
    /// Inline CSS.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub style: Option<String>,
    /// Dash preset tag.
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

/// A whole diagram document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Document {
    #[serde(default)]
    pub nodes: Vec<NodeRecord>,
    #[serde(default)]
    pub lines: Vec<LineRecord>,
}

/// Outcome of loading a document into a scene.
#[derive(Debug)]
pub struct LoadReport {
    pub scene: Scene,
    /// Links left out because an endpoint is missing, with that endpoint.
    pub skipped_links: Vec<(LinkId, NodeId)>,
}

impl LoadReport {
    pub fn is_clean(&self) -> bool {
        self.skipped_links.is_empty()
    }
}

fn required(value: Option<f64>, id: &str, key: &str) -> SceneResult<f64> {
    value.ok_or_else(|| SceneError::Document(format!("node '{id}' is missing '{key}'")))
}

/// Whole side count within the polygon limits.
fn side_count(value: f64, id: &str) -> SceneResult<u32> {
    let max = f64::from(Polygon::MAX_SIDES);
    if value.fract() != 0.0 || !(3.0..=max).contains(&value) {
        return Err(SceneError::Document(format!(
            "node '{id}' has invalid 'sides' {value}, expected a whole number from 3 to {max}"
        )));
    }
    Ok(value as u32)
}

impl NodeRecord {
    fn point(&self, x: Option<f64>, y: Option<f64>) -> Option<Point> {
        Some(Point::new(x?, y?))
    }

    /// Build the node this record describes.
    pub fn to_node(&self) -> SceneResult<Node> {
        let id = self.id.as_str();
        let kind = ShapeKind::parse(&self.kind)?;
        let mut node = match kind {
            ShapeKind::Circle => {
                let circle = Circle::new(required(self.r, id, "r")?)?;
                let center = self
                    .point(self.cx, self.cy)
                    .or_else(|| self.point(self.x, self.y))
                    .ok_or_else(|| SceneError::Document(format!("node '{id}' has no center")))?;
                Node::centered(id, circle, center)?
            }
            ShapeKind::Rectangle => {
                let rect = Rectangle::rounded(
                    required(self.width, id, "width")?,
                    required(self.height, id, "height")?,
                    self.rx.unwrap_or(0.0),
                    self.ry.unwrap_or(0.0),
                )?;
                match self.point(self.x, self.y) {
                    Some(origin) => Node::new(id, rect, origin)?,
                    None => {
                        let center = self.point(self.cx, self.cy).ok_or_else(|| {
                            SceneError::Document(format!("node '{id}' has no position"))
                        })?;
                        Node::centered(id, rect, center)?
                    }
                }
            }
            ShapeKind::Triangle | ShapeKind::Polygon => {
                let radius = required(self.r, id, "r")?;
                let vertices = match &self.points {
                    Some(points) => parse_points(points)?,
                    None => Vec::new(),
                };
                let polygon = if kind == ShapeKind::Triangle {
                    Polygon::triangle(radius)?
                } else {
                    let sides = match self.sides {
                        Some(sides) => side_count(sides, id)?,
                        None if !vertices.is_empty() => side_count(vertices.len() as f64, id)?,
                        None => return Err(SceneError::Document(format!("node '{id}' is missing 'sides'"))),
                    };
                    Polygon::new(sides, radius)?
                };
                let center = match self.point(self.cx, self.cy) {
                    Some(center) => center,
                    None if vertices.len() >= 2 => circumcenter_from_vertices(radius, &vertices)?,
                    None => self
                        .point(self.x, self.y)
                        .ok_or_else(|| SceneError::Document(format!("node '{id}' has no center")))?,
                };
                Node::centered(id, polygon, center)?
            }
        };

        let defaults = NodeStyle::default();
        node.style = NodeStyle {
            stroke: self.stroke.clone().unwrap_or(defaults.stroke),
            fill: self.fill.clone().unwrap_or(defaults.fill),
        };
        let data = match self.data.as_deref() {
            Some(raw) if !raw.trim().is_empty() => serde_json::from_str::<NodeData>(raw)?,
            _ => NodeData {
                name: String::new(),
                status: default_status(),
                node_type: String::new(),
            },
        };
        node.label = data.name;
        node.meta = NodeMeta {
            status: data.status,
            node_type: data.node_type,
            pic: self.pic.clone(),
        };
        Ok(node)
    }

    /// Flatten a node into a record.
    pub fn from_node(node: &Node) -> SceneResult<Self> {
        let position = node.position();
        let center = node.center();
        let data = serde_json::to_string(&NodeData {
            name: node.label.clone(),
            status: node.meta.status,
            node_type: node.meta.node_type.clone(),
        })?;
        let mut record = NodeRecord {
            id: node.id.to_string(),
            kind: node.kind().as_str().to_string(),
            cx: Some(center.x),
            cy: Some(center.y),
            x: Some(position.x),
            y: Some(position.y),
            pic: node.meta.pic.clone(),
            data: Some(data),
            stroke: Some(node.style.stroke.clone()),
            fill: Some(node.style.fill.clone()),
            ..Default::default()
        };
        match node.shape() {
            NodeShape::Circle(c) => record.r = Some(c.radius),
            NodeShape::Rectangle(r) => {
                record.width = Some(r.width);
                record.height = Some(r.height);
                record.rx = Some(r.corner_radius_x);
                record.ry = Some(r.corner_radius_y);
            }
            NodeShape::Polygon(p) => {
                record.r = Some(p.radius);
                record.sides = Some(f64::from(p.sides));
                record.points = Some(format_points(&p.vertices(center)?));
            }
        }
        Ok(record)
    }
}

impl LineRecord {
    pub fn to_link(&self) -> Link {
        let defaults = LinkStyle::default();
        let style = LinkStyle {
            color: self.stroke.clone().unwrap_or(defaults.color),
            fill: self.fill.clone().unwrap_or(defaults.fill),
            width: self.stroke_width.unwrap_or(defaults.width),
            stroke: LinkStroke::from_parts(self.kind.as_deref(), self.stroke_dasharray.as_deref()),
            css: self.style.clone(),
        };
        Link {
            id: LinkId::new(self.id.clone()),
            source: NodeId::new(self.source_id.clone()),
            target: NodeId::new(self.target_id.clone()),
            style,
            label: self.label.clone(),
        }
    }

    pub fn from_link(link: &Link) -> Self {
        LineRecord {
            id: link.id.to_string(),
            source_id: link.source.to_string(),
            target_id: link.target.to_string(),
            stroke: Some(link.style.color.clone()),
            fill: Some(link.style.fill.clone()),
            stroke_width: Some(link.style.width),
            stroke_dasharray: Some(link.style.stroke.dasharray()),
            style: link.style.css.clone(),
            kind: Some(link.style.stroke.tag().to_string()),
            label: link.label.clone(),
        }
    }
}

impl Document {
    pub fn from_json(json: &str) -> SceneResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> SceneResult<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Build a scene from this document.
    ///
    /// Malformed node records fail the whole load. Links whose endpoints are
    /// missing are left out and listed in the report.
    pub fn load(&self) -> SceneResult<LoadReport> {
        let mut scene = Scene::new();
        for record in &self.nodes {
            scene.add_node(record.to_node()?)?;
        }
        let mut skipped_links = Vec::new();
        for record in &self.lines {
            match scene.add_link(record.to_link()) {
                Ok(()) => {}
                Err(SceneError::DanglingLink { link, node }) => {
                    skipped_links.push((link, node));
                }
                Err(e) => return Err(e),
            }
        }
        log::info!(
            "Loaded document: {} node(s), {} link(s), {} skipped",
            scene.node_count(),
            scene.link_count(),
            skipped_links.len()
        );
        Ok(LoadReport {
            scene,
            skipped_links,
        })
    }

    /// Snapshot a scene, nodes in insertion order.
    pub fn from_scene(scene: &Scene) -> SceneResult<Self> {
        Ok(Document {
            nodes: scene
                .nodes()
                .map(NodeRecord::from_node)
                .collect::<SceneResult<_>>()?,
            lines: scene.links().iter().map(LineRecord::from_link).collect(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::connector::{MarkerParams, link_inset};
    use crate::shapes::NodeGeometry;

    const SAMPLE: &str = r##"{
        "nodes": [
            {"id": "A", "type": "rect", "width": 40, "height": 30, "x": 0, "y": 0,
             "rx": "0", "ry": "0", "data": "{\"name\":\"Alpha\",\"status\":2,\"nodeType\":\"svc\"}"},
            {"id": "B", "type": "circle", "r": "20", "cx": 200, "cy": 0, "pic": "b.png",
             "stroke": "#112233", "fill": "#445566"}
        ],
        "lines": [
            {"id": "L1", "sourceId": "A", "targetId": "B", "strokeWidth": "2",
             "type": "dashed", "strokeDasharray": "2 2", "label": "calls"}
        ]
    }"##;

    #[test]
    fn test_load_sample() {
        let report = Document::from_json(SAMPLE).unwrap().load().unwrap();
        assert!(report.is_clean());
        let scene = report.scene;
        let a = scene.node(&NodeId::from("A")).unwrap();
        assert_eq!(a.kind(), ShapeKind::Rectangle);
        assert_eq!(a.center(), Point::new(20.0, 15.0));
        assert_eq!(a.label, "Alpha");
        assert_eq!(a.meta.status, 2);
        assert_eq!(a.meta.node_type, "svc");

        let b = scene.node(&NodeId::from("B")).unwrap();
        assert_eq!(b.position(), Point::new(200.0, 0.0));
        assert_eq!(b.style.fill, "#445566");
        assert_eq!(b.meta.pic.as_deref(), Some("b.png"));
        assert_eq!(b.meta.status, 1);

        let link = scene.link(&LinkId::from("L1")).unwrap();
        assert_eq!(link.style.width, 2.0);
        assert_eq!(link.style.stroke, LinkStroke::dashed());
        assert_eq!(link.label.as_deref(), Some("calls"));
    }

    #[test]
    fn test_circle_target_inset_scenario() {
        let scene = Document::from_json(SAMPLE).unwrap().load().unwrap().scene;
        let link = scene.link(&LinkId::from("L1")).unwrap();
        let inset = link_inset(&scene, link, MarkerParams::default()).unwrap();
        assert!((inset - 25.0).abs() < 1e-9);
    }

    #[test]
    fn test_dangling_link_skipped() {
        let json = r#"{"nodes": [{"id": "a", "type": "circle", "r": 10, "cx": 50, "cy": 50}],
                       "lines": [{"id": "l", "sourceId": "a", "targetId": "ghost"}]}"#;
        let report = Document::from_json(json).unwrap().load().unwrap();
        assert!(!report.is_clean());
        assert_eq!(report.skipped_links, vec![(LinkId::from("l"), NodeId::from("ghost"))]);
        assert_eq!(report.scene.link_count(), 0);
    }

    #[test]
    fn test_unknown_type_rejected() {
        let json = r#"{"nodes": [{"id": "a", "type": "hexagon"}]}"#;
        let err = Document::from_json(json).unwrap().load().unwrap_err();
        assert!(matches!(err, SceneError::Document(_)));
    }

    #[test]
    fn test_missing_radius_rejected() {
        let json = r#"{"nodes": [{"id": "a", "type": "circle", "cx": 1, "cy": 1}]}"#;
        assert!(Document::from_json(json).unwrap().load().is_err());
    }

    #[test]
    fn test_invalid_geometry_rejected() {
        let json = r#"{"nodes": [{"id": "a", "type": "polygon", "r": -10, "sides": 5, "cx": 1, "cy": 1}]}"#;
        let err = Document::from_json(json).unwrap().load().unwrap_err();
        assert!(matches!(err, SceneError::InvalidGeometry(_)));
    }

    #[test]
    fn test_polygon_sides_must_be_whole_and_bounded() {
        let load = |sides: &str| {
            let json = format!(
                r#"{{"nodes": [{{"id": "p", "type": "polygon", "r": 10, "sides": {sides}, "cx": 50, "cy": 50}}]}}"#
            );
            Document::from_json(&json).unwrap().load()
        };

        for bad in ["2", "4.9", "\"5.7\"", "1e10", "-6", "361"] {
            assert!(matches!(load(bad), Err(SceneError::Document(_))), "sides={bad}");
        }

        let scene = load("\"6\"").unwrap().scene;
        let node = scene.node(&NodeId::from("p")).unwrap();
        assert_eq!(node.polygon_points().map(|p| p.len()), Some(6));
        assert!(load("360").is_ok());
    }

    #[test]
    fn test_polygon_center_from_points() {
        let vertices = crate::shapes::regular_polygon_vertices(300.0, 200.0, 50.0, 6).unwrap();
        let record = NodeRecord {
            id: "p".into(),
            kind: "polygon".into(),
            r: Some(50.0),
            sides: Some(6.0),
            points: Some(format_points(&vertices)),
            ..Default::default()
        };
        let node = record.to_node().unwrap();
        assert!((node.center().x - 300.0).abs() < 2.0);
        assert!((node.center().y - 200.0).abs() < 2.0);
    }

    #[test]
    fn test_save_keeps_triangle_tag_and_points() {
        let mut scene = Scene::new();
        scene
            .add_node(Node::centered("t", Polygon::triangle(20.0).unwrap(), Point::new(100.0, 100.0)).unwrap())
            .unwrap();
        let doc = Document::from_scene(&scene).unwrap();
        let record = &doc.nodes[0];
        assert_eq!(record.kind, "triangle");
        assert_eq!(record.sides, Some(3.0));
        assert!(record.points.as_deref().unwrap().starts_with("100,80 "));

        let reloaded = Document::from_json(&doc.to_json().unwrap()).unwrap().load().unwrap();
        let t = reloaded.scene.node(&NodeId::from("t")).unwrap();
        assert_eq!(t.kind(), ShapeKind::Triangle);
        assert_eq!(t.center(), Point::new(100.0, 100.0));
    }

    #[test]
    fn test_save_link_record() {
        let scene = Document::from_json(SAMPLE).unwrap().load().unwrap().scene;
        let doc = Document::from_scene(&scene).unwrap();
        assert_eq!(doc.nodes.len(), 2);
        assert_eq!(doc.nodes[0].id, "A");
        let line = &doc.lines[0];
        assert_eq!(line.source_id, "A");
        assert_eq!(line.kind.as_deref(), Some("dashed"));
        assert_eq!(line.stroke_dasharray.as_deref(), Some("2 2"));

        let json = serde_json::to_value(line).unwrap();
        assert_eq!(json["sourceId"], "A");
        assert_eq!(json["strokeWidth"], 2.0);
    }

    #[test]
    fn test_rect_centered_when_only_center_given() {
        let record = NodeRecord {
            id: "r".into(),
            kind: "rect".into(),
            width: Some(40.0),
            height: Some(30.0),
            cx: Some(100.0),
            cy: Some(100.0),
            ..Default::default()
        };
        let node = record.to_node().unwrap();
        assert_eq!(node.position(), Point::new(80.0, 85.0));
        assert_eq!(node.shape().center_from_position(node.position()), node.center());
    }
}
