use std::collections::HashMap;
use std::fmt::Write as _;

use egui::{Align2, Color32, FontId, Pos2, Rect, Stroke, Vec2};

/// Margin around the diagram in exported SVGs, in diagram units
const SVG_MARGIN: f32 = 20.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    StartEvent,
    EndEvent,
    Event,
    Gateway,
    Activity,
    Other,
}

impl ShapeKind {
    /// Classify a BPMN semantic element by its tag name
    fn from_tag(tag: &str) -> Self {
        match tag {
            "startEvent" => Self::StartEvent,
            "endEvent" => Self::EndEvent,
            t if t.ends_with("Event") => Self::Event,
            t if t.ends_with("Gateway") => Self::Gateway,
            "task" | "subProcess" | "callActivity" | "transaction" => Self::Activity,
            t if t.ends_with("Task") => Self::Activity,
            _ => Self::Other,
        }
    }

    fn label_below(self) -> bool {
        matches!(self, Self::StartEvent | Self::EndEvent | Self::Event | Self::Gateway)
    }
}

/// A positioned shape from the diagram-interchange section
#[derive(Debug, Clone, PartialEq)]
pub struct ShapeView {
    pub element: String,
    pub kind: ShapeKind,
    pub label: String,
    pub rect: Rect,
}

#[derive(Debug, Clone, PartialEq)]
pub struct EdgeView {
    pub element: String,
    pub label: String,
    pub points: Vec<Pos2>,
}

/// Read-only geometry of a BPMN document: what the canvas draws and what
/// the SVG export contains.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DiagramPreview {
    pub shapes: Vec<ShapeView>,
    pub edges: Vec<EdgeView>,
}

impl DiagramPreview {
    /// Extract shapes and edges from BPMN markup.
    ///
    /// Fails only when the markup isn't well-formed XML. Shapes with missing
    /// or non-numeric bounds are skipped.
    pub fn parse(markup: &str) -> Result<Self, String> {
        let doc = roxmltree::Document::parse(markup).map_err(|err| err.to_string())?;

        // Semantic elements by id: (tag, name)
        let mut semantic: HashMap<&str, (&str, &str)> = HashMap::new();
        for node in doc.descendants().filter(|n| n.is_element()) {
            if let Some(id) = node.attribute("id") {
                semantic.insert(id, (node.tag_name().name(), node.attribute("name").unwrap_or("")));
            }
        }

        let mut preview = Self::default();
        for node in doc.descendants().filter(|n| n.is_element()) {
            let element = node.attribute("bpmnElement").unwrap_or("");
            let (tag, name) = semantic.get(element).copied().unwrap_or(("", ""));

            match node.tag_name().name() {
                "BPMNShape" => {
                    let Some(rect) = node
                        .children()
                        .find(|c| c.tag_name().name() == "Bounds")
                        .and_then(bounds_rect)
                    else {
                        continue;
                    };
                    preview.shapes.push(ShapeView {
                        element: element.to_owned(),
                        kind: ShapeKind::from_tag(tag),
                        label: name.to_owned(),
                        rect,
                    });
                }
                "BPMNEdge" => {
                    let points: Vec<Pos2> = node
                        .children()
                        .filter(|c| c.tag_name().name() == "waypoint")
                        .filter_map(|c| Some(Pos2::new(number(c, "x")?, number(c, "y")?)))
                        .collect();
                    if points.len() >= 2 {
                        preview.edges.push(EdgeView {
                            element: element.to_owned(),
                            label: name.to_owned(),
                            points,
                        });
                    }
                }
                _ => {}
            }
        }
        Ok(preview)
    }

    pub fn is_empty(&self) -> bool {
        self.shapes.is_empty() && self.edges.is_empty()
    }

    /// Smallest rectangle containing every shape and waypoint
    pub fn bounds(&self) -> Option<Rect> {
        let mut bounds = Rect::NOTHING;
        for shape in &self.shapes {
            bounds = bounds.union(shape.rect);
        }
        for edge in &self.edges {
            for point in &edge.points {
                bounds.extend_with(*point);
            }
        }
        bounds.is_positive().then_some(bounds)
    }

    /// Render as a standalone SVG document with an explicit viewBox
    pub fn to_svg(&self) -> String {
        let view = self
            .bounds()
            .unwrap_or(Rect::from_min_size(Pos2::ZERO, Vec2::new(100.0, 100.0)))
            .expand(SVG_MARGIN);

        let mut svg = String::new();
        let _ = write!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" width="{w}" height="{h}" viewBox="{x} {y} {w} {h}">"#,
            x = view.min.x,
            y = view.min.y,
            w = view.width(),
            h = view.height(),
        );
        svg.push_str(
            r##"<defs><marker id="arrow" viewBox="0 0 10 10" refX="10" refY="5" markerWidth="8" markerHeight="8" orient="auto"><path d="M 0 0 L 10 5 L 0 10 z" fill="#222"/></marker></defs>"##,
        );
        let _ = write!(
            svg,
            r#"<rect x="{}" y="{}" width="{}" height="{}" fill="white"/>"#,
            view.min.x,
            view.min.y,
            view.width(),
            view.height()
        );

        for edge in &self.edges {
            let points: Vec<String> = edge.points.iter().map(|p| format!("{},{}", p.x, p.y)).collect();
            let _ = write!(
                svg,
                r##"<polyline points="{}" fill="none" stroke="#222" stroke-width="2" marker-end="url(#arrow)"/>"##,
                points.join(" ")
            );
            if !edge.label.is_empty() {
                let mid = edge.points[edge.points.len() / 2];
                push_svg_text(&mut svg, &edge.label, mid + Vec2::new(0.0, -6.0));
            }
        }

        for shape in &self.shapes {
            let r = shape.rect;
            let c = r.center();
            match shape.kind {
                ShapeKind::StartEvent | ShapeKind::EndEvent | ShapeKind::Event => {
                    let width = if shape.kind == ShapeKind::EndEvent { 4 } else { 2 };
                    let _ = write!(
                        svg,
                        r##"<circle cx="{}" cy="{}" r="{}" fill="white" stroke="#222" stroke-width="{}"/>"##,
                        c.x,
                        c.y,
                        r.width().min(r.height()) / 2.0,
                        width
                    );
                }
                ShapeKind::Gateway => {
                    let _ = write!(
                        svg,
                        r##"<polygon points="{},{} {},{} {},{} {},{}" fill="white" stroke="#222" stroke-width="2"/>"##,
                        c.x, r.min.y, r.max.x, c.y, c.x, r.max.y, r.min.x, c.y
                    );
                }
                ShapeKind::Activity | ShapeKind::Other => {
                    let _ = write!(
                        svg,
                        r##"<rect x="{}" y="{}" width="{}" height="{}" rx="10" fill="white" stroke="#222" stroke-width="2"/>"##,
                        r.min.x,
                        r.min.y,
                        r.width(),
                        r.height()
                    );
                }
            }
            if !shape.label.is_empty() {
                let anchor = if shape.kind.label_below() {
                    Pos2::new(c.x, r.max.y + 14.0)
                } else {
                    c
                };
                push_svg_text(&mut svg, &shape.label, anchor);
            }
        }

        svg.push_str("</svg>");
        svg
    }

    /// Draw the diagram scaled to fit `viewport`
    pub fn paint(&self, painter: &egui::Painter, viewport: Rect) {
        let Some(bounds) = self.bounds().map(|b| b.expand(SVG_MARGIN)) else {
            return;
        };
        let scale = (viewport.width() / bounds.width())
            .min(viewport.height() / bounds.height())
            .min(1.0);
        let offset = viewport.center().to_vec2() - bounds.center().to_vec2() * scale;
        let to_screen = |p: Pos2| Pos2::new(p.x * scale, p.y * scale) + offset;

        let ink = Color32::from_gray(40);
        let stroke = Stroke::new(1.5, ink);
        let font = FontId::proportional((12.0 * scale).max(6.0));

        for edge in &self.edges {
            let points: Vec<Pos2> = edge.points.iter().map(|p| to_screen(*p)).collect();
            if let [.., from, to] = points.as_slice() {
                painter.add(egui::Shape::line(points[..points.len() - 1].to_vec(), stroke));
                painter.arrow(*from, *to - *from, stroke);
            }
        }

        for shape in &self.shapes {
            let rect = Rect::from_min_max(to_screen(shape.rect.min), to_screen(shape.rect.max));
            match shape.kind {
                ShapeKind::StartEvent | ShapeKind::EndEvent | ShapeKind::Event => {
                    let width = if shape.kind == ShapeKind::EndEvent { 3.0 } else { 1.5 };
                    painter.circle(rect.center(), rect.width().min(rect.height()) / 2.0, Color32::WHITE, Stroke::new(width, ink));
                }
                ShapeKind::Gateway => {
                    let c = rect.center();
                    let diamond = vec![
                        Pos2::new(c.x, rect.min.y),
                        Pos2::new(rect.max.x, c.y),
                        Pos2::new(c.x, rect.max.y),
                        Pos2::new(rect.min.x, c.y),
                    ];
                    painter.add(egui::Shape::convex_polygon(diamond, Color32::WHITE, stroke));
                }
                ShapeKind::Activity | ShapeKind::Other => {
                    painter.rect(rect, 8.0 * scale, Color32::WHITE, stroke);
                }
            }
            if !shape.label.is_empty() {
                let (pos, align) = if shape.kind.label_below() {
                    (Pos2::new(rect.center().x, rect.max.y + 4.0), Align2::CENTER_TOP)
                } else {
                    (rect.center(), Align2::CENTER_CENTER)
                };
                painter.text(pos, align, &shape.label, font.clone(), ink);
            }
        }
    }
}

fn number(node: roxmltree::Node<'_, '_>, attr: &str) -> Option<f32> {
    node.attribute(attr)?.trim().parse().ok()
}

fn bounds_rect(node: roxmltree::Node<'_, '_>) -> Option<Rect> {
    let min = Pos2::new(number(node, "x")?, number(node, "y")?);
    let size = Vec2::new(number(node, "width")?, number(node, "height")?);
    Some(Rect::from_min_size(min, size))
}

fn push_svg_text(svg: &mut String, label: &str, anchor: Pos2) {
    let lines: Vec<&str> = label.lines().collect();
    let first_y = anchor.y - (lines.len().saturating_sub(1) as f32) * 7.0;
    let _ = write!(
        svg,
        r##"<text x="{}" y="{}" font-family="Arial, sans-serif" font-size="12" text-anchor="middle" dominant-baseline="middle" fill="#222">"##,
        anchor.x, first_y
    );
    for (i, line) in lines.iter().enumerate() {
        let dy = if i == 0 { 0.0 } else { 14.0 };
        let _ = write!(svg, r#"<tspan x="{}" dy="{}">{}</tspan>"#, anchor.x, dy, escape_xml(line));
    }
    svg.push_str("</text>");
}

fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(ch),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::templates;

    #[test]
    fn test_parse_empty_template() {
        let preview = DiagramPreview::parse(templates::EMPTY_DIAGRAM).unwrap();
        assert_eq!(preview.shapes.len(), 1);
        assert!(preview.edges.is_empty());

        let start = &preview.shapes[0];
        assert_eq!(start.element, "StartEvent_1");
        assert_eq!(start.kind, ShapeKind::StartEvent);
        assert_eq!(start.label, "Start");
        assert_eq!(start.rect, Rect::from_min_size(Pos2::new(180.0, 160.0), Vec2::splat(36.0)));
    }

    #[test]
    fn test_parse_classifies_example_elements() {
        let example = &templates::EXAMPLES[0];
        let preview = DiagramPreview::parse(example.content).unwrap();
        assert!(preview.shapes.iter().any(|s| s.kind == ShapeKind::Gateway));
        assert!(preview.shapes.iter().any(|s| s.kind == ShapeKind::Activity));
        assert!(preview.shapes.iter().any(|s| s.kind == ShapeKind::EndEvent));
        assert!(!preview.edges.is_empty());
        // Entity-encoded newlines come through as real line breaks
        assert!(preview.shapes.iter().any(|s| s.label.contains('\n')));
    }

    #[test]
    fn test_malformed_markup_is_an_error() {
        assert!(DiagramPreview::parse("<definitions><unclosed></definitions>").is_err());
    }

    #[test]
    fn test_svg_declares_viewbox_and_escapes_labels() {
        let preview = DiagramPreview {
            shapes: vec![ShapeView {
                element: "Task_1".into(),
                kind: ShapeKind::Activity,
                label: "Check <amount> & approve".into(),
                rect: Rect::from_min_size(Pos2::new(100.0, 100.0), Vec2::new(100.0, 80.0)),
            }],
            edges: vec![],
        };
        let svg = preview.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(r#"viewBox="80 80 140 120""#));
        assert!(svg.contains("Check &lt;amount&gt; &amp; approve"));
        assert!(roxmltree::Document::parse(&svg).is_ok());
    }
}
