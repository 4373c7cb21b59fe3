//! Flattening of a tagging frame into text entries and component refs.
//!
//! Per-node reads never fail the traversal: a font or fill the host cannot
//! report degrades to its sentinel and the walk moves on.

use tracing::debug;

use crate::host::{find_all, FillsValue, FontValue, NodeKind, Paint, SceneNode};
use crate::types::*;

/// Absolute position of a node.
///
/// Uses the translation column of the absolute transform when it has the
/// 2x3 shape, else the local `x`/`y` (0 when absent).
pub fn node_position<N: SceneNode>(node: &N) -> (f64, f64) {
    match node.absolute_transform() {
        Some(m) if m.len() == 2 && m.iter().all(|row| row.len() == 3) => (m[0][2], m[1][2]),
        _ => (node.x().unwrap_or(0.0), node.y().unwrap_or(0.0)),
    }
}

pub fn read_font_safe<N: SceneNode>(node: &N) -> FontDescriptor {
    match node.font_name() {
        Ok(FontValue::Named { family, style }) => SafeRead::Ok(format!("{} {}", family, style)),
        Ok(FontValue::Mixed) => SafeRead::Fallback(FontSentinel::Mixed),
        Ok(FontValue::Unsupported) => SafeRead::Fallback(FontSentinel::Unknown),
        Err(e) => {
            debug!("Font read failed for {}: {}", node.id(), e);
            SafeRead::Fallback(FontSentinel::Unknown)
        }
    }
}

/// Solid color of a paint, or `None` for any other paint kind.
pub fn simplify_paint(paint: &Paint) -> Option<SolidColor> {
    if paint.kind != "SOLID" {
        return None;
    }
    let color = paint.color?;
    Some(SolidColor {
        kind: SolidTag::Solid,
        r: color.r,
        g: color.g,
        b: color.b,
        a: paint.opacity.unwrap_or(1.0),
    })
}

/// First solid paint of the node's fills.
pub fn read_fill_safe<N: SceneNode>(node: &N) -> SafeRead<SolidColor, NoFill> {
    let paints = match node.fills() {
        Ok(FillsValue::Paints(paints)) => paints,
        Ok(FillsValue::Mixed) => return SafeRead::Fallback(NoFill::Mixed),
        Ok(FillsValue::NotAList) => return SafeRead::Fallback(NoFill::NotAList),
        Err(e) => {
            debug!("Fills read failed for {}: {}", node.id(), e);
            return SafeRead::Fallback(NoFill::Unreadable);
        }
    };
    if paints.is_empty() {
        return SafeRead::Fallback(NoFill::Empty);
    }
    // The first solid paint decides; one without a color makes the whole read fail.
    let Some(solid) = paints.iter().find(|p| p.kind == "SOLID") else {
        return SafeRead::Fallback(NoFill::NoSolidPaint);
    };
    match simplify_paint(solid) {
        Some(color) => SafeRead::Ok(color),
        None => {
            debug!("Solid paint without color on {}", node.id());
            SafeRead::Fallback(NoFill::Unreadable)
        }
    }
}

pub fn text_entry<N: SceneNode>(node: &N) -> TextEntry {
    let (x, y) = node_position(node);
    TextEntry {
        id: node.id().to_string(),
        name: node.name().to_string(),
        characters: node.characters().to_string(),
        font_name: read_font_safe(node),
        fills: read_fill_safe(node).ok(),
        bounds: Bounds {
            x,
            y,
            width: node.width(),
            height: node.height(),
        },
    }
}

/// Every text descendant of `frame`, any depth.
pub fn collect_text_entries<N: SceneNode>(frame: &N) -> Vec<TextEntry> {
    find_all(frame, |n| n.kind() == NodeKind::Text)
        .into_iter()
        .map(text_entry)
        .collect()
}

fn component_kind(kind: NodeKind) -> Option<ComponentKind> {
    match kind {
        NodeKind::Instance => Some(ComponentKind::Instance),
        NodeKind::Component => Some(ComponentKind::Component),
        NodeKind::ComponentSet => Some(ComponentKind::ComponentSet),
        _ => None,
    }
}

/// Every instance, component and component set under `frame`, any depth.
pub fn collect_component_refs<N: SceneNode>(frame: &N) -> Vec<ComponentRef> {
    find_all(frame, |n| component_kind(n.kind()).is_some())
        .into_iter()
        .filter_map(|n| {
            Some(ComponentRef {
                id: n.id().to_string(),
                name: n.name().to_string(),
                node_type: component_kind(n.kind())?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::DocumentNode;
    use serde_json::{json, Value};

    fn text(id: &str, extra: Value) -> Value {
        let mut node = json!({ "id": id, "name": id, "type": "TEXT", "characters": id, "width": 50, "height": 12 });
        if let (Some(obj), Some(extra)) = (node.as_object_mut(), extra.as_object()) {
            for (k, v) in extra {
                obj.insert(k.clone(), v.clone());
            }
        }
        node
    }

    fn frame(children: Vec<Value>) -> DocumentNode {
        serde_json::from_value(json!({
            "id": "f", "name": "tagueamento", "type": "FRAME", "children": children
        }))
        .unwrap()
    }

    #[test]
    fn test_position_prefers_absolute_transform() {
        let node: DocumentNode = serde_json::from_value(text(
            "t",
            json!({ "absoluteTransform": [[1, 0, 120.5], [0, 1, 48]], "x": 3, "y": 4 }),
        ))
        .unwrap();
        assert_eq!(node_position(&node), (120.5, 48.0));
    }

    #[test]
    fn test_position_falls_back_on_bad_transform() {
        let malformed: DocumentNode =
            serde_json::from_value(text("t", json!({ "absoluteTransform": [[1, 0]], "x": 3, "y": 4 }))).unwrap();
        assert_eq!(node_position(&malformed), (3.0, 4.0));

        let bare: DocumentNode = serde_json::from_value(text("t", json!({}))).unwrap();
        assert_eq!(node_position(&bare), (0.0, 0.0));
    }

    #[test]
    fn test_font_failure_is_unknown_and_siblings_continue() {
        let f = frame(vec![
            text("a", json!({ "fontName": { "error": "boom" } })),
            text("b", json!({ "fontName": { "family": "Inter", "style": "Regular" } })),
            text("c", json!({ "fontName": "MIXED" })),
        ]);
        let entries = collect_text_entries(&f);
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].font_name, SafeRead::Fallback(FontSentinel::Unknown));
        assert_eq!(entries[1].font_name, SafeRead::Ok("Inter Regular".to_string()));
        assert_eq!(entries[2].font_name, SafeRead::Fallback(FontSentinel::Mixed));
    }

    #[test]
    fn test_fill_absent_for_empty_mixed_or_non_list() {
        for fills in [json!([]), json!("MIXED"), json!({ "type": "SOLID" }), json!({ "error": "x" })] {
            let node: DocumentNode = serde_json::from_value(text("t", json!({ "fills": fills }))).unwrap();
            assert!(read_fill_safe(&node).is_fallback());
            assert!(text_entry(&node).fills.is_none());
        }
    }

    #[test]
    fn test_fill_skips_non_solid_paints() {
        let node: DocumentNode = serde_json::from_value(text(
            "t",
            json!({ "fills": [
                { "type": "GRADIENT_LINEAR" },
                { "type": "IMAGE" },
                { "type": "SOLID", "color": { "r": 0.2, "g": 0.4, "b": 0.6 }, "opacity": 0.5 },
                { "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1 } }
            ]}),
        ))
        .unwrap();
        let fill = text_entry(&node).fills.unwrap();
        assert_eq!((fill.r, fill.g, fill.b, fill.a), (0.2, 0.4, 0.6, 0.5));
    }

    #[test]
    fn test_fill_opacity_defaults_to_opaque() {
        let paint = Paint {
            kind: "SOLID".into(),
            color: Some(crate::host::Rgb { r: 0.0, g: 0.0, b: 0.0 }),
            opacity: None,
        };
        assert_eq!(simplify_paint(&paint).unwrap().a, 1.0);
    }

    #[test]
    fn test_solid_paint_without_color_is_unreadable() {
        let node: DocumentNode = serde_json::from_value(text(
            "t",
            json!({ "fills": [
                { "type": "IMAGE" },
                { "type": "SOLID" },
                { "type": "SOLID", "color": { "r": 1, "g": 1, "b": 1 } }
            ]}),
        ))
        .unwrap();
        assert_eq!(read_fill_safe(&node), SafeRead::Fallback(NoFill::Unreadable));
        assert!(text_entry(&node).fills.is_none());
    }

    #[test]
    fn test_only_non_solid_paints_is_no_fill() {
        let node: DocumentNode =
            serde_json::from_value(text("t", json!({ "fills": [{ "type": "IMAGE" }] }))).unwrap();
        assert_eq!(read_fill_safe(&node), SafeRead::Fallback(NoFill::NoSolidPaint));
    }

    #[test]
    fn test_collects_nested_texts_and_components() {
        let f = frame(vec![
            json!({ "id": "g", "name": "group", "type": "GROUP", "children": [
                text("deep", json!({})),
                { "id": "i1", "name": "Button", "type": "INSTANCE", "children": [ text("label", json!({})) ] }
            ]}),
            json!({ "id": "cs", "name": "Variants", "type": "COMPONENT_SET", "children": [
                { "id": "c1", "name": "State=On", "type": "COMPONENT" }
            ]}),
            json!({ "id": "r", "name": "bg", "type": "RECTANGLE" }),
        ]);

        let texts: Vec<String> = collect_text_entries(&f).into_iter().map(|t| t.id).collect();
        assert_eq!(texts, vec!["deep", "label"]);

        let refs = collect_component_refs(&f);
        let summary: Vec<(&str, ComponentKind)> = refs.iter().map(|r| (r.id.as_str(), r.node_type)).collect();
        assert_eq!(
            summary,
            vec![
                ("i1", ComponentKind::Instance),
                ("cs", ComponentKind::ComponentSet),
                ("c1", ComponentKind::Component),
            ]
        );
    }
}
