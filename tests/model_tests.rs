#![cfg(feature = "gltf")]

use glam::DVec3;
use turntable::model::{model_bounds_from_slice, ModelError};

// 36 zero bytes: three VEC3 floats.
const BUFFER_URI: &str =
    "data:application/octet-stream;base64,AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA";

fn document(nodes: &str, scene_nodes: &str) -> String {
    format!(
        r#"{{
            "asset": {{ "version": "2.0" }},
            "scene": 0,
            "scenes": [{{ "nodes": {scene_nodes} }}],
            "nodes": {nodes},
            "meshes": [{{ "primitives": [{{ "attributes": {{ "POSITION": 0 }} }}] }}],
            "accessors": [{{
                "bufferView": 0,
                "componentType": 5126,
                "count": 3,
                "type": "VEC3",
                "min": [0.0, 0.0, 0.0],
                "max": [1.0, 2.0, 3.0]
            }}],
            "bufferViews": [{{ "buffer": 0, "byteLength": 36 }}],
            "buffers": [{{ "byteLength": 36, "uri": "{uri}" }}]
        }}"#,
        nodes = nodes,
        scene_nodes = scene_nodes,
        uri = BUFFER_URI
    )
}

#[test]
fn bounds_include_node_translation() {
    let json = document(r#"[{ "mesh": 0, "translation": [10.0, 0.0, 0.0] }]"#, "[0]");
    let bounds = model_bounds_from_slice(json.as_bytes()).unwrap();

    assert_eq!(bounds.min, DVec3::new(10.0, 0.0, 0.0));
    assert_eq!(bounds.max, DVec3::new(11.0, 2.0, 3.0));
    assert_eq!(bounds.radius(), 1.5);
}

#[test]
fn bounds_compose_parent_transforms() {
    let json = document(
        r#"[
            { "children": [1], "translation": [0.0, 5.0, 0.0] },
            { "mesh": 0, "scale": [2.0, 2.0, 2.0] }
        ]"#,
        "[0]",
    );
    let bounds = model_bounds_from_slice(json.as_bytes()).unwrap();

    assert_eq!(bounds.min, DVec3::new(0.0, 5.0, 0.0));
    assert_eq!(bounds.max, DVec3::new(2.0, 9.0, 6.0));
    assert_eq!(bounds.centered().center(), DVec3::ZERO);
}

#[test]
fn bounds_union_across_nodes() {
    let json = document(
        r#"[
            { "mesh": 0 },
            { "mesh": 0, "translation": [-4.0, 0.0, 0.0] }
        ]"#,
        "[0, 1]",
    );
    let bounds = model_bounds_from_slice(json.as_bytes()).unwrap();

    assert_eq!(bounds.min, DVec3::new(-4.0, 0.0, 0.0));
    assert_eq!(bounds.max, DVec3::new(1.0, 2.0, 3.0));
}

#[test]
fn scene_without_meshes_has_no_geometry() {
    let json = r#"{ "asset": { "version": "2.0" }, "scenes": [{ "nodes": [0] }], "nodes": [{}] }"#;
    assert!(matches!(
        model_bounds_from_slice(json.as_bytes()),
        Err(ModelError::NoGeometry)
    ));
}

#[test]
fn garbage_is_a_gltf_error() {
    assert!(matches!(
        model_bounds_from_slice(b"not a model"),
        Err(ModelError::Gltf(_))
    ));
}

#[test]
fn missing_file_is_io_error() {
    assert!(matches!(
        turntable::model::load_model_bounds("/nonexistent/model.glb"),
        Err(ModelError::Io(_))
    ));
}
