//! Scene configuration.
//!
//! Scenes differ only in their shader files and vertex data, so each one is described
//! by a [`SceneConfig`]. The built-in scenes are embedded as JSON.

use glam::Vec4;
use indexmap::IndexMap;

use crate::abs::Topology;

const BUILTIN_SCENES_JSON: &str = include_str!("assets/scenes.json");

pub const DEFAULT_WIDTH: u32 = 512;
pub const DEFAULT_HEIGHT: u32 = 384;

/// The shape every scene draws unless configured otherwise: two overlapping
/// triangles in clip space.
pub const DEFAULT_VERTICES: [Vec4; 6] = [
    Vec4::new(-1.0, -1.0, 0.0, 1.0),
    Vec4::new(1.0, -1.0, 0.0, 1.0),
    Vec4::new(0.0, 1.0, 0.0, 1.0),
    Vec4::new(1.0, 1.0, 0.0, 1.0),
    Vec4::new(-1.0, 1.0, 0.0, 1.0),
    Vec4::new(0.0, -1.0, 0.0, 1.0),
];

fn default_width() -> u32 {
    DEFAULT_WIDTH
}

fn default_height() -> u32 {
    DEFAULT_HEIGHT
}

#[derive(Debug, serde::Deserialize)]
struct RawSceneConfig {
    vertex_shader: String,
    fragment_shader: String,
    #[serde(default)]
    topology: Topology,
    #[serde(default = "default_width")]
    width: u32,
    #[serde(default = "default_height")]
    height: u32,
    vertices: Option<Vec<[f32; 4]>>,
}

/// Everything needed to set up one scene.
#[derive(Debug, Clone, PartialEq)]
pub struct SceneConfig {
    pub name: String,
    pub vertex_shader: String,
    pub fragment_shader: String,
    pub topology: Topology,
    pub width: u32,
    pub height: u32,
    pub vertices: Vec<Vec4>,
}

impl SceneConfig {
    /// Builds a scene following the `<scene>-desc.vert` / `<scene>-desc.frag` naming
    /// convention, drawing the default shape as triangles.
    pub fn from_convention(name: &str) -> Self {
        Self {
            name: name.to_string(),
            vertex_shader: format!("{}-desc.vert", name),
            fragment_shader: format!("{}-desc.frag", name),
            topology: Topology::Triangles,
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            vertices: DEFAULT_VERTICES.to_vec(),
        }
    }

    /// Looks up one of the scenes shipped with the crate.
    pub fn builtin(name: &str) -> Result<Self, String> {
        let catalog = SceneCatalog::builtin()?;
        catalog.get(name).cloned().ok_or_else(|| {
            let available = catalog.names().collect::<Vec<_>>().join(", ");
            format!("Unknown scene '{}' (available: {})", name, available)
        })
    }

    /// Vertex data flattened to four floats per vertex.
    pub fn vertex_data(&self) -> Vec<f32> {
        self.vertices.iter().flat_map(|v| v.to_array()).collect()
    }
}

/// A set of named scenes, in the order they were declared.
#[derive(Debug, Clone)]
pub struct SceneCatalog {
    scenes: IndexMap<String, SceneConfig>,
}

impl SceneCatalog {
    pub fn new(s: &str) -> Result<Self, String> {
        let raw: IndexMap<String, RawSceneConfig> =
            serde_json::from_str(s).map_err(|e| e.to_string())?;
        let scenes = raw
            .into_iter()
            .map(|(name, raw)| {
                if raw.width == 0 || raw.height == 0 {
                    return Err(format!("Scene '{}' has an empty surface", name));
                }
                let vertices = match raw.vertices {
                    Some(vertices) => vertices.into_iter().map(Vec4::from_array).collect(),
                    None => DEFAULT_VERTICES.to_vec(),
                };
                let config = SceneConfig {
                    name: name.clone(),
                    vertex_shader: raw.vertex_shader,
                    fragment_shader: raw.fragment_shader,
                    topology: raw.topology,
                    width: raw.width,
                    height: raw.height,
                    vertices,
                };
                Ok((name, config))
            })
            .collect::<Result<IndexMap<_, _>, String>>()?;
        Ok(Self { scenes })
    }

    pub fn builtin() -> Result<Self, String> {
        Self::new(BUILTIN_SCENES_JSON)
    }

    pub fn get(&self, name: &str) -> Option<&SceneConfig> {
        self.scenes.get(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.scenes.keys().map(String::as_str)
    }
}
