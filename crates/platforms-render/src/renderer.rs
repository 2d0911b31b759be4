//! Renderers and the scene objects that carry them

use std::sync::Arc;

use parking_lot::Mutex;

use crate::material::{Material, ShaderParams};

/// Something that carries materials whose uniforms can be written.
pub trait MaterialSurface: Send + Sync {
    /// Visit every material currently attached, in order.
    ///
    /// The list is read at call time, so swaps made between calls are
    /// visible on the next call.
    fn for_each_material(&self, f: &mut dyn FnMut(&mut dyn ShaderParams));
}

/// An object in the scene that may have a renderer attached.
pub trait RenderObject {
    fn renderer(&self) -> Option<Arc<dyn MaterialSurface>>;
}

/// Renderer for a mesh, owning its material slots
#[derive(Debug, Default)]
pub struct MeshRenderer {
    materials: Mutex<Vec<Material>>,
}

impl MeshRenderer {
    pub fn new(materials: Vec<Material>) -> Self {
        Self {
            materials: Mutex::new(materials),
        }
    }

    /// Replace every material slot at once
    pub fn set_materials(&self, materials: Vec<Material>) {
        *self.materials.lock() = materials;
    }

    /// Append a material slot
    pub fn push_material(&self, material: Material) {
        self.materials.lock().push(material);
    }

    /// Number of material slots
    pub fn material_count(&self) -> usize {
        self.materials.lock().len()
    }

    /// Names of the attached materials, in slot order
    pub fn material_names(&self) -> Vec<String> {
        self.materials
            .lock()
            .iter()
            .map(|m| m.name().to_owned())
            .collect()
    }

    /// Copy of the first material with the given name
    pub fn material(&self, name: &str) -> Option<Material> {
        self.materials.lock().iter().find(|m| m.name() == name).cloned()
    }

    /// Copy of every attached material
    pub fn materials(&self) -> Vec<Material> {
        self.materials.lock().clone()
    }
}

impl MaterialSurface for MeshRenderer {
    fn for_each_material(&self, f: &mut dyn FnMut(&mut dyn ShaderParams)) {
        for material in self.materials.lock().iter_mut() {
            f(material as &mut dyn ShaderParams);
        }
    }
}

/// A named node in the scene with an optional renderer
#[derive(Debug, Clone)]
pub struct SceneObject {
    name: String,
    renderer: Option<Arc<MeshRenderer>>,
}

impl SceneObject {
    /// Create an object without a renderer
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            renderer: None,
        }
    }

    /// Create an object with the given renderer attached
    pub fn with_renderer(name: impl Into<String>, renderer: Arc<MeshRenderer>) -> Self {
        Self {
            name: name.into(),
            renderer: Some(renderer),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attach or detach the renderer
    pub fn set_renderer(&mut self, renderer: Option<Arc<MeshRenderer>>) {
        self.renderer = renderer;
    }

    pub fn mesh_renderer(&self) -> Option<&Arc<MeshRenderer>> {
        self.renderer.as_ref()
    }
}

impl RenderObject for SceneObject {
    fn renderer(&self) -> Option<Arc<dyn MaterialSurface>> {
        self.renderer
            .clone()
            .map(|renderer| renderer as Arc<dyn MaterialSurface>)
    }
}
