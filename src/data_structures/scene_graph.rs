//! Scene graph.
//!
//! A [`Scene`] holds lights and meshes in insertion order. Adding an object
//! returns a typed handle that stays valid for the scene's lifetime, since the
//! scene never removes objects.

use log::debug;

use crate::data_structures::{
    light::{DirectionalLight, Light, PointLight, SpotLight},
    model::Mesh,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MeshHandle(usize);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct LightHandle(usize);

impl MeshHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

impl LightHandle {
    pub fn index(&self) -> usize {
        self.0
    }
}

/// Anything that can be added to a [`Scene`].
pub trait SceneNode {
    type Handle;

    fn attach(self, scene: &mut Scene) -> Self::Handle;
}

impl SceneNode for Mesh {
    type Handle = MeshHandle;

    fn attach(self, scene: &mut Scene) -> MeshHandle {
        scene.meshes.push(self);
        MeshHandle(scene.meshes.len() - 1)
    }
}

macro_rules! light_node {
    ($($ty:ty),*) => {$(
        impl SceneNode for $ty {
            type Handle = LightHandle;

            fn attach(self, scene: &mut Scene) -> LightHandle {
                let light: Light = self.into();
                debug!("adding {} light with colour {}", light_kind(&light), light.color());
                scene.lights.push(light);
                LightHandle(scene.lights.len() - 1)
            }
        }
    )*};
}

light_node!(Light, PointLight, DirectionalLight, SpotLight);

fn light_kind(light: &Light) -> &'static str {
    match light {
        Light::Point(_) => "point",
        Light::Directional(_) => "directional",
        Light::Spot(_) => "spot",
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    lights: Vec<Light>,
    meshes: Vec<Mesh>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add<N: SceneNode>(&mut self, node: N) -> N::Handle {
        node.attach(self)
    }

    pub fn lights(&self) -> &[Light] {
        &self.lights
    }

    pub fn light(&self, handle: LightHandle) -> Option<&Light> {
        self.lights.get(handle.0)
    }

    pub fn meshes(&self) -> &[Mesh] {
        &self.meshes
    }

    pub fn mesh(&self, handle: MeshHandle) -> Option<&Mesh> {
        self.meshes.get(handle.0)
    }

    pub fn mesh_mut(&mut self, handle: MeshHandle) -> Option<&mut Mesh> {
        self.meshes.get_mut(handle.0)
    }

    /// Apply `mutation` to the meshes behind `handles`, in the handles' order.
    pub fn for_each_mesh_mut(&mut self, handles: &[MeshHandle], mut mutation: impl FnMut(&mut Mesh)) {
        for handle in handles {
            if let Some(mesh) = self.meshes.get_mut(handle.0) {
                mutation(mesh);
            }
        }
    }
}
