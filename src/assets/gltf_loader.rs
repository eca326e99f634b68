use super::{AssetError, ModelLoader};
use crate::scene::model::{Material, Mesh, Model, ROOT_NODE};
use glam::{Mat4, Vec3};
use std::path::Path;

/// Loads `.gltf` / `.glb` files into a [`Model`], keeping the node hierarchy
/// and the triangle geometry of every primitive.
#[derive(Debug, Default, Clone, Copy)]
pub struct GltfLoader;

impl ModelLoader for GltfLoader {
    fn load(&self, path: &Path) -> Result<Model, AssetError> {
        let display = path.display().to_string();
        if !path.exists() {
            return Err(AssetError::Read {
                path: display,
                source: std::io::Error::new(std::io::ErrorKind::NotFound, "no such file"),
            });
        }
        let (document, buffers, _images) =
            gltf::import(path).map_err(|source| AssetError::ParseGltf {
                path: display.clone(),
                source,
            })?;
        let scene = document
            .default_scene()
            .or_else(|| document.scenes().next())
            .ok_or_else(|| AssetError::NoScene {
                path: display.clone(),
            })?;

        let root_name = path
            .file_stem()
            .and_then(|value| value.to_str())
            .unwrap_or("gltf");
        let mut model = Model::new(root_name);
        for node in scene.nodes() {
            spawn_node(&mut model, &buffers, &node, ROOT_NODE);
        }

        if model.mesh_count() == 0 {
            return Err(AssetError::NoGeometry { path: display });
        }
        log::debug!(
            "Loaded glTF '{}' ({} nodes, {} meshes)",
            display,
            model.nodes().len(),
            model.mesh_count()
        );
        Ok(model)
    }
}

fn spawn_node(
    model: &mut Model,
    buffers: &[gltf::buffer::Data],
    node: &gltf::Node,
    parent: usize,
) {
    let name = node
        .name()
        .map(String::from)
        .unwrap_or_else(|| format!("node_{}", node.index()));
    let local = Mat4::from_cols_array_2d(&node.transform().matrix());
    let index = model.add_node(parent, name.clone(), local, None);

    // Each primitive becomes its own child so it keeps its own material.
    if let Some(mesh) = node.mesh() {
        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                log::debug!(
                    "Skipping {:?} primitive {} of '{}'",
                    primitive.mode(),
                    primitive.index(),
                    name
                );
                continue;
            }
            if let Some(geometry) = read_primitive(buffers, &primitive) {
                model.add_node(
                    index,
                    format!("{}_primitive_{}", name, primitive.index()),
                    Mat4::IDENTITY,
                    Some(geometry),
                );
            }
        }
    }

    for child in node.children() {
        spawn_node(model, buffers, &child, index);
    }
}

fn read_primitive(buffers: &[gltf::buffer::Data], primitive: &gltf::Primitive) -> Option<Mesh> {
    let reader = primitive.reader(|buffer| buffers.get(buffer.index()).map(|data| &data.0[..]));
    let positions: Vec<Vec3> = reader.read_positions()?.map(Vec3::from).collect();
    let indices: Vec<u32> = reader
        .read_indices()
        .map(|indices| indices.into_u32().collect())
        .unwrap_or_default();

    let material = primitive.material();
    let material = Material::Standard {
        base_color: material.pbr_metallic_roughness().base_color_factor(),
        emissive: material.emissive_factor(),
    };
    Mesh::new(positions, indices, material)
}
