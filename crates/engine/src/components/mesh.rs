use crate::prelude::*;

use std::f32::consts::PI;
use wgpu::util::DeviceExt;

#[derive(Component, Clone, Debug, Default)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<Index>,
}

#[derive(Component)]
pub struct GpuMesh {
    pub vertex_buffer: wgpu::Buffer,
    pub index_buffer: wgpu::Buffer,
    pub index_count: u32,
}

#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
}

impl Vertex {
    const ATTRIBS: [wgpu::VertexAttribute; 2] =
        wgpu::vertex_attr_array![0 => Float32x3, 1 => Float32x3];

    pub fn desc() -> wgpu::VertexBufferLayout<'static> {
        use std::mem;

        wgpu::VertexBufferLayout {
            array_stride: mem::size_of::<Self>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &Self::ATTRIBS,
        }
    }
}

pub type Index = u32;

pub fn index_format() -> wgpu::IndexFormat {
    wgpu::IndexFormat::Uint32
}

impl Mesh {
    /// Axis-aligned box centred on the origin. Faces wind counter-clockwise
    /// seen from outside.
    pub fn cuboid(half_extents: Vector3<f32>) -> Self {
        // (normal, u, v) with u x v = normal
        let faces = [
            (Vector3::x(), Vector3::y(), Vector3::z()),
            (-Vector3::x(), Vector3::z(), Vector3::y()),
            (Vector3::y(), Vector3::z(), Vector3::x()),
            (-Vector3::y(), Vector3::x(), Vector3::z()),
            (Vector3::z(), Vector3::x(), Vector3::y()),
            (-Vector3::z(), Vector3::y(), Vector3::x()),
        ];

        let mut mesh = Mesh::default();
        for (normal, u, v) in faces {
            let centre = normal.component_mul(&half_extents);
            let u = u.component_mul(&half_extents);
            let v = v.component_mul(&half_extents);
            let base = mesh.vertices.len() as Index;

            for corner in [centre - u - v, centre + u - v, centre + u + v, centre - u + v] {
                mesh.vertices.push(Vertex {
                    position: corner.into(),
                    normal: normal.into(),
                });
            }
            mesh.indices
                .extend_from_slice(&[base, base + 1, base + 2, base, base + 2, base + 3]);
        }

        mesh
    }

    /// Sphere centred on the origin built from latitude/longitude bands.
    pub fn uv_sphere(radius: f32, sectors: u32, stacks: u32) -> Self {
        let sectors = sectors.max(3);
        let stacks = stacks.max(2);
        let mut mesh = Mesh::default();

        for stack in 0..=stacks {
            let phi = PI * stack as f32 / stacks as f32;
            for sector in 0..=sectors {
                let theta = 2.0 * PI * sector as f32 / sectors as f32;
                let normal = Vector3::new(phi.sin() * theta.cos(), phi.cos(), phi.sin() * theta.sin());
                mesh.vertices.push(Vertex {
                    position: (normal * radius).into(),
                    normal: normal.into(),
                });
            }
        }

        let row = sectors + 1;
        for stack in 0..stacks {
            for sector in 0..sectors {
                let k1 = stack * row + sector;
                let k2 = k1 + row;
                if stack != 0 {
                    mesh.indices.extend_from_slice(&[k1, k1 + 1, k2]);
                }
                if stack != stacks - 1 {
                    mesh.indices.extend_from_slice(&[k1 + 1, k2 + 1, k2]);
                }
            }
        }

        mesh
    }

    /// Horizontal quad facing +Y.
    pub fn plane(half_width: f32, half_depth: f32) -> Self {
        let corners = [
            [-half_width, 0.0, -half_depth],
            [-half_width, 0.0, half_depth],
            [half_width, 0.0, half_depth],
            [half_width, 0.0, -half_depth],
        ];

        Mesh {
            vertices: corners
                .into_iter()
                .map(|position| Vertex {
                    position,
                    normal: [0.0, 1.0, 0.0],
                })
                .collect(),
            indices: vec![0, 1, 2, 0, 2, 3],
        }
    }
}

impl GpuComponent for Mesh {
    type UserComponent = Mesh;
    type GpuVariant = GpuMesh;
}

impl GpuInitialize for Mesh {
    type Dependencies = ();

    fn initialize(
        user: &Self::UserComponent,
        _dependencies: Option<&Self::Dependencies>,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
        _context: &GpuContext,
    ) -> Self::GpuVariant {
        create_mesh_buffers(user, device)
    }
}

impl GpuUpdate for Mesh {
    fn update(
        user: &Self::UserComponent,
        gpu: &mut Self::GpuVariant,
        _dependencies: Option<&()>,
        device: &wgpu::Device,
        _queue: &wgpu::Queue,
    ) {
        // Geometry changes are rare, recreate the buffers
        *gpu = create_mesh_buffers(user, device);
    }
}

fn create_mesh_buffers(mesh: &Mesh, device: &wgpu::Device) -> GpuMesh {
    let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Vertex Buffer"),
        contents: bytemuck::cast_slice(&mesh.vertices),
        usage: wgpu::BufferUsages::VERTEX,
    });

    let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
        label: Some("Index Buffer"),
        contents: bytemuck::cast_slice(&mesh.indices),
        usage: wgpu::BufferUsages::INDEX,
    });

    GpuMesh {
        vertex_buffer,
        index_buffer,
        index_count: mesh.indices.len() as u32,
    }
}
