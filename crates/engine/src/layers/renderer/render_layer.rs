use crate::layers::renderer::systems::{
    initialize_camera_buffers, initialize_render_targets, update_camera_buffers,
    update_render_targets,
};
use crate::prelude::*;

pub struct RenderLayer {
    device: wgpu::Device,
    queue: wgpu::Queue,
    render_pipeline: wgpu::RenderPipeline,
    schedule: Schedule,
}

impl RenderLayer {
    pub fn new(context: &LayerContext) -> std::result::Result<Self, EngineError> {
        // Device, queue and layouts are set up by DeviceLayer
        let (device, queue, render_pipeline) = {
            let world = context.world();
            let device = require::<GpuDevice>(&world)?.0.clone();
            let queue = require::<GpuQueue>(&world)?.0.clone();
            let gpu_context = require::<GpuContext>(&world)?;
            let render_pipeline = create_pipeline(&device, gpu_context);
            (device, queue, render_pipeline)
        };

        context.world().init_resource::<ClearColor>();

        let mut schedule = Schedule::default();
        schedule.add_systems(
            (
                gpu_initialize_system::<Mesh>,
                gpu_initialize_system::<Material>,
                gpu_initialize_system::<Transform>,
                gpu_update_system::<Mesh>,
                gpu_update_system::<Material>,
                gpu_update_system::<Transform>,
                initialize_camera_buffers,
                initialize_render_targets,
                update_render_targets,
                update_camera_buffers,
            )
                .chain(),
        );

        Ok(Self {
            device,
            queue,
            render_pipeline,
            schedule,
        })
    }
}

fn create_pipeline(device: &wgpu::Device, context: &GpuContext) -> wgpu::RenderPipeline {
    let shader = device.create_shader_module(wgpu::include_wgsl!("shader.wgsl"));
    let render_pipeline_layout = device.create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
        label: Some("Render Pipeline Layout"),
        bind_group_layouts: &[
            &context.camera_bind_group_layout,
            &context.transform_bind_group_layout,
            &context.material_bind_group_layout,
        ],
        push_constant_ranges: &[],
    });

    device.create_render_pipeline(&wgpu::RenderPipelineDescriptor {
        label: Some("Render Pipeline"),
        layout: Some(&render_pipeline_layout),
        vertex: wgpu::VertexState {
            module: &shader,
            entry_point: Some("vertex"),
            buffers: &[Vertex::desc()],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        },
        fragment: Some(wgpu::FragmentState {
            module: &shader,
            entry_point: Some("fragment"),
            targets: &[Some(wgpu::ColorTargetState {
                format: RENDER_TARGET_FORMAT,
                blend: Some(wgpu::BlendState::REPLACE),
                write_mask: wgpu::ColorWrites::ALL,
            })],
            compilation_options: wgpu::PipelineCompilationOptions::default(),
        }),
        primitive: wgpu::PrimitiveState {
            topology: wgpu::PrimitiveTopology::TriangleList,
            strip_index_format: None,
            front_face: wgpu::FrontFace::Ccw,
            cull_mode: Some(wgpu::Face::Back),
            polygon_mode: wgpu::PolygonMode::Fill,
            unclipped_depth: false,
            conservative: false,
        },
        depth_stencil: Some(wgpu::DepthStencilState {
            format: DEPTH_FORMAT,
            depth_write_enabled: true,
            depth_compare: wgpu::CompareFunction::Less,
            stencil: wgpu::StencilState::default(),
            bias: wgpu::DepthBiasState::default(),
        }),
        multisample: wgpu::MultisampleState {
            count: 1,
            mask: !0,
            alpha_to_coverage_enabled: false,
        },
        multiview: None,
        cache: None,
    })
}

impl Layer for RenderLayer {
    fn frame(&mut self, context: &LayerContext) -> crate::Result<()> {
        let mut world = context.world();

        // Run the schedule first before any queries
        self.schedule.run(&mut world);

        let clear_color = world
            .get_resource::<ClearColor>()
            .copied()
            .unwrap_or_default();

        let mut camera_query = world.query::<(&GpuCamera, &GpuRenderTarget, &GpuDepthTexture)>();
        let mut mesh_query = world.query::<(&GpuMesh, &GpuMaterial, &GpuTransform)>();

        for (camera, target, depth) in camera_query.iter(&world) {
            let mut encoder = self
                .device
                .create_command_encoder(&wgpu::CommandEncoderDescriptor {
                    label: Some("Render Encoder"),
                });

            {
                let mut render_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                    label: Some("Render Pass"),
                    color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                        view: &target.view,
                        resolve_target: None,
                        ops: wgpu::Operations {
                            load: wgpu::LoadOp::Clear(clear_color.to_wgpu()),
                            store: wgpu::StoreOp::Store,
                        },
                        depth_slice: None,
                    })],
                    depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                        view: &depth.view,
                        depth_ops: Some(wgpu::Operations {
                            load: wgpu::LoadOp::Clear(1.0),
                            store: wgpu::StoreOp::Store,
                        }),
                        stencil_ops: None,
                    }),
                    occlusion_query_set: None,
                    timestamp_writes: None,
                });

                render_pass.set_pipeline(&self.render_pipeline);
                render_pass.set_bind_group(0, &camera.bind_group, &[]);

                for (mesh, material, transform) in mesh_query.iter(&world) {
                    render_pass.set_bind_group(1, &transform.bind_group, &[]);
                    render_pass.set_bind_group(2, &material.bind_group, &[]);
                    render_pass.set_vertex_buffer(0, mesh.vertex_buffer.slice(..));
                    render_pass.set_index_buffer(mesh.index_buffer.slice(..), index_format());
                    render_pass.draw_indexed(0..mesh.index_count, 0, 0..1);
                }
            }

            self.queue.submit(std::iter::once(encoder.finish()));
        }

        Ok(())
    }

    fn detach(&mut self, context: &LayerContext) {
        let mut world = context.world();

        // GPU resources are tied to the device, drop them with the layer
        let mut query = world
            .query_filtered::<Entity, Or<(With<GpuCamera>, With<GpuMesh>, With<GpuMaterial>, With<GpuTransform>)>>();
        let entities: Vec<Entity> = query.iter(&world).collect();
        for entity in entities {
            world.entity_mut(entity).remove::<(
                GpuCamera,
                GpuRenderTarget,
                GpuDepthTexture,
                GpuMesh,
                GpuMaterial,
                GpuTransform,
            )>();
        }
    }
}
