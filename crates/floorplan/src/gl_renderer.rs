//! OpenGL / WebGL2 renderer shared by the native and browser hosts.
//!
//! Meshes are uploaded once per node. Each frame draws from a [`FrameSnapshot`]
//! so a host can capture the scene state in one place and paint it later
//! (egui paints from a callback that cannot borrow the session).

use std::collections::HashMap;

use glam::{Mat4, Vec3};
use glow::HasContext;

use crate::mesh::{mesh_for_node, MeshData, VERTEX_STRIDE};
use crate::quality::Fog;
use crate::render_loop::FrameView;
use crate::scene::{NodeId, SceneGraph};

/// Must match the array size in the fragment shader
pub const MAX_POINT_LIGHTS: usize = 5;

// ── Frame snapshot ───────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
pub struct PointLightSample {
    pub position: Vec3,
    /// Colour premultiplied by intensity
    pub radiance: Vec3,
    pub range: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NodeDraw {
    pub id: NodeId,
    pub model: Mat4,
    pub opacity: f32,
    pub transparent: bool,
    /// Emissive colour premultiplied by intensity
    pub emissive: Vec3,
}

/// Everything needed to paint one frame, detached from the session
#[derive(Debug, Clone, PartialEq)]
pub struct FrameSnapshot {
    pub view_projection: Mat4,
    pub camera_position: Vec3,
    pub background: [f32; 3],
    pub fog: Option<Fog>,
    pub ambient: Vec3,
    /// Direction the light travels towards
    pub directional_dir: Vec3,
    pub directional: Vec3,
    pub point_lights: Vec<PointLightSample>,
    pub draws: Vec<NodeDraw>,
}

impl FrameSnapshot {
    pub fn capture(view: &FrameView<'_>) -> Self {
        let lighting = view.lighting;
        let ambient = Vec3::from(lighting.ambient.color) * lighting.ambient.intensity;
        let directional = Vec3::from(lighting.directional.color) * lighting.directional.intensity;
        let directional_dir = (-Vec3::from(lighting.directional.position)).normalize_or_zero();

        let point_lights = lighting
            .room_lights
            .iter()
            .take(MAX_POINT_LIGHTS)
            .map(|l| PointLightSample {
                position: Vec3::from(l.position),
                radiance: Vec3::from(l.color) * l.intensity,
                range: l.range,
            })
            .collect();

        let draws = view
            .scene
            .iter()
            .map(|(id, node)| NodeDraw {
                id,
                model: node.model_matrix(),
                opacity: node.material.opacity,
                transparent: node.material.transparent,
                emissive: Vec3::from(node.material.emissive) * node.material.emissive_intensity,
            })
            .collect();

        Self {
            view_projection: view.camera.view_projection(),
            camera_position: view.camera.position,
            background: view.scene.background,
            fog: view.scene.fog,
            ambient,
            directional_dir,
            directional,
            point_lights,
            draws,
        }
    }
}

// ── GPU mesh handles ─────────────────────────────────────────

struct GpuMesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ibo: glow::Buffer,
    index_count: i32,
}

// ── Renderer ─────────────────────────────────────────────────

pub struct GlRenderer {
    program: glow::Program,
    meshes: HashMap<NodeId, GpuMesh>,
}

impl GlRenderer {
    pub fn new(gl: &glow::Context) -> Result<Self, String> {
        let vert = format!("{SHADER_HEADER}{MESH_VERT}");
        let frag = format!("{SHADER_HEADER}{MESH_FRAG}");
        let program = compile_program(gl, &vert, &frag)?;
        Ok(Self {
            program,
            meshes: HashMap::new(),
        })
    }

    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// Upload every node that has no GPU mesh yet
    pub fn upload_scene(&mut self, gl: &glow::Context, scene: &SceneGraph) -> Result<(), String> {
        for (id, node) in scene.iter() {
            if self.meshes.contains_key(&id) {
                continue;
            }
            let gpu = upload_mesh(gl, &mesh_for_node(node))?;
            self.meshes.insert(id, gpu);
        }
        tracing::debug!(meshes = self.meshes.len(), "scene uploaded");
        Ok(())
    }

    /// Paint a snapshot into `viewport` = [x, y, width, height] (pixels)
    pub fn draw(&self, gl: &glow::Context, frame: &FrameSnapshot, viewport: [i32; 4]) {
        let [x, y, w, h] = viewport;
        let (opaque, mut transparent): (Vec<&NodeDraw>, Vec<&NodeDraw>) =
            frame.draws.iter().partition(|d| !d.transparent);
        // Back to front
        transparent.sort_by(|a, b| {
            let da = frame.camera_position.distance_squared(a.model.w_axis.truncate());
            let db = frame.camera_position.distance_squared(b.model.w_axis.truncate());
            db.total_cmp(&da)
        });

        unsafe {
            gl.viewport(x, y, w, h);
            gl.scissor(x, y, w, h);
            gl.enable(glow::SCISSOR_TEST);

            let [r, g, b] = frame.background;
            gl.clear_color(r, g, b, 1.0);
            gl.clear(glow::COLOR_BUFFER_BIT | glow::DEPTH_BUFFER_BIT);

            gl.enable(glow::DEPTH_TEST);
            gl.depth_func(glow::LEQUAL);

            gl.use_program(Some(self.program));
            self.set_frame_uniforms(gl, frame);

            for draw in opaque {
                self.draw_node(gl, draw);
            }

            gl.enable(glow::BLEND);
            gl.blend_func(glow::SRC_ALPHA, glow::ONE_MINUS_SRC_ALPHA);
            gl.depth_mask(false);
            for draw in transparent {
                self.draw_node(gl, draw);
            }
            gl.depth_mask(true);
            gl.disable(glow::BLEND);

            gl.disable(glow::DEPTH_TEST);
            gl.disable(glow::SCISSOR_TEST);
            gl.use_program(None);
        }
    }

    /// Free one node's buffers
    pub fn dispose_node(&mut self, gl: &glow::Context, id: NodeId) {
        if let Some(mesh) = self.meshes.remove(&id) {
            delete_mesh(gl, &mesh);
        }
    }

    /// Free every mesh and the shader program
    pub fn destroy(&mut self, gl: &glow::Context) {
        for (_, mesh) in self.meshes.drain() {
            delete_mesh(gl, &mesh);
        }
        unsafe {
            gl.delete_program(self.program);
        }
        tracing::debug!("gl renderer destroyed");
    }

    fn set_frame_uniforms(&self, gl: &glow::Context, frame: &FrameSnapshot) {
        let p = self.program;
        set_uniform_mat4(gl, p, "u_view_proj", &frame.view_projection);
        set_uniform_vec3(gl, p, "u_camera_pos", frame.camera_position);
        set_uniform_vec3(gl, p, "u_ambient", frame.ambient);
        set_uniform_vec3(gl, p, "u_dir_light_dir", frame.directional_dir);
        set_uniform_vec3(gl, p, "u_dir_light_color", frame.directional);

        let count = frame.point_lights.len().min(MAX_POINT_LIGHTS);
        set_uniform_i32(gl, p, "u_point_count", count as i32);
        for (i, light) in frame.point_lights.iter().take(count).enumerate() {
            set_uniform_vec3(gl, p, &format!("u_point_pos[{i}]"), light.position);
            set_uniform_vec3(gl, p, &format!("u_point_color[{i}]"), light.radiance);
            set_uniform_f32(gl, p, &format!("u_point_range[{i}]"), light.range);
        }

        match frame.fog {
            Some(fog) => {
                set_uniform_i32(gl, p, "u_fog_enabled", 1);
                set_uniform_vec3(gl, p, "u_fog_color", Vec3::from(fog.color));
                set_uniform_f32(gl, p, "u_fog_near", fog.near);
                set_uniform_f32(gl, p, "u_fog_far", fog.far);
            }
            None => set_uniform_i32(gl, p, "u_fog_enabled", 0),
        }
    }

    unsafe fn draw_node(&self, gl: &glow::Context, draw: &NodeDraw) {
        let Some(mesh) = self.meshes.get(&draw.id) else {
            return;
        };
        set_uniform_mat4(gl, self.program, "u_model", &draw.model);
        set_uniform_f32(gl, self.program, "u_opacity", draw.opacity);
        set_uniform_vec3(gl, self.program, "u_emissive", draw.emissive);

        gl.bind_vertex_array(Some(mesh.vao));
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(mesh.ibo));
        gl.draw_elements(glow::TRIANGLES, mesh.index_count, glow::UNSIGNED_INT, 0);
        gl.bind_vertex_array(None);
    }
}

// ── GPU upload ───────────────────────────────────────────────

fn upload_mesh(gl: &glow::Context, data: &MeshData) -> Result<GpuMesh, String> {
    unsafe {
        let vao = gl.create_vertex_array()?;
        gl.bind_vertex_array(Some(vao));

        let vbo = gl.create_buffer()?;
        gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
        gl.buffer_data_u8_slice(glow::ARRAY_BUFFER, cast_slice(&data.vertices), glow::STATIC_DRAW);

        let stride = (VERTEX_STRIDE * 4) as i32;
        // position
        gl.enable_vertex_attrib_array(0);
        gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
        // normal
        gl.enable_vertex_attrib_array(1);
        gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 3 * 4);
        // color
        gl.enable_vertex_attrib_array(2);
        gl.vertex_attrib_pointer_f32(2, 3, glow::FLOAT, false, stride, 6 * 4);

        let ibo = gl.create_buffer()?;
        gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ibo));
        gl.buffer_data_u8_slice(glow::ELEMENT_ARRAY_BUFFER, cast_slice(&data.indices), glow::STATIC_DRAW);

        gl.bind_vertex_array(None);

        Ok(GpuMesh {
            vao,
            vbo,
            ibo,
            index_count: data.indices.len() as i32,
        })
    }
}

fn delete_mesh(gl: &glow::Context, mesh: &GpuMesh) {
    unsafe {
        gl.delete_vertex_array(mesh.vao);
        gl.delete_buffer(mesh.vbo);
        gl.delete_buffer(mesh.ibo);
    }
}

// ── Shader compilation ───────────────────────────────────────

fn compile_program(gl: &glow::Context, vert_src: &str, frag_src: &str) -> Result<glow::Program, String> {
    unsafe {
        let program = gl.create_program()?;

        let mut shaders = Vec::with_capacity(2);
        for (kind, src, label) in [
            (glow::VERTEX_SHADER, vert_src, "Vertex"),
            (glow::FRAGMENT_SHADER, frag_src, "Fragment"),
        ] {
            let shader = gl.create_shader(kind)?;
            gl.shader_source(shader, src);
            gl.compile_shader(shader);
            if !gl.get_shader_compile_status(shader) {
                let log = gl.get_shader_info_log(shader);
                tracing::error!("{label} shader error: {log}");
                return Err(format!("{label} shader failed to compile: {log}"));
            }
            gl.attach_shader(program, shader);
            shaders.push(shader);
        }

        gl.link_program(program);
        let linked = gl.get_program_link_status(program);
        for shader in shaders {
            gl.detach_shader(program, shader);
            gl.delete_shader(shader);
        }
        if !linked {
            let log = gl.get_program_info_log(program);
            tracing::error!("Program link error: {log}");
            gl.delete_program(program);
            return Err(format!("shader program failed to link: {log}"));
        }

        Ok(program)
    }
}

// ── Uniform setters ──────────────────────────────────────────

fn set_uniform_mat4(gl: &glow::Context, program: glow::Program, name: &str, mat: &Mat4) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_matrix_4_f32_slice(loc.as_ref(), false, &mat.to_cols_array());
    }
}

fn set_uniform_vec3(gl: &glow::Context, program: glow::Program, name: &str, v: Vec3) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_3_f32(loc.as_ref(), v.x, v.y, v.z);
    }
}

fn set_uniform_f32(gl: &glow::Context, program: glow::Program, name: &str, v: f32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_f32(loc.as_ref(), v);
    }
}

fn set_uniform_i32(gl: &glow::Context, program: glow::Program, name: &str, v: i32) {
    unsafe {
        let loc = gl.get_uniform_location(program, name);
        gl.uniform_1_i32(loc.as_ref(), v);
    }
}

fn cast_slice<T: Copy>(slice: &[T]) -> &[u8] {
    unsafe { std::slice::from_raw_parts(slice.as_ptr() as *const u8, std::mem::size_of_val(slice)) }
}

// ── Shaders ──────────────────────────────────────────────────

#[cfg(not(target_arch = "wasm32"))]
const SHADER_HEADER: &str = "#version 330 core\n";
#[cfg(target_arch = "wasm32")]
const SHADER_HEADER: &str = "#version 300 es\nprecision highp float;\n";

const MESH_VERT: &str = r#"
uniform mat4 u_view_proj;
uniform mat4 u_model;

layout(location = 0) in vec3 a_position;
layout(location = 1) in vec3 a_normal;
layout(location = 2) in vec3 a_color;

out vec3 v_world;
out vec3 v_normal;
out vec3 v_color;

void main() {
    vec4 world = u_model * vec4(a_position, 1.0);
    v_world = world.xyz;
    v_normal = mat3(u_model) * a_normal;
    v_color = a_color;
    gl_Position = u_view_proj * world;
}
"#;

const MESH_FRAG: &str = r#"
uniform vec3 u_camera_pos;
uniform vec3 u_ambient;
uniform vec3 u_dir_light_dir;
uniform vec3 u_dir_light_color;

uniform int u_point_count;
uniform vec3 u_point_pos[5];
uniform vec3 u_point_color[5];
uniform float u_point_range[5];

uniform float u_opacity;
uniform vec3 u_emissive;

uniform int u_fog_enabled;
uniform vec3 u_fog_color;
uniform float u_fog_near;
uniform float u_fog_far;

in vec3 v_world;
in vec3 v_normal;
in vec3 v_color;

out vec4 frag_color;

void main() {
    vec3 n = normalize(v_normal);
    vec3 light = u_ambient + u_dir_light_color * max(dot(n, -u_dir_light_dir), 0.0);

    for (int i = 0; i < 5; i++) {
        if (i >= u_point_count) break;
        vec3 to_light = u_point_pos[i] - v_world;
        float d = length(to_light);
        float falloff = clamp(1.0 - d / u_point_range[i], 0.0, 1.0);
        light += u_point_color[i] * max(dot(n, to_light / max(d, 1e-4)), 0.0) * falloff * falloff;
    }

    vec3 color = v_color * light + u_emissive;

    if (u_fog_enabled == 1) {
        float dist = length(v_world - u_camera_pos);
        float f = clamp((dist - u_fog_near) / (u_fog_far - u_fog_near), 0.0, 1.0);
        color = mix(color, u_fog_color, f);
    }

    frag_color = vec4(color, u_opacity);
}
"#;
