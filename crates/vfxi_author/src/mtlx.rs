//! MaterialX `standard_surface` shading networks.
//!
//! Channel names and defaults follow the MaterialX 1.38 `standard_surface`
//! definition. The shader connects to the material's `mtlx` render context
//! terminal (`outputs:mtlx:surface`).

use glam::Vec3;
use vfxi_usd::{Material, Output, Shader, Stage, StageResult, Value, ValueType};

use crate::preview::TextureAssignments;

pub const STANDARD_SURFACE_ID: &str = "ND_standard_surface_surfaceshader";
pub const MTLX_RENDER_CONTEXT: &str = "mtlx";

#[derive(Clone, Copy, Debug)]
enum ChannelDefault {
    Float(f32),
    Color(f32, f32, f32),
    Bool(bool),
}

impl ChannelDefault {
    fn value_type(self) -> ValueType {
        match self {
            ChannelDefault::Float(_) => ValueType::Float,
            ChannelDefault::Color(..) => ValueType::Color3f,
            ChannelDefault::Bool(_) => ValueType::Bool,
        }
    }

    fn value(self) -> Value {
        match self {
            ChannelDefault::Float(v) => Value::Float(v),
            ChannelDefault::Color(r, g, b) => Value::Float3(Vec3::new(r, g, b)),
            ChannelDefault::Bool(v) => Value::Bool(v),
        }
    }
}

const WHITE: ChannelDefault = ChannelDefault::Color(1.0, 1.0, 1.0);

/// `standard_surface` inputs in declaration order.
const STANDARD_SURFACE_CHANNELS: &[(&str, ChannelDefault)] = &[
    ("base", ChannelDefault::Float(1.0)),
    ("base_color", ChannelDefault::Color(0.8, 0.8, 0.8)),
    ("diffuse_roughness", ChannelDefault::Float(0.0)),
    ("specular", ChannelDefault::Float(1.0)),
    ("specular_color", WHITE),
    ("specular_roughness", ChannelDefault::Float(0.2)),
    ("specular_IOR", ChannelDefault::Float(1.5)),
    ("specular_anisotropy", ChannelDefault::Float(0.0)),
    ("specular_rotation", ChannelDefault::Float(0.0)),
    ("metalness", ChannelDefault::Float(0.0)),
    ("transmission", ChannelDefault::Float(0.0)),
    ("transmission_color", WHITE),
    ("transmission_depth", ChannelDefault::Float(0.0)),
    ("transmission_scatter", ChannelDefault::Color(0.0, 0.0, 0.0)),
    ("transmission_scatter_anisotropy", ChannelDefault::Float(0.0)),
    ("transmission_dispersion", ChannelDefault::Float(0.0)),
    ("transmission_extra_roughness", ChannelDefault::Float(0.0)),
    ("subsurface", ChannelDefault::Float(0.0)),
    ("subsurface_color", WHITE),
    ("subsurface_radius", WHITE),
    ("subsurface_scale", ChannelDefault::Float(1.0)),
    ("subsurface_anisotropy", ChannelDefault::Float(0.0)),
    ("sheen", ChannelDefault::Float(0.0)),
    ("sheen_color", WHITE),
    ("sheen_roughness", ChannelDefault::Float(0.3)),
    ("coat", ChannelDefault::Float(0.0)),
    ("coat_color", WHITE),
    ("coat_roughness", ChannelDefault::Float(0.1)),
    ("coat_anisotropy", ChannelDefault::Float(0.0)),
    ("coat_rotation", ChannelDefault::Float(0.0)),
    ("coat_IOR", ChannelDefault::Float(1.5)),
    ("coat_affect_color", ChannelDefault::Float(0.0)),
    ("coat_affect_roughness", ChannelDefault::Float(0.0)),
    ("thin_film_thickness", ChannelDefault::Float(0.0)),
    ("thin_film_IOR", ChannelDefault::Float(1.5)),
    ("emission", ChannelDefault::Float(0.0)),
    ("emission_color", WHITE),
    ("opacity", WHITE),
    ("thin_walled", ChannelDefault::Bool(false)),
];

/// Define an `ND_image_<type>` node named `mtlx_texture_<channel>` reading
/// `file`, with an `out` output of `value_type`.
pub fn add_mtlx_image(
    stage: &mut Stage,
    material: &Material,
    channel: &str,
    value_type: ValueType,
    file: &str,
) -> StageResult<Output> {
    let path = material
        .path()
        .append_child(&format!("mtlx_texture_{channel}"))?;
    let shader = Shader::define(stage, &path)?;
    shader.create_id_attr(stage, &format!("ND_image_{}", value_type.mtlx_name()))?;
    shader
        .create_input(stage, "file", ValueType::Asset)?
        .set(stage, Value::Asset(file.to_string()))?;
    shader.create_output(stage, "out", value_type)
}

/// Define a MaterialX `standard_surface` shader under `material` and connect
/// it to `outputs:mtlx:surface`.
pub fn build_mtlx_standard_surface(
    stage: &mut Stage,
    material: &Material,
    name: &str,
    textures: &TextureAssignments,
) -> StageResult<Shader> {
    let shader = Shader::define(stage, &material.path().append_child(name)?)?;
    shader.create_id_attr(stage, STANDARD_SURFACE_ID)?;

    for &(channel, default) in STANDARD_SURFACE_CHANNELS {
        let value_type = default.value_type();
        let input = shader.create_input(stage, channel, value_type)?;
        input.set(stage, default.value())?;

        if let Some(file) = textures.get(channel).filter(|f| !f.is_empty()) {
            let image = add_mtlx_image(stage, material, channel, value_type, file)?;
            input.connect_to_source(stage, &image)?;
        }
    }

    let surface = shader.create_output(stage, "surface", ValueType::Token)?;
    material
        .create_surface_output(stage, Some(MTLX_RENDER_CONTEXT))?
        .connect_to_source(stage, &surface)?;

    log::debug!("Built MaterialX standard_surface {}", shader.path());
    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use vfxi_usd::Path;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_channel_table() {
        assert_eq!(STANDARD_SURFACE_CHANNELS.len(), 39);
        let mut names: Vec<_> = STANDARD_SURFACE_CHANNELS.iter().map(|(n, _)| *n).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), STANDARD_SURFACE_CHANNELS.len());
    }

    #[test]
    fn test_standard_surface_defaults() {
        let mut stage = Stage::create_in_memory();
        let material = Material::define(&mut stage, &p("/mtl/steel")).unwrap();
        let shader =
            build_mtlx_standard_surface(&mut stage, &material, "mtlx", &TextureAssignments::new()).unwrap();

        assert_eq!(shader.id(&stage).as_deref(), Some(STANDARD_SURFACE_ID));
        let prim = stage.get_prim(shader.path()).unwrap();
        assert_eq!(prim.attribute_value("inputs:base"), Some(Value::Float(1.0)));
        assert_eq!(
            prim.attribute_value("inputs:base_color"),
            Some(Value::Float3(Vec3::splat(0.8)))
        );
        assert_eq!(prim.attribute_value("inputs:specular_IOR"), Some(Value::Float(1.5)));
        assert_eq!(prim.attribute_value("inputs:thin_walled"), Some(Value::Bool(false)));
        assert_eq!(
            prim.attribute("inputs:opacity").unwrap().value_type,
            ValueType::Color3f
        );

        let material_prim = stage.get_prim(material.path()).unwrap();
        assert_eq!(
            material_prim.connections("outputs:mtlx:surface"),
            vec![p("/mtl/steel/mtlx.outputs:surface")]
        );
        assert!(!material_prim.has_attribute("outputs:surface"));
    }

    #[test]
    fn test_textured_channels_use_images() {
        let mut stage = Stage::create_in_memory();
        let material = Material::define(&mut stage, &p("/mtl/steel")).unwrap();
        let mut textures = TextureAssignments::new();
        textures.insert("base_color".into(), "textures/steel_diff.exr".into());
        textures.insert("specular_roughness".into(), "textures/steel_rough.exr".into());

        build_mtlx_standard_surface(&mut stage, &material, "mtlx", &textures).unwrap();

        let color = stage.get_prim(&p("/mtl/steel/mtlx_texture_base_color")).unwrap();
        assert_eq!(color.attribute_value("info:id"), Some(Value::Token("ND_image_color3".into())));
        assert_eq!(color.attribute("outputs:out").unwrap().value_type, ValueType::Color3f);

        let rough = stage
            .get_prim(&p("/mtl/steel/mtlx_texture_specular_roughness"))
            .unwrap();
        assert_eq!(rough.attribute_value("info:id"), Some(Value::Token("ND_image_float".into())));
        assert_eq!(
            rough.attribute_value("inputs:file"),
            Some(Value::Asset("textures/steel_rough.exr".into()))
        );

        let shader = stage.get_prim(&p("/mtl/steel/mtlx")).unwrap();
        assert_eq!(
            shader.connections("inputs:specular_roughness"),
            vec![p("/mtl/steel/mtlx_texture_specular_roughness.outputs:out")]
        );
    }
}
