//! `UsdPreviewSurface` shading networks.
//!
//! A preview shader carries four channels. Channels listed in a
//! [`TextureAssignments`] map are driven by a `UsdUVTexture` node reading
//! the `st` primvar:
//!
//! ```text
//! generic_primvar_reader_st.outputs:result
//!     -> generic_texture_<channel>.inputs:st
//! generic_texture_<channel>.outputs:rgb | outputs:r
//!     -> <shader>.inputs:<channel>
//! <shader>.outputs:surface
//!     -> <material>.outputs:surface
//! ```

use std::collections::BTreeMap;

use glam::Vec3;
use rand::Rng;
use vfxi_usd::{Material, Output, Shader, Stage, StageResult, Value, ValueType};

/// Channel name to texture file.
pub type TextureAssignments = BTreeMap<String, String>;

/// How a texture feeds a channel.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ChannelKind {
    /// Read `rgb` as `color3f`.
    Color,
    /// Read `r` as `float`.
    Float,
}

impl ChannelKind {
    fn output(self) -> (&'static str, ValueType) {
        match self {
            ChannelKind::Color => ("rgb", ValueType::Color3f),
            ChannelKind::Float => ("r", ValueType::Float),
        }
    }
}

struct PreviewChannel {
    name: &'static str,
    kind: ChannelKind,
    value_type: ValueType,
    default: Value,
}

fn preview_channels<R: Rng>(rng: &mut R) -> [PreviewChannel; 4] {
    let diffuse = Vec3::new(rng.gen(), rng.gen(), rng.gen());
    [
        PreviewChannel {
            name: "diffuseColor",
            kind: ChannelKind::Color,
            value_type: ValueType::Color3f,
            default: Value::Float3(diffuse),
        },
        PreviewChannel {
            name: "specularColor",
            kind: ChannelKind::Color,
            value_type: ValueType::Color3f,
            default: Value::Float3(Vec3::ONE),
        },
        PreviewChannel {
            name: "roughness",
            kind: ChannelKind::Float,
            value_type: ValueType::Float,
            default: Value::Float(0.2),
        },
        PreviewChannel {
            name: "clearcoatRoughness",
            kind: ChannelKind::Float,
            value_type: ValueType::Float,
            default: Value::Float(0.1),
        },
    ]
}

/// Define a `UsdPrimvarReader_<type>` node named
/// `generic_primvar_reader_<varname>` under `material`.
///
/// Only `float2` readers get a fallback and a `result` output; other types
/// return `None`.
pub fn add_readprimvar_shader(
    stage: &mut Stage,
    material: &Material,
    varname: &str,
    value_type: ValueType,
) -> StageResult<Option<Output>> {
    let path = material
        .path()
        .append_child(&format!("generic_primvar_reader_{varname}"))?;
    let shader = Shader::define(stage, &path)?;
    shader.create_id_attr(stage, &format!("UsdPrimvarReader_{}", value_type.keyword()))?;
    shader
        .create_input(stage, "varname", ValueType::Token)?
        .set(stage, Value::Token(varname.to_string()))?;

    if value_type != ValueType::Float2 {
        return Ok(None);
    }
    shader
        .create_input(stage, "fallback", ValueType::Float2)?
        .set(stage, glam::Vec2::ZERO)?;
    let result = shader.create_output(stage, "result", ValueType::Float2)?;
    Ok(Some(result))
}

/// Define a `UsdUVTexture` node named `generic_texture_<channel>` reading
/// `file` through the `st` primvar.
pub fn add_readtexture_shader(
    stage: &mut Stage,
    material: &Material,
    channel: &str,
    kind: ChannelKind,
    file: &str,
) -> StageResult<Output> {
    let path = material
        .path()
        .append_child(&format!("generic_texture_{channel}"))?;
    let shader = Shader::define(stage, &path)?;
    shader.create_id_attr(stage, "UsdUVTexture")?;
    shader
        .create_input(stage, "file", ValueType::Asset)?
        .set(stage, Value::Asset(file.to_string()))?;

    let st = shader.create_input(stage, "st", ValueType::Float2)?;
    if let Some(reader) = add_readprimvar_shader(stage, material, "st", ValueType::Float2)? {
        st.connect_to_source(stage, &reader)?;
    }

    let (output, value_type) = kind.output();
    shader.create_output(stage, output, value_type)
}

/// Define a `UsdPreviewSurface` shader under `material` and connect it to
/// the material's universal surface output.
///
/// `diffuseColor` defaults to a color drawn from `rng`.
pub fn build_preview_shader<R: Rng>(
    stage: &mut Stage,
    material: &Material,
    name: &str,
    textures: &TextureAssignments,
    rng: &mut R,
) -> StageResult<Shader> {
    let shader = Shader::define(stage, &material.path().append_child(name)?)?;
    shader.create_id_attr(stage, "UsdPreviewSurface")?;

    for channel in preview_channels(rng) {
        let input = shader.create_input(stage, channel.name, channel.value_type)?;
        input.set(stage, channel.default)?;

        if let Some(file) = textures.get(channel.name).filter(|f| !f.is_empty()) {
            let texture = add_readtexture_shader(stage, material, channel.name, channel.kind, file)?;
            input.connect_to_source(stage, &texture)?;
        }
    }

    let surface = shader.create_output(stage, "surface", ValueType::Token)?;
    material
        .create_surface_output(stage, None)?
        .connect_to_source(stage, &surface)?;

    log::debug!("Built preview shader {}", shader.path());
    Ok(shader)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vfxi_usd::Path;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    fn material(stage: &mut Stage) -> Material {
        Material::define(stage, &p("/Asset/mtl/clay")).unwrap()
    }

    #[test]
    fn test_preview_shader_channels() {
        let mut stage = Stage::create_in_memory();
        let material = material(&mut stage);
        let mut rng = StdRng::seed_from_u64(123);

        let shader =
            build_preview_shader(&mut stage, &material, "preview", &TextureAssignments::new(), &mut rng)
                .unwrap();

        assert_eq!(shader.id(&stage).as_deref(), Some("UsdPreviewSurface"));
        let prim = stage.get_prim(shader.path()).unwrap();
        assert_eq!(
            prim.attribute_value("inputs:specularColor"),
            Some(Value::Float3(Vec3::ONE))
        );
        assert_eq!(prim.attribute_value("inputs:roughness"), Some(Value::Float(0.2)));
        assert_eq!(
            prim.attribute_value("inputs:clearcoatRoughness"),
            Some(Value::Float(0.1))
        );

        let Some(Value::Float3(diffuse)) = prim.attribute_value("inputs:diffuseColor") else {
            panic!("diffuseColor not authored");
        };
        assert!(diffuse.cmpge(Vec3::ZERO).all() && diffuse.cmplt(Vec3::ONE).all());

        assert_eq!(
            stage
                .get_prim(material.path())
                .unwrap()
                .connections("outputs:surface"),
            vec![p("/Asset/mtl/clay/preview.outputs:surface")]
        );
        // No texture nodes without assignments.
        assert_eq!(stage.get_prim(material.path()).unwrap().child_names(), vec!["preview"]);
    }

    #[test]
    fn test_seeded_colors_repeat() {
        let mut a = Stage::create_in_memory();
        let mut b = Stage::create_in_memory();
        let mat_a = material(&mut a);
        let mat_b = material(&mut b);
        let none = TextureAssignments::new();

        build_preview_shader(&mut a, &mat_a, "s", &none, &mut StdRng::seed_from_u64(123)).unwrap();
        build_preview_shader(&mut b, &mat_b, "s", &none, &mut StdRng::seed_from_u64(123)).unwrap();

        let attr = p("/Asset/mtl/clay/s.inputs:diffuseColor");
        assert_eq!(a.attribute(&attr).unwrap().default, b.attribute(&attr).unwrap().default);
    }

    #[test]
    fn test_textured_channels() {
        let mut stage = Stage::create_in_memory();
        let material = material(&mut stage);
        let mut textures = TextureAssignments::new();
        textures.insert("diffuseColor".into(), "textures/clay_diff.png".into());
        textures.insert("roughness".into(), "textures/clay_rough.png".into());

        build_preview_shader(&mut stage, &material, "preview", &textures, &mut StdRng::seed_from_u64(1))
            .unwrap();

        let shader = stage.get_prim(&p("/Asset/mtl/clay/preview")).unwrap();
        assert_eq!(
            shader.connections("inputs:diffuseColor"),
            vec![p("/Asset/mtl/clay/generic_texture_diffuseColor.outputs:rgb")]
        );
        assert_eq!(
            shader.connections("inputs:roughness"),
            vec![p("/Asset/mtl/clay/generic_texture_roughness.outputs:r")]
        );
        assert!(shader.connections("inputs:specularColor").is_empty());

        let texture = stage
            .get_prim(&p("/Asset/mtl/clay/generic_texture_roughness"))
            .unwrap();
        assert_eq!(texture.attribute_value("info:id"), Some(Value::Token("UsdUVTexture".into())));
        assert_eq!(
            texture.attribute_value("inputs:file"),
            Some(Value::Asset("textures/clay_rough.png".into()))
        );
        assert_eq!(
            texture.connections("inputs:st"),
            vec![p("/Asset/mtl/clay/generic_primvar_reader_st.outputs:result")]
        );
        assert_eq!(
            texture.attribute("outputs:r").unwrap().value_type,
            ValueType::Float
        );

        // Both textures share one st reader.
        let children = stage.get_prim(material.path()).unwrap().child_names();
        assert_eq!(children.iter().filter(|c| c.starts_with("generic_primvar_reader")).count(), 1);
    }

    #[test]
    fn test_primvar_reader() {
        let mut stage = Stage::create_in_memory();
        let material = material(&mut stage);

        let output = add_readprimvar_shader(&mut stage, &material, "st", ValueType::Float2)
            .unwrap()
            .unwrap();
        assert_eq!(output.base_name(), "result");

        let reader = stage
            .get_prim(&p("/Asset/mtl/clay/generic_primvar_reader_st"))
            .unwrap();
        assert_eq!(
            reader.attribute_value("info:id"),
            Some(Value::Token("UsdPrimvarReader_float2".into()))
        );
        assert_eq!(reader.attribute_value("inputs:varname"), Some(Value::Token("st".into())));
        assert_eq!(
            reader.attribute_value("inputs:fallback"),
            Some(Value::Float2(glam::Vec2::ZERO))
        );

        let other = add_readprimvar_shader(&mut stage, &material, "displayColor", ValueType::Float3).unwrap();
        assert!(other.is_none());
        let reader = stage
            .get_prim(&p("/Asset/mtl/clay/generic_primvar_reader_displayColor"))
            .unwrap();
        assert!(!reader.has_attribute("inputs:fallback"));
    }
}
