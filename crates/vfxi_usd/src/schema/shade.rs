//! `UsdShade` materials, shaders and their connectable properties.

use crate::error::StageResult;
use crate::path::Path;
use crate::stage::Stage;
use crate::value::{Value, ValueType};

/// Shader input (`inputs:<name>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Input {
    attr: Path,
}

/// Shader or material output (`outputs:<name>`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Output {
    attr: Path,
}

impl Input {
    pub fn attr_path(&self) -> &Path {
        &self.attr
    }

    /// Base name without the `inputs:` namespace.
    pub fn base_name(&self) -> &str {
        self.attr.name().trim_start_matches("inputs:")
    }

    pub fn set(&self, stage: &mut Stage, value: impl Into<Value>) -> StageResult<()> {
        stage.set_attribute(&self.attr, value.into())
    }

    pub fn get(&self, stage: &Stage) -> Option<Value> {
        stage.attribute(&self.attr)?.default
    }

    pub fn connect_to_source(&self, stage: &mut Stage, source: &Output) -> StageResult<()> {
        stage.connect_attribute(&self.attr, source.attr_path())
    }

    pub fn connected_sources(&self, stage: &Stage) -> Vec<Path> {
        stage
            .attribute(&self.attr)
            .map(|a| a.connections)
            .unwrap_or_default()
    }
}

impl Output {
    pub fn attr_path(&self) -> &Path {
        &self.attr
    }

    /// Base name without the `outputs:` namespace.
    pub fn base_name(&self) -> &str {
        self.attr.name().trim_start_matches("outputs:")
    }

    /// Path of the prim that owns this output.
    pub fn prim_path(&self) -> Path {
        self.attr.prim_path()
    }

    /// Material terminals connect to shader outputs.
    pub fn connect_to_source(&self, stage: &mut Stage, source: &Output) -> StageResult<()> {
        stage.connect_attribute(&self.attr, source.attr_path())
    }

    pub fn connected_sources(&self, stage: &Stage) -> Vec<Path> {
        stage
            .attribute(&self.attr)
            .map(|a| a.connections)
            .unwrap_or_default()
    }
}

fn create_input(stage: &mut Stage, prim: &Path, name: &str, ty: ValueType) -> StageResult<Input> {
    let attr = stage.create_attribute(prim, &format!("inputs:{name}"), ty, false)?;
    Ok(Input { attr })
}

fn create_output(stage: &mut Stage, prim: &Path, name: &str, ty: ValueType) -> StageResult<Output> {
    let attr = stage.create_attribute(prim, &format!("outputs:{name}"), ty, false)?;
    Ok(Output { attr })
}

/// A shading node identified by `info:id`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Shader {
    path: Path,
}

impl Shader {
    pub const TYPE_NAME: &'static str = "Shader";

    pub fn define(stage: &mut Stage, path: &Path) -> StageResult<Self> {
        stage.define_prim(path, Self::TYPE_NAME)?;
        Ok(Self { path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Author `uniform token info:id`.
    pub fn create_id_attr(&self, stage: &mut Stage, id: &str) -> StageResult<()> {
        let attr = stage.create_attribute(&self.path, "info:id", ValueType::Token, true)?;
        stage.set_attribute(&attr, Value::Token(id.to_string()))
    }

    pub fn id(&self, stage: &Stage) -> Option<String> {
        stage
            .get_prim(&self.path)?
            .attribute_value("info:id")?
            .as_str()
            .map(str::to_string)
    }

    pub fn create_input(&self, stage: &mut Stage, name: &str, ty: ValueType) -> StageResult<Input> {
        create_input(stage, &self.path, name, ty)
    }

    pub fn create_output(&self, stage: &mut Stage, name: &str, ty: ValueType) -> StageResult<Output> {
        create_output(stage, &self.path, name, ty)
    }

    /// Existing input, if declared.
    pub fn input(&self, stage: &Stage, name: &str) -> Option<Input> {
        let attr = self.path.append_property(&format!("inputs:{name}")).ok()?;
        stage.attribute(&attr).map(|_| Input { attr })
    }

    /// Existing output, if declared.
    pub fn output(&self, stage: &Stage, name: &str) -> Option<Output> {
        let attr = self.path.append_property(&format!("outputs:{name}")).ok()?;
        stage.attribute(&attr).map(|_| Output { attr })
    }
}

/// A material: a container of shaders with surface terminals.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Material {
    path: Path,
}

impl Material {
    pub const TYPE_NAME: &'static str = "Material";

    pub fn define(stage: &mut Stage, path: &Path) -> StageResult<Self> {
        stage.define_prim(path, Self::TYPE_NAME)?;
        Ok(Self { path: path.clone() })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// `outputs:surface` for the universal render context, or
    /// `outputs:<context>:surface` otherwise.
    pub fn create_surface_output(&self, stage: &mut Stage, render_context: Option<&str>) -> StageResult<Output> {
        let name = surface_output_name(render_context);
        create_output(stage, &self.path, &name, ValueType::Token)
    }

    pub fn surface_output(&self, stage: &Stage, render_context: Option<&str>) -> Option<Output> {
        let name = surface_output_name(render_context);
        let attr = self.path.append_property(&format!("outputs:{name}")).ok()?;
        stage.attribute(&attr).map(|_| Output { attr })
    }
}

fn surface_output_name(render_context: Option<&str>) -> String {
    match render_context {
        Some(context) if !context.is_empty() => format!("{context}:surface"),
        _ => "surface".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(s: &str) -> Path {
        Path::parse(s).unwrap()
    }

    #[test]
    fn test_shader_id_inputs_outputs() {
        let mut stage = Stage::create_in_memory();
        let shader = Shader::define(&mut stage, &p("/Mat/Surface")).unwrap();
        shader.create_id_attr(&mut stage, "UsdPreviewSurface").unwrap();

        let roughness = shader
            .create_input(&mut stage, "roughness", ValueType::Float)
            .unwrap();
        roughness.set(&mut stage, 0.2f32).unwrap();
        let surface = shader
            .create_output(&mut stage, "surface", ValueType::Token)
            .unwrap();

        assert_eq!(shader.id(&stage).as_deref(), Some("UsdPreviewSurface"));
        assert_eq!(roughness.base_name(), "roughness");
        assert_eq!(roughness.get(&stage), Some(Value::Float(0.2)));
        assert_eq!(surface.attr_path().as_str(), "/Mat/Surface.outputs:surface");
        assert!(shader.input(&stage, "roughness").is_some());
        assert!(shader.input(&stage, "metalness").is_none());

        let id = stage.attribute(&p("/Mat/Surface.info:id")).unwrap();
        assert!(id.uniform);
    }

    #[test]
    fn test_input_type_mismatch() {
        let mut stage = Stage::create_in_memory();
        let shader = Shader::define(&mut stage, &p("/S")).unwrap();
        let input = shader
            .create_input(&mut stage, "roughness", ValueType::Float)
            .unwrap();
        assert!(input.set(&mut stage, true).is_err());
    }

    #[test]
    fn test_material_surface_outputs() {
        let mut stage = Stage::create_in_memory();
        let material = Material::define(&mut stage, &p("/Looks/Mat")).unwrap();
        let shader = Shader::define(&mut stage, &p("/Looks/Mat/Surface")).unwrap();
        let shader_out = shader
            .create_output(&mut stage, "surface", ValueType::Token)
            .unwrap();

        let universal = material.create_surface_output(&mut stage, None).unwrap();
        let mtlx = material
            .create_surface_output(&mut stage, Some("mtlx"))
            .unwrap();
        assert_eq!(universal.base_name(), "surface");
        assert_eq!(mtlx.base_name(), "mtlx:surface");

        mtlx.connect_to_source(&mut stage, &shader_out).unwrap();
        assert_eq!(
            material
                .surface_output(&stage, Some("mtlx"))
                .unwrap()
                .connected_sources(&stage),
            vec![p("/Looks/Mat/Surface.outputs:surface")]
        );
        assert!(universal.connected_sources(&stage).is_empty());
        assert_eq!(shader_out.prim_path(), p("/Looks/Mat/Surface"));
    }
}
