use std::borrow::Cow;

use anyhow::{anyhow, Context, Result};
use wavefield::ShadingProgram;
use wgpu::naga::front::glsl::{Frontend, Options};
use wgpu::naga::valid::{Capabilities, ValidationFlags, Validator};
use wgpu::naga::ShaderStage;

/// The vertex and fragment modules of a compiled shading program.
pub(crate) struct ProgramModules {
    pub vertex: wgpu::ShaderModule,
    pub fragment: wgpu::ShaderModule,
}

/// Parses and validates GLSL with naga before handing it to the device.
///
/// `wgpu` reports invalid modules through the device error callback, which
/// aborts by default; checking up front turns those into ordinary errors.
pub(crate) fn validate_glsl(source: &str, stage: ShaderStage) -> Result<()> {
    let module = Frontend::default()
        .parse(&Options::from(stage), source)
        .map_err(|err| anyhow!("{stage:?} shader failed to parse: {err}"))?;
    Validator::new(ValidationFlags::all(), Capabilities::all())
        .validate(&module)
        .map_err(|err| anyhow!("{stage:?} shader failed validation: {err}"))?;
    Ok(())
}

fn compile_stage(
    device: &wgpu::Device,
    label: &str,
    source: &'static str,
    stage: ShaderStage,
) -> Result<wgpu::ShaderModule> {
    validate_glsl(source, stage).with_context(|| format!("invalid {label}"))?;

    device.push_error_scope(wgpu::ErrorFilter::Validation);
    let module = device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Glsl {
            shader: Cow::Borrowed(source),
            stage,
            defines: &[],
        },
    });
    if let Some(err) = pollster::block_on(device.pop_error_scope()) {
        return Err(anyhow!("device rejected {label}: {err}"));
    }
    Ok(module)
}

/// Compiles both stages of `program` for `device`.
pub(crate) fn compile_program(
    device: &wgpu::Device,
    program: &dyn ShadingProgram,
) -> Result<ProgramModules> {
    let vertex_label = format!("{} vertex", program.name());
    let fragment_label = format!("{} fragment", program.name());
    let vertex = compile_stage(
        device,
        &vertex_label,
        program.vertex_glsl(),
        ShaderStage::Vertex,
    )?;
    let fragment = compile_stage(
        device,
        &fragment_label,
        program.fragment_glsl(),
        ShaderStage::Fragment,
    )?;
    tracing::debug!(program = program.name(), "compiled shading program");
    Ok(ProgramModules { vertex, fragment })
}
