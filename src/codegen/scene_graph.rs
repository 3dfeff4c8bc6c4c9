//! Object, light and scene-property statements.

use serde_json::Value;

use crate::codegen::document::EmitContext;
use crate::codegen::material::{emit_material, material_var};
use crate::codegen::utils::{call_args, format_positional_args, quote_js_string, sanitize_js_ident, value_literal};
use crate::color::color_constructor;
use crate::dsl::{GeometrySpec, LightNode, MaterialSpec, ObjectNode};
use crate::error::{Result, TranspileError};
use crate::texture_cache::CUBE_FACES;

fn keyframe_track_type(track: &str) -> &'static str {
    if track == "quaternion" {
        "QuaternionKeyframeTrack"
    } else {
        "VectorKeyframeTrack"
    }
}

/// Emit `node` attached to `parent`, then its children attached to it.
///
/// A node without geometry emits nothing for itself; its children are still
/// attached to its identifier.
pub fn emit_object(ctx: &mut EmitContext, name: &str, node: &ObjectNode, parent: &str) -> Result<()> {
    let ident = sanitize_js_ident(name);

    if let Some(geometry) = &node.geometry {
        log::debug!("emitting object {name} under {parent}");
        ctx.out.line(format!("// {name} object"));

        if let Some(material) = &node.material {
            emit_material(ctx, &ident, material)?;
        }
        let function_material = matches!(node.material, Some(MaterialSpec::Function { .. }));

        match geometry {
            GeometrySpec::Function { function, args } => {
                ctx.out.line(format!(
                    "var {ident}_geometry = new THREE.{function}({});",
                    call_args(args)
                ));
                if function_material {
                    ctx.out.line(format!(
                        "var {ident} = new THREE.Mesh({ident}_geometry, {});",
                        material_var(&ident)
                    ));
                } else {
                    ctx.out.line(format!("var {ident} = new THREE.Mesh({ident}_geometry);"));
                }
            }
            GeometrySpec::File { file } => {
                let asset = ctx.embed(file)?;
                ctx.register_obj_loader();
                if !node.material.as_ref().is_some_and(MaterialSpec::is_file) {
                    ctx.out.line("OBJ_LOADER.setMaterials(null);");
                }
                ctx.out.line(format!("var {ident} = OBJ_LOADER.parse({asset});"));
                if function_material {
                    ctx.out.line(format!(
                        "{ident}.traverse(function (child) {{ if (child.isMesh) {{ child.material = {}; }} }});",
                        material_var(&ident)
                    ));
                }
            }
        }

        ctx.out.line(format!("{ident}.name = {};", quote_js_string(name)));
        ctx.out.line(format!("{parent}.add({ident});"));
        ctx.out.line(format!("var {ident}_uuid = {ident}.uuid;"));
        ctx.out.line(format!("followable_objects.push({ident});"));
        ctx.out.blank();

        if !node.animations.is_empty() {
            ctx.out.line(format!("// {name} animations"));
            for (track, args) in &node.animations {
                ctx.out.line(format!(
                    "mixer.addKeyframeTrack(new THREE.{}({ident}_uuid + '.{track}', {}));",
                    keyframe_track_type(track),
                    format_positional_args(args)
                ));
            }
            ctx.out.blank();
        }
    } else if node.material.is_some() || !node.animations.is_empty() {
        log::warn!("object `{name}` has no GEOMETRY; its material and animations are skipped");
    }

    for (child_name, child) in &node.children {
        emit_object(ctx, child_name, child, &ident)?;
    }
    Ok(())
}

pub fn emit_light(ctx: &mut EmitContext, name: &str, light: &LightNode, parent: &str) -> Result<()> {
    let ident = sanitize_js_ident(name);
    log::debug!("emitting light {name}");

    ctx.out.line(format!("// {name} light"));
    ctx.out.line(format!(
        "var {ident} = new THREE.{}({});",
        light.function,
        call_args(&light.args)
    ));
    ctx.out.line(format!("{parent}.add({ident});"));
    if let Some(position) = &light.position {
        ctx.out.line(format!("{ident}.position.set({});", format_positional_args(position)));
    }
    ctx.out.blank();
    Ok(())
}

/// `scene.<prop> = ...;` for one `SCENE` entry.
pub fn emit_scene_prop(ctx: &mut EmitContext, prop: &str, value: &Value) -> Result<()> {
    if prop != "background" {
        ctx.out.line(format!("scene.{prop} = {};", value_literal(value)));
        return Ok(());
    }

    let rendered = match value {
        Value::Array(faces) if faces.len() == CUBE_FACES => {
            let files = faces
                .iter()
                .map(|face| {
                    face.as_str().ok_or_else(|| {
                        TranspileError::invalid_args("SCENE.background", "cube faces must be file paths")
                    })
                })
                .collect::<Result<Vec<_>>>()?;
            ctx.texture(files.as_slice())?
        }
        // Any string with a dot is taken to be an image path.
        Value::String(s) if s.contains('.') => ctx.texture(&[s.as_str()])?,
        other => color_constructor(other)?,
    };
    ctx.out.line(format!("scene.background = {rendered};"));
    Ok(())
}
