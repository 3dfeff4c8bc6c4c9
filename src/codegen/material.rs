//! Material construction statements.
//!
//! Three shapes are handled:
//! - file-backed materials (`.mtl`), parsed at runtime by `MTLLoader`;
//! - `ShaderMaterial`, whose shader sources may live in files and whose
//!   `time` uniform is driven from the animation clock;
//! - every other constructor, with texture and color slots rewritten from
//!   the static slot table.

use serde_json::{Map, Value};

use crate::codegen::document::EmitContext;
use crate::codegen::slots::{MaterialSlots, material_slots};
use crate::codegen::templates::time_uniform_update;
use crate::codegen::utils::{call_args, format_keyword_args, is_image_file, quote_js_string, value_literal};
use crate::color::color_constructor;
use crate::dsl::{Args, MaterialSpec};
use crate::error::{Result, TranspileError};
use crate::texture_cache::texture_files;

pub const SHADER_MATERIAL: &str = "ShaderMaterial";
const SHADER_KEYS: [&str; 2] = ["vertexShader", "fragmentShader"];

/// Variable holding the material of object `ident`.
pub fn material_var(ident: &str) -> String {
    format!("{ident}_material")
}

/// Emit the statements that create `<ident>_material`.
pub fn emit_material(ctx: &mut EmitContext, ident: &str, material: &MaterialSpec) -> Result<()> {
    match material {
        MaterialSpec::File { file } => emit_file_material(ctx, ident, file),
        MaterialSpec::Function {
            function,
            args,
            uses_glslify,
        } if function == SHADER_MATERIAL => emit_shader_material(ctx, ident, args, *uses_glslify),
        MaterialSpec::Function { function, args, .. } => {
            emit_standard_material(ctx, ident, function, args)
        }
    }
}

fn emit_file_material(ctx: &mut EmitContext, ident: &str, file: &str) -> Result<()> {
    let asset = ctx.embed(file)?;
    ctx.register_mtl_loader();
    ctx.register_obj_loader();

    let var = material_var(ident);
    ctx.out.line(format!("var {var} = MTL_LOADER.parse({asset}, \"\");"));
    ctx.out.line(format!("{var}.preload();"));
    ctx.out.line(format!("OBJ_LOADER.setMaterials({var});"));
    Ok(())
}

fn emit_shader_material(ctx: &mut EmitContext, ident: &str, args: &Args, uses_glslify: bool) -> Result<()> {
    let var = material_var(ident);
    let context = format!("{var} ({SHADER_MATERIAL})");
    let Args::Map(map) = args else {
        return Err(TranspileError::invalid_args(context, "ARGS must be a mapping"));
    };
    let mut map = map.clone();

    for key in SHADER_KEYS {
        let Some(source) = map.get(key).and_then(Value::as_str).map(str::to_string) else {
            continue;
        };
        // Sources without an entry point are taken to be file paths.
        let rendered = if source.contains("main()") {
            quote_js_string(&source)
        } else {
            let shader = ctx.embed(&source)?;
            if uses_glslify {
                let module = ctx.assets.module_path(&shader);
                if !ctx.glslify_files.contains(&module) {
                    ctx.glslify_files.push(module);
                }
            }
            shader
        };
        map.insert(key.to_string(), Value::String(rendered));
    }

    if let Some(uniforms) = map.get("uniforms").cloned() {
        let Value::Object(uniforms) = uniforms else {
            return Err(TranspileError::invalid_args(context, "uniforms must be a mapping"));
        };
        let rendered = render_uniforms(ctx, &var, &uniforms)?;
        map.insert("uniforms".to_string(), Value::String(rendered));
    }

    let extensions = match map.shift_remove("extensions") {
        None | Some(Value::Null) => Map::new(),
        Some(Value::Object(ext)) => ext,
        Some(_) => {
            return Err(TranspileError::invalid_args(context, "extensions must be a mapping"));
        }
    };

    ctx.out.line(format!(
        "var {var} = new THREE.{SHADER_MATERIAL}({{{}}});",
        format_keyword_args(&map)
    ));
    for (name, value) in &extensions {
        ctx.out.line(format!("{var}.extensions.{name} = {};", extension_literal(value)));
    }
    Ok(())
}

fn render_uniforms(ctx: &mut EmitContext, var: &str, uniforms: &Map<String, Value>) -> Result<String> {
    let mut parts = Vec::with_capacity(uniforms.len());
    for (name, value) in uniforms {
        let rendered = if name == "time" && value.is_null() {
            ctx.pending.add_frame_update(time_uniform_update(var));
            "0.0".to_string()
        } else if let Some(path) = value.as_str().filter(|p| is_image_file(&ctx.base_dir.join(p))) {
            ctx.texture(&[path])?
        } else {
            value_literal(value)
        };
        parts.push(format!("{name}: {{value: {rendered}}}"));
    }
    Ok(format!("{{{}}}", parts.join(",")))
}

fn extension_literal(value: &Value) -> String {
    match value {
        Value::String(s) if s.eq_ignore_ascii_case("true") || s.eq_ignore_ascii_case("false") => {
            s.to_ascii_lowercase()
        }
        other => value_literal(other),
    }
}

fn emit_standard_material(ctx: &mut EmitContext, ident: &str, function: &str, args: &Args) -> Result<()> {
    let var = material_var(ident);
    let rendered = match (args, material_slots(function)) {
        (Args::Map(map), Some(slots)) => call_args(&Args::Map(rewrite_slots(ctx, &var, slots, map)?)),
        (args, slots) => {
            if slots.is_none() {
                log::debug!("{function} has no slot table; arguments pass through unchanged");
            }
            call_args(args)
        }
    };
    ctx.out.line(format!("var {var} = new THREE.{function}({rendered});"));
    Ok(())
}

fn rewrite_slots(
    ctx: &mut EmitContext,
    var: &str,
    slots: &MaterialSlots,
    map: &Map<String, Value>,
) -> Result<Map<String, Value>> {
    let mut out = Map::new();
    for (key, value) in map {
        let rendered = if slots.is_texture(key) {
            let files = texture_files(value).ok_or_else(|| {
                TranspileError::invalid_args(
                    var,
                    format!("texture slot `{key}` expects a path or a list of paths"),
                )
            })?;
            Value::String(ctx.texture(files.as_slice())?)
        } else if slots.is_color(key) {
            Value::String(color_constructor(value)?)
        } else {
            value.clone()
        };
        out.insert(key.clone(), rendered);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::path::Path;

    fn ctx_in(dir: &Path) -> EmitContext {
        let mut ctx = EmitContext::new(dir, dir);
        ctx.out.mark_splice_point();
        ctx
    }

    fn function(function: &str, args: Value, uses_glslify: bool) -> MaterialSpec {
        let args = match args {
            Value::Object(map) => Args::Map(map),
            Value::Array(items) => Args::List(items),
            other => panic!("bad args {other}"),
        };
        MaterialSpec::Function {
            function: function.to_string(),
            args,
            uses_glslify,
        }
    }

    fn body(ctx: EmitContext) -> String {
        ctx.out.finish("")
    }

    #[test]
    fn standard_material_rewrites_color_and_texture_slots() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wood.png"), b"PNG").unwrap();
        let mut ctx = ctx_in(dir.path());

        let spec = function(
            "MeshPhongMaterial",
            json!({"color": "0xff0000", "map": "wood.png", "shininess": 30, "emissive": [0, 0, 1]}),
            false,
        );
        emit_material(&mut ctx, "box", &spec).unwrap();

        assert!(ctx.pending.imports().any(|l| l.contains("EXTRA_TEXTURE_0")));
        assert_eq!(
            body(ctx),
            "var box_material = new THREE.MeshPhongMaterial({color: new THREE.Color(0xff0000),map: EXTRA_TEXTURE_0,shininess: 30,emissive: new THREE.Color(0,0,1)});\n"
        );
    }

    #[test]
    fn unknown_material_passes_args_through() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        emit_material(&mut ctx, "m", &function("FancyMaterial", json!({"map": "x.png"}), false)).unwrap();
        emit_material(&mut ctx, "n", &function("MeshBasicMaterial", json!(["{color: 0x00ff00}"]), false))
            .unwrap();
        assert_eq!(
            body(ctx),
            "var m_material = new THREE.FancyMaterial({map: x.png});\nvar n_material = new THREE.MeshBasicMaterial({color: 0x00ff00});\n"
        );
    }

    #[test]
    fn shader_time_uniform_is_driven_per_frame() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        let spec = function(
            "ShaderMaterial",
            json!({
                "vertexShader": "void main() { gl_Position = vec4(0.0); }",
                "uniforms": {"time": null, "scale": 2.5},
            }),
            false,
        );
        emit_material(&mut ctx, "water", &spec).unwrap();

        let updates: Vec<&str> = ctx.pending.frame_updates().collect();
        assert_eq!(updates, ["water_material.uniforms.time.value = mixer.clip_action.time;"]);
        let text = body(ctx);
        assert!(text.contains("uniforms: {time: {value: 0.0},scale: {value: 2.5}}"));
        assert!(text.contains("vertexShader: \"void main() { gl_Position = vec4(0.0); }\""));
    }

    #[test]
    fn shader_files_are_embedded_and_glslify_recorded() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("wave.vert"), "void main() {}").unwrap();
        std::fs::write(dir.path().join("wave.frag"), "void main() {}").unwrap();
        let mut ctx = ctx_in(dir.path());
        let spec = function(
            "ShaderMaterial",
            json!({"vertexShader": "wave.vert", "fragmentShader": "wave.frag"}),
            true,
        );
        emit_material(&mut ctx, "sea", &spec).unwrap();

        assert_eq!(ctx.glslify_files.len(), 2);
        assert_eq!(ctx.pending.imports().count(), 2);
        assert_eq!(
            body(ctx),
            "var sea_material = new THREE.ShaderMaterial({vertexShader: EXTRA_FILE_0,fragmentShader: EXTRA_FILE_1});\n"
        );
    }

    #[test]
    fn shader_extensions_become_assignments() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        let spec = function(
            "ShaderMaterial",
            json!({"transparent": true, "extensions": {"derivatives": "True", "fragDepth": false}}),
            false,
        );
        emit_material(&mut ctx, "s", &spec).unwrap();
        assert_eq!(
            body(ctx),
            "var s_material = new THREE.ShaderMaterial({transparent: true});\ns_material.extensions.derivatives = true;\ns_material.extensions.fragDepth = false;\n"
        );
    }

    #[test]
    fn shader_uniform_image_becomes_texture() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("noise.png"), b"PNG").unwrap();
        let mut ctx = ctx_in(dir.path());
        let spec = function(
            "ShaderMaterial",
            json!({"uniforms": {"noise": "noise.png", "label": "missing.png"}}),
            false,
        );
        emit_material(&mut ctx, "s", &spec).unwrap();
        let text = body(ctx);
        assert!(text.contains("noise: {value: EXTRA_TEXTURE_0}"));
        assert!(text.contains("label: {value: missing.png}"));
    }

    #[test]
    fn shader_requires_mapping_args() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = ctx_in(dir.path());
        let err = emit_material(&mut ctx, "s", &function("ShaderMaterial", json!([1]), false)).unwrap_err();
        assert!(matches!(err, TranspileError::InvalidArguments { .. }));
    }

    #[test]
    fn file_material_registers_loaders() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("arm.mtl"), "newmtl arm\n").unwrap();
        let mut ctx = ctx_in(dir.path());
        let spec = MaterialSpec::File { file: "arm.mtl".to_string() };
        emit_material(&mut ctx, "arm", &spec).unwrap();

        let imports: Vec<&str> = ctx.pending.imports().collect();
        assert!(imports.iter().any(|l| l.contains("MTLLoader")));
        assert!(imports.iter().any(|l| l.contains("OBJLoader")));
        assert_eq!(
            body(ctx),
            "var arm_material = MTL_LOADER.parse(EXTRA_FILE_0, \"\");\narm_material.preload();\nOBJ_LOADER.setMaterials(arm_material);\n"
        );
    }
}
