//! Code generation: from a loaded [`SceneDocument`](crate::dsl::SceneDocument)
//! to a three.js program plus its generated asset modules.

pub mod document;
pub mod material;
pub mod scene_graph;
pub mod slots;
pub mod templates;
pub mod utils;

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::dsl::load_scene_document;
use crate::error::{Result, TranspileError};
use document::{EmitContext, assemble};

/// Written next to the program; lists what the bundling step needs.
pub const MANIFEST_FILE_NAME: &str = "sihm-manifest.json";

#[derive(Debug, Clone)]
pub struct TranspileOptions {
    pub config_path: PathBuf,
    pub output_file: PathBuf,
    /// Directory asset paths are resolved against. Defaults to the config
    /// file's directory.
    pub base_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Serialize)]
pub struct TranspileReport {
    pub output_file: PathBuf,
    pub generated_files: Vec<PathBuf>,
    pub extra_modules: BTreeSet<String>,
    pub glslify_files: Vec<PathBuf>,
}

fn parent_or_cwd(path: &Path) -> PathBuf {
    match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p.to_path_buf(),
        _ => PathBuf::from("."),
    }
}

fn write_file(path: &Path, contents: &str) -> Result<()> {
    std::fs::write(path, contents).map_err(|source| TranspileError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Load the config, emit the program and its asset modules, and write the
/// manifest. Generated modules land in the output file's directory.
pub fn transpile(opts: &TranspileOptions) -> Result<TranspileReport> {
    let doc = load_scene_document(&opts.config_path)?;

    let base_dir = opts
        .base_dir
        .clone()
        .unwrap_or_else(|| parent_or_cwd(&opts.config_path));
    let out_dir = parent_or_cwd(&opts.output_file);
    std::fs::create_dir_all(&out_dir).map_err(|source| TranspileError::Write {
        path: out_dir.clone(),
        source,
    })?;

    let mut ctx = EmitContext::new(&base_dir, &out_dir);
    let program = assemble(&doc, &mut ctx)?;
    write_file(&opts.output_file, &program)?;
    log::info!("wrote {}", opts.output_file.display());

    let report = TranspileReport {
        output_file: opts.output_file.clone(),
        generated_files: ctx.generated_files(),
        extra_modules: doc.sihm.extra_modules.clone(),
        glslify_files: ctx.glslify_files.clone(),
    };
    let manifest_path = out_dir.join(MANIFEST_FILE_NAME);
    let manifest = serde_json::to_string_pretty(&report).map_err(|e| TranspileError::Write {
        path: manifest_path.clone(),
        source: std::io::Error::other(e),
    })?;
    write_file(&manifest_path, &manifest)?;

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_file_name_uses_current_dir() {
        assert_eq!(parent_or_cwd(Path::new("scene.js")), PathBuf::from("."));
        assert_eq!(parent_or_cwd(Path::new("out/scene.js")), PathBuf::from("out"));
    }

    #[test]
    fn missing_config_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let opts = TranspileOptions {
            config_path: dir.path().join("nope.yaml"),
            output_file: dir.path().join("out.js"),
            base_dir: None,
        };
        assert!(matches!(transpile(&opts), Err(TranspileError::ConfigLoad { .. })));
        assert!(!dir.path().join("out.js").exists());
    }
}
