use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use regex::Regex;

use crate::codegen::utils::{image_data_url, quote_js_string};
use crate::error::{Result, TranspileError};

/// Resolve `path` against `base_dir` and canonicalize it, so different
/// spellings of one file share a cache entry.
pub fn resolve_asset_path(base_dir: &Path, path: &str) -> Result<PathBuf> {
    let joined = base_dir.join(path);
    joined
        .canonicalize()
        .map_err(|source| TranspileError::AssetRead {
            path: joined,
            source,
        })
}

/// Write one generated module file, recording it in `written`.
pub(crate) fn write_module(out_dir: &Path, ident: &str, text: &str, written: &mut Vec<PathBuf>) -> Result<PathBuf> {
    let path = out_dir.join(format!("{ident}.js"));
    std::fs::write(&path, text).map_err(|source| TranspileError::Write {
        path: path.clone(),
        source,
    })?;
    log::info!("wrote generated module {}", path.display());
    written.push(path.clone());
    Ok(path)
}

/// Embeds text files as generated `EXTRA_FILE_<n>` modules, at most once per
/// canonical path.
#[derive(Debug)]
pub struct AssetEmbedder {
    base_dir: PathBuf,
    out_dir: PathBuf,
    by_path: HashMap<PathBuf, String>,
    written: Vec<PathBuf>,
}

impl AssetEmbedder {
    pub fn new(base_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            out_dir: out_dir.into(),
            by_path: HashMap::new(),
            written: Vec::new(),
        }
    }

    /// Return the module identifier for `path`, writing the module on first use.
    /// The caller imports the identifier.
    pub fn embed(&mut self, path: &str) -> Result<String> {
        let resolved = resolve_asset_path(&self.base_dir, path)?;
        if let Some(ident) = self.by_path.get(&resolved) {
            log::debug!("asset cache hit: {} -> {ident}", resolved.display());
            return Ok(ident.clone());
        }

        let ident = format!("EXTRA_FILE_{}", self.by_path.len());
        let mut text = std::fs::read_to_string(&resolved).map_err(|source| TranspileError::AssetRead {
            path: resolved.clone(),
            source,
        })?;
        if has_extension(&resolved, "mtl") {
            let mtl_dir = resolved.parent().unwrap_or(&self.base_dir).to_path_buf();
            text = inline_mtl_textures(&text, &mtl_dir)?;
        }

        let module = format!("export const {ident} = {};\n", quote_js_string(&text));
        write_module(&self.out_dir, &ident, &module, &mut self.written)?;
        log::debug!("embedded {} as {ident}", resolved.display());

        self.by_path.insert(resolved, ident.clone());
        Ok(ident)
    }

    /// Path of the module file generated for `ident`.
    pub fn module_path(&self, ident: &str) -> PathBuf {
        self.out_dir.join(format!("{ident}.js"))
    }

    pub fn len(&self) -> usize {
        self.by_path.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_path.is_empty()
    }

    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .and_then(|s| s.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext))
}

fn mtl_map_directive() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| {
        Regex::new(r"(?i)^\s*(map_[a-z]+|bump|disp|decal|refl|norm)\s")
            .expect("mtl directive pattern is valid")
    })
}

/// Replace the image filename at the end of every texture-map directive with
/// a data URL, so the material no longer needs files next to it at runtime.
fn inline_mtl_textures(text: &str, mtl_dir: &Path) -> Result<String> {
    let mut out = String::with_capacity(text.len());
    for line in text.split_inclusive('\n') {
        let body = line.trim_end_matches(['\r', '\n']);
        let ending = &line[body.len()..];

        let target = mtl_map_directive()
            .is_match(body)
            .then(|| body.split_whitespace().last())
            .flatten();
        match target {
            Some(file) if !file.starts_with("data:") => {
                let image_path = mtl_dir.join(file);
                let data_url = image_data_url(&image_path)?;
                // The filename is the final token, so only its last occurrence moves.
                let at = body.rfind(file).unwrap_or(body.len());
                out.push_str(&body[..at]);
                out.push_str(&data_url);
                out.push_str(&body[at + file.len()..]);
            }
            _ => out.push_str(body),
        }
        out.push_str(ending);
    }
    Ok(out)
}
