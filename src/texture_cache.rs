//! Deduplicated texture modules.
//!
//! A texture request is one image (2-D texture) or six images (cube texture).
//! Requests are keyed by a sha256 over the canonical paths; cube faces are
//! sorted first so the key does not depend on face order.

use std::collections::HashMap;
use std::path::PathBuf;

use serde_json::Value;
use sha2::{Digest, Sha256};

use crate::asset_store::{resolve_asset_path, write_module};
use crate::codegen::utils::{image_data_url, quote_js_string};
use crate::error::{Result, TranspileError};

pub const CUBE_FACES: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextureKind {
    Flat,
    Cube,
}

#[derive(Debug)]
pub struct TextureCache {
    base_dir: PathBuf,
    out_dir: PathBuf,
    by_key: HashMap<String, String>,
    written: Vec<PathBuf>,
}

/// Result of a texture request. `created` is false on a cache hit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextureHandle {
    pub ident: String,
    pub kind: TextureKind,
    pub created: bool,
}

/// Collect the file list from a config value: a path string, or a list of
/// path strings.
pub fn texture_files(value: &Value) -> Option<Vec<String>> {
    match value {
        Value::String(s) => Some(vec![s.clone()]),
        Value::Array(items) => items.iter().map(|v| v.as_str().map(str::to_string)).collect(),
        _ => None,
    }
}

fn cache_key(paths: &[PathBuf]) -> String {
    let mut hasher = Sha256::new();
    for p in paths {
        hasher.update(p.to_string_lossy().as_bytes());
        hasher.update(b"\n");
    }
    format!("{:x}", hasher.finalize())
}

impl TextureCache {
    pub fn new(base_dir: impl Into<PathBuf>, out_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
            out_dir: out_dir.into(),
            by_key: HashMap::new(),
            written: Vec::new(),
        }
    }

    /// Return the identifier for a texture set, writing its module on a miss.
    pub fn add_texture<S: AsRef<str>>(&mut self, files: &[S]) -> Result<TextureHandle> {
        let kind = match files.len() {
            1 => TextureKind::Flat,
            CUBE_FACES => TextureKind::Cube,
            count => return Err(TranspileError::InvalidTextureSet { count }),
        };

        let mut resolved = files
            .iter()
            .map(|f| resolve_asset_path(&self.base_dir, f.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        resolved.sort();

        let key = cache_key(&resolved);
        if let Some(ident) = self.by_key.get(&key) {
            log::debug!("texture cache hit: {ident}");
            return Ok(TextureHandle {
                ident: ident.clone(),
                kind,
                created: false,
            });
        }

        let ident = format!("EXTRA_TEXTURE_{}", self.by_key.len());
        let module = texture_module(&ident, kind, &resolved)?;
        write_module(&self.out_dir, &ident, &module, &mut self.written)?;
        self.by_key.insert(key, ident.clone());

        Ok(TextureHandle {
            ident,
            kind,
            created: true,
        })
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }

    pub fn written_files(&self) -> &[PathBuf] {
        &self.written
    }
}

fn texture_module(ident: &str, kind: TextureKind, paths: &[PathBuf]) -> Result<String> {
    let urls = paths
        .iter()
        .map(|p| image_data_url(p).map(|url| quote_js_string(&url)))
        .collect::<Result<Vec<_>>>()?;

    let load = match kind {
        TextureKind::Flat => format!("new THREE.TextureLoader().load({})", urls.join("")),
        TextureKind::Cube => format!(
            "new THREE.CubeTextureLoader().load([\n    {},\n])",
            urls.join(",\n    ")
        ),
    };
    Ok(format!(
        "import * as THREE from \"three\";\n\nexport const {ident} = {load};\n"
    ))
}
