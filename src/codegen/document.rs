//! Assembles the full program: header, body, backfilled imports, footer.

use std::path::{Path, PathBuf};

use indexmap::IndexSet;

use crate::asset_store::AssetEmbedder;
use crate::codegen::{scene_graph, templates, utils::module_import_line};
use crate::dsl::SceneDocument;
use crate::error::Result;
use crate::texture_cache::TextureCache;

/// Output text with exactly one deferred insertion point.
///
/// Everything written before [`mark_splice_point`](Self::mark_splice_point)
/// lands in the header, everything after in the body; [`finish`](Self::finish)
/// joins them around the spliced text.
#[derive(Debug, Default)]
pub struct EmissionBuffer {
    header: String,
    body: String,
    marked: bool,
}

impl EmissionBuffer {
    pub fn push_str(&mut self, s: &str) {
        if self.marked {
            self.body.push_str(s);
        } else {
            self.header.push_str(s);
        }
    }

    pub fn line(&mut self, s: impl AsRef<str>) {
        self.push_str(s.as_ref());
        self.push_str("\n");
    }

    pub fn blank(&mut self) {
        self.push_str("\n");
    }

    pub fn mark_splice_point(&mut self) {
        self.marked = true;
    }

    pub fn finish(self, spliced: &str) -> String {
        let mut out = String::with_capacity(self.header.len() + spliced.len() + self.body.len());
        out.push_str(&self.header);
        out.push_str(spliced);
        out.push_str(&self.body);
        out
    }
}

/// Lines discovered during emission that belong elsewhere in the program.
#[derive(Debug, Default)]
pub struct PendingInserts {
    imports: IndexSet<String>,
    boilerplate: IndexSet<String>,
    frame_updates: IndexSet<String>,
}

impl PendingInserts {
    pub fn add_import(&mut self, line: impl Into<String>) {
        self.imports.insert(line.into());
    }

    pub fn add_boilerplate(&mut self, line: impl Into<String>) {
        self.boilerplate.insert(line.into());
    }

    pub fn add_frame_update(&mut self, stmt: impl Into<String>) {
        self.frame_updates.insert(stmt.into());
    }

    pub fn imports(&self) -> impl Iterator<Item = &str> {
        self.imports.iter().map(String::as_str)
    }

    pub fn frame_updates(&self) -> impl Iterator<Item = &str> {
        self.frame_updates.iter().map(String::as_str)
    }

    /// Imports followed by boilerplate, ready to splice after the header.
    fn header_text(&self) -> String {
        let mut out = String::new();
        for line in self.imports.iter().chain(&self.boilerplate) {
            out.push_str(line);
        }
        out
    }
}

/// Mutable state shared by every emitter during one run.
#[derive(Debug)]
pub struct EmitContext {
    pub base_dir: PathBuf,
    pub out: EmissionBuffer,
    pub pending: PendingInserts,
    pub assets: AssetEmbedder,
    pub textures: TextureCache,
    /// Generated shader modules that need the glslify transform.
    pub glslify_files: Vec<PathBuf>,
}

impl EmitContext {
    pub fn new(base_dir: &Path, out_dir: &Path) -> Self {
        Self {
            base_dir: base_dir.to_path_buf(),
            out: EmissionBuffer::default(),
            pending: PendingInserts::default(),
            assets: AssetEmbedder::new(base_dir, out_dir),
            textures: TextureCache::new(base_dir, out_dir),
            glslify_files: Vec::new(),
        }
    }

    /// Texture identifier for `files`, with its import registered.
    pub fn texture<S: AsRef<str>>(&mut self, files: &[S]) -> Result<String> {
        let handle = self.textures.add_texture(files)?;
        self.pending.add_import(module_import_line(&handle.ident));
        Ok(handle.ident)
    }

    /// Embedded-file identifier for `file`, with its import registered.
    pub fn embed(&mut self, file: &str) -> Result<String> {
        let ident = self.assets.embed(file)?;
        self.pending.add_import(module_import_line(&ident));
        Ok(ident)
    }

    pub fn register_obj_loader(&mut self) {
        self.pending.add_import(templates::OBJ_LOADER_IMPORT);
        self.pending.add_boilerplate(templates::OBJ_LOADER_BOILERPLATE);
    }

    pub fn register_mtl_loader(&mut self) {
        self.pending.add_import(templates::MTL_LOADER_IMPORT);
        self.pending.add_boilerplate(templates::MTL_LOADER_BOILERPLATE);
    }

    /// Every generated module written so far, embedded files first.
    pub fn generated_files(&self) -> Vec<PathBuf> {
        self.assets
            .written_files()
            .iter()
            .chain(self.textures.written_files())
            .cloned()
            .collect()
    }
}

/// Run the full emission for `doc` and return the program text.
pub fn assemble(doc: &SceneDocument, ctx: &mut EmitContext) -> Result<String> {
    let show_stats = doc.sihm.show_stats;
    if show_stats {
        ctx.pending.add_import(templates::STATS_IMPORT);
        ctx.pending.add_boilerplate(templates::STATS_BOILERPLATE);
    }
    if !doc.sihm.extra_modules.is_empty() {
        log::debug!("extra modules for the bundler: {:?}", doc.sihm.extra_modules);
    }

    ctx.out.push_str(templates::IMPORTS);
    ctx.out.mark_splice_point();
    ctx.out.push_str(templates::BEGINNING_BOILERPLATE);

    if !doc.scene.is_empty() {
        ctx.out.line("// Scene properties");
        for (prop, value) in &doc.scene {
            scene_graph::emit_scene_prop(ctx, prop, value)?;
        }
        ctx.out.blank();
    }
    for (name, node) in &doc.objects {
        scene_graph::emit_object(ctx, name, node, "scene")?;
    }
    for (name, light) in &doc.lights {
        scene_graph::emit_light(ctx, name, light, "scene")?;
    }

    let spliced = ctx.pending.header_text();

    let frame_updates: Vec<&str> = ctx.pending.frame_updates().collect();
    let ending = templates::ending_boilerplate(show_stats, &frame_updates);
    ctx.out.push_str(&ending);

    Ok(std::mem::take(&mut ctx.out).finish(&spliced))
}
