//! Formatting helpers shared by the emitters.

use std::path::Path;

use base64::{Engine as _, engine::general_purpose};
use image::ImageFormat;
use serde_json::{Map, Value};

use crate::dsl::Args;
use crate::error::{Result, TranspileError};

/// Textual form of a config value inside emitted code.
///
/// Strings are inserted verbatim: config authors write identifiers, quoted
/// strings and array literals (`"[0, 1, 2]"`) as strings, so quoting is the
/// caller's job.
pub fn value_literal(v: &Value) -> String {
    match v {
        Value::Null => "null".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Number(n) => n.to_string(),
        Value::String(s) => s.clone(),
        Value::Array(items) => {
            let parts: Vec<String> = items.iter().map(value_literal).collect();
            format!("[{}]", parts.join(", "))
        }
        Value::Object(map) => format!("{{{}}}", format_keyword_args(map)),
    }
}

pub fn format_positional_args(items: &[Value]) -> String {
    items.iter().map(value_literal).collect::<Vec<_>>().join(",")
}

pub fn format_keyword_args(map: &Map<String, Value>) -> String {
    map.iter()
        .map(|(k, v)| format!("{k}: {}", value_literal(v)))
        .collect::<Vec<_>>()
        .join(",")
}

/// `a,b,c` for a list, `k: v,k2: v2` for a mapping.
pub fn format_args(args: &Args) -> String {
    match args {
        Args::List(items) => format_positional_args(items),
        Args::Map(map) => format_keyword_args(map),
    }
}

/// Argument text for a constructor call: mappings become an object literal.
pub fn call_args(args: &Args) -> String {
    match args {
        Args::List(_) => format_args(args),
        Args::Map(_) => format!("{{{}}}", format_args(args)),
    }
}

/// Double-quoted JavaScript string literal.
pub fn quote_js_string(s: &str) -> String {
    // JSON string escaping is a subset of valid JS string syntax.
    Value::String(s.to_string()).to_string()
}

/// Sanitize a config name into a valid JavaScript identifier.
pub fn sanitize_js_ident(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 1);
    for ch in s.chars() {
        if ch.is_ascii_alphanumeric() || ch == '_' || ch == '$' {
            out.push(ch);
        } else {
            out.push('_');
        }
    }
    if out.is_empty() || out.starts_with(|c: char| c.is_ascii_digit()) {
        out.insert(0, '_');
    }
    out
}

/// MIME type for an image path, derived from its extension.
pub fn image_mime_type(path: &Path) -> String {
    if let Ok(format) = ImageFormat::from_path(path) {
        return format.to_mime_type().to_string();
    }
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or("octet-stream")
        .to_ascii_lowercase();
    format!("image/{ext}")
}

/// Whether `path` names an existing file with a known image extension.
pub fn is_image_file(path: &Path) -> bool {
    ImageFormat::from_path(path).is_ok() && path.is_file()
}

/// Encode raw bytes as a base64 data URL.
pub fn encode_data_url(mime_type: &str, bytes: &[u8]) -> String {
    format!(
        "data:{mime_type};base64,{}",
        general_purpose::STANDARD.encode(bytes)
    )
}

/// Read an image file and return it as a data URL.
pub fn image_data_url(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path).map_err(|source| TranspileError::AssetRead {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(encode_data_url(&image_mime_type(path), &bytes))
}

/// `import { X } from "./X";` for a generated module.
pub fn module_import_line(ident: &str) -> String {
    format!("import {{ {ident} }} from \"./{ident}\";\n")
}
