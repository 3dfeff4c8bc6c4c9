use std::collections::BTreeSet;
use std::path::Path;

use indexmap::IndexMap;
use serde_json::{Map, Value};

use crate::error::{Result, TranspileError};

/// Root of a parsed scene config. Section order follows the source document.
#[derive(Debug, Clone, Default)]
pub struct SceneDocument {
    pub objects: IndexMap<String, ObjectNode>,
    pub lights: IndexMap<String, LightNode>,
    pub scene: Map<String, Value>,
    pub sihm: SihmOptions,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SihmOptions {
    pub show_stats: bool,
    /// npm modules the bundler must install in addition to the template's.
    pub extra_modules: BTreeSet<String>,
}

#[derive(Debug, Clone, Default)]
pub struct ObjectNode {
    pub geometry: Option<GeometrySpec>,
    pub material: Option<MaterialSpec>,
    /// Track name (`position`, `quaternion`, ...) -> keyframe constructor arguments.
    pub animations: IndexMap<String, Vec<Value>>,
    pub children: IndexMap<String, ObjectNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum GeometrySpec {
    Function { function: String, args: Args },
    File { file: String },
}

#[derive(Debug, Clone, PartialEq)]
pub enum MaterialSpec {
    Function {
        function: String,
        args: Args,
        uses_glslify: bool,
    },
    File { file: String },
}

impl MaterialSpec {
    pub fn is_file(&self) -> bool {
        matches!(self, MaterialSpec::File { .. })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct LightNode {
    pub function: String,
    pub args: Args,
    pub position: Option<Vec<Value>>,
}

/// Call arguments as written in the config: positional list or keyword mapping.
#[derive(Debug, Clone, PartialEq)]
pub enum Args {
    List(Vec<Value>),
    Map(Map<String, Value>),
}

impl Args {
    fn from_value(v: &Value) -> Self {
        match v {
            Value::Array(items) => Args::List(items.clone()),
            Value::Object(map) => Args::Map(map.clone()),
            Value::Null => Args::List(Vec::new()),
            scalar => Args::List(vec![scalar.clone()]),
        }
    }
}

// ---------------------------------------------------------------------------
// Loading
// ---------------------------------------------------------------------------

/// Parse a config file into a generic value tree. The extension picks the
/// format: `.ini`/`.cfg`, `.json`, anything else is read as YAML.
pub fn load_document_tree(path: &Path) -> Result<Value> {
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .map(|s| s.to_ascii_lowercase());

    let tree = match ext.as_deref() {
        Some("ini") | Some("cfg") => load_ini(path)?,
        Some("json") => {
            let text = read_config_text(path)?;
            serde_json::from_str(&text).map_err(|e| config_error(path, e))?
        }
        _ => {
            let text = read_config_text(path)?;
            serde_yaml::from_str(&text).map_err(|e| config_error(path, e))?
        }
    };

    if !tree.is_object() {
        return Err(config_error(path, "document root must be a mapping"));
    }
    Ok(tree)
}

pub fn load_scene_document(path: &Path) -> Result<SceneDocument> {
    let tree = load_document_tree(path)?;
    log::debug!("loaded config tree from {}", path.display());
    SceneDocument::from_tree(&tree)
}

fn read_config_text(path: &Path) -> Result<String> {
    std::fs::read_to_string(path).map_err(|e| config_error(path, e))
}

fn config_error(path: &Path, message: impl ToString) -> TranspileError {
    TranspileError::ConfigLoad {
        path: path.to_path_buf(),
        message: message.to_string(),
    }
}

/// INI sections nest on `.` (`[OBJECTS.box.GEOMETRY]`); values are read as YAML
/// flow scalars so `[1, 1, 1]` and `true` keep their types.
fn load_ini(path: &Path) -> Result<Value> {
    let ini = ini::Ini::load_from_file(path).map_err(|e| config_error(path, e))?;

    let mut root = Value::Object(Map::new());
    for (section, props) in ini.iter() {
        let mut node = &mut root;
        for segment in section
            .into_iter()
            .flat_map(|s| s.split('.'))
            .map(str::trim)
            .filter(|s| !s.is_empty())
        {
            if !node.get(segment).is_some_and(Value::is_object) {
                node[segment] = Value::Object(Map::new());
            }
            node = &mut node[segment];
        }
        for (key, raw) in props.iter() {
            node[key.trim()] = parse_ini_value(raw);
        }
    }
    Ok(root)
}

fn parse_ini_value(raw: &str) -> Value {
    serde_yaml::from_str::<Value>(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

// ---------------------------------------------------------------------------
// Typed conversion
// ---------------------------------------------------------------------------

/// Optional lookup; a present-but-null key counts as absent.
pub fn field<'a>(map: &'a Map<String, Value>, key: &str) -> Option<&'a Value> {
    map.get(key).filter(|v| !v.is_null())
}

fn as_mapping<'a>(v: &'a Value, context: &str) -> Result<&'a Map<String, Value>> {
    v.as_object()
        .ok_or_else(|| TranspileError::invalid_args(context, "expected a mapping"))
}

fn as_name(v: &Value, context: &str, key: &str) -> Result<String> {
    v.as_str()
        .map(str::to_string)
        .ok_or_else(|| TranspileError::invalid_args(context, format!("`{key}` must be a string")))
}

/// Accepts YAML/JSON booleans and the `true`/`yes`/`1` spellings INI files produce.
pub fn truthy(v: &Value) -> bool {
    match v {
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|x| x != 0.0),
        Value::String(s) => matches!(s.trim().to_ascii_lowercase().as_str(), "true" | "yes" | "on" | "1"),
        _ => false,
    }
}

fn function_args(map: &Map<String, Value>, context: &str) -> Result<Args> {
    field(map, "ARGS")
        .map(Args::from_value)
        .ok_or_else(|| TranspileError::missing(context, "ARGS"))
}

impl SceneDocument {
    pub fn from_tree(tree: &Value) -> Result<Self> {
        let root = as_mapping(tree, "document")?;
        let mut doc = SceneDocument::default();

        if let Some(v) = field(root, "SIHM") {
            doc.sihm = SihmOptions::from_value(v)?;
        }
        if let Some(v) = field(root, "SCENE") {
            doc.scene = as_mapping(v, "SCENE")?.clone();
        }
        if let Some(v) = field(root, "OBJECTS") {
            for (name, obj) in as_mapping(v, "OBJECTS")? {
                let node = ObjectNode::from_value(&format!("OBJECTS.{name}"), obj)?;
                doc.objects.insert(name.clone(), node);
            }
        }
        if let Some(v) = field(root, "LIGHTS") {
            for (name, light) in as_mapping(v, "LIGHTS")? {
                let node = LightNode::from_value(&format!("LIGHTS.{name}"), light)?;
                doc.lights.insert(name.clone(), node);
            }
        }
        Ok(doc)
    }
}

impl SihmOptions {
    pub fn from_value(v: &Value) -> Result<Self> {
        let map = as_mapping(v, "SIHM")?;
        let mut opts = SihmOptions::default();
        for (key, value) in map {
            match key.as_str() {
                "show_stats" => opts.show_stats = truthy(value),
                "extra_modules" => match value {
                    Value::String(s) => {
                        opts.extra_modules.insert(s.clone());
                    }
                    Value::Array(items) => {
                        for item in items {
                            let module = as_name(item, "SIHM.extra_modules", "extra_modules")?;
                            opts.extra_modules.insert(module);
                        }
                    }
                    Value::Null => {}
                    _ => {
                        return Err(TranspileError::invalid_args(
                            "SIHM.extra_modules",
                            "expected a string or a list of strings",
                        ));
                    }
                },
                other => log::warn!("ignoring unknown SIHM option `{other}`"),
            }
        }
        Ok(opts)
    }
}

impl ObjectNode {
    pub fn from_value(context: &str, v: &Value) -> Result<Self> {
        let map = as_mapping(v, context)?;
        let mut node = ObjectNode::default();

        if let Some(geo) = field(map, "GEOMETRY") {
            node.geometry = Some(GeometrySpec::from_value(&format!("{context}.GEOMETRY"), geo)?);
        }
        if let Some(mat) = field(map, "MATERIAL") {
            node.material = Some(MaterialSpec::from_value(&format!("{context}.MATERIAL"), mat)?);
        }
        if let Some(anim) = field(map, "ANIMATIONS") {
            for (track, args) in as_mapping(anim, &format!("{context}.ANIMATIONS"))? {
                let args = match args {
                    Value::Array(items) => items.clone(),
                    other => vec![other.clone()],
                };
                node.animations.insert(track.clone(), args);
            }
        }
        if let Some(children) = field(map, "CHILDREN") {
            for (name, child) in as_mapping(children, &format!("{context}.CHILDREN"))? {
                let child = ObjectNode::from_value(&format!("{context}.CHILDREN.{name}"), child)?;
                node.children.insert(name.clone(), child);
            }
        }
        Ok(node)
    }
}

impl GeometrySpec {
    pub fn from_value(context: &str, v: &Value) -> Result<Self> {
        let map = as_mapping(v, context)?;
        if let Some(function) = field(map, "FUNCTION") {
            return Ok(GeometrySpec::Function {
                function: as_name(function, context, "FUNCTION")?,
                args: function_args(map, context)?,
            });
        }
        if let Some(file) = field(map, "FILE") {
            return Ok(GeometrySpec::File {
                file: as_name(file, context, "FILE")?,
            });
        }
        Err(TranspileError::missing(context, "FUNCTION or FILE"))
    }
}

impl MaterialSpec {
    pub fn from_value(context: &str, v: &Value) -> Result<Self> {
        let map = as_mapping(v, context)?;
        if let Some(function) = field(map, "FUNCTION") {
            return Ok(MaterialSpec::Function {
                function: as_name(function, context, "FUNCTION")?,
                args: function_args(map, context)?,
                uses_glslify: field(map, "USES_GLSLIFY").is_some_and(truthy),
            });
        }
        if let Some(file) = field(map, "FILE") {
            return Ok(MaterialSpec::File {
                file: as_name(file, context, "FILE")?,
            });
        }
        Err(TranspileError::missing(context, "FUNCTION or FILE"))
    }
}

impl LightNode {
    pub fn from_value(context: &str, v: &Value) -> Result<Self> {
        let map = as_mapping(v, context)?;
        let function = field(map, "FUNCTION").ok_or_else(|| TranspileError::missing(context, "FUNCTION"))?;
        let position = match field(map, "POSITION") {
            None => None,
            Some(Value::Array(items)) if items.len() == 3 => Some(items.clone()),
            Some(_) => {
                return Err(TranspileError::invalid_args(
                    context,
                    "POSITION must be a list of 3 values",
                ));
            }
        };
        Ok(LightNode {
            function: as_name(function, context, "FUNCTION")?,
            args: function_args(map, context)?,
            position,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn object_tree_keeps_document_order() {
        let tree = json!({
            "OBJECTS": {
                "zeta": {"GEOMETRY": {"FUNCTION": "BoxGeometry", "ARGS": [1, 1, 1]}},
                "alpha": {"CHILDREN": {"inner": {"GEOMETRY": {"FILE": "mesh.obj"}}}},
            }
        });
        let doc = SceneDocument::from_tree(&tree).unwrap();
        let names: Vec<&str> = doc.objects.keys().map(String::as_str).collect();
        assert_eq!(names, ["zeta", "alpha"]);
        assert!(doc.objects["alpha"].geometry.is_none());
        assert_eq!(
            doc.objects["alpha"].children["inner"].geometry,
            Some(GeometrySpec::File { file: "mesh.obj".to_string() })
        );
    }

    #[test]
    fn function_without_args_is_missing_field() {
        let tree = json!({"OBJECTS": {"box": {"MATERIAL": {"FUNCTION": "MeshBasicMaterial"}}}});
        let err = SceneDocument::from_tree(&tree).unwrap_err();
        match err {
            TranspileError::MissingField { context, field } => {
                assert_eq!(context, "OBJECTS.box.MATERIAL");
                assert_eq!(field, "ARGS");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn sihm_options_accept_string_or_list() {
        let one = SihmOptions::from_value(&json!({"extra_modules": "glslify"})).unwrap();
        assert_eq!(one.extra_modules.len(), 1);

        let many = SihmOptions::from_value(&json!({
            "show_stats": true,
            "extra_modules": ["b", "a", "b"],
            "not_an_option": 3,
        }))
        .unwrap();
        assert!(many.show_stats);
        assert_eq!(many.extra_modules.into_iter().collect::<Vec<_>>(), ["a", "b"]);
    }

    #[test]
    fn light_position_must_be_a_triple() {
        let err = LightNode::from_value(
            "LIGHTS.sun",
            &json!({"FUNCTION": "PointLight", "ARGS": [], "POSITION": [1, 2]}),
        )
        .unwrap_err();
        assert!(matches!(err, TranspileError::InvalidArguments { .. }));
    }

    #[test]
    fn glslify_flag_accepts_ini_spelling() {
        let spec = MaterialSpec::from_value(
            "m",
            &json!({"FUNCTION": "ShaderMaterial", "ARGS": {}, "USES_GLSLIFY": "True"}),
        )
        .unwrap();
        assert!(matches!(spec, MaterialSpec::Function { uses_glslify: true, .. }));
    }

    #[test]
    fn loads_each_config_format() {
        let dir = tempfile::tempdir().unwrap();

        let yaml = dir.path().join("scene.yaml");
        std::fs::write(&yaml, "OBJECTS:\n  box:\n    GEOMETRY:\n      FUNCTION: BoxGeometry\n      ARGS: [1, 2, 3]\n").unwrap();
        let doc = load_scene_document(&yaml).unwrap();
        assert!(doc.objects.contains_key("box"));

        let json_path = dir.path().join("scene.json");
        std::fs::write(&json_path, r#"{"SCENE": {"background": "red"}}"#).unwrap();
        let doc = load_scene_document(&json_path).unwrap();
        assert_eq!(doc.scene["background"], json!("red"));

        let ini_path = dir.path().join("scene.ini");
        std::fs::write(
            &ini_path,
            "[OBJECTS.box.GEOMETRY]\nFUNCTION = BoxGeometry\nARGS = [1, 1, 1]\n",
        )
        .unwrap();
        let tree = load_document_tree(&ini_path).unwrap();
        assert_eq!(tree["OBJECTS"]["box"]["GEOMETRY"]["ARGS"], json!([1, 1, 1]));
        assert_eq!(tree["OBJECTS"]["box"]["GEOMETRY"]["FUNCTION"], json!("BoxGeometry"));
    }

    #[test]
    fn missing_or_broken_config_is_a_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.yaml");
        assert!(matches!(
            load_document_tree(&missing),
            Err(TranspileError::ConfigLoad { .. })
        ));

        let broken = dir.path().join("broken.json");
        std::fs::write(&broken, "{not json").unwrap();
        assert!(matches!(
            load_document_tree(&broken),
            Err(TranspileError::ConfigLoad { .. })
        ));
    }
}
