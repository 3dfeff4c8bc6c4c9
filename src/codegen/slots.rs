//! Which keyword arguments of the built-in three.js materials take a texture
//! and which take a color. Adding a material means adding a row.

#[derive(Debug, Clone, Copy)]
pub struct MaterialSlots {
    pub textures: &'static [&'static str],
    pub colors: &'static [&'static str],
}

impl MaterialSlots {
    pub fn is_texture(&self, key: &str) -> bool {
        self.textures.contains(&key)
    }

    pub fn is_color(&self, key: &str) -> bool {
        self.colors.contains(&key)
    }
}

const BASIC_MAPS: &[&str] = &["map", "alphaMap", "aoMap", "envMap", "lightMap", "specularMap"];

const LIT_MAPS: &[&str] = &[
    "map",
    "alphaMap",
    "aoMap",
    "bumpMap",
    "displacementMap",
    "emissiveMap",
    "envMap",
    "lightMap",
    "normalMap",
    "specularMap",
];

const STANDARD_MAPS: &[&str] = &[
    "map",
    "alphaMap",
    "aoMap",
    "bumpMap",
    "displacementMap",
    "emissiveMap",
    "envMap",
    "lightMap",
    "metalnessMap",
    "normalMap",
    "roughnessMap",
];

const PHYSICAL_MAPS: &[&str] = &[
    "map",
    "alphaMap",
    "aoMap",
    "bumpMap",
    "displacementMap",
    "emissiveMap",
    "envMap",
    "lightMap",
    "metalnessMap",
    "normalMap",
    "roughnessMap",
    "clearcoatMap",
    "clearcoatNormalMap",
    "clearcoatRoughnessMap",
    "iridescenceMap",
    "iridescenceThicknessMap",
    "sheenColorMap",
    "sheenRoughnessMap",
    "specularColorMap",
    "specularIntensityMap",
    "thicknessMap",
    "transmissionMap",
];

const TOON_MAPS: &[&str] = &[
    "map",
    "alphaMap",
    "aoMap",
    "bumpMap",
    "displacementMap",
    "emissiveMap",
    "gradientMap",
    "lightMap",
    "normalMap",
];

const MATERIAL_SLOT_TABLE: &[(&str, MaterialSlots)] = &[
    ("MeshBasicMaterial", MaterialSlots { textures: BASIC_MAPS, colors: &["color"] }),
    ("MeshLambertMaterial", MaterialSlots { textures: LIT_MAPS, colors: &["color", "emissive"] }),
    (
        "MeshPhongMaterial",
        MaterialSlots { textures: LIT_MAPS, colors: &["color", "emissive", "specular"] },
    ),
    ("MeshStandardMaterial", MaterialSlots { textures: STANDARD_MAPS, colors: &["color", "emissive"] }),
    (
        "MeshPhysicalMaterial",
        MaterialSlots {
            textures: PHYSICAL_MAPS,
            colors: &["color", "emissive", "sheenColor", "specularColor", "attenuationColor"],
        },
    ),
    ("MeshToonMaterial", MaterialSlots { textures: TOON_MAPS, colors: &["color", "emissive"] }),
    (
        "MeshMatcapMaterial",
        MaterialSlots {
            textures: &["map", "alphaMap", "bumpMap", "displacementMap", "matcap", "normalMap"],
            colors: &["color"],
        },
    ),
    (
        "MeshNormalMaterial",
        MaterialSlots { textures: &["bumpMap", "displacementMap", "normalMap"], colors: &[] },
    ),
    (
        "MeshDepthMaterial",
        MaterialSlots { textures: &["map", "alphaMap", "displacementMap"], colors: &[] },
    ),
    ("PointsMaterial", MaterialSlots { textures: &["map", "alphaMap"], colors: &["color"] }),
    ("SpriteMaterial", MaterialSlots { textures: &["map", "alphaMap"], colors: &["color"] }),
    ("LineBasicMaterial", MaterialSlots { textures: &["map"], colors: &["color"] }),
    ("LineDashedMaterial", MaterialSlots { textures: &["map"], colors: &["color"] }),
    ("ShadowMaterial", MaterialSlots { textures: &[], colors: &["color"] }),
];

/// Slot table row for a material constructor, if it is a known built-in.
pub fn material_slots(function: &str) -> Option<&'static MaterialSlots> {
    MATERIAL_SLOT_TABLE
        .iter()
        .find(|(name, _)| *name == function)
        .map(|(_, slots)| slots)
}
