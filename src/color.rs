use std::sync::OnceLock;

use regex::Regex;
use serde_json::Value;

use crate::codegen::utils::{quote_js_string, value_literal};
use crate::error::{Result, TranspileError};

fn hex_color_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^0[xX][0-9a-fA-F]{6}$").expect("hex color pattern is valid"))
}

fn invalid(value: &Value, reason: &str) -> TranspileError {
    TranspileError::InvalidColor {
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

/// Render a config color as the argument list of a `THREE.Color` constructor.
///
/// - `[r, g, b]` -> `r,g,b` (exactly three components)
/// - `"0xAABBCC"` -> `0xAABBCC` (numeric literal)
/// - a bare number (YAML already parsed the hex literal) -> the number
/// - any other string -> a quoted CSS color name, e.g. `"red"`
pub fn normalize_color(value: &Value) -> Result<String> {
    match value {
        Value::Array(items) => {
            if items.len() != 3 {
                return Err(invalid(value, "expected exactly 3 components"));
            }
            Ok(items.iter().map(value_literal).collect::<Vec<_>>().join(","))
        }
        Value::String(s) => {
            let s = s.trim();
            if hex_color_pattern().is_match(s) {
                Ok(s.to_string())
            } else {
                Ok(quote_js_string(s))
            }
        }
        Value::Number(n) => Ok(n.to_string()),
        _ => Err(invalid(value, "expected an RGB triple, a 0xRRGGBB literal or a color name")),
    }
}

pub fn color_constructor(value: &Value) -> Result<String> {
    Ok(format!("new THREE.Color({})", normalize_color(value)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[test]
    fn hex_literal_is_verbatim() {
        assert_eq!(normalize_color(&json!("0xAABBCC")).unwrap(), "0xAABBCC");
        assert_eq!(normalize_color(&json!("0x00ff7f")).unwrap(), "0x00ff7f");
    }

    #[test]
    fn named_color_is_quoted() {
        assert_eq!(normalize_color(&json!("red")).unwrap(), "\"red\"");
        // Seven digits is not a hex color, so it falls through to a name.
        assert_eq!(normalize_color(&json!("0xAABBCCD")).unwrap(), "\"0xAABBCCD\"");
    }

    #[test]
    fn triple_is_comma_joined() {
        assert_eq!(normalize_color(&json!([1, 0, 0])).unwrap(), "1,0,0");
        assert_eq!(normalize_color(&json!([0.5, 0.25, 1.0])).unwrap(), "0.5,0.25,1.0");
    }

    #[test]
    fn wrong_arity_fails() {
        for bad in [json!([1, 0, 0, 1]), json!([1, 0]), json!([])] {
            assert!(matches!(
                normalize_color(&bad),
                Err(TranspileError::InvalidColor { .. })
            ));
        }
    }

    #[test]
    fn non_color_scalars_fail() {
        assert!(normalize_color(&json!(true)).is_err());
        assert!(normalize_color(&json!(null)).is_err());
        assert!(normalize_color(&json!({"r": 1})).is_err());
    }

    #[test]
    fn constructor_wraps_normalized_value() {
        assert_eq!(
            color_constructor(&json!("0x112233")).unwrap(),
            "new THREE.Color(0x112233)"
        );
        assert_eq!(color_constructor(&json!(255)).unwrap(), "new THREE.Color(255)");
    }

    proptest! {
        #[test]
        fn any_six_digit_hex_round_trips(n in 0u32..=0xFF_FFFF, upper in any::<bool>()) {
            let lit = if upper { format!("0x{n:06X}") } else { format!("0x{n:06x}") };
            prop_assert_eq!(normalize_color(&json!(lit.clone())).unwrap(), lit);
        }

        #[test]
        fn sequences_other_than_three_fail(len in 0usize..8) {
            prop_assume!(len != 3);
            let v = Value::Array(vec![json!(0); len]);
            prop_assert!(normalize_color(&v).is_err());
        }
    }
}
