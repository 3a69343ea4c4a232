// ABOUTME: Built-in handlebars helper functions available to every template
// ABOUTME: JSON encoding and path lookup, base64, case conversion, timestamps, and UUIDs

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::Utc;
use handlebars::{
    handlebars_helper, Context, Handlebars, Helper, HelperDef, Output, RenderContext, RenderError,
    RenderErrorReason, ScopedJson,
};
use serde_json::Value as JsonValue;
use uuid::Uuid;

/// Register all built-in helpers with the handlebars registry
pub fn register_helpers(handlebars: &mut Handlebars) {
    handlebars.register_helper("json", Box::new(JsonHelper));
    handlebars.register_helper("json_get", Box::new(JsonGetHelper { required: false }));
    handlebars.register_helper("json_require", Box::new(JsonGetHelper { required: true }));
    handlebars.register_helper("base64_encode", Box::new(base64_encode));
    handlebars.register_helper("base64_decode", Box::new(Base64DecodeHelper));
    handlebars.register_helper("upper", Box::new(upper));
    handlebars.register_helper("lower", Box::new(lower));
    handlebars.register_helper("timestamp", Box::new(timestamp_helper));
    handlebars.register_helper("uuid", Box::new(uuid_helper));
}

handlebars_helper!(base64_encode: |input: str| BASE64.encode(input.as_bytes()));
handlebars_helper!(upper: |input: str| input.to_uppercase());
handlebars_helper!(lower: |input: str| input.to_lowercase());

/// Look up a dot-separated path in a JSON document. Array elements are
/// addressed by index; an empty path returns the whole document.
pub fn lookup_path(document: &JsonValue, path: &str) -> Option<JsonValue> {
    if path.is_empty() {
        return Some(document.clone());
    }

    let mut current = document;
    for segment in path.split('.') {
        current = match current {
            JsonValue::Object(map) => map.get(segment)?,
            JsonValue::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current.clone())
}

fn param_str<'a>(h: &'a Helper, index: usize, helper: &str) -> Result<&'a str, RenderError> {
    h.param(index)
        .and_then(|v| v.value().as_str())
        .ok_or_else(|| {
            RenderErrorReason::Other(format!(
                "{} helper requires a string parameter at position {}",
                helper, index
            ))
            .into()
        })
}

/// Serialize any value to compact JSON text
pub struct JsonHelper;

impl HelperDef for JsonHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let value = h
            .param(0)
            .map(|v| v.value().to_string())
            .unwrap_or_else(|| "null".to_string());
        Ok(ScopedJson::Derived(JsonValue::String(value)))
    }
}

/// Query a JSON text by path. The required form fails when the path is absent.
pub struct JsonGetHelper {
    required: bool,
}

impl HelperDef for JsonGetHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let name = if self.required {
            "json_require"
        } else {
            "json_get"
        };
        let text = param_str(h, 0, name)?;
        let path = param_str(h, 1, name)?;

        let found = serde_json::from_str::<JsonValue>(text)
            .ok()
            .and_then(|document| lookup_path(&document, path));

        match found {
            Some(value) => Ok(ScopedJson::Derived(value)),
            None if self.required => Err(RenderErrorReason::Other(format!(
                "path not found: \"{}\"",
                path
            ))
            .into()),
            None => Ok(ScopedJson::Derived(JsonValue::Null)),
        }
    }
}

/// Decode standard base64 into UTF-8 text
pub struct Base64DecodeHelper;

impl HelperDef for Base64DecodeHelper {
    fn call_inner<'reg: 'rc, 'rc>(
        &self,
        h: &Helper<'rc>,
        _: &'reg Handlebars<'reg>,
        _: &'rc Context,
        _: &mut RenderContext<'reg, 'rc>,
    ) -> Result<ScopedJson<'rc>, RenderError> {
        let input = param_str(h, 0, "base64_decode")?;

        let decoded_bytes = BASE64
            .decode(input)
            .map_err(|e| RenderErrorReason::Other(format!("Base64 decode error: {}", e)))?;

        let decoded = String::from_utf8(decoded_bytes)
            .map_err(|e| RenderErrorReason::Other(format!("UTF-8 decode error: {}", e)))?;

        Ok(ScopedJson::Derived(JsonValue::String(decoded)))
    }
}

/// Timestamp helper - formats current time with optional format string
pub fn timestamp_helper(
    h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> Result<(), RenderError> {
    let format = h
        .param(0)
        .and_then(|v| v.value().as_str())
        .unwrap_or("%Y-%m-%d %H:%M:%S");

    out.write(&Utc::now().format(format).to_string())?;
    Ok(())
}

/// UUID helper - generates a new UUID v4
pub fn uuid_helper(
    _h: &Helper,
    _: &Handlebars,
    _: &Context,
    _rc: &mut RenderContext,
    out: &mut dyn Output,
) -> Result<(), RenderError> {
    out.write(&Uuid::new_v4().to_string())?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use crate::render::Renderer;
    use serde_json::{json, Value as JsonValue};

    use super::lookup_path;

    fn render(text: &str, data: JsonValue) -> String {
        Renderer::new().render(text, &data).unwrap()
    }

    #[test]
    fn test_lookup_path() {
        let document = json!({"data": {"items": [{"id": 7}], "name": "x"}});
        assert_eq!(lookup_path(&document, "data.name"), Some(json!("x")));
        assert_eq!(lookup_path(&document, "data.items.0.id"), Some(json!(7)));
        assert_eq!(lookup_path(&document, "data.items.1"), None);
        assert_eq!(lookup_path(&document, "data.name.deeper"), None);
        assert_eq!(lookup_path(&document, ""), Some(document.clone()));
    }

    #[test]
    fn test_json_get() {
        let data = json!({"body": "{\"data\":{\"token\":\"abc\",\"n\":3}}"});
        assert_eq!(render("{{json_get body \"data.token\"}}", data.clone()), "abc");
        assert_eq!(render("{{json_get body \"data.n\"}}", data.clone()), "3");
        assert_eq!(render("{{json_get body \"data.missing\"}}", data), "");
    }

    #[test]
    fn test_json_require_fails_when_missing() {
        let renderer = Renderer::new();
        let data = json!({"body": "{}"});
        assert!(renderer
            .render("{{json_require body \"data\"}}", &data)
            .is_err());
    }

    #[test]
    fn test_json() {
        assert_eq!(render("{{json value}}", json!({"value": [1, "a"]})), "[1,\"a\"]");
    }

    #[test]
    fn test_base64() {
        assert_eq!(render("{{base64_encode \"hello\"}}", json!({})), "aGVsbG8=");
        assert_eq!(render("{{base64_decode \"aGVsbG8=\"}}", json!({})), "hello");
        assert!(Renderer::new()
            .render("{{base64_decode \"!!\"}}", &json!({}))
            .is_err());
    }

    #[test]
    fn test_case_helpers() {
        assert_eq!(render("{{upper \"abc\"}}{{lower \"DEF\"}}", json!({})), "ABCdef");
    }

    #[test]
    fn test_generated_values() {
        assert_eq!(render("{{uuid}}", json!({})).len(), 36);
        assert_eq!(render("{{timestamp \"%Y\"}}", json!({})).len(), 4);
    }
}
