use crate::ipc::error::err;
use crate::ipc::types::Request;

/// String param, as sent. Missing or non-string values are `bad_params`.
pub fn str_param<'a>(req: &'a Request, key: &str) -> Result<&'a str, serde_json::Value> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| err(&req.id, "bad_params", format!("missing {}", key), None))
}

/// Roll bounds come from text boxes but a UI may send numbers; both are taken
/// as text and parsed by the admin layer.
pub fn text_param(req: &Request, key: &str) -> Result<String, serde_json::Value> {
    match req.params.get(key) {
        Some(serde_json::Value::String(s)) => Ok(s.clone()),
        Some(serde_json::Value::Number(n)) => Ok(n.to_string()),
        _ => Err(err(&req.id, "bad_params", format!("missing {}", key), None)),
    }
}

pub fn bool_param(req: &Request, key: &str) -> bool {
    req.params
        .get(key)
        .and_then(|v| v.as_bool())
        .unwrap_or(false)
}
