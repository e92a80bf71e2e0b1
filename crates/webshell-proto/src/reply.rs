//! Replies and callback deliveries sent back to embedded content.

use serde::{Deserialize, Serialize};
use serde_json::{Value, json};

use crate::Capability;

/// Immediate answer to a bridge call.
#[derive(Debug, Clone, PartialEq)]
pub enum BridgeReply {
    /// Call accepted; nothing to return.
    Unit,
    /// Scalar result.
    Value(Value),
    /// Result will arrive through the callback hook.
    Pending,
    /// Call failed. The reason is reported to the caller, never thrown.
    Error(String),
}

impl BridgeReply {
    /// Build a text result.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Value(Value::String(value.into()))
    }

    /// Build an integer result.
    pub fn integer(value: i64) -> Self {
        Self::Value(Value::from(value))
    }

    /// Build a boolean result.
    pub fn boolean(value: bool) -> Self {
        Self::Value(Value::Bool(value))
    }

    /// Build an error result.
    pub fn error(reason: impl Into<String>) -> Self {
        Self::Error(reason.into())
    }

    /// Whether the call failed.
    pub fn is_error(&self) -> bool {
        matches!(self, Self::Error(_))
    }

    /// Serialize to the wire form.
    ///
    /// `{"ok":true,"value":...}` on success (`value` is `null` for unit and
    /// pending replies), `{"ok":false,"error":"..."}` on failure.
    pub fn to_json(&self) -> String {
        let value = match self {
            Self::Unit => json!({ "ok": true, "value": Value::Null }),
            Self::Pending => json!({ "ok": true, "value": Value::Null, "pending": true }),
            Self::Value(v) => json!({ "ok": true, "value": v }),
            Self::Error(reason) => json!({ "ok": false, "error": reason }),
        };
        value.to_string()
    }
}

/// Asynchronous result delivered through `window.Native._deliver`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackDelivery {
    /// Wire name of the capability that produced the result.
    pub capability: String,
    /// Whether the operation succeeded.
    pub ok: bool,
    /// Failure reason. `None` on success.
    pub reason: Option<String>,
}

impl CallbackDelivery {
    /// Successful result for `capability`.
    pub fn success(capability: Capability) -> Self {
        Self { capability: capability.wire_name().to_string(), ok: true, reason: None }
    }

    /// Failed result for `capability` with a reason.
    pub fn failure(capability: Capability, reason: impl Into<String>) -> Self {
        Self { capability: capability.wire_name().to_string(), ok: false, reason: Some(reason.into()) }
    }

    /// Script the host evaluates in the page to deliver this result.
    pub fn to_script(&self) -> String {
        let payload = serde_json::to_string(self).unwrap_or_else(|_| "null".to_string());
        format!("window.Native && window.Native._deliver({payload});")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reply_wire_forms() {
        assert_eq!(BridgeReply::Unit.to_json(), r#"{"ok":true,"value":null}"#);
        assert_eq!(BridgeReply::integer(87).to_json(), r#"{"ok":true,"value":87}"#);
        assert_eq!(BridgeReply::error("no torch").to_json(), r#"{"error":"no torch","ok":false}"#);
    }

    #[test]
    fn delivery_script_embeds_json() {
        let script = CallbackDelivery::failure(Capability::BiometricLogin, "no hardware").to_script();
        assert_eq!(
            script,
            r#"window.Native && window.Native._deliver({"capability":"loginBiometric","ok":false,"reason":"no hardware"});"#
        );
    }
}
