//! Page-side bridge shim.
//!
//! Hosts inject this script at document start. It defines `window.Native`
//! with one function per [`Capability`], all funnelled through a single
//! `post(name, arg)` transport that the host binds to its message channel.
//! Because the script is generated from [`Capability::ALL`], both hosts expose
//! exactly the same names and argument shapes.

use std::fmt::Write as _;

use crate::{ArgShape, Capability};

/// Host-specific transport expression bound to `post`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transport {
    /// A JS interface object named `NativeHost` with an `invoke(json)` method
    /// that returns the reply JSON synchronously.
    JavascriptInterface,
    /// A `window.webkit.messageHandlers.native` script message handler.
    MessageHandler,
}

impl Transport {
    fn post_body(self) -> &'static str {
        match self {
            Self::JavascriptInterface => {
                "if (window.NativeHost && window.NativeHost.invoke) { \
                 var reply = JSON.parse(window.NativeHost.invoke(msg)); \
                 return reply.ok ? reply.value : undefined; } \
                 return undefined;"
            },
            Self::MessageHandler => {
                "var h = window.webkit && window.webkit.messageHandlers && \
                 window.webkit.messageHandlers.native; \
                 if (h) { h.postMessage(msg); } return undefined;"
            },
        }
    }
}

/// Render the shim for a transport.
pub fn render(transport: Transport) -> String {
    let mut out = String::new();
    out.push_str("(function() {\n");
    out.push_str("  if (window.Native && window.Native.__shell) { return; }\n");
    out.push_str("  var listeners = {};\n");
    out.push_str("  var Native = {\n");
    out.push_str("    __shell: true,\n");
    let _ = writeln!(
        out,
        "    post: function(name, arg) {{ var msg = JSON.stringify({{ name: name, arg: arg === undefined ? null : arg }}); {} }},",
        transport.post_body()
    );
    out.push_str("    on: function(name, fn) { listeners[name] = fn; },\n");
    out.push_str(
        "    _deliver: function(result) { var fn = result && listeners[result.capability]; if (fn) { fn(result); } },\n",
    );

    for capability in Capability::ALL {
        let name = capability.wire_name();
        let _ = match capability.arg_shape() {
            ArgShape::None => {
                writeln!(out, "    {name}: function() {{ return this.post('{name}', null); }},")
            },
            ArgShape::Notification => writeln!(
                out,
                "    {name}: function(title, message) {{ return this.post('{name}', {{ title: String(title), message: String(message) }}); }},"
            ),
            ArgShape::Integer | ArgShape::Boolean | ArgShape::Text => {
                writeln!(out, "    {name}: function(arg) {{ return this.post('{name}', arg); }},")
            },
        };
    }

    out.push_str("  };\n");
    out.push_str("  window.Native = Native;\n");
    out.push_str("})();\n");
    out
}
