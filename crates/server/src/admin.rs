//! HTML rendering for the admin log view.

const ADMIN_HTML: &str = r#"<!DOCTYPE html>
<html>
  <head><title>Admin Panel</title><meta charset="utf-8"></head>
  <body style="font-family:monospace; background:#111; color:#0f0; padding:20px;">
    <h2>Incoming submissions ({{LOG_NAME}})</h2>
    <hr>
    <pre>{{CONTENT}}</pre>
    <br>
    <a href="/download?key={{KEY}}" style="color:white;">Download file (.txt)</a>
    &nbsp;|&nbsp;
    <a href="/admin?key={{KEY}}" style="color:white;">Refresh</a>
  </body>
</html>
"#;

/// Render the admin page around the (possibly absent) log contents.
///
/// User-submitted values reach this page verbatim from the store, so the
/// content is HTML-escaped before being embedded. The key lands inside href
/// query strings and is percent-encoded. The content placeholder is
/// substituted last; earlier substitutions must never rescan user text.
pub fn render_page(contents: Option<&str>, admin_key: &str, log_name: &str) -> String {
    let body = match contents {
        Some(text) => escape_html(text),
        None => "No submissions yet.".to_string(),
    };

    ADMIN_HTML
        .replace("{{LOG_NAME}}", &escape_html(log_name))
        .replace("{{KEY}}", &percent_encode(admin_key))
        .replace("{{CONTENT}}", &body)
}

/// Percent-encode a query value. RFC 3986 unreserved characters pass
/// through; everything else, reserved delimiters included, is encoded.
fn percent_encode(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for byte in input.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'.' | b'_' | b'~' => {
                out.push(byte as char)
            }
            _ => out.push_str(&format!("%{byte:02X}")),
        }
    }
    out
}

pub fn escape_html(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}
