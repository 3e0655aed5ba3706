//! Full-page layout for requests that did not come from the pagelets client.

/// Wrap `content` in the demo page. `content` is trusted markup.
pub fn page(site_name: &str, content: &str) -> String {
    let title = escape(site_name);
    format!(
        r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <title>{title}</title>
</head>
<body>
  <h1>{title}</h1>
  <nav>
    <a href="/">Index</a>
    <a href="/pagelet">Pagelet</a>
    <a href="/custom.json" data-target="other">Custom</a>
    <a href="/redirect">Redirect</a>
  </nav>
  <div id="content">{content}</div>
  <div id="other"></div>
</body>
</html>
"#
    )
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}
