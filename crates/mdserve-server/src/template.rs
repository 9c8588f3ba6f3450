//! Built-in page template.

/// Default page template.
///
/// Variables: `title`, `name`, `path`, `modified`, `toc`, `body` and `meta`
/// (front matter attributes, first value per key).
pub const DEFAULT_TEMPLATE: &str = r#"<!DOCTYPE html>
<html>
<head>
  <meta charset="utf-8">
  <meta name="viewport" content="width=device-width, initial-scale=1">
  <title>{{ title }}</title>
  <link rel="stylesheet" href="https://cdnjs.cloudflare.com/ajax/libs/github-markdown-css/5.5.1/github-markdown-light.min.css" crossorigin="anonymous">
  <style>
    .page {
      display: flex;
      gap: 32px;
      max-width: 1200px;
      margin: 0 auto;
      padding: 45px;
    }
    .toc {
      flex: 0 0 220px;
      font-size: 14px;
    }
    .toc .nav {
      list-style: none;
      padding-left: 12px;
    }
    .markdown-body {
      box-sizing: border-box;
      min-width: 200px;
      max-width: 980px;
      flex: 1;
    }
    @media (max-width: 767px) {
      .page { display: block; padding: 15px; }
      .toc { display: none; }
    }
  </style>
</head>
<body>
  <div class="page">
    {% if toc %}<nav class="toc">{{ toc }}</nav>{% endif %}
    <article class="markdown-body">
{{ body }}
    </article>
  </div>
</body>
</html>
"#;
