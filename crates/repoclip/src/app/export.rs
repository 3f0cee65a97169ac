//! Rendering compiled documents to text.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result, anyhow};
use clap::ValueEnum;
use minijinja::Environment;
use serde::{Deserialize, Serialize};

use crate::domain::model::CompiledDocument;

/// Built-in document layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "kebab-case")]
#[value(rename_all = "kebab-case")]
pub enum DocumentFormat {
    /// Path line followed by a fenced code block per file.
    Markdown,
    /// `==> path <==` headers followed by raw contents.
    Plain,
}

impl DocumentFormat {
    /// Name of the built-in template implementing the format.
    pub fn template_name(&self) -> &'static str {
        match self {
            DocumentFormat::Markdown => "markdown",
            DocumentFormat::Plain => "plain",
        }
    }
}

impl FromStr for DocumentFormat {
    type Err = DocumentFormatParseError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(DocumentFormat::Markdown),
            "plain" | "text" | "txt" => Ok(DocumentFormat::Plain),
            other => Err(DocumentFormatParseError::UnknownFormat(other.to_string())),
        }
    }
}

/// Error returned when parsing a [`DocumentFormat`] fails.
#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum DocumentFormatParseError {
    #[error("unknown document format '{0}'")]
    UnknownFormat(String),
}

/// Renders documents through built-in or on-disk minijinja templates.
///
/// Templates see `message`, `files` and `diff`. Each file carries `path`, `language`,
/// `fence`, the unmodified `contents`, and `body`, which is `contents` ending in a line
/// break so a closing fence or separator can follow it directly.
pub struct Exporter {
    env: Environment<'static>,
    template_dir: Option<PathBuf>,
}

impl Exporter {
    /// Create a new exporter with built-in templates loaded.
    pub fn new() -> Result<Self> {
        Ok(Self {
            env: default_environment()?,
            template_dir: None,
        })
    }

    /// Look up relative template paths in `dir` before the working directory.
    pub fn with_template_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.template_dir = Some(dir.into());
        self
    }

    /// Render `document` with a built-in template name, a format alias, or a template file path.
    ///
    /// Non-empty output always ends with exactly one newline; an empty document renders to
    /// the empty string.
    pub fn render(&self, document: &CompiledDocument, template: &str) -> Result<String> {
        let context = TemplateContext::from_document(document);
        let name = <DocumentFormat as FromStr>::from_str(template)
            .map(|format| format.template_name())
            .unwrap_or(template);

        let rendered = if let Ok(template) = self.env.get_template(name) {
            template
                .render(&context)
                .map_err(|err| anyhow!("failed to render template '{name}': {err}"))?
        } else {
            render_external(&self.template_path(template), &context)?
        };

        Ok(finish(&rendered))
    }

    fn template_path(&self, template: &str) -> PathBuf {
        let path = Path::new(template);
        if path.is_relative()
            && let Some(dir) = &self.template_dir
        {
            let candidate = dir.join(path);
            if candidate.is_file() {
                return candidate;
            }
        }
        path.to_path_buf()
    }
}

fn render_external(path: &Path, context: &TemplateContext) -> Result<String> {
    if !path.is_file() {
        return Err(anyhow!(
            "template '{}' not found (built-in or filesystem)",
            path.display()
        ));
    }
    let source = fs::read_to_string(path)
        .with_context(|| format!("failed to load template from path {}", path.display()))?;
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("external", &source)
        .map_err(|err| anyhow!("invalid template '{}': {err}", path.display()))?;
    env.get_template("external")
        .and_then(|template| template.render(context))
        .map_err(|err| anyhow!("failed to render template '{}': {err}", path.display()))
}

fn default_environment() -> Result<Environment<'static>> {
    let mut env = Environment::new();
    env.set_trim_blocks(true);
    env.set_lstrip_blocks(true);
    env.add_template("markdown", MARKDOWN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register markdown template: {err}"))?;
    env.add_template("plain", PLAIN_TEMPLATE)
        .map_err(|err| anyhow!("failed to register plain template: {err}"))?;
    Ok(env)
}

fn finish(rendered: &str) -> String {
    let trimmed = rendered.trim_end_matches(['\r', '\n']);
    if trimmed.trim().is_empty() {
        String::new()
    } else {
        format!("{trimmed}\n")
    }
}

/// Shortest backtick fence that cannot be closed by anything inside `text`.
fn fence_for(text: &str) -> String {
    let mut longest = 0;
    let mut current = 0;
    for ch in text.chars() {
        if ch == '`' {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    "`".repeat((longest + 1).max(3))
}

#[derive(Serialize)]
struct TemplateContext {
    message: Option<String>,
    files: Vec<TemplateFile>,
    diff: Option<TemplateDiff>,
}

impl TemplateContext {
    fn from_document(document: &CompiledDocument) -> Self {
        Self {
            message: document.message.clone(),
            files: document
                .sections
                .iter()
                .map(|section| TemplateFile {
                    path: section.path.clone(),
                    language: section.language.clone().unwrap_or_default(),
                    fence: fence_for(&section.contents),
                    body: line_terminated(&section.contents),
                    contents: section.contents.clone(),
                })
                .collect(),
            diff: document.diff.as_ref().map(|diff| TemplateDiff {
                revision: diff.revision.clone(),
                short_id: diff.short_id.clone(),
                fence: fence_for(&diff.text),
                text: diff.text.clone(),
            }),
        }
    }
}

fn line_terminated(text: &str) -> String {
    if text.ends_with('\n') {
        text.to_owned()
    } else {
        format!("{text}\n")
    }
}

#[derive(Serialize)]
struct TemplateFile {
    path: String,
    language: String,
    fence: String,
    contents: String,
    body: String,
}

#[derive(Serialize)]
struct TemplateDiff {
    revision: String,
    short_id: String,
    fence: String,
    text: String,
}

const MARKDOWN_TEMPLATE: &str = r#"{% if message %}
{{ message }}

{% endif %}
{% for file in files %}
{{ file.path }}
{{ file.fence }}{{ file.language }}
{{ file.body }}{{ file.fence }}

{% endfor %}
{% if diff %}
Diff against {{ diff.revision }} ({{ diff.short_id }})
{{ diff.fence }}diff
{{ diff.text }}
{{ diff.fence }}
{% endif %}
"#;

const PLAIN_TEMPLATE: &str = r#"{% if message %}
{{ message }}

{% endif %}
{% for file in files %}
==> {{ file.path }} <==
{{ file.body }}
{% endfor %}
{% if diff %}
==> diff against {{ diff.revision }} ({{ diff.short_id }}) <==
{{ diff.text }}
{% endif %}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    use insta::assert_snapshot;

    use crate::domain::model::{DiffSection, DocumentSection};

    fn section(path: &str, language: Option<&str>, contents: &str) -> DocumentSection {
        DocumentSection {
            path: path.into(),
            language: language.map(str::to_owned),
            contents: contents.into(),
        }
    }

    fn sample_document() -> CompiledDocument {
        CompiledDocument {
            message: Some("Explain the change.".into()),
            sections: vec![
                section("src/app.py", Some("py"), "def run():\n    return 1"),
                section("Makefile", None, "all: build"),
            ],
            diff: Some(DiffSection {
                revision: "HEAD~1".into(),
                short_id: "abcdef012345".into(),
                text: "diff --git a/src/app.py b/src/app.py\n-    return 0\n+    return 1".into(),
            }),
            skipped: Vec::new(),
        }
    }

    #[test]
    fn markdown_layout() {
        let exporter = Exporter::new().unwrap();
        let rendered = exporter.render(&sample_document(), "markdown").unwrap();
        assert_snapshot!(rendered, @r###"
        Explain the change.

        src/app.py
        ```py
        def run():
            return 1
        ```

        Makefile
        ```
        all: build
        ```

        Diff against HEAD~1 (abcdef012345)
        ```diff
        diff --git a/src/app.py b/src/app.py
        -    return 0
        +    return 1
        ```
        "###);
    }

    #[test]
    fn plain_layout_uses_header_lines() {
        let exporter = Exporter::new().unwrap();
        let rendered = exporter.render(&sample_document(), "plain").unwrap();
        assert!(rendered.starts_with("Explain the change.\n\n==> src/app.py <==\ndef run():\n"));
        assert!(rendered.contains("\n==> Makefile <==\nall: build\n"));
        assert!(rendered.ends_with("==> diff against HEAD~1 (abcdef012345) <==\ndiff --git a/src/app.py b/src/app.py\n-    return 0\n+    return 1\n"));
    }

    #[test]
    fn empty_document_renders_to_empty_string() {
        let exporter = Exporter::new().unwrap();
        for template in ["markdown", "plain"] {
            let rendered = exporter.render(&CompiledDocument::default(), template).unwrap();
            assert_eq!(rendered, "");
        }
    }

    #[test]
    fn message_only_document() {
        let exporter = Exporter::new().unwrap();
        let document = CompiledDocument {
            message: Some("Only instructions".into()),
            ..CompiledDocument::default()
        };
        assert_eq!(
            exporter.render(&document, "markdown").unwrap(),
            "Only instructions\n"
        );
    }

    #[test]
    fn diff_follows_every_file_section() {
        let exporter = Exporter::new().unwrap();
        let rendered = exporter.render(&sample_document(), "markdown").unwrap();
        let diff_at = rendered.find("Diff against").unwrap();
        assert!(rendered.rfind("Makefile").unwrap() < diff_at);
        assert!(rendered.find("src/app.py\n").unwrap() < diff_at);
    }

    #[test]
    fn fences_outgrow_backticks_in_content() {
        assert_eq!(fence_for("no ticks"), "```");
        assert_eq!(fence_for("inline `code`"), "```");
        assert_eq!(fence_for("```rust\nfn x() {}\n```"), "````");
        assert_eq!(fence_for("`````"), "``````");
    }

    #[test]
    fn external_template_from_path() -> Result<()> {
        let temp = tempfile::tempdir()?;
        let path = temp.path().join("custom.j2");
        fs::write(&path, "{% for file in files %}[{{ file.path }}]\n{% endfor %}")?;

        let exporter = Exporter::new()?;
        let rendered = exporter.render(&sample_document(), path.to_str().unwrap())?;
        assert_eq!(rendered, "[src/app.py]\n[Makefile]\n");
        Ok(())
    }

    #[test]
    fn relative_template_resolves_against_template_dir() -> Result<()> {
        let temp = tempfile::tempdir()?;
        fs::create_dir_all(temp.path().join("templates"))?;
        fs::write(
            temp.path().join("templates/paths.j2"),
            "{% for file in files %}<{{ file.path }}>\n{% endfor %}",
        )?;

        let exporter = Exporter::new()?.with_template_dir(temp.path());
        let rendered = exporter.render(&sample_document(), "templates/paths.j2")?;
        assert_eq!(rendered, "<src/app.py>\n<Makefile>\n");

        let err = Exporter::new()?
            .render(&sample_document(), "templates/paths.j2")
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
        Ok(())
    }

    #[test]
    fn file_contents_keep_their_line_endings() {
        let exporter = Exporter::new().unwrap();
        let document = CompiledDocument {
            sections: vec![
                section("a.txt", Some("txt"), "one\r\ntwo\r\n\r\n"),
                section("b.txt", Some("txt"), "tail\n\n"),
                section("c.txt", Some("txt"), "bare"),
            ],
            ..CompiledDocument::default()
        };

        let rendered = exporter.render(&document, "markdown").unwrap();
        assert!(rendered.contains("```txt\none\r\ntwo\r\n\r\n```\n"));
        assert!(rendered.contains("```txt\ntail\n\n```\n"));
        assert!(rendered.ends_with("```txt\nbare\n```\n"));

        let plain = exporter.render(&document, "plain").unwrap();
        assert!(plain.contains("==> b.txt <==\ntail\n\n\n==> c.txt <==\nbare\n"));
    }

    #[test]
    fn unknown_template_is_an_error() {
        let exporter = Exporter::new().unwrap();
        let err = exporter
            .render(&sample_document(), "does-not-exist")
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }

    #[test]
    fn format_aliases_parse() {
        assert_eq!(<DocumentFormat as FromStr>::from_str("MD"), Ok(DocumentFormat::Markdown));
        assert_eq!(<DocumentFormat as FromStr>::from_str("txt"), Ok(DocumentFormat::Plain));
        assert!(<DocumentFormat as FromStr>::from_str("html").is_err());
    }
}
