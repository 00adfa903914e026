//! Placeholder substitution for template files.
//!
//! A template is plain text with delimited expression regions: `<% … %>`,
//! `<%= … %>`, or `<%~ … %>` (the `=`/`~` markers are accepted and treated
//! alike). Each region holds one expression evaluated against the
//! [`RenderContext`]:
//!
//! - dotted field access: `project.name`, `project.title`, `project.description`
//! - a case-transform call: `kebab(…)`, `title(…)`, `snake(…)`, `constant(…)`
//! - a quoted string literal
//! - `include("relative/path")`, which inlines another template file
//!
//! Output mirrors the source left-to-right with no backtracking.
//!
//! Includes resolve relative to the directory of the file being rendered,
//! inside the template source, and are inlined **verbatim**, never
//! re-rendered. That keeps include depth bounded at one and makes include
//! cycles impossible; it is a deliberate restriction, not an oversight.
//! An include that cannot be read yields empty content at its position and
//! the error is reported back to the caller; the rest of the file still
//! renders. Anything else that goes wrong (bad syntax, unknown identifier)
//! fails the whole file, and only that file.

use std::path::{Path, PathBuf};

use crate::casing;
use crate::errors::{IncludeError, RenderError, SourceError};
use crate::project::RenderContext;
use crate::template::source::{TemplateSource, resolve_relative};

/// The result of rendering one file.
///
/// `include_errors` is non-empty when the render degraded: each entry marks
/// an include position that produced empty content instead of file text.
#[derive(Debug)]
pub struct Rendered {
    pub text: String,
    pub include_errors: Vec<IncludeError>,
}

/// Render one template file against the shared context.
///
/// `file_dir` is the directory of the file being rendered, relative to the
/// template root; include targets resolve against it. Suspends on include
/// reads. Independent renders share no mutable state and may run
/// concurrently.
pub async fn render(
    text: &str,
    file_dir: &Path,
    ctx: &RenderContext,
    source: &dyn TemplateSource,
) -> Result<Rendered, RenderError> {
    let mut out = String::with_capacity(text.len());
    let mut include_errors = Vec::new();
    let mut rest = text;
    let mut consumed = 0usize;

    while let Some(start) = rest.find("<%") {
        out.push_str(&rest[..start]);
        let after_open = &rest[start + 2..];
        let Some(end) = after_open.find("%>") else {
            return Err(RenderError::Unterminated {
                offset: consumed + start,
            });
        };

        let raw = &after_open[..end];
        let body = raw.strip_prefix(['=', '~']).unwrap_or(raw).trim();

        match parse_expr(body)? {
            Expr::Call { ref name, ref arg } if name == "include" => {
                let Expr::Literal(target) = arg.as_ref() else {
                    return Err(RenderError::InvalidExpression {
                        expr: body.to_string(),
                        message: "include takes a quoted relative path".to_string(),
                    });
                };
                match include(file_dir, target, source).await {
                    Ok(included) => out.push_str(&included),
                    // Degraded render: empty content at this position.
                    Err(err) => include_errors.push(err),
                }
            }
            expr => out.push_str(&eval(&expr, ctx)?),
        }

        let advance = start + 2 + end + 2;
        consumed += advance;
        rest = &rest[advance..];
    }
    out.push_str(rest);

    Ok(Rendered {
        text: out,
        include_errors,
    })
}

async fn include(
    file_dir: &Path,
    target: &str,
    source: &dyn TemplateSource,
) -> Result<String, IncludeError> {
    let Some(resolved) = resolve_relative(file_dir, target) else {
        return Err(IncludeError {
            path: PathBuf::from(target),
            source: SourceError::OutsideRoot {
                path: PathBuf::from(target),
            },
        });
    };
    source.read(&resolved).await.map_err(|source| IncludeError {
        path: resolved,
        source,
    })
}

#[derive(Debug)]
enum Expr {
    Field(Vec<String>),
    Call { name: String, arg: Box<Expr> },
    Literal(String),
}

fn eval(expr: &Expr, ctx: &RenderContext) -> Result<String, RenderError> {
    match expr {
        Expr::Literal(value) => Ok(value.clone()),
        Expr::Field(path) => ctx
            .field(path)
            .map(str::to_string)
            .ok_or_else(|| RenderError::UnknownIdentifier {
                name: path.join("."),
            }),
        Expr::Call { name, arg } => {
            if name == "include" {
                return Err(RenderError::InvalidExpression {
                    expr: name.clone(),
                    message: "include may only appear as the entire placeholder expression"
                        .to_string(),
                });
            }
            let value = eval(arg, ctx)?;
            match name.as_str() {
                "kebab" => Ok(casing::kebab(&value)),
                "title" => Ok(casing::title(&value)),
                "snake" => Ok(casing::snake(&value)),
                "constant" => Ok(casing::constant(&value)),
                other => Err(RenderError::UnknownFunction {
                    name: other.to_string(),
                }),
            }
        }
    }
}

fn parse_expr(input: &str) -> Result<Expr, RenderError> {
    let mut parser = Parser { input, pos: 0 };
    parser.skip_whitespace();
    let expr = parser.parse_value()?;
    parser.skip_whitespace();
    if parser.pos != input.len() {
        return Err(parser.invalid("unexpected trailing characters"));
    }
    Ok(expr)
}

struct Parser<'a> {
    input: &'a str,
    pos: usize,
}

impl<'a> Parser<'a> {
    fn invalid(&self, message: &str) -> RenderError {
        RenderError::InvalidExpression {
            expr: self.input.to_string(),
            message: message.to_string(),
        }
    }

    fn peek(&self) -> Option<char> {
        self.input[self.pos..].chars().next()
    }

    fn skip_whitespace(&mut self) {
        while let Some(c) = self.peek() {
            if !c.is_whitespace() {
                break;
            }
            self.pos += c.len_utf8();
        }
    }

    fn parse_value(&mut self) -> Result<Expr, RenderError> {
        match self.peek() {
            Some(quote @ ('"' | '\'')) => self.parse_literal(quote),
            Some(c) if c.is_ascii_alphabetic() || c == '_' => self.parse_ident_expr(),
            _ => Err(self.invalid("expected an identifier or string literal")),
        }
    }

    fn parse_literal(&mut self, quote: char) -> Result<Expr, RenderError> {
        self.pos += quote.len_utf8();
        let start = self.pos;
        let Some(len) = self.input[start..].find(quote) else {
            return Err(self.invalid("unterminated string literal"));
        };
        let value = self.input[start..start + len].to_string();
        self.pos = start + len + quote.len_utf8();
        Ok(Expr::Literal(value))
    }

    fn parse_ident(&mut self) -> String {
        let start = self.pos;
        while let Some(c) = self.peek() {
            if !(c.is_ascii_alphanumeric() || c == '_') {
                break;
            }
            self.pos += c.len_utf8();
        }
        self.input[start..self.pos].to_string()
    }

    fn parse_ident_expr(&mut self) -> Result<Expr, RenderError> {
        let name = self.parse_ident();
        self.skip_whitespace();

        match self.peek() {
            Some('(') => {
                self.pos += 1;
                self.skip_whitespace();
                let arg = self.parse_value()?;
                self.skip_whitespace();
                if self.peek() != Some(')') {
                    return Err(self.invalid("expected closing `)`"));
                }
                self.pos += 1;
                Ok(Expr::Call {
                    name,
                    arg: Box::new(arg),
                })
            }
            Some('.') => {
                let mut path = vec![name];
                while self.peek() == Some('.') {
                    self.pos += 1;
                    let part = self.parse_ident();
                    if part.is_empty() {
                        return Err(self.invalid("expected identifier after `.`"));
                    }
                    path.push(part);
                }
                Ok(Expr::Field(path))
            }
            _ => Ok(Expr::Field(vec![name])),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::project::ProjectRequest;
    use async_trait::async_trait;
    use std::collections::HashMap;

    struct FakeTemplates(HashMap<PathBuf, String>);

    impl FakeTemplates {
        fn new(files: &[(&str, &str)]) -> Self {
            Self(
                files
                    .iter()
                    .map(|(path, text)| (PathBuf::from(path), text.to_string()))
                    .collect(),
            )
        }
    }

    #[async_trait]
    impl TemplateSource for FakeTemplates {
        fn entries(&self) -> Result<Vec<PathBuf>, SourceError> {
            let mut entries: Vec<PathBuf> = self.0.keys().cloned().collect();
            entries.sort();
            Ok(entries)
        }

        async fn read(&self, rel: &Path) -> Result<String, SourceError> {
            self.0.get(rel).cloned().ok_or_else(|| SourceError::NotFound {
                path: rel.to_path_buf(),
            })
        }

        async fn read_bytes(&self, rel: &Path) -> Result<Vec<u8>, SourceError> {
            self.read(rel).await.map(String::into_bytes)
        }
    }

    fn ctx() -> RenderContext {
        RenderContext::new(ProjectRequest::new("my-plugin", "", "A test plugin"))
    }

    async fn render_at(
        text: &str,
        file_dir: &str,
        source: &FakeTemplates,
    ) -> Result<Rendered, RenderError> {
        render(text, Path::new(file_dir), &ctx(), source).await
    }

    async fn render_simple(text: &str) -> Result<Rendered, RenderError> {
        render_at(text, "", &FakeTemplates::new(&[])).await
    }

    // =========================================
    // substitution tests
    // =========================================

    #[tokio::test]
    async fn passes_plain_text_through_unchanged() {
        let rendered = render_simple("no placeholders here\n").await.unwrap();
        assert_eq!(rendered.text, "no placeholders here\n");
        assert!(rendered.include_errors.is_empty());
    }

    #[tokio::test]
    async fn interpolates_project_fields() {
        let rendered = render_simple("name: <%= project.name %>, title: <%= project.title %>")
            .await
            .unwrap();
        assert_eq!(rendered.text, "name: my-plugin, title: My Plugin");
    }

    #[tokio::test]
    async fn applies_case_transforms() {
        let rendered = render_simple(
            "define( '<%= constant(project.name) %>_VERSION', '0.0.1' );\nfunction <%= snake(project.name) %>() {}",
        )
        .await
        .unwrap();
        assert!(rendered.text.contains("MY_PLUGIN_VERSION"));
        assert!(rendered.text.contains("function my_plugin()"));
    }

    #[tokio::test]
    async fn evaluates_nested_calls_and_literals() {
        let rendered = render_simple("<%= title(kebab('Some Name')) %>").await.unwrap();
        assert_eq!(rendered.text, "Some Name");
    }

    #[tokio::test]
    async fn accepts_all_three_region_markers() {
        let rendered = render_simple("<% project.name %>|<%= project.name %>|<%~ project.name %>")
            .await
            .unwrap();
        assert_eq!(rendered.text, "my-plugin|my-plugin|my-plugin");
    }

    #[tokio::test]
    async fn preserves_left_to_right_order() {
        let rendered = render_simple("a <%= project.name %> b <%= project.title %> c")
            .await
            .unwrap();
        assert_eq!(rendered.text, "a my-plugin b My Plugin c");
    }

    // =========================================
    // failure mode tests
    // =========================================

    #[tokio::test]
    async fn unknown_identifier_fails_the_file() {
        let err = render_simple("<%= projekt.name %>").await.unwrap_err();
        assert!(matches!(err, RenderError::UnknownIdentifier { .. }));
    }

    #[tokio::test]
    async fn unknown_function_fails_the_file() {
        let err = render_simple("<%= upper(project.name) %>").await.unwrap_err();
        match err {
            RenderError::UnknownFunction { name } => assert_eq!(name, "upper"),
            other => panic!("Expected UnknownFunction, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn unterminated_region_reports_offset() {
        let err = render_simple("ok <%= project.name").await.unwrap_err();
        match err {
            RenderError::Unterminated { offset } => assert_eq!(offset, 3),
            other => panic!("Expected Unterminated, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn trailing_garbage_is_invalid() {
        let err = render_simple("<%= project.name extra %>").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidExpression { .. }));
    }

    // =========================================
    // include tests
    // =========================================

    #[tokio::test]
    async fn include_inlines_sibling_file_verbatim() {
        let source = FakeTemplates::new(&[("docs/setup.md", "raw <%= project.name %> stays raw")]);
        let rendered = render_at("before\n<%~ include('./setup.md') %>\nafter", "docs", &source)
            .await
            .unwrap();
        // Included text is not re-rendered: the placeholder survives as-is.
        assert_eq!(
            rendered.text,
            "before\nraw <%= project.name %> stays raw\nafter"
        );
        assert!(rendered.include_errors.is_empty());
    }

    #[tokio::test]
    async fn include_resolves_against_the_rendered_files_directory() {
        let source = FakeTemplates::new(&[("readme.txt", "top-level")]);
        let rendered = render_at("<%~ include('../readme.txt') %>", "docs", &source)
            .await
            .unwrap();
        assert_eq!(rendered.text, "top-level");
    }

    #[tokio::test]
    async fn missing_include_yields_empty_content_and_records_the_error() {
        let source = FakeTemplates::new(&[]);
        let rendered = render_at("a[<%~ include('./gone.md') %>]b <%= project.name %>", "docs", &source)
            .await
            .unwrap();
        // The render proceeds degraded: empty gap, rest still substituted.
        assert_eq!(rendered.text, "a[]b my-plugin");
        assert_eq!(rendered.include_errors.len(), 1);
        assert_eq!(
            rendered.include_errors[0].path,
            PathBuf::from("docs/gone.md")
        );
    }

    #[tokio::test]
    async fn include_escaping_the_template_root_is_an_include_error() {
        let source = FakeTemplates::new(&[]);
        let rendered = render_at("<%~ include('../../outside.md') %>", "docs", &source)
            .await
            .unwrap();
        assert_eq!(rendered.text, "");
        assert_eq!(rendered.include_errors.len(), 1);
        assert!(matches!(
            rendered.include_errors[0].source,
            SourceError::OutsideRoot { .. }
        ));
    }

    #[tokio::test]
    async fn include_may_not_nest_inside_a_call() {
        let err = render_simple("<%= kebab(include('x.md')) %>").await.unwrap_err();
        assert!(matches!(err, RenderError::InvalidExpression { .. }));
    }

    #[tokio::test]
    async fn include_requires_a_literal_path() {
        let source = FakeTemplates::new(&[]);
        let err = render_at("<%~ include(project.name) %>", "", &source)
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::InvalidExpression { .. }));
    }
}
