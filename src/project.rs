//! Project metadata collected from the operator.

use crate::casing;

/// The user-supplied metadata a scaffold run is built from.
///
/// `name` is the canonical slug (kebab-cased on construction) and doubles as
/// the target directory name. Created once per run, immutable thereafter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectRequest {
    pub name: String,
    pub title: String,
    pub description: String,
}

impl ProjectRequest {
    /// Build a request, normalizing the name to its kebab-case slug and
    /// defaulting an empty title to the title-cased name.
    pub fn new(name: &str, title: &str, description: &str) -> Self {
        let name = casing::kebab(name);
        let title = if title.trim().is_empty() {
            casing::title(&name)
        } else {
            title.trim().to_string()
        };
        Self {
            name,
            title,
            description: description.trim().to_string(),
        }
    }
}

/// The read-only snapshot template expressions evaluate against.
///
/// One instance per scaffold run, shared across all file renders. Field
/// access from templates goes through [`RenderContext::field`]; the four
/// case transforms are resolved separately by the renderer from
/// [`crate::casing`].
#[derive(Debug, Clone)]
pub struct RenderContext {
    pub project: ProjectRequest,
}

impl RenderContext {
    pub fn new(project: ProjectRequest) -> Self {
        Self { project }
    }

    /// Resolve a dotted field path (`project.name` etc.) to its value.
    ///
    /// Returns `None` for anything outside the documented context surface.
    pub fn field(&self, path: &[String]) -> Option<&str> {
        match path {
            [root, field] if root == "project" => match field.as_str() {
                "name" => Some(&self.project.name),
                "title" => Some(&self.project.title),
                "description" => Some(&self.project.description),
                _ => None,
            },
            _ => None,
        }
    }
}
