//! String-case transforms exposed to template expressions.
//!
//! Thin wrappers over `heck`, pinned to the four forms templates may call by
//! bare identifier: `kebab`, `title`, `snake`, `constant`. All four are pure,
//! idempotent, and map the empty string to the empty string.

use heck::{ToKebabCase, ToShoutySnakeCase, ToSnakeCase, ToTitleCase};

/// `"My Plugin"` → `"my-plugin"`
pub fn kebab(input: &str) -> String {
    input.to_kebab_case()
}

/// `"my-plugin"` → `"My Plugin"`
pub fn title(input: &str) -> String {
    input.to_title_case()
}

/// `"my-plugin"` → `"my_plugin"`
pub fn snake(input: &str) -> String {
    input.to_snake_case()
}

/// `"my-plugin"` → `"MY_PLUGIN"`
pub fn constant(input: &str) -> String {
    input.to_shouty_snake_case()
}
