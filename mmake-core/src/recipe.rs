//! Minimal recipe (Makefile) grammar
//!
//! Only enough of make's syntax is understood to list target names and
//! pull out a target's recipe body. Everything else is skipped.

/// Special targets and directives make reserves for itself
pub const RESERVED_DIRECTIVES: &[&str] = &[
    ".PHONY",
    ".SUFFIXES",
    ".DEFAULT",
    ".PRECIOUS",
    ".INTERMEDIATE",
    ".SECONDARY",
    ".SECONDEXPANSION",
    ".DELETE_ON_ERROR",
    ".IGNORE",
    ".LOW_RESOLUTION_TIME",
    ".SILENT",
    ".EXPORT_ALL_VARIABLES",
    ".NOTPARALLEL",
    ".ONESHELL",
    ".POSIX",
    ".SHELLFLAGS",
    ".FEATURES",
    ".MAKE",
    ".VARIABLES",
    ".MAKEFILE_LIST",
    ".MAKEFLAGS",
    ".TARGETS",
    ".THIS_FILE",
    ".DEFAULT_GOAL",
    ".RECIPEPREFIX",
    ".SHELL",
    ".LIBPATTERNS",
];

/// A target definition together with its recipe body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecipeTarget {
    pub name: String,
    /// Tab-prefixed body lines, verbatim, each terminated by `\n`
    pub body: String,
}

/// Target names in file order. Duplicates are kept.
pub fn parse_targets(text: &str) -> Vec<String> {
    text.lines().filter_map(target_name).map(str::to_string).collect()
}

/// Find the first definition of `name` and collect its recipe body.
pub fn target_body(name: &str, text: &str) -> Option<RecipeTarget> {
    let mut found: Option<RecipeTarget> = None;

    for line in text.lines() {
        if line.is_empty() {
            continue;
        }
        if let Some(target) = found.as_mut() {
            if !line.starts_with('\t') {
                break;
            }
            target.body.push_str(line);
            target.body.push('\n');
            continue;
        }
        if target_name(line) == Some(name) {
            found = Some(RecipeTarget {
                name: name.to_string(),
                body: String::new(),
            });
        }
    }

    found
}

/// Returns the target a line defines, if it defines one.
///
/// Skipped: blank lines, comments, recipe lines (leading tab or space),
/// directives (`.`), variable references (`$`) and pattern rules (`%`).
pub fn target_name(line: &str) -> Option<&str> {
    let first = line.chars().next()?;
    if matches!(first, '#' | '.' | '\t' | ' ' | '\r' | '$' | '%') {
        return None;
    }
    if RESERVED_DIRECTIVES.contains(&line) {
        return None;
    }
    if line.contains(" :") {
        return None;
    }

    line.split_once(':').map(|(name, _)| name)
}

/// Render a new target definition for appending to a Makefile.
pub fn render_target(name: &str, command: &str) -> String {
    format!("\n\n{name}:\n\t{command}\n")
}
