//! Monitor argument handling: merging definition defaults with per-monitor
//! overrides, validating them against the definition's argument spec, and
//! expanding `{{name}}` placeholders into a concrete command line.
//!
//! Validation happens at monitor-activation time, not at check time, so a
//! bad argument set surfaces as a configuration error instead of a monitor
//! that fails every check.

use std::collections::HashMap;
use upmon_common::types::ArgSpec;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ArgError {
    #[error("missing required argument '{0}'")]
    MissingArgument(String),
    #[error("unknown argument '{0}'")]
    UnknownArgument(String),
    #[error("unresolved placeholder '{0}' in command template")]
    UnresolvedPlaceholder(String),
}

/// Check that all required arguments are supplied and that no override
/// names an argument the definition does not declare.
pub fn validate_args(
    specs: &[ArgSpec],
    overrides: &HashMap<String, String>,
) -> Result<(), ArgError> {
    for spec in specs {
        if spec.required && !overrides.contains_key(&spec.name) {
            return Err(ArgError::MissingArgument(spec.name.clone()));
        }
    }
    for name in overrides.keys() {
        if !specs.iter().any(|s| &s.name == name) {
            return Err(ArgError::UnknownArgument(name.clone()));
        }
    }
    Ok(())
}

/// Definition defaults overridden by per-monitor values. Performs no
/// validation; callers that need it run [`validate_args`] first.
pub fn merged_args(
    specs: &[ArgSpec],
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged: HashMap<String, String> = specs
        .iter()
        .map(|s| (s.name.clone(), s.default_value.clone()))
        .collect();
    for (name, value) in overrides {
        merged.insert(name.clone(), value.clone());
    }
    merged
}

/// Expand a definition's command-line template into an argument vector.
///
/// Validates the overrides, renders `{{name}}` placeholders from the merged
/// argument map, rejects any placeholder left unresolved, and splits the
/// rendered string into words honoring quoting.
pub fn expand_cmdline(
    tmpl: &str,
    specs: &[ArgSpec],
    overrides: &HashMap<String, String>,
) -> Result<Vec<String>, ArgError> {
    validate_args(specs, overrides)?;
    let rendered = render_template(tmpl, &merged_args(specs, overrides));
    if let Some(name) = first_placeholder(&rendered) {
        return Err(ArgError::UnresolvedPlaceholder(name));
    }
    Ok(split_cmdline(&rendered))
}

/// Render a monitor description from the definition's description template.
///
/// Descriptions are informational; unresolved placeholders are left in
/// place rather than treated as errors.
pub fn render_description(
    tmpl: &str,
    specs: &[ArgSpec],
    overrides: &HashMap<String, String>,
) -> String {
    render_template(tmpl, &merged_args(specs, overrides))
}

fn render_template(tmpl: &str, args: &HashMap<String, String>) -> String {
    let mut out = tmpl.to_string();
    for (name, value) in args {
        out = out.replace(&format!("{{{{{name}}}}}"), value);
    }
    out
}

fn first_placeholder(rendered: &str) -> Option<String> {
    let start = rendered.find("{{")?;
    let rest = &rendered[start + 2..];
    let end = rest.find("}}")?;
    Some(rest[..end].trim().to_string())
}

/// Split a rendered command line into words, honoring single and double
/// quotes and backslash escapes outside single quotes.
pub fn split_cmdline(line: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();
    let mut in_word = false;
    let mut quote: Option<char> = None;
    let mut chars = line.chars();

    while let Some(c) = chars.next() {
        match quote {
            Some('\'') => {
                if c == '\'' {
                    quote = None;
                } else {
                    current.push(c);
                }
            }
            Some('"') => match c {
                '"' => quote = None,
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                    }
                }
                _ => current.push(c),
            },
            _ => match c {
                '\'' | '"' => {
                    quote = Some(c);
                    in_word = true;
                }
                '\\' => {
                    if let Some(next) = chars.next() {
                        current.push(next);
                        in_word = true;
                    }
                }
                c if c.is_whitespace() => {
                    if in_word {
                        words.push(std::mem::take(&mut current));
                        in_word = false;
                    }
                }
                _ => {
                    current.push(c);
                    in_word = true;
                }
            },
        }
    }
    if in_word {
        words.push(current);
    }
    words
}
