// ABOUTME: Template and step data structures
// ABOUTME: A template is a named, versioned environment plus an ordered list of steps

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::env::Env;
use super::identity::Identity;
use super::version::Version;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Template {
    pub description: String,
    pub author: String,
    pub namespace: String,
    pub version: Version,
    pub env: Env,
    pub steps: Vec<Step>,
}

/// One unit of execution. A step embeds a template so that a sub-template
/// invocation can carry its resolved body inline.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Step {
    #[serde(flatten)]
    pub template: Template,
    /// Boolean expression; empty never skips.
    pub skip: String,
    /// Identity of the referenced template; non-empty makes this a sub-template step.
    pub uses: String,
    pub method: String,
    pub url: String,
    pub body: String,
    pub header: IndexMap<String, HeaderValues>,
    /// Variables registered after the step runs, optionally chained through a nested `set`.
    pub set: Option<Env>,
    /// Variables exported to the caller.
    pub out: Env,
}

/// Header values for one header name. Accepts a single string or a list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "OneOrMany")]
pub struct HeaderValues(pub Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    One(String),
    Many(Vec<String>),
}

impl From<OneOrMany> for HeaderValues {
    fn from(value: OneOrMany) -> Self {
        match value {
            OneOrMany::One(value) => Self(vec![value]),
            OneOrMany::Many(values) => Self(values),
        }
    }
}

impl HeaderValues {
    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl Template {
    pub fn identity(&self) -> Identity {
        Identity::new(self.author.clone(), self.namespace.clone(), self.version)
    }

    /// Render the step tree, one line per step, indented by nesting depth.
    pub fn tree(&self, indent: &str) -> String {
        let mut lines = vec![self.identity().to_string()];
        for step in &self.steps {
            step.write_tree(1, indent, &mut lines);
        }
        lines.join("\n")
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.description.is_empty() {
            write!(f, "{}", self.identity())
        } else {
            write!(f, "{}: {}", self.identity(), self.description)
        }
    }
}

impl Step {
    pub fn is_sub_template(&self) -> bool {
        !self.uses.is_empty()
    }

    pub fn is_http(&self) -> bool {
        self.uses.is_empty() && !self.url.is_empty()
    }

    /// Short label used in logs and error context.
    pub fn label(&self) -> String {
        if self.is_sub_template() {
            self.uses.clone()
        } else if self.is_http() {
            format!("{} {}", self.method_or_default(), self.url)
        } else {
            self.template.identity().to_string()
        }
    }

    pub fn method_or_default(&self) -> &str {
        if self.method.is_empty() {
            "GET"
        } else {
            &self.method
        }
    }

    fn write_tree(&self, depth: usize, indent: &str, lines: &mut Vec<String>) {
        let prefix = indent.repeat(depth);
        if self.url.is_empty() {
            lines.push(format!("{}{}", prefix, self.template.identity()));
        } else {
            lines.push(format!("{}{} {}", prefix, self.method_or_default(), self.url));
        }
        for step in &self.template.steps {
            step.write_tree(depth + 1, indent, lines);
        }
    }
}
