//! Build variable resolution
//!
//! Job names, the server URL and enabled suites may reference build variables
//! as `${NAME}` or `$NAME`. References are resolved against build variables
//! first and the process environment second; unknown references are left as
//! written.

use regex::{Captures, Regex};
use std::collections::HashMap;
use std::sync::LazyLock;
use swarmgate_core::domain::config::TestSuite;

static MACRO: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\$(?:\{([A-Za-z0-9_.]+)\}|([A-Za-z0-9_]+))").expect("valid macro pattern")
});

/// Source of variable values
pub trait VarProvider: Send + Sync {
    /// Get a variable by name
    fn get(&self, name: &str) -> Option<String>;
}

/// Variables passed on the command line
#[derive(Debug, Clone, Default)]
pub struct BuildVarProvider {
    vars: HashMap<String, String>,
}

impl BuildVarProvider {
    pub fn new(vars: impl IntoIterator<Item = (String, String)>) -> Self {
        Self {
            vars: vars.into_iter().collect(),
        }
    }
}

impl VarProvider for BuildVarProvider {
    fn get(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Variables of the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvVarProvider;

impl VarProvider for EnvVarProvider {
    fn get(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// Applies providers in order, each to the output of the previous one
pub struct VariableResolver {
    providers: Vec<Box<dyn VarProvider>>,
}

impl VariableResolver {
    pub fn new(providers: Vec<Box<dyn VarProvider>>) -> Self {
        Self { providers }
    }

    /// Build variables, then the environment
    pub fn for_build(build_vars: BuildVarProvider) -> Self {
        Self::new(vec![Box::new(build_vars), Box::new(EnvVarProvider)])
    }

    pub fn resolve(&self, template: &str) -> String {
        self.providers
            .iter()
            .fold(template.to_string(), |acc, provider| {
                replace_macro(&acc, provider.as_ref())
            })
    }

    /// Resolved copies of the suites
    ///
    /// Disabled suites are copied untouched; the input is never modified.
    pub fn resolve_suites(&self, suites: &[TestSuite]) -> Vec<TestSuite> {
        suites
            .iter()
            .map(|suite| {
                if suite.disabled {
                    return suite.clone();
                }
                TestSuite {
                    name: self.resolve(&suite.name),
                    url: self.resolve(&suite.url),
                    ..suite.clone()
                }
            })
            .collect()
    }
}

/// Substitutes variable references known to the provider
pub fn replace_macro(template: &str, provider: &dyn VarProvider) -> String {
    MACRO
        .replace_all(template, |caps: &Captures| {
            let name = caps
                .get(1)
                .or_else(|| caps.get(2))
                .map(|m| m.as_str())
                .unwrap_or_default();
            provider
                .get(name)
                .unwrap_or_else(|| caps[0].to_string())
        })
        .into_owned()
}

/// Parses a `KEY=VALUE` command line argument
pub fn parse_build_var(arg: &str) -> Result<(String, String), String> {
    match arg.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", arg)),
    }
}
