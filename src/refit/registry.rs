//! Refit strategy lookup.
//!
//! Strategies are registered under dotted names, `<module.path>.<function>`,
//! at startup. The last segment names the function, the rest the module.
//! Lookups are one-shot: nothing is cached between refits and the state is
//! never modified here.

use std::collections::BTreeMap;

use log::info;

use crate::error::AppError;
use crate::refit::strategies::{refit_default, refit_turbo_si_c};
use crate::refit::{FitRecord, RefitContext};
use crate::state::RefitState;

pub type RefitFn = Box<dyn Fn(&dyn RefitState, &RefitContext) -> Result<FitRecord, AppError>>;

/// Module path the built-in strategies are registered under.
pub const BUILTIN_MODULE: &str = "hybrid_md.refit";

/// Strategies by module path, then function name.
#[derive(Default)]
pub struct RefitRegistry {
    modules: BTreeMap<String, BTreeMap<String, RefitFn>>,
}

impl RefitRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding `refit_generic` and `refit_turbo_si_c`.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.insert(BUILTIN_MODULE, "refit_generic", Box::new(refit_default));
        registry.insert(BUILTIN_MODULE, "refit_turbo_si_c", Box::new(refit_turbo_si_c));
        registry
    }

    /// Register `f` under a dotted name, replacing any earlier entry.
    pub fn register<F>(&mut self, dotted: &str, f: F) -> Result<&mut Self, AppError>
    where
        F: Fn(&dyn RefitState, &RefitContext) -> Result<FitRecord, AppError> + 'static,
    {
        let (module, function) = split_name(dotted)?;
        self.insert(module, function, Box::new(f));
        Ok(self)
    }

    fn insert(&mut self, module: &str, function: &str, f: RefitFn) {
        self.modules
            .entry(module.to_string())
            .or_default()
            .insert(function.to_string(), f);
    }

    /// Look up a dotted name.
    pub fn resolve(&self, dotted: &str) -> Result<&RefitFn, AppError> {
        let (module, function) = split_name(dotted)?;
        let functions = self.modules.get(module).ok_or_else(|| {
            AppError::config(format!(
                "Refit function's module not found: {module} (registered: {})",
                self.names().join(", ")
            ))
        })?;
        functions.get(function).ok_or_else(|| {
            AppError::config(format!(
                "Refit function ({function}) not found in module {module} (registered: {})",
                self.names().join(", ")
            ))
        })
    }

    /// Every registered dotted name, sorted.
    pub fn names(&self) -> Vec<String> {
        self.modules
            .iter()
            .flat_map(|(module, functions)| functions.keys().map(move |f| format!("{module}.{f}")))
            .collect()
    }

    /// Run the strategy the state names, or the generic one if it names none.
    ///
    /// The strategy's result is returned as is.
    pub fn resolve_and_run(&self, state: &dyn RefitState, ctx: &RefitContext) -> Result<FitRecord, AppError> {
        match state.refit_function_name().filter(|name| !name.is_empty()) {
            None => {
                info!("refitting with the generic strategy");
                refit_default(state, ctx)
            }
            Some(name) => {
                let strategy = self.resolve(name)?;
                info!("refitting with {name}");
                strategy(state, ctx)
            }
        }
    }
}

/// Refit with the built-in strategies only.
pub fn refit(state: &dyn RefitState, ctx: &RefitContext) -> Result<FitRecord, AppError> {
    RefitRegistry::with_builtins().resolve_and_run(state, ctx)
}

fn split_name(dotted: &str) -> Result<(&str, &str), AppError> {
    match dotted.rsplit_once('.') {
        Some((module, function)) if !module.is_empty() && !function.is_empty() => Ok((module, function)),
        _ => Err(AppError::config(format!(
            "Refit function `{dotted}` must be given as `<module.path>.<function>`."
        ))),
    }
}
