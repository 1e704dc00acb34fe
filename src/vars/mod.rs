//! Variable store and substitution engine
//!
//! Values captured from one response are kept in a [`VariableStore`] and
//! spliced into later endpoint definitions wherever a `{{ name }}`
//! placeholder appears.

mod capture;
mod store;
mod substitute;
mod template;

pub use capture::capture;
pub use store::{Bindings, VariableStore};
pub use substitute::{substitute_endpoint, substitute_map, substitute_str, substitute_value};
pub use template::{canonical_string, referenced_variables, render, TemplateError};
