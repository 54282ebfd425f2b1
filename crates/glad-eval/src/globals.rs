//! The global frame every run starts from.

use crate::scope::{ScopeArena, ScopeId};
use crate::value::{Builtin, TypeTag, Value};

/// Bind the constants, type tags and builtins into `scope`.
pub fn install(scopes: &mut ScopeArena, scope: ScopeId) {
    scopes.set(scope, "NULL", Value::null());
    scopes.set(scope, "FALSE", Value::bool(false));
    scopes.set(scope, "TRUE", Value::bool(true));
    for tag in TypeTag::ALL {
        scopes.set(scope, tag.name(), Value::Type(tag));
    }
    for builtin in Builtin::ALL {
        scopes.set(scope, builtin.name(), Value::Builtin(builtin));
    }
    scopes.set(scope, "LENGTH", Value::Builtin(Builtin::Len));
}
