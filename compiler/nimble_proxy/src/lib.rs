//! Proxy façades for Nimble.
//!
//! A façade pairs a member descriptor with the thunk compiled for it and
//! exposes `invoke` / `get_value` / `set_value` over boxed [`Value`]s, plus
//! `*_as::<T>` forms that convert the result with [`FromValue`].
//!
//! ```text
//! let ctor = ConstructorProxy::new(sample)?;
//! let method2 = MethodProxy::find(sample, "Method2")?;
//! let instance = ctor.invoke(&[])?;
//! let two: i32 = method2.invoke_as(&instance, &[Value::from(1)])?;
//! ```
//!
//! Lookup and compilation happen when the façade is built and fail with a
//! [`CompileError`]; invocation fails with an [`InvokeError`]. Façades are
//! not cached: each constructor call compiles fresh thunks.
//!
//! [`Value`]: nimble_meta::Value
//! [`FromValue`]: nimble_meta::FromValue
//! [`CompileError`]: nimble_thunk::CompileError
//! [`InvokeError`]: nimble_meta::InvokeError

mod constructor;
mod field;
mod method;
mod property;

use std::fmt;
use std::sync::Once;

use nimble_meta::{wrong_arg_count, InvokeError};

pub use constructor::ConstructorProxy;
pub use field::FieldProxy;
pub use method::MethodProxy;
pub use property::PropertyProxy;

static TRACING_INIT: Once = Once::new();

/// Initialize tracing for debug output.
///
/// Call this once at startup. Safe to call multiple times.
/// Enable with `RUST_LOG=nimble_thunk=debug` or `RUST_LOG=nimble_emit=trace`.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        // Only initialize if RUST_LOG is set
        if std::env::var("RUST_LOG").is_ok() {
            let filter = EnvFilter::from_default_env();
            tracing_subscriber::registry()
                .with(fmt::layer().with_target(true).with_level(true))
                .with(filter)
                .init();
        }
    });
}

/// Reject an argument array whose length differs from the parameter count.
fn check_arity(member: impl fmt::Display, expected: usize, got: usize) -> Result<(), InvokeError> {
    if expected == got {
        Ok(())
    } else {
        Err(wrong_arg_count(member, expected, got))
    }
}

/// `name(T1, T2)`, for lookup errors on overloaded members.
fn signature_name(name: &str, params: &[nimble_meta::TypeRef]) -> String {
    let params: Vec<&str> = params.iter().map(|ty| ty.name()).collect();
    format!("{name}({})", params.join(", "))
}
