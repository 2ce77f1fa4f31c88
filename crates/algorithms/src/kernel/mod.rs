//! Distance-weighted kernel construction
//!
//! - **expr**: textual decay-expression parsing (`x`, `r`, `o`)
//! - **builder**: physically scaled kernel grids

mod builder;
mod expr;

pub use builder::{build_kernel, KernelParams, DEFAULT_OMEGA};
pub use expr::{DecayExpr, DEFAULT_DECAY_EXPR};
