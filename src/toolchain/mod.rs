//! Compiler toolchain introspection
//!
//! Works out which compiler a build will actually run, whether it is
//! GCC- or Clang-family, and what the host CPU looks like through that
//! compiler's eyes. Everything here degrades softly: a missing or broken
//! compiler yields defaults, never an error.

mod family;
mod native;

pub use family::{
    compiler_command, compiler_executable, detect_family, resolve_family, CompilerFamily,
};
pub use native::{probe_native, NativeTarget};
