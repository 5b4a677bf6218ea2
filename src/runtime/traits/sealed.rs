// ABOUTME: Sealed trait pattern for runtime traits.
// ABOUTME: Only this crate's runtimes implement the capability traits.

/// Prevents implementations outside this crate, so methods can be added to
/// the runtime traits without breaking downstream code.
pub trait Sealed {}
