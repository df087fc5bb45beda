// Application Layer - Use Cases

pub mod reconciler;

// Re-exports
pub use reconciler::Reconciler;
