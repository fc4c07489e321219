use crate::event::ExecutionContext;

/// Supplies the execution context passed alongside events into the learning system.
pub trait IContextSupplier: Send + Sync {
    fn capture(&self) -> ExecutionContext;
}
