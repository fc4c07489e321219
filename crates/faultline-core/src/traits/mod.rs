pub mod alert_channel;
pub mod batch_sink;
pub mod context_supplier;

pub use alert_channel::IAlertChannel;
pub use batch_sink::IBatchSink;
pub use context_supplier::IContextSupplier;
