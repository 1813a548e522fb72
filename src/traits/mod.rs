pub mod channel;

pub use channel::ControllerChannel;
