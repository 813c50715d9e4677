pub mod item;
pub mod queue;
pub mod rate;
pub mod session;
