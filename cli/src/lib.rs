pub mod commands;
pub mod relay;
pub mod session;
pub mod timer;
pub mod util;
