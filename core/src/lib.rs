pub mod advisory;
pub mod error;
pub mod intake;
pub mod risk;
pub mod symptoms;
