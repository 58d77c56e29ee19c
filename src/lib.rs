// Motion control runtime for a two-wheeled differential-drive robot

pub mod config;
pub mod control;
pub mod hal;
pub mod messages;
pub mod motor;
pub mod runtime;
pub mod sim;
pub mod tuning;
