pub mod codec;
pub mod config;
pub mod diff;
pub mod logging;
pub mod model;
pub mod sequencer;
pub mod sink;
pub mod source;
