pub mod echo_engine;
pub mod endpoint_enumerator;
pub mod host;
pub mod noise_suppressor;
