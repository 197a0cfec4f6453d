pub mod logging;
pub mod upsc;
