pub mod fetch;
pub mod geocode;
pub mod output;
pub mod process;
