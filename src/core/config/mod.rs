pub mod data;
pub mod defaults;
pub mod io;

pub use data::Config;

#[cfg(test)]
pub mod tests;
