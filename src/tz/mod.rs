//! Functionality for handling timezones and time zone information files (TZif).
pub mod builder;
pub mod dst;
pub mod intern;
pub mod posix;
pub mod store;
pub(crate) mod sync;
pub mod table;
pub mod ttinfo;
pub mod tzif;
pub mod tzpath;
pub mod wall;
pub mod zone;

#[cfg(test)]
pub(crate) mod testing;
