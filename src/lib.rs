pub mod arguments;
pub mod error;
pub mod interactive;
pub mod outcome;
pub mod parsers;
pub mod runner;
pub mod version;
