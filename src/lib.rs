pub mod error;
pub mod grf;
pub mod grffile;
pub mod read;

mod spec;
