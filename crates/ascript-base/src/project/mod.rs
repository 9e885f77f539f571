pub mod predefined;

pub use predefined::{LoadedFile, find_predefined_dir, load_directory};
