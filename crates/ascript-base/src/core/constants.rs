/// AngelScript source file extension
pub const SOURCE_EXT: &str = "as";

/// File that marks the root of an implicit include scope
pub const PREDEFINED_FILENAME: &str = "as.predefined";

/// Checks whether a path has the AngelScript source extension
pub fn is_source_extension(ext: &str) -> bool {
    ext == SOURCE_EXT
}
