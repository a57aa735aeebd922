/// Directory holding the showcase models and baked textures.
pub const RELATIVE_MANIFEST_PATH: &str = "showcase";

/// File name of the resource manifest inside [`RELATIVE_MANIFEST_PATH`].
pub const MANIFEST_FILE_NAME: &str = "manifest.json";
