use serde::de::DeserializeOwned;
use std::path::Path;

/// Load a TOML configuration file, matching the teacher's
/// `GameConfig::load` (`serdeconv::from_toml_file`). Returns the type's
/// `Default` when the file does not exist so a fresh checkout can boot with
/// no configuration present.
pub fn load_or_default<T>(path: impl AsRef<Path>) -> T
where
    T: DeserializeOwned + Default,
{
    let path = path.as_ref();
    if !path.exists() {
        return T::default();
    }

    serdeconv::from_toml_file(path)
        .unwrap_or_else(|err| panic!("error loading config file {}: {}", path.display(), err))
}
