use std::path::{Path, PathBuf};

pub mod params;
pub mod xml;

/// Resolves `file` relative to the directory of the config file, unless it is absolute or
/// explicitly relative to the working directory.
pub fn resolve_path(config: &Path, file: &Path) -> PathBuf {
    if file.is_absolute() || file.starts_with("./") {
        return file.to_path_buf();
    }

    if let Some(path) = config.parent() {
        path.join(file)
    } else {
        file.to_path_buf()
    }
}

pub trait SumoId {
    fn id(&self) -> &str;
}

#[cfg(test)]
mod tests {
    use std::path::{Path, PathBuf};

    use crate::io::resolve_path;

    #[test]
    fn resolve_relative_to_config() {
        let resolved = resolve_path(
            Path::new("scenarios/emergency/config.yml"),
            Path::new("osm.net.xml.gz"),
        );
        assert_eq!(PathBuf::from("scenarios/emergency/osm.net.xml.gz"), resolved);
    }

    #[test]
    fn keep_explicit_paths() {
        let config = Path::new("scenarios/config.yml");
        assert_eq!(
            PathBuf::from("./routes.rou.xml"),
            resolve_path(config, Path::new("./routes.rou.xml"))
        );
        assert_eq!(
            PathBuf::from("/tmp/routes.rou.xml"),
            resolve_path(config, Path::new("/tmp/routes.rou.xml"))
        );
    }
}
