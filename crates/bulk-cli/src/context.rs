//! Checkout context detection
//!
//! Commands work from anywhere inside a checkout: the root is the closest
//! ancestor holding `.restbulk/meta.json`.

use std::path::{Component, Path, PathBuf};

use tracing::debug;

use bulk_core::SyncEngine;
use bulk_fs::{BulkPath, ConfigStore, NormalizedPath, OsFileStore};
use bulk_http::{ClientConfig, ReqwestClient};

use crate::cli::ClientArgs;
use crate::error::{CliError, Result};

/// Walk up from `start` to the first checkout root.
pub fn find_checkout_root(start: &Path) -> Option<PathBuf> {
    start
        .ancestors()
        .find(|dir| dir.join(BulkPath::Meta.as_str()).is_file())
        .map(Path::to_path_buf)
}

/// HTTP client configuration for a checkout.
///
/// Starts from `.restbulk/config.toml` when present, then applies the
/// command-line overrides.
pub fn client_config(root: &Path, args: &ClientArgs) -> Result<ClientConfig> {
    let path = NormalizedPath::new(root.join(BulkPath::ClientConfig.as_str()));
    let mut config = if path.is_file() {
        debug!(path = %path, "loading client config");
        ConfigStore::new().load::<ClientConfig>(&path)?
    } else {
        ClientConfig::default()
    };

    for header in &args.headers {
        config.add_header(header)?;
    }
    if args.timeout.is_some() {
        config.timeout_secs = args.timeout;
    }
    Ok(config)
}

/// Build an engine over the checkout at `root`.
pub fn engine_at(root: &Path, args: &ClientArgs) -> Result<SyncEngine> {
    let client = ReqwestClient::new(&client_config(root, args)?)?;
    Ok(SyncEngine::open(
        Box::new(OsFileStore::new(root)),
        Box::new(client),
    )?)
}

/// Locate the checkout around `cwd` and open it.
pub fn open_checkout(cwd: &Path, args: &ClientArgs) -> Result<(PathBuf, SyncEngine)> {
    let cwd = dunce::canonicalize(cwd)?;
    let root = find_checkout_root(&cwd).ok_or_else(|| {
        CliError::user(format!(
            "Not a restbulk checkout (or any parent up to /): {}",
            cwd.display()
        ))
    })?;
    debug!(root = %root.display(), "found checkout");
    let engine = engine_at(&root, args)?;
    Ok((root, engine))
}

/// Checkout-relative form of a path given relative to `cwd`.
pub fn checkout_path(root: &Path, cwd: &Path, arg: &str) -> Result<String> {
    let cwd = dunce::canonicalize(cwd)?;
    let prefix = cwd.strip_prefix(root).unwrap_or(Path::new(""));
    let outside = || CliError::user(format!("{arg} is outside the checkout"));

    let mut parts: Vec<String> = Vec::new();
    for component in prefix.join(arg).components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy().into_owned()),
            Component::CurDir => {}
            Component::ParentDir => {
                parts.pop().ok_or_else(outside)?;
            }
            Component::RootDir | Component::Prefix(_) => return Err(outside()),
        }
    }

    let path = NormalizedPath::new(parts.join("/"));
    if !path.is_contained() {
        return Err(outside());
    }
    Ok(path.as_str().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn checkout_dir() -> TempDir {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join(".restbulk")).unwrap();
        fs::write(
            temp.path().join(".restbulk/meta.json"),
            r#"{"url": "https://x.test/items"}"#,
        )
        .unwrap();
        temp
    }

    #[test]
    fn finds_root_from_nested_directory() {
        let temp = checkout_dir();
        let nested = temp.path().join("users/admins");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(find_checkout_root(&nested).as_deref(), Some(temp.path()));
    }

    #[test]
    fn no_root_outside_checkout() {
        let temp = TempDir::new().unwrap();
        assert_eq!(find_checkout_root(temp.path()), None);
    }

    #[test]
    fn paths_are_made_checkout_relative() {
        let temp = checkout_dir();
        let root = dunce::canonicalize(temp.path()).unwrap();
        let nested = root.join("users");
        fs::create_dir_all(&nested).unwrap();

        assert_eq!(checkout_path(&root, &nested, "7.json").unwrap(), "users/7.json");
        assert_eq!(checkout_path(&root, &nested, "../a.json").unwrap(), "a.json");
        assert!(checkout_path(&root, &root, "../escape.json").is_err());
    }

    #[test]
    fn client_config_file_is_overlaid_by_flags() {
        let temp = checkout_dir();
        fs::write(
            temp.path().join(".restbulk/config.toml"),
            "timeout_secs = 30\n\n[headers]\nX-Team = \"core\"\n",
        )
        .unwrap();
        let args = ClientArgs {
            headers: vec!["Authorization: Bearer t".to_string()],
            timeout: Some(5),
        };

        let config = client_config(temp.path(), &args).unwrap();

        assert_eq!(config.timeout_secs, Some(5));
        assert_eq!(config.headers.get("X-Team").map(String::as_str), Some("core"));
        assert_eq!(
            config.headers.get("Authorization").map(String::as_str),
            Some("Bearer t")
        );
    }

    #[test]
    fn missing_client_config_uses_defaults() {
        let temp = checkout_dir();
        let config = client_config(temp.path(), &ClientArgs::default()).unwrap();
        assert_eq!(config, ClientConfig::default());
    }
}
