use crate::domain::{ContainerKind, CreateOptions};
use crate::error::ManagerError;
use anyhow::{Context, Result, bail};
use serde::Serialize;
use serde_json::{Map, Value, json};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};

pub const CONFIG_FILE_NAME: &str = "config.json";
pub const CONTAINERS_DIR_NAME: &str = "containers";

const DEFAULT_REFRESH_INTERVAL_MS: u64 = 5000;

pub fn default_config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".houer-manager")
}

pub fn ensure_config_dir(config_dir: &Path) -> Result<()> {
    fs::create_dir_all(config_dir.join(CONTAINERS_DIR_NAME))
        .with_context(|| format!("creating {:?}", config_dir))
}

/// The document every loaded settings file is merged over.
pub fn default_document(containers_dir: &Path) -> Value {
    json!({
        "theme": "light",
        "auto_refresh": true,
        "refresh_interval": DEFAULT_REFRESH_INTERVAL_MS,
        "container_storage_path": containers_dir.to_string_lossy(),
        "supported_distros": {
            "linux": [
                "ubuntu:latest",
                "fedora:latest",
                "debian:latest",
                "archlinux:latest",
                "alpine:latest",
                "opensuse/tumbleweed:latest",
                "centos:stream9"
            ],
            "windows": ["windows-10", "windows-11"]
        },
        "distrobox_options": {
            "home_sharing": true,
            "nvidia_support": false,
            "audio_support": true,
            "additional_packages": []
        },
        "soda_options": {
            "dxvk_enabled": true,
            "vulkan_enabled": true,
            "audio_driver": "pulseaudio"
        }
    })
}

/// Merges `overlay` into `base`.
///
/// Objects present on both sides are merged key by key, recursively. Any other
/// overlay value replaces what `base` had. Keys only present in `base` are kept
/// and keys only present in `overlay` are added.
pub fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) if existing.is_object() && value.is_object() => {
                        deep_merge(existing, value)
                    }
                    _ => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}

/// Application settings: the on-disk `config.json` merged over the defaults.
#[derive(Debug, Clone)]
pub struct Settings {
    config_dir: PathBuf,
    document: Value,
}

impl Settings {
    /// Loads settings from `config_dir`, creating the directory layout.
    ///
    /// A missing file is written out with the defaults. A file that cannot be
    /// parsed is reported and the defaults are used without touching it.
    /// Failing to create the directory or write the defaults is a
    /// [`ManagerError::Config`].
    pub fn load(config_dir: &Path) -> std::result::Result<Self, ManagerError> {
        Ok(Self::read(config_dir)?)
    }

    fn read(config_dir: &Path) -> Result<Self> {
        ensure_config_dir(config_dir)?;

        let containers_dir = config_dir.join(CONTAINERS_DIR_NAME);
        let mut document = default_document(&containers_dir);
        let path = config_dir.join(CONFIG_FILE_NAME);

        if !path.exists() {
            let settings = Self {
                config_dir: config_dir.to_path_buf(),
                document,
            };
            settings.save()?;
            debug!(path = ?settings.path(), "wrote default settings");
            return Ok(settings);
        }

        match read_object(&path) {
            Ok(on_disk) => deep_merge(&mut document, on_disk),
            Err(e) => warn!(path = ?path, error = %e, "ignoring unreadable settings, using defaults"),
        }

        Ok(Self {
            config_dir: config_dir.to_path_buf(),
            document,
        })
    }

    pub fn path(&self) -> PathBuf {
        self.config_dir.join(CONFIG_FILE_NAME)
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Looks up a dotted key such as `distrobox_options.nvidia_support`.
    pub fn get(&self, key: &str) -> Option<&Value> {
        key.split('.')
            .try_fold(&self.document, |node, part| node.get(part))
    }

    /// Sets a dotted key, creating intermediate objects, and persists.
    pub fn set(&mut self, key: &str, value: Value) -> Result<()> {
        let mut parts: Vec<&str> = key.split('.').collect();
        let Some(last) = parts.pop().filter(|last| !last.is_empty()) else {
            bail!("invalid settings key {key:?}");
        };

        let mut node = &mut self.document;
        for part in parts {
            node = object_mut(node)
                .entry(part.to_string())
                .or_insert_with(|| Value::Object(Map::new()));
        }
        object_mut(node).insert(last.to_string(), value);

        self.save()
    }

    pub fn save(&self) -> Result<()> {
        write_pretty(&self.path(), &self.document)
    }

    /// Default options for new Linux containers
    pub fn distrobox_options(&self) -> CreateOptions {
        self.get("distrobox_options")
            .and_then(|value| serde_json::from_value(value.clone()).ok())
            .unwrap_or_default()
    }

    pub fn supported_distros(&self, kind: ContainerKind) -> Vec<String> {
        let key = format!("supported_distros.{kind}");
        self.get(&key)
            .and_then(Value::as_array)
            .map(|items| {
                items
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn auto_refresh(&self) -> bool {
        self.get("auto_refresh")
            .and_then(Value::as_bool)
            .unwrap_or(true)
    }

    pub fn refresh_interval(&self) -> Duration {
        let millis = self
            .get("refresh_interval")
            .and_then(Value::as_u64)
            .filter(|ms| *ms > 0)
            .unwrap_or(DEFAULT_REFRESH_INTERVAL_MS);
        Duration::from_millis(millis)
    }

    /// Optional bound on every waited backend call (`command_timeout_secs`)
    pub fn command_timeout(&self) -> Option<Duration> {
        self.get("command_timeout_secs")
            .and_then(Value::as_u64)
            .filter(|secs| *secs > 0)
            .map(Duration::from_secs)
    }

    /// Directory holding per-container documents, `~` expanded
    pub fn storage_dir(&self) -> PathBuf {
        match self
            .get("container_storage_path")
            .and_then(Value::as_str)
            .filter(|path| !path.trim().is_empty())
        {
            Some(path) => PathBuf::from(shellexpand::tilde(path).into_owned()),
            None => self.config_dir.join(CONTAINERS_DIR_NAME),
        }
    }

    pub fn container_configs(&self) -> ContainerConfigStore {
        ContainerConfigStore::new(self.storage_dir())
    }
}

/// One freeform JSON document per container name.
#[derive(Debug, Clone)]
pub struct ContainerConfigStore {
    dir: PathBuf,
}

impl ContainerConfigStore {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn path(&self, name: &str) -> PathBuf {
        self.dir.join(format!("{name}.json"))
    }

    /// Missing or unreadable documents load as empty.
    pub fn load(&self, name: &str) -> Map<String, Value> {
        let path = self.path(name);
        if !path.exists() {
            return Map::new();
        }

        match read_object(&path) {
            Ok(Value::Object(map)) => map,
            Ok(_) => Map::new(),
            Err(e) => {
                warn!(container = name, error = %e, "ignoring unreadable container config");
                Map::new()
            }
        }
    }

    pub fn save(&self, name: &str, config: &Map<String, Value>) -> Result<()> {
        fs::create_dir_all(&self.dir).with_context(|| format!("creating {:?}", self.dir))?;
        write_pretty(&self.path(name), config)
    }

    /// Removes the document. Returns whether a file was actually deleted.
    pub fn remove(&self, name: &str) -> Result<bool> {
        let path = self.path(name);
        match fs::remove_file(&path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e).with_context(|| format!("removing {:?}", path)),
        }
    }
}

fn object_mut(value: &mut Value) -> &mut Map<String, Value> {
    if !value.is_object() {
        *value = Value::Object(Map::new());
    }
    match value {
        Value::Object(map) => map,
        _ => unreachable!("value was just replaced by an object"),
    }
}

fn read_object(path: &Path) -> Result<Value> {
    let content = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    let value: Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {:?}", path))?;

    if !value.is_object() {
        bail!("{:?} does not hold a JSON object", path);
    }

    Ok(value)
}

fn write_pretty<T: Serialize + ?Sized>(path: &Path, value: &T) -> Result<()> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value
        .serialize(&mut serializer)
        .with_context(|| format!("serializing {:?}", path))?;

    fs::write(path, buf).with_context(|| format!("writing {:?}", path))
}
