//! Preset resolution from built-ins, files and preset directories

use std::fmt;
use std::path::{Path, PathBuf};

use serde_json::{Map, Value};
use tracing::{debug, info};
use walkdir::WalkDir;

use super::defaults::{builtin_preset, is_builtin, BUILTIN_PRESET_NAMES};
use crate::domain::model::PresetConfig;
use crate::error::{CaptionError, CaptionResult};

/// Keys whose presence marks a mapping as a single preset
const SINGLE_PRESET_KEYS: &[&str] = &["font_size", "padding", "max_width_px", "font_name", "animation"];

const PRESET_EXTENSIONS: &[&str] = &["json", "yaml", "yml"];

/// Where a preset came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PresetSource {
    BuiltIn(String),
    File(PathBuf),
    /// Named entry in a multi-preset file
    Named { path: PathBuf, name: String },
}

impl PresetSource {
    /// Backing file, if any
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::BuiltIn(_) => None,
            Self::File(path) | Self::Named { path, .. } => Some(path),
        }
    }
}

impl fmt::Display for PresetSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BuiltIn(name) => write!(f, "built-in '{}'", name),
            Self::File(path) => write!(f, "{}", path.display()),
            Self::Named { path, name } => write!(f, "{}:{}", path.display(), name),
        }
    }
}

/// A resolved preset and its origin
#[derive(Debug, Clone)]
pub struct LoadedPreset {
    pub config: PresetConfig,
    pub source: PresetSource,
}

/// An entry in the preset listing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresetListing {
    pub name: String,
    /// `None` for built-ins
    pub path: Option<PathBuf>,
}

pub struct PresetLoader {
    preset_dirs: Vec<PathBuf>,
}

impl Default for PresetLoader {
    fn default() -> Self {
        Self::new(vec![PathBuf::from("presets")])
    }
}

impl PresetLoader {
    pub fn new(preset_dirs: Vec<PathBuf>) -> Self {
        Self { preset_dirs }
    }

    pub fn preset_dirs(&self) -> &[PathBuf] {
        &self.preset_dirs
    }

    /// Resolve a preset reference.
    ///
    /// Tried in order: built-in name, `path:name` into a multi-preset file,
    /// a direct file path, then `name[.json|.yaml|.yml]` in each preset
    /// directory.
    pub fn load(&self, reference: &str) -> CaptionResult<LoadedPreset> {
        if is_builtin(reference) {
            debug!("Using built-in preset {}", reference);
            return Ok(LoadedPreset {
                config: builtin_preset(reference)?,
                source: PresetSource::BuiltIn(reference.to_string()),
            });
        }

        // Split at the last colon so drive letters stay in the path
        if let Some((file_part, name)) = reference.rsplit_once(':') {
            let path = Path::new(file_part);
            if !file_part.is_empty() && path.is_file() {
                return self.load_named(path, name);
            }
        }

        let direct = Path::new(reference);
        if direct.is_file() {
            return self.load_single(direct);
        }

        if let Some(found) = self.resolve_in_directories(reference) {
            return self.load_single(&found);
        }

        Err(CaptionError::preset(format!(
            "Preset '{}' not found. Tried: built-in presets, direct path, preset directories. \
             Available built-ins: {}",
            reference,
            BUILTIN_PRESET_NAMES.join(", ")
        )))
    }

    fn load_single(&self, path: &Path) -> CaptionResult<LoadedPreset> {
        let data = read_mapping(path)?;
        if !is_single_preset(&data) {
            return Err(CaptionError::preset(format!(
                "File '{}' appears to contain multiple presets. Use '{}:preset_name' to specify which one.",
                path.display(),
                path.display()
            )));
        }
        info!("Loaded preset from {}", path.display());
        Ok(LoadedPreset {
            config: PresetConfig::from_value(Value::Object(data))?,
            source: PresetSource::File(path.to_path_buf()),
        })
    }

    fn load_named(&self, path: &Path, name: &str) -> CaptionResult<LoadedPreset> {
        let mut data = read_mapping(path)?;
        let Some(entry) = data.remove(name) else {
            let mut available: Vec<&String> = data.keys().collect();
            available.sort();
            let available: Vec<&str> = available.iter().map(|s| s.as_str()).collect();
            return Err(CaptionError::preset(format!(
                "Preset '{}' not found in '{}'. Available: {}",
                name,
                path.display(),
                available.join(", ")
            )));
        };
        if !entry.is_object() {
            return Err(CaptionError::preset(format!(
                "Preset '{}' in '{}' must be a dictionary",
                name,
                path.display()
            )));
        }
        info!("Loaded preset '{}' from {}", name, path.display());
        Ok(LoadedPreset {
            config: PresetConfig::from_value(entry)?,
            source: PresetSource::Named {
                path: path.to_path_buf(),
                name: name.to_string(),
            },
        })
    }

    fn resolve_in_directories(&self, name: &str) -> Option<PathBuf> {
        for dir in self.preset_dirs.iter().filter(|d| d.is_dir()) {
            let exact = dir.join(name);
            if exact.is_file() {
                return Some(exact);
            }
            for ext in PRESET_EXTENSIONS {
                let candidate = dir.join(format!("{}.{}", name, ext));
                if candidate.is_file() {
                    return Some(candidate);
                }
            }
        }
        None
    }

    /// Built-ins followed by preset files found in the preset directories
    pub fn list_available(&self) -> Vec<PresetListing> {
        let mut listing: Vec<PresetListing> = BUILTIN_PRESET_NAMES
            .iter()
            .map(|name| PresetListing {
                name: name.to_string(),
                path: None,
            })
            .collect();

        for dir in self.preset_dirs.iter().filter(|d| d.is_dir()) {
            let mut files: Vec<PathBuf> = WalkDir::new(dir)
                .min_depth(1)
                .max_depth(1)
                .into_iter()
                .filter_map(|entry| entry.ok())
                .filter(|entry| entry.file_type().is_file() && has_preset_extension(entry.path()))
                .map(|entry| entry.into_path())
                .collect();
            files.sort();
            listing.extend(files.into_iter().map(|path| PresetListing {
                name: path
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_default(),
                path: Some(path),
            }));
        }
        listing
    }
}

fn has_preset_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| PRESET_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_single_preset(data: &Map<String, Value>) -> bool {
    SINGLE_PRESET_KEYS.iter().any(|key| data.contains_key(*key))
}

/// Write a preset to a JSON or YAML file.
///
/// With `name`, only that entry of a multi-preset file is replaced and the
/// other presets are kept.
pub fn save_preset(path: &Path, name: Option<&str>, preset: &PresetConfig) -> CaptionResult<()> {
    let value = match name {
        Some(name) => {
            let mut data = if path.is_file() { read_mapping(path)? } else { Map::new() };
            data.insert(name.to_string(), preset.to_value()?);
            Value::Object(data)
        }
        None => preset.to_value()?,
    };
    let text = match file_extension(path).as_str() {
        "yaml" | "yml" => serde_yaml::to_string(&value)?,
        _ => serde_json::to_string_pretty(&value)?,
    };
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, text)?;
    info!("Saved preset to {}", path.display());
    Ok(())
}

fn file_extension(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default()
}

/// Read a JSON or YAML file whose top level must be a mapping
fn read_mapping(path: &Path) -> CaptionResult<Map<String, Value>> {
    let ext = file_extension(path);
    let text = std::fs::read_to_string(path)?;
    let value: Value = match ext.as_str() {
        "json" => serde_json::from_str(&text)?,
        "yaml" | "yml" => serde_yaml::from_str(&text)?,
        _ => {
            return Err(CaptionError::preset(format!(
                "Unsupported preset file extension '.{}'. Use .json, .yaml, or .yml",
                ext
            )))
        }
    };
    match value {
        Value::Object(map) => Ok(map),
        _ => Err(CaptionError::preset(format!(
            "Preset file '{}' must contain a dictionary",
            path.display()
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn write(dir: &TempDir, name: &str, content: &str) -> PathBuf {
        let path = dir.path().join(name);
        fs::write(&path, content).unwrap();
        path
    }

    #[test]
    fn test_builtin_first() {
        let loaded = PresetLoader::default().load("modern_box").unwrap();
        assert_eq!(loaded.source, PresetSource::BuiltIn("modern_box".into()));
        assert_eq!(loaded.config.font_size, 62);
        assert!(loaded.source.path().is_none());
    }

    #[test]
    fn test_single_json_file() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "mine.json", r#"{"font_size": 40, "bold": true}"#);
        let loaded = PresetLoader::default()
            .load(path.to_str().unwrap())
            .unwrap();
        assert_eq!(loaded.config.font_size, 40);
        assert_eq!(loaded.source, PresetSource::File(path));
    }

    #[test]
    fn test_named_preset_in_yaml() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "many.yaml",
            "big:\n  font_size: 90\nsmall:\n  font_size: 30\n  animation:\n    type: fade\n    in_ms: 50\n    out_ms: 50\n",
        );
        let loader = PresetLoader::default();
        let reference = format!("{}:small", path.display());
        let loaded = loader.load(&reference).unwrap();
        assert_eq!(loaded.config.font_size, 30);
        assert_eq!(loaded.config.animation.unwrap().kind, "fade");
        assert_eq!(loaded.source.path(), Some(path.as_path()));

        let err = loader.load(&format!("{}:medium", path.display())).unwrap_err();
        assert!(err.to_string().contains("Available: big, small"));
    }

    #[test]
    fn test_multi_preset_without_name_errors() {
        let dir = TempDir::new().unwrap();
        let path = write(&dir, "many.json", r#"{"a": {"font_size": 1}, "b": {"font_size": 2}}"#);
        let err = PresetLoader::default()
            .load(path.to_str().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("appears to contain multiple presets"));
    }

    #[test]
    fn test_search_preset_dirs() {
        let dir = TempDir::new().unwrap();
        write(&dir, "warm.yml", "font_name: Inter\n");
        let loader = PresetLoader::new(vec![dir.path().to_path_buf()]);
        let loaded = loader.load("warm").unwrap();
        assert_eq!(loaded.config.font_name, "Inter");
    }

    #[test]
    fn test_not_found_lists_builtins() {
        let loader = PresetLoader::new(vec![]);
        let err = loader.load("nope").unwrap_err();
        assert!(err.to_string().contains("Available built-ins: clean_outline, modern_box"));
    }

    #[test]
    fn test_unsupported_extension_and_non_mapping() {
        let dir = TempDir::new().unwrap();
        let txt = write(&dir, "preset.txt", "font_size: 3");
        assert!(PresetLoader::default().load(txt.to_str().unwrap()).is_err());
        let list = write(&dir, "list.json", "[1, 2]");
        let err = PresetLoader::default()
            .load(list.to_str().unwrap())
            .unwrap_err();
        assert!(err.to_string().contains("must contain a dictionary"));
    }

    #[test]
    fn test_list_available() {
        let dir = TempDir::new().unwrap();
        write(&dir, "b.yaml", "font_size: 3\n");
        write(&dir, "a.json", "{}");
        write(&dir, "notes.md", "ignored");
        let loader = PresetLoader::new(vec![dir.path().to_path_buf()]);
        let names: Vec<String> = loader.list_available().into_iter().map(|p| p.name).collect();
        assert_eq!(names, vec!["clean_outline", "modern_box", "a.json", "b.yaml"]);
    }

    #[test]
    fn test_save_named_keeps_other_presets() {
        let dir = TempDir::new().unwrap();
        let path = write(
            &dir,
            "all.yaml",
            "fancy:\n  font_size: 50\nplain:\n  font_size: 40\n",
        );
        let loader = PresetLoader::new(vec![]);
        let mut preset = loader.load(&format!("{}:fancy", path.display())).unwrap().config;
        preset.font_size = 90;

        save_preset(&path, Some("fancy"), &preset).unwrap();
        let reloaded = loader.load(&format!("{}:fancy", path.display())).unwrap();
        assert_eq!(reloaded.config.font_size, 90);
        let plain = loader.load(&format!("{}:plain", path.display())).unwrap();
        assert_eq!(plain.config.font_size, 40);
    }

    #[test]
    fn test_save_single_json() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/mine.json");
        let preset = PresetConfig {
            font_size: 77,
            ..PresetConfig::default()
        };
        save_preset(&path, None, &preset).unwrap();
        let loaded = PresetLoader::new(vec![]).load(path.to_str().unwrap()).unwrap();
        assert_eq!(loaded.config, preset);
        assert_eq!(loaded.source, PresetSource::File(path));
    }
}
