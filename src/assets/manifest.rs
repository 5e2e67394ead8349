use std::collections::HashSet;

use crate::foundation::error::{BackdropError, BackdropResult};

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
/// Recipe for the ordered list of candidate model locators.
///
/// Expansion order: `priority` as given, then `{base}/{name}{ext}` for every name and
/// extension, then `{base}/{folder}/{name}{ext}` for every folder, name and extension.
pub struct CandidateManifest {
    /// Locators tried before anything generated.
    pub priority: Vec<String>,
    /// Root all generated locators live under.
    pub base: String,
    /// File stems.
    pub names: Vec<String>,
    /// Extensions including the leading dot.
    pub extensions: Vec<String>,
    /// Sub-folders of `base` searched after `base` itself.
    pub folders: Vec<String>,
}

impl Default for CandidateManifest {
    fn default() -> Self {
        let strings = |xs: &[&str]| xs.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            priority: strings(&["/assets/porsche_911_gt1_straenversion_www.vecarz.com.glb"]),
            base: "/assets".to_string(),
            names: strings(&[
                "background",
                "model",
                "scene",
                "main",
                "world",
                "environment",
                "porsche_911_gt1_straenversion_www.vecarz.com",
            ]),
            extensions: strings(&[".glb", ".gltf"]),
            folders: strings(&[
                "models",
                "background",
                "3d",
                "models/background",
                "models/3d",
            ]),
        }
    }
}

impl CandidateManifest {
    pub fn validate(&self) -> BackdropResult<()> {
        if self.priority.is_empty() && (self.names.is_empty() || self.extensions.is_empty()) {
            return Err(BackdropError::validation(
                "candidate manifest produces no locators",
            ));
        }
        if let Some(ext) = self.extensions.iter().find(|e| !e.starts_with('.')) {
            return Err(BackdropError::validation(format!(
                "manifest extension '{ext}' must start with '.'"
            )));
        }
        Ok(())
    }

    /// Expand into the ordered, duplicate-free candidate list.
    pub fn expand(&self) -> Vec<String> {
        let base = self.base.trim_end_matches('/');
        let mut out = self.priority.clone();
        for name in &self.names {
            for ext in &self.extensions {
                out.push(format!("{base}/{name}{ext}"));
            }
        }
        for folder in &self.folders {
            let folder = folder.trim_matches('/');
            for name in &self.names {
                for ext in &self.extensions {
                    out.push(format!("{base}/{folder}/{name}{ext}"));
                }
            }
        }
        dedup_locators(&out)
    }
}

/// Drop repeated locators, keeping the first occurrence of each.
pub fn dedup_locators<S: AsRef<str>>(locators: &[S]) -> Vec<String> {
    let mut seen = HashSet::with_capacity(locators.len());
    locators
        .iter()
        .map(|l| l.as_ref())
        .filter(|l: &&str| seen.insert(*l))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
