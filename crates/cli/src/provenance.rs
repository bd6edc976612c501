use anyhow::{Context, Result};
use serde_json::{json, Value};
use std::ffi::OsString;
use std::fs;
use std::panic::Location;
use std::path::{Path, PathBuf};
use std::process::Command;

/// What produced a result file.
pub struct Payload {
    pub command: &'static str,
    pub params: Value,
    pub tag: Option<String>,
}

impl Payload {
    pub fn new(command: &'static str, params: Value) -> Self {
        Self {
            command,
            params,
            tag: None,
        }
    }

    pub fn tagged(mut self, tag: Option<String>) -> Self {
        self.tag = tag;
        self
    }
}

/// Provenance document: library version, git revision, call site, query parameters, outputs.
#[track_caller]
pub fn document(payload: &Payload, outputs: &[String]) -> Value {
    let callsite = Location::caller();
    json!({
        "library": {"name": "viaroute", "version": viaroute::VERSION},
        "code_rev": current_git_rev(),
        "callsite": {"file": callsite.file(), "line": callsite.line()},
        "tag": payload.tag,
        "command": payload.command,
        "params": payload.params,
        "outputs": outputs,
    })
}

/// Write `<stem>.provenance.json` next to `artifact`.
#[track_caller]
pub fn write_sidecar<P: AsRef<Path>>(artifact: P, payload: &Payload) -> Result<PathBuf> {
    let artifact = artifact.as_ref();
    let path = sidecar_path(artifact);
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("creating provenance dir {}", parent.display()))?;
        }
    }
    let doc = document(payload, &[artifact.to_string_lossy().into_owned()]);
    fs::write(&path, serde_json::to_vec_pretty(&doc)?)
        .with_context(|| format!("writing {}", path.display()))?;
    Ok(path)
}

fn sidecar_path(artifact: &Path) -> PathBuf {
    let mut name = artifact
        .file_stem()
        .map(|s| s.to_os_string())
        .unwrap_or_else(|| OsString::from("routes"));
    name.push(".provenance.json");
    artifact.with_file_name(name)
}

/// `GIT_COMMIT` (build time, then run time), else `git rev-parse HEAD`, else "unknown".
pub fn current_git_rev() -> String {
    let from_env = option_env!("GIT_COMMIT")
        .map(str::to_string)
        .or_else(|| std::env::var("GIT_COMMIT").ok())
        .filter(|s| !s.is_empty());
    if let Some(rev) = from_env {
        return rev;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn sidecar_path_replaces_extension() {
        let derived = sidecar_path(Path::new("/tmp/out/routes.json"));
        assert_eq!(derived, Path::new("/tmp/out/routes.provenance.json"));
    }

    #[test]
    fn write_sidecar_records_params_and_output() {
        let dir = tempdir().unwrap();
        let artifact = dir.path().join("nested").join("r.json");
        let payload = Payload::new("route", json!({"from": 0, "to": 3})).tagged(Some("t1".into()));
        let path = write_sidecar(&artifact, &payload).unwrap();
        assert!(path.exists());
        let doc: Value = serde_json::from_slice(&fs::read(path).unwrap()).unwrap();
        assert_eq!(doc["outputs"][0], artifact.to_string_lossy().as_ref());
        assert_eq!(doc["command"], "route");
        assert_eq!(doc["params"]["to"], 3);
        assert_eq!(doc["tag"], "t1");
        assert_eq!(doc["library"]["version"], viaroute::VERSION);
    }
}
