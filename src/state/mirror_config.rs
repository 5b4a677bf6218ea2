// ABOUTME: Edits the mirror node's application.yml in place.
// ABOUTME: Keys are addressed by path below `hedera.mirror`.

use serde_yaml::{Mapping, Value};
use std::fs;
use std::io;
use std::path::Path;

pub(crate) const DATA_PATH: &[&str] = &["importer", "dataPath"];
pub(crate) const DOWNLOADER_SOURCES: &[&str] = &["importer", "downloader", "sources"];
pub(crate) const DOWNLOADER_LOCAL: &[&str] = &["importer", "downloader", "local"];
pub(crate) const MONITOR_NODES: &[&str] = &["monitor", "nodes"];

const ROOT: [&str; 2] = ["hedera", "mirror"];

#[derive(Debug)]
pub(crate) struct MirrorApplication {
    document: Value,
}

impl MirrorApplication {
    /// `None` when the file does not exist.
    pub(crate) fn load(path: &Path) -> io::Result<Option<Self>> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e),
        };
        let document = serde_yaml::from_str(&text)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        Ok(Some(Self { document }))
    }

    pub(crate) fn save(&self, path: &Path) -> io::Result<()> {
        let text = serde_yaml::to_string(&self.document)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
        fs::write(path, text)
    }

    pub(crate) fn set(&mut self, path: &[&str], value: Value) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut node = &mut self.document;
        for key in ROOT.iter().chain(parents) {
            node = child_mapping(node, key);
        }
        if let Value::Mapping(map) = node {
            map.insert(Value::from(*last), value);
        }
    }

    pub(crate) fn remove(&mut self, path: &[&str]) {
        let Some((last, parents)) = path.split_last() else {
            return;
        };
        let mut node = &mut self.document;
        for key in ROOT.iter().chain(parents) {
            match node.get_mut(*key) {
                Some(child) => node = child,
                None => return,
            }
        }
        if let Value::Mapping(map) = node {
            map.remove(*last);
        }
    }

    #[cfg(test)]
    pub(crate) fn get(&self, path: &[&str]) -> Option<&Value> {
        ROOT.iter()
            .chain(path)
            .try_fold(&self.document, |node, key| node.get(*key))
    }
}

/// The mapping under `key`, replacing a missing or non-mapping value.
fn child_mapping<'a>(node: &'a mut Value, key: &str) -> &'a mut Value {
    if !node.is_mapping() {
        *node = Value::Mapping(Mapping::new());
    }
    match node {
        Value::Mapping(map) => {
            let child = map
                .entry(Value::from(key))
                .or_insert(Value::Mapping(Mapping::new()));
            if !child.is_mapping() {
                *child = Value::Mapping(Mapping::new());
            }
            child
        }
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "hedera:\n  mirror:\n    importer:\n      downloader:\n        bucketName: hedera-streams\n    monitor:\n      nodes: []\n";

    fn sample(dir: &Path) -> std::path::PathBuf {
        let path = dir.join("application.yml");
        fs::write(&path, SAMPLE).unwrap();
        path
    }

    #[test]
    fn set_then_remove_restores_the_document() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample(dir.path());

        let mut app = MirrorApplication::load(&path).unwrap().unwrap();
        app.set(DATA_PATH, Value::from("/node/streams"));
        app.set(DOWNLOADER_LOCAL, Value::from(true));
        assert_eq!(app.get(DATA_PATH), Some(&Value::from("/node/streams")));

        app.remove(DATA_PATH);
        app.remove(DOWNLOADER_LOCAL);
        assert!(app.get(DATA_PATH).is_none());
        assert_eq!(
            app.get(&["importer", "downloader", "bucketName"]),
            Some(&Value::from("hedera-streams"))
        );
    }

    #[test]
    fn missing_file_is_none() {
        let dir = tempfile::tempdir().unwrap();
        assert!(
            MirrorApplication::load(&dir.path().join("absent.yml"))
                .unwrap()
                .is_none()
        );
    }

    #[test]
    fn removing_absent_keys_is_a_no_op() {
        let dir = tempfile::tempdir().unwrap();
        let path = sample(dir.path());
        let mut app = MirrorApplication::load(&path).unwrap().unwrap();
        app.remove(&["grpc", "port"]);
        app.save(&path).unwrap();
        let reloaded = MirrorApplication::load(&path).unwrap().unwrap();
        assert!(reloaded.get(MONITOR_NODES).is_some());
    }
}
