//! Reading module descriptors out of fetched artifacts.
//!
//! Cairn's native artifact format is a gzip-compressed tar bundle carrying a
//! `module.yml` entry at its root. Artifacts in any other format are treated
//! as opaque automatic modules by the callers of this module.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use flate2::read::GzDecoder;
use tar::Archive;

/// Extract the `module.yml` text from a bundle, if the artifact is one.
///
/// Returns `Ok(None)` when the artifact is not a readable bundle or carries
/// no descriptor entry. IO errors opening the file itself propagate.
pub fn read_descriptor_text(artifact: &Path) -> std::io::Result<Option<String>> {
    let file = File::open(artifact)?;
    let mut archive = Archive::new(GzDecoder::new(file));

    let entries = match archive.entries() {
        Ok(entries) => entries,
        Err(_) => return Ok(None), // not a gzip/tar bundle
    };

    for entry in entries {
        let mut entry = match entry {
            Ok(entry) => entry,
            Err(_) => return Ok(None),
        };
        let is_descriptor = entry
            .path()
            .map(|p| p.file_name().is_some_and(|n| n == "module.yml") && p.components().count() == 1)
            .unwrap_or(false);
        if is_descriptor {
            let mut text = String::new();
            if entry.read_to_string(&mut text).is_err() {
                return Ok(None);
            }
            return Ok(Some(text));
        }
    }
    Ok(None)
}

#[cfg(test)]
pub(crate) fn write_bundle(target: &Path, descriptor_yaml: &str) {
    use flate2::write::GzEncoder;
    use flate2::Compression;

    let file = File::create(target).unwrap();
    let encoder = GzEncoder::new(file, Compression::default());
    let mut builder = tar::Builder::new(encoder);
    let bytes = descriptor_yaml.as_bytes();
    let mut header = tar::Header::new_gnu();
    header.set_size(bytes.len() as u64);
    header.set_mode(0o644);
    header.set_cksum();
    builder.append_data(&mut header, "module.yml", bytes).unwrap();
    builder.into_inner().unwrap().finish().unwrap();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::TempDir;

    #[test]
    fn reads_descriptor_from_bundle() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("org.example.lib.jar");
        write_bundle(&artifact, "name: org.example.lib\n");

        let text = read_descriptor_text(&artifact).unwrap().unwrap();
        assert!(text.contains("org.example.lib"));
    }

    #[test]
    fn opaque_artifact_yields_none() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("blob.jar");
        let mut file = File::create(&artifact).unwrap();
        file.write_all(b"not an archive at all").unwrap();

        assert!(read_descriptor_text(&artifact).unwrap().is_none());
    }

    #[test]
    fn bundle_without_descriptor_yields_none() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("plain.jar");

        let file = File::create(&artifact).unwrap();
        let encoder =
            flate2::write::GzEncoder::new(file, flate2::Compression::default());
        let mut builder = tar::Builder::new(encoder);
        let bytes = b"fn main() {}";
        let mut header = tar::Header::new_gnu();
        header.set_size(bytes.len() as u64);
        header.set_mode(0o644);
        header.set_cksum();
        builder.append_data(&mut header, "src/main.rs", &bytes[..]).unwrap();
        builder.into_inner().unwrap().finish().unwrap();

        assert!(read_descriptor_text(&artifact).unwrap().is_none());
    }

    #[test]
    fn missing_file_is_an_io_error() {
        let temp = TempDir::new().unwrap();
        let artifact = temp.path().join("absent.jar");
        assert!(read_descriptor_text(&artifact).is_err());
    }
}
