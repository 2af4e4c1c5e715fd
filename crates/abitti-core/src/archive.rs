// Zip container helpers for exam archives.
// - `read_entry`: one required entry, read fully while the entry handle is scoped.
// - `read_nested`: every file of a zip stored inside another zip, as name -> bytes.
// - `write_single_entry`: a fresh archive holding exactly one deflated file.
use std::collections::BTreeMap;
use std::io::{Cursor, Read, Seek, Write};

use zip::CompressionMethod;
use zip::ZipArchive;
use zip::result::ZipError;
use zip::write::FileOptions;

use crate::error::{Error, Result};

/// Reads `name` from `archive`. A missing entry maps to [`Error::MissingEntry`].
pub fn read_entry<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    name: &'static str,
) -> Result<Vec<u8>> {
    let mut file = match archive.by_name(name) {
        Ok(f) => f,
        Err(ZipError::FileNotFound) => return Err(Error::MissingEntry(name)),
        Err(e) => return Err(e.into()),
    };
    // declared sizes come from the archive itself; let the buffer grow
    let mut data = Vec::new();
    file.read_to_end(&mut data)?;
    Ok(data)
}

/// Unpacks a zip held in memory. Directory entries are skipped.
pub fn read_nested(data: Vec<u8>) -> Result<BTreeMap<String, Vec<u8>>> {
    let mut inner = ZipArchive::new(Cursor::new(data))?;
    let mut out = BTreeMap::new();
    for i in 0..inner.len() {
        let mut file = inner.by_index(i)?;
        if file.is_dir() {
            continue;
        }
        let mut buf = Vec::new();
        file.read_to_end(&mut buf)?;
        out.insert(file.name().to_string(), buf);
    }
    Ok(out)
}

/// Writes a new archive whose only entry is `name`.
pub fn write_single_entry<W: Write + Seek>(writer: W, name: &str, data: &[u8]) -> Result<W> {
    let mut zip = zip::ZipWriter::new(writer);
    let options = FileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .unix_permissions(0o644);
    zip.start_file(name, options)?;
    zip.write_all(data)?;
    Ok(zip.finish()?)
}
