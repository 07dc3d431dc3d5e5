//! Binary snapshots of trees.
//!
//! A host can persist an operation's input or output and load it again
//! later, for instance to replay a slow run under a different strategy.
//!
//! # Layout
//!
//! `[ Magic "PTRE" (4) ] [ Version u16 LE (2) ] [ bincode payload ]`
//!
//! The payload is the tree's paths followed by its branches, encoded with
//! bincode's standard configuration. The path index is rebuilt on load.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{PartreeError, Result};
use crate::tree::DataTree;

/// Magic bytes identifying a snapshot.
pub const MAGIC_BYTES: [u8; 4] = *b"PTRE";

/// Current snapshot version.
pub const VERSION: u16 = 1;

/// Size of the fixed header: Magic(4) + Version(2).
pub const HEADER_SIZE: usize = 6;

/// Encodes a tree into a standalone buffer.
pub fn to_bytes<T: Serialize>(tree: &DataTree<T>) -> Result<Vec<u8>> {
    let payload = bincode::serde::encode_to_vec(tree, bincode::config::standard())
        .map_err(|e| PartreeError::Serialization(e.to_string()))?;
    let mut buffer = Vec::with_capacity(HEADER_SIZE + payload.len());
    buffer.extend_from_slice(&MAGIC_BYTES);
    buffer.extend_from_slice(&VERSION.to_le_bytes());
    buffer.extend_from_slice(&payload);
    Ok(buffer)
}

/// Decodes a buffer produced by [`to_bytes`].
pub fn from_bytes<T: DeserializeOwned>(bytes: &[u8]) -> Result<DataTree<T>> {
    let header = bytes
        .get(..HEADER_SIZE)
        .ok_or_else(|| PartreeError::Format("buffer smaller than header".into()))?;
    if header[..4] != MAGIC_BYTES {
        return Err(PartreeError::Format("invalid magic bytes".into()));
    }
    let version = u16::from_le_bytes([header[4], header[5]]);
    if version != VERSION {
        return Err(PartreeError::Format(format!(
            "unsupported version: {version}"
        )));
    }
    let (tree, _) = bincode::serde::decode_from_slice(&bytes[HEADER_SIZE..], bincode::config::standard())
        .map_err(|e| PartreeError::Serialization(e.to_string()))?;
    Ok(tree)
}

/// Writes a snapshot to any writer.
pub fn write<W: Write, T: Serialize>(mut writer: W, tree: &DataTree<T>) -> Result<()> {
    let bytes = to_bytes(tree)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

/// Reads a snapshot from any reader.
pub fn read<R: Read, T: DeserializeOwned>(mut reader: R) -> Result<DataTree<T>> {
    let mut bytes = Vec::new();
    reader.read_to_end(&mut bytes)?;
    from_bytes(&bytes)
}

/// Saves a snapshot to `path`, truncating any existing file.
pub fn save<P: AsRef<Path>, T: Serialize>(path: P, tree: &DataTree<T>) -> Result<()> {
    let file = File::create(path)?;
    write(BufWriter::new(file), tree)
}

/// Loads a snapshot from `path`.
pub fn open<P: AsRef<Path>, T: DeserializeOwned>(path: P) -> Result<DataTree<T>> {
    let file = File::open(path)?;
    read(BufReader::new(file))
}
