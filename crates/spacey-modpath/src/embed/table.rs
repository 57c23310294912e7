// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.
//
// Copyright (c) 2025 Pegasus Heavy Industries, LLC

//! Embedded module table
//!
//! Built once at compile time and appended to the executable. At run time it
//! is read back, verified and only ever looked up by exact key.
//!
//! ## Layout
//!
//! ```text
//! payload:  "SPCYMOD1"
//!           u32 entry_count  { u32 len, key }*
//!           u32 module_count { u32 len, key, u8 namespace, u32 len, dirname, u32 len, bytecode }*
//! trailer:  u64 payload_len, [u8; 32] sha256(payload), "SPCYTBL\0"
//! ```
//!
//! All integers are little-endian.

use crate::error::{ModpathError, Result};
use crate::module_system::meta::{ModuleMeta, Namespace};
use bytes::{Buf, BufMut, Bytes, BytesMut};
use sha2::{Digest, Sha256};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Leading magic of an encoded table
pub const TABLE_MAGIC: &[u8; 8] = b"SPCYMOD1";

/// Closing magic of the executable trailer
pub const TRAILER_MAGIC: &[u8; 8] = b"SPCYTBL\0";

/// Size of the trailer appended after the payload
pub const TRAILER_LEN: usize = 8 + 32 + 8;

/// One embedded module
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddedModule {
    /// Identity recorded at build time
    pub meta: ModuleMeta,
    /// Engine-loadable bytes
    pub bytecode: Bytes,
}

impl EmbeddedModule {
    /// Length of the bytecode
    pub fn len(&self) -> usize {
        self.bytecode.len()
    }

    /// Whether the bytecode is empty
    pub fn is_empty(&self) -> bool {
        self.bytecode.is_empty()
    }
}

/// Mapping from canonical key to embedded module
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EmbeddedTable {
    entries: Vec<String>,
    modules: BTreeMap<String, EmbeddedModule>,
}

impl EmbeddedTable {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a module under its meta key, replacing any previous one
    ///
    /// The search root is dropped: embedded modules have no filesystem home.
    pub fn insert(&mut self, mut meta: ModuleMeta, bytecode: impl Into<Bytes>) {
        meta.root = None;
        let key = meta.key.clone();
        self.modules.insert(
            key,
            EmbeddedModule {
                meta,
                bytecode: bytecode.into(),
            },
        );
    }

    /// Record an entry module key
    pub fn add_entry(&mut self, key: impl Into<String>) {
        let key = key.into();
        if !self.entries.contains(&key) {
            self.entries.push(key);
        }
    }

    /// Look up a module by exact key
    pub fn get(&self, key: &str) -> Option<&EmbeddedModule> {
        self.modules.get(key)
    }

    /// Check if a key is embedded
    pub fn contains(&self, key: &str) -> bool {
        self.modules.contains_key(key)
    }

    /// Embedded keys in sorted order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.modules.keys().map(String::as_str)
    }

    /// Embedded modules in key order
    pub fn modules(&self) -> impl Iterator<Item = &EmbeddedModule> {
        self.modules.values()
    }

    /// Entry module keys in the order they were given
    pub fn entries(&self) -> &[String] {
        &self.entries
    }

    /// Number of embedded modules
    pub fn len(&self) -> usize {
        self.modules.len()
    }

    /// Whether no modules are embedded
    pub fn is_empty(&self) -> bool {
        self.modules.is_empty()
    }

    /// Encode the table payload
    pub fn encode(&self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        buf.put_slice(TABLE_MAGIC);

        put_len(&mut buf, self.entries.len())?;
        for entry in &self.entries {
            put_chunk(&mut buf, entry.as_bytes())?;
        }

        put_len(&mut buf, self.modules.len())?;
        for (key, module) in &self.modules {
            put_chunk(&mut buf, key.as_bytes())?;
            buf.put_u8(module.meta.namespace.to_tag());
            put_chunk(&mut buf, module.meta.dirname.as_bytes())?;
            put_chunk(&mut buf, &module.bytecode)?;
        }

        Ok(buf.freeze())
    }

    /// Decode a table payload
    pub fn decode(payload: Bytes) -> Result<Self> {
        let mut buf = payload;
        let magic = take_chunk(&mut buf, TABLE_MAGIC.len())?;
        if magic.as_ref() != TABLE_MAGIC {
            return Err(ModpathError::invalid_table("bad payload magic"));
        }

        let mut table = Self::new();

        let entry_count = take_u32(&mut buf)?;
        for _ in 0..entry_count {
            let key = take_string(&mut buf)?;
            table.add_entry(key);
        }

        let module_count = take_u32(&mut buf)?;
        for _ in 0..module_count {
            let key = take_string(&mut buf)?;
            let tag = take_u8(&mut buf)?;
            let namespace = Namespace::from_tag(tag).ok_or_else(|| {
                ModpathError::invalid_table(format!("unknown namespace tag {tag} for '{key}'"))
            })?;
            let dirname = take_string(&mut buf)?;
            let len = take_u32(&mut buf)? as usize;
            let bytecode = take_chunk(&mut buf, len)?;
            if table.contains(&key) {
                return Err(ModpathError::invalid_table(format!("duplicate key '{key}'")));
            }
            table.insert(
                ModuleMeta {
                    key,
                    dirname,
                    namespace,
                    root: None,
                },
                bytecode,
            );
        }

        if buf.has_remaining() {
            return Err(ModpathError::invalid_table(format!(
                "{} trailing bytes after last module",
                buf.remaining()
            )));
        }

        Ok(table)
    }

    /// Encode the payload followed by the executable trailer
    pub fn seal(&self) -> Result<Vec<u8>> {
        let payload = self.encode()?;
        let digest = Sha256::digest(&payload);

        let mut out = Vec::with_capacity(payload.len() + TRAILER_LEN);
        out.extend_from_slice(&payload);
        out.put_u64_le(payload.len() as u64);
        out.extend_from_slice(&digest);
        out.extend_from_slice(TRAILER_MAGIC);
        Ok(out)
    }

    /// Read a table appended to an executable image
    ///
    /// Returns `Ok(None)` when the image carries no trailer.
    pub fn from_executable_bytes(image: &[u8]) -> Result<Option<Self>> {
        let Some((payload, expected)) = split_sealed(image)? else {
            return Ok(None);
        };

        let actual = Sha256::digest(payload);
        if actual.as_slice() != expected {
            return Err(ModpathError::IntegrityMismatch {
                expected: hex::encode(expected),
                actual: hex::encode(actual),
            });
        }

        let table = Self::decode(Bytes::copy_from_slice(payload))?;
        debug!(modules = table.len(), entries = table.entries.len(), "loaded embedded table");
        Ok(Some(table))
    }

    /// Read a table appended to the executable at `path`
    pub fn from_executable(path: &Path) -> Result<Option<Self>> {
        let image = std::fs::read(path).map_err(|source| ModpathError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_executable_bytes(&image)
    }

    /// Read the table appended to the running executable
    pub fn from_current_exe() -> Result<Option<Self>> {
        let exe = std::env::current_exe()?;
        Self::from_executable(&exe)
    }
}

/// The executable image with any appended table removed
pub fn strip_table(image: &[u8]) -> Result<&[u8]> {
    match split_sealed(image)? {
        Some((payload, _)) => Ok(&image[..image.len() - payload.len() - TRAILER_LEN]),
        None => Ok(image),
    }
}

/// Split an image into payload and recorded digest
fn split_sealed(image: &[u8]) -> Result<Option<(&[u8], &[u8])>> {
    if image.len() < TRAILER_LEN || !image.ends_with(TRAILER_MAGIC) {
        return Ok(None);
    }

    let trailer = &image[image.len() - TRAILER_LEN..];
    let mut len_bytes = &trailer[..8];
    let payload_len = usize::try_from(len_bytes.get_u64_le())
        .map_err(|_| ModpathError::invalid_table("payload length overflows usize"))?;
    let digest = &trailer[8..40];

    let body_len = image.len() - TRAILER_LEN;
    if payload_len > body_len {
        return Err(ModpathError::invalid_table(format!(
            "payload length {payload_len} exceeds image body of {body_len} bytes"
        )));
    }

    Ok(Some((&image[body_len - payload_len..body_len], digest)))
}

fn put_len(buf: &mut BytesMut, len: usize) -> Result<()> {
    let len = u32::try_from(len)
        .map_err(|_| ModpathError::invalid_table(format!("length {len} does not fit in u32")))?;
    buf.put_u32_le(len);
    Ok(())
}

fn put_chunk(buf: &mut BytesMut, data: &[u8]) -> Result<()> {
    put_len(buf, data.len())?;
    buf.put_slice(data);
    Ok(())
}

fn take_u8(buf: &mut Bytes) -> Result<u8> {
    if buf.remaining() < 1 {
        return Err(ModpathError::invalid_table("truncated namespace tag"));
    }
    Ok(buf.get_u8())
}

fn take_u32(buf: &mut Bytes) -> Result<u32> {
    if buf.remaining() < 4 {
        return Err(ModpathError::invalid_table("truncated length field"));
    }
    Ok(buf.get_u32_le())
}

fn take_chunk(buf: &mut Bytes, len: usize) -> Result<Bytes> {
    if buf.remaining() < len {
        return Err(ModpathError::invalid_table(format!(
            "needed {len} bytes, {} left",
            buf.remaining()
        )));
    }
    Ok(buf.split_to(len))
}

fn take_string(buf: &mut Bytes) -> Result<String> {
    let len = take_u32(buf)? as usize;
    let chunk = take_chunk(buf, len)?;
    String::from_utf8(chunk.to_vec())
        .map_err(|e| ModpathError::invalid_table(format!("key is not UTF-8: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_table() -> EmbeddedTable {
        let mut table = EmbeddedTable::new();
        table.add_entry("bootstrap");
        table.insert(
            ModuleMeta {
                key: "node/fs".to_string(),
                dirname: "node".to_string(),
                namespace: Namespace::Search,
                root: None,
            },
            &b"export const readFile = () => {};"[..],
        );
        table.insert(
            ModuleMeta {
                key: "./app/main".to_string(),
                dirname: "./app".to_string(),
                namespace: Namespace::Filesystem,
                root: None,
            },
            &b"import 'node:fs';"[..],
        );
        table
    }

    #[test]
    fn test_sealed_table_reads_back() {
        let table = sample_table();
        let mut image = b"\x7fELF fake runtime image".to_vec();
        image.extend(table.seal().unwrap());

        let read = EmbeddedTable::from_executable_bytes(&image).unwrap().unwrap();
        assert_eq!(read, table);
        assert_eq!(read.entries(), ["bootstrap".to_string()]);
        assert_eq!(read.keys().collect::<Vec<_>>(), vec!["./app/main", "node/fs"]);
        assert_eq!(read.get("node/fs").unwrap().meta.dirname, "node");
    }

    #[test]
    fn test_image_without_table() {
        let image = b"plain executable bytes";
        assert_eq!(EmbeddedTable::from_executable_bytes(image).unwrap(), None);
        assert_eq!(strip_table(image).unwrap(), image);
    }

    #[test]
    fn test_strip_table() {
        let runtime = b"runtime image".to_vec();
        let mut image = runtime.clone();
        image.extend(sample_table().seal().unwrap());
        assert_eq!(strip_table(&image).unwrap(), runtime.as_slice());
    }

    #[test]
    fn test_corrupt_payload_is_detected() {
        let mut image = b"runtime".to_vec();
        image.extend(sample_table().seal().unwrap());
        // flip a byte inside the payload, past the runtime prefix and magic
        image[7 + TABLE_MAGIC.len() + 2] ^= 0xff;

        let err = EmbeddedTable::from_executable_bytes(&image).unwrap_err();
        assert!(matches!(err, ModpathError::IntegrityMismatch { .. }));
    }

    #[test]
    fn test_truncated_payload() {
        let payload = sample_table().encode().unwrap();
        let truncated = payload.slice(..payload.len() - 3);
        assert!(EmbeddedTable::decode(truncated).is_err());
    }

    #[test]
    fn test_lookup_is_exact() {
        let table = sample_table();
        assert!(table.contains("node/fs"));
        assert!(!table.contains("node/fs.js"));
        assert!(!table.contains("node:fs"));
        assert_eq!(table.get("node/fs").unwrap().len(), 33);
    }
}
