//! File import (.gltf / .glb)
//!
//! Produces a document plus resident buffers from disk. Buffers are read from
//! files next to the document or from the GLB binary chunk; embedded data URIs
//! are not supported.

use std::path::Path;

use anyhow::{Context, Result, bail, ensure};

use crate::buffer::Buffers;
use crate::schema::Document;

const GLB_MAGIC: &[u8; 4] = b"glTF";
const GLB_VERSION: u32 = 2;
const GLB_HEADER_SIZE: usize = 12;
const CHUNK_HEADER_SIZE: usize = 8;
/// "JSON"
const CHUNK_JSON: u32 = 0x4E4F_534A;
/// "BIN\0"
const CHUNK_BIN: u32 = 0x004E_4942;

/// Load a `.gltf` or `.glb` file and every buffer it references
pub fn import(path: &Path) -> Result<(Document, Buffers)> {
    let bytes = std::fs::read(path).with_context(|| format!("Failed to read glTF: {:?}", path))?;
    let base = path.parent().unwrap_or_else(|| Path::new("."));

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|s| s.to_lowercase())
        .unwrap_or_default();

    let result = match ext.as_str() {
        "glb" => import_glb(&bytes, Some(base)),
        "gltf" => import_gltf(&bytes, Some(base)),
        // Sniff the magic for unknown extensions
        _ if bytes.starts_with(GLB_MAGIC) => import_glb(&bytes, Some(base)),
        _ => import_gltf(&bytes, Some(base)),
    };
    let (document, buffers) = result.with_context(|| format!("Failed to load glTF: {:?}", path))?;

    tracing::info!(
        "Loaded {:?}: {} buffer(s), {} accessor(s), {} node(s), {} animation(s)",
        path,
        buffers.len(),
        document.accessors.len(),
        document.nodes.len(),
        document.animations.len()
    );
    Ok((document, buffers))
}

/// Parse JSON text; buffer URIs resolve against `base` when given
pub fn import_gltf(json: &[u8], base: Option<&Path>) -> Result<(Document, Buffers)> {
    let document = Document::from_slice(json).context("Invalid glTF JSON")?;
    let buffers = load_buffers(&document, base, None)?;
    Ok((document, buffers))
}

/// Parse a binary container; the first buffer without a URI is the BIN chunk
pub fn import_glb(bytes: &[u8], base: Option<&Path>) -> Result<(Document, Buffers)> {
    let (json, bin) = split_glb(bytes)?;
    let document = Document::from_slice(json).context("Invalid glTF JSON chunk")?;
    let buffers = load_buffers(&document, base, bin)?;
    Ok((document, buffers))
}

fn read_u32(bytes: &[u8], offset: usize) -> Result<u32> {
    let word = bytes
        .get(offset..offset + 4)
        .with_context(|| format!("Truncated GLB at byte {}", offset))?;
    Ok(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
}

/// JSON chunk and optional BIN chunk of a GLB container
fn split_glb(bytes: &[u8]) -> Result<(&[u8], Option<&[u8]>)> {
    ensure!(
        bytes.len() >= GLB_HEADER_SIZE && bytes.starts_with(GLB_MAGIC),
        "Not a GLB file (missing 'glTF' magic)"
    );
    let version = read_u32(bytes, 4)?;
    if version != GLB_VERSION {
        bail!("Unsupported GLB version {} (expected {})", version, GLB_VERSION);
    }
    let total = read_u32(bytes, 8)? as usize;
    ensure!(
        total <= bytes.len(),
        "GLB header declares {} bytes but file has {}",
        total,
        bytes.len()
    );
    let bytes = &bytes[..total];

    let mut json = None;
    let mut bin = None;
    let mut offset = GLB_HEADER_SIZE;
    while offset + CHUNK_HEADER_SIZE <= bytes.len() {
        let length = read_u32(bytes, offset)? as usize;
        let kind = read_u32(bytes, offset + 4)?;
        let start = offset + CHUNK_HEADER_SIZE;
        let data = start
            .checked_add(length)
            .and_then(|end| bytes.get(start..end))
            .with_context(|| format!("GLB chunk at byte {} overruns the file", offset))?;

        match kind {
            CHUNK_JSON if json.is_none() => json = Some(data),
            CHUNK_BIN if json.is_some() && bin.is_none() => bin = Some(data),
            CHUNK_JSON | CHUNK_BIN => bail!("Unexpected GLB chunk order at byte {}", offset),
            // Unknown chunk types are skipped
            _ => tracing::debug!("Skipping GLB chunk type {:#010x}", kind),
        }
        offset = start + length;
    }

    let json = json.context("GLB has no JSON chunk")?;
    Ok((json, bin))
}

fn load_buffers(document: &Document, base: Option<&Path>, bin: Option<&[u8]>) -> Result<Buffers> {
    let mut bin = bin;
    let mut data = Vec::with_capacity(document.buffers.len());

    for (index, buffer) in document.buffers.iter().enumerate() {
        let bytes = match buffer.uri.as_deref() {
            Some(uri) if uri.starts_with("data:") => {
                bail!("Buffer {} uses a data URI, which is not supported", index)
            }
            Some(uri) if uri.contains("://") => {
                bail!("Buffer {} references a remote URI: {}", index, uri)
            }
            Some(uri) => {
                let base = base.with_context(|| {
                    format!("Buffer {} references '{}' but no base directory is known", index, uri)
                })?;
                let path = base.join(uri);
                std::fs::read(&path)
                    .with_context(|| format!("Failed to read buffer {}: {:?}", index, path))?
            }
            None => {
                let chunk = bin
                    .take()
                    .with_context(|| format!("Buffer {} has no URI and no GLB binary chunk", index))?;
                // The BIN chunk is padded to 4 bytes; drop the padding only
                let padding = chunk.len().saturating_sub(buffer.byte_length);
                if padding < 4 {
                    chunk[..chunk.len() - padding].to_vec()
                } else {
                    chunk.to_vec()
                }
            }
        };
        data.push(bytes);
    }

    Ok(Buffers::new(data))
}
