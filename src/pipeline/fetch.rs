//! Image asset acquisition: obtain bytes, resize, re-encode, write to disk.
//!
//! Every function here returns [`ImageFailure`], never a fatal error — a
//! single broken remote image must not abort an entire document conversion.
//! The caller records the failure and leaves the original markup in place.
//!
//! ## Why spawn_blocking?
//!
//! Decode + Lanczos3 resample of an 800×600 target is pure CPU work that can
//! take tens of milliseconds per image. `tokio::task::spawn_blocking` keeps
//! it off the async workers so concurrent downloads are not stalled behind
//! resampling.

use crate::config::ConversionConfig;
use crate::error::ImageFailure;
use image::imageops::FilterType;
use std::io::Cursor;
use tracing::debug;

/// Check if the source reference is an absolute HTTP(S) URL.
pub fn is_remote(src: &str) -> bool {
    src.starts_with("http://") || src.starts_with("https://")
}

/// Obtain the raw bytes for a source reference: network for URLs, disk
/// otherwise.
pub async fn obtain_bytes(
    client: &reqwest::Client,
    src: &str,
    timeout_secs: u64,
) -> Result<Vec<u8>, ImageFailure> {
    if is_remote(src) {
        let response = client.get(src).send().await.map_err(|e| {
            if e.is_timeout() {
                ImageFailure::Timeout {
                    src: src.to_string(),
                    secs: timeout_secs,
                }
            } else {
                ImageFailure::Download {
                    src: src.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        if !response.status().is_success() {
            return Err(ImageFailure::Download {
                src: src.to_string(),
                reason: format!("HTTP {}", response.status()),
            });
        }

        let bytes = response.bytes().await.map_err(|e| {
            if e.is_timeout() {
                ImageFailure::Timeout {
                    src: src.to_string(),
                    secs: timeout_secs,
                }
            } else {
                ImageFailure::Download {
                    src: src.to_string(),
                    reason: e.to_string(),
                }
            }
        })?;

        debug!("Downloaded {} bytes from {}", bytes.len(), src);
        Ok(bytes.to_vec())
    } else {
        tokio::fs::read(src).await.map_err(|e| ImageFailure::Read {
            src: src.to_string(),
            reason: e.to_string(),
        })
    }
}

/// Fetch, resize, and write one image asset.
///
/// Returns the file name written into `config.image_dir` on success.
pub async fn materialize(
    client: &reqwest::Client,
    src: &str,
    config: &ConversionConfig,
) -> Result<String, ImageFailure> {
    let bytes = obtain_bytes(client, src, config.fetch_timeout_secs).await?;

    let (width, height) = (config.image_width, config.image_height);
    let png = tokio::task::spawn_blocking(move || resize_to_png(&bytes, width, height))
        .await
        .map_err(|e| ImageFailure::Decode {
            src: src.to_string(),
            reason: format!("resize task panicked: {e}"),
        })?
        .map_err(|e| ImageFailure::Decode {
            src: src.to_string(),
            reason: e.to_string(),
        })?;

    let filename = asset_filename(src);
    let path = config.image_dir.join(&filename);
    tokio::fs::write(&path, &png)
        .await
        .map_err(|e| ImageFailure::Write {
            src: src.to_string(),
            reason: format!("{}: {e}", path.display()),
        })?;

    debug!("Wrote {} ({} bytes)", path.display(), png.len());
    Ok(filename)
}

/// Decode, resample to the exact target resolution, and PNG-encode.
fn resize_to_png(bytes: &[u8], width: u32, height: u32) -> Result<Vec<u8>, image::ImageError> {
    let img = image::load_from_memory(bytes)?;
    let img = img.resize_exact(width, height, FilterType::Lanczos3);

    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)?;
    Ok(buf)
}

/// Derive a deterministic, collision-resistant output file name from the
/// source reference: sanitized stem plus a 16-hex-digit BLAKE3 prefix.
pub fn asset_filename(src: &str) -> String {
    let hash = blake3::hash(src.as_bytes()).to_hex();
    format!("{}-{}.png", sanitized_stem(src), &hash.as_str()[..16])
}

/// Lowercased alphanumeric stem of the last path/URL segment, query and
/// extension stripped. Falls back to `image` for unusable references.
fn sanitized_stem(src: &str) -> String {
    let last = src.rsplit(['/', '\\']).next().unwrap_or(src);
    let last = last.split(['?', '#']).next().unwrap_or(last);
    let stem = last.rsplit_once('.').map_or(last, |(s, _)| s);

    let mut out = String::new();
    for c in stem.chars() {
        if c.is_ascii_alphanumeric() {
            out.push(c.to_ascii_lowercase());
        } else if !out.ends_with('-') && !out.is_empty() {
            out.push('-');
        }
    }
    let out = out.trim_matches('-').to_string();
    if out.is_empty() {
        "image".to_string()
    } else {
        out.chars().take(40).collect()
    }
}
