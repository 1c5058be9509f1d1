// Emote archiver: downloads every emote of a guild concurrently and
// packs the results into an uncompressed zip archive, or dumps the raw
// guild metadata as pretty-printed JSON in `--json` mode.
//
// The fan-out is the only async part of the program. It runs on a
// dedicated tokio runtime and joins all downloads before the archive
// is assembled, so the zip writer never needs locking.

use crate::api::{ApiClient, Emote, BROWSER_USER_AGENT};
use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::StatusCode;
use std::collections::HashSet;
use std::fs;
use std::io::{Cursor, Write};
use std::path::Path;
use tracing::{debug, info};
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

/// Characters stripped from guild names before they are used as file
/// names, after spaces have been turned into underscores.
const ILLEGAL_CHARS: &[char] = &['\\', '/', ':', '*', '?', '"', '<', '>', '|'];

/// A successfully downloaded emote image, ready to be archived.
#[derive(Debug, Clone)]
pub struct EmoteFile {
    pub name: String,
    pub id: String,
    pub extension: &'static str,
    pub data: Vec<u8>,
}

/// Normalize a display name into a filesystem-safe string: spaces
/// become underscores, illegal characters are dropped.
pub fn sanitize(name: &str) -> String {
    name.replace(' ', "_")
        .chars()
        .filter(|c| !ILLEGAL_CHARS.contains(c))
        .collect()
}

/// Image extension for an emote: animated ones are gifs.
pub fn extension(animated: bool) -> &'static str {
    if animated {
        ".gif"
    } else {
        ".png"
    }
}

/// Fetch a single emote image from the CDN. Any failure (non-200,
/// transport error, truncated body) is logged at debug level and
/// yields `None`; it never affects sibling downloads.
async fn fetch_emote(http: &reqwest::Client, cdn_url: &str, emote: &Emote) -> Option<EmoteFile> {
    let ext = extension(emote.animated);
    let url = format!("{}/emojis/{}{}", cdn_url, emote.id, ext);
    match http.get(&url).send().await {
        Ok(res) if res.status() == StatusCode::OK => match res.bytes().await {
            Ok(data) => Some(EmoteFile {
                name: emote.name.clone(),
                id: emote.id.clone(),
                extension: ext,
                data: data.to_vec(),
            }),
            Err(err) => {
                debug!(id = %emote.id, %err, "failed to read emote body");
                None
            }
        },
        Ok(res) => {
            debug!(id = %emote.id, status = %res.status(), %url, "failed to download emote");
            None
        }
        Err(err) => {
            debug!(id = %emote.id, %err, "failed to download emote");
            None
        }
    }
}

/// Download all emotes of a guild concurrently and wait for every
/// download to settle. Results keep the emote-list order, with `None`
/// standing in for each failed download, so archives come out the same
/// across runs. A single pooled client serves the whole fan-out.
pub fn download_all(cdn_url: &str, emotes: &[Emote]) -> Result<Vec<Option<EmoteFile>>> {
    let http = reqwest::Client::builder()
        .user_agent(BROWSER_USER_AGENT)
        .build()
        .context("Failed to build CDN client")?;

    let bar = ProgressBar::new(emotes.len() as u64);
    bar.set_style(ProgressStyle::with_template("{bar:30} {pos}/{len} emotes").unwrap());

    let runtime = tokio::runtime::Runtime::new().context("Failed to start download runtime")?;
    let results = runtime.block_on(async {
        let tasks = emotes.iter().map(|emote| {
            let http = &http;
            let bar = &bar;
            async move {
                let file = fetch_emote(http, cdn_url, emote).await;
                bar.inc(1);
                file
            }
        });
        futures::future::join_all(tasks).await
    });
    bar.finish_and_clear();
    Ok(results)
}

/// Pack downloaded emotes into an in-memory zip archive with stored
/// (uncompressed) entries. Static emotes live at the archive root,
/// animated ones under `animated/`. An exact-path collision gets a
/// `~{n}` suffix before the extension, counting prior collisions of
/// that filename: `smile.png`, `smile~1.png`, `smile~2.png`.
pub fn build_archive(files: &[EmoteFile]) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = FileOptions::default().compression_method(CompressionMethod::Stored);

    let mut stored: HashSet<String> = HashSet::new();
    let mut duplicates: Vec<String> = Vec::new();

    for emote in files {
        let mut filename = format!("{}{}", emote.name, emote.extension);
        if stored.contains(&filename) || stored.contains(&format!("animated/{filename}")) {
            let appears = duplicates.iter().filter(|name| **name == filename).count();
            duplicates.push(filename.clone());
            filename = format!("{}~{}{}", emote.name, appears + 1, emote.extension);
            debug!(%filename, "duplicate detected, renamed");
        }
        let path = if emote.extension == ".gif" {
            format!("animated/{filename}")
        } else {
            filename
        };
        zip.start_file(path.as_str(), options)
            .with_context(|| format!("Failed to add {path} to archive"))?;
        zip.write_all(&emote.data)?;
        stored.insert(path);
    }

    let cursor = zip.finish().context("Failed to finish archive")?;
    Ok(cursor.into_inner())
}

/// Dump one guild: fetch it, then either write its raw metadata as
/// `{name}.json` or download its emotes and write
/// `Emotes_{name}.zip` into `out_dir`. An unknown or inaccessible
/// guild has already been logged by the client and is a no-op here.
pub fn dump_guild(api: &ApiClient, guild_id: &str, out_dir: &Path, json_mode: bool) -> Result<()> {
    let detail = match api.get_guild(guild_id)? {
        Some(detail) => detail,
        None => return Ok(()),
    };
    let stem = sanitize(&detail.guild.name);

    if json_mode {
        let path = out_dir.join(format!("{stem}.json"));
        info!(path = %path.display(), "dumping guild info");
        let pretty = serde_json::to_string_pretty(&detail.raw)?;
        fs::write(&path, pretty)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    } else {
        info!(
            guild = %detail.guild.name,
            count = detail.guild.emojis.len(),
            "dumping emotes"
        );
        let results = download_all(api.cdn_url(), &detail.guild.emojis)?;
        let files: Vec<EmoteFile> = results.into_iter().flatten().collect();
        let archive = build_archive(&files)?;
        let path = out_dir.join(format!("Emotes_{stem}.zip"));
        info!(path = %path.display(), added = files.len(), "writing archive");
        fs::write(&path, archive)
            .with_context(|| format!("Failed to write {}", path.display()))?;
    }
    Ok(())
}
