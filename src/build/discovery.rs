//! Pack discovery for the build system.
//!
//! A pack is any subdirectory of the input root. Inside a pack,
//! `Anims/manifest.txt` names the animations to compile and
//! `Icons/<group>/<icon>` holds icons: directories are animated icons,
//! files are static icons.

use crate::build::{BuildContext, BuildPlan, BuildTarget, PackPlan};
use crate::codec::{ANIM_META_FILE, FRAME_PREFIX, FRAME_RATE_FILE};
use regex::Regex;
use std::cmp::Ordering;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use thiserror::Error;

/// Animations directory of a pack
pub const ANIMS_DIR: &str = "Anims";
/// Icons directory of a pack
pub const ICONS_DIR: &str = "Icons";
/// Animation manifest, relative to the pack
pub const MANIFEST_FILE: &str = "manifest.txt";

/// Error during pack discovery.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    /// Input root does not exist or is not a directory
    #[error("Input directory not found: {}", .0.display())]
    MissingInput(PathBuf),
    /// IO error during directory enumeration
    #[error("IO error reading {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

fn io_error(path: &Path) -> impl FnOnce(io::Error) -> DiscoveryError + '_ {
    move |source| DiscoveryError::Io { path: path.to_path_buf(), source }
}

/// List the entries of a directory sorted by file name, skipping hidden ones.
fn sorted_entries(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut entries = Vec::new();
    for entry in fs::read_dir(dir).map_err(io_error(dir))? {
        let entry = entry.map_err(io_error(dir))?;
        if entry.file_name().to_string_lossy().starts_with('.') {
            continue;
        }
        entries.push(entry.path());
    }
    entries.sort();
    Ok(entries)
}

fn same_path(a: &Path, b: &Path) -> bool {
    if a == b {
        return true;
    }
    matches!((fs::canonicalize(a), fs::canonicalize(b)), (Ok(x), Ok(y)) if x == y)
}

fn file_name_string(path: &Path) -> String {
    path.file_name().map(|n| n.to_string_lossy().into_owned()).unwrap_or_default()
}

/// Find pack directories under `input`, excluding the output directory.
pub fn discover_packs(input: &Path, output: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    if !input.is_dir() {
        return Err(DiscoveryError::MissingInput(input.to_path_buf()));
    }

    Ok(sorted_entries(input)?
        .into_iter()
        .filter(|path| path.is_dir() && !same_path(path, output))
        .collect())
}

fn manifest_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    // Literal pattern, always valid
    RE.get_or_init(|| Regex::new(r"Name: (.*)").unwrap())
}

/// Extract the animation names listed in a manifest.
///
/// Names use `/` as separator regardless of how they were written; carriage
/// returns and surrounding whitespace are dropped, empty names are ignored.
pub fn parse_manifest(contents: &str) -> Vec<String> {
    manifest_regex()
        .captures_iter(contents)
        .map(|caps| caps[1].replace('\\', "/").trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Join a `/`-separated manifest name onto a directory.
pub fn manifest_path(base: &Path, name: &str) -> PathBuf {
    name.split('/').filter(|part| !part.is_empty()).fold(base.to_path_buf(), |p, c| p.join(c))
}

/// Split a name into alternating text and number runs for ordering.
fn natural_key(name: &str) -> Vec<(bool, &str)> {
    let mut parts = Vec::new();
    let mut start = 0;
    let bytes = name.as_bytes();
    for i in 1..=bytes.len() {
        let boundary = i == bytes.len() || bytes[i].is_ascii_digit() != bytes[start].is_ascii_digit();
        if boundary {
            parts.push((bytes[start].is_ascii_digit(), &name[start..i]));
            start = i;
        }
    }
    parts
}

fn compare_numbers(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}

/// Numeric-aware file name ordering: `frame_2` sorts before `frame_10`.
///
/// Names equal under numeric comparison (`frame_01` vs `frame_1`) fall back
/// to plain lexical order.
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let (ka, kb) = (natural_key(a), natural_key(b));
    for ((a_num, a_part), (b_num, b_part)) in ka.iter().zip(kb.iter()) {
        let ord = match (a_num, b_num) {
            (true, true) => compare_numbers(a_part, b_part),
            _ => a_part.cmp(b_part),
        };
        if ord != Ordering::Equal {
            return ord;
        }
    }
    ka.len().cmp(&kb.len()).then_with(|| a.cmp(b))
}

/// Frame files (`frame_*`) of a directory in numeric-aware order.
///
/// The `frame_rate` marker shares the prefix and is never a frame.
pub fn sorted_frames(dir: &Path) -> Result<Vec<PathBuf>, DiscoveryError> {
    let mut frames: Vec<(String, PathBuf)> = sorted_entries(dir)?
        .into_iter()
        .filter(|path| path.is_file())
        .map(|path| (file_name_string(&path), path))
        .filter(|(name, _)| name != FRAME_RATE_FILE && name != ANIM_META_FILE)
        .filter(|(name, _)| name.starts_with(FRAME_PREFIX))
        .collect();
    frames.sort_by(|(a, _), (b, _)| natural_cmp(a, b));
    Ok(frames.into_iter().map(|(_, path)| path).collect())
}

/// Plan a single pack.
pub fn plan_pack(source: &Path, output: &Path) -> Result<PackPlan, DiscoveryError> {
    let name = file_name_string(source);
    let mut plan = PackPlan::new(name.clone(), source.to_path_buf(), output.to_path_buf());

    let manifest = source.join(ANIMS_DIR).join(MANIFEST_FILE);
    if manifest.is_file() {
        let bytes = fs::read(&manifest).map_err(io_error(&manifest))?;
        for anim in parse_manifest(&String::from_utf8_lossy(&bytes)) {
            plan.targets.push(BuildTarget::animation(
                format!("{}/{}", name, anim),
                manifest_path(&source.join(ANIMS_DIR), &anim),
                manifest_path(&output.join(ANIMS_DIR), &anim),
            ));
        }
        plan.manifest = Some(manifest);
    }

    let icons = source.join(ICONS_DIR);
    if icons.is_dir() {
        for group in sorted_entries(&icons)?.into_iter().filter(|p| p.is_dir()) {
            let group_name = file_name_string(&group);
            for icon in sorted_entries(&group)? {
                let icon_name = file_name_string(&icon);
                let target_name = format!("{}/{}/{}", name, group_name, icon_name);
                let dest = output.join(ICONS_DIR).join(&group_name).join(&icon_name);
                if icon.is_dir() {
                    plan.targets.push(BuildTarget::animated_icon(target_name, icon, dest));
                } else if icon.is_file() {
                    plan.targets.push(BuildTarget::static_icon(target_name, icon, dest));
                }
            }
        }
    }

    Ok(plan)
}

/// Create a build plan covering every pack under the input directory.
pub fn create_build_plan(ctx: &BuildContext) -> Result<BuildPlan, DiscoveryError> {
    let input = ctx.input_dir();
    let output = ctx.output_dir();
    let mut plan = BuildPlan::new();

    for source in discover_packs(&input, &output)? {
        let pack_output = output.join(file_name_string(&source));
        plan.add_pack(plan_pack(&source, &pack_output)?);
    }

    Ok(plan)
}
