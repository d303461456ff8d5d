//! Build target definitions.
//!
//! A build target is one asset of a pack: an animation directory, an animated
//! icon directory or a static icon image.

use std::path::PathBuf;

/// Type of build target.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetKind {
    /// `Anims/<name>`: frames plus a verbatim `meta.txt`
    Animation,
    /// `Icons/<group>/<dir>`: frames plus a binary `meta` record
    AnimatedIcon,
    /// `Icons/<group>/<file>`: a single BMX container
    StaticIcon,
}

impl std::fmt::Display for TargetKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetKind::Animation => write!(f, "anim"),
            TargetKind::AnimatedIcon => write!(f, "icon-anim"),
            TargetKind::StaticIcon => write!(f, "icon"),
        }
    }
}

/// A build target representing work to be done.
#[derive(Debug, Clone)]
pub struct BuildTarget {
    /// Unique identifier (e.g., "anim:Dolphin/L1_Waves_128x50")
    pub id: String,
    /// What kind of target this is
    pub kind: TargetKind,
    /// Pack-qualified name (e.g., "Dolphin/L1_Waves_128x50")
    pub name: String,
    /// Source directory or image
    pub source: PathBuf,
    /// Output directory, or the icon path before its extension is replaced
    pub output: PathBuf,
}

impl BuildTarget {
    fn new(kind: TargetKind, name: String, source: PathBuf, output: PathBuf) -> Self {
        let id = format!("{}:{}", kind, name);
        Self { id, kind, name, source, output }
    }

    /// Create an animation target.
    pub fn animation(name: String, source: PathBuf, output: PathBuf) -> Self {
        Self::new(TargetKind::Animation, name, source, output)
    }

    /// Create an animated icon target.
    pub fn animated_icon(name: String, source: PathBuf, output: PathBuf) -> Self {
        Self::new(TargetKind::AnimatedIcon, name, source, output)
    }

    /// Create a static icon target.
    pub fn static_icon(name: String, source: PathBuf, output: PathBuf) -> Self {
        Self::new(TargetKind::StaticIcon, name, source, output)
    }

    /// Check if this target matches a filter string.
    ///
    /// Supports patterns like:
    /// - Exact match: "anim:Dolphin/Boot"
    /// - Kind match: "anim:*" or just "anim"
    /// - Name match: "*:Dolphin/Boot"
    /// - Pack match: "*:Dolphin/*"
    pub fn matches_filter(&self, filter: &str) -> bool {
        if self.id == filter {
            return true;
        }

        if self.kind.to_string() == filter {
            return true;
        }

        if let Some((kind_pat, name_pat)) = filter.split_once(':') {
            let kind_matches = kind_pat == "*" || kind_pat == self.kind.to_string();
            let name_matches = match name_pat.strip_suffix('*') {
                Some(prefix) => self.name.starts_with(prefix),
                None => name_pat == self.name,
            };
            return kind_matches && name_matches;
        }

        false
    }
}

/// Everything to build for one pack, in execution order.
#[derive(Debug, Clone)]
pub struct PackPlan {
    /// Pack directory name
    pub name: String,
    /// Source pack directory
    pub source: PathBuf,
    /// Output pack directory, wiped before regeneration
    pub output: PathBuf,
    /// `Anims/manifest.txt`, if the pack has one
    pub manifest: Option<PathBuf>,
    /// Assets of the pack
    pub targets: Vec<BuildTarget>,
}

impl PackPlan {
    /// Create a plan with no targets.
    pub fn new(name: String, source: PathBuf, output: PathBuf) -> Self {
        Self { name, source, output, manifest: None, targets: vec![] }
    }
}

/// All packs of a run.
#[derive(Debug, Default)]
pub struct BuildPlan {
    packs: Vec<PackPlan>,
}

impl BuildPlan {
    /// Create a new empty build plan.
    pub fn new() -> Self {
        Self { packs: vec![] }
    }

    /// Add a pack to the plan.
    pub fn add_pack(&mut self, pack: PackPlan) {
        self.packs.push(pack);
    }

    /// Get all packs in the plan.
    pub fn packs(&self) -> &[PackPlan] {
        &self.packs
    }

    /// Iterate over the targets of every pack.
    pub fn targets(&self) -> impl Iterator<Item = &BuildTarget> {
        self.packs.iter().flat_map(|p| p.targets.iter())
    }

    /// Get the number of targets in the plan.
    pub fn len(&self) -> usize {
        self.packs.iter().map(|p| p.targets.len()).sum()
    }

    /// Check if the plan has no targets.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keep only targets matching one of the given patterns.
    ///
    /// Packs stay in the plan even when all their targets are filtered out.
    pub fn filter(mut self, patterns: &[String]) -> Self {
        if patterns.is_empty() {
            return self;
        }

        for pack in &mut self.packs {
            pack.targets.retain(|t| patterns.iter().any(|p| t.matches_filter(p)));
        }
        self
    }
}
