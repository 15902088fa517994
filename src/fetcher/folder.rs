//! Staging folder naming

use serde::Deserialize;
use sha2::{Digest, Sha256};

/// Number of hex characters of the URL hash appended in [`FolderNaming::Hashed`]
const HASH_PREFIX_LEN: usize = 12;

/// How a clone URL maps to a directory under the staging root
///
/// `Segment` reproduces the repository name, so two owners with identically
/// named repositories share a folder. `Hashed` keeps them apart.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Deserialize,
    strum_macros::Display,
    strum_macros::EnumString,
    clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum FolderNaming {
    #[default]
    Segment,
    Hashed,
}

/// Last path segment of the URL, without a trailing `/` or `.git`
pub fn repository_segment(url: &str) -> &str {
    let trimmed = url.trim_end_matches('/');
    let trimmed = trimmed.strip_suffix(".git").unwrap_or(trimmed);
    trimmed
        .rsplit(|c| c == '/' || c == ':')
        .next()
        .unwrap_or(trimmed)
}

/// Folder name for `url` under the given policy; empty if the URL has no usable segment
pub fn derive_folder_name(url: &str, naming: FolderNaming) -> String {
    let segment = repository_segment(url);
    match naming {
        FolderNaming::Segment => segment.to_string(),
        FolderNaming::Hashed => {
            let digest = format!("{:x}", Sha256::digest(url.as_bytes()));
            format!("{}-{}", segment, &digest[..HASH_PREFIX_LEN])
        }
    }
}
