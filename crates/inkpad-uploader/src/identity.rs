//! Stable per-file identity derived from the filename.

use std::collections::HashMap;
use std::sync::Mutex;

use sha2::{Digest, Sha256};

use inkpad_core::{FileIdentity, FileInfo};

/// Derives a [`FileIdentity`] from a file's name: SHA-256 over the name,
/// hex-encoded, memoized per name for the session.
///
/// Identity is name-based, not content-based, so the same name always maps to
/// the same identity across added/progress/completed events. Two distinct
/// files with equal names collide and share a row (last write wins); this is
/// an accepted limitation of the workflow, not something this resolver
/// corrects.
#[derive(Default)]
pub struct FileIdentityResolver {
    memo: Mutex<HashMap<String, FileIdentity>>,
}

impl FileIdentityResolver {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn identity_of(&self, file: &FileInfo) -> FileIdentity {
        let mut memo = self.memo.lock().expect("identity memo poisoned");
        memo.entry(file.name.clone())
            .or_insert_with(|| {
                let digest = Sha256::digest(file.name.as_bytes());
                FileIdentity::new(hex::encode(digest))
            })
            .clone()
    }
}
