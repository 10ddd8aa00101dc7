//! Tag operations

use chrono::{TimeZone, Utc};
use tracing::{debug, instrument, warn};

use branchver_core::error::Result;

use crate::repository::GitRepo;
use crate::types::TagInfo;

impl GitRepo {
    /// Every tag peeled to its commit; tags on non-commit objects are skipped
    #[instrument(skip(self))]
    pub fn all_tags(&self) -> Result<Vec<TagInfo>> {
        let mut tags = Vec::new();

        self.repo.tag_foreach(|oid, name| {
            let name = String::from_utf8_lossy(name)
                .trim_start_matches("refs/tags/")
                .to_string();

            let commit = match self
                .repo
                .find_object(oid, None)
                .and_then(|object| object.peel_to_commit())
            {
                Ok(commit) => commit,
                Err(e) => {
                    warn!(tag = %name, error = %e, "skipping tag that does not point at a commit");
                    return true;
                }
            };

            // annotated tags carry their own time
            let seconds = self
                .repo
                .find_tag(oid)
                .ok()
                .and_then(|tag| tag.tagger().map(|tagger| tagger.when().seconds()))
                .unwrap_or_else(|| commit.time().seconds());
            let timestamp = Utc
                .timestamp_opt(seconds, 0)
                .single()
                .unwrap_or_else(Utc::now);

            tags.push(TagInfo::new(name, commit.id().to_string(), timestamp));
            true
        })?;

        tags.sort_by(|a, b| a.name.cmp(&b.name));
        debug!(count = tags.len(), "listed all tags");
        Ok(tags)
    }
}
