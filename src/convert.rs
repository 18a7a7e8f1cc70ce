//! Pure conversion from raw provider patterns to funscript documents.
//!
//! The provider samples intensity on a 0–16 scale; funscript positions run
//! 0–100, so `pos = round(v * 6.25)`. Events whose timestamp is 0 are a
//! provider junk sentinel and are dropped; everything else is emitted in
//! order of appearance, one action per event, no dedup, no re-sort.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::provider::RawPatternEvent;

/// Maps the provider's 0–16 intensity scale onto funscript's 0–100.
const POSITION_SCALE: f64 = 6.25;

const FORMAT_VERSION: &str = "1.0";
const CREATOR: &str = "stash-haptics";
const NOTES: &str = "Converted from a Lovense pattern";

/// One funscript action: target position at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Action {
    /// Position, 0–100.
    pub pos: u32,
    /// Timestamp in milliseconds.
    pub at: u64,
}

/// Funscript metadata block. Field order is the serialization order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FunscriptMetadata {
    pub bookmarks: BTreeMap<String, serde_json::Value>,
    pub chapters: BTreeMap<String, serde_json::Value>,
    pub performers: BTreeMap<String, serde_json::Value>,
    pub tags: BTreeMap<String, serde_json::Value>,
    pub title: String,
    pub creator: String,
    pub description: String,
    /// Total duration in milliseconds.
    pub duration: u64,
    pub license: String,
    pub script_url: String,
    #[serde(rename = "type")]
    pub script_type: String,
    pub video_url: String,
    pub notes: String,
}

/// A complete funscript document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Funscript {
    pub version: String,
    pub range: u32,
    pub inverted: bool,
    pub metadata: FunscriptMetadata,
    pub actions: Vec<Action>,
}

/// Convert a raw event sequence into a funscript document.
///
/// Deterministic: the same inputs serialize to byte-identical output.
pub fn convert(title: &str, duration_ms: u64, events: &[RawPatternEvent]) -> Funscript {
    let mut actions = Vec::with_capacity(events.len());
    for event in events {
        if event.t == 0.0 {
            debug!(v = event.v, "Skipping junk event with zero timestamp");
            continue;
        }
        actions.push(Action {
            pos: (event.v * POSITION_SCALE).round() as u32,
            at: event.t.round() as u64,
        });
    }

    Funscript {
        version: FORMAT_VERSION.to_string(),
        range: 100,
        inverted: false,
        metadata: FunscriptMetadata {
            bookmarks: BTreeMap::new(),
            chapters: BTreeMap::new(),
            performers: BTreeMap::new(),
            tags: BTreeMap::new(),
            title: title.to_string(),
            creator: CREATOR.to_string(),
            description: String::new(),
            duration: duration_ms,
            license: "Open".to_string(),
            script_url: String::new(),
            script_type: "basic".to_string(),
            video_url: String::new(),
            notes: NOTES.to_string(),
        },
        actions,
    }
}

/// Script duration from a media file duration in seconds: rounded to the
/// nearest whole second, then scaled to milliseconds.
pub fn duration_ms_from_secs(seconds: f64) -> u64 {
    (seconds + 0.5) as u64 * 1000
}

/// Strip the host's `[PDT: ...]` prefix tag from a scene title.
pub fn clean_title(title: &str, tag_pattern: &regex::Regex) -> String {
    tag_pattern.replace(title, "").into_owned()
}

/// Default pattern for [`clean_title`].
pub fn title_tag_pattern() -> regex::Regex {
    regex::Regex::new(r"\[PDT: .+?\]\s+").expect("static regex")
}
