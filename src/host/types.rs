use std::path::PathBuf;

use serde::Deserialize;

/// A media record owned by the host, read-only to this plugin.
#[derive(Debug, Clone, Deserialize)]
pub struct Scene {
    pub id: String,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub urls: Vec<String>,
    #[serde(default)]
    pub files: Vec<SceneFile>,
}

impl Scene {
    /// Title to embed in generated scripts; falls back to the scene ID.
    pub fn display_title(&self) -> String {
        self.title
            .as_deref()
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| format!("Scene {}", self.id))
    }
}

/// Technical metadata of one file variant of a scene.
#[derive(Debug, Clone, Deserialize)]
pub struct SceneFile {
    pub path: PathBuf,
    #[serde(default)]
    pub duration: f64,
    #[serde(default)]
    pub size: Option<i64>,
    #[serde(default)]
    pub width: Option<u32>,
    #[serde(default)]
    pub height: Option<u32>,
    #[serde(default)]
    pub frame_rate: Option<f64>,
    #[serde(default)]
    pub bit_rate: Option<i64>,
    #[serde(default)]
    pub video_codec: Option<String>,
    #[serde(default)]
    pub mod_time: Option<String>,
}

/// Top-level GraphQL response envelope.
#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlResponse {
    #[serde(default)]
    pub data: Option<FindScenesData>,
    #[serde(default)]
    pub errors: Option<Vec<GraphqlError>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphqlError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindScenesData {
    #[serde(rename = "findScenes")]
    pub find_scenes: FindScenes,
}

#[derive(Debug, Deserialize)]
pub(crate) struct FindScenes {
    pub count: u64,
    pub scenes: Vec<Scene>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deserializes_find_scenes_response() {
        let raw = r#"{
            "data": {
                "findScenes": {
                    "count": 1,
                    "scenes": [{
                        "id": "17",
                        "title": "Example",
                        "urls": ["https://members.adulttime.com/en/video/site/Example/123456"],
                        "files": [{
                            "path": "/media/example.mp4",
                            "duration": 1834.56,
                            "size": 123456789,
                            "width": 1920,
                            "height": 1080,
                            "frame_rate": 29.97,
                            "video_codec": "h264"
                        }]
                    }]
                }
            }
        }"#;
        let resp: GraphqlResponse = serde_json::from_str(raw).unwrap();
        let data = resp.data.unwrap();
        assert_eq!(data.find_scenes.count, 1);
        let scene = &data.find_scenes.scenes[0];
        assert_eq!(scene.id, "17");
        assert_eq!(scene.files[0].duration, 1834.56);
        assert_eq!(scene.files[0].width, Some(1920));
    }

    #[test]
    fn display_title_falls_back_to_id() {
        let scene = Scene {
            id: "99".to_string(),
            title: None,
            urls: vec![],
            files: vec![],
        };
        assert_eq!(scene.display_title(), "Scene 99");

        let scene = Scene {
            title: Some(String::new()),
            ..scene
        };
        assert_eq!(scene.display_title(), "Scene 99");
    }

    #[test]
    fn tolerates_missing_optional_fields() {
        let raw = r#"{"id": "5", "files": [{"path": "/a/b.mkv"}]}"#;
        let scene: Scene = serde_json::from_str(raw).unwrap();
        assert!(scene.urls.is_empty());
        assert_eq!(scene.files[0].duration, 0.0);
        assert!(scene.files[0].video_codec.is_none());
    }
}
