use serde::{Deserialize, Serialize};

/// One registered scene: display name mapped to the vendor's opaque id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneRef {
    pub name: String,
    #[serde(rename = "sceneId")]
    pub id: String,
}

/// Ordered name-to-id directory. `Empty` models "no scenes registered yet"
/// explicitly instead of a reserved sentinel row, so a real scene name can
/// never collide with it.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SceneDirectory {
    #[default]
    Empty,
    Populated(Vec<SceneRef>),
}

impl SceneDirectory {
    pub fn from_scenes(scenes: Vec<SceneRef>) -> Self {
        if scenes.is_empty() {
            Self::Empty
        } else {
            Self::Populated(scenes)
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Self::Empty)
    }

    pub fn scenes(&self) -> &[SceneRef] {
        match self {
            Self::Empty => &[],
            Self::Populated(scenes) => scenes,
        }
    }

    pub fn resolve(&self, name: &str) -> Option<&str> {
        self.scenes()
            .iter()
            .find(|scene| scene.name == name)
            .map(|scene| scene.id.as_str())
    }

    /// Bulk replace with a fresh registration set.
    pub fn replace(&mut self, scenes: Vec<SceneRef>) {
        *self = Self::from_scenes(scenes);
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn scene(name: &str, id: &str) -> SceneRef {
        SceneRef {
            name: name.to_string(),
            id: id.to_string(),
        }
    }

    #[test]
    fn empty_directory_resolves_nothing() {
        let directory = SceneDirectory::default();

        assert!(directory.is_empty());
        assert!(directory.scenes().is_empty());
        assert_eq!(directory.resolve("Evening"), None);
    }

    #[test]
    fn resolves_by_name_in_registration_order() {
        let directory =
            SceneDirectory::from_scenes(vec![scene("Evening", "S1"), scene("Morning", "S2")]);

        assert_eq!(directory.resolve("Evening"), Some("S1"));
        assert_eq!(directory.resolve("Morning"), Some("S2"));
        assert_eq!(directory.resolve("Night"), None);
        assert_eq!(directory.scenes()[0].name, "Evening");
    }

    #[test]
    fn replace_with_empty_set_returns_to_empty() {
        let mut directory = SceneDirectory::from_scenes(vec![scene("Evening", "S1")]);
        directory.replace(Vec::new());

        assert!(directory.is_empty());
    }

    #[test]
    fn replace_overwrites_previous_contents() {
        let mut directory = SceneDirectory::from_scenes(vec![scene("Evening", "S1")]);
        directory.replace(vec![scene("Night", "S9")]);

        assert_eq!(directory.resolve("Evening"), None);
        assert_eq!(directory.resolve("Night"), Some("S9"));
    }
}
