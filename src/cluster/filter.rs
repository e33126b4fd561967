//! Predicate filters. All filters preserve input order.

use regex::Regex;

use crate::entity::EntityAttributes;
use crate::error::GrouperError;

/// Name filter: literal substring or regular expression.
#[derive(Debug, Clone)]
pub enum NamePattern {
    /// Matches names containing the string.
    Contains(String),
    /// Matches names the expression finds a match in.
    Regex(Regex),
}

impl NamePattern {
    /// Build a pattern. With `use_regex`, `pattern` must be a valid
    /// regular expression.
    pub fn new(pattern: &str, use_regex: bool) -> Result<Self, GrouperError> {
        if use_regex {
            Regex::new(pattern)
                .map(Self::Regex)
                .map_err(|e| GrouperError::InvalidPattern(e.to_string()))
        } else {
            Ok(Self::Contains(pattern.to_owned()))
        }
    }

    /// Whether `name` matches.
    #[must_use]
    pub fn matches(&self, name: &str) -> bool {
        match self {
            Self::Contains(s) => name.contains(s.as_str()),
            Self::Regex(re) => re.is_match(name),
        }
    }
}

fn retain<S, F>(scene: &S, entities: &[S::Entity], keep: F) -> Vec<S::Entity>
where
    S: EntityAttributes,
    F: Fn(&S, &S::Entity) -> bool,
{
    entities
        .iter()
        .filter(|e| keep(scene, e))
        .cloned()
        .collect()
}

/// Entities whose tag equals `tag`.
pub fn filter_by_tag<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
    tag: &str,
) -> Vec<S::Entity> {
    retain(scene, entities, |s, e| s.tag(e) == tag)
}

/// Entities on `layer`.
pub fn filter_by_layer<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
    layer: u32,
) -> Vec<S::Entity> {
    retain(scene, entities, |s, e| s.layer(e) == layer)
}

/// Entities whose name matches `pattern`.
pub fn filter_by_name<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
    pattern: &NamePattern,
) -> Vec<S::Entity> {
    retain(scene, entities, |s, e| pattern.matches(&s.name(e)))
}

/// Entities carrying the named capability.
pub fn filter_by_capability<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
    capability: &str,
) -> Vec<S::Entity> {
    retain(scene, entities, |s, e| s.has_capability(e, capability))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::{MemoryScene, ObjectId, SceneObject};

    fn scene() -> MemoryScene {
        let mut scene = MemoryScene::new("Level");
        let _ = scene.spawn(
            SceneObject::new("1", "Wall_North").with_tag("Wall").with_layer(3),
        );
        let _ = scene.spawn(
            SceneObject::new("2", "Lamp_01")
                .with_tag("Prop")
                .with_component("Light"),
        );
        let _ = scene.spawn(
            SceneObject::new("3", "Wall_South").with_tag("Wall"),
        );
        scene
    }

    fn names(scene: &MemoryScene, ids: &[ObjectId]) -> Vec<String> {
        ids.iter().map(|id| scene.name(id)).collect()
    }

    #[test]
    fn tag_and_layer_filters_keep_order() {
        let scene = scene();
        let all = scene.ids();
        assert_eq!(
            names(&scene, &filter_by_tag(&scene, &all, "Wall")),
            ["Wall_North", "Wall_South"]
        );
        assert_eq!(
            names(&scene, &filter_by_layer(&scene, &all, 3)),
            ["Wall_North"]
        );
        assert!(filter_by_tag(&scene, &all, "Nope").is_empty());
    }

    #[test]
    fn name_filter_literal_and_regex() {
        let scene = scene();
        let all = scene.ids();
        let literal = NamePattern::new("Wall", false).unwrap();
        assert_eq!(filter_by_name(&scene, &all, &literal).len(), 2);

        // A literal pattern does not interpret metacharacters.
        let dotted = NamePattern::new("Wall.", false).unwrap();
        assert!(filter_by_name(&scene, &all, &dotted).is_empty());

        let re = NamePattern::new(r"^\w+_\d+$", true).unwrap();
        assert_eq!(
            names(&scene, &filter_by_name(&scene, &all, &re)),
            ["Lamp_01"]
        );
    }

    #[test]
    fn invalid_regex_is_rejected() {
        assert!(matches!(
            NamePattern::new("(unclosed", true),
            Err(GrouperError::InvalidPattern(_))
        ));
    }

    #[test]
    fn capability_filter() {
        let scene = scene();
        let all = scene.ids();
        assert_eq!(
            names(&scene, &filter_by_capability(&scene, &all, "Light")),
            ["Lamp_01"]
        );
    }
}
