//! Naming templates for generated groups and batch renames.
//!
//! A template is plain text with `{token}` placeholders:
//!
//! | Token     | Expands to                                     |
//! |-----------|------------------------------------------------|
//! | `{count}` | running counter, zero-padded to two digits     |
//! | `{date}`  | `yyyyMMdd`                                     |
//! | `{time}`  | `HHmmss`                                       |
//! | `{type}`  | kind of the reference entity (`Object`)        |
//! | `{tag}`   | tag of the reference entity (`Untagged`)       |
//! | `{scene}` | scene of the reference entity (`Global`)       |
//! | `{name}`  | name of the reference entity (`Group`)         |
//!
//! The value in parentheses is used when there is no reference entity.
//! Unknown tokens are not expanded. Expanded names are sanitized so they
//! are safe as asset/file names, which also turns stray braces into `_`.

use chrono::{Local, NaiveDateTime};

use crate::entity::{EntityAttributes, UNTAGGED};

/// Attributes of the entity a generated name refers to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameReference {
    /// Kind name.
    pub kind: String,
    /// Tag label.
    pub tag: String,
    /// Scene name, if the host knows it.
    pub scene: Option<String>,
    /// Display name.
    pub name: String,
}

impl NameReference {
    /// Snapshot the naming attributes of a live entity.
    pub fn of<S: EntityAttributes>(scene: &S, entity: &S::Entity) -> Self {
        Self {
            kind: scene.kind(entity),
            tag: scene.tag(entity),
            scene: scene.scene_name(entity),
            name: scene.name(entity),
        }
    }
}

/// Everything a template can refer to.
#[derive(Debug, Clone)]
pub struct NamingContext {
    /// Value of `{count}`.
    pub count: usize,
    /// Value of `{date}` and `{time}`.
    pub timestamp: NaiveDateTime,
    /// Source of the entity tokens.
    pub reference: Option<NameReference>,
}

impl NamingContext {
    /// Context at the current local time, without a reference entity.
    #[must_use]
    pub fn new(count: usize) -> Self {
        Self {
            count,
            timestamp: Local::now().naive_local(),
            reference: None,
        }
    }

    /// Use a fixed timestamp.
    #[must_use]
    pub fn at(mut self, timestamp: NaiveDateTime) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Take entity tokens from `reference`.
    #[must_use]
    pub fn with_reference(mut self, reference: NameReference) -> Self {
        self.reference = Some(reference);
        self
    }
}

/// Expand every known token in `template` and sanitize the result.
#[must_use]
pub fn expand(template: &str, ctx: &NamingContext) -> String {
    let r = ctx.reference.as_ref();
    let kind = r.map_or("Object", |r| r.kind.as_str());
    let tag = r.map_or(UNTAGGED, |r| r.tag.as_str());
    let scene = r.and_then(|r| r.scene.as_deref()).unwrap_or("Global");
    let name = r.map_or("Group", |r| r.name.as_str());

    let expanded = template
        .replace("{count}", &format!("{:02}", ctx.count))
        .replace("{date}", &ctx.timestamp.format("%Y%m%d").to_string())
        .replace("{time}", &ctx.timestamp.format("%H%M%S").to_string())
        .replace("{type}", kind)
        .replace("{tag}", tag)
        .replace("{scene}", scene)
        .replace("{name}", name);
    sanitize(&expanded)
}

/// Replace every character other than letters, digits, `_`, `-`, `.` and
/// space with `_`.
#[must_use]
pub fn sanitize(name: &str) -> String {
    name.chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '_' | '-' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Names for a batch rename: the template expanded once per entity with
/// `{count}` running from 1 and the entity itself as the reference.
pub fn batch_names<S: EntityAttributes>(
    scene: &S,
    entities: &[S::Entity],
    template: &str,
    timestamp: NaiveDateTime,
) -> Vec<(S::Entity, String)> {
    entities
        .iter()
        .enumerate()
        .map(|(i, e)| {
            let ctx = NamingContext::new(i + 1)
                .at(timestamp)
                .with_reference(NameReference::of(scene, e));
            (e.clone(), expand(template, &ctx))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;
    use crate::scene::{MemoryScene, SceneObject};

    fn noon() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 9)
            .unwrap()
            .and_hms_opt(12, 5, 7)
            .unwrap()
    }

    #[test]
    fn defaults_without_reference() {
        let ctx = NamingContext::new(3).at(noon());
        assert_eq!(
            expand("{name}_{type}_{tag}_{scene}_{count}", &ctx),
            "Group_Object_Untagged_Global_03"
        );
        assert_eq!(expand("{date}-{time}", &ctx), "20240309-120507");
    }

    #[test]
    fn reference_tokens_and_unknown_tokens() {
        let ctx = NamingContext::new(120).with_reference(NameReference {
            kind: "Light".to_owned(),
            tag: "Prop".to_owned(),
            scene: Some("Main".to_owned()),
            name: "Lamp".to_owned(),
        });
        // Braces of unknown tokens are sanitized away.
        assert_eq!(expand("{scene}/{name}_{count}{x}", &ctx), "Main_Lamp_120_x_");
        assert_eq!(expand("{type} {tag}", &ctx), "Light Prop");
    }

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize("Wall-01.v2 final"), "Wall-01.v2 final");
        assert_eq!(sanitize("a/b\\c:d*e"), "a_b_c_d_e");
    }

    #[test]
    fn batch_names_count_from_one() {
        let mut scene = MemoryScene::new("Level");
        let a = scene.spawn(SceneObject::new("a", "Rock").with_tag("Env"));
        let b = scene.spawn(SceneObject::new("b", "Tree").with_tag("Env"));
        let names = batch_names(&scene, &[a, b], "{scene}_{tag}_{count}", noon());
        assert_eq!(
            names,
            vec![(a, "Level_Env_01".to_owned()), (b, "Level_Env_02".to_owned())]
        );
    }
}
