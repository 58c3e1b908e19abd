//! Category grouping of the pipeline list.
//!
//! A pure derived view: recomputed from store state on every render, never
//! cached. Linear in pipeline count, which is tens per user, not millions.

use std::collections::HashMap;

use hoos_types::Pipeline;

/// Group for pipelines whose system tag is missing.
pub const FALLBACK_CATEGORY: &str = "Uncategorized";

/// One category of pipelines, keyed by system-tag name.
#[derive(Debug, PartialEq)]
pub struct CategoryGroup<'a> {
    pub name: &'a str,
    /// Header color, read from the first member's system tag.
    pub color: Option<&'a str>,
    pub pipelines: Vec<&'a Pipeline>,
}

/// Group pipelines by system-tag name, in first-seen order.
///
/// Total and idempotent: every input pipeline lands in exactly one group,
/// and pipelines without a system tag land under [`FALLBACK_CATEGORY`].
#[must_use]
pub fn group_by_category(pipelines: &[Pipeline]) -> Vec<CategoryGroup<'_>> {
    let mut groups: Vec<CategoryGroup<'_>> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();

    for pipeline in pipelines {
        let (name, color) = match pipeline.system_tag() {
            Some(tag) => (tag.name.as_str(), Some(tag.color.as_str())),
            None => (FALLBACK_CATEGORY, None),
        };
        match index.get(name) {
            Some(&at) => groups[at].pipelines.push(pipeline),
            None => {
                index.insert(name, groups.len());
                groups.push(CategoryGroup {
                    name,
                    color,
                    pipelines: vec![pipeline],
                });
            }
        }
    }

    groups
}

/// Expand/collapse per category, defaulting to collapsed.
#[derive(Debug, Default)]
pub struct CollapseState {
    expanded: HashMap<String, bool>,
}

impl CollapseState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn is_expanded(&self, category: &str) -> bool {
        self.expanded.get(category).copied().unwrap_or(false)
    }

    pub fn toggle(&mut self, category: &str) {
        let state = self.expanded.entry(category.to_string()).or_insert(false);
        *state = !*state;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hoos_types::{PipelineId, Tag, TagId, TagKind, UserId};

    fn pipeline(id: u64, system: Option<(&str, &str)>) -> Pipeline {
        let tags = system
            .map(|(name, color)| {
                vec![Tag {
                    id: TagId::new(id * 10),
                    name: name.into(),
                    color: color.into(),
                    kind: TagKind::System,
                }]
            })
            .unwrap_or_default();
        Pipeline {
            id: PipelineId::new(id),
            owner: UserId::new(1),
            name: format!("pipeline-{id}"),
            description: String::new(),
            created_at: None,
            number_of_documents: None,
            tags,
        }
    }

    #[test]
    fn every_pipeline_lands_in_exactly_one_group() {
        let pipelines = vec![
            pipeline(1, Some(("Science", "#10B981"))),
            pipeline(2, Some(("History", "#F59E0B"))),
            pipeline(3, Some(("Science", "#10B981"))),
            pipeline(4, None),
        ];
        let groups = group_by_category(&pipelines);

        let total: usize = groups.iter().map(|g| g.pipelines.len()).sum();
        assert_eq!(total, pipelines.len());

        let science = groups.iter().find(|g| g.name == "Science").unwrap();
        assert_eq!(science.pipelines.len(), 2);
        let fallback = groups.iter().find(|g| g.name == FALLBACK_CATEGORY).unwrap();
        assert_eq!(fallback.pipelines.len(), 1);
        assert_eq!(fallback.color, None);
    }

    #[test]
    fn grouping_is_idempotent() {
        let pipelines = vec![
            pipeline(1, Some(("Science", "#10B981"))),
            pipeline(2, None),
        ];
        let first = group_by_category(&pipelines);
        let second = group_by_category(&pipelines);
        assert_eq!(first, second);
    }

    #[test]
    fn group_order_follows_first_appearance() {
        let pipelines = vec![
            pipeline(1, Some(("History", "#F59E0B"))),
            pipeline(2, Some(("Science", "#10B981"))),
            pipeline(3, Some(("History", "#F59E0B"))),
        ];
        let names: Vec<_> = group_by_category(&pipelines)
            .into_iter()
            .map(|g| g.name)
            .collect();
        assert_eq!(names, vec!["History", "Science"]);
    }

    #[test]
    fn header_color_comes_from_first_member() {
        // A malformed mixed group would at worst mis-color the header; the
        // name keying guarantees it can never mis-group.
        let pipelines = vec![pipeline(1, Some(("Science", "#10B981")))];
        let groups = group_by_category(&pipelines);
        assert_eq!(groups[0].color, Some("#10B981"));
    }

    #[test]
    fn empty_input_produces_no_groups() {
        assert!(group_by_category(&[]).is_empty());
    }

    #[test]
    fn categories_default_collapsed_and_toggle() {
        let mut collapse = CollapseState::new();
        assert!(!collapse.is_expanded("Science"));
        collapse.toggle("Science");
        assert!(collapse.is_expanded("Science"));
        collapse.toggle("Science");
        assert!(!collapse.is_expanded("Science"));
    }
}
