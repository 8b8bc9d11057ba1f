//! Nested view of the flat category collection.

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use uuid::Uuid;
use vitrina_core::models::category::{Category, CategoryLevel};

/// A category with its descendants, as shown in the admin sidebar.
#[derive(Debug, Clone, Serialize)]
pub struct CategoryNode {
    pub category: Category,
    pub depth: usize,
    pub children: Vec<CategoryNode>,
}

impl CategoryNode {
    pub fn level(&self) -> Option<CategoryLevel> {
        CategoryLevel::from_depth(self.depth)
    }

    /// Number of nodes in this subtree, including `self`.
    pub fn subtree_size(&self) -> usize {
        1 + self.children.iter().map(CategoryNode::subtree_size).sum::<usize>()
    }
}

/// Arrange `categories` into a forest ordered by name at every level.
///
/// Categories whose parent is not in the input are shown as roots.
/// Records that only reach each other through a parent loop have no
/// root to hang from and are left out.
pub fn build_forest(categories: Vec<Category>) -> Vec<CategoryNode> {
    let known: HashSet<Uuid> = categories.iter().map(|c| c.id).collect();

    let mut by_parent: HashMap<Option<Uuid>, Vec<Category>> = HashMap::new();
    for category in categories {
        let parent = category.parent_id.filter(|p| known.contains(p));
        by_parent.entry(parent).or_default().push(category);
    }

    attach(&mut by_parent, None, 0)
}

fn attach(
    by_parent: &mut HashMap<Option<Uuid>, Vec<Category>>,
    parent: Option<Uuid>,
    depth: usize,
) -> Vec<CategoryNode> {
    let mut level = by_parent.remove(&parent).unwrap_or_default();
    level.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));

    level
        .into_iter()
        .map(|category| {
            let children = attach(by_parent, Some(category.id), depth + 1);
            CategoryNode {
                category,
                depth,
                children,
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn cat(name: &str, parent_id: Option<Uuid>) -> Category {
        Category {
            id: Uuid::new_v4(),
            name: name.into(),
            image: None,
            parent_id,
            parent_name: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn nests_three_levels_sorted_by_name() {
        let shoes = cat("Shoes", None);
        let hats = cat("hats", None);
        let sneakers = cat("Sneakers", Some(shoes.id));
        let boots = cat("Boots", Some(shoes.id));
        let running = cat("Running", Some(sneakers.id));

        let forest = build_forest(vec![
            running.clone(),
            shoes.clone(),
            sneakers.clone(),
            hats.clone(),
            boots.clone(),
        ]);

        let names: Vec<_> = forest.iter().map(|n| n.category.name.as_str()).collect();
        assert_eq!(names, ["hats", "Shoes"]);

        let shoes_node = &forest[1];
        assert_eq!(shoes_node.subtree_size(), 4);
        let sub_names: Vec<_> = shoes_node
            .children
            .iter()
            .map(|n| n.category.name.as_str())
            .collect();
        assert_eq!(sub_names, ["Boots", "Sneakers"]);

        let running_node = &shoes_node.children[1].children[0];
        assert_eq!(running_node.category.id, running.id);
        assert_eq!(running_node.depth, 2);
        assert_eq!(running_node.level(), Some(CategoryLevel::Third));
    }

    #[test]
    fn dangling_parent_becomes_root() {
        let orphan = cat("Orphan", Some(Uuid::new_v4()));
        let forest = build_forest(vec![orphan.clone()]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.id, orphan.id);
        assert_eq!(forest[0].depth, 0);
    }

    #[test]
    fn parent_loops_are_excluded() {
        let mut a = cat("A", None);
        let mut b = cat("B", None);
        a.parent_id = Some(b.id);
        b.parent_id = Some(a.id);

        let forest = build_forest(vec![a, b, cat("Root", None)]);
        assert_eq!(forest.len(), 1);
        assert_eq!(forest[0].category.name, "Root");
    }
}
