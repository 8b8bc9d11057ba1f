//! Category hierarchy service — tree-shape mutations and product counts.

use std::collections::HashSet;

use futures::future::try_join_all;
use tracing::{debug, info, warn};
use uuid::Uuid;
use vitrina_core::error::{VitrinaError, VitrinaResult};
use vitrina_core::models::category::{Category, CategoryLevel, CreateCategory, UpdateCategory};
use vitrina_core::repository::{CategoryRepository, ProductRepository};

use crate::config::CatalogConfig;
use crate::tree::{self, CategoryNode};

/// Full replacement of a category's editable fields.
#[derive(Debug, Clone)]
pub struct EditCategory {
    pub name: String,
    /// Kept only if the category is a root after the edit.
    pub image: Option<String>,
    /// `None` makes the category a main (root) category.
    pub parent_id: Option<Uuid>,
}

/// Result of deleting a category.
#[derive(Debug, Clone)]
pub struct DeleteOutcome {
    pub deleted: Uuid,
    /// Former direct children, now roots.
    pub promoted: Vec<Uuid>,
}

/// Category hierarchy manager.
///
/// Generic over repository implementations so that the catalog layer
/// has no dependency on the database crate.
pub struct CategoryHierarchy<C: CategoryRepository, P: ProductRepository> {
    categories: C,
    products: P,
    config: CatalogConfig,
}

impl<C: CategoryRepository, P: ProductRepository> CategoryHierarchy<C, P> {
    pub fn new(categories: C, products: P, config: CatalogConfig) -> Self {
        Self {
            categories,
            products,
            config,
        }
    }

    // -----------------------------------------------------------------
    // Mutations
    // -----------------------------------------------------------------

    /// Create a category under `parent_id`, or as a main category when
    /// `parent_id` is `None`.
    ///
    /// A name that is empty after trimming is silently ignored: nothing
    /// is written and `Ok(None)` is returned. `image` is only stored for
    /// main categories.
    pub async fn add_category(
        &self,
        name: &str,
        parent_id: Option<Uuid>,
        image: Option<String>,
    ) -> VitrinaResult<Option<Category>> {
        let name = name.trim();
        if name.is_empty() {
            debug!("ignoring category with empty name");
            return Ok(None);
        }

        let input = match parent_id {
            None => CreateCategory {
                name: name.to_string(),
                image: normalize_image(image),
                parent_id: None,
                parent_name: None,
            },
            Some(pid) => {
                let chain = self.ancestor_chain(pid).await?;
                self.check_depth(chain.len(), 0)?;
                CreateCategory {
                    name: name.to_string(),
                    image: None,
                    parent_id: Some(pid),
                    parent_name: Some(chain[0].name.clone()),
                }
            }
        };

        let created = self.categories.create(input).await?;
        info!(
            category_id = %created.id,
            parent_id = ?created.parent_id,
            name = %created.name,
            "category created"
        );
        Ok(Some(created))
    }

    /// Rename, re-image or re-parent a category.
    ///
    /// Every check runs before the single write: a rejected edit leaves
    /// the stored tree untouched.
    ///
    /// The ancestor walk and the write are separate round trips, so two
    /// concurrent re-parentings of the same subtree can still race.
    pub async fn edit_category(&self, id: Uuid, input: EditCategory) -> VitrinaResult<Category> {
        if input.parent_id == Some(id) {
            return Err(VitrinaError::Cycle { id, parent_id: id });
        }

        let name = input.name.trim();
        if name.is_empty() {
            return Err(VitrinaError::validation("category name must not be empty"));
        }

        let current = self.categories.get_by_id(id).await?;

        let update = match input.parent_id {
            Some(parent_id) => {
                let (chain, end) = self.walk_ancestors(parent_id).await?;
                if end == WalkEnd::Loop || chain.iter().any(|c| c.id == id) {
                    warn!(category_id = %id, %parent_id, "rejected cyclic re-parent");
                    return Err(VitrinaError::Cycle { id, parent_id });
                }
                if end == WalkEnd::Truncated {
                    return Err(VitrinaError::validation(format!(
                        "ancestors of {parent_id} exceed {} links",
                        self.config.max_ancestor_walk
                    )));
                }
                let height = self.subtree_height(id).await?;
                self.check_depth(chain.len(), height)?;

                UpdateCategory {
                    name: Some(name.to_string()),
                    image: Some(None),
                    parent_id: Some(Some(parent_id)),
                    parent_name: Some(Some(chain[0].name.clone())),
                }
            }
            None => UpdateCategory {
                name: Some(name.to_string()),
                image: Some(normalize_image(input.image)),
                parent_id: Some(None),
                parent_name: Some(None),
            },
        };

        let updated = self.categories.update(id, update).await?;

        if updated.name != current.name {
            let touched = self
                .categories
                .set_parent_name_for_children(id, &updated.name)
                .await?;
            debug!(category_id = %id, touched, "refreshed children parent_name");
        }

        info!(
            category_id = %id,
            parent_id = ?updated.parent_id,
            moved = current.parent_id != updated.parent_id,
            "category updated"
        );
        Ok(updated)
    }

    /// Delete a category, promoting its direct children to main
    /// categories first. Grandchildren keep pointing at their (now
    /// root) parent.
    ///
    /// Promotions are issued concurrently; the record itself is removed
    /// only once every promotion has completed. If the delete fails
    /// afterwards the promoted children are still valid roots.
    pub async fn delete_category(&self, id: Uuid) -> VitrinaResult<DeleteOutcome> {
        self.categories.get_by_id(id).await?;

        let children = self.categories.get_children(id).await?;
        let promoted: Vec<Uuid> = children.iter().map(|c| c.id).collect();

        try_join_all(promoted.iter().map(|child_id| {
            self.categories.update(
                *child_id,
                UpdateCategory {
                    parent_id: Some(None),
                    parent_name: Some(None),
                    ..Default::default()
                },
            )
        }))
        .await?;

        self.categories.delete(id).await?;

        info!(
            category_id = %id,
            promoted = promoted.len(),
            "category deleted"
        );
        Ok(DeleteOutcome {
            deleted: id,
            promoted,
        })
    }

    // -----------------------------------------------------------------
    // Product counts
    // -----------------------------------------------------------------

    /// Products placed directly in `category_id` at `level`, matched by
    /// id or by the category's current name.
    pub async fn get_product_count(
        &self,
        category_id: Uuid,
        level: CategoryLevel,
    ) -> VitrinaResult<u64> {
        let category = self.categories.get_by_id(category_id).await?;
        self.products
            .count_matching(level, category.id, &category.name)
            .await
    }

    /// Direct products of `category_id` plus those of every descendant,
    /// each counted at its own level.
    ///
    /// A product referencing several levels of the same branch is
    /// counted once per level, so inconsistent product data over-counts.
    pub async fn get_total_product_count(&self, category_id: Uuid) -> VitrinaResult<u64> {
        let chain = self.ancestor_chain(category_id).await?;
        let depth = chain.len() - 1;
        let root = chain.into_iter().next().ok_or_else(|| {
            VitrinaError::Internal("ancestor chain is missing its start".into())
        })?;

        let mut seen = HashSet::from([root.id]);
        let mut pending = vec![(root, depth)];
        let mut total = 0;

        while let Some((category, depth)) = pending.pop() {
            let Some(level) = CategoryLevel::from_depth(depth) else {
                continue;
            };
            total += self
                .products
                .count_matching(level, category.id, &category.name)
                .await?;

            for child in self.categories.get_children(category.id).await? {
                if seen.insert(child.id) {
                    pending.push((child, depth + 1));
                }
            }
        }

        debug!(category_id = %category_id, total, "aggregated product count");
        Ok(total)
    }

    // -----------------------------------------------------------------
    // Reads
    // -----------------------------------------------------------------

    pub async fn get_category(&self, id: Uuid) -> VitrinaResult<Category> {
        self.categories.get_by_id(id).await
    }

    pub async fn list_categories(&self) -> VitrinaResult<Vec<Category>> {
        self.categories.list().await
    }

    pub async fn children(&self, id: Uuid) -> VitrinaResult<Vec<Category>> {
        self.categories.get_children(id).await
    }

    /// Ancestors of `id`, nearest first. Empty for a main category.
    pub async fn ancestors(&self, id: Uuid) -> VitrinaResult<Vec<Category>> {
        let mut chain = self.ancestor_chain(id).await?;
        chain.remove(0);
        Ok(chain)
    }

    /// Depth of `id`: 0 for main, 1 for sub, 2 for third.
    pub async fn depth_of(&self, id: Uuid) -> VitrinaResult<usize> {
        Ok(self.ancestor_chain(id).await?.len() - 1)
    }

    /// The whole catalog as a forest of main categories.
    pub async fn tree(&self) -> VitrinaResult<Vec<CategoryNode>> {
        Ok(tree::build_forest(self.categories.list().await?))
    }

    // -----------------------------------------------------------------
    // Internals
    // -----------------------------------------------------------------

    /// `start` followed by its ancestors up to the root. Never empty.
    ///
    /// A missing `start` is `NotFound`. The walk stops early at a
    /// dangling parent reference, at a parent loop, or after
    /// `max_ancestor_walk` links.
    async fn ancestor_chain(&self, start: Uuid) -> VitrinaResult<Vec<Category>> {
        Ok(self.walk_ancestors(start).await?.0)
    }

    /// Like [`ancestor_chain`](Self::ancestor_chain), also reporting
    /// where the walk stopped.
    async fn walk_ancestors(&self, start: Uuid) -> VitrinaResult<(Vec<Category>, WalkEnd)> {
        let first = self.categories.get_by_id(start).await?;
        let mut seen = HashSet::from([first.id]);
        let mut next = first.parent_id;
        let mut chain = vec![first];

        while let Some(parent_id) = next {
            if !seen.insert(parent_id) {
                warn!(category_id = %start, %parent_id, "parent chain loops");
                return Ok((chain, WalkEnd::Loop));
            }
            if chain.len() > self.config.max_ancestor_walk {
                warn!(category_id = %start, "parent chain is too long");
                return Ok((chain, WalkEnd::Truncated));
            }
            let parent = match self.categories.get_by_id(parent_id).await {
                Ok(parent) => parent,
                Err(VitrinaError::NotFound { .. }) => {
                    warn!(category_id = %start, %parent_id, "dangling parent reference");
                    break;
                }
                Err(e) => return Err(e),
            };
            next = parent.parent_id;
            chain.push(parent);
        }

        Ok((chain, WalkEnd::Complete))
    }

    /// Number of levels below `id` (0 for a leaf).
    async fn subtree_height(&self, id: Uuid) -> VitrinaResult<usize> {
        let mut seen = HashSet::from([id]);
        let mut frontier = vec![id];
        let mut height = 0;

        while height < self.config.max_ancestor_walk {
            let levels = try_join_all(frontier.iter().map(|p| self.categories.get_children(*p)))
                .await?;
            frontier = levels
                .into_iter()
                .flatten()
                .map(|c| c.id)
                .filter(|c| seen.insert(*c))
                .collect();
            if frontier.is_empty() {
                break;
            }
            height += 1;
        }

        Ok(height)
    }

    /// A node placed under a parent chain of `chain_len` records, with
    /// `height` levels beneath it, must fit in `max_depth` levels.
    fn check_depth(&self, chain_len: usize, height: usize) -> VitrinaResult<()> {
        if !self.config.enforce_depth_limit {
            return Ok(());
        }
        let deepest = chain_len + height;
        if deepest >= self.config.max_depth {
            return Err(VitrinaError::validation(format!(
                "category tree is limited to {} levels",
                self.config.max_depth
            )));
        }
        Ok(())
    }
}

/// How an ancestor walk ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum WalkEnd {
    /// Reached a root or a dangling parent reference.
    Complete,
    Loop,
    /// Gave up after `max_ancestor_walk` links.
    Truncated,
}

fn normalize_image(image: Option<String>) -> Option<String> {
    image
        .map(|url| url.trim().to_string())
        .filter(|url| !url.is_empty())
}
