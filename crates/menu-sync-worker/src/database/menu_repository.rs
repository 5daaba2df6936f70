use super::{DbPool, MenuNode, MenuRow};
use crate::platform::MenuKind;
use anyhow::{bail, Result};
use async_trait::async_trait;
use tracing::debug;

#[cfg(test)]
use mockall::automock;

/// Local menu store: whole-tree reads and replaces per account.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn load_tree(&self, account_id: i64) -> Result<Vec<MenuNode>>;
    async fn replace_tree(&self, account_id: i64, tree: &[MenuNode]) -> Result<()>;
    async fn delete_tree(&self, account_id: i64) -> Result<()>;
}

pub struct MenuRepository {
    pool: DbPool,
}

impl MenuRepository {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MenuStore for MenuRepository {
    async fn load_tree(&self, account_id: i64) -> Result<Vec<MenuNode>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"SELECT id, account_id, parent_id, position, name, kind, menu_key
               FROM menus
               WHERE account_id = $1
               ORDER BY parent_id NULLS FIRST, position"#,
        )
        .bind(account_id)
        .fetch_all(self.pool.get_pool())
        .await?;

        build_tree(rows)
    }

    async fn replace_tree(&self, account_id: i64, tree: &[MenuNode]) -> Result<()> {
        let mut transaction = self.pool.get_pool().begin().await?;

        sqlx::query("DELETE FROM menus WHERE account_id = $1")
            .bind(account_id)
            .execute(&mut *transaction)
            .await?;

        for (position, node) in tree.iter().enumerate() {
            match node {
                MenuNode::Button { name, kind, key } => {
                    sqlx::query(
                        r#"INSERT INTO menus (account_id, parent_id, position, name, kind, menu_key)
                           VALUES ($1, NULL, $2, $3, $4, $5)"#,
                    )
                    .bind(account_id)
                    .bind(position as i32)
                    .bind(name)
                    .bind(kind.as_str())
                    .bind(key)
                    .execute(&mut *transaction)
                    .await?;
                }
                MenuNode::Group { name, children } => {
                    let parent_id: i64 = sqlx::query_scalar(
                        r#"INSERT INTO menus (account_id, parent_id, position, name, kind, menu_key)
                           VALUES ($1, NULL, $2, $3, NULL, NULL)
                           RETURNING id"#,
                    )
                    .bind(account_id)
                    .bind(position as i32)
                    .bind(name)
                    .fetch_one(&mut *transaction)
                    .await?;

                    for (child_position, child) in children.iter().enumerate() {
                        let MenuNode::Button { name, kind, key } = child else {
                            bail!("menu group {:?} nests another group", name);
                        };

                        sqlx::query(
                            r#"INSERT INTO menus (account_id, parent_id, position, name, kind, menu_key)
                               VALUES ($1, $2, $3, $4, $5, $6)"#,
                        )
                        .bind(account_id)
                        .bind(parent_id)
                        .bind(child_position as i32)
                        .bind(name)
                        .bind(kind.as_str())
                        .bind(key)
                        .execute(&mut *transaction)
                        .await?;
                    }
                }
            }
        }

        transaction.commit().await?;
        debug!("Replaced menu tree for account {}", account_id);

        Ok(())
    }

    async fn delete_tree(&self, account_id: i64) -> Result<()> {
        sqlx::query("DELETE FROM menus WHERE account_id = $1")
            .bind(account_id)
            .execute(self.pool.get_pool())
            .await?;

        Ok(())
    }
}

/// Rebuild the two-level tree from adjacency rows. Expects top-level rows
/// before sub-rows, each ordered by position.
fn build_tree(rows: Vec<MenuRow>) -> Result<Vec<MenuNode>> {
    let (tops, subs): (Vec<MenuRow>, Vec<MenuRow>) =
        rows.into_iter().partition(|row| row.parent_id.is_none());

    let mut tree: Vec<(i64, MenuNode)> = Vec::with_capacity(tops.len());

    for row in tops {
        let node = match row.kind {
            Some(kind) => MenuNode::Button {
                name: row.name,
                kind: MenuKind::parse(&kind)?,
                key: row.menu_key.unwrap_or_default(),
            },
            None => MenuNode::Group {
                name: row.name,
                children: Vec::new(),
            },
        };
        tree.push((row.id, node));
    }

    for row in subs {
        let parent_id = row.parent_id.unwrap_or_default();
        let Some((_, parent)) = tree.iter_mut().find(|(id, _)| *id == parent_id) else {
            bail!("menu row {} references missing parent {}", row.id, parent_id);
        };

        let MenuNode::Group { children, .. } = parent else {
            bail!("menu row {} attached to a leaf button", row.id);
        };

        let Some(kind) = row.kind else {
            bail!("sub-menu row {} has no kind", row.id);
        };

        children.push(MenuNode::Button {
            name: row.name,
            kind: MenuKind::parse(&kind)?,
            key: row.menu_key.unwrap_or_default(),
        });
    }

    Ok(tree.into_iter().map(|(_, node)| node).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        id: i64,
        parent_id: Option<i64>,
        position: i32,
        name: &str,
        kind: Option<&str>,
        menu_key: Option<&str>,
    ) -> MenuRow {
        MenuRow {
            id,
            account_id: 1,
            parent_id,
            position,
            name: name.to_string(),
            kind: kind.map(str::to_string),
            menu_key: menu_key.map(str::to_string),
        }
    }

    #[test]
    fn test_build_tree_rebuilds_groups_and_leaves() {
        let rows = vec![
            row(1, None, 0, "More", None, None),
            row(2, None, 1, "Site", Some("view"), Some("https://example.com")),
            row(3, Some(1), 0, "Hello", Some("click"), Some("XN_EVENT_A")),
            row(4, Some(1), 1, "Scan", Some("scancode_push"), Some("rscan")),
        ];

        let tree = build_tree(rows).unwrap();
        assert_eq!(tree.len(), 2);

        let MenuNode::Group { name, children } = &tree[0] else {
            panic!("expected group");
        };
        assert_eq!(name, "More");
        assert_eq!(children.len(), 2);
        assert_eq!(
            children[0],
            MenuNode::Button {
                name: "Hello".to_string(),
                kind: MenuKind::Click,
                key: "XN_EVENT_A".to_string(),
            }
        );

        assert_eq!(
            tree[1],
            MenuNode::Button {
                name: "Site".to_string(),
                kind: MenuKind::View,
                key: "https://example.com".to_string(),
            }
        );
    }

    #[test]
    fn test_build_tree_rejects_orphan_rows() {
        let rows = vec![row(3, Some(99), 0, "Lost", Some("click"), Some("k"))];
        assert!(build_tree(rows).is_err());
    }

    #[test]
    fn test_build_tree_rejects_children_under_leaf() {
        let rows = vec![
            row(1, None, 0, "Site", Some("view"), Some("https://example.com")),
            row(2, Some(1), 0, "Nested", Some("click"), Some("k")),
        ];
        assert!(build_tree(rows).is_err());
    }

    #[test]
    fn test_build_tree_empty() {
        assert!(build_tree(Vec::new()).unwrap().is_empty());
    }
}
