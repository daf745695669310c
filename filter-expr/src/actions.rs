//! Immutable, path-addressed edits of a filter tree.
//!
//! Every operation returns a new root. Only the groups on the path from the root to
//! the edited group are rebuilt; all other subtrees are shared with the input tree.

use crate::errors::{FilterError, Result};
use crate::path::{render_path, PathStep};
use crate::tree::{Condition, ConditionPatch, FilterNode, Group, GroupKey};
use log::debug;

/// Walk `path` from `root`, apply `updater` to the group it addresses and rebuild the
/// ancestors bottom-up.
fn update_group_at<F>(root: &Group, path: &[PathStep], updater: F) -> Result<Group>
where
    F: FnOnce(&Group) -> Result<Group>,
{
    let mut parents: Vec<(&Group, usize)> = Vec::with_capacity(path.len());
    let mut current = root;

    for (depth, step) in path.iter().enumerate() {
        if current.key() != step.key {
            return Err(FilterError::PathKeyMismatch {
                depth,
                expected: current.key(),
                actual: step.key,
            });
        }
        let child = current
            .child(step.index)
            .ok_or(FilterError::IndexOutOfRange {
                depth,
                key: current.key(),
                index: step.index,
                len: current.len(),
            })?;
        let next = child.as_group().ok_or(FilterError::NotAGroup {
            depth,
            key: current.key(),
            index: step.index,
        })?;
        parents.push((current, step.index));
        current = next;
    }

    let mut updated = updater(current)?;

    for (group, index) in parents.into_iter().rev() {
        let mut children = group.children().to_vec();
        children[index] = updated.into();
        updated = Group::new(group.key(), children);
    }

    Ok(updated)
}

/// Split a node path into its parent group path and the final step.
fn split_node_path<'a>(op: &'static str, path: &'a [PathStep]) -> Result<(&'a [PathStep], PathStep)> {
    match path.split_last() {
        Some((last, parent)) => Ok((parent, *last)),
        None => Err(FilterError::EmptyPath(op)),
    }
}

/// Check the final step of a node path against the group it indexes into.
fn check_last_step(group: &Group, depth: usize, step: PathStep) -> Result<()> {
    if group.key() != step.key {
        return Err(FilterError::PathKeyMismatch {
            depth,
            expected: group.key(),
            actual: step.key,
        });
    }
    if step.index >= group.len() {
        return Err(FilterError::IndexOutOfRange {
            depth,
            key: group.key(),
            index: step.index,
            len: group.len(),
        });
    }
    Ok(())
}

/// Rebuild the parent group of `node_path` with its child at the final index passed
/// through `edit`. `None` from `edit` drops the child.
fn update_child_at<F>(op: &'static str, root: &Group, node_path: &[PathStep], edit: F) -> Result<Group>
where
    F: FnOnce(&FilterNode, PathStep) -> Result<Option<FilterNode>>,
{
    let (parent_path, last) = split_node_path(op, node_path)?;
    let depth = parent_path.len();

    update_group_at(root, parent_path, |g| {
        check_last_step(g, depth, last)?;
        let mut children = g.children().to_vec();
        match edit(&children[last.index], last)? {
            Some(replacement) => children[last.index] = replacement,
            None => {
                children.remove(last.index);
            }
        }
        Ok(Group::new(g.key(), children))
    })
}

/// Append `condition` to the group at `group_path`.
pub fn add_condition_at(root: &Group, group_path: &[PathStep], condition: Condition) -> Result<Group> {
    debug!(
        "add condition on '{}' at {}",
        condition.field,
        render_path(group_path)
    );
    update_group_at(root, group_path, |g| {
        let mut children = g.children().to_vec();
        children.push(condition.into());
        Ok(Group::new(g.key(), children))
    })
}

/// Append a new empty `key` group to the group at `group_path`.
pub fn add_group_at(root: &Group, group_path: &[PathStep], key: GroupKey) -> Result<Group> {
    debug!("add {} group at {}", key, render_path(group_path));
    update_group_at(root, group_path, |g| {
        let mut children = g.children().to_vec();
        children.push(Group::empty(key).into());
        Ok(Group::new(g.key(), children))
    })
}

/// Remove the node at `node_path`; later siblings shift down by one.
pub fn remove_at(root: &Group, node_path: &[PathStep]) -> Result<Group> {
    debug!("remove node at {}", render_path(node_path));
    update_child_at("remove_at", root, node_path, |_, _| Ok(None))
}

/// Flip the group at `group_path` between `and` and `or`, keeping its children.
pub fn toggle_group_key_at(root: &Group, group_path: &[PathStep]) -> Result<Group> {
    debug!("toggle group at {}", render_path(group_path));
    update_group_at(root, group_path, |g| {
        Ok(Group::new(g.key().toggled(), g.children().to_vec()))
    })
}

/// Shallow-merge `patch` onto the condition at `node_path`.
pub fn update_condition_at(root: &Group, node_path: &[PathStep], patch: &ConditionPatch) -> Result<Group> {
    debug!("update condition at {}", render_path(node_path));
    update_child_at("update_condition_at", root, node_path, |child, step| match child {
        FilterNode::Condition(c) => Ok(Some(c.merged(patch).into())),
        FilterNode::Group(_) => Err(FilterError::NotACondition {
            key: step.key,
            index: step.index,
        }),
    })
}

/// Substitute the node at `node_path` with `node`.
pub fn replace_node_at(root: &Group, node_path: &[PathStep], node: FilterNode) -> Result<Group> {
    debug!("replace node at {}", render_path(node_path));
    update_child_at("replace_node_at", root, node_path, |_, _| Ok(Some(node)))
}
