//! Ownership collections.
//!
//! Containers such as a type's method list keep the back-reference of each child (the method's
//! declaring type) consistent: a child has at most one live owner at any instant.
//!
//! Every container/child pair is described by an [`OwnershipEdge`], which tells the generic
//! [`OwnedList`] how to read and write the child's back-reference and how to reach the list of a
//! given owner. Reassigning a child through its owner-valued setter goes through [`reassign`],
//! which detaches the child from its current container before attaching it to the new one.
//!
//! Lists filled from the backing store use [`OwnedList::populate`]: a row that already claims a
//! different owner (malformed input, e.g. one parameter row listed by two methods) is not shared
//! but materialized a second time, and the fresh copy is owned by the populating container.

use std::sync::Arc;

use parking_lot::RwLock;

use crate::{Error, Result};

/// Describes one ownership relationship between a container and its children.
pub trait OwnershipEdge: Sized + 'static {
    /// The owned entity
    type Child: Send + Sync;
    /// Strong handle to the owning container
    type Owner: Clone;
    /// Weak handle to the owning container, stored by lists and children
    type WeakOwner: Clone + Send + Sync;

    /// Human readable name of the child kind, used in error messages
    const CHILD_KIND: &'static str;

    /// Downgrade an owner handle
    fn downgrade(owner: &Self::Owner) -> Self::WeakOwner;

    /// Upgrade a weak owner handle, `None` if the owner was dropped
    fn upgrade(owner: &Self::WeakOwner) -> Option<Self::Owner>;

    /// Identity comparison of two owners
    fn same_owner(a: &Self::Owner, b: &Self::Owner) -> bool;

    /// The child's current owner.
    ///
    /// Called while the lock of another entity may be held, so implementations must not take
    /// entity locks.
    fn owner_of(child: &Self::Child) -> Option<Self::Owner>;

    /// Overwrite the child's back-reference without touching any list. Same locking constraint
    /// as [`OwnershipEdge::owner_of`].
    fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>);

    /// Returns `true` if the child is held by a container of a different, mutually exclusive
    /// edge (a type is either top-level in a module or nested in a type, never both).
    fn claimed_elsewhere(_child: &Self::Child) -> bool {
        false
    }

    /// The list of `owner` holding children along this edge
    fn list(owner: &Self::Owner) -> Arc<OwnedList<Self>>;
}

/// A list of children that enforces single ownership along the edge `E`.
///
/// Structural edits are individually atomic, but sequences of edits from several threads must be
/// serialized by the caller.
pub struct OwnedList<E: OwnershipEdge> {
    owner: E::WeakOwner,
    items: RwLock<Vec<Arc<E::Child>>>,
}

impl<E: OwnershipEdge> OwnedList<E> {
    /// Create an empty list owned by `owner`
    pub fn new(owner: E::WeakOwner) -> Self {
        OwnedList {
            owner,
            items: RwLock::new(Vec::new()),
        }
    }

    /// Build a list from backing-store rows.
    ///
    /// Candidates that are unowned are adopted. Candidates that claim a different owner are
    /// replaced by the copy `rematerialize` produces for the same row; when no copy can be
    /// produced the row is skipped.
    pub fn populate<F>(owner: &E::Owner, candidates: Vec<Arc<E::Child>>, rematerialize: F) -> Self
    where
        F: Fn(&Arc<E::Child>) -> Option<Arc<E::Child>>,
    {
        let mut items = Vec::with_capacity(candidates.len());
        for candidate in candidates {
            let adoptable = !E::claimed_elsewhere(&candidate)
                && E::owner_of(&candidate).map_or(true, |current| E::same_owner(&current, owner));

            if adoptable {
                E::set_owner(&candidate, Some(owner));
                items.push(candidate);
                continue;
            }

            tracing::warn!(
                kind = E::CHILD_KIND,
                "row already owned by another container, materializing a private copy"
            );
            if let Some(copy) = rematerialize(&candidate) {
                E::set_owner(&copy, Some(owner));
                items.push(copy);
            }
        }

        OwnedList {
            owner: E::downgrade(owner),
            items: RwLock::new(items),
        }
    }

    /// The container owning this list
    pub fn owner(&self) -> Option<E::Owner> {
        E::upgrade(&self.owner)
    }

    /// Append `child` and make this list's container its owner.
    ///
    /// Adding a child that is already part of this list is a no-op.
    ///
    /// # Errors
    /// Returns [`Error::InvalidOperation`] if the child is owned by a different container, or if
    /// the container of this list no longer exists.
    pub fn add(&self, child: Arc<E::Child>) -> Result<()> {
        let len = self.items.read().len();
        self.insert(len, child)
    }

    /// Insert `child` at `index` (clamped to the list length) and make this list's container its
    /// owner.
    ///
    /// # Errors
    /// Same conditions as [`OwnedList::add`].
    pub fn insert(&self, index: usize, child: Arc<E::Child>) -> Result<()> {
        let owner = self.attach_target(&child)?;
        if self.contains(&child) {
            return Ok(());
        }

        E::set_owner(&child, Some(&owner));

        let mut items = self.items.write();
        let index = index.min(items.len());
        items.insert(index, child);
        Ok(())
    }

    fn attach_target(&self, child: &Arc<E::Child>) -> Result<E::Owner> {
        let owner = self.owner().ok_or_else(|| {
            Error::InvalidOperation(format!(
                "the container of this {} list no longer exists",
                E::CHILD_KIND
            ))
        })?;

        if E::claimed_elsewhere(child) {
            return Err(Error::InvalidOperation(format!(
                "{} is already owned by another kind of container, detach it first",
                E::CHILD_KIND
            )));
        }

        if let Some(current) = E::owner_of(child) {
            if !E::same_owner(&current, &owner) {
                return Err(Error::InvalidOperation(format!(
                    "{} is already owned by another container, detach it first",
                    E::CHILD_KIND
                )));
            }
        }

        Ok(owner)
    }

    /// Remove `child`, clearing its owner. Returns `false` if the child is not part of this list.
    pub fn remove(&self, child: &Arc<E::Child>) -> bool {
        let removed = {
            let mut items = self.items.write();
            match items.iter().position(|item| Arc::ptr_eq(item, child)) {
                Some(index) => Some(items.remove(index)),
                None => None,
            }
        };

        match removed {
            Some(child) => {
                E::set_owner(&child, None);
                true
            }
            None => false,
        }
    }

    /// Remove the child at `index`, clearing its owner
    pub fn remove_at(&self, index: usize) -> Option<Arc<E::Child>> {
        let removed = {
            let mut items = self.items.write();
            (index < items.len()).then(|| items.remove(index))
        };

        if let Some(child) = &removed {
            E::set_owner(child, None);
        }
        removed
    }

    /// Detach every child, then empty the list
    pub fn clear(&self) {
        let removed = std::mem::take(&mut *self.items.write());
        for child in &removed {
            E::set_owner(child, None);
        }
    }

    /// Returns `true` if `child` (by identity) is part of this list
    pub fn contains(&self, child: &Arc<E::Child>) -> bool {
        self.items.read().iter().any(|item| Arc::ptr_eq(item, child))
    }

    /// Position of `child` (by identity)
    pub fn index_of(&self, child: &Arc<E::Child>) -> Option<usize> {
        self.items.read().iter().position(|item| Arc::ptr_eq(item, child))
    }

    /// The child at `index`
    pub fn get(&self, index: usize) -> Option<Arc<E::Child>> {
        self.items.read().get(index).cloned()
    }

    /// Number of children
    pub fn len(&self) -> usize {
        self.items.read().len()
    }

    /// Returns `true` if the list has no children
    pub fn is_empty(&self) -> bool {
        self.items.read().is_empty()
    }

    /// A snapshot of the children
    pub fn to_vec(&self) -> Vec<Arc<E::Child>> {
        self.items.read().clone()
    }

    /// Iterate over a snapshot of the children
    pub fn iter(&self) -> std::vec::IntoIter<Arc<E::Child>> {
        self.to_vec().into_iter()
    }
}

/// Move `child` to `new_owner`, the semantics of every owner-valued setter.
///
/// Assigning the current owner is a no-op. Otherwise the child is first removed from its current
/// container, then added to the list of `new_owner` (if any).
///
/// # Errors
/// Propagates [`OwnedList::add`] failures.
pub fn reassign<E: OwnershipEdge>(
    child: &Arc<E::Child>,
    new_owner: Option<&E::Owner>,
) -> Result<()> {
    let current = E::owner_of(child);
    match (&current, new_owner) {
        (Some(current), Some(new_owner)) if E::same_owner(current, new_owner) => return Ok(()),
        (None, None) => return Ok(()),
        _ => {}
    }

    if let Some(current) = current {
        if !E::list(&current).remove(child) {
            E::set_owner(child, None);
        }
    }

    match new_owner {
        Some(new_owner) => E::list(new_owner).add(child.clone()),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{OnceLock, Weak};

    struct Parent {
        list: OnceLock<Arc<OwnedList<Edge>>>,
    }

    #[derive(Default)]
    struct Child {
        row: u32,
        owner: RwLock<Weak<Parent>>,
    }

    struct Edge;

    impl OwnershipEdge for Edge {
        type Child = Child;
        type Owner = Arc<Parent>;
        type WeakOwner = Weak<Parent>;

        const CHILD_KIND: &'static str = "child";

        fn downgrade(owner: &Self::Owner) -> Self::WeakOwner {
            Arc::downgrade(owner)
        }

        fn upgrade(owner: &Self::WeakOwner) -> Option<Self::Owner> {
            owner.upgrade()
        }

        fn same_owner(a: &Self::Owner, b: &Self::Owner) -> bool {
            Arc::ptr_eq(a, b)
        }

        fn owner_of(child: &Self::Child) -> Option<Self::Owner> {
            child.owner.read().upgrade()
        }

        fn set_owner(child: &Self::Child, owner: Option<&Self::Owner>) {
            *child.owner.write() = owner.map(Arc::downgrade).unwrap_or_default();
        }

        fn list(owner: &Self::Owner) -> Arc<OwnedList<Self>> {
            owner
                .list
                .get_or_init(|| Arc::new(OwnedList::new(Arc::downgrade(owner))))
                .clone()
        }
    }

    fn parent() -> Arc<Parent> {
        Arc::new(Parent {
            list: OnceLock::new(),
        })
    }

    fn child(row: u32) -> Arc<Child> {
        Arc::new(Child {
            row,
            ..Default::default()
        })
    }

    fn owned_by(child: &Arc<Child>, parent: &Arc<Parent>) -> bool {
        Edge::owner_of(child).is_some_and(|owner| Arc::ptr_eq(&owner, parent))
    }

    #[test]
    fn add_and_remove() {
        let parent = parent();
        let list = Edge::list(&parent);
        let child = child(1);

        list.add(child.clone()).unwrap();
        assert!(owned_by(&child, &parent));
        assert!(list.contains(&child));
        assert_eq!(list.len(), 1);

        assert!(list.remove(&child));
        assert!(Edge::owner_of(&child).is_none());
        assert!(!list.contains(&child));
        assert!(!list.remove(&child));
    }

    #[test]
    fn add_owned_elsewhere_fails() {
        let first = parent();
        let second = parent();
        let child = child(1);

        Edge::list(&first).add(child.clone()).unwrap();
        let result = Edge::list(&second).add(child.clone());

        assert!(matches!(result, Err(Error::InvalidOperation(_))));
        assert!(owned_by(&child, &first));
        assert!(Edge::list(&second).is_empty());
    }

    #[test]
    fn add_twice_is_noop() {
        let parent = parent();
        let child = child(1);

        Edge::list(&parent).add(child.clone()).unwrap();
        Edge::list(&parent).add(child.clone()).unwrap();
        assert_eq!(Edge::list(&parent).len(), 1);
    }

    #[test]
    fn insert_and_remove_at() {
        let parent = parent();
        let list = Edge::list(&parent);
        let (a, b, c) = (child(1), child(2), child(3));

        list.add(a.clone()).unwrap();
        list.add(c.clone()).unwrap();
        list.insert(1, b.clone()).unwrap();

        let rows: Vec<u32> = list.iter().map(|child| child.row).collect();
        assert_eq!(rows, vec![1, 2, 3]);
        assert_eq!(list.index_of(&c), Some(2));

        let removed = list.remove_at(0).unwrap();
        assert!(Arc::ptr_eq(&removed, &a));
        assert!(Edge::owner_of(&a).is_none());
        assert!(list.remove_at(10).is_none());
    }

    #[test]
    fn clear_detaches_all() {
        let parent = parent();
        let list = Edge::list(&parent);
        let children: Vec<_> = (1..=3).map(child).collect();
        for child in &children {
            list.add(child.clone()).unwrap();
        }

        list.clear();
        assert!(list.is_empty());
        assert!(children.iter().all(|child| Edge::owner_of(child).is_none()));
    }

    #[test]
    fn reassign_moves_between_owners() {
        let first = parent();
        let second = parent();
        let child = child(1);

        reassign::<Edge>(&child, Some(&first)).unwrap();
        assert!(Edge::list(&first).contains(&child));

        reassign::<Edge>(&child, Some(&second)).unwrap();
        assert!(!Edge::list(&first).contains(&child));
        assert!(Edge::list(&second).contains(&child));
        assert!(owned_by(&child, &second));

        // Same owner again
        reassign::<Edge>(&child, Some(&second)).unwrap();
        assert_eq!(Edge::list(&second).len(), 1);

        reassign::<Edge>(&child, None).unwrap();
        assert!(Edge::list(&second).is_empty());
        assert!(Edge::owner_of(&child).is_none());
    }

    #[test]
    fn populate_rematerializes_conflicts() {
        let first = parent();
        let second = parent();
        let shared = child(7);
        Edge::list(&first).add(shared.clone()).unwrap();

        let fresh = child(1);
        let list = OwnedList::<Edge>::populate(&second, vec![fresh.clone(), shared.clone()], |c| {
            Some(child(c.row))
        });

        assert_eq!(list.len(), 2);
        assert!(owned_by(&fresh, &second));
        assert!(owned_by(&shared, &first));

        let copy = list.get(1).unwrap();
        assert!(!Arc::ptr_eq(&copy, &shared));
        assert_eq!(copy.row, 7);
        assert!(owned_by(&copy, &second));
    }

    #[test]
    fn populate_skips_unmaterializable() {
        let first = parent();
        let second = parent();
        let shared = child(7);
        Edge::list(&first).add(shared.clone()).unwrap();

        let list = OwnedList::<Edge>::populate(&second, vec![shared], |_| None);
        assert!(list.is_empty());
    }

    #[test]
    fn dropped_owner_rejects_add() {
        let list = {
            let parent = parent();
            Edge::list(&parent)
        };
        // The list outlived its container: the cycle parent -> list -> weak parent is broken
        let result = list.add(child(1));
        assert!(matches!(result, Err(Error::InvalidOperation(_))));
    }
}
