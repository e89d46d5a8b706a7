use tracing::trace;

use crate::ArenaError;

/// Generational handle to an arena node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId {
    index: u32,
    generation: u32,
}

impl NodeId {
    /// Slot index of this handle (stable for the node's lifetime)
    pub fn index(&self) -> usize {
        self.index as usize
    }
}

/// Size of the subtree below a node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct NodeStats {
    /// Number of nodes strictly below the node
    pub descendants: usize,
    /// Longest parent-to-leaf path below the node (a leaf has depth 0)
    pub depth: usize,
}

#[derive(Debug)]
struct Node {
    data: Vec<u8>,
    parent: Option<u32>,
    first_child: Option<u32>,
    next: Option<u32>,
    prev: Option<u32>,
}

#[derive(Debug)]
struct Slot {
    generation: u32,
    node: Option<Node>,
}

/// Slot arena holding an ownership forest of byte buffers
#[derive(Debug, Default)]
pub struct Arena {
    slots: Vec<Slot>,
    free_slots: Vec<u32>,
    live: usize,
}

impl Arena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of live nodes across all trees
    pub fn len(&self) -> usize {
        self.live
    }

    pub fn is_empty(&self) -> bool {
        self.live == 0
    }

    /// True if `id` refers to a live node
    pub fn contains(&self, id: NodeId) -> bool {
        self.check(id).is_ok()
    }

    /// Allocate `size` bytes owned by `parent` (or a new root when `None`).
    pub fn allocate(&mut self, size: usize, parent: Option<NodeId>) -> Result<NodeId, ArenaError> {
        if size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        let parent_idx = parent.map(|p| self.check(p)).transpose()?;
        let data = alloc_buffer(size)?;

        let idx = self.insert(Node {
            data,
            parent: None,
            first_child: None,
            next: None,
            prev: None,
        });
        if let Some(p) = parent_idx {
            self.link(idx, p);
        }
        Ok(self.id_of(idx))
    }

    /// Allocate `count * elem_size` zeroed bytes owned by `parent`.
    pub fn allocate_zeroed(
        &mut self,
        count: usize,
        elem_size: usize,
        parent: Option<NodeId>,
    ) -> Result<NodeId, ArenaError> {
        if count == 0 || elem_size == 0 {
            return Err(ArenaError::ZeroSize);
        }
        let size = count
            .checked_mul(elem_size)
            .ok_or(ArenaError::Overflow { count, elem_size })?;
        self.allocate(size, parent)
    }

    /// Change the capacity of a node, keeping its contents and tree position.
    ///
    /// Bytes up to `min(old, new)` are preserved and new bytes are zeroed.
    /// `resize(Some(n), 0)` frees `n` and returns `Ok(None)`; `resize(None, n)`
    /// allocates a fresh root.
    pub fn resize(
        &mut self,
        node: Option<NodeId>,
        new_size: usize,
    ) -> Result<Option<NodeId>, ArenaError> {
        let Some(id) = node else {
            return self.allocate(new_size, None).map(Some);
        };
        let idx = self.check(id)?;
        if new_size == 0 {
            self.free(Some(id));
            return Ok(None);
        }

        let n = self.node_mut(idx).ok_or(ArenaError::StaleHandle(id))?;
        let old_size = n.data.len();
        if new_size > old_size {
            n.data
                .try_reserve_exact(new_size - old_size)
                .map_err(|_| ArenaError::OutOfMemory(new_size))?;
        }
        n.data.resize(new_size, 0);
        if new_size < old_size {
            n.data.shrink_to_fit();
        }
        Ok(Some(id))
    }

    /// Free a node and everything it owns; returns how many nodes were released.
    ///
    /// `free(None)` and stale handles are no-ops.
    pub fn free(&mut self, node: Option<NodeId>) -> usize {
        let Some(id) = node else {
            return 0;
        };
        let Ok(idx) = self.check(id) else {
            trace!(?id, "free of stale handle ignored");
            return 0;
        };

        self.unlink(idx);

        // Reverse pre-order releases every descendant before its owner.
        let order = self.subtree(idx);
        for &i in order.iter().rev() {
            self.release(i);
        }
        trace!(?id, freed = order.len(), "freed subtree");
        order.len()
    }

    /// Move `node` (with its subtree) under `new_parent`, or make it a root.
    pub fn reparent(
        &mut self,
        node: NodeId,
        new_parent: Option<NodeId>,
    ) -> Result<(), ArenaError> {
        let idx = self.check(node)?;
        let parent_idx = match new_parent {
            Some(p) => {
                let pidx = self.check(p)?;
                let mut cursor = Some(pidx);
                while let Some(c) = cursor {
                    if c == idx {
                        return Err(ArenaError::Cycle { node, parent: p });
                    }
                    cursor = self.node(c).and_then(|n| n.parent);
                }
                Some(pidx)
            }
            None => None,
        };

        self.unlink(idx);
        if let Some(p) = parent_idx {
            self.link(idx, p);
        }
        Ok(())
    }

    /// Descendant count and depth of the subtree rooted at `node`.
    pub fn stats(&self, node: NodeId) -> Result<NodeStats, ArenaError> {
        let idx = self.check(node)?;
        let mut stats = NodeStats::default();
        let mut stack = vec![(idx, 0usize)];
        while let Some((i, depth)) = stack.pop() {
            stats.depth = stats.depth.max(depth);
            for child in self.child_indices(i) {
                stats.descendants += 1;
                stack.push((child, depth + 1));
            }
        }
        Ok(stats)
    }

    pub fn parent(&self, node: NodeId) -> Result<Option<NodeId>, ArenaError> {
        let idx = self.check(node)?;
        Ok(self
            .node(idx)
            .and_then(|n| n.parent)
            .map(|p| self.id_of(p)))
    }

    /// Direct children of `node`, most recently attached first.
    pub fn children(&self, node: NodeId) -> Result<Children<'_>, ArenaError> {
        let idx = self.check(node)?;
        Ok(Children {
            arena: self,
            next: self.node(idx).and_then(|n| n.first_child),
        })
    }

    pub fn size(&self, node: NodeId) -> Result<usize, ArenaError> {
        self.bytes(node).map(<[u8]>::len)
    }

    pub fn bytes(&self, node: NodeId) -> Result<&[u8], ArenaError> {
        let idx = self.check(node)?;
        self.node(idx)
            .map(|n| n.data.as_slice())
            .ok_or(ArenaError::StaleHandle(node))
    }

    pub fn bytes_mut(&mut self, node: NodeId) -> Result<&mut [u8], ArenaError> {
        let idx = self.check(node)?;
        self.node_mut(idx)
            .map(|n| n.data.as_mut_slice())
            .ok_or(ArenaError::StaleHandle(node))
    }

    fn check(&self, id: NodeId) -> Result<u32, ArenaError> {
        match self.slots.get(id.index as usize) {
            Some(slot) if slot.generation == id.generation && slot.node.is_some() => Ok(id.index),
            _ => Err(ArenaError::StaleHandle(id)),
        }
    }

    fn id_of(&self, idx: u32) -> NodeId {
        NodeId {
            index: idx,
            generation: self.slots[idx as usize].generation,
        }
    }

    fn node(&self, idx: u32) -> Option<&Node> {
        self.slots.get(idx as usize).and_then(|s| s.node.as_ref())
    }

    fn node_mut(&mut self, idx: u32) -> Option<&mut Node> {
        self.slots.get_mut(idx as usize).and_then(|s| s.node.as_mut())
    }

    fn insert(&mut self, node: Node) -> u32 {
        self.live += 1;
        if let Some(idx) = self.free_slots.pop() {
            self.slots[idx as usize].node = Some(node);
            return idx;
        }
        self.slots.push(Slot {
            generation: 0,
            node: Some(node),
        });
        (self.slots.len() - 1) as u32
    }

    fn release(&mut self, idx: u32) {
        let slot = &mut self.slots[idx as usize];
        if slot.node.take().is_some() {
            slot.generation = slot.generation.wrapping_add(1);
            self.free_slots.push(idx);
            self.live -= 1;
        }
    }

    /// Attach a detached node as the first child of `parent`.
    fn link(&mut self, child: u32, parent: u32) {
        let old_first = self.node(parent).and_then(|n| n.first_child);
        if let Some(old) = old_first.and_then(|i| self.node_mut(i)) {
            old.prev = Some(child);
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = Some(parent);
            c.prev = None;
            c.next = old_first;
        }
        if let Some(p) = self.node_mut(parent) {
            p.first_child = Some(child);
        }
    }

    /// Detach a node from its owner's sibling list; a root is left as is.
    fn unlink(&mut self, child: u32) {
        let Some((parent, prev, next)) = self.node(child).map(|n| (n.parent, n.prev, n.next)) else {
            return;
        };

        match prev {
            Some(p) => {
                if let Some(n) = self.node_mut(p) {
                    n.next = next;
                }
            }
            None => {
                if let Some(n) = parent.and_then(|p| self.node_mut(p)) {
                    n.first_child = next;
                }
            }
        }
        if let Some(n) = next.and_then(|i| self.node_mut(i)) {
            n.prev = prev;
        }
        if let Some(c) = self.node_mut(child) {
            c.parent = None;
            c.prev = None;
            c.next = None;
        }
    }

    fn child_indices(&self, idx: u32) -> impl Iterator<Item = u32> + '_ {
        let first = self.node(idx).and_then(|n| n.first_child);
        std::iter::successors(first, move |&i| self.node(i).and_then(|n| n.next))
    }

    /// Pre-order listing of the subtree rooted at `idx`.
    fn subtree(&self, idx: u32) -> Vec<u32> {
        let mut order = Vec::new();
        let mut stack = vec![idx];
        while let Some(i) = stack.pop() {
            order.push(i);
            stack.extend(self.child_indices(i));
        }
        order
    }
}

/// Iterator over the direct children of a node
pub struct Children<'a> {
    arena: &'a Arena,
    next: Option<u32>,
}

impl Iterator for Children<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let idx = self.next?;
        self.next = self.arena.node(idx).and_then(|n| n.next);
        Some(self.arena.id_of(idx))
    }
}

fn alloc_buffer(size: usize) -> Result<Vec<u8>, ArenaError> {
    let mut data = Vec::new();
    data.try_reserve_exact(size)
        .map_err(|_| ArenaError::OutOfMemory(size))?;
    data.resize(size, 0);
    Ok(data)
}
