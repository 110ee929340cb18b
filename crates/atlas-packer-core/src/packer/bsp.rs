use super::Packer;
use crate::model::Rect;

type NodeId = usize;

#[derive(Debug, Clone)]
enum Node<K> {
    Leaf { rect: Rect, occupant: Option<K> },
    /// Split node; never holds an item itself.
    Internal {
        rect: Rect,
        left: NodeId,
        right: NodeId,
    },
}

/// Binary-space-partition ("lightmap") packer.
///
/// Every successful insertion ends in a leaf whose rect matches the item's
/// size exactly. Leaves are split along the axis that keeps the larger
/// leftover strip as large as possible.
///
/// Nodes live in an arena and reference children by index. The tree is
/// scratch state: build a fresh one for every attempt.
#[derive(Debug, Clone)]
pub struct BspPacker<K> {
    nodes: Vec<Node<K>>,
    placed: usize,
}

const ROOT: NodeId = 0;

impl<K> BspPacker<K> {
    /// Roots the tree at `(0, width) x (0, height)`.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            nodes: vec![Node::Leaf {
                rect: Rect::new(0, width, 0, height),
                occupant: None,
            }],
            placed: 0,
        }
    }

    pub fn bounds(&self) -> Rect {
        match &self.nodes[ROOT] {
            Node::Leaf { rect, .. } | Node::Internal { rect, .. } => *rect,
        }
    }

    /// Number of items placed so far.
    pub fn len(&self) -> usize {
        self.placed
    }

    pub fn is_empty(&self) -> bool {
        self.placed == 0
    }

    /// Occupied leaves in arena order.
    pub fn placements(&self) -> impl Iterator<Item = (&K, Rect)> + '_ {
        self.nodes.iter().filter_map(|n| match n {
            Node::Leaf {
                rect,
                occupant: Some(key),
            } => Some((key, *rect)),
            _ => None,
        })
    }

    fn push_leaf(&mut self, rect: Rect) -> NodeId {
        self.nodes.push(Node::Leaf {
            rect,
            occupant: None,
        });
        self.nodes.len() - 1
    }

    /// Hands the key back on failure so the caller can try a sibling.
    fn insert_at(&mut self, id: NodeId, key: K, w: u32, h: u32) -> Result<Rect, K> {
        let rect = match self.nodes[id] {
            Node::Internal { left, right, .. } => {
                return match self.insert_at(left, key, w, h) {
                    Ok(rect) => Ok(rect),
                    Err(key) => self.insert_at(right, key, w, h),
                };
            }
            Node::Leaf {
                occupant: Some(_), ..
            } => return Err(key),
            Node::Leaf { rect, .. } => rect,
        };

        if w > rect.width() || h > rect.height() {
            return Err(key);
        }

        if w == rect.width() && h == rect.height() {
            self.nodes[id] = Node::Leaf {
                rect,
                occupant: Some(key),
            };
            self.placed += 1;
            return Ok(rect);
        }

        let dw = rect.width() - w;
        let dh = rect.height() - h;
        let (first, second) = if dw > dh {
            (
                Rect::new(rect.left, rect.left + w, rect.bottom, rect.top),
                Rect::new(rect.left + w, rect.right, rect.bottom, rect.top),
            )
        } else {
            (
                Rect::new(rect.left, rect.right, rect.top - h, rect.top),
                Rect::new(rect.left, rect.right, rect.bottom, rect.top - h),
            )
        };
        let left = self.push_leaf(first);
        let right = self.push_leaf(second);
        self.nodes[id] = Node::Internal { rect, left, right };
        self.insert_at(left, key, w, h)
    }
}

impl<K> Packer<K> for BspPacker<K> {
    fn pack(&mut self, key: K, width: u32, height: u32) -> Option<Rect> {
        if width == 0 || height == 0 {
            return None;
        }
        self.insert_at(ROOT, key, width, height).ok()
    }
}
