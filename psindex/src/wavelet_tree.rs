//! A balanced wavelet tree over a sequence of small integers.
//!
//! Every context row of the NPA owns one of these.  The sequence is indexed by the bias-removed Ψ
//! value and holds, at each position, the row-local index of the column that owns that value.  A
//! select on (occurrence, column) then recovers the value.

use buffertk::{stack_pack, Packable, Unpackable};

use crate::bit_vector::{BitVector, RankSelect};
use crate::Error;

/////////////////////////////////////// OrderedSequenceIndex ///////////////////////////////////////

/// Rank and select over a sequence of symbols drawn from a small integer alphabet.
pub trait OrderedSequenceIndex {
    /// The number of symbols in the sequence.
    fn len(&self) -> usize;
    /// True when the sequence holds no symbols.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
    /// The symbol at position x.
    fn access(&self, x: usize) -> Option<u64>;
    /// The number of occurrences of q at positions i < x.
    fn rank_q(&self, x: usize, q: u64) -> usize;
    /// The position of the x'th (zero-based) occurrence of q.
    fn select_q(&self, x: usize, q: u64) -> Option<usize>;
}

///////////////////////////////////////////// internals ////////////////////////////////////////////

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct NodeStub {
    #[prototk(1, uint64)]
    lo: u64,
    #[prototk(2, uint64)]
    hi: u64,
    #[prototk(3, uint64)]
    len: u64,
    #[prototk(4, uint64)]
    words: Vec<u64>,
    #[prototk(5, uint64)]
    ranks: Vec<u64>,
    /// Index of the left child plus one.  0 if the left child is a leaf.
    #[prototk(6, uint64)]
    left: u64,
    /// Index of the right child plus one.  0 if the right child is a leaf.
    #[prototk(7, uint64)]
    right: u64,
}

#[derive(Clone, Debug, Default, prototk_derive::Message)]
struct TreeStub {
    #[prototk(1, uint64)]
    len: u64,
    #[prototk(2, uint64)]
    lo: u64,
    #[prototk(3, uint64)]
    hi: u64,
    #[prototk(4, message)]
    nodes: Vec<NodeStub>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
struct Node {
    lo: u64,
    hi: u64,
    bits: BitVector,
    left: Option<usize>,
    right: Option<usize>,
}

impl Node {
    fn mid(&self) -> u64 {
        self.lo + (self.hi - self.lo) / 2
    }

    fn child(&self, right: bool) -> Option<usize> {
        if right {
            self.right
        } else {
            self.left
        }
    }
}

fn to_child(x: Option<usize>) -> u64 {
    x.map(|x| x as u64 + 1).unwrap_or(0)
}

fn from_child(x: u64) -> Result<Option<usize>, Error> {
    if x == 0 {
        Ok(None)
    } else {
        Ok(Some(usize::try_from(x - 1)?))
    }
}

//////////////////////////////////////////// WaveletTree ///////////////////////////////////////////

/// A [WaveletTree] over symbols in `[lo, hi]`.  Nodes are laid out in preorder; a symbol range of
/// width one is a leaf and is not materialized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct WaveletTree {
    len: usize,
    lo: u64,
    hi: u64,
    nodes: Vec<Node>,
}

impl WaveletTree {
    pub fn new(sequence: &[u64], lo: u64, hi: u64) -> Result<Self, Error> {
        if lo > hi {
            return Err(Error::LogicError("wavelet tree with empty alphabet"));
        }
        if sequence.iter().any(|s| *s < lo || *s > hi) {
            return Err(Error::LogicError("wavelet tree symbol outside its alphabet"));
        }
        let mut nodes = vec![];
        Self::build(sequence, lo, hi, &mut nodes);
        Ok(Self {
            len: sequence.len(),
            lo,
            hi,
            nodes,
        })
    }

    fn build(sequence: &[u64], lo: u64, hi: u64, nodes: &mut Vec<Node>) -> Option<usize> {
        if lo >= hi {
            return None;
        }
        let mid = lo + (hi - lo) / 2;
        let idx = nodes.len();
        nodes.push(Node {
            lo,
            hi,
            bits: BitVector::from_bits(sequence.iter().map(|s| *s > mid)),
            left: None,
            right: None,
        });
        let (right, left): (Vec<u64>, Vec<u64>) = sequence.iter().partition(|s| **s > mid);
        nodes[idx].left = Self::build(&left, lo, mid, nodes);
        nodes[idx].right = Self::build(&right, mid + 1, hi, nodes);
        Some(idx)
    }

    /// The smallest symbol of the tree's alphabet.
    pub fn lo(&self) -> u64 {
        self.lo
    }

    /// The largest symbol of the tree's alphabet.
    pub fn hi(&self) -> u64 {
        self.hi
    }

    /// Serialize the tree, including each node's rank directory.
    pub fn to_bytes(&self) -> Vec<u8> {
        stack_pack(self).to_vec()
    }

    /// Parse a tree from exactly `buf`.
    pub fn from_bytes(buf: &[u8]) -> Result<Self, Error> {
        let (stub, rem) = <TreeStub as Unpackable>::unpack(buf)?;
        if !rem.is_empty() {
            return Err(Error::corrupt("wavelet tree has trailing bytes"));
        }
        Self::try_from(stub)
    }

    fn stub(&self) -> TreeStub {
        let nodes = self
            .nodes
            .iter()
            .map(|node| NodeStub {
                lo: node.lo,
                hi: node.hi,
                len: node.bits.len() as u64,
                words: node.bits.words().to_vec(),
                ranks: node.bits.ranks().to_vec(),
                left: to_child(node.left),
                right: to_child(node.right),
            })
            .collect();
        TreeStub {
            len: self.len as u64,
            lo: self.lo,
            hi: self.hi,
            nodes,
        }
    }

    fn check_child(&self, parent: usize, child: Option<usize>, right: bool) -> Result<(), Error> {
        let node = &self.nodes[parent];
        let (lo, hi) = if right {
            (node.mid() + 1, node.hi)
        } else {
            (node.lo, node.mid())
        };
        let len = if right {
            node.bits.rank1(node.bits.len())
        } else {
            node.bits.rank0(node.bits.len())
        };
        match child {
            None if lo == hi => Ok(()),
            None => Err(Error::corrupt("wavelet tree is missing an interior node")),
            Some(child) => {
                if child <= parent || child >= self.nodes.len() {
                    return Err(Error::corrupt("wavelet tree child out of order"));
                }
                let child = &self.nodes[child];
                if child.lo != lo || child.hi != hi || child.bits.len() != len {
                    return Err(Error::corrupt("wavelet tree child does not match its parent"));
                }
                Ok(())
            }
        }
    }
}

impl TryFrom<TreeStub> for WaveletTree {
    type Error = Error;

    fn try_from(stub: TreeStub) -> Result<Self, Error> {
        let mut nodes = Vec::with_capacity(stub.nodes.len());
        for node in stub.nodes.into_iter() {
            if node.lo >= node.hi {
                return Err(Error::corrupt("wavelet tree node spans one symbol"));
            }
            nodes.push(Node {
                lo: node.lo,
                hi: node.hi,
                bits: BitVector::from_parts(usize::try_from(node.len)?, node.words, node.ranks)?,
                left: from_child(node.left)?,
                right: from_child(node.right)?,
            });
        }
        let tree = Self {
            len: usize::try_from(stub.len)?,
            lo: stub.lo,
            hi: stub.hi,
            nodes,
        };
        if tree.lo > tree.hi {
            return Err(Error::corrupt("wavelet tree with empty alphabet"));
        }
        if tree.lo == tree.hi {
            if !tree.nodes.is_empty() {
                return Err(Error::corrupt("wavelet tree over one symbol has nodes"));
            }
            return Ok(tree);
        }
        let root = tree
            .nodes
            .first()
            .ok_or(Error::corrupt("wavelet tree is missing its root"))?;
        if root.lo != tree.lo || root.hi != tree.hi || root.bits.len() != tree.len {
            return Err(Error::corrupt("wavelet tree root does not match the tree"));
        }
        let mut children = 0;
        for idx in 0..tree.nodes.len() {
            let (left, right) = (tree.nodes[idx].left, tree.nodes[idx].right);
            tree.check_child(idx, left, false)?;
            tree.check_child(idx, right, true)?;
            children += left.is_some() as usize + right.is_some() as usize;
        }
        if children + 1 != tree.nodes.len() {
            return Err(Error::corrupt("wavelet tree has unreachable nodes"));
        }
        Ok(tree)
    }
}

impl Packable for WaveletTree {
    fn pack_sz(&self) -> usize {
        self.stub().pack_sz()
    }

    fn pack(&self, out: &mut [u8]) {
        self.stub().pack(out)
    }
}

impl OrderedSequenceIndex for WaveletTree {
    fn len(&self) -> usize {
        self.len
    }

    fn access(&self, mut x: usize) -> Option<u64> {
        if x >= self.len {
            return None;
        }
        let mut symbol = self.lo;
        let mut node = self.nodes.first().map(|_| 0);
        while let Some(idx) = node {
            let n = &self.nodes[idx];
            let right = n.bits.access(x);
            if right {
                x = n.bits.rank1(x);
                symbol = n.mid() + 1;
            } else {
                x = n.bits.rank0(x);
                symbol = n.lo;
            }
            node = n.child(right);
        }
        Some(symbol)
    }

    fn rank_q(&self, x: usize, q: u64) -> usize {
        if q < self.lo || q > self.hi {
            return 0;
        }
        let mut x = x.min(self.len);
        let mut node = self.nodes.first().map(|_| 0);
        while let Some(idx) = node {
            let n = &self.nodes[idx];
            let right = q > n.mid();
            x = if right {
                n.bits.rank1(x)
            } else {
                n.bits.rank0(x)
            };
            node = n.child(right);
        }
        x
    }

    fn select_q(&self, x: usize, q: u64) -> Option<usize> {
        if q < self.lo || q > self.hi {
            return None;
        }
        if self.nodes.is_empty() {
            return if x < self.len { Some(x) } else { None };
        }
        let mut path = Vec::with_capacity(16);
        let mut node = Some(0);
        while let Some(idx) = node {
            let right = q > self.nodes[idx].mid();
            path.push((idx, right));
            node = self.nodes[idx].child(right);
        }
        let mut pos = x;
        for (idx, right) in path.into_iter().rev() {
            let bits = &self.nodes[idx].bits;
            pos = if right {
                bits.select1(pos)?
            } else {
                bits.select0(pos)?
            };
        }
        Some(pos)
    }
}

/////////////////////////////////////// ReferenceWaveletTree ///////////////////////////////////////

/// A [ReferenceWaveletTree] answers every query with a linear scan.
#[cfg(test)]
#[derive(Debug)]
pub struct ReferenceWaveletTree {
    string: Vec<u64>,
}

#[cfg(test)]
impl ReferenceWaveletTree {
    pub fn new(s: &[u64]) -> Self {
        Self { string: s.to_vec() }
    }
}

#[cfg(test)]
impl OrderedSequenceIndex for ReferenceWaveletTree {
    fn len(&self) -> usize {
        self.string.len()
    }

    fn access(&self, x: usize) -> Option<u64> {
        self.string.get(x).copied()
    }

    fn rank_q(&self, x: usize, q: u64) -> usize {
        self.string.iter().take(x).filter(|s| **s == q).count()
    }

    fn select_q(&self, x: usize, q: u64) -> Option<usize> {
        self.string
            .iter()
            .enumerate()
            .filter(|(_, s)| **s == q)
            .nth(x)
            .map(|(idx, _)| idx)
    }
}

/////////////////////////////////////////////// tests //////////////////////////////////////////////
