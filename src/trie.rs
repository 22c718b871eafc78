//! The encoder side dictionary, a prefix tree over byte sequences.
//!
//! Nodes live in one arena and refer to each other by index. A node that is reached by the path
//! of a dictionary entry is *terminal* and carries that entry's code. Codes are handed out in
//! insertion order, so a trie seeded with [`Trie::with_alphabet`] maps every single byte to its
//! own value and every later entry to `256, 257, ...`.
//!
//! [`Trie::with_alphabet`]: struct.Trie.html#method.with_alphabet
use std::convert::TryFrom;

use crate::{Code, LzwError, ALPHABET_SIZE, MAX_CODESIZE};

/// Index of a node in the arena.
pub(crate) type NodeId = u32;

/// The node of the empty sequence.
pub(crate) const ROOT: NodeId = 0;

const NO_NODE: NodeId = NodeId::MAX;

const SHORT: usize = 16;

/// A prefix tree mapping byte sequences to codes.
pub struct Trie {
    nodes: Vec<Node>,
    simples: Vec<Simple>,
    complex: Vec<Full>,
    /// Number of terminal nodes, which is also the next code to assign.
    len: usize,
}

struct Node {
    /// The byte on the edge leading into this node.
    byte: u8,
    successors: Successors,
    /// Set iff the path to this node is a dictionary entry.
    code: Option<Code>,
}

/// To avoid using too much memory we keep nodes with few successors in optimized form. This form
/// doesn't offer lookup by indexing but instead does a linear search.
#[derive(Clone, Copy)]
enum Successors {
    None,
    Simple(u32),
    Full(u32),
}

#[derive(Clone, Copy, Default)]
struct Simple {
    nodes: [NodeId; SHORT],
    bytes: [u8; SHORT],
    count: u8,
}

#[derive(Clone, Copy)]
struct Full {
    next: [NodeId; 256],
}

impl Trie {
    /// Create a trie that knows no sequences.
    pub fn new() -> Self {
        // The root branches into every byte once seeded, so it starts out in full form.
        Trie {
            nodes: vec![Node {
                byte: 0,
                successors: Successors::Full(0),
                code: None,
            }],
            simples: Vec::new(),
            complex: vec![Full {
                next: [NO_NODE; 256],
            }],
            len: 0,
        }
    }

    /// Create a trie seeded with all single-byte sequences under codes `0..256`.
    pub fn with_alphabet() -> Self {
        let mut trie = Trie::new();
        for byte in 0..ALPHABET_SIZE {
            let node = trie.insert_child(ROOT, byte as u8);
            // Codes are still far below the limit here.
            trie.nodes[node as usize].code = Some(byte as Code);
            trie.len += 1;
        }
        trie
    }

    /// The number of sequences in the dictionary.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Add a sequence, returning its code and whether it was newly inserted.
    ///
    /// If the sequence is already present its existing code is returned together with `false`.
    /// A sequence whose path exists but was never an entry itself becomes one.
    pub fn add(&mut self, sequence: &[u8]) -> Result<(Code, bool), LzwError> {
        if sequence.is_empty() {
            return Err(LzwError::EmptySequence);
        }

        let (mut node, matched) = self.longest_prefix(sequence);
        if matched == sequence.len() {
            if let Some(code) = self.code(node) {
                return Ok((code, false));
            }
        }

        for &byte in &sequence[matched..] {
            node = self.insert_child(node, byte);
        }

        let code = self.assign(node)?;
        Ok((code, true))
    }

    pub fn add_byte(&mut self, byte: u8) -> Result<(Code, bool), LzwError> {
        self.add(&[byte])
    }

    /// Check whether exactly this sequence is a dictionary entry.
    pub fn contains(&self, sequence: &[u8]) -> bool {
        let (node, matched) = self.longest_prefix(sequence);
        matched == sequence.len() && self.code(node).is_some()
    }

    pub fn contains_byte(&self, byte: u8) -> bool {
        self.contains(&[byte])
    }

    /// The code of a sequence that is a dictionary entry.
    pub fn index_of(&self, sequence: &[u8]) -> Result<Code, LzwError> {
        let (node, matched) = self.longest_prefix(sequence);
        if matched != sequence.len() {
            return Err(LzwError::UnknownSequence);
        }

        self.code(node).ok_or(LzwError::UnknownSequence)
    }

    /// Walk the sequence as far as the tree has edges for it.
    ///
    /// Returns the last node reached and the number of bytes consumed to get there.
    pub(crate) fn longest_prefix(&self, sequence: &[u8]) -> (NodeId, usize) {
        let mut node = ROOT;
        for (matched, &byte) in sequence.iter().enumerate() {
            match self.child(node, byte) {
                Some(next) => node = next,
                None => return (node, matched),
            }
        }

        (node, sequence.len())
    }

    /// The code of a node, if it is terminal.
    pub(crate) fn code(&self, node: NodeId) -> Option<Code> {
        self.nodes[node as usize].code
    }

    /// Follow one byte from a node to a terminal successor.
    pub(crate) fn step(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        self.child(node, byte).filter(|&next| self.code(next).is_some())
    }

    /// Make the sequence of `node` followed by `byte` an entry, returning its new code.
    ///
    /// The caller must have checked with `step` that this is not yet an entry.
    pub(crate) fn extend(&mut self, node: NodeId, byte: u8) -> Result<Code, LzwError> {
        let next = match self.child(node, byte) {
            Some(next) => next,
            None => self.insert_child(node, byte),
        };
        debug_assert!(self.code(next).is_none());
        self.assign(next)
    }

    fn assign(&mut self, node: NodeId) -> Result<Code, LzwError> {
        let code =
            Code::try_from(self.len).map_err(|_| LzwError::CodeSpaceExhausted(MAX_CODESIZE))?;
        self.nodes[node as usize].code = Some(code);
        self.len += 1;
        Ok(code)
    }

    fn child(&self, node: NodeId, byte: u8) -> Option<NodeId> {
        match self.nodes[node as usize].successors {
            Successors::None => None,
            Successors::Simple(idx) => {
                let nexts = &self.simples[idx as usize];
                let successors = nexts
                    .nodes
                    .iter()
                    .zip(nexts.bytes.iter())
                    .take(usize::from(nexts.count));
                for (&snode, &sbyte) in successors {
                    if sbyte == byte {
                        return Some(snode);
                    }
                }

                None
            }
            Successors::Full(idx) => {
                let next = self.complex[idx as usize].next[usize::from(byte)];
                if next == NO_NODE {
                    None
                } else {
                    debug_assert_eq!(self.nodes[next as usize].byte, byte);
                    Some(next)
                }
            }
        }
    }

    fn insert_child(&mut self, node: NodeId, byte: u8) -> NodeId {
        let next = self.nodes.len() as NodeId;
        self.nodes.push(Node {
            byte,
            successors: Successors::None,
            code: None,
        });

        match self.nodes[node as usize].successors {
            Successors::None => {
                let mut simple = Simple::default();
                simple.nodes[0] = next;
                simple.bytes[0] = byte;
                simple.count = 1;
                self.nodes[node as usize].successors =
                    Successors::Simple(self.simples.len() as u32);
                self.simples.push(simple);
            }
            Successors::Simple(idx) if usize::from(self.simples[idx as usize].count) < SHORT => {
                let nexts = &mut self.simples[idx as usize];
                let nidx = usize::from(nexts.count);
                nexts.bytes[nidx] = byte;
                nexts.nodes[nidx] = next;
                nexts.count += 1;
            }
            Successors::Simple(idx) => {
                let simple = self.simples[idx as usize];
                let mut full = Full {
                    next: [NO_NODE; 256],
                };
                for (&sbyte, &snode) in simple.bytes.iter().zip(simple.nodes.iter()) {
                    full.next[usize::from(sbyte)] = snode;
                }
                full.next[usize::from(byte)] = next;
                self.nodes[node as usize].successors =
                    Successors::Full(self.complex.len() as u32);
                self.complex.push(full);
            }
            Successors::Full(idx) => {
                self.complex[idx as usize].next[usize::from(byte)] = next;
            }
        }

        next
    }
}

impl Default for Trie {
    fn default() -> Self {
        Trie::new()
    }
}
