//! Persistent Stack Implementation
//!
//! The stack is a singly linked cons-list of `Value`s behind `Rc`. A `Stack`
//! is a pointer to its top node, so:
//! - Push: allocate one node pointing at the old top, O(1), no copy
//! - Pop: return the top value and the pointer to the node beneath
//!
//! Because nodes are never mutated, an old stack stays valid after a push.
//! Instrumentation hooks can hold both the stack before and after an
//! instruction, and pattern matching can peek without disturbing anything.

use crate::error::ErrorKind;
use crate::value::Value;
use std::fmt;
use std::rc::Rc;

struct Node {
    value: Value,
    rest: Stack,
    /// Number of values in the stack whose top is this node
    depth: usize,
}

/// Stack: A pointer to the top node, or the empty terminal.
#[derive(Clone, Default)]
pub struct Stack {
    head: Option<Rc<Node>>,
}

impl Stack {
    pub fn new() -> Self {
        Stack { head: None }
    }

    /// Build a stack from values listed bottom to top
    pub fn from_values(values: impl IntoIterator<Item = Value>) -> Self {
        values
            .into_iter()
            .fold(Stack::new(), |stack, value| stack.push(value))
    }

    pub fn is_empty(&self) -> bool {
        self.head.is_none()
    }

    pub fn len(&self) -> usize {
        self.head.as_ref().map_or(0, |node| node.depth)
    }

    /// Push a value, sharing `self` as the rest of the new stack
    ///
    /// Stack effect: ( -- v )
    pub fn push(&self, value: Value) -> Stack {
        Stack {
            head: Some(Rc::new(Node {
                value,
                rest: self.clone(),
                depth: self.len() + 1,
            })),
        }
    }

    /// Pop the top value
    ///
    /// Stack effect: ( v -- )
    pub fn pop(&self) -> Result<(Value, Stack), ErrorKind> {
        match &self.head {
            Some(node) => Ok((node.value.clone(), node.rest.clone())),
            None => Err(ErrorKind::StackUnderflow {
                needed: 1,
                available: 0,
            }),
        }
    }

    /// Pop `n` values, returned deepest first
    ///
    /// Fails without popping anything if fewer than `n` values are present.
    pub fn pop_n(&self, n: usize) -> Result<(Vec<Value>, Stack), ErrorKind> {
        let available = self.len();
        if available < n {
            return Err(ErrorKind::StackUnderflow {
                needed: n,
                available,
            });
        }
        let mut values = Vec::with_capacity(n);
        let mut rest = self.clone();
        for _ in 0..n {
            let (value, below) = rest.pop()?;
            values.push(value);
            rest = below;
        }
        values.reverse();
        Ok((values, rest))
    }

    pub fn peek(&self) -> Option<&Value> {
        self.head.as_ref().map(|node| &node.value)
    }

    /// Look at the top `n` values (deepest first) without popping
    pub fn peek_n(&self, n: usize) -> Option<Vec<&Value>> {
        if self.len() < n {
            return None;
        }
        let mut values: Vec<&Value> = self.iter().take(n).collect();
        values.reverse();
        Some(values)
    }

    /// Iterate from the top of the stack downwards
    pub fn iter(&self) -> Iter<'_> {
        Iter {
            next: self.head.as_deref(),
        }
    }

    /// Copy the values out, bottom to top
    pub fn to_vec(&self) -> Vec<Value> {
        let mut values: Vec<Value> = self.iter().cloned().collect();
        values.reverse();
        values
    }

    /// True when both stacks are the very same nodes
    pub fn ptr_eq(&self, other: &Stack) -> bool {
        match (&self.head, &other.head) {
            (Some(a), Some(b)) => Rc::ptr_eq(a, b),
            (None, None) => true,
            _ => false,
        }
    }
}

pub struct Iter<'a> {
    next: Option<&'a Node>,
}

impl<'a> Iterator for Iter<'a> {
    type Item = &'a Value;

    fn next(&mut self) -> Option<Self::Item> {
        self.next.map(|node| {
            self.next = node.rest.head.as_deref();
            &node.value
        })
    }
}

// Unlink iteratively; a recursive drop of a long list overflows the host stack.
impl Drop for Stack {
    fn drop(&mut self) {
        let mut next = self.head.take();
        while let Some(node) = next {
            match Rc::try_unwrap(node) {
                Ok(mut node) => next = node.rest.head.take(),
                Err(_) => break,
            }
        }
    }
}

impl PartialEq for Stack {
    fn eq(&self, other: &Self) -> bool {
        self.len() == other.len() && self.iter().zip(other.iter()).all(|(a, b)| a == b)
    }
}

impl fmt::Debug for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.to_vec()).finish()
    }
}

/// Renders bottom to top, e.g. `1 "two" :three`
impl fmt::Display for Stack {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, value) in self.to_vec().iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}
