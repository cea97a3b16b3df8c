// Copyright (c) 2025 Felix Kahle.
//
// Permission is hereby granted, free of charge, to any person obtaining
// a copy of this software and associated documentation files (the
// "Software"), to deal in the Software without restriction, including
// without limitation the rights to use, copy, modify, merge, publish,
// distribute, sublicense, and/or sell copies of the Software, and to
// permit persons to whom the Software is furnished to do so, subject to
// the following conditions:
//
// The above copyright notice and this permission notice shall be
// included in all copies or substantial portions of the Software.
//
// THE SOFTWARE IS PROVIDED "AS IS", WITHOUT WARRANTY OF ANY KIND,
// EXPRESS OR IMPLIED, INCLUDING BUT NOT LIMITED TO THE WARRANTIES OF
// MERCHANTABILITY, FITNESS FOR A PARTICULAR PURPOSE AND
// NONINFRINGEMENT. IN NO EVENT SHALL THE AUTHORS OR COPYRIGHT HOLDERS BE
// LIABLE FOR ANY CLAIM, DAMAGES OR OTHER LIABILITY, WHETHER IN AN ACTION
// OF CONTRACT, TORT OR OTHERWISE, ARISING FROM, OUT OF OR IN CONNECTION
// WITH THE SOFTWARE OR THE USE OR OTHER DEALINGS IN THE SOFTWARE.

use stack_alloc_core::coord::StackIndex;

/// One advisory flag per stack.
///
/// The allocator never consults these flags itself; they exist so that a
/// driver can mark stacks it is currently working on.
#[derive(Debug, Clone)]
pub struct LockMap {
    flags: Vec<bool>,
}

impl LockMap {
    pub fn new(stacks: usize) -> Self {
        Self {
            flags: vec![false; stacks],
        }
    }

    #[inline]
    pub fn set(&mut self, stack: StackIndex, locked: bool) {
        self.flags[stack.value()] = locked;
    }

    #[inline]
    pub fn is_set(&self, stack: StackIndex) -> bool {
        self.flags[stack.value()]
    }

    /// Locks all of `stacks` if none of them is locked yet.
    pub fn acquire_all(&mut self, stacks: &[StackIndex]) -> bool {
        if stacks.iter().any(|s| self.is_set(*s)) {
            return false;
        }
        for s in stacks {
            self.set(*s, true);
        }
        true
    }

    #[inline]
    pub fn locked_count(&self) -> usize {
        self.flags.iter().filter(|f| **f).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_acquire_all_is_all_or_nothing() {
        let mut locks = LockMap::new(4);
        locks.set(StackIndex::new(2), true);
        assert!(!locks.acquire_all(&[StackIndex::new(0), StackIndex::new(2)]));
        assert!(!locks.is_set(StackIndex::new(0)));
        assert!(locks.acquire_all(&[StackIndex::new(0), StackIndex::new(1), StackIndex::new(0)]));
        assert_eq!(locks.locked_count(), 3);
    }
}
