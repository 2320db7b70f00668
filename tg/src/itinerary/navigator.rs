//! Day carousel position

/// Index of the day being shown, wrapping at both ends
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DayCursor {
    len: usize,
    index: usize,
}

impl DayCursor {
    pub fn new(len: usize) -> Self {
        Self { len, index: 0 }
    }

    /// Current index, `None` when there are no days
    pub fn current(&self) -> Option<usize> {
        (self.len > 0).then_some(self.index)
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn next(&mut self) -> Option<usize> {
        if self.len > 0 {
            self.index = (self.index + 1) % self.len;
        }
        self.current()
    }

    pub fn previous(&mut self) -> Option<usize> {
        if self.len > 0 {
            self.index = (self.index + self.len - 1) % self.len;
        }
        self.current()
    }

    /// Jump to `index`; out-of-range indexes leave the cursor alone
    pub fn go_to(&mut self, index: usize) -> bool {
        if index < self.len {
            self.index = index;
            true
        } else {
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wraps_both_ways() {
        let mut cursor = DayCursor::new(3);
        assert_eq!(cursor.current(), Some(0));
        assert_eq!(cursor.previous(), Some(2));
        assert_eq!(cursor.next(), Some(0));
        assert_eq!(cursor.next(), Some(1));
    }

    #[test]
    fn test_go_to() {
        let mut cursor = DayCursor::new(2);
        assert!(cursor.go_to(1));
        assert!(!cursor.go_to(2));
        assert_eq!(cursor.current(), Some(1));
    }

    #[test]
    fn test_empty() {
        let mut cursor = DayCursor::new(0);
        assert!(cursor.is_empty());
        assert_eq!(cursor.next(), None);
        assert_eq!(cursor.previous(), None);
        assert!(!cursor.go_to(0));
    }
}
