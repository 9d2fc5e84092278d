// Input indexing
// A borrowed text view with a selected matching granularity. All engine
// positions are byte offsets; this module owns the conversions between
// offsets and element boundaries so that cluster-mode matching can never
// split a multi-scalar grapheme.

use unicode_segmentation::GraphemeCursor;

/// Unit of matching, selected per pattern.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Granularity {
    /// User-perceived characters (extended grapheme clusters)
    #[default]
    Grapheme,
    /// Unicode scalar values (`char`)
    Scalar,
    /// Raw UTF-8 code units
    CodeUnit,
}

/// Text plus granularity. Cheap to copy; owns nothing.
#[derive(Debug, Clone, Copy)]
pub struct Input<'a> {
    text: &'a str,
    granularity: Granularity,
}

impl<'a> Input<'a> {
    pub fn new(text: &'a str, granularity: Granularity) -> Self {
        Input { text, granularity }
    }

    pub fn text(&self) -> &'a str {
        self.text
    }

    pub fn granularity(&self) -> Granularity {
        self.granularity
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        &self.text[start..end]
    }

    /// Byte offset of the element boundary after `pos`, or None at the end.
    pub fn next_boundary(&self, pos: usize) -> Option<usize> {
        if pos >= self.text.len() {
            return None;
        }
        match self.granularity {
            Granularity::CodeUnit => Some(pos + 1),
            Granularity::Scalar => {
                let c = self.text[pos..].chars().next()?;
                Some(pos + c.len_utf8())
            }
            Granularity::Grapheme => {
                let mut cursor = GraphemeCursor::new(pos, self.text.len(), true);
                cursor.next_boundary(self.text, 0).unwrap_or(None)
            }
        }
    }

    /// Byte offset of the element boundary before `pos`, or None at the start.
    pub fn prev_boundary(&self, pos: usize) -> Option<usize> {
        if pos == 0 {
            return None;
        }
        match self.granularity {
            Granularity::CodeUnit => Some(pos - 1),
            Granularity::Scalar => {
                let c = self.text[..pos].chars().next_back()?;
                Some(pos - c.len_utf8())
            }
            Granularity::Grapheme => {
                let mut cursor = GraphemeCursor::new(pos, self.text.len(), true);
                cursor.prev_boundary(self.text, 0).unwrap_or(None)
            }
        }
    }

    /// Whether `pos` lies on an element boundary (start and end always do).
    pub fn is_boundary(&self, pos: usize) -> bool {
        if pos == 0 || pos == self.text.len() {
            return true;
        }
        if pos > self.text.len() {
            return false;
        }
        match self.granularity {
            Granularity::CodeUnit => true,
            Granularity::Scalar => self.text.is_char_boundary(pos),
            Granularity::Grapheme => {
                if !self.text.is_char_boundary(pos) {
                    return false;
                }
                let mut cursor = GraphemeCursor::new(pos, self.text.len(), true);
                cursor.is_boundary(self.text, 0).unwrap_or(false)
            }
        }
    }

    /// First scalar of the element at `pos`. Class and property predicates
    /// key off this scalar; the whole element is still consumed.
    pub fn first_scalar(&self, pos: usize) -> Option<char> {
        self.text[pos..].chars().next()
    }

    /// The full element starting at `pos`.
    pub fn element(&self, pos: usize) -> Option<&'a str> {
        let end = self.next_boundary(pos)?;
        Some(&self.text[pos..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scalar_boundaries() {
        let input = Input::new("aé", Granularity::Scalar);
        assert_eq!(input.next_boundary(0), Some(1));
        assert_eq!(input.next_boundary(1), Some(3));
        assert_eq!(input.next_boundary(3), None);
        assert_eq!(input.prev_boundary(3), Some(1));
    }

    #[test]
    fn grapheme_never_splits_cluster() {
        // Family emoji: four scalars joined by ZWJs, one cluster.
        let text = "a\u{1F468}\u{200D}\u{1F469}\u{200D}\u{1F466}b";
        let input = Input::new(text, Granularity::Grapheme);
        assert_eq!(input.next_boundary(0), Some(1));
        let cluster_end = input.next_boundary(1);
        assert_eq!(cluster_end, Some(text.len() - 1));
        // No boundary inside the cluster
        assert!(!input.is_boundary(1 + '\u{1F468}'.len_utf8()));
    }

    #[test]
    fn code_unit_boundaries() {
        let input = Input::new("é", Granularity::CodeUnit);
        assert_eq!(input.next_boundary(0), Some(1));
        assert!(input.is_boundary(1));
    }
}
