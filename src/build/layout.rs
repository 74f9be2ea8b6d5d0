//! Input layout of an interleaved index record.

use crate::error::BuildError;
use crate::mesh::Semantic;

/// One semantic bound to a field of the index record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Input {
    /// The attribute role.
    pub semantic: Semantic,
    /// Field offset within the record.
    pub offset: usize,
    /// Identifier of the source array holding this attribute's values.
    pub source: String,
}

impl Input {
    /// Create an input bound at `offset`.
    pub fn new(semantic: Semantic, offset: usize, source: impl Into<String>) -> Self {
        Self {
            semantic,
            offset,
            source: source.into(),
        }
    }
}

/// The ordered list of inputs shared by every record of one primitive.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InputLayout {
    inputs: Vec<Input>,
    stride: usize,
}

impl InputLayout {
    /// Create a layout from explicitly offset inputs.
    ///
    /// A semantic bound twice keeps its first binding.
    pub fn new(inputs: Vec<Input>) -> Self {
        let mut layout = Self::default();
        for input in inputs {
            layout.push(input);
        }
        layout
    }

    /// Create a layout where each semantic's offset is its position.
    ///
    /// # Example
    ///
    /// ```
    /// use tessera::build::InputLayout;
    /// use tessera::mesh::Semantic;
    ///
    /// let layout = InputLayout::positional(&[
    ///     (Semantic::Position, "pos"),
    ///     (Semantic::Normal, "nrm"),
    /// ]);
    /// assert_eq!(layout.stride(), 2);
    /// assert_eq!(layout.offset_of(Semantic::Normal).unwrap(), 1);
    /// ```
    pub fn positional(semantics: &[(Semantic, &str)]) -> Self {
        Self::new(
            semantics
                .iter()
                .enumerate()
                .map(|(offset, &(semantic, source))| Input::new(semantic, offset, source))
                .collect(),
        )
    }

    /// Append an input. Returns `false` if its semantic was already bound.
    ///
    /// The input's offset counts towards the stride either way.
    pub fn push(&mut self, input: Input) -> bool {
        self.reserve(input.offset);
        if self.inputs.iter().any(|i| i.semantic == input.semantic) {
            return false;
        }
        self.inputs.push(input);
        true
    }

    /// Account for a record field that no bound semantic reads.
    pub fn reserve(&mut self, offset: usize) {
        self.stride = self.stride.max(offset + 1);
    }

    /// Number of fields per record.
    ///
    /// Several inputs may share one offset, so this is the highest offset plus
    /// one rather than the number of inputs.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Offset of `semantic` within the record.
    pub fn offset_of(&self, semantic: Semantic) -> Result<usize, BuildError> {
        self.input(semantic)
            .map(|i| i.offset)
            .ok_or(BuildError::UnknownSemantic(semantic))
    }

    /// The input bound to `semantic`.
    pub fn input(&self, semantic: Semantic) -> Option<&Input> {
        self.inputs.iter().find(|i| i.semantic == semantic)
    }

    /// All inputs in declaration order.
    pub fn inputs(&self) -> &[Input] {
        &self.inputs
    }

    /// Check if no semantic is bound.
    pub fn is_empty(&self) -> bool {
        self.inputs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_shared_offsets() {
        // POSITION and NORMAL expanded from one VERTEX input share offset 0
        let layout = InputLayout::new(vec![
            Input::new(Semantic::Position, 0, "pos"),
            Input::new(Semantic::Normal, 0, "nrm"),
            Input::new(Semantic::TexCoord(0), 1, "uv"),
        ]);

        assert_eq!(layout.stride(), 2);
        assert_eq!(layout.offset_of(Semantic::Normal), Ok(0));
        assert_eq!(layout.offset_of(Semantic::TexCoord(0)), Ok(1));
    }

    #[test]
    fn test_unknown_semantic() {
        let layout = InputLayout::positional(&[(Semantic::Position, "pos")]);
        assert_eq!(
            layout.offset_of(Semantic::TexCoord(1)),
            Err(BuildError::UnknownSemantic(Semantic::TexCoord(1)))
        );
    }

    #[test]
    fn test_duplicate_binding_keeps_first() {
        let mut layout = InputLayout::default();
        assert!(layout.push(Input::new(Semantic::Normal, 1, "a")));
        assert!(!layout.push(Input::new(Semantic::Normal, 2, "b")));
        assert_eq!(layout.input(Semantic::Normal).unwrap().source, "a");
        // The ignored binding still occupies its field
        assert_eq!(layout.stride(), 3);
    }

    #[test]
    fn test_reserved_field() {
        // An unsupported input at offset 2 still widens the record
        let mut layout = InputLayout::positional(&[(Semantic::Position, "pos")]);
        layout.reserve(2);
        assert_eq!(layout.stride(), 3);
        assert_eq!(layout.inputs().len(), 1);
    }

    #[test]
    fn test_empty_layout() {
        let layout = InputLayout::default();
        assert!(layout.is_empty());
        assert_eq!(layout.stride(), 0);
    }
}
