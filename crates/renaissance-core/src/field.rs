//! Field values and the path resolver.
//!
//! Every document type implements [`Node`], a two-way walk over
//! [`PathStep`]s: `locate` borrows the value at a path, `locate_mut` returns
//! a typed [`Slot`] that can be overwritten. Resolution finishes before any
//! write happens, so a path that fails halfway never mutates the document.

use std::fmt;

use crate::document::MAX_RATING;
use crate::path::PathStep;

/// A value stored at a document location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    /// Any text leaf.
    Text(String),
    /// A testimonial rating.
    Rating(u8),
    /// A whole list of text, such as an expertise area's skills.
    TextList(Vec<String>),
}

impl FieldValue {
    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Rating(_) => FieldKind::Rating,
            Self::TextList(_) => FieldKind::TextList,
        }
    }

    /// Borrow the text, if this is a text value.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl From<&str> for FieldValue {
    fn from(text: &str) -> Self {
        Self::Text(text.to_owned())
    }
}

impl From<String> for FieldValue {
    fn from(text: String) -> Self {
        Self::Text(text)
    }
}

impl From<Vec<String>> for FieldValue {
    fn from(items: Vec<String>) -> Self {
        Self::TextList(items)
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(text) => f.write_str(text),
            Self::Rating(rating) => write!(f, "{rating}"),
            Self::TextList(items) => f.write_str(&items.join(", ")),
        }
    }
}

/// The kind of a [`FieldValue`], used in mismatch errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    Rating,
    TextList,
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Text => "text",
            Self::Rating => "a rating",
            Self::TextList => "a list of text",
        })
    }
}

/// Why a path failed to resolve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Miss {
    UnknownField { name: String },
    IndexOutOfBounds { index: usize, len: usize },
    ExpectedField { index: usize },
    ExpectedIndex { name: String },
    PastLeaf,
    NotALeaf,
}

impl fmt::Display for Miss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownField { name } => write!(f, "no field named '{name}'"),
            Self::IndexOutOfBounds { index, len } => {
                write!(f, "index {index} is out of bounds for length {len}")
            }
            Self::ExpectedField { index } => {
                write!(f, "index [{index}] applied to a record")
            }
            Self::ExpectedIndex { name } => write!(f, "field '{name}' applied to a list"),
            Self::PastLeaf => f.write_str("path continues past a leaf value"),
            Self::NotALeaf => f.write_str("path stops at a record, not a field"),
        }
    }
}

/// Read-only view of a located value.
#[derive(Debug, Clone, Copy)]
pub(crate) enum FieldRef<'a> {
    Text(&'a str),
    Rating(u8),
    TextList(&'a [String]),
}

impl FieldRef<'_> {
    pub(crate) fn to_value(self) -> FieldValue {
        match self {
            Self::Text(text) => FieldValue::Text(text.to_owned()),
            Self::Rating(rating) => FieldValue::Rating(rating),
            Self::TextList(items) => FieldValue::TextList(items.to_vec()),
        }
    }
}

/// Writable view of a located value.
#[derive(Debug)]
pub(crate) enum Slot<'a> {
    Text(&'a mut String),
    Rating(&'a mut u8),
    TextList(&'a mut Vec<String>),
}

/// Why an assignment into a resolved slot was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Refusal {
    Mismatch { expected: FieldKind, actual: FieldKind },
    RatingOutOfRange { value: u8 },
}

impl Slot<'_> {
    fn kind(&self) -> FieldKind {
        match self {
            Self::Text(_) => FieldKind::Text,
            Self::Rating(_) => FieldKind::Rating,
            Self::TextList(_) => FieldKind::TextList,
        }
    }

    /// Overwrite the slot. Returns whether the stored value changed.
    pub(crate) fn assign(self, value: FieldValue) -> Result<bool, Refusal> {
        let expected = self.kind();
        match (self, value) {
            (Self::Text(slot), FieldValue::Text(text)) => Ok(replace_if_changed(slot, text)),
            (Self::Rating(_), FieldValue::Rating(value)) if value > MAX_RATING => {
                Err(Refusal::RatingOutOfRange { value })
            }
            (Self::Rating(slot), FieldValue::Rating(value)) => {
                Ok(replace_if_changed(slot, value))
            }
            (Self::TextList(slot), FieldValue::TextList(items)) => {
                Ok(replace_if_changed(slot, items))
            }
            (_, other) => Err(Refusal::Mismatch {
                expected,
                actual: other.kind(),
            }),
        }
    }
}

fn replace_if_changed<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

/// A document type that can be addressed by path steps.
pub(crate) trait Node {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss>;
    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss>;
}

impl Node for String {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        if steps.is_empty() {
            Ok(FieldRef::Text(self))
        } else {
            Err(Miss::PastLeaf)
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        if steps.is_empty() {
            Ok(Slot::Text(self))
        } else {
            Err(Miss::PastLeaf)
        }
    }
}

impl Node for u8 {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        if steps.is_empty() {
            Ok(FieldRef::Rating(*self))
        } else {
            Err(Miss::PastLeaf)
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        if steps.is_empty() {
            Ok(Slot::Rating(self))
        } else {
            Err(Miss::PastLeaf)
        }
    }
}

/// A list of text addresses as a whole (`skills`) or per element
/// (`skills[0]`).
impl Node for Vec<String> {
    fn locate<'a>(&'a self, steps: &[PathStep]) -> Result<FieldRef<'a>, Miss> {
        match steps.split_first() {
            None => Ok(FieldRef::TextList(self)),
            Some((step, rest)) => {
                let index = expect_index(step)?;
                element(self, index)?.locate(rest)
            }
        }
    }

    fn locate_mut<'a>(&'a mut self, steps: &[PathStep]) -> Result<Slot<'a>, Miss> {
        match steps.split_first() {
            None => Ok(Slot::TextList(self)),
            Some((step, rest)) => {
                let index = expect_index(step)?;
                element_mut(self, index)?.locate_mut(rest)
            }
        }
    }
}

/// Split off the leading field name of a record path.
pub(crate) fn split_field(steps: &[PathStep]) -> Result<(&str, &[PathStep]), Miss> {
    match steps.split_first() {
        None => Err(Miss::NotALeaf),
        Some((PathStep::Field(name), rest)) => Ok((name.as_str(), rest)),
        Some((PathStep::Index(index), _)) => Err(Miss::ExpectedField { index: *index }),
    }
}

fn expect_index(step: &PathStep) -> Result<usize, Miss> {
    match step {
        PathStep::Index(index) => Ok(*index),
        PathStep::Field(name) => Err(Miss::ExpectedIndex { name: name.clone() }),
    }
}

fn element<T>(items: &[T], index: usize) -> Result<&T, Miss> {
    let len = items.len();
    items.get(index).ok_or(Miss::IndexOutOfBounds { index, len })
}

fn element_mut<T>(items: &mut [T], index: usize) -> Result<&mut T, Miss> {
    let len = items.len();
    items
        .get_mut(index)
        .ok_or(Miss::IndexOutOfBounds { index, len })
}

/// Resolve `[index].rest` inside a sequence of records.
pub(crate) fn locate_in<'a, T: Node>(
    items: &'a [T],
    steps: &[PathStep],
) -> Result<FieldRef<'a>, Miss> {
    let (step, rest) = steps.split_first().ok_or(Miss::NotALeaf)?;
    element(items, expect_index(step)?)?.locate(rest)
}

/// Mutable counterpart of [`locate_in`].
pub(crate) fn locate_in_mut<'a, T: Node>(
    items: &'a mut [T],
    steps: &[PathStep],
) -> Result<Slot<'a>, Miss> {
    let (step, rest) = steps.split_first().ok_or(Miss::NotALeaf)?;
    element_mut(items, expect_index(step)?)?.locate_mut(rest)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn text_slot_rejects_rating() {
        let mut text = "old".to_owned();
        let refusal = Slot::Text(&mut text).assign(FieldValue::Rating(3)).unwrap_err();
        assert_eq!(
            refusal,
            Refusal::Mismatch {
                expected: FieldKind::Text,
                actual: FieldKind::Rating
            }
        );
        assert_eq!(text, "old");
    }

    #[test]
    fn assign_reports_whether_value_changed() {
        let mut text = "same".to_owned();
        assert!(!Slot::Text(&mut text).assign("same".into()).unwrap());
        assert!(Slot::Text(&mut text).assign("new".into()).unwrap());
        assert_eq!(text, "new");
    }

    #[test]
    fn rating_above_max_is_refused() {
        let mut rating = 5;
        let refusal = Slot::Rating(&mut rating)
            .assign(FieldValue::Rating(MAX_RATING + 1))
            .unwrap_err();
        assert!(matches!(refusal, Refusal::RatingOutOfRange { .. }));
        assert_eq!(rating, 5);
    }

    #[test]
    fn text_list_addresses_whole_and_elements() {
        let mut skills = vec!["a".to_owned(), "b".to_owned()];
        assert!(matches!(skills.locate(&[]), Ok(FieldRef::TextList(_))));
        assert!(matches!(
            skills.locate(&[PathStep::Index(1)]),
            Ok(FieldRef::Text("b"))
        ));
        assert_eq!(
            skills.locate_mut(&[PathStep::Index(2)]).unwrap_err(),
            Miss::IndexOutOfBounds { index: 2, len: 2 }
        );
        assert_eq!(
            skills
                .locate(&[PathStep::Field("first".to_owned())])
                .unwrap_err(),
            Miss::ExpectedIndex {
                name: "first".to_owned()
            }
        );
    }

    #[test]
    fn leaves_reject_further_steps() {
        let text = "leaf".to_owned();
        assert_eq!(
            text.locate(&[PathStep::Index(0)]).unwrap_err(),
            Miss::PastLeaf
        );
    }
}
