//! Content paths.
//!
//! A path locates one field of the document using dotted field names and
//! bracketed indices: `hero.title`, `expertise[2].skills`,
//! `expertise[1].skills[0]`. Parsing turns the text into a list of
//! [`PathStep`]s that the resolver in [`crate::field`] walks.
//!
//! ```text
//! path  := field step*
//! step  := "." field | "[" index "]"
//! field := [A-Za-z_][A-Za-z0-9_]*
//! index := [0-9]+
//! ```

use std::fmt;
use std::str::FromStr;

use nom::{
    IResult,
    branch::alt,
    bytes::complete::tag,
    character::complete::{alpha1, alphanumeric1, char, digit1},
    combinator::{all_consuming, map, map_res, recognize},
    multi::{many0, many0_count},
    sequence::{delimited, pair, preceded},
};

use crate::error::PathError;

/// One step of a content path.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathStep {
    /// Select a named field of a record.
    Field(String),
    /// Select an element of a sequence.
    Index(usize),
}

/// A parsed content path. Always starts with a field step.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ContentPath {
    steps: Vec<PathStep>,
}

impl ContentPath {
    /// Parse a path from text.
    ///
    /// # Errors
    ///
    /// Returns [`PathError::Empty`] for blank input and [`PathError::Syntax`]
    /// with the offending byte offset otherwise.
    pub fn parse(input: &str) -> Result<Self, PathError> {
        if input.trim().is_empty() {
            return Err(PathError::Empty);
        }
        match all_consuming(content_path)(input) {
            Ok((_, path)) => Ok(path),
            Err(nom::Err::Error(e) | nom::Err::Failure(e)) => Err(PathError::Syntax {
                path: input.to_owned(),
                offset: input.len() - e.input.len(),
            }),
            Err(nom::Err::Incomplete(_)) => Err(PathError::Syntax {
                path: input.to_owned(),
                offset: input.len(),
            }),
        }
    }

    /// Start a path at a top-level field.
    #[must_use]
    pub fn field(name: &str) -> Self {
        Self {
            steps: vec![PathStep::Field(name.to_owned())],
        }
    }

    /// Extend the path with a field step.
    #[must_use]
    pub fn then_field(mut self, name: &str) -> Self {
        self.steps.push(PathStep::Field(name.to_owned()));
        self
    }

    /// Extend the path with an index step.
    #[must_use]
    pub fn then_index(mut self, index: usize) -> Self {
        self.steps.push(PathStep::Index(index));
        self
    }

    #[must_use]
    pub fn steps(&self) -> &[PathStep] {
        &self.steps
    }
}

impl FromStr for ContentPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for ContentPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, step) in self.steps.iter().enumerate() {
            match step {
                PathStep::Field(name) if i == 0 => f.write_str(name)?,
                PathStep::Field(name) => write!(f, ".{name}")?,
                PathStep::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

fn identifier(input: &str) -> IResult<&str, &str> {
    recognize(pair(
        alt((alpha1, tag("_"))),
        many0_count(alt((alphanumeric1, tag("_")))),
    ))(input)
}

fn index(input: &str) -> IResult<&str, usize> {
    map_res(delimited(char('['), digit1, char(']')), str::parse)(input)
}

fn step(input: &str) -> IResult<&str, PathStep> {
    alt((
        map(preceded(char('.'), identifier), |name: &str| {
            PathStep::Field(name.to_owned())
        }),
        map(index, PathStep::Index),
    ))(input)
}

fn content_path(input: &str) -> IResult<&str, ContentPath> {
    map(pair(identifier, many0(step)), |(head, rest)| {
        let mut steps = Vec::with_capacity(rest.len() + 1);
        steps.push(PathStep::Field(head.to_owned()));
        steps.extend(rest);
        ContentPath { steps }
    })(input)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_dotted_fields() {
        let path = ContentPath::parse("hero.title").unwrap();
        assert_eq!(
            path.steps(),
            &[
                PathStep::Field("hero".to_owned()),
                PathStep::Field("title".to_owned())
            ]
        );
    }

    #[test]
    fn parses_indices_between_fields() {
        let path = ContentPath::parse("expertise[1].skills[0]").unwrap();
        assert_eq!(
            path,
            ContentPath::field("expertise")
                .then_index(1)
                .then_field("skills")
                .then_index(0)
        );
    }

    #[test]
    fn display_round_trips() {
        for text in ["hero.subtitle", "blog[2].readTime", "expertise[10].skills[3]"] {
            assert_eq!(ContentPath::parse(text).unwrap().to_string(), text);
        }
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(ContentPath::parse("  "), Err(PathError::Empty));
    }

    #[test]
    fn reports_offset_of_first_bad_character() {
        let err = ContentPath::parse("hero..title").unwrap_err();
        assert_eq!(
            err,
            PathError::Syntax {
                path: "hero..title".to_owned(),
                offset: 4
            }
        );
    }

    #[test]
    fn rejects_malformed_paths() {
        for text in ["[0].title", "hero.", "blog[x]", "blog[-1]", "blog[1", "2hero", "hero title"] {
            assert!(
                matches!(ContentPath::parse(text), Err(PathError::Syntax { .. })),
                "{text:?} should not parse"
            );
        }
    }

    #[test]
    fn index_overflow_is_a_syntax_error() {
        let text = "blog[99999999999999999999999999]";
        assert!(matches!(
            ContentPath::parse(text),
            Err(PathError::Syntax { .. })
        ));
    }
}
