//! Sequences and infoset identifiers.
//!
//! A sequence is one seat's choice at one information set. On the wire it is a
//! JSON array: `[]` for the empty root sequence, `["c;A", "r"]` otherwise.

use crate::abstraction::Signal;
use crate::engine::{Action, Event, Seat};
use serde::de::{self, Deserializer};
use serde::ser::{SerializeSeq, Serializer};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A seat's most recent choice, or the empty root sequence.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub enum Sequence {
    /// No choice made yet.
    #[default]
    Empty,
    /// `action` taken at `infoset`.
    Action {
        /// Infoset identifier.
        infoset: Arc<str>,
        /// Action taken.
        action: Action,
    },
}

impl Sequence {
    /// Build a non-empty sequence.
    pub fn new(infoset: impl Into<Arc<str>>, action: Action) -> Self {
        Sequence::Action {
            infoset: infoset.into(),
            action,
        }
    }

    /// Check whether this is the root sequence.
    pub fn is_empty(&self) -> bool {
        matches!(self, Sequence::Empty)
    }

    /// Infoset of a non-empty sequence.
    pub fn infoset(&self) -> Option<&str> {
        match self {
            Sequence::Empty => None,
            Sequence::Action { infoset, .. } => Some(infoset),
        }
    }

    /// Action of a non-empty sequence.
    pub fn action(&self) -> Option<Action> {
        match self {
            Sequence::Empty => None,
            Sequence::Action { action, .. } => Some(*action),
        }
    }

    fn from_parts<E: de::Error>(parts: &[String]) -> Result<Self, E> {
        match parts {
            [] => Ok(Sequence::Empty),
            [infoset, letter] => {
                let action = single_char(letter)
                    .and_then(Action::from_letter)
                    .ok_or_else(|| E::custom(format!("invalid action letter {:?}", letter)))?;
                Ok(Sequence::new(infoset.as_str(), action))
            }
            _ => Err(E::invalid_length(parts.len(), &"a sequence of 0 or 2 strings")),
        }
    }
}

fn single_char(s: &str) -> Option<char> {
    let mut chars = s.chars();
    let c = chars.next()?;
    chars.next().is_none().then_some(c)
}

impl fmt::Display for Sequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Sequence::Empty => write!(f, "()"),
            Sequence::Action { infoset, action } => write!(f, "('{}', '{}')", infoset, action),
        }
    }
}

impl Serialize for Sequence {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Sequence::Empty => serializer.serialize_seq(Some(0))?.end(),
            Sequence::Action { infoset, action } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(&**infoset)?;
                seq.serialize_element(&action.letter().to_string())?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Sequence {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = Vec::<String>::deserialize(deserializer)?;
        Sequence::from_parts(&parts)
    }
}

/// Where a TFSDP node hangs: under a sequence or under an observation edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ParentEdge {
    /// Directly under a sequence.
    Sequence(Sequence),
    /// Under edge `edge` of observation point `point`, e.g. `("o3", "e1")`.
    Observation {
        /// Observation point id.
        point: String,
        /// Edge label.
        edge: String,
    },
}

impl Serialize for ParentEdge {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            ParentEdge::Sequence(sequence) => sequence.serialize(serializer),
            ParentEdge::Observation { point, edge } => {
                let mut seq = serializer.serialize_seq(Some(2))?;
                seq.serialize_element(point)?;
                seq.serialize_element(edge)?;
                seq.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for ParentEdge {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let parts = Vec::<String>::deserialize(deserializer)?;
        // a sequence ends in a single action letter, an observation edge in "e<n>"
        if parts.len() == 2 && single_char(&parts[1]).is_none() {
            let mut parts = parts.into_iter();
            let point = parts.next().unwrap_or_default();
            let edge = parts.next().unwrap_or_default();
            return Ok(ParentEdge::Observation { point, edge });
        }
        Sequence::from_parts(&parts).map(ParentEdge::Sequence)
    }
}

/// Infoset identifier of `actor` after `events`: `"{history};{signal}"`.
///
/// The history holds one segment per street the actor has seen, starting at
/// its own hole card and at every board card, with the action letters of both
/// seats in order. Segments are joined with `:`.
pub fn infoset_id(events: &[Event], actor: Seat, signal: &Signal) -> String {
    let mut segments: Vec<String> = Vec::with_capacity(3);
    for event in events {
        let letter = match event {
            Event::HoleDealing(seat) if *seat == actor => {
                segments.push(String::new());
                continue;
            }
            Event::BoardDealing => {
                segments.push(String::new());
                continue;
            }
            Event::HoleDealing(_) | Event::CardBurning => continue,
            Event::Folding(_) => 'f',
            Event::CheckingOrCalling(_) => 'c',
            Event::CompletionBettingOrRaisingTo(..) => 'r',
        };
        if let Some(segment) = segments.last_mut() {
            segment.push(letter);
        }
    }
    format!("{};{}", segments.join(":"), signal)
}
