//! Per-tag storage of sequence to command bindings.
use std::{collections::HashMap, fmt, hash::Hash};

use crate::{
    error::{Error, Result},
    event::Event,
    sequence::{EventMask, Pattern},
};

/// The key bindings are registered against: either a single item or a tag
/// name shared by any number of items.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BindTag<I> {
    /// An item's own identity.
    Item(I),
    /// A named tag.
    Name(String),
}

impl<I> From<&str> for BindTag<I> {
    fn from(s: &str) -> Self {
        Self::Name(s.to_string())
    }
}

impl<I> From<String> for BindTag<I> {
    fn from(s: String) -> Self {
        Self::Name(s)
    }
}

impl<I: fmt::Debug> fmt::Display for BindTag<I> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Item(i) => write!(f, "{i:?}"),
            Self::Name(n) => f.write_str(n),
        }
    }
}

/// A single binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    /// Pattern the binding matches.
    pub pattern: Pattern,
    /// Command text, before `%` substitution.
    pub command: String,
}

/// Bindings for every tag of one binding table.
#[derive(Debug)]
pub struct Registry<I> {
    /// Bindings per tag, in registration order.
    tags: HashMap<BindTag<I>, Vec<Binding>>,
}

impl<I> Default for Registry<I> {
    fn default() -> Self {
        Self {
            tags: HashMap::new(),
        }
    }
}

impl<I: Clone + Eq + Hash + fmt::Debug> Registry<I> {
    /// Construct an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a command to a sequence on a tag, replacing or, if `append` is
    /// set, extending any existing command for the same pattern. Returns the
    /// event classes the sequence matches. A sequence that fails to parse
    /// leaves the registry untouched.
    pub fn bind(
        &mut self,
        tag: BindTag<I>,
        sequence: &str,
        command: &str,
        append: bool,
    ) -> Result<EventMask> {
        let pattern = Pattern::parse(sequence)?;
        let mask = pattern.mask();
        let bindings = self.tags.entry(tag).or_default();
        match bindings.iter_mut().find(|b| b.pattern == pattern) {
            Some(b) if append && !b.command.is_empty() => {
                b.command.push('\n');
                b.command.push_str(command);
            }
            Some(b) => b.command = command.to_string(),
            None => bindings.push(Binding {
                pattern,
                command: command.to_string(),
            }),
        }
        Ok(mask)
    }

    /// Remove the binding for a sequence.
    pub fn unbind(&mut self, tag: &BindTag<I>, sequence: &str) -> Result<()> {
        let pattern = Pattern::parse(sequence)?;
        let no_binding = || Error::NoBinding {
            tag: tag.to_string(),
            sequence: sequence.to_string(),
        };
        let bindings = self.tags.get_mut(tag).ok_or_else(no_binding)?;
        let idx = bindings
            .iter()
            .position(|b| b.pattern == pattern)
            .ok_or_else(no_binding)?;
        bindings.remove(idx);
        if bindings.is_empty() {
            self.tags.remove(tag);
        }
        Ok(())
    }

    /// The command bound to a sequence, if any.
    pub fn binding(&self, tag: &BindTag<I>, sequence: &str) -> Result<Option<&str>> {
        let pattern = Pattern::parse(sequence)?;
        Ok(self
            .tags
            .get(tag)
            .and_then(|v| v.iter().find(|b| b.pattern == pattern))
            .map(|b| b.command.as_str()))
    }

    /// Canonical forms of every sequence bound on a tag, in registration
    /// order.
    pub fn sequences(&self, tag: &BindTag<I>) -> Vec<String> {
        self.tags
            .get(tag)
            .map(|v| v.iter().map(|b| b.pattern.to_string()).collect())
            .unwrap_or_default()
    }

    /// Remove every binding on a tag.
    pub fn delete_all(&mut self, tag: &BindTag<I>) {
        self.tags.remove(tag);
    }

    /// Remove every binding on every tag.
    pub fn clear(&mut self) {
        self.tags.clear();
    }

    /// Is anything bound on this tag?
    pub fn has_bindings(&self, tag: &BindTag<I>) -> bool {
        self.tags.contains_key(tag)
    }

    /// Find the binding on a tag that best matches an event. More specific
    /// patterns beat less specific ones; among equals the later registration
    /// wins.
    pub fn resolve(&self, tag: &BindTag<I>, event: &Event) -> Option<&Binding> {
        let mut best: Option<(u32, usize, &Binding)> = None;
        for (idx, b) in self.tags.get(tag)?.iter().enumerate() {
            if !b.pattern.matches(event) {
                continue;
            }
            let score = (b.pattern.specificity(), idx);
            let replace = match best {
                Some((spec, i, _)) => score > (spec, i),
                None => true,
            };
            if replace {
                best = Some((score.0, score.1, b));
            }
        }
        best.map(|(_, _, b)| b)
    }
}
