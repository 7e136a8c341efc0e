//! Error collection for multi-step operations.
//!
//! Operations that work through a list (installing every dependency of a
//! project, refreshing every repository) keep going after a failure and
//! report everything at the end, grouped by the stage that failed.

use std::fmt;

/// Errors grouped by stage, in the order stages first failed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ErrorList {
    groups: Vec<(String, Vec<String>)>,
}

impl ErrorList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error under `stage`.
    pub fn push(&mut self, stage: impl Into<String>, message: impl Into<String>) {
        let stage = stage.into();
        let message = message.into();

        match self.groups.iter_mut().find(|(s, _)| *s == stage) {
            Some((_, messages)) => messages.push(message),
            None => self.groups.push((stage, vec![message])),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Total number of errors across all stages.
    pub fn len(&self) -> usize {
        self.groups.iter().map(|(_, m)| m.len()).sum()
    }

    /// Errors recorded under `stage`.
    pub fn stage(&self, stage: &str) -> &[String] {
        self.groups
            .iter()
            .find(|(s, _)| s == stage)
            .map(|(_, m)| m.as_slice())
            .unwrap_or(&[])
    }

    /// `Ok(())` if empty, otherwise `Err(self)`.
    pub fn into_result(self) -> Result<(), ErrorList> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }
}

impl fmt::Display for ErrorList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let count = self.len();
        write!(
            f,
            "{} error{} occurred",
            count,
            if count == 1 { "" } else { "s" }
        )?;
        for (stage, messages) in &self.groups {
            write!(f, "\n{}:", stage)?;
            for message in messages {
                write!(f, "\n  - {}", message)?;
            }
        }
        Ok(())
    }
}

impl std::error::Error for ErrorList {}
