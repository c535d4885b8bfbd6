// Copyright (c) 2026 Agora contributors
// SPDX-License-Identifier: Apache-2.0

//! Conditional-branch scope tracking for `IF`/`NOT_IF`/`ELSE`/`END_IF`.
//!
//! Each open `IF`/`NOT_IF` pushes one frame recording whether *that* level's
//! branch condition held. The script is currently executing ordinary
//! opcodes only when every open frame holds `true`; inside a false scope,
//! push/pop/crypto opcodes are skipped, but the conditional opcodes
//! themselves still nest so the scope stack stays structurally correct.

use crate::error::ScriptError;

/// The stack of open conditional scopes.
#[derive(Clone, Debug, Default)]
pub struct ScopeStack {
    frames: Vec<bool>,
}

impl ScopeStack {
    /// An empty scope stack (top-level, unconditionally executing).
    pub fn new() -> Self {
        ScopeStack::default()
    }

    /// Whether ordinary opcodes currently execute: true only when every open
    /// scope's condition held.
    pub fn executing(&self) -> bool {
        self.frames.iter().all(|&taken| taken)
    }

    /// Enter a new scope. `condition` is the (already-inverted, for
    /// `NOT_IF`) branch outcome; it is only meaningful when the enclosing
    /// scope was executing, since otherwise the popped stack value (if any)
    /// was never really produced by live execution.
    pub fn enter(&mut self, condition: bool) {
        // Once any ancestor scope is false, this scope can never execute
        // regardless of `condition`.
        let enclosing_active = self.executing();
        self.frames.push(enclosing_active && condition);
    }

    /// Toggle the innermost scope's condition.
    pub fn toggle_else(&mut self) -> Result<(), ScriptError> {
        match self.frames.last_mut() {
            Some(top) => {
                *top = !*top;
                Ok(())
            }
            None => Err(ScriptError::ElseWithoutIf),
        }
    }

    /// Close the innermost scope.
    pub fn end_if(&mut self) -> Result<(), ScriptError> {
        if self.frames.pop().is_none() {
            return Err(ScriptError::EndIfWithoutIf);
        }
        Ok(())
    }

    /// Verify no scopes remain open at the end of the script.
    pub fn finish(&self) -> Result<(), ScriptError> {
        if self.frames.is_empty() {
            Ok(())
        } else {
            Err(ScriptError::UnterminatedIf)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_executing() {
        assert!(ScopeStack::new().executing());
    }

    #[test]
    fn if_true_keeps_executing() {
        let mut s = ScopeStack::new();
        s.enter(true);
        assert!(s.executing());
    }

    #[test]
    fn if_false_stops_executing() {
        let mut s = ScopeStack::new();
        s.enter(false);
        assert!(!s.executing());
    }

    #[test]
    fn else_flips_branch() {
        let mut s = ScopeStack::new();
        s.enter(false);
        assert!(!s.executing());
        s.toggle_else().unwrap();
        assert!(s.executing());
    }

    #[test]
    fn nested_false_scope_stays_inert_through_nested_if() {
        let mut s = ScopeStack::new();
        s.enter(false); // outer false
        s.enter(true); // inner "if true" but outer is false
        assert!(!s.executing());
        s.toggle_else().unwrap(); // flips inner only
        assert!(!s.executing()); // outer still false
        s.end_if().unwrap();
        s.toggle_else().unwrap(); // flips outer
        assert!(s.executing());
    }

    #[test]
    fn else_without_if_fails() {
        assert_eq!(ScopeStack::new().toggle_else(), Err(ScriptError::ElseWithoutIf));
    }

    #[test]
    fn end_if_without_if_fails() {
        assert_eq!(ScopeStack::new().end_if(), Err(ScriptError::EndIfWithoutIf));
    }

    #[test]
    fn finish_fails_on_unterminated_if() {
        let mut s = ScopeStack::new();
        s.enter(true);
        assert_eq!(s.finish(), Err(ScriptError::UnterminatedIf));
    }

    #[test]
    fn finish_succeeds_when_balanced() {
        let mut s = ScopeStack::new();
        s.enter(true);
        s.end_if().unwrap();
        assert!(s.finish().is_ok());
    }
}
