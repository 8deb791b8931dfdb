//! Internal parser assertions. A failure here is a grammar bug, never a user error.

#![cfg_attr(coverage_nightly, coverage(off))]

use super::core::Parser;
use super::syntax_kind::SyntaxKind;

impl Parser<'_> {
    /// Burns one unit of lookahead budget; the budget refills on every bump.
    #[inline]
    pub(super) fn ensure_progress(&self) {
        let left = self.lookahead_budget.get();
        assert!(left > 0, "no token consumed after repeated lookahead");
        self.lookahead_budget.set(left - 1);
    }

    /// Grammar rules are entered only when their leading token is current.
    #[inline]
    pub(super) fn assert_current(&mut self, expected: SyntaxKind) {
        let found = self.current();
        assert_eq!(found, expected, "grammar rule entered on {found:?}, not {expected:?}");
    }
}
