/// Whether an object still stands on its own or has been folded into an
/// older identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum MergeState {
    /// Fresh observation, still looking for an older match
    #[default]
    Unmerged,
    /// Adopted the identity of an earlier object
    Merged,
}

impl MergeState {
    #[inline]
    pub fn is_unmerged(self) -> bool {
        self == MergeState::Unmerged
    }
}
