//! Death-event subscriptions carried by pooled enemies.

use bitflags::bitflags;

bitflags! {
    /// Listeners wired at spawn. Cleared on release so a recycled enemy never notifies
    /// the subscribers of its previous life.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Listeners: u8 {
        /// Scoring and statistics.
        const SCORE = 1 << 0;
        /// Power-up drop roll.
        const DROPS = 1 << 1;
    }
}
