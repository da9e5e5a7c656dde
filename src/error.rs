/// Convenient `Result` alias for fallible tree construction.
pub type Result<T> = core::result::Result<T, Error>;

/// Errors surfaced by this crate.
///
/// Looking up or deleting an absent key is not an error; those calls report
/// absence through `Option` or `bool`. The only hard failure is asking for a
/// tree whose nodes could not satisfy the minimum-occupancy rule.
#[derive(Clone, Copy, Debug, Eq, PartialEq, thiserror::Error)]
pub enum Error {
    /// The requested order is below [`Order::MIN`](crate::Order::MIN).
    #[error("B-tree order {order} is below the minimum of {min}")]
    InvalidOrder {
        /// The rejected order.
        order: usize,
        /// The smallest order accepted.
        min: usize,
    },
}
