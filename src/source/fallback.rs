//! Ordered fallback with early exit.
//!
//! Used for the playlist fetch tiers and for thumbnail candidate URLs:
//! each candidate is attempted once, in order, and the first success wins.

use std::future::Future;

/// Attempt each candidate in order and return the first success.
///
/// On total failure every error is returned, in attempt order.
/// An empty candidate list fails with no errors.
pub async fn try_in_order<C, T, E, F, Fut>(
    candidates: impl IntoIterator<Item = C>,
    mut attempt: F,
) -> Result<T, Vec<E>>
where
    F: FnMut(C) -> Fut,
    Fut: Future<Output = Result<T, E>>,
{
    let mut errors = Vec::new();
    for candidate in candidates {
        match attempt(candidate).await {
            Ok(value) => return Ok(value),
            Err(e) => errors.push(e),
        }
    }
    Err(errors)
}
