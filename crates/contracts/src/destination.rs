//! Destination and OutputChain traits - fan-out interface
//!
//! A destination receives the (possibly re-tagged) batch together with the
//! chain it is part of, and decides when to hand control to the next
//! destination by calling [`OutputChain::advance`].

use crate::{ContractError, RepeatableBatch};

/// Continuation handed to every destination
pub trait OutputChain {
    /// Run the next step of the chain
    ///
    /// # Errors
    /// Whatever the next destination (or the terminal continuation) returns,
    /// unchanged.
    fn advance(&mut self) -> Result<(), ContractError>;
}

/// Downstream consumer of event batches
///
/// Implementations are expected to finish their own work and then return
/// `chain.advance()`. Not calling it stops the remaining destinations for
/// this batch.
pub trait Destination {
    /// Destination name (used for logging/metrics)
    fn name(&self) -> &str;

    /// Deliver a batch under `tag`
    ///
    /// Guards returned by `batch.events()` / `batch.events_mut()` must be
    /// dropped before `chain.advance()`. In shared mode later destinations
    /// borrow the same list, and a guard held across the call makes their
    /// in-place changes panic with `BorrowMutError`.
    ///
    /// # Errors
    /// Returns write error (should include context), or the error of a
    /// later chain step.
    fn emit(
        &self,
        tag: &str,
        batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError>;

    /// Flush buffer (if any)
    fn flush(&self) -> Result<(), ContractError> {
        Ok(())
    }
}

/// Terminal continuation that does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NullOutputChain;

impl OutputChain for NullOutputChain {
    fn advance(&mut self) -> Result<(), ContractError> {
        Ok(())
    }
}

/// Terminal continuation backed by a closure
pub struct FnChain<F>(pub F)
where
    F: FnMut() -> Result<(), ContractError>;

impl<F> OutputChain for FnChain<F>
where
    F: FnMut() -> Result<(), ContractError>,
{
    fn advance(&mut self) -> Result<(), ContractError> {
        (self.0)()
    }
}
