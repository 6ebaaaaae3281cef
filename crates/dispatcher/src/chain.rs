//! DispatchChain - cursor over the routes for one incoming batch
//!
//! The chain is passed to every destination as its continuation. Each call
//! to [`OutputChain::advance`] runs exactly one destination (or, once all of
//! them had their turn, the terminal continuation); the destination decides
//! whether to advance further.

use tracing::{debug, trace};

use contracts::{ContractError, OutputChain, RepeatableBatch};

use crate::route::Route;

/// How the batch is handed to destinations
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CopyMode {
    /// Every destination sees the same list; in-place changes leak forward
    #[default]
    Shared,
    /// Every destination but the last gets its own duplicate
    DeepCopy,
}

impl CopyMode {
    pub fn from_deep_copy(deep_copy: bool) -> Self {
        if deep_copy {
            Self::DeepCopy
        } else {
            Self::Shared
        }
    }
}

/// Chain lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChainState {
    Running,
    Exhausted,
}

/// Cursor state for one fan-out emission
///
/// Created per batch and dropped once the emission returns.
pub struct DispatchChain<'a> {
    routes: &'a [Route],
    tag: &'a str,
    batch: RepeatableBatch,
    offset: usize,
    mode: CopyMode,
    state: ChainState,
    terminal: &'a mut dyn OutputChain,
}

impl<'a> DispatchChain<'a> {
    pub fn new(
        routes: &'a [Route],
        tag: &'a str,
        batch: RepeatableBatch,
        mode: CopyMode,
        terminal: &'a mut dyn OutputChain,
    ) -> Self {
        Self {
            routes,
            tag,
            batch,
            offset: 0,
            mode,
            state: ChainState::Running,
            terminal,
        }
    }

    /// Chain handing the same batch to every destination
    pub fn shared(
        routes: &'a [Route],
        tag: &'a str,
        batch: RepeatableBatch,
        terminal: &'a mut dyn OutputChain,
    ) -> Self {
        Self::new(routes, tag, batch, CopyMode::Shared, terminal)
    }

    /// Chain isolating destinations from each other's mutations
    pub fn deep_copy(
        routes: &'a [Route],
        tag: &'a str,
        batch: RepeatableBatch,
        terminal: &'a mut dyn OutputChain,
    ) -> Self {
        Self::new(routes, tag, batch, CopyMode::DeepCopy, terminal)
    }

    /// Number of destinations already invoked
    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn state(&self) -> ChainState {
        self.state
    }

    pub fn is_exhausted(&self) -> bool {
        self.state == ChainState::Exhausted
    }

    /// Batch for the destination at `self.offset - 1`
    fn batch_for_step(&self) -> (RepeatableBatch, bool) {
        let more_remain = self.routes.len() > self.offset;
        match self.mode {
            CopyMode::DeepCopy if more_remain => (self.batch.duplicate(), true),
            _ => (self.batch.clone(), false),
        }
    }
}

impl OutputChain for DispatchChain<'_> {
    fn advance(&mut self) -> Result<(), ContractError> {
        let routes = self.routes;
        let Some(route) = routes.get(self.offset) else {
            if self.state == ChainState::Exhausted {
                trace!(tag = %self.tag, "Terminal re-entered");
            } else {
                self.state = ChainState::Exhausted;
                debug!(tag = %self.tag, destinations = routes.len(), "Chain exhausted");
            }
            return self.terminal.advance();
        };

        let emit_tag = route.rule().apply(self.tag);
        self.offset += 1;
        let (batch, copied) = self.batch_for_step();

        route.metrics().record_emit(batch.len(), copied);
        observability::record_destination_emit(route.name(), batch.len());
        debug!(
            destination = %route.name(),
            step = self.offset,
            tag = %self.tag,
            emit_tag = %emit_tag,
            events = batch.len(),
            copied,
            "Emitting to destination"
        );

        route.destination().emit(&emit_tag, &batch, self)
    }
}
