//! NullDestination - discards events, continues the chain

use contracts::{ContractError, Destination, OutputChain, RepeatableBatch};

pub struct NullDestination {
    name: String,
}

impl NullDestination {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Destination for NullDestination {
    fn name(&self) -> &str {
        &self.name
    }

    fn emit(
        &self,
        _tag: &str,
        _batch: &RepeatableBatch,
        chain: &mut dyn OutputChain,
    ) -> Result<(), ContractError> {
        chain.advance()
    }
}
