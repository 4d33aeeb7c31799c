//! One module per action: a typed draft, its static step lists and the
//! commit that turns the finished draft into a ledger operation.

pub(crate) mod capital;
pub(crate) mod cost;
pub(crate) mod debt;
pub(crate) mod partner;
pub(crate) mod purchase;
pub(crate) mod restore;
pub(crate) mod sale;
