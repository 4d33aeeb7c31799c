//! Step interpreter.
//!
//! A workflow is a static list of [`Step`]s over a typed draft plus a commit
//! function. [`Progress`] walks the list; the conversation only sees it through
//! the object-safe [`ActiveWorkflow`] trait.

use std::fmt;

use chrono::NaiveDate;
use engine::{EngineError, Ledger, PartnerRoster, ResultEngine};

use crate::parsing::parse_amount;

/// What a step receives once sentinels are resolved.
#[derive(Clone, Copy, Debug)]
pub(crate) enum Input<'a> {
    Text(&'a str),
    File(&'a [u8]),
    /// The skip token on an edit step.
    Keep,
    /// The skip token on an optional step of a new record.
    Default,
}

/// Meaning of the skip token on a step. `None` on the step makes it required.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Skip {
    Keep,
    Default,
}

impl Skip {
    pub(crate) fn input(self) -> Input<'static> {
        match self {
            Self::Keep => Input::Keep,
            Self::Default => Input::Default,
        }
    }
}

pub(crate) struct Step<D> {
    pub prompt: fn(&D) -> String,
    pub skip: Option<Skip>,
    /// Parses and validates the input into the draft. `Validation` errors
    /// re-prompt the step; anything else aborts the workflow.
    pub accept: fn(&mut D, Input<'_>, &Ledger) -> ResultEngine<()>,
}

/// What a commit may read besides the ledger.
pub(crate) struct CommitContext<'a> {
    pub today: NaiveDate,
    pub roster: &'a PartnerRoster,
    pub currency: &'a str,
}

pub(crate) struct WorkflowDef<D: 'static> {
    pub kind: ActionKind,
    pub steps: &'static [Step<D>],
    /// Applies the finished draft. Returns the receipt text.
    pub commit: fn(&D, &mut Ledger, &CommitContext<'_>) -> ResultEngine<String>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ActionKind {
    NewPurchase,
    EditPurchase,
    NewSale,
    EditSale,
    NewCost,
    EditCost,
    PaySaleDebt,
    PayPurchaseDebt,
    PartnerTransaction,
    SetCapital,
    Restore,
}

impl ActionKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NewPurchase => "new_purchase",
            Self::EditPurchase => "edit_purchase",
            Self::NewSale => "new_sale",
            Self::EditSale => "edit_sale",
            Self::NewCost => "new_cost",
            Self::EditCost => "edit_cost",
            Self::PaySaleDebt => "pay_sale_debt",
            Self::PayPurchaseDebt => "pay_purchase_debt",
            Self::PartnerTransaction => "partner_transaction",
            Self::SetCapital => "set_capital",
            Self::Restore => "restore",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            Self::NewPurchase => "🛒 New purchase",
            Self::EditPurchase => "✏️ Edit purchase",
            Self::NewSale => "💰 New sale",
            Self::EditSale => "✏️ Edit sale",
            Self::NewCost => "💸 New cost",
            Self::EditCost => "✏️ Edit cost",
            Self::PaySaleDebt => "📥 Customer payment",
            Self::PayPurchaseDebt => "📤 Seller payment",
            Self::PartnerTransaction => "🤝 Partner transaction",
            Self::SetCapital => "🏦 Initial capital",
            Self::Restore => "♻️ Restore backup",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Feed {
    Next,
    Complete,
}

pub(crate) trait ActiveWorkflow: Send + Sync + fmt::Debug {
    fn kind(&self) -> ActionKind;
    /// Zero-based index of the current step and the step count.
    fn position(&self) -> (usize, usize);
    fn prompt(&self) -> String;
    fn skip(&self) -> Option<Skip>;
    fn feed(&mut self, input: Input<'_>, ledger: &Ledger) -> ResultEngine<Feed>;
    fn commit(&self, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String>;
}

pub(crate) struct Progress<D: 'static> {
    def: &'static WorkflowDef<D>,
    index: usize,
    draft: D,
}

impl<D> Progress<D>
where
    D: Send + Sync + fmt::Debug + 'static,
{
    pub(crate) fn start(def: &'static WorkflowDef<D>, draft: D) -> Box<dyn ActiveWorkflow> {
        Box::new(Self {
            def,
            index: 0,
            draft,
        })
    }

    fn current(&self) -> ResultEngine<&'static Step<D>> {
        self.def.steps.get(self.index).ok_or_else(|| {
            EngineError::InvariantViolation(format!(
                "{} has no step {}",
                self.def.kind.as_str(),
                self.index + 1
            ))
        })
    }
}

impl<D> fmt::Debug for Progress<D>
where
    D: fmt::Debug,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Progress")
            .field("kind", &self.def.kind)
            .field("index", &self.index)
            .field("draft", &self.draft)
            .finish()
    }
}

impl<D> ActiveWorkflow for Progress<D>
where
    D: Send + Sync + fmt::Debug + 'static,
{
    fn kind(&self) -> ActionKind {
        self.def.kind
    }

    fn position(&self) -> (usize, usize) {
        (self.index, self.def.steps.len())
    }

    fn prompt(&self) -> String {
        self.current()
            .map(|step| (step.prompt)(&self.draft))
            .unwrap_or_default()
    }

    fn skip(&self) -> Option<Skip> {
        self.current().ok().and_then(|step| step.skip)
    }

    fn feed(&mut self, input: Input<'_>, ledger: &Ledger) -> ResultEngine<Feed> {
        let step = self.current()?;
        (step.accept)(&mut self.draft, input, ledger)?;
        self.index += 1;
        if self.index >= self.def.steps.len() {
            Ok(Feed::Complete)
        } else {
            Ok(Feed::Next)
        }
    }

    fn commit(&self, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
        (self.def.commit)(&self.draft, ledger, ctx)
    }
}

fn not_a_file() -> EngineError {
    EngineError::Validation("a file is not expected here; send text".to_string())
}

/// A whole amount. `Keep` returns `current`, `Default` zero.
pub(crate) fn amount(input: Input<'_>, current: i64) -> ResultEngine<i64> {
    match input {
        Input::Text(text) => parse_amount(text),
        Input::Keep => Ok(current),
        Input::Default => Ok(0),
        Input::File(_) => Err(not_a_file()),
    }
}

/// Like [`amount`], but zero is rejected.
pub(crate) fn positive_amount(input: Input<'_>, current: i64, label: &str) -> ResultEngine<i64> {
    let value = amount(input, current)?;
    if value <= 0 {
        return Err(EngineError::Validation(format!(
            "{label} must be greater than zero"
        )));
    }
    Ok(value)
}

/// Free text. `Keep` returns `current`, `Default` the empty string.
pub(crate) fn text(input: Input<'_>, current: &str) -> ResultEngine<String> {
    match input {
        Input::Text(text) => Ok(text.trim().to_string()),
        Input::Keep => Ok(current.to_string()),
        Input::Default => Ok(String::new()),
        Input::File(_) => Err(not_a_file()),
    }
}

/// Non-blank text.
pub(crate) fn required_text(input: Input<'_>, current: &str, label: &str) -> ResultEngine<String> {
    let value = text(input, current)?;
    if value.is_empty() {
        return Err(EngineError::Validation(format!("{label} cannot be empty")));
    }
    Ok(value)
}
