use engine::{Ledger, ResultEngine};

use crate::{
    render::money,
    step::{ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Step, WorkflowDef, amount},
};

#[derive(Clone, Debug, Default)]
pub(crate) struct CapitalDraft {
    current: i64,
    amount: i64,
}

pub(crate) fn start(ledger: &Ledger) -> Box<dyn ActiveWorkflow> {
    let draft = CapitalDraft {
        current: ledger.initial_capital(),
        amount: 0,
    };
    Progress::start(&SET_CAPITAL, draft)
}

fn accept_amount(draft: &mut CapitalDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.amount = amount(input, draft.amount)?;
    Ok(())
}

static STEPS: [Step<CapitalDraft>; 1] = [Step {
    prompt: |d| {
        format!(
            "Current initial capital: {}. New initial capital?",
            money(d.current, "")
        )
    },
    skip: None,
    accept: accept_amount,
}];

static SET_CAPITAL: WorkflowDef<CapitalDraft> = WorkflowDef {
    kind: ActionKind::SetCapital,
    steps: &STEPS,
    commit,
};

fn commit(draft: &CapitalDraft, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
    ledger.set_capital(draft.amount, ctx.today)?;
    Ok(format!(
        "✅ Initial capital set to {}",
        money(draft.amount, ctx.currency)
    ))
}
