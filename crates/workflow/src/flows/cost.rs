use engine::{CostUpdate, EngineError, EntityId, Ledger, NewCost, ResultEngine};

use crate::{
    render::money,
    step::{
        ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Skip, Step, WorkflowDef,
        amount, required_text, text,
    },
};

#[derive(Clone, Debug, Default)]
pub(crate) struct CostDraft {
    id: Option<EntityId>,
    title: String,
    amount: i64,
    description: String,
}

pub(crate) fn start_new() -> Box<dyn ActiveWorkflow> {
    Progress::start(&NEW_COST, CostDraft::default())
}

pub(crate) fn start_edit(ledger: &Ledger, id: EntityId) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let cost = ledger
        .cost(id)
        .ok_or_else(|| EngineError::NotFound(format!("cost #{id}")))?;
    if let Some(tx_id) = cost.partner_transaction_id {
        return Err(EngineError::InvariantViolation(format!(
            "cost #{id} belongs to partner transaction #{tx_id}; change that instead"
        )));
    }
    let draft = CostDraft {
        id: Some(id),
        title: cost.title.clone(),
        amount: cost.amount,
        description: cost.description.clone(),
    };
    Ok(Progress::start(&EDIT_COST, draft))
}

fn accept_title(draft: &mut CostDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.title = required_text(input, &draft.title, "title")?;
    Ok(())
}

fn accept_amount(draft: &mut CostDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.amount = amount(input, draft.amount)?;
    Ok(())
}

fn accept_description(draft: &mut CostDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.description = text(input, &draft.description)?;
    Ok(())
}

static NEW_STEPS: [Step<CostDraft>; 3] = [
    Step {
        prompt: |_| "What was the cost for? (rent, advertising, ...)".to_string(),
        skip: None,
        accept: accept_title,
    },
    Step {
        prompt: |_| "Amount?".to_string(),
        skip: None,
        accept: accept_amount,
    },
    Step {
        prompt: |_| "Description?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_description,
    },
];

static EDIT_STEPS: [Step<CostDraft>; 3] = [
    Step {
        prompt: |d| format!("Title? Current: {}", d.title),
        skip: Some(Skip::Keep),
        accept: accept_title,
    },
    Step {
        prompt: |d| format!("Amount? Current: {}", money(d.amount, "")),
        skip: Some(Skip::Keep),
        accept: accept_amount,
    },
    Step {
        prompt: |d| {
            if d.description.is_empty() {
                "Description? Current: (empty)".to_string()
            } else {
                format!("Description? Current: {}", d.description)
            }
        },
        skip: Some(Skip::Keep),
        accept: accept_description,
    },
];

static NEW_COST: WorkflowDef<CostDraft> = WorkflowDef {
    kind: ActionKind::NewCost,
    steps: &NEW_STEPS,
    commit: commit_new,
};

static EDIT_COST: WorkflowDef<CostDraft> = WorkflowDef {
    kind: ActionKind::EditCost,
    steps: &EDIT_STEPS,
    commit: commit_edit,
};

fn commit_new(draft: &CostDraft, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
    let cmd = NewCost::new(ctx.today, draft.title.clone(), draft.amount)
        .description(draft.description.clone());
    let id = ledger.create_cost(cmd)?;
    Ok(format!(
        "✅ Cost saved (#{id})\n\n📝 {}\n💸 {}",
        draft.title,
        money(draft.amount, ctx.currency)
    ))
}

fn commit_edit(draft: &CostDraft, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
    let id = draft
        .id
        .ok_or_else(|| EngineError::NotFound("cost".to_string()))?;
    let cmd = CostUpdate {
        title: draft.title.clone(),
        amount: draft.amount,
        description: draft.description.clone(),
    };
    ledger.update_cost(id, cmd)?;
    Ok(format!(
        "✅ Cost updated (#{id})\n\n📝 {}\n💸 {}",
        draft.title,
        money(draft.amount, ctx.currency)
    ))
}
