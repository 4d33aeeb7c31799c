use engine::{
    Ledger, NewPartnerTransaction, PartnerId, PartnerRoster, PartnerTxKind, ResultEngine,
};

use crate::{
    render::money,
    step::{
        ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Skip, Step, WorkflowDef,
        positive_amount, text,
    },
};

#[derive(Clone, Debug)]
pub(crate) struct PartnerDraft {
    partner: PartnerId,
    name: String,
    kind: PartnerTxKind,
    amount: i64,
    description: String,
}

/// Partner and type come from the picker buttons; only the amount and the
/// description are asked.
pub(crate) fn start(
    roster: &PartnerRoster,
    partner: PartnerId,
    kind: PartnerTxKind,
) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let name = roster.require(&partner)?.name.clone();
    let draft = PartnerDraft {
        partner,
        name,
        kind,
        amount: 0,
        description: String::new(),
    };
    Ok(Progress::start(&PARTNER_TRANSACTION, draft))
}

fn accept_amount(draft: &mut PartnerDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.amount = positive_amount(input, draft.amount, "the amount")?;
    Ok(())
}

fn accept_description(draft: &mut PartnerDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.description = text(input, &draft.description)?;
    Ok(())
}

static STEPS: [Step<PartnerDraft>; 2] = [
    Step {
        prompt: |d| format!("{} • {}. Amount?", d.name, d.kind.label()),
        skip: None,
        accept: accept_amount,
    },
    Step {
        prompt: |_| "Description?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_description,
    },
];

static PARTNER_TRANSACTION: WorkflowDef<PartnerDraft> = WorkflowDef {
    kind: ActionKind::PartnerTransaction,
    steps: &STEPS,
    commit,
};

fn commit(draft: &PartnerDraft, ledger: &mut Ledger, ctx: &CommitContext<'_>) -> ResultEngine<String> {
    let cmd = NewPartnerTransaction::new(ctx.today, draft.partner.clone(), draft.kind, draft.amount)
        .description(draft.description.clone());
    let id = ledger.record_partner_transaction(cmd, ctx.roster)?;
    let mut receipt = format!(
        "✅ Partner transaction saved (#{id})\n\n👤 {}\n🏷 {}\n💵 {}",
        draft.name,
        draft.kind.label(),
        money(draft.amount, ctx.currency)
    );
    if draft.kind == PartnerTxKind::PersonalExpense {
        receipt.push_str("\n📝 Also booked as a company cost.");
    }
    Ok(receipt)
}
