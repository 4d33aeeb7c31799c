use engine::{EngineError, EntityId, Ledger, NewSale, ResultEngine, SaleUpdate, calc};

use crate::{
    render::money,
    step::{
        ActionKind, ActiveWorkflow, CommitContext, Input, Progress, Skip, Step, WorkflowDef,
        amount, text,
    },
};

#[derive(Clone, Debug, Default)]
pub(crate) struct SaleDraft {
    purchase_id: EntityId,
    /// Set when editing.
    sale_id: Option<EntityId>,
    model: String,
    purchase_price: i64,
    sell_price: i64,
    debt: i64,
    customer_name: String,
    customer_phone: String,
    notes: String,
}

/// Sells the given unsold purchase.
pub(crate) fn start_new(
    ledger: &Ledger,
    purchase_id: EntityId,
) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let purchase = ledger
        .purchase(purchase_id)
        .ok_or_else(|| EngineError::NotFound(format!("purchase #{purchase_id}")))?;
    if purchase.sold {
        return Err(EngineError::InvariantViolation(format!(
            "purchase #{purchase_id} is already sold"
        )));
    }
    let draft = SaleDraft {
        purchase_id,
        model: purchase.model.clone(),
        purchase_price: purchase.total_cost,
        ..SaleDraft::default()
    };
    Ok(Progress::start(&NEW_SALE, draft))
}

pub(crate) fn start_edit(
    ledger: &Ledger,
    sale_id: EntityId,
) -> ResultEngine<Box<dyn ActiveWorkflow>> {
    let sale = ledger
        .sale(sale_id)
        .ok_or_else(|| EngineError::NotFound(format!("sale #{sale_id}")))?;
    let draft = SaleDraft {
        purchase_id: sale.purchase_id,
        sale_id: Some(sale_id),
        model: sale.model.clone(),
        purchase_price: sale.purchase_price,
        sell_price: sale.sell_price,
        debt: sale.debt,
        customer_name: sale.customer_name.clone(),
        customer_phone: sale.customer_phone.clone(),
        notes: sale.notes.clone(),
    };
    Ok(Progress::start(&EDIT_SALE, draft))
}

fn accept_price(draft: &mut SaleDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.sell_price = amount(input, draft.sell_price)?;
    Ok(())
}

fn accept_debt(draft: &mut SaleDraft, input: Input<'_>, ledger: &Ledger) -> ResultEngine<()> {
    let debt = amount(input, draft.debt)?;
    if debt > draft.sell_price {
        return Err(EngineError::Validation(format!(
            "the debt ({}) cannot exceed the sell price ({})",
            money(debt, ""),
            money(draft.sell_price, "")
        )));
    }
    if let Some(id) = draft.sale_id {
        let paid = calc::sale_paid(ledger, id);
        if debt < paid {
            return Err(EngineError::Validation(format!(
                "the customer already paid {}; the debt cannot be lower",
                money(paid, "")
            )));
        }
    }
    draft.debt = debt;
    Ok(())
}

fn accept_customer(draft: &mut SaleDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.customer_name = text(input, &draft.customer_name)?;
    Ok(())
}

fn accept_phone(draft: &mut SaleDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    let phone = text(input, &draft.customer_phone)?;
    let phone = crate::parsing::normalize_digits(&phone);
    if !phone
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '+' | ' ' | '-'))
    {
        return Err(EngineError::Validation(format!(
            "\"{phone}\" does not look like a phone number"
        )));
    }
    draft.customer_phone = phone;
    Ok(())
}

fn accept_notes(draft: &mut SaleDraft, input: Input<'_>, _: &Ledger) -> ResultEngine<()> {
    draft.notes = text(input, &draft.notes)?;
    Ok(())
}

static NEW_STEPS: [Step<SaleDraft>; 5] = [
    Step {
        prompt: |d| {
            format!(
                "Selling {} (cost {}). Sell price?",
                d.model,
                money(d.purchase_price, "")
            )
        },
        skip: None,
        accept: accept_price,
    },
    Step {
        prompt: |_| "How much does the customer still owe?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_debt,
    },
    Step {
        prompt: |_| "Customer name?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_customer,
    },
    Step {
        prompt: |_| "Customer phone?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_phone,
    },
    Step {
        prompt: |_| "Notes?".to_string(),
        skip: Some(Skip::Default),
        accept: accept_notes,
    },
];

static EDIT_STEPS: [Step<SaleDraft>; 5] = [
    Step {
        prompt: |d| format!("Sell price? Current: {}", money(d.sell_price, "")),
        skip: Some(Skip::Keep),
        accept: accept_price,
    },
    Step {
        prompt: |d| format!("Customer debt? Current: {}", money(d.debt, "")),
        skip: Some(Skip::Keep),
        accept: accept_debt,
    },
    Step {
        prompt: |d| format!("Customer name? Current: {}", shown(&d.customer_name)),
        skip: Some(Skip::Keep),
        accept: accept_customer,
    },
    Step {
        prompt: |d| format!("Customer phone? Current: {}", shown(&d.customer_phone)),
        skip: Some(Skip::Keep),
        accept: accept_phone,
    },
    Step {
        prompt: |d| format!("Notes? Current: {}", shown(&d.notes)),
        skip: Some(Skip::Keep),
        accept: accept_notes,
    },
];

fn shown(value: &str) -> &str {
    if value.is_empty() { "(empty)" } else { value }
}

static NEW_SALE: WorkflowDef<SaleDraft> = WorkflowDef {
    kind: ActionKind::NewSale,
    steps: &NEW_STEPS,
    commit: commit_new,
};

static EDIT_SALE: WorkflowDef<SaleDraft> = WorkflowDef {
    kind: ActionKind::EditSale,
    steps: &EDIT_STEPS,
    commit: commit_edit,
};

fn commit_new(
    draft: &SaleDraft,
    ledger: &mut Ledger,
    ctx: &CommitContext<'_>,
) -> ResultEngine<String> {
    let cmd = NewSale::new(ctx.today, draft.purchase_id, draft.sell_price)
        .debt(draft.debt)
        .customer(draft.customer_name.clone(), draft.customer_phone.clone())
        .notes(draft.notes.clone());
    let id = ledger.create_sale(cmd)?;
    Ok(receipt("✅ Sale saved", id, draft, ctx.currency))
}

fn commit_edit(
    draft: &SaleDraft,
    ledger: &mut Ledger,
    ctx: &CommitContext<'_>,
) -> ResultEngine<String> {
    let id = draft
        .sale_id
        .ok_or_else(|| EngineError::NotFound("sale".to_string()))?;
    let cmd = SaleUpdate {
        sell_price: draft.sell_price,
        debt: draft.debt,
        customer_name: draft.customer_name.clone(),
        customer_phone: draft.customer_phone.clone(),
        notes: draft.notes.clone(),
    };
    ledger.update_sale(id, cmd)?;
    Ok(receipt("✅ Sale updated", id, draft, ctx.currency))
}

fn receipt(title: &str, id: EntityId, draft: &SaleDraft, currency: &str) -> String {
    format!(
        "{title} (#{id})\n\n📱 {}\n💰 Sell price: {}\n📈 Profit: {}\n💵 Received: {}\n⏳ Customer owes: {}",
        draft.model,
        money(draft.sell_price, currency),
        money(draft.sell_price - draft.purchase_price, currency),
        money(draft.sell_price - draft.debt, currency),
        money(draft.debt, currency),
    )
}
