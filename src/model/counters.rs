use crate::model::{Amount, Category};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// The four running totals. They only ever grow, except for a full reset.
#[derive(Debug, Default, Clone, Copy, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Counters {
    debt_paid: Amount,
    saved: Amount,
    invested: Amount,
    spent: Amount,
}

impl Counters {
    pub fn get(&self, category: Category) -> Amount {
        match category {
            Category::DebtPaid => self.debt_paid,
            Category::Saved => self.saved,
            Category::Invested => self.invested,
            Category::Spent => self.spent,
        }
    }

    /// Sets a counter directly. Only used when restoring a snapshot.
    pub(crate) fn set(&mut self, category: Category, amount: Amount) {
        *self.slot(category) = amount;
    }

    /// Adds `amount` to one counter. A counter that would overflow stays at `Amount::MAX`.
    pub(crate) fn add(&mut self, category: Category, amount: Amount) {
        let slot = self.slot(category);
        if slot.checked_add(amount).is_none() {
            warn!("The {} counter has reached its maximum value", category.title());
        }
        *slot += amount;
    }

    /// The sum of all four counters.
    pub fn total(&self) -> Amount {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }

    /// Iterates `(category, amount)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (Category, Amount)> + '_ {
        Category::ALL.iter().map(move |c| (*c, self.get(*c)))
    }

    fn slot(&mut self, category: Category) -> &mut Amount {
        match category {
            Category::DebtPaid => &mut self.debt_paid,
            Category::Saved => &mut self.saved,
            Category::Invested => &mut self.invested,
            Category::Spent => &mut self.spent,
        }
    }
}
