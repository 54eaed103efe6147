//! Dashboard view model.
//!
//! Built from whatever subset of the five backend sections arrived. A
//! missing section contributes its zero/empty default and is listed in
//! `failed_sections`; nothing is ever filled in with made-up figures.

use std::{collections::HashMap, fmt};

use bigdecimal::{BigDecimal, Zero};
use serde::Serialize;

use super::{
    bank::{bank_name, Bank, OTHER_BANKS},
    decode_positional, Application, Loan, Transaction, TransactionPage,
};
use crate::{
    helpers::{
        amount::{clamp_non_negative, normalize_amount, to_f64},
        chart::{
            donut_segments, indicator_position, legend_percentages, line_points,
            payoff_percent, score_color, DonutGeometry, DonutSegment,
        },
        formatter::format_currency,
    },
    types::{ApiApplication, ApiBalance, ApiDebt, ApiLoan, ApiTransactionHistory},
};

pub const DEFAULT_CURRENCY: &str = "RUB";
pub const CREDIT_SCORE_MIN: f64 = 300.0;
pub const CREDIT_SCORE_MAX: f64 = 850.0;
pub const RATING_SLIDER_WIDTH: f64 = 458.0;
pub const SPENDING_CHART_WIDTH: f64 = 500.0;
pub const SPENDING_CHART_HEIGHT: f64 = 140.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Section {
    Balance,
    Debt,
    Loans,
    Transactions,
    Applications,
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let value = match self {
            Section::Balance => "balance",
            Section::Debt => "debt",
            Section::Loans => "loans",
            Section::Transactions => "transactions",
            Section::Applications => "applications",
        };
        write!(f, "{}", value)
    }
}

/// Raw section payloads; `None` marks a section whose request failed.
#[derive(Debug, Default)]
pub struct DashboardSources {
    pub balance: Option<ApiBalance>,
    pub debt: Option<ApiDebt>,
    pub loans: Option<Vec<ApiLoan>>,
    pub transactions: Option<ApiTransactionHistory>,
    pub applications: Option<Vec<ApiApplication>>,
}

#[derive(Debug, Clone, Copy)]
pub struct DashboardOptions {
    pub transactions_limit: usize,
    pub geometry: DonutGeometry,
}

impl Default for DashboardOptions {
    fn default() -> Self {
        Self {
            transactions_limit: 10,
            geometry: DonutGeometry::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BankAmount {
    pub bank_id: Option<i64>,
    pub bank_name: String,
    pub amount: BigDecimal,
    pub formatted: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DebtSlice {
    pub bank_id: Option<i64>,
    pub bank_name: String,
    pub amount: BigDecimal,
    pub formatted: String,
    pub percent: u32,
}

impl DebtSlice {
    /// Unique per slice, unlike the display name: unknown banks share one.
    pub fn key(&self) -> String {
        match self.bank_id {
            Some(id) => format!("bank-{}", id),
            None => String::from("other"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendingPoint {
    pub month: String,
    pub amount: BigDecimal,
    pub x: f64,
    pub y: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Payoff {
    pub paid: BigDecimal,
    pub total: BigDecimal,
    pub percent: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CreditRating {
    pub score: f64,
    pub min: f64,
    pub max: f64,
    pub color: String,
    pub position: f64,
}

impl CreditRating {
    pub fn new(score: f64) -> Self {
        CreditRating {
            score,
            min: CREDIT_SCORE_MIN,
            max: CREDIT_SCORE_MAX,
            color: score_color(score, CREDIT_SCORE_MIN, CREDIT_SCORE_MAX),
            position: indicator_position(
                score,
                CREDIT_SCORE_MIN,
                CREDIT_SCORE_MAX,
                RATING_SLIDER_WIDTH,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Dashboard {
    pub currency: String,
    pub total_balance: BigDecimal,
    pub total_balance_formatted: String,
    pub balance_by_bank: Vec<BankAmount>,
    pub total_debt: BigDecimal,
    pub total_debt_formatted: String,
    pub debt_by_bank: Vec<DebtSlice>,
    pub debt_segments: Vec<DonutSegment>,
    pub loan_count: usize,
    pub active_loan_count: usize,
    pub loans: Vec<Loan>,
    pub recent_transactions: Vec<Transaction>,
    pub total_spent: BigDecimal,
    pub spending: Vec<SpendingPoint>,
    pub payoff: Payoff,
    pub credit_rating: Option<CreditRating>,
    pub applications: Vec<Application>,
    pub failed_sections: Vec<Section>,
}

impl Dashboard {
    pub fn build(
        sources: DashboardSources,
        banks: &[Bank],
        options: &DashboardOptions,
    ) -> Dashboard {
        let mut failed_sections = vec![];
        let DashboardSources {
            balance,
            debt,
            loans,
            transactions,
            applications,
        } = sources;

        let balance = balance.unwrap_or_else(|| {
            failed_sections.push(Section::Balance);
            ApiBalance::default()
        });
        let debt = debt.unwrap_or_else(|| {
            failed_sections.push(Section::Debt);
            ApiDebt::default()
        });
        let loans = loans.unwrap_or_else(|| {
            failed_sections.push(Section::Loans);
            vec![]
        });
        let transactions = transactions.unwrap_or_else(|| {
            failed_sections.push(Section::Transactions);
            ApiTransactionHistory::default()
        });
        let applications = applications.unwrap_or_else(|| {
            failed_sections.push(Section::Applications);
            vec![]
        });

        let mut loans = decode_positional(loans, Loan::decode);
        apply_debt_breakdown(&mut loans, &debt);

        let total_debt = resolve_total_debt(&debt, &balance, &loans);
        let total_balance = normalize_amount(balance.total_balance.as_ref());
        let balance_by_bank = balance
            .by_bank
            .iter()
            .map(|item| {
                let bank_id = item.bank_id.as_ref().and_then(|id| id.as_i64());
                let amount = normalize_amount(item.balance.as_ref());
                BankAmount {
                    bank_id,
                    bank_name: bank_name(banks, bank_id),
                    formatted: format_currency(&amount),
                    amount,
                }
            })
            .collect();

        let debt_by_bank = debt_by_bank(&loans, banks);
        let mut debt_segments = donut_segments(
            &debt_by_bank
                .iter()
                .map(|slice| (slice.key(), to_f64(&slice.amount)))
                .collect::<Vec<_>>(),
            &options.geometry,
        );
        for segment in debt_segments.iter_mut() {
            if let Some(slice) = debt_by_bank.iter().find(|slice| slice.key() == segment.id) {
                segment.label = slice.bank_name.to_owned();
            }
        }

        let page = TransactionPage::decode(transactions);
        let spending = spending_series(&page.transactions);
        let mut recent_transactions = page.transactions;
        recent_transactions.truncate(options.transactions_limit);

        let payoff = payoff(&loans, &total_debt);
        let credit_rating = balance
            .credit_rating
            .as_ref()
            .map(|score| CreditRating::new(to_f64(&normalize_amount(Some(score)))));

        Dashboard {
            currency: balance
                .currency
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| String::from(DEFAULT_CURRENCY)),
            total_balance_formatted: format_currency(&total_balance),
            total_balance,
            balance_by_bank,
            total_debt_formatted: format_currency(&total_debt),
            total_debt,
            debt_by_bank,
            debt_segments,
            loan_count: loans.len(),
            active_loan_count: loans.iter().filter(|loan| loan.is_active()).count(),
            loans,
            recent_transactions,
            total_spent: page.total_spent,
            spending,
            payoff,
            credit_rating,
            applications: decode_positional(applications, Application::decode),
            failed_sections,
        }
    }
}

/// Loans without their own remaining balance take the per-loan figure of
/// the debt endpoint.
fn apply_debt_breakdown(loans: &mut [Loan], debt: &ApiDebt) {
    let outstanding: HashMap<String, BigDecimal> = debt
        .by_loan
        .iter()
        .filter_map(|item| {
            let id = item.loan_id.as_ref()?.to_string();
            let amount = item.outstanding.as_ref()?;
            Some((id, normalize_amount(Some(amount))))
        })
        .collect();

    for loan in loans.iter_mut() {
        if loan.remaining_balance.is_none() {
            if let Some(amount) = outstanding.get(&loan.id) {
                loan.remaining_balance = Some(amount.clone());
            }
        }
    }
}

/// The debt endpoint's total, then the balance payload's. A zero total
/// while loans exist is recomputed from the loans themselves.
fn resolve_total_debt(debt: &ApiDebt, balance: &ApiBalance, loans: &[Loan]) -> BigDecimal {
    let reported = debt
        .total_debt
        .as_ref()
        .or(balance.total_debt.as_ref());
    let total = normalize_amount(reported);

    if total.is_zero() && !loans.is_empty() {
        return loans.iter().map(Loan::outstanding).sum();
    }

    total
}

fn debt_by_bank(loans: &[Loan], banks: &[Bank]) -> Vec<DebtSlice> {
    let mut groups: Vec<(Option<i64>, BigDecimal)> = vec![];

    for loan in loans {
        match groups.iter_mut().find(|(bank_id, _)| *bank_id == loan.bank_id) {
            Some((_, amount)) => *amount += loan.outstanding(),
            None => groups.push((loan.bank_id, loan.outstanding())),
        }
    }

    let percents =
        legend_percentages(&groups.iter().map(|(_, amount)| to_f64(amount)).collect::<Vec<_>>());

    groups
        .into_iter()
        .zip(percents)
        .map(|((bank_id, amount), percent)| DebtSlice {
            bank_id,
            bank_name: match bank_id {
                Some(_) => bank_name(banks, bank_id),
                None => String::from(OTHER_BANKS),
            },
            formatted: format_currency(&amount),
            amount,
            percent,
        })
        .collect()
}

/// Spending summed per calendar month, oldest month first.
fn spending_series(transactions: &[Transaction]) -> Vec<SpendingPoint> {
    let mut months: Vec<(String, BigDecimal)> = vec![];

    for transaction in transactions {
        let Some(month) = transaction.month() else {
            continue;
        };
        let spent = transaction.spent();
        if spent.is_zero() {
            continue;
        }

        match months.iter_mut().find(|(key, _)| *key == month) {
            Some((_, amount)) => *amount += spent,
            None => months.push((month, spent)),
        }
    }

    months.sort_by(|(a, _), (b, _)| a.cmp(b));

    let values: Vec<f64> = months.iter().map(|(_, amount)| to_f64(amount)).collect();
    let points = line_points(&values, SPENDING_CHART_WIDTH, SPENDING_CHART_HEIGHT);

    months
        .into_iter()
        .zip(points)
        .map(|((month, amount), (x, y))| SpendingPoint { month, amount, x, y })
        .collect()
}

fn payoff(loans: &[Loan], total_debt: &BigDecimal) -> Payoff {
    let total: BigDecimal = loans.iter().map(|loan| loan.original_amount.clone()).sum();
    let paid = clamp_non_negative(&total - total_debt);

    Payoff {
        percent: payoff_percent(to_f64(&paid), to_f64(&total)),
        paid,
        total,
    }
}
