//! Money aggregation for the owner
//!
//! Revenue/cash/card figures per period and grouping. A locked day
//! override fully supersedes the computed figures for its day; the two
//! are never blended.

use serde::{Deserialize, Serialize};
use sqlx::SqlitePool;

use crate::db::repository::{canonical, day_override};
use crate::utils::AppResult;

/// One business day of money figures
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DaySummary {
    pub business_day: String,
    /// Net collected: sales minus REFUND-routed reversals
    pub revenue: i64,
    pub cash: i64,
    pub card: i64,
    /// Money handed back to customers
    pub refunded: i64,
    /// Reversed money retained in the business fund
    pub funded: i64,
    /// Active tickets booked for the day
    pub tickets: i64,
    /// True when a locked manual override supersedes the computed figures
    pub overridden: bool,
}

/// Period totals
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MoneySummary {
    pub from: String,
    pub to: String,
    pub revenue: i64,
    pub cash: i64,
    pub card: i64,
    pub refunded: i64,
    pub funded: i64,
    pub tickets: i64,
}

/// The three legs of the daily reconciliation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reconciliation {
    pub business_day: String,
    /// SUM(canonical.amount) over VALID rows
    pub canonical_valid: i64,
    /// Seller-shift ledger net: POSTED sales minus REFUND-routed reversals
    pub ledger_posted_seller: i64,
    /// SUM(total_price) over ACTIVE presales booked for the day
    pub presales_active_total: i64,
    pub consistent: bool,
}

#[derive(sqlx::FromRow)]
struct LedgerDayRow {
    business_day: String,
    sold: i64,
    refunded: i64,
    funded: i64,
    cash: i64,
    card: i64,
}

#[derive(sqlx::FromRow)]
struct TicketDayRow {
    business_day: String,
    tickets: i64,
}

async fn ledger_days(pool: &SqlitePool, from: &str, to: &str) -> AppResult<Vec<LedgerDayRow>> {
    let rows = sqlx::query_as::<_, LedgerDayRow>(
        "SELECT business_day, \
         COALESCE(SUM(CASE WHEN entry_type != 'SALE_CANCEL_REVERSE' THEN amount ELSE 0 END), 0) AS sold, \
         COALESCE(SUM(CASE WHEN entry_type = 'SALE_CANCEL_REVERSE' AND route = 'REFUND' THEN amount ELSE 0 END), 0) AS refunded, \
         COALESCE(SUM(CASE WHEN entry_type = 'SALE_CANCEL_REVERSE' AND route = 'FUND' THEN amount ELSE 0 END), 0) AS funded, \
         COALESCE(SUM(CASE WHEN entry_type != 'SALE_CANCEL_REVERSE' THEN cash_amount WHEN route = 'REFUND' THEN -cash_amount ELSE 0 END), 0) AS cash, \
         COALESCE(SUM(CASE WHEN entry_type != 'SALE_CANCEL_REVERSE' THEN card_amount WHEN route = 'REFUND' THEN -card_amount ELSE 0 END), 0) AS card \
         FROM ledger_entry WHERE status = 'POSTED' AND business_day >= ?1 AND business_day <= ?2 \
         GROUP BY business_day ORDER BY business_day ASC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

async fn ticket_days(pool: &SqlitePool, from: &str, to: &str) -> AppResult<Vec<TicketDayRow>> {
    let rows = sqlx::query_as::<_, TicketDayRow>(
        "SELECT p.business_day AS business_day, COUNT(*) AS tickets \
         FROM ticket t JOIN presale p ON p.id = t.presale_id \
         WHERE t.status = 'ACTIVE' AND p.business_day >= ?1 AND p.business_day <= ?2 \
         GROUP BY p.business_day",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Per-day breakdown over an inclusive range, with locked overrides
/// substituted wholesale for their day.
pub async fn day_breakdown(pool: &SqlitePool, from: &str, to: &str) -> AppResult<Vec<DaySummary>> {
    let ledger = ledger_days(pool, from, to).await?;
    let tickets = ticket_days(pool, from, to).await?;
    let overrides = day_override::find_range(pool, from, to).await?;

    let mut days: std::collections::BTreeMap<String, DaySummary> = std::collections::BTreeMap::new();
    for row in ledger {
        days.insert(
            row.business_day.clone(),
            DaySummary {
                business_day: row.business_day,
                revenue: row.sold - row.refunded,
                cash: row.cash,
                card: row.card,
                refunded: row.refunded,
                funded: row.funded,
                tickets: 0,
                overridden: false,
            },
        );
    }
    for row in tickets {
        days.entry(row.business_day.clone())
            .or_insert_with(|| DaySummary {
                business_day: row.business_day.clone(),
                revenue: 0,
                cash: 0,
                card: 0,
                refunded: 0,
                funded: 0,
                tickets: 0,
                overridden: false,
            })
            .tickets = row.tickets;
    }

    // Manual takes precedence: a locked override short-circuits the
    // computed figures for its day entirely.
    for o in overrides.into_iter().filter(|o| o.locked) {
        days.insert(
            o.business_day.clone(),
            DaySummary {
                business_day: o.business_day,
                revenue: o.revenue,
                cash: o.cash,
                card: o.card,
                refunded: 0,
                funded: 0,
                tickets: o.tickets,
                overridden: true,
            },
        );
    }

    Ok(days.into_values().collect())
}

/// Period totals over an inclusive range.
pub async fn summary(pool: &SqlitePool, from: &str, to: &str) -> AppResult<MoneySummary> {
    let days = day_breakdown(pool, from, to).await?;
    let mut out = MoneySummary {
        from: from.to_string(),
        to: to.to_string(),
        revenue: 0,
        cash: 0,
        card: 0,
        refunded: 0,
        funded: 0,
        tickets: 0,
    };
    for d in days {
        out.revenue += d.revenue;
        out.cash += d.cash;
        out.card += d.card;
        out.refunded += d.refunded;
        out.funded += d.funded;
        out.tickets += d.tickets;
    }
    Ok(out)
}

/// Revenue grouped by seller
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct SellerSummary {
    pub seller_id: Option<i64>,
    pub seller_name: Option<String>,
    pub revenue: i64,
    pub cash: i64,
    pub card: i64,
}

pub async fn seller_breakdown(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> AppResult<Vec<SellerSummary>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        seller_id: Option<i64>,
        seller_name: Option<String>,
        sold: i64,
        refunded: i64,
        cash: i64,
        card: i64,
    }
    let rows = sqlx::query_as::<_, Row>(
        "SELECT l.seller_id AS seller_id, s.name AS seller_name, \
         COALESCE(SUM(CASE WHEN l.entry_type != 'SALE_CANCEL_REVERSE' THEN l.amount ELSE 0 END), 0) AS sold, \
         COALESCE(SUM(CASE WHEN l.entry_type = 'SALE_CANCEL_REVERSE' AND l.route = 'REFUND' THEN l.amount ELSE 0 END), 0) AS refunded, \
         COALESCE(SUM(CASE WHEN l.entry_type != 'SALE_CANCEL_REVERSE' THEN l.cash_amount WHEN l.route = 'REFUND' THEN -l.cash_amount ELSE 0 END), 0) AS cash, \
         COALESCE(SUM(CASE WHEN l.entry_type != 'SALE_CANCEL_REVERSE' THEN l.card_amount WHEN l.route = 'REFUND' THEN -l.card_amount ELSE 0 END), 0) AS card \
         FROM ledger_entry l LEFT JOIN seller s ON s.id = l.seller_id \
         WHERE l.status = 'POSTED' AND l.business_day >= ?1 AND l.business_day <= ?2 \
         GROUP BY l.seller_id ORDER BY sold DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| SellerSummary {
            seller_id: r.seller_id,
            seller_name: r.seller_name,
            revenue: r.sold - r.refunded,
            cash: r.cash,
            card: r.card,
        })
        .collect())
}

/// Revenue grouped by boat
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(test, derive(PartialEq))]
pub struct BoatSummary {
    pub boat_name: Option<String>,
    pub revenue: i64,
}

pub async fn boat_breakdown(
    pool: &SqlitePool,
    from: &str,
    to: &str,
) -> AppResult<Vec<BoatSummary>> {
    #[derive(sqlx::FromRow)]
    struct Row {
        boat_name: Option<String>,
        sold: i64,
        refunded: i64,
    }
    let rows = sqlx::query_as::<_, Row>(
        "SELECT sl.boat_name AS boat_name, \
         COALESCE(SUM(CASE WHEN l.entry_type != 'SALE_CANCEL_REVERSE' THEN l.amount ELSE 0 END), 0) AS sold, \
         COALESCE(SUM(CASE WHEN l.entry_type = 'SALE_CANCEL_REVERSE' AND l.route = 'REFUND' THEN l.amount ELSE 0 END), 0) AS refunded \
         FROM ledger_entry l \
         JOIN presale p ON p.id = l.presale_id \
         JOIN slot sl ON sl.kind = p.slot_kind AND sl.id = p.slot_id \
         WHERE l.status = 'POSTED' AND l.business_day >= ?1 AND l.business_day <= ?2 \
         GROUP BY sl.boat_name ORDER BY sold DESC",
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|r| BoatSummary {
            boat_name: r.boat_name,
            revenue: r.sold - r.refunded,
        })
        .collect())
}

/// The engine's central correctness property, surfaced as a report:
/// canonical VALID sum, seller-shift ledger net, and ACTIVE presale
/// totals for one business day.
pub async fn reconciliation(pool: &SqlitePool, day: &str) -> AppResult<Reconciliation> {
    let canonical_valid = canonical::valid_sum_by_day(pool, day).await?;

    let ledger_posted_seller: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(CASE WHEN entry_type != 'SALE_CANCEL_REVERSE' THEN amount WHEN route = 'REFUND' THEN -amount ELSE 0 END), 0) \
         FROM ledger_entry WHERE status = 'POSTED' AND kind = 'SELLER_SHIFT' AND business_day = ?",
    )
    .bind(day)
    .fetch_one(pool)
    .await?;

    let presales_active_total: i64 = sqlx::query_scalar(
        "SELECT COALESCE(SUM(total_price), 0) FROM presale WHERE status = 'ACTIVE' AND business_day = ?",
    )
    .bind(day)
    .fetch_one(pool)
    .await?;

    let consistent =
        canonical_valid == ledger_posted_seller && ledger_posted_seller == presales_active_total;

    Ok(Reconciliation {
        business_day: day.to_string(),
        canonical_valid,
        ledger_posted_seller,
        presales_active_total,
        consistent,
    })
}
