//! Fiscal period repository.
//!
//! Periods move open → locked ⇄ open → closed. Closing posts one voucher that
//! zeroes every revenue and expense account into retained earnings and marks
//! the period's entries closed, all inside one transaction.

use std::collections::BTreeMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DatabaseTransaction,
    DbBackend, DbErr, EntityTrait, IsolationLevel, QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::Expr,
};
use serde::Serialize;
use tally_core::chart::StandardAccount;
use tally_core::fiscal::{
    ClosingService, FiscalError, PeriodState, TemporaryBalance, monthly_periods, validate_date_range,
};
use tally_core::ledger::{BusinessReference, EntryType, PostingGuard, PostingRequest};
use tally_shared::LedgerConfig;
use tally_shared::types::{FiscalPeriodId, UserId};
use tracing::{info, warn};

use super::account::AccountRepository;
use super::ledger::{LedgerRepository, lock_exclusive};
use crate::entities::{accounts, fiscal_periods, ledger_entries};

fn db_err(e: DbErr) -> FiscalError {
    FiscalError::Database(e.to_string())
}

/// Result of closing a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CloseOutcome {
    /// Period closed.
    pub period_id: FiscalPeriodId,
    /// Net revenue closed.
    pub total_revenue: Decimal,
    /// Net expenses closed.
    pub total_expenses: Decimal,
    /// Revenue minus expenses; credited (or debited) to retained earnings.
    pub net_income: Decimal,
    /// Closing voucher; `None` when nothing needed closing.
    pub closing_voucher_number: Option<String>,
}

/// Fiscal period repository.
#[derive(Debug, Clone)]
pub struct FiscalRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
    accounts: AccountRepository,
    require_lock_before_close: bool,
    closing_document_type: String,
}

impl FiscalRepository {
    /// Creates a new fiscal repository.
    #[must_use]
    pub fn new(
        db: DatabaseConnection,
        ledger: LedgerRepository,
        accounts: AccountRepository,
        config: &LedgerConfig,
    ) -> Self {
        Self {
            db,
            ledger,
            accounts,
            require_lock_before_close: config.require_lock_before_close,
            closing_document_type: config.closing_document_type.clone(),
        }
    }

    /// Creates an open period.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDateRange` or `OverlappingPeriod`.
    pub async fn create_period(
        &self,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        Self::create_in(&self.db, name, start_date, end_date).await
    }

    /// Creates the twelve calendar months of `year` in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidYear`, or `OverlappingPeriod` if any month is already
    /// covered; nothing is created in that case.
    pub async fn create_monthly_periods(&self, year: i32) -> Result<Vec<fiscal_periods::Model>, FiscalError> {
        let drafts = monthly_periods(year)?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let mut periods = Vec::with_capacity(drafts.len());
        for draft in drafts {
            periods.push(Self::create_in(&txn, &draft.name, draft.start_date, draft.end_date).await?);
        }
        txn.commit().await.map_err(db_err)?;

        info!(year, count = periods.len(), "Monthly fiscal periods created");
        Ok(periods)
    }

    async fn create_in<C: ConnectionTrait>(
        conn: &C,
        name: &str,
        start_date: NaiveDate,
        end_date: NaiveDate,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        validate_date_range(start_date, end_date)?;

        let overlapping = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::StartDate.lte(end_date))
            .filter(fiscal_periods::Column::EndDate.gte(start_date))
            .order_by_asc(fiscal_periods::Column::StartDate)
            .one(conn)
            .await
            .map_err(db_err)?;
        if let Some(existing) = overlapping {
            return Err(FiscalError::OverlappingPeriod {
                start: start_date,
                end: end_date,
                existing: existing.name,
            });
        }

        let now = Utc::now().into();
        let period = fiscal_periods::ActiveModel {
            id: Set(FiscalPeriodId::new().into_inner()),
            name: Set(name.to_string()),
            start_date: Set(start_date),
            end_date: Set(end_date),
            is_locked: Set(false),
            is_closed: Set(false),
            locked_by: Set(None),
            locked_at: Set(None),
            closed_by: Set(None),
            closed_at: Set(None),
            net_income: Set(None),
            closing_voucher_number: Set(None),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;

        info!(period_id = %period.id, name, %start_date, %end_date, "Fiscal period created");
        Ok(period)
    }

    /// Finds a period by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period(&self, id: FiscalPeriodId) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        fiscal_periods::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Period whose range contains `date`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_period_for_date(&self, date: NaiveDate) -> Result<Option<fiscal_periods::Model>, FiscalError> {
        fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Every period ordered by start date.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_periods(&self) -> Result<Vec<fiscal_periods::Model>, FiscalError> {
        fiscal_periods::Entity::find()
            .order_by_asc(fiscal_periods::Column::StartDate)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Locks an open period against postings.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `AlreadyLocked`, or `AlreadyClosed`.
    pub async fn lock(&self, id: FiscalPeriodId, actor: UserId) -> Result<fiscal_periods::Model, FiscalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let period = Self::load_for_update(&txn, id).await?;
        period.state().validate_lock(id)?;

        let period = Self::set_lock(&txn, period, Some(actor)).await?;
        txn.commit().await.map_err(db_err)?;

        info!(period_id = %id, actor = %actor, "Fiscal period locked");
        Ok(period)
    }

    /// Reopens a locked period.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `NotLocked`, or `AlreadyClosed`.
    pub async fn unlock(&self, id: FiscalPeriodId, actor: UserId) -> Result<fiscal_periods::Model, FiscalError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let period = Self::load_for_update(&txn, id).await?;
        period.state().validate_unlock(id)?;

        let period = Self::set_lock(&txn, period, None).await?;
        txn.commit().await.map_err(db_err)?;

        info!(period_id = %id, actor = %actor, "Fiscal period unlocked");
        Ok(period)
    }

    async fn load_for_update<C: ConnectionTrait>(
        conn: &C,
        id: FiscalPeriodId,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        lock_exclusive(fiscal_periods::Entity::find_by_id(id.into_inner()), conn)
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(FiscalError::PeriodNotFound(id))
    }

    async fn set_lock<C: ConnectionTrait>(
        conn: &C,
        period: fiscal_periods::Model,
        locked_by: Option<UserId>,
    ) -> Result<fiscal_periods::Model, FiscalError> {
        let now = Utc::now().into();
        let mut active: fiscal_periods::ActiveModel = period.into();
        active.is_locked = Set(locked_by.is_some());
        active.locked_by = Set(locked_by.map(UserId::into_inner));
        active.locked_at = Set(locked_by.map(|_| now));
        active.updated_at = Set(now);
        active.update(conn).await.map_err(db_err)
    }

    /// Closes a period.
    ///
    /// An open period is locked first unless the strict policy requires an
    /// explicit lock. Revenue and expense balances dated within the period
    /// are moved to retained earnings by one closing voucher, every entry in
    /// the range is flagged closed, and the period becomes terminal.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, `AlreadyClosed`, `LockRequiredBeforeClose`,
    /// a chart error when retained earnings cannot be resolved, or the
    /// posting error of the closing voucher. Nothing is written on error.
    pub async fn close(&self, id: FiscalPeriodId, actor: UserId) -> Result<CloseOutcome, FiscalError> {
        self.close_committed(id, actor)
            .await
            .inspect(|outcome| {
                info!(
                    period_id = %id,
                    actor = %actor,
                    net_income = %outcome.net_income,
                    voucher = ?outcome.closing_voucher_number,
                    "Fiscal period closed"
                );
            })
            .inspect_err(|e| {
                warn!(period_id = %id, error = %e, code = e.error_code(), "Period close rejected");
            })
    }

    /// `READ COMMITTED` on PostgreSQL: statements after the period's
    /// `FOR UPDATE` must see postings committed during the lock wait.
    async fn begin_close(&self) -> Result<DatabaseTransaction, FiscalError> {
        let isolation = match self.db.get_database_backend() {
            DbBackend::Postgres => Some(IsolationLevel::ReadCommitted),
            _ => None,
        };
        self.db.begin_with_config(isolation, None).await.map_err(db_err)
    }

    async fn close_committed(&self, id: FiscalPeriodId, actor: UserId) -> Result<CloseOutcome, FiscalError> {
        let txn = self.begin_close().await?;
        let mut period = Self::load_for_update(&txn, id).await?;
        period
            .state()
            .validate_close(id, self.require_lock_before_close)?;
        if period.state() == PeriodState::Open {
            period = Self::set_lock(&txn, period, Some(actor)).await?;
        }

        let retained_earnings = self
            .accounts
            .resolve_in(&txn, StandardAccount::RetainedEarnings)
            .await?;
        let balances = Self::temporary_balances(&txn, period.start_date, period.end_date).await?;
        let plan = ClosingService::plan(&balances, &retained_earnings);

        let closing_voucher_number = if plan.is_empty() {
            None
        } else {
            let request = PostingRequest::new(
                plan.lines.clone(),
                BusinessReference::new("fiscal_periods", id.to_string()),
                actor,
            )
            .dated(period.end_date)
            .with_document_type(self.closing_document_type.clone())
            .with_description(format!("Closing entries for {}", period.name))
            .in_period(id);
            let posted = self
                .ledger
                .post_in(&txn, request, PostingGuard::ClosingPeriod(id))
                .await?;
            Some(posted.voucher_number)
        };

        ledger_entries::Entity::update_many()
            .col_expr(ledger_entries::Column::IsClosed, Expr::value(true))
            .filter(ledger_entries::Column::VoucherDate.between(period.start_date, period.end_date))
            .filter(ledger_entries::Column::IsClosed.eq(false))
            .exec(&txn)
            .await
            .map_err(db_err)?;

        let now = Utc::now().into();
        let mut active: fiscal_periods::ActiveModel = period.into();
        active.is_closed = Set(true);
        active.closed_by = Set(Some(actor.into_inner()));
        active.closed_at = Set(Some(now));
        active.net_income = Set(Some(plan.net_income));
        active.closing_voucher_number = Set(closing_voucher_number.clone());
        active.updated_at = Set(now);
        active.update(&txn).await.map_err(db_err)?;

        txn.commit().await.map_err(db_err)?;

        Ok(CloseOutcome {
            period_id: id,
            total_revenue: plan.total_revenue,
            total_expenses: plan.total_expenses,
            net_income: plan.net_income,
            closing_voucher_number,
        })
    }

    /// Unclosed revenue and expense totals dated within `[start, end]`,
    /// ordered by account code.
    async fn temporary_balances<C: ConnectionTrait>(
        conn: &C,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<TemporaryBalance>, FiscalError> {
        let rows = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::VoucherDate.between(start, end))
            .filter(ledger_entries::Column::IsClosed.eq(false))
            .find_also_related(accounts::Entity)
            .all(conn)
            .await
            .map_err(db_err)?;

        let mut balances: BTreeMap<String, TemporaryBalance> = BTreeMap::new();
        for (entry, account) in rows {
            let Some(account) = account else { continue };
            let account_type = account.account_type.into();
            let balance = balances
                .entry(entry.account_code.clone())
                .or_insert_with(|| TemporaryBalance {
                    account_code: entry.account_code.clone(),
                    account_type,
                    debit: Decimal::ZERO,
                    credit: Decimal::ZERO,
                });
            match EntryType::from(entry.entry_type) {
                EntryType::Debit => balance.debit += entry.amount,
                EntryType::Credit => balance.credit += entry.amount,
            }
        }

        Ok(balances
            .into_values()
            .filter(|b| b.account_type.is_temporary())
            .collect())
    }
}
