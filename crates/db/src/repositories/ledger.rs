//! Ledger posting repository.
//!
//! Validation and period rules live in `tally_core::ledger`; this repository
//! loads what they need, calls them, and writes the voucher header and its
//! entries inside one transaction.

use std::collections::HashMap;

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbBackend, DbErr,
    EntityTrait, QueryFilter, QueryOrder, QuerySelect, Select, Set, SqlErr, TransactionTrait,
};
use tally_core::chart::AccountInfo;
use tally_core::ledger::{
    AccountBalance, BusinessReference, LedgerError, LedgerService, PostedVoucher, PostingGuard,
    PostingRequest, ReversalService,
};
use tally_core::sequence::normalize_document_type;
use tally_shared::LedgerConfig;
use tally_shared::types::{LedgerEntryId, UserId};
use tracing::{info, warn};

use super::sequence::SequenceRepository;
use crate::entities::{accounts, fiscal_periods, ledger_entries, vouchers};

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

pub(crate) fn is_unique_violation(e: &DbErr) -> bool {
    matches!(e.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}

/// Row locks are requested only where the backend has them.
pub(crate) fn lock_shared<E: EntityTrait, C: ConnectionTrait>(query: Select<E>, conn: &C) -> Select<E> {
    if supports_row_locks(conn) {
        query.lock_shared()
    } else {
        query
    }
}

/// Exclusive counterpart of [`lock_shared`].
pub(crate) fn lock_exclusive<E: EntityTrait, C: ConnectionTrait>(query: Select<E>, conn: &C) -> Select<E> {
    if supports_row_locks(conn) {
        query.lock_exclusive()
    } else {
        query
    }
}

pub(crate) fn supports_row_locks<C: ConnectionTrait>(conn: &C) -> bool {
    matches!(conn.get_database_backend(), DbBackend::Postgres | DbBackend::MySql)
}

/// A voucher header with its entries.
#[derive(Debug, Clone)]
pub struct VoucherWithEntries {
    /// Voucher header.
    pub voucher: vouchers::Model,
    /// Entries in insertion order.
    pub entries: Vec<ledger_entries::Model>,
    /// Number of the voucher reversing this one, if any.
    pub reversed_by: Option<String>,
}

/// Posting policy taken from [`LedgerConfig`].
#[derive(Debug, Clone)]
struct PostingPolicy {
    balance_tolerance: Decimal,
    default_document_type: String,
    reversal_document_type: String,
    require_fiscal_period: bool,
}

/// Ledger posting repository.
#[derive(Debug, Clone)]
pub struct LedgerRepository {
    db: DatabaseConnection,
    policy: PostingPolicy,
}

impl LedgerRepository {
    /// Creates a new ledger repository.
    #[must_use]
    pub fn new(db: DatabaseConnection, config: &LedgerConfig) -> Self {
        Self {
            db,
            policy: PostingPolicy {
                balance_tolerance: config.balance_tolerance,
                default_document_type: config.default_document_type.clone(),
                reversal_document_type: config.reversal_document_type.clone(),
                require_fiscal_period: config.require_fiscal_period,
            },
        }
    }

    /// Posts a balanced voucher.
    ///
    /// Either every entry is written or none is.
    ///
    /// # Errors
    ///
    /// Returns a validation error (entry count, amounts, accounts, balance,
    /// document type), a period error (missing, locked, closed), or
    /// `DuplicateVoucherNumber`.
    pub async fn post(&self, request: PostingRequest) -> Result<PostedVoucher, LedgerError> {
        let reference = request.reference.clone();
        self.post_committed(request).await.inspect_err(|e| {
            warn!(error = %e, code = e.error_code(), reference = %reference, "Posting rejected");
        })
    }

    async fn post_committed(&self, request: PostingRequest) -> Result<PostedVoucher, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let posted = self.post_in(&txn, request, PostingGuard::Regular).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(posted)
    }

    /// Posts inside an existing transaction; the caller commits.
    ///
    /// `guard` lets the closing voucher of a period post while that period is
    /// locked.
    ///
    /// # Errors
    ///
    /// See [`Self::post`].
    pub async fn post_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        request: PostingRequest,
        guard: PostingGuard,
    ) -> Result<PostedVoucher, LedgerError> {
        self.write_voucher(conn, request, guard, None).await
    }

    async fn write_voucher<C: ConnectionTrait>(
        &self,
        conn: &C,
        request: PostingRequest,
        guard: PostingGuard,
        reverses: Option<&str>,
    ) -> Result<PostedVoucher, LedgerError> {
        let document_type = normalize_document_type(
            request
                .document_type
                .as_deref()
                .unwrap_or(&self.policy.default_document_type),
        )?;

        let accounts = Self::load_accounts(conn, &request).await?;
        let totals = LedgerService::validate_lines(&request.lines, self.policy.balance_tolerance, |code| {
            accounts.get(code).cloned()
        })?;

        let voucher_date = request.voucher_date.unwrap_or_else(|| Utc::now().date_naive());
        let period = match request.fiscal_period_id {
            Some(id) => lock_shared(fiscal_periods::Entity::find_by_id(id.into_inner()), conn)
                .one(conn)
                .await
                .map_err(db_err)?,
            None => Self::period_containing(conn, voucher_date).await?,
        };
        let fiscal_period_id = LedgerService::check_posting_period(
            voucher_date,
            request.fiscal_period_id,
            period.as_ref().map(fiscal_periods::Model::posting_period).as_ref(),
            self.policy.require_fiscal_period,
            guard,
        )?;

        let caller_numbered = request.voucher_number.is_some();
        let voucher_number = match request.voucher_number.clone() {
            Some(number) => {
                let existing = vouchers::Entity::find_by_id(number.clone())
                    .one(conn)
                    .await
                    .map_err(db_err)?;
                if existing.is_some() {
                    return Err(LedgerError::DuplicateVoucherNumber(number));
                }
                number
            }
            None => SequenceRepository::next_in(conn, &document_type).await?,
        };

        let now = Utc::now().into();
        let period_uuid = fiscal_period_id.map(|id| id.into_inner());
        let BusinessReference { table, id: reference_id } = request.reference;

        vouchers::ActiveModel {
            voucher_number: Set(voucher_number.clone()),
            voucher_date: Set(voucher_date),
            document_type: Set(document_type.clone()),
            description: Set(request.description),
            reference_table: Set(table.clone()),
            reference_id: Set(reference_id.clone()),
            fiscal_period_id: Set(period_uuid),
            reverses_voucher_number: Set(reverses.map(str::to_string)),
            total_amount: Set(totals.debit),
            created_by: Set(request.actor.into_inner()),
            created_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(|e| match reverses {
            Some(original) if is_unique_violation(&e) && !caller_numbered => LedgerError::VoucherAlreadyReversed {
                voucher: original.to_string(),
                reversal: voucher_number.clone(),
            },
            _ if is_unique_violation(&e) => LedgerError::DuplicateVoucherNumber(voucher_number.clone()),
            _ => db_err(e),
        })?;

        let entries: Vec<ledger_entries::ActiveModel> = request
            .lines
            .iter()
            .map(|line| ledger_entries::ActiveModel {
                id: Set(LedgerEntryId::new().into_inner()),
                voucher_number: Set(voucher_number.clone()),
                account_code: Set(line.account_code.clone()),
                entry_type: Set(line.entry_type.into()),
                amount: Set(line.amount),
                memo: Set(line.memo.clone()),
                reference_table: Set(table.clone()),
                reference_id: Set(reference_id.clone()),
                voucher_date: Set(voucher_date),
                fiscal_period_id: Set(period_uuid),
                is_closed: Set(false),
                created_by: Set(request.actor.into_inner()),
                created_at: Set(now),
            })
            .collect();
        ledger_entries::Entity::insert_many(entries)
            .exec_without_returning(conn)
            .await
            .map_err(db_err)?;

        info!(
            voucher = %voucher_number,
            document_type = %document_type,
            lines = request.lines.len(),
            total = %totals.debit,
            date = %voucher_date,
            "Voucher posted"
        );

        Ok(PostedVoucher {
            voucher_number,
            voucher_date,
            document_type,
            fiscal_period_id,
            totals,
            line_count: request.lines.len(),
            reverses: reverses.map(str::to_string),
        })
    }

    async fn load_accounts<C: ConnectionTrait>(
        conn: &C,
        request: &PostingRequest,
    ) -> Result<HashMap<String, AccountInfo>, LedgerError> {
        let mut codes: Vec<&str> = request.lines.iter().map(|l| l.account_code.as_str()).collect();
        codes.sort_unstable();
        codes.dedup();

        let rows = accounts::Entity::find()
            .filter(accounts::Column::Code.is_in(codes))
            .all(conn)
            .await
            .map_err(db_err)?;
        Ok(rows.into_iter().map(|a| (a.code.clone(), a.info())).collect())
    }

    async fn period_containing<C: ConnectionTrait>(
        conn: &C,
        date: NaiveDate,
    ) -> Result<Option<fiscal_periods::Model>, LedgerError> {
        let query = fiscal_periods::Entity::find()
            .filter(fiscal_periods::Column::StartDate.lte(date))
            .filter(fiscal_periods::Column::EndDate.gte(date))
            .order_by_asc(fiscal_periods::Column::StartDate);
        lock_shared(query, conn).one(conn).await.map_err(db_err)
    }

    /// Reverses a voucher with a mirror voucher dated today.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound`, `VoucherAlreadyReversed`,
    /// `ReversalOfReversal`, or any posting error for the mirror voucher.
    pub async fn reverse(
        &self,
        voucher_number: &str,
        reason: &str,
        actor: UserId,
    ) -> Result<PostedVoucher, LedgerError> {
        self.reverse_on(voucher_number, reason, actor, Utc::now().date_naive())
            .await
    }

    /// [`Self::reverse`] with an explicit reversal date.
    ///
    /// # Errors
    ///
    /// See [`Self::reverse`].
    pub async fn reverse_on(
        &self,
        voucher_number: &str,
        reason: &str,
        actor: UserId,
        reversal_date: NaiveDate,
    ) -> Result<PostedVoucher, LedgerError> {
        self.reverse_committed(voucher_number, reason, actor, reversal_date)
            .await
            .inspect(|posted| {
                info!(voucher = %voucher_number, reversal = %posted.voucher_number, "Voucher reversed");
            })
            .inspect_err(|e| {
                warn!(voucher = %voucher_number, error = %e, code = e.error_code(), "Reversal rejected");
            })
    }

    async fn reverse_committed(
        &self,
        voucher_number: &str,
        reason: &str,
        actor: UserId,
        reversal_date: NaiveDate,
    ) -> Result<PostedVoucher, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let original = Self::load_voucher(&txn, voucher_number).await?;
        ReversalService::check_reversible(
            voucher_number,
            original.voucher.reverses_voucher_number.as_deref(),
            original.reversed_by.as_deref(),
        )?;

        let lines: Vec<_> = original.entries.iter().map(ledger_entries::Model::to_line).collect();
        let request = PostingRequest::new(
            ReversalService::mirror_lines(voucher_number, &lines, reason),
            BusinessReference {
                table: original.voucher.reference_table.clone(),
                id: original.voucher.reference_id.clone(),
            },
            actor,
        )
        .dated(reversal_date)
        .with_document_type(self.policy.reversal_document_type.clone())
        .with_description(ReversalService::description(voucher_number, reason));

        let posted = self
            .write_voucher(&txn, request, PostingGuard::Regular, Some(voucher_number))
            .await?;
        txn.commit().await.map_err(db_err)?;
        Ok(posted)
    }

    /// Balance of an account over entries dated on or before `as_of`.
    ///
    /// Debits minus credits for asset and expense accounts, credits minus
    /// debits otherwise.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn account_balance(&self, account_code: &str, as_of: NaiveDate) -> Result<Decimal, LedgerError> {
        Ok(self.account_totals(account_code, as_of).await?.balance())
    }

    /// Debit and credit totals behind [`Self::account_balance`].
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn account_totals(&self, account_code: &str, as_of: NaiveDate) -> Result<AccountBalance, LedgerError> {
        let account = accounts::Entity::find_by_id(account_code.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::AccountNotFound(account_code.to_string()))?;

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountCode.eq(account_code))
            .filter(ledger_entries::Column::VoucherDate.lte(as_of))
            .all(&self.db)
            .await
            .map_err(db_err)?;

        Ok(AccountBalance::new(account_code, account.account_type.into())
            .with_entries(entries.into_iter().map(|e| (e.entry_type.into(), e.amount))))
    }

    /// Loads a voucher with its entries.
    ///
    /// # Errors
    ///
    /// Returns `VoucherNotFound` or a database error.
    pub async fn find_voucher(&self, voucher_number: &str) -> Result<VoucherWithEntries, LedgerError> {
        Self::load_voucher(&self.db, voucher_number).await
    }

    async fn load_voucher<C: ConnectionTrait>(
        conn: &C,
        voucher_number: &str,
    ) -> Result<VoucherWithEntries, LedgerError> {
        let voucher = vouchers::Entity::find_by_id(voucher_number.to_string())
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::VoucherNotFound(voucher_number.to_string()))?;

        let entries = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::VoucherNumber.eq(voucher_number))
            .order_by_asc(ledger_entries::Column::Id)
            .all(conn)
            .await
            .map_err(db_err)?;

        let reversed_by = vouchers::Entity::find()
            .filter(vouchers::Column::ReversesVoucherNumber.eq(voucher_number))
            .one(conn)
            .await
            .map_err(db_err)?
            .map(|v| v.voucher_number);

        Ok(VoucherWithEntries {
            voucher,
            entries,
            reversed_by,
        })
    }

    /// Vouchers dated within `[from, to]`, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_vouchers(&self, from: NaiveDate, to: NaiveDate) -> Result<Vec<vouchers::Model>, LedgerError> {
        vouchers::Entity::find()
            .filter(vouchers::Column::VoucherDate.between(from, to))
            .order_by_asc(vouchers::Column::VoucherDate)
            .order_by_asc(vouchers::Column::VoucherNumber)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}
