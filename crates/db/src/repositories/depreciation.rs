//! Fixed asset depreciation repository.
//!
//! One straight-line charge per asset and period. The UNIQUE(asset, period)
//! index on `depreciation_records` backs the already-posted check when two
//! runs race.

use chrono::{NaiveDate, Utc};
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
};
use serde::Serialize;
use tally_core::chart::StandardAccount;
use tally_core::depreciation::{DepreciationError, DepreciationService};
use tally_core::ledger::{BusinessReference, PostingGuard, PostingRequest};
use tally_shared::LedgerConfig;
use tally_shared::types::{AssetId, DepreciationRecordId, FiscalPeriodId, UserId};
use tracing::{debug, info};

use super::account::AccountRepository;
use super::ledger::{LedgerRepository, is_unique_violation};
use crate::entities::{depreciation_records, fiscal_periods, fixed_assets};

fn db_err(e: DbErr) -> DepreciationError {
    DepreciationError::Database(e.to_string())
}

/// Input for registering an asset.
#[derive(Debug, Clone)]
pub struct NewAsset {
    /// Display name.
    pub name: String,
    /// Acquisition value; must be positive.
    pub acquisition_value: Decimal,
    /// Fraction of the value charged each month, in (0, 1].
    pub monthly_rate: Decimal,
    /// Acquisition date.
    pub acquired_on: NaiveDate,
}

impl NewAsset {
    /// Creates the input.
    pub fn new(
        name: impl Into<String>,
        acquisition_value: Decimal,
        monthly_rate: Decimal,
        acquired_on: NaiveDate,
    ) -> Self {
        Self {
            name: name.into(),
            acquisition_value,
            monthly_rate,
            acquired_on,
        }
    }
}

/// One posted depreciation charge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepreciationPosting {
    /// Asset charged.
    pub asset_id: AssetId,
    /// Amount charged this period.
    pub amount: Decimal,
    /// Accumulated depreciation after the charge.
    pub accumulated: Decimal,
    /// Acquisition value minus accumulated depreciation.
    pub book_value: Decimal,
    /// Voucher carrying the charge.
    pub voucher_number: String,
}

/// Summary of a monthly run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepreciationRun {
    /// Period depreciated.
    pub period_id: FiscalPeriodId,
    /// Charges posted by this run.
    pub posted: Vec<DepreciationPosting>,
    /// Assets already depreciated in the period.
    pub skipped_already_posted: usize,
    /// Assets with no book value left.
    pub skipped_fully_depreciated: usize,
    /// Assets acquired after the period end.
    pub skipped_not_acquired: usize,
}

impl DepreciationRun {
    /// Sum of the charges posted.
    #[must_use]
    pub fn total_amount(&self) -> Decimal {
        self.posted.iter().map(|p| p.amount).sum()
    }
}

enum AssetOutcome {
    Posted(DepreciationPosting),
    AlreadyPosted,
    NotYetAcquired,
    FullyDepreciated,
}

/// Account codes a charge posts to.
struct ChargeAccounts {
    expense: String,
    accumulated: String,
}

/// Depreciation repository.
#[derive(Debug, Clone)]
pub struct DepreciationRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
    accounts: AccountRepository,
    depreciation_document_type: String,
}

impl DepreciationRepository {
    /// Creates a new depreciation repository.
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
            depreciation_document_type: config.depreciation_document_type.clone(),
        }
    }

    /// Registers an active asset.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveValue`, `InvalidRate`, or a database error.
    pub async fn register_asset(&self, input: NewAsset) -> Result<fixed_assets::Model, DepreciationError> {
        DepreciationService::validate_asset(input.acquisition_value, input.monthly_rate)?;

        let asset = fixed_assets::ActiveModel {
            id: Set(AssetId::new().into_inner()),
            name: Set(input.name),
            acquisition_value: Set(input.acquisition_value),
            monthly_rate: Set(input.monthly_rate),
            acquired_on: Set(input.acquired_on),
            is_active: Set(true),
            created_at: Set(Utc::now().into()),
        }
        .insert(&self.db)
        .await
        .map_err(db_err)?;

        info!(asset_id = %asset.id, name = %asset.name, value = %asset.acquisition_value, "Fixed asset registered");
        Ok(asset)
    }

    /// Finds an asset by ID.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_asset(&self, id: AssetId) -> Result<Option<fixed_assets::Model>, DepreciationError> {
        fixed_assets::Entity::find_by_id(id.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Excludes an asset from future runs. Its records are kept.
    ///
    /// # Errors
    ///
    /// Returns `AssetNotFound` or a database error.
    pub async fn deactivate_asset(&self, id: AssetId) -> Result<fixed_assets::Model, DepreciationError> {
        let asset = self.find_asset(id).await?.ok_or(DepreciationError::AssetNotFound(id))?;
        let mut active: fixed_assets::ActiveModel = asset.into();
        active.is_active = Set(false);
        let asset = active.update(&self.db).await.map_err(db_err)?;

        info!(asset_id = %id, "Fixed asset deactivated");
        Ok(asset)
    }

    /// Depreciation records of an asset, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn asset_records(&self, id: AssetId) -> Result<Vec<depreciation_records::Model>, DepreciationError> {
        depreciation_records::Entity::find()
            .filter(depreciation_records::Column::AssetId.eq(id.into_inner()))
            .order_by_asc(depreciation_records::Column::RecordDate)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Depreciates every active asset for the period in one transaction.
    ///
    /// Assets already charged in the period are skipped, so running twice
    /// posts nothing the second time.
    ///
    /// # Errors
    ///
    /// Returns `PeriodNotFound`, a chart error for the depreciation roles,
    /// or the posting error of any charge; nothing is written on error.
    pub async fn run_monthly(
        &self,
        period_id: FiscalPeriodId,
        actor: UserId,
    ) -> Result<DepreciationRun, DepreciationError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let period = Self::load_period(&txn, period_id).await?;
        let codes = self.charge_accounts(&txn).await?;

        let assets = fixed_assets::Entity::find()
            .filter(fixed_assets::Column::IsActive.eq(true))
            .order_by_asc(fixed_assets::Column::AcquiredOn)
            .order_by_asc(fixed_assets::Column::Id)
            .all(&txn)
            .await
            .map_err(db_err)?;

        let mut run = DepreciationRun {
            period_id,
            posted: Vec::new(),
            skipped_already_posted: 0,
            skipped_fully_depreciated: 0,
            skipped_not_acquired: 0,
        };
        for asset in &assets {
            match self.depreciate_in(&txn, asset, &period, &codes, actor).await? {
                AssetOutcome::Posted(posting) => run.posted.push(posting),
                AssetOutcome::AlreadyPosted => run.skipped_already_posted += 1,
                AssetOutcome::FullyDepreciated => run.skipped_fully_depreciated += 1,
                AssetOutcome::NotYetAcquired => run.skipped_not_acquired += 1,
            }
        }
        txn.commit().await.map_err(db_err)?;

        info!(
            period_id = %period_id,
            posted = run.posted.len(),
            total = %run.total_amount(),
            already_posted = run.skipped_already_posted,
            fully_depreciated = run.skipped_fully_depreciated,
            not_acquired = run.skipped_not_acquired,
            "Monthly depreciation run"
        );
        Ok(run)
    }

    /// Depreciates a single asset for the period.
    ///
    /// # Errors
    ///
    /// Returns `AlreadyPosted` when the asset was charged in the period,
    /// `AssetNotFound`, `AssetInactive`, `PeriodNotFound`,
    /// `NotYetAcquired`, `FullyDepreciated`, or a posting error.
    pub async fn depreciate_asset(
        &self,
        asset_id: AssetId,
        period_id: FiscalPeriodId,
        actor: UserId,
    ) -> Result<DepreciationPosting, DepreciationError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let asset = fixed_assets::Entity::find_by_id(asset_id.into_inner())
            .one(&txn)
            .await
            .map_err(db_err)?
            .ok_or(DepreciationError::AssetNotFound(asset_id))?;
        if !asset.is_active {
            return Err(DepreciationError::AssetInactive(asset_id));
        }
        let period = Self::load_period(&txn, period_id).await?;
        let codes = self.charge_accounts(&txn).await?;

        let posting = match self.depreciate_in(&txn, &asset, &period, &codes, actor).await? {
            AssetOutcome::Posted(posting) => posting,
            AssetOutcome::AlreadyPosted => {
                return Err(DepreciationError::AlreadyPosted {
                    asset: asset_id,
                    period: period_id,
                });
            }
            AssetOutcome::NotYetAcquired => {
                return Err(DepreciationError::NotYetAcquired {
                    asset: asset_id,
                    acquired: asset.acquired_on,
                    period_end: period.end_date,
                });
            }
            AssetOutcome::FullyDepreciated => return Err(DepreciationError::FullyDepreciated(asset_id)),
        };
        txn.commit().await.map_err(db_err)?;
        Ok(posting)
    }

    async fn load_period<C: ConnectionTrait>(
        conn: &C,
        id: FiscalPeriodId,
    ) -> Result<fiscal_periods::Model, DepreciationError> {
        fiscal_periods::Entity::find_by_id(id.into_inner())
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or(DepreciationError::PeriodNotFound(id))
    }

    async fn charge_accounts<C: ConnectionTrait>(&self, conn: &C) -> Result<ChargeAccounts, DepreciationError> {
        Ok(ChargeAccounts {
            expense: self
                .accounts
                .resolve_in(conn, StandardAccount::DepreciationExpense)
                .await?,
            accumulated: self
                .accounts
                .resolve_in(conn, StandardAccount::AccumulatedDepreciation)
                .await?,
        })
    }

    async fn depreciate_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        asset: &fixed_assets::Model,
        period: &fiscal_periods::Model,
        codes: &ChargeAccounts,
        actor: UserId,
    ) -> Result<AssetOutcome, DepreciationError> {
        let asset_id = AssetId::from_uuid(asset.id);
        let period_id = FiscalPeriodId::from_uuid(period.id);

        let existing = depreciation_records::Entity::find()
            .filter(depreciation_records::Column::AssetId.eq(asset.id))
            .filter(depreciation_records::Column::FiscalPeriodId.eq(period.id))
            .one(conn)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            debug!(asset_id = %asset_id, period_id = %period_id, "Depreciation already posted");
            return Ok(AssetOutcome::AlreadyPosted);
        }
        if asset.acquired_on > period.end_date {
            return Ok(AssetOutcome::NotYetAcquired);
        }

        let accumulated: Decimal = depreciation_records::Entity::find()
            .filter(depreciation_records::Column::AssetId.eq(asset.id))
            .filter(depreciation_records::Column::RecordDate.lt(period.end_date))
            .all(conn)
            .await
            .map_err(db_err)?
            .iter()
            .map(|r| r.amount)
            .sum();
        let Some(charge) = DepreciationService::charge(asset.acquisition_value, asset.monthly_rate, accumulated)
        else {
            return Ok(AssetOutcome::FullyDepreciated);
        };

        let memo = format!("Depreciation {}", asset.name);
        let request = PostingRequest::new(
            DepreciationService::lines(charge.amount, &codes.expense, &codes.accumulated, &memo),
            BusinessReference::new("fixed_assets", asset.id.to_string()),
            actor,
        )
        .dated(period.end_date)
        .with_document_type(self.depreciation_document_type.clone())
        .with_description(format!("{memo} for {}", period.name))
        .in_period(period_id);
        let posted = self.ledger.post_in(conn, request, PostingGuard::Regular).await?;

        depreciation_records::ActiveModel {
            id: Set(DepreciationRecordId::new().into_inner()),
            asset_id: Set(asset.id),
            fiscal_period_id: Set(period.id),
            record_date: Set(period.end_date),
            amount: Set(charge.amount),
            accumulated: Set(charge.accumulated),
            book_value: Set(charge.book_value),
            voucher_number: Set(posted.voucher_number.clone()),
            created_by: Set(actor.into_inner()),
            created_at: Set(Utc::now().into()),
        }
        .insert(conn)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                DepreciationError::AlreadyPosted {
                    asset: asset_id,
                    period: period_id,
                }
            } else {
                db_err(e)
            }
        })?;

        info!(
            asset_id = %asset_id,
            period_id = %period_id,
            amount = %charge.amount,
            book_value = %charge.book_value,
            voucher = %posted.voucher_number,
            "Depreciation posted"
        );
        Ok(AssetOutcome::Posted(DepreciationPosting {
            asset_id,
            amount: charge.amount,
            accumulated: charge.accumulated,
            book_value: charge.book_value,
            voucher_number: posted.voucher_number,
        }))
    }
}
