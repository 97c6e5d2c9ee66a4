//! Inventory costing repository.
//!
//! Purchases append lots and move the product's weighted-average cost. Sales
//! draw lots oldest first; the drawn cost can be posted to COGS in the same
//! transaction.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait, sea_query::Expr,
};
use serde::Serialize;
use tally_core::chart::StandardAccount;
use tally_core::inventory::{
    FifoConsumption, FifoCosting, InventoryError, adjustment_lines, moving_average_cost,
    periodic_adjustment, sale_cost_lines, validate_purchase,
};
use tally_core::ledger::{BusinessReference, PostedVoucher, PostingGuard, PostingLine, PostingRequest};
use tally_shared::LedgerConfig;
use tally_shared::types::{InventoryLotId, ProductId, UserId, round_currency};
use tracing::{info, warn};

use super::account::AccountRepository;
use super::ledger::{LedgerRepository, lock_exclusive};
use crate::entities::{inventory_lots, product_costs};

fn db_err(e: DbErr) -> InventoryError {
    InventoryError::Database(e.to_string())
}

/// A purchase to record as a new lot.
#[derive(Debug, Clone)]
pub struct NewPurchase {
    /// Product bought.
    pub product_id: ProductId,
    /// Purchase document reference.
    pub purchase_reference: String,
    /// Units bought.
    pub quantity: Decimal,
    /// Cost per unit.
    pub unit_cost: Decimal,
    /// Invoice total; `quantity * unit_cost` when absent.
    pub total_cost: Option<Decimal>,
    /// Purchase date; orders lots for FIFO.
    pub purchased_on: NaiveDate,
}

impl NewPurchase {
    /// Purchase without an explicit invoice total.
    pub fn new(
        product_id: ProductId,
        purchase_reference: impl Into<String>,
        quantity: Decimal,
        unit_cost: Decimal,
        purchased_on: NaiveDate,
    ) -> Self {
        Self {
            product_id,
            purchase_reference: purchase_reference.into(),
            quantity,
            unit_cost,
            total_cost: None,
            purchased_on,
        }
    }

    /// Records the invoice total on the lot.
    #[must_use]
    pub const fn with_total_cost(mut self, total_cost: Decimal) -> Self {
        self.total_cost = Some(total_cost);
        self
    }
}

/// A sale whose cost is drawn FIFO and posted to COGS.
#[derive(Debug, Clone)]
pub struct SaleCost {
    /// Product sold.
    pub product_id: ProductId,
    /// Units sold.
    pub quantity: Decimal,
    /// Originating sale.
    pub reference: BusinessReference,
    /// Voucher date; today when absent.
    pub date: Option<NaiveDate>,
    /// User posting the sale.
    pub actor: UserId,
}

/// FIFO draw and the COGS voucher posted for it.
#[derive(Debug, Clone, Serialize)]
pub struct SaleCostOutcome {
    /// Lots drawn and the cost consumed.
    pub consumption: FifoConsumption,
    /// COGS voucher; `None` when the drawn cost is zero.
    pub voucher: Option<PostedVoucher>,
}

/// A period-end physical count.
#[derive(Debug, Clone)]
pub struct PeriodicCount {
    /// Units counted on the shelf.
    pub counted: Decimal,
    /// Units on the books.
    pub book: Decimal,
    /// Cost per unit used to value the difference.
    pub unit_cost: Decimal,
    /// Originating count document.
    pub reference: BusinessReference,
    /// Voucher date; today when absent.
    pub date: Option<NaiveDate>,
    /// User posting the adjustment.
    pub actor: UserId,
}

/// Inventory costing repository.
#[derive(Debug, Clone)]
pub struct InventoryRepository {
    db: DatabaseConnection,
    ledger: LedgerRepository,
    accounts: AccountRepository,
    cogs_document_type: String,
    adjustment_document_type: String,
}

impl InventoryRepository {
    /// Creates a new inventory repository.
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
            cogs_document_type: config.cogs_document_type.clone(),
            adjustment_document_type: config.adjustment_document_type.clone(),
        }
    }

    /// Appends a lot and updates the product's moving average cost.
    ///
    /// # Errors
    ///
    /// Returns `NonPositiveQuantity`, `NegativeUnitCost`, or a database error.
    pub async fn record_purchase(&self, input: NewPurchase) -> Result<inventory_lots::Model, InventoryError> {
        validate_purchase(input.quantity, input.unit_cost)?;
        let txn = self.db.begin().await.map_err(db_err)?;
        let now = chrono::Utc::now().into();

        let lot = inventory_lots::ActiveModel {
            id: Set(InventoryLotId::new().into_inner()),
            product_id: Set(input.product_id.into_inner()),
            purchase_reference: Set(input.purchase_reference),
            quantity: Set(input.quantity),
            remaining_quantity: Set(input.quantity),
            unit_cost: Set(input.unit_cost),
            total_cost: Set(input
                .total_cost
                .unwrap_or_else(|| round_currency(input.quantity * input.unit_cost))),
            purchased_on: Set(input.purchased_on),
            is_sold: Set(false),
            created_at: Set(now),
        }
        .insert(&txn)
        .await
        .map_err(db_err)?;

        let current = lock_exclusive(product_costs::Entity::find_by_id(lot.product_id), &txn)
            .one(&txn)
            .await
            .map_err(db_err)?;
        let cost = match current {
            Some(current) => {
                let average = moving_average_cost(
                    current.average_cost,
                    current.quantity_on_hand,
                    input.unit_cost,
                    input.quantity,
                );
                let on_hand = current.quantity_on_hand.max(Decimal::ZERO) + input.quantity;
                let mut active: product_costs::ActiveModel = current.into();
                active.average_cost = Set(average);
                active.quantity_on_hand = Set(on_hand);
                active.updated_at = Set(now);
                active.update(&txn).await.map_err(db_err)?
            }
            None => product_costs::ActiveModel {
                product_id: Set(lot.product_id),
                average_cost: Set(moving_average_cost(Decimal::ZERO, Decimal::ZERO, input.unit_cost, input.quantity)),
                quantity_on_hand: Set(input.quantity),
                updated_at: Set(now),
            }
            .insert(&txn)
            .await
            .map_err(db_err)?,
        };

        txn.commit().await.map_err(db_err)?;

        info!(
            product_id = %lot.product_id,
            lot_id = %lot.id,
            quantity = %lot.quantity,
            unit_cost = %lot.unit_cost,
            average_cost = %cost.average_cost,
            "Purchase recorded"
        );
        Ok(lot)
    }

    /// Draws `quantity` units from the product's lots, oldest first.
    ///
    /// # Errors
    ///
    /// Returns `Shortage` when the unsold lots hold less than `quantity`; no
    /// lot is touched in that case.
    pub async fn consume_fifo(&self, product: ProductId, quantity: Decimal) -> Result<FifoConsumption, InventoryError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let consumption = Self::consume_in(&txn, product, quantity).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(consumption)
    }

    /// [`Self::consume_fifo`] inside an existing transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::consume_fifo`].
    pub async fn consume_in<C: ConnectionTrait>(
        conn: &C,
        product: ProductId,
        quantity: Decimal,
    ) -> Result<FifoConsumption, InventoryError> {
        let query = inventory_lots::Entity::find()
            .filter(inventory_lots::Column::ProductId.eq(product.into_inner()))
            .filter(inventory_lots::Column::RemainingQuantity.gt(Decimal::ZERO))
            .order_by_asc(inventory_lots::Column::PurchasedOn)
            .order_by_asc(inventory_lots::Column::Id);
        let lots = lock_exclusive(query, conn).all(conn).await.map_err(db_err)?;

        let balances: Vec<_> = lots.iter().map(inventory_lots::Model::balance).collect();
        let consumption = FifoCosting::consume(product, &balances, quantity).inspect_err(|e| {
            warn!(product_id = %product, error = %e, code = e.error_code(), "FIFO consumption rejected");
        })?;

        for draw in &consumption.draws {
            inventory_lots::Entity::update_many()
                .col_expr(
                    inventory_lots::Column::RemainingQuantity,
                    Expr::value(draw.remaining_after),
                )
                .col_expr(inventory_lots::Column::IsSold, Expr::value(draw.exhausts_lot()))
                .filter(inventory_lots::Column::Id.eq(draw.lot_id.into_inner()))
                .exec(conn)
                .await
                .map_err(db_err)?;
        }

        if let Some(cost) = lock_exclusive(product_costs::Entity::find_by_id(product.into_inner()), conn)
            .one(conn)
            .await
            .map_err(db_err)?
        {
            let on_hand = cost.quantity_on_hand - consumption.quantity;
            let mut active: product_costs::ActiveModel = cost.into();
            active.quantity_on_hand = Set(on_hand);
            active.updated_at = Set(chrono::Utc::now().into());
            active.update(conn).await.map_err(db_err)?;
        }

        info!(
            product_id = %product,
            quantity = %consumption.quantity,
            cost = %consumption.cost,
            lots = consumption.draws.len(),
            "FIFO consumption"
        );
        Ok(consumption)
    }

    /// Draws the sold units FIFO and posts debit COGS / credit Inventory for
    /// their cost, in one transaction.
    ///
    /// # Errors
    ///
    /// Returns `Shortage`, a chart error for the COGS or Inventory role, or
    /// the posting error of the COGS voucher.
    pub async fn record_sale_cost(&self, sale: SaleCost) -> Result<SaleCostOutcome, InventoryError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let consumption = Self::consume_in(&txn, sale.product_id, sale.quantity).await?;

        let cost = round_currency(consumption.cost);
        let voucher = match self.resolve_lines(&txn, cost, sale_cost_lines).await? {
            Some(lines) => {
                let mut request = PostingRequest::new(lines, sale.reference, sale.actor)
                    .with_document_type(self.cogs_document_type.clone())
                    .with_description("Cost of goods sold");
                if let Some(date) = sale.date {
                    request = request.dated(date);
                }
                Some(self.ledger.post_in(&txn, request, PostingGuard::Regular).await?)
            }
            None => None,
        };

        txn.commit().await.map_err(db_err)?;
        Ok(SaleCostOutcome { consumption, voucher })
    }

    /// Posts the COGS adjustment for a physical count.
    ///
    /// Returns `None` when the count agrees with the books.
    ///
    /// # Errors
    ///
    /// Returns `NegativeCount` or `NegativeUnitCost`, a chart error, or the
    /// posting error of the adjustment voucher.
    pub async fn post_periodic_adjustment(
        &self,
        count: PeriodicCount,
    ) -> Result<Option<PostedVoucher>, InventoryError> {
        if count.counted.is_sign_negative() {
            return Err(InventoryError::NegativeCount(count.counted));
        }
        if count.book.is_sign_negative() {
            return Err(InventoryError::NegativeCount(count.book));
        }
        if count.unit_cost.is_sign_negative() {
            return Err(InventoryError::NegativeUnitCost(count.unit_cost));
        }

        let amount = round_currency(periodic_adjustment(count.counted, count.book, count.unit_cost));
        let txn = self.db.begin().await.map_err(db_err)?;
        let Some(lines) = self.resolve_lines(&txn, amount, adjustment_lines).await? else {
            return Ok(None);
        };

        let mut request = PostingRequest::new(lines, count.reference, count.actor)
            .with_document_type(self.adjustment_document_type.clone())
            .with_description(format!(
                "Stock count adjustment: counted {}, book {}",
                count.counted, count.book
            ));
        if let Some(date) = count.date {
            request = request.dated(date);
        }
        let posted = self.ledger.post_in(&txn, request, PostingGuard::Regular).await?;
        txn.commit().await.map_err(db_err)?;

        info!(voucher = %posted.voucher_number, amount = %amount, "Stock count adjustment posted");
        Ok(Some(posted))
    }

    async fn resolve_lines<C: ConnectionTrait>(
        &self,
        conn: &C,
        amount: Decimal,
        build: fn(Decimal, &str, &str) -> Option<Vec<PostingLine>>,
    ) -> Result<Option<Vec<PostingLine>>, InventoryError> {
        if amount.is_zero() {
            return Ok(None);
        }
        let cogs = self.accounts.resolve_in(conn, StandardAccount::Cogs).await?;
        let inventory = self.accounts.resolve_in(conn, StandardAccount::Inventory).await?;
        Ok(build(amount, &cogs, &inventory))
    }

    /// Current average cost and on-hand quantity.
    ///
    /// # Errors
    ///
    /// Returns `ProductNotFound` if nothing was ever purchased.
    pub async fn product_cost(&self, product: ProductId) -> Result<product_costs::Model, InventoryError> {
        product_costs::Entity::find_by_id(product.into_inner())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or(InventoryError::ProductNotFound(product))
    }

    /// Every lot of a product in FIFO order, sold ones included.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_lots(&self, product: ProductId) -> Result<Vec<inventory_lots::Model>, InventoryError> {
        inventory_lots::Entity::find()
            .filter(inventory_lots::Column::ProductId.eq(product.into_inner()))
            .order_by_asc(inventory_lots::Column::PurchasedOn)
            .order_by_asc(inventory_lots::Column::Id)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}
