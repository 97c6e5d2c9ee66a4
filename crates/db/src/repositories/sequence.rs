//! Document sequence repository.
//!
//! Counters are bumped with a single `UPDATE ... SET counter = counter + 1`
//! inside the caller's transaction, so a rolled-back posting rolls the number
//! back with it. Document type keys are stored upper-case.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    QueryFilter, QueryOrder, Set, TransactionTrait,
    sea_query::{Expr, OnConflict},
};
use tally_core::ledger::LedgerError;
use tally_core::sequence::{
    DEFAULT_TEMPLATE, default_prefix, format_voucher_number, normalize_document_type,
    validate_template,
};
use tracing::{debug, info};

use crate::entities::{document_sequences, vouchers};

fn db_err(e: DbErr) -> LedgerError {
    LedgerError::Database(e.to_string())
}

/// Counter values tried before giving up on numbers already taken by
/// caller-numbered vouchers.
const MAX_NUMBER_ATTEMPTS: usize = 256;

/// Document sequence repository.
#[derive(Debug, Clone)]
pub struct SequenceRepository {
    db: DatabaseConnection,
}

impl SequenceRepository {
    /// Creates a new sequence repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    /// Issues the next voucher number for `document_type` in its own transaction.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocumentType` or a database error.
    pub async fn next_voucher_number(&self, document_type: &str) -> Result<String, LedgerError> {
        let txn = self.db.begin().await.map_err(db_err)?;
        let number = Self::next_in(&txn, document_type).await?;
        txn.commit().await.map_err(db_err)?;
        Ok(number)
    }

    /// Issues the next voucher number inside an existing transaction.
    ///
    /// Creates the sequence with counter 0 on first use. Concurrent callers
    /// serialize on the row lock taken by the increment. Numbers already
    /// used by a voucher are skipped.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocumentType`, `DuplicateVoucherNumber` when no free
    /// number turns up, or a database error.
    pub async fn next_in<C: ConnectionTrait>(conn: &C, document_type: &str) -> Result<String, LedgerError> {
        let document_type = normalize_document_type(document_type)?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        document_sequences::Entity::insert(document_sequences::ActiveModel {
            document_type: Set(document_type.clone()),
            prefix: Set(default_prefix(&document_type)),
            counter: Set(0),
            format_template: Set(DEFAULT_TEMPLATE.to_string()),
            updated_at: Set(now),
        })
        .on_conflict(
            OnConflict::column(document_sequences::Column::DocumentType)
                .do_nothing()
                .to_owned(),
        )
        .exec_without_returning(conn)
        .await
        .map_err(db_err)?;

        let mut number = String::new();
        for _ in 0..MAX_NUMBER_ATTEMPTS {
            let sequence = Self::bump(conn, &document_type, now).await?;
            number = format_voucher_number(&sequence.format_template, &sequence.prefix, sequence.counter);

            let taken = vouchers::Entity::find_by_id(number.clone())
                .one(conn)
                .await
                .map_err(db_err)?
                .is_some();
            if !taken {
                debug!(document_type = %document_type, counter = sequence.counter, voucher = %number, "Voucher number issued");
                return Ok(number);
            }
            debug!(document_type = %document_type, voucher = %number, "Voucher number already used, skipping");
        }

        Err(LedgerError::DuplicateVoucherNumber(number))
    }

    async fn bump<C: ConnectionTrait>(
        conn: &C,
        document_type: &str,
        now: sea_orm::prelude::DateTimeWithTimeZone,
    ) -> Result<document_sequences::Model, LedgerError> {
        document_sequences::Entity::update_many()
            .col_expr(
                document_sequences::Column::Counter,
                Expr::col(document_sequences::Column::Counter).add(1),
            )
            .col_expr(document_sequences::Column::UpdatedAt, Expr::value(now))
            .filter(document_sequences::Column::DocumentType.eq(document_type))
            .exec(conn)
            .await
            .map_err(db_err)?;

        document_sequences::Entity::find_by_id(document_type.to_string())
            .one(conn)
            .await
            .map_err(db_err)?
            .ok_or_else(|| LedgerError::InvalidDocumentType(document_type.to_string()))
    }

    /// Sets the prefix and template of a sequence, creating it if missing.
    ///
    /// The counter is left as is.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocumentType`, `InvalidSequenceTemplate`, or a
    /// database error.
    pub async fn configure(
        &self,
        document_type: &str,
        prefix: &str,
        template: &str,
    ) -> Result<document_sequences::Model, LedgerError> {
        let document_type = normalize_document_type(document_type)?;
        validate_template(template)?;
        let now: sea_orm::prelude::DateTimeWithTimeZone = chrono::Utc::now().into();

        let existing = document_sequences::Entity::find_by_id(document_type.clone())
            .one(&self.db)
            .await
            .map_err(db_err)?;

        let sequence = match existing {
            Some(sequence) => {
                let mut active: document_sequences::ActiveModel = sequence.into();
                active.prefix = Set(prefix.to_string());
                active.format_template = Set(template.to_string());
                active.updated_at = Set(now);
                active.update(&self.db).await.map_err(db_err)?
            }
            None => document_sequences::ActiveModel {
                document_type: Set(document_type.clone()),
                prefix: Set(prefix.to_string()),
                counter: Set(0),
                format_template: Set(template.to_string()),
                updated_at: Set(now),
            }
            .insert(&self.db)
            .await
            .map_err(db_err)?,
        };

        info!(document_type = %document_type, prefix, template, "Document sequence configured");
        Ok(sequence)
    }

    /// Current state of a sequence.
    ///
    /// # Errors
    ///
    /// Returns `InvalidDocumentType` or a database error.
    pub async fn find_sequence(&self, document_type: &str) -> Result<Option<document_sequences::Model>, LedgerError> {
        document_sequences::Entity::find_by_id(normalize_document_type(document_type)?)
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Every sequence ordered by document type.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_sequences(&self) -> Result<Vec<document_sequences::Model>, LedgerError> {
        document_sequences::Entity::find()
            .order_by_asc(document_sequences::Column::DocumentType)
            .all(&self.db)
            .await
            .map_err(db_err)
    }
}
