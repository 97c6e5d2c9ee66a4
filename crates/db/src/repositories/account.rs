//! Chart of accounts repository.

use sea_orm::{
    ActiveModelTrait, ColumnTrait, ConnectionTrait, DatabaseConnection, DbErr, EntityTrait,
    PaginatorTrait, QueryFilter, QueryOrder, Set,
};
use tally_core::chart::{AccountType, ChartError, ChartService, StandardAccount, StandardAccountMap};
use tracing::info;

use crate::entities::{accounts, ledger_entries};

fn db_err(e: DbErr) -> ChartError {
    ChartError::Database(e.to_string())
}

/// Input for creating an account.
#[derive(Debug, Clone)]
pub struct NewAccount {
    /// Unique account code.
    pub code: String,
    /// Display name.
    pub name: String,
    /// Account type.
    pub account_type: AccountType,
    /// Parent account code; must share the type.
    pub parent_code: Option<String>,
}

impl NewAccount {
    /// Top-level account.
    pub fn new(code: impl Into<String>, name: impl Into<String>, account_type: AccountType) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            account_type,
            parent_code: None,
        }
    }

    /// Places the account under `parent_code`.
    #[must_use]
    pub fn under(mut self, parent_code: impl Into<String>) -> Self {
        self.parent_code = Some(parent_code.into());
        self
    }
}

/// Account repository.
#[derive(Debug, Clone)]
pub struct AccountRepository {
    db: DatabaseConnection,
    standard: StandardAccountMap,
}

impl AccountRepository {
    /// Creates a new account repository.
    #[must_use]
    pub const fn new(db: DatabaseConnection, standard: StandardAccountMap) -> Self {
        Self { db, standard }
    }

    /// Role to code mapping in effect.
    #[must_use]
    pub const fn standard_accounts(&self) -> &StandardAccountMap {
        &self.standard
    }

    /// Creates an account.
    ///
    /// # Errors
    ///
    /// Returns an error if the code is taken or invalid, or if the parent is
    /// missing or of another type.
    pub async fn create_account(&self, input: NewAccount) -> Result<accounts::Model, ChartError> {
        Self::create_in(&self.db, input).await
    }

    async fn create_in<C: ConnectionTrait>(conn: &C, input: NewAccount) -> Result<accounts::Model, ChartError> {
        let existing = accounts::Entity::find_by_id(input.code.clone())
            .one(conn)
            .await
            .map_err(db_err)?;
        if existing.is_some() {
            return Err(ChartError::DuplicateCode(input.code));
        }

        let parent = match input.parent_code.as_deref() {
            Some(parent_code) => accounts::Entity::find_by_id(parent_code.to_string())
                .one(conn)
                .await
                .map_err(db_err)?,
            None => None,
        };
        ChartService::validate_new_account(
            &input.code,
            input.account_type,
            input.parent_code.as_deref(),
            parent.as_ref().map(accounts::Model::info).as_ref(),
        )?;

        let now = chrono::Utc::now().into();
        let account = accounts::ActiveModel {
            code: Set(input.code),
            name: Set(input.name),
            account_type: Set(input.account_type.into()),
            parent_code: Set(input.parent_code),
            is_active: Set(true),
            created_at: Set(now),
            updated_at: Set(now),
        }
        .insert(conn)
        .await
        .map_err(db_err)?;

        info!(account = %account.code, account_type = %input.account_type, "Account created");
        Ok(account)
    }

    /// Finds an account by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn find_account(&self, code: &str) -> Result<Option<accounts::Model>, ChartError> {
        accounts::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)
    }

    /// Lists every account ordered by code.
    ///
    /// # Errors
    ///
    /// Returns an error if the database query fails.
    pub async fn list_accounts(&self) -> Result<Vec<accounts::Model>, ChartError> {
        accounts::Entity::find()
            .order_by_asc(accounts::Column::Code)
            .all(&self.db)
            .await
            .map_err(db_err)
    }

    /// Stops an account from accepting postings.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn deactivate_account(&self, code: &str) -> Result<accounts::Model, ChartError> {
        self.set_active(code, false).await
    }

    /// Lets a deactivated account accept postings again.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound` or a database error.
    pub async fn reactivate_account(&self, code: &str) -> Result<accounts::Model, ChartError> {
        self.set_active(code, true).await
    }

    async fn set_active(&self, code: &str, is_active: bool) -> Result<accounts::Model, ChartError> {
        let account = accounts::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ChartError::AccountNotFound(code.to_string()))?;

        let mut active: accounts::ActiveModel = account.into();
        active.is_active = Set(is_active);
        active.updated_at = Set(chrono::Utc::now().into());
        let account = active.update(&self.db).await.map_err(db_err)?;

        info!(account = %code, is_active, "Account status changed");
        Ok(account)
    }

    /// Hard-deletes an account that has never been posted to.
    ///
    /// # Errors
    ///
    /// Returns `AccountNotFound`, or `HasLedgerHistory` when entries exist.
    pub async fn remove_account(&self, code: &str) -> Result<(), ChartError> {
        let account = accounts::Entity::find_by_id(code.to_string())
            .one(&self.db)
            .await
            .map_err(db_err)?
            .ok_or_else(|| ChartError::AccountNotFound(code.to_string()))?;

        let entry_count = ledger_entries::Entity::find()
            .filter(ledger_entries::Column::AccountCode.eq(code))
            .count(&self.db)
            .await
            .map_err(db_err)?;
        ChartService::ensure_removable(code, entry_count)?;

        accounts::Entity::delete_by_id(account.code)
            .exec(&self.db)
            .await
            .map_err(db_err)?;

        info!(account = %code, "Account removed");
        Ok(())
    }

    /// Resolves a standard role to a postable account code.
    ///
    /// # Errors
    ///
    /// Returns an error if the mapped account is missing, inactive, or of the
    /// wrong type.
    pub async fn resolve_standard_account(&self, role: StandardAccount) -> Result<String, ChartError> {
        self.resolve_in(&self.db, role).await
    }

    /// [`Self::resolve_standard_account`] on an existing connection or transaction.
    ///
    /// # Errors
    ///
    /// See [`Self::resolve_standard_account`].
    pub async fn resolve_in<C: ConnectionTrait>(
        &self,
        conn: &C,
        role: StandardAccount,
    ) -> Result<String, ChartError> {
        let code = self.standard.code(role);
        let account = accounts::Entity::find_by_id(code.to_string())
            .one(conn)
            .await
            .map_err(db_err)?;
        ChartService::validate_role_account(role, code, account.map(|a| a.info()).as_ref())?;
        Ok(code.to_string())
    }

    /// Creates every standard role's account that does not exist yet.
    ///
    /// Returns the codes created.
    ///
    /// # Errors
    ///
    /// Returns an error if a database operation fails.
    pub async fn seed_standard_chart(&self) -> Result<Vec<String>, ChartError> {
        let mut created = Vec::new();
        for (role, code) in self.standard.iter() {
            let existing = accounts::Entity::find_by_id(code.to_string())
                .one(&self.db)
                .await
                .map_err(db_err)?;
            if existing.is_some() {
                continue;
            }
            let account = Self::create_in(
                &self.db,
                NewAccount::new(code, role.default_name(), role.account_type()),
            )
            .await?;
            created.push(account.code);
        }
        Ok(created)
    }
}
