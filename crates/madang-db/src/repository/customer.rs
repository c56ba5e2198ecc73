//! # Customer Repository
//!
//! Customer directory search, CRUD and the login lookup.

use madang_core::listing::{CustomerFilter, CUSTOMERS};
use madang_core::query::{Listing, SqlValue, Window};
use madang_core::{Customer, CustomerDraft, Role};
use tracing::{debug, info};

use crate::engine::QueryRunner;
use crate::error::{DbError, DbResult};

const SELECT_CUSTOMER: &str =
    "SELECT custid, name, address, phone, role FROM Customer WHERE custid = ?";

/// Trims optional text, storing blank input as NULL.
fn optional_text(value: Option<&str>) -> SqlValue {
    match value.map(str::trim).filter(|v| !v.is_empty()) {
        Some(text) => SqlValue::from(text),
        None => SqlValue::Null,
    }
}

/// Repository for customer database operations.
#[derive(Debug, Clone)]
pub struct CustomerRepository {
    runner: QueryRunner,
}

impl CustomerRepository {
    /// Creates a new CustomerRepository.
    pub fn new(runner: QueryRunner) -> Self {
        CustomerRepository { runner }
    }

    /// Searches customers by name, phone and address substrings.
    pub async fn list(
        &self,
        filter: &CustomerFilter,
        sort_by: Option<&str>,
        direction: Option<&str>,
        window: Window,
    ) -> DbResult<Listing<Customer>> {
        let query = CUSTOMERS.query(filter, sort_by, direction);
        debug!(filter = ?filter, sort = %query.sort().order_by(), "Listing customers");
        self.runner.fetch_listing(&query, window).await
    }

    /// Gets a customer by id.
    pub async fn get(&self, custid: i64) -> DbResult<Customer> {
        self.runner
            .fetch_optional(SELECT_CUSTOMER, &[SqlValue::Int(custid)])
            .await?
            .ok_or_else(|| DbError::not_found("Customer", custid))
    }

    /// Looks up the customer a login request names.
    ///
    /// Identity is the customer id alone; there are no passwords.
    pub async fn login(&self, custid: i64) -> DbResult<Customer> {
        let customer = self.get(custid).await?;
        info!(custid, role = %customer.role, "Customer logged in");
        Ok(customer)
    }

    /// Number of registered customers.
    pub async fn count(&self) -> DbResult<i64> {
        let counts: Vec<i64> = self
            .runner
            .fetch_column("SELECT COUNT(*) FROM Customer", &[])
            .await?;
        Ok(counts.first().copied().unwrap_or(0))
    }

    /// Registers a customer with the `user` role.
    pub async fn create(&self, draft: &CustomerDraft) -> DbResult<Customer> {
        let result = self
            .runner
            .execute(
                "INSERT INTO Customer (name, address, phone, role) VALUES (?, ?, ?, ?)",
                &[
                    SqlValue::from(draft.name.trim()),
                    optional_text(draft.address.as_deref()),
                    optional_text(draft.phone.as_deref()),
                    SqlValue::from(Role::User.as_str()),
                ],
            )
            .await?;

        let custid = result.last_insert_rowid();
        info!(custid, "Customer created");
        self.get(custid).await
    }

    /// Replaces a customer's contact details. The role is left unchanged.
    pub async fn update(&self, custid: i64, draft: &CustomerDraft) -> DbResult<Customer> {
        let result = self
            .runner
            .execute(
                "UPDATE Customer SET name = ?, address = ?, phone = ? WHERE custid = ?",
                &[
                    SqlValue::from(draft.name.trim()),
                    optional_text(draft.address.as_deref()),
                    optional_text(draft.phone.as_deref()),
                    SqlValue::Int(custid),
                ],
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", custid));
        }

        info!(custid, "Customer updated");
        self.get(custid).await
    }

    /// Changes a customer's role.
    pub async fn set_role(&self, custid: i64, role: Role) -> DbResult<()> {
        let result = self
            .runner
            .execute(
                "UPDATE Customer SET role = ? WHERE custid = ?",
                &[SqlValue::from(role.as_str()), SqlValue::Int(custid)],
            )
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", custid));
        }

        info!(custid, role = %role, "Customer role changed");
        Ok(())
    }

    /// Removes a customer.
    ///
    /// Fails with [`DbError::ForeignKeyViolation`] while orders reference it.
    pub async fn delete(&self, custid: i64) -> DbResult<()> {
        let result = self
            .runner
            .execute("DELETE FROM Customer WHERE custid = ?", &[SqlValue::Int(custid)])
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Customer", custid));
        }

        info!(custid, "Customer deleted");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use crate::sample;
    use madang_core::PageSpec;

    async fn sample_db() -> Database {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        sample::load(&db).await.unwrap();
        db
    }

    #[tokio::test]
    async fn test_search_by_address() {
        let db = sample_db().await;
        let filter = CustomerFilter {
            address: Some("대한민국".into()),
            ..Default::default()
        };
        let listing = db
            .customers()
            .list(&filter, Some("custid"), Some("desc"), Window::All)
            .await
            .unwrap();
        let ids: Vec<i64> = listing.items().iter().map(|c| c.custid).collect();
        assert_eq!(ids, vec![5, 3, 2]);
    }

    #[tokio::test]
    async fn test_paged_customers() {
        let db = sample_db().await;
        let listing = db
            .customers()
            .list(&CustomerFilter::default(), None, None, Window::Page(PageSpec::new(1, 2)))
            .await
            .unwrap();
        match listing {
            Listing::Page(page) => {
                assert_eq!(page.total_items, 5);
                assert_eq!(page.total_pages, 3);
                assert_eq!(page.items.len(), 2);
                assert!(page.has_next);
                assert!(!page.has_previous);
            }
            Listing::All(_) => panic!("expected a page"),
        }
    }

    #[tokio::test]
    async fn test_create_gets_user_role() {
        let db = sample_db().await;
        let customer = db
            .customers()
            .create(&CustomerDraft {
                name: "손흥민".to_string(),
                address: Some("영국 런던".to_string()),
                phone: Some("  ".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(customer.custid, 6);
        assert_eq!(customer.role, Role::User);
        assert_eq!(customer.phone, None);
    }

    #[tokio::test]
    async fn test_update_keeps_role() {
        let db = sample_db().await;
        let repo = db.customers();
        repo.set_role(2, Role::Manager).await.unwrap();
        let updated = repo
            .update(
                2,
                &CustomerDraft {
                    name: "김연아".to_string(),
                    address: Some("대한민국 부산".to_string()),
                    phone: Some("000-6000-0002".to_string()),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.address.as_deref(), Some("대한민국 부산"));
        assert_eq!(updated.role, Role::Manager);
    }

    #[tokio::test]
    async fn test_login_unknown_customer() {
        let db = sample_db().await;
        assert!(matches!(
            db.customers().login(77).await,
            Err(DbError::NotFound { .. })
        ));
        assert_eq!(db.customers().login(1).await.unwrap().role, Role::Admin);
    }

    #[tokio::test]
    async fn test_delete_customer_with_orders_is_conflict() {
        let db = sample_db().await;
        assert!(matches!(
            db.customers().delete(1).await,
            Err(DbError::ForeignKeyViolation { .. })
        ));
        // 박세리 (5) has no orders.
        db.customers().delete(5).await.unwrap();
        assert_eq!(db.customers().count().await.unwrap(), 4);
    }
}
