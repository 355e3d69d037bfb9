use std::sync::Arc;

use tracing::info;

use social_db::AccountStore;
use social_db::models::AccountRow;
use social_types::api::AccountRequest;
use social_types::models::Account;

use crate::error::ServiceError;

const MIN_PASSWORD_CHARS: usize = 4;

/// Registration and login.
pub struct AccountService {
    store: Arc<dyn AccountStore>,
}

impl AccountService {
    pub fn new(store: Arc<dyn AccountStore>) -> Self {
        Self { store }
    }

    pub fn create_account(&self, candidate: &AccountRequest) -> Result<Account, ServiceError> {
        if candidate.username.is_empty() {
            return Err(ServiceError::Validation("username is empty"));
        }
        if candidate.password.chars().count() < MIN_PASSWORD_CHARS {
            return Err(ServiceError::Validation("password is shorter than 4 characters"));
        }

        if self.store.find_account_by_username(&candidate.username)?.is_some() {
            return Err(ServiceError::DuplicateUsername);
        }

        // A concurrent registration can still win between the lookup and the
        // insert; the unique constraint settles it.
        let row = self
            .store
            .insert_account(&candidate.username, &candidate.password)?
            .ok_or(ServiceError::DuplicateUsername)?;

        info!("Registered account {} ({})", row.account_id, row.username);
        Ok(account_from_row(row))
    }

    pub fn login_account(&self, credentials: &AccountRequest) -> Result<Account, ServiceError> {
        self.store
            .find_account_by_credentials(&credentials.username, &credentials.password)?
            .map(account_from_row)
            .ok_or(ServiceError::Unauthorized)
    }
}

fn account_from_row(row: AccountRow) -> Account {
    Account {
        account_id: row.account_id,
        username: row.username,
        password: row.password,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use social_db::Database;

    fn service() -> AccountService {
        AccountService::new(Arc::new(Database::open_in_memory().unwrap()))
    }

    fn request(username: &str, password: &str) -> AccountRequest {
        AccountRequest {
            username: username.to_string(),
            password: password.to_string(),
        }
    }

    #[test]
    fn register_returns_generated_id() {
        let svc = service();
        let account = svc.create_account(&request("ann", "pass")).unwrap();

        assert!(account.account_id > 0);
        assert_eq!(account.username, "ann");
        assert_eq!(account.password, "pass");
    }

    #[test]
    fn empty_username_is_rejected() {
        let err = service().create_account(&request("", "password")).unwrap_err();
        assert!(matches!(err, ServiceError::Validation(_)));
    }

    #[test]
    fn short_password_is_rejected() {
        let svc = service();
        for password in ["", "a", "abc"] {
            let err = svc.create_account(&request("ann", password)).unwrap_err();
            assert!(matches!(err, ServiceError::Validation(_)), "password {password:?}");
        }
        assert!(svc.create_account(&request("ann", "abcd")).is_ok());
    }

    #[test]
    fn second_registration_is_a_duplicate() {
        let svc = service();
        svc.create_account(&request("ann", "pass")).unwrap();

        let err = svc.create_account(&request("ann", "different")).unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername));
    }

    #[test]
    fn login_needs_exact_credentials() {
        let svc = service();
        let created = svc.create_account(&request("ann", "pass")).unwrap();

        assert_eq!(svc.login_account(&request("ann", "pass")).unwrap(), created);
        for (user, pass) in [("ann", "PASS"), ("ann", "pas"), ("bob", "pass"), ("", "")] {
            let err = svc.login_account(&request(user, pass)).unwrap_err();
            assert!(matches!(err, ServiceError::Unauthorized));
        }
    }

    /// Lookup says the name is free, but the insert loses the race.
    struct RacingStore;

    impl AccountStore for RacingStore {
        fn insert_account(&self, _: &str, _: &str) -> anyhow::Result<Option<AccountRow>> {
            Ok(None)
        }
        fn find_account_by_id(&self, _: i64) -> anyhow::Result<Option<AccountRow>> {
            Ok(None)
        }
        fn find_account_by_username(&self, _: &str) -> anyhow::Result<Option<AccountRow>> {
            Ok(None)
        }
        fn find_account_by_credentials(
            &self,
            _: &str,
            _: &str,
        ) -> anyhow::Result<Option<AccountRow>> {
            Ok(None)
        }
    }

    #[test]
    fn lost_insert_race_is_a_duplicate() {
        let svc = AccountService::new(Arc::new(RacingStore));
        let err = svc.create_account(&request("ann", "pass")).unwrap_err();
        assert!(matches!(err, ServiceError::DuplicateUsername));
    }
}
