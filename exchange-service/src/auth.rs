//! Account authentication and the account-name -> compact-index map.
//!
//! Authentication is only enforced when an accounts file was supplied; the
//! API key is read from `X-Starfighter-Authorization` with a legacy
//! fallback to `X-Stockfighter-Authorization`. The account index is a
//! process-wide, insertion-ordered map capped at `MAX_ACCOUNTS`.

use std::collections::HashMap;
use std::sync::Mutex;

use axum::http::HeaderMap;

use crate::error::ApiError;

const MAX_ACCOUNTS: usize = 2048;

/// Process-wide account name -> API key table, loaded once from the
/// `--accounts` file. Empty means authentication is disabled entirely.
#[derive(Debug, Default)]
pub struct AuthStore {
    keys: HashMap<String, String>,
}

impl AuthStore {
    pub fn empty() -> Self {
        Self { keys: HashMap::new() }
    }

    pub fn from_json(raw: &str) -> Result<Self, serde_json::Error> {
        let keys: HashMap<String, String> = serde_json::from_str(raw)?;
        Ok(Self { keys })
    }

    pub fn is_enabled(&self) -> bool {
        !self.keys.is_empty()
    }

    /// Checks that `account` is known and its key matches `headers`.
    /// `weird_fail` selects the error returned when the account is
    /// unknown: the order-lookup paths (STATUS/CANCEL) treat that as the
    /// "impossible" `AuthWeirdfail` case since the account was just read
    /// back from a resting order, while order submission treats it as an
    /// ordinary `AuthFailure`.
    pub fn check(&self, account: &str, headers: &HeaderMap, weird_fail: bool) -> Result<(), ApiError> {
        if !self.is_enabled() {
            return Ok(());
        }

        let api_key = api_key_from_headers(headers).ok_or(ApiError::NoAuthError)?;

        match self.keys.get(account) {
            None if weird_fail => Err(ApiError::AuthWeirdfail),
            None => Err(ApiError::AuthFailure),
            Some(expected) if expected == api_key => Ok(()),
            Some(_) => Err(ApiError::AuthFailure),
        }
    }
}

fn api_key_from_headers(headers: &HeaderMap) -> Option<&str> {
    headers
        .get("X-Starfighter-Authorization")
        .or_else(|| headers.get("X-Stockfighter-Authorization"))
        .and_then(|v| v.to_str().ok())
}

/// Assigns each account name a small, stable integer the first time it is
/// seen, capped at `MAX_ACCOUNTS`. Kept per-process rather than per-book
/// (see DESIGN.md's Open Question (a)).
#[derive(Debug, Default)]
pub struct AccountIndex {
    ids: Mutex<HashMap<String, usize>>,
}

impl AccountIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn index_of(&self, account: &str) -> Result<usize, ApiError> {
        let mut ids = self.ids.lock().unwrap();
        if let Some(&idx) = ids.get(account) {
            return Ok(idx);
        }
        if ids.len() >= MAX_ACCOUNTS {
            return Err(ApiError::TooManyAccounts);
        }
        let idx = ids.len();
        ids.insert(account.to_string(), idx);
        Ok(idx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn disabled_auth_always_passes() {
        let store = AuthStore::empty();
        assert!(store.check("anyone", &HeaderMap::new(), false).is_ok());
    }

    #[test]
    fn unknown_account_is_auth_failure_for_order_submission() {
        let store = AuthStore::from_json(r#"{"A": "key"}"#).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Starfighter-Authorization", "key".parse().unwrap());
        let err = store.check("B", &headers, false).unwrap_err();
        assert!(matches!(err, ApiError::AuthFailure));
    }

    #[test]
    fn unknown_account_is_weirdfail_for_status_and_cancel() {
        let store = AuthStore::from_json(r#"{"A": "key"}"#).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Starfighter-Authorization", "key".parse().unwrap());
        let err = store.check("B", &headers, true).unwrap_err();
        assert!(matches!(err, ApiError::AuthWeirdfail));
    }

    #[test]
    fn wrong_key_is_auth_failure() {
        let store = AuthStore::from_json(r#"{"A": "key"}"#).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Starfighter-Authorization", "wrong".parse().unwrap());
        assert!(matches!(store.check("A", &headers, false), Err(ApiError::AuthFailure)));
    }

    #[test]
    fn legacy_header_is_accepted() {
        let store = AuthStore::from_json(r#"{"A": "key"}"#).unwrap();
        let mut headers = HeaderMap::new();
        headers.insert("X-Stockfighter-Authorization", "key".parse().unwrap());
        assert!(store.check("A", &headers, false).is_ok());
    }

    #[test]
    fn missing_key_is_no_auth_error() {
        let store = AuthStore::from_json(r#"{"A": "key"}"#).unwrap();
        assert!(matches!(
            store.check("A", &HeaderMap::new(), false),
            Err(ApiError::NoAuthError)
        ));
    }

    #[test]
    fn account_index_is_stable_and_dense() {
        let index = AccountIndex::new();
        assert_eq!(index.index_of("A").unwrap(), 0);
        assert_eq!(index.index_of("B").unwrap(), 1);
        assert_eq!(index.index_of("A").unwrap(), 0);
    }
}
