use std::collections::HashMap;

use alloy::primitives::Address;

use crate::{Account, ChatStoreError};

/// Address -> account map. Accounts are created once and never change.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Registry {
    accounts: HashMap<Address, Account>,
}

impl Registry {
    pub fn contains(&self, address: &Address) -> bool {
        self.accounts.contains_key(address)
    }

    pub fn get(&self, address: &Address) -> Option<&Account> {
        self.accounts.get(address)
    }

    pub fn username(&self, address: &Address) -> Result<&str, ChatStoreError> {
        match self.accounts.get(address) {
            Some(account) => Ok(&account.display_name),
            None => Err(ChatStoreError::UnknownUserError(*address)),
        }
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub(crate) fn check_new_account(
        &self,
        caller: &Address,
        display_name: &str,
    ) -> Result<(), ChatStoreError> {
        if display_name.is_empty() {
            return Err(ChatStoreError::EmptyUsernameError);
        }
        if self.contains(caller) {
            return Err(ChatStoreError::AlreadyExistedUserError(*caller));
        }
        Ok(())
    }

    /// Callers must have run [`Registry::check_new_account`] first.
    pub(crate) fn insert(&mut self, account: Account) {
        let res = self.accounts.insert(account.owner, account);
        debug_assert!(res.is_none());
    }
}
