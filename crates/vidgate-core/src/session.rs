//! Wallet session: the explicit context passed to every marketplace operation.
//!
//! A session owns the wallet provider, the ledger handle and the connected
//! account. Connecting and disconnecting are the only lifecycle events;
//! nothing is stored in module-level state.

use std::sync::Arc;

use async_trait::async_trait;

use crate::ledger::{Address, Ledger};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SessionError {
    /// No wallet provider is installed.
    #[error("no wallet provider is available")]
    WalletUnavailable,
    #[error("wallet is not connected")]
    NotConnected,
    #[error("wallet returned no accounts")]
    NoAccounts,
    /// The user declined the request in the wallet.
    #[error("wallet request denied: {0}")]
    Denied(String),
}

/// Browser-wallet style account provider.
#[async_trait]
pub trait Wallet: Send + Sync {
    /// Prompt for permission and return the authorized accounts.
    async fn request_accounts(&self) -> Result<Vec<Address>, SessionError>;

    /// Forget the permission granted by `request_accounts`.
    async fn revoke(&self) -> Result<(), SessionError>;
}

/// Wallet with a fixed account list.
#[derive(Debug, Clone, Default)]
pub struct StaticWallet {
    accounts: Vec<Address>,
}

impl StaticWallet {
    pub fn new(accounts: Vec<Address>) -> Self {
        Self { accounts }
    }
}

#[async_trait]
impl Wallet for StaticWallet {
    async fn request_accounts(&self) -> Result<Vec<Address>, SessionError> {
        Ok(self.accounts.clone())
    }

    async fn revoke(&self) -> Result<(), SessionError> {
        Ok(())
    }
}

pub struct Session {
    wallet: Option<Arc<dyn Wallet>>,
    ledger: Arc<dyn Ledger>,
    account: Option<Address>,
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("has_wallet", &self.wallet.is_some())
            .field("account", &self.account)
            .finish()
    }
}

impl Session {
    /// `wallet` is None when no provider is installed; read-only ledger
    /// calls still work.
    pub fn new(wallet: Option<Arc<dyn Wallet>>, ledger: Arc<dyn Ledger>) -> Self {
        Self {
            wallet,
            ledger,
            account: None,
        }
    }

    pub fn ledger(&self) -> &Arc<dyn Ledger> {
        &self.ledger
    }

    pub fn account(&self) -> Option<&Address> {
        self.account.as_ref()
    }

    pub fn is_connected(&self) -> bool {
        self.account.is_some()
    }

    /// The connected account, required for signing.
    pub fn signer(&self) -> Result<&Address, SessionError> {
        self.account.as_ref().ok_or(SessionError::NotConnected)
    }

    /// Request accounts from the wallet; the first one becomes the signer.
    pub async fn connect(&mut self) -> Result<&Address, SessionError> {
        let wallet = self.wallet.as_ref().ok_or(SessionError::WalletUnavailable)?;
        let accounts = wallet.request_accounts().await?;
        let first = accounts.into_iter().next().ok_or(SessionError::NoAccounts)?;
        tracing::info!(account = %first.short(), "wallet connected");
        Ok(self.account.insert(first))
    }

    /// Revoke the wallet permission and drop the account.
    pub async fn disconnect(&mut self) -> Result<(), SessionError> {
        self.account = None;
        if let Some(wallet) = &self.wallet {
            wallet.revoke().await?;
        }
        tracing::info!("wallet disconnected");
        Ok(())
    }
}
