//! Seams to the external wallet engine and daemon. The console core never
//! interprets these beyond the accessors named here.

use crate::error::{QuillError, QuillResult};
use crate::transfer::TransferRequest;
use serde::{Deserialize, Serialize};

/// One wallet transaction as the engine reports it. Negative `total_amount`
/// is outgoing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WalletTransaction {
    pub total_amount: i64,
    pub fee: u64,
    pub is_base: bool,
    pub timestamp: u64,
    pub block_height: u64,
    pub hash: String,
    pub extra: Vec<u8>,
}

/// Node/ledger accessor. Implementations are expected to serve cached data
/// so status reporting stays prompt when the daemon is struggling.
pub trait NodeClient {
    fn last_local_block_height(&self) -> u64;
    fn last_known_block_height(&self) -> u64;
    fn peer_count(&self) -> u64;
    fn last_block_difficulty(&self) -> u64;
    fn fee_address(&self) -> String;
    fn fee_amount(&self) -> u64;
}

/// Wallet engine accessor. Balance computation, transaction construction and
/// persistence format all live behind this trait.
pub trait WalletBackend {
    /// Pull fresh figures from the engine so the accessors below serve
    /// current data. In-process engines have nothing to do.
    fn refresh(&mut self) -> QuillResult<()> {
        Ok(())
    }

    fn address(&self) -> String;
    fn is_view_wallet(&self) -> bool;

    fn pending_balance(&self) -> u64;
    fn actual_balance(&self) -> u64;

    /// Height the wallet has scanned to. Lags the node heights because the
    /// wallet walks the chain only after the node has synced it.
    fn block_count(&self) -> u64;

    fn transactions(&self) -> Vec<WalletTransaction>;

    /// Submit a transfer, returning the transaction hash. Engine errors are
    /// surfaced to the operator verbatim; the console never retries.
    fn transfer(&mut self, request: &TransferRequest) -> QuillResult<String>;

    fn save(&mut self) -> QuillResult<()>;
    fn reset(&mut self, scan_height: u64) -> QuillResult<()>;
    fn change_password(&mut self, current: &str, new: &str) -> QuillResult<()>;
    fn full_optimize(&mut self, height: u64) -> QuillResult<usize>;

    fn private_view_key(&self) -> String;

    /// `None` on a view-only wallet.
    fn private_spend_key(&self) -> Option<String>;

    /// Present only when the keys are deterministic.
    fn mnemonic_seed(&self) -> Option<String>;
}

/// Blocking JSON-RPC client against the network daemon. All height and peer
/// figures are cached at refresh time.
#[derive(Debug, Clone)]
pub struct DaemonClient {
    endpoint: String,
    local_height: u64,
    network_height: u64,
    peers: u64,
    difficulty: u64,
    fee_address: String,
    fee_amount: u64,
}

impl DaemonClient {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            endpoint: format!("http://{}:{}/json_rpc", host, port),
            local_height: 0,
            network_height: 0,
            peers: 0,
            difficulty: 0,
            fee_address: String::new(),
            fee_amount: 0,
        }
    }

    /// Pull fresh figures from the daemon. On failure the previous cached
    /// values are kept and the error is returned.
    pub fn refresh(&mut self) -> QuillResult<()> {
        let response = reqwest::blocking::Client::new()
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getinfo",
                "params": []
            }))
            .send()
            .map_err(|e| QuillError::Network(format!("Failed to contact daemon: {}", e)))?;

        if !response.status().is_success() {
            return Err(QuillError::Network(
                "Daemon RPC returned error status".to_string(),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| QuillError::Network(format!("Failed to parse response: {}", e)))?;

        let result = body
            .get("result")
            .ok_or_else(|| QuillError::Network("No result in RPC response".to_string()))?;

        let field = |name: &str| result.get(name).and_then(|v| v.as_u64()).unwrap_or(0);

        self.local_height = field("height");
        self.network_height = field("network_height");
        self.difficulty = field("difficulty");
        self.peers =
            field("incoming_connections_count") + field("outgoing_connections_count");
        self.fee_amount = field("fee_amount");
        self.fee_address = result
            .get("fee_address")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        Ok(())
    }
}

impl NodeClient for DaemonClient {
    fn last_local_block_height(&self) -> u64 {
        self.local_height
    }

    fn last_known_block_height(&self) -> u64 {
        self.network_height
    }

    fn peer_count(&self) -> u64 {
        self.peers
    }

    fn last_block_difficulty(&self) -> u64 {
        self.difficulty
    }

    fn fee_address(&self) -> String {
        self.fee_address.clone()
    }

    fn fee_amount(&self) -> u64 {
        self.fee_amount
    }
}

/// Blocking JSON-RPC connection to the wallet service daemon.
#[derive(Debug, Clone)]
pub struct WalletRpc {
    endpoint: String,
}

impl WalletRpc {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            endpoint: format!("http://{}:{}/json_rpc", host, port),
        }
    }

    fn call(&self, method: &str, params: serde_json::Value) -> QuillResult<serde_json::Value> {
        let response = reqwest::blocking::Client::new()
            .post(&self.endpoint)
            .json(&serde_json::json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": method,
                "params": params
            }))
            .send()
            .map_err(|e| QuillError::Network(format!("Failed to contact wallet service: {}", e)))?;

        if !response.status().is_success() {
            return Err(QuillError::Network(
                "Wallet service returned error status".to_string(),
            ));
        }

        let body: serde_json::Value = response
            .json()
            .map_err(|e| QuillError::Network(format!("Failed to parse response: {}", e)))?;

        // Engine errors are surfaced with their own message so the operator
        // sees them verbatim
        if let Some(error) = body.get("error") {
            let message = error
                .get("message")
                .and_then(|v| v.as_str())
                .unwrap_or("unknown wallet service error");

            return Err(QuillError::Transaction(message.to_string()));
        }

        body.get("result")
            .cloned()
            .ok_or_else(|| QuillError::Network("No result in RPC response".to_string()))
    }
}

/// Wallet engine reached over the wallet service RPC. Accessors serve the
/// figures cached by the last [`WalletBackend::refresh`]; mutating calls go
/// over the wire immediately.
pub struct RpcWallet {
    rpc: WalletRpc,
    address: String,
    view_wallet: bool,
    view_key: String,
    spend_key: Option<String>,
    seed: Option<String>,
    pending: u64,
    actual: u64,
    scanned_height: u64,
    txs: Vec<WalletTransaction>,
}

impl RpcWallet {
    /// Bind to the wallet the service just loaded, pulling its address, key
    /// material and an initial snapshot.
    fn attach(rpc: WalletRpc, opened: &serde_json::Value) -> QuillResult<Self> {
        let address = opened
            .get("address")
            .and_then(|v| v.as_str())
            .ok_or_else(|| QuillError::Network("No address in RPC response".to_string()))?
            .to_string();

        let view_wallet = opened
            .get("viewWallet")
            .and_then(|v| v.as_bool())
            .unwrap_or(false);

        let keys = rpc.call("getKeys", serde_json::json!({}))?;

        let view_key = keys
            .get("viewKey")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string();

        let spend_key = keys
            .get("spendKey")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let seed = keys
            .get("mnemonicSeed")
            .and_then(|v| v.as_str())
            .map(str::to_string);

        let mut wallet = Self {
            rpc,
            address,
            view_wallet,
            view_key,
            spend_key,
            seed,
            pending: 0,
            actual: 0,
            scanned_height: 0,
            txs: Vec::new(),
        };

        wallet.refresh()?;

        Ok(wallet)
    }

    fn parse_transaction(value: &serde_json::Value) -> WalletTransaction {
        WalletTransaction {
            total_amount: value
                .get("totalAmount")
                .and_then(|v| v.as_i64())
                .unwrap_or(0),
            fee: value.get("fee").and_then(|v| v.as_u64()).unwrap_or(0),
            is_base: value
                .get("isBase")
                .and_then(|v| v.as_bool())
                .unwrap_or(false),
            timestamp: value
                .get("timestamp")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            block_height: value
                .get("blockHeight")
                .and_then(|v| v.as_u64())
                .unwrap_or(0),
            hash: value
                .get("transactionHash")
                .and_then(|v| v.as_str())
                .unwrap_or("")
                .to_string(),
            extra: value
                .get("extra")
                .and_then(|v| v.as_str())
                .and_then(|s| hex::decode(s).ok())
                .unwrap_or_default(),
        }
    }
}

impl WalletBackend for RpcWallet {
    fn refresh(&mut self) -> QuillResult<()> {
        let balance = self.rpc.call("getBalance", serde_json::json!({}))?;

        self.actual = balance
            .get("availableBalance")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);
        self.pending = balance
            .get("lockedAmount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let status = self.rpc.call("getStatus", serde_json::json!({}))?;

        self.scanned_height = status
            .get("blockCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0);

        let transactions = self.rpc.call("getTransactions", serde_json::json!({}))?;

        self.txs = transactions
            .get("transactions")
            .and_then(|v| v.as_array())
            .map(|items| items.iter().map(Self::parse_transaction).collect())
            .unwrap_or_default();

        Ok(())
    }

    fn address(&self) -> String {
        self.address.clone()
    }

    fn is_view_wallet(&self) -> bool {
        self.view_wallet
    }

    fn pending_balance(&self) -> u64 {
        self.pending
    }

    fn actual_balance(&self) -> u64 {
        self.actual
    }

    fn block_count(&self) -> u64 {
        self.scanned_height
    }

    fn transactions(&self) -> Vec<WalletTransaction> {
        self.txs.clone()
    }

    fn transfer(&mut self, request: &TransferRequest) -> QuillResult<String> {
        let result = self.rpc.call(
            "sendTransaction",
            serde_json::json!({
                "address": request.address,
                "amount": request.amount,
                "fee": request.fee,
                "mixin": request.mixin,
                "extra": hex::encode(&request.extra),
            }),
        )?;

        Ok(result
            .get("transactionHash")
            .and_then(|v| v.as_str())
            .unwrap_or("")
            .to_string())
    }

    fn save(&mut self) -> QuillResult<()> {
        self.rpc.call("save", serde_json::json!({}))?;
        Ok(())
    }

    fn reset(&mut self, scan_height: u64) -> QuillResult<()> {
        self.rpc
            .call("reset", serde_json::json!({ "scanHeight": scan_height }))?;
        Ok(())
    }

    fn change_password(&mut self, current: &str, new: &str) -> QuillResult<()> {
        self.rpc.call(
            "changePassword",
            serde_json::json!({ "currentPassword": current, "newPassword": new }),
        )?;
        Ok(())
    }

    fn full_optimize(&mut self, height: u64) -> QuillResult<usize> {
        let result = self
            .rpc
            .call("fullOptimize", serde_json::json!({ "height": height }))?;

        Ok(result
            .get("fusionCount")
            .and_then(|v| v.as_u64())
            .unwrap_or(0) as usize)
    }

    fn private_view_key(&self) -> String {
        self.view_key.clone()
    }

    fn private_spend_key(&self) -> Option<String> {
        self.spend_key.clone()
    }

    fn mnemonic_seed(&self) -> Option<String> {
        self.seed.clone()
    }
}

/// Wallet lifecycle operations over the wallet service RPC.
pub struct RpcWalletService {
    rpc: WalletRpc,
}

impl RpcWalletService {
    pub fn new(host: &str, port: u16) -> Self {
        Self {
            rpc: WalletRpc::new(host, port),
        }
    }
}

impl crate::session::WalletService for RpcWalletService {
    fn create(&self, filename: &str, password: &str) -> QuillResult<Box<dyn WalletBackend>> {
        let opened = self.rpc.call(
            "createWallet",
            serde_json::json!({ "filename": filename, "password": password }),
        )?;
        Ok(Box::new(RpcWallet::attach(self.rpc.clone(), &opened)?))
    }

    fn open(&self, filename: &str, password: &str) -> QuillResult<Box<dyn WalletBackend>> {
        let opened = self.rpc.call(
            "openWallet",
            serde_json::json!({ "filename": filename, "password": password }),
        )?;
        Ok(Box::new(RpcWallet::attach(self.rpc.clone(), &opened)?))
    }

    fn restore_from_seed(
        &self,
        filename: &str,
        password: &str,
        seed: &str,
    ) -> QuillResult<Box<dyn WalletBackend>> {
        let opened = self.rpc.call(
            "restoreFromSeed",
            serde_json::json!({
                "filename": filename,
                "password": password,
                "mnemonicSeed": seed,
            }),
        )?;
        Ok(Box::new(RpcWallet::attach(self.rpc.clone(), &opened)?))
    }

    fn restore_from_keys(
        &self,
        filename: &str,
        password: &str,
        view_key: &str,
        spend_key: &str,
    ) -> QuillResult<Box<dyn WalletBackend>> {
        let opened = self.rpc.call(
            "restoreFromKeys",
            serde_json::json!({
                "filename": filename,
                "password": password,
                "viewKey": view_key,
                "spendKey": spend_key,
            }),
        )?;
        Ok(Box::new(RpcWallet::attach(self.rpc.clone(), &opened)?))
    }

    fn create_view_wallet(
        &self,
        filename: &str,
        password: &str,
        view_key: &str,
        address: &str,
    ) -> QuillResult<Box<dyn WalletBackend>> {
        let opened = self.rpc.call(
            "createViewWallet",
            serde_json::json!({
                "filename": filename,
                "password": password,
                "viewKey": view_key,
                "address": address,
            }),
        )?;
        Ok(Box::new(RpcWallet::attach(self.rpc.clone(), &opened)?))
    }
}
