//! Read-only aggregation of node/wallet heights and balances into reports

use crate::config::{format_amount, sync_percentage, WalletConfig};
use crate::engine::{NodeClient, WalletBackend, WalletTransaction};
use colored::*;

/// Wallet height lags remote height because the wallet walks the chain
/// after the node has synced it, so it gets a tolerance buffer. Local vs
/// remote uses exact equality.
pub const WALLET_HEIGHT_BUFFER: u64 = 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Heights {
    pub local: u64,
    pub remote: u64,
    pub wallet: u64,
}

impl Heights {
    pub fn read(node: &dyn NodeClient, wallet: &dyn WalletBackend) -> Self {
        Self {
            local: node.last_local_block_height(),
            remote: node.last_known_block_height(),
            wallet: wallet.block_count(),
        }
    }

    pub fn wallet_caught_up(&self) -> bool {
        self.wallet + WALLET_HEIGHT_BUFFER > self.remote
    }

    pub fn local_caught_up(&self) -> bool {
        self.local == self.remote
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncSummary {
    NodeNotRunning,
    WalletScanning,
    Synced,
    Syncing,
}

/// Four-way classification. The both-zero check runs first: zero heights
/// would otherwise read as "synced" since local equals remote.
pub fn classify(heights: Heights) -> SyncSummary {
    if heights.local == 0 && heights.remote == 0 {
        SyncSummary::NodeNotRunning
    } else if !heights.wallet_caught_up() && heights.local_caught_up() {
        SyncSummary::WalletScanning
    } else if heights.local_caught_up() {
        SyncSummary::Synced
    } else {
        SyncSummary::Syncing
    }
}

fn print_heights(heights: Heights) {
    // Wallet-scan progress, not node sync progress
    let wallet_line = heights.wallet.to_string();

    if heights.wallet_caught_up() {
        println!("钱包区块链高度: {}", wallet_line.green());
    } else {
        println!("钱包区块链高度: {}", wallet_line.yellow());
    }

    let local_line = heights.local.to_string();

    if heights.local_caught_up() {
        println!("本地区块链高度: {}", local_line.green());
    } else {
        println!("本地区块链高度: {}", local_line.yellow());
    }

    println!("网络区块链高度: {}", heights.remote.to_string().green());
}

fn print_sync_status(heights: Heights) {
    let network = format!("{}%", sync_percentage(heights.local, heights.remote));
    let wallet = format!("{}%", sync_percentage(heights.wallet, heights.remote));

    if heights.local_caught_up() {
        println!("网络同步状态: {}", network.green());
    } else {
        println!("网络同步状态: {}", network.yellow());
    }

    if heights.wallet_caught_up() {
        println!("钱包同步状态: {}", wallet.green());
    } else {
        println!("钱包同步状态: {}", wallet.yellow());
    }
}

fn print_sync_summary(heights: Heights) {
    match classify(heights) {
        SyncSummary::NodeNotRunning => {
            println!(
                "{}",
                format!("嗯，看来你没有 {} 打开!", WalletConfig::DAEMON_NAME).yellow()
            );
        }
        SyncSummary::WalletScanning => {
            println!(
                "{}",
                "您已与网络同步，但仍在扫描区块链中的交易.".cyan()
            );
            println!("进行中时余额可能不正确.");
        }
        SyncSummary::Synced => {
            println!("{}", "好极了! 您已同步!".green());
        }
        SyncSummary::Syncing => {
            println!("{}", "请耐心等待，您仍在与网络同步!".yellow());
        }
    }
}

fn print_peer_count(peer_count: u64) {
    println!("同行: {}", peer_count.to_string().green());
}

fn print_hashrate(difficulty: u64) {
    // Offline node / not responding
    if difficulty == 0 {
        return;
    }

    let hashrate = difficulty / WalletConfig::DIFFICULTY_TARGET;

    println!(
        "网络哈希率: {} {}",
        format!("{} H/s", hashrate).green(),
        "(基于最后一个本地块)"
    );
}

/// Only cached node accessors are consulted here so the report stays prompt
/// when the daemon is struggling.
pub fn status(node: &dyn NodeClient, wallet: &dyn WalletBackend) {
    let heights = Heights::read(node, wallet);

    print_heights(heights);
    println!();

    print_sync_status(heights);
    println!();

    print_hashrate(node.last_block_difficulty());
    print_peer_count(node.peer_count());
    println!();

    print_sync_summary(heights);
}

/// Confirmed balance a view-only wallet can actually account for: fusion
/// transactions (zero fee, not coinbase) appear as incoming because their
/// outputs cannot be decrypted, so they are skipped. Known-approximate.
pub fn view_only_confirmed_balance(transactions: &[WalletTransaction]) -> u64 {
    let total: i64 = transactions
        .iter()
        .filter(|t| t.fee != 0 || t.is_base)
        .map(|t| t.total_amount)
        .sum();

    total.max(0) as u64
}

pub fn balance(node: &dyn NodeClient, wallet: &dyn WalletBackend) {
    let unconfirmed = wallet.pending_balance();

    let confirmed = if wallet.is_view_wallet() {
        view_only_confirmed_balance(&wallet.transactions())
    } else {
        wallet.actual_balance()
    };

    let total = unconfirmed + confirmed;

    println!("可用余额: {}", format_amount(confirmed).green());
    println!("锁定（未确认）余额: {}", format_amount(unconfirmed).yellow());
    println!("总余额: {}", format_amount(total).cyan());

    if wallet.is_view_wallet() {
        println!();
        println!(
            "{}",
            "请注意，仅查看钱包只能跟踪传入的交易,".cyan()
        );
        println!("{}", "因此您的钱包余额可能会出现膨胀的.".cyan());
    }

    let heights = Heights::read(node, wallet);

    if heights.local < heights.remote {
        println!();
        println!("{}", "您的守护程序未与网络完全同步!".cyan());
        println!("在完全同步之前，您的余额可能不正确!");
    } else if !heights.wallet_caught_up() {
        println!();
        println!("{}", "区块链仍在进行交易扫描.".cyan());
        println!("进行中时余额可能不正确.");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn heights(local: u64, remote: u64, wallet: u64) -> Heights {
        Heights {
            local,
            remote,
            wallet,
        }
    }

    fn tx(total_amount: i64, fee: u64, is_base: bool) -> WalletTransaction {
        WalletTransaction {
            total_amount,
            fee,
            is_base,
            timestamp: 0,
            block_height: 0,
            hash: "00".repeat(32),
            extra: Vec::new(),
        }
    }

    #[test]
    fn summary_classification_scenarios() {
        assert_eq!(classify(heights(100, 100, 100)), SyncSummary::Synced);
        assert_eq!(classify(heights(100, 100, 50)), SyncSummary::Synced);
        assert_eq!(classify(heights(0, 0, 0)), SyncSummary::NodeNotRunning);
        assert_eq!(classify(heights(80, 100, 100)), SyncSummary::Syncing);

        // wallet more than the buffer behind while the node is caught up
        assert_eq!(
            classify(heights(5000, 5000, 1000)),
            SyncSummary::WalletScanning
        );
    }

    #[test]
    fn zero_heights_beat_the_synced_check() {
        // local == remote holds at zero, but the node-not-running check
        // runs first
        assert_ne!(classify(heights(0, 0, 0)), SyncSummary::Synced);
    }

    #[test]
    fn wallet_buffer_applies_only_to_wallet_height() {
        let h = heights(4500, 5000, 4999);
        assert!(h.wallet_caught_up());
        assert!(!h.local_caught_up());

        // exactly at the buffer edge: 4000 + 1000 is not > 5000
        assert!(!heights(5000, 5000, 4000).wallet_caught_up());
        assert!(heights(5000, 5000, 4001).wallet_caught_up());
    }

    #[test]
    fn view_only_balance_skips_fusion_transactions() {
        let txs = vec![tx(5, 0, false), tx(3, 10, false)];
        assert_eq!(view_only_confirmed_balance(&txs), 3);
    }

    #[test]
    fn view_only_balance_includes_coinbase() {
        let txs = vec![tx(7, 0, true), tx(5, 0, false), tx(2, 1, false)];
        assert_eq!(view_only_confirmed_balance(&txs), 9);
    }

    #[test]
    fn view_only_balance_never_goes_negative() {
        let txs = vec![tx(-50, 10, false)];
        assert_eq!(view_only_confirmed_balance(&txs), 0);
    }
}
