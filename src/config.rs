//! Configuration for the quill wallet console

use clap::Parser;

/// Process launch arguments.
#[derive(Parser, Debug, Clone)]
#[command(name = "quill")]
#[command(about = "Interactive console wallet for CryptoNote-style networks")]
#[command(version)]
pub struct Cli {
    /// Wallet file to open on launch, skipping the launch menu prompt
    #[arg(short, long, value_name = "FILE")]
    pub wallet_file: Option<String>,

    /// Daemon RPC host
    #[arg(long, default_value = "127.0.0.1")]
    pub daemon_host: String,

    /// Daemon RPC port
    #[arg(long, default_value_t = 11898)]
    pub daemon_port: u16,

    /// Wallet service RPC host
    #[arg(long, default_value = "127.0.0.1")]
    pub wallet_host: String,

    /// Wallet service RPC port
    #[arg(long, default_value_t = 8070)]
    pub wallet_port: u16,
}

/// Fixed wallet constants. These mirror the network's wallet conventions and
/// are not operator-configurable.
pub struct WalletConfig;

impl WalletConfig {
    pub const ADDRESS_BOOK_FILENAME: &'static str = "addressBook.json";
    pub const CSV_FILENAME: &'static str = "transactions.csv";
    pub const WALLET_NAME: &'static str = "quill";
    pub const DAEMON_NAME: &'static str = "quilld";

    /// Atomic units per coin, two decimal places.
    pub const COIN_DECIMALS: u32 = 2;

    /// Fixed network fee in atomic units.
    pub const DEFAULT_FEE: u64 = 10;

    /// Minimum amount a transfer may carry, atomic units.
    pub const MINIMUM_SEND: u64 = 1;

    pub const ADDRESS_PREFIX: &'static str = "QL";
    pub const STANDARD_ADDRESS_LENGTH: usize = 97;

    /// An integrated address carries a 64-hex payment id between the prefix
    /// and the standard address body.
    pub const INTEGRATED_ADDRESS_LENGTH: usize = Self::STANDARD_ADDRESS_LENGTH + 64;

    pub const PAYMENT_ID_LENGTH: usize = 64;

    /// Block target time in seconds, used to turn difficulty into hashrate.
    pub const DIFFICULTY_TARGET: u64 = 30;

    /// Reserved cancellation token checked after every interactive prompt.
    pub const CANCEL_TOKEN: &'static str = "取消";
}

/// Mixin policy: ring size steps up at known fork heights. Monotonic over
/// the threshold table.
pub fn default_mixin_by_height(height: u64) -> u64 {
    const THRESHOLDS: [(u64, u64); 3] = [(0, 3), (440_000, 7), (620_000, 11)];

    let mut mixin = THRESHOLDS[0].1;

    for (threshold, value) in THRESHOLDS {
        if height >= threshold {
            mixin = value;
        }
    }

    mixin
}

/// Format an atomic-unit amount with the network's decimal places.
pub fn format_amount(amount: u64) -> String {
    let divisor = 10u64.pow(WalletConfig::COIN_DECIMALS);

    format!(
        "{}.{:0width$}",
        amount / divisor,
        amount % divisor,
        width = WalletConfig::COIN_DECIMALS as usize
    )
}

/// Integer percentage of `amount` against `total`, clamped to [0, 100].
/// Matches the sync display convention: 0/0 reads as 100% synced.
pub fn sync_percentage(amount: u64, total: u64) -> String {
    if total == 0 {
        return "100.00".to_string();
    }

    let percent = 100.0 * amount as f64 / total as f64;

    format!("{:.2}", percent.min(100.0))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mixin_policy_is_a_monotonic_step_function() {
        let mut last = 0;

        for height in [0, 1, 439_999, 440_000, 500_000, 620_000, 1_000_000] {
            let mixin = default_mixin_by_height(height);
            assert!(mixin >= last, "mixin decreased at height {}", height);
            last = mixin;
        }

        assert_eq!(default_mixin_by_height(0), 3);
        assert_eq!(default_mixin_by_height(440_000), 7);
        assert_eq!(default_mixin_by_height(620_000), 11);
    }

    #[test]
    fn amount_formatting() {
        assert_eq!(format_amount(0), "0.00");
        assert_eq!(format_amount(105), "1.05");
        assert_eq!(format_amount(123_456), "1234.56");
    }

    #[test]
    fn sync_percentage_handles_zero_total() {
        assert_eq!(sync_percentage(0, 0), "100.00");
        assert_eq!(sync_percentage(50, 100), "50.00");
        assert_eq!(sync_percentage(100, 100), "100.00");
    }
}
