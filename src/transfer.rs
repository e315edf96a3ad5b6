//! Transfer orchestration: resolve a contact (or raw address), amount and
//! payment id into a request for the external wallet engine.

use crate::address_book::{find_entry, report_if_empty, AddressBookStore};
use crate::addresses::{extra_from_payment_id, extract_integrated_address, get_address};
use crate::config::{default_mixin_by_height, format_amount, WalletConfig};
use crate::engine::WalletBackend;
use crate::error::QuillResult;
use crate::input::{confirm, prompt, LineReader, Prompted};
use colored::*;

/// Built per send, consumed by one engine submission, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferRequest {
    /// Destination in standard form, payment id stripped out.
    pub address: String,
    pub amount: u64,
    pub fee: u64,

    /// Opaque blob encoding the payment id, or empty.
    pub extra: Vec<u8>,

    /// Ring size, policy-derived from chain height.
    pub mixin: u64,

    /// The possibly-integrated address as entered, kept for the
    /// confirmation screen only.
    pub original_address: String,
}

/// Parse a human amount ("100", "1.05") into atomic units. Rejects more
/// decimal places than the coin carries.
pub fn parse_amount(input: &str) -> Option<u64> {
    let divisor = 10u64.pow(WalletConfig::COIN_DECIMALS);

    let (whole, fraction) = match input.split_once('.') {
        Some((w, f)) => (w, f),
        None => (input, ""),
    };

    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    if fraction.len() > WalletConfig::COIN_DECIMALS as usize {
        return None;
    }

    let whole: u64 = if whole.is_empty() {
        0
    } else {
        whole.parse().ok()?
    };

    let fraction: u64 = if fraction.is_empty() {
        0
    } else {
        // pad to full precision: "5" at two decimals means 50
        let padded = format!("{:0<width$}", fraction, width = WalletConfig::COIN_DECIMALS as usize);
        padded.parse().ok()?
    };

    whole.checked_mul(divisor)?.checked_add(fraction)
}

/// Prompt for a transfer amount, re-prompting on anything unparsable or
/// below the network minimum. `None` means the operator cancelled.
pub fn get_transfer_amount(reader: &mut dyn LineReader) -> QuillResult<Option<u64>> {
    loop {
        match prompt(reader, "你想发送多少? 例如 100.00: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(input) => match parse_amount(&input) {
                Some(amount) if amount >= WalletConfig::MINIMUM_SEND => {
                    return Ok(Some(amount))
                }
                _ => {
                    println!("{}", "无法解析金额! 请输入一个有效的数额.".yellow());
                    println!();
                }
            },
        }
    }
}

/// Assemble a request from a resolved destination. The stored payment id is
/// assumed encoder-validated at add time; a malformed one fails here and
/// aborts the transfer.
fn build_request(
    address: String,
    payment_id: &str,
    integrated: bool,
    amount: u64,
    height: u64,
) -> QuillResult<TransferRequest> {
    let original_address = address.clone();

    let (address, extra) = if integrated {
        let (plain, embedded_pid) = extract_integrated_address(&address)?;
        let extra = extra_from_payment_id(&embedded_pid)?;
        (plain, extra)
    } else {
        let extra = extra_from_payment_id(payment_id)?;
        (address, extra)
    };

    Ok(TransferRequest {
        address,
        amount,
        fee: WalletConfig::DEFAULT_FEE,
        extra,
        mixin: default_mixin_by_height(height),
        original_address,
    })
}

/// Confirmation screen plus submission. Once the engine accepts the request
/// there is no rollback.
pub fn do_transfer(
    reader: &mut dyn LineReader,
    wallet: &mut dyn WalletBackend,
    request: TransferRequest,
    fee_address: &str,
    fee_amount: u64,
) -> QuillResult<()> {
    println!();
    println!("{}", "您即将发送:".cyan());
    println!("{} {}", "数量:".cyan(), format_amount(request.amount).green());
    println!("{} {}", "费用:".cyan(), format_amount(request.fee).green());

    if !fee_address.is_empty() && fee_amount > 0 {
        println!(
            "{} {}",
            "节点费用:".cyan(),
            format_amount(fee_amount).green()
        );
    }

    println!("{}", "至:".cyan());
    println!("{}", request.original_address.green());
    println!();

    if !confirm(reader, "确定要发送吗?")? {
        println!("{}", "取消交易.".yellow());
        return Ok(());
    }

    let hash = wallet.transfer(&request)?;

    println!();
    println!("{}", "交易已成功发送!".green());
    println!("{} {}", "杂凑:".cyan(), hash.green());

    Ok(())
}

pub fn send_from_address_book(
    reader: &mut dyn LineReader,
    store: &AddressBookStore,
    wallet: &mut dyn WalletBackend,
    height: u64,
    fee_address: &str,
    fee_amount: u64,
) -> QuillResult<()> {
    let book = store.load()?;

    if report_if_empty(&book) {
        return Ok(());
    }

    println!("{}", "注意：您可以随时输入“取消”来取消交易".cyan());
    println!();

    let entry = match find_entry(reader, &book)? {
        Some(entry) => entry,
        None => {
            println!("{}", "取消交易.".yellow());
            return Ok(());
        }
    };

    let amount = match get_transfer_amount(reader)? {
        Some(amount) => amount,
        None => {
            println!("{}", "取消交易.".yellow());
            return Ok(());
        }
    };

    let request = build_request(
        entry.address,
        &entry.payment_id,
        entry.integrated_address,
        amount,
        height,
    )?;

    do_transfer(reader, wallet, request, fee_address, fee_amount)
}

/// Direct transfer to an operator-entered address instead of a contact.
pub fn transfer(
    reader: &mut dyn LineReader,
    wallet: &mut dyn WalletBackend,
    height: u64,
    send_all: bool,
    fee_address: &str,
    fee_amount: u64,
) -> QuillResult<()> {
    println!("{}", "注意：您可以随时输入“取消”来取消交易".cyan());
    println!();

    let (address_type, address) = match get_address(reader, "该用户有什么地址? ")? {
        Some(parsed) => parsed,
        None => {
            println!("{}", "取消交易.".yellow());
            return Ok(());
        }
    };

    let integrated = address_type == crate::addresses::AddressType::Integrated;

    let mut payment_id = String::new();

    if !integrated {
        match crate::addresses::get_payment_id(reader, "此次转账是否具有与其关联的付款ID?")? {
            Some(pid) => payment_id = pid,
            None => {
                println!("{}", "取消交易.".yellow());
                return Ok(());
            }
        }
    }

    let amount = if send_all {
        let balance = wallet.actual_balance();

        match balance.checked_sub(WalletConfig::DEFAULT_FEE + fee_amount) {
            Some(amount) if amount >= WalletConfig::MINIMUM_SEND => amount,
            _ => {
                println!("{}", "余额不足以支付费用!".yellow());
                return Ok(());
            }
        }
    } else {
        match get_transfer_amount(reader)? {
            Some(amount) => amount,
            None => {
                println!("{}", "取消交易.".yellow());
                return Ok(());
            }
        }
    };

    let request = build_request(address, &payment_id, integrated, amount, height)?;

    do_transfer(reader, wallet, request, fee_address, fee_amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_book::{AddressBookEntry, AddressBookStore};
    use crate::addresses::{create_integrated_address, test_standard_address};
    use crate::engine::mock::MockWallet;
    use crate::input::Scripted;
    use std::fs;
    use tempfile::TempDir;

    fn seeded_store(dir: &TempDir, entries: Vec<AddressBookEntry>) -> AddressBookStore {
        let store = AddressBookStore::new(dir.path().join("addressBook.json"));
        store.save(&entries).unwrap();
        store
    }

    fn plain_entry(name: &str, payment_id: &str) -> AddressBookEntry {
        AddressBookEntry {
            friendly_name: name.to_string(),
            address: test_standard_address(),
            payment_id: payment_id.to_string(),
            integrated_address: false,
        }
    }

    #[test]
    fn amount_parsing() {
        assert_eq!(parse_amount("100"), Some(10_000));
        assert_eq!(parse_amount("1.05"), Some(105));
        assert_eq!(parse_amount("0.5"), Some(50));
        assert_eq!(parse_amount(".5"), Some(50));
        assert_eq!(parse_amount("1.234"), None);
        assert_eq!(parse_amount("abc"), None);
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("-5"), None);
    }

    #[test]
    fn send_resolves_contact_and_submits() {
        let dir = TempDir::new().unwrap();
        let pid = "0b".repeat(32);
        let store = seeded_store(&dir, vec![plain_entry("Alice", &pid)]);
        let mut wallet = MockWallet::new();

        let mut reader = Scripted::new(["Alice", "100", "y"]);
        send_from_address_book(&mut reader, &store, &mut wallet, 500_000, "", 0).unwrap();

        assert_eq!(wallet.submitted.len(), 1);
        let request = &wallet.submitted[0];
        assert_eq!(request.address, test_standard_address());
        assert_eq!(request.amount, 10_000);
        assert_eq!(request.fee, WalletConfig::DEFAULT_FEE);
        assert_eq!(request.mixin, default_mixin_by_height(500_000));
        assert_eq!(
            crate::addresses::payment_id_from_extra(&request.extra).unwrap(),
            pid
        );
    }

    #[test]
    fn send_decomposes_integrated_entry() {
        let dir = TempDir::new().unwrap();
        let pid = "cd".repeat(32);
        let integrated = create_integrated_address(&test_standard_address(), &pid).unwrap();

        let entry = AddressBookEntry {
            friendly_name: "Bob".to_string(),
            address: integrated.clone(),
            payment_id: String::new(),
            integrated_address: true,
        };

        let store = seeded_store(&dir, vec![entry]);
        let mut wallet = MockWallet::new();

        let mut reader = Scripted::new(["Bob", "2.50", "y"]);
        send_from_address_book(&mut reader, &store, &mut wallet, 100, "", 0).unwrap();

        let request = &wallet.submitted[0];
        assert_eq!(request.address, test_standard_address());
        assert_eq!(request.original_address, integrated);
        assert_eq!(
            crate::addresses::payment_id_from_extra(&request.extra).unwrap(),
            pid
        );
    }

    #[test]
    fn cancellation_submits_nothing_and_leaves_store_unchanged() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, vec![plain_entry("Alice", "")]);
        let before = fs::read(dir.path().join("addressBook.json")).unwrap();
        let mut wallet = MockWallet::new();

        // cancel at the contact prompt
        let mut reader = Scripted::new(["取消"]);
        send_from_address_book(&mut reader, &store, &mut wallet, 100, "", 0).unwrap();

        // cancel at the amount prompt
        let mut reader = Scripted::new(["Alice", "取消"]);
        send_from_address_book(&mut reader, &store, &mut wallet, 100, "", 0).unwrap();

        // decline the confirmation screen
        let mut reader = Scripted::new(["Alice", "5", "n"]);
        send_from_address_book(&mut reader, &store, &mut wallet, 100, "", 0).unwrap();

        assert!(wallet.submitted.is_empty());
        assert_eq!(
            fs::read(dir.path().join("addressBook.json")).unwrap(),
            before
        );
    }

    #[test]
    fn engine_rejection_surfaces_verbatim() {
        let dir = TempDir::new().unwrap();
        let store = seeded_store(&dir, vec![plain_entry("Alice", "")]);
        let mut wallet = MockWallet::new();
        wallet.fail_transfer = Some("daemon rejected transaction".to_string());

        let mut reader = Scripted::new(["Alice", "5", "y"]);
        let err = send_from_address_book(&mut reader, &store, &mut wallet, 100, "", 0)
            .unwrap_err();

        assert!(err.to_string().contains("daemon rejected transaction"));
    }

    #[test]
    fn direct_transfer_prompts_for_payment_id() {
        let mut wallet = MockWallet::new();
        let address = test_standard_address();

        let mut reader = Scripted::new([address.as_str(), "", "7.50", "y"]);
        transfer(&mut reader, &mut wallet, 100, false, "", 0).unwrap();

        let request = &wallet.submitted[0];
        assert_eq!(request.amount, 750);
        assert!(request.extra.is_empty());
    }

    #[test]
    fn send_all_spends_balance_minus_fee() {
        let mut wallet = MockWallet::new();
        wallet.actual = 10_000;
        let address = test_standard_address();

        let mut reader = Scripted::new([address.as_str(), "", "y"]);
        transfer(&mut reader, &mut wallet, 100, true, "", 0).unwrap();

        let request = &wallet.submitted[0];
        assert_eq!(request.amount, 10_000 - WalletConfig::DEFAULT_FEE);
    }
}
