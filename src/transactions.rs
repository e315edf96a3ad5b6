//! Transaction listing and CSV export

use crate::addresses::payment_id_from_extra;
use crate::config::format_amount;
use crate::engine::{WalletBackend, WalletTransaction};
use crate::error::QuillResult;
use chrono::DateTime;
use colored::*;
use std::fs;
use std::path::Path;

pub fn unix_time_to_date(timestamp: u64) -> String {
    match DateTime::from_timestamp(timestamp as i64, 0) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => timestamp.to_string(),
    }
}

/// A fusion transaction on a view-only wallet: zero fee, not coinbase. It
/// appears to have an incoming amount because the spent outputs cannot be
/// decrypted, so listings skip it.
fn is_fusion(t: &WalletTransaction) -> bool {
    t.fee == 0 && !t.is_base
}

fn print_outgoing_transfer(t: &WalletTransaction) {
    println!("{}", "外向转移:".yellow());
    println!("{}", format!("杂凑: {}", t.hash).yellow());

    if t.timestamp != 0 {
        println!("{}", format!("块高: {}", t.block_height).yellow());
        println!(
            "{}",
            format!("时间戳记: {}", unix_time_to_date(t.timestamp)).yellow()
        );
    }

    // daemon-supplied figures: a fee larger than the amount must not panic
    let spent = t.total_amount.unsigned_abs();

    println!(
        "{}",
        format!("花费: {}", format_amount(spent.saturating_sub(t.fee))).yellow()
    );
    println!("{}", format!("费用: {}", format_amount(t.fee)).yellow());
    println!("{}", format!("总花费: {}", format_amount(spent)).yellow());

    if let Some(payment_id) = payment_id_from_extra(&t.extra) {
        println!("{}", format!("付款编号: {}", payment_id).yellow());
    }

    println!();
}

fn print_incoming_transfer(t: &WalletTransaction) {
    println!("{}", "传入转帐:".green());
    println!("{}", format!("杂凑: {}", t.hash).green());

    if t.timestamp != 0 {
        println!("{}", format!("块高: {}", t.block_height).green());
        println!(
            "{}",
            format!("时间戳记: {}", unix_time_to_date(t.timestamp)).green()
        );
    }

    println!(
        "{}",
        format!("量: {}", format_amount(t.total_amount as u64)).green()
    );

    if let Some(payment_id) = payment_id_from_extra(&t.extra) {
        println!("{}", format!("付款编号: {}", payment_id).green());
    }

    println!();
}

pub fn list_transfers(incoming: bool, outgoing: bool, wallet: &dyn WalletBackend) {
    let mut total_spent: u64 = 0;
    let mut total_received: u64 = 0;

    for t in wallet.transactions() {
        if is_fusion(&t) {
            continue;
        }

        if t.total_amount < 0 && outgoing {
            print_outgoing_transfer(&t);
            total_spent += t.total_amount.unsigned_abs();
        } else if t.total_amount > 0 && incoming {
            print_incoming_transfer(&t);
            total_received += t.total_amount as u64;
        }
    }

    if incoming {
        println!(
            "{}",
            format!("收到的总数: {}", format_amount(total_received)).green()
        );
    }

    if outgoing {
        println!(
            "{}",
            format!("总支出: {}", format_amount(total_spent)).yellow()
        );
    }
}

/// One CSV document: fixed header, one row per non-fusion transaction,
/// direction taken from the amount sign.
pub fn render_csv(transactions: &[WalletTransaction]) -> String {
    let mut csv = String::from("时间戳,块高,哈希,金额,输入/输出\n");

    for t in transactions {
        // zero-total transactions are fusions, skip them
        if t.total_amount == 0 {
            continue;
        }

        let direction = if t.total_amount > 0 { "IN" } else { "OUT" };

        csv.push_str(&format!(
            "{},{},{},{},{}\n",
            unix_time_to_date(t.timestamp),
            t.block_height,
            t.hash,
            format_amount(t.total_amount.unsigned_abs()),
            direction
        ));
    }

    csv
}

/// Failure to open the file is reported, not fatal; no partial state to
/// roll back.
pub fn save_csv(wallet: &dyn WalletBackend, path: &Path) -> QuillResult<()> {
    println!("{}", "保存CSV文件...".cyan());

    let csv = render_csv(&wallet.transactions());

    if let Err(e) = fs::write(path, csv) {
        println!("{}", "无法打开transactions.csv文件进行保存!".yellow());
        println!(
            "{}",
            format!("确保它没有在任何其他应用程序中打开. ({})", e).yellow()
        );
        return Ok(());
    }

    println!(
        "{}",
        format!("CSV已成功写入 {}!", path.display()).green()
    );

    Ok(())
}
