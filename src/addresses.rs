//! Address and payment-id validation, integrated-address handling

use crate::config::WalletConfig;
use crate::error::{QuillError, QuillResult};
use crate::input::{prompt, LineReader, Prompted};
use colored::*;

const BASE58_ALPHABET: &str = "123456789ABCDEFGHJKLMNPQRSTUVWXYZabcdefghijkmnopqrstuvwxyz";

const TX_EXTRA_NONCE: u8 = 0x02;
const TX_EXTRA_NONCE_PAYMENT_ID: u8 = 0x00;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    Standard,
    Integrated,
}

/// Validate an address string as either form. An integrated address carries
/// a 64-hex payment id between the prefix and the standard body.
pub fn parse_address(address: &str) -> QuillResult<AddressType> {
    // byte-indexed slicing below relies on this
    if !address.is_ascii() {
        return Err(QuillError::Address(
            "address contains non-ASCII characters".to_string(),
        ));
    }

    if !address.starts_with(WalletConfig::ADDRESS_PREFIX) {
        return Err(QuillError::Address(format!(
            "address does not begin with {}",
            WalletConfig::ADDRESS_PREFIX
        )));
    }

    let body = &address[WalletConfig::ADDRESS_PREFIX.len()..];

    let address_type = match address.chars().count() {
        n if n == WalletConfig::STANDARD_ADDRESS_LENGTH => AddressType::Standard,
        n if n == WalletConfig::INTEGRATED_ADDRESS_LENGTH => AddressType::Integrated,
        n => {
            return Err(QuillError::Address(format!(
                "address length {} is neither standard ({}) nor integrated ({})",
                n,
                WalletConfig::STANDARD_ADDRESS_LENGTH,
                WalletConfig::INTEGRATED_ADDRESS_LENGTH
            )))
        }
    };

    match address_type {
        AddressType::Standard => {
            if let Some(c) = body.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
                return Err(QuillError::Address(format!(
                    "address contains invalid character '{}'",
                    c
                )));
            }
        }
        AddressType::Integrated => {
            let (payment_id, rest) = body.split_at(WalletConfig::PAYMENT_ID_LENGTH);

            if !is_valid_payment_id(payment_id) {
                return Err(QuillError::Address(
                    "integrated address has a malformed embedded payment id".to_string(),
                ));
            }

            if let Some(c) = rest.chars().find(|c| !BASE58_ALPHABET.contains(*c)) {
                return Err(QuillError::Address(format!(
                    "address contains invalid character '{}'",
                    c
                )));
            }
        }
    }

    Ok(address_type)
}

/// Exactly 64 hex characters.
pub fn is_valid_payment_id(payment_id: &str) -> bool {
    payment_id.len() == WalletConfig::PAYMENT_ID_LENGTH
        && payment_id.chars().all(|c| c.is_ascii_hexdigit())
}

/// Embed a payment id into a standard address.
pub fn create_integrated_address(address: &str, payment_id: &str) -> QuillResult<String> {
    if parse_address(address)? != AddressType::Standard {
        return Err(QuillError::Address(
            "can only integrate a payment id into a standard address".to_string(),
        ));
    }

    if !is_valid_payment_id(payment_id) {
        return Err(QuillError::Address(
            "payment id must be a 64 character hex string".to_string(),
        ));
    }

    let body = &address[WalletConfig::ADDRESS_PREFIX.len()..];

    Ok(format!(
        "{}{}{}",
        WalletConfig::ADDRESS_PREFIX,
        payment_id,
        body
    ))
}

/// Split an integrated address into its standard form and embedded
/// payment id.
pub fn extract_integrated_address(address: &str) -> QuillResult<(String, String)> {
    if parse_address(address)? != AddressType::Integrated {
        return Err(QuillError::Address(
            "address is not an integrated address".to_string(),
        ));
    }

    let body = &address[WalletConfig::ADDRESS_PREFIX.len()..];
    let (payment_id, rest) = body.split_at(WalletConfig::PAYMENT_ID_LENGTH);

    Ok((
        format!("{}{}", WalletConfig::ADDRESS_PREFIX, rest),
        payment_id.to_string(),
    ))
}

/// Encode a payment id into a transaction extra blob. An empty payment id
/// yields an empty blob.
pub fn extra_from_payment_id(payment_id: &str) -> QuillResult<Vec<u8>> {
    if payment_id.is_empty() {
        return Ok(Vec::new());
    }

    if !is_valid_payment_id(payment_id) {
        return Err(QuillError::Transaction(
            "payment id must be a 64 character hex string".to_string(),
        ));
    }

    let raw = hex::decode(payment_id)
        .map_err(|e| QuillError::Transaction(format!("payment id is not hex: {}", e)))?;

    let mut extra = vec![TX_EXTRA_NONCE, (raw.len() + 1) as u8, TX_EXTRA_NONCE_PAYMENT_ID];
    extra.extend_from_slice(&raw);

    Ok(extra)
}

/// Recover the payment id from an extra blob, if one is encoded.
pub fn payment_id_from_extra(extra: &[u8]) -> Option<String> {
    if extra.len() < 3 || extra[0] != TX_EXTRA_NONCE || extra[2] != TX_EXTRA_NONCE_PAYMENT_ID {
        return None;
    }

    let len = extra[1] as usize;

    if len < 1 || extra.len() != 2 + len {
        return None;
    }

    Some(hex::encode(&extra[3..]))
}

/// Prompt for an address, re-prompting until it validates. `None` means the
/// operator cancelled.
pub fn get_address(
    reader: &mut dyn LineReader,
    msg: &str,
) -> QuillResult<Option<(AddressType, String)>> {
    loop {
        match prompt(reader, msg)? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(address) => match parse_address(&address) {
                Ok(address_type) => return Ok(Some((address_type, address))),
                Err(e) => {
                    println!("{}", format!("地址无效: {}", e).yellow());
                    println!();
                }
            },
        }
    }
}

/// Prompt for an optional payment id: empty is accepted, anything else must
/// be 64 hex characters. `None` means the operator cancelled.
pub fn get_payment_id(reader: &mut dyn LineReader, msg: &str) -> QuillResult<Option<String>> {
    println!("{}", msg.cyan());

    loop {
        match prompt(reader, "付款编号 (可以留空): ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(payment_id) => {
                if payment_id.is_empty() || is_valid_payment_id(&payment_id) {
                    return Ok(Some(payment_id));
                }

                println!(
                    "{}",
                    "无法解析! 付款ID为64个字符的十六进制字符串.".yellow()
                );
                println!();
            }
        }
    }
}

#[cfg(test)]
pub fn test_standard_address() -> String {
    let body_len = WalletConfig::STANDARD_ADDRESS_LENGTH - WalletConfig::ADDRESS_PREFIX.len();
    format!("{}{}", WalletConfig::ADDRESS_PREFIX, "7".repeat(body_len))
}
