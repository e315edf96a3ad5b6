//! Wallet session context and the launch / maintenance flows around it

use crate::addresses::{get_address, is_valid_payment_id, AddressType};
use crate::engine::WalletBackend;
use crate::error::QuillResult;
use crate::input::{confirm, prompt, LineReader, Prompted};
use colored::*;
use std::path::Path;

/// Everything the command handlers need, threaded through each call so
/// read-only vs mutating access stays visible at the call sites.
pub struct WalletSession {
    pub wallet_name: String,
    pub password: String,
    pub wallet: Box<dyn WalletBackend>,
}

impl WalletSession {
    pub fn is_view_wallet(&self) -> bool {
        self.wallet.is_view_wallet()
    }
}

/// Seam to the external wallet engine's lifecycle operations. Key
/// derivation, mnemonic encoding and the wallet file format all live on the
/// other side of this trait.
pub trait WalletService {
    fn create(&self, filename: &str, password: &str) -> QuillResult<Box<dyn WalletBackend>>;

    fn open(&self, filename: &str, password: &str) -> QuillResult<Box<dyn WalletBackend>>;

    fn restore_from_seed(
        &self,
        filename: &str,
        password: &str,
        seed: &str,
    ) -> QuillResult<Box<dyn WalletBackend>>;

    fn restore_from_keys(
        &self,
        filename: &str,
        password: &str,
        view_key: &str,
        spend_key: &str,
    ) -> QuillResult<Box<dyn WalletBackend>>;

    fn create_view_wallet(
        &self,
        filename: &str,
        password: &str,
        view_key: &str,
        address: &str,
    ) -> QuillResult<Box<dyn WalletBackend>>;
}

/// Prompt for a filename that does not exist yet. `None` means cancelled.
fn get_new_wallet_filename(reader: &mut dyn LineReader) -> QuillResult<Option<String>> {
    loop {
        match prompt(reader, "您想给您的新钱包起什么名字?: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(name) if name.is_empty() => {
                println!("{}", "钱包名称不能为空!".yellow());
                println!();
            }
            Prompted::Line(name) => {
                if Path::new(&name).exists() {
                    println!("{}", "具有该名称的钱包已存在!".yellow());
                    println!();
                    continue;
                }

                return Ok(Some(name));
            }
        }
    }
}

/// Prompt for a filename that already exists. `None` means cancelled.
fn get_existing_wallet_filename(reader: &mut dyn LineReader) -> QuillResult<Option<String>> {
    loop {
        match prompt(reader, "您的钱包叫什么名字?: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(name) => {
                if !Path::new(&name).exists() {
                    println!("{}", "找不到具有该名称的钱包!".yellow());
                    println!();
                    continue;
                }

                return Ok(Some(name));
            }
        }
    }
}

/// Password entry. With `verify` the operator types it twice and a mismatch
/// restarts the pair.
pub fn get_wallet_password(
    reader: &mut dyn LineReader,
    verify: bool,
) -> QuillResult<Option<String>> {
    loop {
        let password = match prompt(reader, "输入您的钱包密码: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(password) => password,
        };

        if !verify {
            return Ok(Some(password));
        }

        let again = match prompt(reader, "再次确认密码: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(password) => password,
        };

        if password == again {
            return Ok(Some(password));
        }

        println!("{}", "密码不匹配! 请再试一次.".yellow());
        println!();
    }
}

/// Prompt for one 64-hex private key. `None` means cancelled.
fn get_private_key(reader: &mut dyn LineReader, msg: &str) -> QuillResult<Option<String>> {
    loop {
        match prompt(reader, msg)? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(key) => {
                // private keys share the payment id shape: 64 hex chars
                if is_valid_payment_id(&key) {
                    return Ok(Some(key));
                }

                println!("{}", "无法解析! 私钥为64个字符的十六进制字符串.".yellow());
                println!();
            }
        }
    }
}

macro_rules! cancelled_launch {
    () => {{
        println!("{}", "取消打开钱包.".yellow());
        return Ok(None);
    }};
}

pub fn create_wallet(
    reader: &mut dyn LineReader,
    service: &dyn WalletService,
) -> QuillResult<Option<WalletSession>> {
    let wallet_name = match get_new_wallet_filename(reader)? {
        Some(name) => name,
        None => cancelled_launch!(),
    };

    let password = match get_wallet_password(reader, true)? {
        Some(password) => password,
        None => cancelled_launch!(),
    };

    let wallet = service.create(&wallet_name, &password)?;

    println!("{}", "您的钱包已创建!".green());
    println!();
    println!("{}", wallet.address().green());

    Ok(Some(WalletSession {
        wallet_name,
        password,
        wallet,
    }))
}

pub fn open_wallet(
    reader: &mut dyn LineReader,
    service: &dyn WalletService,
    preset_filename: Option<&str>,
) -> QuillResult<Option<WalletSession>> {
    let wallet_name = match preset_filename {
        Some(name) => name.to_string(),
        None => match get_existing_wallet_filename(reader)? {
            Some(name) => name,
            None => cancelled_launch!(),
        },
    };

    let password = match get_wallet_password(reader, false)? {
        Some(password) => password,
        None => cancelled_launch!(),
    };

    let wallet = service.open(&wallet_name, &password)?;

    println!(
        "{}",
        format!("您的钱包 {} 已打开!", wallet.address()).green()
    );

    Ok(Some(WalletSession {
        wallet_name,
        password,
        wallet,
    }))
}

pub fn restore_from_seed(
    reader: &mut dyn LineReader,
    service: &dyn WalletService,
) -> QuillResult<Option<WalletSession>> {
    let seed = match prompt(reader, "输入您的助记种子: ")? {
        Prompted::Cancelled => cancelled_launch!(),
        Prompted::Line(seed) => seed,
    };

    let wallet_name = match get_new_wallet_filename(reader)? {
        Some(name) => name,
        None => cancelled_launch!(),
    };

    let password = match get_wallet_password(reader, true)? {
        Some(password) => password,
        None => cancelled_launch!(),
    };

    let wallet = service.restore_from_seed(&wallet_name, &password, &seed)?;

    println!("{}", "您的钱包已恢复!".green());

    Ok(Some(WalletSession {
        wallet_name,
        password,
        wallet,
    }))
}

pub fn restore_from_keys(
    reader: &mut dyn LineReader,
    service: &dyn WalletService,
) -> QuillResult<Option<WalletSession>> {
    let spend_key = match get_private_key(reader, "输入您的私人消费钥匙: ")? {
        Some(key) => key,
        None => cancelled_launch!(),
    };

    let view_key = match get_private_key(reader, "输入您的私密视图键: ")? {
        Some(key) => key,
        None => cancelled_launch!(),
    };

    let wallet_name = match get_new_wallet_filename(reader)? {
        Some(name) => name,
        None => cancelled_launch!(),
    };

    let password = match get_wallet_password(reader, true)? {
        Some(password) => password,
        None => cancelled_launch!(),
    };

    let wallet = service.restore_from_keys(&wallet_name, &password, &view_key, &spend_key)?;

    println!("{}", "您的钱包已恢复!".green());

    Ok(Some(WalletSession {
        wallet_name,
        password,
        wallet,
    }))
}

pub fn create_view_wallet(
    reader: &mut dyn LineReader,
    service: &dyn WalletService,
) -> QuillResult<Option<WalletSession>> {
    let view_key = match get_private_key(reader, "输入您的私密视图键: ")? {
        Some(key) => key,
        None => cancelled_launch!(),
    };

    let address = loop {
        match get_address(reader, "输入您的钱包地址: ")? {
            None => cancelled_launch!(),
            Some((AddressType::Standard, address)) => break address,
            Some((AddressType::Integrated, _)) => {
                println!("{}", "查看钱包需要标准地址，而不是综合地址.".yellow());
                println!();
            }
        }
    };

    let wallet_name = match get_new_wallet_filename(reader)? {
        Some(name) => name,
        None => cancelled_launch!(),
    };

    let password = match get_wallet_password(reader, true)? {
        Some(password) => password,
        None => cancelled_launch!(),
    };

    let wallet = service.create_view_wallet(&wallet_name, &password, &view_key, &address)?;

    println!("{}", "您的查看钱包已创建!".green());

    Ok(Some(WalletSession {
        wallet_name,
        password,
        wallet,
    }))
}

/// Re-prompt until the operator proves they know the current password.
/// `false` means they cancelled instead.
fn confirm_password(reader: &mut dyn LineReader, session: &WalletSession) -> QuillResult<bool> {
    loop {
        match prompt(reader, "确认您的当前密码: ")? {
            Prompted::Cancelled => return Ok(false),
            Prompted::Line(password) => {
                if password == session.password {
                    return Ok(true);
                }

                println!("{}", "密码错误! 请再试一次.".yellow());
                println!();
            }
        }
    }
}

pub fn change_password(
    reader: &mut dyn LineReader,
    session: &mut WalletSession,
) -> QuillResult<()> {
    if !confirm_password(reader, session)? {
        println!("{}", "取消更改密码.".yellow());
        return Ok(());
    }

    let new_password = match get_wallet_password(reader, true)? {
        Some(password) => password,
        None => {
            println!("{}", "取消更改密码.".yellow());
            return Ok(());
        }
    };

    session
        .wallet
        .change_password(&session.password, &new_password)?;
    session.password = new_password;

    // Make sure we save with the new password
    session.wallet.save()?;

    println!("{}", "您的密码已被更改!".green());

    Ok(())
}

pub fn export_keys(reader: &mut dyn LineReader, session: &WalletSession) -> QuillResult<()> {
    if !confirm_password(reader, session)? {
        println!("{}", "取消导出密钥.".yellow());
        return Ok(());
    }

    print_private_keys(session);
    Ok(())
}

fn print_private_keys(session: &WalletSession) {
    if session.is_view_wallet() {
        println!("{}", "私密视图键:".green());
        println!("{}", session.wallet.private_view_key().green());
        return;
    }

    if let Some(spend_key) = session.wallet.private_spend_key() {
        println!("{}", "私人消费钥匙:".green());
        println!("{}", spend_key.green());
        println!();
    }

    println!("{}", "私密视图键:".green());
    println!("{}", session.wallet.private_view_key().green());

    if let Some(seed) = session.wallet.mnemonic_seed() {
        println!();
        println!("{}", "助记种子:".green());
        println!("{}", seed.green());
    }
}

/// Prompt for the height a rescan starts from. Empty means from the
/// beginning. `None` means cancelled.
fn get_scan_height(reader: &mut dyn LineReader) -> QuillResult<Option<u64>> {
    loop {
        match prompt(reader, "输入要从其重新扫描的块高度 (可以留空): ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(input) if input.is_empty() => return Ok(Some(0)),
            Prompted::Line(input) => match input.parse() {
                Ok(height) => return Ok(Some(height)),
                Err(_) => {
                    println!("{}", "无法解析块高度!".yellow());
                    println!();
                }
            },
        }
    }
}

pub fn reset(reader: &mut dyn LineReader, session: &mut WalletSession) -> QuillResult<()> {
    let scan_height = match get_scan_height(reader)? {
        Some(height) => height,
        None => {
            println!("{}", "取消重启.".yellow());
            return Ok(());
        }
    };

    println!();
    println!("{}", "此过程可能需要一些时间才能完成.".cyan());
    println!("{}", "您在处理期间无法进行任何交易.".cyan());
    println!();

    if !confirm(reader, "你确定吗?")? {
        return Ok(());
    }

    println!("{}", "重置钱包...".cyan());

    session.wallet.reset(scan_height)?;

    Ok(())
}

pub fn save(session: &mut WalletSession) -> QuillResult<()> {
    println!("{}", "保存.".cyan());
    session.wallet.save()?;
    println!("{}", "已保存.".cyan());
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::mock::MockWallet;
    use crate::input::Scripted;

    fn session() -> WalletSession {
        WalletSession {
            wallet_name: "test.wallet".to_string(),
            password: "hunter2".to_string(),
            wallet: Box::new(MockWallet::new()),
        }
    }

    struct MockService;

    impl WalletService for MockService {
        fn create(&self, _f: &str, _p: &str) -> QuillResult<Box<dyn WalletBackend>> {
            Ok(Box::new(MockWallet::new()))
        }

        fn open(&self, _f: &str, _p: &str) -> QuillResult<Box<dyn WalletBackend>> {
            Ok(Box::new(MockWallet::new()))
        }

        fn restore_from_seed(
            &self,
            _f: &str,
            _p: &str,
            _s: &str,
        ) -> QuillResult<Box<dyn WalletBackend>> {
            Ok(Box::new(MockWallet::new()))
        }

        fn restore_from_keys(
            &self,
            _f: &str,
            _p: &str,
            _v: &str,
            _s: &str,
        ) -> QuillResult<Box<dyn WalletBackend>> {
            Ok(Box::new(MockWallet::new()))
        }

        fn create_view_wallet(
            &self,
            _f: &str,
            _p: &str,
            _v: &str,
            _a: &str,
        ) -> QuillResult<Box<dyn WalletBackend>> {
            let mut wallet = MockWallet::new();
            wallet.view_wallet = true;
            Ok(Box::new(wallet))
        }
    }

    #[test]
    fn password_change_requires_current_password() {
        let mut s = session();

        // two wrong guesses, then the right one, then the new pair
        let mut reader = Scripted::new(["guess", "wrong", "hunter2", "newpass", "newpass"]);
        change_password(&mut reader, &mut s).unwrap();

        assert_eq!(s.password, "newpass");
    }

    #[test]
    fn password_change_cancel_keeps_old_password() {
        let mut s = session();

        let mut reader = Scripted::new(["取消"]);
        change_password(&mut reader, &mut s).unwrap();

        assert_eq!(s.password, "hunter2");
    }

    #[test]
    fn password_verification_reprompts_on_mismatch() {
        let mut reader = Scripted::new(["one", "two", "same", "same"]);

        let password = get_wallet_password(&mut reader, true).unwrap().unwrap();
        assert_eq!(password, "same");
    }

    #[test]
    fn restore_from_keys_validates_key_shape() {
        let spend = "ab".repeat(32);
        let view = "cd".repeat(32);

        let mut reader = Scripted::new([
            "short",
            spend.as_str(),
            view.as_str(),
            "restored.wallet",
            "pw",
            "pw",
        ]);

        let s = restore_from_keys(&mut reader, &MockService)
            .unwrap()
            .unwrap();
        assert_eq!(s.wallet_name, "restored.wallet");
    }

    #[test]
    fn view_wallet_launch_rejects_integrated_address() {
        let view = "cd".repeat(32);
        let standard = crate::addresses::test_standard_address();
        let integrated =
            crate::addresses::create_integrated_address(&standard, &"ee".repeat(32)).unwrap();

        let mut reader = Scripted::new([
            view.as_str(),
            integrated.as_str(),
            standard.as_str(),
            "view.wallet",
            "pw",
            "pw",
        ]);

        let s = create_view_wallet(&mut reader, &MockService)
            .unwrap()
            .unwrap();
        assert!(s.is_view_wallet());
    }

    #[test]
    fn scan_height_defaults_to_zero_and_reprompts() {
        let mut reader = Scripted::new(["abc", ""]);
        assert_eq!(get_scan_height(&mut reader).unwrap(), Some(0));

        let mut reader = Scripted::new(["12345"]);
        assert_eq!(get_scan_height(&mut reader).unwrap(), Some(12345));
    }

    #[test]
    fn reset_rewinds_to_scan_height() {
        let mut s = session();

        let mut reader = Scripted::new(["500", "y"]);
        reset(&mut reader, &mut s).unwrap();

        assert_eq!(s.wallet.block_count(), 500);
    }
}
