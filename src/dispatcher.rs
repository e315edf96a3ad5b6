//! Top-level command dispatch. Tokens reaching these functions have already
//! been validated by the menu layer; an unknown one here means that boundary
//! failed, which is fatal rather than a user error.

use crate::address_book;
use crate::addresses::{self, AddressType};
use crate::commands::{
    advanced_commands, advanced_view_wallet_commands, basic_commands,
    basic_view_wallet_commands, print_commands, Command, LaunchCommand,
};
use crate::config::WalletConfig;
use crate::engine::NodeClient;
use crate::error::{QuillError, QuillResult};
use crate::input::LineReader;
use crate::session::{self, WalletSession, WalletService};
use crate::status;
use crate::transactions;
use crate::transfer;
use colored::*;
use std::path::Path;

fn help(session: &WalletSession) {
    if session.is_view_wallet() {
        print_commands(&basic_view_wallet_commands(), 0);
    } else {
        print_commands(&basic_commands(), 0);
    }
}

fn advanced(session: &WalletSession) {
    // offset so the advanced numbering continues where the basic menu ended
    if session.is_view_wallet() {
        print_commands(
            &advanced_view_wallet_commands(),
            basic_view_wallet_commands().len(),
        );
    } else {
        print_commands(&advanced_commands(), basic_commands().len());
    }
}

/// Interactive integrated-address creation from an address and payment id
/// pair.
fn make_integrated_address(reader: &mut dyn LineReader) -> QuillResult<()> {
    println!("{}", "根据地址和付款ID对创建集成地址...".cyan());
    println!();

    let address = loop {
        match addresses::get_address(reader, "地址: ")? {
            None => {
                println!("{}", "取消创建综合地址.".yellow());
                return Ok(());
            }
            Some((AddressType::Standard, address)) => break address,
            Some((AddressType::Integrated, _)) => {
                println!("{}", "该地址已经是综合地址!".yellow());
                println!();
            }
        }
    };

    let payment_id = loop {
        match addresses::get_payment_id(reader, "付款编号?")? {
            None => {
                println!("{}", "取消创建综合地址.".yellow());
                return Ok(());
            }
            Some(pid) if !pid.is_empty() => break pid,
            Some(_) => {
                println!(
                    "{}",
                    "无法解析! 付款ID为64个字符的十六进制字符串.".yellow()
                );
                println!();
            }
        }
    };

    let integrated = addresses::create_integrated_address(&address, &payment_id)?;

    println!("{}", integrated.cyan());

    Ok(())
}

/// Dispatch one validated command token. Returns `false` only for the exit
/// token, ending the session loop.
pub fn handle_command(
    token: &str,
    session: &mut WalletSession,
    node: &dyn NodeClient,
    reader: &mut dyn LineReader,
    store: &address_book::AddressBookStore,
) -> QuillResult<bool> {
    let command = Command::from_token(token).ok_or_else(|| {
        QuillError::Internal(format!("命令已定义但未连接: {}", token))
    })?;

    match command {
        Command::Advanced => advanced(session),
        Command::Address => println!("{}", session.wallet.address().green()),
        Command::Balance => status::balance(node, session.wallet.as_ref()),
        Command::Backup => session::export_keys(reader, session)?,
        Command::Exit => return Ok(false),
        Command::Help => help(session),
        Command::Transfer => transfer::transfer(
            reader,
            session.wallet.as_mut(),
            node.last_known_block_height(),
            false,
            &node.fee_address(),
            node.fee_amount(),
        )?,
        Command::AbAdd => address_book::add_entry(reader, store)?,
        Command::AbDelete => address_book::delete_entry(reader, store)?,
        Command::AbList => address_book::list_entries(store)?,
        Command::AbSend => transfer::send_from_address_book(
            reader,
            store,
            session.wallet.as_mut(),
            node.last_known_block_height(),
            &node.fee_address(),
            node.fee_amount(),
        )?,
        Command::ChangePassword => session::change_password(reader, session)?,
        Command::MakeIntegratedAddress => make_integrated_address(reader)?,
        Command::IncomingTransfers => {
            transactions::list_transfers(true, false, session.wallet.as_ref())
        }
        Command::ListTransfers => {
            transactions::list_transfers(true, true, session.wallet.as_ref())
        }
        Command::Optimize => {
            println!("{}", "优化钱包...".cyan());
            let fused = session
                .wallet
                .full_optimize(node.last_known_block_height())?;
            println!("{}", format!("已发送 {} 个融合交易.", fused).green());
        }
        Command::OutgoingTransfers => {
            transactions::list_transfers(false, true, session.wallet.as_ref())
        }
        Command::Reset => session::reset(reader, session)?,
        Command::Save => session::save(session)?,
        Command::SaveCsv => transactions::save_csv(
            session.wallet.as_ref(),
            Path::new(WalletConfig::CSV_FILENAME),
        )?,
        Command::SendAll => transfer::transfer(
            reader,
            session.wallet.as_mut(),
            node.last_known_block_height(),
            true,
            &node.fee_address(),
            node.fee_amount(),
        )?,
        Command::Status => status::status(node, session.wallet.as_ref()),
    }

    Ok(true)
}

/// Dispatch one validated launch token into a loaded wallet session. `None`
/// means the operator cancelled the flow and the menu should be shown again.
pub fn handle_launch_command(
    token: &str,
    reader: &mut dyn LineReader,
    service: &dyn WalletService,
    preset_filename: Option<&str>,
) -> QuillResult<Option<WalletSession>> {
    let command = LaunchCommand::from_token(token).ok_or_else(|| {
        QuillError::Internal(format!("命令已定义但未连接: {}", token))
    })?;

    match command {
        LaunchCommand::Create => session::create_wallet(reader, service),
        LaunchCommand::Open => session::open_wallet(reader, service, preset_filename),
        LaunchCommand::SeedRestore => session::restore_from_seed(reader, service),
        LaunchCommand::KeyRestore => session::restore_from_keys(reader, service),
        LaunchCommand::ViewWallet => session::create_view_wallet(reader, service),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::address_book::AddressBookStore;
    use crate::engine::mock::{MockNode, MockWallet};
    use crate::input::Scripted;
    use tempfile::TempDir;

    fn fixture() -> (WalletSession, MockNode, TempDir) {
        let session = WalletSession {
            wallet_name: "test.wallet".to_string(),
            password: "hunter2".to_string(),
            wallet: Box::new(MockWallet::new()),
        };

        (session, MockNode::synced_at(100), TempDir::new().unwrap())
    }

    #[test]
    fn unknown_token_is_an_internal_error() {
        let (mut session, node, dir) = fixture();
        let store = AddressBookStore::new(dir.path().join("addressBook.json"));
        let mut reader = Scripted::new(Vec::<String>::new());

        let err = handle_command("不存在的命令", &mut session, &node, &mut reader, &store)
            .unwrap_err();

        assert!(matches!(err, QuillError::Internal(_)));
    }

    #[test]
    fn exit_token_ends_the_loop_others_continue() {
        let (mut session, node, dir) = fixture();
        let store = AddressBookStore::new(dir.path().join("addressBook.json"));
        let mut reader = Scripted::new(Vec::<String>::new());

        assert!(!handle_command("出口", &mut session, &node, &mut reader, &store).unwrap());
        assert!(handle_command("保存", &mut session, &node, &mut reader, &store).unwrap());
        assert!(handle_command("状态", &mut session, &node, &mut reader, &store).unwrap());
        assert!(handle_command("ab_清单", &mut session, &node, &mut reader, &store).unwrap());
    }

    #[test]
    fn address_book_commands_dispatch_to_flows() {
        let (mut session, node, dir) = fixture();
        let store = AddressBookStore::new(dir.path().join("addressBook.json"));

        let address = crate::addresses::test_standard_address();
        let mut reader = Scripted::new(["Alice", address.as_str(), ""]);

        handle_command("ab_加", &mut session, &node, &mut reader, &store).unwrap();

        assert_eq!(store.load().unwrap().len(), 1);
    }

    #[test]
    fn unknown_launch_token_is_an_internal_error() {
        struct NoService;

        impl WalletService for NoService {
            fn create(
                &self,
                _f: &str,
                _p: &str,
            ) -> QuillResult<Box<dyn crate::engine::WalletBackend>> {
                unreachable!()
            }

            fn open(
                &self,
                _f: &str,
                _p: &str,
            ) -> QuillResult<Box<dyn crate::engine::WalletBackend>> {
                unreachable!()
            }

            fn restore_from_seed(
                &self,
                _f: &str,
                _p: &str,
                _s: &str,
            ) -> QuillResult<Box<dyn crate::engine::WalletBackend>> {
                unreachable!()
            }

            fn restore_from_keys(
                &self,
                _f: &str,
                _p: &str,
                _v: &str,
                _s: &str,
            ) -> QuillResult<Box<dyn crate::engine::WalletBackend>> {
                unreachable!()
            }

            fn create_view_wallet(
                &self,
                _f: &str,
                _p: &str,
                _v: &str,
                _a: &str,
            ) -> QuillResult<Box<dyn crate::engine::WalletBackend>> {
                unreachable!()
            }
        }

        let mut reader = Scripted::new(Vec::<String>::new());

        // a session holds a boxed engine, so never format the Ok side
        let err = match handle_launch_command("创建", &mut reader, &NoService, None) {
            Err(e) => e,
            Ok(_) => panic!("expected dispatch to fail on an unknown token"),
        };
        assert!(matches!(err, QuillError::Internal(_)));
    }
}
