use clap::Parser;
use colored::*;
use quill::commands::{all_commands, print_commands, print_launch_commands, LaunchCommand};
use quill::config::{Cli, WalletConfig};
use quill::dispatcher::{handle_command, handle_launch_command};
use quill::engine::{DaemonClient, RpcWalletService};
use quill::error::{QuillError, QuillResult};
use quill::input::{Console, LineReader};
use quill::{AddressBookStore, WalletSession};

fn main() {
    let cli = Cli::parse();

    if let Err(e) = run(&cli) {
        eprintln!("{}", format!("错误: {}", e).red());
        std::process::exit(1);
    }
}

fn run(cli: &Cli) -> QuillResult<()> {
    println!("{}", format!("{} 钱包控制台", WalletConfig::WALLET_NAME).cyan());
    println!();

    let mut node = DaemonClient::new(&cli.daemon_host, cli.daemon_port);

    if node.refresh().is_err() {
        println!(
            "{}",
            format!(
                "无法连接到 {} ({}:{})! 高度和费用信息将不可用.",
                WalletConfig::DAEMON_NAME,
                cli.daemon_host,
                cli.daemon_port
            )
            .yellow()
        );
        println!();
    }

    let service = RpcWalletService::new(&cli.wallet_host, cli.wallet_port);
    let store = AddressBookStore::new(WalletConfig::ADDRESS_BOOK_FILENAME);
    let mut reader = Console;

    let mut session = launch(cli, &mut reader, &service)?;

    println!();

    loop {
        let line = reader.read_line(&format!(
            "[{} {}]: ",
            WalletConfig::WALLET_NAME,
            session.wallet_name
        ))?;
        let line = line.trim();

        if line.is_empty() {
            continue;
        }

        // The menu layer owns token validation; only known tokens may reach
        // the dispatcher.
        let token = match resolve_token(line, session.is_view_wallet()) {
            Some(token) => token,
            None => {
                println!(
                    "{}",
                    format!("未知命令: {}. 输入“救命”查看命令列表.", line).yellow()
                );
                continue;
            }
        };

        // Refresh cached figures; a flaky daemon must not block commands
        let _ = node.refresh();
        let _ = session.wallet.refresh();

        match handle_command(token, &mut session, &node, &mut reader, &store) {
            Ok(true) => {}
            Ok(false) => break,
            Err(e @ QuillError::Internal(_)) => return Err(e),
            Err(e) => println!("{}", format!("{}", e).red()),
        }
    }

    quill::session::save(&mut session)?;
    println!("{}", "再见!".cyan());

    Ok(())
}

/// Resolve operator input to a known command token: either the token itself
/// or its menu number.
fn resolve_token(line: &str, view_wallet: bool) -> Option<&'static str> {
    let commands = all_commands(view_wallet);

    if let Ok(index) = line.parse::<usize>() {
        return commands.get(index.checked_sub(1)?).map(|c| c.token());
    }

    commands
        .iter()
        .find(|c| c.token() == line)
        .map(|c| c.token())
}

/// Show the launch menu until a wallet session is loaded. A `--wallet-file`
/// argument skips the menu and opens that wallet directly.
fn launch(
    cli: &Cli,
    reader: &mut dyn LineReader,
    service: &RpcWalletService,
) -> QuillResult<WalletSession> {
    loop {
        let (token, preset) = match &cli.wallet_file {
            Some(file) => (LaunchCommand::Open.token(), Some(file.as_str())),
            None => {
                print_launch_commands();

                let line = reader.read_line(&format!("[{}]: ", WalletConfig::WALLET_NAME))?;
                let line = line.trim();

                let command = if let Ok(index) = line.parse::<usize>() {
                    index
                        .checked_sub(1)
                        .and_then(|i| LaunchCommand::ALL.get(i).copied())
                } else {
                    LaunchCommand::from_token(line)
                };

                match command {
                    Some(command) => (command.token(), None),
                    None => {
                        println!("{}", format!("未知命令: {}", line).yellow());
                        continue;
                    }
                }
            }
        };

        match handle_launch_command(token, reader, service, preset) {
            Ok(Some(session)) => {
                print_initial_menu(&session);
                return Ok(session);
            }
            Ok(None) => continue,
            Err(e @ QuillError::Internal(_)) => return Err(e),
            Err(e) => {
                println!("{}", format!("{}", e).red());

                // A preset wallet that fails to open would loop forever
                if cli.wallet_file.is_some() {
                    return Err(e);
                }
            }
        }
    }
}

fn print_initial_menu(session: &WalletSession) {
    if session.is_view_wallet() {
        print_commands(&quill::commands::basic_view_wallet_commands(), 0);
    } else {
        print_commands(&quill::commands::basic_commands(), 0);
    }
}
