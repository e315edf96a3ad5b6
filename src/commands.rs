//! Closed command sets and their localized tokens. Tokens are fixed string
//! constants, compared case-sensitively; the menu layer validates operator
//! input against these tables before anything reaches the dispatcher.

use colored::*;

/// Pre-wallet session-selection commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LaunchCommand {
    Create,
    Open,
    SeedRestore,
    KeyRestore,
    ViewWallet,
}

impl LaunchCommand {
    pub const ALL: [LaunchCommand; 5] = [
        LaunchCommand::Create,
        LaunchCommand::Open,
        LaunchCommand::SeedRestore,
        LaunchCommand::KeyRestore,
        LaunchCommand::ViewWallet,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            LaunchCommand::Create => "创造",
            LaunchCommand::Open => "打开",
            LaunchCommand::SeedRestore => "种子还原",
            LaunchCommand::KeyRestore => "密钥还原",
            LaunchCommand::ViewWallet => "查看钱包",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            LaunchCommand::Create => "创建一个新的钱包",
            LaunchCommand::Open => "打开已有的钱包",
            LaunchCommand::SeedRestore => "用助记种子还原钱包",
            LaunchCommand::KeyRestore => "用私钥还原钱包",
            LaunchCommand::ViewWallet => "创建仅查看钱包",
        }
    }

    pub fn from_token(token: &str) -> Option<LaunchCommand> {
        Self::ALL.into_iter().find(|cmd| cmd.token() == token)
    }
}

/// Post-wallet console commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Advanced,
    Address,
    Balance,
    Backup,
    Exit,
    Help,
    Transfer,
    AbAdd,
    AbDelete,
    AbList,
    AbSend,
    ChangePassword,
    MakeIntegratedAddress,
    IncomingTransfers,
    ListTransfers,
    Optimize,
    OutgoingTransfers,
    Reset,
    Save,
    SaveCsv,
    SendAll,
    Status,
}

impl Command {
    pub const ALL: [Command; 22] = [
        Command::Advanced,
        Command::Address,
        Command::Balance,
        Command::Backup,
        Command::Exit,
        Command::Help,
        Command::Transfer,
        Command::AbAdd,
        Command::AbDelete,
        Command::AbList,
        Command::AbSend,
        Command::ChangePassword,
        Command::MakeIntegratedAddress,
        Command::IncomingTransfers,
        Command::ListTransfers,
        Command::Optimize,
        Command::OutgoingTransfers,
        Command::Reset,
        Command::Save,
        Command::SaveCsv,
        Command::SendAll,
        Command::Status,
    ];

    pub fn token(&self) -> &'static str {
        match self {
            Command::Advanced => "高级",
            Command::Address => "地址",
            Command::Balance => "平衡",
            Command::Backup => "后备",
            Command::Exit => "出口",
            Command::Help => "救命",
            Command::Transfer => "转让",
            Command::AbAdd => "ab_加",
            Command::AbDelete => "ab_删除",
            Command::AbList => "ab_清单",
            Command::AbSend => "ab_发送",
            Command::ChangePassword => "更改密码",
            Command::MakeIntegratedAddress => "填写综合地址",
            Command::IncomingTransfers => "传入转账",
            Command::ListTransfers => "清单转移",
            Command::Optimize => "优化",
            Command::OutgoingTransfers => "外向转账",
            Command::Reset => "重启",
            Command::Save => "保存",
            Command::SaveCsv => "保存_csv",
            Command::SendAll => "全部发送",
            Command::Status => "状态",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Command::Advanced => "列出高级命令",
            Command::Address => "显示您的钱包地址",
            Command::Balance => "显示您的余额",
            Command::Backup => "导出您的私钥",
            Command::Exit => "退出并保存您的钱包",
            Command::Help => "列出基本命令",
            Command::Transfer => "发送资金到一个地址",
            Command::AbAdd => "添加通讯录条目",
            Command::AbDelete => "删除通讯录条目",
            Command::AbList => "列出所有通讯录条目",
            Command::AbSend => "发送资金给通讯录中的联系人",
            Command::ChangePassword => "更改钱包密码",
            Command::MakeIntegratedAddress => "根据地址和付款ID创建综合地址",
            Command::IncomingTransfers => "显示传入转账",
            Command::ListTransfers => "显示所有转账",
            Command::Optimize => "优化您的钱包输出",
            Command::OutgoingTransfers => "显示外向转账",
            Command::Reset => "从指定高度重新扫描区块链",
            Command::Save => "保存您的钱包",
            Command::SaveCsv => "将所有转账导出到CSV文件",
            Command::SendAll => "发送全部余额到一个地址",
            Command::Status => "显示守护程序和钱包的同步状态",
        }
    }

    pub fn from_token(token: &str) -> Option<Command> {
        Self::ALL.into_iter().find(|cmd| cmd.token() == token)
    }
}

pub fn basic_commands() -> Vec<Command> {
    vec![
        Command::Advanced,
        Command::Address,
        Command::Balance,
        Command::Backup,
        Command::Exit,
        Command::Help,
        Command::Transfer,
    ]
}

pub fn basic_view_wallet_commands() -> Vec<Command> {
    vec![
        Command::Advanced,
        Command::Address,
        Command::Balance,
        Command::Backup,
        Command::Exit,
        Command::Help,
    ]
}

pub fn advanced_commands() -> Vec<Command> {
    vec![
        Command::AbAdd,
        Command::AbDelete,
        Command::AbList,
        Command::AbSend,
        Command::ChangePassword,
        Command::MakeIntegratedAddress,
        Command::IncomingTransfers,
        Command::ListTransfers,
        Command::Optimize,
        Command::OutgoingTransfers,
        Command::Reset,
        Command::Save,
        Command::SaveCsv,
        Command::SendAll,
        Command::Status,
    ]
}

/// A view-only wallet cannot construct outgoing transactions, so the spend
/// and outgoing-display commands drop out.
pub fn advanced_view_wallet_commands() -> Vec<Command> {
    vec![
        Command::AbAdd,
        Command::AbDelete,
        Command::AbList,
        Command::ChangePassword,
        Command::MakeIntegratedAddress,
        Command::IncomingTransfers,
        Command::Reset,
        Command::Save,
        Command::SaveCsv,
        Command::Status,
    ]
}

/// Every command this session accepts; the menu loop validates tokens
/// against this before dispatch.
pub fn all_commands(view_wallet: bool) -> Vec<Command> {
    let mut commands = if view_wallet {
        basic_view_wallet_commands()
    } else {
        basic_commands()
    };

    commands.extend(if view_wallet {
        advanced_view_wallet_commands()
    } else {
        advanced_commands()
    });

    commands
}

/// Numbered command listing. `offset` lets the advanced listing continue the
/// numbering where the basic one stopped.
pub fn print_commands(commands: &[Command], offset: usize) {
    println!();

    for (index, command) in commands.iter().enumerate() {
        println!(
            " {}\t{}{}",
            format!("{}", index + offset + 1).yellow(),
            format!("{:<14}", command.token()).green(),
            command.description()
        );
    }

    println!();
}

pub fn print_launch_commands() {
    println!();

    for (index, command) in LaunchCommand::ALL.iter().enumerate() {
        println!(
            " {}\t{}{}",
            format!("{}", index + 1).yellow(),
            format!("{:<10}", command.token()).green(),
            command.description()
        );
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn command_tokens_round_trip() {
        for command in Command::ALL {
            assert_eq!(Command::from_token(command.token()), Some(command));
        }

        assert_eq!(Command::from_token("transfer"), None);
        assert_eq!(Command::from_token(""), None);
    }

    #[test]
    fn launch_tokens_round_trip() {
        for command in LaunchCommand::ALL {
            assert_eq!(LaunchCommand::from_token(command.token()), Some(command));
        }

        assert_eq!(LaunchCommand::from_token("open"), None);
    }

    #[test]
    fn tokens_are_disjoint() {
        let mut tokens: Vec<&str> = Command::ALL.iter().map(|c| c.token()).collect();
        tokens.sort_unstable();
        tokens.dedup();
        assert_eq!(tokens.len(), Command::ALL.len());
    }

    #[test]
    fn view_wallet_menus_exclude_spend_commands() {
        let commands = all_commands(true);

        assert!(!commands.contains(&Command::Transfer));
        assert!(!commands.contains(&Command::SendAll));
        assert!(!commands.contains(&Command::AbSend));
        assert!(!commands.contains(&Command::Optimize));
        assert!(!commands.contains(&Command::OutgoingTransfers));

        assert!(commands.contains(&Command::Balance));
        assert!(commands.contains(&Command::AbAdd));
    }

    #[test]
    fn every_menu_command_is_dispatchable() {
        for command in all_commands(false) {
            assert_eq!(Command::from_token(command.token()), Some(command));
        }
    }
}
