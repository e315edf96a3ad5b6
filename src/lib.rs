// quill: the interactive console wallet.

pub mod error;
pub mod config;
pub mod input;
pub mod addresses;
pub mod address_book;
pub mod engine;
pub mod transfer;
pub mod status;
pub mod transactions;
pub mod session;
pub mod commands;
pub mod dispatcher;

pub use error::{QuillError, QuillResult};
pub use config::{Cli, WalletConfig};
pub use input::{Console, LineReader, Prompted};
pub use address_book::{AddressBook, AddressBookEntry, AddressBookStore};
pub use engine::{DaemonClient, NodeClient, RpcWalletService, WalletBackend, WalletTransaction};
pub use transfer::TransferRequest;
pub use status::{Heights, SyncSummary};
pub use session::{WalletService, WalletSession};
pub use commands::{Command, LaunchCommand};
