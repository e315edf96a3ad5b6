//! Persisted contact store with friendly-name lookup and its interactive
//! flows. Every flow reloads the book from disk and rewrites the whole file
//! on mutation; concurrent external writers race (last save wins).

use crate::addresses::{get_address, get_payment_id, AddressType};
use crate::error::QuillResult;
use crate::input::{confirm, prompt, LineReader, Prompted};
use colored::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AddressBookEntry {
    pub friendly_name: String,
    pub address: String,

    /// Empty unless the address is a non-integrated standard address.
    pub payment_id: String,

    /// True iff `address` already encodes a payment id; mutually exclusive
    /// with a non-empty `payment_id`.
    pub integrated_address: bool,
}

pub type AddressBook = Vec<AddressBookEntry>;

pub struct AddressBookStore {
    path: PathBuf,
}

impl AddressBookStore {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// A missing file is an empty book, not an error. A file that exists but
    /// fails to parse propagates, failing the calling operation.
    pub fn load(&self) -> QuillResult<AddressBook> {
        if !self.path.exists() {
            return Ok(AddressBook::new());
        }

        let data = fs::read_to_string(&self.path)?;
        Ok(serde_json::from_str(&data)?)
    }

    /// Whole-file overwrite. No temp-file rename, so an interrupted write
    /// can corrupt the file.
    pub fn save(&self, book: &AddressBook) -> QuillResult<()> {
        let data = serde_json::to_string_pretty(book)?;
        fs::write(&self.path, data)?;
        Ok(())
    }
}

/// Save and report. On failure the caller's in-memory mutation is simply
/// dropped; the next flow reloads from disk.
fn save_and_report(store: &AddressBookStore, book: &AddressBook) -> bool {
    match store.save(book) {
        Ok(()) => true,
        Err(e) => {
            println!("{}", "无法将地址簿保存到磁盘!".yellow());
            println!(
                "{}",
                format!("检查您是否能够将文件写入到当前目录. ({})", e).yellow()
            );
            false
        }
    }
}

fn find_by_name<'a>(book: &'a AddressBook, name: &str) -> Option<&'a AddressBookEntry> {
    book.iter().find(|entry| entry.friendly_name == name)
}

/// Prompt for a friendly name, rejecting duplicates with a re-prompt. Only
/// cancellation aborts; `None` means cancelled.
fn get_book_name(reader: &mut dyn LineReader, book: &AddressBook) -> QuillResult<Option<String>> {
    loop {
        match prompt(reader, "您想要什么友好的名字给这个通讯录条目?: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(name) => {
                if find_by_name(book, &name).is_some() {
                    println!("{}", "与此名称相关的通讯录条目已经存在!".yellow());
                    println!();
                    continue;
                }

                return Ok(Some(name));
            }
        }
    }
}

pub fn add_entry(reader: &mut dyn LineReader, store: &AddressBookStore) -> QuillResult<()> {
    println!(
        "{}",
        "注意：您可以随时输入“取消”来取消将某人添加到您的地址簿".cyan()
    );
    println!();

    let mut book = store.load()?;

    let friendly_name = match get_book_name(reader, &book)? {
        Some(name) => name,
        None => {
            println!("{}", "取消添加到地址簿.".yellow());
            return Ok(());
        }
    };

    let (address_type, address) = match get_address(reader, "\n该用户有什么地址? ")? {
        Some(parsed) => parsed,
        None => {
            println!("{}", "取消添加到地址簿.".yellow());
            return Ok(());
        }
    };

    let integrated_address = address_type == AddressType::Integrated;
    let mut payment_id = String::new();

    // An integrated address carries its payment id internally, so the
    // separate field stays empty.
    if !integrated_address {
        match get_payment_id(reader, "\n此通讯录条目是否具有与其关联的付款ID?")? {
            Some(pid) => payment_id = pid,
            None => {
                println!("{}", "取消添加到地址簿.".yellow());
                return Ok(());
            }
        }
    }

    book.push(AddressBookEntry {
        friendly_name,
        address,
        payment_id,
        integrated_address,
    });

    if save_and_report(store, &book) {
        println!();
        println!("{}", "新条目已添加到您的地址簿!".green());
    }

    Ok(())
}

pub fn delete_entry(reader: &mut dyn LineReader, store: &AddressBookStore) -> QuillResult<()> {
    let mut book = store.load()?;

    if report_if_empty(&book) {
        return Ok(());
    }

    loop {
        println!("{}", "注意：您可以随时输入“取消”取消删除".cyan());
        println!();

        let friendly_name = match prompt(reader, "您要删除什么通讯录条目?: ")? {
            Prompted::Cancelled => {
                println!("{}", "取消删除.".yellow());
                return Ok(());
            }
            Prompted::Line(name) => name,
        };

        if let Some(index) = book
            .iter()
            .position(|entry| entry.friendly_name == friendly_name)
        {
            book.remove(index);

            if save_and_report(store, &book) {
                println!();
                println!("{}", "此项已从您的通讯录中删除!".green());
            }

            return Ok(());
        }

        println!();
        println!(
            "{}",
            format!("找不到名称为 {} 的用户在您的通讯录中!", friendly_name).yellow()
        );
        println!();

        if confirm(reader, "您想列出您地址簿中的所有人吗?")? {
            println!();
            print_entries(&book);
        }
    }
}

pub fn list_entries(store: &AddressBookStore) -> QuillResult<()> {
    let book = store.load()?;

    if report_if_empty(&book) {
        return Ok(());
    }

    print_entries(&book);
    Ok(())
}

/// Shared lookup used by the send flow. `None` means the operator
/// cancelled, distinct from the no-match case which loops.
pub fn find_entry(
    reader: &mut dyn LineReader,
    book: &AddressBook,
) -> QuillResult<Option<AddressBookEntry>> {
    loop {
        let friendly_name = match prompt(reader, "您想发送给地址簿中的谁?: ")? {
            Prompted::Cancelled => return Ok(None),
            Prompted::Line(name) => name,
        };

        if let Some(entry) = find_by_name(book, &friendly_name) {
            return Ok(Some(entry.clone()));
        }

        println!();
        println!(
            "{}",
            format!("找不到名称为 {} 的用户在您的通讯录中!", friendly_name).yellow()
        );
        println!();

        if confirm(reader, "您想列出您地址簿中的所有人吗?")? {
            println!();
            print_entries(book);
        }
    }
}

/// Prints the empty-book notice and reports whether it fired.
pub fn report_if_empty(book: &AddressBook) -> bool {
    if book.is_empty() {
        println!("{}", "您的通讯录是空的！ 首先加一些人.".yellow());
        return true;
    }

    false
}

fn print_entries(book: &AddressBook) {
    print!("{}", render_entries(book));
}

/// Numbered enumeration, 1-based, insertion order. The payment id line
/// appears only when one is stored.
pub fn render_entries(book: &AddressBook) -> String {
    let mut out = String::new();

    for (index, entry) in book.iter().enumerate() {
        out.push_str(&format!(
            "{}\n\n{}\n{}\n\n{}\n{}\n\n",
            format!("通讯录条目 #{}:", index + 1).cyan(),
            "友好名称: ".cyan(),
            entry.friendly_name.green(),
            "地址: ".cyan(),
            entry.address.green(),
        ));

        if !entry.payment_id.is_empty() {
            out.push_str(&format!(
                "{}\n{}\n\n\n",
                "付款编号: ".cyan(),
                entry.payment_id.green()
            ));
        } else {
            out.push('\n');
        }
    }

    out
}
