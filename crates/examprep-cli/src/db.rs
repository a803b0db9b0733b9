// Copyright 2025 Fernando Borretti
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use std::path::Path;

use examprep_core::Backend;
use examprep_core::Fallible;
use examprep_core::store::Change;
use rusqlite::Connection;
use rusqlite::OptionalExtension;
use rusqlite::Transaction;

/// A key-value backend stored in a single SQLite table.
pub struct SqliteBackend {
    conn: Connection,
}

impl SqliteBackend {
    pub fn open(path: &Path) -> Fallible<Self> {
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    #[cfg(test)]
    pub fn in_memory() -> Fallible<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(mut conn: Connection) -> Fallible<Self> {
        {
            let tx = conn.transaction()?;
            if !probe_schema_exists(&tx)? {
                log::debug!("Creating database schema.");
                tx.execute_batch(include_str!("schema.sql"))?;
                tx.commit()?;
            }
        }
        Ok(Self { conn })
    }
}

impl Backend for SqliteBackend {
    fn get(&self, key: &str) -> Fallible<Option<String>> {
        let sql = "select value from entries where key = ?;";
        let value = self
            .conn
            .query_row(sql, [key], |row| row.get(0))
            .optional()?;
        Ok(value)
    }

    fn set(&mut self, key: &str, value: &str) -> Fallible<()> {
        set_entry(&self.conn, key, value)
    }

    fn remove(&mut self, key: &str) -> Fallible<()> {
        remove_entry(&self.conn, key)
    }

    fn keys(&self) -> Fallible<Vec<String>> {
        let mut keys = Vec::new();
        let mut stmt = self.conn.prepare("select key from entries order by key;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            keys.push(row.get(0)?);
        }
        Ok(keys)
    }

    fn apply(&mut self, changes: &[Change]) -> Fallible<()> {
        let tx = self.conn.transaction()?;
        for change in changes {
            match change {
                Change::Set { key, value } => set_entry(&tx, key, value)?,
                Change::Remove { key } => remove_entry(&tx, key)?,
            }
        }
        tx.commit()?;
        Ok(())
    }
}

fn set_entry(conn: &Connection, key: &str, value: &str) -> Fallible<()> {
    let sql = "insert into entries (key, value) values (?, ?) on conflict (key) do update set value = excluded.value;";
    conn.execute(sql, [key, value])?;
    Ok(())
}

fn remove_entry(conn: &Connection, key: &str) -> Fallible<()> {
    conn.execute("delete from entries where key = ?;", [key])?;
    Ok(())
}

fn probe_schema_exists(tx: &Transaction) -> Fallible<bool> {
    let sql = "select count(*) from sqlite_master where type='table' AND name=?;";
    let count: i64 = tx.query_row(sql, ["entries"], |row| row.get(0))?;
    Ok(count > 0)
}
