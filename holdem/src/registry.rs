//! The table registry: id generation and shared ownership of tables.
//!
//! Lock discipline: when both locks are needed, take the registry map
//! lock before any table lock and never the other way around.

use log::info;
use rand::Rng;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::game::constants;
use crate::game::entities::PlayerName;
use crate::game::table::{Table, TableConfig};

/// A table shared across connection threads.
pub type SharedTable = Arc<Mutex<Table>>;

#[derive(Debug)]
pub struct Registry {
    tables: Mutex<HashMap<String, SharedTable>>,
    config: TableConfig,
}

fn generate_id<R: Rng>(rng: &mut R) -> String {
    (0..constants::TABLE_ID_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..constants::TABLE_ID_ALPHABET.len());
            constants::TABLE_ID_ALPHABET[idx] as char
        })
        .collect()
}

impl Registry {
    #[must_use]
    pub fn new(config: TableConfig) -> Self {
        Self {
            tables: Mutex::new(HashMap::new()),
            config,
        }
    }

    fn map(&self) -> MutexGuard<'_, HashMap<String, SharedTable>> {
        // A poisoned map only means another thread panicked mid-insert;
        // the map itself is still a valid HashMap.
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Create a table with a fresh unique id and its creator seated.
    /// The id is drawn under the map lock so two concurrent creates
    /// can never collide.
    pub fn create_table(&self, creator: PlayerName) -> (String, SharedTable) {
        let mut tables = self.map();
        let mut rng = rand::rng();
        let id = loop {
            let candidate = generate_id(&mut rng);
            if !tables.contains_key(&candidate) {
                break candidate;
            }
        };
        let table = Arc::new(Mutex::new(Table::new(
            id.clone(),
            self.config.clone(),
            creator,
        )));
        tables.insert(id.clone(), Arc::clone(&table));
        info!("table {id} created");
        (id, table)
    }

    /// Look up a table by id. Ids are upper-case; lookups normalize.
    pub fn get(&self, id: &str) -> Option<SharedTable> {
        let id = id.to_ascii_uppercase();
        self.map().get(&id).map(Arc::clone)
    }

    /// Drop the table if its last seat has left. Returns true when the
    /// table was removed.
    pub fn remove_if_empty(&self, id: &str) -> bool {
        let id = id.to_ascii_uppercase();
        let mut tables = self.map();
        let Some(table) = tables.get(&id) else {
            return false;
        };
        let empty = table
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .is_empty();
        if empty {
            tables.remove(&id);
            info!("table {id} removed");
        }
        empty
    }

    pub fn len(&self) -> usize {
        self.map().len()
    }

    pub fn is_empty(&self) -> bool {
        self.map().is_empty()
    }
}
